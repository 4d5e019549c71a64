use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::Value;
use tracing::info;

use crate::admin::upload::CsvFile;
use crate::api_client::{ApiClient, ApiError, Body};
use crate::models::admin::{
    AdminScholarshipPage, CsvUploadResponse, DashboardStats, FlagUpdate, UploadMode,
};
use crate::store::TokenScope;

const ADMIN_PAGE_SIZE: u32 = 100;

impl ApiClient {
    /// GET /admin/dashboard
    pub async fn admin_dashboard(&self) -> Result<DashboardStats, ApiError> {
        self.get(&["admin", "dashboard"], &[], TokenScope::Admin).await
    }

    /// GET /admin/scholarships?perPage=100
    pub async fn admin_scholarships(&self) -> Result<AdminScholarshipPage, ApiError> {
        self.get(
            &["admin", "scholarships"],
            &[("perPage", ADMIN_PAGE_SIZE.to_string())],
            TokenScope::Admin,
        )
        .await
    }

    /// PUT /admin/scholarships/{id} with only the changed flag.
    pub async fn update_scholarship_flags(
        &self,
        id: &str,
        update: &FlagUpdate,
    ) -> Result<(), ApiError> {
        let body = serde_json::to_value(update)?;
        let _: Value = self
            .send(
                Method::PUT,
                &["admin", "scholarships", id],
                &[],
                TokenScope::Admin,
                Body::Json(body),
            )
            .await?;
        Ok(())
    }

    /// POST /admin/upload-csv as multipart `file` + `mode`.
    /// No content type is set by hand; reqwest writes the boundary.
    pub async fn upload_csv(
        &self,
        file: &CsvFile,
        mode: UploadMode,
    ) -> Result<CsvUploadResponse, ApiError> {
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.clone())
            .mime_str("text/csv")?;
        let form = Form::new().part("file", part).text("mode", mode.as_str());

        info!(
            file = %file.file_name,
            bytes = file.bytes.len(),
            mode = mode.as_str(),
            "uploading scholarship CSV"
        );
        self.send(
            Method::POST,
            &["admin", "upload-csv"],
            &[],
            TokenScope::Admin,
            Body::Multipart(form),
        )
        .await
    }
}
