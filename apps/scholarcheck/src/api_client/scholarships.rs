use reqwest::Method;
use serde_json::Value;
use tracing::info;

use crate::api_client::{ApiClient, ApiError, Body};
use crate::models::scholarship::{
    ApiStatus, EligibilityCheckRequest, ScholarshipCheckResponse, ScholarshipDetail,
    ScholarshipPage,
};
use crate::store::TokenScope;

impl ApiClient {
    /// POST /scholarships/check
    pub async fn check_eligibility(
        &self,
        request: &EligibilityCheckRequest,
    ) -> Result<ScholarshipCheckResponse, ApiError> {
        let body = serde_json::to_value(request)?;
        let response: ScholarshipCheckResponse = self
            .send(
                Method::POST,
                &["scholarships", "check"],
                &[],
                TokenScope::User,
                Body::Json(body),
            )
            .await?;
        info!(
            results = response.results.len(),
            eligible = response.summary.eligible_count,
            "eligibility check completed"
        );
        Ok(response)
    }

    /// GET /scholarships/{id}
    pub async fn scholarship_detail(&self, id: &str) -> Result<ScholarshipDetail, ApiError> {
        self.get(&["scholarships", id], &[], TokenScope::User).await
    }

    /// GET /scholarships?page=&per_page=&search=
    pub async fn list_scholarships(
        &self,
        page: u32,
        per_page: u32,
        search: Option<&str>,
    ) -> Result<ScholarshipPage, ApiError> {
        let mut query = vec![("page", page.to_string()), ("per_page", per_page.to_string())];
        if let Some(term) = search.filter(|s| !s.trim().is_empty()) {
            query.push(("search", term.to_string()));
        }
        self.get(&["scholarships"], &query, TokenScope::User).await
    }

    /// GET /scholarships/public
    pub async fn public_scholarships(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<ScholarshipPage, ApiError> {
        self.get(
            &["scholarships", "public"],
            &[("page", page.to_string()), ("per_page", per_page.to_string())],
            TokenScope::User,
        )
        .await
    }

    /// GET /scholarships/featured
    pub async fn featured_scholarships(&self) -> Result<ScholarshipPage, ApiError> {
        self.get(&["scholarships", "featured"], &[], TokenScope::User).await
    }

    /// GET /scholarships/accepting
    pub async fn accepting_scholarships(&self) -> Result<ScholarshipPage, ApiError> {
        self.get(&["scholarships", "accepting"], &[], TokenScope::User).await
    }

    /// GET /scholarships/history. The shape is backend-defined, so it stays JSON.
    pub async fn check_history(&self) -> Result<Value, ApiError> {
        self.get(&["scholarships", "history"], &[], TokenScope::User).await
    }

    /// GET /scholarships/status
    pub async fn api_status(&self) -> Result<ApiStatus, ApiError> {
        self.get(&["scholarships", "status"], &[], TokenScope::User).await
    }
}
