use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DashboardStats {
    pub total_scholarships: u64,
    pub active_scholarships: u64,
    pub inactive_scholarships: u64,
    pub featured_scholarships: u64,
    #[serde(default)]
    pub accepting_applications: Option<u64>,
    #[serde(default)]
    pub recent_updates: Option<u64>,
}

/// A row of the admin scholarship list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminScholarship {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminScholarshipPage {
    #[serde(alias = "items", default)]
    pub scholarships: Vec<AdminScholarship>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Partial update body for `PUT /admin/scholarships/{id}`.
/// Only the flag being changed is serialized.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FlagUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
}

/// Ingestion policy tag forwarded with a CSV upload. The backend applies it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum UploadMode {
    /// Add new rows, keep existing ones
    #[default]
    Append,
    /// Mark existing rows inactive, then add new ones
    Deactivate,
    /// Delete existing rows, then add new ones
    Replace,
}

impl UploadMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadMode::Append => "append",
            UploadMode::Deactivate => "deactivate",
            UploadMode::Replace => "replace",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadRowError {
    pub row: u32,
    pub error: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// `POST /admin/upload-csv` response. Snake_case is canonical; the deployed
/// backend emits `totalRows`, accepted as an alias.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CsvUploadResponse {
    pub message: Option<String>,
    pub filename: Option<String>,
    pub mode: Option<String>,
    #[serde(alias = "totalRows")]
    pub total_rows: Option<u32>,
    pub success: Option<u32>,
    pub failed: Option<u32>,
    #[serde(alias = "deletedCount")]
    pub deleted_count: Option<u32>,
    #[serde(alias = "deactivatedCount")]
    pub deactivated_count: Option<u32>,
    pub errors: Vec<UploadRowError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTally {
    pub total: u32,
    pub success: u32,
    pub failed: u32,
}

impl UploadTally {
    /// success falls back to total_rows, failed to zero, total to success + failed.
    pub fn from_response(response: &CsvUploadResponse) -> Self {
        let success = response.success.or(response.total_rows).unwrap_or(0);
        let failed = response.failed.unwrap_or(0);
        let total = response.total_rows.unwrap_or(success + failed);
        UploadTally {
            total,
            success,
            failed,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminLoginRequest {
    pub username: String,
    pub password: String,
}
