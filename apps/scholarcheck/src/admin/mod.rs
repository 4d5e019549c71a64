//! Admin console: dashboard counters, the scholarship table with flag
//! toggles, and CSV upload.
//!
//! Everything here runs under the admin token scope. Without an admin token
//! the console is never loaded; a 401/403 from any admin call sends the user
//! back to the admin login (the API client has already cleared the token).

pub mod toggle;
pub mod upload;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::api_client::{ApiClient, ApiError};
use crate::errors::ClientError;
use crate::models::admin::{
    AdminScholarship, CsvUploadResponse, DashboardStats, FlagUpdate, UploadMode,
};
use crate::routes::Route;
use crate::store::Session;

pub use toggle::{Flag, ScholarshipTable, ToggleOutcome};
pub use upload::{CsvFile, CsvUpload, UploadReport};

// ────────────────────────────────────────────────────────────────────────────
// Backend seam
// ────────────────────────────────────────────────────────────────────────────

/// Admin endpoints used by the console. `ApiClient` is the production
/// implementation.
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn dashboard(&self) -> Result<DashboardStats, ApiError>;

    async fn scholarships(&self) -> Result<Vec<AdminScholarship>, ApiError>;

    async fn update_flags(&self, id: &str, update: &FlagUpdate) -> Result<(), ApiError>;

    async fn upload_csv(
        &self,
        file: &CsvFile,
        mode: UploadMode,
    ) -> Result<CsvUploadResponse, ApiError>;
}

#[async_trait]
impl AdminApi for ApiClient {
    async fn dashboard(&self) -> Result<DashboardStats, ApiError> {
        self.admin_dashboard().await
    }

    async fn scholarships(&self) -> Result<Vec<AdminScholarship>, ApiError> {
        Ok(self.admin_scholarships().await?.scholarships)
    }

    async fn update_flags(&self, id: &str, update: &FlagUpdate) -> Result<(), ApiError> {
        self.update_scholarship_flags(id, update).await
    }

    async fn upload_csv(
        &self,
        file: &CsvFile,
        mode: UploadMode,
    ) -> Result<CsvUploadResponse, ApiError> {
        ApiClient::upload_csv(self, file, mode).await
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Console
// ────────────────────────────────────────────────────────────────────────────

pub enum AdminEntry {
    Console(AdminConsole),
    Redirect(Route),
}

/// The route to take after an admin call failed, if any.
pub fn login_redirect(err: &ClientError) -> Option<Route> {
    err.is_auth().then_some(Route::AdminLogin)
}

/// Opens the console: checks the admin token, then loads the dashboard and
/// the scholarship list.
pub async fn open_console(
    api: Arc<dyn AdminApi>,
    session: &Session,
) -> Result<AdminEntry, ClientError> {
    if !session.admin().has_token() {
        info!("no admin token; redirecting to admin login");
        return Ok(AdminEntry::Redirect(Route::AdminLogin));
    }

    let mut console = AdminConsole::new(api);
    match console.reload().await {
        Ok(()) => Ok(AdminEntry::Console(console)),
        Err(e) => match login_redirect(&e) {
            Some(route) => Ok(AdminEntry::Redirect(route)),
            None => Err(e),
        },
    }
}

pub struct AdminConsole {
    api: Arc<dyn AdminApi>,
    stats: Option<DashboardStats>,
    table: ScholarshipTable,
    upload: CsvUpload,
}

impl AdminConsole {
    pub fn new(api: Arc<dyn AdminApi>) -> Self {
        Self {
            api,
            stats: None,
            table: ScholarshipTable::default(),
            upload: CsvUpload::default(),
        }
    }

    pub fn stats(&self) -> Option<&DashboardStats> {
        self.stats.as_ref()
    }

    pub fn table(&self) -> &ScholarshipTable {
        &self.table
    }

    pub fn upload(&mut self) -> &mut CsvUpload {
        &mut self.upload
    }

    /// Loads the dashboard and the list together.
    pub async fn reload(&mut self) -> Result<(), ClientError> {
        let (stats, rows) = tokio::try_join!(self.api.dashboard(), self.api.scholarships())?;
        self.stats = Some(stats);
        self.table.replace(rows);
        Ok(())
    }

    pub async fn refresh_dashboard(&mut self) -> Result<(), ClientError> {
        self.stats = Some(self.api.dashboard().await?);
        Ok(())
    }

    pub async fn toggle(&mut self, id: &str, flag: Flag) -> Result<ToggleOutcome, ClientError> {
        let outcome = toggle::toggle_flag(self.api.as_ref(), &self.table, id, flag).await?;
        self.refresh_after_mutation().await?;
        Ok(outcome)
    }

    pub async fn upload_selected(&mut self) -> Result<UploadReport, ClientError> {
        let report = self.upload.submit(self.api.as_ref()).await?;
        self.refresh_after_mutation().await?;
        Ok(report)
    }

    // The mutation already succeeded; a stale counter is only logged unless
    // the session itself was rejected.
    async fn refresh_after_mutation(&mut self) -> Result<(), ClientError> {
        match self.refresh_dashboard().await {
            Err(e) if e.is_auth() => Err(e),
            Err(e) => {
                warn!("dashboard refresh failed: {e}");
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    }
}

impl fmt::Display for AdminConsole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(s) = &self.stats {
            writeln!(
                f,
                "Scholarships: {} total, {} active, {} inactive, {} featured",
                s.total_scholarships,
                s.active_scholarships,
                s.inactive_scholarships,
                s.featured_scholarships
            )?;
            if let Some(n) = s.accepting_applications {
                writeln!(f, "Accepting applications: {n}")?;
            }
        }
        let rows = self.table.rows();
        writeln!(f, "\n{:<8} {:<8} {:<36} NAME", "ACTIVE", "FEATURED", "ID")?;
        for row in &rows {
            let busy = if self.table.is_updating(&row.id) { " (updating)" } else { "" };
            write!(
                f,
                "{:<8} {:<8} {:<36} {}",
                yes_no(row.is_active),
                yes_no(row.is_featured),
                row.id,
                row.name
            )?;
            if let Some(org) = &row.organization {
                write!(f, " / {org}")?;
            }
            writeln!(f, "{busy}")?;
        }
        if rows.is_empty() {
            writeln!(f, "(no scholarships)")?;
        }
        Ok(())
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
