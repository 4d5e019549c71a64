use std::fmt;
use std::io::ErrorKind;
use std::path::Path;

use bytes::Bytes;
use tracing::{info, warn};

use crate::admin::AdminApi;
use crate::errors::ClientError;
use crate::models::admin::{CsvUploadResponse, UploadMode, UploadRowError, UploadTally};

// Row errors beyond this are summarized as a count.
const MAX_LISTED_ROW_ERRORS: usize = 10;

/// A CSV file selected for upload. Bytes are sent as-is; encoding detection
/// happens server-side.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvFile {
    pub file_name: String,
    pub bytes: Bytes,
}

impl CsvFile {
    /// A path that does not exist is a validation error, like an empty file picker.
    pub async fn read(path: &Path) -> Result<Self, ClientError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                ClientError::Validation(format!("CSV file not found: {}", path.display()))
            }
            _ => ClientError::Io(e),
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".to_string());
        Ok(Self {
            file_name,
            bytes: Bytes::from(bytes),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadReport {
    pub tally: UploadTally,
    pub mode: UploadMode,
    pub message: Option<String>,
    pub deleted_count: Option<u32>,
    pub deactivated_count: Option<u32>,
    pub errors: Vec<UploadRowError>,
}

impl UploadReport {
    fn new(mode: UploadMode, response: CsvUploadResponse) -> Self {
        Self {
            tally: UploadTally::from_response(&response),
            mode,
            message: response.message,
            deleted_count: response.deleted_count,
            deactivated_count: response.deactivated_count,
            errors: response.errors,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadState {
    Idle,
    Uploading,
    Succeeded(UploadReport),
    Failed(String),
}

/// `idle -> uploading -> succeeded | failed`.
#[derive(Debug)]
pub struct CsvUpload {
    file: Option<CsvFile>,
    mode: UploadMode,
    state: UploadState,
}

impl Default for CsvUpload {
    fn default() -> Self {
        Self {
            file: None,
            mode: UploadMode::default(),
            state: UploadState::Idle,
        }
    }
}

impl CsvUpload {
    pub fn select(&mut self, file: CsvFile) {
        self.file = Some(file);
    }

    pub fn file(&self) -> Option<&CsvFile> {
        self.file.as_ref()
    }

    pub fn set_mode(&mut self, mode: UploadMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> UploadMode {
        self.mode
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    /// Sends the selected file with the mode tag. Without a file this fails
    /// locally and nothing is sent. The file is cleared only on success.
    pub async fn submit(&mut self, api: &dyn AdminApi) -> Result<UploadReport, ClientError> {
        let Some(file) = self.file.as_ref() else {
            let err = ClientError::Validation("Select a CSV file first.".to_string());
            self.state = UploadState::Failed(err.user_message());
            return Err(err);
        };

        self.state = UploadState::Uploading;
        match api.upload_csv(file, self.mode).await {
            Ok(response) => {
                let report = UploadReport::new(self.mode, response);
                info!(
                    mode = self.mode.as_str(),
                    total = report.tally.total,
                    success = report.tally.success,
                    failed = report.tally.failed,
                    "CSV upload finished"
                );
                self.file = None;
                self.state = UploadState::Succeeded(report.clone());
                Ok(report)
            }
            Err(e) => {
                let err = ClientError::from(e);
                warn!("CSV upload failed: {err}");
                self.state = UploadState::Failed(err.user_message());
                Err(err)
            }
        }
    }
}

impl fmt::Display for UploadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = &self.tally;
        writeln!(
            f,
            "Upload complete ({}): total {}, success {}, failed {}",
            self.mode.as_str(),
            t.total,
            t.success,
            t.failed
        )?;
        if let Some(n) = self.deleted_count.filter(|n| *n > 0) {
            writeln!(f, "  Removed {n} existing scholarships")?;
        }
        if let Some(n) = self.deactivated_count.filter(|n| *n > 0) {
            writeln!(f, "  Deactivated {n} existing scholarships")?;
        }
        for e in self.errors.iter().take(MAX_LISTED_ROW_ERRORS) {
            match &e.name {
                Some(name) => writeln!(f, "  row {} ({name}): {}", e.row, e.error)?,
                None => writeln!(f, "  row {}: {}", e.row, e.error)?,
            }
        }
        if self.errors.len() > MAX_LISTED_ROW_ERRORS {
            writeln!(f, "  ... and {} more", self.errors.len() - MAX_LISTED_ROW_ERRORS)?;
        }
        Ok(())
    }
}

impl fmt::Display for UploadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadState::Idle => writeln!(f, "No upload yet."),
            UploadState::Uploading => writeln!(f, "Uploading..."),
            UploadState::Succeeded(report) => write!(f, "{report}"),
            UploadState::Failed(message) => writeln!(f, "Upload failed: {message}"),
        }
    }
}
