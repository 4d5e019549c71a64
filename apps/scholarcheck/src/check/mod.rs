//! Eligibility-check submission: form arguments in, stored result out.

pub mod form;
pub mod submit;

use async_trait::async_trait;

use crate::api_client::{ApiClient, ApiError};
use crate::models::scholarship::{EligibilityCheckRequest, ScholarshipCheckResponse};

pub use form::CheckArgs;
pub use submit::submit_check;

/// The backend call behind a check submission. `ApiClient` is the production
/// implementation; flow tests substitute their own.
#[async_trait]
pub trait EligibilityApi: Send + Sync {
    async fn check_eligibility(
        &self,
        request: &EligibilityCheckRequest,
    ) -> Result<ScholarshipCheckResponse, ApiError>;
}

#[async_trait]
impl EligibilityApi for ApiClient {
    async fn check_eligibility(
        &self,
        request: &EligibilityCheckRequest,
    ) -> Result<ScholarshipCheckResponse, ApiError> {
        ApiClient::check_eligibility(self, request).await
    }
}
