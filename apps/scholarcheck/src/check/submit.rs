use tracing::{info, warn};

use crate::check::EligibilityApi;
use crate::errors::ClientError;
use crate::models::scholarship::EligibilityCheckRequest;
use crate::routes::Route;
use crate::store::Session;

/// Sends one eligibility check and records the outcome in the check store.
///
/// A second submit while one is in flight is rejected without a call. On
/// success the response and the request land in the store together and the
/// flow moves to the result view; on failure only the error is recorded.
pub async fn submit_check(
    api: &dyn EligibilityApi,
    session: &Session,
    request: EligibilityCheckRequest,
) -> Result<Route, ClientError> {
    if !session.check().begin_submit() {
        return Err(ClientError::Busy(
            "An eligibility check is already in progress.".to_string(),
        ));
    }
    let mut in_flight = InFlight {
        session,
        settled: false,
    };

    let outcome = api.check_eligibility(&request).await;
    in_flight.settled = true;

    match outcome {
        Ok(response) => {
            info!(
                results = response.results.len(),
                "check stored; showing results"
            );
            session.check().complete(request, response);
            Ok(Route::Result)
        }
        Err(e) => {
            let err = ClientError::from(e);
            warn!("eligibility check failed: {err}");
            session.check().fail(err.user_message());
            Err(err)
        }
    }
}

// Clears the loading flag if the submit future is dropped mid-request.
struct InFlight<'a> {
    session: &'a Session,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.session.check().cancel();
        }
    }
}
