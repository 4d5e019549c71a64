use crate::models::scholarship::{EligibilityCheckRequest, ScholarshipCheckResponse};

/// Session-only state of the eligibility check. Never written to disk.
#[derive(Debug, Clone)]
pub struct CheckStore {
    result: Option<ScholarshipCheckResponse>,
    last_request: Option<EligibilityCheckRequest>,
    is_loading: bool,
    error: Option<String>,
    use_ai: bool,
    use_public_data: bool,
}

impl Default for CheckStore {
    fn default() -> Self {
        Self {
            result: None,
            last_request: None,
            is_loading: false,
            error: None,
            use_ai: true,
            use_public_data: true,
        }
    }
}

impl CheckStore {
    pub fn result(&self) -> Option<&ScholarshipCheckResponse> {
        self.result.as_ref()
    }

    pub fn last_request(&self) -> Option<&EligibilityCheckRequest> {
        self.last_request.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn use_ai(&self) -> bool {
        self.use_ai
    }

    pub fn use_public_data(&self) -> bool {
        self.use_public_data
    }

    pub fn set_use_ai(&mut self, on: bool) {
        self.use_ai = on;
    }

    pub fn set_use_public_data(&mut self, on: bool) {
        self.use_public_data = on;
    }

    /// Marks a submission in flight. Returns false if one already is.
    pub fn begin_submit(&mut self) -> bool {
        if self.is_loading {
            return false;
        }
        self.is_loading = true;
        self.error = None;
        true
    }

    /// Stores a successful response together with the request that produced it.
    pub fn complete(&mut self, request: EligibilityCheckRequest, result: ScholarshipCheckResponse) {
        self.result = Some(result);
        self.last_request = Some(request);
        self.error = None;
        self.is_loading = false;
    }

    /// Records a failed submission. The previous result is kept.
    pub fn fail(&mut self, message: String) {
        self.error = Some(message);
        self.is_loading = false;
    }

    /// Ends an in-flight submission that was dropped before it settled.
    pub fn cancel(&mut self) {
        self.is_loading = false;
    }

    pub fn clear_result(&mut self) {
        self.result = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::scholarship::{AcademicStatus, CheckSummary};

    fn request() -> EligibilityCheckRequest {
        EligibilityCheckRequest {
            academic_status: AcademicStatus::Enrolled,
            grade: 2,
            birth_year: 2003,
            gpa: 3.0,
            income_level: 5,
        }
    }

    fn response(checked_at: &str) -> ScholarshipCheckResponse {
        ScholarshipCheckResponse {
            results: vec![],
            checked_at: checked_at.to_string(),
            summary: CheckSummary::default(),
            user_conditions: None,
        }
    }

    #[test]
    fn test_defaults() {
        let store = CheckStore::default();
        assert!(store.result().is_none());
        assert!(!store.is_loading());
        assert!(store.use_ai());
        assert!(store.use_public_data());
    }

    #[test]
    fn test_second_begin_is_rejected_while_loading() {
        let mut store = CheckStore::default();
        assert!(store.begin_submit());
        assert!(!store.begin_submit());
        store.fail("boom".to_string());
        assert!(store.begin_submit());
    }

    #[test]
    fn test_failure_keeps_previous_result() {
        let mut store = CheckStore::default();
        assert!(store.begin_submit());
        store.complete(request(), response("first"));

        assert!(store.begin_submit());
        store.fail("server down".to_string());

        assert_eq!(store.result().unwrap().checked_at, "first");
        assert_eq!(store.last_request(), Some(&request()));
        assert_eq!(store.error(), Some("server down"));
        assert!(!store.is_loading());
    }

    #[test]
    fn test_complete_clears_error() {
        let mut store = CheckStore::default();
        store.begin_submit();
        store.fail("oops".to_string());
        store.begin_submit();
        store.complete(request(), response("second"));
        assert!(store.error().is_none());
    }
}
