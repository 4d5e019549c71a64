use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AcademicStatus {
    Enrolled,
    Expected,
    Leave,
}

impl AcademicStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AcademicStatus::Enrolled => "enrolled",
            AcademicStatus::Expected => "expected",
            AcademicStatus::Leave => "on leave",
        }
    }
}

/// The five answers of the check form, sent as one request body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EligibilityCheckRequest {
    pub academic_status: AcademicStatus,
    pub grade: u8,
    pub birth_year: i32,
    pub gpa: f64,
    pub income_level: u8,
}

/// Tri-state verdict. `null` and a missing field both decode as `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Eligibility {
    Eligible,
    NotEligible,
    #[default]
    Unknown,
}

impl From<Option<bool>> for Eligibility {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Eligibility::Eligible,
            Some(false) => Eligibility::NotEligible,
            None => Eligibility::Unknown,
        }
    }
}

impl From<Eligibility> for Option<bool> {
    fn from(value: Eligibility) -> Self {
        match value {
            Eligibility::Eligible => Some(true),
            Eligibility::NotEligible => Some(false),
            Eligibility::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScholarshipInfo {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EligibilityDetail {
    #[serde(default)]
    pub satisfied: Vec<String>,
    #[serde(default)]
    pub not_satisfied: Vec<String>,
    #[serde(default)]
    pub unknown: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiAnalysisInfo {
    pub is_ai_analyzed: bool,
    pub requires_manual_check: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScholarshipMatchResult {
    pub scholarship: ScholarshipInfo,
    #[serde(default)]
    pub is_eligible: Eligibility,
    #[serde(default)]
    pub eligibility_detail: EligibilityDetail,
    #[serde(default)]
    pub apply_period: Option<String>,
    #[serde(default)]
    pub ai_info: Option<AiAnalysisInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CheckSummary {
    pub eligible_count: u32,
    pub total_count: u32,
    #[serde(default)]
    pub ai_analyzed_count: Option<u32>,
    #[serde(default)]
    pub public_data_count: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScholarshipCheckResponse {
    pub results: Vec<ScholarshipMatchResult>,
    pub checked_at: String,
    #[serde(default)]
    pub summary: CheckSummary,
    #[serde(default)]
    pub user_conditions: Option<Map<String, Value>>,
}

/// Full record behind `GET /scholarships/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScholarshipDetail {
    pub id: String,
    pub name: String,
    pub organization: Option<String>,
    pub organization_type: Option<String>,
    pub product_type: Option<String>,
    pub financial_aid_type: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub university_category: Option<String>,
    pub grade_semester: Option<String>,
    pub major_category: Option<String>,
    pub grade_criteria: Option<String>,
    pub income_criteria: Option<String>,
    pub support_details: Option<String>,
    pub special_qualification: Option<String>,
    pub residency_detail: Option<String>,
    pub selection_method: Option<String>,
    pub selection_count: Option<String>,
    pub eligibility_restriction: Option<String>,
    pub recommendation_required: Option<String>,
    pub required_documents: Option<String>,
    pub website_url: Option<String>,
    pub apply_start: Option<String>,
    pub apply_end: Option<String>,
}

/// One row of a listing read (`/scholarships`, `/featured`, `/accepting`, `/public`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScholarshipSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub apply_start: Option<String>,
    #[serde(default)]
    pub apply_end: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScholarshipPage {
    #[serde(alias = "items", default)]
    pub scholarships: Vec<ScholarshipSummary>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureStatus {
    pub enabled: bool,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OAuthAvailability {
    #[serde(default)]
    pub kakao: bool,
    #[serde(default)]
    pub naver: bool,
    #[serde(default)]
    pub google: bool,
}

/// `GET /scholarships/status`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiStatus {
    pub public_data_api: FeatureStatus,
    pub ai_analysis: FeatureStatus,
    #[serde(default)]
    pub oauth: OAuthAvailability,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_eligible_decodes_tri_state() {
        let base = json!({
            "scholarship": { "id": "s1", "name": "Hope" },
            "eligibility_detail": { "satisfied": [], "not_satisfied": [] }
        });

        let mut eligible = base.clone();
        eligible["is_eligible"] = json!(true);
        let mut rejected = base.clone();
        rejected["is_eligible"] = json!(false);
        let mut null = base.clone();
        null["is_eligible"] = Value::Null;

        let parse = |v: Value| serde_json::from_value::<ScholarshipMatchResult>(v).unwrap();
        assert_eq!(parse(eligible).is_eligible, Eligibility::Eligible);
        assert_eq!(parse(rejected).is_eligible, Eligibility::NotEligible);
        assert_eq!(parse(null).is_eligible, Eligibility::Unknown);
        assert_eq!(parse(base).is_eligible, Eligibility::Unknown);
    }

    #[test]
    fn test_check_request_serializes_snake_case() {
        let request = EligibilityCheckRequest {
            academic_status: AcademicStatus::Enrolled,
            grade: 2,
            birth_year: 2003,
            gpa: 3.0,
            income_level: 5,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({
                "academic_status": "enrolled",
                "grade": 2,
                "birth_year": 2003,
                "gpa": 3.0,
                "income_level": 5
            })
        );
    }

    #[test]
    fn test_check_response_tolerates_missing_optional_fields() {
        let response: ScholarshipCheckResponse = serde_json::from_value(json!({
            "results": [{
                "scholarship": { "id": "s1", "name": "Hope", "type": "national" },
                "is_eligible": true,
                "eligibility_detail": { "satisfied": ["GPA 3.0 >= 2.5"], "not_satisfied": [] }
            }],
            "checked_at": "2026-03-02T10:00:00",
            "summary": { "eligible_count": 1, "total_count": 1 }
        }))
        .unwrap();

        let first = &response.results[0];
        assert_eq!(first.scholarship.kind.as_deref(), Some("national"));
        assert!(first.eligibility_detail.unknown.is_none());
        assert!(first.ai_info.is_none());
        assert!(response.user_conditions.is_none());
        assert_eq!(response.summary.ai_analyzed_count, None);
    }

    #[test]
    fn test_scholarship_page_accepts_items_alias() {
        let page: ScholarshipPage = serde_json::from_value(json!({
            "items": [{ "id": "a", "name": "A" }],
            "total": 1
        }))
        .unwrap();
        assert_eq!(page.scholarships.len(), 1);
        assert_eq!(page.total, Some(1));
    }
}
