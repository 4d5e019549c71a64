use std::fmt;

use chrono::{Local, NaiveDate};
use tracing::warn;

use crate::api_client::ApiClient;
use crate::errors::ClientError;
use crate::models::scholarship::ScholarshipDetail;
use crate::routes::Route;

/// Where today falls relative to the application window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodStatus {
    Upcoming,
    Ongoing,
    Ended,
    Unknown,
}

impl PeriodStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PeriodStatus::Upcoming => "upcoming",
            PeriodStatus::Ongoing => "accepting applications",
            PeriodStatus::Ended => "ended",
            PeriodStatus::Unknown => "unknown",
        }
    }
}

/// Dates arrive as `YYYY-MM-DD` or a full timestamp; only the date part counts.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

pub fn period_status(start: Option<&str>, end: Option<&str>, today: NaiveDate) -> PeriodStatus {
    let (Some(start), Some(end)) = (start.and_then(parse_date), end.and_then(parse_date)) else {
        return PeriodStatus::Unknown;
    };
    if today < start {
        PeriodStatus::Upcoming
    } else if today > end {
        PeriodStatus::Ended
    } else {
        PeriodStatus::Ongoing
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    Loaded {
        detail: ScholarshipDetail,
        status: PeriodStatus,
        back: Route,
    },
    Failed {
        id: String,
        message: String,
        back: Route,
    },
}

impl DetailView {
    pub fn back(&self) -> &Route {
        match self {
            DetailView::Loaded { back, .. } | DetailView::Failed { back, .. } => back,
        }
    }
}

/// Fetches one scholarship. A failed fetch becomes an error state with a way
/// back instead of an error.
pub async fn open_detail(api: &ApiClient, id: &str) -> DetailView {
    let back = if api.session().check().result().is_some() {
        Route::Result
    } else {
        Route::CheckForm
    };

    match api.scholarship_detail(id).await {
        Ok(detail) => {
            let today = Local::now().date_naive();
            let status = period_status(
                detail.apply_start.as_deref(),
                detail.apply_end.as_deref(),
                today,
            );
            DetailView::Loaded {
                detail,
                status,
                back,
            }
        }
        Err(e) => {
            let err = ClientError::from(e);
            warn!(id, "scholarship detail failed: {err}");
            DetailView::Failed {
                id: id.to_string(),
                message: err.user_message(),
                back,
            }
        }
    }
}

// Display order of the optional fields.
fn labelled_fields(d: &ScholarshipDetail) -> [(&'static str, Option<&str>); 18] {
    [
        ("Organization", d.organization.as_deref()),
        ("Organization type", d.organization_type.as_deref()),
        ("Product type", d.product_type.as_deref()),
        ("Aid type", d.financial_aid_type.as_deref()),
        ("Type", d.kind.as_deref()),
        ("University", d.university_category.as_deref()),
        ("Year / semester", d.grade_semester.as_deref()),
        ("Major", d.major_category.as_deref()),
        ("Grade criteria", d.grade_criteria.as_deref()),
        ("Income criteria", d.income_criteria.as_deref()),
        ("Support", d.support_details.as_deref()),
        ("Special qualification", d.special_qualification.as_deref()),
        ("Residency", d.residency_detail.as_deref()),
        ("Selection method", d.selection_method.as_deref()),
        ("Selection count", d.selection_count.as_deref()),
        ("Restrictions", d.eligibility_restriction.as_deref()),
        ("Recommendation", d.recommendation_required.as_deref()),
        ("Required documents", d.required_documents.as_deref()),
    ]
}

impl fmt::Display for DetailView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailView::Loaded {
                detail,
                status,
                back,
            } => {
                writeln!(f, "{}", detail.name)?;
                for (label, value) in labelled_fields(detail) {
                    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                        writeln!(f, "  {label}: {value}")?;
                    }
                }
                let start = detail.apply_start.as_deref().unwrap_or("-");
                let end = detail.apply_end.as_deref().unwrap_or("-");
                writeln!(f, "  Application period: {start} ~ {end} ({})", status.label())?;
                if let Some(url) = &detail.website_url {
                    writeln!(f, "  Website: {url}")?;
                }
                writeln!(f, "Back: {}", back.command())
            }
            DetailView::Failed { id, message, back } => {
                writeln!(f, "Could not load scholarship {id}: {message}")?;
                writeln!(f, "Back: {}", back.command())
            }
        }
    }
}
