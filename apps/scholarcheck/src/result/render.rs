use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use tracing::warn;

use crate::models::scholarship::{
    EligibilityCheckRequest, ScholarshipCheckResponse, ScholarshipMatchResult,
};
use crate::result::classify::{classify, BucketKind};
use crate::routes::Route;
use crate::store::CheckStore;

// ────────────────────────────────────────────────────────────────────────────
// View model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Satisfied,
    NotSatisfied,
    Unknown,
}

impl Condition {
    fn marker(&self) -> &'static str {
        match self {
            Condition::Satisfied => "✓",
            Condition::NotSatisfied => "✗",
            Condition::Unknown => "?",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub organization: Option<String>,
    pub description: Option<String>,
    pub ai_analyzed: bool,
    pub manual_check: bool,
    pub conditions: Vec<(Condition, String)>,
    pub apply_period: Option<String>,
    pub external_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub kind: BucketKind,
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// As reported by the server.
    pub eligible: u32,
    pub unknown: usize,
    pub not_eligible: usize,
    pub total: usize,
    pub ai_analyzed: Option<u32>,
    pub public_data: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage {
    pub checked_at: String,
    pub conditions: Option<String>,
    pub summary: Summary,
    pub sections: Vec<Section>,
}

/// What the result command shows: the page, or the empty-state fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultView {
    Page(ResultPage),
    Empty { next: Route },
}

// ────────────────────────────────────────────────────────────────────────────
// Building
// ────────────────────────────────────────────────────────────────────────────

pub fn result_view(store: &CheckStore) -> ResultView {
    match store.result() {
        Some(response) => ResultView::Page(build_page(response, store.last_request())),
        None => ResultView::Empty {
            next: Route::CheckForm,
        },
    }
}

pub fn build_page(
    response: &ScholarshipCheckResponse,
    request: Option<&EligibilityCheckRequest>,
) -> ResultPage {
    let buckets = classify(&response.results);

    if response.summary.eligible_count as usize != buckets.eligible.len() {
        warn!(
            reported = response.summary.eligible_count,
            counted = buckets.eligible.len(),
            "server eligible_count disagrees with eligible results"
        );
    }

    let sections = buckets
        .in_render_order()
        .map(|(kind, bucket)| Section {
            kind,
            cards: bucket.iter().map(|result| card(result)).collect(),
        })
        .collect();

    ResultPage {
        checked_at: format_checked_at(&response.checked_at),
        conditions: request.map(describe_request),
        summary: Summary {
            eligible: response.summary.eligible_count,
            unknown: buckets.unknown.len(),
            not_eligible: buckets.not_eligible.len(),
            total: buckets.total(),
            ai_analyzed: response.summary.ai_analyzed_count,
            public_data: response.summary.public_data_count,
        },
        sections,
    }
}

fn card(result: &ScholarshipMatchResult) -> Card {
    let detail = &result.eligibility_detail;
    let conditions = detail
        .satisfied
        .iter()
        .map(|c| (Condition::Satisfied, c.clone()))
        .chain(detail.not_satisfied.iter().map(|c| (Condition::NotSatisfied, c.clone())))
        .chain(
            detail
                .unknown
                .iter()
                .flatten()
                .map(|c| (Condition::Unknown, c.clone())),
        )
        .collect();

    let ai = result.ai_info.as_ref();
    Card {
        id: result.scholarship.id.clone(),
        name: result.scholarship.name.clone(),
        organization: result.scholarship.organization.clone(),
        description: result.scholarship.description.clone(),
        ai_analyzed: ai.is_some_and(|a| a.is_ai_analyzed),
        manual_check: ai.is_some_and(|a| a.requires_manual_check),
        conditions,
        apply_period: result.apply_period.clone(),
        external_url: result.scholarship.external_url.clone(),
    }
}

fn describe_request(request: &EligibilityCheckRequest) -> String {
    format!(
        "{}, grade {}, born {}, GPA {:.1}, income level {}",
        request.academic_status.label(),
        request.grade,
        request.birth_year,
        request.gpa,
        request.income_level
    )
}

/// Falls back to the raw string when the timestamp is in an unexpected shape.
fn format_checked_at(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    raw.to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Text output
// ────────────────────────────────────────────────────────────────────────────

impl fmt::Display for ResultPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Eligibility results ({})", self.checked_at)?;
        if let Some(conditions) = &self.conditions {
            writeln!(f, "Your conditions: {conditions}")?;
        }
        let s = &self.summary;
        write!(
            f,
            "Eligible: {}  Needs manual check: {}  Not eligible: {}  (of {})",
            s.eligible, s.unknown, s.not_eligible, s.total
        )?;
        if let Some(n) = s.ai_analyzed {
            write!(f, "  AI analyzed: {n}")?;
        }
        if let Some(n) = s.public_data {
            write!(f, "  Public data: {n}")?;
        }
        writeln!(f)?;

        if self.sections.is_empty() {
            writeln!(f, "\nNo matching scholarships.")?;
        }
        for section in &self.sections {
            writeln!(f, "\n== {} ({}) ==", section.kind.heading(), section.cards.len())?;
            for card in &section.cards {
                write!(f, "{card}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut title = format!("\n* {}", self.name);
        if self.ai_analyzed {
            title.push_str("  [AI analyzed]");
        }
        if self.manual_check {
            title.push_str("  [manual check required]");
        }
        writeln!(f, "{title}")?;
        if let Some(org) = &self.organization {
            writeln!(f, "  {org}")?;
        }
        if let Some(description) = &self.description {
            writeln!(f, "  {description}")?;
        }
        for (condition, text) in &self.conditions {
            writeln!(f, "  {} {text}", condition.marker())?;
        }
        if let Some(period) = &self.apply_period {
            writeln!(f, "  Apply: {period}")?;
        }
        if let Some(url) = &self.external_url {
            writeln!(f, "  {url}")?;
        }
        writeln!(f, "  Details: {}", Route::Detail(self.id.clone()).command())
    }
}

impl fmt::Display for ResultView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultView::Page(page) => write!(f, "{page}"),
            ResultView::Empty { next } => {
                writeln!(f, "No eligibility results yet.")?;
                writeln!(f, "Run a check first: {}", next.command())
            }
        }
    }
}
