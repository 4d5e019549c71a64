use crate::models::scholarship::{Eligibility, ScholarshipMatchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketKind {
    Eligible,
    Unknown,
    NotEligible,
}

impl BucketKind {
    /// Fixed render order.
    pub const ORDER: [BucketKind; 3] = [
        BucketKind::Eligible,
        BucketKind::Unknown,
        BucketKind::NotEligible,
    ];

    pub fn heading(&self) -> &'static str {
        match self {
            BucketKind::Eligible => "Eligible",
            BucketKind::Unknown => "Needs manual check",
            BucketKind::NotEligible => "Not eligible",
        }
    }
}

/// The results split by verdict. Each bucket keeps the server's order.
#[derive(Debug, Default)]
pub struct Buckets<'a> {
    pub eligible: Vec<&'a ScholarshipMatchResult>,
    pub not_eligible: Vec<&'a ScholarshipMatchResult>,
    pub unknown: Vec<&'a ScholarshipMatchResult>,
}

impl<'a> Buckets<'a> {
    pub fn get(&self, kind: BucketKind) -> &[&'a ScholarshipMatchResult] {
        match kind {
            BucketKind::Eligible => &self.eligible,
            BucketKind::Unknown => &self.unknown,
            BucketKind::NotEligible => &self.not_eligible,
        }
    }

    pub fn total(&self) -> usize {
        self.eligible.len() + self.not_eligible.len() + self.unknown.len()
    }

    /// Non-empty buckets in render order.
    pub fn in_render_order<'s>(
        &'s self,
    ) -> impl Iterator<Item = (BucketKind, &'s [&'a ScholarshipMatchResult])> + 's {
        BucketKind::ORDER
            .into_iter()
            .map(move |kind| (kind, self.get(kind)))
            .filter(|(_, bucket)| !bucket.is_empty())
    }
}

pub fn classify(results: &[ScholarshipMatchResult]) -> Buckets<'_> {
    let mut buckets = Buckets::default();
    for result in results {
        match result.is_eligible {
            Eligibility::Eligible => buckets.eligible.push(result),
            Eligibility::NotEligible => buckets.not_eligible.push(result),
            Eligibility::Unknown => buckets.unknown.push(result),
        }
    }
    buckets
}
