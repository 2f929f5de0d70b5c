use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One respondent's answers exactly as supplied by the ingest adapter:
/// question header -> raw text, one row per respondent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawResponse {
    /// 1-based data row in the source export, kept for error reporting.
    pub row: usize,
    pub answers: BTreeMap<String, String>,
}

impl RawResponse {
    pub fn new(row: usize, answers: BTreeMap<String, String>) -> Self {
        Self { row, answers }
    }

    /// The raw answer for a question, empty string when the question is
    /// missing from this row.
    pub fn answer(&self, field: &str) -> &str {
        self.answers.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.answers.contains_key(field)
    }
}

/// A repaired respondent record: canonicalized answers plus typed numeric and
/// timestamp fields. Produced by the normalizer, consumed by every analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResponse {
    pub row: usize,
    /// Canonicalized answers; no key is ever removed during normalization.
    pub answers: BTreeMap<String, String>,
    pub total_comp: Option<f64>,
    pub base_comp: Option<f64>,
    pub work_hours: Option<f64>,
    pub submitted_at: Option<NaiveDateTime>,
}

impl NormalizedResponse {
    pub fn answer(&self, field: &str) -> &str {
        self.answers.get(field).map(String::as_str).unwrap_or("")
    }

    /// Region of residence, `None` when unanswered.
    pub fn region(&self) -> Option<&str> {
        let region = self.answer(crate::fields::COUNTRY);
        if region.is_empty() {
            None
        } else {
            Some(region)
        }
    }

    pub fn employment_kind(&self) -> &str {
        self.answer(crate::fields::EMPLOYMENT_KIND)
    }

    /// The typed compensation figure selected by `field`.
    pub fn compensation(&self, field: CompField) -> Option<f64> {
        match field {
            CompField::Total => self.total_comp,
            CompField::Base => self.base_comp,
        }
    }
}

/// Which compensation figure an analysis runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompField {
    /// Total annual compensation including bonuses.
    Total,
    /// Base annual salary only.
    Base,
}

/// Outcome counts of an income-filter pass. `empty` covers both
/// no-income-reported and no-comparability-data drops, matching the original
/// survey report's accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterTally {
    pub total: usize,
    pub retained: usize,
    pub empty: usize,
    pub below_minimum: usize,
    pub ineligible: usize,
}

/// Full income series and medians for one compensation field, in thousands of
/// base currency per month.
#[derive(Debug, Clone, Serialize)]
pub struct IncomeDistribution {
    pub nominal: Vec<f64>,
    pub ppp: Vec<f64>,
    pub median_nominal: Option<f64>,
    pub median_ppp: Option<f64>,
}

/// Median and symmetric percentile spread for one scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaleStats {
    pub median: f64,
    /// median - P(50-k)
    pub spread_below: f64,
    /// P(50+k) - median
    pub spread_above: f64,
}

/// Aggregates for one retained group of a grouping analysis.
#[derive(Debug, Clone, Serialize)]
pub struct GroupAggregate {
    /// Full partition label.
    pub label: String,
    /// Axis label: the partition label truncated at the first '/'.
    pub display_label: String,
    pub samples: usize,
    pub nominal: ScaleStats,
    pub ppp: ScaleStats,
}

/// Ordered category -> count view with the long tail consolidated into a
/// synthetic bucket that is always last.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketedDistribution {
    pub entries: Vec<CategoryCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

impl BucketedDistribution {
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.category.as_str()).collect()
    }

    pub fn count_of(&self, category: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| e.category == category)
            .map(|e| e.count)
    }
}

/// A bucketed breakdown overall plus per retained group.
#[derive(Debug, Clone, Serialize)]
pub struct GroupedDistributions {
    pub overall: BucketedDistribution,
    pub per_group: Vec<(String, BucketedDistribution)>,
}

/// PPP medians of total vs base compensation, each over the respondents that
/// reported the figure.
#[derive(Debug, Clone, Serialize)]
pub struct BaseVsTotalMedians {
    pub total_median_ppp: Option<f64>,
    pub base_median_ppp: Option<f64>,
    pub total_samples: usize,
    pub base_samples: usize,
}

/// Fraction of respondents residing outside the reference region, per
/// graduation year.
#[derive(Debug, Clone, Serialize)]
pub struct AbroadShare {
    pub graduation_year: String,
    pub share_abroad: f64,
    pub samples: usize,
}
