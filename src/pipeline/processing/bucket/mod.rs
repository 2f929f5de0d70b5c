use std::collections::BTreeMap;

use crate::config::{BucketingConfig, SurveyConfig};
use crate::domain::{BucketedDistribution, CategoryCount, GroupedDistributions, NormalizedResponse};
use crate::fields;
use crate::pipeline::processing::aggregate::sort_labels;

/// Frequency count of a categorical field, descending; categories with equal
/// counts keep their first-seen order. Records with an empty answer are
/// skipped.
pub fn count_by_field(data: &[NormalizedResponse], field: &str) -> Vec<CategoryCount> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in data {
        let value = record.answer(field);
        if value.is_empty() {
            continue;
        }
        if !counts.contains_key(value) {
            order.push(value.to_string());
        }
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }
    let mut result: Vec<CategoryCount> = order
        .into_iter()
        .map(|category| {
            let count = counts[&category];
            CategoryCount { category, count }
        })
        .collect();
    // Stable sort keeps first-seen order among equal counts.
    result.sort_by(|a, b| b.count.cmp(&a.count));
    result
}

/// Consolidates the long tail of a descending-frequency count into the
/// configured other-bucket, appended last.
///
/// A category that survives the top-N cut but ties the count of the first
/// dropped one is bucketed with it; keeping one side of a tie would be an
/// arbitrary split.
pub fn consolidate(counts: &[CategoryCount], config: &BucketingConfig) -> BucketedDistribution {
    let cutoff = counts.get(config.top_categories).map(|c| c.count);
    let mut entries = Vec::new();
    let mut other = 0;
    for (i, entry) in counts.iter().enumerate() {
        let bucketed = i >= config.top_categories || cutoff == Some(entry.count);
        if bucketed {
            other += entry.count;
        } else {
            entries.push(entry.clone());
        }
    }
    if other > 0 {
        entries.push(CategoryCount {
            category: config.other_label.clone(),
            count: other,
        });
    }
    BucketedDistribution { entries }
}

/// Builds bucketed categorical breakdowns straight from normalized records,
/// independent of the income filter.
pub struct CategoryBucketer<'a> {
    config: &'a SurveyConfig,
}

impl<'a> CategoryBucketer<'a> {
    pub fn new(config: &'a SurveyConfig) -> Self {
        Self { config }
    }

    /// Bucketed distribution of one categorical field across all respondents
    /// that answered it. U.S. states collapse to one label, as everywhere.
    pub fn breakdown(&self, data: &[NormalizedResponse], field: &str) -> BucketedDistribution {
        let working = self.collapsed_copy(data, field);
        consolidate(&count_by_field(&working, field), &self.config.bucketing)
    }

    /// The breakdown overall plus per group of `group_field`, for groups
    /// meeting the same minimum sample size as income grouping. Group order
    /// follows the grouping rules (ordinal where known, else lexical).
    pub fn breakdown_by_group(
        &self,
        data: &[NormalizedResponse],
        field: &str,
        group_field: &str,
    ) -> GroupedDistributions {
        let working: Vec<NormalizedResponse> = self
            .collapsed_copy(data, field)
            .into_iter()
            .filter(|r| !r.answer(group_field).is_empty())
            .collect();

        let overall = consolidate(&count_by_field(&working, field), &self.config.bucketing);

        let mut groups: BTreeMap<String, Vec<NormalizedResponse>> = BTreeMap::new();
        for record in working {
            groups
                .entry(record.answer(group_field).to_string())
                .or_default()
                .push(record);
        }
        let min_samples = self.config.grouping.min_samples;
        let mut labels: Vec<String> = groups
            .iter()
            .filter(|(_, members)| members.len() >= min_samples)
            .map(|(label, _)| label.clone())
            .collect();
        sort_labels(group_field, &mut labels);

        let per_group = labels
            .into_iter()
            .map(|label| {
                let dist =
                    consolidate(&count_by_field(&groups[&label], field), &self.config.bucketing);
                (label, dist)
            })
            .collect();

        GroupedDistributions { overall, per_group }
    }

    /// Local copy with records lacking the field dropped and U.S. state
    /// labels collapsed; the source collection is never touched.
    fn collapsed_copy(&self, data: &[NormalizedResponse], field: &str) -> Vec<NormalizedResponse> {
        let mut working: Vec<NormalizedResponse> = data
            .iter()
            .filter(|r| !r.answer(field).is_empty())
            .cloned()
            .collect();
        for record in &mut working {
            if record.answer(field).contains(fields::USA_STATE_MARKER) {
                record
                    .answers
                    .insert(field.to_string(), fields::USA_LABEL.to_string());
            }
        }
        working
    }
}
