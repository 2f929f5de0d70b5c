use std::collections::BTreeMap;

use tracing::debug;

use crate::config::SurveyConfig;
use crate::domain::{CompField, GroupAggregate, NormalizedResponse, ScaleStats};
use crate::error::Result;
use crate::fields;
use crate::pipeline::processing::convert::IncomeConverter;
use crate::stats;

/// Axis label for a group: the partition label truncated at the first '/',
/// collapsing sub-variants of a category for display.
pub fn display_label(label: &str) -> String {
    match label.find('/') {
        Some(idx) => label[..idx].to_string(),
        None => label.to_string(),
    }
}

/// Partitions income-filtered records by a categorical field and computes
/// per-group medians and symmetric percentile spreads on both scales.
///
/// Operates on a local copy; the caller's records are never mutated.
pub struct GroupAggregator<'a> {
    config: &'a SurveyConfig,
}

impl<'a> GroupAggregator<'a> {
    pub fn new(config: &'a SurveyConfig) -> Self {
        Self { config }
    }

    pub fn aggregate_by(
        &self,
        data: &[NormalizedResponse],
        field: &str,
    ) -> Result<Vec<GroupAggregate>> {
        let mut working: Vec<NormalizedResponse> = data
            .iter()
            .filter(|r| !r.answer(field).is_empty())
            .cloned()
            .collect();

        // U.S. states are one labor market for comparison purposes; collapse
        // them before partitioning so the sample threshold sees one group.
        if field == fields::COUNTRY {
            for record in &mut working {
                if record
                    .answer(fields::COUNTRY)
                    .contains(fields::USA_STATE_MARKER)
                {
                    record
                        .answers
                        .insert(fields::COUNTRY.to_string(), fields::USA_LABEL.to_string());
                }
            }
        }

        let mut groups: BTreeMap<String, Vec<NormalizedResponse>> = BTreeMap::new();
        for record in working {
            groups
                .entry(record.answer(field).to_string())
                .or_default()
                .push(record);
        }

        let min_samples = self.config.grouping.min_samples;
        let mut labels: Vec<String> = groups
            .iter()
            .filter(|(_, members)| members.len() >= min_samples)
            .map(|(label, _)| label.clone())
            .collect();
        sort_labels(field, &mut labels);
        debug!(field, groups = labels.len(), min_samples, "retained groups");

        let converter = IncomeConverter::new(self.config);
        let k = self.config.grouping.spread_percentile;
        let mut out = Vec::with_capacity(labels.len());
        for label in labels {
            let members = &groups[&label];
            let series = converter.convert(members, CompField::Total)?;
            let (Some(nominal), Some(ppp)) = (
                scale_stats(&series.nominal, k),
                scale_stats(&series.ppp, k),
            ) else {
                continue;
            };
            out.push(GroupAggregate {
                display_label: display_label(&label),
                label,
                samples: members.len(),
                nominal,
                ppp,
            });
        }
        Ok(out)
    }
}

fn scale_stats(sorted: &[f64], k: f64) -> Option<ScaleStats> {
    let median = stats::median(sorted)?;
    let lower = stats::percentile(sorted, 50.0 - k)?;
    let upper = stats::percentile(sorted, 50.0 + k)?;
    Some(ScaleStats {
        median,
        spread_below: median - lower,
        spread_above: upper - median,
    })
}

/// Ordinal fields sort by their fixed order (unknown labels after, lexical);
/// everything else sorts lexically.
pub(crate) fn sort_labels(field: &str, labels: &mut [String]) {
    match fields::ordinal_order(field) {
        Some(order) => labels.sort_by(|a, b| {
            let pos_a = order.iter().position(|o| o == a).unwrap_or(usize::MAX);
            let pos_b = order.iter().position(|o| o == b).unwrap_or(usize::MAX);
            pos_a.cmp(&pos_b).then_with(|| a.cmp(b))
        }),
        None => labels.sort(),
    }
}
