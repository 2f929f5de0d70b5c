pub mod processing;

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use tracing::info;

use crate::config::SurveyConfig;
use crate::domain::{
    AbroadShare, BaseVsTotalMedians, BucketedDistribution, CompField, FilterTally, GroupAggregate,
    GroupedDistributions, IncomeDistribution, NormalizedResponse, RawResponse,
};
use crate::error::{Result, SurveyError};
use crate::fields;
use crate::pipeline::processing::aggregate::GroupAggregator;
use crate::pipeline::processing::bucket::CategoryBucketer;
use crate::pipeline::processing::convert::IncomeConverter;
use crate::pipeline::processing::income_filter::IncomeFilter;
use crate::pipeline::processing::normalize::{DefaultNormalizer, Normalizer};

/// The whole analysis surface over one in-memory survey dataset.
///
/// Construction normalizes every record and fail-fast-validates that each
/// answered region resolves in the reference tables. Analyses never mutate
/// the dataset; running them in any order or repeatedly gives identical
/// results.
#[derive(Debug)]
pub struct SurveyPipeline {
    config: SurveyConfig,
    records: Vec<NormalizedResponse>,
}

impl SurveyPipeline {
    pub fn from_raw(config: SurveyConfig, raw: &[RawResponse]) -> Result<Self> {
        Self::with_normalizer(config, raw, &DefaultNormalizer::new())
    }

    pub fn with_normalizer(
        config: SurveyConfig,
        raw: &[RawResponse],
        normalizer: &dyn Normalizer,
    ) -> Result<Self> {
        config.validate()?;
        let records = raw
            .iter()
            .map(|response| normalizer.normalize(response))
            .collect::<Result<Vec<_>>>()?;
        validate_regions(&config, &records)?;
        info!(respondents = records.len(), "survey dataset normalized");
        Ok(Self { config, records })
    }

    pub fn records(&self) -> &[NormalizedResponse] {
        &self.records
    }

    pub fn config(&self) -> &SurveyConfig {
        &self.config
    }

    /// Full income series with medians for the chosen compensation figure,
    /// plus the filter tally for this pass.
    pub fn income_distribution(
        &self,
        field: CompField,
    ) -> Result<(IncomeDistribution, FilterTally)> {
        let (retained, tally) = IncomeFilter::new(&self.config).filter(&self.records);
        let series = IncomeConverter::new(&self.config).convert(&retained, field)?;
        let distribution = IncomeDistribution {
            median_nominal: series.median_nominal(),
            median_ppp: series.median_ppp(),
            nominal: series.nominal,
            ppp: series.ppp,
        };
        Ok((distribution, tally))
    }

    /// Per-group income medians and spreads over the filtered population.
    pub fn median_by_group(&self, field: &str) -> Result<(Vec<GroupAggregate>, FilterTally)> {
        let (retained, tally) = IncomeFilter::new(&self.config).filter(&self.records);
        let aggregates = GroupAggregator::new(&self.config).aggregate_by(&retained, field)?;
        Ok((aggregates, tally))
    }

    /// Bucketed distribution of a categorical field over all respondents.
    /// Bypasses the income filter.
    pub fn categorical_breakdown(&self, field: &str) -> BucketedDistribution {
        CategoryBucketer::new(&self.config).breakdown(&self.records, field)
    }

    /// Bucketed distribution overall and per group of `group_field`.
    pub fn categorical_breakdown_by_group(
        &self,
        field: &str,
        group_field: &str,
    ) -> GroupedDistributions {
        CategoryBucketer::new(&self.config).breakdown_by_group(&self.records, field, group_field)
    }

    /// PPP medians of total vs base compensation, each over the filtered
    /// respondents that reported the figure.
    pub fn base_vs_total_medians(&self) -> Result<(BaseVsTotalMedians, FilterTally)> {
        let (retained, tally) = IncomeFilter::new(&self.config).filter(&self.records);
        let converter = IncomeConverter::new(&self.config);
        let total = converter.convert(&retained, CompField::Total)?;
        let base = converter.convert(&retained, CompField::Base)?;
        let medians = BaseVsTotalMedians {
            total_median_ppp: total.median_ppp(),
            base_median_ppp: base.median_ppp(),
            total_samples: total.ppp.len(),
            base_samples: base.ppp.len(),
        };
        Ok((medians, tally))
    }

    /// Fraction of respondents living outside the reference region per
    /// graduation year, over everyone who answered both questions.
    pub fn abroad_share_by_graduation_year(&self) -> Vec<AbroadShare> {
        let mut per_year: BTreeMap<String, (usize, usize)> = BTreeMap::new();
        for record in &self.records {
            let Some(region) = record.region() else {
                continue;
            };
            let year = record.answer(fields::GRADUATION_YEAR);
            if year.is_empty() {
                continue;
            }
            let entry = per_year.entry(year.to_string()).or_insert((0, 0));
            entry.1 += 1;
            if region != self.config.reference_region {
                entry.0 += 1;
            }
        }
        per_year
            .into_iter()
            .map(|(graduation_year, (abroad, total))| AbroadShare {
                graduation_year,
                share_abroad: abroad as f64 / total as f64,
                samples: total,
            })
            .collect()
    }

    /// Submission timestamps of every dated response, ascending.
    pub fn submission_times(&self) -> Vec<NaiveDateTime> {
        let mut times: Vec<NaiveDateTime> =
            self.records.iter().filter_map(|r| r.submitted_at).collect();
        times.sort();
        times
    }
}

/// Every answered region must resolve in the reference tables; a miss here is
/// a data or configuration defect, caught before any analysis runs.
fn validate_regions(config: &SurveyConfig, records: &[NormalizedResponse]) -> Result<()> {
    for record in records {
        if let Some(region) = record.region() {
            if !config.knows_region(region) {
                return Err(SurveyError::UnknownRegion {
                    row: record.row,
                    region: region.to_string(),
                });
            }
        }
    }
    Ok(())
}
