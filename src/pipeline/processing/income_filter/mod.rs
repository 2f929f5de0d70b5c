use tracing::info;

use crate::config::SurveyConfig;
use crate::domain::{FilterTally, NormalizedResponse};
use crate::fields;

/// Decides which normalized records are usable for income statistics.
///
/// Drops are expected and silent; every drop is accounted for in the returned
/// [`FilterTally`]. `empty` covers records with no reported income and records
/// whose region has no comparability data, matching the original report's
/// accounting; `ineligible` covers respondents outside the labor-income
/// population.
pub struct IncomeFilter<'a> {
    config: &'a SurveyConfig,
}

impl<'a> IncomeFilter<'a> {
    pub fn new(config: &'a SurveyConfig) -> Self {
        Self { config }
    }

    /// Income a respondent would earn in a standard 40-hour week, used only
    /// to sanity-check plausibility of the reported annual figure.
    pub fn weekly_equivalent(&self, total_comp: f64, work_hours: Option<f64>) -> f64 {
        let standard = self.config.income.standard_week_hours;
        match work_hours {
            Some(hours) if hours > 0.0 => total_comp / 52.0 * standard / hours,
            _ => total_comp / 52.0,
        }
    }

    /// Returns the records usable for income statistics plus the drop tally.
    /// The input is never mutated; retained records are cloned out.
    pub fn filter(&self, data: &[NormalizedResponse]) -> (Vec<NormalizedResponse>, FilterTally) {
        let mut tally = FilterTally {
            total: data.len(),
            ..FilterTally::default()
        };
        let mut retained = Vec::new();

        for record in data {
            let total_comp = match record.total_comp {
                Some(value) => value,
                None => {
                    tally.empty += 1;
                    continue;
                }
            };

            if record.employment_kind() == fields::UNEMPLOYED_NOT_SEEKING {
                tally.ineligible += 1;
                continue;
            }

            let weekly = self.weekly_equivalent(total_comp, record.work_hours);

            // Zero income is definitional for job seekers, so they are exempt
            // from the plausibility floor.
            if record.employment_kind() != fields::UNEMPLOYED_SEEKING
                && self.below_minimum(record.region(), weekly)
            {
                tally.below_minimum += 1;
                continue;
            }

            match record.region() {
                Some(region) if self.config.ppp_divisor(region).is_some() => {
                    retained.push(record.clone());
                }
                _ => {
                    // No comparability data for this region.
                    tally.empty += 1;
                }
            }
        }

        tally.retained = retained.len();
        info!(
            total = tally.total,
            retained = tally.retained,
            empty = tally.empty,
            below_minimum = tally.below_minimum,
            ineligible = tally.ineligible,
            "income filter pass"
        );
        (retained, tally)
    }

    fn below_minimum(&self, region: Option<&str>, weekly: f64) -> bool {
        let Some(region) = region else {
            return false;
        };
        match self.config.income.minimum_hourly_wage.get(region) {
            Some(rate) => weekly < rate * self.config.income.standard_week_hours,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NormalizedResponse;
    use std::collections::BTreeMap;

    fn record(region: &str, total: Option<f64>, hours: Option<f64>, kind: &str) -> NormalizedResponse {
        let mut answers = BTreeMap::new();
        if !region.is_empty() {
            answers.insert(fields::COUNTRY.to_string(), region.to_string());
        }
        if !kind.is_empty() {
            answers.insert(fields::EMPLOYMENT_KIND.to_string(), kind.to_string());
        }
        NormalizedResponse {
            row: 1,
            answers,
            total_comp: total,
            work_hours: hours,
            ..Default::default()
        }
    }

    #[test]
    fn records_without_income_count_as_empty() {
        let config = SurveyConfig::default();
        let filter = IncomeFilter::new(&config);
        let data = vec![record("Polska", None, None, "")];
        let (retained, tally) = filter.filter(&data);
        assert!(retained.is_empty());
        assert_eq!(tally.empty, 1);
        assert_eq!(tally.total, 1);
        assert_eq!(tally.retained, 0);
    }

    #[test]
    fn not_seeking_work_is_ineligible() {
        let config = SurveyConfig::default();
        let filter = IncomeFilter::new(&config);
        let data = vec![record(
            "Polska",
            Some(120_000.0),
            None,
            fields::UNEMPLOYED_NOT_SEEKING,
        )];
        let (retained, tally) = filter.filter(&data);
        assert!(retained.is_empty());
        assert_eq!(tally.ineligible, 1);
    }

    #[test]
    fn poland_below_minimum_wage_is_dropped() {
        let config = SurveyConfig::default();
        let filter = IncomeFilter::new(&config);
        // 20000 / 52 = ~384.6 weekly, under the 14.70 * 40 = 588 floor.
        let data = vec![record("Polska", Some(20_000.0), None, "")];
        let (retained, tally) = filter.filter(&data);
        assert!(retained.is_empty());
        assert_eq!(tally.below_minimum, 1);
    }

    #[test]
    fn poland_above_minimum_wage_is_retained() {
        let config = SurveyConfig::default();
        let filter = IncomeFilter::new(&config);
        let data = vec![record("Polska", Some(120_000.0), None, "")];
        let (retained, tally) = filter.filter(&data);
        assert_eq!(retained.len(), 1);
        assert_eq!(tally.retained, 1);
    }

    #[test]
    fn job_seekers_are_exempt_from_the_plausibility_floor() {
        let config = SurveyConfig::default();
        let filter = IncomeFilter::new(&config);
        let data = vec![record(
            "Polska",
            Some(0.0),
            None,
            fields::UNEMPLOYED_SEEKING,
        )];
        let (retained, tally) = filter.filter(&data);
        assert_eq!(retained.len(), 1);
        assert_eq!(tally.below_minimum, 0);
    }

    #[test]
    fn reported_hours_rescale_the_weekly_equivalent() {
        let config = SurveyConfig::default();
        let filter = IncomeFilter::new(&config);
        // 20000 annually over 20-hour weeks is a 40-hour equivalent of
        // 20000 / 52 * 40 / 20 = ~769 weekly, above the 588 floor.
        let data = vec![record("Polska", Some(20_000.0), Some(20.0), "")];
        let (retained, tally) = filter.filter(&data);
        assert_eq!(retained.len(), 1);
        assert_eq!(tally.below_minimum, 0);
        // The same figure over full-time hours is below the floor.
        let data = vec![record("Polska", Some(20_000.0), Some(40.0), "")];
        let (_, tally) = filter.filter(&data);
        assert_eq!(tally.below_minimum, 1);
    }

    #[test]
    fn uk_has_its_own_floor() {
        let config = SurveyConfig::default();
        let filter = IncomeFilter::new(&config);
        // 15000 / 52 = ~288 weekly, under 7.83 * 40 = 313.2.
        let data = vec![record("Wielka Brytania", Some(15_000.0), None, "")];
        let (_, tally) = filter.filter(&data);
        assert_eq!(tally.below_minimum, 1);
    }

    #[test]
    fn missing_region_counts_as_empty() {
        let config = SurveyConfig::default();
        let filter = IncomeFilter::new(&config);
        let data = vec![record("", Some(120_000.0), None, "")];
        let (retained, tally) = filter.filter(&data);
        assert!(retained.is_empty());
        assert_eq!(tally.empty, 1);
    }

    #[test]
    fn regions_without_ppp_data_are_dropped() {
        let config = SurveyConfig::default();
        let filter = IncomeFilter::new(&config);
        let data = vec![record("Azja (waluta USD)", Some(120_000.0), None, "")];
        let (retained, tally) = filter.filter(&data);
        assert!(retained.is_empty());
        assert_eq!(tally.empty, 1);
    }

    #[test]
    fn tally_covers_a_mixed_batch() {
        let config = SurveyConfig::default();
        let filter = IncomeFilter::new(&config);
        let data = vec![
            record("Polska", Some(120_000.0), None, ""),
            record("Polska", None, None, ""),
            record("Polska", Some(20_000.0), None, ""),
            record("Polska", Some(90_000.0), None, fields::UNEMPLOYED_NOT_SEEKING),
            record("wietnam", Some(500_000_000.0), None, ""),
        ];
        let (retained, tally) = filter.filter(&data);
        assert_eq!(retained.len(), 1);
        assert_eq!(tally.total, 5);
        assert_eq!(tally.retained, 1);
        assert_eq!(tally.empty, 2);
        assert_eq!(tally.below_minimum, 1);
        assert_eq!(tally.ineligible, 1);
    }
}
