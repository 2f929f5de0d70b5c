use crate::config::SurveyConfig;
use crate::domain::{CompField, NormalizedResponse};
use crate::error::Result;
use crate::stats;

/// Monthly income series in thousands of base currency, ascending-sorted.
///
/// `ppp` holds only the records whose region has a comparability divisor, so
/// the two series may differ in length.
#[derive(Debug, Clone, Default)]
pub struct IncomeSeries {
    pub nominal: Vec<f64>,
    pub ppp: Vec<f64>,
}

impl IncomeSeries {
    pub fn median_nominal(&self) -> Option<f64> {
        stats::median(&self.nominal)
    }

    pub fn median_ppp(&self) -> Option<f64> {
        stats::median(&self.ppp)
    }
}

/// Maps filtered records onto the two comparable income scales.
pub struct IncomeConverter<'a> {
    config: &'a SurveyConfig,
}

impl<'a> IncomeConverter<'a> {
    pub fn new(config: &'a SurveyConfig) -> Self {
        Self { config }
    }

    /// Converts the chosen compensation figure of every applicable record.
    ///
    /// Records without the chosen figure or without a region are skipped (the
    /// base-salary variant runs over the subset that reported one). A region
    /// absent from the currency table is a fatal lookup error, surfaced here
    /// rather than as a panic deep in the math.
    pub fn convert(&self, data: &[NormalizedResponse], field: CompField) -> Result<IncomeSeries> {
        let reference_divisor = self.config.reference_divisor()?;
        let mut series = IncomeSeries::default();

        for record in data {
            let (Some(value), Some(region)) = (record.compensation(field), record.region()) else {
                continue;
            };
            let multiplier = self.config.currency_multiplier(record.row, region)?;
            let monthly = value / 1000.0 / 12.0;
            series.nominal.push(monthly * multiplier);
            if let Some(divisor) = self.config.ppp_divisor(region) {
                series.ppp.push(monthly / divisor * reference_divisor);
            }
        }

        stats::sort_ascending(&mut series.nominal);
        stats::sort_ascending(&mut series.ppp);
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SurveyError;
    use crate::fields;
    use std::collections::BTreeMap;

    fn record(region: &str, total: f64) -> NormalizedResponse {
        let mut answers = BTreeMap::new();
        answers.insert(fields::COUNTRY.to_string(), region.to_string());
        NormalizedResponse {
            row: 1,
            answers,
            total_comp: Some(total),
            ..Default::default()
        }
    }

    #[test]
    fn nominal_conversion_yields_monthly_thousands() {
        let config = SurveyConfig::default();
        let converter = IncomeConverter::new(&config);
        let series = converter
            .convert(&[record("Polska", 120_000.0)], CompField::Total)
            .unwrap();
        assert_eq!(series.nominal, vec![10.0]);
    }

    #[test]
    fn ppp_conversion_rebases_onto_the_reference_region() {
        let config = SurveyConfig::default();
        let converter = IncomeConverter::new(&config);
        let series = converter
            .convert(&[record("USA", 120_000.0)], CompField::Total)
            .unwrap();
        // Nominal: 10 * 3.88; PPP: 10 / 1.0 * 1.764.
        assert!((series.nominal[0] - 38.8).abs() < 1e-9);
        assert!((series.ppp[0] - 17.64).abs() < 1e-9);
    }

    #[test]
    fn regions_without_ppp_appear_only_in_the_nominal_series() {
        let config = SurveyConfig::default();
        let converter = IncomeConverter::new(&config);
        let data = vec![record("Polska", 120_000.0), record("Azja (waluta USD)", 120_000.0)];
        let series = converter.convert(&data, CompField::Total).unwrap();
        assert_eq!(series.nominal.len(), 2);
        assert_eq!(series.ppp.len(), 1);
    }

    #[test]
    fn series_are_ascending_sorted() {
        let config = SurveyConfig::default();
        let converter = IncomeConverter::new(&config);
        let data = vec![
            record("Polska", 240_000.0),
            record("Polska", 60_000.0),
            record("Polska", 120_000.0),
        ];
        let series = converter.convert(&data, CompField::Total).unwrap();
        assert_eq!(series.nominal, vec![5.0, 10.0, 20.0]);
    }

    #[test]
    fn base_field_skips_records_without_base_salary() {
        let config = SurveyConfig::default();
        let converter = IncomeConverter::new(&config);
        let mut with_base = record("Polska", 120_000.0);
        with_base.base_comp = Some(96_000.0);
        let without_base = record("Polska", 120_000.0);
        let series = converter
            .convert(&[with_base, without_base], CompField::Base)
            .unwrap();
        assert_eq!(series.nominal, vec![8.0]);
    }

    #[test]
    fn unknown_region_is_a_descriptive_error() {
        let config = SurveyConfig::default();
        let converter = IncomeConverter::new(&config);
        let err = converter
            .convert(&[record("Atlantyda", 120_000.0)], CompField::Total)
            .unwrap_err();
        assert!(matches!(err, SurveyError::UnknownRegion { .. }));
    }

    #[test]
    fn median_tie_break_averages_the_central_pair() {
        let series = IncomeSeries {
            nominal: vec![10.0, 20.0, 30.0, 40.0],
            ppp: vec![10.0, 20.0, 30.0],
        };
        assert_eq!(series.median_nominal(), Some(25.0));
        assert_eq!(series.median_ppp(), Some(20.0));
    }
}
