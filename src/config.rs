use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{Result, SurveyError};

/// Reference tables and thresholds for the whole pipeline. Loaded from TOML
/// so rates can be updated without touching analysis logic; the `Default`
/// carries the tables published with the 2021 survey report.
#[derive(Debug, Clone, Deserialize)]
pub struct SurveyConfig {
    /// Region every PPP-adjusted figure is expressed relative to.
    pub reference_region: String,
    /// Region -> multiplier converting local currency to the base currency.
    /// Membership in this table defines the set of known regions.
    pub currency: BTreeMap<String, f64>,
    /// Region -> purchasing-power-parity divisor. Absence means the region
    /// has no comparability data and is excluded from PPP views.
    #[serde(default)]
    pub ppp: BTreeMap<String, f64>,
    #[serde(default)]
    pub income: IncomeConfig,
    #[serde(default)]
    pub grouping: GroupingConfig,
    #[serde(default)]
    pub bucketing: BucketingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IncomeConfig {
    /// Hours assumed when a respondent did not report a typical week.
    pub standard_week_hours: f64,
    /// Region -> minimum hourly wage. Weekly equivalents below
    /// `rate * standard_week_hours` flag probable unit-entry errors.
    pub minimum_hourly_wage: BTreeMap<String, f64>,
}

impl Default for IncomeConfig {
    fn default() -> Self {
        Self {
            standard_week_hours: 40.0,
            minimum_hourly_wage: BTreeMap::from([
                ("Polska".to_string(), 14.70),
                ("Wielka Brytania".to_string(), 7.83),
            ]),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Groups smaller than this are dropped from aggregate output entirely.
    pub min_samples: usize,
    /// Spread width k: bounds are the 50-k and 50+k percentiles.
    pub spread_percentile: f64,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            min_samples: 5,
            spread_percentile: 10.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BucketingConfig {
    /// How many highest-frequency categories survive consolidation.
    pub top_categories: usize,
    /// Label of the synthetic long-tail bucket.
    pub other_label: String,
}

impl Default for BucketingConfig {
    fn default() -> Self {
        Self {
            top_categories: 6,
            other_label: "inne".to_string(),
        }
    }
}

impl SurveyConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SurveyError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: SurveyConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks internal consistency; every loaded or hand-built config must
    /// pass before the pipeline will accept it.
    pub fn validate(&self) -> Result<()> {
        if self.currency.is_empty() {
            return Err(SurveyError::Config(
                "currency table must not be empty".to_string(),
            ));
        }
        for (region, multiplier) in &self.currency {
            if !multiplier.is_finite() || *multiplier <= 0.0 {
                return Err(SurveyError::Config(format!(
                    "currency multiplier for '{}' must be positive, got {}",
                    region, multiplier
                )));
            }
        }
        for (region, divisor) in &self.ppp {
            if !divisor.is_finite() || *divisor <= 0.0 {
                return Err(SurveyError::Config(format!(
                    "PPP divisor for '{}' must be positive, got {}",
                    region, divisor
                )));
            }
            if !self.currency.contains_key(region) {
                return Err(SurveyError::Config(format!(
                    "PPP region '{}' is missing from the currency table",
                    region
                )));
            }
        }
        for (region, rate) in &self.income.minimum_hourly_wage {
            if !rate.is_finite() || *rate <= 0.0 {
                return Err(SurveyError::Config(format!(
                    "minimum hourly wage for '{}' must be positive, got {}",
                    region, rate
                )));
            }
        }
        if self.income.standard_week_hours <= 0.0 {
            return Err(SurveyError::Config(
                "standard_week_hours must be positive".to_string(),
            ));
        }
        if !self.ppp.contains_key(&self.reference_region) {
            return Err(SurveyError::Config(format!(
                "reference region '{}' has no PPP divisor",
                self.reference_region
            )));
        }
        if !(0.0..50.0).contains(&self.grouping.spread_percentile) {
            return Err(SurveyError::Config(format!(
                "spread_percentile must be in [0, 50), got {}",
                self.grouping.spread_percentile
            )));
        }
        if self.bucketing.top_categories == 0 {
            return Err(SurveyError::Config(
                "top_categories must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a region answer resolves in the reference tables at all.
    pub fn knows_region(&self, region: &str) -> bool {
        self.currency.contains_key(region)
    }

    pub fn currency_multiplier(&self, row: usize, region: &str) -> Result<f64> {
        self.currency
            .get(region)
            .copied()
            .ok_or_else(|| SurveyError::UnknownRegion {
                row,
                region: region.to_string(),
            })
    }

    /// `None` means the region has no comparability data.
    pub fn ppp_divisor(&self, region: &str) -> Option<f64> {
        self.ppp.get(region).copied()
    }

    /// The divisor PPP figures are rebased onto. Guaranteed present once
    /// `validate` has passed.
    pub fn reference_divisor(&self) -> Result<f64> {
        self.ppp.get(&self.reference_region).copied().ok_or_else(|| {
            SurveyError::Config(format!(
                "reference region '{}' has no PPP divisor",
                self.reference_region
            ))
        })
    }
}

impl Default for SurveyConfig {
    fn default() -> Self {
        // Exchange rates as of 17/07/2021, PPP divisors from the OECD series.
        let currency = [
            ("Polska", 1.0),
            ("Kalifornia, Stany Zjednoczone Ameryki", 3.88),
            ("Stan Waszyngton, Stany Zjednoczone Ameryki", 3.88),
            ("Stan Nowy Jork, Stany Zjednoczone Ameryki", 3.88),
            ("Inny stan, Stany Zjednoczone Ameryki", 3.88),
            ("USA", 3.88),
            ("Szwajcaria", 4.22),
            ("Francja", 4.58),
            ("Belgia", 4.58),
            ("Niemcy", 4.58),
            ("Czechy", 0.18),
            ("Wielka Brytania", 5.35),
            ("Dania", 1.62),
            ("Azja (waluta USD)", 3.88),
            ("Szwecja", 0.152055),
            ("Austria", 4.58),
            ("Hiszpania", 4.58),
            ("Holandia", 4.58),
            ("Irlandia", 4.58),
            ("wietnam", 0.00017),
        ];
        // "wietnam" and "Azja (waluta USD)" deliberately have no PPP entry.
        let ppp = [
            ("Polska", 1.764),
            ("Kalifornia, Stany Zjednoczone Ameryki", 1.0),
            ("Stan Waszyngton, Stany Zjednoczone Ameryki", 1.0),
            ("Stan Nowy Jork, Stany Zjednoczone Ameryki", 1.0),
            ("Inny stan, Stany Zjednoczone Ameryki", 1.0),
            ("USA", 1.0),
            ("Austria", 0.763),
            ("Belgia", 0.758),
            ("Czechy", 12.526),
            ("Dania", 6.656),
            ("Francja", 0.731),
            ("Niemcy", 0.743),
            ("Szwajcaria", 1.159),
            ("Wielka Brytania", 0.684),
            ("Hiszpania", 0.626),
            ("Holandia", 0.786),
            ("Irlandia", 0.807),
            ("Szwecja", 8.877),
        ];
        Self {
            reference_region: "Polska".to_string(),
            currency: currency
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            ppp: ppp.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            income: IncomeConfig::default(),
            grouping: GroupingConfig::default(),
            bucketing: BucketingConfig::default(),
        }
    }
}
