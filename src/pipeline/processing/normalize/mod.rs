use chrono::NaiveDateTime;
use std::collections::BTreeMap;

use crate::domain::{NormalizedResponse, RawResponse};
use crate::error::{Result, SurveyError};
use crate::fields;

const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// A declarative categorical rewrite: `field` answers equal to `from` become
/// `to`. Applied once during normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteRule {
    pub field: String,
    pub from: String,
    pub to: String,
}

/// The rewrite-rule table for known mis-keyed categorical values.
#[derive(Debug, Clone, Default)]
pub struct RewriteRules {
    rules: Vec<RewriteRule>,
}

impl RewriteRules {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The rules observed in the survey export: one misspelled region and
    /// three profession synonyms collapsed to their canonical answers.
    pub fn standard() -> Self {
        let mut rules = Self::default();
        rules.push(
            fields::COUNTRY,
            "Stan Washington, Stany Zjednoczone Ameryki",
            "Stan Waszyngton, Stany Zjednoczone Ameryki",
        );
        rules.push(
            fields::PROFESSION,
            "Korepetytor",
            "nauczyciel / prowadzący szkolenia",
        );
        rules.push(
            fields::PROFESSION,
            "devops/sysadmin/konfiguracja sieci - wszystko po trochu",
            "administrator sieci komputerowych",
        );
        rules.push(fields::PROFESSION, "doktorant", "pracownik akademicki");
        rules
    }

    pub fn push(&mut self, field: &str, from: &str, to: &str) {
        self.rules.push(RewriteRule {
            field: field.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    pub fn apply(&self, answers: &mut BTreeMap<String, String>) {
        for rule in &self.rules {
            if answers.get(&rule.field).is_some_and(|v| *v == rule.from) {
                answers.insert(rule.field.clone(), rule.to.clone());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Trait for repairing one raw response into its canonical, typed form.
pub trait Normalizer {
    fn normalize(&self, raw: &RawResponse) -> Result<NormalizedResponse>;
}

/// Default normalizer covering the repairs the survey export needs:
/// compensation backfill, education-field reconciliation, numeric and
/// timestamp typing, unemployed zero-fill, and the categorical rewrite table.
/// Idempotent; never removes a field.
pub struct DefaultNormalizer {
    rules: RewriteRules,
}

impl DefaultNormalizer {
    pub fn new() -> Self {
        Self {
            rules: RewriteRules::standard(),
        }
    }

    pub fn with_rules(rules: RewriteRules) -> Self {
        Self { rules }
    }

    /// Repairs the answers map. Every rule operates on text so the result can
    /// be fed back through without change.
    fn canonicalize(
        &self,
        row: usize,
        answers: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>> {
        let mut out = answers.clone();

        // Missing total compensation falls back to the base salary.
        if out.get(fields::TOTAL_COMP).map_or(true, String::is_empty) {
            let base = out.get(fields::BASE_COMP).cloned().unwrap_or_default();
            if !base.is_empty() {
                out.insert(fields::TOTAL_COMP.to_string(), base);
            }
        }

        // Reconcile the misspelled highest-education header. Conflicting
        // non-empty values under both headers cannot be repaired.
        let legacy = out
            .get(fields::HIGHEST_EDUCATION_LEGACY)
            .cloned()
            .unwrap_or_default();
        if !legacy.is_empty() {
            let canonical = out
                .get(fields::HIGHEST_EDUCATION)
                .cloned()
                .unwrap_or_default();
            if !canonical.is_empty() && canonical != legacy {
                return Err(SurveyError::ConflictingFields {
                    row,
                    canonical: fields::HIGHEST_EDUCATION.to_string(),
                    legacy: fields::HIGHEST_EDUCATION_LEGACY.to_string(),
                });
            }
            out.insert(fields::HIGHEST_EDUCATION.to_string(), legacy);
        }

        // The faculty-level degree backfills the overall one when absent.
        let faculty = out
            .get(fields::FACULTY_EDUCATION)
            .cloned()
            .unwrap_or_default();
        if !faculty.is_empty()
            && out
                .get(fields::HIGHEST_EDUCATION)
                .map_or(true, String::is_empty)
        {
            out.insert(fields::HIGHEST_EDUCATION.to_string(), faculty);
        }

        // Respondents seeking work have no income by definition, whatever
        // figure they supplied.
        if out.get(fields::EMPLOYMENT_KIND).map(String::as_str)
            == Some(fields::UNEMPLOYED_SEEKING)
        {
            out.insert(fields::TOTAL_COMP.to_string(), "0".to_string());
        }

        self.rules.apply(&mut out);

        Ok(out)
    }

    fn parse_number(row: usize, field: &str, value: &str) -> Result<Option<f64>> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }
        let parsed: f64 = value.parse().map_err(|_| SurveyError::InvalidNumber {
            row,
            field: field.to_string(),
            value: value.to_string(),
        })?;
        if !parsed.is_finite() || parsed < 0.0 {
            return Err(SurveyError::InvalidNumber {
                row,
                field: field.to_string(),
                value: value.to_string(),
            });
        }
        Ok(Some(parsed))
    }

    fn parse_timestamp(row: usize, value: &str) -> Result<Option<NaiveDateTime>> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }
        NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
            .map(Some)
            .map_err(|_| SurveyError::InvalidTimestamp {
                row,
                value: value.to_string(),
            })
    }
}

impl Default for DefaultNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer for DefaultNormalizer {
    fn normalize(&self, raw: &RawResponse) -> Result<NormalizedResponse> {
        let answers = self.canonicalize(raw.row, &raw.answers)?;

        let total_comp = Self::parse_number(
            raw.row,
            fields::TOTAL_COMP,
            answers.get(fields::TOTAL_COMP).map_or("", String::as_str),
        )?;
        let base_comp = Self::parse_number(
            raw.row,
            fields::BASE_COMP,
            answers.get(fields::BASE_COMP).map_or("", String::as_str),
        )?;
        let work_hours = Self::parse_number(
            raw.row,
            fields::WORK_HOURS,
            answers.get(fields::WORK_HOURS).map_or("", String::as_str),
        )?;
        let submitted_at = Self::parse_timestamp(
            raw.row,
            answers.get(fields::TIMESTAMP).map_or("", String::as_str),
        )?;

        Ok(NormalizedResponse {
            row: raw.row,
            answers,
            total_comp,
            base_comp,
            work_hours,
            submitted_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(entries: &[(&str, &str)]) -> RawResponse {
        RawResponse::new(
            1,
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn total_comp_backfills_from_base() {
        let normalizer = DefaultNormalizer::new();
        let record = normalizer
            .normalize(&raw(&[
                (fields::TOTAL_COMP, ""),
                (fields::BASE_COMP, "90000"),
            ]))
            .unwrap();
        assert_eq!(record.answer(fields::TOTAL_COMP), "90000");
        assert_eq!(record.total_comp, Some(90_000.0));
        assert_eq!(record.base_comp, Some(90_000.0));
    }

    #[test]
    fn supplied_total_comp_is_not_overwritten() {
        let normalizer = DefaultNormalizer::new();
        let record = normalizer
            .normalize(&raw(&[
                (fields::TOTAL_COMP, "120000"),
                (fields::BASE_COMP, "90000"),
            ]))
            .unwrap();
        assert_eq!(record.total_comp, Some(120_000.0));
    }

    #[test]
    fn legacy_education_header_moves_to_canonical() {
        let normalizer = DefaultNormalizer::new();
        let record = normalizer
            .normalize(&raw(&[(fields::HIGHEST_EDUCATION_LEGACY, "doktor")]))
            .unwrap();
        assert_eq!(record.answer(fields::HIGHEST_EDUCATION), "doktor");
        // The legacy key survives; no field is ever deleted.
        assert_eq!(record.answer(fields::HIGHEST_EDUCATION_LEGACY), "doktor");
    }

    #[test]
    fn conflicting_education_headers_are_fatal() {
        let normalizer = DefaultNormalizer::new();
        let err = normalizer
            .normalize(&raw(&[
                (fields::HIGHEST_EDUCATION, "magister"),
                (fields::HIGHEST_EDUCATION_LEGACY, "doktor"),
            ]))
            .unwrap_err();
        assert!(matches!(err, SurveyError::ConflictingFields { row: 1, .. }));
    }

    #[test]
    fn equal_education_headers_are_not_a_conflict() {
        let normalizer = DefaultNormalizer::new();
        let record = normalizer
            .normalize(&raw(&[
                (fields::HIGHEST_EDUCATION, "doktor"),
                (fields::HIGHEST_EDUCATION_LEGACY, "doktor"),
            ]))
            .unwrap();
        assert_eq!(record.answer(fields::HIGHEST_EDUCATION), "doktor");
    }

    #[test]
    fn faculty_education_backfills_empty_overall() {
        let normalizer = DefaultNormalizer::new();
        let record = normalizer
            .normalize(&raw(&[
                (fields::FACULTY_EDUCATION, "magister"),
                (fields::HIGHEST_EDUCATION, ""),
            ]))
            .unwrap();
        assert_eq!(record.answer(fields::HIGHEST_EDUCATION), "magister");
    }

    #[test]
    fn faculty_education_does_not_override_overall() {
        let normalizer = DefaultNormalizer::new();
        let record = normalizer
            .normalize(&raw(&[
                (fields::FACULTY_EDUCATION, "magister"),
                (fields::HIGHEST_EDUCATION, "doktor"),
            ]))
            .unwrap();
        assert_eq!(record.answer(fields::HIGHEST_EDUCATION), "doktor");
    }

    #[test]
    fn unemployed_seeking_work_is_zero_filled() {
        let normalizer = DefaultNormalizer::new();
        let record = normalizer
            .normalize(&raw(&[
                (fields::EMPLOYMENT_KIND, fields::UNEMPLOYED_SEEKING),
                (fields::TOTAL_COMP, "50000"),
            ]))
            .unwrap();
        assert_eq!(record.total_comp, Some(0.0));
        assert_eq!(record.answer(fields::TOTAL_COMP), "0");
    }

    #[test]
    fn standard_rewrites_fix_known_miskeys() {
        let normalizer = DefaultNormalizer::new();
        let record = normalizer
            .normalize(&raw(&[
                (fields::COUNTRY, "Stan Washington, Stany Zjednoczone Ameryki"),
                (fields::PROFESSION, "doktorant"),
            ]))
            .unwrap();
        assert_eq!(
            record.answer(fields::COUNTRY),
            "Stan Waszyngton, Stany Zjednoczone Ameryki"
        );
        assert_eq!(record.answer(fields::PROFESSION), "pracownik akademicki");
    }

    #[test]
    fn single_rewrite_rule_applies_in_isolation() {
        let mut rules = RewriteRules::empty();
        rules.push(
            fields::PROFESSION,
            "Korepetytor",
            "nauczyciel / prowadzący szkolenia",
        );
        let normalizer = DefaultNormalizer::with_rules(rules);
        let record = normalizer
            .normalize(&raw(&[(fields::PROFESSION, "Korepetytor")]))
            .unwrap();
        assert_eq!(
            record.answer(fields::PROFESSION),
            "nauczyciel / prowadzący szkolenia"
        );
    }

    #[test]
    fn non_numeric_compensation_is_fatal() {
        let normalizer = DefaultNormalizer::new();
        let err = normalizer
            .normalize(&raw(&[(fields::TOTAL_COMP, "sto tysięcy")]))
            .unwrap_err();
        assert!(matches!(err, SurveyError::InvalidNumber { .. }));
    }

    #[test]
    fn negative_compensation_is_fatal() {
        let normalizer = DefaultNormalizer::new();
        let err = normalizer
            .normalize(&raw(&[(fields::TOTAL_COMP, "-1000")]))
            .unwrap_err();
        assert!(matches!(err, SurveyError::InvalidNumber { .. }));
    }

    #[test]
    fn empty_numeric_fields_stay_empty() {
        let normalizer = DefaultNormalizer::new();
        let record = normalizer
            .normalize(&raw(&[(fields::TOTAL_COMP, ""), (fields::WORK_HOURS, "")]))
            .unwrap();
        assert_eq!(record.total_comp, None);
        assert_eq!(record.work_hours, None);
    }

    #[test]
    fn timestamp_parses_survey_format() {
        let normalizer = DefaultNormalizer::new();
        let record = normalizer
            .normalize(&raw(&[(fields::TIMESTAMP, "17/07/2021 14:30:00")]))
            .unwrap();
        let ts = record.submitted_at.unwrap();
        assert_eq!(ts.format("%Y-%m-%d %H:%M").to_string(), "2021-07-17 14:30");
    }

    #[test]
    fn malformed_timestamp_is_fatal() {
        let normalizer = DefaultNormalizer::new();
        let err = normalizer
            .normalize(&raw(&[(fields::TIMESTAMP, "2021-07-17")]))
            .unwrap_err();
        assert!(matches!(err, SurveyError::InvalidTimestamp { .. }));
    }

    #[test]
    fn unknown_fields_pass_through_unchanged() {
        let normalizer = DefaultNormalizer::new();
        let record = normalizer
            .normalize(&raw(&[("Ulubiony kolor", "zielony")]))
            .unwrap();
        assert_eq!(record.answer("Ulubiony kolor"), "zielony");
    }

    #[test]
    fn normalization_is_idempotent() {
        let normalizer = DefaultNormalizer::new();
        let first = normalizer
            .normalize(&raw(&[
                (fields::TOTAL_COMP, ""),
                (fields::BASE_COMP, "90000"),
                (fields::FACULTY_EDUCATION, "magister"),
                (fields::HIGHEST_EDUCATION_LEGACY, "doktor"),
                (fields::EMPLOYMENT_KIND, fields::UNEMPLOYED_SEEKING),
                (fields::COUNTRY, "Stan Washington, Stany Zjednoczone Ameryki"),
                (fields::WORK_HOURS, "38.5"),
                (fields::TIMESTAMP, "17/07/2021 09:15:22"),
            ]))
            .unwrap();
        let second = normalizer
            .normalize(&RawResponse::new(first.row, first.answers.clone()))
            .unwrap();
        assert_eq!(first, second);
    }
}
