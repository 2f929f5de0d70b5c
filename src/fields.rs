//! Question-field identifiers as they appear verbatim in the survey export,
//! plus the canonical categorical values the pipeline keys decisions on.

use once_cell::sync::Lazy;
use std::collections::HashMap;

// Survey question headers (CSV column names)
pub const COUNTRY: &str = "Kraj/stan zamieszkania";
pub const TOTAL_COMP: &str = "Łączne roczne zarobki w narodowej walucie tego kraju";
pub const BASE_COMP: &str = "Podstawowa roczna pensja w narodowej walucie tego kraju";
pub const GRADUATION_YEAR: &str = "Rok ukończenia ostatniego kierunku na wydziale MIM";
pub const EMPLOYMENT_KIND: &str = "Sposób zatrudnienia";
pub const WORK_HOURS: &str = "Liczba faktycznych godzin pracy w typowym tygodniu";
pub const DEGREE: &str = "Kierunek związany ze stopniem w poprzednim pytaniu";
pub const GENDER: &str = "Płeć";
pub const PROFESSION: &str = "Główny zawód wykonywany w 2019";
pub const HIGHEST_EDUCATION: &str = "Najwyższy stopień naukowy ogółem (jeśli inny niż powyżej)";
// Some exports carry this misspelled variant of the header above.
pub const HIGHEST_EDUCATION_LEGACY: &str =
    "Najwyższy stopień naukowy ogółem (jeśli inne niż powyżej)";
pub const FACULTY_EDUCATION: &str = "Najwyższy stopień naukowy uzyskany na wydziale MIM";
pub const COMPANY_SIZE: &str = "Liczba pracowników firmy/instytucji";
pub const CITY_SIZE: &str = "Liczba mieszkańców miejsca zamieszkania";
pub const SATISFACTION: &str =
    "W jakim stopniu studia na MIMie pomogły Ci w osiągnięciu obecnej kariery";
pub const TIMESTAMP: &str = "Timestamp";

// Employment-kind answers with filtering semantics
pub const UNEMPLOYED_SEEKING: &str = "bezrobotny szukający pracy";
pub const UNEMPLOYED_NOT_SEEKING: &str = "bezrobotny nieszukający pracy";

// Region labels
pub const USA_LABEL: &str = "USA";
/// Substring shared by every U.S.-state region answer.
pub const USA_STATE_MARKER: &str = "Stany Zjednoczone Ameryki";

/// Fixed low-to-high orders for ordinal grouping fields. Fields absent from
/// this catalog sort lexically.
static DEGREE_ORDER: [&str; 3] = ["licencjat", "magister", "doktor"];

static ORDINAL_ORDERS: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let mut orders: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
    orders.insert(HIGHEST_EDUCATION, &DEGREE_ORDER);
    orders
});

/// The fixed label order for an ordinal field, if it has one.
pub fn ordinal_order(field: &str) -> Option<&'static [&'static str]> {
    ORDINAL_ORDERS.get(field).copied()
}
