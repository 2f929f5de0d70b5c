//! Adapters that supply respondent rows to the pipeline core. The core only
//! sees field-name -> value maps; wire formats stay on this side of the seam.

pub mod csv_source;

pub use csv_source::CsvFileSource;

use crate::domain::RawResponse;
use crate::error::Result;

/// A source of already-parsed respondent rows, one per respondent, keyed by
/// the verbatim question headers.
pub trait ResponseSource {
    fn fetch(&self) -> Result<Vec<RawResponse>>;
}
