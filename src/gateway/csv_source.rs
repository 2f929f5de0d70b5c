use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::domain::RawResponse;
use crate::error::Result;
use crate::gateway::ResponseSource;

/// Reads respondent rows from a survey CSV export, keyed by its header row.
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ResponseSource for CsvFileSource {
    fn fetch(&self) -> Result<Vec<RawResponse>> {
        let reader = csv::Reader::from_path(&self.path)?;
        read_responses(reader)
    }
}

/// Shared reader logic so tests and other adapters can feed from any stream.
pub fn read_responses<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<RawResponse>> {
    let headers = reader.headers()?.clone();
    let mut responses = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let answers: BTreeMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();
        // Row numbers match the spreadsheet view: header is row 1.
        responses.push(RawResponse::new(index + 2, answers));
    }
    Ok(responses)
}
