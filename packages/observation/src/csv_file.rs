//! CSV observation loader.
//!
//! Expects a header row containing at least
//! `city,province,date,sales,flu_cases,population,land_area`. Extra columns
//! are ignored. Rows that fail to parse are logged and skipped rather than
//! failing the whole load.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use flu_risk_observation_models::{Observation, Province};
use serde::Deserialize;

use crate::ObservationError;
use crate::parsing::parse_observation_date;

/// Columns every observation CSV must provide.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "city",
    "province",
    "date",
    "sales",
    "flu_cases",
    "population",
    "land_area",
];

/// A CSV record before province and date are interpreted.
#[derive(Debug, Deserialize)]
struct CsvRow {
    city: String,
    province: String,
    date: String,
    sales: u64,
    flu_cases: u64,
    population: u64,
    land_area: f64,
}

impl CsvRow {
    fn into_observation(self, line: u64) -> Result<Observation, ObservationError> {
        let province =
            Province::from_code(&self.province).map_err(|e| ObservationError::InvalidRow {
                line,
                message: e.to_string(),
            })?;
        let date =
            parse_observation_date(&self.date).ok_or_else(|| ObservationError::InvalidRow {
                line,
                message: format!("unparseable date '{}'", self.date),
            })?;

        Ok(Observation {
            city: self.city,
            province,
            date,
            sales: self.sales,
            flu_cases: self.flu_cases,
            population: self.population,
            land_area: self.land_area,
        })
    }
}

/// Parses observations from any CSV reader.
///
/// # Errors
///
/// Returns [`ObservationError`] if the header row cannot be read or a
/// required column is missing. Individual malformed rows are skipped.
pub fn load_observations<R: Read>(reader: R) -> Result<Vec<Observation>, ObservationError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == *column) {
            return Err(ObservationError::MissingColumn {
                column: (*column).to_string(),
            });
        }
    }

    let mut rows = Vec::new();
    let mut skipped: u64 = 0;

    for (line, record) in (2_u64..).zip(reader.deserialize::<CsvRow>()) {
        match record
            .map_err(ObservationError::from)
            .and_then(|row| row.into_observation(line))
        {
            Ok(observation) => rows.push(observation),
            Err(e) => {
                skipped += 1;
                log::warn!("Skipping observation row: {e}");
            }
        }
    }

    if skipped > 0 {
        log::warn!("Skipped {skipped} malformed observation rows");
    }
    log::debug!("Parsed {} observation rows", rows.len());

    Ok(rows)
}

/// Loads observations from a CSV file on disk.
///
/// # Errors
///
/// Returns [`ObservationError`] if the file cannot be opened or its header
/// is invalid.
pub fn load_csv_file(path: &Path) -> Result<Vec<Observation>, ObservationError> {
    log::debug!("Reading observations from {}", path.display());
    let file = File::open(path)?;
    load_observations(file)
}
