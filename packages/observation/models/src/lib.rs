#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Observation row types and province codes.
//!
//! An [`Observation`] is one day of pharmacy sales and reported flu cases
//! for a single city. Rows are produced by an observation store (CSV file,
//! table, API) and are never mutated by the scoring engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Canadian province and territory codes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Province {
    /// Alberta
    Ab,
    /// British Columbia
    Bc,
    /// Manitoba
    Mb,
    /// New Brunswick
    Nb,
    /// Newfoundland and Labrador
    Nl,
    /// Nova Scotia
    Ns,
    /// Northwest Territories
    Nt,
    /// Nunavut
    Nu,
    /// Ontario
    On,
    /// Prince Edward Island
    Pe,
    /// Quebec
    Qc,
    /// Saskatchewan
    Sk,
    /// Yukon
    Yt,
}

impl Province {
    /// Parses a two-letter province code, ignoring case and surrounding
    /// whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is not one of the 13 province and
    /// territory codes.
    pub fn from_code(code: &str) -> Result<Self, UnknownProvinceError> {
        code.trim().parse().map_err(|_| UnknownProvinceError {
            code: code.to_string(),
        })
    }

    /// Returns the full English name of the province or territory.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ab => "Alberta",
            Self::Bc => "British Columbia",
            Self::Mb => "Manitoba",
            Self::Nb => "New Brunswick",
            Self::Nl => "Newfoundland and Labrador",
            Self::Ns => "Nova Scotia",
            Self::Nt => "Northwest Territories",
            Self::Nu => "Nunavut",
            Self::On => "Ontario",
            Self::Pe => "Prince Edward Island",
            Self::Qc => "Quebec",
            Self::Sk => "Saskatchewan",
            Self::Yt => "Yukon",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Ab,
            Self::Bc,
            Self::Mb,
            Self::Nb,
            Self::Nl,
            Self::Ns,
            Self::Nt,
            Self::Nu,
            Self::On,
            Self::Pe,
            Self::Qc,
            Self::Sk,
            Self::Yt,
        ]
    }
}

/// Error returned when a string is not a recognized province code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProvinceError {
    /// The code that failed to parse.
    pub code: String,
}

impl std::fmt::Display for UnknownProvinceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown province code '{}'", self.code)
    }
}

impl std::error::Error for UnknownProvinceError {}

/// One day of observations for a single city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    /// City name as it appears in the source (e.g. "Toronto").
    pub city: String,
    /// Province the city belongs to.
    pub province: Province,
    /// Calendar date of the observation.
    pub date: NaiveDate,
    /// Flu-related pharmacy sales on that date.
    pub sales: u64,
    /// Reported flu cases on that date.
    pub flu_cases: u64,
    /// City population.
    pub population: u64,
    /// City land area in square kilometres.
    pub land_area: f64,
}

impl Observation {
    /// Whether the row can take part in per-capita and per-area arithmetic.
    ///
    /// Rows with a zero population or a non-positive (or non-finite) land
    /// area are excluded from every aggregate.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.population > 0 && self.land_area.is_finite() && self.land_area > 0.0
    }

    /// Canonical lookup key for this row's city.
    #[must_use]
    pub fn city_key(&self) -> String {
        city_key(&self.city)
    }

    /// Case-insensitive city match.
    #[must_use]
    pub fn is_city(&self, key: &str) -> bool {
        self.city.trim().eq_ignore_ascii_case(key.trim())
    }
}

/// Normalizes a city name into the identifier used for lookups and output
/// keys (trimmed, lower-case).
#[must_use]
pub fn city_key(city: &str) -> String {
    city.trim().to_lowercase()
}
