use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use url::Url;

/// Country appended to zip code lookups when none is given.
pub const DEFAULT_COUNTRY_CODE: &str = "US";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid coordinates '{input}': expected \"(lat,lon)\", e.g. \"(6.52,3.37)\"")]
pub struct ParseCoordinatesError {
    input: String,
}

impl FromStr for Coordinates {
    type Err = ParseCoordinatesError;

    /// Accepts `(lat,lon)`, `lat,lon` and whitespace around either number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCoordinatesError { input: s.to_string() };

        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(trimmed);

        let (lat, lon) = inner.split_once(',').ok_or_else(err)?;
        let lat: f64 = lat.trim().parse().map_err(|_| err())?;
        let lon: f64 = lon.trim().parse().map_err(|_| err())?;

        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(err());
        }

        Ok(Self { lat, lon })
    }
}

/// Which location a current-weather lookup targets.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    City(String),
    Coordinates(Coordinates),
    ZipCode { code: String, country: String },
    CityId(u64),
}

impl Query {
    pub fn city(name: impl Into<String>) -> Self {
        Self::City(name.into())
    }

    pub fn zip_code(code: impl Into<String>, country: Option<&str>) -> Self {
        Self::ZipCode {
            code: code.into(),
            country: country.unwrap_or(DEFAULT_COUNTRY_CODE).to_string(),
        }
    }

    /// Append this query's selector parameters to `url`.
    pub fn apply(&self, url: &mut Url) {
        let mut pairs = url.query_pairs_mut();
        match self {
            Query::City(name) => {
                pairs.append_pair("q", name);
            }
            Query::Coordinates(c) => {
                pairs.append_pair("lat", &c.lat.to_string());
                pairs.append_pair("lon", &c.lon.to_string());
            }
            Query::ZipCode { code, country } => {
                pairs.append_pair("zip", &format!("{code},{country}"));
            }
            Query::CityId(id) => {
                pairs.append_pair("id", &id.to_string());
            }
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::City(name) => write!(f, "city '{name}'"),
            Query::Coordinates(c) => write!(f, "coordinates ({}, {})", c.lat, c.lon),
            Query::ZipCode { code, country } => write!(f, "zip code {code},{country}"),
            Query::CityId(id) => write!(f, "city id {id}"),
        }
    }
}
