use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use url::Url;

use crate::{error::OwmError, query::Coordinates};

/// Which of the three temperatures in `main` to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemperatureKind {
    #[default]
    Current,
    Max,
    Min,
}

impl FromStr for TemperatureKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "current" | "temp" => Ok(TemperatureKind::Current),
            "max" | "temp_max" => Ok(TemperatureKind::Max),
            "min" | "temp_min" => Ok(TemperatureKind::Min),
            _ => Err(format!(
                "Unknown temperature kind '{s}'. Supported kinds: current, max, min."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MainReadings {
    pub temp: Option<f64>,
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
    pub pressure: Option<f64>,
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub main: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Wind {
    /// Metres per second unless the request asked for other units.
    pub speed: Option<f64>,
    /// Meteorological degrees. Omitted by the provider in calm conditions.
    pub deg: Option<f64>,
}

/// Decoded body of a current-weather response. Only the consumed fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub coord: Option<Coordinates>,
    #[serde(default)]
    pub weather: Vec<Condition>,
    pub main: Option<MainReadings>,
    pub wind: Option<Wind>,
    pub name: Option<String>,
    pub dt: Option<i64>,
}

/// The result of one lookup: the decoded body and the URL that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    request_url: Url,
    body: CurrentWeather,
}

impl Snapshot {
    pub fn new(request_url: Url, body: CurrentWeather) -> Self {
        Self { request_url, body }
    }

    pub fn request_url(&self) -> &Url {
        &self.request_url
    }

    pub fn body(&self) -> &CurrentWeather {
        &self.body
    }

    pub fn temperature(&self, kind: TemperatureKind) -> Result<f64, OwmError> {
        let main = self.main()?;
        let (value, field) = match kind {
            TemperatureKind::Current => (main.temp, "main.temp"),
            TemperatureKind::Max => (main.temp_max, "main.temp_max"),
            TemperatureKind::Min => (main.temp_min, "main.temp_min"),
        };
        value.ok_or(OwmError::NoData { field })
    }

    /// `(main condition, description)` of the first reported condition.
    pub fn condition_summary(&self) -> Result<(&str, &str), OwmError> {
        let first = self
            .body
            .weather
            .first()
            .ok_or(OwmError::NoData { field: "weather" })?;
        Ok((first.main.as_str(), first.description.as_str()))
    }

    pub fn coordinates(&self) -> Result<Coordinates, OwmError> {
        self.body.coord.ok_or(OwmError::NoData { field: "coord" })
    }

    pub fn longitude(&self) -> Result<f64, OwmError> {
        self.coordinates().map(|c| c.lon)
    }

    pub fn latitude(&self) -> Result<f64, OwmError> {
        self.coordinates().map(|c| c.lat)
    }

    /// Atmospheric pressure in hPa.
    pub fn pressure(&self) -> Result<f64, OwmError> {
        self.main()?.pressure.ok_or(OwmError::NoData { field: "main.pressure" })
    }

    /// Relative humidity in percent.
    pub fn humidity(&self) -> Result<f64, OwmError> {
        self.main()?.humidity.ok_or(OwmError::NoData { field: "main.humidity" })
    }

    /// `(speed, direction in degrees)`.
    pub fn wind(&self) -> Result<(f64, f64), OwmError> {
        let speed = self.wind_speed()?;
        let deg = self.raw_wind()?.deg.ok_or(OwmError::NoData { field: "wind.deg" })?;
        Ok((speed, deg))
    }

    pub fn wind_speed(&self) -> Result<f64, OwmError> {
        self.raw_wind()?.speed.ok_or(OwmError::NoData { field: "wind.speed" })
    }

    pub fn location_name(&self) -> Option<&str> {
        self.body.name.as_deref().filter(|n| !n.is_empty())
    }

    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        self.body.dt.and_then(|ts| DateTime::from_timestamp(ts, 0))
    }

    fn main(&self) -> Result<&MainReadings, OwmError> {
        self.body.main.as_ref().ok_or(OwmError::NoData { field: "main" })
    }

    fn raw_wind(&self) -> Result<&Wind, OwmError> {
        self.body.wind.as_ref().ok_or(OwmError::NoData { field: "wind" })
    }
}
