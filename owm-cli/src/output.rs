//! Human-friendly rendering of a snapshot, one field per line.

use chrono::Local;
use clap::Args;
use owm_core::{OwmError, Snapshot, TemperatureKind};

/// Which fields of the snapshot to print.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Args)]
pub struct Fields {
    /// Print every field below (except --url)
    #[arg(long)]
    pub all: bool,

    /// Weather condition and its description
    #[arg(long)]
    pub weather: bool,

    /// Current, maximum and minimum temperature
    #[arg(long)]
    pub temp: bool,

    /// Coordinates of the location as (lon, lat)
    #[arg(long)]
    pub coord: bool,

    /// Longitude of the location
    #[arg(long)]
    pub lon: bool,

    /// Latitude of the location
    #[arg(long)]
    pub lat: bool,

    /// Atmospheric pressure in hPa
    #[arg(long)]
    pub pressure: bool,

    /// Relative humidity in percent
    #[arg(long)]
    pub humidity: bool,

    /// Wind speed (m/s) and direction (degrees)
    #[arg(long)]
    pub wind: bool,

    /// The request URL (contains the API key)
    #[arg(long)]
    pub url: bool,
}

impl Fields {
    fn none_selected(&self) -> bool {
        *self == Self::default()
    }

    /// With nothing selected, fall back to a short summary.
    fn effective(self) -> Self {
        if self.none_selected() {
            Self { weather: true, temp: true, ..Self::default() }
        } else if self.all {
            Self {
                weather: true,
                temp: true,
                coord: true,
                lon: true,
                lat: true,
                pressure: true,
                humidity: true,
                wind: true,
                ..self
            }
        } else {
            self
        }
    }
}

pub fn render(snapshot: &Snapshot, fields: Fields) -> Result<Vec<String>, OwmError> {
    let fields = fields.effective();
    let mut lines = Vec::new();

    if fields.all {
        if let Some(name) = snapshot.location_name() {
            lines.push(format!("location: {name}"));
        }
        if let Some(at) = snapshot.observed_at() {
            let local = at.with_timezone(&Local);
            lines.push(format!("observed: {}", local.format("%Y-%m-%d %H:%M:%S %Z")));
        }
    }
    if fields.weather {
        let (main, description) = snapshot.condition_summary()?;
        lines.push(format!("weather: {main} ({description})"));
    }
    if fields.temp {
        lines.push(format!(
            "temperature: {} (max {}, min {})",
            snapshot.temperature(TemperatureKind::Current)?,
            snapshot.temperature(TemperatureKind::Max)?,
            snapshot.temperature(TemperatureKind::Min)?,
        ));
    }
    if fields.coord {
        let c = snapshot.coordinates()?;
        lines.push(format!("coordinates: ({}, {})", c.lon, c.lat));
    }
    if fields.lon {
        lines.push(format!("longitude: {}", snapshot.longitude()?));
    }
    if fields.lat {
        lines.push(format!("latitude: {}", snapshot.latitude()?));
    }
    if fields.pressure {
        lines.push(format!("pressure: {} hPa", snapshot.pressure()?));
    }
    if fields.humidity {
        lines.push(format!("humidity: {}%", snapshot.humidity()?));
    }
    if fields.wind {
        let speed = snapshot.wind_speed()?;
        match snapshot.wind() {
            Ok((_, deg)) => lines.push(format!("wind: {speed} m/s at {deg}°")),
            Err(OwmError::NoData { field: "wind.deg" }) => lines.push(format!("wind: {speed} m/s")),
            Err(err) => return Err(err),
        }
    }
    if fields.url {
        lines.push(format!("url: {}", snapshot.request_url()));
    }

    Ok(lines)
}
