//! Core library for the `owm` CLI.
//!
//! This crate defines:
//! - Lookup queries and request URL building
//! - The current-weather HTTP client
//! - The weather snapshot model and its accessors
//! - Credential persistence and settings handling
//!
//! It is used by `owm-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod model;
pub mod query;

pub use client::{WeatherClient, WeatherLookup};
pub use config::Config;
pub use credentials::{Credentials, resolve_api_key};
pub use error::OwmError;
pub use model::{Condition, CurrentWeather, MainReadings, Snapshot, TemperatureKind, Wind};
pub use query::{Coordinates, ParseCoordinatesError, Query};
