use anyhow::{Context, Result, bail};
use clap::{ArgGroup, Parser};
use owm_core::{
    Config, Coordinates, Credentials, Query, WeatherClient, WeatherLookup, resolve_api_key,
};
use std::{io::Write, path::PathBuf};
use tracing::{debug, info};

use crate::output::{Fields, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "owm",
    version,
    about = "Collect current weather readings from OpenWeatherMap"
)]
#[command(group(
    ArgGroup::new("lookup").args(["by_city", "by_coord", "by_zipcode", "by_city_id"])
))]
pub struct Cli {
    /// Save the API key for future runs
    #[arg(short = 's', long = "save")]
    pub save_key: bool,

    /// API key to access the OpenWeatherMap API
    #[arg(short = 'k', long = "key", value_name = "KEY")]
    pub api_key: Option<String>,

    /// Credential file to read and write (defaults to ./credentials.json)
    #[arg(long, value_name = "PATH")]
    pub credentials: Option<PathBuf>,

    /// Name of the city to look up
    #[arg(long = "by_city", value_name = "CITY")]
    pub by_city: Option<String>,

    /// Coordinates to look up, e.g. "(6.52,3.37)"
    #[arg(long = "by_coord", value_name = "(LAT,LON)", allow_hyphen_values = true)]
    pub by_coord: Option<Coordinates>,

    /// Zip code of the place to look up
    #[arg(long = "by_zipcode", value_name = "ZIP")]
    pub by_zipcode: Option<String>,

    /// Country code for --by_zipcode (defaults to US)
    #[arg(
        long,
        value_name = "CODE",
        requires = "by_zipcode",
        conflicts_with_all = ["by_city", "by_coord", "by_city_id"]
    )]
    pub country: Option<String>,

    /// City ID of the place to look up
    #[arg(long = "by_city_id", value_name = "ID")]
    pub by_city_id: Option<u64>,

    #[command(flatten)]
    pub fields: Fields,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;
        let base_url = config.base_url().to_string();

        let connect = move |api_key: String| -> Result<Box<dyn WeatherLookup>> {
            Ok(Box::new(WeatherClient::with_base_url(api_key, &base_url)?))
        };

        let mut stdout = std::io::stdout().lock();
        self.execute(&config, connect, &mut stdout).await
    }

    /// Save, resolve the credential, then run at most one lookup through `connect`.
    pub async fn execute<F>(self, config: &Config, connect: F, out: &mut impl Write) -> Result<()>
    where
        F: FnOnce(String) -> Result<Box<dyn WeatherLookup>>,
    {
        let creds_path = self.credentials.clone().unwrap_or_else(|| config.credentials_path());

        let api_key = if self.save_key {
            let entered = match &self.api_key {
                Some(key) => key.clone(),
                None => prompt_api_key()?,
            };
            // A blank key is rejected before the credentials file is touched.
            let key = resolve_api_key(Some(&entered), None)?;
            Credentials::new(key.as_str()).save(&creds_path)?;
            info!(path = %creds_path.display(), "API key saved");
            writeln!(out, "API key saved to {}", creds_path.display())?;
            key
        } else {
            let explicit = self.api_key.as_deref().filter(|key| !key.trim().is_empty());
            let persisted = match explicit {
                Some(_) => None,
                None => Credentials::load(&creds_path)?,
            };
            resolve_api_key(explicit, persisted.as_ref())?
        };

        let Some(query) = self.query(config) else {
            if self.save_key {
                return Ok(());
            }
            bail!(
                "No lookup selected.\n\
                 Hint: pass one of --by_city, --by_coord, --by_zipcode or --by_city_id."
            );
        };

        debug!(%query, "looking up current weather");
        let client = connect(api_key)?;
        let snapshot = client.lookup(&query).await?;

        for line in render(&snapshot, self.fields)? {
            writeln!(out, "{line}")?;
        }

        Ok(())
    }

    /// The lookup selected on the command line, if any.
    pub fn query(&self, config: &Config) -> Option<Query> {
        if let Some(city) = &self.by_city {
            return Some(Query::city(city.as_str()));
        }
        if let Some(coord) = self.by_coord {
            return Some(Query::Coordinates(coord));
        }
        if let Some(code) = &self.by_zipcode {
            let country = self.country.as_deref().unwrap_or(config.default_country());
            return Some(Query::zip_code(code.as_str(), Some(country)));
        }
        self.by_city_id.map(Query::CityId)
    }
}

fn prompt_api_key() -> Result<String> {
    inquire::Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")
}
