use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use tracing::{debug, instrument, trace};
use url::Url;

use crate::{
    error::OwmError,
    model::{CurrentWeather, Snapshot},
    query::{Coordinates, Query},
};

/// Current weather endpoint of the OpenWeatherMap 2.5 API.
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Anything that can resolve a [`Query`] into a [`Snapshot`].
#[async_trait]
pub trait WeatherLookup: Send + Sync + Debug {
    async fn lookup(&self, query: &Query) -> Result<Snapshot, OwmError>;
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    api_key: String,
    base_url: Url,
    http: Client,
}

impl WeatherClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, OwmError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: &str) -> Result<Self, OwmError> {
        Ok(Self {
            api_key: api_key.into(),
            base_url: Url::parse(base_url)?,
            http: Client::new(),
        })
    }

    /// Fully-qualified request URL for `query`, credential included.
    pub fn url_for(&self, query: &Query) -> Url {
        let mut url = self.base_url.clone();
        query.apply(&mut url);
        url.query_pairs_mut().append_pair("appid", &self.api_key);
        url
    }

    pub async fn by_city(&self, name: &str) -> Result<Snapshot, OwmError> {
        self.lookup(&Query::city(name)).await
    }

    pub async fn by_coordinates(&self, coord: Coordinates) -> Result<Snapshot, OwmError> {
        self.lookup(&Query::Coordinates(coord)).await
    }

    /// `country` falls back to `US` when absent.
    pub async fn by_zip_code(
        &self,
        code: &str,
        country: Option<&str>,
    ) -> Result<Snapshot, OwmError> {
        self.lookup(&Query::zip_code(code, country)).await
    }

    pub async fn by_city_id(&self, id: u64) -> Result<Snapshot, OwmError> {
        self.lookup(&Query::CityId(id)).await
    }

    async fn fetch(&self, query: &Query) -> Result<Snapshot, OwmError> {
        let url = self.url_for(query);
        trace!(%url, "requesting current weather");

        let res = self.http.get(url.clone()).send().await?;
        let status = res.status();
        let body = res.text().await?;
        debug!(%status, body = %truncate_body(&body), "OpenWeatherMap responded");

        if !status.is_success() {
            return Err(upstream_error(status, &body));
        }

        let parsed: CurrentWeather = serde_json::from_str(&body)?;
        Ok(Snapshot::new(url, parsed))
    }
}

#[async_trait]
impl WeatherLookup for WeatherClient {
    #[instrument(skip(self), level = "info")]
    async fn lookup(&self, query: &Query) -> Result<Snapshot, OwmError> {
        self.fetch(query).await
    }
}

/// Error body returned alongside non-success statuses.
#[derive(Debug, Deserialize)]
struct OwmErrorBody {
    cod: serde_json::Value,
    message: String,
}

fn upstream_error(status: reqwest::StatusCode, body: &str) -> OwmError {
    match serde_json::from_str::<OwmErrorBody>(body) {
        Ok(err) => {
            // `cod` is a number on some endpoints and a string on others.
            let code = match err.cod {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            OwmError::Upstream { code, message: err.message }
        }
        Err(_) => OwmError::Upstream {
            code: status.as_u16().to_string(),
            message: truncate_body(body),
        },
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TemperatureKind;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn body() -> serde_json::Value {
        serde_json::json!({
            "coord": {"lon": -0.1257, "lat": 51.5085},
            "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
            "main": {"temp": 290.15, "feels_like": 289.8, "temp_min": 288.71,
                     "temp_max": 291.48, "pressure": 1015, "humidity": 77},
            "wind": {"speed": 3.6, "deg": 250},
            "dt": 1700000000,
            "name": "London",
            "cod": 200
        })
    }

    fn client(server: &MockServer) -> WeatherClient {
        WeatherClient::with_base_url("TEST_KEY", &format!("{}/data/2.5/weather", server.uri()))
            .unwrap()
    }

    fn query_pairs(url: &Url) -> Vec<(String, String)> {
        url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect()
    }

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn url_for_each_query_has_selector_and_credential_only() {
        let client = WeatherClient::new("KEY").unwrap();

        let url = client.url_for(&Query::city("kogi"));
        assert!(url.as_str().starts_with(DEFAULT_BASE_URL));
        assert_eq!(query_pairs(&url), vec![pair("q", "kogi"), pair("appid", "KEY")]);

        let url = client.url_for(&Query::Coordinates(Coordinates::new(7.8, 6.7)));
        assert_eq!(
            query_pairs(&url),
            vec![pair("lat", "7.8"), pair("lon", "6.7"), pair("appid", "KEY")]
        );

        let url = client.url_for(&Query::zip_code("94040", None));
        assert_eq!(query_pairs(&url), vec![pair("zip", "94040,US"), pair("appid", "KEY")]);

        let url = client.url_for(&Query::CityId(2643743));
        assert_eq!(query_pairs(&url), vec![pair("id", "2643743"), pair("appid", "KEY")]);
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = WeatherClient::with_base_url("KEY", "not a url").unwrap_err();
        assert!(matches!(err, OwmError::InvalidBaseUrl(_)));
    }

    #[tokio::test]
    async fn by_city_returns_snapshot() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", "London"))
            .and(query_param("appid", "TEST_KEY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body()))
            .expect(1)
            .mount(&server)
            .await;

        let snap = client(&server).by_city("London").await.unwrap();

        assert_eq!(snap.temperature(TemperatureKind::Current).unwrap(), 290.15);
        assert_eq!(snap.temperature(TemperatureKind::Max).unwrap(), 291.48);
        assert_eq!(snap.condition_summary().unwrap(), ("Rain", "light rain"));
        assert_eq!(snap.longitude().unwrap(), -0.1257);
        assert_eq!(snap.latitude().unwrap(), 51.5085);
        assert_eq!(snap.pressure().unwrap(), 1015.0);
        assert_eq!(snap.humidity().unwrap(), 77.0);
        assert_eq!(snap.wind().unwrap(), (3.6, 250.0));
        assert_eq!(
            query_pairs(snap.request_url()),
            vec![pair("q", "London"), pair("appid", "TEST_KEY")]
        );
    }

    #[tokio::test]
    async fn other_lookups_send_their_selectors() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("lat", "51.5"))
            .and(query_param("lon", "-0.12"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("zip", "E14,GB"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("id", "2643743"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        client.by_coordinates(Coordinates::new(51.5, -0.12)).await.unwrap();
        client.by_zip_code("E14", Some("GB")).await.unwrap();
        client.by_city_id(2643743).await.unwrap();
    }

    #[tokio::test]
    async fn not_found_is_upstream_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "cod": 404,
                "message": "city not found"
            })))
            .mount(&server)
            .await;

        let err = client(&server).by_city("Atlantis").await.unwrap_err();

        assert!(err.is_upstream());
        assert_eq!(err.to_string(), "404 error - city not found");
    }

    #[tokio::test]
    async fn string_cod_is_kept_verbatim() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "cod": "401",
                "message": "Invalid API key."
            })))
            .mount(&server)
            .await;

        let err = client(&server).by_city_id(1).await.unwrap_err();
        assert_eq!(err.to_string(), "401 error - Invalid API key.");
    }

    #[tokio::test]
    async fn unparseable_error_body_falls_back_to_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = client(&server).by_city("London").await.unwrap_err();
        assert_eq!(err.to_string(), "502 error - Bad Gateway");
    }

    #[tokio::test]
    async fn malformed_success_body_is_transport_class() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client(&server).by_city("London").await.unwrap_err();
        assert!(matches!(err, OwmError::MalformedBody(_)));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        // Bind then drop a listener so the port is known to be closed.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let base_url = format!("http://127.0.0.1:{port}/weather");
        let client = WeatherClient::with_base_url("KEY", &base_url).unwrap();

        let err = client.by_city("London").await.unwrap_err();
        assert!(matches!(err, OwmError::Transport(_)));
    }

    #[test]
    fn truncate_body_limits_length() {
        let long = "x".repeat(250);
        let truncated = truncate_body(&long);
        assert_eq!(truncated.len(), 203);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncate_body("short"), "short");
    }
}
