use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    model::{
        LookupError, SpeedUnit, WeatherQuery, WeatherResult, WindSpeed, celsius_to_fahrenheit,
        finite, humidity_pct, non_blank, required_finite,
    },
    provider::{ProviderId, error_message},
};

use super::WeatherProvider;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Current-conditions lookup against the OpenWeather REST API.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_http(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    fn normalize(query: &WeatherQuery, parsed: OwCurrentResponse) -> Result<WeatherResult, LookupError> {
        let city = non_blank(parsed.name).ok_or_else(|| LookupError::not_found(query))?;

        let main = parsed.main.ok_or_else(|| {
            LookupError::ProviderFailure("OpenWeather response is missing 'main'".to_string())
        })?;
        let temperature_celsius = required_finite(main.temp, "main.temp")?;
        let humidity_pct = humidity_pct(main.humidity)?;
        let wind = required_finite(parsed.wind.and_then(|w| w.speed), "wind.speed")?;

        let first = parsed.weather.into_iter().next();
        let condition = first
            .as_ref()
            .and_then(|w| non_blank(w.main.clone()))
            .unwrap_or_else(|| "Unknown".to_string());
        let description = first
            .as_ref()
            .and_then(|w| non_blank(w.description.clone()))
            .unwrap_or_else(|| condition.clone());
        let icon = first.and_then(|w| non_blank(w.icon));

        let offset = parsed.timezone.and_then(FixedOffset::east_opt);
        let sys = parsed.sys.unwrap_or_default();

        Ok(WeatherResult {
            provider: ProviderId::OpenWeather,
            city,
            country: non_blank(sys.country),
            temperature_celsius,
            temperature_fahrenheit: Some(celsius_to_fahrenheit(temperature_celsius)),
            feels_like_celsius: finite(main.feels_like),
            condition,
            description,
            humidity_pct,
            wind_speed: WindSpeed::new(wind, SpeedUnit::MetersPerSecond),
            visibility_km: finite(parsed.visibility).map(|m| m / 1000.0),
            pressure_hpa: finite(main.pressure),
            uv_index: None,
            sunrise: sys.sunrise.and_then(|ts| local_clock(ts, offset)),
            sunset: sys.sunset.and_then(|ts| local_clock(ts, offset)),
            icon,
            observed_at: parsed.dt.and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: Option<f64>,
    feels_like: Option<f64>,
    pressure: Option<f64>,
    humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: Option<String>,
    description: Option<String>,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    country: Option<String>,
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: Option<String>,
    dt: Option<i64>,
    timezone: Option<i32>,
    visibility: Option<f64>,
    main: Option<OwMain>,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: Option<OwWind>,
    sys: Option<OwSys>,
}

/// Error body, e.g. `{"cod":"404","message":"city not found"}`.
#[derive(Debug, Deserialize)]
struct OwError {
    message: Option<String>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeather
    }

    #[instrument(skip(self), fields(city = %query))]
    async fn fetch_current(&self, query: &WeatherQuery) -> Result<WeatherResult, LookupError> {
        let url = format!("{}/weather", self.base_url);
        debug!(url = %url, "Requesting OpenWeather current conditions");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", query.as_str()),
                ("units", "metric"),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| LookupError::from_transport(ProviderId::OpenWeather, &e))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| LookupError::from_transport(ProviderId::OpenWeather, &e))?;

        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::not_found(query));
        }

        if !status.is_success() {
            let detail = serde_json::from_str::<OwError>(&body).ok().and_then(|e| e.message);
            let message = error_message(detail, &body);

            return Err(LookupError::ProviderFailure(format!(
                "OpenWeather returned {status}: {message}"
            )));
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body).map_err(|e| {
            LookupError::ProviderFailure(format!("Failed to parse OpenWeather JSON: {e}"))
        })?;

        Self::normalize(query, parsed)
    }
}

/// Render a Unix timestamp as "HH:MM" in the city's local offset, or UTC if unknown.
fn local_clock(ts: i64, offset: Option<FixedOffset>) -> Option<String> {
    let utc = DateTime::<Utc>::from_timestamp(ts, 0)?;
    let offset = offset.or_else(|| FixedOffset::east_opt(0))?;
    Some(utc.with_timezone(&offset).format("%H:%M").to_string())
}
