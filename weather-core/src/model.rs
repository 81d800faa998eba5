use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::provider::ProviderId;

/// A city name that is guaranteed to be non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct WeatherQuery(String);

impl WeatherQuery {
    /// Trim the raw input; whitespace-only input is rejected with `EmptyInput`.
    pub fn parse(raw: &str) -> Result<Self, LookupError> {
        let city = raw.trim();
        if city.is_empty() {
            return Err(LookupError::EmptyInput);
        }

        Ok(Self(city.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WeatherQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedUnit {
    #[serde(rename = "m/s")]
    MetersPerSecond,
    #[serde(rename = "km/h")]
    KilometersPerHour,
    #[serde(rename = "mph")]
    MilesPerHour,
}

impl SpeedUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            SpeedUnit::MetersPerSecond => "m/s",
            SpeedUnit::KilometersPerHour => "km/h",
            SpeedUnit::MilesPerHour => "mph",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindSpeed {
    pub value: f64,
    pub unit: SpeedUnit,
}

impl WindSpeed {
    pub fn new(value: f64, unit: SpeedUnit) -> Self {
        Self { value, unit }
    }
}

/// Normalized current conditions for one city, whichever provider produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    pub provider: ProviderId,
    pub city: String,
    pub country: Option<String>,
    pub temperature_celsius: f64,
    pub temperature_fahrenheit: Option<f64>,
    pub feels_like_celsius: Option<f64>,
    pub condition: String,
    pub description: String,
    pub humidity_pct: u8,
    pub wind_speed: WindSpeed,
    pub visibility_km: Option<f64>,
    pub pressure_hpa: Option<f64>,
    pub uv_index: Option<f64>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    /// OpenWeather icon code such as "04d", or the model's short icon description.
    pub icon: Option<String>,
    pub observed_at: Option<DateTime<Utc>>,
}

impl WeatherResult {
    /// Image for an OpenWeather icon code. Other providers have none.
    pub fn icon_url(&self) -> Option<String> {
        match (self.provider, &self.icon) {
            (ProviderId::OpenWeather, Some(code)) => {
                Some(format!("https://openweathermap.org/img/wn/{code}@2x.png"))
            }
            _ => None,
        }
    }
}

/// Discriminant of [`LookupError`], for callers that only care about the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LookupErrorKind {
    EmptyInput,
    MissingCredential,
    NotFound,
    NetworkFailure,
    ProviderFailure,
}

/// Every way a lookup can fail. The `Display` text is meant for end users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Please enter a city name")]
    EmptyInput,

    #[error(
        "Missing API key for provider '{provider}'.\n\
         Hint: set {env} or run `weather configure {provider}`."
    )]
    MissingCredential {
        provider: ProviderId,
        env: &'static str,
    },

    #[error("City '{city}' not found. Please check the spelling and try again.")]
    NotFound { city: String },

    #[error("Unable to reach the weather service: {0}")]
    NetworkFailure(String),

    #[error("Weather service error: {0}")]
    ProviderFailure(String),
}

impl LookupError {
    pub fn missing_credential(provider: ProviderId) -> Self {
        LookupError::MissingCredential {
            provider,
            env: provider.api_key_env(),
        }
    }

    pub fn not_found(query: &WeatherQuery) -> Self {
        LookupError::NotFound {
            city: query.as_str().to_string(),
        }
    }

    pub fn kind(&self) -> LookupErrorKind {
        match self {
            LookupError::EmptyInput => LookupErrorKind::EmptyInput,
            LookupError::MissingCredential { .. } => LookupErrorKind::MissingCredential,
            LookupError::NotFound { .. } => LookupErrorKind::NotFound,
            LookupError::NetworkFailure(_) => LookupErrorKind::NetworkFailure,
            LookupError::ProviderFailure(_) => LookupErrorKind::ProviderFailure,
        }
    }

    /// Classify a transport-level `reqwest` failure.
    pub(crate) fn from_transport(provider: ProviderId, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            LookupError::NetworkFailure(format!("request to {provider} timed out"))
        } else if err.is_connect() || err.is_request() || err.is_body() {
            LookupError::NetworkFailure(format!("request to {provider} failed: {err}"))
        } else {
            LookupError::ProviderFailure(format!("{provider}: {err}"))
        }
    }
}

/// Keep only finite values; providers occasionally send NaN-ish placeholders.
pub(crate) fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

pub(crate) fn required_finite(value: Option<f64>, field: &str) -> Result<f64, LookupError> {
    finite(value)
        .ok_or_else(|| LookupError::ProviderFailure(format!("response is missing '{field}'")))
}

pub(crate) fn humidity_pct(value: Option<f64>) -> Result<u8, LookupError> {
    let value = required_finite(value, "humidity")?;
    if !(0.0..=100.0).contains(&value) {
        return Err(LookupError::ProviderFailure(format!(
            "humidity {value} is outside 0-100"
        )));
    }

    Ok(value.round() as u8)
}

pub(crate) fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub(crate) fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Treat blank strings as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
