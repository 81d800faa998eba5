use crate::{
    Config, WeatherQuery, WeatherResult,
    model::{LookupError, non_blank},
    provider::{llm::LlmProvider, openweather::OpenWeatherProvider},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt::Debug};

pub mod llm;
pub mod openweather;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    #[default]
    OpenWeather,
    Llm,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::Llm => "llm",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::Llm]
    }

    /// Environment variable that overrides the stored API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "OPENWEATHER_API_KEY",
            ProviderId::Llm => "WEATHER_LLM_API_KEY",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.trim().to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(ProviderId::OpenWeather),
            "llm" => Ok(ProviderId::Llm),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openweather, llm."
            )),
        }
    }
}

/// One strategy for turning a city name into current conditions.
///
/// Implementations issue exactly one outbound request per call and never retry.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    async fn fetch_current(&self, query: &WeatherQuery) -> Result<WeatherResult, LookupError>;
}

/// HTTP client shared by whichever provider the config selects.
pub fn http_client(config: &Config) -> anyhow::Result<Client> {
    let client = Client::builder()
        .timeout(config.timeout())
        .user_agent(concat!("weather-core/", env!("CARGO_PKG_VERSION")))
        .build()?;

    Ok(client)
}

/// Construct a provider from config and explicit ProviderId.
///
/// Returns `Ok(None)` when no API key is configured: that is reported per lookup
/// as `MissingCredential`, not as a construction failure.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Option<Box<dyn WeatherProvider>>> {
    let Some(settings) = config.provider_config(id) else {
        return Ok(None);
    };
    let Some(api_key) = settings.api_key() else {
        return Ok(None);
    };

    let http = http_client(config)?;

    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::OpenWeather => {
            let mut provider = OpenWeatherProvider::new(api_key.to_owned()).with_http(http);
            if let Some(url) = settings.base_url.as_deref() {
                provider = provider.with_base_url(url);
            }
            Box::new(provider)
        }
        ProviderId::Llm => {
            let mut provider = LlmProvider::new(api_key.to_owned()).with_http(http);
            if let Some(url) = settings.base_url.as_deref() {
                provider = provider.with_base_url(url);
            }
            if let Some(model) = settings.model.as_deref() {
                provider = provider.with_model(model);
            }
            Box::new(provider)
        }
    };

    Ok(Some(boxed))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}

/// Message for a non-2xx reply: the provider's own message, else the raw
/// body, else a fixed fallback.
pub(crate) fn error_message(detail: Option<String>, body: &str) -> String {
    non_blank(detail)
        .or_else(|| non_blank(Some(truncate_body(body))))
        .unwrap_or_else(|| "Could not get weather".to_string())
}
