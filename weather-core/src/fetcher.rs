use tracing::info;

use crate::{
    Config,
    model::{LookupError, WeatherQuery, WeatherResult},
    provider::{ProviderId, WeatherProvider, provider_from_config},
};

/// The single entry point for lookups: validates input, checks for a
/// credential and delegates to the configured provider strategy.
#[derive(Debug)]
pub struct WeatherFetcher {
    provider_id: ProviderId,
    provider: Option<Box<dyn WeatherProvider>>,
}

impl WeatherFetcher {
    /// Wrap an already-built provider.
    pub fn new(provider: Box<dyn WeatherProvider>) -> Self {
        Self {
            provider_id: provider.id(),
            provider: Some(provider),
        }
    }

    /// A fetcher with no credential; every lookup fails with `MissingCredential`.
    pub fn without_credential(provider_id: ProviderId) -> Self {
        Self {
            provider_id,
            provider: None,
        }
    }

    /// Build the fetcher for the configured default provider.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let id = config.default_provider_id()?;
        Self::for_provider(id, config)
    }

    pub fn for_provider(id: ProviderId, config: &Config) -> anyhow::Result<Self> {
        let fetcher = match provider_from_config(id, config)? {
            Some(provider) => Self::new(provider),
            None => Self::without_credential(id),
        };

        Ok(fetcher)
    }

    pub fn has_credential(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn fetch(&self, city: &str) -> Result<WeatherResult, LookupError> {
        let query = WeatherQuery::parse(city)?;
        self.fetch_query(&query).await
    }

    pub async fn fetch_query(&self, query: &WeatherQuery) -> Result<WeatherResult, LookupError> {
        let provider = self
            .provider
            .as_deref()
            .ok_or_else(|| LookupError::missing_credential(self.provider_id))?;

        let outcome = provider.fetch_current(query).await;
        match &outcome {
            Ok(result) => info!(
                city = %query,
                provider = %self.provider_id,
                resolved = %result.city,
                "Weather lookup succeeded"
            ),
            // Callers report the error to the user; keep it out of warn-level output.
            Err(e) => info!(
                city = %query,
                provider = %self.provider_id,
                kind = ?e.kind(),
                error = %e,
                "Weather lookup failed"
            ),
        }

        outcome
    }
}

/// One-shot lookup straight from configuration.
pub async fn fetch(city: &str, config: &Config) -> Result<WeatherResult, LookupError> {
    let query = WeatherQuery::parse(city)?;
    let id = config
        .default_provider_id()
        .map_err(|e| LookupError::ProviderFailure(e.to_string()))?;
    let fetcher = WeatherFetcher::for_provider(id, config)
        .map_err(|e| LookupError::ProviderFailure(format!("Failed to set up {id}: {e}")))?;

    fetcher.fetch_query(&query).await
}
