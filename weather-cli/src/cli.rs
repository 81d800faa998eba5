use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Confirm, Password, PasswordDisplayMode, Text};
use tracing::debug;
use weather_core::{Config, LookupController, LookupState, ProviderId, WeatherFetcher};

use crate::{render, session};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather for any city")]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides this).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name: "openweather" or "llm".
        provider: String,
    },

    /// Show current weather for a city.
    Show {
        /// City name, e.g. "London" or "New York".
        city: String,

        /// Use this provider instead of the configured default.
        #[arg(long)]
        provider: Option<String>,

        /// Print the normalized result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Search repeatedly, with recent searches and suggestions (default).
    Interactive {
        #[arg(long)]
        provider: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Command::Configure { provider }) => configure(&provider),
            Some(Command::Show { city, provider, json }) => {
                show(&city, provider.as_deref(), json).await
            }
            Some(Command::Interactive { provider }) => {
                session::run(controller(provider.as_deref())?).await
            }
            None => session::run(controller(None)?).await,
        }
    }
}

/// Build a controller for the requested (or default) provider.
fn controller(provider: Option<&str>) -> anyhow::Result<LookupController> {
    let config = Config::load_with_env()?;
    let id = match provider {
        Some(name) => ProviderId::try_from(name)?,
        None => config.default_provider_id()?,
    };
    debug!(provider = %id, "Using weather provider");

    let fetcher = WeatherFetcher::for_provider(id, &config)
        .with_context(|| format!("Failed to set up provider '{id}'"))?;

    Ok(LookupController::new(fetcher))
}

async fn show(city: &str, provider: Option<&str>, json: bool) -> anyhow::Result<()> {
    let mut controller = controller(provider)?;

    match controller.search(city).await {
        LookupState::Success(result) if json => {
            println!("{}", serde_json::to_string_pretty(result)?);
            Ok(())
        }
        LookupState::Success(result) => {
            print!("{}", render::card(result));
            Ok(())
        }
        LookupState::Error(err) => bail!("{err}"),
        other => bail!("Lookup ended in unexpected state: {other:?}"),
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    let api_key = Password::new(&format!("API key for {id}:"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    if id == ProviderId::Llm {
        let settings = config.provider_config_mut(id);

        let model = Text::new("Model:")
            .with_default(settings.model.as_deref().unwrap_or("gpt-4o-mini"))
            .prompt()
            .context("Failed to read model name")?;
        settings.model = Some(model.trim().to_string()).filter(|m| !m.is_empty());

        let base_url = Text::new("Base URL (blank for the public endpoint):")
            .with_default(settings.base_url.as_deref().unwrap_or(""))
            .prompt()
            .context("Failed to read base URL")?;
        settings.base_url = Some(base_url.trim().to_string()).filter(|u| !u.is_empty());
    }

    config.upsert_provider_api_key(id, api_key.trim().to_string());

    if config.default_provider_id()? != id {
        let make_default = Confirm::new(&format!("Make {id} the default provider?"))
            .with_default(true)
            .prompt()
            .context("Failed to read confirmation")?;
        if make_default {
            config.set_default_provider(id);
        }
    }

    config.save()?;
    println!(
        "Saved credentials for {id} to {}",
        Config::config_file_path()?.display()
    );

    Ok(())
}
