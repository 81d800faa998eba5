//! Core library for the `weather` lookup app.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Weather providers (OpenWeather REST, LLM structured extraction) behind one trait
//! - The lookup state machine and the recent-search history it maintains
//! - A display model that front-ends render from
//!
//! It is used by `weather-cli`, but any front-end can drive a [`LookupController`]
//! and draw from [`display::Screen`].

pub mod config;
pub mod display;
pub mod fetcher;
pub mod history;
pub mod lookup;
pub mod model;
pub mod provider;

pub use config::{Config, ProviderConfig};
pub use fetcher::{WeatherFetcher, fetch};
pub use history::{MAX_HISTORY, SearchHistory};
pub use lookup::{Intent, LookupController, LookupState, SUGGESTED_CITIES, Submission};
pub use model::{
    LookupError, LookupErrorKind, SpeedUnit, WeatherQuery, WeatherResult, WindSpeed,
};
pub use provider::{ProviderId, WeatherProvider};
