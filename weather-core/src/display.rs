//! Read-only projection of lookup state into display strings.
//!
//! Nothing here performs I/O, so rendering the same state twice is free of
//! side effects.

use std::fmt;

use crate::{
    history::SearchHistory,
    lookup::{LookupController, LookupState},
    model::WeatherResult,
};

pub const NOT_AVAILABLE: &str = "N/A";
pub const LOADING_TITLE: &str = "Fetching Weather Data";
pub const LOADING_DETAIL: &str = "Getting the latest weather information for your city...";
pub const HINT: &str = "Type a city and press Enter to search.";

/// Everything a front-end needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub view: LookupView,
    pub recent: Vec<String>,
    pub suggestions: Vec<String>,
    /// Whether the search input should accept a new submit.
    pub can_submit: bool,
}

impl Screen {
    pub fn from_controller(controller: &LookupController) -> Self {
        Self::new(controller.state(), controller.history(), controller.suggestions())
    }

    pub fn new(state: &LookupState, history: &SearchHistory, suggestions: &[&str]) -> Self {
        Self {
            view: LookupView::from_state(state),
            recent: history.entries().to_vec(),
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
            can_submit: !state.is_loading(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupView {
    Hint,
    Loading { title: &'static str, detail: &'static str },
    Error(String),
    Card(Box<WeatherCard>),
}

impl LookupView {
    pub fn from_state(state: &LookupState) -> Self {
        match state {
            LookupState::Idle => LookupView::Hint,
            LookupState::Loading(_) => LookupView::Loading {
                title: LOADING_TITLE,
                detail: LOADING_DETAIL,
            },
            LookupState::Error(err) => LookupView::Error(err.to_string()),
            LookupState::Success(result) => LookupView::Card(Box::new(WeatherCard::from(result))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UvLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl UvLevel {
    pub fn from_index(index: f64) -> Self {
        if index < 3.0 {
            UvLevel::Low
        } else if index < 6.0 {
            UvLevel::Moderate
        } else if index < 8.0 {
            UvLevel::High
        } else {
            UvLevel::VeryHigh
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UvLevel::Low => "Low",
            UvLevel::Moderate => "Moderate",
            UvLevel::High => "High",
            UvLevel::VeryHigh => "Very High",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stat {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UvReading {
    pub value: String,
    pub level: UvLevel,
}

/// The weather card: headline figures plus a grid of secondary stats.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherCard {
    pub heading: String,
    pub glyph: &'static str,
    pub temperature: String,
    pub temperature_alt: Option<String>,
    pub condition: String,
    pub description: String,
    pub feels_like: Option<String>,
    pub humidity: String,
    pub wind: String,
    pub details: Vec<Stat>,
    pub uv: Option<UvReading>,
}

impl From<&WeatherResult> for WeatherCard {
    fn from(w: &WeatherResult) -> Self {
        let heading = match &w.country {
            Some(country) => format!("{}, {}", w.city, country),
            None => w.city.clone(),
        };

        let details = vec![
            Stat {
                label: "Visibility",
                value: with_unit(w.visibility_km, "km"),
            },
            Stat {
                label: "Pressure",
                value: with_unit(w.pressure_hpa, "hPa"),
            },
            Stat {
                label: "Sunrise",
                value: or_na(w.sunrise.as_deref()),
            },
            Stat {
                label: "Sunset",
                value: or_na(w.sunset.as_deref()),
            },
        ];

        Self {
            heading,
            glyph: condition_glyph(&w.condition, &w.description),
            temperature: format!("{}°", whole(w.temperature_celsius)),
            temperature_alt: w.temperature_fahrenheit.map(|f| format!("{}°F", whole(f))),
            condition: w.condition.clone(),
            description: w.description.clone(),
            feels_like: w
                .feels_like_celsius
                .map(|c| format!("Feels like {}°C", whole(c))),
            humidity: format!("{}%", w.humidity_pct),
            wind: format!("{} {}", w.wind_speed.value, w.wind_speed.unit.symbol()),
            details,
            uv: w.uv_index.map(|uv| UvReading {
                value: uv.to_string(),
                level: UvLevel::from_index(uv),
            }),
        }
    }
}

impl fmt::Display for WeatherCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}  {}", self.glyph, self.heading)?;
        match &self.temperature_alt {
            Some(alt) => writeln!(f, "   {} ({alt})", self.temperature)?,
            None => writeln!(f, "   {}", self.temperature)?,
        }
        writeln!(f, "   {} - {}", self.condition, self.description)?;
        if let Some(feels_like) = &self.feels_like {
            writeln!(f, "   {feels_like}")?;
        }
        writeln!(f)?;
        writeln!(f, "   {:<11}{}", "Humidity", self.humidity)?;
        writeln!(f, "   {:<11}{}", "Wind", self.wind)?;
        for stat in &self.details {
            writeln!(f, "   {:<11}{}", stat.label, stat.value)?;
        }
        if let Some(uv) = &self.uv {
            writeln!(f, "   {:<11}{} ({})", "UV Index", uv.value, uv.level.label())?;
        }
        Ok(())
    }
}

/// Pick an emoji for the condition. Order matters: "thunderstorm with rain"
/// reads as rain because rain is checked first.
pub fn condition_glyph(condition: &str, description: &str) -> &'static str {
    let condition = condition.to_lowercase();
    let description = description.to_lowercase();

    if condition.contains("clear") || condition.contains("sunny") {
        "☀️"
    } else if condition.contains("cloud") {
        "☁️"
    } else if condition.contains("rain") || description.contains("rain") {
        "🌧️"
    } else if condition.contains("thunder") || condition.contains("storm") {
        "⛈️"
    } else if condition.contains("snow") {
        "🌨️"
    } else if condition.contains("fog") || condition.contains("mist") {
        "🌫️"
    } else if condition.contains("wind") {
        "💨"
    } else {
        "🌤️"
    }
}

/// Round to a whole degree; `+ 0.0` turns -0 into 0.
fn whole(value: f64) -> f64 {
    value.round() + 0.0
}

fn with_unit(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v} {unit}"),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn or_na(value: Option<&str>) -> String {
    value.unwrap_or(NOT_AVAILABLE).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{LookupError, SpeedUnit, WeatherQuery, WindSpeed},
        provider::ProviderId,
    };

    fn london() -> WeatherResult {
        WeatherResult {
            provider: ProviderId::OpenWeather,
            city: "London".into(),
            country: Some("GB".into()),
            temperature_celsius: 14.6,
            temperature_fahrenheit: Some(58.28),
            feels_like_celsius: Some(13.2),
            condition: "Clouds".into(),
            description: "scattered clouds".into(),
            humidity_pct: 70,
            wind_speed: WindSpeed::new(4.1, SpeedUnit::MetersPerSecond),
            visibility_km: Some(10.0),
            pressure_hpa: None,
            uv_index: Some(6.5),
            sunrise: Some("07:20".into()),
            sunset: None,
            icon: Some("03d".into()),
            observed_at: None,
        }
    }

    #[test]
    fn card_formats_headline_figures() {
        let card = WeatherCard::from(&london());

        assert_eq!(card.heading, "London, GB");
        assert_eq!(card.glyph, "☁️");
        assert_eq!(card.temperature, "15°");
        assert_eq!(card.temperature_alt.as_deref(), Some("58°F"));
        assert_eq!(card.feels_like.as_deref(), Some("Feels like 13°C"));
        assert_eq!(card.humidity, "70%");
        assert_eq!(card.wind, "4.1 m/s");
    }

    #[test]
    fn absent_optionals_render_as_na() {
        let card = WeatherCard::from(&london());
        let values: Vec<(&str, &str)> = card
            .details
            .iter()
            .map(|s| (s.label, s.value.as_str()))
            .collect();

        assert_eq!(
            values,
            [
                ("Visibility", "10 km"),
                ("Pressure", "N/A"),
                ("Sunrise", "07:20"),
                ("Sunset", "N/A"),
            ]
        );
    }

    #[test]
    fn slightly_negative_rounds_to_zero() {
        let mut w = london();
        w.temperature_celsius = -0.4;
        assert_eq!(WeatherCard::from(&w).temperature, "0°");
    }

    #[test]
    fn heading_without_country() {
        let mut w = london();
        w.country = None;
        assert_eq!(WeatherCard::from(&w).heading, "London");
    }

    #[test]
    fn uv_levels() {
        assert_eq!(UvLevel::from_index(2.9), UvLevel::Low);
        assert_eq!(UvLevel::from_index(3.0), UvLevel::Moderate);
        assert_eq!(UvLevel::from_index(6.5), UvLevel::High);
        assert_eq!(UvLevel::from_index(8.0), UvLevel::VeryHigh);
        assert_eq!(WeatherCard::from(&london()).uv.unwrap().level.label(), "High");
    }

    #[test]
    fn glyph_precedence() {
        assert_eq!(condition_glyph("Clear", ""), "☀️");
        assert_eq!(condition_glyph("Thunderstorm", "thunderstorm with light rain"), "🌧️");
        assert_eq!(condition_glyph("Thunderstorm", "thunderstorm"), "⛈️");
        assert_eq!(condition_glyph("Mist", "mist"), "🌫️");
        assert_eq!(condition_glyph("Haze", "haze"), "🌤️");
    }

    #[test]
    fn view_follows_state() {
        assert_eq!(LookupView::from_state(&LookupState::Idle), LookupView::Hint);
        assert!(matches!(
            LookupView::from_state(&LookupState::Loading(WeatherQuery::parse("Oslo").unwrap())),
            LookupView::Loading { title: LOADING_TITLE, .. }
        ));
        assert_eq!(
            LookupView::from_state(&LookupState::Error(LookupError::EmptyInput)),
            LookupView::Error("Please enter a city name".into())
        );
    }

    #[test]
    fn screen_disables_submit_while_loading() {
        let history = SearchHistory::new().record("Oslo");
        let loading = LookupState::Loading(WeatherQuery::parse("Bergen").unwrap());

        let screen = Screen::new(&loading, &history, &[]);
        assert!(!screen.can_submit);
        assert_eq!(screen.recent, ["Oslo"]);
    }

    #[test]
    fn rendering_is_repeatable() {
        let state = LookupState::Success(london());
        let first = LookupView::from_state(&state);
        let second = LookupView::from_state(&state);
        assert_eq!(first, second);

        let LookupView::Card(card) = first else {
            panic!("expected a card");
        };
        let text = card.to_string();
        assert!(text.contains("London, GB"));
        assert!(text.contains("UV Index"));
    }
}
