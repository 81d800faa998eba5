use std::fmt::Write;

use chrono::Local;
use weather_core::{
    WeatherResult,
    display::{HINT, LookupView, Screen, WeatherCard},
};

/// The weather card plus a footer naming the source and, for OpenWeather,
/// the condition icon.
pub fn card(result: &WeatherResult) -> String {
    let mut out = WeatherCard::from(result).to_string();

    let mut footer = format!("via {}", result.provider);
    if let Some(observed) = result.observed_at {
        let _ = write!(footer, ", observed {}", observed.with_timezone(&Local).format("%H:%M"));
    }
    let _ = writeln!(out, "\n   ({footer})");
    if let Some(url) = result.icon_url() {
        let _ = writeln!(out, "   Icon: {url}");
    }

    out
}

/// One frame of the interactive session.
pub fn screen(screen: &Screen, result: Option<&WeatherResult>) -> String {
    let mut out = String::new();

    match (&screen.view, result) {
        (LookupView::Hint, _) => {
            let _ = writeln!(out, "{HINT}");
        }
        (LookupView::Loading { title, detail }, _) => {
            let _ = writeln!(out, "{title}\n{detail}");
        }
        (LookupView::Error(message), _) => {
            let _ = writeln!(out, "Error: {message}");
        }
        (LookupView::Card(_), Some(result)) => out.push_str(&card(result)),
        (LookupView::Card(card), None) => {
            let _ = write!(out, "{card}");
        }
    }

    if !screen.recent.is_empty() {
        let _ = writeln!(out, "\nRecent searches: {}", screen.recent.join(", "));
    }
    if !screen.suggestions.is_empty() {
        let _ = writeln!(out, "Popular cities: {}", screen.suggestions.join(", "));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use weather_core::{
        LookupError, LookupState, ProviderId, SUGGESTED_CITIES, SearchHistory, SpeedUnit,
        WeatherQuery, WindSpeed,
        display::{LOADING_DETAIL, LOADING_TITLE},
    };

    fn oslo() -> WeatherResult {
        WeatherResult {
            provider: ProviderId::OpenWeather,
            city: "Oslo".into(),
            country: Some("NO".into()),
            temperature_celsius: -3.0,
            temperature_fahrenheit: Some(26.6),
            feels_like_celsius: None,
            condition: "Snow".into(),
            description: "light snow".into(),
            humidity_pct: 90,
            wind_speed: WindSpeed::new(2.5, SpeedUnit::MetersPerSecond),
            visibility_km: None,
            pressure_hpa: Some(1020.0),
            uv_index: None,
            sunrise: None,
            sunset: None,
            icon: None,
            observed_at: None,
        }
    }

    #[test]
    fn card_has_footer() {
        let text = card(&oslo());
        assert!(text.contains("Oslo, NO"));
        assert!(text.contains("-3°"));
        assert!(text.contains("Pressure   1020 hPa"));
        assert!(text.contains("Sunrise    N/A"));
        assert!(text.contains("(via openweather)"));
        assert!(!text.contains("Icon:"));
    }

    #[test]
    fn card_shows_openweather_icon() {
        let mut result = oslo();
        result.icon = Some("13d".into());

        let text = card(&result);
        assert!(text.contains("Icon: https://openweathermap.org/img/wn/13d@2x.png"));
    }

    #[test]
    fn loading_frame_comes_from_state() {
        let history = SearchHistory::new().record("Oslo");
        let state = LookupState::Loading(WeatherQuery::parse("Rome").unwrap());
        let frame = screen(&Screen::new(&state, &history, &[]), None);

        assert!(frame.starts_with(&format!("{LOADING_TITLE}\n{LOADING_DETAIL}")));
        assert!(frame.contains("Recent searches: Oslo"));
        assert!(!frame.contains("Popular cities"));
    }

    #[test]
    fn error_screen_lists_recent_and_popular() {
        let history = SearchHistory::new().record("Oslo");
        let state = LookupState::Error(LookupError::EmptyInput);
        let frame = screen(&Screen::new(&state, &history, SUGGESTED_CITIES), None);

        assert!(frame.starts_with("Error: Please enter a city name"));
        assert!(frame.contains("Recent searches: Oslo"));
        assert!(frame.contains("Popular cities: London, New York"));
    }
}
