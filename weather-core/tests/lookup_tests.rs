//! End-to-end lookup scenarios: controller + fetcher + provider against a mock server.

use weather_core::{
    Config, Intent, LookupController, LookupError, LookupErrorKind, LookupState, ProviderId,
    SpeedUnit, WeatherFetcher, display::Screen, fetch,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn llm_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.upsert_provider_api_key(ProviderId::Llm, "llm-key".into());
    config.provider_config_mut(ProviderId::Llm).base_url = Some(server.uri());
    config
}

fn chat_answer(answer: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": answer.to_string() } }]
    }))
}

async fn mount_answer(server: &MockServer, answer: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(chat_answer(answer))
        .mount(server)
        .await;
}

#[tokio::test]
async fn london_scenario() {
    let server = MockServer::start().await;
    mount_answer(
        &server,
        serde_json::json!({
            "city": "London",
            "country": "GB",
            "temperature_celsius": 15,
            "humidity": 70,
            "wind_speed_kmh": 10,
            "condition": "Clouds",
            "description": "scattered clouds"
        }),
    )
    .await;

    let fetcher = WeatherFetcher::from_config(&llm_config(&server)).unwrap();
    let mut controller = LookupController::new(fetcher);

    let LookupState::Success(result) = controller.search("London").await else {
        panic!("expected a successful lookup");
    };

    assert_eq!(result.city, "London");
    assert_eq!(result.country.as_deref(), Some("GB"));
    assert_eq!(result.temperature_celsius, 15.0);
    assert_eq!(result.humidity_pct, 70);
    assert_eq!(result.wind_speed.value, 10.0);
    assert_eq!(result.wind_speed.unit, SpeedUnit::KilometersPerHour);
    assert_eq!(result.condition, "Clouds");
    assert_eq!(result.description, "scattered clouds");
    assert_eq!(controller.history().entries(), ["London"]);
}

#[tokio::test]
async fn atlantis_scenario() {
    let server = MockServer::start().await;
    mount_answer(&server, serde_json::json!({ "description": "no such place" })).await;

    let fetcher = WeatherFetcher::from_config(&llm_config(&server)).unwrap();
    let mut controller = LookupController::new(fetcher);

    let state = controller.search("Atlantis").await;

    assert_eq!(
        state.error().map(LookupError::kind),
        Some(LookupErrorKind::NotFound)
    );
    assert!(controller.history().is_empty());
}

#[tokio::test]
async fn missing_credential_scenario_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.provider_config_mut(ProviderId::OpenWeather).base_url = Some(server.uri());

    let fetcher = WeatherFetcher::from_config(&config).unwrap();
    assert!(!fetcher.has_credential());

    let mut controller = LookupController::new(fetcher);
    let state = controller.search("Paris").await;

    assert_eq!(
        state,
        &LookupState::Error(LookupError::missing_credential(ProviderId::OpenWeather))
    );
}

#[tokio::test]
async fn empty_input_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = llm_config(&server);
    let mut controller = LookupController::new(WeatherFetcher::from_config(&config).unwrap());

    for input in ["", "   ", "\t\n"] {
        let state = controller.dispatch(Intent::Submit(input.into())).await;
        assert_eq!(state, &LookupState::Error(LookupError::EmptyInput));
    }

    assert_eq!(fetch("  ", &config).await, Err(LookupError::EmptyInput));
}

#[tokio::test]
async fn repeated_city_is_recorded_once() {
    let server = MockServer::start().await;
    mount_answer(
        &server,
        serde_json::json!({
            "city": "London",
            "temperature_celsius": 12,
            "humidity": 80,
            "wind_speed_kmh": 7
        }),
    )
    .await;

    let fetcher = WeatherFetcher::from_config(&llm_config(&server)).unwrap();
    let mut controller = LookupController::new(fetcher);

    controller.search("London").await;
    controller.search("London").await;

    assert_eq!(controller.history().entries(), ["London"]);
}

#[tokio::test]
async fn rendering_does_not_refetch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(chat_answer(serde_json::json!({
            "city": "Tokyo",
            "temperature_celsius": 21,
            "humidity": 55,
            "wind_speed_kmh": 4
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = WeatherFetcher::from_config(&llm_config(&server)).unwrap();
    let mut controller = LookupController::new(fetcher);
    controller.dispatch(Intent::SelectSuggestion(2)).await;

    let first = Screen::from_controller(&controller);
    let second = Screen::from_controller(&controller);

    assert_eq!(first, second);
    assert_eq!(first.recent, ["Tokyo"]);
    assert!(first.suggestions.is_empty());
}

#[tokio::test]
async fn one_shot_fetch_uses_configured_provider() {
    let server = MockServer::start().await;
    mount_answer(
        &server,
        serde_json::json!({
            "city": "Sydney",
            "country": "AU",
            "temperature_fahrenheit": 77,
            "humidity": 60,
            "wind_speed_mph": 9
        }),
    )
    .await;

    let mut config = llm_config(&server);
    config.set_default_provider(ProviderId::Llm);

    let result = fetch("Sydney", &config).await.unwrap();

    assert_eq!(result.provider, ProviderId::Llm);
    assert_eq!(result.temperature_celsius, 25.0);
    assert_eq!(result.wind_speed.unit, SpeedUnit::MilesPerHour);
}
