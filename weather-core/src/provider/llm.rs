//! Structured-extraction provider: asks an OpenAI-compatible chat endpoint for
//! current weather and constrains the answer with a JSON schema.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::{
    model::{
        LookupError, SpeedUnit, WeatherQuery, WeatherResult, WindSpeed, fahrenheit_to_celsius,
        finite, humidity_pct, non_blank,
    },
    provider::{ProviderId, error_message, truncate_body},
};

use super::WeatherProvider;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct LlmProvider {
    api_key: String,
    base_url: String,
    model: String,
    http: Client,
}

impl LlmProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_http(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    fn request_body(&self, query: &WeatherQuery) -> Value {
        json!({
            "model": self.model,
            "temperature": 0,
            "messages": [
                {
                    "role": "system",
                    "content": "You report current weather conditions as structured data. \
                                If the city does not exist, omit the city field."
                },
                { "role": "user", "content": prompt(query) }
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": { "name": "weather_report", "schema": response_schema() }
            }
        })
    }

    fn normalize(query: &WeatherQuery, report: LlmWeather) -> Result<WeatherResult, LookupError> {
        let city = non_blank(report.city).ok_or_else(|| LookupError::not_found(query))?;

        let fahrenheit = finite(report.temperature_fahrenheit);
        let temperature_celsius = finite(report.temperature_celsius)
            .or_else(|| fahrenheit.map(fahrenheit_to_celsius))
            .ok_or_else(|| {
                LookupError::ProviderFailure("response is missing a temperature".to_string())
            })?;

        let wind_speed = finite(report.wind_speed_kmh)
            .map(|v| WindSpeed::new(v, SpeedUnit::KilometersPerHour))
            .or_else(|| {
                finite(report.wind_speed_mph).map(|v| WindSpeed::new(v, SpeedUnit::MilesPerHour))
            })
            .ok_or_else(|| {
                LookupError::ProviderFailure("response is missing a wind speed".to_string())
            })?;

        let condition = non_blank(report.condition).unwrap_or_else(|| "Unknown".to_string());
        let description = non_blank(report.description).unwrap_or_else(|| condition.clone());

        Ok(WeatherResult {
            provider: ProviderId::Llm,
            city,
            country: non_blank(report.country),
            temperature_celsius,
            temperature_fahrenheit: fahrenheit,
            feels_like_celsius: finite(report.feels_like_celsius),
            condition,
            description,
            humidity_pct: humidity_pct(report.humidity)?,
            wind_speed,
            visibility_km: finite(report.visibility_km),
            pressure_hpa: finite(report.pressure_hpa),
            uv_index: finite(report.uv_index),
            sunrise: non_blank(report.sunrise),
            sunset: non_blank(report.sunset),
            icon: non_blank(report.icon_description),
            observed_at: None,
        })
    }
}

fn prompt(query: &WeatherQuery) -> String {
    format!(
        "Get current weather data for {query}. Provide accurate, real-time weather information \
         including temperature in both Celsius and Fahrenheit, weather conditions, humidity, \
         wind speed, visibility, atmospheric pressure, and sunrise/sunset times. \
         Format as structured data."
    )
}

/// JSON schema sent with every request. No property is required; models omit
/// what they do not know.
pub fn response_schema() -> Value {
    let number = json!({ "type": "number" });
    let string = json!({ "type": "string" });

    json!({
        "type": "object",
        "properties": {
            "city": string,
            "country": string,
            "temperature_celsius": number,
            "temperature_fahrenheit": number,
            "condition": string,
            "description": string,
            "humidity": number,
            "wind_speed_kmh": number,
            "wind_speed_mph": number,
            "visibility_km": number,
            "pressure_hpa": number,
            "feels_like_celsius": number,
            "uv_index": number,
            "sunrise": string,
            "sunset": string,
            "icon_description": string
        }
    })
}

/// Schema-conformant answer. Unknown fields are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LlmWeather {
    pub city: Option<String>,
    pub country: Option<String>,
    pub temperature_celsius: Option<f64>,
    pub temperature_fahrenheit: Option<f64>,
    pub condition: Option<String>,
    pub description: Option<String>,
    pub humidity: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub wind_speed_mph: Option<f64>,
    pub visibility_km: Option<f64>,
    pub pressure_hpa: Option<f64>,
    pub feels_like_celsius: Option<f64>,
    pub uv_index: Option<f64>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub icon_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatErrorBody {
    error: ChatErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ChatErrorDetail {
    message: Option<String>,
}

/// Decode the assistant message. `null` and `{}` both mean "no such city";
/// anything that is not an object matching the schema is a provider failure.
fn parse_report(content: &str) -> Result<LlmWeather, LookupError> {
    let value: Value = serde_json::from_str(content.trim()).map_err(|e| {
        LookupError::ProviderFailure(format!("model answer is not JSON: {e}"))
    })?;

    match value {
        Value::Null => Ok(LlmWeather::default()),
        Value::Object(_) => serde_json::from_value(value).map_err(|e| {
            LookupError::ProviderFailure(format!("model answer does not match the schema: {e}"))
        }),
        other => Err(LookupError::ProviderFailure(format!(
            "model answer is not a JSON object: {}",
            truncate_body(&other.to_string())
        ))),
    }
}

#[async_trait]
impl WeatherProvider for LlmProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Llm
    }

    #[instrument(skip(self), fields(city = %query, model = %self.model))]
    async fn fetch_current(&self, query: &WeatherQuery) -> Result<WeatherResult, LookupError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(url = %url, "Requesting structured weather report");

        let res = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(query))
            .send()
            .await
            .map_err(|e| LookupError::from_transport(ProviderId::Llm, &e))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| LookupError::from_transport(ProviderId::Llm, &e))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ChatErrorBody>(&body)
                .ok()
                .and_then(|e| e.error.message);
            let message = error_message(detail, &body);

            return Err(LookupError::ProviderFailure(format!(
                "LLM endpoint returned {status}: {message}"
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            LookupError::ProviderFailure(format!("Failed to parse chat completion JSON: {e}"))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                LookupError::ProviderFailure("chat completion contained no answer".to_string())
            })?;

        let report = parse_report(&content)?;
        Self::normalize(query, report)
    }
}
