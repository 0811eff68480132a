//! Google Generative Language API (`generateContent`) client.

use crate::config::toml_config::AssistantConfig;
use crate::domain::ports::{GenerationRequest, TextGenerator};
use crate::utils::error::{DashboardError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Debug)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Deserialize, Debug)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

fn text_content(role: Option<&str>, text: String) -> Content {
    Content {
        role: role.map(str::to_string),
        parts: vec![Part { text: Some(text) }],
    }
}

pub struct GeminiClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &AssistantConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| DashboardError::MissingConfigError {
                field: "assistant.api_key".to_string(),
            })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }
}

/// Turns an error response into a [`DashboardError::ServiceError`], keeping
/// the API status string (e.g. `RESOURCE_EXHAUSTED`) in the message.
fn service_error(http_status: u16, body: &str) -> DashboardError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let message = match envelope.error.status {
                Some(status) => format!("{} [{}]", envelope.error.message, status),
                None => envelope.error.message,
            };
            DashboardError::ServiceError {
                status: Some(envelope.error.code.unwrap_or(http_status)),
                message,
            }
        }
        Err(_) => DashboardError::ServiceError {
            status: Some(http_status),
            message: body.chars().take(500).collect(),
        },
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        let body = GenerateContentRequest {
            system_instruction: request
                .system_instruction
                .map(|text| text_content(None, text)),
            contents: vec![text_content(Some("user"), request.prompt)],
        };

        tracing::debug!("Calling text generation model {}", self.model);
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Text generation response status: {}", status);
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(service_error(status.as_u16(), &text));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_parses_envelope() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded for metric","status":"RESOURCE_EXHAUSTED"}}"#;
        match service_error(429, body) {
            DashboardError::ServiceError { status, message } => {
                assert_eq!(status, Some(429));
                assert!(message.contains("RESOURCE_EXHAUSTED"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_service_error_keeps_raw_body() {
        match service_error(502, "Bad Gateway") {
            DashboardError::ServiceError { status, message } => {
                assert_eq!(status, Some(502));
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let body = GenerateContentRequest {
            system_instruction: Some(text_content(None, "sys".to_string())),
            contents: vec![text_content(Some("user"), "hi".to_string())],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "sys");
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["contents"][0]["role"], "user");
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let config = AssistantConfig {
            api_key: None,
            ..AssistantConfig::default()
        };
        assert!(matches!(
            GeminiClient::new(&config),
            Err(DashboardError::MissingConfigError { .. })
        ));
    }
}
