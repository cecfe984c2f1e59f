//! Upstream call to the explanation model. The simulation JSON is wrapped in
//! a fixed prompt and posted to the configured generateContent endpoint.

use crate::{constant::EXPLAIN_API_KEY_ENV, error::SkittyError, sanitize_error};
use serde_json::{json, Value};

#[cfg(not(test))]
use crate::state::get_config;

#[cfg(test)]
use crate::tests::config_mock::mock_state::get_config;

const SYSTEM_INSTRUCTION: &str = "You are Skitty, a diligent worker cat in the Sui ecosystem. \
Your job is to look at raw Sui transaction JSON and explain what happened in simple, friendly \
layman's terms where possible, while still providing all of the details. The user wants to know \
whether the transaction is harmful for them, what it attempts to do, and what the outcome \
actually is. For items being deleted, destroyed, or burned: a coin with zero balance is harmless \
to destroy; for any other object, note that losing it could forfeit dApp progress or airdrops. \
Use a few cat emojis (🐾, 😺) and keep it fun!";

pub struct ExplainUpstream {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl ExplainUpstream {
    pub fn from_config() -> Result<Self, SkittyError> {
        let config = get_config()?;
        let api_key = std::env::var(EXPLAIN_API_KEY_ENV)
            .map_err(|_| SkittyError::ConfigError(format!("{EXPLAIN_API_KEY_ENV} is not set")))?;
        Ok(Self {
            http: reqwest::Client::new(),
            url: config.explain.model_url.clone(),
            api_key,
        })
    }

    #[cfg(test)]
    pub fn for_tests(url: &str) -> Self {
        Self { http: reqwest::Client::new(), url: url.to_string(), api_key: "test-key".to_string() }
    }

    pub async fn explain(&self, transaction_data: &Value) -> Result<String, SkittyError> {
        let prompt = format!(
            "Explain what this Sui transaction attempts to do and what the response says it \
             does, as simply as possible but provide all of the details:\n\n{transaction_data}"
        );
        let body = json!({
            "system_instruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let response = self
            .http
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                SkittyError::InternalServerError(format!(
                    "Explanation request failed: {}",
                    sanitize_error!(e)
                ))
            })?;

        if !response.status().is_success() {
            return Err(SkittyError::InternalServerError(format!(
                "Explanation model returned HTTP {}",
                response.status()
            )));
        }

        let parsed: Value = response.json().await.map_err(|e| {
            SkittyError::InternalServerError(format!(
                "Explanation response is not JSON: {}",
                sanitize_error!(e)
            ))
        })?;

        parsed
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                SkittyError::InternalServerError("Explanation model returned no text".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_explain_extracts_candidate_text() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "candidates": [{
                        "content": { "parts": [{ "text": "All clear 🐾" }] }
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let upstream = ExplainUpstream::for_tests(&server.url());
        let explanation =
            upstream.explain(&json!({ "effects": { "status": "success" } })).await.unwrap();
        assert_eq!(explanation, "All clear 🐾");
    }

    #[tokio::test]
    async fn test_upstream_error_is_internal() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let upstream = ExplainUpstream::for_tests(&server.url());
        let result = upstream.explain(&json!({})).await;
        assert!(matches!(result, Err(SkittyError::InternalServerError(_))));
    }

    #[tokio::test]
    async fn test_missing_candidates_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let upstream = ExplainUpstream::for_tests(&server.url());
        assert!(upstream.explain(&json!({})).await.is_err());
    }
}
