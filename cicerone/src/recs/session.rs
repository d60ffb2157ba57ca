//! Stateful client for the conversational recommendation API.
//!
//! Holds the opaque session token (`chat_id`) that binds consecutive
//! requests to one upstream conversation, classifies failures, retries
//! transient statuses with exponential backoff, and recovers once from the
//! upstream internal-error signature by dropping the session.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::RecsConfig;
use crate::error::{CiceroneError, Result};
use crate::models::{RawRecord, UserContext};
use crate::telemetry::{TelemetryEvent, TelemetrySink};

const SERVICE: &str = "recs";

#[derive(Debug, Serialize)]
struct ChatPayload<'a> {
    query: &'a str,
    user_context: &'a UserContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    chat_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseBody {
    chat_id: Option<String>,
    response: Option<ResponseText>,
    #[serde(default)]
    entities: Vec<RawRecord>,
}

#[derive(Debug, Deserialize)]
struct ResponseText {
    text: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize, Default)]
struct ErrorDetail {
    code: Option<String>,
    description: Option<String>,
}

/// One successful chat round trip, as received.
#[derive(Debug, Clone)]
pub struct ChatExchange {
    pub text: String,
    pub entities: Vec<RawRecord>,
    /// Token returned by this response, if any.
    pub chat_id: Option<String>,
}

pub struct RecsSession {
    client: reqwest::Client,
    config: RecsConfig,
    chat_id: Option<String>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl RecsSession {
    pub fn new(config: RecsConfig, telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            chat_id: None,
            telemetry,
        }
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.client
    }

    pub(crate) fn config(&self) -> &RecsConfig {
        &self.config
    }

    pub fn chat_id(&self) -> Option<&str> {
        self.chat_id.as_deref()
    }

    pub fn set_chat_id(&mut self, token: Option<String>) {
        self.chat_id = token;
    }

    /// Drops the session token; the next send starts a fresh conversation.
    pub fn reset(&mut self) {
        self.chat_id = None;
    }

    /// Sends one chat turn, threading the session token when present.
    ///
    /// On the upstream internal-error signature with an active token, the
    /// token is cleared and the whole send is retried exactly once more as a
    /// fresh conversation.
    pub async fn send_chat(
        &mut self,
        query: &str,
        user_context: &UserContext,
    ) -> Result<ChatExchange> {
        let Some(api_key) = self.config.api_key.clone() else {
            return Err(CiceroneError::MissingCredential { service: SERVICE });
        };

        match self.send_once(query, user_context, &api_key).await {
            Err(err) if err.is_internal_upstream() && self.chat_id.is_some() => {
                tracing::warn!(
                    "internal error with an active chat session; clearing token and retrying once"
                );
                self.chat_id = None;
                self.send_once(query, user_context, &api_key).await
            }
            outcome => outcome,
        }
    }

    async fn send_once(
        &mut self,
        query: &str,
        user_context: &UserContext,
        api_key: &str,
    ) -> Result<ChatExchange> {
        let url = format!("{}/chat/v2", self.config.chat_base_url);
        let mut delay = Duration::from_millis(self.config.backoff_ms);
        let mut retries_left = self.config.max_retries;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let payload = ChatPayload {
                query,
                user_context,
                chat_id: self.chat_id.as_deref(),
            };

            let response = match self
                .client
                .post(&url)
                .bearer_auth(api_key)
                .json(&payload)
                .send()
                .await
            {
                Ok(response) => response,
                Err(transport) => {
                    self.emit_api_error(None, None, transport.to_string(), attempt);
                    return Err(transport.into());
                }
            };

            let status = response.status();
            if status.is_success() {
                let body: ChatResponseBody = response.json().await?;
                if let Some(token) = body.chat_id.clone() {
                    self.chat_id = Some(token);
                }
                return Ok(ChatExchange {
                    text: body
                        .response
                        .and_then(|r| r.text)
                        .unwrap_or_default(),
                    entities: body.entities,
                    chat_id: body.chat_id,
                });
            }

            if status == reqwest::StatusCode::UNAUTHORIZED {
                self.emit_api_error(Some(401), None, "Unauthorized".to_string(), attempt);
                return Err(CiceroneError::Unauthorized { service: SERVICE });
            }

            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .unwrap_or_default()
                .error
                .unwrap_or_default();

            let retryable = matches!(status.as_u16(), 429 | 500 | 503 | 504);
            if retryable && retries_left > 0 {
                tracing::debug!(
                    status = status.as_u16(),
                    retries_left,
                    delay_ms = delay.as_millis() as u64,
                    "transient upstream failure, backing off"
                );
                retries_left -= 1;
                tokio::time::sleep(delay).await;
                delay *= 2;
                continue;
            }

            let message = detail
                .description
                .clone()
                .filter(|d| !d.is_empty())
                .or_else(|| Some(body).filter(|b| !b.is_empty()))
                .unwrap_or_else(|| "Unknown recommendation API error".to_string());

            self.emit_api_error(Some(status.as_u16()), detail.code.clone(), message.clone(), attempt);
            return Err(CiceroneError::upstream(
                SERVICE,
                Some(status.as_u16()),
                detail.code,
                message,
            ));
        }
    }

    fn emit_api_error(
        &self,
        status: Option<u16>,
        code: Option<String>,
        message: String,
        attempt: u32,
    ) {
        self.telemetry.record(TelemetryEvent::ApiError {
            service: SERVICE,
            status,
            code,
            message,
            attempt,
            persona_id: None,
            timeout: false,
        });
    }
}
