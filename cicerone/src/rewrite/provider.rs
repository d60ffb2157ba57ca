//! Persona voice rewriting with an ordered strategy list.
//!
//! Strategies are resolved once at startup from configuration and tried in
//! sequence per call; each attempt runs under a hard deadline. When every
//! strategy fails (timeout, transport error, blank output, missing key) the
//! deterministic persona-framing template answers instead, so this component
//! never fails outward.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{
    default_rewrite_base_url, parse_rewrite_model, provider_needs_api_key, RewriteConfig,
    RewriteProviderKind,
};
use crate::error::{CiceroneError, Result};
use crate::personas::PersonaProfile;
use crate::telemetry::{TelemetryEvent, TelemetrySink};

use super::{build_rewrite_prompt, persona_fallback, CompletionClient};

const LOCAL_MODEL_FALLBACK: &str = "llama3";
const PROBE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Transport-level ceiling for completion calls; the per-call rewrite
/// deadline is enforced separately and is always the shorter of the two.
const COMPLETION_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
trait RewriteBackend: Send + Sync {
    fn service(&self) -> &'static str;

    /// Runtime capability check; a backend that reports false is skipped
    /// without counting as a failure.
    async fn available(&self) -> bool;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// OpenAI-compatible backend. When a probe URL is set, availability is a
/// live capability check against the endpoint's model listing; otherwise
/// the backend is available whenever it could be constructed with
/// credentials.
struct ChatCompletionBackend {
    service: &'static str,
    client: Option<CompletionClient>,
    probe: Option<(reqwest::Client, String)>,
}

#[async_trait]
impl RewriteBackend for ChatCompletionBackend {
    fn service(&self) -> &'static str {
        self.service
    }

    async fn available(&self) -> bool {
        if self.client.is_none() {
            return false;
        }
        match &self.probe {
            None => true,
            Some((http, url)) => http
                .get(url)
                .send()
                .await
                .map(|response| response.status().is_success())
                .unwrap_or(false),
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let client = self.client.as_ref().ok_or(CiceroneError::MissingCredential {
            service: "rewrite",
        })?;
        client.complete(prompt).await
    }
}

pub struct RewriteProvider {
    backends: Vec<Box<dyn RewriteBackend>>,
    deadline: Duration,
    telemetry: Arc<dyn TelemetrySink>,
}

impl RewriteProvider {
    pub fn new(config: &RewriteConfig, telemetry: Arc<dyn TelemetrySink>) -> Self {
        let deadline = Duration::from_millis(config.timeout_ms);
        let mut backends: Vec<Box<dyn RewriteBackend>> = Vec::new();

        // Optional local path first, behind a capability probe
        if config.provider == RewriteProviderKind::Local {
            let (_, model) = parse_rewrite_model(&config.model);
            let model = if model.is_empty() {
                LOCAL_MODEL_FALLBACK
            } else {
                model
            };
            if let Ok(client) = CompletionClient::new(
                &config.local_base_url,
                None,
                model,
                config.max_tokens,
                COMPLETION_HTTP_TIMEOUT,
            ) {
                let probe_http = reqwest::Client::builder()
                    .timeout(PROBE_TIMEOUT)
                    .build()
                    .unwrap_or_default();
                backends.push(Box::new(ChatCompletionBackend {
                    service: "rewrite-local",
                    client: Some(client),
                    probe: Some((probe_http, format!("{}/models", config.local_base_url))),
                }));
            }
        }

        backends.push(Box::new(Self::remote_backend(config)));

        Self {
            backends,
            deadline,
            telemetry,
        }
    }

    fn remote_backend(config: &RewriteConfig) -> ChatCompletionBackend {
        let (provider, model) = parse_rewrite_model(&config.model);
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| default_rewrite_base_url(provider).to_string());

        let has_credentials =
            config.api_key.is_some() || !provider_needs_api_key(provider);
        let client = if has_credentials {
            CompletionClient::new(
                &base_url,
                config.api_key.as_deref(),
                model,
                config.max_tokens,
                COMPLETION_HTTP_TIMEOUT,
            )
            .ok()
        } else {
            None
        };

        ChatCompletionBackend {
            service: "rewrite",
            client,
            probe: None,
        }
    }

    /// Restyles `raw_text` in the persona's voice. Always returns a usable
    /// string; generation failures degrade to the persona template.
    pub async fn rewrite(
        &self,
        persona: &'static PersonaProfile,
        original_query: &str,
        raw_text: &str,
        has_reservable: bool,
    ) -> String {
        let prompt = build_rewrite_prompt(persona, original_query, raw_text, has_reservable);

        for backend in &self.backends {
            if !backend.available().await {
                continue;
            }
            match tokio::time::timeout(self.deadline, backend.generate(&prompt)).await {
                Ok(Ok(text)) if !text.trim().is_empty() => return text.trim().to_string(),
                Ok(Ok(_)) => {
                    self.emit_failure(backend.service(), persona, false, "empty completion");
                }
                Ok(Err(err)) => {
                    self.emit_failure(backend.service(), persona, false, &err.to_string());
                }
                Err(_elapsed) => {
                    let err = CiceroneError::RewriteTimeout(self.deadline);
                    self.emit_failure(backend.service(), persona, true, &err.to_string());
                }
            }
        }

        persona_fallback(persona, raw_text)
    }

    fn emit_failure(
        &self,
        service: &'static str,
        persona: &'static PersonaProfile,
        timeout: bool,
        message: &str,
    ) {
        self.telemetry.record(TelemetryEvent::ApiError {
            service,
            status: None,
            code: None,
            message: message.to_string(),
            attempt: 1,
            persona_id: Some(persona.id),
            timeout,
        });
    }
}
