//! Per-conversation orchestration: one state machine per persona chat.
//!
//! idle -> loading -> idle (success) | idle-with-error (failure). Callers
//! drive one turn at a time; a new turn must not start while a previous one
//! is outstanding.

use std::sync::Arc;

use chrono::Local;

use crate::config::Config;
use crate::context::build_context_string;
use crate::entities::{filter_entities_by_text, normalize_entities, SlotRegistry};
use crate::error::Result;
use crate::models::{
    has_reservable_record, ChatMessage, LocationFix, UserContext, WeatherSnapshot, DEFAULT_COORDS,
};
use crate::personas::{get_persona, PersonaProfile};
use crate::recs::RecsSession;
use crate::rewrite::RewriteProvider;
use crate::store::TokenStore;
use crate::telemetry::{TelemetryEvent, TelemetrySink};
use crate::weather::WeatherClient;

/// Error phrase shown instead of raw upstream internal-error messages.
const INTERNAL_ERROR_PHRASE: &str = "recommendation service internal error";

pub struct ChatFlow {
    persona: &'static PersonaProfile,
    session: RecsSession,
    rewriter: RewriteProvider,
    weather: WeatherClient,
    slots: SlotRegistry,
    store: Arc<dyn TokenStore>,
    telemetry: Arc<dyn TelemetrySink>,
    messages: Vec<ChatMessage>,
    cached_weather: Option<WeatherSnapshot>,
    error: Option<String>,
    loading: bool,
}

impl ChatFlow {
    /// Builds a conversation for `persona_id`, restoring any session token
    /// previously persisted for that persona.
    pub async fn new(
        persona_id: &str,
        config: &Config,
        slots: SlotRegistry,
        store: Arc<dyn TokenStore>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        let persona = get_persona(persona_id);
        let mut session = RecsSession::new(config.recs.clone(), telemetry.clone());
        match store.load(persona.id).await {
            Ok(Some(token)) => session.set_chat_id(Some(token)),
            Ok(None) => {}
            Err(err) => {
                tracing::debug!(error = %err, "could not restore persisted session token");
            }
        }

        Self {
            persona,
            session,
            rewriter: RewriteProvider::new(&config.rewrite, telemetry.clone()),
            weather: WeatherClient::new(config.weather.clone()),
            slots,
            store,
            telemetry,
            messages: Vec::new(),
            cached_weather: None,
            error: None,
            loading: false,
        }
    }

    pub fn persona(&self) -> &'static PersonaProfile {
        self.persona
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn chat_id(&self) -> Option<&str> {
        self.session.chat_id()
    }

    pub fn weather(&self) -> Option<&WeatherSnapshot> {
        self.cached_weather.as_ref()
    }

    /// Runs one full turn. The user message lands in the transcript before
    /// any network call; on failure a user-visible error string is set and
    /// no assistant message is appended.
    pub async fn send_turn(&mut self, query: &str, location: &LocationFix) -> Result<()> {
        self.messages.push(ChatMessage::user(query));
        self.loading = true;
        self.error = None;

        let outcome = self.run_turn(query, location).await;

        self.loading = false;
        if let Err(err) = &outcome {
            let message = err.to_string();
            self.error = Some(if message.to_lowercase().contains("internal") {
                INTERNAL_ERROR_PHRASE.to_string()
            } else {
                message
            });
        }
        outcome
    }

    async fn run_turn(&mut self, query: &str, location: &LocationFix) -> Result<()> {
        let (latitude, longitude) = location.coords.unwrap_or(DEFAULT_COORDS);
        let user_context = UserContext::new(latitude, longitude);

        // Weather is optional context, fetched once per conversation
        if self.cached_weather.is_none() {
            match self.weather.fetch(latitude, longitude).await {
                Ok(snapshot) => self.cached_weather = Some(snapshot),
                Err(err) => {
                    tracing::debug!(error = %err, "weather unavailable, continuing without it");
                }
            }
        }

        let context_text = build_context_string(
            self.cached_weather.as_ref(),
            &user_context,
            location.city.as_deref(),
            location.radius_miles,
            Local::now().naive_local(),
        );

        let outbound = [context_text.as_str(), self.persona.preface, query]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("\n\n");

        self.telemetry.record(TelemetryEvent::MessageSent {
            persona_id: self.persona.id,
            message_count: self.messages.len(),
        });

        let exchange = self.session.send_chat(&outbound, &user_context).await?;

        let normalized = normalize_entities(&exchange.entities, &self.slots);

        if let Some(token) = self.session.chat_id() {
            if let Err(err) = self.store.save(self.persona.id, token).await {
                tracing::warn!(error = %err, "failed to persist session token");
            }
        }

        let mut final_text = if exchange.text.is_empty() {
            "No response text returned.".to_string()
        } else {
            exchange.text.clone()
        };

        if !exchange.text.is_empty() {
            let has_reservable = has_reservable_record(&exchange.entities);
            final_text = self
                .rewriter
                .rewrite(self.persona, &outbound, &exchange.text, has_reservable)
                .await;

            self.telemetry.record(TelemetryEvent::ResponseReceived {
                persona_id: self.persona.id,
                entity_count: normalized.len(),
                text_length: final_text.len(),
            });
        }

        // Entity cards follow the rewritten text, not the raw response
        let final_entities = filter_entities_by_text(&final_text, normalized);
        self.messages
            .push(ChatMessage::assistant(final_text, final_entities));

        Ok(())
    }

    /// Returns to a fresh conversation: empty transcript, no error, no
    /// session token in memory or on disk.
    pub async fn reset(&mut self) {
        self.session.reset();
        self.messages.clear();
        self.error = None;
        self.loading = false;
        self.cached_weather = None;
        if let Err(err) = self.store.delete(self.persona.id).await {
            tracing::debug!(error = %err, "failed to delete persisted session token");
        }
    }
}
