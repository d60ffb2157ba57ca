use std::sync::{Arc, Mutex};

/// Structured events emitted by the pipeline for external analytics.
///
/// The analytics backend itself is an external collaborator; the crate only
/// guarantees that terminal API failures and turn milestones are reported
/// through this seam, and that reporting can never affect the caller.
#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    ApiError {
        service: &'static str,
        status: Option<u16>,
        code: Option<String>,
        message: String,
        attempt: u32,
        persona_id: Option<&'static str>,
        timeout: bool,
    },
    MessageSent {
        persona_id: &'static str,
        message_count: usize,
    },
    ResponseReceived {
        persona_id: &'static str,
        entity_count: usize,
        text_length: usize,
    },
}

pub trait TelemetrySink: Send + Sync {
    fn record(&self, event: TelemetryEvent);
}

/// Default sink: structured `tracing` events.
#[derive(Debug, Clone, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn record(&self, event: TelemetryEvent) {
        match event {
            TelemetryEvent::ApiError {
                service,
                status,
                code,
                message,
                attempt,
                persona_id,
                timeout,
            } => {
                tracing::warn!(
                    service,
                    status,
                    code = ?code,
                    attempt,
                    persona_id,
                    timeout,
                    message = %message,
                    "API error"
                );
            }
            TelemetryEvent::MessageSent {
                persona_id,
                message_count,
            } => {
                tracing::info!(persona_id, message_count, "message sent");
            }
            TelemetryEvent::ResponseReceived {
                persona_id,
                entity_count,
                text_length,
            } => {
                tracing::info!(persona_id, entity_count, text_length, "response received");
            }
        }
    }
}

/// Captures events in memory; intended for tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<TelemetryEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn api_error_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, TelemetryEvent::ApiError { .. }))
            .count()
    }
}

impl TelemetrySink for RecordingSink {
    fn record(&self, event: TelemetryEvent) {
        self.events.lock().unwrap().push(event);
    }
}
