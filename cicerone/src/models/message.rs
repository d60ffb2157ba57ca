use nanoid::nanoid;
use serde::{Deserialize, Serialize};

use super::Entity;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One transcript entry. The transcript is append-only; insertion order is
/// chronological and significant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<Entity>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: nanoid!(),
            role: Role::User,
            text: text.into(),
            entities: Vec::new(),
        }
    }

    pub fn assistant(text: impl Into<String>, entities: Vec<Entity>) -> Self {
        Self {
            id: nanoid!(),
            role: Role::Assistant,
            text: text.into(),
            entities,
        }
    }
}
