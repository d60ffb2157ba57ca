//! Persona-driven local-guide chat engine.
//!
//! Pipeline per turn: build a situational context preamble, send the
//! prefaced query to the conversational recommendation API (keeping the
//! multi-turn session token alive), normalize the returned business
//! entities, restyle the reply in the selected persona's voice, then keep
//! only the entities the styled text actually mentions.

pub mod config;
pub mod context;
pub mod entities;
pub mod error;
pub mod flow;
pub mod models;
pub mod palette;
pub mod personas;
pub mod recs;
pub mod rewrite;
pub mod store;
pub mod telemetry;
pub mod weather;
