//! # vbcast Common Library
//!
//! Shared code for the voice broadcast listening engine and its hosts:
//! - Broadcast model types (broadcasts, state events, chunks)
//! - Event types (PlayerNotification enum) and the EventBus
//! - Bootstrap configuration loading
//! - Tracing initialisation
//! - Timestamp helpers

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod model;
pub mod time;

pub use error::{Error, Result};
pub use model::{AudioContent, VoiceBroadcast, VoiceBroadcastChunk, VoiceBroadcastEvent, VoiceBroadcastState};
