//! # vbcast Player Library (vbcast-player)
//!
//! Listening engine for voice broadcasts: a single continuous recording
//! published as numbered audio chunks, possibly still growing.
//!
//! **Purpose:** Play the chunks back to back without gaps, follow the live
//! edge while the broadcast is running, and report playing state, live mode
//! and position to observers.
//!
//! **Architecture:** A control task owns the state machine; audio decoding,
//! content download and broadcast streams are host capabilities behind
//! traits (see [`media`] and [`sources`]). The [`sim`] module provides a
//! timer-driven implementation of all of them.

pub mod config;
pub mod error;
pub mod media;
pub mod playback;
pub mod sim;
pub mod sources;
pub mod state;
pub mod tracker;

pub use config::PlayerConfig;
pub use error::{Error, ListeningError, MediaError, Result};
pub use playback::{Listener, PlayerDependencies, VoiceBroadcastPlayer};
pub use state::{PlayerSnapshot, PlayingState};
