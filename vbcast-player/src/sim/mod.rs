//! Simulated host
//!
//! Self-contained implementations of every host capability, used by the
//! `vbcast-player` binary and by tests:
//! - [`TimedMediaBackend`]: units that play on a timer
//! - [`FileContentResolver`]: chunk payloads read from a directory
//! - [`ScriptedBroadcast`]: broadcast streams replaying a TOML script

mod backend;
mod resolver;
mod script;

pub use backend::{TimedMediaBackend, TimedUnit, MEDIA_ERROR_MALFORMED};
pub use resolver::FileContentResolver;
pub use script::{BroadcastScript, ScriptedBroadcast, ScriptedChunk};
