//! vbcast-player specific configuration

use crate::playback::ticker::DEFAULT_TICK_INTERVAL;
use std::time::Duration;
use vbcast_common::config::TomlConfig;
use vbcast_common::time::millis_to_duration;

/// Default distance to the end under which a stopped broadcast is considered finished
pub const DEFAULT_END_OF_TRACK_THRESHOLD_MS: u64 = 50;

/// Voice broadcast player configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    /// Position sampling period while playing
    pub tick_interval: Duration,
    /// Stopping closer than this to the end forgets the saved position
    pub end_of_track_threshold_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            end_of_track_threshold_ms: DEFAULT_END_OF_TRACK_THRESHOLD_MS,
        }
    }
}

impl From<&TomlConfig> for PlayerConfig {
    fn from(config: &TomlConfig) -> Self {
        Self {
            tick_interval: millis_to_duration(config.player.tick_interval_ms),
            end_of_track_threshold_ms: config.player.end_of_track_threshold_ms,
        }
    }
}
