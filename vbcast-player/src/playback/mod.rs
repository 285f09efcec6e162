//! Voice broadcast playback: playlist, live mode, dual-player engine and
//! the player orchestrating them

pub mod dual_player;
pub mod listeners;
pub mod live_mode;
pub mod player;
pub mod playlist;
pub mod ticker;

pub use dual_player::{DualPlayer, PreparedUnit, UnitFactory};
pub use listeners::{Listener, ListenerRegistry};
pub use live_mode::{resolve_live_listening, LiveModeInputs, SeekRequest};
pub use player::{PlayerDependencies, VoiceBroadcastPlayer};
pub use playlist::{Playlist, PlaylistItem};
pub use ticker::PlaybackTicker;
