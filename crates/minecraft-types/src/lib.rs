//! Shared types for the Minecraft world gateway and bridge

pub mod commands;
pub mod events;
pub mod feedback;
pub mod identity;
pub mod signals;
pub mod snapshot;
pub mod watchlist;

pub use commands::*;
pub use events::WorldEvent;
pub use feedback::{FeedbackKind, FeedbackRecord, FeedbackSource};
pub use identity::derive_identity;
pub use signals::{Position, SignalEnvelope, SignalMetadata, WeatherState, WorldSignal};
pub use snapshot::{DayPhase, PlayerSnapshot};
pub use watchlist::WatchLists;
