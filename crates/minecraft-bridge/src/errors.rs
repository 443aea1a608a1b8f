//! Disconnect fault classification
//!
//! Kick and end reasons arrive as free-form strings from the gateway.
//! Classification decides the log level and whether the next attempt
//! needs anything beyond the usual identity rotation.

use tracing::{info, warn};

/// Why a session attempt or an active session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Server unreachable or refusing connections
    Refused,
    /// Connect or protocol handshake timed out
    TimedOut,
    /// Rejected because the identity is already logged in
    DuplicateIdentity,
    /// Kicked by the server for some other reason
    Kicked,
    /// Transport ended (server shutdown, socket closed, ...)
    Ended,
}

impl FaultKind {
    pub fn label(&self) -> &'static str {
        match self {
            FaultKind::Refused => "connection refused",
            FaultKind::TimedOut => "timed out",
            FaultKind::DuplicateIdentity => "duplicate identity",
            FaultKind::Kicked => "kicked",
            FaultKind::Ended => "connection ended",
        }
    }
}

/// Classify a disconnect/kick reason string.
pub fn classify_disconnect(reason: &str) -> FaultKind {
    let reason = reason.to_lowercase();

    if reason.contains("duplicate_login") || reason.contains("logged in from another location") {
        FaultKind::DuplicateIdentity
    } else if reason.contains("econnrefused")
        || reason.contains("enotfound")
        || reason.contains("connection refused")
    {
        FaultKind::Refused
    } else if reason.contains("etimedout") || reason.contains("timed out") {
        FaultKind::TimedOut
    } else if reason.contains("kick") {
        FaultKind::Kicked
    } else {
        FaultKind::Ended
    }
}

/// Log a disconnect at the level its classification deserves.
///
/// A socket quietly closing is routine on servers that suspend when idle;
/// duplicate-identity rejections and kicks are worth a warning.
pub fn log_disconnect(context: &str, reason: &str) -> FaultKind {
    let kind = classify_disconnect(reason);
    match kind {
        FaultKind::DuplicateIdentity => {
            warn!(
                "{}: {} - next attempt will rotate the identity",
                context, reason
            );
        }
        FaultKind::Kicked => warn!("{}: kicked ({})", context, reason),
        FaultKind::Refused => {
            warn!("{}: {} - server may be offline or starting up", context, reason);
        }
        FaultKind::TimedOut => warn!("{}: {} - server response too slow", context, reason),
        FaultKind::Ended => info!("{}: {}", context, reason),
    }
    kind
}
