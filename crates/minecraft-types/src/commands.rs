//! Commands published by the bridge to the world gateway

use serde::{Deserialize, Serialize};

/// Open a new world session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectSessionCommand {
    pub host: String,
    pub port: u16,
    /// Freshly derived identity for this attempt
    pub username: String,
    /// Protocol version to pin, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Tear down the current world session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndSessionCommand {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Send a public chat line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCommand {
    pub message: String,
}

/// Send a private message to a player
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WhisperCommand {
    pub username: String,
    pub message: String,
}

/// Respawn after death
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RespawnCommand {}

/// Start following a player
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FollowCommand {
    pub username: String,
    /// Follow distance in blocks
    #[serde(default = "default_follow_range")]
    pub range: u32,
}

fn default_follow_range() -> u32 {
    3
}

/// Stop any active movement goal
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StopMovementCommand {}
