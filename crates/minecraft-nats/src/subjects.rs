//! NATS subject patterns for the world gateway integration
//!
//! Subject pattern: `mc.{prefix}.{direction}.{entity}.{action}`
//!
//! World signals (gateway → bridge):
//! - `mc.{prefix}.world.signal`
//!
//! Gateway commands (bridge → gateway):
//! - `mc.{prefix}.gateway.session.connect`
//! - `mc.{prefix}.gateway.session.end`
//! - `mc.{prefix}.gateway.chat.send`
//! - `mc.{prefix}.gateway.chat.whisper`
//! - `mc.{prefix}.gateway.player.respawn`
//! - `mc.{prefix}.gateway.move.follow`
//! - `mc.{prefix}.gateway.move.stop`

/// Subject builders for world signals (gateway → bridge)
pub mod world {
    /// Raw signal stream subject
    pub fn signal(prefix: &str) -> String {
        format!("mc.{}.world.signal", prefix)
    }

    /// Wildcard for everything the gateway publishes
    pub fn all(prefix: &str) -> String {
        format!("mc.{}.world.>", prefix)
    }
}

/// Subject builders for gateway commands (bridge → gateway)
pub mod gateway {
    /// Open a new world session
    pub fn session_connect(prefix: &str) -> String {
        format!("mc.{}.gateway.session.connect", prefix)
    }

    /// Tear down the current world session
    pub fn session_end(prefix: &str) -> String {
        format!("mc.{}.gateway.session.end", prefix)
    }

    /// Send a public chat line
    pub fn chat_send(prefix: &str) -> String {
        format!("mc.{}.gateway.chat.send", prefix)
    }

    /// Send a private message
    pub fn chat_whisper(prefix: &str) -> String {
        format!("mc.{}.gateway.chat.whisper", prefix)
    }

    /// Respawn after death
    pub fn player_respawn(prefix: &str) -> String {
        format!("mc.{}.gateway.player.respawn", prefix)
    }

    /// Start following a player
    pub fn move_follow(prefix: &str) -> String {
        format!("mc.{}.gateway.move.follow", prefix)
    }

    /// Stop any movement goal
    pub fn move_stop(prefix: &str) -> String {
        format!("mc.{}.gateway.move.stop", prefix)
    }

    /// Wildcard for all gateway commands
    pub fn all(prefix: &str) -> String {
        format!("mc.{}.gateway.>", prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_subjects() {
        assert_eq!(world::signal("prod"), "mc.prod.world.signal");
        assert_eq!(world::all("prod"), "mc.prod.world.>");
    }

    #[test]
    fn test_gateway_subjects() {
        assert_eq!(
            gateway::session_connect("prod"),
            "mc.prod.gateway.session.connect"
        );
        assert_eq!(gateway::session_end("prod"), "mc.prod.gateway.session.end");
        assert_eq!(gateway::chat_send("prod"), "mc.prod.gateway.chat.send");
        assert_eq!(
            gateway::chat_whisper("prod"),
            "mc.prod.gateway.chat.whisper"
        );
        assert_eq!(
            gateway::player_respawn("prod"),
            "mc.prod.gateway.player.respawn"
        );
        assert_eq!(gateway::move_follow("prod"), "mc.prod.gateway.move.follow");
        assert_eq!(gateway::move_stop("prod"), "mc.prod.gateway.move.stop");
        assert_eq!(gateway::all("prod"), "mc.prod.gateway.>");
    }

    #[test]
    fn test_prefix_substitution() {
        assert_eq!(world::signal("dev"), "mc.dev.world.signal");
        assert_eq!(
            gateway::chat_send("staging"),
            "mc.staging.gateway.chat.send"
        );
    }
}
