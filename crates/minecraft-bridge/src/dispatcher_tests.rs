#[cfg(test)]
mod tests {
    use crate::dispatcher::{render, NotificationDispatcher};
    use crate::relay::mock::MockRelay;
    use crate::relay::RelayPayload;
    use minecraft_types::{DayPhase, WorldEvent};

    fn chat(username: &str, message: &str) -> WorldEvent {
        WorldEvent::Chat {
            username: username.to_string(),
            message: message.to_string(),
            private: false,
        }
    }

    // ── render ───────────────────────────────────────────────────────────

    #[test]
    fn test_chat_renders_as_plain_text() {
        let payload = render(&chat("alice", "hello")).unwrap();
        assert_eq!(
            payload,
            RelayPayload::Text("**[MC]** alice: hello".to_string())
        );
    }

    #[test]
    fn test_whisper_is_not_relayed() {
        let event = WorldEvent::Chat {
            username: "alice".to_string(),
            message: "psst".to_string(),
            private: true,
        };
        assert!(render(&event).is_none());
    }

    #[test]
    fn test_connected_notification_carries_gauges() {
        let event = WorldEvent::Connected {
            identity: "AIBot_1234".to_string(),
            host: "play.example.net".to_string(),
            port: 25565,
            health: 20.0,
            food: 20,
            phase: Some(DayPhase::Day),
            online: 3,
        };
        let RelayPayload::Notification(n) = render(&event).unwrap() else {
            panic!("expected notification");
        };
        assert_eq!(n.title, "🟢 Bot Connected");
        assert_eq!(n.color, 0x00ff00);
        assert!(n.body.contains("AIBot_1234"));
        assert!(n
            .fields
            .iter()
            .any(|(name, value)| name.contains("Health") && value == "20/20"));
        assert!(n
            .fields
            .iter()
            .any(|(name, value)| name.contains("Players") && value == "3"));
    }

    #[test]
    fn test_sunset_and_sunrise_titles() {
        let night = WorldEvent::TimeTransition {
            phase: DayPhase::Night,
            time_of_day: 13000,
        };
        let RelayPayload::Notification(n) = render(&night).unwrap() else {
            panic!("expected notification");
        };
        assert_eq!(n.title, "🌙 Sunset");
        assert_eq!(n.color, 0x000080);

        let day = WorldEvent::TimeTransition {
            phase: DayPhase::Day,
            time_of_day: 100,
        };
        let RelayPayload::Notification(n) = render(&day).unwrap() else {
            panic!("expected notification");
        };
        assert_eq!(n.title, "☀️ Sunrise");
    }

    #[test]
    fn test_disconnected_defaults_reason() {
        let event = WorldEvent::Disconnected {
            reason: None,
            deaths: 2,
        };
        let RelayPayload::Notification(n) = render(&event).unwrap() else {
            panic!("expected notification");
        };
        assert_eq!(n.body, "Unknown reason");
        assert!(n.fields.iter().any(|(_, v)| v == "2"));
    }

    #[test]
    fn test_long_kick_reason_is_bounded() {
        let event = WorldEvent::Kicked {
            reason: "x".repeat(2000),
        };
        let RelayPayload::Notification(n) = render(&event).unwrap() else {
            panic!("expected notification");
        };
        assert!(n.body.chars().count() <= 257);
    }

    // ── dispatch ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_dispatch_sends_when_ready() {
        let relay = MockRelay::new();
        let dispatcher = NotificationDispatcher::new(relay.clone());

        dispatcher.dispatch(&chat("alice", "hi")).await;

        let sent = relay.sent();
        assert_eq!(sent.len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_is_noop_when_not_ready() {
        let relay = MockRelay::not_ready();
        let dispatcher = NotificationDispatcher::new(relay.clone());

        dispatcher.dispatch(&chat("alice", "hi")).await;

        assert!(relay.sent().is_empty(), "not-ready relay must drop events");
    }

    #[tokio::test]
    async fn test_dispatch_swallows_send_failures() {
        let relay = MockRelay::failing();
        let dispatcher = NotificationDispatcher::new(relay);

        // Must not panic or propagate
        dispatcher.dispatch(&chat("alice", "hi")).await;
    }

    #[tokio::test]
    async fn test_dispatch_skips_unrenderable_events() {
        let relay = MockRelay::new();
        let dispatcher = NotificationDispatcher::new(relay.clone());

        let whisper = WorldEvent::Chat {
            username: "alice".to_string(),
            message: "psst".to_string(),
            private: true,
        };
        dispatcher.dispatch(&whisper).await;
        assert!(relay.sent().is_empty());
    }
}
