#[cfg(test)]
mod tests {
    use minecraft_nats::{subjects, MockClock, MockPublisher};
    use minecraft_types::{SignalEnvelope, SignalMetadata, WorldSignal};
    use tokio::sync::watch;

    use crate::bridge::{SignalFlow, WorldBridge};
    use crate::config::Config;
    use crate::feedback::MemoryFeedbackStore;
    use crate::llm::ClaudeClient;
    use crate::relay::mock::MockRelay;
    use crate::relay::RelayPayload;

    type TestBridge =
        WorldBridge<MockPublisher, MockRelay, MockClock, ClaudeClient, MemoryFeedbackStore>;

    struct Fixture {
        bridge: TestBridge,
        mock: MockPublisher,
        relay: MockRelay,
        identity: String,
        // Held so the shutdown channel stays open for the test's duration
        _shutdown: watch::Sender<bool>,
    }

    async fn fixture() -> Fixture {
        let mock = MockPublisher::new("test");
        let relay = MockRelay::new();
        let (tx, rx) = watch::channel(false);

        let mut bridge = TestBridge::new(
            mock.clone(),
            MockClock::new(),
            relay.clone(),
            None,
            MemoryFeedbackStore::new(),
            &Config::default(),
            None,
            rx,
        );
        bridge.set_welcome_chance(0.0);

        let identity = bridge.manager.begin_attempt().await.unwrap();
        bridge.normalizer.begin_session(&identity);
        mock.clear();

        Fixture {
            bridge,
            mock,
            relay,
            identity,
            _shutdown: tx,
        }
    }

    fn envelope(identity: &str, signal: WorldSignal) -> SignalEnvelope {
        SignalEnvelope {
            metadata: SignalMetadata::new(identity, 1),
            signal,
        }
    }

    async fn settle() {
        for _ in 0..50 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_chat_signal_relays_and_continues() {
        let mut f = fixture().await;

        let flow = f
            .bridge
            .handle_envelope(&envelope(
                &f.identity,
                WorldSignal::Chat {
                    username: "alice".to_string(),
                    message: "hello".to_string(),
                },
            ))
            .await
            .unwrap();

        assert_eq!(flow, SignalFlow::Continue);
        let sent = f.relay.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0],
            RelayPayload::Text("**[MC]** alice: hello".to_string())
        );
    }

    #[tokio::test]
    async fn test_command_in_chat_answers_in_world() {
        let mut f = fixture().await;

        f.bridge
            .handle_envelope(&envelope(
                &f.identity,
                WorldSignal::Chat {
                    username: "alice".to_string(),
                    message: "bot status".to_string(),
                },
            ))
            .await
            .unwrap();

        let chats = f.mock.published_to(&subjects::gateway::chat_send("test"));
        assert_eq!(chats.len(), 1);
        assert!(chats[0]["message"].as_str().unwrap().contains("Health"));
    }

    #[tokio::test]
    async fn test_kick_ends_the_session() {
        let mut f = fixture().await;

        let flow = f
            .bridge
            .handle_envelope(&envelope(
                &f.identity,
                WorldSignal::Kicked {
                    reason: "duplicate_login".to_string(),
                },
            ))
            .await
            .unwrap();

        assert_eq!(
            flow,
            SignalFlow::SessionOver(Some("duplicate_login".to_string()))
        );
        // The kick was also surfaced to the relay
        assert_eq!(f.relay.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_end_carries_reason() {
        let mut f = fixture().await;

        let flow = f
            .bridge
            .handle_envelope(&envelope(
                &f.identity,
                WorldSignal::Ended {
                    reason: Some("socketClosed".to_string()),
                },
            ))
            .await
            .unwrap();

        assert_eq!(flow, SignalFlow::SessionOver(Some("socketClosed".to_string())));
    }

    #[tokio::test]
    async fn test_stale_session_signals_are_dropped() {
        let mut f = fixture().await;

        let flow = f
            .bridge
            .handle_envelope(&envelope(
                "AIBot_0000",
                WorldSignal::Chat {
                    username: "alice".to_string(),
                    message: "ghost message".to_string(),
                },
            ))
            .await
            .unwrap();

        assert_eq!(flow, SignalFlow::Continue);
        assert!(f.relay.sent().is_empty(), "stale signals must not be relayed");
        assert!(f.mock.is_empty());
    }

    #[tokio::test]
    async fn test_death_triggers_auto_respawn() {
        let mut f = fixture().await;

        f.bridge
            .handle_envelope(&envelope(&f.identity, WorldSignal::Died { position: None }))
            .await
            .unwrap();
        settle().await;

        let respawns = f
            .mock
            .published_to(&subjects::gateway::player_respawn("test"));
        assert_eq!(respawns.len(), 1);
    }

    #[tokio::test]
    async fn test_player_join_can_trigger_welcome() {
        let mut f = fixture().await;
        f.bridge.set_welcome_chance(1.0);

        f.bridge
            .handle_envelope(&envelope(
                &f.identity,
                WorldSignal::PlayerJoined {
                    username: "newcomer".to_string(),
                    online: 2,
                },
            ))
            .await
            .unwrap();
        settle().await;

        let chats = f.mock.published_to(&subjects::gateway::chat_send("test"));
        assert_eq!(chats.len(), 1);
        assert!(chats[0]["message"]
            .as_str()
            .unwrap()
            .contains("Welcome to the server, newcomer"));
    }

    #[tokio::test]
    async fn test_own_chat_echo_is_ignored() {
        let mut f = fixture().await;

        f.bridge
            .handle_envelope(&envelope(
                &f.identity,
                WorldSignal::Chat {
                    username: f.identity.clone(),
                    message: "✦ AI: my own reply".to_string(),
                },
            ))
            .await
            .unwrap();

        assert!(f.relay.sent().is_empty());
        assert!(f.mock.is_empty());
    }
}
