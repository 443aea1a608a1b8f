#[cfg(test)]
mod tests {
    use crate::config::MinecraftConfig;
    use crate::errors::FaultKind;
    use crate::session::{SessionManager, SessionSettings, SessionState};
    use minecraft_nats::{subjects, MockPublisher};

    fn settings() -> SessionSettings {
        let mut config = MinecraftConfig::default();
        config.host = "play.example.net".to_string();
        config.port = 48688;
        config.username = "AIBot".to_string();
        config.max_reconnect_attempts = 3;
        SessionSettings::from_config(&config)
    }

    fn manager() -> SessionManager<MockPublisher> {
        SessionManager::new(MockPublisher::new("test"), settings())
    }

    #[test]
    fn test_starts_disconnected() {
        let manager = manager();
        assert_eq!(manager.state(), SessionState::Disconnected);
        assert_eq!(manager.failures(), 0);
        assert!(!manager.attempts_exhausted());
    }

    #[tokio::test]
    async fn test_begin_attempt_publishes_connect_with_fresh_identity() {
        let mock = MockPublisher::new("test");
        let mut manager = SessionManager::new(mock.clone(), settings());

        let identity = manager.begin_attempt().await.unwrap();

        assert!(identity.starts_with("AIBot_"));
        assert_eq!(manager.state(), SessionState::Connecting);
        assert_eq!(manager.session().attempt, 1);

        let connects = mock.published_to(&subjects::gateway::session_connect("test"));
        assert_eq!(connects.len(), 1);
        assert_eq!(connects[0]["host"], "play.example.net");
        assert_eq!(connects[0]["port"], 48688);
        assert_eq!(connects[0]["username"], identity);
    }

    #[tokio::test]
    async fn test_double_connect_is_rejected() {
        let mut manager = manager();
        manager.begin_attempt().await.unwrap();

        // Second attempt without a teardown must fail: the previous
        // transport has not been released.
        let result = manager.begin_attempt().await;
        assert!(result.is_err());
        assert_eq!(manager.state(), SessionState::Connecting);
    }

    #[tokio::test]
    async fn test_teardown_publishes_end_and_releases() {
        let mock = MockPublisher::new("test");
        let mut manager = SessionManager::new(mock.clone(), settings());
        manager.begin_attempt().await.unwrap();

        manager.teardown(Some("spawn timeout")).await;

        assert_eq!(manager.state(), SessionState::Disconnected);
        let ends = mock.published_to(&subjects::gateway::session_end("test"));
        assert_eq!(ends.len(), 1);
        assert_eq!(ends[0]["reason"], "spawn timeout");

        // Released, so a new attempt is allowed again
        assert!(manager.begin_attempt().await.is_ok());
    }

    #[tokio::test]
    async fn test_teardown_without_session_is_a_noop() {
        let mock = MockPublisher::new("test");
        let mut manager = SessionManager::new(mock.clone(), settings());

        manager.teardown(None).await;
        assert!(mock.is_empty());
    }

    #[tokio::test]
    async fn test_identity_rotates_between_attempts() {
        let mut manager = manager();

        let first = manager.begin_attempt().await.unwrap();
        manager.teardown(None).await;
        manager.record_failure(Some("connect ETIMEDOUT"));

        // Identity derivation is clock-based; wait long enough for the
        // millisecond suffix to move.
        tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;

        let second = manager.begin_attempt().await.unwrap();
        assert_ne!(first, second, "retry must not reuse the identity");
        assert!(second.starts_with("AIBot_"));
    }

    #[tokio::test]
    async fn test_failures_accumulate_until_cap() {
        let mut manager = manager();

        for expected in 1..=3u32 {
            manager.begin_attempt().await.unwrap();
            manager.teardown(None).await;
            manager.record_failure(Some("connect ECONNREFUSED"));
            assert_eq!(manager.failures(), expected);
        }
        assert!(manager.attempts_exhausted());
    }

    #[tokio::test]
    async fn test_mark_active_resets_failure_count() {
        let mut manager = manager();

        manager.begin_attempt().await.unwrap();
        manager.teardown(None).await;
        manager.record_failure(Some("connect ECONNREFUSED"));

        manager.begin_attempt().await.unwrap();
        manager.mark_active();

        assert_eq!(manager.state(), SessionState::Active);
        assert_eq!(manager.failures(), 0);
        assert!(!manager.attempts_exhausted());
    }

    #[tokio::test]
    async fn test_record_failure_classifies_reason() {
        let mut manager = manager();
        manager.begin_attempt().await.unwrap();

        let kind = manager.record_failure(Some(
            r#"{"translate":"multiplayer.disconnect.duplicate_login"}"#,
        ));
        assert_eq!(kind, FaultKind::DuplicateIdentity);
        assert_eq!(manager.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_session_accessor_returns_snapshot() {
        let mut manager = manager();
        manager.begin_attempt().await.unwrap();

        let before = manager.session();
        manager.mark_active();

        // The snapshot taken earlier does not observe later transitions
        assert_eq!(before.state, SessionState::Connecting);
        assert_eq!(manager.session().state, SessionState::Active);
    }
}
