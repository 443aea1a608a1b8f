//! In-memory mock publisher for unit tests

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::error::Result;
use crate::messaging::Publish;

/// Captured publish: (full subject string, JSON value of the message)
pub type CapturedMessage = (String, serde_json::Value);

/// Publisher that records everything instead of talking to NATS.
///
/// Use in tests wherever a component is generic over [`Publish`].
#[derive(Clone)]
pub struct MockPublisher {
    prefix: String,
    messages: Arc<Mutex<Vec<CapturedMessage>>>,
}

impl MockPublisher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            messages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Snapshot of all captured (subject, value) pairs in publish order.
    pub fn published(&self) -> Vec<CapturedMessage> {
        self.messages.lock().unwrap().clone()
    }

    /// Captured messages on one subject only.
    pub fn published_to(&self, subject: &str) -> Vec<serde_json::Value> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| s == subject)
            .map(|(_, v)| v.clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().unwrap().is_empty()
    }

    pub fn clear(&self) {
        self.messages.lock().unwrap().clear();
    }
}

impl Publish for MockPublisher {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    async fn publish<T: Serialize + Sync>(
        &self,
        subject: impl AsRef<str> + Send,
        message: &T,
    ) -> Result<()> {
        let subject = subject.as_ref().to_string();
        let value = serde_json::to_value(message).map_err(crate::error::Error::Serialization)?;
        self.messages.lock().unwrap().push((subject, value));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Ping {
        n: u32,
    }

    #[tokio::test]
    async fn test_mock_records_in_order() {
        let mock = MockPublisher::new("test");
        mock.publish("a.b", &Ping { n: 1 }).await.unwrap();
        mock.publish("a.c", &Ping { n: 2 }).await.unwrap();

        let msgs = mock.published();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].0, "a.b");
        assert_eq!(msgs[1].1["n"], 2);
    }

    #[tokio::test]
    async fn test_published_to_filters_by_subject() {
        let mock = MockPublisher::new("test");
        mock.publish("x.one", &Ping { n: 1 }).await.unwrap();
        mock.publish("x.two", &Ping { n: 2 }).await.unwrap();
        mock.publish("x.one", &Ping { n: 3 }).await.unwrap();

        let one = mock.published_to("x.one");
        assert_eq!(one.len(), 2);
        assert_eq!(one[1]["n"], 3);
    }

    #[tokio::test]
    async fn test_clear_empties_the_log() {
        let mock = MockPublisher::new("test");
        mock.publish("a", &Ping { n: 1 }).await.unwrap();
        assert!(!mock.is_empty());
        mock.clear();
        assert!(mock.is_empty());
        assert_eq!(mock.count(), 0);
    }
}
