//! Typed publish/subscribe helpers over NATS

use std::future::Future;

use async_nats::Client;
use futures::StreamExt;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, trace};

use crate::error::{Error, Result};

/// Trait for publishing messages to a transport.
///
/// Implemented by `MessagePublisher` (real NATS) and `MockPublisher`
/// (in-memory, tests). Futures are `Send` so callers can hand a clone of
/// the publisher to spawned delivery tasks.
pub trait Publish: Send + Sync {
    fn prefix(&self) -> &str;

    fn publish<T: Serialize + Sync>(
        &self,
        subject: impl AsRef<str> + Send,
        message: &T,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Publisher for gateway commands
#[derive(Clone)]
pub struct MessagePublisher {
    client: Client,
    prefix: String,
}

impl MessagePublisher {
    pub fn new(client: Client, prefix: impl Into<String>) -> Self {
        Self {
            client,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Serialize and publish a message to a subject
    pub async fn publish<T: Serialize>(&self, subject: impl AsRef<str>, message: &T) -> Result<()> {
        let subject = subject.as_ref();
        let payload = serde_json::to_vec(message).map_err(Error::Serialization)?;

        trace!(
            "Publishing to subject: {}, size: {} bytes",
            subject,
            payload.len()
        );

        self.client
            .publish(subject.to_string(), payload.into())
            .await
            .map_err(|e| Error::Publish(format!("Failed to publish to {}: {}", subject, e)))?;

        debug!("Published message to {}", subject);
        Ok(())
    }
}

impl Publish for MessagePublisher {
    fn prefix(&self) -> &str {
        self.prefix()
    }

    async fn publish<T: Serialize + Sync>(
        &self,
        subject: impl AsRef<str> + Send,
        message: &T,
    ) -> Result<()> {
        MessagePublisher::publish(self, subject, message).await
    }
}

/// Subscriber for world signals
pub struct MessageSubscriber {
    client: Client,
    prefix: String,
}

impl MessageSubscriber {
    pub fn new(client: Client, prefix: impl Into<String>) -> Self {
        Self {
            client,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Subscribe to a subject and deserialize messages
    pub async fn subscribe<T: DeserializeOwned>(
        &self,
        subject: impl AsRef<str>,
    ) -> Result<MessageStream<T>> {
        let subject = subject.as_ref();
        debug!("Subscribing to subject: {}", subject);

        let subscriber = self
            .client
            .subscribe(subject.to_string())
            .await
            .map_err(|e| Error::Subscribe(format!("Failed to subscribe to {}: {}", subject, e)))?;

        Ok(MessageStream {
            subscriber,
            _phantom: std::marker::PhantomData,
        })
    }
}

/// Stream of deserialized messages
pub struct MessageStream<T> {
    subscriber: async_nats::Subscriber,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: DeserializeOwned> MessageStream<T> {
    /// Get the next message from the stream
    pub async fn next(&mut self) -> Option<Result<T>> {
        match self.subscriber.next().await {
            Some(msg) => {
                trace!("Received message on subject: {}", msg.subject);

                match serde_json::from_slice(&msg.payload) {
                    Ok(data) => Some(Ok(data)),
                    Err(e) => {
                        error!("Failed to deserialize message: {}", e);
                        Some(Err(Error::Serialization(e)))
                    }
                }
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    const NATS_URL: &str = "nats://localhost:14222";

    async fn try_connect() -> Option<Client> {
        async_nats::connect(NATS_URL).await.ok()
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestMsg {
        value: String,
        count: u32,
    }

    #[tokio::test]
    async fn test_publish_subscribe_roundtrip() {
        let Some(client) = try_connect().await else {
            eprintln!("SKIP: NATS not available");
            return;
        };
        let subject = format!(
            "test.mc.messaging.roundtrip.{}",
            uuid::Uuid::new_v4().simple()
        );

        let publisher = MessagePublisher::new(client.clone(), "test");
        let subscriber = MessageSubscriber::new(client.clone(), "test");
        let mut stream = subscriber.subscribe::<TestMsg>(&subject).await.unwrap();

        let sent = TestMsg {
            value: "hello".to_string(),
            count: 42,
        };
        publisher.publish(&subject, &sent).await.unwrap();

        let received = stream.next().await.unwrap().unwrap();
        assert_eq!(received, sent);
    }

    #[tokio::test]
    async fn test_deserialize_error_on_invalid_json() {
        let Some(client) = try_connect().await else {
            eprintln!("SKIP: NATS not available");
            return;
        };
        let subject = format!(
            "test.mc.messaging.invalid.{}",
            uuid::Uuid::new_v4().simple()
        );

        let subscriber = MessageSubscriber::new(client.clone(), "test");
        let mut stream = subscriber.subscribe::<TestMsg>(&subject).await.unwrap();

        client
            .publish(subject, b"not-valid-json".as_ref().into())
            .await
            .unwrap();

        let result = stream.next().await.unwrap();
        assert!(result.is_err(), "invalid JSON must return an error");
    }

    #[tokio::test]
    async fn test_publisher_prefix_accessor() {
        let Some(client) = try_connect().await else {
            eprintln!("SKIP: NATS not available");
            return;
        };
        let publisher = MessagePublisher::new(client, "mypfx");
        assert_eq!(publisher.prefix(), "mypfx");
    }
}
