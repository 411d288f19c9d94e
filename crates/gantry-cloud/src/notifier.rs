//! Message relay seam: publishing chat notifications through a broker.
//!
//! The approval handler does not post to the chat system directly; it hands
//! the rendered message to a relay topic whose subscriber owns delivery.
//! The destination webhook URL rides along as a message attribute.

use std::{future::Future, pin::Pin};

use gantry_core::{error::Result, GantryError};
use tracing::debug;

/// Attribute naming the webhook the relayed message is destined for.
pub const WEBHOOK_URL_ATTRIBUTE: &str = "WebhookURL";

/// Relay operations required by the approval-notification handler.
pub trait MessageRelay: Send + Sync + 'static {
    /// Publishes a rendered message destined for the given webhook URL.
    fn publish(
        &self,
        message: String,
        webhook_url: String,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Production relay publishing to an SNS topic.
#[derive(Debug, Clone)]
pub struct SnsMessageRelay {
    client: aws_sdk_sns::Client,
    topic_arn: String,
}

impl SnsMessageRelay {
    /// Creates a new relay around a configured SNS client and topic.
    pub fn new(client: aws_sdk_sns::Client, topic_arn: impl Into<String>) -> Self {
        Self { client, topic_arn: topic_arn.into() }
    }
}

impl MessageRelay for SnsMessageRelay {
    fn publish(
        &self,
        message: String,
        webhook_url: String,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let client = self.client.clone();
        let topic_arn = self.topic_arn.clone();
        Box::pin(async move {
            debug!(topic = %topic_arn, "publishing relayed notification");

            let webhook_attribute = aws_sdk_sns::types::MessageAttributeValue::builder()
                .data_type("String")
                .string_value(webhook_url)
                .build()
                .map_err(|e| GantryError::publish_failed(e.to_string()))?;

            client
                .publish()
                .topic_arn(topic_arn)
                .message(message)
                .message_attributes(WEBHOOK_URL_ATTRIBUTE, webhook_attribute)
                .send()
                .await
                .map_err(|e| GantryError::publish_failed(e.to_string()))?;
            Ok(())
        })
    }
}

pub mod mock {
    //! In-memory relay for testing handler logic.

    use std::sync::Arc;

    use tokio::sync::RwLock;

    use super::{GantryError, MessageRelay, Result};
    use std::{future::Future, pin::Pin};

    /// One relayed message: rendered body plus destination webhook URL.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct PublishedMessage {
        /// Rendered message body.
        pub message: String,
        /// Destination webhook URL attribute.
        pub webhook_url: String,
    }

    /// Mock relay recording every published message.
    ///
    /// Injected errors persist across calls so repeated identical requests
    /// observe identical behavior.
    #[derive(Debug, Default)]
    pub struct MockMessageRelay {
        published: Arc<RwLock<Vec<PublishedMessage>>>,
        error: Arc<RwLock<Option<String>>>,
    }

    impl MockMessageRelay {
        /// Creates an empty mock relay.
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes every subsequent publish fail with the given message.
        pub async fn inject_error(&self, message: impl Into<String>) {
            *self.error.write().await = Some(message.into());
        }

        /// Returns all published messages so far, in order.
        pub async fn published_messages(&self) -> Vec<PublishedMessage> {
            self.published.read().await.clone()
        }
    }

    impl MessageRelay for MockMessageRelay {
        fn publish(
            &self,
            message: String,
            webhook_url: String,
        ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
            let published = self.published.clone();
            let error = self.error.clone();
            Box::pin(async move {
                if let Some(message) = error.read().await.clone() {
                    return Err(GantryError::publish_failed(message));
                }
                published.write().await.push(PublishedMessage { message, webhook_url });
                Ok(())
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{mock::MockMessageRelay, MessageRelay};

    #[tokio::test]
    async fn mock_records_published_messages_in_order() {
        let relay = MockMessageRelay::new();

        relay
            .publish("first".to_string(), "https://hooks.example.com/a".to_string())
            .await
            .unwrap();
        relay
            .publish("second".to_string(), "https://hooks.example.com/a".to_string())
            .await
            .unwrap();

        let published = relay.published_messages().await;
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].message, "first");
        assert_eq!(published[1].message, "second");
    }

    #[tokio::test]
    async fn mock_publish_error_is_persistent() {
        let relay = MockMessageRelay::new();
        relay.inject_error("topic gone").await;

        let publish =
            relay.publish("body".to_string(), "https://hooks.example.com/a".to_string()).await;
        assert!(publish.is_err());
        assert!(relay.published_messages().await.is_empty());
    }
}
