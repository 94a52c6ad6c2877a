// Queue publishing: trait boundary + SQS backend.
//
// The ingestor hands a finished QueueMessage to a QueuePublisher without
// knowing which queue sits behind it. Production wires in SqsPublisher;
// tests use MockPublisher.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_sqs::error::DisplayErrorContext;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::{IngestError, Result};
use crate::types::QueueMessage;

#[async_trait]
pub trait QueuePublisher: Send + Sync {
    async fn publish(&self, message: &QueueMessage) -> Result<()>;
}

/// Message group id for FIFO queues: publish time in epoch milliseconds.
/// Two publishes in the same millisecond share a group.
pub fn message_group_id(now: DateTime<Utc>) -> String {
    now.timestamp_millis().to_string()
}

// ---------------------------------------------------------------------------
// SqsPublisher (production)
// ---------------------------------------------------------------------------

pub struct SqsPublisher {
    client: aws_sdk_sqs::Client,
    queue_url: String,
}

impl SqsPublisher {
    pub fn new(client: aws_sdk_sqs::Client, queue_url: impl Into<String>) -> Self {
        Self {
            client,
            queue_url: queue_url.into(),
        }
    }

    pub fn from_sdk_config(config: &aws_config::SdkConfig, queue_url: impl Into<String>) -> Self {
        Self::new(aws_sdk_sqs::Client::new(config), queue_url)
    }
}

#[async_trait]
impl QueuePublisher for SqsPublisher {
    async fn publish(&self, message: &QueueMessage) -> Result<()> {
        let body = serde_json::to_string(message)
            .map_err(|e| IngestError::Publish(format!("serialize message: {e}")))?;
        let group_id = message_group_id(Utc::now());

        let output = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .message_group_id(&group_id)
            .send()
            .await
            .map_err(|e| IngestError::Publish(DisplayErrorContext(&e).to_string()))?;

        info!(
            queue_url = self.queue_url.as_str(),
            message_id = output.message_id().unwrap_or_default(),
            group_id = group_id.as_str(),
            region_id = message.region_id,
            "Competition queued for persistence"
        );

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockPublisher (for tests)
// ---------------------------------------------------------------------------

/// Records published messages for test assertions. Can be told to fail or
/// to stall before answering.
#[derive(Default)]
pub struct MockPublisher {
    messages: Mutex<Vec<QueueMessage>>,
    fail_with: Option<String>,
    delay: Option<Duration>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            fail_with: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Sleeps for `delay` before recording the message.
    pub fn delayed(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<QueueMessage> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueuePublisher for MockPublisher {
    async fn publish(&self, message: &QueueMessage) -> Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(reason) = &self.fail_with {
            return Err(IngestError::Publish(reason.clone()));
        }
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn group_id_is_epoch_millis() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(message_group_id(at), "1700000000123");
    }
}
