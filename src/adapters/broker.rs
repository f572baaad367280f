use crate::domain::model::Publishing;
use crate::domain::ports::Publisher;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Publisher that writes each message to the log instead of a broker.
#[derive(Debug, Clone, Default)]
pub struct LoggingPublisher;

impl LoggingPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Publisher for LoggingPublisher {
    async fn publish(
        &self,
        exchange: &str,
        topic: &str,
        mandatory: bool,
        immediate: bool,
        message: Publishing,
    ) -> Result<()> {
        tracing::info!(
            exchange,
            topic,
            mandatory,
            immediate,
            content_type = %message.content_type,
            body = %String::from_utf8_lossy(&message.body),
            "📤 student sent to queue"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_logging_publisher_accepts_messages() {
        let publisher = LoggingPublisher::new();
        let message = Publishing {
            content_type: "text/plain".to_string(),
            body: b"s1".to_vec(),
        };

        assert!(publisher
            .publish("profile", "profile.deleted", false, false, message)
            .await
            .is_ok());
    }
}
