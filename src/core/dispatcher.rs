//! Asynchronous publication of student domain events.
//!
//! [`EventDispatcher::start`] opens one bounded channel per event kind and
//! spawns one loop per channel. Each loop drains its channel, encodes the
//! payload and hands it to the [`Publisher`]. Delivery is at-most-once: a
//! failed publish is logged and the event is dropped. Loops stop once every
//! clone of the dispatcher has been dropped and their channel is empty.

use crate::config::{BrokerConfig, DispatcherConfig};
use crate::domain::model::{Publishing, Student, StudentEvent};
use crate::domain::ports::Publisher;
use crate::utils::error::Result;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Producer side of the three event channels. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    created: mpsc::Sender<Student>,
    edited: mpsc::Sender<Student>,
    deleted: mpsc::Sender<String>,
}

/// Join handles of the running dispatcher loops.
#[derive(Debug)]
pub struct DispatcherHandle {
    loops: Vec<JoinHandle<()>>,
}

/// Where and how each event kind is published.
#[derive(Debug, Clone)]
struct EventRoute {
    exchange: String,
    content_type: String,
    mandatory: bool,
    immediate: bool,
    created_topic: String,
    updated_topic: String,
    deleted_topic: String,
}

impl EventDispatcher {
    /// Spawns the created/edited/deleted loops on the current tokio runtime.
    pub fn start(
        publisher: Arc<dyn Publisher>,
        broker: &BrokerConfig,
        config: &DispatcherConfig,
    ) -> (Self, DispatcherHandle) {
        // mpsc::channel panics on zero
        let capacity = config.capacity.max(1);
        let route = Arc::new(EventRoute::from(broker));

        let (created, created_rx) = mpsc::channel(capacity);
        let (edited, edited_rx) = mpsc::channel(capacity);
        let (deleted, deleted_rx) = mpsc::channel(capacity);

        let loops = vec![
            tokio::spawn(run_loop(
                created_rx,
                StudentEvent::Created,
                Arc::clone(&publisher),
                Arc::clone(&route),
            )),
            tokio::spawn(run_loop(
                edited_rx,
                StudentEvent::Edited,
                Arc::clone(&publisher),
                Arc::clone(&route),
            )),
            tokio::spawn(run_loop(deleted_rx, StudentEvent::Deleted, publisher, route)),
        ];

        tracing::info!("📨 Event dispatcher started (channel capacity {})", capacity);

        (
            Self {
                created,
                edited,
                deleted,
            },
            DispatcherHandle { loops },
        )
    }

    pub async fn student_created(&self, student: Student) {
        enqueue(&self.created, student, "created").await;
    }

    pub async fn student_edited(&self, student: Student) {
        enqueue(&self.edited, student, "edited").await;
    }

    pub async fn student_deleted(&self, id: String) {
        enqueue(&self.deleted, id, "deleted").await;
    }
}

impl DispatcherHandle {
    /// Waits for every loop to finish. Loops only finish after all
    /// [`EventDispatcher`] clones are dropped, so drop those first.
    pub async fn join(self) {
        for handle in self.loops {
            if let Err(e) = handle.await {
                tracing::warn!("Dispatcher loop ended abnormally: {}", e);
            }
        }
        tracing::info!("📨 Event dispatcher stopped");
    }
}

async fn enqueue<T>(sender: &mpsc::Sender<T>, payload: T, kind: &str) {
    if sender.send(payload).await.is_err() {
        tracing::warn!("⚠️ Dropping {} event: dispatcher is no longer running", kind);
    }
}

async fn run_loop<T>(
    mut receiver: mpsc::Receiver<T>,
    wrap: fn(T) -> StudentEvent,
    publisher: Arc<dyn Publisher>,
    route: Arc<EventRoute>,
) {
    while let Some(payload) = receiver.recv().await {
        route.dispatch(publisher.as_ref(), wrap(payload)).await;
    }
}

impl From<&BrokerConfig> for EventRoute {
    fn from(broker: &BrokerConfig) -> Self {
        Self {
            exchange: broker.exchange.clone(),
            content_type: broker.content_type.clone(),
            mandatory: broker.mandatory,
            immediate: broker.immediate,
            created_topic: broker.created_topic.clone(),
            updated_topic: broker.updated_topic.clone(),
            deleted_topic: broker.deleted_topic.clone(),
        }
    }
}

impl EventRoute {
    fn topic(&self, event: &StudentEvent) -> &str {
        match event {
            StudentEvent::Created(_) => &self.created_topic,
            StudentEvent::Edited(_) => &self.updated_topic,
            StudentEvent::Deleted(_) => &self.deleted_topic,
        }
    }

    /// Students go out as JSON, deletions as the raw id bytes.
    fn encode(&self, event: &StudentEvent) -> Result<Publishing> {
        let body = match event {
            StudentEvent::Created(student) | StudentEvent::Edited(student) => {
                serde_json::to_vec(student)?
            }
            StudentEvent::Deleted(id) => id.as_bytes().to_vec(),
        };
        Ok(Publishing {
            content_type: self.content_type.clone(),
            body,
        })
    }

    async fn dispatch(&self, publisher: &dyn Publisher, event: StudentEvent) {
        let topic = self.topic(&event);

        let message = match self.encode(&event) {
            Ok(message) => message,
            Err(e) => {
                tracing::error!("❌ Could not encode event for {}: {}", topic, e);
                return;
            }
        };

        match publisher
            .publish(&self.exchange, topic, self.mandatory, self.immediate, message)
            .await
        {
            Ok(()) => tracing::debug!("Student event sent to {}", topic),
            Err(e) => tracing::error!("❌ Failed to publish to {}: {}", topic, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ProfileError;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct Sent {
        exchange: String,
        topic: String,
        mandatory: bool,
        immediate: bool,
        message: Publishing,
    }

    #[derive(Default)]
    struct MockPublisher {
        sent: Mutex<Vec<Sent>>,
        fail_topic: Option<String>,
    }

    impl MockPublisher {
        fn failing_on(topic: &str) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_topic: Some(topic.to_string()),
            }
        }
    }

    #[async_trait]
    impl Publisher for MockPublisher {
        async fn publish(
            &self,
            exchange: &str,
            topic: &str,
            mandatory: bool,
            immediate: bool,
            message: Publishing,
        ) -> Result<()> {
            if self.fail_topic.as_deref() == Some(topic) {
                return Err(ProfileError::Publish {
                    topic: topic.to_string(),
                    message: "channel closed".to_string(),
                });
            }
            self.sent.lock().await.push(Sent {
                exchange: exchange.to_string(),
                topic: topic.to_string(),
                mandatory,
                immediate,
                message,
            });
            Ok(())
        }
    }

    fn start(publisher: Arc<MockPublisher>) -> (EventDispatcher, DispatcherHandle) {
        EventDispatcher::start(
            publisher,
            &BrokerConfig::default(),
            &DispatcherConfig { capacity: 4 },
        )
    }

    #[tokio::test]
    async fn test_created_event_is_published_as_json() {
        let publisher = Arc::new(MockPublisher::default());
        let (dispatcher, handle) = start(Arc::clone(&publisher));

        let student = Student::new("s1").with_current_classes(["CS101"]);
        dispatcher.student_created(student.clone()).await;
        drop(dispatcher);
        handle.join().await;

        let sent = publisher.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].exchange, "profile");
        assert_eq!(sent[0].topic, "profile.created");
        assert!(!sent[0].mandatory);
        assert!(!sent[0].immediate);
        assert_eq!(sent[0].message.content_type, "text/plain");

        let decoded: Student = serde_json::from_slice(&sent[0].message.body).unwrap();
        assert_eq!(decoded, student);
    }

    #[tokio::test]
    async fn test_student_body_uses_consumer_timestamp_keys() {
        let publisher = Arc::new(MockPublisher::default());
        let (dispatcher, handle) = start(Arc::clone(&publisher));

        let student = Student {
            created_at: Some(chrono::Utc::now()),
            ..Student::new("s1")
        };
        dispatcher.student_edited(student).await;
        drop(dispatcher);
        handle.join().await;

        let sent = publisher.sent.lock().await;
        let body: serde_json::Value = serde_json::from_slice(&sent[0].message.body).unwrap();
        assert!(body.get("CreatedAt").is_some_and(|v| v.is_string()));
        assert!(body.get("UpdatedAt").is_some_and(|v| v.is_null()));
        assert!(body.get("created_at").is_none());
        assert_eq!(body["current_classes"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_each_kind_uses_its_topic() {
        let publisher = Arc::new(MockPublisher::default());
        let (dispatcher, handle) = start(Arc::clone(&publisher));

        dispatcher.student_edited(Student::new("s2")).await;
        dispatcher.student_deleted("s3".to_string()).await;
        drop(dispatcher);
        handle.join().await;

        let sent = publisher.sent.lock().await;
        let mut topics: Vec<&str> = sent.iter().map(|s| s.topic.as_str()).collect();
        topics.sort();
        assert_eq!(topics, vec!["profile.deleted", "profile.updated"]);

        let deleted = sent.iter().find(|s| s.topic == "profile.deleted").unwrap();
        assert_eq!(deleted.message.body, b"s3".to_vec());
    }

    #[tokio::test]
    async fn test_events_on_one_channel_keep_send_order() {
        let publisher = Arc::new(MockPublisher::default());
        let (dispatcher, handle) = start(Arc::clone(&publisher));

        for id in ["a", "b", "c", "d", "e", "f"] {
            dispatcher.student_deleted(id.to_string()).await;
        }
        drop(dispatcher);
        handle.join().await;

        let bodies: Vec<Vec<u8>> = publisher
            .sent
            .lock()
            .await
            .iter()
            .map(|s| s.message.body.clone())
            .collect();
        let expected: Vec<Vec<u8>> = ["a", "b", "c", "d", "e", "f"]
            .iter()
            .map(|id| id.as_bytes().to_vec())
            .collect();
        assert_eq!(bodies, expected);
    }

    #[tokio::test]
    async fn test_publish_failure_does_not_stop_other_loops() {
        let publisher = Arc::new(MockPublisher::failing_on("profile.created"));
        let (dispatcher, handle) = start(Arc::clone(&publisher));

        dispatcher.student_created(Student::new("lost")).await;
        dispatcher.student_created(Student::new("also-lost")).await;
        dispatcher.student_edited(Student::new("kept")).await;
        drop(dispatcher);
        handle.join().await;

        let sent = publisher.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].topic, "profile.updated");
    }

    #[tokio::test]
    async fn test_custom_route_from_config() {
        let publisher = Arc::new(MockPublisher::default());
        let broker = BrokerConfig {
            exchange: "profile-staging".to_string(),
            content_type: "application/json".to_string(),
            mandatory: true,
            ..BrokerConfig::default()
        };
        let (dispatcher, handle) = EventDispatcher::start(
            Arc::clone(&publisher) as Arc<dyn Publisher>,
            &broker,
            &DispatcherConfig { capacity: 0 },
        );

        dispatcher.student_edited(Student::new("s1")).await;
        drop(dispatcher);
        handle.join().await;

        let sent = publisher.sent.lock().await;
        assert_eq!(sent[0].exchange, "profile-staging");
        assert_eq!(sent[0].message.content_type, "application/json");
        assert!(sent[0].mandatory);
    }
}
