use crate::domain::model::{Publishing, Review, Student, Tag};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Durable student storage.
///
/// `get_by_id` answers `Ok(None)` for an unknown id; errors are reserved for
/// the store itself failing.
#[async_trait]
pub trait StudentStore: Send + Sync {
    async fn get_by_id(&self, id: &str) -> Result<Option<Student>>;
    async fn create(&self, id: &str, student: &Student) -> Result<()>;
    async fn update(&self, student: &Student) -> Result<()>;
    async fn delete(&self, id: &str) -> Result<()>;
    async fn update_classes(&self, student: &Student) -> Result<()>;
    async fn search_current_class(&self, class_code: &str) -> Result<Vec<Student>>;
    async fn search_students(&self, criteria: &Student) -> Result<Vec<Student>>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn reviews_for(&self, student_id: &str) -> Result<Vec<Review>>;
}

#[async_trait]
pub trait TagStore: Send + Sync {
    async fn fetch_all_tags(&self) -> Result<Vec<Tag>>;
}

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(
        &self,
        exchange: &str,
        topic: &str,
        mandatory: bool,
        immediate: bool,
        message: Publishing,
    ) -> Result<()>;
}
