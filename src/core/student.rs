use crate::config::ServiceConfig;
use crate::core::classes::{dedupe, difference, merge};
use crate::core::dispatcher::EventDispatcher;
use crate::domain::model::Student;
use crate::domain::ports::{ReviewStore, StudentStore, TagStore};
use crate::utils::error::{ProfileError, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Student use cases: profile CRUD, class lifecycle and teammate
/// recommendations.
///
/// Every call runs under one deadline covering load, compute and persist.
/// Create, update and delete publish a domain event after the store write
/// succeeds; the class-list operations only write.
pub struct StudentService {
    pub(crate) students: Arc<dyn StudentStore>,
    reviews: Arc<dyn ReviewStore>,
    tags: Arc<dyn TagStore>,
    dispatcher: EventDispatcher,
    timeout: Duration,
}

impl StudentService {
    pub fn new(
        students: Arc<dyn StudentStore>,
        reviews: Arc<dyn ReviewStore>,
        tags: Arc<dyn TagStore>,
        dispatcher: EventDispatcher,
        config: &ServiceConfig,
    ) -> Self {
        Self {
            students,
            reviews,
            tags,
            dispatcher,
            timeout: config.timeout(),
        }
    }

    /// Stores a new student. The id must come from the identity provider.
    pub async fn create(&self, mut student: Student) -> Result<Student> {
        if student.id.is_empty() {
            return Err(ProfileError::BadRequest {
                message: "The student should have an ID from auth service".to_string(),
            });
        }

        let created = self
            .with_deadline("create", async move {
                if self.students.get_by_id(&student.id).await?.is_some() {
                    return Err(ProfileError::conflict(&student.id));
                }

                student.current_classes = dedupe(&student.current_classes);
                student.classes_taken = dedupe(&student.classes_taken);
                let now = Utc::now();
                student.created_at = Some(now);
                student.updated_at = Some(now);
                self.students.create(&student.id, &student).await?;
                Ok(student)
            })
            .await?;

        tracing::info!("Created student {}", created.id);
        self.dispatcher.student_created(created.clone()).await;
        Ok(created)
    }

    /// Loads a student and attaches its reviews. Review and tag lookups are
    /// best effort.
    pub async fn get_by_id(&self, id: &str) -> Result<Student> {
        self.with_deadline("get_by_id", async {
            let mut student = self.load_existing(id).await?;

            let mut reviews = match self.reviews.reviews_for(id).await {
                Ok(reviews) => reviews,
                Err(e) => {
                    tracing::warn!("Can't get the reviews for {} right now: {}", id, e);
                    Vec::new()
                }
            };

            let tags: HashMap<String, bool> = match self.tags.fetch_all_tags().await {
                Ok(tags) => tags.into_iter().map(|t| (t.name, t.positive)).collect(),
                Err(e) => {
                    tracing::warn!("Can't get tags for reviews: {}", e);
                    HashMap::new()
                }
            };

            for tag in reviews.iter_mut().flat_map(|r| r.tags.iter_mut()) {
                tag.positive = tags.get(&tag.name).copied().unwrap_or(false);
            }

            student.reviews = reviews;
            Ok(student)
        })
        .await
    }

    /// Applies the non-empty profile fields of `patch` and refreshes
    /// `updated_at`.
    pub async fn update(&self, id: &str, patch: Student) -> Result<Student> {
        let updated = self
            .with_deadline("update", async move {
                let mut existing = self.load_existing(id).await?;
                apply_profile_patch(&mut existing, patch);
                self.students.update(&existing).await?;
                Ok(existing)
            })
            .await?;

        tracing::debug!("Updated student {}", updated.id);
        self.dispatcher.student_edited(updated.clone()).await;
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.with_deadline("delete", async {
            self.load_existing(id).await?;
            self.students.delete(id).await
        })
        .await?;

        tracing::info!("Deleted student {}", id);
        self.dispatcher.student_deleted(id.to_string()).await;
        Ok(())
    }

    /// Enrols the student in `patch.current_classes` and records
    /// `patch.classes_taken`, skipping codes already present.
    pub async fn add_classes(&self, id: &str, patch: Student) -> Result<Student> {
        self.mutate_classes("add_classes", id, move |student| {
            student.current_classes = merge(&student.current_classes, &patch.current_classes);
            student.classes_taken = merge(&student.classes_taken, &patch.classes_taken);
        })
        .await
    }

    pub async fn remove_classes(&self, id: &str, patch: Student) -> Result<Student> {
        self.mutate_classes("remove_classes", id, move |student| {
            student.current_classes =
                difference(&student.current_classes, &patch.current_classes);
            student.classes_taken = difference(&student.classes_taken, &patch.classes_taken);
        })
        .await
    }

    /// Moves the codes in `patch.current_classes` from current to taken.
    pub async fn complete_classes(&self, id: &str, patch: Student) -> Result<Student> {
        self.mutate_classes("complete_classes", id, move |student| {
            let completed = patch.current_classes;
            student.current_classes = difference(&student.current_classes, &completed);
            student.classes_taken = merge(&student.classes_taken, &completed);
        })
        .await
    }

    pub async fn search_students(&self, criteria: &Student) -> Result<Vec<Student>> {
        self.with_deadline("search_students", self.students.search_students(criteria))
            .await
    }

    async fn mutate_classes<F>(&self, operation: &str, id: &str, apply: F) -> Result<Student>
    where
        F: FnOnce(&mut Student) + Send,
    {
        let student = self
            .with_deadline(operation, async move {
                let mut student = self.load_existing(id).await?;
                apply(&mut student);
                self.students.update_classes(&student).await?;
                Ok(student)
            })
            .await?;

        tracing::debug!(
            "{} for {}: current={:?} taken={:?}",
            operation,
            id,
            student.current_classes,
            student.classes_taken
        );
        Ok(student)
    }

    pub(crate) async fn load_existing(&self, id: &str) -> Result<Student> {
        self.students
            .get_by_id(id)
            .await?
            .ok_or_else(|| ProfileError::not_found(id))
    }

    pub(crate) async fn with_deadline<T, F>(&self, operation: &str, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.timeout, future).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("⏱️ {} timed out after {:?}", operation, self.timeout);
                Err(ProfileError::DeadlineExceeded {
                    operation: operation.to_string(),
                    timeout: self.timeout,
                })
            }
        }
    }
}

fn apply_profile_patch(existing: &mut Student, patch: Student) {
    if !patch.first_name.is_empty() {
        existing.first_name = patch.first_name;
    }
    if !patch.last_name.is_empty() {
        existing.last_name = patch.last_name;
    }
    if !patch.email.is_empty() {
        existing.email = patch.email;
    }
    if !patch.general_info.is_empty() {
        existing.general_info = patch.general_info;
    }
    existing.updated_at = Some(Utc::now());
}
