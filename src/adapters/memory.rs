use crate::domain::model::{Review, Student, Tag};
use crate::domain::ports::{ReviewStore, StudentStore, TagStore};
use crate::utils::error::{ProfileError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;

/// Student store backed by a map, for the CLI and tests.
#[derive(Debug, Default)]
pub struct InMemoryStudentStore {
    students: RwLock<HashMap<String, Student>>,
}

impl InMemoryStudentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_students(students: Vec<Student>) -> Self {
        Self {
            students: RwLock::new(students.into_iter().map(|s| (s.id.clone(), s)).collect()),
        }
    }

    /// 從 JSON 檔案 (學生陣列) 載入
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let students: Vec<Student> = serde_json::from_str(&content)?;
        tracing::debug!("Loaded {} students from {}", students.len(), path.as_ref().display());
        Ok(Self::with_students(students))
    }

    pub async fn len(&self) -> usize {
        self.students.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.students.read().await.is_empty()
    }
}

/// Reviews are derived on read and never stored with the student.
fn persisted(student: &Student) -> Student {
    Student {
        reviews: Vec::new(),
        ..student.clone()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
impl StudentStore for InMemoryStudentStore {
    async fn get_by_id(&self, id: &str) -> Result<Option<Student>> {
        Ok(self.students.read().await.get(id).cloned())
    }

    async fn create(&self, id: &str, student: &Student) -> Result<()> {
        let mut students = self.students.write().await;
        if students.contains_key(id) {
            return Err(ProfileError::conflict(id));
        }
        students.insert(id.to_string(), persisted(student));
        Ok(())
    }

    async fn update(&self, student: &Student) -> Result<()> {
        let mut students = self.students.write().await;
        match students.get_mut(&student.id) {
            Some(existing) => {
                existing.first_name = student.first_name.clone();
                existing.last_name = student.last_name.clone();
                existing.email = student.email.clone();
                existing.general_info = student.general_info.clone();
                existing.updated_at = student.updated_at;
                Ok(())
            }
            None => Err(ProfileError::not_found(&student.id)),
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.students.write().await.remove(id);
        Ok(())
    }

    async fn update_classes(&self, student: &Student) -> Result<()> {
        let mut students = self.students.write().await;
        match students.get_mut(&student.id) {
            Some(existing) => {
                existing.current_classes = student.current_classes.clone();
                existing.classes_taken = student.classes_taken.clone();
                Ok(())
            }
            None => Err(ProfileError::not_found(&student.id)),
        }
    }

    async fn search_current_class(&self, class_code: &str) -> Result<Vec<Student>> {
        let students = self.students.read().await;
        let mut enrolled: Vec<Student> = students
            .values()
            .filter(|s| s.current_classes.iter().any(|c| c == class_code))
            .cloned()
            .collect();
        enrolled.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(enrolled)
    }

    async fn search_students(&self, criteria: &Student) -> Result<Vec<Student>> {
        let students = self.students.read().await;
        let mut found: Vec<Student> = students
            .values()
            .filter(|s| {
                (criteria.first_name.is_empty()
                    || contains_ignore_case(&s.first_name, &criteria.first_name))
                    && (criteria.last_name.is_empty()
                        || contains_ignore_case(&s.last_name, &criteria.last_name))
                    && (criteria.email.is_empty() || contains_ignore_case(&s.email, &criteria.email))
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(found)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryReviewStore {
    reviews: RwLock<Vec<Review>>,
}

impl InMemoryReviewStore {
    pub fn new(reviews: Vec<Review>) -> Self {
        Self {
            reviews: RwLock::new(reviews),
        }
    }
}

#[async_trait]
impl ReviewStore for InMemoryReviewStore {
    async fn reviews_for(&self, student_id: &str) -> Result<Vec<Review>> {
        Ok(self
            .reviews
            .read()
            .await
            .iter()
            .filter(|r| r.reviewed_id == student_id)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTagStore {
    tags: Vec<Tag>,
}

impl InMemoryTagStore {
    pub fn new(tags: Vec<Tag>) -> Self {
        Self { tags }
    }
}

#[async_trait]
impl TagStore for InMemoryTagStore {
    async fn fetch_all_tags(&self) -> Result<Vec<Tag>> {
        Ok(self.tags.clone())
    }
}
