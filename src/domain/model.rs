use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct School {
    pub id: String,
    pub name: String,
    pub country: String,
    #[serde(default)]
    pub domains: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub positive: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub reviewed_id: String,
    pub reviewer_id: String,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// A student profile.
///
/// `current_classes` and `classes_taken` are class-code sets kept as ordered
/// vectors; neither holds duplicates. `reviews` is only filled in on read and
/// is never written back to the store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub general_info: String,
    #[serde(default)]
    pub school: Option<School>,
    #[serde(default)]
    pub current_classes: Vec<String>,
    #[serde(default)]
    pub classes_taken: Vec<String>,
    /// Wire name matches existing `profile.*` consumers.
    #[serde(rename = "CreatedAt", alias = "created_at")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "UpdatedAt", alias = "updated_at")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Student {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_current_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.current_classes = classes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_classes_taken<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes_taken = classes.into_iter().map(Into::into).collect();
        self
    }
}

/// Domain events handed to the dispatcher after a successful write.
#[derive(Debug, Clone, PartialEq)]
pub enum StudentEvent {
    Created(Student),
    Edited(Student),
    Deleted(String),
}

/// Broker message envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publishing {
    pub content_type: String,
    pub body: Vec<u8>,
}
