pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::broker::LoggingPublisher;
pub use adapters::memory::{InMemoryReviewStore, InMemoryStudentStore, InMemoryTagStore};
pub use config::AppConfig;
pub use crate::core::{
    dispatcher::{DispatcherHandle, EventDispatcher},
    recommend::CoEnrollment,
    student::StudentService,
};
pub use domain::model::{Publishing, Review, School, Student, StudentEvent, Tag};
pub use utils::error::{ErrorKind, ProfileError, Result};
