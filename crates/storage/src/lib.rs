#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    AttemptId, AttemptRepository, AttemptRow, InMemoryRepository, LessonProgressRepository,
    LessonRepository, Storage, StorageError,
};
