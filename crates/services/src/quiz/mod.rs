mod submission;
mod workflow;

pub use crate::error::QuizServiceError;
pub use submission::{Advisory, AttemptWrite, PersistenceStatus, QuizSubmission};
pub use workflow::{AttemptListItem, QuizLoopService};
