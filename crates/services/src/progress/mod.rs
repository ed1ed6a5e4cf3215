mod overview;
mod service;

// Public API of the progress subsystem.
pub use crate::error::ProgressError;
pub use overview::{ProgressOverview, SubjectProgress, WeeklyOverview};
pub use service::ProgressService;
