#![forbid(unsafe_code)]

pub mod agenda_service;
pub mod app_services;
pub mod error;
pub mod profile_service;
pub mod progress;
pub mod session_service;
pub mod subject_service;

pub use revise_core::Clock;

pub use error::{
    AgendaError, AppServicesError, ProfileServiceError, ProgressError, SessionServiceError,
    SubjectServiceError,
};

pub use agenda_service::{AgendaEntry, AgendaService, EventInput};
pub use app_services::AppServices;
pub use profile_service::ProfileService;
pub use progress::{ProgressOverview, ProgressService, SubjectProgress, WeeklyOverview};
pub use session_service::{PlanSessionInput, SessionService};
pub use subject_service::{SubjectInput, SubjectService};
