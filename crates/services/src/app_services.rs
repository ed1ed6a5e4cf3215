use std::sync::Arc;

use tracing::info;

use revise_core::Clock;
use storage::repository::Storage;

use crate::agenda_service::AgendaService;
use crate::error::AppServicesError;
use crate::profile_service::ProfileService;
use crate::progress::ProgressService;
use crate::session_service::SessionService;
use crate::subject_service::SubjectService;

/// Assembles the app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    subjects: Arc<SubjectService>,
    sessions: Arc<SessionService>,
    agenda: Arc<AgendaService>,
    progress: Arc<ProgressService>,
    profile: Arc<ProfileService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        info!(db = db_url, "storage ready");
        Ok(Self::from_storage(&storage, clock))
    }

    /// Build services over in-memory storage, for tests and prototyping.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock) -> Self {
        let subjects = Arc::new(SubjectService::new(clock, Arc::clone(&storage.subjects)));
        let sessions = Arc::new(SessionService::new(clock, Arc::clone(&storage.sessions)));
        let agenda = Arc::new(AgendaService::new(
            Arc::clone(&storage.sessions),
            Arc::clone(&storage.events),
            Arc::clone(&storage.subjects),
        ));
        let progress = Arc::new(ProgressService::new(
            clock,
            Arc::clone(&storage.sessions),
            Arc::clone(&storage.subjects),
            Arc::clone(&storage.profiles),
        ));
        let profile = Arc::new(ProfileService::new(Arc::clone(&storage.profiles)));

        Self {
            subjects,
            sessions,
            agenda,
            progress,
            profile,
        }
    }

    #[must_use]
    pub fn subjects(&self) -> &SubjectService {
        &self.subjects
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionService {
        &self.sessions
    }

    #[must_use]
    pub fn agenda(&self) -> &AgendaService {
        &self.agenda
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressService {
        &self.progress
    }

    #[must_use]
    pub fn profile(&self) -> &ProfileService {
        &self.profile
    }
}
