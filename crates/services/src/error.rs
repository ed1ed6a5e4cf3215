//! Shared error types for the services crate.

use thiserror::Error;

use revise_core::model::{
    EventError, PreferencesError, ProfileError, SessionError, SubjectError,
};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `SubjectService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubjectServiceError {
    #[error(transparent)]
    Subject(#[from] SubjectError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `SessionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionServiceError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AgendaService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AgendaError {
    #[error(transparent)]
    Event(#[from] EventError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProfileService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileServiceError {
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Preferences(#[from] PreferencesError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
