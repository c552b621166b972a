//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use mathquiz_core::catalog::CatalogError;
use mathquiz_core::model::{ConfigurationError, NameError};
use storage::repository::StorageError;

use crate::session::SessionPhase;

/// Errors emitted by the quiz session and its loop service.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("cannot {operation} while the session is {phase}")]
    InvalidTransition {
        operation: &'static str,
        phase: SessionPhase,
    },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Name(#[from] NameError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while loading a catalog file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogLoadError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
