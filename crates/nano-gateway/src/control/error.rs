//! Service registration errors

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`Manager::register`](super::Manager::register)
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("service {0} is already registered")]
    DuplicateService(String),

    #[error("data folder {folder} is already used by service {owner}")]
    DuplicateFolder { folder: String, owner: String },

    /// Public folders start upper case, private ones lower case
    #[error("{kind} data folder {folder} must start with an {expected} case letter")]
    FolderCase {
        kind: &'static str,
        folder: String,
        expected: &'static str,
    },

    #[error("create data folder {}: {source}", path.display())]
    CreateFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ControlResult<T> = Result<T, ControlError>;
