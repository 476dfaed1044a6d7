//! Error types for aide-chat

use thiserror::Error;

/// Result type alias using aide-chat Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during conversation operations
///
/// Collaborator failures never escape the coordinator's operations; they are
/// absorbed by fallback content. These variants cover the plan applier's
/// parent-task failure and internal misuse.
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the collaborator client layer
    #[error(transparent)]
    Api(#[from] aide_api::Error),

    /// A generic conversation error
    #[error("{0}")]
    Other(String),
}
