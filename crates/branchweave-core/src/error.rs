//! Error types for branchweave.
//!
//! Nothing here is fatal. Store read errors are logged and absorbed by the
//! session, interaction errors (including failed writes) become
//! user-visible notices, and
//! `BranchError` only surfaces while booting the page integration.

use crate::types::MessageId;

/// Pair store read/write failure.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The storage backend is not reachable (e.g. storage disabled).
    #[error("pair storage unavailable")]
    Unavailable,

    /// Stored data could not be (de)serialized.
    #[error("pair storage serialization failed: {0}")]
    Serde(String),

    /// Backend-specific failure.
    #[error("pair storage error: {0}")]
    Backend(String),
}

/// A rejected user interaction.
///
/// The `Display` text is what gets shown to the user.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InteractionError {
    #[error("choose a start first")]
    NoPendingStart,

    #[error("start and end must be different messages")]
    SameMessage,

    #[error("message {0} is not on the page")]
    NotRendered(MessageId),

    #[error("end must come after start")]
    EndBeforeStart,

    #[error("message {0} is already part of a branch")]
    AlreadyInPair(MessageId),

    /// The pair store refused the write.
    #[error("branches could not be saved")]
    NotSaved,
}

/// Boot and page integration errors.
#[derive(thiserror::Error, Debug)]
pub enum BranchError {
    #[error("no window available")]
    NoWindow,

    #[error("no document available")]
    NoDocument,

    /// DOM call failed.
    #[error("dom error: {0}")]
    Dom(String),

    /// Invalid configuration.
    #[error("invalid config: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
