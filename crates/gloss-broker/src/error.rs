//! Error types for gloss-broker

use thiserror::Error;

/// Result type alias using gloss-broker Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the coordinator context
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the wire layer
    #[error(transparent)]
    Stream(#[from] gloss_stream::Error),

    /// A command could not be delivered or acknowledged
    #[error(transparent)]
    Router(#[from] crate::router::RouterError),

    /// Injection of the content context failed
    #[error("Injection failed for tab {0}: {1}")]
    Injection(crate::session::TabId, String),

    /// A generic coordinator error
    #[error("{0}")]
    Other(String),
}
