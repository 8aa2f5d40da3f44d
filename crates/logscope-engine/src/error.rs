use thiserror::Error;

use logscope_source::FetchError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("unknown stream '{0}'")]
    UnknownStream(String),
}

/// Start-up failures that require the operator to authenticate again
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("no session token supplied")]
    MissingSession,

    #[error("session rejected by stream source")]
    SessionRejected(#[source] FetchError),
}
