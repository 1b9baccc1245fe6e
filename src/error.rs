//! Error taxonomy for the Lingo API client

use std::time::Duration;

use thiserror::Error;

use crate::document::DocumentHandle;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Invalid combination of caller-supplied arguments, detected before any
    /// network call is made.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("authorization failure, check auth_key{detail}")]
    Authorization { detail: String },

    #[error("quota for this billing period has been exceeded{detail}")]
    QuotaExceeded { detail: String },

    #[error("too many requests, servers are currently experiencing high load{detail}")]
    TooManyRequests { detail: String },

    /// The request never produced an HTTP response (timeout, refused
    /// connection, DNS failure). `should_retry` is false once the executor has
    /// exhausted its retry budget.
    #[error("connection failure: {message}")]
    Connection { message: String, should_retry: bool },

    #[error("glossary not found{detail}")]
    GlossaryNotFound { detail: String },

    /// The translated document is not available yet. Callers may poll past
    /// this and try the download again later.
    #[error("document not ready{detail}")]
    DocumentNotReady { detail: String },

    /// Any other error status reported by the server.
    #[error("{message}")]
    Server {
        message: String,
        status: u16,
        should_retry: bool,
    },

    /// Local filesystem failure while reading an input or writing an output
    /// file. Distinct from [`Error::Config`]: the arguments were fine, the
    /// I/O was not.
    #[error("I/O failure: {0}")]
    Io(String),

    /// Malformed or size-mismatched response. Never retried.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Client-side deadline elapsed while waiting for a document translation.
    /// The document handle remains valid for a resumed wait.
    #[error("deadline of {limit:?} exceeded while waiting for document translation")]
    WaitDeadlineExceeded { limit: Duration },

    /// A failure that occurred after a document was uploaded. Carries the
    /// handle so the caller can resume or query the job out-of-band.
    #[error("{message}, document handle: {handle}")]
    DocumentTranslation {
        message: String,
        handle: DocumentHandle,
        #[source]
        source: Option<Box<Error>>,
    },
}

impl Error {
    /// Wraps an error that occurred after a successful document upload,
    /// attaching the handle of the orphaned server-side job.
    pub(crate) fn with_handle(source: Error, handle: DocumentHandle) -> Error {
        Error::DocumentTranslation {
            message: source.to_string(),
            handle,
            source: Some(Box::new(source)),
        }
    }

    /// Whether a fresh attempt of the same operation might succeed. Purely
    /// informational for callers; the client has already exhausted its own
    /// retry budget before surfacing a retryable error.
    pub fn should_retry(&self) -> bool {
        match self {
            Error::Connection { should_retry, .. } | Error::Server { should_retry, .. } => {
                *should_retry
            }
            Error::TooManyRequests { .. } | Error::DocumentNotReady { .. } => true,
            Error::DocumentTranslation { source, .. } => {
                source.as_ref().is_some_and(|e| e.should_retry())
            }
            _ => false,
        }
    }

    /// The HTTP status code associated with this error, if any was observed.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Error::Authorization { .. } => Some(403),
            Error::QuotaExceeded { .. } => Some(456),
            Error::TooManyRequests { .. } => Some(429),
            Error::GlossaryNotFound { .. } => Some(404),
            Error::DocumentNotReady { .. } => Some(503),
            Error::Server { status, .. } => Some(*status),
            Error::DocumentTranslation { source, .. } => {
                source.as_ref().and_then(|e| e.http_status())
            }
            _ => None,
        }
    }

    /// Strips the retry tag from an error whose retry budget is spent.
    pub(crate) fn exhausted(self) -> Error {
        match self {
            Error::Connection { message, .. } => Error::Connection {
                message,
                should_retry: false,
            },
            other => other,
        }
    }
}
