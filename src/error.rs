//! Error types for transport construction, connection, and transactions.
//!
//! Command timeouts are deliberately *not* represented here: a command that
//! sees no prompt in time degrades to a soft [`Reply`](crate::reply::Reply)
//! with an empty prompt, and the caller decides what to do next.

use thiserror::Error;

use crate::reply::Reply;

/// Errors that can occur while building, connecting, or writing through an
/// [`SshTransport`](crate::transport::SshTransport).
#[derive(Error, Debug)]
pub enum TransportError {
    /// No transport implementation exists for the requested device kind.
    ///
    /// Returned by [`kind_for`](crate::kind::kind_for) before any connection
    /// attempt is made.
    #[error("no transport implemented for kind: {0}")]
    UnsupportedKind(String),

    /// `connect` was called before credentials were configured.
    #[error("require auth credentials before connect")]
    MissingCredentials,

    /// Dial, authentication, or shell-session startup failed.
    ///
    /// The caller decides the retry policy; the transport never retries.
    #[error("cannot connect to {host}: {source}")]
    ConnectFailed {
        host: String,
        #[source]
        source: async_ssh2_tokio::Error,
    },

    /// An error surfaced by the russh layer after the session was up.
    #[error("russh error: {0}")]
    Ssh(#[from] russh::Error),

    /// A raw stream read/write failed outside the reader task.
    #[error("shell io error: {0}")]
    Io(#[from] std::io::Error),

    /// The device rejected or never confirmed a configuration commit.
    ///
    /// Carries the commit [`Reply`] so the transaction summary can still
    /// include whatever the device said. Earlier lines of the batch may
    /// already be applied; there is no rollback.
    #[error("config commit failed: {reason}")]
    CommitFailed { reply: Reply, reason: String },
}
