use super::*;

use async_ssh2_tokio::Config;
use async_ssh2_tokio::client::AuthMethod;
use russh::Pty;
use tokio::io::AsyncRead;

use crate::config;

/// The underlying interactive-shell session.
///
/// All the transport requires from it is a byte-readable input stream, a
/// byte-writable output stream, and a close operation. [`open`] builds one
/// from an SSH dial; [`from_streams`] builds one from any stream pair and is
/// the seam used by tests and device simulators.
///
/// [`open`]: ShellSession::open
/// [`from_streams`]: ShellSession::from_streams
pub struct ShellSession {
    input: Box<dyn AsyncRead + Send + Unpin>,
    output: Box<dyn AsyncWrite + Send + Unpin>,
    client: Option<Client>,
}

impl ShellSession {
    /// Dial `host:port`, authenticate, and start an interactive shell.
    ///
    /// Requests a dumb PTY with local echo so the device output behaves like
    /// a human-facing terminal; some network operating systems refuse to
    /// start a CLI without one.
    pub async fn open(
        host: &str,
        port: u16,
        credentials: &Credentials,
    ) -> Result<ShellSession, TransportError> {
        let addr = format!("{host}:{port}");
        let config = Config {
            preferred: config::preferred(credentials.level),
            inactivity_timeout: Some(Duration::from_secs(60)),
            ..Default::default()
        };

        let client = Client::connect_with_config(
            (host.to_string(), port),
            &credentials.username,
            AuthMethod::with_password(&credentials.password),
            credentials.server_check.clone(),
            config,
        )
        .await
        .map_err(|source| TransportError::ConnectFailed {
            host: addr.clone(),
            source,
        })?;

        let mut channel = client
            .get_channel()
            .await
            .map_err(|source| TransportError::ConnectFailed { host: addr, source })?;
        channel
            .request_pty(false, "dumb", 100, 24, 0, 0, &[(Pty::ECHO, 1)])
            .await?;
        channel.request_shell(false).await?;
        debug!("{host}:{port} shell started");

        let (input, output) = tokio::io::split(channel.into_stream());
        Ok(ShellSession {
            input: Box::new(input),
            output: Box::new(output),
            client: Some(client),
        })
    }

    /// Wrap an arbitrary stream pair as a session.
    ///
    /// No SSH client is held, so closing the transport only shuts the
    /// streams down.
    pub fn from_streams(
        input: impl AsyncRead + Send + Unpin + 'static,
        output: impl AsyncWrite + Send + Unpin + 'static,
    ) -> ShellSession {
        ShellSession {
            input: Box::new(input),
            output: Box::new(output),
            client: None,
        }
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        Box<dyn AsyncRead + Send + Unpin>,
        Box<dyn AsyncWrite + Send + Unpin>,
        Option<Client>,
    ) {
        (self.input, self.output, self.client)
    }
}
