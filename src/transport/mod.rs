//! The per-connection transport: lifecycle, configuration, and the framing
//! engine that turns a raw shell byte stream into matched exchanges.
//!
//! One [`SshTransport`] owns one shell session and one background reader
//! task. All command traffic goes through [`run`](SshTransport::run) and
//! [`write`](SshTransport::write), which take `&mut self`: callers are
//! serialized by the borrow checker, matching the wire protocol's
//! one-request-in-flight reality.

use std::sync::Arc;
use std::time::Duration;

use async_ssh2_tokio::ServerCheckMethod;
use async_ssh2_tokio::client::Client;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::config::SecurityLevel;
use crate::error::TransportError;
use crate::kind::{DeviceKind, kind_for};
use crate::reply::Reply;

pub use session::ShellSession;

/// Default delimiter assumed to terminate every interactive prompt.
pub const DEFAULT_PROMPT_CHAR: char = '#';
/// Default SSH port.
pub const DEFAULT_PORT: u16 = 22;

/// Budget for draining the banner and first prompt after connecting.
pub(crate) const LOGIN_TIMEOUT: Duration = Duration::from_secs(15);
/// Budget for each configuration line pushed by `write`.
pub(crate) const LINE_TIMEOUT: Duration = Duration::from_secs(5);
/// Shrunk wait once the device is already mid-answer.
pub(crate) const SHORT_WAIT: Duration = Duration::from_secs(2);

/// How much of each exchange is handed to the logging collaborator.
///
/// Threaded through the transport and the reader task at construction time;
/// there is no process-wide verbosity global.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DumpLevel {
    /// Transaction summaries and executed lines only.
    #[default]
    Off,
    /// Additionally dump every framed reply at debug level.
    Replies,
    /// Additionally dump raw byte chunks at trace level.
    Raw,
}

/// Authentication configuration for the underlying SSH session.
///
/// [`Credentials::password`] defaults to accepting any host key and the
/// legacy-compatible algorithm profile. That posture suits disposable lab
/// topologies and is **unsafe for production**; use
/// [`with_server_check`](Credentials::with_server_check) and
/// [`with_security_level`](Credentials::with_security_level) to harden it.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) server_check: ServerCheckMethod,
    pub(crate) level: SecurityLevel,
}

impl Credentials {
    /// Username/password credentials with the permissive lab defaults.
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
            server_check: ServerCheckMethod::NoCheck,
            level: SecurityLevel::LegacyCompatible,
        }
    }

    /// Override the host key verification policy.
    pub fn with_server_check(mut self, server_check: ServerCheckMethod) -> Self {
        self.server_check = server_check;
        self
    }

    /// Override the SSH algorithm profile.
    pub fn with_security_level(mut self, level: SecurityLevel) -> Self {
        self.level = level;
        self
    }
}

/// Interactive-shell transport for one network device.
///
/// Built with [`new`](SshTransport::new), configured with the `with_*`
/// methods, connected once, used for any number of sequential
/// [`run`](SshTransport::run)/[`write`](SshTransport::write) calls, then
/// closed. Reconnecting means building a fresh transport.
pub struct SshTransport {
    kind: Arc<dyn DeviceKind>,
    prompt_char: char,
    port: u16,
    target: String,
    credentials: Option<Credentials>,
    dump: DumpLevel,
    login_message: Option<Reply>,
    rx: Option<mpsc::Receiver<Reply>>,
    writer: Option<Box<dyn AsyncWrite + Send + Unpin>>,
    client: Option<Client>,
}

impl SshTransport {
    /// Create an unconnected transport for a device kind (`"srl"`,
    /// `"vr-sros"`).
    pub fn new(kind: &str) -> Result<Self, TransportError> {
        Ok(Self::from_kind(kind_for(kind)?))
    }

    /// Create an unconnected transport around a custom [`DeviceKind`]
    /// implementation, for vendors the built-in registry does not cover.
    pub fn from_kind(kind: Arc<dyn DeviceKind>) -> Self {
        SshTransport {
            kind,
            prompt_char: DEFAULT_PROMPT_CHAR,
            port: DEFAULT_PORT,
            target: String::new(),
            credentials: None,
            dump: DumpLevel::default(),
            login_message: None,
            rx: None,
            writer: None,
            client: None,
        }
    }

    /// Set the authentication configuration. Required before `connect`.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Override the SSH port (default 22).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Override the prompt delimiter character (default `#`).
    pub fn with_prompt_char(mut self, prompt_char: char) -> Self {
        self.prompt_char = prompt_char;
        self
    }

    /// Set the exchange dump verbosity (default [`DumpLevel::Off`]).
    pub fn with_dump_level(mut self, dump: DumpLevel) -> Self {
        self.dump = dump;
        self
    }

    /// Short label for this device used in log lines.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The configured prompt delimiter.
    pub fn prompt_char(&self) -> char {
        self.prompt_char
    }

    /// Banner and first prompt captured right after connecting.
    pub fn login_message(&self) -> Option<&Reply> {
        self.login_message.as_ref()
    }

    /// True while a session is attached and the reader channel is open.
    pub fn is_connected(&self) -> bool {
        self.rx.is_some()
    }

    /// Dial the device and start the exchange engine.
    ///
    /// `host` carries no port; the configured port is appended. Fails when
    /// no credentials were configured or the dial/auth/shell setup fails.
    /// The transport never retries; the caller owns the retry policy.
    pub async fn connect(&mut self, host: &str) -> Result<(), TransportError> {
        let credentials = self
            .credentials
            .clone()
            .ok_or(TransportError::MissingCredentials)?;

        self.target = target_label(host);
        let session = ShellSession::open(host, self.port, &credentials).await?;
        info!("connected to {host}:{}", self.port);

        self.attach(session).await;
        Ok(())
    }

    /// Attach an already-open session: spawn the reader task and capture the
    /// login message.
    ///
    /// `connect` calls this after dialing; tests and device simulators call
    /// it directly with a [`ShellSession::from_streams`] session.
    pub async fn attach(&mut self, session: ShellSession) {
        let (input, output, client) = session.into_parts();
        self.writer = Some(output);
        self.client = client;
        self.rx = Some(reader::spawn_reader(
            input,
            Arc::clone(&self.kind),
            self.prompt_char,
            self.dump,
            self.target.clone(),
        ));

        // Drain the banner and the first prompt before any caller command.
        let login = self.run("", LOGIN_TIMEOUT).await;
        if self.dump >= DumpLevel::Replies {
            login.dump(&self.target, "login");
        }
        self.login_message = Some(login);
    }

    /// Stop the reader and release the underlying session.
    ///
    /// Safe to call more than once; every call after the first is a no-op.
    /// Must not race a `run`/`write` in flight; `&mut self` rules that out
    /// within one task.
    pub async fn close(&mut self) {
        // Dropping the receiver first makes the reader task's next send
        // fail, which ends it even while a read is still blocked.
        self.rx = None;

        if let Some(mut writer) = self.writer.take() {
            if let Err(err) = writer.shutdown().await {
                debug!("{} shell writer shutdown: {err}", self.target);
            }
        }
        if let Some(client) = self.client.take() {
            if let Err(err) = client.disconnect().await {
                debug!("{} ssh disconnect: {err}", self.target);
            }
        }
    }
}

/// Derive the log label from a host name.
///
/// Lab hosts follow a `<prefix>-<topology>-<node>` convention; the node part
/// is the interesting bit. Falls back to the whole host (minus any port).
fn target_label(host: &str) -> String {
    let host = host.split(':').next().unwrap_or(host);
    host.rsplit('-').next().unwrap_or(host).to_string()
}

mod reader;
mod runner;
mod session;

#[cfg(test)]
mod tests {
    use super::target_label;

    #[test]
    fn target_label_takes_trailing_node_component() {
        assert_eq!(target_label("netlab-core-srl1"), "srl1");
        assert_eq!(target_label("netlab-core-srl1:2022"), "srl1");
    }

    #[test]
    fn target_label_falls_back_to_whole_host() {
        assert_eq!(target_label("router7"), "router7");
        assert_eq!(target_label("10.0.0.1:22"), "10.0.0.1");
    }
}
