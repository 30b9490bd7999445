//! # shellwire - Transactional command runner for interactive device shells
//!
//! `shellwire` turns the raw, byte-oriented CLI of a network device,
//! reached over an authenticated SSH shell session, into a sequence of
//! discrete, matched command/response transactions. Automation code issues
//! a command and reliably receives exactly its output, free of prompt
//! noise, command echo, and partial-read artifacts.
//!
//! ## Features
//!
//! - **Prompt framing**: a background reader splits the raw stream on the
//!   device's prompt delimiter and separates output from prompts
//! - **Echo stripping & reassembly**: responses fragmented across reads are
//!   reassembled and matched to the command that caused them
//! - **Soft timeouts**: a command that sees no prompt in time yields a
//!   partial reply, never an error or a hang
//! - **Vendor transactions**: multi-line config pushes are bracketed by
//!   per-kind begin/commit hooks (Nokia SR Linux and SR OS included)
//! - **Async/Await**: built on Tokio and russh
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use shellwire::transport::{Credentials, SshTransport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut transport = SshTransport::new("srl")?
//!         .with_credentials(Credentials::password("admin", "admin"));
//!
//!     transport.connect("netlab-core-srl1").await?;
//!     if let Some(login) = transport.login_message() {
//!         println!("banner: {}", login.result);
//!     }
//!
//!     let reply = transport.run("show version", Duration::from_secs(5)).await;
//!     println!("{}", reply.result);
//!
//!     transport
//!         .write("set interface ethernet-1/1 admin-state enable\n", "iface-update")
//!         .await?;
//!
//!     transport.close().await;
//!     Ok(())
//! }
//! ```
//!
//! Calls on one transport are strictly sequential: the wire protocol has no
//! request IDs, so there is never more than one logical request in flight.
//! `&mut self` on [`run`](transport::SshTransport::run) and
//! [`write`](transport::SshTransport::write) makes that a compile-time
//! guarantee within a task; give each transport one owning task.
//!
//! ## Main Components
//!
//! - [`transport::SshTransport`] - Per-connection lifecycle and the
//!   command/response engine
//! - [`kind::DeviceKind`] - Vendor hooks for prompt parsing and transactions
//! - [`reply::Reply`] - One framed exchange (result, prompt, command)
//! - [`error::TransportError`] - Construction/connection/commit failures
//! - [`config`] - SSH algorithm preference profiles

pub mod config;
pub mod error;
pub mod kind;
pub mod reply;
pub mod transport;
