//! Per-vendor device behavior: prompt recognition and transaction bracketing.
//!
//! Each supported network operating system gets one [`DeviceKind`]
//! implementation, selected once by kind identifier when the transport is
//! built and never swapped afterwards. The command runner and transactional
//! writer stay vendor-agnostic; everything device specific funnels through
//! the three hooks on this trait.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::TransportError;
use crate::reply::Reply;
use crate::transport::SshTransport;

/// Budget for the mode-entering commands a transaction opens with.
const ENTER_TIMEOUT: Duration = Duration::from_secs(5);
/// Budget for the commit command itself.
const COMMIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Vendor-specific hooks the transport dispatches through.
///
/// `prompt_parse` runs on the reader task and must be cheap and
/// allocation-light; the two transaction hooks run on the caller task and
/// may issue commands through the transport they are handed.
#[async_trait]
pub trait DeviceKind: Send + Sync {
    /// Split a delimiter-terminated segment into result and trailing prompt.
    ///
    /// Returns `None` when the segment does not end in something this kind
    /// recognizes as a prompt; the reader then emits the whole segment as
    /// result text. `prompt_char` is the delimiter the reader split on and
    /// must be re-appended to any recognized prompt.
    fn prompt_parse(&self, chunk: &str, prompt_char: char) -> Option<Reply>;

    /// Open a configuration transaction before a batch of lines is sent.
    ///
    /// `write` is true for mutating batches. Kinds without a real
    /// transaction concept may return `Ok(())` without touching the device.
    async fn config_begin(
        &self,
        transport: &mut SshTransport,
        write: bool,
    ) -> Result<(), TransportError>;

    /// Commit the open transaction and return the device's commit reply.
    async fn config_commit(
        &self,
        transport: &mut SshTransport,
    ) -> Result<Reply, TransportError>;
}

/// Look up the [`DeviceKind`] for a kind identifier.
///
/// Unknown kinds are a construction-time error; no connection is attempted.
pub fn kind_for(kind: &str) -> Result<Arc<dyn DeviceKind>, TransportError> {
    match kind {
        "srl" => Ok(Arc::new(SrlKind)),
        "vr-sros" => Ok(Arc::new(VrSrosKind)),
        other => Err(TransportError::UnsupportedKind(other.to_string())),
    }
}

/// Treat the trailing line of `chunk` as a prompt if it contains no spaces.
///
/// Interactive prompts (`srl1`, `A:sros1`, `router(config)`) are space-free,
/// while output lines almost never are; this cheap rule separates the two
/// without a vendor-specific lexer. The delimiter the reader split on is
/// appended back onto the prompt.
pub fn prompt_parse_no_spaces(chunk: &str, prompt_char: char) -> Option<Reply> {
    let (head, last) = match chunk.rfind('\n') {
        Some(n) => (&chunk[..n], &chunk[n + 1..]),
        None => ("", chunk),
    };
    let last = last.trim_end_matches('\r');
    if last.contains(' ') {
        return None;
    }
    Some(Reply {
        result: head.to_string(),
        prompt: format!("{last}{prompt_char}"),
        command: String::new(),
    })
}

/// Nokia SR Linux.
///
/// SR Linux prints a two-line prompt: a `--{ ... }--[ ... ]--` context line
/// followed by `A:<name>#`. The context line is absorbed into the prompt so
/// it never pollutes command results.
pub struct SrlKind;

static SRL_CONTEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^--\{.*\}--\[.*\]--$").expect("srl context pattern"));

/// Output SR Linux prints when `commit now` succeeds.
const SRL_COMMIT_CONFIRMATION: &str = "All changes have been committed";

#[async_trait]
impl DeviceKind for SrlKind {
    fn prompt_parse(&self, chunk: &str, prompt_char: char) -> Option<Reply> {
        let mut reply = prompt_parse_no_spaces(chunk, prompt_char)?;
        let (head_len, context) = match reply.result.rfind('\n') {
            Some(n) => (n, reply.result[n + 1..].trim_end_matches('\r')),
            None => (0, reply.result.trim_end_matches('\r')),
        };
        if SRL_CONTEXT_RE.is_match(context) {
            reply.prompt = format!("{context}\n{}", reply.prompt);
            reply.result.truncate(head_len);
        }
        Some(reply)
    }

    async fn config_begin(
        &self,
        transport: &mut SshTransport,
        write: bool,
    ) -> Result<(), TransportError> {
        if write {
            let target = transport.target().to_string();
            transport
                .run("enter candidate private", ENTER_TIMEOUT)
                .await
                .info(&target);
        }
        Ok(())
    }

    async fn config_commit(
        &self,
        transport: &mut SshTransport,
    ) -> Result<Reply, TransportError> {
        let mut reply = transport.run("commit now", COMMIT_TIMEOUT).await;
        if reply.timed_out() {
            return Err(TransportError::CommitFailed {
                reason: "no prompt after commit now".to_string(),
                reply,
            });
        }
        // SR Linux acknowledges a good commit with a confirmation line;
        // anything else in the output is a validation or apply error.
        if !reply.result.is_empty() {
            if !reply.result.contains(SRL_COMMIT_CONFIRMATION) {
                return Err(TransportError::CommitFailed {
                    reason: "device reported commit errors".to_string(),
                    reply,
                });
            }
            reply.result.clear();
        }
        Ok(reply)
    }
}

/// Nokia SR OS (vSIM / vr-sros).
///
/// Uses the model-driven CLI: configuration happens inside a global edit
/// candidate, committed with `commit`. Any leftover output after the commit
/// echo means the device complained (`MINOR: ...`), which fails the
/// transaction.
pub struct VrSrosKind;

#[async_trait]
impl DeviceKind for VrSrosKind {
    fn prompt_parse(&self, chunk: &str, prompt_char: char) -> Option<Reply> {
        prompt_parse_no_spaces(chunk, prompt_char)
    }

    async fn config_begin(
        &self,
        transport: &mut SshTransport,
        write: bool,
    ) -> Result<(), TransportError> {
        if write {
            let target = transport.target().to_string();
            transport
                .run("/configure global", ENTER_TIMEOUT)
                .await
                .info(&target);
            // Stale candidate content from an earlier aborted session would
            // otherwise be committed along with this batch.
            transport.run("discard", ENTER_TIMEOUT).await.info(&target);
        }
        Ok(())
    }

    async fn config_commit(
        &self,
        transport: &mut SshTransport,
    ) -> Result<Reply, TransportError> {
        let reply = transport.run("commit", COMMIT_TIMEOUT).await;
        if reply.timed_out() {
            return Err(TransportError::CommitFailed {
                reason: "no prompt after commit".to_string(),
                reply,
            });
        }
        if !reply.result.is_empty() {
            return Err(TransportError::CommitFailed {
                reason: "device reported commit errors".to_string(),
                reply,
            });
        }
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;

    #[test]
    fn space_free_trailing_line_becomes_prompt() {
        let reply = prompt_parse_no_spaces("Welcome\r\nsrl1", '#').expect("prompt");
        assert_eq!(reply.result, "Welcome\r");
        assert_eq!(reply.prompt, "srl1#");
    }

    #[test]
    fn banner_with_bare_delimiter_yields_empty_prompt_body() {
        // "Welcome\r\n#" splits into the segment "Welcome\r\n" whose last
        // line is empty: prompt is just the delimiter.
        let reply = prompt_parse_no_spaces("Welcome\r\n", '#').expect("prompt");
        assert_eq!(reply.prompt, "#");
        assert_eq!(reply.result, "Welcome\r");
    }

    #[test]
    fn trailing_line_with_spaces_is_not_a_prompt() {
        assert!(prompt_parse_no_spaces("some output\nmore output here", '#').is_none());
    }

    #[test]
    fn srl_absorbs_context_line_into_prompt() {
        let chunk = "interface up\r\n--{ running }--[ interface ethernet-1/1 ]--\r\nA:srl1";
        let reply = SrlKind.prompt_parse(chunk, '#').expect("prompt");
        assert_eq!(reply.result, "interface up\r");
        assert_eq!(
            reply.prompt,
            "--{ running }--[ interface ethernet-1/1 ]--\nA:srl1#"
        );
    }

    #[test]
    fn srl_without_context_line_keeps_single_line_prompt() {
        let reply = SrlKind.prompt_parse("Welcome\r\nsrl1", '#').expect("prompt");
        assert_eq!(reply.prompt, "srl1#");
    }

    #[test]
    fn unknown_kind_is_a_construction_error() {
        let err = match kind_for("ios-xe") {
            Ok(_) => panic!("ios-xe must not resolve"),
            Err(err) => err,
        };
        assert!(matches!(err, TransportError::UnsupportedKind(k) if k == "ios-xe"));
    }

    #[test]
    fn known_kinds_resolve() {
        assert!(kind_for("srl").is_ok());
        assert!(kind_for("vr-sros").is_ok());
    }
}
