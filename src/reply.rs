//! The matched command/response record exchanged between the reader task and
//! the command runner.

use log::{debug, info};
use serde::{Deserialize, Serialize};

/// One framed exchange from the device.
///
/// Produced by the stream reader (one per prompt-delimited segment) and
/// returned by [`SshTransport::run`](crate::transport::SshTransport::run)
/// once a segment has been matched to the sent command.
///
/// `command` stays empty unless this reply is the terminal answer to a sent
/// command. A reply with *both* `result` and `prompt` empty is never valid
/// reader output; the runner treats it as an internal defect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    /// Output text, echo and prompt already stripped when matched.
    pub result: String,
    /// The trailing ready-for-input marker, empty on timeout or mid-stream
    /// fragments.
    pub prompt: String,
    /// The command this reply answers, if any.
    pub command: String,
}

impl Reply {
    /// A reply carrying only result text (no prompt boundary seen).
    pub(crate) fn fragment(result: impl Into<String>) -> Self {
        Reply {
            result: result.into(),
            ..Reply::default()
        }
    }

    /// Soft reply returned when the timeout budget expires or the stream
    /// ends before a prompt was matched.
    pub(crate) fn partial(result: String, command: &str) -> Self {
        Reply {
            result,
            prompt: String::new(),
            command: command.to_string(),
        }
    }

    /// True when no prompt boundary was found before this reply was built.
    pub fn timed_out(&self) -> bool {
        self.prompt.is_empty()
    }

    /// Multi-line exchange dump for the logging collaborator.
    ///
    /// Each field is prefixed by a marker character:
    /// `#` command sent, `|` result received, `?` prompt received.
    pub fn log_string(&self, target: &str, linefeed: bool, with_prompt: bool) -> String {
        let indent = " ".repeat(12 + target.len());
        let prefix = format!("\n{indent}");

        let mut s = if linefeed {
            format!("\n{}", " ".repeat(11))
        } else {
            String::new()
        };
        s.push_str(target);
        s.push_str(" # ");
        s.push_str(&self.command);
        s.push_str(&prefix);
        s.push_str("| ");
        s.push_str(&self.result.split('\n').collect::<Vec<_>>().join(&format!("{prefix}| ")));
        if with_prompt {
            s.push_str(&prefix);
            s.push_str("? ");
            s.push_str(
                &self
                    .prompt
                    .split('\n')
                    .collect::<Vec<_>>()
                    .join(&format!("{prefix}? ")),
            );
        }
        s
    }

    /// Log the exchange at info level. Silent when the result is empty, so
    /// prompt-only acknowledgements do not flood the transaction log.
    pub fn info(&self, target: &str) -> &Self {
        if self.result.is_empty() {
            return self;
        }
        info!("{}", self.log_string(target, false, false));
        self
    }

    /// Full exchange dump (including the prompt) at debug level.
    pub fn dump(&self, target: &str, note: &str) {
        debug!("{note}{}", self.log_string(target, true, true));
    }
}
