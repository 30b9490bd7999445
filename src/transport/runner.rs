use super::*;

impl SshTransport {
    /// Send one line to the device shell.
    async fn writeln(&mut self, command: &str) -> std::io::Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.write_all(command.as_bytes()).await?;
            writer.write_all(b"\r").await?;
            writer.flush().await?;
        }
        Ok(())
    }

    /// Run a single command and wait for its matched reply.
    ///
    /// Writes the command (when non-empty), then consumes framed replies
    /// from the reader until one can be matched to it. The device echoes the
    /// typed command before its actual response and may interleave several
    /// prompt-bounded segments per physical read; fragments are accumulated
    /// and the echo prefix is stripped from the matched text.
    ///
    /// `run` never fails. When `timeout` expires, or the stream has ended,
    /// it returns a soft reply with an empty prompt carrying whatever
    /// partial text accumulated ("no prompt seen in time", not a
    /// connection error). Once the device starts answering, the remaining
    /// wait shrinks to [`SHORT_WAIT`] per fragment.
    pub async fn run(&mut self, command: &str, timeout: Duration) -> Reply {
        if !command.is_empty() {
            if let Err(err) = self.writeln(command).await {
                warn!("{} write failed for {command:?}: {err}", self.target);
            }
            debug!("--> {command}");
        }

        let mut history = String::new();
        let mut wait = timeout;

        loop {
            let received = match self.rx.as_mut() {
                Some(rx) => tokio::time::timeout(wait, rx.recv()).await,
                None => return Reply::partial(history, command),
            };

            let reply = match received {
                Err(_) => {
                    warn!("timeout waiting for prompt: {command}");
                    return Reply::partial(history, command);
                }
                Ok(None) => {
                    debug!("{} stream ended while waiting: {command}", self.target);
                    self.rx = None;
                    return Reply::partial(history, command);
                }
                Ok(Some(reply)) => reply,
            };

            if self.dump >= DumpLevel::Replies {
                reply.dump(&self.target, "chan");
            }

            if reply.result.is_empty() && reply.prompt.is_empty() {
                // The reader is structured to never emit this.
                debug_assert!(false, "reader emitted an empty reply");
                error!("{} reader emitted an empty reply, skipping", self.target);
                continue;
            }

            if reply.prompt.is_empty() {
                // Mid-stream output with no boundary yet; the device is
                // actively sending, so further waits can be short.
                history.push_str(&reply.result);
                wait = SHORT_WAIT;
                continue;
            }

            // A boundary was found; rejoin anything accumulated earlier.
            let combined = if history.is_empty() {
                reply.result
            } else {
                let joined = format!("{history}{}{}", self.prompt_char, reply.result);
                history.clear();
                joined
            };

            let mut text = combined.trim_matches([' ', '\n', '\r', '\t']).to_string();
            if let Some(stripped) = text.strip_prefix(command) {
                text = stripped.trim_matches([' ', '\n', '\r', '\t']).to_string();
            } else if !text.contains(command) {
                // Stale echo or partial match; not the answer to this
                // command yet.
                debug!("read more for {command:?}: {text:?}");
                history = text;
                continue;
            }

            let matched = Reply {
                result: text,
                prompt: reply.prompt,
                command: command.to_string(),
            };
            if self.dump >= DumpLevel::Replies {
                matched.dump(&self.target, "run");
            }
            return matched;
        }
    }

    /// Push a multi-line configuration blob, transaction-bracketed.
    ///
    /// `info` labels the batch in log output; an `info` starting with
    /// `show-` marks the blob read-only and skips the transaction hooks
    /// entirely. Blank lines and comments (leading prompt char) are
    /// skipped. Each remaining line runs with a [`LINE_TIMEOUT`] budget and
    /// is logged. Writable blobs end with the device kind's commit; a
    /// commit failure is returned after the transaction summary has been
    /// logged. Lines already executed are not rolled back.
    pub async fn write(&mut self, data: &str, info: &str) -> Result<(), TransportError> {
        if data.is_empty() {
            return Ok(());
        }

        let transaction = !info.starts_with("show-");
        let kind = Arc::clone(&self.kind);
        if transaction {
            kind.config_begin(self, true).await?;
        }

        let mut lines = 0usize;
        for line in data.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(self.prompt_char) {
                continue;
            }
            lines += 1;
            let target = self.target.clone();
            self.run(line, LINE_TIMEOUT).await.info(&target);
        }

        if transaction {
            let outcome = kind.config_commit(self).await;
            let commit_reply = match &outcome {
                Ok(reply) => Some(reply),
                Err(TransportError::CommitFailed { reply, .. }) => Some(reply),
                Err(_) => None,
            };

            let mut msg = commit_summary(info, lines);
            if let Some(reply) = commit_reply {
                if !reply.result.is_empty() {
                    msg.push_str(&reply.log_string(&self.target, true, false));
                }
            }

            match outcome {
                Ok(_) => info!("{msg}"),
                Err(err) => {
                    error!("{msg}");
                    return Err(err);
                }
            }
        }

        Ok(())
    }
}

/// Transaction summary line for the logging collaborator.
pub(crate) fn commit_summary(info: &str, lines: usize) -> String {
    format!("{info} COMMIT - {lines} lines")
}

#[cfg(test)]
mod tests {
    use super::commit_summary;

    #[test]
    fn summary_reports_info_and_line_count() {
        assert_eq!(commit_summary("config-update", 2), "config-update COMMIT - 2 lines");
        assert_eq!(commit_summary("bgp-base", 0), "bgp-base COMMIT - 0 lines");
    }
}
