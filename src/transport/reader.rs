use super::*;

use log::trace;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Spawn the background reader task for one session.
///
/// The task continuously reads the raw input stream, splits the buffered
/// text on `prompt_char`, runs every completed segment through the device
/// kind's prompt parser, and emits one [`Reply`] per segment on the returned
/// channel. The channel has capacity one: the reader stalls until the
/// consumer is ready, which is the only backpressure in the system.
///
/// On read error or end of stream the task emits one final reply carrying
/// whatever text is still buffered (skipped when empty, so the reader never
/// emits a fully-empty reply) and ends. A dropped receiver ends the task on
/// its next send.
pub(crate) fn spawn_reader(
    mut input: Box<dyn AsyncRead + Send + Unpin>,
    kind: Arc<dyn DeviceKind>,
    prompt_char: char,
    dump: DumpLevel,
    target: String,
) -> mpsc::Receiver<Reply> {
    let (tx, rx) = mpsc::channel(1);

    tokio::spawn(async move {
        let mut buf = [0u8; 1024];
        let mut pending = String::new();

        'read: loop {
            match input.read(&mut buf).await {
                Ok(0) => break 'read,
                Ok(n) => {
                    let chunk = String::from_utf8_lossy(&buf[..n]);
                    if dump >= DumpLevel::Raw {
                        trace!("{target} <-- {:?}", chunk);
                    }
                    pending.push_str(&chunk);

                    if !pending.contains(prompt_char) {
                        continue;
                    }
                    let mut segments: Vec<String> =
                        pending.split(prompt_char).map(str::to_string).collect();
                    // Text after the last delimiter starts the next buffer.
                    pending = segments.pop().unwrap_or_default();

                    for segment in segments {
                        let reply = kind
                            .prompt_parse(&segment, prompt_char)
                            .unwrap_or_else(|| Reply::fragment(segment));
                        if reply.result.is_empty() && reply.prompt.is_empty() {
                            continue;
                        }
                        if tx.send(reply).await.is_err() {
                            // Consumer closed the transport.
                            break 'read;
                        }
                    }
                }
                Err(err) => {
                    debug!("{target} reader stream ended: {err}");
                    break 'read;
                }
            }
        }

        if !pending.is_empty() {
            let _ = tx.send(Reply::fragment(pending)).await;
        }
        debug!("{target} reader task ended");
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::spawn_reader;
    use crate::kind::kind_for;
    use crate::transport::DumpLevel;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;

    fn reader_over_duplex() -> (
        tokio::io::DuplexStream,
        tokio::sync::mpsc::Receiver<crate::reply::Reply>,
    ) {
        let (device, local) = tokio::io::duplex(4096);
        let (input, _output) = tokio::io::split(local);
        let rx = spawn_reader(
            Box::new(input),
            kind_for("srl").expect("srl kind"),
            '#',
            DumpLevel::Off,
            "test".to_string(),
        );
        (device, rx)
    }

    #[tokio::test]
    async fn holds_chunks_until_delimiter_appears() {
        let (mut device, mut rx) = reader_over_duplex();

        device.write_all(b"no delimiter yet").await.expect("write");
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err(), "reply emitted without delimiter");

        device.write_all(b"\r\nsrl1#").await.expect("write");
        let reply = rx.recv().await.expect("reply after delimiter");
        assert_eq!(reply.result, "no delimiter yet\r");
        assert_eq!(reply.prompt, "srl1#");
    }

    #[tokio::test]
    async fn emits_one_reply_per_segment_in_order() {
        let (mut device, mut rx) = reader_over_duplex();

        device
            .write_all(b"alpha\r\nsrl1#beta\r\nsrl1#")
            .await
            .expect("write");

        let first = rx.recv().await.expect("first reply");
        assert_eq!(first.result, "alpha\r");
        assert_eq!(first.prompt, "srl1#");

        let second = rx.recv().await.expect("second reply");
        assert_eq!(second.result, "beta\r");
        assert_eq!(second.prompt, "srl1#");
    }

    #[tokio::test]
    async fn segment_without_prompt_shape_is_all_result() {
        let (mut device, mut rx) = reader_over_duplex();

        // Trailing line contains spaces, so the kind declines to see a
        // prompt; the whole segment becomes result text.
        device.write_all(b"50% complete so far#").await.expect("write");

        let reply = rx.recv().await.expect("fragment reply");
        assert_eq!(reply.result, "50% complete so far");
        assert!(reply.prompt.is_empty());
    }

    #[tokio::test]
    async fn stream_end_drains_remaining_buffer() {
        let (mut device, mut rx) = reader_over_duplex();

        device.write_all(b"tail without prompt").await.expect("write");
        drop(device);

        let reply = rx.recv().await.expect("drained reply");
        assert_eq!(reply.result, "tail without prompt");
        assert!(reply.prompt.is_empty());
        assert!(rx.recv().await.is_none(), "channel should close after drain");
    }

    #[tokio::test]
    async fn clean_eof_with_empty_buffer_just_closes_channel() {
        let (mut device, mut rx) = reader_over_duplex();

        device.write_all(b"done\r\nsrl1#").await.expect("write");
        let _ = rx.recv().await.expect("framed reply");
        drop(device);

        assert!(rx.recv().await.is_none());
    }
}
