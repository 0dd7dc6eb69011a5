//! Forwarding of the backend's stdout/stderr
//!
//! Output is always piped and drained line by line so the child never blocks
//! on a full pipe. Each line goes to an [`OutputSink`]; the default sink
//! re-emits it through tracing under the `backend` component. Lines are raw
//! bytes decoded lossily: a stray non-UTF-8 byte must not stop the drain, or
//! the child dies on its next write to the closed pipe.

use std::borrow::Cow;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};

use shared::{shell_info, shell_warn, Component};

/// Consecutive read errors tolerated before a stream is abandoned
const MAX_READ_ERRORS: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// Receiver of the child's output lines
pub trait OutputSink: Send + Sync + 'static {
    fn line(&self, stream: OutputStream, line: &str);
}

/// Sink that logs stdout at info and stderr at warn
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl OutputSink for TracingSink {
    fn line(&self, stream: OutputStream, line: &str) {
        match stream {
            OutputStream::Stdout => shell_info!(Component::Backend, "{}", line),
            OutputStream::Stderr => shell_warn!(Component::Backend, "{}", line),
        }
    }
}

/// Pipe stdout/stderr and close stdin
pub fn configure_child_stdio(cmd: &mut Command) {
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped()).stdin(Stdio::null());
}

/// Spawn one drain task per piped stream
pub fn spawn_output_consumers(child: &mut Child, sink: Arc<dyn OutputSink>) {
    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(forward_lines(stdout, OutputStream::Stdout, sink.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(forward_lines(stderr, OutputStream::Stderr, sink));
    }
}

async fn forward_lines<R>(reader: R, stream: OutputStream, sink: Arc<dyn OutputSink>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut errors = 0;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                errors = 0;
                sink.line(stream, &decode_line(&buf));
            }
            Err(e) => {
                errors += 1;
                if errors >= MAX_READ_ERRORS {
                    shell_warn!(Component::Backend, "Giving up on backend {:?}: {}", stream, e);
                    break;
                }
                shell_warn!(Component::Backend, "Read error on backend {:?}: {}", stream, e);
            }
        }
    }
}

/// Strip the line terminator and replace invalid UTF-8
pub fn decode_line(raw: &[u8]) -> Cow<'_, str> {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw)
}
