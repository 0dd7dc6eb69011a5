//! Minimal console prompting used by the terminal dialogs
//!
//! Reads go through `std::io::stdin` on a blocking thread so that the
//! process-wide stdin buffer is shared by every prompt.

use std::io::{BufRead, Write};

use crate::errors::{SharedError, SharedResult};

/// Print `question` and read one trimmed line from stdin
///
/// Returns `SharedError::ConsoleClosed` when stdin is at end of file.
pub async fn ask(question: String) -> SharedResult<String> {
    tokio::task::spawn_blocking(move || {
        let mut stdout = std::io::stdout();
        write!(stdout, "{question}")?;
        stdout.flush()?;

        let mut line = String::new();
        let read = std::io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(SharedError::ConsoleClosed);
        }
        Ok(line.trim().to_string())
    })
    .await
    .map_err(|e| SharedError::ConsoleIo(std::io::Error::other(e)))?
}
