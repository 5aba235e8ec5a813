//! Interactive page URL prompt.

use std::io::{self, BufRead, Write};

/// Prompt shown when no URL was passed on the command line.
pub(crate) const URL_PROMPT: &str = "Enter the website URL (e.g. https://example.com): ";

/// Writes the prompt and reads one line; EOF yields an empty string.
pub(crate) fn prompt_for_url<R: BufRead, W: Write>(mut reader: R, mut writer: W) -> io::Result<String> {
    writer.write_all(URL_PROMPT.as_bytes())?;
    writer.flush()?;

    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(line.trim().to_string())
}
