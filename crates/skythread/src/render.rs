//! Terminal output: prompts, section rules and clickable links.

use std::fmt::Display;
use std::io::{self, BufRead, Write};

const RULE_WIDTH: usize = 80;
const CDN_BASE: &str = "https://cdn.bsky.app/img/feed_fullsize/plain";

/// Wrap `url` in an OSC 8 escape so terminals that support it make it clickable.
pub fn hyperlink(url: &str) -> String {
    format!("\x1b]8;;{url}\x1b\\{url}\x1b]8;;\x1b\\")
}

/// Public URL of an image attached to a post by `did`.
///
/// Anything that already looks like a URL is returned as-is; otherwise the
/// reference is taken to be a blob CID and pointed at the CDN.
pub fn image_url(did: &str, reference: &str) -> String {
    if reference.starts_with("http://") || reference.starts_with("https://") {
        reference.to_owned()
    } else {
        format!("{CDN_BASE}/{did}/{reference}@jpeg")
    }
}

/// Line-oriented console over any reader and writer.
///
/// Production code wraps stdin/stdout; tests drive it with in-memory buffers.
pub struct Console<R, W> {
    input: R,
    output: W,
    hyperlinks: bool,
}

impl<R, W> Console<R, W>
where
    R: BufRead,
    W: Write,
{
    pub fn new(input: R, output: W, hyperlinks: bool) -> Self {
        Self {
            input,
            output,
            hyperlinks,
        }
    }

    /// Print `message` without a newline and read one line.
    ///
    /// Returns `None` at end of input, otherwise the line with surrounding
    /// whitespace trimmed. Bytes that are not UTF-8 come back as U+FFFD, so a
    /// garbled line is just unrecognised input.
    pub fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        write!(self.output, "{message}")?;
        self.output.flush()?;
        let mut line = Vec::new();
        if self.input.read_until(b'\n', &mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&line).trim().to_owned()))
    }

    pub fn line(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.output, "{text}")
    }

    /// A `label: url` line, with the URL clickable when enabled.
    pub fn link_line(&mut self, label: &str, url: &str) -> io::Result<()> {
        let link = self.link(url);
        writeln!(self.output, "{label}{link}")
    }

    /// The `=` banner that opens each post display.
    pub fn banner(&mut self, title: impl Display) -> io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(self.output, "\n{rule}\n{title}\n{rule}")
    }

    /// A `-` ruled section header.
    pub fn section(&mut self, title: &str) -> io::Result<()> {
        let rule = "-".repeat(RULE_WIDTH);
        writeln!(self.output, "\n{rule}\n{title}\n{rule}")
    }

    /// `url`, clickable when hyperlinks are enabled.
    pub fn link(&self, url: &str) -> String {
        if self.hyperlinks {
            hyperlink(url)
        } else {
            url.to_owned()
        }
    }

    pub fn set_hyperlinks(&mut self, enabled: bool) {
        self.hyperlinks = enabled;
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
