//! Console
//!
//! Line-based input of prompts and labeled output lines. Works over any
//! async reader and sync writer so sessions can be replayed in tests.

use std::io::{ErrorKind, IsTerminal, Write};

use agent_core::{Prompt, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

const USER_LABEL: &str = "User 👤 : ";
const EXIT_KEYWORDS: &[&str] = &["q", "quit", "exit"];

/// Destination of labeled lines
pub trait OutputSink {
    /// Write `label` immediately followed by `body` as one line
    fn write(&mut self, label: &str, body: &str) -> Result<()>;
}

pub struct Console<R, W> {
    lines: Lines<R>,
    out: W,
    /// Shown before each read; only set for interactive terminals
    prompt_label: Option<&'static str>,
}

impl Console<BufReader<Stdin>, std::io::Stdout> {
    /// Process stdin/stdout
    pub fn stdio() -> Self {
        let interactive = std::io::stdin().is_terminal();
        let console = Self::new(BufReader::new(tokio::io::stdin()), std::io::stdout());

        if interactive {
            console.with_prompt_label(USER_LABEL)
        } else {
            console
        }
    }
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(input: R, out: W) -> Self {
        Self {
            lines: input.lines(),
            out,
            prompt_label: None,
        }
    }

    pub fn with_prompt_label(mut self, label: &'static str) -> Self {
        self.prompt_label = Some(label);
        self
    }

    /// Tell the user how to leave
    pub fn greet(&mut self) -> Result<()> {
        writeln!(
            self.out,
            "Interactive session has started. To escape, input 'q' and submit."
        )?;
        self.out.flush()?;
        Ok(())
    }

    /// Next non-blank prompt, or `None` once input ends or an exit keyword
    /// is entered
    pub async fn next_prompt(&mut self) -> Result<Option<Prompt>> {
        loop {
            if let Some(label) = self.prompt_label {
                write!(self.out, "{}", label)?;
                self.out.flush()?;
            }

            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return Ok(None),
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    tracing::warn!(error = %e, "Skipping unreadable input line");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if EXIT_KEYWORDS.contains(&line.trim()) {
                return Ok(None);
            }

            if let Some(prompt) = Prompt::new(&line) {
                return Ok(Some(prompt));
            }
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }
}

impl<R, W> OutputSink for Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    fn write(&mut self, label: &str, body: &str) -> Result<()> {
        writeln!(self.out, "{}{}", label, body)?;
        self.out.flush()?;
        Ok(())
    }
}
