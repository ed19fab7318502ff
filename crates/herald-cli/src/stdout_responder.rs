use std::io::Write;

use anyhow::{Context, Result};
use async_trait::async_trait;
use herald_commands::Responder;

/// Prints each reply to stdout, separated by a blank line.
#[derive(Debug, Default)]
pub(crate) struct StdoutResponder;

#[async_trait]
impl Responder for StdoutResponder {
    async fn respond(&self, message: &str) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{message}\n").context("failed to write reply to stdout")?;
        stdout.flush().context("failed to flush stdout")
    }
}
