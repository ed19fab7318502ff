use std::path::PathBuf;

use clap::{Parser, Subcommand};
use herald_commands::EVENT_ISSUE_COMMENT_CREATED;

fn parse_issue_id(value: &str) -> Result<u64, String> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err("issue id must be greater than 0".to_string()),
        Ok(issue_id) => Ok(issue_id),
        Err(error) => Err(format!("issue id '{value}' is not a number: {error}")),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "herald",
    about = "Comment-driven issue automation: match bot commands and relay external services",
    version
)]
pub struct Cli {
    #[arg(
        long,
        env = "HERALD_CONFIG",
        default_value = "herald.toml",
        help = "Path to the TOML config with bot settings and [[services]] descriptors."
    )]
    pub config: PathBuf,

    #[arg(
        long = "bot-name",
        env = "HERALD_BOT_NAME",
        help = "Override the bot name from the config file."
    )]
    pub bot_name: Option<String>,

    #[command(subcommand)]
    pub command: HeraldCommand,
}

#[derive(Debug, Subcommand)]
pub enum HeraldCommand {
    /// Dispatch one comment event and print the replies
    Dispatch {
        /// Comment text, e.g. "@botsci run specs"
        #[arg(long)]
        comment: String,

        /// Event category supplied by the ingestion layer
        #[arg(long, default_value = EVENT_ISSUE_COMMENT_CREATED)]
        event: String,

        /// Path to a file holding the issue body
        #[arg(long = "issue-body")]
        issue_body: PathBuf,

        #[arg(long, default_value = "")]
        sender: String,

        #[arg(long = "issue-id", value_parser = parse_issue_id)]
        issue_id: u64,

        /// Repository identifier, e.g. "openjournals/tests"
        #[arg(long, default_value = "")]
        repo: String,
    },

    /// List the registered commands
    Commands,
}
