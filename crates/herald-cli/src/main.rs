mod bootstrap_helpers;
mod cli_args;
mod herald_config;
mod stdout_responder;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use herald_commands::{CommandDispatcher, CommandTable, FileIssueDocument, IssueEvent};
use herald_external_service::{ExternalServiceInvoker, ReqwestTransport, ReqwestTransportConfig};
use tracing::info;

use crate::bootstrap_helpers::init_tracing;
use crate::cli_args::{Cli, HeraldCommand};
use crate::herald_config::{load_herald_config, validate_herald_config, HeraldConfig};
use crate::stdout_responder::StdoutResponder;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = load_herald_config(&cli.config)?;
    if let Some(bot_name) = cli.bot_name.as_deref() {
        config.bot_name = bot_name.to_string();
        validate_herald_config(&config)?;
    }
    let table = CommandTable::new(&config.bot_name, &config.services)
        .context("failed to build command table")?;

    match cli.command {
        HeraldCommand::Commands => {
            println!("{}", table.render_help());
            Ok(())
        }
        HeraldCommand::Dispatch {
            comment,
            event,
            issue_body,
            sender,
            issue_id,
            repo,
        } => {
            let config_dir = cli.config.parent().unwrap_or_else(|| Path::new("."));
            let invoker = build_invoker(&config, config_dir, &repo)?;
            let dispatcher = CommandDispatcher::new(
                table,
                invoker,
                Arc::new(FileIssueDocument::new(issue_body)),
                Arc::new(StdoutResponder),
            );
            let event = IssueEvent {
                category: event,
                text: comment,
                sender,
                issue_id,
                repo,
            };
            let report = dispatcher.dispatch(&event).await?;
            info!(
                handled = report.handled.len(),
                ignored = report.is_ignored(),
                "dispatch complete"
            );
            Ok(())
        }
    }
}

fn build_invoker(
    config: &HeraldConfig,
    config_dir: &Path,
    repo: &str,
) -> Result<ExternalServiceInvoker> {
    let transport = ReqwestTransport::new(ReqwestTransportConfig {
        request_timeout_ms: config.http.request_timeout_ms,
        ..ReqwestTransportConfig::default()
    })
    .context("failed to create external service transport")?;
    let template_source = config.templates.build_source(
        config_dir,
        repo,
        config.http.request_timeout_ms,
    )?;
    Ok(ExternalServiceInvoker::new(Arc::new(transport))
        .with_template_source(template_source)
        .with_success_policy(config.http.success_status))
}
