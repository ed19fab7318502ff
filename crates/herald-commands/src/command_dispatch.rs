use std::sync::Arc;

use anyhow::{Context, Result};
use herald_external_service::{ExternalServiceInvoker, InvocationContext, ServiceDescriptor};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::command_collaborators::{IssueDocument, Responder};
use crate::command_table::{CommandEffect, CommandTable};
use crate::issue_body_markers::read_issue_value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Inbound event as supplied by the ingestion layer.
pub struct IssueEvent {
    pub category: String,
    pub text: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub issue_id: u64,
    #[serde(default)]
    pub repo: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandledCommand {
    pub command: String,
    pub reply: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub handled: Vec<HandledCommand>,
}

impl DispatchReport {
    pub fn is_ignored(&self) -> bool {
        self.handled.is_empty()
    }

    pub fn replies(&self) -> Vec<&str> {
        self.handled
            .iter()
            .filter_map(|handled| handled.reply.as_deref())
            .collect()
    }
}

/// Routes events through the command table and applies the planned effects.
pub struct CommandDispatcher {
    table: CommandTable,
    invoker: ExternalServiceInvoker,
    document: Arc<dyn IssueDocument>,
    responder: Arc<dyn Responder>,
}

impl CommandDispatcher {
    pub fn new(
        table: CommandTable,
        invoker: ExternalServiceInvoker,
        document: Arc<dyn IssueDocument>,
        responder: Arc<dyn Responder>,
    ) -> Self {
        Self {
            table,
            invoker,
            document,
            responder,
        }
    }

    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    pub async fn dispatch(&self, event: &IssueEvent) -> Result<DispatchReport> {
        let matches = self.table.matching(&event.category, &event.text);
        if matches.is_empty() {
            debug!(category = %event.category, "no command matched; event ignored");
            return Ok(DispatchReport::default());
        }

        let mut report = DispatchReport::default();
        for (entry, matched) in matches {
            let command = entry.kind().name().to_string();
            let effect = self.table.plan(entry.kind(), &matched);
            let reply = self
                .apply(event, effect)
                .await
                .with_context(|| format!("command '{command}' failed"))?;
            if let Some(message) = reply.as_deref() {
                self.responder.respond(message).await?;
            }
            info!(
                command = %command,
                issue_id = event.issue_id,
                replied = reply.is_some(),
                "command handled"
            );
            report.handled.push(HandledCommand { command, reply });
        }
        Ok(report)
    }

    async fn apply(&self, event: &IssueEvent, effect: CommandEffect) -> Result<Option<String>> {
        match effect {
            CommandEffect::UpdateBody {
                start_marker,
                end_marker,
                content,
                reply,
            } => {
                let updated = self
                    .document
                    .update_body(&start_marker, &end_marker, &content)
                    .await?;
                if !updated {
                    debug!(start_marker = %start_marker, "issue body not updated; markers missing");
                }
                Ok(Some(reply))
            }
            CommandEffect::InvokeService(descriptor) => {
                let context = self.invocation_context(event, &descriptor).await?;
                let reply = self.invoker.invoke(&descriptor, &context).await?;
                Ok(reply.into_message())
            }
            CommandEffect::Reply(message) => Ok(Some(message)),
        }
    }

    async fn invocation_context(
        &self,
        event: &IssueEvent,
        descriptor: &ServiceDescriptor,
    ) -> Result<InvocationContext> {
        let body = if descriptor.data_from_issue.is_empty() || descriptor.target_url().is_none() {
            None
        } else {
            Some(self.document.read_body().await?)
        };
        Ok(build_invocation_context(
            event,
            self.table.bot_name(),
            descriptor,
            body.as_deref(),
        ))
    }
}

/// Event metadata plus the `data_from_issue` values read from the issue body.
pub fn build_invocation_context(
    event: &IssueEvent,
    bot_name: &str,
    descriptor: &ServiceDescriptor,
    issue_body: Option<&str>,
) -> InvocationContext {
    let mut context = InvocationContext::new()
        .with("bot_name", bot_name)
        .with("issue_id", event.issue_id)
        .with("repo", event.repo.as_str())
        .with("sender", event.sender.as_str());
    if let Some(body) = issue_body {
        for key in &descriptor.data_from_issue {
            context.insert(key.as_str(), read_issue_value(body, key).unwrap_or_default());
        }
    }
    context
}
