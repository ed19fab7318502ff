//! Static dispatch table of comment commands.
//!
//! Every command is a tagged variant paired with a compiled pattern. Handlers
//! are pure: they turn a match into a [`CommandEffect`], and the dispatcher
//! applies effects against the collaborators.

use herald_external_service::ServiceDescriptor;

use crate::command_pattern::{
    CommandPattern, CommandPatternError, MatchResult, EVENT_ISSUE_COMMENT_CREATED,
};
use crate::issue_body_markers::{value_end_marker, value_start_marker};

const ASSIGN_REVIEWER_GRAMMAR: &str = r"assign (.*) as reviewer (\S+)";
const HELP_GRAMMAR: &str = "help";

#[derive(Debug, Clone, PartialEq)]
/// Enumerates the supported comment commands.
pub enum CommandKind {
    AssignReviewerN,
    ExternalService(ServiceDescriptor),
    Help,
}

impl CommandKind {
    pub fn name(&self) -> &str {
        match self {
            Self::AssignReviewerN => "assign_reviewer_n",
            Self::ExternalService(descriptor) => descriptor.name.as_str(),
            Self::Help => "help",
        }
    }

    pub fn description(&self) -> String {
        match self {
            Self::AssignReviewerN => {
                "Assign a user as the reviewer N of this submission (where N=1,2...)".to_string()
            }
            Self::ExternalService(descriptor) => {
                format!("Call the {} service", descriptor.name)
            }
            Self::Help => "List all available commands".to_string(),
        }
    }

    pub fn example_invocation(&self, bot_name: &str) -> String {
        match self {
            Self::AssignReviewerN => format!("@{bot_name} assign @username as reviewer 2"),
            Self::ExternalService(descriptor) => {
                format!("@{bot_name} {}", descriptor.command.trim())
            }
            Self::Help => format!("@{bot_name} help"),
        }
    }

    fn grammar(&self) -> String {
        match self {
            Self::AssignReviewerN => ASSIGN_REVIEWER_GRAMMAR.to_string(),
            Self::ExternalService(descriptor) => {
                format!(r"{}\.?", regex::escape(descriptor.command.trim()))
            }
            Self::Help => HELP_GRAMMAR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// What a matched command asks the dispatcher to do.
pub enum CommandEffect {
    UpdateBody {
        start_marker: String,
        end_marker: String,
        content: String,
        reply: String,
    },
    InvokeService(ServiceDescriptor),
    Reply(String),
}

#[derive(Debug, Clone)]
pub struct CommandEntry {
    kind: CommandKind,
    pattern: CommandPattern,
}

impl CommandEntry {
    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    pub fn pattern(&self) -> &CommandPattern {
        &self.pattern
    }
}

#[derive(Debug, Clone)]
/// Flat list of command entries. Every entry is tried for every event.
pub struct CommandTable {
    bot_name: String,
    entries: Vec<CommandEntry>,
}

impl CommandTable {
    /// Built-in commands plus one external-service command per descriptor.
    pub fn new(
        bot_name: &str,
        services: &[ServiceDescriptor],
    ) -> Result<Self, CommandPatternError> {
        let mut table = Self {
            bot_name: bot_name.trim().trim_start_matches('@').to_string(),
            entries: Vec::new(),
        };
        table.register(CommandKind::Help)?;
        table.register(CommandKind::AssignReviewerN)?;
        for descriptor in services {
            table.register(CommandKind::ExternalService(descriptor.clone()))?;
        }
        Ok(table)
    }

    pub fn register(&mut self, kind: CommandKind) -> Result<(), CommandPatternError> {
        let pattern =
            CommandPattern::new(EVENT_ISSUE_COMMENT_CREATED, &self.bot_name, &kind.grammar())?;
        self.entries.push(CommandEntry { kind, pattern });
        Ok(())
    }

    pub fn bot_name(&self) -> &str {
        &self.bot_name
    }

    pub fn entries(&self) -> &[CommandEntry] {
        &self.entries
    }

    /// Every entry whose pattern matches the event, in registration order.
    pub fn matching(&self, event_category: &str, text: &str) -> Vec<(&CommandEntry, MatchResult)> {
        self.entries
            .iter()
            .filter_map(|entry| {
                entry
                    .pattern
                    .match_event(event_category, text)
                    .map(|matched| (entry, matched))
            })
            .collect()
    }

    pub fn plan(&self, kind: &CommandKind, matched: &MatchResult) -> CommandEffect {
        match kind {
            CommandKind::AssignReviewerN => plan_assign_reviewer(matched),
            CommandKind::ExternalService(descriptor) => {
                CommandEffect::InvokeService(descriptor.clone())
            }
            CommandKind::Help => CommandEffect::Reply(self.render_help()),
        }
    }

    pub fn render_help(&self) -> String {
        let mut lines = vec![format!(
            "Hello @{}, here are the things you can ask me to do:",
            self.bot_name
        )];
        lines.push(String::new());
        for entry in &self.entries {
            lines.push(format!(
                "- `{}`: {}",
                entry.kind.example_invocation(&self.bot_name),
                entry.kind.description()
            ));
        }
        lines.join("\n")
    }
}

fn plan_assign_reviewer(matched: &MatchResult) -> CommandEffect {
    let reviewer = matched.get(1).unwrap_or_default().trim();
    let slot = matched.get(2).unwrap_or_default();
    let marker_name = format!("reviewer-{slot}");
    CommandEffect::UpdateBody {
        start_marker: value_start_marker(&marker_name),
        end_marker: value_end_marker(&marker_name),
        content: reviewer.to_string(),
        reply: format!("Reviewer {slot} assigned!"),
    }
}
