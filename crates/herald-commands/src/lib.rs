//! Comment command matching and dispatch for Herald.
//!
//! Matches issue-comment events against `@<bot> <command>` patterns, plans the
//! effect of each matched command, and applies it through the issue-document
//! and respond collaborators or the external-service invoker.

pub mod command_collaborators;
pub mod command_dispatch;
pub mod command_pattern;
pub mod command_table;
pub mod issue_body_markers;

pub use command_collaborators::{
    FileIssueDocument, InMemoryIssueDocument, IssueDocument, RecordingResponder, Responder,
};
pub use command_dispatch::{
    build_invocation_context, CommandDispatcher, DispatchReport, HandledCommand, IssueEvent,
};
pub use command_pattern::{
    CommandPattern, CommandPatternError, MatchResult, EVENT_ISSUE_COMMENT_CREATED,
};
pub use command_table::{CommandEffect, CommandEntry, CommandKind, CommandTable};
