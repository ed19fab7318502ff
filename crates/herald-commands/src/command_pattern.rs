use regex::{Regex, RegexBuilder};
use thiserror::Error;

pub const EVENT_ISSUE_COMMENT_CREATED: &str = "issue_comment.created";

#[derive(Debug, Error)]
pub enum CommandPatternError {
    #[error("bot name must not be empty")]
    EmptyBotName,
    #[error("invalid command grammar '{grammar}': {source}")]
    InvalidGrammar {
        grammar: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone)]
/// Compiled `@<bot> <grammar>` pattern bound to one event category.
///
/// The pattern is case-insensitive and must consume the whole text; only
/// surrounding whitespace is tolerated.
pub struct CommandPattern {
    event_category: String,
    regex: Regex,
}

impl CommandPattern {
    /// `grammar` is a regex fragment matched after the bot mention.
    pub fn new(
        event_category: &str,
        bot_name: &str,
        grammar: &str,
    ) -> Result<Self, CommandPatternError> {
        let bot_name = bot_name.trim().trim_start_matches('@');
        if bot_name.is_empty() {
            return Err(CommandPatternError::EmptyBotName);
        }
        let source = format!(
            r"\A\s*@{}\s+(?:{})\s*\z",
            regex::escape(bot_name),
            grammar
        );
        let regex = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .map_err(|source| CommandPatternError::InvalidGrammar {
                grammar: grammar.to_string(),
                source,
            })?;
        Ok(Self {
            event_category: event_category.to_string(),
            regex,
        })
    }

    pub fn event_category(&self) -> &str {
        &self.event_category
    }

    pub fn match_event(&self, event_category: &str, text: &str) -> Option<MatchResult> {
        if event_category != self.event_category {
            return None;
        }
        let captures = self.regex.captures(text)?;
        let groups = captures
            .iter()
            .skip(1)
            .map(|group| group.map(|group| group.as_str().to_string()).unwrap_or_default())
            .collect();
        Some(MatchResult { groups })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Positional captures of one successful match, 1-based like regex groups.
pub struct MatchResult {
    groups: Vec<String>,
}

impl MatchResult {
    pub fn new(groups: Vec<String>) -> Self {
        Self { groups }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|position| self.groups.get(position))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
