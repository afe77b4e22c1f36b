//! Slash commands understood by the router.
//!
//! Commands never pass through the duplicate filter: a user who repeats
//! `/status` gets a fresh answer every time.

use serde::{Deserialize, Serialize};

use chatgate_core::types::FilterStats;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Start,
    Help,
    Status,
    /// Forget the sender's conversation thread.
    Clear,
    /// Forget the sender's duplicate-filter history.
    ClearDuplicates,
    /// Reset the whole duplicate filter. Administrators only.
    ClearAll,
}

impl Command {
    /// Parse a message starting with `/`.
    ///
    /// Accepts the `/cmd@botname` form used in group chats and ignores any
    /// trailing arguments. Unknown commands return `None` and are treated as
    /// ordinary text.
    pub fn parse(text: &str) -> Option<Command> {
        let rest = text.trim_start().strip_prefix('/')?;
        let word = rest.split(char::is_whitespace).next()?;
        let name = word.split('@').next().unwrap_or(word);

        match name.to_lowercase().as_str() {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "status" => Some(Command::Status),
            "clear" => Some(Command::Clear),
            "clear_duplicates" => Some(Command::ClearDuplicates),
            "clear_all" => Some(Command::ClearAll),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Status => "status",
            Command::Clear => "clear",
            Command::ClearDuplicates => "clear_duplicates",
            Command::ClearAll => "clear_all",
        }
    }

    pub fn requires_admin(&self) -> bool {
        matches!(self, Command::ClearAll)
    }
}

/// Result of executing a command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommandReply {
    pub command: Command,
    pub text: String,
    /// Filter counters, attached to `/status` replies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<FilterStats>,
    /// False when the sender was not allowed to run the command.
    pub permitted: bool,
}

impl CommandReply {
    pub(crate) fn text(command: Command, text: impl Into<String>) -> Self {
        Self {
            command,
            text: text.into(),
            stats: None,
            permitted: true,
        }
    }

    pub(crate) fn denied(command: Command) -> Self {
        Self {
            command,
            text: format!("/{} is available to administrators only.", command.name()),
            stats: None,
            permitted: false,
        }
    }
}

pub(crate) fn start_text(bot_name: &str) -> String {
    format!(
        "{bot_name} is running! Send a message to start a conversation.\n\n\
         Available:\n\
         - logistics cost questions\n\
         - technical specification template\n\
         - warehouse address and directions\n\
         - general chat"
    )
}

pub(crate) const HELP_TEXT: &str = "Commands:\n\
/start - start the bot\n\
/clear - forget the conversation context\n\
/clear_duplicates - reset your duplicate-message cache\n\
/status - show bot status\n\
/help - show this help\n\n\
Repeated or near-identical messages sent within a few minutes are ignored.";

pub(crate) fn status_text(
    bot_name: &str,
    thread_id: Option<&str>,
    total_threads: usize,
    stats: &FilterStats,
) -> String {
    format!(
        "Assistant: {bot_name}\n\
         Thread: {}\n\
         Total threads: {total_threads}\n\
         Duplicate filter: active\n\
         - processed: {}\n\
         - blocked: {}\n\
         - active users: {}\n\
         - cached messages: {}",
        thread_id.unwrap_or("none"),
        stats.total_processed,
        stats.total_blocked,
        stats.active_actors,
        stats.cached_messages,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(Command::parse("/status"), Some(Command::Status));
        assert_eq!(Command::parse("/clear"), Some(Command::Clear));
        assert_eq!(Command::parse("/clear_duplicates"), Some(Command::ClearDuplicates));
        assert_eq!(Command::parse("/clear_all"), Some(Command::ClearAll));
    }

    #[test]
    fn test_parse_bot_suffix_case_and_arguments() {
        assert_eq!(Command::parse("/status@chatgate"), Some(Command::Status));
        assert_eq!(Command::parse("  /HELP please"), Some(Command::Help));
    }

    #[test]
    fn test_parse_rejects_non_commands() {
        assert_eq!(Command::parse("status"), None);
        assert_eq!(Command::parse("/"), None);
        assert_eq!(Command::parse("/unknown"), None);
        assert_eq!(Command::parse("/ start"), None);
    }

    #[test]
    fn test_admin_only() {
        assert!(Command::ClearAll.requires_admin());
        assert!(!Command::ClearDuplicates.requires_admin());
    }

    #[test]
    fn test_denied_reply() {
        let reply = CommandReply::denied(Command::ClearAll);
        assert!(!reply.permitted);
        assert!(reply.text.contains("/clear_all"));
    }

    #[test]
    fn test_status_text_includes_counters() {
        let stats = FilterStats {
            total_processed: 5,
            total_blocked: 3,
            active_actors: 1,
            cached_messages: 2,
        };
        let text = status_text("chatgate", None, 0, &stats);
        assert!(text.contains("Thread: none"));
        assert!(text.contains("processed: 5"));
        assert!(text.contains("blocked: 3"));
    }
}
