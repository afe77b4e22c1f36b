//! Inbound message routing.
//!
//! Order per message: command dispatch, duplicate filter, intent
//! classification, thread lookup. Only the last two run for admitted text.

use std::sync::Arc;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use chatgate_core::config::RouterConfig;
use chatgate_core::types::{ActorId, Verdict};
use chatgate_dedup::SharedFilter;

use crate::commands::{self, Command, CommandReply};
use crate::error::RouterError;
use crate::intent::{Intent, IntentClassifier, IntentMatch, KeywordClassifier};
use crate::threads::ThreadStore;

const LOG_PREVIEW_CHARS: usize = 50;

/// What the caller should do with a message.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RouteOutcome {
    /// Nothing to act on: blank text, or a group message not addressed to the bot.
    Ignored,
    /// Dropped by the duplicate filter.
    Suppressed { verdict: Verdict },
    /// A command was executed; send `reply.text` back.
    Command { reply: CommandReply },
    /// Hand the message to the handler for `intent`.
    Dispatch {
        intent: IntentMatch,
        /// Conversation thread for handlers that keep context.
        /// `None` for document requests, which are answered with a file.
        thread_id: Option<String>,
    },
}

pub struct MessageRouter {
    config: RouterConfig,
    filter: SharedFilter,
    classifier: Arc<dyn IntentClassifier>,
    fallback: KeywordClassifier,
    threads: Arc<ThreadStore>,
    /// `@<bot_name>` as a whole word; `None` if the pattern failed to build.
    mention: Option<Regex>,
}

impl MessageRouter {
    /// Router using the keyword rules as its only classifier.
    pub fn new(config: RouterConfig, filter: SharedFilter, threads: Arc<ThreadStore>) -> Self {
        let mention = mention_pattern(&config.bot_name);
        Self {
            config,
            filter,
            classifier: Arc::new(KeywordClassifier::new()),
            fallback: KeywordClassifier::new(),
            threads,
            mention,
        }
    }

    /// Replace the primary classifier. Keyword rules remain the fallback.
    pub fn with_classifier(mut self, classifier: Arc<dyn IntentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn filter(&self) -> &SharedFilter {
        &self.filter
    }

    pub fn threads(&self) -> &ThreadStore {
        &self.threads
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn is_admin(&self, actor: &ActorId) -> bool {
        self.config.admin_ids.iter().any(|id| id == actor.as_str())
    }

    /// Route a direct message.
    pub async fn route(
        &self,
        actor: impl Into<ActorId>,
        text: &str,
    ) -> Result<RouteOutcome, RouterError> {
        let actor = actor.into();

        if let Some(command) = Command::parse(text) {
            let reply = self.execute(&actor, command)?;
            return Ok(RouteOutcome::Command { reply });
        }

        let verdict = self.filter.check(&actor, text)?;
        match verdict {
            Verdict::Empty => return Ok(RouteOutcome::Ignored),
            v if v.is_duplicate() => {
                info!(
                    actor = %actor,
                    preview = %preview(text),
                    "Suppressed duplicate message"
                );
                return Ok(RouteOutcome::Suppressed { verdict: v });
            }
            _ => {}
        }

        let intent = self.classify(text).await;
        info!(
            actor = %actor,
            intent = %intent.intent,
            confidence = intent.confidence,
            "Classified message"
        );

        let thread_id = match intent.intent {
            Intent::DocumentRequest => None,
            Intent::LocationInfo | Intent::GeneralChat => Some(
                self.threads
                    .get_or_create(&actor)
                    .map_err(|e| RouterError::ThreadStore(e.to_string()))?,
            ),
        };

        Ok(RouteOutcome::Dispatch { intent, thread_id })
    }

    /// Route a group-chat message. Only messages mentioning `@<bot_name>`
    /// as a whole word are handled; the mentions are stripped before routing.
    pub async fn route_mention(
        &self,
        actor: impl Into<ActorId>,
        text: &str,
    ) -> Result<RouteOutcome, RouterError> {
        let Some(mention) = &self.mention else {
            return Ok(RouteOutcome::Ignored);
        };
        if !mention.is_match(text) {
            return Ok(RouteOutcome::Ignored);
        }

        let stripped = mention.replace_all(text, "");
        let stripped = stripped.trim();
        if stripped.is_empty() {
            return Ok(RouteOutcome::Ignored);
        }
        self.route(actor, stripped).await
    }

    /// Run one command on behalf of `actor`.
    pub fn execute(&self, actor: &ActorId, command: Command) -> Result<CommandReply, RouterError> {
        if command.requires_admin() && !self.is_admin(actor) {
            warn!(actor = %actor, command = command.name(), "Rejected admin command");
            return Ok(CommandReply::denied(command));
        }

        let reply = match command {
            Command::Start => CommandReply::text(command, commands::start_text(&self.config.bot_name)),
            Command::Help => CommandReply::text(command, commands::HELP_TEXT),
            Command::Status => {
                let stats = self.filter.stats()?;
                let thread_id = self.threads.get(actor).map_err(thread_err)?;
                let total_threads = self.threads.len().map_err(thread_err)?;
                let mut reply = CommandReply::text(
                    command,
                    commands::status_text(
                        &self.config.bot_name,
                        thread_id.as_deref(),
                        total_threads,
                        &stats,
                    ),
                );
                reply.stats = Some(stats);
                reply
            }
            Command::Clear => {
                if self.threads.delete(actor).map_err(thread_err)? {
                    info!(actor = %actor, "Cleared conversation context");
                }
                CommandReply::text(command, "Context cleared.")
            }
            Command::ClearDuplicates => {
                self.filter.clear_actor_cache(actor)?;
                info!(actor = %actor, "Cleared duplicate cache");
                CommandReply::text(command, "Duplicate cache cleared.")
            }
            Command::ClearAll => {
                self.filter.clear_all()?;
                info!(actor = %actor, "Cleared duplicate filter for all users");
                CommandReply::text(command, "Duplicate cache cleared for all users.")
            }
        };

        debug!(actor = %actor, command = command.name(), "Executed command");
        Ok(reply)
    }

    async fn classify(&self, text: &str) -> IntentMatch {
        match self.classifier.classify(text).await {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, "Intent classifier failed, using keyword rules");
                self.fallback.classify_text(text)
            }
        }
    }
}

/// A trailing word boundary keeps `@chatgate` from matching `@chatgate_other`.
fn mention_pattern(bot_name: &str) -> Option<Regex> {
    let pattern = format!(r"(?i)@{}\b", regex::escape(bot_name));
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(bot_name, error = %e, "Invalid bot name, group mentions disabled");
            None
        }
    }
}

fn thread_err(e: chatgate_core::ChatgateError) -> RouterError {
    RouterError::ThreadStore(e.to_string())
}

fn preview(text: &str) -> String {
    text.chars().take(LOG_PREVIEW_CHARS).collect()
}
