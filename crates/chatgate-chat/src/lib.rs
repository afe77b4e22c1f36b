//! Message routing for the support chat.
//!
//! Slash commands are executed directly and never reach the duplicate
//! filter. Every other message passes the filter first; survivors are
//! classified into an [`Intent`] and handed to the matching handler along
//! with the sender's conversation thread.

pub mod commands;
pub mod error;
pub mod intent;
pub mod router;
pub mod threads;

pub use commands::{Command, CommandReply};
pub use error::RouterError;
pub use intent::{Intent, IntentClassifier, IntentMatch, KeywordClassifier};
pub use router::{MessageRouter, RouteOutcome};
pub use threads::ThreadStore;
