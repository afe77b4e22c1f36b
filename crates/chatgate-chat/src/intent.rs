//! Intent classification for admitted messages.
//!
//! The production deployment plugs a model-backed classifier in through
//! [`IntentClassifier`]; [`KeywordClassifier`] is the built-in rule set and
//! also serves as the fallback whenever that classifier fails.

use std::fmt;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RouterError;

/// What the sender is asking for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Wants a document or form (technical specification, spreadsheet, blank).
    DocumentRequest,
    /// Wants directions or an address for a warehouse.
    LocationInfo,
    /// Anything else.
    GeneralChat,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Intent::DocumentRequest => "document_request",
            Intent::LocationInfo => "location_info",
            Intent::GeneralChat => "general_chat",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntentMatch {
    pub intent: Intent,
    /// In `[0.0, 1.0]`.
    pub confidence: f32,
    pub reasoning: String,
}

#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<IntentMatch, RouterError>;
}

// =============================================================================
// Keyword rules
// =============================================================================

struct KeywordPatterns {
    document: Vec<Regex>,
    location: Vec<Regex>,
}

static KEYWORD_PATTERNS: LazyLock<KeywordPatterns> = LazyLock::new(|| {
    let mk = |pats: &[&str]| -> Vec<Regex> {
        pats.iter()
            .map(|p| Regex::new(p).expect("Invalid keyword regex"))
            .collect()
    };

    KeywordPatterns {
        // Checked first: "где взять бланк" is a document request.
        document: mk(&[
            r"(?i)\bфайл\s+тз\b",
            r"(?i)\bтехническое\s+задание\b",
            r"(?i)\bэксель\s+файл\b",
            r"(?i)\bбланк\b",
            r"(?i)\bформа\b",
        ]),
        location: mk(&[
            r"(?i)\bсклад\w*",
            r"(?i)\bадрес\w*",
            r"(?i)\bгде\b",
            r"(?i)\bкак\s+добраться\b",
            r"(?i)\bсхема\b",
            r"(?i)\bпроезд\w*",
        ]),
    }
});

const KEYWORD_CONFIDENCE: f32 = 0.8;
const DEFAULT_CONFIDENCE: f32 = 0.9;

/// Rule-based classifier over Russian support-chat keywords.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous form of [`IntentClassifier::classify`]; never fails.
    pub fn classify_text(&self, text: &str) -> IntentMatch {
        let patterns = &*KEYWORD_PATTERNS;

        if let Some(re) = patterns.document.iter().find(|re| re.is_match(text)) {
            return IntentMatch {
                intent: Intent::DocumentRequest,
                confidence: KEYWORD_CONFIDENCE,
                reasoning: format!("matched document keyword /{}/", re.as_str()),
            };
        }

        if let Some(re) = patterns.location.iter().find(|re| re.is_match(text)) {
            return IntentMatch {
                intent: Intent::LocationInfo,
                confidence: KEYWORD_CONFIDENCE,
                reasoning: format!("matched location keyword /{}/", re.as_str()),
            };
        }

        IntentMatch {
            intent: Intent::GeneralChat,
            confidence: DEFAULT_CONFIDENCE,
            reasoning: "no keyword matched".to_string(),
        }
    }
}

#[async_trait]
impl IntentClassifier for KeywordClassifier {
    async fn classify(&self, text: &str) -> Result<IntentMatch, RouterError> {
        Ok(self.classify_text(text))
    }
}
