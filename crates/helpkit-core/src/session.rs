//! One widget conversation.
//!
//! A turn runs synchronously: match, fall back, format, pick chips. The only
//! state carried between turns is the last resolved topic, which selects
//! the next chip set.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::Catalog;
use crate::format::format_reply_with;
use crate::kb::{KbEntry, TopicId};
use crate::matcher::match_query;
use crate::tokenize::normalize;

/// How a turn found (or failed to find) its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// Keyword ranker hit.
    Matched { score: u32 },
    /// A fallback rule fired after the ranker missed.
    Fallback { rule: String },
    /// A chip label mapped straight to a topic.
    Alias,
    Unresolved,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Matched { score } => write!(f, "matched (score {score})"),
            Self::Fallback { rule } => write!(f, "fallback ({rule})"),
            Self::Alias => write!(f, "alias"),
            Self::Unresolved => write!(f, "unresolved"),
        }
    }
}

/// What the widget renders after a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnResult {
    /// Escaped, link-wrapped HTML.
    pub reply: String,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<TopicId>,
    pub resolution: Resolution,
}

impl TurnResult {
    pub fn is_resolved(&self) -> bool {
        self.resolution != Resolution::Unresolved
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationState {
    pub last_topic: Option<TopicId>,
}

pub struct Session {
    catalog: Arc<Catalog>,
    state: ConversationState,
}

impl Session {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            state: ConversationState::default(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn last_topic(&self) -> Option<&str> {
        self.state.last_topic.as_deref()
    }

    pub fn reset(&mut self) {
        self.state = ConversationState::default();
    }

    /// Welcome message with the home chips. Does not count as a turn.
    pub fn greeting(&self) -> TurnResult {
        TurnResult {
            reply: format_reply_with(&self.catalog.greeting, self.catalog.format),
            suggestions: self.catalog.suggestions.home().to_vec(),
            topic: None,
            resolution: Resolution::Unresolved,
        }
    }

    /// Free-text turn. Returns `None` for blank input: no turn happens and
    /// the caller should leave the UI untouched.
    pub fn handle_user_message(&mut self, raw: &str) -> Option<TurnResult> {
        let text = normalize(raw);
        if text.is_empty() {
            return None;
        }

        let catalog = Arc::clone(&self.catalog);
        let hit = match_query(&text, &catalog.kb);
        let turn = if let Some(entry) = hit.entry {
            self.resolve(entry, Resolution::Matched { score: hit.score })
        } else if let Some((rule, entry)) = catalog.fallback.resolve(&text, &catalog.kb) {
            self.resolve(
                entry,
                Resolution::Fallback {
                    rule: rule.name.clone(),
                },
            )
        } else {
            self.unresolved()
        };

        debug!(resolution = %turn.resolution, topic = ?turn.topic, "user message turn");
        Some(turn)
    }

    /// Chip turn. A label whose resolved topic is not in the KB is handled
    /// as if the user had typed it.
    pub fn handle_chip_click(&mut self, label: &str) -> Option<TurnResult> {
        if label.trim().is_empty() {
            return None;
        }

        let catalog = Arc::clone(&self.catalog);
        let topic = catalog.aliases.resolve_label(label);
        match catalog.kb.get(&topic) {
            Some(entry) => {
                let turn = self.resolve(entry, Resolution::Alias);
                debug!(label, topic = %entry.id, "chip turn");
                Some(turn)
            }
            None => {
                debug!(label, "chip label has no topic, matching as text");
                self.handle_user_message(label)
            }
        }
    }

    fn resolve(&mut self, entry: &KbEntry, resolution: Resolution) -> TurnResult {
        self.state.last_topic = Some(entry.id.clone());
        TurnResult {
            reply: format_reply_with(&entry.answer, self.catalog.format),
            suggestions: self
                .catalog
                .suggestions
                .suggestions_for(Some(entry.id.as_str()))
                .to_vec(),
            topic: Some(entry.id.clone()),
            resolution,
        }
    }

    fn unresolved(&mut self) -> TurnResult {
        self.state.last_topic = None;
        TurnResult {
            reply: format_reply_with(&self.catalog.unresolved, self.catalog.format),
            suggestions: self.catalog.suggestions.suggestions_for(None).to_vec(),
            topic: None,
            resolution: Resolution::Unresolved,
        }
    }
}
