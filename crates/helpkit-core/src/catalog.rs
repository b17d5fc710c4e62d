//! Static help data bundled for a deployment: KB, chip tables, fallback
//! rules and canned messages. Loaded once, validated, then shared
//! read-only by every session.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{HelpError, HelpResult};
use crate::fallback::{FallbackRules, FallbackSpec};
use crate::format::FormatOptions;
use crate::kb::{KbEntry, KnowledgeBase, TopicId};
use crate::suggest::{AliasTable, SuggestionTable};

const BUILTIN_CATALOG: &str = include_str!("../data/campus_circle.toml");

const DEFAULT_GREETING: &str = "Hi! How can I help?";
const DEFAULT_UNRESOLVED: &str = "Sorry, I didn't understand that.";

/// On-disk TOML shape.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default = "default_greeting")]
    greeting: String,
    #[serde(default = "default_unresolved")]
    unresolved: String,
    #[serde(default)]
    home: Vec<String>,
    #[serde(default, rename = "entry")]
    entries: Vec<KbEntry>,
    #[serde(default)]
    suggestions: HashMap<TopicId, Vec<String>>,
    #[serde(default)]
    aliases: HashMap<String, TopicId>,
    #[serde(default, rename = "fallback")]
    fallback: Vec<FallbackSpec>,
}

fn default_greeting() -> String {
    DEFAULT_GREETING.into()
}

fn default_unresolved() -> String {
    DEFAULT_UNRESOLVED.into()
}

#[derive(Debug, Clone)]
pub struct Catalog {
    pub kb: KnowledgeBase,
    pub suggestions: SuggestionTable,
    pub aliases: AliasTable,
    pub fallback: FallbackRules,
    pub greeting: String,
    pub unresolved: String,
    pub format: FormatOptions,
}

impl Catalog {
    /// Catalog shipped with the crate.
    pub fn builtin() -> HelpResult<Self> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    pub fn from_toml_str(source: &str) -> HelpResult<Self> {
        let file: CatalogFile = toml::from_str(source)?;
        let kb = KnowledgeBase::new(file.entries)?;
        let fallback = FallbackRules::new(&file.fallback, &kb)?;

        let catalog = Self::from_parts(
            kb,
            SuggestionTable::new(file.home, file.suggestions),
            AliasTable::new(file.aliases),
            fallback,
        )?
        .with_messages(file.greeting, file.unresolved);

        debug!(
            topics = catalog.kb.len(),
            rules = catalog.fallback.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Assemble a catalog from already-built tables, checking that every
    /// topic the tables point at exists in the KB.
    pub fn from_parts(
        kb: KnowledgeBase,
        suggestions: SuggestionTable,
        aliases: AliasTable,
        fallback: FallbackRules,
    ) -> HelpResult<Self> {
        for topic in suggestions.topics() {
            if !kb.contains(topic) {
                return Err(HelpError::UnknownTopic {
                    context: "suggestion table".into(),
                    topic: topic.clone(),
                });
            }
        }
        for (label, topic) in aliases.iter() {
            if !kb.contains(topic) {
                return Err(HelpError::UnknownTopic {
                    context: format!("alias {label:?}"),
                    topic: topic.clone(),
                });
            }
        }

        let catalog = Self {
            kb,
            suggestions,
            aliases,
            fallback,
            greeting: default_greeting(),
            unresolved: default_unresolved(),
            format: FormatOptions::default(),
        };
        for label in catalog.dangling_labels() {
            warn!(
                label = %label,
                "chip label does not resolve to a topic; it will be matched as text"
            );
        }
        Ok(catalog)
    }

    pub fn with_messages(mut self, greeting: String, unresolved: String) -> Self {
        self.greeting = greeting;
        self.unresolved = unresolved;
        self
    }

    pub fn with_format(mut self, format: FormatOptions) -> Self {
        self.format = format;
        self
    }

    /// Chip labels (home or per-topic) whose resolved topic is not in the KB.
    pub fn dangling_labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self
            .suggestions
            .home()
            .iter()
            .chain(self.kb.iter().flat_map(|e| {
                self.suggestions
                    .suggestions_for(Some(e.id.as_str()))
                    .iter()
            }))
            .map(String::as_str)
            .filter(|label| !self.kb.contains(&self.aliases.resolve_label(label)))
            .collect();
        labels.sort_unstable();
        labels.dedup();
        labels
    }
}
