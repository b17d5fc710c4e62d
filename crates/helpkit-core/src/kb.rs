use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{HelpError, HelpResult};

pub type TopicId = String;

// ---------------------------------------------------------------------------
// KbEntry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KbEntry {
    pub id: TopicId,
    /// Trigger phrases, lowercase, one or more whitespace-separated words.
    pub keys: Vec<String>,
    pub answer: String,
}

impl KbEntry {
    pub fn new(id: impl Into<String>, keys: &[&str], answer: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            keys: keys.iter().map(|k| k.to_string()).collect(),
            answer: answer.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// KnowledgeBase
// ---------------------------------------------------------------------------

/// Ordered, validated list of topic entries. Order matters: the matcher
/// breaks ties in favor of the earlier entry.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entries: Vec<KbEntry>,
    index: HashMap<TopicId, usize>,
}

impl KnowledgeBase {
    /// Validate and index entries. Keys are lowercased and trimmed here so
    /// the matcher can compare them against normalized text directly.
    pub fn new(entries: Vec<KbEntry>) -> HelpResult<Self> {
        let mut index = HashMap::with_capacity(entries.len());
        let mut cleaned = Vec::with_capacity(entries.len());

        for (pos, mut entry) in entries.into_iter().enumerate() {
            entry.id = entry.id.trim().to_string();
            if entry.id.is_empty() {
                return Err(HelpError::EmptyTopicId(pos));
            }
            if entry.keys.is_empty() {
                return Err(HelpError::EmptyKeys(entry.id));
            }
            for key in entry.keys.iter_mut() {
                *key = key.trim().to_lowercase();
                if key.is_empty() {
                    return Err(HelpError::BlankKey(entry.id));
                }
            }
            if index.insert(entry.id.clone(), pos).is_some() {
                return Err(HelpError::DuplicateTopic(entry.id));
            }
            cleaned.push(entry);
        }

        Ok(Self {
            entries: cleaned,
            index,
        })
    }

    pub fn get(&self, id: &str) -> Option<&KbEntry> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &KbEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
