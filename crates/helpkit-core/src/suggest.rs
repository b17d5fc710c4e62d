//! Quick-reply chips: topic -> labels, and label -> topic.

use std::collections::HashMap;

use crate::kb::TopicId;

/// Follow-up labels per topic plus the home set used when no topic applies.
#[derive(Debug, Clone, Default)]
pub struct SuggestionTable {
    home: Vec<String>,
    by_topic: HashMap<TopicId, Vec<String>>,
}

impl SuggestionTable {
    pub fn new(home: Vec<String>, by_topic: HashMap<TopicId, Vec<String>>) -> Self {
        Self { home, by_topic }
    }

    /// Labels for `topic`, or the home set when `topic` is `None` or has no row.
    pub fn suggestions_for(&self, topic: Option<&str>) -> &[String] {
        topic
            .and_then(|t| self.by_topic.get(t))
            .map(Vec::as_slice)
            .unwrap_or(self.home.as_slice())
    }

    pub fn home(&self) -> &[String] {
        &self.home
    }

    pub(crate) fn topics(&self) -> impl Iterator<Item = &TopicId> {
        self.by_topic.keys()
    }
}

/// Display label -> topic id.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    aliases: HashMap<String, TopicId>,
}

impl AliasTable {
    pub fn new(aliases: HashMap<String, TopicId>) -> Self {
        Self { aliases }
    }

    /// Exact alias lookup, else the lowercased label itself.
    pub fn resolve_label(&self, label: &str) -> TopicId {
        match self.aliases.get(label) {
            Some(topic) => topic.clone(),
            None => label.to_lowercase(),
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&String, &TopicId)> {
        self.aliases.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn table() -> SuggestionTable {
        let mut by_topic = HashMap::new();
        by_topic.insert(
            "register".to_string(),
            labels(&["Login", "Forgot password", "Profile", "Alumni"]),
        );
        SuggestionTable::new(labels(&["Register", "Login", "Upcoming events"]), by_topic)
    }

    #[test]
    fn test_suggestions_for_known_topic() {
        assert_eq!(
            table().suggestions_for(Some("register")),
            ["Login", "Forgot password", "Profile", "Alumni"]
        );
    }

    #[test]
    fn test_suggestions_default_to_home() {
        let table = table();
        assert_eq!(table.suggestions_for(None), table.home());
        assert_eq!(table.suggestions_for(Some("unlisted")), table.home());
    }

    #[test]
    fn test_resolve_label_alias() {
        let mut map = HashMap::new();
        map.insert("Change email".to_string(), "email".to_string());
        let aliases = AliasTable::new(map);
        assert_eq!(aliases.resolve_label("Change email"), "email");
    }

    #[test]
    fn test_resolve_label_lowercase_fallback() {
        let aliases = AliasTable::default();
        assert_eq!(aliases.resolve_label("Alumni"), "alumni");
        // exact text only, no case folding on the alias key
        let mut map = HashMap::new();
        map.insert("Change email".to_string(), "email".to_string());
        assert_eq!(AliasTable::new(map).resolve_label("change email"), "change email");
    }
}
