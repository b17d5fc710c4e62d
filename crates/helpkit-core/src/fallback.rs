//! Secondary heuristics consulted only when the ranker finds nothing.
//!
//! Rules are an ordered list of `(patterns -> topic)`. A rule fires when
//! every one of its patterns matches the normalized text; the first firing
//! rule wins.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{HelpError, HelpResult};
use crate::kb::{KbEntry, KnowledgeBase, TopicId};

/// Rule as written in a catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackSpec {
    pub name: String,
    pub topic: TopicId,
    /// Regexes that must all match.
    pub all: Vec<String>,
}

/// Compiled rule.
#[derive(Debug, Clone)]
pub struct FallbackRule {
    pub name: String,
    pub topic: TopicId,
    patterns: Vec<Regex>,
}

impl FallbackRule {
    pub fn compile(spec: &FallbackSpec) -> HelpResult<Self> {
        let patterns = spec
            .all
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|source| HelpError::InvalidPattern {
                    rule: spec.name.clone(),
                    source,
                })
            })
            .collect::<HelpResult<Vec<_>>>()?;

        Ok(Self {
            name: spec.name.clone(),
            topic: spec.topic.clone(),
            patterns,
        })
    }

    /// A rule without patterns never fires.
    pub fn is_match(&self, text: &str) -> bool {
        !self.patterns.is_empty() && self.patterns.iter().all(|re| re.is_match(text))
    }
}

#[derive(Debug, Clone, Default)]
pub struct FallbackRules {
    rules: Vec<FallbackRule>,
}

impl FallbackRules {
    /// Compile rules and check each target topic exists in `kb`.
    pub fn new(specs: &[FallbackSpec], kb: &KnowledgeBase) -> HelpResult<Self> {
        let mut rules = Vec::with_capacity(specs.len());
        for spec in specs {
            if !kb.contains(&spec.topic) {
                return Err(HelpError::UnknownTopic {
                    context: format!("fallback rule {}", spec.name),
                    topic: spec.topic.clone(),
                });
            }
            rules.push(FallbackRule::compile(spec)?);
        }
        Ok(Self { rules })
    }

    /// First rule matching `normalized` together with the entry it maps to.
    pub fn resolve<'a>(
        &self,
        normalized: &str,
        kb: &'a KnowledgeBase,
    ) -> Option<(&FallbackRule, &'a KbEntry)> {
        self.rules
            .iter()
            .filter(|rule| rule.is_match(normalized))
            .find_map(|rule| kb.get(&rule.topic).map(|entry| (rule, entry)))
    }

    pub fn rules(&self) -> &[FallbackRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, topic: &str, all: &[&str]) -> FallbackSpec {
        FallbackSpec {
            name: name.into(),
            topic: topic.into(),
            all: all.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn kb() -> KnowledgeBase {
        KnowledgeBase::new(vec![
            KbEntry::new("forgot", &["forgot password"], "Reset it at /login."),
            KbEntry::new("register", &["register"], "Use /register."),
        ])
        .unwrap()
    }

    fn rules(kb: &KnowledgeBase) -> FallbackRules {
        FallbackRules::new(
            &[
                spec("forgot-variants", "forgot", &[r"\bforg(?:o|e)t(?:ten|ting)?\b"]),
                spec("reset-pass", "forgot", &[r"\breset", r"pass"]),
                spec("sign-up", "register", &[r"\bsign(?:ed|ing)?[\s-]*up\b"]),
            ],
            kb,
        )
        .unwrap()
    }

    #[test]
    fn test_morphological_variants() {
        let kb = kb();
        let rules = rules(&kb);
        for text in ["i forgot it", "i forget things", "forgotten my code", "keep forgetting"] {
            let (rule, entry) = rules.resolve(text, &kb).unwrap();
            assert_eq!(rule.name, "forgot-variants", "{text}");
            assert_eq!(entry.id, "forgot");
        }
    }

    #[test]
    fn test_all_patterns_required() {
        let kb = kb();
        let rules = rules(&kb);
        let (rule, _) = rules.resolve("how to reset my pass", &kb).unwrap();
        assert_eq!(rule.name, "reset-pass");
        assert!(rules.resolve("reset the page", &kb).is_none());
        assert!(rules.resolve("my pass is fine", &kb).is_none());
    }

    #[test]
    fn test_first_rule_wins() {
        let kb = kb();
        let rules = rules(&kb);
        // matches both forgot-variants and reset-pass
        let (rule, _) = rules.resolve("forgot, need reset of pass", &kb).unwrap();
        assert_eq!(rule.name, "forgot-variants");
    }

    #[test]
    fn test_no_rule_matches() {
        let kb = kb();
        assert!(rules(&kb).resolve("asdkjhasd", &kb).is_none());
    }

    #[test]
    fn test_unknown_topic_rejected() {
        let kb = kb();
        let result = FallbackRules::new(&[spec("bad", "nope", &["x"])], &kb);
        assert!(matches!(result, Err(HelpError::UnknownTopic { .. })));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let kb = kb();
        let result = FallbackRules::new(&[spec("broken", "forgot", &["(unclosed"])], &kb);
        assert!(matches!(result, Err(HelpError::InvalidPattern { rule, .. }) if rule == "broken"));
    }

    #[test]
    fn test_rule_without_patterns_never_fires() {
        let kb = kb();
        let rules = FallbackRules::new(&[spec("empty", "forgot", &[])], &kb).unwrap();
        assert!(rules.resolve("anything", &kb).is_none());
    }
}
