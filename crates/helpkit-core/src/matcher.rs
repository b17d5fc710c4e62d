//! Keyword ranker.
//!
//! Every KB entry is scored against the query and the highest strictly
//! positive score wins. A trigger key contributes:
//!
//! - `max(1, len/6)` when all of its words appear as query tokens, so longer
//!   phrases outrank generic single-word overlaps;
//! - `1` when the whole key only appears as a raw substring of the text;
//! - `0` otherwise.
//!
//! Entries are visited in KB order and only a strictly greater score
//! replaces the current best, so ties go to the earlier entry.

use tracing::trace;

use crate::kb::{KbEntry, KnowledgeBase};
use crate::tokenize::{normalize, tokenize, TokenSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult<'a> {
    pub entry: Option<&'a KbEntry>,
    pub score: u32,
}

impl MatchResult<'_> {
    pub fn none() -> Self {
        Self {
            entry: None,
            score: 0,
        }
    }

    pub fn is_hit(&self) -> bool {
        self.entry.is_some()
    }
}

/// Score of a single trigger key against normalized `text` and its tokens.
pub fn contribution(key: &str, text: &str, tokens: &TokenSet) -> u32 {
    let mut words = key.split_whitespace().peekable();
    if words.peek().is_none() {
        return 0;
    }
    if words.all(|w| tokens.contains(w)) {
        let weight = (key.chars().count() / 6) as u32;
        return weight.max(1);
    }
    if text.contains(key) {
        return 1;
    }
    0
}

/// Total score of one entry.
pub fn score_entry(entry: &KbEntry, text: &str, tokens: &TokenSet) -> u32 {
    entry
        .keys
        .iter()
        .map(|key| contribution(key, text, tokens))
        .sum()
}

/// Score of every entry, in KB order.
pub fn score_all<'a>(query: &str, kb: &'a KnowledgeBase) -> Vec<(&'a KbEntry, u32)> {
    let text = normalize(query);
    let tokens = tokenize(&text);
    kb.iter()
        .map(|entry| (entry, score_entry(entry, &text, &tokens)))
        .collect()
}

/// Best-matching entry for `query`, or none when nothing scores above zero.
pub fn match_query<'a>(query: &str, kb: &'a KnowledgeBase) -> MatchResult<'a> {
    let text = normalize(query);
    if text.is_empty() {
        return MatchResult::none();
    }
    let tokens = tokenize(&text);

    let mut best = MatchResult::none();
    for entry in kb.iter() {
        let score = score_entry(entry, &text, &tokens);
        if score > 0 {
            trace!(topic = %entry.id, score, "scored entry");
        }
        if score > best.score {
            best = MatchResult {
                entry: Some(entry),
                score,
            };
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kb(entries: Vec<KbEntry>) -> KnowledgeBase {
        KnowledgeBase::new(entries).unwrap()
    }

    fn tokens(text: &str) -> TokenSet {
        tokenize(text)
    }

    #[test]
    fn test_contribution_word_match_weighted_by_length() {
        let t = tokens("i forgot my password");
        // "forgot password" is 15 chars -> 15 / 6 = 2
        assert_eq!(contribution("forgot password", "i forgot my password", &t), 2);
        // "password" is 8 chars -> 1
        assert_eq!(contribution("password", "i forgot my password", &t), 1);
    }

    #[test]
    fn test_contribution_short_key_floors_to_one() {
        let t = tokens("otp");
        assert_eq!(contribution("otp", "otp", &t), 1);
    }

    #[test]
    fn test_contribution_substring_only() {
        let text = "adminlogin page";
        let t = tokens(text);
        assert_eq!(contribution("login", text, &t), 1);
    }

    #[test]
    fn test_contribution_no_overlap() {
        let t = tokens("hello there");
        assert_eq!(contribution("alumni directory", "hello there", &t), 0);
    }

    #[test]
    fn test_match_picks_highest() {
        let kb = kb(vec![
            KbEntry::new("login", &["login", "sign in"], "L"),
            KbEntry::new("admin", &["admin", "admin login"], "A"),
        ]);
        let result = match_query("Admin login please", &kb);
        assert_eq!(result.entry.unwrap().id, "admin");
        assert_eq!(result.score, 2);
    }

    #[test]
    fn test_match_empty_and_blank() {
        let kb = kb(vec![KbEntry::new("help", &["help"], "H")]);
        assert_eq!(match_query("", &kb), MatchResult::none());
        assert_eq!(match_query("   ", &kb), MatchResult::none());
    }

    #[test]
    fn test_match_empty_kb() {
        let kb = kb(Vec::new());
        assert!(!match_query("anything at all", &kb).is_hit());
    }

    #[test]
    fn test_tie_goes_to_earlier_entry() {
        let kb = kb(vec![
            KbEntry::new("first", &["help"], "1"),
            KbEntry::new("second", &["please"], "2"),
        ]);
        let result = match_query("help me please", &kb);
        assert_eq!(result.entry.unwrap().id, "first");
        assert_eq!(result.score, 1);

        let reversed = self::kb(vec![
            KbEntry::new("second", &["please"], "2"),
            KbEntry::new("first", &["help"], "1"),
        ]);
        assert_eq!(match_query("help me please", &reversed).entry.unwrap().id, "second");
    }

    #[test]
    fn test_no_overlap_is_miss() {
        let kb = kb(vec![KbEntry::new("events", &["event", "upcoming"], "E")]);
        let result = match_query("asdkjhasd", &kb);
        assert!(result.entry.is_none());
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_word_match_avoids_partial_token() {
        // "in" must be a token, not just a substring of "login"
        let kb = kb(vec![KbEntry::new("login", &["log in"], "L")]);
        let result = match_query("loginwall", &kb);
        assert!(result.entry.is_none());
    }

    #[test]
    fn test_score_all_in_kb_order() {
        let kb = kb(vec![
            KbEntry::new("events", &["event", "events"], "E"),
            KbEntry::new("alumni", &["alumni"], "A"),
        ]);
        let scores: Vec<_> = score_all("upcoming events", &kb)
            .into_iter()
            .map(|(e, s)| (e.id.as_str(), s))
            .collect();
        // "event" is a substring hit, "events" a word hit
        assert_eq!(scores, vec![("events", 2), ("alumni", 0)]);
    }
}
