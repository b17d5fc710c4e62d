//! Matching engine behind the help widget: a raw utterance goes in, an
//! escaped reply and the next quick-reply chips come out.

pub mod catalog;
pub mod error;
pub mod fallback;
pub mod format;
pub mod kb;
pub mod matcher;
pub mod session;
pub mod suggest;
pub mod tokenize;
pub mod view;

pub use catalog::Catalog;
pub use error::{HelpError, HelpResult};
pub use fallback::{FallbackRule, FallbackRules, FallbackSpec};
pub use format::{escape_html, format_reply, format_reply_with, FormatOptions};
pub use kb::{KbEntry, KnowledgeBase, TopicId};
pub use matcher::{match_query, score_all, MatchResult};
pub use session::{ConversationState, Resolution, Session, TurnResult};
pub use suggest::{AliasTable, SuggestionTable};
pub use tokenize::{normalize, tokenize, TokenSet};
pub use view::{describe_turn, Role, ViewNode};
