use thiserror::Error;

#[derive(Debug, Error)]
pub enum HelpError {
    #[error("duplicate topic id: {0}")]
    DuplicateTopic(String),

    #[error("entry #{0} has an empty topic id")]
    EmptyTopicId(usize),

    #[error("topic {0} has no trigger keys")]
    EmptyKeys(String),

    #[error("topic {0} has a blank trigger key")]
    BlankKey(String),

    #[error("{context} refers to unknown topic: {topic}")]
    UnknownTopic { context: String, topic: String },

    #[error("invalid pattern in fallback rule {rule}: {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    #[error("catalog parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

pub type HelpResult<T> = Result<T, HelpError>;
