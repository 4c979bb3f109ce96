//! Prompt assembly for lexical analysis.
use serde::Serialize;

// Prompt template loaded at compile time
const LEXICON_INSTRUCTIONS: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/prompts/lexicon.md"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Build the two-message conversation for `source_text`.
///
/// The text is embedded verbatim inside `<verse>` delimiters.
pub fn lexicon_messages(source_text: &str) -> Vec<Message> {
    vec![
        Message {
            role: Role::System,
            content: LEXICON_INSTRUCTIONS.trim().to_string(),
        },
        Message {
            role: Role::User,
            content: format!("<verse>{source_text}</verse>"),
        },
    ]
}
