//! Source-text providers for the resolver fallback chain.
//!
//! Each provider offers one capability, [`SourceProvider::attempt`], which
//! either yields original-language text or declines. Failures never escape a
//! provider; they become a [`Attempt::Decline`] carrying a diagnostic that the
//! resolver logs and then moves past.
use crate::reference::Reference;
use serde::Serialize;
use std::fmt;

pub mod local;
pub mod primary;
pub mod secondary;

pub use local::LocalTable;
pub use primary::PrimaryProvider;
pub use secondary::SecondaryProvider;

/// Identifies which tier produced (or failed to produce) a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    LocalTable,
    Primary,
    Secondary,
}

impl ProviderId {
    /// Return the stable identifier used in logs and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::LocalTable => "local_table",
            ProviderId::Primary => "primary",
            ProviderId::Secondary => "secondary",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved passage text; created by the first provider that succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceText {
    pub reference: Reference,
    pub text: String,
    pub provider: ProviderId,
}

/// What a provider receives for one request.
#[derive(Debug, Clone, Copy)]
pub struct Lookup<'a> {
    /// Caller input with surrounding whitespace removed, otherwise untouched.
    pub raw: &'a str,
    /// `None` when the input did not parse.
    pub reference: Option<&'a Reference>,
}

/// Result of a single provider attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    Found(String),
    Decline(String),
}

pub trait SourceProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Remote tiers cannot build a request without a parsed reference.
    fn requires_reference(&self) -> bool {
        true
    }

    fn attempt(&self, lookup: Lookup<'_>) -> Attempt;
}

/// Convert a tier-internal result into an attempt, rejecting blank text.
pub(crate) fn attempt_from(result: anyhow::Result<String>) -> Attempt {
    match result {
        Ok(text) if text.trim().is_empty() => Attempt::Decline("empty text".to_string()),
        Ok(text) => Attempt::Found(text.trim().to_string()),
        Err(err) => Attempt::Decline(format!("{err:#}")),
    }
}
