//! Primary remote provider.
//!
//! Requests `{base}/{book}+{chapter}:{start}[-{end}]` and expects a body of
//! the form `{"verses": {"<chapter>": {"<verse>": {"text": "..."}}}}`.
use super::{attempt_from, Attempt, Lookup, ProviderId, SourceProvider};
use crate::http;
use crate::reference::Reference;
use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::time::Duration;

pub struct PrimaryProvider {
    base_url: String,
    agent: ureq::Agent,
}

impl PrimaryProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        PrimaryProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: http::agent(timeout),
        }
    }

    /// Build the request URL for `reference` using this provider's convention.
    pub fn request_url(&self, reference: &Reference) -> String {
        let book = reference
            .book
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("+")
            .to_lowercase();
        let mut url = format!(
            "{}/{}+{}:{}",
            self.base_url, book, reference.chapter, reference.verse_start
        );
        if reference.is_range() {
            url.push_str(&format!("-{}", reference.verse_end));
        }
        url
    }

    fn fetch(&self, reference: &Reference) -> Result<String> {
        let url = self.request_url(reference);
        let body = http::get_json(&self.agent, &url, &[]).context("fetch primary source")?;
        extract_verses(&body, reference)
    }
}

impl SourceProvider for PrimaryProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Primary
    }

    fn attempt(&self, lookup: Lookup<'_>) -> Attempt {
        let Some(reference) = lookup.reference else {
            return Attempt::Decline("reference did not parse".to_string());
        };
        attempt_from(self.fetch(reference))
    }
}

/// Pull the requested verses out of a verses-by-chapter map, joined in order.
pub fn extract_verses(body: &Value, reference: &Reference) -> Result<String> {
    let chapter_key = reference.chapter.to_string();
    let chapter = body
        .get("verses")
        .and_then(|verses| verses.get(&chapter_key))
        .ok_or_else(|| anyhow!("payload missing verses for chapter {chapter_key}"))?;

    let mut parts = Vec::new();
    for verse in reference.verses() {
        let text = chapter
            .get(verse.to_string())
            .and_then(|leaf| leaf.get("text"))
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("payload missing text for {}:{verse}", reference.chapter))?;
        let text = text.trim();
        if !text.is_empty() {
            parts.push(text);
        }
    }
    Ok(parts.join(" "))
}
