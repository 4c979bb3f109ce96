//! Secondary remote provider, enabled only when both an API key and a bible
//! identifier are configured.
//!
//! The response schema is not pinned down, so every string leaf of the body is
//! collected in pre-order and joined into the passage text.
use super::{attempt_from, Attempt, Lookup, ProviderId, SourceProvider};
use crate::http;
use crate::reference::{book_code, Reference};
use anyhow::{Context, Result};
use serde_json::Value;
use std::time::Duration;

pub struct SecondaryProvider {
    base_url: String,
    api_key: String,
    bible_id: String,
    agent: ureq::Agent,
}

impl SecondaryProvider {
    pub fn new(base_url: &str, api_key: &str, bible_id: &str, timeout: Duration) -> Self {
        SecondaryProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            bible_id: bible_id.to_string(),
            agent: http::agent(timeout),
        }
    }

    pub fn request_url(&self, reference: &Reference) -> String {
        let code = book_code(&reference.book);
        let mut passage = format!("{code}.{}.{}", reference.chapter, reference.verse_start);
        if reference.is_range() {
            passage.push_str(&format!("-{code}.{}.{}", reference.chapter, reference.verse_end));
        }
        format!(
            "{}/bibles/{}/passages/{passage}?content-type=text",
            self.base_url, self.bible_id
        )
    }

    fn fetch(&self, reference: &Reference) -> Result<String> {
        let url = self.request_url(reference);
        let body = http::get_json(&self.agent, &url, &[("api-key", self.api_key.as_str())])
            .context("fetch secondary source")?;
        Ok(flatten_strings(&body).join(" "))
    }
}

impl SourceProvider for SecondaryProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Secondary
    }

    fn attempt(&self, lookup: Lookup<'_>) -> Attempt {
        let Some(reference) = lookup.reference else {
            return Attempt::Decline("reference did not parse".to_string());
        };
        attempt_from(self.fetch(reference))
    }
}

/// Collect every non-blank string leaf of `value` in pre-order.
///
/// Object values are visited in document order; keys themselves are not text.
pub fn flatten_strings(value: &Value) -> Vec<String> {
    let mut out = Vec::new();
    walk(value, &mut out);
    out
}

fn walk(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(text) => {
            let text = text.trim();
            if !text.is_empty() {
                out.push(text.to_string());
            }
        }
        Value::Array(items) => items.iter().for_each(|item| walk(item, out)),
        Value::Object(map) => map.values().for_each(|item| walk(item, out)),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}
