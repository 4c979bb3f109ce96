//! Ordered fallback chain from a raw reference string to source text.
//!
//! Providers are tried strictly in sequence. Each one either yields text or
//! declines; declines (including network failures) are logged and the next
//! tier is attempted. Only the terminal "nothing found" outcome leaves this
//! module.
use crate::config::Config;
use crate::reference::{Reference, ReferenceError};
use crate::source::{
    Attempt, LocalTable, Lookup, PrimaryProvider, ProviderId, SecondaryProvider, SourceProvider,
    SourceText,
};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Found(SourceText),
    NotFound(NotFound),
}

/// Every tier declined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFound {
    pub reference: String,
    /// Providers actually attempted, in order.
    pub tried: Vec<ProviderId>,
    /// Known-good references from the local table.
    pub available: Vec<String>,
    /// Set when the input failed to parse and remote tiers were skipped.
    pub parse_error: Option<ReferenceError>,
}

pub struct ReferenceResolver {
    providers: Vec<Box<dyn SourceProvider>>,
    table: LocalTable,
}

impl ReferenceResolver {
    /// Build the standard chain: local table, then primary when its URL is
    /// configured, then secondary when its credentials are configured.
    pub fn from_config(config: &Config) -> Self {
        let table = LocalTable::default();
        let mut providers: Vec<Box<dyn SourceProvider>> = vec![Box::new(table)];
        if let Some(url) = config.primary_source_url() {
            providers.push(Box::new(PrimaryProvider::new(url, config.source_timeout())));
        } else {
            tracing::debug!("primary source disabled: no url configured");
        }
        if let Some((key, id)) = config.secondary_credentials() {
            providers.push(Box::new(SecondaryProvider::new(
                &config.secondary_source_url,
                key,
                id,
                config.source_timeout(),
            )));
        } else {
            tracing::debug!("secondary source disabled: key and id not both configured");
        }
        ReferenceResolver { providers, table }
    }

    /// Build a resolver over an explicit provider list.
    pub fn with_providers(providers: Vec<Box<dyn SourceProvider>>) -> Self {
        ReferenceResolver {
            providers,
            table: LocalTable::default(),
        }
    }

    pub fn provider_ids(&self) -> Vec<ProviderId> {
        self.providers.iter().map(|provider| provider.id()).collect()
    }

    pub fn available_references(&self) -> Vec<String> {
        self.table.references()
    }

    pub fn resolve(&self, input: &str) -> ResolutionOutcome {
        let raw = input.trim();
        let parsed = Reference::parse(raw);
        let reference = parsed.as_ref().ok();
        let lookup = Lookup { raw, reference };
        let mut tried = Vec::new();

        for provider in &self.providers {
            let id = provider.id();
            if reference.is_none() && provider.requires_reference() {
                tracing::debug!(provider = %id, raw, "skipping tier: reference did not parse");
                continue;
            }

            tried.push(id);
            let start = Instant::now();
            match provider.attempt(lookup) {
                Attempt::Found(text) => {
                    let Some(reference) = reference else {
                        tracing::warn!(provider = %id, raw, "tier returned text for unparsed input");
                        continue;
                    };
                    tracing::info!(
                        provider = %id,
                        reference = %reference,
                        elapsed_ms = start.elapsed().as_millis(),
                        text_bytes = text.len(),
                        "source text resolved"
                    );
                    return ResolutionOutcome::Found(SourceText {
                        reference: reference.clone(),
                        text,
                        provider: id,
                    });
                }
                Attempt::Decline(reason) => {
                    tracing::warn!(
                        provider = %id,
                        raw,
                        elapsed_ms = start.elapsed().as_millis(),
                        reason = %reason,
                        "source tier declined"
                    );
                }
            }
        }

        ResolutionOutcome::NotFound(NotFound {
            reference: raw.to_string(),
            tried,
            available: self.available_references(),
            parse_error: parsed.err(),
        })
    }
}
