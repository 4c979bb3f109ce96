//! Per-request pipeline: resolve, prompt, call the model, normalize.
use crate::config::Config;
use crate::error::AnalyzeError;
use crate::model::{CompletionBackend, HttpCompletionBackend};
use crate::normalize::{normalize, Element, Mode, NormalizationOutcome};
use crate::prompt::lexicon_messages;
use crate::reference::ReferenceError;
use crate::resolver::{ReferenceResolver, ResolutionOutcome};
use crate::source::{ProviderId, SourceText};
use serde::Serialize;

/// Successful analysis of one reference.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub reference: String,
    pub text: String,
    pub provider: ProviderId,
    pub analysis: Vec<Element>,
}

pub struct Analyzer {
    resolver: ReferenceResolver,
    backend: Box<dyn CompletionBackend>,
    mode: Mode,
}

impl Analyzer {
    pub fn new(resolver: ReferenceResolver, backend: Box<dyn CompletionBackend>, mode: Mode) -> Self {
        Analyzer {
            resolver,
            backend,
            mode,
        }
    }

    pub fn from_config(config: &Config, mode: Mode) -> Self {
        Analyzer::new(
            ReferenceResolver::from_config(config),
            Box::new(HttpCompletionBackend::from_config(config)),
            mode,
        )
    }

    pub fn resolver(&self) -> &ReferenceResolver {
        &self.resolver
    }

    /// Resolve `reference` to source text or a boundary error.
    pub fn resolve(&self, reference: &str) -> Result<SourceText, AnalyzeError> {
        match self.resolver.resolve(reference) {
            ResolutionOutcome::Found(source) => Ok(source),
            ResolutionOutcome::NotFound(not_found) => match not_found.parse_error {
                Some(ReferenceError::InvalidFormat { input, expected }) => {
                    Err(AnalyzeError::InvalidFormat { input, expected })
                }
                None => Err(AnalyzeError::NotFound {
                    reference: not_found.reference,
                    tried: not_found.tried,
                    available: not_found.available,
                }),
            },
        }
    }

    pub fn analyze(&self, reference: &str) -> Result<Analysis, AnalyzeError> {
        let source = self.resolve(reference)?;
        let messages = lexicon_messages(&source.text);
        let content = self
            .backend
            .complete(&messages)
            .map_err(|err| AnalyzeError::UpstreamCallFailed {
                detail: format!("{err:#}"),
            })?;

        match normalize(&content, self.mode) {
            NormalizationOutcome::Valid(analysis) => Ok(Analysis {
                reference: reference.trim().to_string(),
                text: source.text,
                provider: source.provider,
                analysis,
            }),
            NormalizationOutcome::Malformed(malformed) => Err(AnalyzeError::Malformed(malformed)),
        }
    }
}
