//! Scripture reference resolution and model-driven lexical analysis.
//!
//! A request flows through [`resolver::ReferenceResolver`] (local table, then
//! remote providers) to obtain original-language text, then through a single
//! chat-completion call, and finally through [`normalize`] which turns the
//! model's free-form reply into validated [`normalize::LexicalEntry`] values.
pub mod analyze;
pub mod cli;
pub mod config;
pub mod error;
mod http;
pub mod model;
pub mod normalize;
pub mod prompt;
pub mod reference;
pub mod resolver;
pub mod source;

pub use analyze::{Analysis, Analyzer};
pub use config::Config;
pub use error::{AnalyzeError, BoundaryOutcome};
pub use normalize::{LexicalEntry, Mode, NormalizationOutcome};
pub use reference::Reference;
pub use resolver::{ReferenceResolver, ResolutionOutcome};
pub use source::{ProviderId, SourceText};
