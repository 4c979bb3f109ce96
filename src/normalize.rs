//! Model response normalization.
//!
//! Turns the untrusted `content` string of a chat completion into a validated
//! array of lexical entries. Models are asked for bare JSON but frequently wrap
//! it in a Markdown code fence, so a single leading fence is unwrapped before
//! parsing. Nothing else is repaired: invalid JSON or the wrong top-level
//! shape is reported as [`Malformed`] with a bounded snippet of the input.
//!
//! Two element policies exist:
//!
//! - [`Mode::Strict`] rejects the whole response if any element fails the
//!   entry schema. Use it wherever callers are promised a valid array.
//! - [`Mode::Lenient`] keeps failing elements as raw JSON (with the problem
//!   recorded) so the caller can surface them.
//!
//! Element order is preserved in both modes; it mirrors word order in the
//! analysed text.
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Upper bound on characters of untrusted text echoed back in diagnostics.
pub const SNIPPET_CHARS: usize = 200;

const FENCE: &str = "```";

/// One analysed word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexicalEntry {
    pub word: String,
    /// Strong's number such as `G3056`; may be empty.
    #[serde(rename = "strong")]
    pub strong_number: String,
    pub lemma: String,
    pub translation: String,
    pub alternatives: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morphology: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Strict,
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MalformedReason {
    UnterminatedFence,
    InvalidJson { detail: String },
    ExpectedArray { found: &'static str },
    InvalidElement { index: usize, detail: String },
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedReason::UnterminatedFence => write!(f, "unterminated code fence"),
            MalformedReason::InvalidJson { detail } => write!(f, "invalid JSON: {detail}"),
            MalformedReason::ExpectedArray { found } => write!(f, "expected array, found {found}"),
            MalformedReason::InvalidElement { index, detail } => {
                write!(f, "invalid element {index}: {detail}")
            }
        }
    }
}

/// Why a response was rejected, plus a bounded excerpt of the offending text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Malformed {
    pub reason: MalformedReason,
    pub snippet: String,
}

impl Malformed {
    fn new(reason: MalformedReason, text: &str) -> Self {
        Malformed {
            reason,
            snippet: snippet(text),
        }
    }
}

impl fmt::Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (near: {})", self.reason, self.snippet)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NormalizationOutcome<T> {
    Valid(Vec<T>),
    Malformed(Malformed),
}

/// Lenient-mode element: either a checked entry or the raw value that failed.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Entry(LexicalEntry),
    Unchecked { value: Value, problem: String },
}

impl Element {
    pub fn entry(&self) -> Option<&LexicalEntry> {
        match self {
            Element::Entry(entry) => Some(entry),
            Element::Unchecked { .. } => None,
        }
    }
}

// Unchecked elements pass through exactly as the model sent them.
impl Serialize for Element {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Element::Entry(entry) => entry.serialize(serializer),
            Element::Unchecked { value, .. } => value.serialize(serializer),
        }
    }
}

/// Normalize with every element required to match the entry schema.
pub fn normalize_strict(raw: &str) -> NormalizationOutcome<LexicalEntry> {
    let items = match parse_array(raw) {
        Ok(items) => items,
        Err(malformed) => return NormalizationOutcome::Malformed(malformed),
    };
    let mut entries = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match check_element(item) {
            Ok(entry) => entries.push(entry),
            Err(detail) => {
                tracing::warn!(index, detail = %detail, "rejecting model response");
                return NormalizationOutcome::Malformed(Malformed::new(
                    MalformedReason::InvalidElement { index, detail },
                    &item.to_string(),
                ));
            }
        }
    }
    NormalizationOutcome::Valid(entries)
}

/// Normalize, passing schema failures through as [`Element::Unchecked`].
pub fn normalize_lenient(raw: &str) -> NormalizationOutcome<Element> {
    let items = match parse_array(raw) {
        Ok(items) => items,
        Err(malformed) => return NormalizationOutcome::Malformed(malformed),
    };
    let elements = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match check_element(&item) {
            Ok(entry) => Element::Entry(entry),
            Err(problem) => {
                tracing::debug!(index, problem = %problem, "passing through unchecked element");
                Element::Unchecked {
                    value: item,
                    problem,
                }
            }
        })
        .collect();
    NormalizationOutcome::Valid(elements)
}

pub fn normalize(raw: &str, mode: Mode) -> NormalizationOutcome<Element> {
    match mode {
        Mode::Lenient => normalize_lenient(raw),
        Mode::Strict => match normalize_strict(raw) {
            NormalizationOutcome::Valid(entries) => {
                NormalizationOutcome::Valid(entries.into_iter().map(Element::Entry).collect())
            }
            NormalizationOutcome::Malformed(malformed) => NormalizationOutcome::Malformed(malformed),
        },
    }
}

/// Strip one surrounding code fence (and its language tag) if present.
pub fn unwrap_fence(raw: &str) -> Result<&str, Malformed> {
    let text = raw.trim();
    if !text.starts_with(FENCE) {
        return Ok(text);
    }
    let mut parts = text.splitn(3, FENCE).skip(1);
    let inner = parts.next().unwrap_or_default();
    if parts.next().is_none() {
        return Err(Malformed::new(MalformedReason::UnterminatedFence, text));
    }
    Ok(strip_language_tag(inner).trim())
}

/// A tag is a word directly after the fence that is ended by whitespace;
/// a bare token such as ```` ```null``` ```` is content, not a tag.
fn strip_language_tag(inner: &str) -> &str {
    if !inner.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return inner;
    }
    match inner.find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+'))) {
        Some(end) if inner[end..].starts_with(char::is_whitespace) => &inner[end..],
        _ => inner,
    }
}

fn parse_array(raw: &str) -> Result<Vec<Value>, Malformed> {
    let text = unwrap_fence(raw)?;
    let value: Value = serde_json::from_str(text).map_err(|err| {
        tracing::warn!(error = %err, response_bytes = raw.len(), "model response is not JSON");
        Malformed::new(
            MalformedReason::InvalidJson {
                detail: err.to_string(),
            },
            text,
        )
    })?;
    match value {
        Value::Array(items) => Ok(items),
        other => Err(Malformed::new(
            MalformedReason::ExpectedArray {
                found: json_type(&other),
            },
            text,
        )),
    }
}

fn check_element(value: &Value) -> Result<LexicalEntry, String> {
    let Value::Object(map) = value else {
        return Err(format!("expected object, found {}", json_type(value)));
    };
    let morphology = match map.get("morphology") {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(_) => return Err("field `morphology` must be a string".to_string()),
    };
    Ok(LexicalEntry {
        word: string_field(map, "word")?,
        strong_number: string_field(map, "strong")?,
        lemma: string_field(map, "lemma")?,
        translation: string_field(map, "translation")?,
        alternatives: string_list_field(map, "alternatives")?,
        morphology,
    })
}

fn string_field(map: &Map<String, Value>, name: &str) -> Result<String, String> {
    match map.get(name) {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(_) => Err(format!("field `{name}` must be a string")),
        None => Err(format!("missing field `{name}`")),
    }
}

fn string_list_field(map: &Map<String, Value>, name: &str) -> Result<Vec<String>, String> {
    let items = match map.get(name) {
        Some(Value::Array(items)) => items,
        Some(_) => return Err(format!("field `{name}` must be an array of strings")),
        None => return Err(format!("missing field `{name}`")),
    };
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| format!("field `{name}` must be an array of strings"))
        })
        .collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn snippet(text: &str) -> String {
    text.chars().take(SNIPPET_CHARS).collect()
}
