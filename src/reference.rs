//! Scripture reference parsing and provider-specific book codes.
//!
//! A reference is parsed once from free-form input and carried through the
//! resolver untouched. Book names are opaque at parse time; only providers that
//! need a canonical code map them (see [`book_code`]).
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

/// Example shown to callers whose input does not match the grammar.
pub const EXPECTED_FORMAT: &str = "Book Chapter:Verse (e.g., John 1:1)";

/// A parsed passage identifier. `verse_end == verse_start` for single verses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub book: String,
    pub chapter: u32,
    pub verse_start: u32,
    pub verse_end: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    #[error("invalid reference '{input}'. Use: {expected}")]
    InvalidFormat { input: String, expected: &'static str },
}

impl ReferenceError {
    fn invalid(input: &str) -> Self {
        ReferenceError::InvalidFormat {
            input: input.to_string(),
            expected: EXPECTED_FORMAT,
        }
    }
}

fn reference_pattern() -> &'static regex::Regex {
    static PATTERN: OnceLock<regex::Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        regex::Regex::new(
            r"(?i)^(?:(\d)\s*)?([a-z]+(?:\s+[a-z]+)*)\s+(\d+):(\d+)(?:\s*-\s*(\d+))?$",
        )
        .expect("reference pattern compiles")
    })
}

impl Reference {
    /// Parse `[digit] <book words> <chapter>:<verse>[-<end>]`, case-insensitive.
    pub fn parse(input: &str) -> Result<Reference, ReferenceError> {
        let trimmed = input.trim();
        let caps = reference_pattern()
            .captures(trimmed)
            .ok_or_else(|| ReferenceError::invalid(input))?;

        let words = caps[2].split_whitespace().collect::<Vec<_>>().join(" ");
        let book = match caps.get(1) {
            Some(digit) => format!("{} {}", digit.as_str(), words),
            None => words,
        };

        let number = |idx: usize| -> Result<Option<u32>, ReferenceError> {
            match caps.get(idx) {
                Some(m) => m
                    .as_str()
                    .parse::<u32>()
                    .ok()
                    .filter(|n| *n >= 1)
                    .map(Some)
                    .ok_or_else(|| ReferenceError::invalid(input)),
                None => Ok(None),
            }
        };

        let chapter = number(3)?.ok_or_else(|| ReferenceError::invalid(input))?;
        let verse_start = number(4)?.ok_or_else(|| ReferenceError::invalid(input))?;
        let verse_end = number(5)?.unwrap_or(verse_start);
        if verse_end < verse_start {
            return Err(ReferenceError::invalid(input));
        }

        Ok(Reference {
            book,
            chapter,
            verse_start,
            verse_end,
        })
    }

    pub fn is_range(&self) -> bool {
        self.verse_end != self.verse_start
    }

    /// Iterate the verse numbers covered by this reference, in order.
    pub fn verses(&self) -> impl Iterator<Item = u32> {
        self.verse_start..=self.verse_end
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.book, self.chapter, self.verse_start)?;
        if self.is_range() {
            write!(f, "-{}", self.verse_end)?;
        }
        Ok(())
    }
}

const BOOK_CODES: &[(&str, &str)] = &[
    ("matthew", "MAT"),
    ("mark", "MRK"),
    ("luke", "LUK"),
    ("john", "JHN"),
    ("acts", "ACT"),
    ("romans", "ROM"),
    ("1 corinthians", "1CO"),
    ("2 corinthians", "2CO"),
    ("galatians", "GAL"),
    ("ephesians", "EPH"),
    ("philippians", "PHP"),
    ("colossians", "COL"),
    ("1 thessalonians", "1TH"),
    ("2 thessalonians", "2TH"),
    ("1 timothy", "1TI"),
    ("2 timothy", "2TI"),
    ("titus", "TIT"),
    ("philemon", "PHM"),
    ("hebrews", "HEB"),
    ("james", "JAS"),
    ("1 peter", "1PE"),
    ("2 peter", "2PE"),
    ("1 john", "1JN"),
    ("2 john", "2JN"),
    ("3 john", "3JN"),
    ("jude", "JUD"),
    ("revelation", "REV"),
];

/// Map a book name to its three-character USFM code.
///
/// Unknown names fall back to the uppercased first three characters of the
/// raw name. That fallback is best-effort and can produce codes the provider
/// does not recognize (e.g. "Song of Songs" -> "SON").
pub fn book_code(book: &str) -> String {
    let key = book.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    if let Some((_, code)) = BOOK_CODES.iter().find(|(name, _)| *name == key) {
        return (*code).to_string();
    }
    book.trim().chars().take(3).collect::<String>().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_verse() {
        let reference = Reference::parse("John 3:16").unwrap();
        assert_eq!(reference.book, "John");
        assert_eq!(reference.chapter, 3);
        assert_eq!(reference.verse_start, 16);
        assert_eq!(reference.verse_end, 16);
        assert!(!reference.is_range());
    }

    #[test]
    fn parses_numbered_book_and_range() {
        let reference = Reference::parse("  1 Corinthians 13:4-7 ").unwrap();
        assert_eq!(reference.book, "1 Corinthians");
        assert_eq!(reference.chapter, 13);
        assert_eq!(reference.verse_start, 4);
        assert_eq!(reference.verse_end, 7);
        assert_eq!(reference.verses().collect::<Vec<_>>(), vec![4, 5, 6, 7]);
        assert_eq!(reference.to_string(), "1 Corinthians 13:4-7");
    }

    #[test]
    fn parses_multi_word_book_case_insensitively() {
        let reference = Reference::parse("song of solomon 2:1").unwrap();
        assert_eq!(reference.book, "song of solomon");
        assert_eq!(reference.chapter, 2);

        let joined = Reference::parse("2john 1:3").unwrap();
        assert_eq!(joined.book, "2 john");
    }

    #[test]
    fn chapter_and_verse_round_trip() {
        for (chapter, verse) in [(1, 1), (3, 16), (119, 105), (28, 20)] {
            let input = format!("Psalms {chapter}:{verse}");
            let reference = Reference::parse(&input).unwrap();
            assert_eq!(reference.chapter, chapter);
            assert_eq!(reference.verse_start, verse);
        }
    }

    #[test]
    fn rejects_inputs_outside_grammar() {
        for input in [
            "",
            "John",
            "John 3",
            "John 3:",
            ":16",
            "John 3:16:1",
            "John three:16",
            "John 0:1",
            "John 1:0",
            "John 3:16-10",
            "John 99999999999:1",
            "12 John 1:1",
        ] {
            let err = Reference::parse(input).unwrap_err();
            let ReferenceError::InvalidFormat { input: got, expected } = err;
            assert_eq!(got, input);
            assert_eq!(expected, EXPECTED_FORMAT);
        }
    }

    #[test]
    fn maps_known_books_and_falls_back_to_truncation() {
        assert_eq!(book_code("John"), "JHN");
        assert_eq!(book_code("1  corinthians"), "1CO");
        assert_eq!(book_code("Philippians"), "PHP");
        assert_eq!(book_code("Genesis"), "GEN");
        assert_eq!(book_code("Song of Songs"), "SON");
    }
}
