//! Built-in table of well-known passages.
//!
//! Lookups are exact string matches against the trimmed caller input; no case
//! or spacing normalization happens here.
use super::{Attempt, Lookup, ProviderId, SourceProvider};

const PASSAGES: &[(&str, &str)] = &[
    (
        "John 1:1",
        "Ἐν ἀρχῇ ἦν ὁ λόγος καὶ ὁ λόγος ἦν πρὸς τὸν θεόν καὶ θεὸς ἦν ὁ λόγος",
    ),
    (
        "John 3:16",
        "οὕτως γὰρ ἠγάπησεν ὁ θεὸς τὸν κόσμον ὥστε τὸν υἱὸν τὸν μονογενῆ ἔδωκεν",
    ),
    (
        "Romans 8:28",
        "οἴδαμεν δὲ ὅτι τοῖς ἀγαπῶσιν τὸν θεὸν πάντα συνεργεῖ εἰς ἀγαθόν",
    ),
    (
        "Matthew 5:3",
        "Μακάριοι οἱ πτωχοὶ τῷ πνεύματι ὅτι αὐτῶν ἐστιν ἡ βασιλεία τῶν οὐρανῶν",
    ),
    (
        "Philippians 2:5",
        "τοῦτο φρονεῖτε ἐν ὑμῖν ὃ καὶ ἐν Χριστῷ Ἰησοῦ",
    ),
];

/// Process-wide, read-only passage table.
#[derive(Debug, Clone, Copy)]
pub struct LocalTable {
    entries: &'static [(&'static str, &'static str)],
}

impl Default for LocalTable {
    fn default() -> Self {
        LocalTable { entries: PASSAGES }
    }
}

impl LocalTable {
    pub fn get(&self, key: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(reference, _)| *reference == key)
            .map(|(_, text)| *text)
    }

    /// Stored references in table order, used as caller guidance.
    pub fn references(&self) -> Vec<String> {
        self.entries.iter().map(|(reference, _)| reference.to_string()).collect()
    }
}

impl SourceProvider for LocalTable {
    fn id(&self) -> ProviderId {
        ProviderId::LocalTable
    }

    fn requires_reference(&self) -> bool {
        false
    }

    fn attempt(&self, lookup: Lookup<'_>) -> Attempt {
        match self.get(lookup.raw) {
            Some(text) => Attempt::Found(text.to_string()),
            None => Attempt::Decline(format!("'{}' not in local table", lookup.raw)),
        }
    }
}
