/*!
 * Timestamp alignment of two subtitle tracks.
 *
 * Both tracks are indexed by their entries' start time and merged on the
 * union of those keys, so every start time seen in either track produces
 * exactly one line of the bilingual document. Matching is exact: two entries
 * pair up only when their start times are numerically equal.
 */

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use anyhow::{Result, anyhow};
use log::{debug, warn};

use crate::app_config::ReportConfig;

/// A single timed subtitle line as delivered by the transcript service
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    /// Start time in seconds
    pub start: f64,

    /// Display duration in seconds
    pub duration: f64,

    /// Subtitle text, untrimmed
    pub text: String,
}

impl SubtitleEntry {
    pub fn new(start: f64, duration: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            duration,
            text: text.into(),
        }
    }

    /// Creates an entry, rejecting negative or non-finite times
    pub fn new_validated(start: f64, duration: f64, text: impl Into<String>) -> Result<Self> {
        if !start.is_finite() || start < 0.0 {
            return Err(anyhow!("Invalid start time: {}", start));
        }
        if !duration.is_finite() || duration < 0.0 {
            return Err(anyhow!("Invalid duration: {}", duration));
        }

        Ok(Self::new(start, duration, text))
    }
}

/// All entries of one language for one video, in fetch order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubtitleTrack {
    /// Language tag of the entries
    pub language: String,

    /// Entries in the order the service returned them
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleTrack {
    pub fn new(language: impl Into<String>, entries: Vec<SubtitleEntry>) -> Self {
        Self {
            language: language.into(),
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index entries by start time.
    ///
    /// Start times are not guaranteed unique upstream. When two entries share
    /// one, the later entry in fetch order replaces the earlier one.
    pub fn index_by_start(&self) -> BTreeMap<TimeKey, &SubtitleEntry> {
        let mut index = BTreeMap::new();
        for entry in &self.entries {
            if let Some(previous) = index.insert(TimeKey::new(entry.start), entry) {
                debug!(
                    "Duplicate start time {} in {} track, replacing '{}'",
                    entry.start, self.language, previous.text.trim()
                );
            }
        }
        index
    }
}

/// Totally ordered start time used as a map key
#[derive(Debug, Clone, Copy)]
pub struct TimeKey(f64);

impl TimeKey {
    pub fn new(seconds: f64) -> Self {
        // -0.0 and 0.0 are the same instant
        Self(if seconds == 0.0 { 0.0 } else { seconds })
    }

    pub fn seconds(self) -> f64 {
        self.0
    }
}

impl PartialEq for TimeKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TimeKey {}

impl PartialOrd for TimeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Texts substituted when one side has no entry at a timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholders {
    pub source: String,
    pub target: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self::from(&ReportConfig::default())
    }
}

impl From<&ReportConfig> for Placeholders {
    fn from(report: &ReportConfig) -> Self {
        Self {
            source: report.source_placeholder.clone(),
            target: report.target_placeholder.clone(),
        }
    }
}

/// One row of the bilingual document
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedLine {
    /// Shared start time in seconds
    pub timestamp: f64,

    /// Trimmed source text, or the source placeholder
    pub source_text: String,

    /// Trimmed target text, or the target placeholder
    pub target_text: String,
}

/// Aligned lines, strictly ascending by timestamp
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BilingualDocument {
    lines: Vec<AlignedLine>,
}

impl BilingualDocument {
    pub fn lines(&self) -> &[AlignedLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AlignedLine> {
        self.lines.iter()
    }
}

impl<'a> IntoIterator for &'a BilingualDocument {
    type Item = &'a AlignedLine;
    type IntoIter = std::slice::Iter<'a, AlignedLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

/// Merge two tracks into one bilingual document keyed by start time.
///
/// Tracks of different lengths are accepted: the merge produces a line for
/// every distinct start time and fills the missing side with its placeholder.
pub fn align(source: &SubtitleTrack, target: &SubtitleTrack, placeholders: &Placeholders) -> BilingualDocument {
    if source.len() != target.len() {
        warn!(
            "Track length mismatch: {} {} entries vs {} {} entries, aligning by timestamp",
            source.len(), source.language, target.len(), target.language
        );
    }

    let source_index = source.index_by_start();
    let target_index = target.index_by_start();

    let timestamps: BTreeSet<TimeKey> = source_index.keys()
        .chain(target_index.keys())
        .copied()
        .collect();

    let lines = timestamps.into_iter()
        .map(|key| AlignedLine {
            timestamp: key.seconds(),
            source_text: side_text(&source_index, key, &placeholders.source),
            target_text: side_text(&target_index, key, &placeholders.target),
        })
        .collect();

    BilingualDocument { lines }
}

fn side_text(index: &BTreeMap<TimeKey, &SubtitleEntry>, key: TimeKey, placeholder: &str) -> String {
    index.get(&key)
        .map(|entry| entry.text.trim().to_string())
        .unwrap_or_else(|| placeholder.to_string())
}
