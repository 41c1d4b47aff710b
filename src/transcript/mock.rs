/*!
 * In-memory transcript source for testing.
 *
 * Videos are registered with their tracks up front:
 * - `with_track` adds a fetchable, translatable track
 * - `with_transcript` adds a track with explicit metadata
 * - `with_translation` overrides the generated translation of a track
 * - `with_failing_fetch` makes direct fetches of a track fail
 * - `with_title` registers a display title
 *
 * Translations that are not registered explicitly are generated by prefixing
 * every entry of the base track with the target language tag.
 */

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::alignment::{SubtitleEntry, SubtitleTrack};
use crate::errors::ProviderError;
use crate::transcript::{TitleLookup, TranscriptInfo, TranscriptSource};

/// Mock transcript source and title lookup
#[derive(Debug, Default)]
pub struct MockTranscriptSource {
    /// Track listings per video
    listings: HashMap<String, Vec<TranscriptInfo>>,
    /// Entries per (video, language)
    tracks: HashMap<(String, String), Vec<SubtitleEntry>>,
    /// Explicit translations per (video, from, to)
    translations: HashMap<(String, String, String), Vec<SubtitleEntry>>,
    /// Tracks whose direct fetch fails
    failing_fetches: HashSet<(String, String)>,
    /// Display titles per video
    titles: HashMap<String, String>,
    list_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    translate_calls: AtomicUsize,
    title_calls: AtomicUsize,
}

impl MockTranscriptSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a translatable track built from `(start, text)` pairs
    pub fn with_track(self, video_id: &str, language_code: &str, is_generated: bool, entries: &[(f64, &str)]) -> Self {
        let info = TranscriptInfo {
            video_id: video_id.to_string(),
            language_code: language_code.to_string(),
            language: language_code.to_string(),
            is_generated,
            is_translatable: true,
            base_url: format!("mock://{}/{}", video_id, language_code),
        };
        self.with_transcript(info, entries)
    }

    /// Register a track with explicit metadata
    pub fn with_transcript(mut self, info: TranscriptInfo, entries: &[(f64, &str)]) -> Self {
        let entries = to_entries(entries);
        self.tracks.insert((info.video_id.clone(), info.language_code.clone()), entries);
        self.listings.entry(info.video_id.clone()).or_default().push(info);
        self
    }

    /// Register a video that has no caption tracks at all
    pub fn with_video(mut self, video_id: &str) -> Self {
        self.listings.entry(video_id.to_string()).or_default();
        self
    }

    /// Register the translation of a track into another language
    pub fn with_translation(mut self, video_id: &str, from: &str, to: &str, entries: &[(f64, &str)]) -> Self {
        self.translations.insert(
            (video_id.to_string(), from.to_string(), to.to_string()),
            to_entries(entries),
        );
        self
    }

    /// Make direct fetches of a track fail
    pub fn with_failing_fetch(mut self, video_id: &str, language_code: &str) -> Self {
        self.failing_fetches.insert((video_id.to_string(), language_code.to_string()));
        self
    }

    pub fn with_title(mut self, video_id: &str, title: &str) -> Self {
        self.titles.insert(video_id.to_string(), title.to_string());
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn translate_calls(&self) -> usize {
        self.translate_calls.load(Ordering::SeqCst)
    }

    pub fn title_calls(&self) -> usize {
        self.title_calls.load(Ordering::SeqCst)
    }

    fn base_entries(&self, transcript: &TranscriptInfo) -> Result<&Vec<SubtitleEntry>, ProviderError> {
        self.tracks.get(&(transcript.video_id.clone(), transcript.language_code.clone()))
            .ok_or_else(|| ProviderError::ApiError {
                status_code: 404,
                message: format!("no {} track for {}", transcript.language_code, transcript.video_id),
            })
    }
}

fn to_entries(entries: &[(f64, &str)]) -> Vec<SubtitleEntry> {
    entries.iter()
        .map(|(start, text)| SubtitleEntry::new(*start, 1.0, *text))
        .collect()
}

#[async_trait]
impl TranscriptSource for MockTranscriptSource {
    async fn list_transcripts(&self, video_id: &str) -> Result<Vec<TranscriptInfo>, ProviderError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        self.listings.get(video_id)
            .cloned()
            .ok_or_else(|| ProviderError::ApiError {
                status_code: 404,
                message: format!("unknown video {}", video_id),
            })
    }

    async fn fetch(&self, transcript: &TranscriptInfo) -> Result<SubtitleTrack, ProviderError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        if self.failing_fetches.contains(&(transcript.video_id.clone(), transcript.language_code.clone())) {
            return Err(ProviderError::RequestFailed(format!(
                "simulated failure fetching {} track", transcript.language_code
            )));
        }

        let entries = self.base_entries(transcript)?;
        Ok(SubtitleTrack::new(transcript.language_code.clone(), entries.clone()))
    }

    async fn translate(&self, transcript: &TranscriptInfo, language: &str) -> Result<SubtitleTrack, ProviderError> {
        self.translate_calls.fetch_add(1, Ordering::SeqCst);

        if !transcript.is_translatable {
            return Err(ProviderError::RequestFailed(format!(
                "{} track is not translatable", transcript.language_code
            )));
        }

        let key = (transcript.video_id.clone(), transcript.language_code.clone(), language.to_string());
        if let Some(entries) = self.translations.get(&key) {
            return Ok(SubtitleTrack::new(language, entries.clone()));
        }

        let entries = self.base_entries(transcript)?
            .iter()
            .map(|entry| SubtitleEntry::new(entry.start, entry.duration, format!("[{}] {}", language, entry.text)))
            .collect();
        Ok(SubtitleTrack::new(language, entries))
    }
}

#[async_trait]
impl TitleLookup for MockTranscriptSource {
    async fn video_title(&self, video_id: &str) -> Result<String, ProviderError> {
        self.title_calls.fetch_add(1, Ordering::SeqCst);

        self.titles.get(video_id)
            .cloned()
            .ok_or_else(|| ProviderError::ApiError {
                status_code: 404,
                message: format!("no title for {}", video_id),
            })
    }
}
