/*!
 * Transcript retrieval for YouTube videos.
 *
 * This module defines the collaborator interfaces the batch driver relies on:
 * - `TranscriptSource`: lists, fetches and translates caption tracks
 * - `TitleLookup`: resolves a video's display title
 *
 * Implementations:
 * - `youtube`: HTTP client for the public YouTube endpoints
 * - `mock`: in-memory source for tests
 *
 * The fetch policy (direct source track, translated fallback, translated
 * target) lives in `fetcher`.
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::alignment::SubtitleTrack;
use crate::errors::ProviderError;

pub mod fetcher;
pub mod mock;
pub mod youtube;

pub use fetcher::{BilingualTracks, SourceOrigin, TranscriptFetcher};

/// A caption track advertised for a video
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptInfo {
    /// Video the track belongs to
    pub video_id: String,

    /// Language tag of the track (e.g. `en`, `zh-Hans`)
    pub language_code: String,

    /// Human readable language name
    pub language: String,

    /// Whether the track was produced by speech recognition
    pub is_generated: bool,

    /// Whether the service can translate this track on the fly
    pub is_translatable: bool,

    /// Opaque handle used to fetch the track content
    pub base_url: String,
}

/// Source of caption tracks
///
/// Translation is a capability of the source, not of the caller: the
/// translated track is produced by the service from the given base track.
#[async_trait]
pub trait TranscriptSource: Send + Sync + Debug {
    /// List the caption tracks available for a video
    async fn list_transcripts(&self, video_id: &str) -> Result<Vec<TranscriptInfo>, ProviderError>;

    /// Fetch the entries of a track in its own language
    async fn fetch(&self, transcript: &TranscriptInfo) -> Result<SubtitleTrack, ProviderError>;

    /// Fetch the entries of a track translated into `language`
    async fn translate(&self, transcript: &TranscriptInfo, language: &str) -> Result<SubtitleTrack, ProviderError>;
}

/// Resolves video display titles
#[async_trait]
pub trait TitleLookup: Send + Sync + Debug {
    async fn video_title(&self, video_id: &str) -> Result<String, ProviderError>;
}
