use std::sync::Arc;
use log::{debug, info, warn};

use crate::alignment::SubtitleTrack;
use crate::errors::AppError;
use crate::language_utils;
use crate::transcript::{TranscriptInfo, TranscriptSource};

// @module: Source/target track retrieval policy

/// How the source-language track was obtained
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOrigin {
    /// An existing track in the source language
    Direct { language_code: String, is_generated: bool },

    /// Another track translated into the source language
    Translated { from_language: String },
}

/// The pair of tracks handed to the aligner
#[derive(Debug, Clone)]
pub struct BilingualTracks {
    pub source: SubtitleTrack,
    pub target: SubtitleTrack,
    pub origin: SourceOrigin,
}

/// Retrieves the source and target tracks of a video.
///
/// The source track is fetched directly when the video has one in the source
/// language, otherwise another track is translated into it. The target track
/// is always a translation of the base track behind the source track.
#[derive(Debug, Clone)]
pub struct TranscriptFetcher {
    source: Arc<dyn TranscriptSource>,
    source_language: String,
    target_language: String,
}

impl TranscriptFetcher {
    pub fn new(source: Arc<dyn TranscriptSource>, source_language: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            source,
            source_language: source_language.into(),
            target_language: target_language.into(),
        }
    }

    /// Fetch both tracks, failing with `NoTranscriptAvailable` when the
    /// source track cannot be obtained by either route
    pub async fn fetch_bilingual(&self, video_id: &str) -> Result<BilingualTracks, AppError> {
        let unavailable = |reason: String| AppError::NoTranscriptAvailable {
            video_id: video_id.to_string(),
            reason,
        };

        let transcripts = self.source.list_transcripts(video_id).await
            .map_err(|e| unavailable(format!("cannot list subtitle tracks: {}", e)))?;

        if transcripts.is_empty() {
            return Err(unavailable("video has no subtitle tracks".to_string()));
        }

        debug!(
            "Available tracks for {}: {}",
            video_id,
            transcripts.iter()
                .map(|t| format!("{}{}", t.language_code, if t.is_generated { " (auto)" } else { "" }))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let (base, source, origin) = match self.fetch_direct(&transcripts).await {
            Ok((base, track)) => {
                info!("Fetched {} subtitles", base.language_code);
                let origin = SourceOrigin::Direct {
                    language_code: base.language_code.clone(),
                    is_generated: base.is_generated,
                };
                (base, track, origin)
            }
            Err(reason) => {
                warn!(
                    "Cannot fetch {} subtitles directly ({}), trying automatic translation",
                    self.source_language, reason
                );
                let (base, track) = self.fetch_translated_source(&transcripts).await
                    .map_err(|fallback| unavailable(format!("{}; fallback failed: {}", reason, fallback)))?;
                info!("Fetched {} subtitles translated from {}", self.source_language, base.language_code);
                let origin = SourceOrigin::Translated { from_language: base.language_code.clone() };
                (base, track, origin)
            }
        };

        let target = self.source.translate(base, &self.target_language).await
            .map_err(|e| unavailable(format!(
                "cannot translate {} subtitles to {}: {}",
                base.language_code, self.target_language, e
            )))?;
        info!("Fetched {} subtitles", self.target_language);

        Ok(BilingualTracks { source, target, origin })
    }

    async fn fetch_direct<'a>(&self, transcripts: &'a [TranscriptInfo]) -> Result<(&'a TranscriptInfo, SubtitleTrack), String> {
        let transcript = find_transcript(transcripts, &self.source_language)
            .ok_or_else(|| format!("no {} track", self.source_language))?;

        let track = self.source.fetch(transcript).await.map_err(|e| e.to_string())?;
        if track.is_empty() {
            return Err(format!("{} track is empty", transcript.language_code));
        }

        Ok((transcript, track))
    }

    async fn fetch_translated_source<'a>(&self, transcripts: &'a [TranscriptInfo]) -> Result<(&'a TranscriptInfo, SubtitleTrack), String> {
        let base = transcripts.iter()
            .filter(|t| t.is_translatable)
            .min_by_key(|t| t.is_generated)
            .ok_or_else(|| "no translatable track".to_string())?;

        let track = self.source.translate(base, &self.source_language).await.map_err(|e| e.to_string())?;
        if track.is_empty() {
            return Err(format!("translation of {} track is empty", base.language_code));
        }

        Ok((base, track))
    }
}

/// Pick the track for `language`.
///
/// Manually created tracks win over generated ones; within each group an
/// exact tag match wins over a match on the primary subtag only.
pub fn find_transcript<'a>(transcripts: &'a [TranscriptInfo], language: &str) -> Option<&'a TranscriptInfo> {
    transcripts.iter()
        .filter_map(|transcript| {
            let exact = language_utils::tags_equal(&transcript.language_code, language);
            if !exact && !language_utils::language_codes_match(&transcript.language_code, language) {
                return None;
            }
            let rank = u8::from(transcript.is_generated) * 2 + u8::from(!exact);
            Some((rank, transcript))
        })
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, transcript)| transcript)
}
