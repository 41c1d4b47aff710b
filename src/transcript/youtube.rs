use async_trait::async_trait;
use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use reqwest::{Client, StatusCode};
use reqwest::header::ACCEPT_LANGUAGE;
use serde::Deserialize;
use url::Url;

use crate::alignment::{SubtitleEntry, SubtitleTrack};
use crate::app_config::YoutubeConfig;
use crate::errors::ProviderError;
use crate::transcript::{TitleLookup, TranscriptInfo, TranscriptSource};

// @module: YouTube caption and oEmbed client

const WATCH_URL: &str = "https://www.youtube.com/watch";
const OEMBED_URL: &str = "https://www.youtube.com/oembed";
const USER_AGENT: &str = concat!("ytdualsub/", env!("CARGO_PKG_VERSION"));

// Longest error body kept in error messages
const MAX_ERROR_BODY_CHARS: usize = 200;

// @const: One <text> element of a timed-text document
static TEXT_ELEMENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<text\b([^>]*?)(?:/>|>(.*?)</text>)"#).unwrap()
});

// @const: name="value" attribute pair
static ATTRIBUTE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z_:][\w:.-]*)\s*=\s*"([^"]*)""#).unwrap()
});

// @const: Character and named entity references
static ENTITY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|amp|lt|gt|quot|apos|nbsp);").unwrap()
});

// @const: Inline markup such as <i> or <font color="..">
static TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[^>]*>").unwrap()
});

/// Client for the public YouTube caption endpoints
#[derive(Debug, Clone)]
pub struct YoutubeClient {
    /// HTTP client for making requests
    client: Client,
    /// Accept-Language header value
    accept_language: String,
}

/// The `captions` object embedded in a watch page
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionsJson {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    #[serde(default)]
    name: Option<TextRuns>,
    language_code: String,
    /// `asr` for speech-recognition tracks
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    is_translatable: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextRuns {
    simple_text: Option<String>,
    #[serde(default)]
    runs: Vec<TextRun>,
}

#[derive(Debug, Deserialize)]
struct TextRun {
    text: String,
}

impl TextRuns {
    fn text(&self) -> String {
        match &self.simple_text {
            Some(text) => text.clone(),
            None => self.runs.iter().map(|run| run.text.as_str()).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OembedResponse {
    title: String,
}

impl YoutubeClient {
    pub fn new(config: &YoutubeConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            accept_language: config.accept_language.clone(),
        })
    }

    /// GET a URL and return the body, mapping HTTP failures to provider errors
    async fn get_text(&self, url: Url) -> Result<String, ProviderError> {
        debug!("GET {}", url);
        let response = self.client.get(url)
            .header(ACCEPT_LANGUAGE, &self.accept_language)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimitExceeded(
                "YouTube is throttling requests from this address".to_string()
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl TranscriptSource for YoutubeClient {
    async fn list_transcripts(&self, video_id: &str) -> Result<Vec<TranscriptInfo>, ProviderError> {
        let url = Url::parse_with_params(WATCH_URL, &[("v", video_id)])
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        let html = self.get_text(url).await?;

        parse_caption_tracks(video_id, &html)
    }

    async fn fetch(&self, transcript: &TranscriptInfo) -> Result<SubtitleTrack, ProviderError> {
        let url = timed_text_url(&transcript.base_url, None)?;
        let body = self.get_text(url).await?;

        parse_timed_text(&transcript.language_code, &body)
    }

    async fn translate(&self, transcript: &TranscriptInfo, language: &str) -> Result<SubtitleTrack, ProviderError> {
        if !transcript.is_translatable {
            return Err(ProviderError::RequestFailed(format!(
                "{} track of video {} is not translatable",
                transcript.language_code, transcript.video_id
            )));
        }

        let url = timed_text_url(&transcript.base_url, Some(language))?;
        let body = self.get_text(url).await?;

        parse_timed_text(language, &body)
    }
}

#[async_trait]
impl TitleLookup for YoutubeClient {
    async fn video_title(&self, video_id: &str) -> Result<String, ProviderError> {
        let watch_url = Url::parse_with_params(WATCH_URL, &[("v", video_id)])
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        let url = Url::parse_with_params(OEMBED_URL, &[("url", watch_url.as_str()), ("format", "json")])
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let body = self.get_text(url).await?;
        let response: OembedResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::ParseError(format!("Invalid oEmbed response: {}", e)))?;

        let title = response.title.trim();
        if title.is_empty() {
            return Err(ProviderError::ParseError(format!("Video {} has an empty title", video_id)));
        }

        Ok(title.to_string())
    }
}

/// Extract the caption track listing from a watch page
pub fn parse_caption_tracks(video_id: &str, html: &str) -> Result<Vec<TranscriptInfo>, ProviderError> {
    let Some((_, captions_start)) = html.split_once("\"captions\":") else {
        if html.contains("class=\"g-recaptcha\"") {
            return Err(ProviderError::RateLimitExceeded(
                "YouTube is asking for a captcha".to_string()
            ));
        }
        if !html.contains("\"playabilityStatus\":") {
            return Err(ProviderError::ParseError(format!(
                "Watch page of video {} has no player data", video_id
            )));
        }
        // Playable video without captions
        return Ok(Vec::new());
    };

    // Only the first JSON value matters, the rest of the page follows it
    let captions: CaptionsJson = serde_json::Deserializer::from_str(captions_start)
        .into_iter::<CaptionsJson>()
        .next()
        .ok_or_else(|| ProviderError::ParseError("Empty captions object".to_string()))?
        .map_err(|e| ProviderError::ParseError(format!("Invalid captions object: {}", e)))?;

    let tracks = captions.player_captions_tracklist_renderer
        .map(|renderer| renderer.caption_tracks)
        .unwrap_or_default();

    Ok(tracks.into_iter()
        .map(|track| TranscriptInfo {
            video_id: video_id.to_string(),
            language: track.name.as_ref()
                .map(TextRuns::text)
                .unwrap_or_else(|| track.language_code.clone()),
            is_generated: track.kind.as_deref() == Some("asr"),
            is_translatable: track.is_translatable,
            base_url: track.base_url,
            language_code: track.language_code,
        })
        .collect())
}

/// Build the timed-text URL for a track, optionally translated.
///
/// Any `fmt` parameter is dropped so the service answers with the plain
/// XML format.
pub fn timed_text_url(base_url: &str, translate_to: Option<&str>) -> Result<Url, ProviderError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ProviderError::RequestFailed(format!("Invalid caption URL '{}': {}", base_url, e)))?;

    let pairs: Vec<(String, String)> = url.query_pairs()
        .filter(|(key, _)| key != "fmt" && key != "tlang")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    {
        let mut query = url.query_pairs_mut();
        query.clear();
        query.extend_pairs(pairs);
        if let Some(language) = translate_to {
            query.append_pair("tlang", language);
        }
    }

    Ok(url)
}

/// Parse a timed-text XML document into a track.
///
/// Entries whose times cannot be parsed are skipped. Text is unescaped
/// twice (the service escapes markup inside already-escaped XML) and inline
/// tags are removed.
pub fn parse_timed_text(language: &str, body: &str) -> Result<SubtitleTrack, ProviderError> {
    if !body.contains("<transcript") && !body.contains("<text") {
        return Err(ProviderError::ParseError(format!(
            "Response for {} subtitles is not a timed-text document", language
        )));
    }

    let mut entries = Vec::new();
    for element in TEXT_ELEMENT_REGEX.captures_iter(body) {
        let attributes = element.get(1).map_or("", |m| m.as_str());
        let raw_text = element.get(2).map_or("", |m| m.as_str());

        let mut start = None;
        let mut duration = None;
        for attribute in ATTRIBUTE_REGEX.captures_iter(attributes) {
            match &attribute[1] {
                "start" => start = attribute[2].trim().parse::<f64>().ok(),
                "dur" => duration = attribute[2].trim().parse::<f64>().ok(),
                _ => {}
            }
        }

        let Some(start) = start else {
            debug!("Skipping timed-text element without a valid start: {}", attributes.trim());
            continue;
        };

        let text = decode_entities(&decode_entities(raw_text));
        let text = TAG_REGEX.replace_all(&text, "").into_owned();

        match SubtitleEntry::new_validated(start, duration.unwrap_or(0.0), text) {
            Ok(entry) => entries.push(entry),
            Err(e) => debug!("Skipping timed-text element: {}", e),
        }
    }

    Ok(SubtitleTrack::new(language, entries))
}

/// Decode XML/HTML character references
pub fn decode_entities(text: &str) -> String {
    ENTITY_REGEX.replace_all(text, |caps: &Captures| {
        let entity = &caps[1];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ => {
                let number = entity.trim_start_matches('#');
                let code = match number.strip_prefix(['x', 'X']) {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => number.parse::<u32>().ok(),
                };
                code.and_then(char::from_u32)
            }
        };
        decoded.map_or_else(|| caps[0].to_string(), |c| c.to_string())
    }).into_owned()
}
