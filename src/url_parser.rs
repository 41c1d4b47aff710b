use url::Url;

use crate::errors::AppError;

// @module: Video identifier extraction from YouTube URLs

const SHORT_HOST: &str = "youtu.be";

fn is_youtube_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == "youtube.com" || host.ends_with(".youtube.com") || host == "youtube-nocookie.com" || host.ends_with(".youtube-nocookie.com")
}

/// Parse the string as an absolute URL, adding a scheme when it is missing
fn parse_lenient(input: &str) -> Option<Url> {
    match Url::parse(input) {
        Ok(url) if url.host_str().is_some() => Some(url),
        _ => Url::parse(&format!("https://{}", input)).ok(),
    }
}

/// Extract the video identifier from a YouTube URL.
///
/// Accepted shapes:
/// - `https://youtu.be/<id>`
/// - `https://www.youtube.com/watch?v=<id>`
/// - `https://www.youtube.com/embed/<id>`
///
/// Query strings and fragments are never part of the identifier.
pub fn extract_video_id(input: &str) -> Result<String, AppError> {
    let trimmed = input.trim();
    let invalid = || AppError::InvalidUrl(trimmed.to_string());

    let url = parse_lenient(trimmed).ok_or_else(invalid)?;
    let host = url.host_str().ok_or_else(invalid)?.to_ascii_lowercase();

    let id = if host == SHORT_HOST || host == format!("www.{}", SHORT_HOST) {
        url.path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(str::to_string)
    } else if is_youtube_host(&host) {
        let mut segments = url.path_segments().into_iter().flatten();
        match segments.next() {
            Some("watch") => url.query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            Some("embed") => segments.next().map(str::to_string),
            _ => None,
        }
    } else {
        None
    };

    match id.map(|id| id.trim().to_string()) {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(invalid()),
    }
}
