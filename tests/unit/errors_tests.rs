/*!
 * Tests for error types and conversions
 */

use ytdualsub::errors::{ProviderError, AppError};

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 404,
        message: "Not Found".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("404"));
    assert!(display.contains("Not Found"));
}

#[test]
fn test_providerError_rateLimitExceeded_shouldDisplayCorrectly() {
    let error = ProviderError::RateLimitExceeded("captcha".to_string());
    assert!(error.to_string().contains("Rate limit exceeded"));
}

#[test]
fn test_appError_noTranscript_shouldNameVideo() {
    let error = AppError::NoTranscriptAvailable {
        video_id: "abc123".to_string(),
        reason: "video has no subtitle tracks".to_string(),
    };
    let display = error.to_string();
    assert!(display.contains("abc123"));
    assert!(display.contains("no subtitle tracks"));
}

#[test]
fn test_appError_fromProviderError_shouldWrapCorrectly() {
    let app_error: AppError = ProviderError::ConnectionError("Network down".to_string()).into();
    assert!(app_error.to_string().contains("Provider error"));
}

#[test]
fn test_appError_fromIoError_shouldWrapAsFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
    let app_error: AppError = io_error.into();
    let display = format!("{}", app_error);
    assert!(display.contains("File error"));
    assert!(display.contains("File not found"));
}

#[test]
fn test_appError_fromAnyhowError_shouldWrapAsUnknown() {
    let app_error: AppError = anyhow::anyhow!("Something went wrong").into();
    assert!(app_error.to_string().contains("Something went wrong"));
}

#[test]
fn test_appError_isFatal_onlyForInputAndInterrupt() {
    let fatal = [
        AppError::InputFileUnreadable { path: "links.txt".to_string(), message: "missing".to_string() },
        AppError::Interrupted,
    ];
    let recoverable = [
        AppError::InvalidUrl("nope".to_string()),
        AppError::NoTranscriptAvailable { video_id: "x".to_string(), reason: "none".to_string() },
        AppError::TitleLookupFailed("404".to_string()),
        AppError::FileWriteFailed { path: "out.txt".to_string(), message: "denied".to_string() },
    ];

    assert!(fatal.iter().all(AppError::is_fatal));
    assert!(!recoverable.iter().any(AppError::is_fatal));
}
