/*!
 * End-to-end batch tests against the in-memory transcript source
 */

use std::fs;
use anyhow::Result;
use std::time::Duration;
use ytdualsub::app_config::ReportConfig;
use ytdualsub::app_controller::{ISSUES_LOG_FILE, VideoStage};
use ytdualsub::errors::AppError;
use ytdualsub::transcript::mock::MockTranscriptSource;
use crate::common;

/// Test a batch with one valid and one malformed URL
#[tokio::test]
async fn test_run_withOneMalformedUrl_shouldWriteOneReport() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let output_dir = temp_dir.path().join("out");
    let input = common::create_url_list(temp_dir.path(), &[
        "https://youtu.be/abc123",
        "https://example.com/watch?v=nope",
    ])?;

    let source = MockTranscriptSource::new()
        .with_track("abc123", "en", false, &[(0.0, "Hi")])
        .with_translation("abc123", "en", "zh-Hans", &[(0.0, "你好"), (3661.4, "再见")])
        .with_title("abc123", "Greetings");
    let (controller, source) = common::mock_controller(common::test_config(&output_dir), source);

    let summary = controller.run(&input).await?;

    assert_eq!(summary.to_string(), "1/2");
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].stage, VideoStage::Extracting);
    // The malformed URL never reaches the service
    assert_eq!(source.list_calls(), 1);

    let reports = common::list_reports(&output_dir)?;
    assert_eq!(reports, vec![output_dir.join("Greetings.txt")]);

    let report = ReportConfig::default();
    let content = fs::read_to_string(&reports[0])?;
    assert!(content.starts_with(&format!("{}\n\n[00:00:00]\n", report.header)));
    assert!(content.contains(&format!("[01:01:01]\nChinese: 再见\nEnglish: {}\n", report.source_placeholder)));

    let issues = fs::read_to_string(output_dir.join(ISSUES_LOG_FILE))?;
    assert!(issues.contains("https://example.com/watch?v=nope"));

    Ok(())
}

/// Test that titles are sanitized into file names
#[tokio::test]
async fn test_run_withReservedCharactersInTitle_shouldSanitizeFileName() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_url_list(temp_dir.path(), &["https://www.youtube.com/watch?v=vid1"])?;

    let source = MockTranscriptSource::new()
        .with_track("vid1", "en", false, &[(1.0, "One")])
        .with_title("vid1", "Rust: why? / how?");
    let (controller, _) = common::mock_controller(common::test_config(temp_dir.path()), source);

    let summary = controller.run(&input).await?;

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.outputs, vec![temp_dir.path().join("Rust_ why_ _ how_.txt")]);
    assert!(summary.outputs[0].is_file());

    Ok(())
}

/// Test the file name fallback when the title cannot be resolved
#[tokio::test]
async fn test_run_withoutTitle_shouldUseVideoId() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_url_list(temp_dir.path(), &["https://www.youtube.com/embed/xyz789?autoplay=1"])?;

    let source = MockTranscriptSource::new()
        .with_track("xyz789", "en", true, &[(0.0, "auto text")]);
    let (controller, source) = common::mock_controller(common::test_config(temp_dir.path()), source);

    let summary = controller.run(&input).await?;

    assert_eq!(summary.outputs, vec![temp_dir.path().join("video_xyz789.txt")]);
    assert_eq!(source.title_calls(), 1);

    Ok(())
}

/// Test that a video without transcripts is skipped and the batch continues
#[tokio::test]
async fn test_run_withUnavailableTranscript_shouldSkipAndContinue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_url_list(temp_dir.path(), &[
        "https://youtu.be/silent",
        "https://youtu.be/talky",
    ])?;

    let source = MockTranscriptSource::new()
        .with_video("silent")
        .with_track("talky", "en", false, &[(0.0, "Hello")]);
    let (controller, source) = common::mock_controller(common::test_config(temp_dir.path()), source);

    let summary = controller.run(&input).await?;

    assert_eq!(summary.to_string(), "1/2");
    assert_eq!(summary.skipped[0].url, "https://youtu.be/silent");
    assert_eq!(summary.skipped[0].stage, VideoStage::Fetching);
    assert_eq!(source.list_calls(), 2);
    assert_eq!(common::list_reports(temp_dir.path())?, vec![temp_dir.path().join("video_talky.txt")]);

    Ok(())
}

/// Test that blank lines in the input are not counted as videos
#[tokio::test]
async fn test_run_withBlankLines_shouldIgnoreThem() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "links.txt", "\n  https://youtu.be/one  \n\n")?;

    let source = MockTranscriptSource::new().with_track("one", "en", false, &[(0.0, "x")]);
    let (controller, _) = common::mock_controller(common::test_config(temp_dir.path()), source);

    let summary = controller.run(&input).await?;

    assert_eq!(summary.to_string(), "1/1");

    Ok(())
}

/// Test that an empty input file completes without doing anything
#[tokio::test]
async fn test_run_withEmptyInput_shouldReportZeroOfZero() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "links.txt", "")?;
    let (controller, source) = common::mock_controller(common::test_config(temp_dir.path()), MockTranscriptSource::new());

    let summary = controller.run(&input).await?;

    assert_eq!(summary.to_string(), "0/0");
    assert_eq!(source.list_calls(), 0);

    Ok(())
}

/// Test that a missing input file aborts the batch
#[tokio::test]
async fn test_run_withMissingInput_shouldFailFatally() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (controller, _) = common::mock_controller(common::test_config(temp_dir.path()), MockTranscriptSource::new());

    let result = controller.run(&temp_dir.path().join("missing.txt")).await;

    match result {
        Err(error @ AppError::InputFileUnreadable { .. }) => assert!(error.is_fatal()),
        other => panic!("Expected InputFileUnreadable, got {:?}", other),
    }

    Ok(())
}

/// Test that a completed interrupt aborts the batch
#[tokio::test]
async fn test_runUntil_withImmediateInterrupt_shouldReturnInterrupted() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_url_list(temp_dir.path(), &["https://youtu.be/abc", "https://youtu.be/def"])?;

    let mut config = common::test_config(temp_dir.path());
    config.request_delay_ms = 60_000;
    let source = MockTranscriptSource::new()
        .with_track("abc", "en", false, &[(0.0, "a")])
        .with_track("def", "en", false, &[(0.0, "d")]);
    let (controller, _) = common::mock_controller(config, source);

    let result = controller.run_until(&input, async {}).await;

    assert!(matches!(result, Err(AppError::Interrupted)));

    Ok(())
}

/// Test that a pending interrupt lets the batch finish
#[tokio::test]
async fn test_runUntil_withPendingInterrupt_shouldFinishBatch() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_url_list(temp_dir.path(), &["https://youtu.be/abc"])?;

    let source = MockTranscriptSource::new().with_track("abc", "en", false, &[(0.0, "a")]);
    let (controller, _) = common::mock_controller(common::test_config(temp_dir.path()), source);

    let summary = controller.run_until(&input, std::future::pending::<()>()).await?;

    assert_eq!(summary.to_string(), "1/1");

    Ok(())
}

/// Test that report labels follow an overridden target language
#[tokio::test]
async fn test_run_withJapaneseTarget_shouldLabelLinesJapanese() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_url_list(temp_dir.path(), &["https://youtu.be/jp1"])?;

    let mut config = common::test_config(temp_dir.path());
    config.target_language = "ja".to_string();
    let source = MockTranscriptSource::new().with_track("jp1", "en", false, &[(0.0, "Hi")]);
    let (controller, _) = common::mock_controller(config, source);

    let summary = controller.run(&input).await?;

    let content = fs::read_to_string(&summary.outputs[0])?;
    assert!(content.contains("[00:00:00]\nJapanese: [ja] Hi\nEnglish: Hi\n"));
    assert!(!content.contains("Chinese"));

    Ok(())
}

/// Test that a failed write skips the video and the batch continues
#[tokio::test]
async fn test_run_withUnwritableReport_shouldSkipAtWriting() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_url_list(temp_dir.path(), &[
        "https://youtu.be/blocked",
        "https://youtu.be/free",
    ])?;
    // A directory where the first report should go
    fs::create_dir(temp_dir.path().join("Blocked.txt"))?;

    let source = MockTranscriptSource::new()
        .with_track("blocked", "en", false, &[(0.0, "a")])
        .with_title("blocked", "Blocked")
        .with_track("free", "en", false, &[(0.0, "b")])
        .with_title("free", "Free");
    let (controller, _) = common::mock_controller(common::test_config(temp_dir.path()), source);

    let summary = controller.run(&input).await?;

    assert_eq!(summary.to_string(), "1/2");
    assert_eq!(summary.skipped[0].url, "https://youtu.be/blocked");
    assert_eq!(summary.skipped[0].stage, VideoStage::AligningAndWriting);
    assert!(summary.skipped[0].reason.contains("Blocked.txt"));
    assert_eq!(summary.outputs, vec![temp_dir.path().join("Free.txt")]);

    let issues = fs::read_to_string(temp_dir.path().join(ISSUES_LOG_FILE))?;
    assert!(issues.contains("https://youtu.be/blocked"));

    Ok(())
}

/// Test that videos sharing a title do not overwrite each other
#[tokio::test]
async fn test_run_withSameTitleTwice_shouldKeepBothReports() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_url_list(temp_dir.path(), &[
        "https://youtu.be/part1",
        "https://youtu.be/part2",
    ])?;

    let source = MockTranscriptSource::new()
        .with_track("part1", "en", false, &[(0.0, "one")])
        .with_title("part1", "Lecture: Intro")
        .with_track("part2", "en", false, &[(0.0, "two")])
        .with_title("part2", "Lecture? Intro");
    let (controller, _) = common::mock_controller(common::test_config(temp_dir.path()), source);

    let summary = controller.run(&input).await?;

    assert_eq!(summary.to_string(), "2/2");
    assert_eq!(summary.outputs, vec![
        temp_dir.path().join("Lecture_ Intro.txt"),
        temp_dir.path().join("video_part2.txt"),
    ]);
    assert!(fs::read_to_string(&summary.outputs[0])?.contains("English: one"));
    assert!(fs::read_to_string(&summary.outputs[1])?.contains("English: two"));

    Ok(())
}

/// Test that the delay only separates videos that contacted the service
#[tokio::test(start_paused = true)]
async fn test_run_withDelay_shouldPauseOnlyAfterFetchedVideosBeforeTheLast() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_url_list(temp_dir.path(), &[
        "https://youtu.be/first",
        "not a youtube url",
        "https://youtu.be/last",
    ])?;

    let mut config = common::test_config(temp_dir.path());
    config.request_delay_ms = 1000;
    let source = MockTranscriptSource::new()
        .with_track("first", "en", false, &[(0.0, "a")])
        .with_track("last", "en", false, &[(0.0, "b")]);
    let (controller, _) = common::mock_controller(config, source);

    let start = tokio::time::Instant::now();
    let summary = controller.run(&input).await?;
    let elapsed = start.elapsed();

    assert_eq!(summary.to_string(), "2/3");
    // One pause after "first"; none after the malformed URL or the last one
    assert!(elapsed >= Duration::from_millis(1000), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(2000), "elapsed {:?}", elapsed);

    Ok(())
}

/// Test that a fetched video followed by others is always paused after
#[tokio::test(start_paused = true)]
async fn test_run_withDelay_shouldPauseAfterEveryFetchedVideoButTheLast() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_url_list(temp_dir.path(), &[
        "https://youtu.be/one",
        "https://youtu.be/missing",
        "https://youtu.be/three",
    ])?;

    let mut config = common::test_config(temp_dir.path());
    config.request_delay_ms = 500;
    let source = MockTranscriptSource::new()
        .with_track("one", "en", false, &[(0.0, "a")])
        .with_video("missing")
        .with_track("three", "en", false, &[(0.0, "c")]);
    let (controller, _) = common::mock_controller(config, source);

    let start = tokio::time::Instant::now();
    let summary = controller.run(&input).await?;
    let elapsed = start.elapsed();

    // "missing" fails while fetching, so it still counts as contacting the service
    assert_eq!(summary.to_string(), "2/3");
    assert!(elapsed >= Duration::from_millis(1000), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(1500), "elapsed {:?}", elapsed);

    Ok(())
}
