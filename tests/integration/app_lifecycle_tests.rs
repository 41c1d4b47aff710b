/*!
 * Tests for controller construction and single-video processing
 */

use anyhow::Result;
use ytdualsub::app_config::Config;
use ytdualsub::app_controller::{BatchSummary, Controller, VideoStage};
use ytdualsub::errors::AppError;
use ytdualsub::transcript::mock::MockTranscriptSource;
use crate::common;

/// Test that the controller can be built with the default configuration
#[test]
fn test_controller_withDefaultConfig_shouldInitialize() -> Result<()> {
    let controller = Controller::with_config(Config::default())?;

    assert_eq!(controller.config().source_language, "en");
    assert_eq!(controller.config().target_language, "zh-Hans");

    Ok(())
}

/// Test that an invalid URL stops at the extraction stage
#[tokio::test]
async fn test_processUrl_withInvalidUrl_shouldStopAtExtraction() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (controller, source) = common::mock_controller(common::test_config(temp_dir.path()), MockTranscriptSource::new());

    let outcome = controller.process_url("https://vimeo.com/12345").await;

    assert_eq!(outcome.stage, VideoStage::Extracting);
    assert!(!outcome.contacted_service());
    assert!(matches!(outcome.result, Err(AppError::InvalidUrl(_))));
    assert_eq!(source.list_calls(), 0);

    Ok(())
}

/// Test that a successful video reaches the final stage
#[tokio::test]
async fn test_processUrl_withValidVideo_shouldReachDone() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = MockTranscriptSource::new()
        .with_track("ok1", "en", false, &[(0.0, "Hello")])
        .with_title("ok1", "Hello World");
    let (controller, _) = common::mock_controller(common::test_config(temp_dir.path()), source);

    let outcome = controller.process_url("https://youtu.be/ok1").await;

    assert_eq!(outcome.stage, VideoStage::Done);
    assert!(outcome.contacted_service());
    assert_eq!(outcome.result?, temp_dir.path().join("Hello World.txt"));

    Ok(())
}

/// Test that the output file name falls back to the id for blank titles
#[test]
fn test_outputFileName_withBlankTitle_shouldUseFallback() {
    let source = MockTranscriptSource::new().with_title("blank", "   ");
    let (controller, _) = common::mock_controller(Config::default(), source);

    let file_name = tokio_test::block_on(controller.output_file_name("blank"));

    assert_eq!(file_name, "video_blank.txt");
}

/// Test that video stages are ordered along the pipeline
#[test]
fn test_videoStage_shouldBeOrdered() {
    assert!(VideoStage::Pending < VideoStage::Extracting);
    assert!(VideoStage::Extracting < VideoStage::Fetching);
    assert!(VideoStage::Fetching < VideoStage::AligningAndWriting);
    assert!(VideoStage::AligningAndWriting < VideoStage::Done);
}

/// Test the summary display format
#[test]
fn test_batchSummary_display_shouldShowSucceededOverTotal() {
    let summary = BatchSummary {
        total: 5,
        succeeded: 3,
        ..BatchSummary::default()
    };

    assert_eq!(summary.to_string(), "3/5");
}
