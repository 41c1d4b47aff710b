use anyhow::Result;
use log::{error, warn, info, debug};
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use indicatif::{ProgressBar, ProgressStyle};

use crate::alignment::{align, Placeholders};
use crate::app_config::Config;
use crate::errors::AppError;
use crate::file_utils::{self, FileManager};
use crate::report::{self, ReportLabels};
use crate::transcript::youtube::YoutubeClient;
use crate::transcript::{TitleLookup, TranscriptFetcher, TranscriptSource};
use crate::url_parser;

// @module: Batch driver for bilingual subtitle downloads

/// Name of the skipped-video log written next to the reports
pub const ISSUES_LOG_FILE: &str = "ytdualsub.issues.log";

/// Processing stage of a single video.
///
/// Stages are ordered: a video moves forward one stage at a time and stops
/// at the stage where it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VideoStage {
    Pending,
    Extracting,
    Fetching,
    AligningAndWriting,
    Done,
}

impl fmt::Display for VideoStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Extracting => "extracting id",
            Self::Fetching => "fetching subtitles",
            Self::AligningAndWriting => "aligning and writing",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Result of processing one URL
#[derive(Debug)]
pub struct VideoOutcome {
    /// Last stage entered
    pub stage: VideoStage,
    /// Output path, or why the video was skipped
    pub result: Result<PathBuf, AppError>,
}

impl VideoOutcome {
    /// Whether the upstream service was contacted for this video
    pub fn contacted_service(&self) -> bool {
        self.stage >= VideoStage::Fetching
    }
}

/// A video that did not produce a report
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedVideo {
    pub url: String,
    pub stage: VideoStage,
    pub reason: String,
}

/// Counts of a finished batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    /// URLs attempted
    pub total: usize,
    /// Reports written
    pub succeeded: usize,
    /// Written report paths, in input order
    pub outputs: Vec<PathBuf>,
    /// Videos that were skipped
    pub skipped: Vec<SkippedVideo>,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.succeeded, self.total)
    }
}

/// Main application controller for bilingual subtitle downloads
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Source/target track retrieval
    fetcher: TranscriptFetcher,
    // @field: Display title resolution
    titles: Arc<dyn TitleLookup>,
    // @field: Line prefixes of the reports
    labels: ReportLabels,
}

impl Controller {
    /// Create a controller backed by the YouTube client
    pub fn with_config(config: Config) -> Result<Self> {
        let client = Arc::new(YoutubeClient::new(&config.youtube)?);
        Ok(Self::with_services(config, client.clone(), client))
    }

    /// Create a controller with explicit collaborators
    pub fn with_services(config: Config, source: Arc<dyn TranscriptSource>, titles: Arc<dyn TitleLookup>) -> Self {
        let fetcher = TranscriptFetcher::new(
            source,
            config.source_language.clone(),
            config.target_language.clone(),
        );

        let labels = config.report_labels();

        Self {
            config,
            fetcher,
            titles,
            labels,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the batch, aborting with `AppError::Interrupted` as soon as
    /// `interrupt` completes
    pub async fn run_until<F>(&self, input_file: &Path, interrupt: F) -> Result<BatchSummary, AppError>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            summary = self.run(input_file) => summary,
            _ = interrupt => {
                warn!("Interrupted, stopping the batch");
                Err(AppError::Interrupted)
            }
        }
    }

    /// Process every URL of the input file in order.
    ///
    /// Only an unreadable input file fails the batch; every per-video error
    /// is logged, recorded in the summary and the batch moves on.
    pub async fn run(&self, input_file: &Path) -> Result<BatchSummary, AppError> {
        let start_time = std::time::Instant::now();

        let urls = FileManager::read_url_list(input_file)
            .map_err(|e| AppError::InputFileUnreadable {
                path: input_file.display().to_string(),
                message: format!("{:#}", e),
            })?;

        let mut summary = BatchSummary {
            total: urls.len(),
            ..BatchSummary::default()
        };

        if urls.is_empty() {
            warn!("Input file {:?} contains no URLs", input_file);
            return Ok(summary);
        }

        info!("Found {} video URLs", urls.len());

        if let Err(e) = FileManager::ensure_dir(&self.config.output_dir) {
            error!("{:#}", e);
        } else {
            debug!("Output directory: {}", self.config.output_dir.display());
        }

        let progress_bar = ProgressBar::new(urls.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} videos ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));

        let mut written = HashSet::new();

        for (index, url) in urls.iter().enumerate() {
            progress_bar.set_message(url.clone());
            info!("Processing video {}/{}: {}", index + 1, urls.len(), url);

            let outcome = self.process_video(url, &mut written).await;
            let contacted_service = outcome.contacted_service();

            match outcome.result {
                Ok(path) => {
                    info!("Saved: {}", path.display());
                    summary.succeeded += 1;
                    summary.outputs.push(path);
                }
                Err(e) => {
                    warn!("Skipping {} while {}: {}", url, outcome.stage, e);
                    self.record_issue(url, outcome.stage, &e);
                    summary.skipped.push(SkippedVideo {
                        url: url.clone(),
                        stage: outcome.stage,
                        reason: e.to_string(),
                    });
                }
            }

            progress_bar.inc(1);

            if contacted_service && index + 1 < urls.len() && self.config.request_delay_ms > 0 {
                tokio::time::sleep(self.config.request_delay()).await;
            }
        }

        progress_bar.finish_and_clear();

        info!(
            "Finished in {:.1}s: {} videos downloaded, reports in {}",
            start_time.elapsed().as_secs_f64(),
            summary,
            self.config.output_dir.display()
        );

        Ok(summary)
    }

    /// Run one URL through extraction, fetching, alignment and writing
    pub async fn process_url(&self, url: &str) -> VideoOutcome {
        self.process_video(url, &mut HashSet::new()).await
    }

    /// Process one URL; `written` holds the reports already written by this
    /// batch and is never overwritten
    async fn process_video(&self, url: &str, written: &mut HashSet<PathBuf>) -> VideoOutcome {
        let mut stage = VideoStage::Pending;
        let result = self.advance(url, &mut stage, written).await;
        debug!("{} finished at stage: {}", url, stage);

        VideoOutcome { stage, result }
    }

    async fn advance(&self, url: &str, stage: &mut VideoStage, written: &mut HashSet<PathBuf>) -> Result<PathBuf, AppError> {
        *stage = VideoStage::Extracting;
        let video_id = url_parser::extract_video_id(url)?;
        debug!("Video id: {}", video_id);

        *stage = VideoStage::Fetching;
        let tracks = self.fetcher.fetch_bilingual(&video_id).await?;

        *stage = VideoStage::AligningAndWriting;
        let placeholders = Placeholders::from(&self.config.report);
        let document = align(&tracks.source, &tracks.target, &placeholders);
        let text = report::render(&document, &self.config.report, &self.labels);

        let mut output_path = self.config.output_dir.join(self.output_file_name(&video_id).await);
        if written.contains(&output_path) {
            let unique_path = self.config.output_dir.join(format!("{}.txt", file_utils::fallback_file_stem(&video_id)));
            warn!(
                "{} was already written by this batch, saving {} as {}",
                output_path.display(), url, unique_path.display()
            );
            output_path = unique_path;
        }

        FileManager::write_to_file(&output_path, &text)
            .map_err(|e| AppError::FileWriteFailed {
                path: output_path.display().to_string(),
                message: format!("{:#}", e),
            })?;
        written.insert(output_path.clone());

        *stage = VideoStage::Done;
        Ok(output_path)
    }

    /// Report file name for a video: its sanitized title, or `video_<id>`
    pub async fn output_file_name(&self, video_id: &str) -> String {
        let stem = match self.titles.video_title(video_id).await {
            Ok(title) => {
                let sanitized = file_utils::sanitize_filename(&title);
                if sanitized.trim().is_empty() {
                    file_utils::fallback_file_stem(video_id)
                } else {
                    sanitized
                }
            }
            Err(e) => {
                let error = AppError::TitleLookupFailed(e.to_string());
                warn!("{}, using fallback file name", error);
                file_utils::fallback_file_stem(video_id)
            }
        };

        format!("{}.txt", stem)
    }

    /// Append a skipped video to the issues log
    fn record_issue(&self, url: &str, stage: VideoStage, error: &AppError) {
        let log_path = self.config.output_dir.join(ISSUES_LOG_FILE);
        let line = format!("{} - skipped while {}: {}", url, stage, error);

        if let Err(e) = FileManager::append_to_log_file(&log_path, &line) {
            warn!("Failed to write issues log: {:#}", e);
        }
    }
}
