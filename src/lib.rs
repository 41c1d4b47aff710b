/*!
 * # ytdualsub - bilingual YouTube subtitle downloader
 *
 * A Rust library that downloads two subtitle tracks of a YouTube video and
 * merges them into one time-aligned, human-readable bilingual transcript.
 *
 * ## Features
 *
 * - Extract video identifiers from short, canonical and embed URLs
 * - Fetch the source-language track, or translate another track into it
 * - Derive the target-language track through the service's translation
 * - Align both tracks on exact start times, keeping every timestamp
 * - Render a plain-text report with `HH:MM:SS` headers
 * - Process a list of URLs sequentially with a fixed delay between videos
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `url_parser`: Video identifier extraction
 * - `transcript`: Caption track retrieval:
 *   - `transcript::fetcher`: Direct/translated track selection policy
 *   - `transcript::youtube`: YouTube HTTP client
 *   - `transcript::mock`: In-memory source for tests
 * - `alignment`: Timestamp alignment of two tracks
 * - `report`: Plain-text rendering of aligned documents
 * - `file_utils`: File system operations and file name sanitizing
 * - `app_controller`: Batch driver
 * - `language_utils`: Language tag utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod url_parser;
pub mod transcript;
pub mod alignment;
pub mod report;
pub mod file_utils;
pub mod app_controller;
pub mod language_utils;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use alignment::{align, AlignedLine, BilingualDocument, Placeholders, SubtitleEntry, SubtitleTrack};
pub use report::{format_time, render, ReportLabels};
pub use url_parser::extract_video_id;
pub use app_controller::{BatchSummary, Controller};
pub use errors::{AppError, ProviderError};
