use crate::alignment::BilingualDocument;
use crate::app_config::ReportConfig;
use crate::language_utils;

// @module: Plain-text rendering of bilingual documents

/// Prefixes of the two lines written under each timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLabels {
    pub source: String,
    pub target: String,
}

impl ReportLabels {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Labels for a language pair: the configured label when set, the
    /// English language name otherwise
    pub fn for_languages(report: &ReportConfig, source_language: &str, target_language: &str) -> Self {
        Self {
            source: report.source_label.clone().unwrap_or_else(|| language_label(source_language)),
            target: report.target_label.clone().unwrap_or_else(|| language_label(target_language)),
        }
    }
}

// Unknown tags are shown as given
fn language_label(tag: &str) -> String {
    language_utils::get_language_name(tag).unwrap_or_else(|_| tag.trim().to_string())
}

/// Render a document as a bilingual report.
///
/// Layout: the header line and a blank line, then for every aligned line a
/// `[HH:MM:SS]` timestamp, the target-language line, the source-language
/// line and a blank separator.
pub fn render(document: &BilingualDocument, report: &ReportConfig, labels: &ReportLabels) -> String {
    let mut output = format!("{}\n\n", report.header);

    for line in document {
        output.push_str(&format!("[{}]\n", format_time(line.timestamp)));
        output.push_str(&format!("{}: {}\n", labels.target, line.target_text));
        output.push_str(&format!("{}: {}\n\n", labels.source, line.source_text));
    }

    output
}

/// Format seconds as `HH:MM:SS`, discarding the fractional part
pub fn format_time(seconds: f64) -> String {
    let total_seconds = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };

    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
