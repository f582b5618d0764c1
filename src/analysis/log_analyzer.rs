use crate::analysis::patterns::classify_line;
use crate::error::AnalysisError;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Maximum number of entries in [`LogAnalysisResult::top_errors`]
pub const TOP_ERRORS_LIMIT: usize = 5;

/// Severity recognized in a log line
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogSeverity {
    Info,
    Warn,
    Error,
}

impl LogSeverity {
    /// Parse a level token case-insensitively; only INFO, WARN and ERROR are recognized
    pub fn from_level(level: &str) -> Option<Self> {
        match level.to_uppercase().as_str() {
            "INFO" => Some(LogSeverity::Info),
            "WARN" => Some(LogSeverity::Warn),
            "ERROR" => Some(LogSeverity::Error),
            _ => None,
        }
    }
}

/// Per-severity line counts
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeverityCounts {
    #[serde(rename = "INFO")]
    pub info: usize,
    #[serde(rename = "WARN")]
    pub warn: usize,
    #[serde(rename = "ERROR")]
    pub error: usize,
}

impl SeverityCounts {
    fn increment(&mut self, severity: LogSeverity) {
        match severity {
            LogSeverity::Info => self.info += 1,
            LogSeverity::Warn => self.warn += 1,
            LogSeverity::Error => self.error += 1,
        }
    }

    pub fn get(&self, severity: LogSeverity) -> usize {
        match severity {
            LogSeverity::Info => self.info,
            LogSeverity::Warn => self.warn,
            LogSeverity::Error => self.error,
        }
    }
}

/// A distinct error message and how often it occurred
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorFrequency {
    pub message: String,
    pub count: usize,
}

/// Summary of one analyzed log
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LogAnalysisResult {
    /// Non-blank lines, classified or not
    pub total_lines: usize,
    pub counts: SeverityCounts,
    /// Most frequent error messages, highest count first, ties in first-seen order
    pub top_errors: Vec<ErrorFrequency>,
}

/// Stateless log classifier
///
/// Every non-blank line is classified by [`classify_line`]; error messages are
/// tallied by exact text to rank recurring failures.
pub struct LogAnalyzer;

impl LogAnalyzer {
    /// Analyze log text
    ///
    /// # Examples
    ///
    /// ```
    /// use hostwatch::analysis::LogAnalyzer;
    ///
    /// let result = LogAnalyzer::analyze("[ERROR] disk full\n[WARN] low memory\n");
    /// assert_eq!(result.total_lines, 2);
    /// assert_eq!(result.counts.error, 1);
    /// assert_eq!(result.top_errors[0].message, "disk full");
    /// ```
    pub fn analyze(content: &str) -> LogAnalysisResult {
        let mut total_lines = 0;
        let mut counts = SeverityCounts::default();
        // Distinct messages in first-seen order, with an index for lookups
        let mut errors: Vec<ErrorFrequency> = Vec::new();
        let mut error_index: HashMap<&str, usize> = HashMap::new();

        for line in content.lines().filter(|line| !line.trim().is_empty()) {
            total_lines += 1;

            let classification = match classify_line(line) {
                Some(classification) => classification,
                None => continue,
            };
            counts.increment(classification.severity);

            if classification.severity == LogSeverity::Error {
                match error_index.get(classification.message) {
                    Some(&index) => errors[index].count += 1,
                    None => {
                        error_index.insert(classification.message, errors.len());
                        errors.push(ErrorFrequency {
                            message: classification.message.to_string(),
                            count: 1,
                        });
                    }
                }
            }
        }

        // sort_by is stable, so equal counts keep first-seen order
        errors.sort_by(|a, b| b.count.cmp(&a.count));
        errors.truncate(TOP_ERRORS_LIMIT);

        debug!(
            "Analyzed {} lines: {} info, {} warn, {} error",
            total_lines, counts.info, counts.warn, counts.error
        );

        LogAnalysisResult {
            total_lines,
            counts,
            top_errors: errors,
        }
    }

    /// Analyze raw bytes, replacing invalid UTF-8 sequences
    pub fn analyze_bytes(bytes: &[u8]) -> LogAnalysisResult {
        Self::analyze(&String::from_utf8_lossy(bytes))
    }

    /// Read and analyze a log file no larger than `max_bytes`
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::FileTooLarge` if the file exceeds `max_bytes` and
    /// `AnalysisError::IoError` if it cannot be read.
    pub fn analyze_file(path: &Path, max_bytes: u64) -> Result<LogAnalysisResult, AnalysisError> {
        let size = std::fs::metadata(path)?.len();
        if size > max_bytes {
            return Err(AnalysisError::FileTooLarge {
                size,
                limit: max_bytes,
            });
        }

        let bytes = std::fs::read(path)?;
        info!("Analyzing {} ({} bytes)", path.display(), bytes.len());
        Ok(Self::analyze_bytes(&bytes))
    }
}


// Property-based tests
#[cfg(test)]
mod property_tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn build_log(entries: &[(u8, u8)]) -> String {
        entries
            .iter()
            .map(|&(level, message)| {
                let level = match level % 4 {
                    0 => "INFO",
                    1 => "WARN",
                    2 => "ERROR",
                    _ => "TRACE",
                };
                format!("[{}] message {}\n", level, message % 8)
            })
            .collect()
    }

    #[quickcheck]
    fn prop_top_errors_bounded_and_sorted(entries: Vec<(u8, u8)>) -> bool {
        let result = LogAnalyzer::analyze(&build_log(&entries));

        result.top_errors.len() <= TOP_ERRORS_LIMIT
            && result
                .top_errors
                .windows(2)
                .all(|pair| pair[0].count >= pair[1].count)
    }

    #[quickcheck]
    fn prop_counts_never_exceed_total(input: String) -> bool {
        let result = LogAnalyzer::analyze(&input);
        let counts = result.counts;
        counts.info + counts.warn + counts.error <= result.total_lines
            && result.top_errors.iter().map(|e| e.count).sum::<usize>() <= counts.error
    }

    #[quickcheck]
    fn prop_analysis_is_pure(input: String) -> bool {
        LogAnalyzer::analyze(&input) == LogAnalyzer::analyze(&input)
    }

    #[quickcheck]
    fn prop_total_counts_non_blank_lines(entries: Vec<(u8, u8)>) -> bool {
        let mut log = build_log(&entries);
        log.push_str("\n   \n");
        LogAnalyzer::analyze(&log).total_lines == entries.len()
    }
}
