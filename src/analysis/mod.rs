//! Log file analysis: per-severity counts and recurring error ranking

pub mod log_analyzer;
pub mod patterns;

pub use log_analyzer::{
    ErrorFrequency, LogAnalysisResult, LogAnalyzer, LogSeverity, SeverityCounts, TOP_ERRORS_LIMIT,
};
pub use patterns::{classify_line, Classification, LineFormat, MatchSource};
