//! Line classification rules for the log analyzer
//!
//! Structured formats are tried in a fixed order and the first one whose level
//! token is recognized wins. Lines that match no structured format fall back to
//! keyword sniffing.

use crate::analysis::log_analyzer::LogSeverity;
use once_cell::sync::Lazy;
use regex::Regex;

/// `[LEVEL] message`
static BRACKETED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[([A-Za-z0-9_]+)\]\s+(.+)$").expect("Invalid bracketed level regex")
});

/// `LEVEL: message`
static COLON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9_]+):\s+(.+)$").expect("Invalid colon level regex")
});

/// `YYYY-MM-DD... [LEVEL] message`
static DATED_BRACKETED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}.*?\[([A-Za-z0-9_]+)\]\s+(.+)$")
        .expect("Invalid dated bracketed level regex")
});

/// `YYYY-MM-DD... LEVEL: message`
static DATED_COLON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}.*?([A-Za-z0-9_]+):\s+(.+)$")
        .expect("Invalid dated colon level regex")
});

/// Structured line layouts, in matching priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineFormat {
    Bracketed,
    Colon,
    DatedBracketed,
    DatedColon,
}

impl LineFormat {
    /// Every format, in the order they are tried
    pub const ORDERED: [LineFormat; 4] = [
        LineFormat::Bracketed,
        LineFormat::Colon,
        LineFormat::DatedBracketed,
        LineFormat::DatedColon,
    ];

    fn regex(&self) -> &'static Regex {
        match self {
            LineFormat::Bracketed => &*BRACKETED,
            LineFormat::Colon => &*COLON,
            LineFormat::DatedBracketed => &*DATED_BRACKETED,
            LineFormat::DatedColon => &*DATED_COLON,
        }
    }

    /// Extract the severity and trimmed message if the line has this layout
    /// and a recognized level token
    pub fn parse<'a>(&self, line: &'a str) -> Option<(LogSeverity, &'a str)> {
        let captures = self.regex().captures(line)?;
        let level = captures.get(1)?.as_str();
        let message = captures.get(2)?.as_str();
        let severity = LogSeverity::from_level(level)?;
        Some((severity, message.trim()))
    }
}

/// How a line was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    Structured(LineFormat),
    /// Keyword found somewhere in the line
    Sniffed,
}

/// A classified line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification<'a> {
    pub severity: LogSeverity,
    pub message: &'a str,
    pub source: MatchSource,
}

/// Keywords sniffed in priority order
const SNIFF_ORDER: [(&str, LogSeverity); 3] = [
    ("ERROR", LogSeverity::Error),
    ("WARN", LogSeverity::Warn),
    ("INFO", LogSeverity::Info),
];

/// Classify one line, or `None` if it carries no recognizable severity
pub fn classify_line(line: &str) -> Option<Classification<'_>> {
    for format in LineFormat::ORDERED {
        if let Some((severity, message)) = format.parse(line) {
            return Some(Classification {
                severity,
                message,
                source: MatchSource::Structured(format),
            });
        }
    }

    let upper = line.to_uppercase();
    SNIFF_ORDER
        .iter()
        .find(|(keyword, _)| upper.contains(keyword))
        .map(|&(_, severity)| Classification {
            severity,
            message: line,
            source: MatchSource::Sniffed,
        })
}
