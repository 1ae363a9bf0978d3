/// Splits raw log lines into records using a compiled [`LogFormat`].
///
/// Lines that don't fit the format get a second chance against a generic
/// syslog-like shape (`Month Date Time ...: Content`). Lines that fit neither
/// are skipped, never fatal.
use crate::error::{MinerError, Result};
use crate::log_format::{FieldSchema, LogFormat};
use crate::record::LogRecord;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

/// Generic shape tried when a line does not match the caller's format.
pub const FALLBACK_PATTERN: &str =
    r"^(?P<Month>.*?)\s+(?P<Date>.*?)\s+(?P<Time>\S*).*:\s+(?P<Content>.*)$";

pub const FALLBACK_FIELDS: [&str; 4] = ["Month", "Date", "Time", "Content"];

static FALLBACK: Lazy<Regex> =
    Lazy::new(|| Regex::new(FALLBACK_PATTERN).expect("fallback pattern is a valid regex"));

static FALLBACK_SCHEMA: Lazy<FieldSchema> = Lazy::new(|| {
    FALLBACK_FIELDS
        .iter()
        .map(|name| name.to_string())
        .collect::<Vec<_>>()
        .into()
});

/// Why a line never reached the clustering engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Nothing left after trimming
    Blank,
    /// Neither the format nor the fallback pattern matched
    NoMatch { format: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Blank => write!(f, "blank line"),
            SkipReason::NoMatch { format } => {
                write!(f, "matches neither log format {format:?} nor the fallback pattern")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Parsed(LogRecord),
    Skipped(SkipReason),
}

/// A line that was dropped, kept for the end-of-run summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line_number: usize,
    pub line: String,
    pub reason: SkipReason,
}

/// Everything read from one input file
#[derive(Debug, Default)]
pub struct ParsedInput {
    pub records: Vec<LogRecord>,
    pub skipped: Vec<SkippedLine>,
    pub lines_read: usize,
}

pub struct RecordParser {
    format: LogFormat,
}

impl RecordParser {
    pub fn new(format: LogFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> &LogFormat {
        &self.format
    }

    /// Parse one raw line. `line_number` is 1-based and only kept for
    /// diagnostics.
    pub fn parse_line(&self, raw: &str, line_number: usize) -> ParseOutcome {
        let line = raw.trim();
        if line.is_empty() {
            return ParseOutcome::Skipped(SkipReason::Blank);
        }

        if let Some(caps) = self.format.regex().captures(line) {
            return ParseOutcome::Parsed(record_from_captures(
                &caps,
                self.format.fields(),
                line_number,
            ));
        }

        match FALLBACK.captures(line) {
            Some(caps) => {
                tracing::trace!("Line {} parsed with the fallback pattern", line_number);
                ParseOutcome::Parsed(record_from_captures(&caps, &FALLBACK_SCHEMA, line_number))
            }
            None => ParseOutcome::Skipped(SkipReason::NoMatch {
                format: self.format.template().to_string(),
            }),
        }
    }

    /// Parse every line of `reader` in order, collecting skips instead of
    /// stopping on them.
    pub fn parse_reader<R: BufRead>(&self, reader: R) -> std::io::Result<ParsedInput> {
        let mut parsed = ParsedInput::default();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = idx + 1;
            parsed.lines_read += 1;

            match self.parse_line(&line, line_number) {
                ParseOutcome::Parsed(record) => parsed.records.push(record),
                ParseOutcome::Skipped(reason) => {
                    tracing::debug!("Skipping line {}: {}", line_number, reason);
                    parsed.skipped.push(SkippedLine {
                        line_number,
                        line,
                        reason,
                    });
                }
            }
        }

        Ok(parsed)
    }

    pub fn parse_file(&self, path: &Path) -> Result<ParsedInput> {
        let read_error = |source| MinerError::ReadInput {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(read_error)?;
        self.parse_reader(BufReader::new(file)).map_err(read_error)
    }
}

fn record_from_captures(caps: &Captures<'_>, schema: &FieldSchema, line_number: usize) -> LogRecord {
    let values = schema
        .iter()
        .map(|name| {
            caps.name(name)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        })
        .collect();

    LogRecord::new(Arc::clone(schema), values, line_number)
}
