/// Structured logging for threshold classification.
///
/// Wires `tracing` to a console (and optionally file) subscriber, and maps
/// rule failures to a log severity: a rule that is merely unfinished
/// (no operator chosen yet) is routine, a threshold that cannot be parsed
/// is a configuration bug someone should see.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

use crate::error::ComparisonError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl LogLevel {
    /// Parses `debug`, `info`, `warn`/`warning` or `error`, ignoring case.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warning),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected - the rule is incomplete or the reading is not there yet
    Expected,
    /// Unexpected - the configuration is broken and the rule can never match
    Unexpected,
    /// Unknown - the value itself had an unusable shape
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

pub fn classify_comparison_failure(err: &ComparisonError) -> FailureType {
    match err {
        ComparisonError::UnknownOperator | ComparisonError::MissingObserved => {
            FailureType::Expected
        }
        ComparisonError::MalformedThreshold { .. } => FailureType::Unexpected,
        ComparisonError::NonNumericObserved { .. } => FailureType::Unknown,
    }
}

// ---------------------------------------------------------------------------
// Subscriber setup
// ---------------------------------------------------------------------------

/// Timestamps in the same shape the service logs have always used.
struct UtcTimestamp;

impl FormatTime for UtcTimestamp {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"))
    }
}

/// Installs the global subscriber.
///
/// With `log_file` set, events are appended to that file instead of the
/// console. Calling this again after a subscriber is installed is a no-op.
pub fn init_logger(
    min_level: LogLevel,
    log_file: Option<&str>,
    console_timestamps: bool,
) -> std::io::Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_max_level(min_level.filter())
        .with_target(false);

    let installed = match (log_file, console_timestamps) {
        (Some(path), _) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_timer(UtcTimestamp)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        (None, true) => builder.with_timer(UtcTimestamp).try_init(),
        (None, false) => builder.without_time().try_init(),
    };

    if installed.is_err() {
        tracing::debug!("logger already initialized; keeping existing subscriber");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Structured rule logging
// ---------------------------------------------------------------------------

/// Logs a rule that can never match, at a level chosen by its failure type.
pub fn log_rule_issue(rule_set_id: &str, index: usize, err: &ComparisonError) {
    let failure_type = classify_comparison_failure(err);
    match failure_type {
        FailureType::Expected => {
            tracing::debug!(rule_set = rule_set_id, index, %failure_type, "rule skipped: {}", err)
        }
        FailureType::Unexpected => {
            tracing::warn!(rule_set = rule_set_id, index, %failure_type, "rule skipped: {}", err)
        }
        FailureType::Unknown => {
            tracing::info!(rule_set = rule_set_id, index, %failure_type, "rule skipped: {}", err)
        }
    }
}

/// Logs a summary after auditing a rule set.
pub fn log_audit_summary(rule_set_id: &str, total: usize, malformed: usize) {
    if malformed == 0 {
        tracing::info!(rule_set = rule_set_id, total, "all {} rules usable", total);
    } else if malformed == total {
        tracing::error!(
            rule_set = rule_set_id,
            total,
            malformed,
            "no usable rules: {}/{} malformed",
            malformed,
            total
        );
    } else {
        tracing::warn!(
            rule_set = rule_set_id,
            total,
            malformed,
            "{}/{} rules malformed",
            malformed,
            total
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Operator;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::parse("WARN"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::parse(" debug "), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("loud"), None);
    }

    #[test]
    fn test_failure_classification() {
        assert_eq!(
            classify_comparison_failure(&ComparisonError::UnknownOperator),
            FailureType::Expected
        );
        let malformed = ComparisonError::MalformedThreshold {
            operator: Operator::Between,
            threshold: "10".to_string(),
        };
        assert_eq!(classify_comparison_failure(&malformed), FailureType::Unexpected);
        let odd_value = ComparisonError::NonNumericObserved {
            observed: "on".to_string(),
        };
        assert_eq!(classify_comparison_failure(&odd_value), FailureType::Unknown);
    }

    #[test]
    fn test_file_logger_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classifier.log");
        init_logger(LogLevel::Info, path.to_str(), true).expect("log file should open");
        assert!(path.exists());
    }
}
