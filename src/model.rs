/// Core data types for threshold classification.
///
/// This module defines the shared domain model imported by all other modules:
/// operators, rules, rule sets and observed values. Serde wiring lives here so
/// rule sets can be read straight from dashboard configuration files; the
/// comparison logic itself lives in `operators` and `classifier`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

/// The comparison kind a rule applies to an observed value.
///
/// `Unrecognized` stands in for any identifier the registry does not know,
/// including an absent one. It never matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Operator {
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Equal,
    Different,
    Between,
    #[default]
    Unrecognized,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Operator::Unrecognized => serializer.serialize_none(),
            known => serializer.serialize_str(known.id()),
        }
    }
}

impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .map(|id| Operator::from_id(&id))
            .unwrap_or(Operator::Unrecognized))
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// One configured threshold condition.
///
/// Field aliases accept the naming the dashboard's chart editors persist
/// (`condition`, `value`, `color`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule<P> {
    #[serde(default, alias = "condition")]
    pub operator: Operator,
    /// String-encoded configured value. `BETWEEN` uses `"min,max"`.
    #[serde(default, alias = "value", deserialize_with = "deserialize_threshold")]
    pub threshold: String,
    /// Tie-break key among simultaneously matching rules, higher wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<f64>,
    #[serde(alias = "color")]
    pub payload: P,
}

impl<P> Rule<P> {
    pub fn new(operator: Operator, threshold: impl Into<String>, payload: P) -> Self {
        Self {
            operator,
            threshold: threshold.into(),
            rank: None,
            payload,
        }
    }

    pub fn with_rank(mut self, rank: f64) -> Self {
        self.rank = Some(rank);
        self
    }
}

/// An ordered collection of rules belonging to one caller context
/// (one sensor, one gauge, one notification channel).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet<P> {
    pub id: String,
    #[serde(default = "Vec::new")]
    pub rules: Vec<Rule<P>>,
}

/// Thresholds as they appear in configuration files: quoted strings, bare
/// numbers, or a `[min, max]` pair for ranges.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawThreshold {
    Text(String),
    Number(f64),
    Range(Vec<f64>),
}

fn deserialize_threshold<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let raw = Option::<RawThreshold>::deserialize(deserializer)?;
    Ok(match raw {
        None => String::new(),
        Some(RawThreshold::Text(text)) => text,
        Some(RawThreshold::Number(n)) => n.to_string(),
        Some(RawThreshold::Range(bounds)) => bounds
            .iter()
            .map(|b| b.to_string())
            .collect::<Vec<_>>()
            .join(","),
    })
}

// ---------------------------------------------------------------------------
// Observed values
// ---------------------------------------------------------------------------

/// A live value handed to the classifier.
///
/// Telemetry readings arrive as numbers, but notification levels and some
/// sensor states are strings, and a reading may simply be missing.
#[derive(Debug, Clone, PartialEq)]
pub enum Observed {
    Number(f64),
    Text(String),
    Missing,
}

impl Observed {
    /// Numeric view of the value. Text is parsed after trimming; `NaN` and
    /// missing values have no numeric view.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Observed::Number(n) if !n.is_nan() => Some(*n),
            Observed::Number(_) | Observed::Missing => None,
            Observed::Text(text) => text.trim().parse::<f64>().ok().filter(|n| !n.is_nan()),
        }
    }
}

impl fmt::Display for Observed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observed::Number(n) => write!(f, "{}", n),
            Observed::Text(text) => write!(f, "{}", text),
            Observed::Missing => Ok(()),
        }
    }
}

impl From<f64> for Observed {
    fn from(value: f64) -> Self {
        Observed::Number(value)
    }
}

impl From<f32> for Observed {
    fn from(value: f32) -> Self {
        Observed::Number(f64::from(value))
    }
}

impl From<i32> for Observed {
    fn from(value: i32) -> Self {
        Observed::Number(f64::from(value))
    }
}

impl From<i64> for Observed {
    fn from(value: i64) -> Self {
        Observed::Number(value as f64)
    }
}

impl From<u32> for Observed {
    fn from(value: u32) -> Self {
        Observed::Number(f64::from(value))
    }
}

impl From<&str> for Observed {
    fn from(value: &str) -> Self {
        Observed::Text(value.to_string())
    }
}

impl From<String> for Observed {
    fn from(value: String) -> Self {
        Observed::Text(value)
    }
}

impl<T: Into<Observed>> From<Option<T>> for Observed {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Observed::Missing)
    }
}

impl From<&Observed> for Observed {
    fn from(value: &Observed) -> Self {
        value.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
