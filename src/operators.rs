//! Operator registry.
//!
//! Maps each operator to a pure comparison function of the form
//! `(observed, configured threshold) -> Result<bool, ComparisonError>`.
//! The registry is a static table; adding an operator means adding one entry
//! to `OPERATOR_REGISTRY` and one variant to `model::Operator`.
//!
//! Comparators never panic. Every failure is reported as a typed
//! `ComparisonError` so callers can tell a malformed threshold from an
//! unknown operator; `matches` collapses all of them to `false`.

use crate::error::ComparisonError;
use crate::model::{Observed, Operator};

/// Signature shared by every registered comparison.
pub type Comparator = fn(&Observed, &str) -> Result<bool, ComparisonError>;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// One registered operator.
pub struct OperatorEntry {
    pub operator: Operator,
    /// Canonical identifier, as written back to configuration.
    pub id: &'static str,
    /// Other identifiers accepted when reading configuration.
    pub aliases: &'static [&'static str],
    pub compare: Comparator,
}

/// Every recognized operator. Identifiers are matched case-insensitively.
pub static OPERATOR_REGISTRY: &[OperatorEntry] = &[
    OperatorEntry {
        operator: Operator::LessThan,
        id: "LESS_THAN",
        aliases: &["<"],
        compare: less_than,
    },
    OperatorEntry {
        operator: Operator::LessThanOrEqual,
        id: "LESS_THAN_OR_EQUAL",
        aliases: &["<="],
        compare: less_than_or_equal,
    },
    OperatorEntry {
        operator: Operator::GreaterThan,
        id: "GREATER_THAN",
        aliases: &["GREAT_THAN", ">"],
        compare: greater_than,
    },
    OperatorEntry {
        operator: Operator::GreaterThanOrEqual,
        id: "GREATER_THAN_OR_EQUAL",
        aliases: &["GREAT_THAN_OR_EQUAL", ">="],
        compare: greater_than_or_equal,
    },
    OperatorEntry {
        operator: Operator::Equal,
        id: "EQUAL",
        aliases: &["==", "="],
        compare: equal,
    },
    OperatorEntry {
        operator: Operator::Different,
        id: "DIFFERENT",
        aliases: &["NOT_EQUAL", "!="],
        compare: different,
    },
    OperatorEntry {
        operator: Operator::Between,
        id: "BETWEEN",
        aliases: &[],
        compare: between,
    },
];

/// Looks up a registry entry by canonical id or alias.
pub fn find_operator(id: &str) -> Option<&'static OperatorEntry> {
    let id = id.trim();
    OPERATOR_REGISTRY.iter().find(|entry| {
        entry.id.eq_ignore_ascii_case(id)
            || entry.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(id))
    })
}

impl Operator {
    /// Resolves an identifier; anything unknown becomes `Unrecognized`.
    pub fn from_id(id: &str) -> Self {
        find_operator(id)
            .map(|entry| entry.operator)
            .unwrap_or(Operator::Unrecognized)
    }

    /// Canonical identifier.
    pub fn id(self) -> &'static str {
        OPERATOR_REGISTRY
            .iter()
            .find(|entry| entry.operator == self)
            .map(|entry| entry.id)
            .unwrap_or("UNRECOGNIZED")
    }
}

/// Returns the comparison function for an operator. `Unrecognized` gets a
/// comparator that always reports `UnknownOperator`.
pub fn comparator_for(operator: Operator) -> Comparator {
    OPERATOR_REGISTRY
        .iter()
        .find(|entry| entry.operator == operator)
        .map(|entry| entry.compare)
        .unwrap_or(unrecognized)
}

/// Evaluates one comparison, reporting why it could not be decided.
pub fn evaluate(
    operator: Operator,
    observed: &Observed,
    threshold: &str,
) -> Result<bool, ComparisonError> {
    comparator_for(operator)(observed, threshold)
}

/// Evaluates one comparison; any failure is a non-match.
pub fn matches(operator: Operator, observed: &Observed, threshold: &str) -> bool {
    evaluate(operator, observed, threshold).unwrap_or(false)
}

/// Checks that a configured threshold has the shape its operator needs,
/// independent of any observed value.
pub fn validate_threshold(operator: Operator, threshold: &str) -> Result<(), ComparisonError> {
    match operator {
        Operator::Unrecognized => Err(ComparisonError::UnknownOperator),
        Operator::Between => parse_range(operator, threshold).map(|_| ()),
        Operator::Equal | Operator::Different => {
            if is_usable_equality_threshold(threshold) {
                Ok(())
            } else {
                Err(malformed(operator, threshold))
            }
        }
        _ => parse_bound(operator, threshold).map(|_| ()),
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parses a single configured number. `NaN` is rejected because it can
/// never take part in a meaningful comparison.
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| !n.is_nan())
}

fn malformed(operator: Operator, threshold: &str) -> ComparisonError {
    ComparisonError::MalformedThreshold {
        operator,
        threshold: threshold.to_string(),
    }
}

/// An equality threshold must be non-blank and must not spell `NaN`.
fn is_usable_equality_threshold(threshold: &str) -> bool {
    let trimmed = threshold.trim();
    !trimmed.is_empty() && !trimmed.parse::<f64>().is_ok_and(|n| n.is_nan())
}

fn parse_bound(operator: Operator, threshold: &str) -> Result<f64, ComparisonError> {
    parse_number(threshold).ok_or_else(|| malformed(operator, threshold))
}

/// Splits a `"min,max"` threshold into exactly two numeric bounds.
fn parse_range(operator: Operator, threshold: &str) -> Result<(f64, f64), ComparisonError> {
    let mut parts = threshold.split(',');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(min), Some(max), None) => match (parse_number(min), parse_number(max)) {
            (Some(min), Some(max)) => Ok((min, max)),
            _ => Err(malformed(operator, threshold)),
        },
        _ => Err(malformed(operator, threshold)),
    }
}

fn observed_number(observed: &Observed) -> Result<f64, ComparisonError> {
    match observed {
        Observed::Missing => Err(ComparisonError::MissingObserved),
        other => other.as_number().ok_or_else(|| ComparisonError::NonNumericObserved {
            observed: other.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Comparators
// ---------------------------------------------------------------------------

fn ordered(
    operator: Operator,
    observed: &Observed,
    threshold: &str,
    holds: fn(f64, f64) -> bool,
) -> Result<bool, ComparisonError> {
    let configured = parse_bound(operator, threshold)?;
    let value = observed_number(observed)?;
    Ok(holds(value, configured))
}

fn less_than(observed: &Observed, threshold: &str) -> Result<bool, ComparisonError> {
    ordered(Operator::LessThan, observed, threshold, |v, t| v < t)
}

fn less_than_or_equal(observed: &Observed, threshold: &str) -> Result<bool, ComparisonError> {
    ordered(Operator::LessThanOrEqual, observed, threshold, |v, t| v <= t)
}

fn greater_than(observed: &Observed, threshold: &str) -> Result<bool, ComparisonError> {
    ordered(Operator::GreaterThan, observed, threshold, |v, t| v > t)
}

fn greater_than_or_equal(observed: &Observed, threshold: &str) -> Result<bool, ComparisonError> {
    ordered(Operator::GreaterThanOrEqual, observed, threshold, |v, t| v >= t)
}

/// Loose equality: numeric when both sides read as numbers, otherwise the
/// trimmed text of both sides is compared. `5`, `"5"` and `"5.0"` are equal.
fn loose_equal(
    operator: Operator,
    observed: &Observed,
    threshold: &str,
) -> Result<bool, ComparisonError> {
    if !is_usable_equality_threshold(threshold) {
        return Err(malformed(operator, threshold));
    }
    match observed {
        Observed::Missing => return Err(ComparisonError::MissingObserved),
        Observed::Number(n) if n.is_nan() => {
            return Err(ComparisonError::NonNumericObserved {
                observed: observed.to_string(),
            });
        }
        _ => {}
    }
    let configured = threshold.trim();
    match (observed.as_number(), parse_number(configured)) {
        (Some(value), Some(configured)) => Ok(value == configured),
        _ => Ok(observed.to_string().trim() == configured),
    }
}

fn equal(observed: &Observed, threshold: &str) -> Result<bool, ComparisonError> {
    loose_equal(Operator::Equal, observed, threshold)
}

fn different(observed: &Observed, threshold: &str) -> Result<bool, ComparisonError> {
    loose_equal(Operator::Different, observed, threshold).map(|eq| !eq)
}

/// Inclusive on both bounds. Bounds are used as written: `"20,10"` never matches.
fn between(observed: &Observed, threshold: &str) -> Result<bool, ComparisonError> {
    let (min, max) = parse_range(Operator::Between, threshold)?;
    let value = observed_number(observed)?;
    Ok(value >= min && value <= max)
}

fn unrecognized(_observed: &Observed, _threshold: &str) -> Result<bool, ComparisonError> {
    Err(ComparisonError::UnknownOperator)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
