//! Rule classification.
//!
//! Given an observed value and a rule set, finds the rule that applies and
//! returns its payload, or the caller's default when nothing matches.
//!
//! # Ordering
//! Candidates are scanned by descending rank and the first satisfied rule
//! wins. Rule sets usually encode increasingly severe bands ("warning" at 70,
//! "danger" at 90), so scanning from the highest band down returns the most
//! severe applicable one without the caller pre-sorting or de-overlapping
//! ranges. Rules with equal rank keep the caller's order.
//!
//! # Failure handling
//! A rule whose comparison cannot be decided (unknown operator, malformed
//! threshold, non-numeric or missing value) is a non-match and the scan
//! continues. Nothing here panics or returns an error.

use std::cmp::Ordering;

use crate::error::ComparisonError;
use crate::model::{Observed, Operator, Rule, RuleSet};
use crate::operators::{self, parse_number};

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// The key a rule is sorted by.
///
/// An explicit `rank` always wins. Without one, the rank is the leading
/// number of the threshold: the threshold itself for single-bound operators
/// and the lower bound for `BETWEEN`. Rules with no usable rank sort last.
pub fn effective_rank<P>(rule: &Rule<P>) -> f64 {
    let derived = || {
        let leading = match rule.operator {
            Operator::Between => rule.threshold.split(',').next().unwrap_or_default(),
            _ => rule.threshold.as_str(),
        };
        parse_number(leading)
    };
    rule.rank
        .filter(|r| !r.is_nan())
        .or_else(derived)
        .unwrap_or(f64::NEG_INFINITY)
}

/// Returns the rules in scan order, paired with their position in the input.
/// The input slice is left untouched; only references are reordered.
pub fn scan_order<P>(rules: &[Rule<P>]) -> Vec<(usize, &Rule<P>)> {
    let mut ordered: Vec<(usize, &Rule<P>, f64)> = rules
        .iter()
        .enumerate()
        .map(|(index, rule)| (index, rule, effective_rank(rule)))
        .collect();
    // Stable, so equal ranks preserve the caller's order.
    ordered.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(Ordering::Equal));
    ordered
        .into_iter()
        .map(|(index, rule, _)| (index, rule))
        .collect()
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// The result of evaluating one rule during a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    /// Position of the rule in the caller's slice.
    pub index: usize,
    pub rank: f64,
    pub result: Result<bool, ComparisonError>,
}

impl RuleOutcome {
    pub fn matched(&self) -> bool {
        matches!(self.result, Ok(true))
    }
}

/// A classification together with the outcome of every rule evaluated
/// before the scan stopped.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification<'a, P> {
    pub matched: Option<&'a Rule<P>>,
    pub outcomes: Vec<RuleOutcome>,
}

impl<P> Classification<'_, P> {
    /// Outcomes whose comparison could not be decided.
    pub fn skipped(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }
}

fn scan<'a, P>(
    rules: &'a [Rule<P>],
    observed: &Observed,
    mut on_outcome: impl FnMut(RuleOutcome),
) -> Option<&'a Rule<P>> {
    for (index, rule) in scan_order(rules) {
        let result = operators::evaluate(rule.operator, observed, &rule.threshold);
        if let Err(err) = &result {
            tracing::trace!(index, operator = %rule.operator, error = %err, "rule skipped");
        }
        let matched = matches!(result, Ok(true));
        on_outcome(RuleOutcome {
            index,
            rank: effective_rank(rule),
            result,
        });
        if matched {
            return Some(rule);
        }
    }
    None
}

/// Returns the first rule, in descending rank order, that the observed value
/// satisfies.
pub fn find_matching_rule<'a, P>(
    rules: &'a [Rule<P>],
    observed: impl Into<Observed>,
) -> Option<&'a Rule<P>> {
    if rules.is_empty() {
        return None;
    }
    let observed = observed.into();
    scan(rules, &observed, |_| {})
}

/// Maps an observed value to the payload of the matching rule, or `default`.
///
/// ```
/// use telemetry_thresholds::{classify, Operator, Rule};
///
/// let bands = vec![
///     Rule::new(Operator::GreaterThan, "70", "amber"),
///     Rule::new(Operator::GreaterThan, "90", "red"),
/// ];
/// assert_eq!(classify(&bands, 95.0, "green"), "red");
/// assert_eq!(classify(&bands, 75.0, "green"), "amber");
/// assert_eq!(classify(&bands, 20.0, "green"), "green");
/// ```
pub fn classify<P: Clone>(rules: &[Rule<P>], observed: impl Into<Observed>, default: P) -> P {
    find_matching_rule(rules, observed)
        .map(|rule| rule.payload.clone())
        .unwrap_or(default)
}

/// Same scan as `find_matching_rule`, also reporting every evaluated rule.
pub fn explain<'a, P>(
    rules: &'a [Rule<P>],
    observed: impl Into<Observed>,
) -> Classification<'a, P> {
    let observed = observed.into();
    let mut outcomes = Vec::new();
    let matched = scan(rules, &observed, |outcome| outcomes.push(outcome));
    Classification { matched, outcomes }
}

// ---------------------------------------------------------------------------
// Rule sets
// ---------------------------------------------------------------------------

/// A configuration problem found in a rule, independent of any value.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleIssue {
    pub index: usize,
    pub error: ComparisonError,
}

impl<P> RuleSet<P> {
    pub fn new(id: impl Into<String>, rules: Vec<Rule<P>>) -> Self {
        Self {
            id: id.into(),
            rules,
        }
    }

    pub fn find_match(&self, observed: impl Into<Observed>) -> Option<&Rule<P>> {
        find_matching_rule(&self.rules, observed)
    }

    pub fn classify(&self, observed: impl Into<Observed>, default: P) -> P
    where
        P: Clone,
    {
        classify(&self.rules, observed, default)
    }

    /// Rules that can never match because of how they are configured.
    pub fn audit(&self) -> Vec<RuleIssue> {
        self.rules
            .iter()
            .enumerate()
            .filter_map(|(index, rule)| {
                operators::validate_threshold(rule.operator, &rule.threshold)
                    .err()
                    .map(|error| RuleIssue { index, error })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn band(op: Operator, threshold: &str, payload: &'static str) -> Rule<&'static str> {
        Rule::new(op, threshold, payload)
    }

    #[test]
    fn test_empty_rule_set_returns_default() {
        let rules: Vec<Rule<&str>> = Vec::new();
        assert_eq!(classify(&rules, 42.0, "default"), "default");
        assert!(find_matching_rule(&rules, 42.0).is_none());
    }

    #[test]
    fn test_highest_threshold_wins_among_overlapping_bands() {
        let rules = vec![
            band(Operator::GreaterThanOrEqual, "50", "warning"),
            band(Operator::GreaterThanOrEqual, "80", "danger"),
            band(Operator::GreaterThanOrEqual, "0", "normal"),
        ];
        assert_eq!(classify(&rules, 85.0, "none"), "danger");
        assert_eq!(classify(&rules, 60.0, "none"), "warning");
        assert_eq!(classify(&rules, 10.0, "none"), "normal");
        assert_eq!(classify(&rules, -1.0, "none"), "none");
    }

    #[test]
    fn test_explicit_rank_overrides_threshold_order() {
        let rules = vec![
            band(Operator::LessThan, "100", "low-priority").with_rank(5.0),
            band(Operator::LessThan, "10", "high-priority").with_rank(10.0),
        ];
        assert_eq!(classify(&rules, 3.0, "none"), "high-priority");
    }

    #[test]
    fn test_equal_ranks_keep_caller_order() {
        let rules = vec![
            band(Operator::Equal, "on", "first"),
            band(Operator::Different, "off", "second"),
        ];
        assert_eq!(classify(&rules, "on", "none"), "first");
    }

    #[test]
    fn test_between_rank_falls_back_to_lower_bound() {
        let rule = band(Operator::Between, "10,20", "x");
        assert_eq!(effective_rank(&rule), 10.0);
        let unranked = band(Operator::Equal, "critical", "x");
        assert_eq!(effective_rank(&unranked), f64::NEG_INFINITY);
        let nan_rank = band(Operator::LessThan, "4", "x").with_rank(f64::NAN);
        assert_eq!(effective_rank(&nan_rank), 4.0);
    }

    #[test]
    fn test_malformed_rules_are_skipped_not_fatal() {
        let rules = vec![
            band(Operator::Between, "90", "broken-range").with_rank(100.0),
            band(Operator::Unrecognized, "1", "unknown").with_rank(99.0),
            band(Operator::GreaterThan, "50", "hot"),
        ];
        assert_eq!(classify(&rules, 95.0, "none"), "hot");
    }

    #[test]
    fn test_explain_reports_outcomes_in_scan_order() {
        let rules = vec![
            band(Operator::GreaterThan, "10", "a"),
            band(Operator::Between, "oops", "b").with_rank(50.0),
            band(Operator::GreaterThan, "30", "c"),
        ];
        let result = explain(&rules, 20.0);
        assert_eq!(result.matched.map(|r| r.payload), Some("a"));
        let indexes: Vec<usize> = result.outcomes.iter().map(|o| o.index).collect();
        assert_eq!(indexes, vec![1, 2, 0]);
        assert_eq!(result.skipped().count(), 1);
        assert!(result.outcomes[2].matched());
    }

    #[test]
    fn test_scan_order_does_not_touch_input() {
        let rules = vec![
            band(Operator::GreaterThan, "1", "one"),
            band(Operator::GreaterThan, "3", "three"),
            band(Operator::GreaterThan, "2", "two"),
        ];
        let before = rules.clone();
        let order: Vec<usize> = scan_order(&rules).into_iter().map(|(i, _)| i).collect();
        assert_eq!(order, vec![1, 2, 0]);
        assert_eq!(rules, before);
    }

    #[test]
    fn test_rule_set_audit_lists_dead_rules() {
        let set = RuleSet::new(
            "engine-temp",
            vec![
                band(Operator::GreaterThan, "90", "red"),
                band(Operator::Between, "10", "amber"),
                band(Operator::Unrecognized, "5", "blue"),
            ],
        );
        let issues = set.audit();
        let indexes: Vec<usize> = issues.iter().map(|i| i.index).collect();
        assert_eq!(indexes, vec![1, 2]);
        assert_eq!(issues[1].error, ComparisonError::UnknownOperator);
        assert_eq!(set.classify(95.0, "green"), "red");
        assert_eq!(set.find_match(5.0), None);
    }
}
