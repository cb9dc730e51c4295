/// Color bands for gauges and tank charts.
///
/// A gauge carries an optional list of color conditions configured in the
/// chart editor. The fill color for the current reading is the payload of
/// the matching condition, or the theme's primary color when there is no
/// configuration, no reading, or no match.

use crate::classifier::classify;
use crate::model::{Observed, Rule};

/// Picks the fill color for a gauge reading.
pub fn color_for_value(
    conditions: Option<&[Rule<String>]>,
    value: Option<f64>,
    default_color: &str,
) -> String {
    match conditions {
        Some(rules) if !rules.is_empty() => {
            classify(rules, Observed::from(value), default_color.to_string())
        }
        _ => default_color.to_string(),
    }
}
