//! Threshold condition classification for telemetry dashboards.
//!
//! A live reading is tested against a sensor's configured rules (less-than,
//! between, equal, ...) and the payload of the most severe matching rule,
//! typically a color or a severity label, is returned. Gauges, the heatmap
//! alert overlay and notification styling all go through the same
//! `classify` call.
//!
//! Modules:
//! - `model`: rules, operators, observed values.
//! - `operators`: the operator registry and comparison functions.
//! - `classifier`: rank ordering and first-match classification.
//! - `alert`: the dashboard-facing consumers.
//! - `config`: rule catalog files and environment settings.
//! - `logging`: subscriber setup and rule-failure logging.

pub mod alert;
pub mod classifier;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod operators;

pub use classifier::{classify, explain, find_matching_rule, Classification, RuleOutcome};
pub use error::{ComparisonError, ConfigError};
pub use model::{Observed, Operator, Rule, RuleSet};
