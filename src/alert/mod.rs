//! Consumers of the classifier used by the dashboard views.
//!
//! Submodules:
//! - `gauge`: fill colors for gauges and tank charts.
//! - `thresholds`: sensor min/max limits for the heatmap overlay.
//! - `notifications`: icon, color and toast kind per notification level.

pub mod gauge;
pub mod notifications;
pub mod thresholds;
