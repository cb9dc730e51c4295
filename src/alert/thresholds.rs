//! Sensor min/max threshold checking.
//!
//! Backs the heatmap alert overlay and the sensor history chart: each sensor
//! may have a configured minimum and/or maximum, a reading outside them is
//! flagged, and the chart draws a dashed mark line at every configured limit.

use serde::{Deserialize, Serialize};

use crate::classifier::classify;
use crate::error::ConfigError;
use crate::model::{Observed, Operator, Rule};

/// Where a reading sits relative to its sensor's limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitStatus {
    Normal,
    BelowMin,
    AboveMax,
}

/// Configured limits for one sensor. Either side may be unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorLimits {
    #[serde(alias = "idSensor")]
    pub sensor_id: String,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkLineKind {
    Min,
    Max,
}

/// A horizontal line a chart should draw at a configured limit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkLine {
    pub kind: MarkLineKind,
    pub value: f64,
}

impl SensorLimits {
    pub fn new(sensor_id: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            min,
            max,
        }
    }

    fn valid_min(&self) -> Option<f64> {
        self.min.filter(|v| v.is_finite())
    }

    fn valid_max(&self) -> Option<f64> {
        self.max.filter(|v| v.is_finite())
    }

    /// A minimum above the maximum cannot be saved.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (self.valid_min(), self.valid_max()) {
            (Some(min), Some(max)) if min > max => Err(ConfigError::InvalidLimits {
                sensor_id: self.sensor_id.clone(),
                min,
                max,
            }),
            _ => Ok(()),
        }
    }

    /// Expresses the limits as classifier rules. Exceeding the maximum
    /// outranks falling below the minimum.
    pub fn to_rules(&self) -> Vec<Rule<LimitStatus>> {
        let mut rules = Vec::with_capacity(2);
        if let Some(max) = self.valid_max() {
            rules.push(
                Rule::new(Operator::GreaterThan, max.to_string(), LimitStatus::AboveMax)
                    .with_rank(1.0),
            );
        }
        if let Some(min) = self.valid_min() {
            rules.push(
                Rule::new(Operator::LessThan, min.to_string(), LimitStatus::BelowMin)
                    .with_rank(0.0),
            );
        }
        rules
    }

    /// Classifies a reading. A missing reading is `Normal`.
    pub fn status(&self, value: impl Into<Observed>) -> LimitStatus {
        classify(&self.to_rules(), value, LimitStatus::Normal)
    }

    /// Lines for every configured, finite limit: min first, then max.
    pub fn mark_lines(&self) -> Vec<MarkLine> {
        let min = self.valid_min().map(|value| MarkLine {
            kind: MarkLineKind::Min,
            value,
        });
        let max = self.valid_max().map(|value| MarkLine {
            kind: MarkLineKind::Max,
            value,
        });
        min.into_iter().chain(max).collect()
    }
}

/// Validates a batch of limits before saving; reports the first invalid one.
pub fn validate_all(limits: &[SensorLimits]) -> Result<(), ConfigError> {
    limits.iter().try_for_each(SensorLimits::validate)
}
