/// Notification severity styling.
///
/// Notifications carry a `level` string (`critical`, `warning`, `info`).
/// The icon, theme color and toast kind for a level come from a small
/// `EQUAL` rule set run through the classifier, so unknown or missing levels
/// fall back to a neutral style the same way an unmatched gauge reading does.

use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::classifier::classify;
use crate::model::{Observed, Operator, Rule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Critical,
    Warning,
    Info,
}

impl NotificationLevel {
    pub const ALL: [NotificationLevel; 3] = [
        NotificationLevel::Critical,
        NotificationLevel::Warning,
        NotificationLevel::Info,
    ];

    pub fn id(self) -> &'static str {
        match self {
            NotificationLevel::Critical => "critical",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Info => "info",
        }
    }
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// How the toast for an incoming notification is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Error,
    Warn,
    Success,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NotificationStyle {
    /// Theme color key.
    pub color: &'static str,
    pub icon: &'static str,
    pub toast: ToastKind,
}

pub const DEFAULT_STYLE: NotificationStyle = NotificationStyle {
    color: "colorBasic600",
    icon: "bell-outline",
    toast: ToastKind::Dark,
};

fn style(level: NotificationLevel) -> NotificationStyle {
    match level {
        NotificationLevel::Critical => NotificationStyle {
            color: "colorDanger500",
            icon: "alert-triangle-outline",
            toast: ToastKind::Error,
        },
        NotificationLevel::Warning => NotificationStyle {
            color: "colorWarning500",
            icon: "alert-circle-outline",
            toast: ToastKind::Warn,
        },
        NotificationLevel::Info => NotificationStyle {
            color: "colorInfo500",
            icon: "info-outline",
            toast: ToastKind::Success,
        },
    }
}

static LEVEL_RULES: LazyLock<Vec<Rule<NotificationStyle>>> = LazyLock::new(|| {
    NotificationLevel::ALL
        .iter()
        .map(|level| Rule::new(Operator::Equal, level.id(), style(*level)))
        .collect()
});

/// Styling for a notification's level. Matching ignores case and
/// surrounding whitespace.
pub fn style_for_level(level: Option<&str>) -> NotificationStyle {
    let observed = level
        .map(|l| Observed::Text(l.trim().to_ascii_lowercase()))
        .unwrap_or(Observed::Missing);
    classify(LEVEL_RULES.as_slice(), observed, DEFAULT_STYLE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_levels_map_to_their_style() {
        for level in NotificationLevel::ALL {
            assert_eq!(style_for_level(Some(level.id())), style(level));
        }
        assert_eq!(style_for_level(Some("critical")).toast, ToastKind::Error);
        assert_eq!(style_for_level(Some("info")).toast, ToastKind::Success);
    }

    #[test]
    fn test_level_matching_ignores_case_and_whitespace() {
        assert_eq!(
            style_for_level(Some("  WARNING ")),
            style(NotificationLevel::Warning)
        );
    }

    #[test]
    fn test_unknown_or_missing_level_uses_default() {
        assert_eq!(style_for_level(Some("debug")), DEFAULT_STYLE);
        assert_eq!(style_for_level(Some("")), DEFAULT_STYLE);
        assert_eq!(style_for_level(None), DEFAULT_STYLE);
    }

    #[test]
    fn test_level_serializes_lowercase() {
        let json = serde_json::to_string(&NotificationLevel::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
    }
}
