//! Rule catalog loading and runtime configuration.
//!
//! A rule catalog is the set of rule sets configured for a deployment, one
//! per sensor or gauge, kept in a TOML or JSON file:
//!
//! ```toml
//! [[rule_sets]]
//! id = "engine-temp"
//!
//! [[rule_sets.rules]]
//! operator = "GREATER_THAN"
//! threshold = "90"
//! payload = "#ff3d71"
//! ```
//!
//! Catalogs are audited once on load so broken rules show up in the log at
//! startup rather than silently on every classification.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::logging::{self, LogLevel};
use crate::model::RuleSet;

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

pub const ENV_RULES_PATH: &str = "THRESHOLD_RULES_PATH";
pub const ENV_LOG_LEVEL: &str = "THRESHOLD_LOG_LEVEL";
pub const ENV_LOG_FILE: &str = "THRESHOLD_LOG_FILE";
pub const ENV_LOG_TIMESTAMPS: &str = "THRESHOLD_LOG_TIMESTAMPS";

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    pub rules_path: Option<PathBuf>,
    pub log_level: LogLevel,
    pub log_file: Option<String>,
    pub console_timestamps: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            rules_path: None,
            log_level: LogLevel::Info,
            log_file: None,
            console_timestamps: false,
        }
    }
}

impl ClassifierConfig {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Unparseable values
    /// fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            rules_path: non_empty(ENV_RULES_PATH).map(PathBuf::from),
            log_level: non_empty(ENV_LOG_LEVEL)
                .and_then(|v| LogLevel::parse(&v))
                .unwrap_or(defaults.log_level),
            log_file: non_empty(ENV_LOG_FILE),
            console_timestamps: non_empty(ENV_LOG_TIMESTAMPS)
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.console_timestamps),
        }
    }

    pub fn init_logging(&self) -> std::io::Result<()> {
        logging::init_logger(self.log_level, self.log_file.as_deref(), self.console_timestamps)
    }
}

// ---------------------------------------------------------------------------
// Rule catalogs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCatalog<P> {
    #[serde(default = "Vec::new")]
    pub rule_sets: Vec<RuleSet<P>>,
}

impl<P> RuleCatalog<P> {
    pub fn find(&self, id: &str) -> Option<&RuleSet<P>> {
        self.rule_sets.iter().find(|set| set.id == id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.rule_sets.iter().map(|set| set.id.as_str()).collect()
    }

    fn check_unique_ids(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for set in &self.rule_sets {
            if !seen.insert(set.id.as_str()) {
                return Err(ConfigError::DuplicateRuleSet(set.id.clone()));
            }
        }
        Ok(())
    }

    /// Logs every rule that can never match, plus a summary per rule set.
    /// Returns the number of unusable rules found.
    pub fn audit(&self) -> usize {
        let mut malformed = 0;
        for set in &self.rule_sets {
            let issues = set.audit();
            for issue in &issues {
                logging::log_rule_issue(&set.id, issue.index, &issue.error);
            }
            logging::log_audit_summary(&set.id, set.rules.len(), issues.len());
            malformed += issues.len();
        }
        malformed
    }
}

pub fn parse_toml<P: DeserializeOwned>(text: &str) -> Result<RuleCatalog<P>, ConfigError> {
    let catalog: RuleCatalog<P> = toml::from_str(text)?;
    catalog.check_unique_ids()?;
    Ok(catalog)
}

pub fn parse_json<P: DeserializeOwned>(text: &str) -> Result<RuleCatalog<P>, ConfigError> {
    let catalog: RuleCatalog<P> = serde_json::from_str(text)?;
    catalog.check_unique_ids()?;
    Ok(catalog)
}

/// Loads a catalog from a `.toml` or `.json` file and audits it.
pub fn load_rule_catalog<P: DeserializeOwned>(
    path: impl AsRef<Path>,
) -> Result<RuleCatalog<P>, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let catalog = match extension.as_str() {
        "toml" => parse_toml(&text)?,
        "json" => parse_json(&text)?,
        "" => {
            return Err(ConfigError::UnsupportedFormat(format!(
                "no extension on {}",
                path.display()
            )));
        }
        other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
    };

    tracing::info!(
        path = %path.display(),
        rule_sets = catalog.rule_sets.len(),
        "rule catalog loaded"
    );
    catalog.audit();
    Ok(catalog)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Operator;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults_when_environment_is_empty() {
        let config = ClassifierConfig::from_lookup(|_| None);
        assert_eq!(config, ClassifierConfig::default());
    }

    #[test]
    fn test_config_reads_all_keys() {
        let config = ClassifierConfig::from_lookup(lookup_from(&[
            (ENV_RULES_PATH, "rules/fleet_rules.toml"),
            (ENV_LOG_LEVEL, "debug"),
            (ENV_LOG_FILE, "/tmp/thresholds.log"),
            (ENV_LOG_TIMESTAMPS, "true"),
        ]));
        assert_eq!(config.rules_path, Some(PathBuf::from("rules/fleet_rules.toml")));
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.log_file.as_deref(), Some("/tmp/thresholds.log"));
        assert!(config.console_timestamps);
    }

    #[test]
    fn test_config_ignores_blank_and_invalid_values() {
        let config = ClassifierConfig::from_lookup(lookup_from(&[
            (ENV_RULES_PATH, "  "),
            (ENV_LOG_LEVEL, "verbose"),
        ]));
        assert_eq!(config.rules_path, None);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_parse_toml_catalog() {
        let catalog: RuleCatalog<String> = parse_toml(
            r##"
            [[rule_sets]]
            id = "fuel-level"

            [[rule_sets.rules]]
            operator = "LESS_THAN"
            threshold = 15
            payload = "#ff3d71"

            [[rule_sets.rules]]
            operator = "BETWEEN"
            threshold = [15, 40]
            payload = "#ffaa00"
            "##,
        )
        .expect("catalog should parse");
        let set = catalog.find("fuel-level").expect("fuel-level should exist");
        assert_eq!(set.rules.len(), 2);
        assert_eq!(set.rules[0].operator, Operator::LessThan);
        assert_eq!(set.rules[0].threshold, "15");
        assert_eq!(set.rules[1].threshold, "15,40");
        assert_eq!(set.classify(20.0, "none".to_string()), "#ffaa00");
    }

    #[test]
    fn test_parse_json_catalog_with_dashboard_names() {
        let catalog: RuleCatalog<String> = parse_json(
            r##"{ "rule_sets": [ { "id": "rpm", "rules": [
                { "condition": "GREAT_THAN_OR_EQUAL", "value": "1800", "color": "red" }
            ] } ] }"##,
        )
        .unwrap();
        assert_eq!(catalog.ids(), vec!["rpm"]);
        assert_eq!(catalog.find("rpm").unwrap().classify(1800, String::new()), "red");
        assert!(catalog.find("missing").is_none());
    }

    #[test]
    fn test_duplicate_rule_set_ids_are_rejected() {
        let result: Result<RuleCatalog<String>, _> =
            parse_json(r#"{ "rule_sets": [ { "id": "a" }, { "id": "a" } ] }"#);
        assert!(matches!(result, Err(ConfigError::DuplicateRuleSet(id)) if id == "a"));
    }

    #[test]
    fn test_audit_counts_unusable_rules() {
        let catalog: RuleCatalog<String> = parse_json(
            r#"{ "rule_sets": [ { "id": "a", "rules": [
                { "operator": "BETWEEN", "threshold": "10", "payload": "x" },
                { "operator": "EQUAL", "threshold": "10", "payload": "y" },
                { "threshold": "10", "payload": "z" }
            ] } ] }"#,
        )
        .unwrap();
        assert_eq!(catalog.audit(), 2);
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.yaml");
        std::fs::write(&path, "rule_sets: []").unwrap();
        let result: Result<RuleCatalog<String>, _> = load_rule_catalog(&path);
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(ext)) if ext == "yaml"));
    }

    #[test]
    fn test_extensionless_path_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fleet_rules");
        std::fs::write(&path, "rule_sets = []").unwrap();
        let err = load_rule_catalog::<String>(&path).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)), "got: {:?}", err);
        let message = err.to_string();
        assert!(message.contains("no extension"), "got: {}", message);
        assert!(message.contains("fleet_rules"), "got: {}", message);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let result: Result<RuleCatalog<String>, _> = load_rule_catalog("./does/not/exist.toml");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("exist.toml"), "got: {}", err);
    }
}
