use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .pr-review.toml.
///
/// All fields are optional — every tool works with zero config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// GitHub-specific settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Review-policy settings consumed by submit-review
    #[serde(default)]
    pub policy: PolicyConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// Repository used when a PR is referenced by bare number.
    /// If None, falls back to the GH_REPO env var.
    pub default_repo: Option<String>,

    /// Path to the GitHub CLI binary. Defaults to `gh` on PATH.
    pub gh_path: Option<String>,
}

/// Review categories the submitter accepts. The defaults mirror the
/// reviewing collaborator's brief: surface bugs, security, performance and
/// breaking changes; leave style and nits alone. The predicates gate
/// submission only; triage judgment stays with the reviewer.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Categories accepted for submission. Empty means any non-excluded
    /// category is accepted.
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Categories refused outright. Exclusion wins over inclusion.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

fn default_include() -> Vec<String> {
    vec![
        "bug".to_string(),
        "security".to_string(),
        "performance".to_string(),
        "breaking-change".to_string(),
    ]
}

fn default_exclude() -> Vec<String> {
    vec!["style".to_string(), "nit".to_string()]
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig {
            include: default_include(),
            exclude: default_exclude(),
        }
    }
}

impl PolicyConfig {
    /// Whether a comment tagged with `category` may be submitted.
    /// Matching is case-insensitive.
    pub fn allows(&self, category: &str) -> bool {
        if self.exclude.iter().any(|c| c.eq_ignore_ascii_case(category)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|c| c.eq_ignore_ascii_case(category))
    }
}

impl Config {
    /// Load configuration from .pr-review.toml in the current directory.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(".pr-review.toml");
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Resolve the default repository slug for bare-number references:
    /// config file value takes precedence, falls back to the GH_REPO env var.
    pub fn default_repo(&self) -> Option<String> {
        self.github
            .default_repo
            .clone()
            .or_else(|| std::env::var("GH_REPO").ok())
    }

    /// GitHub CLI binary to invoke, overridable for non-standard installs.
    pub fn gh_path(&self) -> String {
        self.github.gh_path.clone().unwrap_or_else(|| "gh".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.github.default_repo.is_none());
        assert_eq!(config.gh_path(), "gh");
        assert_eq!(config.policy.include.len(), 4);
        assert_eq!(config.policy.exclude.len(), 2);
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[github]
default_repo = "org/repo"
gh_path = "/opt/gh/bin/gh"

[policy]
include = ["security"]
exclude = []
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.github.default_repo.as_deref(), Some("org/repo"));
        assert_eq!(config.gh_path(), "/opt/gh/bin/gh");
        assert_eq!(config.policy.include, vec!["security"]);
        assert!(config.policy.exclude.is_empty());
    }

    #[test]
    fn test_policy_defaults_apply_per_field() {
        let config: Config = toml::from_str("[policy]\ninclude = [\"bug\"]\n").unwrap();
        // exclude keeps its default when only include is overridden
        assert_eq!(config.policy.include, vec!["bug"]);
        assert_eq!(config.policy.exclude, vec!["style", "nit"]);
    }

    #[test]
    fn test_policy_allows_default_categories() {
        let policy = PolicyConfig::default();
        assert!(policy.allows("bug"));
        assert!(policy.allows("Security"));
        assert!(policy.allows("breaking-change"));
        assert!(!policy.allows("style"));
        assert!(!policy.allows("NIT"));
        // not excluded, but not on the include list either
        assert!(!policy.allows("question"));
    }

    #[test]
    fn test_policy_exclusion_wins() {
        let policy = PolicyConfig {
            include: vec!["style".to_string()],
            exclude: vec!["style".to_string()],
        };
        assert!(!policy.allows("style"));
    }

    #[test]
    fn test_policy_empty_include_admits_non_excluded() {
        let policy = PolicyConfig {
            include: vec![],
            exclude: vec!["nit".to_string()],
        };
        assert!(policy.allows("anything"));
        assert!(!policy.allows("nit"));
    }
}
