use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Source of raw configuration values, keyed by env var name.
trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

impl<F> EnvSource for F
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        self(key)
    }
}

fn env_opt(src: &dyn EnvSource, key: &str) -> Option<String> {
    src.get(key).filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(src: &dyn EnvSource, profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(src, &prefixed) {
            return Some(v);
        }
    }
    env_opt(src, key)
}

fn profiled_env_or(src: &dyn EnvSource, profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(src, profile, key).unwrap_or_else(|| default.to_string())
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvdsConfig {
    /// Active profile name (empty = default).
    pub profile: String,
    pub rules: RulesConfig,
    pub storage: StorageConfig,
    pub log: LogConfig,
}

impl SvdsConfig {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `SVDS_PROFILE`. When set (e.g. `LAB`), every key
    /// is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_opt(&ProcessEnv, "SVDS_PROFILE").unwrap_or_default();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        Self::from_source(&ProcessEnv, profile)
    }

    fn from_source(src: &dyn EnvSource, profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            rules: RulesConfig::from_env_profiled(src, p),
            storage: StorageConfig::from_env_profiled(src, p),
            log: LogConfig::from_env_profiled(src, p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  rules:   dir={}", self.rules.rules_dir.display());
        tracing::info!("  storage: data_dir={}", self.storage.data_dir.display());
        tracing::info!("  log:     filter={}", self.log.filter);
    }

    /// Return the config as a JSON object for `--show-config` style output.
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "rules": { "rules_dir": self.rules.rules_dir },
            "storage": { "data_dir": self.storage.data_dir },
            "log": { "filter": self.log.filter },
        })
    }
}

// ── Rules ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Directory holding the four rule documents.
    pub rules_dir: PathBuf,
}

impl RulesConfig {
    fn from_env_profiled(src: &dyn EnvSource, p: &str) -> Self {
        Self {
            rules_dir: PathBuf::from(profiled_env_or(src, p, "SVDS_RULES_DIR", "data/rules")),
        }
    }
}

// ── Storage ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Default SVDS directory when none is given on the command line.
    pub data_dir: PathBuf,
}

impl StorageConfig {
    fn from_env_profiled(src: &dyn EnvSource, p: &str) -> Self {
        Self {
            data_dir: PathBuf::from(profiled_env_or(src, p, "SVDS_DATA_DIR", "data/samples")),
        }
    }
}

// ── Logging ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl LogConfig {
    fn from_env_profiled(src: &dyn EnvSource, p: &str) -> Self {
        Self {
            filter: profiled_env_or(src, p, "SVDS_LOG", "warn"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = SvdsConfig::from_source(&source(&[]), "");
        assert_eq!(cfg.profile_label(), "default");
        assert_eq!(cfg.rules.rules_dir, PathBuf::from("data/rules"));
        assert_eq!(cfg.storage.data_dir, PathBuf::from("data/samples"));
        assert_eq!(cfg.log.filter, "warn");
    }

    #[test]
    fn profile_prefix_wins_over_plain_key() {
        let src = source(&[
            ("SVDS_RULES_DIR", "/etc/svds/rules"),
            ("LAB_SVDS_RULES_DIR", "/lab/rules"),
            ("SVDS_LOG", "debug"),
        ]);
        let cfg = SvdsConfig::from_source(&src, "lab");
        assert_eq!(cfg.profile, "LAB");
        assert_eq!(cfg.rules.rules_dir, PathBuf::from("/lab/rules"));
        // No LAB_ override, falls back to the plain key.
        assert_eq!(cfg.log.filter, "debug");
    }

    #[test]
    fn empty_values_are_treated_as_unset() {
        let src = source(&[("SVDS_DATA_DIR", "")]);
        let cfg = SvdsConfig::from_source(&src, "");
        assert_eq!(cfg.storage.data_dir, PathBuf::from("data/samples"));
    }

    #[test]
    fn summary_reports_profile_label() {
        let cfg = SvdsConfig::from_source(&source(&[]), "");
        let summary = cfg.summary();
        assert_eq!(summary["profile"], "default");
        assert_eq!(summary["rules"]["rules_dir"], "data/rules");
    }
}
