//! Session configuration with TOML file support.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vx_commitment::{ContributionDeriver, DerivationStrategy, MIN_CHAIN_LENGTH};
use vx_oracle::RetryPolicy;
use vx_types::CommitMode;
use vx_utils::LogFormat;

use crate::SessionError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeKind {
    #[default]
    Single,
    Chain,
}

/// How to reach the oracle and how hard to try.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Base URL of an HTTP oracle. Unset means the in-process oracle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

/// Configuration for one session.
///
/// Loaded from TOML via [`SessionConfig::from_toml_file`] or built in code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub mode: ModeKind,

    /// Hashes in the chain, commitment included. Chain mode only.
    #[serde(default = "default_chain_length")]
    pub chain_length: u32,

    /// Defaults to `keyed` in single mode and `chain_link` in chain mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derivation: Option<DerivationStrategy>,

    #[serde(default)]
    pub client_seed: String,

    /// JSON-lines audit log.
    #[serde(default = "default_audit_path")]
    pub audit_path: PathBuf,

    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub oracle: OracleConfig,
}

// ── Defaults ───────────────────────────────────────────────────────────

fn default_chain_length() -> u32 {
    11
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    250
}

fn default_audit_path() -> PathBuf {
    PathBuf::from("vx-audit.jsonl")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_ms: default_timeout_ms(),
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: ModeKind::default(),
            chain_length: default_chain_length(),
            derivation: None,
            client_seed: String::new(),
            audit_path: default_audit_path(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            oracle: OracleConfig::default(),
        }
    }
}

// ── Impl ───────────────────────────────────────────────────────────────

impl OracleConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            timeout: Duration::from_millis(self.timeout_ms),
            max_attempts: self.max_attempts,
            backoff: Duration::from_millis(self.backoff_ms),
        }
    }
}

impl SessionConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| SessionError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, SessionError> {
        let config: Self = toml::from_str(s).map_err(|e| SessionError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("SessionConfig is always serializable to TOML")
    }

    pub fn commit_mode(&self) -> CommitMode {
        match self.mode {
            ModeKind::Single => CommitMode::Single,
            ModeKind::Chain => CommitMode::Chain {
                length: self.chain_length,
            },
        }
    }

    pub fn strategy(&self) -> DerivationStrategy {
        self.derivation.unwrap_or(match self.mode {
            ModeKind::Single => DerivationStrategy::Keyed,
            ModeKind::Chain => DerivationStrategy::ChainLink,
        })
    }

    pub fn deriver(&self) -> ContributionDeriver {
        ContributionDeriver::new(self.strategy(), self.client_seed.clone())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.oracle.retry_policy()
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if self.mode == ModeKind::Chain && self.chain_length < MIN_CHAIN_LENGTH {
            return Err(SessionError::Config(format!(
                "chain_length must be at least {MIN_CHAIN_LENGTH}, got {}",
                self.chain_length
            )));
        }
        match (self.mode, self.strategy()) {
            (ModeKind::Single, DerivationStrategy::Keyed)
            | (ModeKind::Chain, DerivationStrategy::ChainLink) => {}
            (mode, strategy) => {
                return Err(SessionError::Config(format!(
                    "{} derivation cannot be used in {mode:?} mode",
                    strategy.as_str()
                )))
            }
        }
        if self.oracle.max_attempts == 0 {
            return Err(SessionError::Config("oracle.max_attempts must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = SessionConfig::from_toml_str("").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.commit_mode(), CommitMode::Single);
        assert_eq!(config.strategy(), DerivationStrategy::Keyed);
        assert_eq!(config.retry_policy().max_attempts, 3);
    }

    #[test]
    fn chain_section_parses() {
        let config = SessionConfig::from_toml_str(
            r#"
            mode = "chain"
            chain_length = 3
            client_seed = "chicken"
            log_format = "json"

            [oracle]
            url = "http://localhost:8080"
            timeout_ms = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.commit_mode(), CommitMode::Chain { length: 3 });
        assert_eq!(config.strategy(), DerivationStrategy::ChainLink);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.oracle.url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.retry_policy().timeout, Duration::from_millis(500));
        assert_eq!(config.oracle.backoff_ms, 250);
    }

    #[test]
    fn mismatched_strategy_rejected() {
        let err = SessionConfig::from_toml_str(
            r#"
            mode = "single"
            derivation = "chain_link"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::Config(_)));
    }

    #[test]
    fn short_chain_rejected() {
        assert!(SessionConfig::from_toml_str("mode = \"chain\"\nchain_length = 1").is_err());
    }

    #[test]
    fn toml_round_trip() {
        let mut config = SessionConfig::default();
        config.mode = ModeKind::Chain;
        config.client_seed = "abc".into();
        let back = SessionConfig::from_toml_str(&config.to_toml_string()).unwrap();
        assert_eq!(back, config);
    }
}
