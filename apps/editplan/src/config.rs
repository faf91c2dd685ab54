//! # Configuration
//!
//! Optional TOML configuration for the editplan binary.
//!
//! A config file may set the patch output directory. Resolution order for
//! the output directory, strongest first:
//!
//! 1. the `--out-dir` CLI flag
//! 2. `out_dir` in the config file (`--config <FILE>`, or `editplan.toml`
//!    in the working directory if present)
//! 3. `$HOME/scratch`
//!
//! The resolved directory is never created; a missing directory fails at
//! write time, by contract.

use editplan_core::PlanError;
use editplan_core::primitives::DEFAULT_OUT_DIR_LEAF;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when `--config` is not
/// given.
pub const CONFIG_FILE_NAME: &str = "editplan.toml";

/// Parsed configuration file contents.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory receiving `patches.txt` and the patch files.
    pub out_dir: Option<PathBuf>,
}

impl Config {
    /// Load the configuration.
    ///
    /// An explicitly given path must exist and parse; the implicit
    /// `editplan.toml` is optional and its absence yields the default
    /// (empty) configuration.
    pub fn load(explicit: Option<&Path>) -> Result<Self, PlanError> {
        match explicit {
            Some(path) => Self::parse_file(path),
            None => {
                let implicit = Path::new(CONFIG_FILE_NAME);
                if implicit.is_file() {
                    Self::parse_file(implicit)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn parse_file(path: &Path) -> Result<Self, PlanError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PlanError::IoError(format!("cannot read config '{}': {}", path.display(), e))
        })?;
        toml::from_str(&raw).map_err(|e| {
            PlanError::IoError(format!("cannot parse config '{}': {}", path.display(), e))
        })
    }

    /// Resolve the output directory from flag, file and environment.
    pub fn resolve_out_dir(&self, cli_flag: Option<PathBuf>) -> Result<PathBuf, PlanError> {
        if let Some(dir) = cli_flag {
            return Ok(dir);
        }
        if let Some(dir) = &self.out_dir {
            return Ok(dir.clone());
        }
        let home = std::env::var("HOME").map_err(|_| {
            PlanError::IoError(
                "HOME is not set and no output directory was configured".to_string(),
            )
        })?;
        Ok(PathBuf::from(home).join(DEFAULT_OUT_DIR_LEAF))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flag_beats_config_file() {
        let config = Config {
            out_dir: Some(PathBuf::from("/from/config")),
        };
        let resolved = config
            .resolve_out_dir(Some(PathBuf::from("/from/flag")))
            .expect("resolves");
        assert_eq!(resolved, PathBuf::from("/from/flag"));
    }

    #[test]
    fn config_file_beats_home_default() {
        let config = Config {
            out_dir: Some(PathBuf::from("/from/config")),
        };
        let resolved = config.resolve_out_dir(None).expect("resolves");
        assert_eq!(resolved, PathBuf::from("/from/config"));
    }

    #[test]
    fn default_is_scratch_under_home() {
        // only meaningful where HOME is set; the fallback path is covered
        // by the error branch otherwise
        if let Ok(home) = std::env::var("HOME") {
            let resolved = Config::default().resolve_out_dir(None).expect("resolves");
            assert_eq!(resolved, PathBuf::from(home).join("scratch"));
        }
    }

    #[test]
    fn explicit_missing_config_is_fatal() {
        let result = Config::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(PlanError::IoError(_))));
    }

    #[test]
    fn unknown_config_keys_are_rejected() {
        let parsed: Result<Config, _> = toml::from_str("out_dirs = \"/typo\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn minimal_config_parses() {
        let parsed: Config = toml::from_str("out_dir = \"/tmp/patches\"").expect("parses");
        assert_eq!(parsed.out_dir, Some(PathBuf::from("/tmp/patches")));
    }

    #[test]
    fn empty_config_is_default() {
        let parsed: Config = toml::from_str("").expect("parses");
        assert_eq!(parsed, Config::default());
    }
}
