//! Layered configuration for folio.
//!
//! Sources, lowest precedence first:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. `folio.toml` in the platform configuration directory.
//! 3. An explicit file passed on the command line.
//! 4. `FOLIO_`-prefixed environment variables, with `__` separating nested
//!    keys (`FOLIO_LOOKUP__TIMEOUT_SECS=10`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APPLICATION: &str = "folio";
const CONFIG_FILE: &str = "folio.toml";
const DATABASE_FILE: &str = "catalog.sqlite";
const ENV_PREFIX: &str = "FOLIO_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the SQLite catalog. Created on first use.
    pub database: PathBuf,
    pub lookup: LookupConfig,
    /// Roll back every write instead of committing it.
    pub dry_run: bool,
}

/// Where and how to reach the bibliographic search service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        let database = project_dirs()
            .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
            .unwrap_or_else(|| PathBuf::from(DATABASE_FILE));
        Self {
            database,
            lookup: LookupConfig::default(),
            dry_run: false,
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: "https://gutendex.com/books/".to_string(),
            timeout_secs: 30,
            user_agent: concat!("folio/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl LookupConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APPLICATION)
}

/// The `folio.toml` in the platform configuration directory, if the platform has one.
pub fn user_config_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

impl Config {
    /// Load and validate configuration from every source.
    ///
    /// An explicit file must exist; the user config file is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::layered(user_config_file(), explicit)
    }

    fn layered(user: Option<PathBuf>, explicit: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(user) = user {
            // Missing files are skipped by the provider.
            figment = figment.merge(Toml::file(user));
        }
        if let Some(path) = explicit {
            if !path.is_file() {
                exn::bail!(ErrorKind::MissingFile(path.to_path_buf()));
            }
            figment = figment.merge(Toml::file_exact(path));
        }
        let config: Config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        tracing::debug!(
            database = %config.database.display(),
            base_url = %config.lookup.base_url,
            dry_run = config.dry_run,
            "configuration loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid("database path must not be empty"));
        }
        if self.lookup.base_url.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("lookup.base_url must not be empty"));
        }
        if self.lookup.timeout_secs == 0 {
            exn::bail!(ErrorKind::Invalid("lookup.timeout_secs must be greater than zero"));
        }
        if self.lookup.user_agent.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("lookup.user_agent must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn toml_file(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.lookup.timeout(), Duration::from_secs(30));
        assert!(config.database.ends_with(DATABASE_FILE));
        assert!(!config.dry_run);
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let file = toml_file(
            r#"
            database = "/tmp/folio-test.sqlite"
            dry_run = true

            [lookup]
            timeout_secs = 5
            "#,
        );
        let config = Config::layered(None, Some(file.path())).unwrap();
        assert_eq!(config.database, PathBuf::from("/tmp/folio-test.sqlite"));
        assert!(config.dry_run);
        assert_eq!(config.lookup.timeout_secs, 5);
        // Untouched keys keep their defaults.
        assert_eq!(config.lookup.base_url, LookupConfig::default().base_url);
    }

    #[test]
    fn test_explicit_file_beats_user_file() {
        let user = toml_file("[lookup]\nbase_url = \"https://user.example/books/\"\ntimeout_secs = 7\n");
        let explicit = toml_file("[lookup]\nbase_url = \"https://explicit.example/books/\"\n");
        let config = Config::layered(Some(user.path().to_path_buf()), Some(explicit.path())).unwrap();
        assert_eq!(config.lookup.base_url, "https://explicit.example/books/");
        assert_eq!(config.lookup.timeout_secs, 7);
    }

    #[test]
    fn test_missing_user_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::layered(Some(dir.path().join(CONFIG_FILE)), None).unwrap();
        assert_eq!(config.lookup, LookupConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let err = Config::layered(None, Some(&path)).unwrap_err();
        assert_eq!(*err, ErrorKind::MissingFile(path));
    }

    #[test]
    fn test_malformed_file_fails_to_load() {
        let file = toml_file("[lookup]\ntimeout_secs = \"soon\"\n");
        let err = Config::layered(None, Some(file.path())).unwrap_err();
        assert_eq!(*err, ErrorKind::Load);
    }

    #[rstest]
    #[case("[lookup]\nbase_url = \"  \"\n")]
    #[case("[lookup]\ntimeout_secs = 0\n")]
    #[case("[lookup]\nuser_agent = \"\"\n")]
    #[case("database = \"\"\n")]
    fn test_invalid_values_are_rejected(#[case] contents: &str) {
        let file = toml_file(contents);
        let err = Config::layered(None, Some(file.path())).unwrap_err();
        assert!(matches!(*err, ErrorKind::Invalid(_)));
    }
}
