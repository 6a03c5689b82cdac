//! Configuration loading and validation.
//!
//! Sources are layered with [`figment`], lowest precedence first:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. A TOML file: the path given on the command line, otherwise
//!    `config.toml` in the platform configuration directory (for example
//!    `~/.config/repolang/config.toml`), skipped if it does not exist
//! 3. Environment variables prefixed with `REPOLANG_`, using `__` to nest
//!    (`REPOLANG_GITHUB__TOKEN`, `REPOLANG_ENRICH__WORKERS`)
//!
//! `GITHUB_TOKEN` is honoured when no token was configured by any of the
//! above. Command-line overrides are applied last through
//! [`Config::with_overrides`].

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use repolang_compress::Compression;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "REPOLANG_";
const ENV_TOKEN_FALLBACK: &str = "GITHUB_TOKEN";
/// The search API refuses anything larger.
const MAX_SEARCH_PER_PAGE: u32 = 100;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub github: GithubConfig,
    pub enrich: EnrichConfig,
    pub server: ServerConfig,
    pub log: LogConfig,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub api_url: String,
    pub token: Option<String>,
    pub query: String,
    pub sort: String,
    pub order: String,
    pub per_page: u32,
    /// Upper bound on the number of repositories in the snapshot.
    pub max_repositories: usize,
    pub user_agent: String,
}
impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            token: None,
            query: "stars:>1".to_string(),
            sort: "stars".to_string(),
            order: "desc".to_string(),
            per_page: MAX_SEARCH_PER_PAGE,
            max_repositories: 100,
            user_agent: concat!("repolang/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
impl Debug for GithubConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GithubConfig")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("query", &self.query)
            .field("sort", &self.sort)
            .field("order", &self.order)
            .field("per_page", &self.per_page)
            .field("max_repositories", &self.max_repositories)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
    /// Size of the enrichment worker pool.
    pub workers: usize,
    /// Per-lookup timeout in seconds; `0` waits forever.
    pub timeout_secs: u64,
}
impl Default for EnrichConfig {
    fn default() -> Self {
        Self { workers: 10, timeout_secs: 30 }
    }
}
impl EnrichConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    #[serde(with = "compression")]
    pub compression: Compression,
}
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            compression: Compression::Gzip,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default `tracing` filter directive when `RUST_LOG` is not set.
    pub level: String,
}
impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl Config {
    /// Load and validate configuration from all sources.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path(),
        };
        tracing::debug!(path = ?file, "Loading configuration");
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        let mut config = Self::extract(figment)?;
        if config.github.token.is_none() {
            config.github.token = std::env::var(ENV_TOKEN_FALLBACK).ok().filter(|token| !token.is_empty());
        }
        config.validate()?;
        Ok(config)
    }

    /// `config.toml` inside the platform configuration directory.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "repolang").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    fn extract(figment: Figment) -> Result<Self> {
        figment.extract().or_raise(|| ErrorKind::Load)
    }

    /// Apply command-line overrides, then validate again.
    pub fn with_overrides(mut self, bind: Option<SocketAddr>, workers: Option<usize>) -> Result<Self> {
        if let Some(bind) = bind {
            self.server.bind = bind;
        }
        if let Some(workers) = workers {
            self.enrich.workers = workers;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| exn::Exn::from(ErrorKind::Invalid(msg.to_string()));
        if self.github.token.as_deref().is_none_or(str::is_empty) {
            return Err(invalid("github.token is required (or set GITHUB_TOKEN)"));
        }
        if !(self.github.api_url.starts_with("http://") || self.github.api_url.starts_with("https://")) {
            return Err(invalid("github.api_url must be an http(s) URL"));
        }
        if !(1..=MAX_SEARCH_PER_PAGE).contains(&self.github.per_page) {
            return Err(invalid("github.per_page must be between 1 and 100"));
        }
        if self.github.max_repositories == 0 {
            return Err(invalid("github.max_repositories must be greater than 0"));
        }
        if self.enrich.workers == 0 {
            return Err(invalid("enrich.workers must be greater than 0"));
        }
        Ok(())
    }
}

/// (De)serialize [`Compression`] through its configuration name.
mod compression {
    use repolang_compress::Compression;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S: Serializer>(value: &Compression, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Compression, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(|_| D::Error::custom(format!("unsupported compression: {name}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn toml_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn from_toml(contents: &str) -> Result<Config> {
        Config::extract(Figment::from(Serialized::defaults(Config::default())).merge(Toml::string(contents)))
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.github.max_repositories, 100);
        assert_eq!(config.github.per_page, 100);
        assert_eq!(config.enrich.workers, 10);
        assert_eq!(config.enrich.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.server.bind.to_string(), "127.0.0.1:8080");
        assert_eq!(config.server.compression, Compression::Gzip);
    }

    #[test]
    fn test_defaults_need_a_token() {
        let err = Config::default().validate().unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid(msg) if msg.contains("token")));
    }

    #[test]
    fn test_load_file_overrides_defaults() {
        let file = toml_file(
            r#"
                [github]
                token = "from-file"
                max_repositories = 25

                [enrich]
                workers = 4
                timeout_secs = 0

                [server]
                bind = "0.0.0.0:9000"
                compression = "none"
            "#,
        );
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.github.token.as_deref(), Some("from-file"));
        assert_eq!(config.github.max_repositories, 25);
        // Untouched keys keep their defaults.
        assert_eq!(config.github.query, "stars:>1");
        assert_eq!(config.enrich.workers, 4);
        assert_eq!(config.enrich.timeout(), None);
        assert_eq!(config.server.bind.port(), 9000);
        assert_eq!(config.server.compression, Compression::None);
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[test]
    fn test_load_malformed_file() {
        let file = toml_file("[github\ntoken = ");
        let err = Config::load(Some(file.path())).unwrap_err();
        assert_eq!(*err, ErrorKind::Load);
    }

    #[test]
    fn test_unknown_compression_is_rejected() {
        let err = from_toml("[server]\ncompression = \"brotli\"").unwrap_err();
        assert_eq!(*err, ErrorKind::Load);
    }

    #[rstest]
    #[case("[enrich]\nworkers = 0", "enrich.workers")]
    #[case("[github]\nmax_repositories = 0", "github.max_repositories")]
    #[case("[github]\nper_page = 101", "github.per_page")]
    #[case("[github]\napi_url = \"ftp://example.com\"", "github.api_url")]
    #[case("[github]\ntoken = \"\"", "github.token")]
    fn test_validation(#[case] overlay: &str, #[case] field: &str) {
        let base = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string("[github]\ntoken = \"t\""))
            .merge(Toml::string(overlay));
        let err = Config::extract(base).unwrap().validate().unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid(msg) if msg.contains(field)), "{err:?}");
    }

    #[test]
    fn test_overrides_are_validated() {
        let config = from_toml("[github]\ntoken = \"t\"").unwrap();
        let bind: SocketAddr = "127.0.0.1:3000".parse().unwrap();
        let config = config.with_overrides(Some(bind), Some(3)).unwrap();
        assert_eq!(config.server.bind, bind);
        assert_eq!(config.enrich.workers, 3);
        assert!(config.with_overrides(None, Some(0)).is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = from_toml("[github]\ntoken = \"super-secret\"").unwrap();
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
