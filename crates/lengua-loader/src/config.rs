//! Configuration and source factory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use lengua_core::model::Category;
use lengua_core::session::SessionConfig;
use lengua_core::tense::ResolverPolicy;

use crate::catalog::Sources;
use crate::file::FileSource;
use crate::http::{HttpSource, DEFAULT_TIMEOUT_SECS};
use crate::source::ItemSource;

/// Where one category's data file lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    File { path: PathBuf },
    Http { url: String },
}

/// Per-category source overrides. Unset categories read
/// `<data_dir>/<stem>.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub bv: Option<SourceConfig>,
    #[serde(default)]
    pub recursos: Option<SourceConfig>,
    #[serde(default)]
    pub conjugaciones: Option<SourceConfig>,
}

/// Top-level Lengua configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LenguaConfig {
    /// Per-category fetch timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Bound on re-draws when a mode needs a particular kind of item.
    #[serde(default = "default_max_draw_attempts")]
    pub max_draw_attempts: usize,
    /// Treat fallback tense matches as unclassifiable.
    #[serde(default)]
    pub strict_classification: bool,
    /// Score snapshot location.
    #[serde(default)]
    pub score_file: Option<PathBuf>,
    /// Base directory of the default file sources.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub sources: SourcesConfig,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_max_draw_attempts() -> usize {
    20
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for LenguaConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_draw_attempts: default_max_draw_attempts(),
            strict_classification: false,
            score_file: None,
            data_dir: default_data_dir(),
            sources: SourcesConfig::default(),
        }
    }
}

impl LenguaConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            max_draw_attempts: self.max_draw_attempts,
            policy: if self.strict_classification {
                ResolverPolicy::Strict
            } else {
                ResolverPolicy::Lenient
            },
        }
    }

    /// The configured source for `category`, or the default data file.
    pub fn source_for(&self, category: Category) -> SourceConfig {
        let configured = match category {
            Category::Spelling => &self.sources.bv,
            Category::LiteraryDevice => &self.sources.recursos,
            Category::Conjugation => &self.sources.conjugaciones,
        };
        configured.clone().unwrap_or_else(|| SourceConfig::File {
            path: self.data_dir.join(format!("{}.json", category.file_stem())),
        })
    }

    /// Score snapshot path: `score_file`, else `~/.config/lengua/score.json`.
    pub fn score_path(&self) -> PathBuf {
        self.score_file.clone().unwrap_or_else(|| {
            dirs_path()
                .map(|d| d.join("score.json"))
                .unwrap_or_else(|| PathBuf::from("lengua-score.json"))
        })
    }

    fn apply_data_dir_override(&mut self, dir: Option<String>) {
        if let Some(dir) = dir.filter(|d| !d.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
    }

    fn resolve_env(&mut self) {
        self.data_dir = resolve_path(&self.data_dir);
        self.score_file = self.score_file.as_deref().map(resolve_path);
        for source in [
            &mut self.sources.bv,
            &mut self.sources.recursos,
            &mut self.sources.conjugaciones,
        ]
        .into_iter()
        .flatten()
        {
            *source = resolve_source_config(source);
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
/// Unset variables resolve to the empty string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + len];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

fn resolve_source_config(config: &SourceConfig) -> SourceConfig {
    match config {
        SourceConfig::File { path } => SourceConfig::File {
            path: resolve_path(path),
        },
        SourceConfig::Http { url } => SourceConfig::Http {
            url: resolve_env_vars(url),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `lengua.toml` in the current directory
/// 2. `~/.config/lengua/config.toml`
///
/// `LENGUA_DATA_DIR` overrides `data_dir`.
pub fn load_config() -> Result<LenguaConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<LenguaConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("lengua.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<LenguaConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => LenguaConfig::default(),
    };

    config.apply_data_dir_override(std::env::var("LENGUA_DATA_DIR").ok());
    config.resolve_env();

    if config.max_draw_attempts == 0 {
        anyhow::bail!("max_draw_attempts must be at least 1");
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("lengua"))
}

/// Create a source instance from its configuration.
pub fn create_source(config: &SourceConfig, timeout_secs: u64) -> Result<Box<dyn ItemSource>> {
    match config {
        SourceConfig::File { path } => Ok(Box::new(FileSource::new(path))),
        SourceConfig::Http { url } => {
            let source = HttpSource::new(url, timeout_secs)
                .with_context(|| format!("failed to set up HTTP source {url}"))?;
            Ok(Box::new(source))
        }
    }
}

/// Create the sources for all three categories.
pub fn create_sources(config: &LenguaConfig) -> Result<Sources> {
    let make = |category| create_source(&config.source_for(category), config.timeout_secs);
    Ok(Sources {
        spelling: make(Category::Spelling)?,
        devices: make(Category::LiteraryDevice)?,
        conjugations: make(Category::Conjugation)?,
    })
}
