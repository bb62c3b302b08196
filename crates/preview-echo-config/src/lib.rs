use preview_echo_engine::{
    BlockTags, CommitOptions, FallbackPolicy, HighlightStyle, SearchStyle, SessionOptions,
};
use preview_echo_html::SanitizePolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to read sanitize policy at {policy_path}: {source}")]
    PolicyReadError {
        policy_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse sanitize policy at {policy_path}: {source}")]
    PolicyParseError {
        policy_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Settings file for the preview/editor pair. Every section is optional.
///
/// ```toml
/// blocks = ["p", "h1", "h2", "li", "blockquote"]
/// sanitize_policy_path = "~/.config/preview-echo/policy.toml"
///
/// [search]
/// match_class = "search-highlight"
///
/// [highlight]
/// format = "background"
/// value = "#fff59d"
///
/// [resolver]
/// kind = "prefix"
/// prefix_chars = 20
/// min_similarity = 0.9
///
/// [commit]
/// debounce_ms = 300
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub blocks: BlockTags,
    /// Read the sanitize policy from this file instead of `[sanitize]`, so
    /// the preview renderer and the search highlighter share one allow-list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanitize_policy_path: Option<PathBuf>,
    pub sanitize: SanitizePolicy,
    pub search: SearchStyle,
    pub highlight: HighlightStyle,
    pub resolver: FallbackPolicy,
    pub commit: CommitOptions,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        if let Some(policy_path) = config.sanitize_policy_path.take() {
            // Expand shell variables and tilde in the policy path
            let policy_path = Self::expand_path(&policy_path).unwrap_or(policy_path);
            config.sanitize = Self::load_policy(&policy_path)?;
            config.sanitize_policy_path = Some(policy_path);
        }

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// The configured file, or defaults when there is none.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        Ok(Self::load()?.unwrap_or_default())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/preview-echo");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Engine settings for a new session.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            blocks: self.blocks.clone(),
            sanitize: self.sanitize.clone(),
            search: self.search.clone(),
            highlight: self.highlight.clone(),
            resolver: self.resolver,
        }
    }

    fn load_policy(policy_path: &Path) -> Result<SanitizePolicy, ConfigError> {
        let content = std::fs::read_to_string(policy_path).map_err(|source| {
            ConfigError::PolicyReadError {
                policy_path: policy_path.to_path_buf(),
                source,
            }
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::PolicyParseError {
            policy_path: policy_path.to_path_buf(),
            source,
        })
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
