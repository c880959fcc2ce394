//! Configuration loading for the campus backend.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at `~/.config/campus-backend/config.{toml,yaml,json}`.
//! Environment variables use the `CAMPUS_` prefix (`CAMPUS_VECTOR_DIM=256`).

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::CampusError;

/// Embedding dimension used when nothing else is configured.
pub const DEFAULT_VECTOR_DIM: usize = 128;

/// Deployment environment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Env {
    #[default]
    Dev,
    Stg,
    Prod,
}

impl Env {
    pub fn as_str(&self) -> &'static str {
        match self {
            Env::Dev => "dev",
            Env::Stg => "stg",
            Env::Prod => "prod",
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Display name of the service
    #[serde(default = "default_project_name")]
    pub project_name: String,

    /// Deployment environment (dev, stg, prod)
    #[serde(default)]
    pub env: Env,

    #[serde(default = "default_debug")]
    pub debug: bool,

    /// Embedding dimension D shared by the codec and anchor validation
    #[serde(default = "default_vector_dim")]
    pub vector_dim: usize,

    /// Directory scanned for anchor documents
    #[serde(default = "default_anchors_dir")]
    pub anchors_dir: String,

    /// Base for relative vector and instructions paths inside anchor documents
    #[serde(default = "default_content_root")]
    pub content_root: String,

    /// Public prefix under which local instructions files are served
    #[serde(default = "default_static_url_prefix")]
    pub static_url_prefix: String,

    /// Reject duplicate slugs instead of letting the last document win
    #[serde(default)]
    pub strict_slugs: bool,

    /// Poll interval for `anchors watch`
    #[serde(default = "default_reload_interval_secs")]
    pub reload_interval_secs: u64,

    /// Log level override (trace, debug, info, warn, error)
    #[serde(default)]
    pub log_level: Option<String>,
}

fn default_project_name() -> String {
    "Senecampus Backend".to_string()
}

fn default_debug() -> bool {
    true
}

fn default_vector_dim() -> usize {
    DEFAULT_VECTOR_DIM
}

fn default_anchors_dir() -> String {
    "data/anchors".to_string()
}

fn default_content_root() -> String {
    ".".to_string()
}

fn default_static_url_prefix() -> String {
    "/static/".to_string()
}

fn default_reload_interval_secs() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
            env: Env::default(),
            debug: default_debug(),
            vector_dim: default_vector_dim(),
            anchors_dir: default_anchors_dir(),
            content_root: default_content_root(),
            static_url_prefix: default_static_url_prefix(),
            strict_slugs: false,
            reload_interval_secs: default_reload_interval_secs(),
            log_level: None,
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/campus-backend/config.*)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (CAMPUS_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, CampusError> {
        let config_dir = ProjectDirs::from("", "", "campus-backend")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("project_name", default_project_name())?
            .set_default("env", Env::default().as_str())?
            .set_default("debug", default_debug())?
            .set_default("vector_dim", default_vector_dim() as i64)?
            .set_default("anchors_dir", default_anchors_dir())?
            .set_default("content_root", default_content_root())?
            .set_default("static_url_prefix", default_static_url_prefix())?
            .set_default("strict_slugs", false)?
            .set_default("reload_interval_secs", default_reload_interval_secs() as i64)?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // CAMPUS_VECTOR_DIM, CAMPUS_ANCHORS_DIR, ...
        builder = builder.add_source(
            Environment::with_prefix("CAMPUS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the rest of the system cannot work with.
    pub fn validate(&self) -> Result<(), CampusError> {
        if self.vector_dim == 0 {
            return Err(CampusError::Config("vector_dim must be > 0".to_string()));
        }
        if self.reload_interval_secs == 0 {
            return Err(CampusError::Config(
                "reload_interval_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Log level to use when `RUST_LOG` is not set.
    pub fn effective_log_level(&self) -> &str {
        match (&self.log_level, self.env) {
            (Some(level), _) => level.as_str(),
            (None, Env::Dev) => "debug",
            (None, _) => "info",
        }
    }

    pub fn anchors_path(&self) -> PathBuf {
        PathBuf::from(&self.anchors_dir)
    }

    pub fn content_root_path(&self) -> &Path {
        Path::new(&self.content_root)
    }
}
