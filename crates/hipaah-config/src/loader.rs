//! Configuration loader with multi-source merging

use crate::{ConfigError, HipaahConfig};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::env;
use std::path::{Path, PathBuf};

/// Git-tracked project configuration.
pub const PROJECT_CONFIG_FILE: &str = "hipaah.toml";

/// Gitignored local overrides, merged over [`PROJECT_CONFIG_FILE`].
pub const LOCAL_CONFIG_FILE: &str = "hipaah.local.toml";

/// Configuration loader with builder pattern
pub struct ConfigLoader {
    project_dir: PathBuf,
    env_prefix: String,
    include_user_config: bool,
}

impl ConfigLoader {
    /// Loader rooted at the current directory.
    pub fn new() -> Self {
        Self {
            project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            env_prefix: "HIPAAH".to_string(),
            include_user_config: true,
        }
    }

    #[must_use]
    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the environment variable prefix (default: "HIPAAH")
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Skip the per-user config file.
    #[must_use]
    pub fn without_user_config(mut self) -> Self {
        self.include_user_config = false;
        self
    }

    /// Per-user config file (`~/.config/hipaah/config.toml` on Linux).
    pub fn user_config_file() -> std::result::Result<PathBuf, ConfigError> {
        ProjectDirs::from("", "", "hipaah")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or_else(|| {
                ConfigError::XdgError("no home directory to place user config in".to_string())
            })
    }

    /// Config files this loader consults, lowest precedence first.
    ///
    /// Files that do not exist are listed too; [`ConfigLoader::load`] skips
    /// them.
    pub fn config_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::with_capacity(3);
        if self.include_user_config {
            if let Ok(user_config_file) = Self::user_config_file() {
                files.push(user_config_file);
            }
        }
        files.push(self.project_dir.join(PROJECT_CONFIG_FILE));
        files.push(self.project_dir.join(LOCAL_CONFIG_FILE));
        files
    }

    /// Load configuration from all sources with proper precedence.
    ///
    /// Environment variables use a single `_` after the prefix and `__`
    /// between nested keys, e.g. `HIPAAH_LOGGING__LEVEL=debug`.
    pub fn load(self) -> Result<HipaahConfig> {
        let mut builder = config::Config::builder();

        // 1. Built-in defaults
        let defaults = HipaahConfig::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        // 2-4. User, project and local files
        for file in self.config_files().into_iter().filter(|f| f.exists()) {
            builder = builder.add_source(
                config::File::from(file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // 5. Environment variables (HIPAAH_*)
        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("logging.redact_fields")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let mut hipaah_config: HipaahConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        hipaah_config.resolve_paths(&self.project_dir);
        hipaah_config
            .validate()
            .context("Configuration failed validation")?;

        Ok(hipaah_config)
    }

    /// Load configuration or fall back to defaults.
    pub fn load_or_default(self) -> HipaahConfig {
        self.load().unwrap_or_default()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
