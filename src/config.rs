//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/catorder/catorder.toml`
//! 3. Local config: `<store dir>/.catorder.toml` (next to the term store file)
//! 4. Environment variables: `CATORDER_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::services::DEFAULT_MAX_DEPTH;
use crate::application::ApplicationError;
use crate::infrastructure::store::{MetaKeys, DEFAULT_ORDER_KEY, DEFAULT_POSITION_KEY};

const ENV_PREFIX: &str = "CATORDER";

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub store_path: Option<PathBuf>,
    pub order_meta_key: Option<String>,
    pub position_meta_key: Option<String>,
    pub max_depth: Option<usize>,
}

/// Unified configuration for catorder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// JSON term store (default: ~/.catorder/terms.json)
    pub store_path: PathBuf,
    /// Metadata key holding the sibling rank
    pub order_meta_key: String,
    /// Metadata key holding the layout hint
    pub position_meta_key: String,
    /// Maximum parent-chain length walked by the cycle check
    pub max_depth: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            order_meta_key: DEFAULT_ORDER_KEY.to_string(),
            position_meta_key: DEFAULT_POSITION_KEY.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

fn default_store_path() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".catorder").join("terms.json"))
        .unwrap_or_else(|| PathBuf::from("~/.catorder/terms.json"))
}

/// Get the XDG config directory for catorder.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "catorder").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("catorder.toml"))
}

/// Get the path to the local config file in a store directory.
pub fn local_config_path(store_dir: &Path) -> PathBuf {
    store_dir.join(".catorder.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ApplicationError::config(format!("read {}: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| ApplicationError::config(format!("parse {}: {}", path.display(), e)))
}

fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(&raw) {
        Ok(expanded) => PathBuf::from(expanded.into_owned()),
        Err(e) => {
            debug!("expand_path: leaving {} unexpanded: {}", raw, e);
            PathBuf::from(shellexpand::tilde(&raw).into_owned())
        }
    }
}

impl Settings {
    /// Metadata keys for the store adapters.
    pub fn meta_keys(&self) -> MetaKeys {
        MetaKeys {
            order: self.order_meta_key.clone(),
            position: self.position_meta_key.clone(),
        }
    }

    /// Directory holding the store file (and the local config).
    pub fn store_dir(&self) -> Option<&Path> {
        self.store_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// Expand shell variables and tilde in path-like fields.
    ///
    /// Handles `~`, `$VAR`, and `${VAR}` syntax. Unknown variables are left as is.
    fn expand_paths(&mut self) {
        self.store_path = expand_path(&self.store_path);
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            store_path: overlay
                .store_path
                .clone()
                .unwrap_or_else(|| self.store_path.clone()),
            order_meta_key: overlay
                .order_meta_key
                .clone()
                .unwrap_or_else(|| self.order_meta_key.clone()),
            position_meta_key: overlay
                .position_meta_key
                .clone()
                .unwrap_or_else(|| self.position_meta_key.clone()),
            max_depth: overlay.max_depth.unwrap_or(self.max_depth),
        }
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.order_meta_key.trim().is_empty() {
            return Err(ApplicationError::config("order_meta_key must not be empty"));
        }
        if self.position_meta_key.trim().is_empty() {
            return Err(ApplicationError::config(
                "position_meta_key must not be empty",
            ));
        }
        if self.order_meta_key == self.position_meta_key {
            return Err(ApplicationError::config(
                "order_meta_key and position_meta_key must differ",
            ));
        }
        if self.max_depth == 0 {
            return Err(ApplicationError::config("max_depth must be at least 1"));
        }
        Ok(())
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `store_dir` - Directory to look for `.catorder.toml` in. When `None`,
    ///   the directory of the store path resolved from the first two layers
    ///   is used.
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/catorder/catorder.toml`
    /// 3. Local config: `<store_dir>/.catorder.toml`
    /// 4. Environment variables: `CATORDER_*` prefix
    pub fn load(store_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("config: global {}", global_path.display());
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        let local_dir = match store_dir {
            Some(dir) => Some(dir.to_path_buf()),
            None => {
                let mut resolved = current.clone();
                resolved.expand_paths();
                resolved.store_dir().map(Path::to_path_buf)
            }
        };
        if let Some(dir) = local_dir {
            let local_path = local_config_path(&dir);
            if local_path.exists() {
                debug!("config: local {}", local_path.display());
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current, Environment::with_prefix(ENV_PREFIX))?;

        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Apply `CATORDER_*` environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self, env: Environment) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let config = Config::builder()
            .add_source(env.separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("store_path") {
            settings.store_path = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("order_meta_key") {
            settings.order_meta_key = val;
        }
        if let Ok(val) = config.get_string("position_meta_key") {
            settings.position_meta_key = val;
        }
        if let Ok(val) = config.get_int("max_depth") {
            settings.max_depth = usize::try_from(val).map_err(|_| {
                ApplicationError::config(format!("max_depth out of range: {}", val))
            })?;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self)
            .map_err(|e| ApplicationError::config(format!("serialize config: {e}")))
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# catorder configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/catorder/catorder.toml
#   Local:  <store dir>/.catorder.toml
#   Env:    CATORDER_* environment variables (e.g. CATORDER_STORE_PATH)

# JSON file holding the categories
# store_path = "~/.catorder/terms.json"

# Metadata key of the sibling rank
# order_meta_key = "order"

# Metadata key of the layout hint ("left" / "right")
# position_meta_key = "merida_mega_menu_column_position"

# Maximum parent-chain length followed by the cycle check
# max_depth = 1000
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::config(e.to_string())
}
