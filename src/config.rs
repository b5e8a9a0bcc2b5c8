//! Configuration module for the addon index.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file (`.addon-index/settings.toml`)
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `ADDON_INDEX_` and use double
//! underscores to separate nested levels:
//! - `ADDON_INDEX_RESOLVER__PACKAGES_FOLDER=vendor` sets `resolver.packages_folder`
//! - `ADDON_INDEX_INDEXING__PARALLEL=false` sets `indexing.parallel`
//! - `ADDON_INDEX_RESOLVER__LONG_TTL_SECS=30` sets `resolver.long_ttl_secs`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{IndexError, IndexResult};
use crate::types::ArtifactKind;

/// Directory holding the settings file
pub const CONFIG_DIR: &str = ".addon-index";

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "ADDON_INDEX_";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Global debug mode
    #[serde(default = "default_false")]
    pub debug: bool,

    /// Addon resolution settings
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Collection scanning settings
    #[serde(default)]
    pub indexing: IndexingConfig,

    /// Addon component namespacing
    #[serde(default)]
    pub namespacing: NamespacingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Folder installed packages are looked up in
    #[serde(default = "default_packages_folder")]
    pub packages_folder: String,

    /// Manifest file name
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,

    /// Entry module whose presence certifies an addon
    #[serde(default = "default_entry_module")]
    pub entry_module: String,

    /// Cache lifetime for manifests and layouts (seconds)
    #[serde(default = "default_short_ttl")]
    pub short_ttl_secs: u64,

    /// Cache lifetime for full addon graph resolution (seconds)
    #[serde(default = "default_long_ttl")]
    pub long_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct IndexingConfig {
    /// Scan addon roots on a thread pool
    #[serde(default = "default_true")]
    pub parallel: bool,

    /// Number of scan threads
    #[serde(default = "default_parallel_threads")]
    pub parallel_threads: usize,

    /// Artifact kinds included in a full pass
    #[serde(default = "default_kinds")]
    pub kinds: Vec<ArtifactKind>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NamespacingConfig {
    /// Honour the namespacing convention when the project opts in
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Dependency whose presence opts a project in
    #[serde(default = "default_marker_dependency")]
    pub marker_dependency: String,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_packages_folder() -> String {
    "node_modules".to_string()
}
fn default_manifest_file() -> String {
    "package.json".to_string()
}
fn default_entry_module() -> String {
    "index.js".to_string()
}
fn default_short_ttl() -> u64 {
    60
}
fn default_long_ttl() -> u64 {
    600
}
fn default_parallel_threads() -> usize {
    num_cpus::get()
}
fn default_kinds() -> Vec<ArtifactKind> {
    ArtifactKind::ALL.to_vec()
}
fn default_marker_dependency() -> String {
    "ember-holy-futuristic-template-namespacing-batman".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            debug: false,
            resolver: ResolverConfig::default(),
            indexing: IndexingConfig::default(),
            namespacing: NamespacingConfig::default(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            packages_folder: default_packages_folder(),
            manifest_file: default_manifest_file(),
            entry_module: default_entry_module(),
            short_ttl_secs: default_short_ttl(),
            long_ttl_secs: default_long_ttl(),
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_threads: default_parallel_threads(),
            kinds: default_kinds(),
        }
    }
}

impl Default for NamespacingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            marker_dependency: default_marker_dependency(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        // Try to find the workspace root by looking for the config directory
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));
        Self::load_from(config_path)
    }

    /// Load configuration from a specific file (plus environment overrides)
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(path.as_ref()))
            // Double underscore becomes a dot; single underscores stay in field names
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Find the settings file by searching from the current directory up to root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .map(|ancestor| ancestor.join(CONFIG_DIR))
            .find(|dir| dir.is_dir())
            .map(|dir| dir.join("settings.toml"))
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> IndexResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| IndexError::FileWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string).map_err(|source| IndexError::FileWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Create a default settings file with helpful comments in `dir`
    pub fn init_config_file(dir: &Path, force: bool) -> IndexResult<PathBuf> {
        let config_path = dir.join(CONFIG_DIR).join("settings.toml");

        if !force && config_path.exists() {
            return Err(IndexError::ConfigExists { path: config_path });
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| IndexError::FileWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let template = format!(
            r#"# addon-index configuration

# Version of the configuration schema
version = 1

# Global debug mode
debug = false

[resolver]
# Folder installed packages are looked up in, at every ancestor directory
packages_folder = "node_modules"

# Manifest and entry module that identify an addon
manifest_file = "package.json"
entry_module = "index.js"

# Cache lifetimes in seconds: manifests and layouts change while editing,
# full addon graph resolution is expensive
short_ttl_secs = 60
long_ttl_secs = 600

[indexing]
# Scan addon roots on a thread pool
parallel = true

# Number of scan threads (defaults to CPU count)
# parallel_threads = {}

# Artifact kinds included in a full pass
kinds = ["component", "route-path", "helper", "modifier", "model", "service", "transform"]

[namespacing]
# Label addon components as <moduleName>$<name> when the project depends on
# the marker package
enabled = true
marker_dependency = "{}"
"#,
            num_cpus::get(),
            default_marker_dependency()
        );

        std::fs::write(&config_path, template).map_err(|source| IndexError::FileWrite {
            path: config_path.clone(),
            source,
        })?;

        Ok(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    // Every test that loads settings runs inside a Jail: it owns the process
    // environment and working directory for its duration.

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.version, 1);
        assert_eq!(settings.resolver.packages_folder, "node_modules");
        assert_eq!(settings.resolver.short_ttl_secs, 60);
        assert_eq!(settings.resolver.long_ttl_secs, 600);
        assert!(settings.indexing.parallel_threads > 0);
        assert_eq!(settings.indexing.kinds.len(), 7);
    }

    #[test]
    fn test_load_from_toml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "settings.toml",
                r#"
version = 2

[resolver]
packages_folder = "vendor"
long_ttl_secs = 5

[indexing]
parallel = false
kinds = ["component", "helper"]

[namespacing]
enabled = false
"#,
            )?;

            let settings = Settings::load_from("settings.toml").map_err(|e| e.to_string())?;
            assert_eq!(settings.version, 2);
            assert_eq!(settings.resolver.packages_folder, "vendor");
            assert_eq!(settings.resolver.long_ttl_secs, 5);
            // untouched values keep their defaults
            assert_eq!(settings.resolver.short_ttl_secs, 60);
            assert!(!settings.indexing.parallel);
            assert_eq!(
                settings.indexing.kinds,
                vec![ArtifactKind::Component, ArtifactKind::Helper]
            );
            assert!(!settings.namespacing.enabled);
            Ok(())
        });
    }

    #[test]
    fn test_save_settings() {
        Jail::expect_with(|jail| {
            let config_path = jail.directory().join("nested/settings.toml");

            let mut settings = Settings::default();
            settings.indexing.parallel_threads = 2;
            settings.resolver.entry_module = "main.js".to_string();
            settings.save(&config_path).map_err(|e| e.to_string())?;

            let loaded = Settings::load_from(&config_path).map_err(|e| e.to_string())?;
            assert_eq!(loaded.indexing.parallel_threads, 2);
            assert_eq!(loaded.resolver.entry_module, "main.js");
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "settings.toml",
                r#"
[resolver]
packages_folder = "vendor"
"#,
            )?;
            jail.set_env("ADDON_INDEX_RESOLVER__PACKAGES_FOLDER", "linked");
            jail.set_env("ADDON_INDEX_INDEXING__PARALLEL", "false");

            let settings = Settings::load_from("settings.toml").map_err(|e| e.to_string())?;
            assert_eq!(settings.resolver.packages_folder, "linked");
            assert!(!settings.indexing.parallel);
            Ok(())
        });
    }

    #[test]
    fn test_load_finds_config_in_ancestor() {
        Jail::expect_with(|jail| {
            jail.create_dir(".addon-index")?;
            jail.create_file(
                ".addon-index/settings.toml",
                "[resolver]\nentry_module = \"addon.js\"\n",
            )?;
            let nested = jail.create_dir("app/components")?;
            std::env::set_current_dir(&nested).map_err(|e| e.to_string())?;

            let settings = Settings::load().map_err(|e| e.to_string())?;
            assert_eq!(settings.resolver.entry_module, "addon.js");
            Ok(())
        });
    }

    #[test]
    fn test_init_config_file_round_trips() {
        Jail::expect_with(|jail| {
            let dir = jail.directory().to_path_buf();
            let path = Settings::init_config_file(&dir, false).map_err(|e| e.to_string())?;

            let settings = Settings::load_from(&path).map_err(|e| e.to_string())?;
            assert_eq!(settings.resolver.manifest_file, "package.json");
            assert_eq!(settings.indexing.kinds.len(), 7);

            let again = Settings::init_config_file(&dir, false);
            assert!(matches!(again, Err(IndexError::ConfigExists { .. })));
            assert!(Settings::init_config_file(&dir, true).is_ok());
            Ok(())
        });
    }
}
