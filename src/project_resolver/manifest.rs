//! Package manifest (`package.json`) reading
//!
//! Reading never fails from the caller's point of view: a missing, unreadable
//! or malformed manifest yields `PackageDescriptor::default()`, which is
//! indistinguishable from "not an addon".

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use super::{ResolutionError, ResolutionResult};

/// Keyword that flags a package as an addon
pub const ADDON_KEYWORD: &str = "ember-addon";

/// Top-level key holding the extension configuration blob
pub const EXTENSION_CONFIG_KEY: &str = "ember-language-server";

/// Snapshot of a package manifest at read time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDescriptor {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub keywords: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub dependencies: BTreeMap<String, String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub peer_dependencies: BTreeMap<String, String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub dev_dependencies: BTreeMap<String, String>,

    /// The `ember-addon` block
    #[serde(default, rename = "ember-addon")]
    pub addon: Option<AddonConfig>,

    #[serde(default)]
    pub workspaces: Option<Workspaces>,

    /// Present (even when `null`) as soon as the key exists
    #[serde(
        default,
        rename = "ember-language-server",
        deserialize_with = "present_value"
    )]
    pub extension_config: Option<serde_json::Value>,
}

/// The addon configuration block of a manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonConfig {
    #[serde(default)]
    pub version: Option<u8>,

    /// Redirects resolution to another directory (monorepo hosts)
    #[serde(default)]
    pub project_root: Option<String>,

    /// In-repo addon directories, relative to the manifest
    #[serde(default, deserialize_with = "null_as_default")]
    pub paths: Vec<String>,

    #[serde(default)]
    pub before: Option<OneOrMany>,

    #[serde(default)]
    pub after: Option<OneOrMany>,

    #[serde(default)]
    pub main: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// `workspaces` accepts either a bare glob list or `{ "packages": [...] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Workspaces {
    Globs(Vec<String>),
    Packages {
        #[serde(default)]
        packages: Vec<String>,
    },
}

/// `"key": null` reads like a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

impl PackageDescriptor {
    /// Parse manifest text
    pub fn from_json(path: &Path, json: &str) -> ResolutionResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ResolutionError::manifest_parse(path.to_path_buf(), e))
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn is_addon(&self) -> bool {
        self.keywords.iter().any(|k| k == ADDON_KEYWORD)
    }

    pub fn has_extension_config(&self) -> bool {
        self.extension_config.is_some()
    }

    /// `None` for non-addons, otherwise the declared addon format (1 or 2).
    pub fn addon_version(&self) -> Option<u8> {
        if !self.is_addon() {
            return None;
        }
        match self.addon.as_ref().and_then(|config| config.version) {
            Some(2) => Some(2),
            _ => Some(1),
        }
    }

    pub fn project_root_override(&self) -> Option<&str> {
        self.addon
            .as_ref()
            .and_then(|config| config.project_root.as_deref())
            .filter(|root| !root.trim().is_empty())
    }

    pub fn in_repo_paths(&self) -> &[String] {
        self.addon
            .as_ref()
            .map(|config| config.paths.as_slice())
            .unwrap_or_default()
    }

    /// Dependency names: production, then peer, then (optionally) development.
    pub fn dependency_names(&self, include_dev: bool) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .dependencies
            .keys()
            .chain(self.peer_dependencies.keys())
            .map(String::as_str)
            .collect();
        if include_dev {
            names.extend(self.dev_dependencies.keys().map(String::as_str));
        }
        names
    }

    pub fn has_dependency(&self, name: &str) -> bool {
        self.dependencies.contains_key(name)
            || self.peer_dependencies.contains_key(name)
            || self.dev_dependencies.contains_key(name)
    }

    /// Last `/` segment of the package name (`@scope/ui-kit` -> `ui-kit`)
    pub fn short_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .and_then(|name| name.rsplit('/').next())
            .filter(|name| !name.is_empty())
    }
}

static MODULE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"moduleName\s*(?:\(\s*\)\s*\{\s*return\s*|:\s*)['"`]([^'"`]+)['"`]"#,
    )
    .expect("module name pattern is valid")
});

/// Extract the declared `moduleName` from entry module source.
///
/// Both `moduleName() { return 'x'; }` and `moduleName: 'x'` are recognised.
pub fn extract_module_name(source: &str) -> Option<String> {
    MODULE_NAME_RE
        .captures(source)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Reads manifests and entry modules from disk. No caching.
#[derive(Debug, Clone)]
pub struct PackageReader {
    manifest_file: String,
    entry_module: String,
}

impl Default for PackageReader {
    fn default() -> Self {
        Self::new("package.json", "index.js")
    }
}

impl PackageReader {
    pub fn new(manifest_file: impl Into<String>, entry_module: impl Into<String>) -> Self {
        Self {
            manifest_file: manifest_file.into(),
            entry_module: entry_module.into(),
        }
    }

    pub fn manifest_file(&self) -> &str {
        &self.manifest_file
    }

    pub fn entry_module(&self) -> &str {
        &self.entry_module
    }

    pub fn manifest_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.manifest_file)
    }

    /// Read the manifest in `dir`, reporting why it could not be used.
    pub fn try_read(&self, dir: &Path) -> ResolutionResult<PackageDescriptor> {
        let path = self.manifest_path(dir);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ResolutionError::manifest_read(path.clone(), e))?;
        PackageDescriptor::from_json(&path, &content)
    }

    /// Read the manifest in `dir`; every failure yields the empty descriptor.
    pub fn read(&self, dir: &Path) -> PackageDescriptor {
        match self.try_read(dir) {
            Ok(descriptor) => descriptor,
            Err(e @ ResolutionError::ManifestParse { .. }) => {
                tracing::debug!("{e}");
                PackageDescriptor::default()
            }
            Err(e) => {
                tracing::trace!("{e}");
                PackageDescriptor::default()
            }
        }
    }

    /// Module name an addon registers under, falling back to its package name.
    pub fn module_name(&self, dir: &Path, descriptor: &PackageDescriptor) -> Option<String> {
        std::fs::read_to_string(dir.join(&self.entry_module))
            .ok()
            .and_then(|source| extract_module_name(&source))
            .or_else(|| descriptor.short_name().map(str::to_string))
    }
}
