//! Addon root resolution
//!
//! Discovers every addon reachable from a project root, both through declared
//! dependencies (`addons`) and through in-workspace paths (`in_repo`), and
//! classifies project directory layouts (`layout`).
//!
//! All resolvers are failure tolerant: filesystem and parse problems are
//! reported as `ResolutionError` internally, logged, and turned into empty
//! results before they reach a caller.

pub mod addons;
pub mod in_repo;
pub mod layout;
pub mod manifest;
pub mod memo;
pub mod provider;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};

pub use addons::AddonRootResolver;
pub use in_repo::InRepoAddonRootResolver;
pub use layout::{ProjectLayout, ProjectLayoutDetector};
pub use manifest::{AddonConfig, PackageDescriptor, PackageReader};
pub use memo::{CacheArg, CacheArgs, Memoized, ResolutionMemo, memoize};
pub use provider::{CachedManifests, ManifestSource};

/// An absolute, normalized directory holding an addon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AddonRoot(PathBuf);

impl AddonRoot {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self(normalize_path(path.as_ref()))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for AddonRoot {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for AddonRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Lexically normalize a path: drop `.` segments and fold `..` into the parent.
///
/// Does not touch the filesystem, so symlinks are kept as written.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Absolute, normalized form of `path` (relative paths join the current dir).
pub fn absolute_root(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    normalize_path(&absolute)
}

#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    /// Manifest file missing or unreadable
    #[error("cannot read manifest at '{path}': {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Manifest present but not valid JSON (or not an object)
    #[error("invalid manifest at '{path}': {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Candidate directory has no entry module
    #[error("no entry module in '{root}'")]
    MissingEntryModule { root: PathBuf },
    /// Scan target directory does not exist
    #[error("directory '{path}' does not exist")]
    SubtreeAbsent { path: PathBuf },
    /// Directory walk failed part way
    #[error("failed to walk '{path}': {reason}")]
    Walk { path: PathBuf, reason: String },
    /// Environment config module missing or without a usable prefix
    #[error("cannot read environment config at '{path}': {reason}")]
    EnvironmentConfig { path: PathBuf, reason: String },
}

impl ResolutionError {
    pub fn manifest_read(path: PathBuf, source: std::io::Error) -> Self {
        Self::ManifestRead { path, source }
    }
    pub fn manifest_parse(path: PathBuf, source: serde_json::Error) -> Self {
        Self::ManifestParse { path, source }
    }
    pub fn walk(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::Walk {
            path,
            reason: reason.into(),
        }
    }
    pub fn suggestion(&self) -> &'static str {
        match self {
            ResolutionError::ManifestRead { .. } => {
                "Check that package.json exists and is readable."
            }
            ResolutionError::ManifestParse { .. } => "Fix the JSON syntax of package.json.",
            ResolutionError::MissingEntryModule { .. } => {
                "Addons need an index.js entry module to be recognised."
            }
            ResolutionError::SubtreeAbsent { .. } => "Nothing to scan; the folder is optional.",
            ResolutionError::Walk { .. } => "Check directory permissions.",
            ResolutionError::EnvironmentConfig { .. } => {
                "Set podModulePrefix in config/environment.js to enable pod scanning."
            }
        }
    }
    /// Stable code for programmatic handling in JSON responses
    pub fn status_code(&self) -> String {
        match self {
            ResolutionError::ManifestRead { .. } => "RESOLUTION_MANIFEST_READ",
            ResolutionError::ManifestParse { .. } => "RESOLUTION_MANIFEST_PARSE",
            ResolutionError::MissingEntryModule { .. } => "RESOLUTION_MISSING_ENTRY",
            ResolutionError::SubtreeAbsent { .. } => "RESOLUTION_SUBTREE_ABSENT",
            ResolutionError::Walk { .. } => "RESOLUTION_WALK",
            ResolutionError::EnvironmentConfig { .. } => "RESOLUTION_ENVIRONMENT_CONFIG",
        }
        .to_string()
    }
    /// Recovery suggestions list (mirrors project error conventions)
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            ResolutionError::ManifestRead { .. } | ResolutionError::ManifestParse { .. } => vec![
                "Validate package.json with a JSON linter",
                "Reinstall the package to restore its manifest",
            ],
            ResolutionError::MissingEntryModule { .. } => vec![
                "Add an index.js file at the addon root",
                "Remove the ember-addon keyword if this is not an addon",
            ],
            ResolutionError::SubtreeAbsent { .. } => vec![],
            ResolutionError::Walk { .. } => vec!["Ensure the directory is readable"],
            ResolutionError::EnvironmentConfig { .. } => vec![
                "Declare podModulePrefix as a string literal",
                "Ignore if the project does not use pods",
            ],
        }
    }
}

pub type ResolutionResult<T> = Result<T, ResolutionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folds_parent_and_current_segments() {
        let path = Path::new("/work/app/./lib/../node_modules/addon-a");
        assert_eq!(
            normalize_path(path),
            PathBuf::from("/work/app/node_modules/addon-a")
        );
    }

    #[test]
    fn test_addon_roots_compare_by_normalized_path() {
        let a = AddonRoot::new("/work/app/lib/../lib/foo");
        let b = AddonRoot::new("/work/app/lib/foo");
        assert_eq!(a, b);
    }

    #[test]
    fn test_status_codes_are_stable() {
        let err = ResolutionError::SubtreeAbsent {
            path: PathBuf::from("/nope"),
        };
        assert_eq!(err.status_code(), "RESOLUTION_SUBTREE_ABSENT");
        assert!(err.recovery_suggestions().is_empty());
    }
}
