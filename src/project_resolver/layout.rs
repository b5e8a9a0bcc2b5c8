//! Project directory layout detection

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use super::{ResolutionError, ResolutionResult};

/// Marker directory of the alternate ("module unification") layout
pub const ALTERNATE_LAYOUT_DIR: &str = "src/ui";

/// Environment config module the pod prefix is read from
pub const ENVIRONMENT_CONFIG: &str = "config/environment.js";

/// Directory convention a project root follows. Exactly one applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "kebab-case")]
pub enum ProjectLayout {
    Classic,
    Pod { prefix: String },
    Alternate,
}

impl ProjectLayout {
    pub fn name(&self) -> &'static str {
        match self {
            ProjectLayout::Classic => "classic",
            ProjectLayout::Pod { .. } => "pod",
            ProjectLayout::Alternate => "alternate",
        }
    }

    pub fn pod_prefix(&self) -> Option<&str> {
        match self {
            ProjectLayout::Pod { prefix } => Some(prefix.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for ProjectLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectLayout::Pod { prefix } => write!(f, "pod ({prefix})"),
            other => f.write_str(other.name()),
        }
    }
}

static POD_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"podModulePrefix\s*[:=]\s*['"`]([^'"`]*)['"`]"#)
        .expect("pod prefix pattern is valid")
});

pub struct ProjectLayoutDetector;

impl ProjectLayoutDetector {
    /// Alternate wins over pod, pod over classic.
    pub fn detect(root: &Path) -> ProjectLayout {
        if Self::is_alternate_layout(root) {
            return ProjectLayout::Alternate;
        }
        match Self::pod_module_prefix(root) {
            Some(prefix) => ProjectLayout::Pod { prefix },
            None => ProjectLayout::Classic,
        }
    }

    pub fn is_alternate_layout(root: &Path) -> bool {
        root.join(ALTERNATE_LAYOUT_DIR).is_dir()
    }

    /// Configured pod prefix, if the project declares a usable one.
    pub fn pod_module_prefix(root: &Path) -> Option<String> {
        match Self::try_pod_module_prefix(root) {
            Ok(prefix) => Some(prefix),
            Err(e) => {
                tracing::trace!("{e}");
                None
            }
        }
    }

    pub fn try_pod_module_prefix(root: &Path) -> ResolutionResult<String> {
        let path = root.join(ENVIRONMENT_CONFIG);
        let source = std::fs::read_to_string(&path).map_err(|e| environment_error(&path, e))?;
        parse_pod_prefix(&source).ok_or_else(|| environment_error(&path, "no podModulePrefix"))
    }
}

fn environment_error(path: &Path, reason: impl ToString) -> ResolutionError {
    ResolutionError::EnvironmentConfig {
        path: PathBuf::from(path),
        reason: reason.to_string(),
    }
}

/// Pull `podModulePrefix` out of environment config source.
///
/// `app/pods` reduces to `pods`; blank values count as absent.
pub fn parse_pod_prefix(source: &str) -> Option<String> {
    let raw = POD_PREFIX_RE.captures(source)?.get(1)?.as_str().trim();
    let prefix = raw.rsplit('/').next().unwrap_or(raw).trim();
    (!prefix.is_empty()).then(|| prefix.to_string())
}
