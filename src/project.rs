//! Boundary to the host "project" abstraction
//!
//! Classifying arbitrary files (tests, app files, addon files) belongs to the
//! project; the registry only consumes the `(name, kind)` pairs it returns.

use std::path::Path;

use crate::types::ArtifactKind;

/// Classification of one file by a `Project`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatch {
    pub name: String,
    pub kind: ArtifactKind,
}

impl PathMatch {
    pub fn new(name: impl Into<String>, kind: ArtifactKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

pub trait Project: Send + Sync {
    fn root(&self) -> &Path;

    /// Map an absolute file path to the artifact it defines, if any
    fn match_path_to_type(&self, path: &Path) -> Option<PathMatch>;
}
