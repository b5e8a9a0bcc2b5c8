//! Artifact registry: `(name, kind)` -> contributing files
//!
//! Append-only for the lifetime of a resolution pass. A rebuild creates a new
//! registry instead of diffing the old one. Cloning yields another handle to
//! the same underlying map, so scans running on several threads can share it.

use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::project::Project;
use crate::project_resolver::normalize_path;
use crate::types::ArtifactKind;

type EntryKey = (ArtifactKind, String);

#[derive(Clone, Debug, Default)]
pub struct ArtifactRegistry {
    entries: Arc<DashMap<EntryKey, Vec<PathBuf>>>,
}

/// Ordered, serializable copy of a registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrySnapshot {
    pub entries: BTreeMap<ArtifactKind, BTreeMap<String, Vec<PathBuf>>>,
}

impl ArtifactRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `paths` into the entry for `(name, kind)`, creating it if absent.
    ///
    /// Insertion order is kept and a path already present is not added again.
    pub fn add_entry<I, P>(&self, name: &str, kind: ArtifactKind, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut entry = self.entries.entry((kind, name.to_string())).or_default();
        for path in paths {
            let path = normalize_path(path.as_ref());
            if !entry.contains(&path) {
                entry.push(path);
            }
        }
    }

    pub fn get(&self, name: &str, kind: ArtifactKind) -> Vec<PathBuf> {
        self.entries
            .get(&(kind, name.to_string()))
            .map(|paths| paths.clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, name: &str, kind: ArtifactKind) -> bool {
        self.entries.contains_key(&(kind, name.to_string()))
    }

    /// Sorted names registered for `kind`
    pub fn names(&self, kind: ArtifactKind) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.key().0 == kind)
            .map(|entry| entry.key().1.clone())
            .collect();
        names.sort();
        names
    }

    /// Every file sharing a registry entry with `path`, excluding `path` itself.
    pub fn find_related_files(&self, path: &Path) -> Vec<PathBuf> {
        let path = normalize_path(path);
        let mut related: Vec<PathBuf> = Vec::new();
        for entry in self.entries.iter() {
            if !entry.value().contains(&path) {
                continue;
            }
            for other in entry.value() {
                if *other != path && !related.contains(other) {
                    related.push(other.clone());
                }
            }
        }
        related.sort();
        related
    }

    /// Classify `paths` through `project` and register every match.
    ///
    /// Returns how many files were registered.
    pub fn register_project_files<I, P>(&self, project: &dyn Project, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut registered = 0;
        for path in paths {
            let absolute = project.root().join(path.as_ref());
            if let Some(matched) = project.match_path_to_type(&absolute) {
                self.add_entry(&matched.name, matched.kind, [&absolute]);
                registered += 1;
            }
        }
        registered
    }

    /// Fold every entry of `other` into this registry.
    pub fn merge(&self, other: &ArtifactRegistry) {
        if Arc::ptr_eq(&self.entries, &other.entries) {
            return;
        }
        for entry in other.entries.iter() {
            let (kind, name) = entry.key();
            self.add_entry(name, *kind, entry.value());
        }
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        let mut snapshot = RegistrySnapshot::default();
        for entry in self.entries.iter() {
            let (kind, name) = entry.key();
            snapshot
                .entries
                .entry(*kind)
                .or_default()
                .insert(name.clone(), entry.value().clone());
        }
        snapshot
    }

    /// Number of `(name, kind)` entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
