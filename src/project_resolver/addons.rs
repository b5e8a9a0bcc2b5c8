//! Dependency-declared addon discovery
//!
//! Starting at a project root, follows dependency names to installed (or
//! linked) packages, keeps those that are addons or carry the extension
//! marker, and recurses into them. The dependency graph may contain cycles;
//! the `visited` accumulator threaded through every call guarantees each root
//! is expanded at most once.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::manifest::PackageDescriptor;
use super::provider::ManifestSource;
use super::{AddonRoot, absolute_root, normalize_path};

/// Folder installed packages live in
pub const DEFAULT_PACKAGES_FOLDER: &str = "node_modules";

/// Resolves the full set of addon roots reachable through dependencies.
pub struct AddonRootResolver<'a> {
    manifests: &'a dyn ManifestSource,
}

impl<'a> AddonRootResolver<'a> {
    pub fn new(manifests: &'a dyn ManifestSource) -> Self {
        Self { manifests }
    }

    /// Resolve with the default `node_modules` folder
    pub fn resolve(&self, root: &Path) -> Vec<AddonRoot> {
        self.resolve_in(root, DEFAULT_PACKAGES_FOLDER)
    }

    /// Sorted, duplicate-free addon roots reachable from `root`.
    pub fn resolve_in(&self, root: &Path, packages_folder: &str) -> Vec<AddonRoot> {
        let mut visited = BTreeSet::new();
        self.collect(&absolute_root(root), packages_folder, &mut visited);
        visited.into_iter().map(AddonRoot::new).collect()
    }

    /// Walk from `root`, adding every newly found addon root to `visited`.
    ///
    /// An empty accumulator marks the initial call: only then are development
    /// dependencies followed and a non-addon root allowed.
    pub fn collect(&self, root: &Path, packages_folder: &str, visited: &mut BTreeSet<PathBuf>) {
        let initial = visited.is_empty();
        let (root, manifest) = self.effective_root(root);

        if !initial && !manifest.is_addon() {
            return;
        }

        for name in manifest.dependency_names(initial) {
            let Some(dir) = locate_package(self.manifests, &root, name, packages_folder) else {
                tracing::trace!(package = name, from = %root.display(), "dependency not installed");
                continue;
            };

            if !self.manifests.is_addon_root(&dir) && !self.manifests.is_extension_root(&dir) {
                continue;
            }

            let dir = normalize_path(&dir);
            if visited.insert(dir.clone()) {
                tracing::debug!(addon = %dir.display(), "found addon root");
                self.collect(&dir, packages_folder, visited);
            }
        }
    }

    /// Apply the `projectRoot` redirect of a non-addon host manifest.
    fn effective_root(&self, root: &Path) -> (PathBuf, Arc<PackageDescriptor>) {
        let manifest = self.manifests.manifest(root);
        if manifest.is_addon() {
            return (root.to_path_buf(), manifest);
        }
        match manifest.project_root_override() {
            Some(redirect) => {
                let redirected = normalize_path(&root.join(redirect));
                tracing::debug!(from = %root.display(), to = %redirected.display(), "projectRoot redirect");
                let manifest = self.manifests.manifest(&redirected);
                (redirected, manifest)
            }
            None => (root.to_path_buf(), manifest),
        }
    }
}

/// Find the directory of package `name` visible from `start`.
///
/// Checks `<ancestor>/<packages_folder>/<name>` then `<ancestor>/<name>` for
/// every ancestor of `start`, nearest first; the first directory holding a
/// manifest wins.
pub fn locate_package(
    manifests: &dyn ManifestSource,
    start: &Path,
    name: &str,
    packages_folder: &str,
) -> Option<PathBuf> {
    start.ancestors().find_map(|ancestor| {
        let installed = ancestor.join(packages_folder).join(name);
        if manifests.has_manifest(&installed) {
            return Some(installed);
        }
        let linked = ancestor.join(name);
        manifests.has_manifest(&linked).then_some(linked)
    })
}
