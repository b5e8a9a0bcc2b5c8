//! In-workspace addon discovery
//!
//! Alternate-layout projects keep their addons under `packages/`; every
//! qualifying package there also seeds dependency resolution. Classic and pod
//! projects declare in-repo addons through `ember-addon.paths`, which is
//! followed recursively, plus the conventional `lib/` and `engines/` folders.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::addons::{AddonRootResolver, DEFAULT_PACKAGES_FOLDER};
use super::layout::ProjectLayoutDetector;
use super::provider::ManifestSource;
use super::{AddonRoot, ResolutionError, absolute_root, normalize_path};

/// Folder holding workspace packages in the alternate layout
pub const PACKAGES_DIR: &str = "packages";

/// Folders searched for in-repo addons that ship an `addon/` tree
pub const IN_REPO_DIRS: [&str; 2] = ["lib", "engines"];

pub struct InRepoAddonRootResolver<'a> {
    manifests: &'a dyn ManifestSource,
    packages_folder: String,
}

impl<'a> InRepoAddonRootResolver<'a> {
    pub fn new(manifests: &'a dyn ManifestSource) -> Self {
        Self {
            manifests,
            packages_folder: DEFAULT_PACKAGES_FOLDER.to_string(),
        }
    }

    /// Folder used when in-repo packages seed dependency resolution
    pub fn with_packages_folder(mut self, packages_folder: impl Into<String>) -> Self {
        self.packages_folder = packages_folder.into();
        self
    }

    /// Sorted, duplicate-free in-repo addon roots of `root`.
    pub fn resolve(&self, root: &Path) -> Vec<AddonRoot> {
        let root = absolute_root(root);
        let mut visited = BTreeSet::new();

        if ProjectLayoutDetector::is_alternate_layout(&root) {
            self.collect_packages(&root, &mut visited);
        } else {
            self.collect_paths(&root, &mut visited);
            self.collect_conventional(&root, &mut visited);
        }

        visited.into_iter().map(AddonRoot::new).collect()
    }

    fn qualifies(&self, dir: &Path) -> bool {
        self.manifests.is_addon_root(dir) || self.manifests.is_extension_root(dir)
    }

    /// `packages/**/package.json` whose directory is an addon root.
    fn collect_packages(&self, root: &Path, visited: &mut BTreeSet<PathBuf>) {
        let packages = root.join(PACKAGES_DIR);
        if !packages.is_dir() {
            tracing::trace!("{}", ResolutionError::SubtreeAbsent { path: packages });
            return;
        }

        let manifest_file = self.manifests.reader().manifest_file().to_string();
        let dependencies = AddonRootResolver::new(self.manifests);

        for entry in WalkDir::new(&packages)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !is_skipped_dir(entry))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("{}", ResolutionError::walk(packages.clone(), e.to_string()));
                    continue;
                }
            };
            if !entry.file_type().is_file() || entry.file_name() != OsStr::new(&manifest_file) {
                continue;
            }
            let Some(dir) = entry.path().parent().map(normalize_path) else {
                continue;
            };
            if !self.manifests.is_addon_root(&dir) {
                continue;
            }

            visited.insert(dir.clone());
            dependencies.collect(&dir, &self.packages_folder, visited);
        }
    }

    /// Follow `ember-addon.paths`, recursing into each addon's own paths.
    fn collect_paths(&self, root: &Path, visited: &mut BTreeSet<PathBuf>) {
        let manifest = self.manifests.manifest(root);
        for relative in manifest.in_repo_paths() {
            let dir = normalize_path(&root.join(relative));
            if !self.qualifies(&dir) {
                tracing::debug!(path = %dir.display(), "declared in-repo path is not an addon");
                continue;
            }
            if visited.insert(dir.clone()) {
                self.collect_paths(&dir, visited);
            }
        }
    }

    /// Addons under `lib/` or `engines/` that contain an `addon/` folder.
    fn collect_conventional(&self, root: &Path, visited: &mut BTreeSet<PathBuf>) {
        for folder in IN_REPO_DIRS {
            let base = root.join(folder);
            if !base.is_dir() {
                continue;
            }
            let addon_dirs = WalkDir::new(&base)
                .min_depth(2)
                .into_iter()
                .filter_entry(|entry| !is_skipped_dir(entry))
                .filter_map(Result::ok)
                .filter(|entry| entry.file_type().is_dir() && entry.file_name() == "addon");

            for entry in addon_dirs {
                let Some(dir) = entry.path().parent().map(normalize_path) else {
                    continue;
                };
                if self.manifests.is_addon_root(&dir) && visited.insert(dir.clone()) {
                    self.collect_paths(&dir, visited);
                }
            }
        }
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name == DEFAULT_PACKAGES_FOLDER || name.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project_resolver::PackageReader;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn addon(root: &Path, rel: &str, extra: &str) {
        write(
            root,
            &format!("{rel}/package.json"),
            &format!(r#"{{"keywords": ["ember-addon"]{extra}}}"#),
        );
        write(root, &format!("{rel}/index.js"), "module.exports = {};");
    }

    #[test]
    fn test_follows_declared_paths_recursively() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "package.json", r#"{"ember-addon": {"paths": ["lib/a"]}}"#);
        addon(root, "lib/a", r#", "ember-addon": {"paths": ["../b"]}"#);
        addon(root, "lib/b", r#", "ember-addon": {"paths": ["../a"]}"#);

        let reader = PackageReader::default();
        let roots = InRepoAddonRootResolver::new(&reader).resolve(root);
        assert_eq!(
            roots,
            vec![
                AddonRoot::new(root.join("lib/a")),
                AddonRoot::new(root.join("lib/b")),
            ]
        );
    }

    #[test]
    fn test_declared_path_without_entry_module_is_ignored() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "package.json", r#"{"ember-addon": {"paths": ["lib/a"]}}"#);
        write(root, "lib/a/package.json", r#"{"keywords": ["ember-addon"]}"#);

        let reader = PackageReader::default();
        assert!(InRepoAddonRootResolver::new(&reader).resolve(root).is_empty());
    }

    #[test]
    fn test_alternate_layout_scans_packages_and_their_dependencies() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("src/ui")).unwrap();
        write(root, "package.json", "{}");
        addon(root, "packages/widgets", r#", "dependencies": {"dep-addon": "1"}"#);
        addon(root, "packages/widgets/node_modules/dep-addon", "");
        write(root, "packages/plain/package.json", r#"{"name": "plain"}"#);

        let reader = PackageReader::default();
        let roots = InRepoAddonRootResolver::new(&reader).resolve(root);
        assert_eq!(
            roots,
            vec![
                AddonRoot::new(root.join("packages/widgets")),
                AddonRoot::new(root.join("packages/widgets/node_modules/dep-addon")),
            ]
        );
    }

    #[test]
    fn test_conventional_lib_addons_need_addon_folder() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "package.json", "{}");
        addon(root, "lib/with-tree", "");
        fs::create_dir_all(root.join("lib/with-tree/addon/components")).unwrap();
        addon(root, "lib/no-tree", "");

        let reader = PackageReader::default();
        let roots = InRepoAddonRootResolver::new(&reader).resolve(root);
        assert_eq!(roots, vec![AddonRoot::new(root.join("lib/with-tree"))]);
    }
}
