//! Collection scanning: artifact files of one kind under one root
//!
//! This module provides the per-kind directory conventions for each project
//! layout and the walk that turns matching files into registry entries and
//! descriptors:
//! - Classic: `app/<kind>s`, `addon/<kind>s` and template folders
//! - Pod: classic folders plus `app/<prefix>/components`
//! - Alternate: `src/ui/components` and `src/ui/routes`

use ignore::WalkBuilder;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::naming::{
    canonical_name, is_route_template, nested_route_name, relative_path, route_name,
};
use crate::project_resolver::{ProjectLayout, ResolutionError};
use crate::registry::ArtifactRegistry;
use crate::types::{ArtifactKind, Descriptor};

const SCRIPTS: &[&str] = &["js", "ts"];
const TEMPLATES: &[&str] = &["hbs"];
const COMPONENT_FILES: &[&str] = &["js", "ts", "jsx", "hbs"];
const POD_COMPONENT_FILES: &[&str] = &["js", "ts", "hbs", "css", "less", "scss"];
const ROUTE_FILES: &[&str] = &["js", "ts", "hbs"];

/// How names are derived for files under a target directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Naming {
    Canonical,
    Route,
    RouteTemplate,
    NestedRoute,
}

/// One directory to walk for a kind
#[derive(Debug, Clone)]
struct ScanTarget {
    dir: PathBuf,
    extensions: &'static [&'static str],
    naming: Naming,
    /// Register files without emitting descriptors (controllers)
    registry_only: bool,
}

impl ScanTarget {
    fn new(dir: PathBuf, extensions: &'static [&'static str], naming: Naming) -> Self {
        Self {
            dir,
            extensions,
            naming,
            registry_only: false,
        }
    }

    fn registry_only(mut self) -> Self {
        self.registry_only = true;
        self
    }

    fn name_for(&self, relative: &str) -> Option<String> {
        match self.naming {
            Naming::Canonical => Some(canonical_name(relative)),
            Naming::Route => Some(route_name(relative)),
            Naming::RouteTemplate => is_route_template(relative).then(|| route_name(relative)),
            Naming::NestedRoute => Some(nested_route_name(relative)),
        }
    }
}

fn scan_targets(root: &Path, layout: &ProjectLayout, kind: ArtifactKind) -> Vec<ScanTarget> {
    let app = root.join("app");
    let addon = root.join("addon");

    match (kind, layout) {
        (ArtifactKind::Component, ProjectLayout::Alternate) => vec![ScanTarget::new(
            root.join("src/ui/components"),
            COMPONENT_FILES,
            Naming::Canonical,
        )],
        (ArtifactKind::Component, _) => {
            let mut targets = vec![
                ScanTarget::new(app.join("components"), COMPONENT_FILES, Naming::Canonical),
                ScanTarget::new(app.join("templates/components"), TEMPLATES, Naming::Canonical),
                ScanTarget::new(addon.join("components"), COMPONENT_FILES, Naming::Canonical),
                ScanTarget::new(addon.join("templates/components"), TEMPLATES, Naming::Canonical),
            ];
            if let ProjectLayout::Pod { prefix } = layout {
                targets.push(ScanTarget::new(
                    app.join(prefix).join("components"),
                    POD_COMPONENT_FILES,
                    Naming::Canonical,
                ));
            }
            targets
        }
        (ArtifactKind::RoutePath, ProjectLayout::Alternate) => vec![ScanTarget::new(
            root.join("src/ui/routes"),
            ROUTE_FILES,
            Naming::NestedRoute,
        )],
        (ArtifactKind::RoutePath, _) => vec![
            ScanTarget::new(app.join("templates"), TEMPLATES, Naming::RouteTemplate),
            ScanTarget::new(app.join("routes"), SCRIPTS, Naming::Route),
            ScanTarget::new(app.join("controllers"), SCRIPTS, Naming::Route).registry_only(),
        ],
        (kind, _) => kind
            .folder()
            .map(|folder| {
                vec![
                    ScanTarget::new(app.join(folder), SCRIPTS, Naming::Canonical),
                    ScanTarget::new(addon.join(folder), SCRIPTS, Naming::Canonical),
                ]
            })
            .unwrap_or_default(),
    }
}

/// Walk `dir` and return matching files as sorted `/`-separated relative paths.
///
/// A missing directory yields an empty list.
pub fn walk_files(dir: &Path, extensions: &[&str]) -> Vec<String> {
    if !dir.is_dir() {
        tracing::trace!("{}", ResolutionError::SubtreeAbsent { path: dir.to_path_buf() });
        return Vec::new();
    }

    let mut builder = WalkBuilder::new(dir);
    builder
        .standard_filters(false)
        .hidden(true) // skip dotfiles and dot directories
        .follow_links(false)
        .require_git(false);

    let mut files: Vec<String> = builder
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!("{}", ResolutionError::walk(dir.to_path_buf(), e.to_string()));
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.contains(&ext))
        })
        .filter_map(|entry| relative_path(dir, entry.path()))
        .collect();

    files.sort();
    files
}

/// Scans artifact collections and records them in a shared registry.
#[derive(Debug, Clone, Default)]
pub struct CollectionScanner {
    registry: ArtifactRegistry,
}

impl CollectionScanner {
    pub fn new(registry: ArtifactRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ArtifactRegistry {
        &self.registry
    }

    /// Descriptors for every `kind` artifact under `root`, deduplicated by label.
    pub fn scan(&self, root: &Path, layout: &ProjectLayout, kind: ArtifactKind) -> Vec<Descriptor> {
        let mut seen = HashSet::new();
        let mut descriptors = Vec::new();

        for target in scan_targets(root, layout, kind) {
            for relative in walk_files(&target.dir, target.extensions) {
                let Some(name) = target.name_for(&relative) else {
                    continue;
                };
                self.registry
                    .add_entry(&name, kind, [target.dir.join(&relative)]);

                if !target.registry_only && seen.insert(name.clone()) {
                    descriptors.push(Descriptor::new(kind, name));
                }
            }
        }

        tracing::trace!(
            root = %root.display(),
            kind = %kind,
            count = descriptors.len(),
            "scanned collection"
        );
        descriptors
    }

    /// Scan several kinds, concatenating the results in the given order.
    pub fn scan_kinds(
        &self,
        root: &Path,
        layout: &ProjectLayout,
        kinds: &[ArtifactKind],
    ) -> Vec<Descriptor> {
        kinds
            .iter()
            .flat_map(|kind| self.scan(root, layout, *kind))
            .collect()
    }
}
