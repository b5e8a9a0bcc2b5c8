//! Resolution pass: addon discovery, layout detection and collection scans
//!
//! `ProjectIndexer` is where the memo layer is applied. Each expensive
//! resolver is wrapped once at construction; every pass then reuses the
//! cached manifests, layouts and addon sets until their TTL runs out.

use rayon::prelude::*;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::scanner::CollectionScanner;
use crate::config::Settings;
use crate::project_resolver::{
    AddonRoot, AddonRootResolver, CachedManifests, InRepoAddonRootResolver, ManifestSource,
    Memoized, PackageReader, ProjectLayout, ProjectLayoutDetector, absolute_root, memoize,
};
use crate::registry::ArtifactRegistry;
use crate::types::{ArtifactKind, Descriptor};

/// Result of one resolution pass over a project
#[derive(Debug, Clone)]
pub struct IndexReport {
    pub root: PathBuf,
    pub layout: ProjectLayout,
    /// Addon roots that were scanned
    pub addon_roots: Vec<AddonRoot>,
    /// Roots left out: version 2 addons and extension-only packages
    pub skipped_roots: Vec<AddonRoot>,
    pub descriptors: Vec<Descriptor>,
    pub registry: ArtifactRegistry,
}

/// Descriptors found under one root, with the addon that owns them
struct ScanOutcome {
    owner: Option<AddonRoot>,
    descriptors: Vec<Descriptor>,
}

struct ScanTarget {
    root: PathBuf,
    layout: ProjectLayout,
    owner: Option<AddonRoot>,
}

pub struct ProjectIndexer {
    settings: Arc<Settings>,
    manifests: Arc<CachedManifests>,
    layouts: Memoized<(PathBuf,), ProjectLayout>,
    addon_roots: Memoized<(PathBuf, String), Vec<AddonRoot>>,
    in_repo_roots: Memoized<(PathBuf,), Vec<AddonRoot>>,
    /// `None` when scans run sequentially
    scan_pool: Option<rayon::ThreadPool>,
}

impl ProjectIndexer {
    pub fn new(settings: Arc<Settings>) -> Self {
        let resolver = &settings.resolver;
        let short = Duration::from_secs(resolver.short_ttl_secs);
        let long = Duration::from_secs(resolver.long_ttl_secs);

        let reader = PackageReader::new(&resolver.manifest_file, &resolver.entry_module);
        let manifests = Arc::new(CachedManifests::new(reader, short));

        let layouts = memoize(
            "layout",
            |(root,): &(PathBuf,)| ProjectLayoutDetector::detect(root),
            1,
            short,
        );

        let source = Arc::clone(&manifests);
        let addon_roots = memoize(
            "addon-roots",
            move |(root, folder): &(PathBuf, String)| {
                AddonRootResolver::new(source.as_ref()).resolve_in(root, folder)
            },
            2,
            long,
        );

        let source = Arc::clone(&manifests);
        let packages_folder = resolver.packages_folder.clone();
        let in_repo_roots = memoize(
            "in-repo-roots",
            move |(root,): &(PathBuf,)| {
                InRepoAddonRootResolver::new(source.as_ref())
                    .with_packages_folder(packages_folder.clone())
                    .resolve(root)
            },
            1,
            long,
        );

        let scan_pool = build_scan_pool(&settings);

        Self {
            settings,
            manifests,
            layouts,
            addon_roots,
            in_repo_roots,
            scan_pool,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn layout(&self, root: &Path) -> ProjectLayout {
        (*self.layouts.call((absolute_root(root),))).clone()
    }

    pub fn addon_roots(&self, root: &Path) -> Vec<AddonRoot> {
        let folder = self.settings.resolver.packages_folder.clone();
        self.addon_roots.call((absolute_root(root), folder)).to_vec()
    }

    pub fn in_repo_roots(&self, root: &Path) -> Vec<AddonRoot> {
        self.in_repo_roots.call((absolute_root(root),)).to_vec()
    }

    /// Dependency and in-repo roots merged, sorted, without duplicates.
    pub fn all_addon_roots(&self, root: &Path) -> Vec<AddonRoot> {
        let merged: BTreeSet<AddonRoot> = self
            .addon_roots(root)
            .into_iter()
            .chain(self.in_repo_roots(root))
            .collect();
        merged.into_iter().collect()
    }

    /// Drop every cached manifest, layout and addon set.
    pub fn invalidate(&self) {
        self.manifests.invalidate_all();
        self.layouts.invalidate_all();
        self.addon_roots.invalidate_all();
        self.in_repo_roots.invalidate_all();
    }

    /// Whether a root's artifacts are scanned.
    ///
    /// Version 2 addons are resolved by a different mechanism and skipped;
    /// extension-only packages contribute configuration, not artifacts.
    fn is_scannable(&self, root: &AddonRoot) -> bool {
        let manifest = self.manifests.manifest(root.as_path());
        match manifest.addon_version() {
            Some(1) => self.manifests.is_addon_root(root.as_path()),
            Some(version) => {
                tracing::debug!(addon = %root, version, "skipping addon version");
                false
            }
            None => false,
        }
    }

    /// Run a full pass with a fresh registry.
    pub fn index(&self, root: &Path) -> IndexReport {
        let root = absolute_root(root);
        let registry = ArtifactRegistry::new();
        let layout = self.layout(&root);

        let (addon_roots, skipped_roots): (Vec<AddonRoot>, Vec<AddonRoot>) = self
            .all_addon_roots(&root)
            .into_iter()
            .partition(|addon| self.is_scannable(addon));

        let outcomes = self.scan_all(&root, layout.clone(), &addon_roots, &registry);
        let descriptors = dedup_descriptors(outcomes.into_iter().flat_map(|o| o.descriptors));

        tracing::info!(
            root = %root.display(),
            layout = %layout,
            addons = addon_roots.len(),
            skipped = skipped_roots.len(),
            entries = registry.len(),
            "indexed project"
        );

        IndexReport {
            root,
            layout,
            addon_roots,
            skipped_roots,
            descriptors,
            registry,
        }
    }

    /// Component descriptors whose label starts with `prefix`.
    ///
    /// When the project opts into namespacing, addon components are labeled
    /// `<moduleName>$<label>`.
    pub fn complete_components(&self, root: &Path, prefix: &str) -> Vec<Descriptor> {
        let root = absolute_root(root);
        let registry = ArtifactRegistry::new();
        let layout = self.layout(&root);
        let addon_roots: Vec<AddonRoot> = self
            .all_addon_roots(&root)
            .into_iter()
            .filter(|addon| self.is_scannable(addon))
            .collect();

        let namespaced = self.uses_namespacing(&root);
        let outcomes = self.scan_kinds(
            &root,
            layout,
            &addon_roots,
            &registry,
            &[ArtifactKind::Component],
        );

        let labeled = outcomes.into_iter().flat_map(|outcome| {
            let module = outcome
                .owner
                .as_ref()
                .filter(|_| namespaced)
                .and_then(|owner| self.module_name(owner));
            outcome.descriptors.into_iter().map(move |mut descriptor| {
                if let Some(module) = &module {
                    descriptor.label = format!("{module}${}", descriptor.label);
                }
                descriptor
            })
        });

        dedup_descriptors(labeled.filter(|d| d.label.starts_with(prefix)))
    }

    /// Files sharing a registry entry with `file` after a full pass
    pub fn related_files(&self, root: &Path, file: &Path) -> Vec<PathBuf> {
        let file = absolute_root(file);
        self.index(root).registry.find_related_files(&file)
    }

    fn uses_namespacing(&self, root: &Path) -> bool {
        let namespacing = &self.settings.namespacing;
        namespacing.enabled
            && self
                .manifests
                .manifest(root)
                .has_dependency(&namespacing.marker_dependency)
    }

    fn module_name(&self, owner: &AddonRoot) -> Option<String> {
        let manifest = self.manifests.manifest(owner.as_path());
        self.manifests
            .reader()
            .module_name(owner.as_path(), &manifest)
    }

    fn scan_all(
        &self,
        root: &Path,
        layout: ProjectLayout,
        addon_roots: &[AddonRoot],
        registry: &ArtifactRegistry,
    ) -> Vec<ScanOutcome> {
        let kinds = self.settings.indexing.kinds.clone();
        self.scan_kinds(root, layout, addon_roots, registry, &kinds)
    }

    fn scan_kinds(
        &self,
        root: &Path,
        layout: ProjectLayout,
        addon_roots: &[AddonRoot],
        registry: &ArtifactRegistry,
        kinds: &[ArtifactKind],
    ) -> Vec<ScanOutcome> {
        let mut targets = vec![ScanTarget {
            root: root.to_path_buf(),
            layout,
            owner: None,
        }];
        targets.extend(addon_roots.iter().map(|addon| ScanTarget {
            root: addon.as_path().to_path_buf(),
            layout: self.layout(addon.as_path()),
            owner: Some(addon.clone()),
        }));

        let scanner = CollectionScanner::new(registry.clone());
        let scan = |target: &ScanTarget| ScanOutcome {
            owner: target.owner.clone(),
            descriptors: scanner.scan_kinds(&target.root, &target.layout, kinds),
        };

        match &self.scan_pool {
            // par_iter keeps target order in the collected output
            Some(pool) if targets.len() > 1 => {
                pool.install(|| targets.par_iter().map(scan).collect())
            }
            _ => targets.iter().map(scan).collect(),
        }
    }
}

fn build_scan_pool(settings: &Settings) -> Option<rayon::ThreadPool> {
    let indexing = &settings.indexing;
    if !indexing.parallel {
        return None;
    }

    match rayon::ThreadPoolBuilder::new()
        .num_threads(indexing.parallel_threads)
        .thread_name(|i| format!("addon-scan-{i}"))
        .build()
    {
        Ok(pool) => Some(pool),
        Err(e) => {
            tracing::warn!("falling back to sequential scans: {e}");
            None
        }
    }
}

/// Keep the first descriptor per `(label, detail)`, preserving order.
fn dedup_descriptors(descriptors: impl IntoIterator<Item = Descriptor>) -> Vec<Descriptor> {
    let mut seen = HashSet::new();
    descriptors
        .into_iter()
        .filter(|d| seen.insert((d.label.clone(), d.detail.clone())))
        .collect()
}
