//! Manifest source trait shared by the resolvers

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::ResolutionError;
use super::manifest::{PackageDescriptor, PackageReader};
use super::memo::{Memoized, memoize};

/// Anything that can hand out the manifest of a directory.
///
/// Implemented by the plain `PackageReader` and by `CachedManifests`, so the
/// resolvers work the same with or without the memo layer.
pub trait ManifestSource: Send + Sync {
    fn manifest(&self, dir: &Path) -> Arc<PackageDescriptor>;

    fn reader(&self) -> &PackageReader;

    fn has_manifest(&self, dir: &Path) -> bool {
        self.reader().manifest_path(dir).is_file()
    }

    /// Readable manifest, addon keyword and entry module present
    fn is_addon_root(&self, dir: &Path) -> bool {
        if !self.manifest(dir).is_addon() {
            return false;
        }
        let has_entry = dir.join(self.reader().entry_module()).is_file();
        if !has_entry {
            let reason = ResolutionError::MissingEntryModule {
                root: dir.to_path_buf(),
            };
            tracing::debug!("{reason}");
        }
        has_entry
    }

    /// Carries the extension configuration marker
    fn is_extension_root(&self, dir: &Path) -> bool {
        self.manifest(dir).has_extension_config()
    }
}

impl ManifestSource for PackageReader {
    fn manifest(&self, dir: &Path) -> Arc<PackageDescriptor> {
        Arc::new(self.read(dir))
    }

    fn reader(&self) -> &PackageReader {
        self
    }
}

/// `PackageReader` behind a short-lived memo.
pub struct CachedManifests {
    reader: PackageReader,
    memo: Memoized<(PathBuf,), PackageDescriptor>,
}

impl CachedManifests {
    pub fn new(reader: PackageReader, ttl: Duration) -> Self {
        let inner = reader.clone();
        let memo = memoize("manifest", move |(dir,): &(PathBuf,)| inner.read(dir), 1, ttl);
        Self { reader, memo }
    }

    pub fn invalidate_all(&self) {
        self.memo.invalidate_all();
    }
}

impl ManifestSource for CachedManifests {
    fn manifest(&self, dir: &Path) -> Arc<PackageDescriptor> {
        self.memo.call((dir.to_path_buf(),))
    }

    fn reader(&self) -> &PackageReader {
        &self.reader
    }
}
