//! Addon root resolution and artifact registry for Ember-style projects
//!
//! Resolves which addon packages belong to a project, detects the project's
//! directory layout and scans artifact collections into a shared registry.

pub mod config;
pub mod error;
pub mod indexing;
pub mod project;
pub mod project_resolver;
pub mod registry;
pub mod types;

// Explicit exports for better API clarity
pub use config::Settings;
pub use error::{IndexError, IndexResult};
pub use indexing::{CollectionScanner, IndexReport, ProjectIndexer};
pub use project::{PathMatch, Project};
pub use project_resolver::{
    AddonRoot, AddonRootResolver, InRepoAddonRootResolver, PackageDescriptor, PackageReader,
    ProjectLayout, ProjectLayoutDetector, ResolutionError, memoize,
};
pub use registry::{ArtifactRegistry, RegistrySnapshot};
pub use types::{ArtifactKind, CompletionKind, Descriptor};
