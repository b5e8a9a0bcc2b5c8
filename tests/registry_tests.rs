//! Registry behavior shared between scans and host projects

mod common;

use addon_index::indexing::naming::{canonical_name, relative_path};
use addon_index::{
    ArtifactKind, ArtifactRegistry, CollectionScanner, PathMatch, Project, ProjectLayout,
};
use common::TestProject;
use std::path::{Path, PathBuf};

/// Host project that classifies test files by their folder
struct TestsFolderProject {
    root: PathBuf,
}

impl Project for TestsFolderProject {
    fn root(&self) -> &Path {
        &self.root
    }

    fn match_path_to_type(&self, path: &Path) -> Option<PathMatch> {
        let relative = relative_path(&self.root, path)?;
        let rest = relative.strip_prefix("tests/integration/components/")?;
        let name = canonical_name(rest);
        Some(PathMatch::new(name.strip_suffix("-test")?, ArtifactKind::Component))
    }
}

#[test]
fn test_project_files_join_scanned_entries() {
    let project = TestProject::new();
    let script = project.add_file("app/components/date-picker.js", "");
    let test_file = project.add_file("tests/integration/components/date-picker-test.js", "");

    let scanner = CollectionScanner::default();
    scanner.scan(project.path(), &ProjectLayout::Classic, ArtifactKind::Component);

    let host = TestsFolderProject {
        root: project.path().to_path_buf(),
    };
    let registered = scanner.registry().register_project_files(
        &host,
        [
            "tests/integration/components/date-picker-test.js",
            "tests/unit/models/user-test.js",
            "README.md",
        ],
    );

    assert_eq!(registered, 1);
    assert_eq!(
        scanner.registry().get("date-picker", ArtifactKind::Component),
        vec![script.clone(), test_file.clone()]
    );
    assert_eq!(scanner.registry().find_related_files(&test_file), vec![script]);
}

#[test]
fn test_registry_merge_and_snapshot() {
    let first = ArtifactRegistry::new();
    first.add_entry("session", ArtifactKind::Service, ["/p/app/services/session.js"]);

    let second = ArtifactRegistry::new();
    second.add_entry(
        "session",
        ArtifactKind::Service,
        ["/p/node_modules/auth/addon/services/session.js"],
    );
    second.add_entry("posts", ArtifactKind::RoutePath, ["/p/app/routes/posts.js"]);

    first.merge(&second);
    first.merge(&first.clone());

    let snapshot = first.snapshot();
    assert_eq!(snapshot.entries.len(), 2);
    assert_eq!(
        snapshot.entries[&ArtifactKind::Service]["session"],
        vec![
            PathBuf::from("/p/app/services/session.js"),
            PathBuf::from("/p/node_modules/auth/addon/services/session.js"),
        ]
    );

    let json = serde_json::to_value(&snapshot).unwrap();
    assert!(json["entries"]["route-path"]["posts"].is_array());
}

#[test]
fn test_paths_are_normalized_on_insert() {
    let registry = ArtifactRegistry::new();
    registry.add_entry(
        "format-date",
        ArtifactKind::Helper,
        ["/p/lib/../app/helpers/./format-date.js"],
    );
    assert_eq!(
        registry.find_related_files(Path::new("/p/app/helpers/format-date.js")),
        Vec::<PathBuf>::new()
    );
    assert_eq!(
        registry.get("format-date", ArtifactKind::Helper),
        vec![PathBuf::from("/p/app/helpers/format-date.js")]
    );
}
