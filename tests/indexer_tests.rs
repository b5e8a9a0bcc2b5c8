//! Full resolution passes through `ProjectIndexer`

mod common;

use addon_index::{ArtifactKind, CompletionKind, ProjectIndexer, ProjectLayout, Settings};
use common::{TestProject, dep_map, sequential_settings};
use serde_json::json;
use std::sync::Arc;

const NAMESPACING_MARKER: &str = "ember-holy-futuristic-template-namespacing-batman";

fn labels(descriptors: &[addon_index::Descriptor]) -> Vec<&str> {
    descriptors.iter().map(|d| d.label.as_str()).collect()
}

#[test]
fn test_addon_components_reach_the_registry() {
    let project = TestProject::with_dependencies(&["addon-a"]);
    let addon = project.add_addon("node_modules/addon-a", "addon-a", &[]);
    let file = project.add_file("node_modules/addon-a/addon/components/foo/component.js", "");

    let indexer = ProjectIndexer::new(Arc::new(sequential_settings()));
    let report = indexer.index(project.path());

    assert_eq!(report.addon_roots, vec![addon]);
    assert_eq!(report.registry.get("foo", ArtifactKind::Component), vec![file]);
    assert!(
        report
            .descriptors
            .iter()
            .any(|d| d.label == "foo" && d.kind == CompletionKind::Class)
    );
}

#[test]
fn test_pod_project_end_to_end() {
    let project = TestProject::new();
    project.add_manifest("", json!({ "name": "my-app" }));
    project.add_file(
        "config/environment.js",
        "module.exports = function() { return { podModulePrefix: 'my-app/pods' }; };\n",
    );
    let script = project.add_file("app/pods/components/widget/component.js", "");
    let template = project.add_file("app/pods/components/widget/template.hbs", "");

    let indexer = ProjectIndexer::new(Arc::new(sequential_settings()));
    let report = indexer.index(project.path());

    assert_eq!(
        report.layout,
        ProjectLayout::Pod {
            prefix: "pods".to_string()
        }
    );
    assert_eq!(
        report.registry.get("widget", ArtifactKind::Component),
        vec![script, template]
    );
    assert_eq!(
        report
            .descriptors
            .iter()
            .filter(|d| d.label == "widget")
            .count(),
        1
    );
}

#[test]
fn test_version_two_addons_are_resolved_but_not_scanned() {
    let project = TestProject::with_dependencies(&["modern", "classic"]);
    project.add_manifest(
        "node_modules/modern",
        json!({
            "name": "modern",
            "keywords": ["ember-addon"],
            "ember-addon": { "version": 2 },
        }),
    );
    project.add_file("node_modules/modern/index.js", "");
    project.add_file("node_modules/modern/addon/helpers/modern-helper.js", "");
    let classic = project.add_addon("node_modules/classic", "classic", &[]);
    project.add_file("node_modules/classic/addon/helpers/classic-helper.js", "");

    let indexer = ProjectIndexer::new(Arc::new(sequential_settings()));
    let report = indexer.index(project.path());

    assert_eq!(report.addon_roots, vec![classic]);
    assert_eq!(report.skipped_roots, vec![project.addon_root("node_modules/modern")]);
    assert!(report.registry.contains("classic-helper", ArtifactKind::Helper));
    assert!(!report.registry.contains("modern-helper", ArtifactKind::Helper));
}

#[test]
fn test_namespaced_component_labels() {
    let project = TestProject::with_dependencies(&[NAMESPACING_MARKER, "ui-kit"]);
    project.add_addon("node_modules/ui-kit", "@acme/ui-kit", &[]);
    project.add_file(
        "node_modules/ui-kit/index.js",
        "module.exports = {\n  moduleName() { return 'ui'; }\n};\n",
    );
    project.add_file("node_modules/ui-kit/addon/components/button.js", "");
    project.add_file("app/components/local-card.js", "");

    let indexer = ProjectIndexer::new(Arc::new(sequential_settings()));
    let all = indexer.complete_components(project.path(), "");
    assert_eq!(labels(&all), vec!["local-card", "ui$button"]);

    let filtered = indexer.complete_components(project.path(), "ui$");
    assert_eq!(labels(&filtered), vec!["ui$button"]);
}

#[test]
fn test_namespacing_requires_marker_dependency() {
    let project = TestProject::with_dependencies(&["ui-kit"]);
    project.add_addon("node_modules/ui-kit", "@acme/ui-kit", &[]);
    project.add_file("node_modules/ui-kit/addon/components/button.js", "");

    let indexer = ProjectIndexer::new(Arc::new(sequential_settings()));
    assert_eq!(
        labels(&indexer.complete_components(project.path(), "")),
        vec!["button"]
    );
}

#[test]
fn test_module_name_falls_back_to_package_name() {
    let project = TestProject::with_dependencies(&[NAMESPACING_MARKER, "ui-kit"]);
    project.add_addon("node_modules/ui-kit", "@acme/ui-kit", &[]);
    project.add_file("node_modules/ui-kit/addon/components/button.js", "");

    let indexer = ProjectIndexer::new(Arc::new(sequential_settings()));
    assert_eq!(
        labels(&indexer.complete_components(project.path(), "")),
        vec!["ui-kit$button"]
    );
}

#[test]
fn test_namespacing_can_be_disabled() {
    let project = TestProject::with_dependencies(&[NAMESPACING_MARKER, "ui-kit"]);
    project.add_addon("node_modules/ui-kit", "ui-kit", &[]);
    project.add_file("node_modules/ui-kit/addon/components/button.js", "");

    let mut settings = sequential_settings();
    settings.namespacing.enabled = false;
    let indexer = ProjectIndexer::new(Arc::new(settings));
    assert_eq!(
        labels(&indexer.complete_components(project.path(), "")),
        vec!["button"]
    );
}

#[test]
fn test_related_files_share_an_entry() {
    let project = TestProject::new();
    project.add_manifest("", json!({ "name": "my-app" }));
    let script = project.add_file("app/components/x-button.js", "");
    let template = project.add_file("app/templates/components/x-button.hbs", "");
    project.add_file("app/helpers/unrelated.js", "");

    let indexer = ProjectIndexer::new(Arc::new(sequential_settings()));
    assert_eq!(indexer.related_files(project.path(), &script), vec![template]);
}

#[test]
fn test_parallel_and_sequential_passes_agree() {
    let project = TestProject::with_dependencies(&["a", "b"]);
    project.add_addon("node_modules/a", "a", &[]);
    project.add_addon("node_modules/b", "b", &[]);
    project.add_file("node_modules/a/addon/services/session.js", "");
    project.add_file("node_modules/b/addon/modifiers/focus.js", "");
    project.add_file("app/routes/posts.js", "");
    project.add_file("app/models/post.js", "");

    let sequential = ProjectIndexer::new(Arc::new(sequential_settings())).index(project.path());

    let mut settings = Settings::default();
    settings.indexing.parallel = true;
    settings.indexing.parallel_threads = 4;
    let parallel = ProjectIndexer::new(Arc::new(settings)).index(project.path());

    assert_eq!(sequential.descriptors, parallel.descriptors);
    assert_eq!(sequential.registry.snapshot(), parallel.registry.snapshot());
}

#[test]
fn test_configured_kinds_limit_the_pass() {
    let project = TestProject::new();
    project.add_manifest("", json!({ "name": "my-app" }));
    project.add_file("app/helpers/format-date.js", "");
    project.add_file("app/services/session.js", "");

    let mut settings = sequential_settings();
    settings.indexing.kinds = vec![ArtifactKind::Helper];
    let report = ProjectIndexer::new(Arc::new(settings)).index(project.path());

    assert_eq!(labels(&report.descriptors), vec!["format-date"]);
    assert!(!report.registry.contains("session", ArtifactKind::Service));
}

#[test]
fn test_cached_roots_survive_until_invalidated() {
    let project = TestProject::new();
    project.add_manifest(
        "",
        json!({ "name": "my-app", "dependencies": dep_map(&["late"]) }),
    );

    let indexer = ProjectIndexer::new(Arc::new(sequential_settings()));
    assert!(indexer.addon_roots(project.path()).is_empty());

    let late = project.add_addon("node_modules/late", "late", &[]);
    assert!(indexer.addon_roots(project.path()).is_empty());

    indexer.invalidate();
    assert_eq!(indexer.addon_roots(project.path()), vec![late]);
}

#[test]
fn test_in_repo_and_installed_roots_are_merged() {
    let project = TestProject::new();
    project.add_manifest(
        "",
        json!({
            "name": "my-app",
            "dependencies": dep_map(&["shared"]),
            "ember-addon": { "paths": ["lib/local"] },
        }),
    );
    let shared = project.add_addon("node_modules/shared", "shared", &[]);
    let local = project.add_addon("lib/local", "local", &[]);

    let indexer = ProjectIndexer::new(Arc::new(sequential_settings()));
    assert_eq!(indexer.all_addon_roots(project.path()), vec![local, shared]);
}
