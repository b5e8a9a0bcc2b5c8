#![allow(dead_code)]

use addon_index::{AddonRoot, Settings};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestProject {
    pub dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Project whose root manifest declares `deps` as dependencies
    pub fn with_dependencies(deps: &[&str]) -> Self {
        let project = Self::new();
        project.add_manifest(
            "",
            json!({ "name": "host-app", "dependencies": dep_map(deps) }),
        );
        project
    }

    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    pub fn add_manifest(&self, dir: &str, manifest: Value) -> PathBuf {
        let path = if dir.is_empty() {
            "package.json".to_string()
        } else {
            format!("{dir}/package.json")
        };
        let content =
            serde_json::to_string_pretty(&manifest).expect("Failed to serialize manifest");
        self.add_file(&path, &content)
    }

    /// Addon package: keyword, entry module and `deps` as dependencies
    pub fn add_addon(&self, dir: &str, name: &str, deps: &[&str]) -> AddonRoot {
        self.add_manifest(
            dir,
            json!({
                "name": name,
                "keywords": ["ember-addon"],
                "dependencies": dep_map(deps),
            }),
        );
        self.add_file(&format!("{dir}/index.js"), "module.exports = {};\n");
        self.addon_root(dir)
    }

    pub fn addon_root(&self, dir: &str) -> AddonRoot {
        AddonRoot::new(self.dir.path().join(dir))
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

pub fn dep_map(deps: &[&str]) -> Value {
    Value::Object(
        deps.iter()
            .map(|name| (name.to_string(), Value::String("*".to_string())))
            .collect(),
    )
}

/// Default settings with scans kept on the calling thread
pub fn sequential_settings() -> Settings {
    let mut settings = Settings::default();
    settings.indexing.parallel = false;
    settings
}
