//! Project type detection and source file selection for code summaries.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::domain::{KeyFilesContent, ProjectType, RepositorySnapshot};

/// Upper bound on the number of files selected for summarisation.
pub const MAX_SELECTED_FILES: usize = 25;

const MAX_FILES_PER_CORE_DIR: usize = 3;

/// Directory prefixes searched for core source files, in priority order.
pub const CORE_DIRECTORIES: &[&str] = &[
    "src/lib/",
    "src/core/",
    "lib/",
    "core/",
    "src/app/api/",
    "src/pages/api/",
    "api/",
    "routes/",
    "controllers/",
    "models/",
    "schema.prisma",
    "src/components/",
    "components/",
];

const NEXT_CONFIGS: &[&str] = &["next.config.js", "next.config.ts", "next.config.mjs"];
const LIBRARY_INDEX_FILES: &[&str] = &["src/index.ts", "src/index.js", "lib/index.js", "index.ts"];
const APPLICATION_MARKERS: &[&str] = &["app.", "server.", "main."];

/// Canonical entry point paths for a project type, in priority order.
pub fn entry_point_candidates(project_type: ProjectType) -> &'static [&'static str] {
    match project_type {
        ProjectType::Nextjs => &[
            "src/app/page.tsx",
            "src/app/page.js",
            "src/pages/index.tsx",
            "src/pages/index.js",
            "pages/index.tsx",
            "pages/index.js",
            "app/page.tsx",
        ],
        ProjectType::React => &[
            "src/App.tsx",
            "src/App.jsx",
            "src/index.tsx",
            "src/index.jsx",
            "src/main.tsx",
            "src/main.jsx",
        ],
        ProjectType::Vue => &["src/App.vue", "src/main.ts", "src/main.js"],
        ProjectType::Express => &[
            "src/server.ts",
            "src/app.ts",
            "server.js",
            "app.js",
            "src/index.ts",
            "index.js",
        ],
        ProjectType::Django => &["manage.py", "settings.py", "urls.py", "wsgi.py"],
        ProjectType::Flask => &["app.py", "main.py", "application.py", "wsgi.py"],
        ProjectType::Fastapi => &["main.py", "app/main.py", "src/main.py"],
        ProjectType::Cli => &["src/cli.ts", "src/index.ts", "bin/cli.js", "cli.js"],
        ProjectType::Library => &["src/index.ts", "lib/index.js", "index.ts", "src/lib.rs"],
        ProjectType::ReactNative => &["App.tsx", "App.js", "index.js", "app/index.tsx"],
        ProjectType::Go => &["main.go", "cmd/main.go", "cmd/server/main.go"],
        ProjectType::Rust => &["src/main.rs", "src/lib.rs"],
        ProjectType::Python => &["__main__.py", "main.py", "setup.py", "app.py"],
        ProjectType::Unknown => &[],
    }
}

/// Classify a repository snapshot.
pub fn detect_snapshot_type(snapshot: &RepositorySnapshot) -> ProjectType {
    detect_project_type(
        &snapshot.files,
        snapshot.package_json(),
        snapshot.metadata.language.as_deref(),
    )
}

/// Classify a repository from its file listing, `package.json`, and language.
///
/// An unparseable `package.json` is treated as declaring no dependencies.
/// Python framework detection searches the `package.json` text, not
/// `requirements.txt`, so it only fires when that text names the framework.
pub fn detect_project_type(
    files: &[String],
    package_json: Option<&str>,
    language: Option<&str>,
) -> ProjectType {
    let deps = package_dependencies(package_json);
    let has_dep = |name: &str| deps.contains(name);
    let has_file = |name: &str| files.iter().any(|f| f == name);
    let language = language.map(str::to_lowercase);
    let language_is = |name: &str| language.as_deref() == Some(name);

    if has_dep("next") || NEXT_CONFIGS.iter().any(|config| has_file(config)) {
        return ProjectType::Nextjs;
    }
    if has_dep("react-native") {
        return ProjectType::ReactNative;
    }
    if has_dep("react") || has_dep("react-dom") {
        return ProjectType::React;
    }
    if has_dep("vue") {
        return ProjectType::Vue;
    }
    if has_dep("express") {
        return ProjectType::Express;
    }

    if has_file("requirements.txt") && language_is("python") {
        if let Some(framework) = package_json.and_then(python_framework) {
            return framework;
        }
    }

    if has_file("go.mod") || language_is("go") {
        return ProjectType::Go;
    }
    if has_file("Cargo.toml") || language_is("rust") {
        return ProjectType::Rust;
    }
    if language_is("python") {
        return ProjectType::Python;
    }

    let has_index = LIBRARY_INDEX_FILES.iter().any(|index| has_file(index));
    let has_app = files
        .iter()
        .any(|f| APPLICATION_MARKERS.iter().any(|marker| f.contains(marker)));
    if has_index && !has_app {
        return ProjectType::Library;
    }

    ProjectType::Unknown
}

/// Entry points of `project_type` present in `files`, in table order.
pub fn find_entry_points(files: &[String], project_type: ProjectType) -> Vec<String> {
    entry_point_candidates(project_type)
        .iter()
        .filter(|candidate| files.iter().any(|f| f == *candidate))
        .map(|candidate| candidate.to_string())
        .collect()
}

/// Select up to [`MAX_SELECTED_FILES`] source files worth reading.
///
/// Entry points come first, then up to three files per core directory, then
/// top-level source files. The top-level filter keeps the grouping
/// `(src child) || (root && .ts) || .js || .tsx`, so `.js` and `.tsx` files at
/// any depth qualify.
pub fn select_files(
    files: &[String],
    project_type: ProjectType,
    _key_files: &KeyFilesContent,
) -> Vec<String> {
    let mut selection = Selection::default();

    for entry in find_entry_points(files, project_type) {
        selection.push(entry);
    }

    for prefix in CORE_DIRECTORIES {
        let mut added = 0;
        for path in files
            .iter()
            .filter(|f| f.starts_with(prefix) && is_core_candidate(f))
        {
            if added == MAX_FILES_PER_CORE_DIR {
                break;
            }
            if selection.push(path.clone()) {
                added += 1;
            }
        }
        if selection.len() >= MAX_SELECTED_FILES {
            break;
        }
    }

    for path in files.iter().filter(|f| is_top_level_source(f)) {
        if selection.len() >= MAX_SELECTED_FILES {
            break;
        }
        selection.push(path.clone());
    }

    let mut selected = selection.into_inner();
    selected.truncate(MAX_SELECTED_FILES);
    selected
}

/// Ordered, duplicate-free list of selected paths.
#[derive(Default)]
struct Selection {
    paths: Vec<String>,
    seen: BTreeSet<String>,
}

impl Selection {
    /// Returns `true` when the path was not already selected.
    fn push(&mut self, path: String) -> bool {
        if !self.seen.insert(path.clone()) {
            return false;
        }
        self.paths.push(path);
        true
    }

    fn contains(&self, path: &str) -> bool {
        self.seen.contains(path)
    }

    fn len(&self) -> usize {
        self.paths.len()
    }

    fn into_inner(self) -> Vec<String> {
        self.paths
    }
}

fn package_dependencies(package_json: Option<&str>) -> BTreeSet<String> {
    let Some(text) = package_json else {
        return BTreeSet::new();
    };
    let Ok(manifest) = serde_json::from_str::<Value>(text) else {
        log::debug!("package.json is not valid JSON; ignoring dependencies");
        return BTreeSet::new();
    };
    ["dependencies", "devDependencies"]
        .iter()
        .filter_map(|section| manifest.get(section).and_then(Value::as_object))
        .flat_map(|deps| deps.keys())
        .map(|name| name.to_lowercase())
        .collect()
}

fn python_framework(text: &str) -> Option<ProjectType> {
    let text = text.to_lowercase();
    if text.contains("fastapi") {
        Some(ProjectType::Fastapi)
    } else if text.contains("flask") {
        Some(ProjectType::Flask)
    } else if text.contains("django") {
        Some(ProjectType::Django)
    } else {
        None
    }
}

fn is_core_candidate(path: &str) -> bool {
    !path.contains(".test.")
        && !path.contains(".spec.")
        && !path.ends_with(".css")
        && !path.ends_with(".scss")
        && !path.ends_with(".json")
}

fn is_top_level_source(path: &str) -> bool {
    let src_child = path.starts_with("src/") && path.matches('/').count() == 1;
    let root_ts = !path.contains('/') && path.ends_with(".ts");
    src_child || root_ts || path.ends_with(".js") || path.ends_with(".tsx")
}
