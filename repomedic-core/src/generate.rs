//! Generation of missing project files.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::domain::RepositorySnapshot;
use crate::error::{RepoMedicError, Result};
use crate::github::{RepoRef, RepositoryHost};
use crate::llm::{RetryPolicy, Sleeper, TextGenerator, generate_with_retry};
use crate::scorer::has_test_files;

const README_FILE_TREE_LIMIT: usize = 50;
const README_KEY_FILES_CHARS: usize = 2000;
const GITIGNORE_FILE_LIMIT: usize = 30;
const API_DOC_FILE_LIMIT: usize = 10;
const API_DOC_FILE_CHARS: usize = 2000;
const CODE_EXTENSIONS: &[&str] = &[".ts", ".js", ".tsx", ".jsx", ".py", ".java", ".go", ".rs"];
const CI_MARKERS: &[&str] = &[".github/workflows", ".travis.yml", ".circleci"];

/// Kinds of project file RepoMedic can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum GeneratedFileKind {
    /// README.md
    Readme,
    /// .gitignore
    Gitignore,
    /// LICENSE (MIT)
    License,
    /// CONTRIBUTING.md
    Contributing,
    /// API_DOCS.md
    ApiDocs,
}

impl GeneratedFileKind {
    /// Every kind, in presentation order.
    pub const ALL: [GeneratedFileKind; 5] = [
        Self::Readme,
        Self::Gitignore,
        Self::License,
        Self::Contributing,
        Self::ApiDocs,
    ];

    /// Stable identifier used on the wire and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Readme => "readme",
            Self::Gitignore => "gitignore",
            Self::License => "license",
            Self::Contributing => "contributing",
            Self::ApiDocs => "apiDocs",
        }
    }

    /// Name of the file written for this kind.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Readme => "README.md",
            Self::Gitignore => ".gitignore",
            Self::License => "LICENSE",
            Self::Contributing => "CONTRIBUTING.md",
            Self::ApiDocs => "API_DOCS.md",
        }
    }
}

impl fmt::Display for GeneratedFileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeneratedFileKind {
    type Err = RepoMedicError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "readme" => Ok(Self::Readme),
            "gitignore" => Ok(Self::Gitignore),
            "license" => Ok(Self::License),
            "contributing" => Ok(Self::Contributing),
            "apidocs" | "api-docs" | "api_docs" => Ok(Self::ApiDocs),
            other => Err(RepoMedicError::Other(format!("unknown file kind: {other}"))),
        }
    }
}

/// A generated file ready to be written or returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedFile {
    /// What was generated.
    pub kind: GeneratedFileKind,
    /// Target file name.
    pub file_name: String,
    /// File content.
    pub content: String,
    /// Framework guessed for `.gitignore` generation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_framework: Option<String>,
    /// Source files fed into API documentation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files_documented: Vec<String>,
}

impl GeneratedFile {
    fn new(kind: GeneratedFileKind, content: String) -> Self {
        Self {
            kind,
            file_name: kind.file_name().to_string(),
            content,
            detected_framework: None,
            files_documented: Vec::new(),
        }
    }
}

/// A generation failure for one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GenerationFailure {
    /// Kind that failed.
    pub kind: GeneratedFileKind,
    /// Error message.
    pub error: String,
}

/// Result of generating several files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GenerationOutcome {
    /// Files generated successfully, in request order.
    pub files: Vec<GeneratedFile>,
    /// Failures, in request order.
    pub errors: Vec<GenerationFailure>,
}

/// External capabilities used during generation.
#[derive(Clone, Copy)]
pub struct GenerationServices<'a> {
    /// Repository host for reading source files.
    pub host: &'a dyn RepositoryHost,
    /// LLM used for prose.
    pub generator: &'a dyn TextGenerator,
    /// Sleeper used between retries.
    pub sleeper: &'a dyn Sleeper,
    /// Retry policy for LLM calls.
    pub retry: RetryPolicy,
}

/// What is being generated for.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    /// Repository the files belong to.
    pub repo: &'a RepoRef,
    /// Snapshot of the repository.
    pub snapshot: &'a RepositorySnapshot,
    /// Copyright year for the license.
    pub year: i32,
}

/// Framework and package manager guessed from a file listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackGuess {
    /// Framework or ecosystem name.
    pub framework: &'static str,
    /// Package manager name.
    pub package_manager: &'static str,
}

/// Guess the framework and package manager for `.gitignore` generation.
pub fn detect_stack(files: &[String]) -> StackGuess {
    let has = |name: &str| files.iter().any(|f| f == name);
    let mentions = |needle: &str| files.iter().any(|f| f.contains(needle));
    let guess = |framework, package_manager| StackGuess {
        framework,
        package_manager,
    };

    if has("package.json") {
        let framework = if mentions("next.config") {
            "Next.js"
        } else if has("vite.config.ts") || has("vite.config.js") {
            "Vite"
        } else if mentions("angular.json") {
            "Angular"
        } else if has("vue.config.js") {
            "Vue"
        } else {
            "Node.js"
        };
        guess(framework, "npm")
    } else if has("requirements.txt") || has("setup.py") {
        guess("Python", "pip")
    } else if has("Cargo.toml") {
        guess("Rust", "cargo")
    } else if has("go.mod") {
        guess("Go", "go mod")
    } else {
        guess("unknown", "unknown")
    }
}

/// Whether the listing contains continuous integration configuration.
pub fn has_ci_config(files: &[String]) -> bool {
    files
        .iter()
        .any(|f| CI_MARKERS.iter().any(|marker| f.contains(marker)))
}

/// Source files worth documenting, at most ten.
pub fn api_doc_candidates(files: &[String]) -> Vec<String> {
    files
        .iter()
        .filter(|f| {
            let extension = f.rfind('.').map(|dot| &f[dot..]);
            extension.is_some_and(|ext| CODE_EXTENSIONS.contains(&ext))
                && !f.contains("node_modules")
                && !f.contains("test")
                && !f.contains("spec")
                && !f.contains(".d.ts")
        })
        .take(API_DOC_FILE_LIMIT)
        .cloned()
        .collect()
}

/// Prefix of `text` holding at most `max_chars` characters.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

fn dependency_summary(package_json: Option<&str>) -> String {
    let Some(text) = package_json else {
        return String::new();
    };
    let Ok(manifest) = serde_json::from_str::<Value>(text) else {
        return "Could not parse package.json".to_string();
    };
    let mut summary = Map::new();
    for section in ["dependencies", "devDependencies"] {
        if let Some(value) = manifest.get(section) {
            summary.insert(section.to_string(), value.clone());
        }
    }
    serde_json::to_string_pretty(&Value::Object(summary)).unwrap_or_default()
}

/// Prompt asking for a project-specific README.
pub fn readme_prompt(snapshot: &RepositorySnapshot) -> String {
    let metadata = &snapshot.metadata;
    let file_tree = snapshot
        .files
        .iter()
        .take(README_FILE_TREE_LIMIT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n");
    let key_files = serde_json::to_string(&snapshot.key_files_content).unwrap_or_default();

    format!(
        "Generate a comprehensive README.md for this repository.\n\n\
         Repository: {name}\n\
         Description: {description}\n\
         Main Language: {language}\n\
         Dependencies: {dependencies}\n\n\
         File Structure:\n{file_tree}\n\n\
         Key Files Content:\n{key_files}\n\n\
         Requirements:\n\
         1. Professional title with relevant badges (build status, license, etc.)\n\
         2. Clear, compelling description of what the project does\n\
         3. Features list (infer from code if not documented)\n\
         4. Installation instructions based on detected package manager\n\
         5. Usage examples with actual code from the project\n\
         6. API documentation if applicable\n\
         7. Contributing section\n\
         8. License information\n\n\
         Make it specific to THIS project. Do not use generic placeholder text.\n\
         Use proper markdown formatting.",
        name = metadata.name,
        description = metadata
            .description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or("No description provided"),
        language = language_or_unknown(snapshot),
        dependencies = dependency_summary(snapshot.package_json()),
        key_files = truncate_chars(&key_files, README_KEY_FILES_CHARS),
    )
}

/// Prompt asking for a `.gitignore`.
pub fn gitignore_prompt(language: &str, files: &[String], stack: StackGuess) -> String {
    let listing = files
        .iter()
        .take(GITIGNORE_FILE_LIMIT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Generate a .gitignore file for this project.\n\n\
         Detected Language: {language}\n\
         Detected Framework: {framework}\n\
         Package Manager: {package_manager}\n\
         Files in repo: {listing}\n\n\
         Include:\n\
         1. Standard ignores for the detected language/framework\n\
         2. IDE/editor files (.idea, .vscode, etc.)\n\
         3. OS files (.DS_Store, Thumbs.db)\n\
         4. Environment files (.env, .env.local)\n\
         5. Build outputs\n\
         6. Dependencies folders\n\n\
         Only output the .gitignore content, no explanations.",
        framework = stack.framework,
        package_manager = stack.package_manager,
    )
}

/// Prompt asking for contributor guidelines.
pub fn contributing_prompt(name: &str, language: &str, has_tests: bool, has_ci: bool) -> String {
    format!(
        "Generate a CONTRIBUTING.md file for this repository.\n\n\
         Repository: {name}\n\
         Language: {language}\n\
         Has Tests: {has_tests}\n\
         Has CI: {has_ci}\n\n\
         Include:\n\
         1. Welcome message\n\
         2. How to report bugs\n\
         3. How to suggest features\n\
         4. Development setup instructions\n\
         5. Pull request process\n\
         6. Code style guidelines (based on detected language)\n\
         7. Testing requirements\n\n\
         Make it welcoming and clear for new contributors."
    )
}

/// Prompt asking for API documentation of the given source excerpts.
pub fn api_docs_prompt(sections: &[String]) -> String {
    format!(
        "Generate API documentation for this codebase.\n\n\
         Files to document:\n{}\n\n\
         For each function/class/endpoint found:\n\
         1. Name and signature\n\
         2. Description of what it does\n\
         3. Parameters with types and descriptions\n\
         4. Return value\n\
         5. Example usage\n\n\
         Format as clean markdown with proper code blocks.",
        sections.join("\n")
    )
}

/// MIT license text for `holder` and `year`.
pub fn render_mit_license(holder: &str, year: i32) -> String {
    format!(
        "MIT License\n\n\
         Copyright (c) {year} {holder}\n\n\
         Permission is hereby granted, free of charge, to any person obtaining a copy\n\
         of this software and associated documentation files (the \"Software\"), to deal\n\
         in the Software without restriction, including without limitation the rights\n\
         to use, copy, modify, merge, publish, distribute, sublicense, and/or sell\n\
         copies of the Software, and to permit persons to whom the Software is\n\
         furnished to do so, subject to the following conditions:\n\n\
         The above copyright notice and this permission notice shall be included in all\n\
         copies or substantial portions of the Software.\n\n\
         THE SOFTWARE IS PROVIDED \"AS IS\", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR\n\
         IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,\n\
         FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE\n\
         AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER\n\
         LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,\n\
         OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE\n\
         SOFTWARE.\n"
    )
}

fn language_or_unknown(snapshot: &RepositorySnapshot) -> &str {
    snapshot
        .metadata
        .language
        .as_deref()
        .filter(|language| !language.is_empty())
        .unwrap_or("Unknown")
}

/// Generate one file.
pub async fn generate_file(
    services: GenerationServices<'_>,
    request: GenerationRequest<'_>,
    kind: GeneratedFileKind,
) -> Result<GeneratedFile> {
    let snapshot = request.snapshot;
    let language = language_or_unknown(snapshot);
    log::info!("generating {} for {}", kind.file_name(), request.repo);

    let llm = |prompt: String| async move {
        generate_with_retry(services.generator, services.sleeper, &prompt, services.retry).await
    };

    match kind {
        GeneratedFileKind::Readme => {
            let content = llm(readme_prompt(snapshot)).await?;
            Ok(GeneratedFile::new(kind, content))
        }
        GeneratedFileKind::Gitignore => {
            let stack = detect_stack(&snapshot.files);
            let content = llm(gitignore_prompt(language, &snapshot.files, stack)).await?;
            let mut file = GeneratedFile::new(kind, content);
            file.detected_framework = Some(stack.framework.to_string());
            Ok(file)
        }
        GeneratedFileKind::License => Ok(GeneratedFile::new(
            kind,
            render_mit_license(&request.repo.owner, request.year),
        )),
        GeneratedFileKind::Contributing => {
            let prompt = contributing_prompt(
                &snapshot.metadata.name,
                language,
                has_test_files(&snapshot.files),
                has_ci_config(&snapshot.files),
            );
            Ok(GeneratedFile::new(kind, llm(prompt).await?))
        }
        GeneratedFileKind::ApiDocs => {
            let candidates = api_doc_candidates(&snapshot.files);
            let mut sections = Vec::new();
            for path in &candidates {
                match services.host.file_content(request.repo, path).await {
                    Some(content) if !content.is_empty() => sections.push(format!(
                        "\n--- {path} ---\n{}",
                        truncate_chars(&content, API_DOC_FILE_CHARS)
                    )),
                    _ => log::debug!("skipping unreadable {path}"),
                }
            }
            if sections.is_empty() {
                return Err(RepoMedicError::Other(
                    "No code files found to document".to_string(),
                ));
            }
            let mut file = GeneratedFile::new(kind, llm(api_docs_prompt(&sections)).await?);
            file.files_documented = candidates;
            Ok(file)
        }
    }
}

/// Generate several files, collecting failures instead of stopping.
pub async fn generate_files(
    services: GenerationServices<'_>,
    request: GenerationRequest<'_>,
    kinds: &[GeneratedFileKind],
) -> GenerationOutcome {
    let mut outcome = GenerationOutcome::default();
    let mut seen = Vec::new();
    for kind in kinds {
        if seen.contains(kind) {
            continue;
        }
        seen.push(*kind);
        match generate_file(services, request, *kind).await {
            Ok(file) => outcome.files.push(file),
            Err(err) => {
                log::warn!("failed to generate {}: {err}", kind.file_name());
                outcome.errors.push(GenerationFailure {
                    kind: *kind,
                    error: err.to_string(),
                });
            }
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{KeyFilesContent, RepositoryMetadata};
    use crate::github::testing::StaticHost;
    use crate::llm::testing::{RecordingSleeper, ScriptedGenerator};
    use crate::snapshot::assemble_snapshot;
    use std::time::Duration;

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    fn snapshot(files: &[&str], key_files: &[(&str, &str)]) -> RepositorySnapshot {
        let mut metadata = RepositoryMetadata::named("demo");
        metadata.language = Some("TypeScript".to_string());
        let content: KeyFilesContent = key_files
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assemble_snapshot(paths(files), metadata, content)
    }

    fn services<'a>(
        host: &'a StaticHost,
        generator: &'a ScriptedGenerator,
        sleeper: &'a RecordingSleeper,
    ) -> GenerationServices<'a> {
        GenerationServices {
            host,
            generator,
            sleeper,
            retry: RetryPolicy {
                max_attempts: 2,
                delay: Duration::from_millis(1),
            },
        }
    }

    #[test]
    fn kinds_parse_and_name_files() {
        assert_eq!("README".parse::<GeneratedFileKind>().ok(), Some(GeneratedFileKind::Readme));
        assert_eq!(
            "api-docs".parse::<GeneratedFileKind>().ok(),
            Some(GeneratedFileKind::ApiDocs)
        );
        assert_eq!(
            "apiDocs".parse::<GeneratedFileKind>().ok(),
            Some(GeneratedFileKind::ApiDocs)
        );
        assert!("changelog".parse::<GeneratedFileKind>().is_err());
        let names: Vec<&str> = GeneratedFileKind::ALL.iter().map(|k| k.file_name()).collect();
        assert_eq!(
            names,
            vec!["README.md", ".gitignore", "LICENSE", "CONTRIBUTING.md", "API_DOCS.md"]
        );
        assert_eq!(
            serde_json::to_string(&GeneratedFileKind::ApiDocs).expect("json"),
            "\"apiDocs\""
        );
    }

    #[test]
    fn stack_detection_prefers_node_markers() {
        let guess = detect_stack(&paths(&["package.json", "apps/web/next.config.js"]));
        assert_eq!(guess.framework, "Next.js");
        assert_eq!(guess.package_manager, "npm");
        assert_eq!(detect_stack(&paths(&["package.json", "vite.config.ts"])).framework, "Vite");
        assert_eq!(detect_stack(&paths(&["package.json"])).framework, "Node.js");
        assert_eq!(
            detect_stack(&paths(&["setup.py", "Cargo.toml"])),
            StackGuess {
                framework: "Python",
                package_manager: "pip"
            }
        );
        assert_eq!(detect_stack(&paths(&["go.mod"])).package_manager, "go mod");
        assert_eq!(detect_stack(&[]).framework, "unknown");
    }

    #[test]
    fn ci_detection_uses_markers() {
        assert!(has_ci_config(&paths(&[".github/workflows/ci.yml"])));
        assert!(has_ci_config(&paths(&[".circleci/config.yml"])));
        assert!(!has_ci_config(&paths(&["ci.yml"])));
    }

    #[test]
    fn api_doc_candidates_filter_and_cap() {
        let mut files = paths(&[
            "README.md",
            "src/types.d.ts",
            "src/app.test.ts",
            "node_modules/x/index.js",
            "Makefile",
            "src/main.rs",
        ]);
        for i in 0..12 {
            files.push(format!("lib/mod{i}.py"));
        }
        let candidates = api_doc_candidates(&files);
        assert_eq!(candidates.len(), 10);
        assert_eq!(candidates[0], "src/main.rs");
        assert!(!candidates.iter().any(|c| c.ends_with(".d.ts")));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn readme_prompt_includes_context() {
        let snapshot = snapshot(
            &["package.json", "src/index.ts"],
            &[("package.json", r#"{"dependencies":{"left-pad":"1.0.0"}}"#)],
        );
        let prompt = readme_prompt(&snapshot);
        assert!(prompt.contains("Repository: demo"));
        assert!(prompt.contains("Description: No description provided"));
        assert!(prompt.contains("Main Language: TypeScript"));
        assert!(prompt.contains("\"left-pad\": \"1.0.0\""));
        assert!(!prompt.contains("devDependencies"));
        assert!(prompt.contains("package.json\nsrc/index.ts"));
    }

    #[test]
    fn readme_prompt_reports_unparseable_manifest() {
        let snapshot = snapshot(&["package.json"], &[("package.json", "{oops")]);
        assert!(readme_prompt(&snapshot).contains("Dependencies: Could not parse package.json"));
    }

    #[test]
    fn license_names_holder_and_year() {
        let license = render_mit_license("octo", 2026);
        assert!(license.starts_with("MIT License"));
        assert!(license.contains("Copyright (c) 2026 octo"));
    }

    #[tokio::test]
    async fn generate_files_collects_successes_and_failures() {
        let host = StaticHost::default();
        let generator = ScriptedGenerator::with_texts(vec![
            Ok("# demo".to_string()),
            Ok("node_modules/".to_string()),
        ]);
        let sleeper = RecordingSleeper::default();
        let repo = RepoRef::new("octo", "demo");
        let snapshot = snapshot(&["package.json", "src/index.ts"], &[]);
        let request = GenerationRequest {
            repo: &repo,
            snapshot: &snapshot,
            year: 2026,
        };

        let outcome = generate_files(
            services(&host, &generator, &sleeper),
            request,
            &[
                GeneratedFileKind::Readme,
                GeneratedFileKind::Gitignore,
                GeneratedFileKind::License,
                GeneratedFileKind::Readme,
                GeneratedFileKind::ApiDocs,
            ],
        )
        .await;

        let names: Vec<&str> = outcome.files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["README.md", ".gitignore", "LICENSE"]);
        assert_eq!(outcome.files[1].detected_framework.as_deref(), Some("Node.js"));
        assert!(outcome.files[2].content.contains("2026 octo"));
        assert_eq!(
            outcome.errors,
            vec![GenerationFailure {
                kind: GeneratedFileKind::ApiDocs,
                error: "No code files found to document".to_string(),
            }]
        );
        assert_eq!(generator.prompts().len(), 2);
    }

    #[tokio::test]
    async fn api_docs_reads_sources_and_retries() {
        let long_source = "x".repeat(2500);
        let host = StaticHost::with_files(&[("src/main.rs", long_source.as_str())]);
        let generator = ScriptedGenerator::with_texts(vec![
            Err(RepoMedicError::Other("busy".to_string())),
            Ok("## API".to_string()),
        ]);
        let sleeper = RecordingSleeper::default();
        let repo = RepoRef::new("octo", "demo");
        let snapshot = snapshot(&["src/main.rs", "src/missing.rs"], &[]);
        let request = GenerationRequest {
            repo: &repo,
            snapshot: &snapshot,
            year: 2026,
        };

        let file = generate_file(
            services(&host, &generator, &sleeper),
            request,
            GeneratedFileKind::ApiDocs,
        )
        .await
        .expect("api docs");

        assert_eq!(file.content, "## API");
        assert_eq!(file.files_documented, vec!["src/main.rs", "src/missing.rs"]);
        assert_eq!(host.requested(), vec!["src/main.rs", "src/missing.rs"]);
        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("--- src/main.rs ---"));
        assert!(prompts[0].contains(&"x".repeat(2000)));
        assert!(!prompts[0].contains(&"x".repeat(2001)));
        assert_eq!(sleeper.delays.lock().expect("delays").len(), 1);
    }

    #[tokio::test]
    async fn contributing_prompt_reports_tests_and_ci() {
        let host = StaticHost::default();
        let generator = ScriptedGenerator::with_texts(vec![Ok("Welcome".to_string())]);
        let sleeper = RecordingSleeper::default();
        let repo = RepoRef::new("octo", "demo");
        let snapshot = snapshot(&["src/a.spec.ts", ".github/workflows/ci.yml"], &[]);
        let request = GenerationRequest {
            repo: &repo,
            snapshot: &snapshot,
            year: 2026,
        };

        generate_file(
            services(&host, &generator, &sleeper),
            request,
            GeneratedFileKind::Contributing,
        )
        .await
        .expect("contributing");

        let prompt = &generator.prompts()[0];
        assert!(prompt.contains("Has Tests: true"));
        assert!(prompt.contains("Has CI: true"));
    }
}
