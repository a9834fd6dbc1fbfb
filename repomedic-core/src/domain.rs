//! Domain entities for RepoMedic.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Contents of well-known repository files keyed by file name.
pub type KeyFilesContent = BTreeMap<String, String>;

/// Repository metadata as reported by the hosting service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryMetadata {
    /// Repository name.
    pub name: String,
    /// Short description, if the repository has one.
    #[serde(default)]
    pub description: Option<String>,
    /// Primary language reported by the host.
    #[serde(default)]
    pub language: Option<String>,
    /// Stargazer count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stars: Option<u64>,
    /// Fork count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forks: Option<u64>,
    /// Default branch name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    /// Repository topics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
    /// ISO-8601 creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// ISO-8601 last update timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl RepositoryMetadata {
    /// Metadata carrying only a repository name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Which standard project files are absent from a repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MissingFiles {
    /// No README.md at any depth.
    pub readme: bool,
    /// No root `.gitignore`.
    pub gitignore: bool,
    /// No LICENSE-like file.
    pub license: bool,
    /// No CONTRIBUTING.md.
    pub contributing: bool,
}

impl MissingFiles {
    /// Flags with every standard file missing.
    pub fn all() -> Self {
        Self {
            readme: true,
            gitignore: true,
            license: true,
            contributing: true,
        }
    }
}

/// Everything the heuristics need to know about one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySnapshot {
    /// Repository-relative file paths in listing order.
    pub files: Vec<String>,
    /// Repository metadata.
    pub metadata: RepositoryMetadata,
    /// Contents of the key files that exist and could be read.
    #[serde(default)]
    pub key_files_content: KeyFilesContent,
    /// Missing standard files.
    pub missing_files: MissingFiles,
}

impl RepositorySnapshot {
    /// Look up README content under either casing variant. An empty `README.md`
/// falls back to `readme.md`.
    pub fn readme(&self) -> Option<&str> {
        readme_content(&self.key_files_content)
    }

    /// Raw `package.json` text, if fetched.
    pub fn package_json(&self) -> Option<&str> {
        self.key_files_content.get("package.json").map(String::as_str)
    }
}

/// Look up README content under either casing variant. An empty `README.md`
/// falls back to `readme.md`.
pub fn readme_content(key_files: &KeyFilesContent) -> Option<&str> {
    key_files
        .get("README.md")
        .filter(|content| !content.is_empty())
        .or_else(|| key_files.get("readme.md"))
        .map(String::as_str)
}

/// Sub-scores and overall health score, each within 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Scores {
    /// Rounded mean of documentation and structure.
    pub overall: u8,
    /// Documentation score.
    pub documentation: u8,
    /// Structure score.
    pub structure: u8,
}

/// Follow-up actions derived from missing standard files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum Recommendation {
    /// Generate a README.md.
    GenerateReadme,
    /// Generate a .gitignore.
    GenerateGitignore,
    /// Generate a LICENSE.
    GenerateLicense,
    /// Generate a CONTRIBUTING.md.
    GenerateContributing,
}

impl Recommendation {
    /// Stable identifier used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GenerateReadme => "generateReadme",
            Self::GenerateGitignore => "generateGitignore",
            Self::GenerateLicense => "generateLicense",
            Self::GenerateContributing => "generateContributing",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the health scorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScoreReport {
    /// Computed scores.
    pub scores: Scores,
    /// Human-readable issues in detection order.
    pub issues: Vec<String>,
    /// Recommended actions in fixed order.
    pub recommendations: Vec<Recommendation>,
}

impl ScoreReport {
    /// One-line summary of the report.
    pub fn summary(&self) -> String {
        format!(
            "Repository health: {}/100. Found {} issues.",
            self.scores.overall,
            self.issues.len()
        )
    }
}

/// Primary framework or language ecosystem of a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ProjectType {
    /// Next.js application.
    Nextjs,
    /// React application.
    React,
    /// Vue application.
    Vue,
    /// Express server.
    Express,
    /// Django project.
    Django,
    /// Flask application.
    Flask,
    /// FastAPI service.
    Fastapi,
    /// Command-line tool.
    Cli,
    /// Reusable library.
    Library,
    /// React Native application.
    ReactNative,
    /// Go module.
    Go,
    /// Rust crate.
    Rust,
    /// Python project.
    Python,
    /// Nothing matched.
    Unknown,
}

impl ProjectType {
    /// Stable identifier used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nextjs => "nextjs",
            Self::React => "react",
            Self::Vue => "vue",
            Self::Express => "express",
            Self::Django => "django",
            Self::Flask => "flask",
            Self::Fastapi => "fastapi",
            Self::Cli => "cli",
            Self::Library => "library",
            Self::ReactNative => "reactNative",
            Self::Go => "go",
            Self::Rust => "rust",
            Self::Python => "python",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
