//! LLM-backed narrative summaries built from selected source files.

use std::fmt::Write;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::domain::{ProjectType, RepositorySnapshot};
use crate::error::Result;
use crate::generate::truncate_chars;
use crate::github::{RepoRef, RepositoryHost};
use crate::llm::TextGenerator;
use crate::selector::{detect_snapshot_type, select_files};
use crate::snapshot::KEY_FILES;

/// Characters of each source file kept in the prompt.
pub const MAX_SOURCE_CHARS: usize = 10_000;
const TRUNCATION_MARKER: &str = "\n... (truncated)";
const FILE_TREE_SAMPLE: usize = 50;
const README_CHARS: usize = 2000;
const CONFIG_FILE_CHARS: usize = 1000;

/// Broad category of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ProjectCategory {
    /// Web application.
    #[serde(rename = "Web Application")]
    WebApplication,
    /// Reusable library.
    #[serde(rename = "Library")]
    Library,
    /// Command-line tool.
    #[serde(rename = "CLI Tool")]
    CliTool,
    /// API service.
    #[serde(rename = "API Service")]
    ApiService,
    /// Mobile application.
    #[serde(rename = "Mobile App")]
    MobileApp,
    /// Desktop application.
    #[serde(rename = "Desktop App")]
    DesktopApp,
    /// Anything else.
    #[serde(rename = "Other")]
    Other,
}

/// Technologies identified in the code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TechStack {
    /// Main framework.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    /// Primary language.
    pub language: String,
    /// Database technology.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Deployment platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<String>,
    /// AI/ML tools and services.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_tools: Option<Vec<String>>,
    /// Other notable tools and libraries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_tools: Option<Vec<String>>,
}

/// How the code is organised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Architecture {
    /// Architectural pattern.
    pub pattern: String,
    /// Main components or modules.
    pub components: Vec<String>,
    /// How data moves through the system.
    pub data_flow: String,
}

/// Code quality signals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CodeQuality {
    /// Uses static types or type hints.
    pub has_types: bool,
    /// Has test files.
    pub has_tests: bool,
    /// Notable code patterns.
    pub patterns: Vec<String>,
}

/// Structured summary of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepoSummary {
    /// One-sentence purpose.
    pub purpose: String,
    /// Project category.
    pub category: ProjectCategory,
    /// Technology stack.
    pub tech_stack: TechStack,
    /// Architecture insights.
    pub architecture: Architecture,
    /// Main capabilities.
    pub key_features: Vec<String>,
    /// Code quality insights.
    pub code_quality: CodeQuality,
    /// Bullet-point narrative, one `- ` line per point.
    pub narrative: String,
    /// Source files that were read.
    #[serde(default)]
    pub files_analyzed: Vec<String>,
}

/// A summary together with how it was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryOutcome {
    /// The summary.
    pub summary: RepoSummary,
    /// Number of source files read.
    pub files_analyzed_count: usize,
    /// Detected project type.
    pub project_type: ProjectType,
}

/// JSON schema the LLM reply must satisfy.
pub fn summary_schema() -> Value {
    let strings = json!({"type": "array", "items": {"type": "string"}});
    json!({
        "type": "object",
        "required": ["purpose", "category", "techStack", "architecture", "keyFeatures", "codeQuality", "narrative"],
        "properties": {
            "purpose": {"type": "string", "description": "One-sentence description of what this project does"},
            "category": {
                "type": "string",
                "enum": ["Web Application", "Library", "CLI Tool", "API Service", "Mobile App", "Desktop App", "Other"]
            },
            "techStack": {
                "type": "object",
                "required": ["language"],
                "properties": {
                    "framework": {"type": "string"},
                    "language": {"type": "string"},
                    "database": {"type": "string"},
                    "deployment": {"type": "string"},
                    "aiTools": strings,
                    "otherTools": strings
                }
            },
            "architecture": {
                "type": "object",
                "required": ["pattern", "components", "dataFlow"],
                "properties": {
                    "pattern": {"type": "string"},
                    "components": strings,
                    "dataFlow": {"type": "string"}
                }
            },
            "keyFeatures": strings,
            "codeQuality": {
                "type": "object",
                "required": ["hasTypes", "hasTests", "patterns"],
                "properties": {
                    "hasTypes": {"type": "boolean"},
                    "hasTests": {"type": "boolean"},
                    "patterns": strings
                }
            },
            "narrative": {
                "type": "string",
                "description": "Concise summary of 4-6 points, each on its own line starting with \"- \""
            }
        }
    })
}

/// Cap a source file at [`MAX_SOURCE_CHARS`], marking the cut.
pub fn truncate_source(content: &str) -> String {
    let kept = truncate_chars(content, MAX_SOURCE_CHARS);
    if kept.len() == content.len() {
        content.to_string()
    } else {
        format!("{kept}{TRUNCATION_MARKER}")
    }
}

/// Build the analysis prompt.
pub fn summary_prompt(
    snapshot: &RepositorySnapshot,
    project_type: ProjectType,
    sources: &[(String, String)],
) -> String {
    let metadata = &snapshot.metadata;
    let topics = metadata
        .topics
        .as_ref()
        .map(|topics| topics.join(", "))
        .filter(|joined| !joined.is_empty())
        .unwrap_or_else(|| "None".to_string());
    let file_tree = snapshot
        .files
        .iter()
        .take(FILE_TREE_SAMPLE)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n");
    let readme = snapshot.readme().unwrap_or("No README");

    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "You are analyzing a GitHub repository to understand what it does and how it works.\n"
    );
    let _ = writeln!(prompt, "REPOSITORY METADATA:");
    let _ = writeln!(prompt, "- Name: {}", metadata.name);
    let _ = writeln!(
        prompt,
        "- Description: {}",
        non_empty(metadata.description.as_deref()).unwrap_or("No description")
    );
    let _ = writeln!(
        prompt,
        "- Language: {}",
        non_empty(metadata.language.as_deref()).unwrap_or("Unknown")
    );
    let _ = writeln!(prompt, "- Stars: {}", metadata.stars.unwrap_or(0));
    let _ = writeln!(prompt, "- Topics: {topics}");
    let _ = writeln!(prompt, "- Detected Type: {project_type}\n");
    let _ = writeln!(prompt, "FILE STRUCTURE (sample):\n{file_tree}\n");
    let _ = writeln!(
        prompt,
        "README CONTENT:\n{}\n",
        truncate_chars(readme, README_CHARS)
    );

    let configs: Vec<String> = config_files(snapshot)
        .into_iter()
        .map(|(name, content)| {
            format!("--- {name} ---\n{}", truncate_chars(content, CONFIG_FILE_CHARS))
        })
        .collect();
    let _ = writeln!(prompt, "CONFIGURATION FILES:\n{}\n", configs.join("\n\n"));

    let code: Vec<String> = sources
        .iter()
        .map(|(path, content)| format!("--- {path} ---\n{content}"))
        .collect();
    let _ = writeln!(
        prompt,
        "SOURCE CODE FILES ({} files analyzed):\n{}\n",
        sources.len(),
        code.join("\n\n")
    );

    prompt.push_str(
        "YOUR TASK:\n\
         Analyze this repository deeply and provide:\n\n\
         1. PURPOSE: What problem does this project solve? (1 sentence)\n\
         2. CATEGORY: What type of project is this?\n\
         3. TECH STACK: List all technologies, frameworks, databases, AI tools you can identify from the code\n\
         4. ARCHITECTURE: How is the code organized? What patterns are used? How does data flow?\n\
         5. KEY FEATURES: What are the main capabilities? (infer from actual code, not just README)\n\
         6. CODE QUALITY: Does it use types? Are there tests? What patterns do you see?\n\
         7. NARRATIVE: Write a CONCISE summary with 4-6 bullet points covering:\n   \
            - What problem this project solves and the approach it takes\n   \
            - Key architecture decisions and main components (reference specific files/code)\n   \
            - Most interesting or unique implementation details\n   \
            - Notable patterns or techniques discovered in the codebase\n\n\
         BE SPECIFIC. Reference actual code you see. Mention specific files, functions, patterns.\n\
         Make it concise, technical, and easy to scan.",
    );
    prompt
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Key files other than the README, well-known names first.
fn config_files(snapshot: &RepositorySnapshot) -> Vec<(&str, &str)> {
    let is_readme = |name: &str| name == "README.md" || name == "readme.md";
    let content = &snapshot.key_files_content;
    let known = KEY_FILES
        .iter()
        .filter(|name| !is_readme(name))
        .filter_map(|name| content.get(*name).map(|body| (*name, body.as_str())));
    let extra = content
        .iter()
        .filter(|(name, _)| !is_readme(name) && !KEY_FILES.contains(&name.as_str()))
        .map(|(name, body)| (name.as_str(), body.as_str()));
    known.chain(extra).collect()
}

/// Read the most informative source files and ask the LLM for a summary.
pub async fn summarize_repository(
    host: &dyn RepositoryHost,
    generator: &dyn TextGenerator,
    repo: &RepoRef,
    snapshot: &RepositorySnapshot,
) -> Result<SummaryOutcome> {
    let project_type = detect_snapshot_type(snapshot);
    let selected = select_files(&snapshot.files, project_type, &snapshot.key_files_content);
    log::info!(
        "reading {} source files for {repo} ({project_type})",
        selected.len()
    );

    let mut sources = Vec::new();
    for path in selected {
        match host.file_content(repo, &path).await {
            Some(content) if !content.is_empty() => {
                let truncated = truncate_source(&content);
                sources.push((path, truncated));
            }
            _ => log::warn!("failed to read {path} from {repo}"),
        }
    }

    let prompt = summary_prompt(snapshot, project_type, &sources);
    let schema = summary_schema();
    let value = generator.generate_object(&prompt, &schema).await?;
    let mut summary: RepoSummary = serde_json::from_value(value)?;
    summary.files_analyzed = sources.into_iter().map(|(path, _)| path).collect();

    Ok(SummaryOutcome {
        files_analyzed_count: summary.files_analyzed.len(),
        summary,
        project_type,
    })
}
