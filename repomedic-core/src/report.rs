//! Report formatting utilities for RepoMedic outputs.

use std::fmt::Write;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ProjectType, RepositorySnapshot, ScoreReport};
use crate::scorer::score_snapshot;
use crate::selector::{detect_snapshot_type, select_files};
use crate::summary::SummaryOutcome;

/// How a repository was obtained for analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum AnalysisStatus {
    /// Repository was fetched from GitHub.
    Fetched,
    /// Repository was loaded from a local path.
    Local,
    /// Fetching or loading failed with an error message.
    Failed(String),
}

/// Health analysis of one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Repository source (URL or path).
    pub source: String,
    /// Acquisition status.
    pub status: AnalysisStatus,
    /// Repository name, once known.
    pub repository: Option<String>,
    /// Number of files in the listing.
    pub file_count: usize,
    /// Health scores, issues and recommendations.
    pub health: Option<ScoreReport>,
    /// Detected project type.
    pub project_type: Option<ProjectType>,
    /// Source files worth reading for a summary.
    pub selected_files: Vec<String>,
}

impl AnalysisReport {
    /// Create a report for a source that could not be analysed.
    pub fn failed(source: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            status: AnalysisStatus::Failed(error.into()),
            repository: None,
            file_count: 0,
            health: None,
            project_type: None,
            selected_files: Vec::new(),
        }
    }

    /// Score and classify a snapshot.
    pub fn analyze(
        source: impl Into<String>,
        status: AnalysisStatus,
        snapshot: &RepositorySnapshot,
    ) -> Self {
        let project_type = detect_snapshot_type(snapshot);
        Self {
            source: source.into(),
            status,
            repository: Some(snapshot.metadata.name.clone()),
            file_count: snapshot.files.len(),
            health: Some(score_snapshot(snapshot)),
            project_type: Some(project_type),
            selected_files: select_files(&snapshot.files, project_type, &snapshot.key_files_content),
        }
    }
}

/// Render a list of analysis reports as Markdown.
pub fn render_analysis_markdown(reports: &[AnalysisReport]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# RepoMedic Health Report\n");
    for report in reports {
        let _ = writeln!(output, "## {}\n", report.source);
        append_status(&mut output, report);
        if let Some(health) = report.health.as_ref() {
            append_scores(&mut output, health);
            append_list(&mut output, "Issues", &health.issues, "No issues found.");
            let recommendations: Vec<String> = health
                .recommendations
                .iter()
                .map(ToString::to_string)
                .collect();
            append_list(
                &mut output,
                "Recommendations",
                &recommendations,
                "Nothing to generate.",
            );
        }
        if report.project_type.is_some() {
            append_list(
                &mut output,
                "Selected files",
                &report.selected_files,
                "No source files selected.",
            );
        }
        let _ = writeln!(output);
    }
    output
}

/// Render a repository summary as Markdown.
pub fn render_summary_markdown(source: &str, outcome: &SummaryOutcome) -> String {
    let summary = &outcome.summary;
    let mut output = String::new();
    let _ = writeln!(output, "# {source}\n");
    let _ = writeln!(output, "{}\n", summary.purpose);
    let _ = writeln!(output, "- Project type: {}", outcome.project_type);
    let category = serde_json::to_value(summary.category)
        .ok()
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_default();
    let _ = writeln!(output, "- Category: {category}");
    let _ = writeln!(output, "- Language: {}", summary.tech_stack.language);
    if let Some(framework) = summary.tech_stack.framework.as_deref() {
        let _ = writeln!(output, "- Framework: {framework}");
    }
    let _ = writeln!(output, "- Architecture: {}", summary.architecture.pattern);
    let _ = writeln!(output, "- Files analyzed: {}\n", outcome.files_analyzed_count);
    append_list(&mut output, "Key features", &summary.key_features, "None identified.");
    append_list(
        &mut output,
        "Components",
        &summary.architecture.components,
        "None identified.",
    );
    let _ = writeln!(output, "### Narrative\n{}\n", summary.narrative);
    output
}

/// Render any serializable report payload as JSON.
pub fn render_json<T: Serialize + ?Sized>(payload: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(payload)
}

fn append_status(output: &mut String, report: &AnalysisReport) {
    if let Some(name) = report.repository.as_deref() {
        let _ = writeln!(output, "- Repository: {name}");
    }
    match &report.status {
        AnalysisStatus::Fetched => {
            let _ = writeln!(output, "- Status: fetched");
        }
        AnalysisStatus::Local => {
            let _ = writeln!(output, "- Status: local");
        }
        AnalysisStatus::Failed(error) => {
            let _ = writeln!(output, "- Status: failed ({error})");
        }
    }
    if let Some(project_type) = report.project_type {
        let _ = writeln!(output, "- Files: {}", report.file_count);
        let _ = writeln!(output, "- Project type: {project_type}");
    }
    let _ = writeln!(output);
}

fn append_scores(output: &mut String, health: &ScoreReport) {
    let scores = &health.scores;
    let _ = writeln!(output, "### Scores");
    let _ = writeln!(output, "| Overall | Documentation | Structure |");
    let _ = writeln!(output, "|---------|---------------|-----------|");
    let _ = writeln!(
        output,
        "| {} | {} | {} |\n",
        scores.overall, scores.documentation, scores.structure
    );
}

fn append_list(output: &mut String, title: &str, items: &[String], empty_message: &str) {
    if items.is_empty() {
        let _ = writeln!(output, "### {title}\n{empty_message}\n");
        return;
    }
    let _ = writeln!(output, "### {title}");
    for item in items {
        let _ = writeln!(output, "- {item}");
    }
    let _ = writeln!(output);
}
