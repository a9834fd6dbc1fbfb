//! Turning health findings into GitHub issues.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ScoreReport;
use crate::github::{RepoRef, RepositoryHost};

/// Title and body of an issue to open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IssueDraft {
    /// Issue title.
    pub title: String,
    /// Markdown body.
    pub body: String,
}

impl IssueDraft {
    /// Build a draft.
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// An issue the host accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreatedIssue {
    /// Title as requested.
    pub title: String,
    /// Issue number.
    pub number: u64,
    /// Web URL of the issue.
    pub url: String,
}

/// Result of a batch of issue creations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueCreationReport {
    /// True when every draft was created.
    pub success: bool,
    /// Issues created, in draft order.
    pub created_issues: Vec<CreatedIssue>,
    /// One message per failed draft.
    pub errors: Vec<String>,
    /// `Created X of Y issues`.
    pub message: String,
}

/// Open one issue per draft; failures are collected rather than returned.
pub async fn create_issues(
    host: &dyn RepositoryHost,
    repo: &RepoRef,
    drafts: &[IssueDraft],
) -> IssueCreationReport {
    let mut created_issues = Vec::new();
    let mut errors = Vec::new();

    for draft in drafts {
        match host.create_issue(repo, draft).await {
            Ok(issue) => {
                log::info!("created issue #{} on {repo}", issue.number);
                created_issues.push(CreatedIssue {
                    title: draft.title.clone(),
                    ..issue
                });
            }
            Err(err) => {
                log::warn!("failed to create issue {:?} on {repo}: {err}", draft.title);
                errors.push(format!(
                    "Failed to create issue \"{}\": {err}",
                    draft.title
                ));
            }
        }
    }

    IssueCreationReport {
        success: errors.is_empty(),
        message: format!(
            "Created {} of {} issues",
            created_issues.len(),
            drafts.len()
        ),
        created_issues,
        errors,
    }
}

/// One draft per health issue, in report order.
pub fn drafts_from_report(report: &ScoreReport) -> Vec<IssueDraft> {
    report
        .issues
        .iter()
        .map(|issue| {
            let title = issue
                .split(" - ")
                .next()
                .unwrap_or(issue.as_str())
                .to_string();
            let body = format!(
                "RepoMedic flagged this repository during a health check.\n\n\
                 **Finding:** {issue}\n\n\
                 Current scores: overall {}/100, documentation {}/100, structure {}/100.",
                report.scores.overall, report.scores.documentation, report.scores.structure
            );
            IssueDraft::new(title, body)
        })
        .collect()
}
