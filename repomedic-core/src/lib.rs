#![deny(missing_docs)]
//! RepoMedic core library.
//!
//! This crate contains the domain types, the repository health scorer, the
//! source selector, and the GitHub and LLM clients that power the RepoMedic
//! command-line tool and HTTP server.

use std::future::Future;
use std::pin::Pin;

pub mod domain;
pub mod error;
pub mod fs;
pub mod generate;
pub mod github;
pub mod issues;
pub mod llm;
pub mod report;
pub mod scorer;
pub mod selector;
pub mod snapshot;
pub mod summary;

/// Boxed future returned by the async capability traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub use domain::{
    KeyFilesContent, MissingFiles, ProjectType, Recommendation, RepositoryMetadata,
    RepositorySnapshot, ScoreReport, Scores,
};
pub use error::{RepoMedicError, Result};
pub use fs::{FileSystem, StdFileSystem};
pub use generate::{
    GeneratedFile, GeneratedFileKind, GenerationFailure, GenerationOutcome, GenerationRequest,
    GenerationServices, generate_file, generate_files,
};
pub use github::{
    GitHubApiClient, GitHubSettings, RepoRef, RepositoryHost, fetch_snapshot, parse_github_url,
};
pub use issues::{CreatedIssue, IssueCreationReport, IssueDraft, create_issues, drafts_from_report};
pub use llm::{
    ChatCompletionsClient, LlmSettings, RetryPolicy, Sleeper, TextGenerator, TokioSleeper,
    generate_with_retry,
};
pub use report::{
    AnalysisReport, AnalysisStatus, render_analysis_markdown, render_json,
    render_summary_markdown,
};
pub use scorer::{score_repository, score_snapshot};
pub use selector::{MAX_SELECTED_FILES, detect_project_type, find_entry_points, select_files};
pub use snapshot::{KEY_FILES, detect_missing_files, load_local_snapshot};
pub use summary::{RepoSummary, SummaryOutcome, summarize_repository};
