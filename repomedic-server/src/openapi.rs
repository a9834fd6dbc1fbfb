//! OpenAPI specification for RepoMedic server.

use utoipa::OpenApi;

use repomedic_core::summary::{Architecture, CodeQuality, ProjectCategory, TechStack};
use repomedic_core::{
    CreatedIssue, GeneratedFile, GeneratedFileKind, GenerationFailure, GenerationOutcome,
    IssueCreationReport, IssueDraft, MissingFiles, ProjectType, Recommendation, RepoRef,
    RepoSummary, RepositoryMetadata, RepositorySnapshot, ScoreReport, Scores,
};

use crate::models::AnalysisSession;
use crate::routes::{
    AnalyzeRequest, AnalyzeResponse, DeepAnalyzeRequest, DeepAnalyzeResponse, ErrorResponse,
    GenerateRequest, IssuesRequest, SelectRequest, SelectResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::analyze,
        crate::routes::score,
        crate::routes::select,
        crate::routes::deep_analyze,
        crate::routes::generate,
        crate::routes::issues,
        crate::routes::history,
        crate::routes::openapi_json
    ),
    components(
        schemas(
            AnalyzeRequest,
            AnalyzeResponse,
            SelectRequest,
            SelectResponse,
            DeepAnalyzeRequest,
            DeepAnalyzeResponse,
            GenerateRequest,
            IssuesRequest,
            ErrorResponse,
            AnalysisSession,
            RepoRef,
            RepositoryMetadata,
            RepositorySnapshot,
            MissingFiles,
            Scores,
            ScoreReport,
            Recommendation,
            ProjectType,
            RepoSummary,
            ProjectCategory,
            TechStack,
            Architecture,
            CodeQuality,
            GeneratedFileKind,
            GeneratedFile,
            GenerationFailure,
            GenerationOutcome,
            IssueDraft,
            CreatedIssue,
            IssueCreationReport
        )
    ),
    tags(
        (name = "analysis", description = "Health scoring and source selection"),
        (name = "llm", description = "LLM-backed summaries and file generation"),
        (name = "github", description = "GitHub write operations"),
        (name = "system", description = "System endpoints")
    )
)]
/// OpenAPI specification for the RepoMedic server.
pub struct ApiDoc;
