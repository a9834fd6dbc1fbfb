//! HTTP handlers for RepoMedic server.

use std::sync::Arc;

use actix_web::{HttpResponse, Responder, get, post, web};
use chrono::{Datelike, Utc};
use repomedic_core::selector::detect_snapshot_type;
use repomedic_core::snapshot::assemble_snapshot;
use repomedic_core::{
    GeneratedFileKind, GenerationOutcome, GenerationRequest, GenerationServices,
    IssueCreationReport, IssueDraft, KeyFilesContent, ProjectType, RepoMedicError, RepoRef,
    RepoSummary, RepositoryHost, RepositoryMetadata, RepositorySnapshot, RetryPolicy, ScoreReport,
    Sleeper, TextGenerator, create_issues, detect_project_type, fetch_snapshot, generate_files,
    parse_github_url, score_snapshot, select_files, summarize_repository,
};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::models::{AnalysisSession, HistoryStore};
use crate::openapi::ApiDoc;

#[derive(Clone)]
/// Shared application state for handlers.
pub struct AppState {
    /// Repository host used for fetching and issue creation.
    pub github: Arc<dyn RepositoryHost>,
    /// LLM client; `None` when no API key is configured.
    pub generator: Option<Arc<dyn TextGenerator>>,
    /// Sleeper used between LLM retries.
    pub sleeper: Arc<dyn Sleeper>,
    /// Retry policy for LLM calls.
    pub retry: RetryPolicy,
    /// Recent analysis sessions.
    pub history: HistoryStore,
}

/// Error response payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub message: String,
}

/// Request payload for a repository analysis.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// GitHub repository URL.
    pub repo_url: String,
}

/// Snapshot, health report and classification of a repository.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    /// History entry recorded for this run.
    pub session_id: String,
    /// Parsed repository reference.
    pub repository: RepoRef,
    /// Fetched snapshot.
    pub snapshot: RepositorySnapshot,
    /// Scores, issues and recommendations.
    pub health: ScoreReport,
    /// Detected project type.
    pub project_type: ProjectType,
    /// Source files worth reading for a summary.
    pub selected_files: Vec<String>,
}

/// Request payload for source selection.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectRequest {
    /// Repository-relative paths.
    pub files: Vec<String>,
    /// Raw `package.json` text.
    #[serde(default)]
    pub package_json_text: Option<String>,
    /// Primary language reported by the host.
    #[serde(default)]
    pub language: Option<String>,
}

/// Detected project type and selected files.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectResponse {
    /// Detected project type.
    pub project_type: ProjectType,
    /// At most 25 selected paths.
    pub selected_files: Vec<String>,
}

/// Request payload for a deep, LLM-backed analysis.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeepAnalyzeRequest {
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Repository-relative paths.
    pub files: Vec<String>,
    /// Repository metadata.
    #[serde(default)]
    pub metadata: RepositoryMetadata,
    /// Key file contents already fetched by the caller.
    #[serde(default)]
    pub key_files_content: KeyFilesContent,
}

/// Structured summary produced by a deep analysis.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeepAnalyzeResponse {
    /// Always true on a 200 response.
    pub success: bool,
    /// The summary.
    pub summary: RepoSummary,
    /// Number of source files read.
    pub files_analyzed_count: usize,
    /// Detected project type.
    pub project_type: ProjectType,
}

/// Request payload for file generation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Files to generate.
    pub kinds: Vec<GeneratedFileKind>,
    /// Snapshot of the repository.
    pub snapshot: RepositorySnapshot,
}

/// Request payload for issue creation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssuesRequest {
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Issues to open.
    pub issues: Vec<IssueDraft>,
}

fn error_response(err: &RepoMedicError) -> HttpResponse {
    let body = ErrorResponse {
        message: err.to_string(),
    };
    match err {
        RepoMedicError::InvalidUrl(_) => HttpResponse::BadRequest().json(body),
        RepoMedicError::Api { status: 404, .. } => HttpResponse::NotFound().json(body),
        RepoMedicError::Api { .. } | RepoMedicError::Http(_) | RepoMedicError::Decode(_) => {
            HttpResponse::BadGateway().json(body)
        }
        _ => HttpResponse::InternalServerError().json(body),
    }
}

fn bad_request(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        message: message.into(),
    })
}

fn repo_ref(owner: &str, repo: &str) -> Result<RepoRef, HttpResponse> {
    let (owner, repo) = (owner.trim(), repo.trim());
    if owner.is_empty() || repo.is_empty() {
        return Err(bad_request("owner and repo are required"));
    }
    Ok(RepoRef::new(owner, repo))
}

fn require_generator(state: &AppState) -> Result<&dyn TextGenerator, HttpResponse> {
    state.generator.as_deref().ok_or_else(|| {
        HttpResponse::InternalServerError().json(ErrorResponse {
            message: "LLM is not configured; set REPOMEDIC_LLM_API_KEY".to_string(),
        })
    })
}

#[utoipa::path(
    post,
    path = "/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Repository analysed", body = AnalyzeResponse),
        (status = 400, description = "Not a GitHub repository URL", body = ErrorResponse),
        (status = 404, description = "Repository not found", body = ErrorResponse),
        (status = 502, description = "GitHub request failed", body = ErrorResponse)
    ),
    tag = "analysis"
)]
#[post("/api/analyze")]
/// Fetch a GitHub repository, score it and record a history entry.
pub async fn analyze(
    state: web::Data<AppState>,
    payload: web::Json<AnalyzeRequest>,
) -> impl Responder {
    let repo_url = payload.into_inner().repo_url;
    let repository = match parse_github_url(&repo_url) {
        Ok(repository) => repository,
        Err(err) => return error_response(&err),
    };
    let snapshot = match fetch_snapshot(state.github.as_ref(), &repository).await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            log::warn!("analysis of {repository} failed: {err}");
            return error_response(&err);
        }
    };

    let health = score_snapshot(&snapshot);
    let project_type = detect_snapshot_type(&snapshot);
    let selected_files = select_files(&snapshot.files, project_type, &snapshot.key_files_content);
    let session = AnalysisSession::new(repo_url, &repository, &health);
    let session_id = session.id.clone();
    state.history.record(session);

    HttpResponse::Ok().json(AnalyzeResponse {
        session_id,
        repository,
        snapshot,
        health,
        project_type,
        selected_files,
    })
}

#[utoipa::path(
    post,
    path = "/score",
    request_body = RepositorySnapshot,
    responses(
        (status = 200, description = "Health report", body = ScoreReport)
    ),
    tag = "analysis"
)]
#[post("/api/score")]
/// Score a caller-supplied snapshot.
pub async fn score(payload: web::Json<RepositorySnapshot>) -> impl Responder {
    HttpResponse::Ok().json(score_snapshot(&payload))
}

#[utoipa::path(
    post,
    path = "/select",
    request_body = SelectRequest,
    responses(
        (status = 200, description = "Project type and selected files", body = SelectResponse)
    ),
    tag = "analysis"
)]
#[post("/api/select")]
/// Classify a file listing and select the files worth reading.
pub async fn select(payload: web::Json<SelectRequest>) -> impl Responder {
    let request = payload.into_inner();
    let project_type = detect_project_type(
        &request.files,
        request.package_json_text.as_deref(),
        request.language.as_deref(),
    );
    let key_files = KeyFilesContent::new();
    HttpResponse::Ok().json(SelectResponse {
        project_type,
        selected_files: select_files(&request.files, project_type, &key_files),
    })
}

#[utoipa::path(
    post,
    path = "/deep-analyze",
    request_body = DeepAnalyzeRequest,
    responses(
        (status = 200, description = "Repository summary", body = DeepAnalyzeResponse),
        (status = 400, description = "Missing owner or repo", body = ErrorResponse),
        (status = 500, description = "LLM unavailable", body = ErrorResponse),
        (status = 502, description = "LLM request failed", body = ErrorResponse)
    ),
    tag = "llm"
)]
#[post("/api/deep-analyze")]
/// Read key source files and ask the LLM for a structured summary.
pub async fn deep_analyze(
    state: web::Data<AppState>,
    payload: web::Json<DeepAnalyzeRequest>,
) -> impl Responder {
    let request = payload.into_inner();
    let repository = match repo_ref(&request.owner, &request.repo) {
        Ok(repository) => repository,
        Err(response) => return response,
    };
    let generator = match require_generator(&state) {
        Ok(generator) => generator,
        Err(response) => return response,
    };
    let snapshot = assemble_snapshot(request.files, request.metadata, request.key_files_content);

    match summarize_repository(state.github.as_ref(), generator, &repository, &snapshot).await {
        Ok(outcome) => HttpResponse::Ok().json(DeepAnalyzeResponse {
            success: true,
            summary: outcome.summary,
            files_analyzed_count: outcome.files_analyzed_count,
            project_type: outcome.project_type,
        }),
        Err(err) => {
            log::warn!("deep analysis of {repository} failed: {err}");
            error_response(&err)
        }
    }
}

#[utoipa::path(
    post,
    path = "/generate",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Generated files and per-file errors", body = GenerationOutcome),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "LLM unavailable", body = ErrorResponse)
    ),
    tag = "llm"
)]
#[post("/api/generate")]
/// Generate standard project files for a repository.
pub async fn generate(
    state: web::Data<AppState>,
    payload: web::Json<GenerateRequest>,
) -> impl Responder {
    let request = payload.into_inner();
    let repository = match repo_ref(&request.owner, &request.repo) {
        Ok(repository) => repository,
        Err(response) => return response,
    };
    if request.kinds.is_empty() {
        return bad_request("kinds must not be empty");
    }
    let generator = match require_generator(&state) {
        Ok(generator) => generator,
        Err(response) => return response,
    };

    let services = GenerationServices {
        host: state.github.as_ref(),
        generator,
        sleeper: state.sleeper.as_ref(),
        retry: state.retry,
    };
    let generation = GenerationRequest {
        repo: &repository,
        snapshot: &request.snapshot,
        year: Utc::now().year(),
    };
    let outcome = generate_files(services, generation, &request.kinds).await;
    HttpResponse::Ok().json(outcome)
}

#[utoipa::path(
    post,
    path = "/issues",
    request_body = IssuesRequest,
    responses(
        (status = 200, description = "Issue creation report", body = IssueCreationReport),
        (status = 400, description = "Missing owner or repo", body = ErrorResponse)
    ),
    tag = "github"
)]
#[post("/api/issues")]
/// Open one GitHub issue per draft.
pub async fn issues(
    state: web::Data<AppState>,
    payload: web::Json<IssuesRequest>,
) -> impl Responder {
    let request = payload.into_inner();
    let repository = match repo_ref(&request.owner, &request.repo) {
        Ok(repository) => repository,
        Err(response) => return response,
    };
    let report = create_issues(state.github.as_ref(), &repository, &request.issues).await;
    HttpResponse::Ok().json(report)
}

#[utoipa::path(
    get,
    path = "/history",
    responses(
        (status = 200, description = "Recent analyses, newest first", body = [AnalysisSession]),
        (status = 500, description = "History unavailable", body = ErrorResponse)
    ),
    tag = "analysis"
)]
#[get("/api/history")]
/// List recent analysis sessions.
pub async fn history(state: web::Data<AppState>) -> impl Responder {
    match state.history.recent() {
        Ok(sessions) => HttpResponse::Ok().json(sessions),
        Err(message) => HttpResponse::InternalServerError().json(ErrorResponse { message }),
    }
}

#[utoipa::path(
    get,
    path = "/openapi.json",
    responses(
        (status = 200, description = "OpenAPI document", body = serde_json::Value)
    ),
    tag = "system"
)]
#[get("/api/openapi.json")]
/// Serve the OpenAPI document.
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
