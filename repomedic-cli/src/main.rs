#![deny(missing_docs)]
//! RepoMedic command-line interface.
//!
//! Provides batch health analysis, deep summaries, file generation, and issue
//! creation for GitHub repositories and local checkouts.

mod actions;

use actions::{GenerateArgs, IssuesArgs, SummarizeArgs};
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use repomedic_core::{
    AnalysisReport, AnalysisStatus, GitHubApiClient, GitHubSettings, RepositoryHost,
    StdFileSystem, fetch_snapshot, load_local_snapshot, parse_github_url,
    render_analysis_markdown, render_json,
};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

#[derive(Parser)]
#[command(name = "repomedic", version, about = "RepoMedic CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(&["file", "url", "dir", "path"])
))]
struct RepoSourceArgs {
    /// File containing GitHub repository URLs (one per line).
    #[arg(short, long)]
    file: Option<PathBuf>,
    /// Single GitHub repository URL.
    #[arg(long)]
    url: Option<String>,
    /// Directory whose sub-directories are local checkouts.
    #[arg(long)]
    dir: Option<PathBuf>,
    /// Local checkout to analyse.
    #[arg(long)]
    path: Option<PathBuf>,
}

#[derive(Args, Clone)]
pub(crate) struct GitHubArgs {
    /// GitHub REST API base URL.
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_GITHUB_API_URL)]
    github_api_url: String,
    /// Token used for GitHub requests.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,
}

impl GitHubArgs {
    pub(crate) fn settings(&self) -> GitHubSettings {
        GitHubSettings {
            api_url: self.github_api_url.clone(),
            token: self
                .github_token
                .clone()
                .filter(|token| !token.trim().is_empty()),
            ..GitHubSettings::from_env()
        }
    }
}

#[derive(Args, Clone)]
pub(crate) struct OutputArgs {
    /// Output format for report data.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write the report to a file instead of stdout.
    #[arg(long = "report-output")]
    report_output: Option<PathBuf>,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[derive(Subcommand)]
enum Commands {
    /// Score repositories from a URL, file, directory, or local path.
    Analyze {
        #[command(flatten)]
        source: RepoSourceArgs,
        #[command(flatten)]
        github: GitHubArgs,
        /// Maximum number of repositories analysed at once.
        #[arg(short = 'j', long, default_value_t = 5)]
        concurrency: usize,
        #[command(flatten)]
        report: OutputArgs,
    },
    /// Read key source files and ask the LLM for a structured summary.
    Summarize(SummarizeArgs),
    /// Generate missing project files into a directory.
    Generate(GenerateArgs),
    /// Open a GitHub issue for every health finding.
    Issues(IssuesArgs),
}

#[cfg(not(test))]
#[tokio::main]
async fn main() -> CliResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            source,
            github,
            concurrency,
            report,
        } => {
            let source = resolve_source_args(&source)?;
            let host: Arc<dyn RepositoryHost> = Arc::new(GitHubApiClient::new(github.settings())?);
            run_analyze(source, host, concurrency, report).await?
        }
        Commands::Summarize(args) => actions::run_summarize(args).await?,
        Commands::Generate(args) => actions::run_generate(args).await?,
        Commands::Issues(args) => actions::run_issues(args).await?,
    }

    Ok(())
}

#[cfg(test)]
fn main() {}

async fn run_analyze(
    source: BatchSource,
    host: Arc<dyn RepositoryHost>,
    concurrency: usize,
    report: OutputArgs,
) -> CliResult<()> {
    let targets = load_repo_targets(source).await?;
    if targets.is_empty() {
        println!("No repositories found to analyze.");
        return Ok(());
    }

    let concurrency = if concurrency == 0 { 1 } else { concurrency };
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut tasks = JoinSet::new();

    for (index, target) in targets.into_iter().enumerate() {
        let permit = semaphore.clone().acquire_owned().await?;
        let host = host.clone();
        tasks.spawn(async move {
            let _permit = permit;
            (index, analyze_target(target, host.as_ref()).await)
        });
    }

    let mut reports = Vec::new();
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(indexed) => reports.push(indexed),
            Err(err) => reports.push((usize::MAX, report_from_task_error(err))),
        }
    }
    reports.sort_by_key(|(index, _)| *index);
    let reports: Vec<AnalysisReport> = reports.into_iter().map(|(_, report)| report).collect();

    emit_analysis_reports(&reports, &report).await?;

    Ok(())
}

fn resolve_source_args(source: &RepoSourceArgs) -> CliResult<BatchSource> {
    if let Some(file) = source.file.clone() {
        return Ok(BatchSource::File(file));
    }
    if let Some(url) = source.url.clone() {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err("url cannot be empty".into());
        }
        return Ok(BatchSource::Url(trimmed.to_string()));
    }
    if let Some(dir) = source.dir.clone() {
        return Ok(BatchSource::Dir(dir));
    }
    if let Some(path) = source.path.clone() {
        return Ok(BatchSource::Path(path));
    }
    Err("no repository source provided".into())
}

async fn load_repo_urls(path: &Path) -> CliResult<Vec<String>> {
    let contents = tokio::fs::read_to_string(path).await?;
    let urls = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();
    Ok(urls)
}

async fn load_repo_paths_from_dir(path: &Path) -> CliResult<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(path).await?;
    let mut repos = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let file_type = entry.file_type().await?;
        if !file_type.is_dir() {
            continue;
        }
        let entry_path = entry.path();
        if is_hidden_path(&entry_path) {
            continue;
        }
        repos.push(entry_path);
    }
    repos.sort();
    Ok(repos)
}

fn is_hidden_path(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

async fn load_repo_targets(source: BatchSource) -> CliResult<Vec<RepoTarget>> {
    match source {
        BatchSource::File(file) => {
            let urls = load_repo_urls(&file).await?;
            Ok(urls.into_iter().map(RepoTarget::Remote).collect())
        }
        BatchSource::Url(url) => Ok(vec![RepoTarget::Remote(url)]),
        BatchSource::Dir(dir) => {
            let paths = load_repo_paths_from_dir(&dir).await?;
            Ok(paths.into_iter().map(RepoTarget::Local).collect())
        }
        BatchSource::Path(path) => Ok(vec![RepoTarget::Local(path)]),
    }
}

enum BatchSource {
    File(PathBuf),
    Url(String),
    Dir(PathBuf),
    Path(PathBuf),
}

enum RepoTarget {
    Remote(String),
    Local(PathBuf),
}

async fn analyze_target(target: RepoTarget, host: &dyn RepositoryHost) -> AnalysisReport {
    match target {
        RepoTarget::Remote(url) => analyze_remote(url, host).await,
        RepoTarget::Local(path) => analyze_local(path),
    }
}

async fn analyze_remote(url: String, host: &dyn RepositoryHost) -> AnalysisReport {
    let repo = match parse_github_url(&url) {
        Ok(repo) => repo,
        Err(err) => return AnalysisReport::failed(url, err.to_string()),
    };
    match fetch_snapshot(host, &repo).await {
        Ok(snapshot) => AnalysisReport::analyze(url, AnalysisStatus::Fetched, &snapshot),
        Err(err) => {
            log::warn!("failed to fetch {repo}: {err}");
            AnalysisReport::failed(url, err.to_string())
        }
    }
}

fn analyze_local(path: PathBuf) -> AnalysisReport {
    let source = path.display().to_string();
    if !path.is_dir() {
        return AnalysisReport::failed(source, format!("path not found: {}", path.display()));
    }
    match load_local_snapshot(&StdFileSystem::new(), &path) {
        Ok(snapshot) => AnalysisReport::analyze(source, AnalysisStatus::Local, &snapshot),
        Err(err) => AnalysisReport::failed(source, err.to_string()),
    }
}

fn report_from_task_error(error: tokio::task::JoinError) -> AnalysisReport {
    AnalysisReport::failed("unknown", error.to_string())
}

async fn emit_analysis_reports(reports: &[AnalysisReport], output: &OutputArgs) -> CliResult<()> {
    let contents = match output.format {
        OutputFormat::Text => render_analysis_text(reports),
        OutputFormat::Markdown => render_analysis_markdown(reports),
        OutputFormat::Json => render_json(reports)?,
    };
    emit_output(output, contents).await
}

pub(crate) async fn emit_output(output: &OutputArgs, contents: String) -> CliResult<()> {
    if let Some(path) = &output.report_output {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, contents).await?;
    } else {
        print!("{contents}");
    }
    Ok(())
}

fn render_analysis_text(reports: &[AnalysisReport]) -> String {
    let mut output = String::new();
    for report in reports {
        let _ = writeln!(output, "Source: {}", report.source);
        match &report.status {
            AnalysisStatus::Fetched => {
                let _ = writeln!(output, "Status: fetched");
            }
            AnalysisStatus::Local => {
                let _ = writeln!(output, "Status: local");
            }
            AnalysisStatus::Failed(error) => {
                let _ = writeln!(output, "Status: failed ({error})");
                let _ = writeln!(output);
                continue;
            }
        }

        if let Some(project_type) = report.project_type {
            let _ = writeln!(output, "Project type: {project_type}");
        }
        let _ = writeln!(output, "Files: {}", report.file_count);

        match &report.health {
            Some(health) => {
                let _ = writeln!(output, "{}", health.summary());
                let _ = writeln!(
                    output,
                    "Documentation: {}/100, Structure: {}/100",
                    health.scores.documentation, health.scores.structure
                );
                if health.issues.is_empty() {
                    let _ = writeln!(output, "Issues: none");
                } else {
                    let _ = writeln!(output, "Issues:");
                    for issue in &health.issues {
                        let _ = writeln!(output, "- {issue}");
                    }
                }
                if !health.recommendations.is_empty() {
                    let actions: Vec<&str> =
                        health.recommendations.iter().map(|r| r.as_str()).collect();
                    let _ = writeln!(output, "Recommended: {}", actions.join(", "));
                }
            }
            None => {
                let _ = writeln!(output, "Health: unavailable");
            }
        }

        if !report.selected_files.is_empty() {
            let _ = writeln!(output, "Key source files:");
            for file in &report.selected_files {
                let _ = writeln!(output, "- {file}");
            }
        }

        let _ = writeln!(output);
    }
    output
}

#[cfg(test)]
pub(crate) mod test_support {
    use repomedic_core::{
        BoxFuture, CreatedIssue, IssueDraft, RepoMedicError, RepoRef, RepositoryHost,
        RepositoryMetadata, TextGenerator,
    };
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    static UNIQUE_COUNTER: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);

    pub(crate) fn unique_dir_name() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time")
            .as_nanos();
        let counter = UNIQUE_COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        PathBuf::from(format!("repomedic_cli_test_{nanos}_{counter}"))
    }

    /// Host serving one fixed repository.
    #[derive(Default)]
    pub(crate) struct FixtureHost {
        pub(crate) files: BTreeMap<String, String>,
        pub(crate) created: Mutex<Vec<String>>,
    }

    impl FixtureHost {
        pub(crate) fn with_files(files: &[(&str, &str)]) -> Self {
            Self {
                files: files
                    .iter()
                    .map(|(path, body)| (path.to_string(), body.to_string()))
                    .collect(),
                ..Self::default()
            }
        }
    }

    impl RepositoryHost for FixtureHost {
        fn repository<'a>(
            &'a self,
            repo: &'a RepoRef,
        ) -> BoxFuture<'a, repomedic_core::Result<RepositoryMetadata>> {
            Box::pin(async move {
                if repo.repo == "missing" {
                    return Err(RepoMedicError::Api {
                        service: "github",
                        status: 404,
                        body: "Not Found".to_string(),
                    });
                }
                let mut metadata = RepositoryMetadata::named(repo.repo.clone());
                metadata.language = Some("Rust".to_string());
                Ok(metadata)
            })
        }

        fn tree<'a>(
            &'a self,
            _repo: &'a RepoRef,
            _branch: Option<&'a str>,
        ) -> BoxFuture<'a, repomedic_core::Result<Vec<String>>> {
            Box::pin(async move { Ok(self.files.keys().cloned().collect()) })
        }

        fn file_content<'a>(
            &'a self,
            _repo: &'a RepoRef,
            path: &'a str,
        ) -> BoxFuture<'a, Option<String>> {
            Box::pin(async move { self.files.get(path).cloned() })
        }

        fn create_issue<'a>(
            &'a self,
            repo: &'a RepoRef,
            draft: &'a IssueDraft,
        ) -> BoxFuture<'a, repomedic_core::Result<CreatedIssue>> {
            Box::pin(async move {
                let mut created = self.created.lock().expect("created");
                created.push(draft.title.clone());
                Ok(CreatedIssue {
                    title: draft.title.clone(),
                    number: created.len() as u64,
                    url: format!("{}/issues/{}", repo.html_url(), created.len()),
                })
            })
        }
    }

    /// Generator answering every prompt with the same text.
    pub(crate) struct CannedGenerator(pub(crate) &'static str);

    impl TextGenerator for CannedGenerator {
        fn generate_text<'a>(
            &'a self,
            _prompt: &'a str,
        ) -> BoxFuture<'a, repomedic_core::Result<String>> {
            Box::pin(async move { Ok(self.0.to_string()) })
        }

        fn generate_object<'a>(
            &'a self,
            _prompt: &'a str,
            _schema: &'a serde_json::Value,
        ) -> BoxFuture<'a, repomedic_core::Result<serde_json::Value>> {
            Box::pin(async move {
                serde_json::from_str::<serde_json::Value>(self.0).map_err(RepoMedicError::from)
            })
        }
    }
}
