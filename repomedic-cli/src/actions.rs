//! LLM and GitHub write actions: summaries, file generation and issues.

use crate::{CliResult, GitHubArgs, OutputArgs, OutputFormat, emit_output};
use chrono::Datelike;
use clap::Args;
use repomedic_core::{
    ChatCompletionsClient, GeneratedFileKind, GenerationOutcome, GenerationRequest,
    GenerationServices, GitHubApiClient, IssueCreationReport, IssueDraft, RepositoryHost,
    RetryPolicy, Sleeper, SummaryOutcome, TextGenerator, TokioSleeper, create_issues,
    drafts_from_report, fetch_snapshot, generate_files, parse_github_url,
    render_json, render_summary_markdown, score_snapshot, summarize_repository,
};
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// Arguments for `repomedic summarize`.
#[derive(Args, Clone)]
pub(crate) struct SummarizeArgs {
    /// GitHub repository URL.
    #[arg(long)]
    url: String,
    #[command(flatten)]
    github: GitHubArgs,
    #[command(flatten)]
    report: OutputArgs,
}

/// Arguments for `repomedic generate`.
#[derive(Args, Clone)]
pub(crate) struct GenerateArgs {
    /// GitHub repository URL.
    #[arg(long)]
    url: String,
    /// Files to generate (readme, gitignore, license, contributing, api-docs).
    #[arg(
        long = "kind",
        value_delimiter = ',',
        value_parser = parse_kind,
        default_values = ["readme", "gitignore", "license", "contributing"]
    )]
    kinds: Vec<GeneratedFileKind>,
    /// Directory the generated files are written to.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
    #[command(flatten)]
    github: GitHubArgs,
}

/// Arguments for `repomedic issues`.
#[derive(Args, Clone)]
pub(crate) struct IssuesArgs {
    /// GitHub repository URL.
    #[arg(long)]
    url: String,
    /// Print the drafts without creating anything.
    #[arg(long)]
    dry_run: bool,
    #[command(flatten)]
    github: GitHubArgs,
    #[command(flatten)]
    report: OutputArgs,
}

fn parse_kind(value: &str) -> Result<GeneratedFileKind, String> {
    value.parse().map_err(|err: repomedic_core::RepoMedicError| err.to_string())
}

pub(crate) async fn run_summarize(args: SummarizeArgs) -> CliResult<()> {
    let host = GitHubApiClient::new(args.github.settings())?;
    let generator = ChatCompletionsClient::from_env()?;
    log::info!("summarizing with model {}", generator.model());
    run_summarize_with(&args, &host, &generator).await
}

async fn run_summarize_with(
    args: &SummarizeArgs,
    host: &dyn RepositoryHost,
    generator: &dyn TextGenerator,
) -> CliResult<()> {
    let repo = parse_github_url(&args.url)?;
    let snapshot = fetch_snapshot(host, &repo).await?;
    let outcome = summarize_repository(host, generator, &repo, &snapshot).await?;

    let contents = match args.report.format {
        OutputFormat::Text => render_summary_text(&repo.to_string(), &outcome),
        OutputFormat::Markdown => render_summary_markdown(&repo.to_string(), &outcome),
        OutputFormat::Json => render_json(&outcome)?,
    };
    emit_output(&args.report, contents).await
}

fn render_summary_text(name: &str, outcome: &SummaryOutcome) -> String {
    let summary = &outcome.summary;
    let mut output = String::new();
    let _ = writeln!(output, "{name} ({})", outcome.project_type);
    let _ = writeln!(output, "{}", summary.purpose);
    let _ = writeln!(output, "Language: {}", summary.tech_stack.language);
    if let Some(framework) = &summary.tech_stack.framework {
        let _ = writeln!(output, "Framework: {framework}");
    }
    let _ = writeln!(output, "Architecture: {}", summary.architecture.pattern);
    let _ = writeln!(output, "Files analyzed: {}", outcome.files_analyzed_count);
    if !summary.key_features.is_empty() {
        let _ = writeln!(output, "Key features:");
        for feature in &summary.key_features {
            let _ = writeln!(output, "- {feature}");
        }
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "{}", summary.narrative);
    output
}

pub(crate) async fn run_generate(args: GenerateArgs) -> CliResult<()> {
    let host = GitHubApiClient::new(args.github.settings())?;
    let generator = ChatCompletionsClient::from_env()?;
    let year = chrono::Utc::now().year();
    run_generate_with(&args, &host, &generator, &TokioSleeper, year).await
}

async fn run_generate_with(
    args: &GenerateArgs,
    host: &dyn RepositoryHost,
    generator: &dyn TextGenerator,
    sleeper: &dyn Sleeper,
    year: i32,
) -> CliResult<()> {
    let repo = parse_github_url(&args.url)?;
    let snapshot = fetch_snapshot(host, &repo).await?;
    let services = GenerationServices {
        host,
        generator,
        sleeper,
        retry: RetryPolicy::default(),
    };
    let request = GenerationRequest {
        repo: &repo,
        snapshot: &snapshot,
        year,
    };

    let outcome = generate_files(services, request, &args.kinds).await;
    let written = write_generated_files(&args.output_dir, &outcome).await?;
    for path in &written {
        println!("Wrote {}", path.display());
    }
    for failure in &outcome.errors {
        eprintln!("Failed to generate {}: {}", failure.kind.file_name(), failure.error);
    }

    if written.is_empty() && !outcome.errors.is_empty() {
        return Err("no files were generated".into());
    }
    Ok(())
}

async fn write_generated_files(dir: &Path, outcome: &GenerationOutcome) -> CliResult<Vec<PathBuf>> {
    if outcome.files.is_empty() {
        return Ok(Vec::new());
    }
    tokio::fs::create_dir_all(dir).await?;
    let mut written = Vec::new();
    for file in &outcome.files {
        let path = dir.join(&file.file_name);
        tokio::fs::write(&path, &file.content).await?;
        written.push(path);
    }
    Ok(written)
}

pub(crate) async fn run_issues(args: IssuesArgs) -> CliResult<()> {
    let host = GitHubApiClient::new(args.github.settings())?;
    run_issues_with(&args, &host).await
}

async fn run_issues_with(args: &IssuesArgs, host: &dyn RepositoryHost) -> CliResult<()> {
    let repo = parse_github_url(&args.url)?;
    let snapshot = fetch_snapshot(host, &repo).await?;
    let drafts = drafts_from_report(&score_snapshot(&snapshot));

    if args.dry_run {
        let contents = match args.report.format {
            OutputFormat::Json => render_json(&drafts)?,
            OutputFormat::Text | OutputFormat::Markdown => render_drafts_text(&drafts),
        };
        return emit_output(&args.report, contents).await;
    }

    let report = create_issues(host, &repo, &drafts).await;
    let contents = match args.report.format {
        OutputFormat::Json => render_json(&report)?,
        OutputFormat::Text | OutputFormat::Markdown => render_issue_report_text(&report),
    };
    emit_output(&args.report, contents).await?;

    if report.success {
        Ok(())
    } else {
        Err(report.message.into())
    }
}

fn render_drafts_text(drafts: &[IssueDraft]) -> String {
    let mut output = String::new();
    if drafts.is_empty() {
        let _ = writeln!(output, "No issues to create.");
        return output;
    }
    let _ = writeln!(output, "Would create {} issues:", drafts.len());
    for draft in drafts {
        let _ = writeln!(output, "- {}", draft.title);
    }
    output
}

fn render_issue_report_text(report: &IssueCreationReport) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{}", report.message);
    for issue in &report.created_issues {
        let _ = writeln!(output, "- #{} {} ({})", issue.number, issue.title, issue.url);
    }
    for error in &report.errors {
        let _ = writeln!(output, "! {error}");
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CannedGenerator, FixtureHost, unique_dir_name};
    use crate::{DEFAULT_GITHUB_API_URL, GitHubArgs};
    use repomedic_core::BoxFuture;
    use std::time::Duration;

    struct NoSleep;

    impl Sleeper for NoSleep {
        fn sleep<'a>(&'a self, _duration: Duration) -> BoxFuture<'a, ()> {
            Box::pin(async {})
        }
    }

    fn github() -> GitHubArgs {
        GitHubArgs {
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            github_token: None,
        }
    }

    fn json_output(path: PathBuf) -> OutputArgs {
        OutputArgs {
            format: OutputFormat::Json,
            report_output: Some(path),
        }
    }

    #[test]
    fn parses_kind_aliases() {
        assert_eq!(parse_kind("api-docs"), Ok(GeneratedFileKind::ApiDocs));
        assert_eq!(parse_kind("README"), Ok(GeneratedFileKind::Readme));
        assert!(parse_kind("changelog").is_err());
    }

    #[tokio::test]
    async fn generate_writes_files_to_output_dir() {
        let root = std::env::temp_dir().join(unique_dir_name());
        let host = FixtureHost::with_files(&[("src/main.rs", "fn main() {}")]);
        let generator = CannedGenerator("# Demo\n");
        let args = GenerateArgs {
            url: "https://github.com/octo/demo".to_string(),
            kinds: vec![GeneratedFileKind::Readme, GeneratedFileKind::License],
            output_dir: root.clone(),
            github: github(),
        };

        run_generate_with(&args, &host, &generator, &NoSleep, 2024)
            .await
            .expect("generate");

        let readme = std::fs::read_to_string(root.join("README.md")).expect("readme");
        assert_eq!(readme, "# Demo\n");
        let license = std::fs::read_to_string(root.join("LICENSE")).expect("license");
        assert!(license.contains("2024"));
        assert!(license.contains("octo"));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[tokio::test]
    async fn generate_fails_when_nothing_was_written() {
        let root = std::env::temp_dir().join(unique_dir_name());
        let host = FixtureHost::with_files(&[("README.md", "hi")]);
        let generator = CannedGenerator("unused");
        let args = GenerateArgs {
            url: "https://github.com/octo/demo".to_string(),
            kinds: vec![GeneratedFileKind::ApiDocs],
            output_dir: root.clone(),
            github: github(),
        };

        let result = run_generate_with(&args, &host, &generator, &NoSleep, 2024).await;

        assert!(result.is_err());
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn issues_dry_run_lists_drafts_without_creating() {
        let root = std::env::temp_dir().join(unique_dir_name());
        let host = FixtureHost::with_files(&[("src/lib.rs", "")]);
        let args = IssuesArgs {
            url: "https://github.com/octo/demo".to_string(),
            dry_run: true,
            github: github(),
            report: json_output(root.join("drafts.json")),
        };

        run_issues_with(&args, &host).await.expect("dry run");

        let json = std::fs::read_to_string(root.join("drafts.json")).expect("drafts");
        let drafts: Vec<IssueDraft> = serde_json::from_str(&json).expect("parse");
        assert_eq!(drafts.len(), 5);
        assert_eq!(drafts[0].title, "Missing README.md");
        assert!(host.created.lock().expect("created").is_empty());

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[tokio::test]
    async fn issues_creates_one_per_finding() {
        let root = std::env::temp_dir().join(unique_dir_name());
        let host = FixtureHost::with_files(&[("src/lib.rs", "")]);
        let args = IssuesArgs {
            url: "https://github.com/octo/demo".to_string(),
            dry_run: false,
            github: github(),
            report: json_output(root.join("issues.json")),
        };

        run_issues_with(&args, &host).await.expect("issues");

        let json = std::fs::read_to_string(root.join("issues.json")).expect("report");
        let report: IssueCreationReport = serde_json::from_str(&json).expect("parse");
        assert!(report.success);
        assert_eq!(report.message, "Created 5 of 5 issues");
        assert_eq!(
            report.created_issues[0].url,
            "https://github.com/octo/demo/issues/1"
        );

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[tokio::test]
    async fn summarize_renders_markdown() {
        let root = std::env::temp_dir().join(unique_dir_name());
        let host = FixtureHost::with_files(&[
            ("Cargo.toml", "[package]\nname = \"demo\"\n"),
            ("src/main.rs", "fn main() {}"),
        ]);
        let generator = CannedGenerator(
            r#"{
                "purpose": "Demo tool.",
                "category": "CLI Tool",
                "techStack": {"language": "Rust"},
                "architecture": {"pattern": "Single binary", "components": ["main"], "dataFlow": "args to output"},
                "keyFeatures": ["greets"],
                "codeQuality": {"hasTypes": true, "hasTests": false, "patterns": []},
                "narrative": "- Prints a greeting"
            }"#,
        );
        let args = SummarizeArgs {
            url: "https://github.com/octo/demo".to_string(),
            github: github(),
            report: OutputArgs {
                format: OutputFormat::Markdown,
                report_output: Some(root.join("summary.md")),
            },
        };

        run_summarize_with(&args, &host, &generator)
            .await
            .expect("summarize");

        let markdown = std::fs::read_to_string(root.join("summary.md")).expect("summary");
        assert!(markdown.contains("# octo/demo"));
        assert!(markdown.contains("- Project type: rust"));
        assert!(markdown.contains("- Files analyzed: 1"));
        assert!(markdown.contains("- Prints a greeting"));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn renders_issue_report_text() {
        let report = IssueCreationReport {
            success: false,
            created_issues: Vec::new(),
            errors: vec!["Failed to create issue \"x\": boom".to_string()],
            message: "Created 0 of 1 issues".to_string(),
        };
        let text = render_issue_report_text(&report);
        assert!(text.starts_with("Created 0 of 1 issues\n"));
        assert!(text.contains("! Failed to create issue"));
    }
}
