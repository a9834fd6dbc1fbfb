//! GitHub REST access and remote snapshot acquisition.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::BoxFuture;
use crate::domain::{KeyFilesContent, RepositoryMetadata, RepositorySnapshot};
use crate::error::{RepoMedicError, Result, ensure_success};
use crate::issues::{CreatedIssue, IssueDraft};
use crate::snapshot::{assemble_snapshot, present_key_files};

const GITHUB_HOST: &str = "github.com/";
const FALLBACK_BRANCHES: &[&str] = &["main", "master"];

/// Owner and name of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct RepoRef {
    /// Account or organisation owning the repository.
    pub owner: String,
    /// Repository name.
    pub repo: String,
}

impl RepoRef {
    /// Build a reference from its parts.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Canonical web URL of the repository.
    pub fn html_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Extract `owner/repo` from anything containing `github.com/<owner>/<repo>`.
///
/// Trailing path segments are ignored and the first `.git` in the repository
/// segment is removed.
pub fn parse_github_url(url: &str) -> Result<RepoRef> {
    let mut search = url;
    while let Some(index) = search.find(GITHUB_HOST) {
        let rest = &search[index + GITHUB_HOST.len()..];
        let mut segments = rest.splitn(3, '/');
        if let (Some(owner), Some(repo)) = (segments.next(), segments.next()) {
            let repo = repo.replacen(".git", "", 1);
            if !owner.is_empty() && !repo.is_empty() {
                return Ok(RepoRef::new(owner, repo));
            }
        }
        search = &search[index + 1..];
    }
    Err(RepoMedicError::InvalidUrl(url.to_string()))
}

/// Read and write access to a repository hosting service.
pub trait RepositoryHost: Send + Sync {
    /// Fetch repository metadata.
    fn repository<'a>(&'a self, repo: &'a RepoRef) -> BoxFuture<'a, Result<RepositoryMetadata>>;

    /// List every blob path in the repository tree.
    ///
    /// `branch` is tried first, then `main` and `master`.
    fn tree<'a>(
        &'a self,
        repo: &'a RepoRef,
        branch: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Vec<String>>>;

    /// Fetch one file's text. Any failure yields `None`.
    fn file_content<'a>(
        &'a self,
        repo: &'a RepoRef,
        path: &'a str,
    ) -> BoxFuture<'a, Option<String>>;

    /// Open an issue.
    fn create_issue<'a>(
        &'a self,
        repo: &'a RepoRef,
        draft: &'a IssueDraft,
    ) -> BoxFuture<'a, Result<CreatedIssue>>;
}

/// Connection settings for the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubSettings {
    /// API base URL.
    pub api_url: String,
    /// Optional bearer token.
    pub token: Option<String>,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            token: None,
            user_agent: "repomedic".to_string(),
        }
    }
}

impl GitHubSettings {
    /// Load settings from `GITHUB_API_URL`, `GITHUB_TOKEN` and `GITHUB_USER_AGENT`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_url: std::env::var("GITHUB_API_URL").unwrap_or(defaults.api_url),
            token: std::env::var("GITHUB_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
            user_agent: std::env::var("GITHUB_USER_AGENT").unwrap_or(defaults.user_agent),
        }
    }
}

/// Reqwest-backed [`RepositoryHost`] for the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubApiClient {
    client: Client,
    settings: GitHubSettings,
}

#[derive(Debug, Deserialize)]
struct RepoPayload {
    name: String,
    description: Option<String>,
    language: Option<String>,
    stargazers_count: Option<u64>,
    forks_count: Option<u64>,
    default_branch: Option<String>,
    topics: Option<Vec<String>>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

impl From<RepoPayload> for RepositoryMetadata {
    fn from(payload: RepoPayload) -> Self {
        Self {
            name: payload.name,
            description: payload.description,
            language: payload.language,
            stars: payload.stargazers_count,
            forks: payload.forks_count,
            default_branch: payload.default_branch,
            topics: payload.topics,
            created_at: payload.created_at,
            updated_at: payload.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TreePayload {
    tree: Vec<TreeEntry>,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentPayload {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct IssuePayload<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct IssueResponse {
    number: u64,
    html_url: String,
    title: String,
}

impl GitHubApiClient {
    /// Build a client with the given settings.
    pub fn new(settings: GitHubSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .build()?;
        Ok(Self { client, settings })
    }

    /// Build a client from environment settings.
    pub fn from_env() -> Result<Self> {
        Self::new(GitHubSettings::from_env())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.settings.api_url.trim_end_matches('/'), path);
        let builder = self
            .client
            .request(method, url)
            .header("Accept", "application/vnd.github+json");
        match self.settings.token.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn fetch_repository(&self, repo: &RepoRef) -> Result<RepositoryMetadata> {
        let path = format!("/repos/{}/{}", repo.owner, repo.repo);
        let response = self.request(Method::GET, &path).send().await?;
        let payload = ensure_success("github", response)
            .await?
            .json::<RepoPayload>()
            .await?;
        Ok(payload.into())
    }

    async fn fetch_tree_at(&self, repo: &RepoRef, branch: &str) -> Result<Vec<String>> {
        let path = format!("/repos/{}/{}/git/trees/{branch}", repo.owner, repo.repo);
        let response = self
            .request(Method::GET, &path)
            .query(&[("recursive", "1")])
            .send()
            .await?;
        let payload = ensure_success("github", response)
            .await?
            .json::<TreePayload>()
            .await?;
        Ok(payload
            .tree
            .into_iter()
            .filter(|entry| entry.kind.as_deref() == Some("blob"))
            .map(|entry| entry.path.unwrap_or_default())
            .collect())
    }

    async fn fetch_tree(&self, repo: &RepoRef, branch: Option<&str>) -> Result<Vec<String>> {
        let mut candidates: Vec<&str> = Vec::new();
        for name in branch.into_iter().chain(FALLBACK_BRANCHES.iter().copied()) {
            if !candidates.contains(&name) {
                candidates.push(name);
            }
        }

        let mut last_error = None;
        for name in candidates {
            match self.fetch_tree_at(repo, name).await {
                Ok(files) => return Ok(files),
                Err(err) => {
                    log::debug!("tree lookup for {repo}@{name} failed: {err}");
                    last_error = Some(err);
                }
            }
        }
        Err(last_error
            .unwrap_or_else(|| RepoMedicError::Other(format!("no branch to list for {repo}"))))
    }

    async fn fetch_file(&self, repo: &RepoRef, file_path: &str) -> Result<Option<String>> {
        let encoded = file_path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        let path = format!("/repos/{}/{}/contents/{encoded}", repo.owner, repo.repo);
        let response = self.request(Method::GET, &path).send().await?;
        let payload = ensure_success("github", response)
            .await?
            .json::<ContentPayload>()
            .await?;
        let Some(encoded) = payload.content else {
            return Ok(None);
        };
        Ok(Some(decode_content(&encoded)?))
    }

    async fn post_issue(&self, repo: &RepoRef, draft: &IssueDraft) -> Result<CreatedIssue> {
        let path = format!("/repos/{}/{}/issues", repo.owner, repo.repo);
        let payload = IssuePayload {
            title: &draft.title,
            body: &draft.body,
        };
        let response = self
            .request(Method::POST, &path)
            .json(&payload)
            .send()
            .await?;
        let created = ensure_success("github", response)
            .await?
            .json::<IssueResponse>()
            .await?;
        Ok(CreatedIssue {
            title: created.title,
            number: created.number,
            url: created.html_url,
        })
    }
}

impl RepositoryHost for GitHubApiClient {
    fn repository<'a>(&'a self, repo: &'a RepoRef) -> BoxFuture<'a, Result<RepositoryMetadata>> {
        Box::pin(self.fetch_repository(repo))
    }

    fn tree<'a>(
        &'a self,
        repo: &'a RepoRef,
        branch: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Vec<String>>> {
        Box::pin(self.fetch_tree(repo, branch))
    }

    fn file_content<'a>(
        &'a self,
        repo: &'a RepoRef,
        path: &'a str,
    ) -> BoxFuture<'a, Option<String>> {
        Box::pin(async move {
            match self.fetch_file(repo, path).await {
                Ok(content) => content,
                Err(err) => {
                    log::debug!("could not read {path} from {repo}: {err}");
                    None
                }
            }
        })
    }

    fn create_issue<'a>(
        &'a self,
        repo: &'a RepoRef,
        draft: &'a IssueDraft,
    ) -> BoxFuture<'a, Result<CreatedIssue>> {
        Box::pin(self.post_issue(repo, draft))
    }
}

fn decode_content(encoded: &str) -> Result<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|err| RepoMedicError::Other(format!("invalid base64 content: {err}")))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Fetch metadata, listing and key files of a remote repository.
///
/// Key files that cannot be read, or are empty, are left out of the snapshot.
pub async fn fetch_snapshot(
    host: &dyn RepositoryHost,
    repo: &RepoRef,
) -> Result<RepositorySnapshot> {
    let metadata = host.repository(repo).await?;
    let files = host.tree(repo, metadata.default_branch.as_deref()).await?;

    let mut key_files_content = KeyFilesContent::new();
    for key in present_key_files(&files) {
        match host.file_content(repo, key).await {
            Some(content) if !content.is_empty() => {
                key_files_content.insert(key.to_string(), content);
            }
            _ => log::debug!("no content for {key} in {repo}"),
        }
    }

    log::info!("fetched {} files from {repo}", files.len());
    Ok(assemble_snapshot(files, metadata, key_files_content))
}


#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::{GET, POST};
    use httpmock::MockServer;

    fn client_for(server: &MockServer, token: Option<&str>) -> GitHubApiClient {
        GitHubApiClient::new(GitHubSettings {
            api_url: server.base_url(),
            token: token.map(str::to_string),
            user_agent: "repomedic-test".to_string(),
        })
        .expect("client")
    }

    fn encode(text: &str) -> String {
        STANDARD.encode(text.as_bytes())
    }

    #[test]
    fn parses_common_url_shapes() {
        let cases = [
            ("https://github.com/rust-lang/cargo", "rust-lang", "cargo"),
            ("https://github.com/rust-lang/cargo.git", "rust-lang", "cargo"),
            ("git@github.com/owner/name/tree/main/src", "owner", "name"),
            ("github.com/a/b?tab=readme", "a", "b?tab=readme"),
            ("http://www.github.com/a/b/", "a", "b"),
            ("https://github.com/a/my.github.io", "a", "myhub.io"),
        ];
        for (url, owner, repo) in cases {
            let parsed = parse_github_url(url).expect(url);
            assert_eq!(parsed, RepoRef::new(owner, repo), "{url}");
        }
    }

    #[test]
    fn git_suffix_removed_once() {
        let parsed = parse_github_url("https://github.com/o/a.git.git").expect("url");
        assert_eq!(parsed.repo, "a.git");
    }

    #[test]
    fn rejects_non_github_urls() {
        for url in [
            "https://gitlab.com/a/b",
            "https://github.com/only-owner",
            "https://github.com//repo",
            "",
        ] {
            let err = parse_github_url(url).expect_err(url);
            assert!(matches!(err, RepoMedicError::InvalidUrl(_)));
        }
    }

    #[test]
    fn repo_ref_formats() {
        let repo = RepoRef::new("octo", "demo");
        assert_eq!(repo.to_string(), "octo/demo");
        assert_eq!(repo.html_url(), "https://github.com/octo/demo");
    }

    #[test]
    fn decodes_wrapped_base64() {
        let encoded = "aGVsbG8g\nd29ybGQ=\n";
        assert_eq!(decode_content(encoded).expect("decode"), "hello world");
        assert!(decode_content("***").is_err());
    }

    #[tokio::test]
    async fn fetch_snapshot_collects_metadata_tree_and_key_files() {
        let server = MockServer::start_async().await;
        let repo_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/repos/octo/demo")
                    .header("authorization", "Bearer gh-token");
                then.status(200).json_body(serde_json::json!({
                    "name": "demo",
                    "description": "A demo",
                    "language": "TypeScript",
                    "stargazers_count": 7,
                    "forks_count": 1,
                    "default_branch": "trunk",
                    "topics": ["cli"],
                    "created_at": "2024-01-01T00:00:00Z",
                    "updated_at": "2024-02-01T00:00:00Z"
                }));
            })
            .await;
        let tree_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/repos/octo/demo/git/trees/trunk")
                    .query_param("recursive", "1");
                then.status(200).json_body(serde_json::json!({
                    "tree": [
                        {"path": "src", "type": "tree"},
                        {"path": "src/index.ts", "type": "blob"},
                        {"path": "package.json", "type": "blob"},
                        {"path": "README.md", "type": "blob"}
                    ]
                }));
            })
            .await;
        let package_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/repos/octo/demo/contents/package.json");
                then.status(200)
                    .json_body(serde_json::json!({ "content": encode("{\"name\":\"demo\"}") }));
            })
            .await;
        let readme_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/repos/octo/demo/contents/README.md");
                then.status(404).body("Not Found");
            })
            .await;

        let client = client_for(&server, Some("gh-token"));
        let snapshot = fetch_snapshot(&client, &RepoRef::new("octo", "demo"))
            .await
            .expect("snapshot");

        repo_mock.assert_async().await;
        tree_mock.assert_async().await;
        package_mock.assert_async().await;
        readme_mock.assert_async().await;
        assert_eq!(snapshot.metadata.stars, Some(7));
        assert_eq!(snapshot.metadata.default_branch.as_deref(), Some("trunk"));
        assert_eq!(snapshot.files, vec!["src/index.ts", "package.json", "README.md"]);
        assert_eq!(snapshot.package_json(), Some("{\"name\":\"demo\"}"));
        assert!(snapshot.readme().is_none());
        assert!(!snapshot.missing_files.readme);
        assert!(snapshot.missing_files.gitignore);
    }

    #[tokio::test]
    async fn tree_falls_back_to_master() {
        let server = MockServer::start_async().await;
        let main_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/repos/o/r/git/trees/main");
                then.status(404).body("Not Found");
            })
            .await;
        let master_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/repos/o/r/git/trees/master");
                then.status(200).json_body(serde_json::json!({
                    "tree": [{"path": "lib.rs", "type": "blob"}]
                }));
            })
            .await;

        let client = client_for(&server, None);
        let files = client
            .tree(&RepoRef::new("o", "r"), Some("main"))
            .await
            .expect("tree");

        main_mock.assert_hits_async(1).await;
        master_mock.assert_async().await;
        assert_eq!(files, vec!["lib.rs"]);
    }

    #[tokio::test]
    async fn file_content_encodes_path_segments() {
        let server = MockServer::start_async().await;
        let good_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/repos/o/r/contents/src/a%23b.ts");
                then.status(200)
                    .json_body(serde_json::json!({"content": encode("export {};")}));
            })
            .await;
        let wrong_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/repos/o/r/contents/src/a");
                then.status(200)
                    .json_body(serde_json::json!({"content": encode("WRONG FILE")}));
            })
            .await;

        let client = client_for(&server, None);
        let content = client
            .file_content(&RepoRef::new("o", "r"), "src/a#b.ts")
            .await;

        good_mock.assert_async().await;
        wrong_mock.assert_hits_async(0).await;
        assert_eq!(content.as_deref(), Some("export {};"));
    }

    #[tokio::test]
    async fn repository_errors_carry_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/repos/o/missing");
                then.status(404).body("Not Found");
            })
            .await;

        let client = client_for(&server, None);
        let err = client
            .repository(&RepoRef::new("o", "missing"))
            .await
            .expect_err("missing repo");
        match err {
            RepoMedicError::Api { service, status, body } => {
                assert_eq!(service, "github");
                assert_eq!(status, 404);
                assert_eq!(body, "Not Found");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_issue_posts_title_and_body() {
        let server = MockServer::start_async().await;
        let issue_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/repos/o/r/issues")
                    .json_body(serde_json::json!({"title": "Add tests", "body": "Please"}));
                then.status(201).json_body(serde_json::json!({
                    "number": 12,
                    "html_url": "https://github.com/o/r/issues/12",
                    "title": "Add tests"
                }));
            })
            .await;

        let client = client_for(&server, Some("token"));
        let draft = IssueDraft::new("Add tests", "Please");
        let created = client
            .create_issue(&RepoRef::new("o", "r"), &draft)
            .await
            .expect("issue");

        issue_mock.assert_async().await;
        assert_eq!(created.number, 12);
        assert_eq!(created.url, "https://github.com/o/r/issues/12");
    }
}
