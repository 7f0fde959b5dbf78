//! Read-only access to the repository host.
//!
//! `RepositoryHost` is the seam the summarizer talks to. `GitHubClient` is the
//! REST implementation used by the server; tests plug in an in-memory host.
//!
//! Endpoints used:
//! - GET /repos/{owner}/{name}                         → metadata
//! - GET /repos/{owner}/{name}/git/trees/{branch}      → recursive tree
//! - GET /repos/{owner}/{name}/contents/{path}?ref=    → base64 file content

use std::future::Future;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::github::reference::RepositoryReference;

const USER_AGENT: &str = concat!("napkin-relay/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryMetadata {
    pub description: String,
    pub default_branch: String,
    pub language: String,
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
    /// Submodule pointer.
    Commit,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileTreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl FileTreeEntry {
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// The three read calls the summarizer needs.
///
/// Metadata and tree failures are fatal to a summary; content failures are not,
/// but that policy lives in the caller, not here.
pub trait RepositoryHost {
    fn metadata(
        &self,
        repo: &RepositoryReference,
    ) -> impl Future<Output = Result<RepositoryMetadata>> + Send;

    fn tree(
        &self,
        repo: &RepositoryReference,
        branch: &str,
    ) -> impl Future<Output = Result<Vec<FileTreeEntry>>> + Send;

    fn file_content(
        &self,
        repo: &RepositoryReference,
        branch: &str,
        path: &str,
    ) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

#[derive(Debug, Clone)]
pub struct GitHubSettings {
    pub api_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

pub struct GitHubClient {
    http: Client,
    api_url: Url,
}

#[derive(Debug, Deserialize)]
struct RepoResponse {
    description: Option<String>,
    default_branch: Option<String>,
    language: Option<String>,
    topics: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<FileTreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    encoding: Option<String>,
    content: Option<String>,
}

impl GitHubClient {
    pub fn new(settings: &GitHubSettings) -> Result<Self> {
        let api_url = Url::parse(&settings.api_url)
            .map_err(|e| AppError::Internal(format!("Invalid GitHub API URL: {}", e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));
        if let Some(token) = settings.token.as_deref().filter(|t| !t.trim().is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
                .map_err(|_| AppError::Internal("GitHub token is not a valid header".to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .timeout(settings.timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self { http, api_url })
    }

    fn endpoint(&self, repo: &RepositoryReference, tail: &[&str]) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("GitHub API URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["repos", repo.owner.as_str(), repo.name.as_str()])
            .extend(tail);
        Ok(url)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: Url,
        query: &[(&str, &str)],
        what: &str,
    ) -> Result<T> {
        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::UpstreamUnavailable(format!("{} returned {}", what, status)));
        }
        Ok(response.json::<T>().await?)
    }
}

impl RepositoryHost for GitHubClient {
    async fn metadata(&self, repo: &RepositoryReference) -> Result<RepositoryMetadata> {
        let url = self.endpoint(repo, &[])?;
        let raw: RepoResponse = self
            .get_json(url, &[], &format!("metadata for {}", repo))
            .await?;

        Ok(RepositoryMetadata {
            description: raw.description.unwrap_or_else(|| "No description".to_string()),
            default_branch: raw.default_branch.unwrap_or_else(|| "main".to_string()),
            language: raw.language.unwrap_or_else(|| "Unknown".to_string()),
            topics: raw.topics.unwrap_or_default(),
        })
    }

    async fn tree(&self, repo: &RepositoryReference, branch: &str) -> Result<Vec<FileTreeEntry>> {
        let url = self.endpoint(repo, &["git", "trees", branch])?;
        let raw: TreeResponse = self
            .get_json(url, &[("recursive", "1")], &format!("tree for {}@{}", repo, branch))
            .await?;

        if raw.truncated {
            tracing::warn!("Tree for {}@{} was truncated by the host", repo, branch);
        }
        Ok(raw.tree)
    }

    async fn file_content(
        &self,
        repo: &RepositoryReference,
        branch: &str,
        path: &str,
    ) -> Result<Vec<u8>> {
        let mut tail = vec!["contents"];
        tail.extend(path.split('/'));
        let url = self.endpoint(repo, &tail)?;
        let raw: ContentResponse = self
            .get_json(url, &[("ref", branch)], &format!("content of {}", path))
            .await?;

        match (raw.encoding.as_deref(), raw.content) {
            (Some("base64"), Some(content)) if !content.is_empty() => {
                let compact: String = content.split_ascii_whitespace().collect();
                STANDARD
                    .decode(compact)
                    .map_err(|e| AppError::UpstreamUnavailable(format!("{}: bad base64: {}", path, e)))
            }
            (encoding, _) => Err(AppError::UpstreamUnavailable(format!(
                "{}: unsupported content encoding {:?}",
                path, encoding
            ))),
        }
    }
}
