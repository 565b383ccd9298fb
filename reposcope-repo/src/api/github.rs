//! GitHub API client implementation

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use reposcope_core::{
    retry_async, ErrorContext, FileEntry, RepositoryDescriptor, RepositorySource, RetryConfig,
    ScopeError, ScopeResult,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{create_http_client, handle_response_error, transport_error, ApiClientConfig};
use crate::filter::DirectoryFilter;

/// GitHub API client
pub struct GitHubApiClient {
    client: reqwest::Client,
    config: ApiClientConfig,
    retry: RetryConfig,
}

/// GitHub repository response
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepository {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub default_branch: Option<String>,
    pub created_at: DateTime<Utc>,
    pub owner: GitHubOwner,
    #[serde(default)]
    pub archived: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubOwner {
    pub login: String,
}

/// GitHub tree response
#[derive(Debug, Deserialize)]
struct GitHubTreeResponse {
    tree: Vec<GitHubTreeItem>,
    truncated: Option<bool>,
}

/// GitHub tree item
#[derive(Debug, Deserialize)]
struct GitHubTreeItem {
    path: String,
    #[serde(rename = "type")]
    item_type: String,
    size: Option<u64>,
}

/// GitHub content response
#[derive(Debug, Deserialize)]
struct GitHubContentResponse {
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
}

impl GitHubApiClient {
    /// Create a new GitHub API client
    pub fn new(config: ApiClientConfig) -> ScopeResult<Self> {
        let client = create_http_client(&config)?;

        info!(base_url = %config.base_url, "Created GitHub API client");

        Ok(Self {
            client,
            config,
            retry: RetryConfig::default(),
        })
    }

    /// Override the retry policy used for listing requests
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn has_token(&self) -> bool {
        self.config.access_token.is_some()
    }

    /// Create authorization headers
    fn create_auth_headers(&self) -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();

        if let Some(ref token) = self.config.access_token {
            if let Ok(auth_value) =
                reqwest::header::HeaderValue::from_str(&format!("token {}", token))
            {
                headers.insert(reqwest::header::AUTHORIZATION, auth_value);
            }
        }

        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github.v3+json"),
        );

        headers
    }

    fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Single GET request decoded as JSON
    async fn get_once<T: DeserializeOwned>(
        client: reqwest::Client,
        url: String,
        headers: reqwest::header::HeaderMap,
        operation: &'static str,
    ) -> ScopeResult<T> {
        debug!(url = %url, "Making GitHub API request");

        let response = client
            .get(&url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| transport_error(e, operation))?;

        if !response.status().is_success() {
            return Err(handle_response_error(response, operation).await);
        }

        response.json::<T>().await.map_err(|e| ScopeError::Repository {
            message: format!("Failed to parse GitHub response: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("github_api_client").with_operation(operation),
        })
    }

    /// GET with retries on network failures and rate limits
    async fn get_json<T>(&self, endpoint: &str, operation: &'static str) -> ScopeResult<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let client = self.client.clone();
        let url = self.url(endpoint);
        let headers = self.create_auth_headers();

        retry_async(
            move || Self::get_once::<T>(client.clone(), url.clone(), headers.clone(), operation).boxed(),
            self.retry.clone(),
            operation,
        )
        .await
    }

    /// All repositories of the authenticated user, oldest first
    pub async fn list_user_repositories(&self) -> ScopeResult<Vec<GitHubRepository>> {
        if !self.has_token() {
            return Err(ScopeError::Authentication {
                message: "GitHub token not found".to_string(),
                context: ErrorContext::new("github_api_client")
                    .with_operation("list_user_repositories")
                    .with_suggestion("Set the GITHUB_TOKEN environment variable")
                    .with_suggestion("Or set github.token in the config file"),
            });
        }

        let per_page = self.config.per_page.max(1);
        let mut repositories = Vec::new();
        let mut page = 1;

        loop {
            let endpoint = format!(
                "user/repos?per_page={}&page={}&sort=created&direction=asc",
                per_page, page
            );
            let batch: Vec<GitHubRepository> =
                self.get_json(&endpoint, "list_user_repositories").await?;
            let done = batch.len() < per_page as usize;
            repositories.extend(batch);
            if done {
                break;
            }
            page += 1;
        }

        repositories.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        info!(count = repositories.len(), "Found repositories");
        Ok(repositories)
    }

    /// Recursive listing of one branch, directories included
    pub async fn get_file_tree(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> ScopeResult<Vec<FileEntry>> {
        info!(owner, repo, branch, "Fetching GitHub file tree");

        let endpoint = format!(
            "repos/{}/{}/git/trees/{}?recursive=1",
            owner,
            repo,
            urlencoding::encode(branch)
        );

        let tree_response: GitHubTreeResponse =
            match self.get_json(&endpoint, "get_file_tree").await {
                Ok(tree) => tree,
                // 409 Conflict is GitHub's answer for a repository without commits
                Err(ScopeError::Repository { ref context, .. })
                    if context.metadata.get("status").map(String::as_str) == Some("409") =>
                {
                    debug!(owner, repo, "Repository is empty");
                    return Ok(Vec::new());
                }
                Err(e) => return Err(e),
            };

        if tree_response.truncated.unwrap_or(false) {
            warn!(owner, repo, "GitHub file tree was truncated");
        }

        let files = tree_items_to_entries(tree_response.tree);
        info!(owner, repo, entries = files.len(), "Retrieved GitHub file tree");
        Ok(files)
    }

    /// Content of one file, decoded as UTF-8
    pub async fn get_file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        branch: &str,
    ) -> ScopeResult<String> {
        debug!(owner, repo, path, "Fetching GitHub file content");

        let encoded_path = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        let endpoint = format!(
            "repos/{}/{}/contents/{}?ref={}",
            owner,
            repo,
            encoded_path,
            urlencoding::encode(branch)
        );

        let content_response: GitHubContentResponse = Self::get_once(
            self.client.clone(),
            self.url(&endpoint),
            self.create_auth_headers(),
            "get_file_content",
        )
        .await?;

        if content_response.encoding != "base64" {
            return Err(ScopeError::Repository {
                message: format!(
                    "Unexpected encoding '{}' for {}",
                    content_response.encoding, path
                ),
                source: None,
                context: ErrorContext::new("github_api_client")
                    .with_operation("get_file_content")
                    .with_suggestion("Files over 1 MB are not served inline by the contents API"),
            });
        }

        decode_base64_content(&content_response.content)
    }
}

/// Map tree items to listing entries; submodules (`commit`) are dropped
fn tree_items_to_entries(items: Vec<GitHubTreeItem>) -> Vec<FileEntry> {
    items
        .into_iter()
        .filter_map(|item| match item.item_type.as_str() {
            "blob" => Some(FileEntry::file(&item.path, item.size)),
            "tree" => Some(FileEntry::dir(&item.path)),
            _ => None,
        })
        .collect()
}

/// Decode base64 content from GitHub API
fn decode_base64_content(content: &str) -> ScopeResult<String> {
    let cleaned_content = content.replace(['\n', '\r', ' '], "");

    let decoded_bytes = BASE64
        .decode(&cleaned_content)
        .map_err(|e| ScopeError::Repository {
            message: format!("Failed to decode base64 content: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("github_api_client")
                .with_operation("decode_base64_content"),
        })?;

    String::from_utf8(decoded_bytes).map_err(|e| ScopeError::Repository {
        message: format!("Content is not valid UTF-8: {}", e),
        source: Some(Box::new(e)),
        context: ErrorContext::new("github_api_client").with_operation("decode_base64_content"),
    })
}

/// One GitHub repository, listed and read through the API on demand
pub struct GitHubRepositorySource {
    client: Arc<GitHubApiClient>,
    descriptor: RepositoryDescriptor,
    owner: String,
    repo: String,
    branch: String,
    filter: DirectoryFilter,
}

impl GitHubRepositorySource {
    pub fn new(
        client: Arc<GitHubApiClient>,
        repository: &GitHubRepository,
        filter: DirectoryFilter,
    ) -> Self {
        let descriptor =
            RepositoryDescriptor::new(&repository.name, &repository.full_name, repository.created_at)
                .with_description(repository.description.clone());

        Self {
            client,
            descriptor,
            owner: repository.owner.login.clone(),
            repo: repository.name.clone(),
            branch: repository
                .default_branch
                .clone()
                .unwrap_or_else(|| "HEAD".to_string()),
            filter,
        }
    }
}

#[async_trait]
impl RepositorySource for GitHubRepositorySource {
    fn descriptor(&self) -> &RepositoryDescriptor {
        &self.descriptor
    }

    async fn list_files(&self) -> ScopeResult<Vec<FileEntry>> {
        let entries = self
            .client
            .get_file_tree(&self.owner, &self.repo, &self.branch)
            .await?;
        Ok(self.filter.apply(entries))
    }

    async fn read_file(&self, path: &str) -> ScopeResult<String> {
        self.client
            .get_file_content(&self.owner, &self.repo, path, &self.branch)
            .await
    }
}
