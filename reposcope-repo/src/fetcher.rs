//! Repository fetchers - produce the ordered list of sources to analyze

use async_trait::async_trait;
use reposcope_core::{
    ErrorContext, GitHubConfig, RepositoryConfig, RepositoryFetcher, RepositorySource,
    ScopeError, ScopeResult,
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::api::github::GitHubRepository;
use crate::api::{ApiClientConfig, GitHubApiClient, GitHubRepositorySource};
use crate::filter::DirectoryFilter;

/// Which repositories to keep from a creation-ordered listing
#[derive(Debug, Clone, Default)]
pub struct RepositorySelection {
    /// Names (`name` or `owner/name`) to keep; `None` keeps everything
    pub allow_list: Option<Vec<String>>,
    /// Keep at most this many, counted after the allow-list
    pub limit: Option<usize>,
}

impl RepositorySelection {
    pub fn from_config(config: &RepositoryConfig) -> Self {
        Self {
            allow_list: config.allow_list.clone(),
            limit: config.limit,
        }
    }

    pub fn allows(&self, name: &str, full_name: &str) -> bool {
        match &self.allow_list {
            None => true,
            Some(names) => names.iter().any(|allowed| {
                allowed.eq_ignore_ascii_case(name) || allowed.eq_ignore_ascii_case(full_name)
            }),
        }
    }

    /// Apply allow-list then limit, keeping input order
    pub fn apply<T>(&self, items: Vec<T>, names: impl Fn(&T) -> (&str, &str)) -> Vec<T> {
        let selected = items.into_iter().filter(|item| {
            let (name, full_name) = names(item);
            self.allows(name, full_name)
        });
        match self.limit {
            Some(limit) => selected.take(limit).collect(),
            None => selected.collect(),
        }
    }
}

/// The authenticated user's GitHub repositories, oldest first
pub struct GitHubFetcher {
    client: Arc<GitHubApiClient>,
    selection: RepositorySelection,
    filter: DirectoryFilter,
}

impl GitHubFetcher {
    pub fn new(
        client: GitHubApiClient,
        selection: RepositorySelection,
        filter: DirectoryFilter,
    ) -> Self {
        Self {
            client: Arc::new(client),
            selection,
            filter,
        }
    }

    /// Build from configuration; fails when no token can be resolved
    pub fn from_config(github: &GitHubConfig, repository: &RepositoryConfig) -> ScopeResult<Self> {
        let api_config = ApiClientConfig::from_github_config(github);
        if api_config.access_token.is_none() {
            return Err(ScopeError::Config {
                message: "GitHub token not found".to_string(),
                source: None,
                context: ErrorContext::new("github_fetcher")
                    .with_operation("from_config")
                    .with_suggestion("Set GITHUB_TOKEN in the environment or .env.local")
                    .with_suggestion("Or analyze local checkouts with --local"),
            });
        }

        Ok(Self::new(
            GitHubApiClient::new(api_config)?,
            RepositorySelection::from_config(repository),
            DirectoryFilter::new(repository.excluded_dirs.iter().cloned()),
        ))
    }
}

#[async_trait]
impl RepositoryFetcher for GitHubFetcher {
    async fn fetch(&self) -> ScopeResult<Vec<Box<dyn RepositorySource>>> {
        let repositories = self.client.list_user_repositories().await?;
        let listed = repositories.len();

        let selected = self.selection.apply(repositories, |repo: &GitHubRepository| {
            (repo.name.as_str(), repo.full_name.as_str())
        });

        info!(listed, selected = selected.len(), "Selected GitHub repositories");

        Ok(selected
            .iter()
            .map(|repo| {
                debug!(repo = %repo.full_name, created_at = %repo.created_at, "Queued repository");
                Box::new(GitHubRepositorySource::new(
                    Arc::clone(&self.client),
                    repo,
                    self.filter.clone(),
                )) as Box<dyn RepositorySource>
            })
            .collect())
    }
}
