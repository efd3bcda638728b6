//! GitHub REST API access.
//!
//! [`GitHubApi`] is the read-only surface the repository browser needs.
//! [`HttpGitHub`] implements it with a blocking `ureq` agent; every request
//! is a GET carrying the bearer token and the v3 accept header.

use crate::models::github::{
    Branch, Commit, ContentEntry, Contents, Issue, PullRequest, Repository, SearchResults, User,
};
use serde::de::DeserializeOwned;
use std::io::Read;
use thiserror::Error;

/// GitHub API base URL
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Web host used for archive downloads
pub const GITHUB_WEB_BASE: &str = "https://github.com";

/// Accept header sent with every API request
pub const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";

/// User-Agent header required by GitHub API
const USER_AGENT: &str = concat!("hubdeck/", env!("CARGO_PKG_VERSION"));

/// Number of repositories returned by a search
pub const SEARCH_LIMIT: u32 = 10;

/// Page size for commit, issue and pull request lists
pub const LIST_PAGE_SIZE: u32 = 20;

/// Errors from a single GitHub request. None of them are retried.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Token is invalid or expired (401 Unauthorized)
    #[error("Invalid or expired token: GitHub returned 401 Unauthorized")]
    Unauthorized,

    /// Token lacks required permissions (403 Forbidden)
    #[error("Token lacks required permissions: GitHub returned 403 Forbidden")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success status
    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },

    /// Network or transport failure
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to parse response
    #[error("Failed to parse GitHub response: {0}")]
    Parse(String),
}

impl ApiError {
    /// Whether the failure means the credentials were rejected.
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Unauthorized | ApiError::Forbidden)
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Read-only GitHub operations used by the repository browser.
pub trait GitHubApi {
    /// GET /user
    fn user(&self, token: &str) -> ApiResult<User>;

    /// GET /search/repositories sorted by stars, descending.
    fn search_repositories(&self, token: &str, query: &str, limit: u32)
    -> ApiResult<SearchResults>;

    /// GET /repos/{full_name}
    fn repository(&self, token: &str, full_name: &str) -> ApiResult<Repository>;

    /// GET /repos/{full_name}/contents/{path}?ref={git_ref}
    fn contents(
        &self,
        token: &str,
        full_name: &str,
        path: &str,
        git_ref: &str,
    ) -> ApiResult<Vec<ContentEntry>>;

    /// GET /repos/{full_name}/commits
    fn commits(&self, token: &str, full_name: &str, per_page: u32) -> ApiResult<Vec<Commit>>;

    /// GET /repos/{full_name}/branches
    fn branches(&self, token: &str, full_name: &str) -> ApiResult<Vec<Branch>>;

    /// GET /repos/{full_name}/issues?state=open
    fn issues(&self, token: &str, full_name: &str, per_page: u32) -> ApiResult<Vec<Issue>>;

    /// GET /repos/{full_name}/pulls?state=open
    fn pulls(&self, token: &str, full_name: &str, per_page: u32) -> ApiResult<Vec<PullRequest>>;

    /// GET an absolute URL (raw file content, archives) without API headers.
    fn raw(&self, url: &str) -> ApiResult<Vec<u8>>;
}

/// Blocking HTTP implementation of [`GitHubApi`].
pub struct HttpGitHub {
    agent: ureq::Agent,
    api_base: String,
}

impl HttpGitHub {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().user_agent(USER_AGENT).build(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn request(&self, token: &str, endpoint: &str) -> ureq::Request {
        let url = format!("{}{}", self.api_base, endpoint);
        tracing::debug!(%url, "GitHub request");
        self.agent
            .get(&url)
            .set("Authorization", &format!("token {}", token))
            .set("Accept", ACCEPT_HEADER)
    }

    fn get_json<T: DeserializeOwned>(&self, request: ureq::Request, what: &str) -> ApiResult<T> {
        match request.call() {
            Ok(resp) => resp
                .into_json::<T>()
                .map_err(|e| ApiError::Parse(e.to_string())),
            Err(e) => Err(map_error(e, what)),
        }
    }
}

impl Default for HttpGitHub {
    fn default() -> Self {
        Self::new(GITHUB_API_BASE)
    }
}

impl GitHubApi for HttpGitHub {
    fn user(&self, token: &str) -> ApiResult<User> {
        self.get_json(self.request(token, "/user"), "user")
    }

    fn search_repositories(
        &self,
        token: &str,
        query: &str,
        limit: u32,
    ) -> ApiResult<SearchResults> {
        let request = self
            .request(token, "/search/repositories")
            .query("q", query)
            .query("sort", "stars")
            .query("order", "desc")
            .query("per_page", &limit.to_string());
        self.get_json(request, "search")
    }

    fn repository(&self, token: &str, full_name: &str) -> ApiResult<Repository> {
        self.get_json(
            self.request(token, &format!("/repos/{}", full_name)),
            full_name,
        )
    }

    fn contents(
        &self,
        token: &str,
        full_name: &str,
        path: &str,
        git_ref: &str,
    ) -> ApiResult<Vec<ContentEntry>> {
        let endpoint = if path.is_empty() {
            format!("/repos/{}/contents", full_name)
        } else {
            format!("/repos/{}/contents/{}", full_name, encode_path(path))
        };
        let request = self.request(token, &endpoint).query("ref", git_ref);
        let contents: Contents = self.get_json(request, &format!("{}/{}", full_name, path))?;
        Ok(contents.into_entries())
    }

    fn commits(&self, token: &str, full_name: &str, per_page: u32) -> ApiResult<Vec<Commit>> {
        let request = self
            .request(token, &format!("/repos/{}/commits", full_name))
            .query("per_page", &per_page.to_string());
        self.get_json(request, full_name)
    }

    fn branches(&self, token: &str, full_name: &str) -> ApiResult<Vec<Branch>> {
        self.get_json(
            self.request(token, &format!("/repos/{}/branches", full_name)),
            full_name,
        )
    }

    fn issues(&self, token: &str, full_name: &str, per_page: u32) -> ApiResult<Vec<Issue>> {
        let request = self
            .request(token, &format!("/repos/{}/issues", full_name))
            .query("state", "open")
            .query("per_page", &per_page.to_string());
        self.get_json(request, full_name)
    }

    fn pulls(&self, token: &str, full_name: &str, per_page: u32) -> ApiResult<Vec<PullRequest>> {
        let request = self
            .request(token, &format!("/repos/{}/pulls", full_name))
            .query("state", "open")
            .query("per_page", &per_page.to_string());
        self.get_json(request, full_name)
    }

    fn raw(&self, url: &str) -> ApiResult<Vec<u8>> {
        tracing::debug!(%url, "raw download");
        match self.agent.get(url).call() {
            Ok(resp) => {
                let mut body = Vec::new();
                resp.into_reader()
                    .read_to_end(&mut body)
                    .map_err(|e| ApiError::Http(e.to_string()))?;
                Ok(body)
            }
            Err(e) => Err(map_error(e, url)),
        }
    }
}

fn map_error(err: ureq::Error, what: &str) -> ApiError {
    match err {
        ureq::Error::Status(401, _) => ApiError::Unauthorized,
        ureq::Error::Status(403, _) => ApiError::Forbidden,
        ureq::Error::Status(404, _) => ApiError::NotFound(what.to_string()),
        ureq::Error::Status(code, resp) => {
            let body = resp.into_string().unwrap_or_default();
            ApiError::Status { code, body }
        }
        ureq::Error::Transport(t) => ApiError::Http(t.to_string()),
    }
}

/// Archive URL for a branch of a repository.
/// Percent-encode each segment of a repository path, keeping the slashes.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

pub fn archive_url(full_name: &str, branch: &str) -> String {
    format!(
        "{}/{}/archive/refs/heads/{}.zip",
        GITHUB_WEB_BASE, full_name, branch
    )
}
