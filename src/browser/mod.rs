//! Repository browser controller.
//!
//! [`BrowserState`] is the whole session: token, selected repository,
//! browse path, branch and the tabs loaded so far. [`RepoBrowser`] holds the
//! API client and applies operations to a state passed in by reference.
//!
//! Every remote failure is reported once through the [`Notifier`] and
//! returned as an error; the state keeps its last stable values.

pub mod view;

use crate::github::{self, ApiError, GitHubApi};
use crate::models::github::{Branch, Commit, ContentEntry, Issue, PullRequest, Repository, User};
use crate::notify::Notifier;
use crate::storage::{ItemStore, SESSION_KEY, TOKEN_KEY};
use crate::debounce::Debouncer;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub use view::{FileRow, ListRow, Listing, RepoCard};

/// Branch used when a repository does not report a default branch
pub const FALLBACK_BRANCH: &str = "main";

/// Repository tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Files,
    Commits,
    Branches,
    Issues,
    Pulls,
}

impl Tab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Files => "files",
            Tab::Commits => "commits",
            Tab::Branches => "branches",
            Tab::Issues => "issues",
            Tab::Pulls => "pulls",
        }
    }
}

impl std::str::FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "files" => Ok(Tab::Files),
            "commits" => Ok(Tab::Commits),
            "branches" => Ok(Tab::Branches),
            "issues" => Ok(Tab::Issues),
            "pulls" | "prs" | "pull-requests" => Ok(Tab::Pulls),
            _ => Err(format!("Unknown tab: {}", s)),
        }
    }
}

/// Data for tabs that have been activated at least once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadedTabs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commits: Option<Vec<Commit>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<Branch>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<Issue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pulls: Option<Vec<PullRequest>>,
}

impl LoadedTabs {
    pub fn is_loaded(&self, tab: Tab) -> bool {
        match tab {
            Tab::Files => true,
            Tab::Commits => self.commits.is_some(),
            Tab::Branches => self.branches.is_some(),
            Tab::Issues => self.issues.is_some(),
            Tab::Pulls => self.pulls.is_some(),
        }
    }
}

/// Repository browser session.
///
/// The token is stored under its own key and survives everything but
/// [`RepoBrowser::disconnect`]. The rest is saved as one JSON blob.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrowserState {
    #[serde(skip)]
    pub token: Option<String>,
    #[serde(default)]
    pub repo: Option<Repository>,
    /// Slash-delimited, relative to the repository root; empty at root.
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub active_tab: Tab,
    /// Last successful directory listing, already sorted.
    #[serde(default)]
    pub entries: Vec<ContentEntry>,
    #[serde(default)]
    pub tabs: LoadedTabs,
    #[serde(default)]
    pub search_results: Vec<Repository>,
}

impl BrowserState {
    /// Load the token and saved session from the item store.
    pub fn load(store: &dyn ItemStore) -> Result<Self> {
        let mut state = match store.get_item(SESSION_KEY)? {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "discarding unreadable browser session");
                BrowserState::default()
            }),
            None => BrowserState::default(),
        };
        state.token = store.get_item(TOKEN_KEY)?.filter(|t| !t.is_empty());
        Ok(state)
    }

    /// Save everything except the token.
    pub fn save(&self, store: &mut dyn ItemStore) -> Result<()> {
        store.set_item(SESSION_KEY, &serde_json::to_string(self)?)
    }

    pub fn is_connected(&self) -> bool {
        self.token.is_some()
    }

    fn require_token(&self) -> Result<&str> {
        self.token.as_deref().ok_or(Error::NotConnected)
    }

    fn require_repo(&self) -> Result<&Repository> {
        self.repo.as_ref().ok_or(Error::NoRepository)
    }

    /// Forget the selected repository and everything loaded for it.
    fn reset_repository(&mut self) {
        self.repo = None;
        self.path.clear();
        self.branch.clear();
        self.active_tab = Tab::Files;
        self.entries.clear();
        self.tabs = LoadedTabs::default();
    }
}

/// Repository selected plus its root listing.
#[derive(Debug, Clone, Serialize)]
pub struct RepoOverview {
    pub repository: RepoCard,
    pub branch: String,
    /// `None` when the metadata loaded but the file listing failed.
    pub listing: Option<Listing>,
}

/// Rendered content of a tab.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "tab", rename_all = "lowercase")]
pub enum TabView {
    Files { listing: Listing },
    Commits { rows: Vec<ListRow>, cached: bool },
    Branches { rows: Vec<ListRow>, cached: bool },
    Issues { rows: Vec<ListRow>, cached: bool },
    Pulls { rows: Vec<ListRow>, cached: bool },
}

/// Text content of an opened file.
#[derive(Debug, Clone, Serialize)]
pub struct FileView {
    pub name: String,
    pub path: String,
    pub content: String,
}

/// Archive download target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadLink {
    pub url: String,
    pub filename: String,
}

/// Browser operations over a GitHub API client.
pub struct RepoBrowser<A> {
    api: A,
    search_limit: u32,
    search_input: Debouncer<String>,
}

impl<A: GitHubApi> RepoBrowser<A> {
    pub fn new(api: A) -> Self {
        Self::with_debounce(api, Duration::from_millis(crate::debounce::DEFAULT_DEBOUNCE_MS))
    }

    pub fn with_debounce(api: A, window: Duration) -> Self {
        Self {
            api,
            search_limit: github::SEARCH_LIMIT,
            search_input: Debouncer::new(window),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Validate `token` against GET /user and persist it on success.
    pub fn connect(
        &self,
        state: &mut BrowserState,
        store: &mut dyn ItemStore,
        notes: &mut Notifier,
        token: &str,
    ) -> Result<User> {
        let token = token.trim();
        if token.is_empty() {
            notes.error("Please enter a GitHub token");
            return Err(Error::InvalidInput("token must not be empty".to_string()));
        }

        let user = match self.api.user(token) {
            Ok(user) => user,
            Err(e) => {
                tracing::info!(error = %e, "token validation failed");
                notes.blocking("Invalid GitHub token");
                return Err(Error::Auth(e.to_string()));
            }
        };

        store.set_item(TOKEN_KEY, token)?;
        state.token = Some(token.to_string());
        notes.success(format!("Connected as {}", user.login));
        Ok(user)
    }

    /// Clear the stored token and reset all view state.
    pub fn disconnect(
        &self,
        state: &mut BrowserState,
        store: &mut dyn ItemStore,
        notes: &mut Notifier,
    ) -> Result<()> {
        store.remove_item(TOKEN_KEY)?;
        state.token = None;
        state.reset_repository();
        state.search_results.clear();
        state.save(store)?;
        notes.success("Disconnected from GitHub");
        Ok(())
    }

    /// Search repositories by popularity. Blank queries and missing tokens
    /// are ignored without a request.
    pub fn search(
        &self,
        state: &mut BrowserState,
        notes: &mut Notifier,
        query: &str,
    ) -> Result<Vec<Repository>> {
        let query = query.trim();
        let Some(token) = state.token.as_deref() else {
            return Ok(Vec::new());
        };
        if query.is_empty() {
            return Ok(Vec::new());
        }

        match self.api.search_repositories(token, query, self.search_limit) {
            Ok(results) => {
                tracing::debug!(query, total = results.total_count, "search complete");
                state.search_results = results.items.clone();
                Ok(results.items)
            }
            Err(e) => {
                notes.error("Error searching repositories");
                Err(e.into())
            }
        }
    }

    /// Record a keystroke-level search input; only the latest within the
    /// debounce window is sent by [`RepoBrowser::poll_search`].
    pub fn queue_search(&mut self, query: impl Into<String>, now: Instant) {
        self.search_input.trigger(query.into(), now);
    }

    /// Run the debounced search if its quiet period has elapsed.
    pub fn poll_search(
        &mut self,
        state: &mut BrowserState,
        notes: &mut Notifier,
        now: Instant,
    ) -> Option<Result<Vec<Repository>>> {
        let query = self.search_input.poll(now)?;
        Some(self.search(state, notes, &query))
    }

    /// Load repository metadata, reset path/branch/tabs and list the root.
    pub fn select_repository(
        &self,
        state: &mut BrowserState,
        notes: &mut Notifier,
        full_name: &str,
    ) -> Result<RepoOverview> {
        let full_name = validate_full_name(full_name).inspect_err(|_| {
            notes.error("Repository must be given as owner/name");
        })?;
        let token = state.require_token()?.to_string();

        let repo = match self.api.repository(&token, full_name) {
            Ok(repo) => repo,
            Err(e) => {
                notes.error("Error loading repository");
                return Err(e.into());
            }
        };

        state.reset_repository();
        state.branch = repo
            .default_branch
            .clone()
            .unwrap_or_else(|| FALLBACK_BRANCH.to_string());
        state.repo = Some(repo.clone());

        let listing = self.list(state, notes).ok();
        Ok(RepoOverview {
            repository: RepoCard::render(&repo),
            branch: state.branch.clone(),
            listing,
        })
    }

    /// List the current path and store the sorted entries.
    pub fn list(&self, state: &mut BrowserState, notes: &mut Notifier) -> Result<Listing> {
        let path = state.path.clone();
        self.list_path(state, notes, &path)
    }

    /// Descend into a child directory of the current path.
    pub fn navigate_into(
        &self,
        state: &mut BrowserState,
        notes: &mut Notifier,
        dir: &str,
    ) -> Result<Listing> {
        let dir = dir.trim_matches('/');
        if dir.is_empty() || dir == "." {
            return self.list(state, notes);
        }
        if dir == ".." {
            return self.navigate_up(state, notes);
        }
        if let Some(entry) = state.entries.iter().find(|e| e.name == dir) {
            if !entry.is_dir() {
                notes.error("Not a directory");
                return Err(Error::InvalidInput(format!("{} is not a directory", dir)));
            }
        }
        let target = view::child_path(&state.path, dir);
        self.list_path(state, notes, &target)
    }

    /// Ascend one level; a no-op listing at the root.
    pub fn navigate_up(&self, state: &mut BrowserState, notes: &mut Notifier) -> Result<Listing> {
        let target = view::parent_path(&state.path);
        self.list_path(state, notes, &target)
    }

    fn list_path(
        &self,
        state: &mut BrowserState,
        notes: &mut Notifier,
        path: &str,
    ) -> Result<Listing> {
        let token = state.require_token()?.to_string();
        let full_name = state.require_repo()?.full_name.clone();

        let mut entries = match self.api.contents(&token, &full_name, path, &state.branch) {
            Ok(entries) => entries,
            Err(e) => {
                notes.error("Error loading files");
                return Err(e.into());
            }
        };
        view::sort_entries(&mut entries);

        state.path = path.to_string();
        state.entries = entries;
        Ok(Listing::render(
            &full_name,
            &state.branch,
            &state.path,
            &state.entries,
        ))
    }

    /// Fetch a file from the current listing and return it as text.
    ///
    /// Entries without a download URL (submodules, some symlinks) return
    /// `Ok(None)` and make no request.
    pub fn open_file(
        &self,
        state: &BrowserState,
        notes: &mut Notifier,
        name: &str,
    ) -> Result<Option<FileView>> {
        state.require_repo()?;
        let entry = state
            .entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| Error::NotFound(format!("{} in /{}", name, state.path)))?;
        if entry.is_dir() {
            return Err(Error::InvalidInput(format!("{} is a directory", name)));
        }
        let Some(url) = entry.download_url.as_deref() else {
            return Ok(None);
        };

        match self.api.raw(url) {
            Ok(bytes) => Ok(Some(FileView {
                name: entry.name.clone(),
                path: entry.path.clone(),
                content: String::from_utf8_lossy(&bytes).into_owned(),
            })),
            Err(e) => {
                notes.error("Error loading file");
                Err(e.into())
            }
        }
    }

    /// Activate a tab, loading its data on first activation only.
    pub fn switch_tab(
        &self,
        state: &mut BrowserState,
        notes: &mut Notifier,
        tab: Tab,
    ) -> Result<TabView> {
        // Files re-renders the saved listing without a request.
        let token = match tab {
            Tab::Files => String::new(),
            _ => state.require_token()?.to_string(),
        };
        let full_name = state.require_repo()?.full_name.clone();
        let cached = state.tabs.is_loaded(tab);
        state.active_tab = tab;

        let view = match tab {
            Tab::Files => TabView::Files {
                listing: Listing::render(&full_name, &state.branch, &state.path, &state.entries),
            },
            Tab::Commits => {
                if state.tabs.commits.is_none() {
                    let commits = self
                        .api
                        .commits(&token, &full_name, github::LIST_PAGE_SIZE)
                        .map_err(|e| report(notes, "Error loading commits", e))?;
                    state.tabs.commits = Some(commits);
                }
                TabView::Commits {
                    rows: view::commit_rows(state.tabs.commits.as_deref().unwrap_or_default()),
                    cached,
                }
            }
            Tab::Branches => {
                if state.tabs.branches.is_none() {
                    let branches = self
                        .api
                        .branches(&token, &full_name)
                        .map_err(|e| report(notes, "Error loading branches", e))?;
                    state.tabs.branches = Some(branches);
                }
                TabView::Branches {
                    rows: view::branch_rows(
                        state.tabs.branches.as_deref().unwrap_or_default(),
                        &state.branch,
                    ),
                    cached,
                }
            }
            Tab::Issues => {
                if state.tabs.issues.is_none() {
                    let issues = self
                        .api
                        .issues(&token, &full_name, github::LIST_PAGE_SIZE)
                        .map_err(|e| report(notes, "Error loading issues", e))?;
                    state.tabs.issues = Some(issues);
                }
                TabView::Issues {
                    rows: view::issue_rows(state.tabs.issues.as_deref().unwrap_or_default()),
                    cached,
                }
            }
            Tab::Pulls => {
                if state.tabs.pulls.is_none() {
                    let pulls = self
                        .api
                        .pulls(&token, &full_name, github::LIST_PAGE_SIZE)
                        .map_err(|e| report(notes, "Error loading pull requests", e))?;
                    state.tabs.pulls = Some(pulls);
                }
                TabView::Pulls {
                    rows: view::pull_rows(state.tabs.pulls.as_deref().unwrap_or_default()),
                    cached,
                }
            }
        };
        Ok(view)
    }

    /// Archive URL and file name for the current repository and branch.
    pub fn download(&self, state: &BrowserState) -> Result<DownloadLink> {
        let repo = state.require_repo()?;
        Ok(DownloadLink {
            url: github::archive_url(&repo.full_name, &state.branch),
            filename: format!("{}-{}.zip", repo.name, state.branch.replace('/', "-")),
        })
    }

    /// Fetch an archive and write it into `dir`.
    pub fn save_archive(
        &self,
        link: &DownloadLink,
        dir: &Path,
        notes: &mut Notifier,
    ) -> Result<PathBuf> {
        notes.success("Download started");
        let bytes = self
            .api
            .raw(&link.url)
            .map_err(|e| report(notes, "Error downloading repository", e))?;
        let target = dir.join(&link.filename);
        std::fs::write(&target, bytes)?;
        Ok(target)
    }

    /// Re-fetch the current repository from scratch.
    pub fn refresh(&self, state: &mut BrowserState, notes: &mut Notifier) -> Result<RepoOverview> {
        let full_name = state.require_repo()?.full_name.clone();
        notes.success("Refreshing repository...");
        self.select_repository(state, notes, &full_name)
    }
}

fn report(notes: &mut Notifier, message: &str, err: ApiError) -> Error {
    notes.error(message);
    err.into()
}

fn validate_full_name(full_name: &str) -> Result<&str> {
    let full_name = full_name.trim().trim_matches('/');
    match full_name.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok(full_name)
        }
        _ => Err(Error::InvalidInput(format!(
            "expected owner/name, got: {}",
            full_name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::ApiResult;
    use crate::models::github::{
        Account, CommitAuthor, CommitDetail, CommitRef, ContentKind, GitRef, SearchResults,
    };
    use crate::storage::MemoryStore;
    use chrono::Utc;
    use std::cell::RefCell;
    use std::collections::HashMap;

    const GOOD_TOKEN: &str = "ghp_good";

    /// Canned GitHub API that records every call.
    #[derive(Default)]
    struct FakeGitHub {
        calls: RefCell<Vec<String>>,
        trees: HashMap<String, Vec<ContentEntry>>,
        files: HashMap<String, Vec<u8>>,
        offline: bool,
    }

    impl FakeGitHub {
        fn new() -> Self {
            let mut trees = HashMap::new();
            trees.insert(
                String::new(),
                vec![
                    file("README.md", "README.md"),
                    dir("src", "src"),
                    file("Cargo.toml", "Cargo.toml"),
                ],
            );
            trees.insert("src".to_string(), vec![file("main.rs", "src/main.rs"), dir("bin", "src/bin")]);
            trees.insert("src/bin".to_string(), vec![file("tool.rs", "src/bin/tool.rs")]);

            let mut files = HashMap::new();
            files.insert(raw_url("README.md"), b"# Hello".to_vec());
            files.insert(
                "https://github.com/octo/demo/archive/refs/heads/trunk.zip".to_string(),
                b"PK".to_vec(),
            );
            files.insert(
                "https://github.com/octo/demo/archive/refs/heads/feature/x.zip".to_string(),
                b"PK-x".to_vec(),
            );
            Self {
                trees,
                files,
                ..Default::default()
            }
        }

        fn record(&self, call: impl Into<String>) {
            self.calls.borrow_mut().push(call.into());
        }

        fn count(&self, prefix: &str) -> usize {
            self.calls
                .borrow()
                .iter()
                .filter(|c| c.starts_with(prefix))
                .count()
        }

        fn check(&self, token: &str) -> ApiResult<()> {
            if self.offline {
                return Err(ApiError::Http("connection refused".to_string()));
            }
            if token != GOOD_TOKEN {
                return Err(ApiError::Unauthorized);
            }
            Ok(())
        }
    }

    fn raw_url(path: &str) -> String {
        format!("https://raw.test/octo/demo/{}", path)
    }

    fn file(name: &str, path: &str) -> ContentEntry {
        ContentEntry {
            name: name.to_string(),
            path: path.to_string(),
            kind: ContentKind::File,
            size: Some(1),
            download_url: Some(raw_url(path)),
        }
    }

    fn dir(name: &str, path: &str) -> ContentEntry {
        ContentEntry {
            name: name.to_string(),
            path: path.to_string(),
            kind: ContentKind::Dir,
            size: None,
            download_url: None,
        }
    }

    fn demo_repo() -> Repository {
        Repository {
            name: "demo".to_string(),
            full_name: "octo/demo".to_string(),
            description: None,
            stargazers_count: 42,
            forks_count: 3,
            language: Some("Rust".to_string()),
            default_branch: Some("trunk".to_string()),
            html_url: None,
        }
    }

    impl GitHubApi for FakeGitHub {
        fn user(&self, token: &str) -> ApiResult<User> {
            self.record("user");
            self.check(token)?;
            Ok(User {
                login: "octocat".to_string(),
                id: 1,
                name: None,
            })
        }

        fn search_repositories(&self, token: &str, query: &str, limit: u32) -> ApiResult<SearchResults> {
            self.record(format!("search:{}", query));
            self.check(token)?;
            assert_eq!(limit, github::SEARCH_LIMIT);
            Ok(SearchResults {
                total_count: 1,
                items: vec![demo_repo()],
            })
        }

        fn repository(&self, token: &str, full_name: &str) -> ApiResult<Repository> {
            self.record(format!("repo:{}", full_name));
            self.check(token)?;
            if full_name == "octo/demo" {
                Ok(demo_repo())
            } else {
                Err(ApiError::NotFound(full_name.to_string()))
            }
        }

        fn contents(&self, token: &str, _full_name: &str, path: &str, git_ref: &str) -> ApiResult<Vec<ContentEntry>> {
            self.record(format!("contents:{}@{}", path, git_ref));
            self.check(token)?;
            self.trees
                .get(path)
                .cloned()
                .ok_or_else(|| ApiError::NotFound(path.to_string()))
        }

        fn commits(&self, token: &str, _full_name: &str, _per_page: u32) -> ApiResult<Vec<Commit>> {
            self.record("commits");
            self.check(token)?;
            Ok(vec![Commit {
                sha: "abcdef0123".to_string(),
                commit: CommitDetail {
                    message: "Initial commit\n\nbody".to_string(),
                    author: CommitAuthor {
                        name: "Octo".to_string(),
                        date: Utc::now(),
                    },
                },
            }])
        }

        fn branches(&self, token: &str, _full_name: &str) -> ApiResult<Vec<Branch>> {
            self.record("branches");
            self.check(token)?;
            Ok(vec![Branch {
                name: "trunk".to_string(),
                commit: CommitRef {
                    sha: "abcdef0123".to_string(),
                },
            }])
        }

        fn issues(&self, token: &str, _full_name: &str, _per_page: u32) -> ApiResult<Vec<Issue>> {
            self.record("issues");
            self.check(token)?;
            Ok(Vec::new())
        }

        fn pulls(&self, token: &str, _full_name: &str, _per_page: u32) -> ApiResult<Vec<PullRequest>> {
            self.record("pulls");
            self.check(token)?;
            Ok(vec![PullRequest {
                number: 9,
                title: "Speed up".to_string(),
                user: Account {
                    login: "dev".to_string(),
                },
                created_at: Utc::now(),
                head: GitRef {
                    git_ref: "fast".to_string(),
                },
                base: GitRef {
                    git_ref: "trunk".to_string(),
                },
            }])
        }

        fn raw(&self, url: &str) -> ApiResult<Vec<u8>> {
            self.record(format!("raw:{}", url));
            if self.offline {
                return Err(ApiError::Http("connection refused".to_string()));
            }
            self.files
                .get(url)
                .cloned()
                .ok_or_else(|| ApiError::NotFound(url.to_string()))
        }
    }

    fn connected() -> (RepoBrowser<FakeGitHub>, BrowserState, MemoryStore, Notifier) {
        let browser = RepoBrowser::new(FakeGitHub::new());
        let mut state = BrowserState::default();
        let mut store = MemoryStore::new();
        let mut notes = Notifier::new();
        browser
            .connect(&mut state, &mut store, &mut notes, GOOD_TOKEN)
            .unwrap();
        notes.drain();
        (browser, state, store, notes)
    }

    #[test]
    fn test_connect_persists_token() {
        let (_browser, state, store, _notes) = connected();
        assert!(state.is_connected());
        assert_eq!(store.get_item(TOKEN_KEY).unwrap().as_deref(), Some(GOOD_TOKEN));

        let reloaded = BrowserState::load(&store).unwrap();
        assert_eq!(reloaded.token.as_deref(), Some(GOOD_TOKEN));
    }

    #[test]
    fn test_connect_trims_and_reports_login() {
        let browser = RepoBrowser::new(FakeGitHub::new());
        let mut state = BrowserState::default();
        let mut store = MemoryStore::new();
        let mut notes = Notifier::new();

        let user = browser
            .connect(&mut state, &mut store, &mut notes, "  ghp_good \n")
            .unwrap();
        assert_eq!(user.login, "octocat");
        assert_eq!(notes.drain()[0].message, "Connected as octocat");
    }

    #[test]
    fn test_connect_empty_token_is_validation_failure() {
        let browser = RepoBrowser::new(FakeGitHub::new());
        let mut state = BrowserState::default();
        let mut store = MemoryStore::new();
        let mut notes = Notifier::new();

        let err = browser
            .connect(&mut state, &mut store, &mut notes, "   ")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(browser.api().count("user"), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_connect_bad_token_changes_nothing() {
        let browser = RepoBrowser::new(FakeGitHub::new());
        let mut state = BrowserState::default();
        let mut store = MemoryStore::new();
        let mut notes = Notifier::new();

        let err = browser
            .connect(&mut state, &mut store, &mut notes, "ghp_bad")
            .unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        assert!(!state.is_connected());
        assert!(store.get_item(TOKEN_KEY).unwrap().is_none());
        let shown = notes.drain();
        assert!(shown[0].sticky);
    }

    #[test]
    fn test_disconnect_resets_everything() {
        let (browser, mut state, mut store, mut notes) = connected();
        browser
            .select_repository(&mut state, &mut notes, "octo/demo")
            .unwrap();

        browser
            .disconnect(&mut state, &mut store, &mut notes)
            .unwrap();
        assert!(!state.is_connected());
        assert!(state.repo.is_none());
        assert!(state.entries.is_empty());
        assert!(store.get_item(TOKEN_KEY).unwrap().is_none());
        assert!(BrowserState::load(&store).unwrap().repo.is_none());
    }

    #[test]
    fn test_search_ignores_blank_query_and_missing_token() {
        let (browser, mut state, _store, mut notes) = connected();
        assert!(browser.search(&mut state, &mut notes, "   ").unwrap().is_empty());

        let mut anonymous = BrowserState::default();
        assert!(browser.search(&mut anonymous, &mut notes, "rust").unwrap().is_empty());
        assert_eq!(browser.api().count("search"), 0);

        let results = browser.search(&mut state, &mut notes, "demo").unwrap();
        assert_eq!(results[0].full_name, "octo/demo");
        assert_eq!(state.search_results.len(), 1);
    }

    #[test]
    fn test_debounced_search_sends_only_latest_query() {
        let (mut browser, mut state, _store, mut notes) = connected();
        let start = Instant::now();
        let window = Duration::from_millis(crate::debounce::DEFAULT_DEBOUNCE_MS);

        browser.queue_search("d", start);
        browser.queue_search("de", start + Duration::from_millis(50));
        browser.queue_search("dem", start + Duration::from_millis(120));
        assert!(browser.poll_search(&mut state, &mut notes, start + Duration::from_millis(200)).is_none());

        let fired = browser
            .poll_search(&mut state, &mut notes, start + Duration::from_millis(120) + window)
            .unwrap()
            .unwrap();
        assert_eq!(fired.len(), 1);
        assert_eq!(browser.api().count("search:"), 1);
        assert_eq!(browser.api().count("search:dem"), 1);
    }

    #[test]
    fn test_select_repository_uses_default_branch_and_lists_root() {
        let (browser, mut state, _store, mut notes) = connected();
        let overview = browser
            .select_repository(&mut state, &mut notes, "octo/demo")
            .unwrap();

        assert_eq!(overview.branch, "trunk");
        assert_eq!(state.path, "");
        let listing = overview.listing.unwrap();
        let names: Vec<_> = listing.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["src", "Cargo.toml", "README.md"]);
        assert_eq!(browser.api().count("contents:@trunk"), 1);
    }

    #[test]
    fn test_select_unknown_repository_keeps_previous() {
        let (browser, mut state, _store, mut notes) = connected();
        browser
            .select_repository(&mut state, &mut notes, "octo/demo")
            .unwrap();
        browser.navigate_into(&mut state, &mut notes, "src").unwrap();

        assert!(browser
            .select_repository(&mut state, &mut notes, "octo/missing")
            .is_err());
        assert_eq!(state.repo.as_ref().unwrap().full_name, "octo/demo");
        assert_eq!(state.path, "src");
        assert!(notes.iter().any(|n| n.message == "Error loading repository"));
    }

    #[test]
    fn test_select_repository_rejects_bad_name() {
        let (browser, mut state, _store, mut notes) = connected();
        let err = browser
            .select_repository(&mut state, &mut notes, "just-a-name")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(browser.api().count("repo:"), 0);
    }

    #[test]
    fn test_navigate_down_and_up() {
        let (browser, mut state, _store, mut notes) = connected();
        browser
            .select_repository(&mut state, &mut notes, "octo/demo")
            .unwrap();

        let listing = browser.navigate_into(&mut state, &mut notes, "src").unwrap();
        assert_eq!(listing.path, "/src");
        assert!(listing.has_parent);

        browser.navigate_into(&mut state, &mut notes, "bin").unwrap();
        assert_eq!(state.path, "src/bin");

        browser.navigate_up(&mut state, &mut notes).unwrap();
        assert_eq!(state.path, "src");
        browser.navigate_into(&mut state, &mut notes, "..").unwrap();
        assert_eq!(state.path, "");
        let root = browser.navigate_up(&mut state, &mut notes).unwrap();
        assert_eq!(root.path, "/");
        assert!(!root.has_parent);
    }

    #[test]
    fn test_failed_navigation_keeps_path() {
        let (browser, mut state, _store, mut notes) = connected();
        browser
            .select_repository(&mut state, &mut notes, "octo/demo")
            .unwrap();

        assert!(browser.navigate_into(&mut state, &mut notes, "nope").is_err());
        assert_eq!(state.path, "");
        assert_eq!(state.entries.len(), 3);
        assert!(notes.iter().any(|n| n.message == "Error loading files"));
    }

    #[test]
    fn test_navigate_into_file_is_rejected() {
        let (browser, mut state, _store, mut notes) = connected();
        browser
            .select_repository(&mut state, &mut notes, "octo/demo")
            .unwrap();
        let listed = browser.api().count("contents:");

        assert!(matches!(
            browser.navigate_into(&mut state, &mut notes, "README.md"),
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(state.path, "");
        assert_eq!(state.entries.len(), 3);
        assert_eq!(browser.api().count("contents:"), listed);
    }

    #[test]
    fn test_open_file() {
        let (browser, mut state, _store, mut notes) = connected();
        browser
            .select_repository(&mut state, &mut notes, "octo/demo")
            .unwrap();

        let view = browser.open_file(&state, &mut notes, "README.md").unwrap().unwrap();
        assert_eq!(view.content, "# Hello");

        assert!(matches!(
            browser.open_file(&state, &mut notes, "src"),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            browser.open_file(&state, &mut notes, "missing.txt"),
            Err(Error::NotFound(_))
        ));
        // Cargo.toml is listed but the fake has no body for it.
        assert!(browser.open_file(&state, &mut notes, "Cargo.toml").is_err());
        assert!(notes.iter().any(|n| n.message == "Error loading file"));
    }

    #[test]
    fn test_open_file_without_download_url_is_noop() {
        let (browser, mut state, _store, mut notes) = connected();
        browser
            .select_repository(&mut state, &mut notes, "octo/demo")
            .unwrap();
        state.entries.push(ContentEntry {
            name: "vendor".to_string(),
            path: "vendor".to_string(),
            kind: ContentKind::Submodule,
            size: None,
            download_url: None,
        });

        assert!(browser.open_file(&state, &mut notes, "vendor").unwrap().is_none());
        assert_eq!(browser.api().count("raw:"), 0);
    }

    #[test]
    fn test_tabs_load_once_per_repository() {
        let (browser, mut state, _store, mut notes) = connected();
        browser
            .select_repository(&mut state, &mut notes, "octo/demo")
            .unwrap();

        let first = browser.switch_tab(&mut state, &mut notes, Tab::Commits).unwrap();
        let second = browser.switch_tab(&mut state, &mut notes, Tab::Commits).unwrap();
        assert!(matches!(first, TabView::Commits { cached: false, .. }));
        assert!(matches!(second, TabView::Commits { cached: true, .. }));
        assert_eq!(browser.api().count("commits"), 1);

        browser.switch_tab(&mut state, &mut notes, Tab::Branches).unwrap();
        browser.switch_tab(&mut state, &mut notes, Tab::Issues).unwrap();
        browser.switch_tab(&mut state, &mut notes, Tab::Pulls).unwrap();
        assert_eq!(browser.api().count("issues"), 1);
        assert_eq!(state.active_tab, Tab::Pulls);

        // Selecting the repository again resets loaded tabs.
        browser
            .select_repository(&mut state, &mut notes, "octo/demo")
            .unwrap();
        assert!(!state.tabs.is_loaded(Tab::Commits));
        browser.switch_tab(&mut state, &mut notes, Tab::Commits).unwrap();
        assert_eq!(browser.api().count("commits"), 2);
    }

    #[test]
    fn test_files_tab_makes_no_request() {
        let (browser, mut state, _store, mut notes) = connected();
        browser
            .select_repository(&mut state, &mut notes, "octo/demo")
            .unwrap();
        let before = browser.api().calls.borrow().len();

        let view = browser.switch_tab(&mut state, &mut notes, Tab::Files).unwrap();
        assert!(matches!(view, TabView::Files { .. }));
        assert_eq!(browser.api().calls.borrow().len(), before);

        // The saved listing renders without a token.
        state.token = None;
        let view = browser.switch_tab(&mut state, &mut notes, Tab::Files).unwrap();
        assert!(matches!(view, TabView::Files { .. }));
        assert!(matches!(
            browser.switch_tab(&mut state, &mut notes, Tab::Commits),
            Err(Error::NotConnected)
        ));
    }

    #[test]
    fn test_tab_requires_repository() {
        let (browser, mut state, _store, mut notes) = connected();
        assert!(matches!(
            browser.switch_tab(&mut state, &mut notes, Tab::Issues),
            Err(Error::NoRepository)
        ));
    }

    #[test]
    fn test_download_link_and_archive() {
        let (browser, mut state, _store, mut notes) = connected();
        assert!(browser.download(&state).is_err());

        browser
            .select_repository(&mut state, &mut notes, "octo/demo")
            .unwrap();
        let link = browser.download(&state).unwrap();
        assert_eq!(
            link.url,
            "https://github.com/octo/demo/archive/refs/heads/trunk.zip"
        );
        assert_eq!(link.filename, "demo-trunk.zip");

        let dir = tempfile::TempDir::new().unwrap();
        let saved = browser.save_archive(&link, dir.path(), &mut notes).unwrap();
        assert_eq!(std::fs::read(saved).unwrap(), b"PK");
    }

    #[test]
    fn test_download_branch_with_slash() {
        let (browser, mut state, _store, mut notes) = connected();
        browser
            .select_repository(&mut state, &mut notes, "octo/demo")
            .unwrap();
        state.branch = "feature/x".to_string();

        let link = browser.download(&state).unwrap();
        assert_eq!(
            link.url,
            "https://github.com/octo/demo/archive/refs/heads/feature/x.zip"
        );
        assert_eq!(link.filename, "demo-feature-x.zip");

        let dir = tempfile::TempDir::new().unwrap();
        let saved = browser.save_archive(&link, dir.path(), &mut notes).unwrap();
        assert_eq!(saved, dir.path().join("demo-feature-x.zip"));
        assert_eq!(std::fs::read(saved).unwrap(), b"PK-x");
    }

    #[test]
    fn test_refresh_refetches_metadata() {
        let (browser, mut state, _store, mut notes) = connected();
        assert!(matches!(
            browser.refresh(&mut state, &mut notes),
            Err(Error::NoRepository)
        ));
        browser
            .select_repository(&mut state, &mut notes, "octo/demo")
            .unwrap();
        browser.refresh(&mut state, &mut notes).unwrap();
        assert_eq!(browser.api().count("repo:octo/demo"), 2);
    }

    #[test]
    fn test_session_round_trips_through_store() {
        let (browser, mut state, mut store, mut notes) = connected();
        browser
            .select_repository(&mut state, &mut notes, "octo/demo")
            .unwrap();
        browser.navigate_into(&mut state, &mut notes, "src").unwrap();
        browser.switch_tab(&mut state, &mut notes, Tab::Branches).unwrap();
        state.save(&mut store).unwrap();

        let loaded = BrowserState::load(&store).unwrap();
        assert_eq!(loaded.path, "src");
        assert_eq!(loaded.branch, "trunk");
        assert!(loaded.tabs.is_loaded(Tab::Branches));
        assert_eq!(loaded.entries.len(), 2);
    }

    #[test]
    fn test_offline_failures_surface_once() {
        let mut api = FakeGitHub::new();
        api.offline = true;
        let browser = RepoBrowser::new(api);
        let mut state = BrowserState {
            token: Some(GOOD_TOKEN.to_string()),
            ..Default::default()
        };
        let mut notes = Notifier::new();

        let err = browser
            .select_repository(&mut state, &mut notes, "octo/demo")
            .unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::Http(_))));
        assert_eq!(browser.api().count("repo:"), 1);
        assert_eq!(notes.drain().len(), 1);
    }
}
