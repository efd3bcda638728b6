//! Command implementations for the hd CLI.
//!
//! Each command opens what it needs from a [`Context`], runs one controller
//! operation and returns a result implementing [`Output`]. Notifications
//! raised along the way are collected in the caller's [`Notifier`].

use crate::browser::{
    BrowserState, DownloadLink, Listing, RepoBrowser, RepoCard, RepoOverview, Tab, TabView,
};
use crate::cache::{
    CacheSettings, CacheStorage, CacheWorker, HttpNetwork, InstallReport, Request, ResponseSource,
    SqliteCacheStorage,
};
use crate::config::{
    self, ConfigOverrides, HubdeckConfig, ResolvedConfig, ValueSource, mask_token, resolve_token,
};
use crate::github::{GitHubApi, HttpGitHub};
use crate::models::{Priority, TaskFilter, TaskStatus, Theme, ViewMode};
use crate::notify::Notifier;
use crate::storage::{ItemStore, Storage, THEME_KEY};
use crate::tasks::{Changed, Confirm, SimulatedSync, SyncReport, TaskManager, TaskState, TaskView};
use crate::{Error, Result};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
}

/// Storage and resolved configuration for one invocation.
pub struct Context {
    pub storage: Storage,
    pub config: ResolvedConfig,
}

impl Context {
    /// Load config.kdl, apply overrides and open the default storage.
    pub fn open(overrides: &ConfigOverrides) -> Result<Self> {
        let file = config::load_config_file()?;
        let config = config::resolve_config(&file, overrides);
        let storage = Storage::open()?;
        Ok(Self { storage, config })
    }

    pub fn with_storage(storage: Storage, config: ResolvedConfig) -> Self {
        Self { storage, config }
    }

    pub fn human(&self) -> bool {
        *self.config.output_format() == config::OutputFormat::Human
    }

    /// Browser over the configured GitHub API.
    pub fn browser(&self) -> RepoBrowser<HttpGitHub> {
        RepoBrowser::with_debounce(
            HttpGitHub::new(self.config.api_base.value.clone()),
            Duration::from_millis(self.config.search_debounce_ms.value),
        )
    }

    /// Saved browser session with the resolved token.
    fn browser_state(&self) -> Result<BrowserState> {
        let mut state = BrowserState::load(&self.storage)?;
        state.token = resolve_token(&self.storage)?.map(|t| t.value);
        Ok(state)
    }

    fn task_manager(&self) -> TaskManager {
        TaskManager::new(self.config.default_priority())
    }

    fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            cache_name: self.config.cache_name.value.clone(),
            origin: self.config.cache_origin.value.clone(),
            manifest: self.config.manifest.value.clone(),
            offline_fallback: self.config.offline_fallback.value.clone(),
        }
    }

    fn cache_worker(&self) -> Result<CacheWorker<HttpNetwork, SqliteCacheStorage>> {
        let caches = SqliteCacheStorage::open_in(self.storage.root())?;
        Ok(CacheWorker::new(HttpNetwork::new(), caches, self.cache_settings()))
    }
}

// === Repository browser ===

#[derive(Serialize)]
pub struct ConnectResult {
    pub connected: bool,
    pub login: String,
    pub token: String,
}

impl Output for ConnectResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!("Connected as {} ({})", self.login, self.token)
    }
}

pub fn repo_connect<A: GitHubApi>(
    ctx: &mut Context,
    browser: &RepoBrowser<A>,
    notes: &mut Notifier,
    token: &str,
) -> Result<ConnectResult> {
    let mut state = BrowserState::load(&ctx.storage)?;
    let user = browser.connect(&mut state, &mut ctx.storage, notes, token)?;
    state.save(&mut ctx.storage)?;
    Ok(ConnectResult {
        connected: true,
        login: user.login,
        token: mask_token(token.trim()),
    })
}

#[derive(Serialize)]
pub struct DisconnectResult {
    pub disconnected: bool,
    /// Set when `GITHUB_TOKEN` will keep supplying a token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl Output for DisconnectResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        match self.warning {
            Some(ref warning) => format!("Disconnected.\nWarning: {}", warning),
            None => "Disconnected.".to_string(),
        }
    }
}

pub fn repo_disconnect<A: GitHubApi>(
    ctx: &mut Context,
    browser: &RepoBrowser<A>,
    notes: &mut Notifier,
) -> Result<DisconnectResult> {
    let mut state = BrowserState::load(&ctx.storage)?;
    browser.disconnect(&mut state, &mut ctx.storage, notes)?;
    let warning = match resolve_token(&ctx.storage)? {
        Some(token) => Some(format!("a token is still provided by {}", token.source)),
        None => None,
    };
    Ok(DisconnectResult {
        disconnected: true,
        warning,
    })
}

#[derive(Serialize)]
pub struct RepoStatus {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    pub path: String,
    pub tab: Tab,
}

impl Output for RepoStatus {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        match (&self.token, &self.token_source) {
            (Some(token), Some(source)) => {
                lines.push(format!("Connected: yes ({}, from {})", token, source))
            }
            _ => lines.push("Connected: no".to_string()),
        }
        match (&self.repository, &self.branch) {
            (Some(repo), Some(branch)) => {
                lines.push(format!("Repository: {} @ {}", repo, branch));
                lines.push(format!("Path: {}", self.path));
                lines.push(format!("Tab: {}", self.tab.as_str()));
            }
            _ => lines.push("Repository: none".to_string()),
        }
        lines.join("\n")
    }
}

pub fn repo_status(ctx: &Context) -> Result<RepoStatus> {
    let state = BrowserState::load(&ctx.storage)?;
    let token = resolve_token(&ctx.storage)?;
    Ok(RepoStatus {
        connected: token.is_some(),
        token: token.as_ref().map(|t| mask_token(&t.value)),
        token_source: token.as_ref().map(|t| t.source.to_string()),
        repository: state.repo.as_ref().map(|r| r.full_name.clone()),
        branch: state.repo.as_ref().map(|_| state.branch.clone()),
        path: format!("/{}", state.path),
        tab: state.active_tab,
    })
}

#[derive(Serialize)]
pub struct SearchResult {
    pub query: String,
    pub count: usize,
    pub results: Vec<RepoCard>,
}

impl Output for SearchResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.results.is_empty() {
            return format!("No repositories match \"{}\".", self.query);
        }
        self.results
            .iter()
            .map(|card| card.to_human())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn repo_search<A: GitHubApi>(
    ctx: &mut Context,
    browser: &RepoBrowser<A>,
    notes: &mut Notifier,
    query: &str,
) -> Result<SearchResult> {
    let mut state = ctx.browser_state()?;
    if !state.is_connected() {
        return Err(Error::NotConnected);
    }
    let repos = browser.search(&mut state, notes, query)?;
    state.save(&mut ctx.storage)?;
    let results: Vec<RepoCard> = repos.iter().map(RepoCard::render).collect();
    Ok(SearchResult {
        query: query.trim().to_string(),
        count: results.len(),
        results,
    })
}

impl Output for RepoOverview {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut out = format!("{}\n  branch: {}", self.repository.to_human(), self.branch);
        if let Some(ref listing) = self.listing {
            out.push_str("\n\n");
            out.push_str(&listing.to_human());
        }
        out
    }
}

pub fn repo_open<A: GitHubApi>(
    ctx: &mut Context,
    browser: &RepoBrowser<A>,
    notes: &mut Notifier,
    full_name: &str,
) -> Result<RepoOverview> {
    let mut state = ctx.browser_state()?;
    let overview = browser.select_repository(&mut state, notes, full_name)?;
    state.save(&mut ctx.storage)?;
    Ok(overview)
}

pub fn repo_refresh<A: GitHubApi>(
    ctx: &mut Context,
    browser: &RepoBrowser<A>,
    notes: &mut Notifier,
) -> Result<RepoOverview> {
    let mut state = ctx.browser_state()?;
    let overview = browser.refresh(&mut state, notes)?;
    state.save(&mut ctx.storage)?;
    Ok(overview)
}

impl Output for Listing {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        Listing::to_human(self)
    }
}

/// Where to move before listing.
pub enum Move<'a> {
    Stay,
    Into(&'a str),
    Up,
}

pub fn repo_list<A: GitHubApi>(
    ctx: &mut Context,
    browser: &RepoBrowser<A>,
    notes: &mut Notifier,
    step: Move<'_>,
) -> Result<Listing> {
    let mut state = ctx.browser_state()?;
    let listing = match step {
        Move::Stay => browser.list(&mut state, notes)?,
        Move::Into(dir) => browser.navigate_into(&mut state, notes, dir)?,
        Move::Up => browser.navigate_up(&mut state, notes)?,
    };
    state.save(&mut ctx.storage)?;
    Ok(listing)
}

#[derive(Serialize)]
pub struct CatResult {
    pub name: String,
    /// `None` when the entry has no download URL
    pub content: Option<String>,
}

impl Output for CatResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        match self.content {
            Some(ref content) => content.clone(),
            None => format!("{} has no downloadable content.", self.name),
        }
    }
}

pub fn repo_cat<A: GitHubApi>(
    ctx: &Context,
    browser: &RepoBrowser<A>,
    notes: &mut Notifier,
    name: &str,
) -> Result<CatResult> {
    let state = ctx.browser_state()?;
    let file = browser.open_file(&state, notes, name)?;
    Ok(CatResult {
        name: name.to_string(),
        content: file.map(|f| f.content),
    })
}

impl Output for TabView {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let (title, rows, cached) = match self {
            TabView::Files { listing } => return listing.to_human(),
            TabView::Commits { rows, cached } => ("Commits", rows, *cached),
            TabView::Branches { rows, cached } => ("Branches", rows, *cached),
            TabView::Issues { rows, cached } => ("Issues", rows, *cached),
            TabView::Pulls { rows, cached } => ("Pull requests", rows, *cached),
        };
        let mut lines = vec![if cached {
            format!("{} (cached)", title)
        } else {
            title.to_string()
        }];
        if rows.is_empty() {
            lines.push("  (none)".to_string());
        }
        for row in rows {
            if row.labels.is_empty() {
                lines.push(format!("  {}", row.title));
            } else {
                lines.push(format!("  {} [{}]", row.title, row.labels.join(", ")));
            }
            lines.push(format!("    {}", row.meta));
        }
        lines.join("\n")
    }
}

pub fn repo_tab<A: GitHubApi>(
    ctx: &mut Context,
    browser: &RepoBrowser<A>,
    notes: &mut Notifier,
    tab: Tab,
) -> Result<TabView> {
    let mut state = ctx.browser_state()?;
    let view = browser.switch_tab(&mut state, notes, tab)?;
    state.save(&mut ctx.storage)?;
    Ok(view)
}

#[derive(Serialize)]
pub struct DownloadResult {
    #[serde(flatten)]
    pub link: DownloadLink,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_to: Option<PathBuf>,
}

impl Output for DownloadResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        match self.saved_to {
            Some(ref path) => format!("Saved {} to {}", self.link.filename, path.display()),
            None => format!("{}\n  {}", self.link.filename, self.link.url),
        }
    }
}

pub fn repo_download<A: GitHubApi>(
    ctx: &Context,
    browser: &RepoBrowser<A>,
    notes: &mut Notifier,
    output: Option<&Path>,
) -> Result<DownloadResult> {
    let state = ctx.browser_state()?;
    let link = browser.download(&state)?;
    let saved_to = match output {
        Some(dir) => Some(browser.save_archive(&link, dir, notes)?),
        None => None,
    };
    Ok(DownloadResult { link, saved_to })
}

// === Tasks ===

impl Output for Changed {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!(
            "{}  {} [{}] ({})\n\n{}",
            self.task.id,
            self.task.text,
            self.task.priority,
            self.task.status,
            self.view.to_human()
        )
    }
}

impl Output for TaskView {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        TaskView::to_human(self)
    }
}

pub fn task_add(
    ctx: &mut Context,
    notes: &mut Notifier,
    text: &str,
    priority: Option<Priority>,
) -> Result<Changed> {
    let mut state = TaskState::load(&ctx.storage)?;
    ctx.task_manager()
        .add(&mut state, &mut ctx.storage, notes, text, priority)
}

pub fn task_toggle(ctx: &mut Context, id: &str) -> Result<Changed> {
    let mut state = TaskState::load(&ctx.storage)?;
    ctx.task_manager().toggle(&mut state, &mut ctx.storage, id)
}

pub fn task_edit(
    ctx: &mut Context,
    notes: &mut Notifier,
    id: &str,
    text: Option<String>,
    priority: Option<Priority>,
    status: Option<TaskStatus>,
) -> Result<Changed> {
    if text.is_none() && priority.is_none() && status.is_none() {
        return Err(Error::InvalidInput(
            "nothing to edit: pass --text, --priority or --status".to_string(),
        ));
    }
    let manager = ctx.task_manager();
    let mut state = TaskState::load(&ctx.storage)?;
    let mut draft = manager.begin_edit(&state, id)?;
    if let Some(text) = text {
        draft.text = text;
    }
    if let Some(priority) = priority {
        draft.priority = priority;
    }
    if let Some(status) = status {
        draft.status = status;
    }
    manager.commit_edit(&mut state, &mut ctx.storage, notes, draft)
}

#[derive(Serialize)]
pub struct TaskDeleted {
    pub id: String,
    pub deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<TaskView>,
}

impl Output for TaskDeleted {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        match self.view {
            Some(ref view) => format!("Deleted {}\n\n{}", self.id, view.to_human()),
            None => format!("Kept {}", self.id),
        }
    }
}

pub fn task_rm(
    ctx: &mut Context,
    notes: &mut Notifier,
    id: &str,
    confirm: &mut dyn Confirm,
) -> Result<TaskDeleted> {
    let mut state = TaskState::load(&ctx.storage)?;
    let changed = ctx
        .task_manager()
        .delete(&mut state, &mut ctx.storage, notes, id, confirm)?;
    Ok(TaskDeleted {
        id: id.to_string(),
        deleted: changed.is_some(),
        view: changed.map(|c| c.view),
    })
}

pub fn task_list(ctx: &Context, filter: TaskFilter, view: ViewMode) -> Result<TaskView> {
    let manager = ctx.task_manager();
    let mut state = TaskState::load(&ctx.storage)?;
    manager.set_view(&mut state, view);
    Ok(manager.set_filter(&mut state, filter))
}

impl Output for SyncReport {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!(
            "Synced {} task(s) via {} at {}",
            self.task_count,
            self.backend,
            self.synced_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}

pub fn task_sync(ctx: &mut Context, notes: &mut Notifier) -> Result<SyncReport> {
    let backend = SimulatedSync::new(Duration::from_millis(ctx.config.sync_delay_ms.value));
    let mut state = TaskState::load(&ctx.storage)?;
    ctx.task_manager()
        .sync(&mut state, &mut ctx.storage, notes, &backend)
}

/// Asks on stderr and reads the answer from stdin. Anything but `y`/`yes`
/// (including end of input) declines.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        eprint!("{} [y/N] ", prompt);
        let _ = std::io::stderr().flush();
        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        }
    }
}

// === Cache ===

impl Output for InstallReport {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Installed {} asset(s) into {}",
            self.cached.len(),
            self.cache
        )];
        for url in &self.cached {
            lines.push(format!("  {}", url));
        }
        lines.join("\n")
    }
}

pub fn cache_install(ctx: &Context) -> Result<InstallReport> {
    ctx.cache_worker()?.install()
}

#[derive(Serialize)]
pub struct FetchResult {
    pub url: String,
    pub status: u16,
    pub source: ResponseSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub bytes: usize,
    #[serde(skip)]
    pub body: Vec<u8>,
}

impl Output for FetchResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let source = match self.source {
            ResponseSource::Network => "network",
            ResponseSource::Cache => "cache",
            ResponseSource::Fallback => "offline fallback",
        };
        format!(
            "{} {} ({} bytes, {}) from {}",
            self.status,
            self.url,
            self.bytes,
            self.content_type.as_deref().unwrap_or("unknown type"),
            source
        )
    }
}

pub fn cache_fetch(ctx: &Context, url: &str, navigate: bool) -> Result<FetchResult> {
    let mut worker = ctx.cache_worker()?;
    let request = if navigate {
        Request::navigate(url)
    } else {
        Request::get(url)
    };
    let resolved = worker.resolve(url);
    let outcome = worker.fetch(&request)?;
    Ok(FetchResult {
        url: resolved,
        status: outcome.response.status,
        source: outcome.source,
        content_type: outcome.response.header("content-type").map(str::to_string),
        bytes: outcome.response.body.len(),
        body: outcome.response.body,
    })
}

#[derive(Serialize)]
pub struct ActivateResult {
    pub current: String,
    pub deleted: Vec<String>,
}

impl Output for ActivateResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.deleted.is_empty() {
            format!("{} is active; nothing to delete.", self.current)
        } else {
            format!(
                "{} is active; deleted {}",
                self.current,
                self.deleted.join(", ")
            )
        }
    }
}

pub fn cache_activate(ctx: &Context) -> Result<ActivateResult> {
    let mut worker = ctx.cache_worker()?;
    let deleted = worker.activate()?;
    Ok(ActivateResult {
        current: worker.cache_name().to_string(),
        deleted,
    })
}

#[derive(Serialize)]
pub struct Generation {
    pub name: String,
    pub current: bool,
    pub urls: Vec<String>,
}

#[derive(Serialize)]
pub struct CacheList {
    pub generations: Vec<Generation>,
}

impl Output for CacheList {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.generations.is_empty() {
            return "No caches.".to_string();
        }
        let mut lines = Vec::new();
        for generation in &self.generations {
            let marker = if generation.current { " (current)" } else { "" };
            lines.push(format!(
                "{}{}: {} entr{}",
                generation.name,
                marker,
                generation.urls.len(),
                if generation.urls.len() == 1 { "y" } else { "ies" }
            ));
            for url in &generation.urls {
                lines.push(format!("  {}", url));
            }
        }
        lines.join("\n")
    }
}

pub fn cache_list(ctx: &Context) -> Result<CacheList> {
    let caches = SqliteCacheStorage::open_in(ctx.storage.root())?;
    let current = &ctx.config.cache_name.value;
    let mut generations = Vec::new();
    for name in caches.keys()? {
        generations.push(Generation {
            current: &name == current,
            urls: caches.urls(&name)?,
            name,
        });
    }
    Ok(CacheList { generations })
}

#[derive(Serialize)]
pub struct SyncEventResult {
    pub tag: String,
    pub handled: bool,
}

impl Output for SyncEventResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.handled {
            format!("Handled sync event {}", self.tag)
        } else {
            format!("Ignored sync event {}", self.tag)
        }
    }
}

pub fn cache_sync_event(ctx: &Context, tag: &str) -> Result<SyncEventResult> {
    let handled = ctx.cache_worker()?.sync(tag);
    Ok(SyncEventResult {
        tag: tag.to_string(),
        handled,
    })
}

// === Theme ===

#[derive(Serialize)]
pub struct ThemeResult {
    pub theme: Theme,
    pub changed: bool,
}

impl Output for ThemeResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.changed {
            format!("Theme set to {}", self.theme.as_str())
        } else {
            format!("Theme: {}", self.theme.as_str())
        }
    }
}

fn stored_theme(store: &dyn ItemStore) -> Result<Theme> {
    Ok(store
        .get_item(THEME_KEY)?
        .and_then(|s| s.parse().ok())
        .unwrap_or_default())
}

pub fn theme_get(ctx: &Context) -> Result<ThemeResult> {
    Ok(ThemeResult {
        theme: stored_theme(&ctx.storage)?,
        changed: false,
    })
}

pub fn theme_set(ctx: &mut Context, theme: Theme) -> Result<ThemeResult> {
    let previous = stored_theme(&ctx.storage)?;
    ctx.storage.set_item(THEME_KEY, theme.as_str())?;
    Ok(ThemeResult {
        theme,
        changed: previous != theme,
    })
}

pub fn theme_toggle(ctx: &mut Context) -> Result<ThemeResult> {
    let theme = stored_theme(&ctx.storage)?.toggled();
    theme_set(ctx, theme)
}

// === Config ===

#[derive(Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub commit: &'static str,
    pub built_at: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            commit: env!("HD_GIT_COMMIT"),
            built_at: env!("HD_BUILD_TIMESTAMP"),
        }
    }
}

#[derive(Serialize)]
pub struct ConfigShow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    pub data_dir: PathBuf,
    pub values: ResolvedConfig,
    pub build: BuildInfo,
}

impl Output for ConfigShow {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        fn line(key: &str, value: impl std::fmt::Display, source: &ValueSource) -> String {
            format!("  {:<20} {} ({})", key, value, source)
        }

        let v = &self.values;
        let mut lines = vec![
            format!(
                "Config file: {}",
                self.config_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(none)".to_string())
            ),
            format!("Data dir: {}", self.data_dir.display()),
            line("api-base", &v.api_base.value, &v.api_base.source),
            line("output-format", &v.output_format.value, &v.output_format.source),
            line(
                "search-debounce-ms",
                v.search_debounce_ms.value,
                &v.search_debounce_ms.source,
            ),
            line(
                "default-priority",
                v.default_priority.value,
                &v.default_priority.source,
            ),
            line("cache-name", &v.cache_name.value, &v.cache_name.source),
            line("cache-origin", &v.cache_origin.value, &v.cache_origin.source),
            line(
                "offline-fallback",
                &v.offline_fallback.value,
                &v.offline_fallback.source,
            ),
            line("sync-delay-ms", v.sync_delay_ms.value, &v.sync_delay_ms.source),
            line(
                "manifest",
                v.manifest.value.join(" "),
                &v.manifest.source,
            ),
        ];
        lines.push(format!(
            "hd {} ({}, built {})",
            self.build.version, self.build.commit, self.build.built_at
        ));
        lines.join("\n")
    }
}

pub fn config_show(ctx: &Context) -> Result<ConfigShow> {
    Ok(ConfigShow {
        config_file: config::config_file_path(),
        data_dir: ctx.storage.root().to_path_buf(),
        values: ctx.config.clone(),
        build: BuildInfo::current(),
    })
}

#[derive(Serialize)]
pub struct ConfigSetResult {
    pub key: String,
    pub value: String,
    pub path: PathBuf,
}

impl Output for ConfigSetResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!("Set {} = {} in {}", self.key, self.value, self.path.display())
    }
}

pub fn config_set(key: &str, value: &str) -> Result<ConfigSetResult> {
    let path = config::config_file_path()
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
    let mut file = HubdeckConfig::load(&path)?;
    file.set(key, value)?;
    file.save(&path)?;
    Ok(ConfigSetResult {
        key: key.to_string(),
        value: value.to_string(),
        path,
    })
}
