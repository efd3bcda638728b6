//! View models for the repository browser.
//!
//! Rendering is a pure function of session state: each function here takes
//! data already fetched and produces a structured description the CLI can
//! print as JSON or text.

use crate::models::github::{
    Branch, Commit, ContentEntry, ContentKind, Issue, PullRequest, Repository,
};
use serde::Serialize;
use std::cmp::Ordering;

const FOLDER_ICON: &str = "📁";
const DEFAULT_ICON: &str = "📄";

/// Icon for a file name, chosen by extension.
pub fn file_icon(name: &str) -> &'static str {
    let ext = name.rsplit('.').next().unwrap_or(name).to_lowercase();
    match ext.as_str() {
        "js" | "ts" | "jsx" | "tsx" => "📄",
        "html" => "🌐",
        "css" | "scss" | "sass" => "🎨",
        "json" | "xml" | "yaml" | "yml" | "toml" => "📋",
        "md" | "txt" | "readme" => "📝",
        "png" | "jpg" | "jpeg" | "gif" | "svg" => "🖼️",
        "pdf" => "📕",
        "doc" | "docx" => "📄",
        "zip" | "tar" | "gz" => "📦",
        "py" => "🐍",
        "java" => "☕",
        "cpp" | "c" | "rs" => "⚙️",
        "php" => "🐘",
        "rb" => "💎",
        "go" => "🐹",
        _ => DEFAULT_ICON,
    }
}

/// Directories first, then case-insensitive name order.
pub fn sort_entries(entries: &mut [ContentEntry]) {
    entries.sort_by(|a, b| match (a.is_dir(), b.is_dir()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a
            .name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name)),
    });
}

/// Join a browse path and a child segment.
pub fn child_path(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", path, name)
    }
}

/// Drop the last segment of a browse path.
pub fn parent_path(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((parent, _)) => parent.to_string(),
        None => String::new(),
    }
}

/// One row of the file tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRow {
    pub icon: &'static str,
    pub name: String,
    pub path: String,
    pub kind: ContentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

/// Rendered directory listing.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub repository: String,
    pub branch: String,
    /// Displayed as `/<path>`
    pub path: String,
    /// Whether a `..` row precedes the entries
    pub has_parent: bool,
    pub rows: Vec<FileRow>,
}

impl Listing {
    pub fn render(repository: &str, branch: &str, path: &str, entries: &[ContentEntry]) -> Self {
        let rows = entries
            .iter()
            .map(|entry| FileRow {
                icon: if entry.is_dir() {
                    FOLDER_ICON
                } else {
                    file_icon(&entry.name)
                },
                name: entry.name.clone(),
                path: entry.path.clone(),
                kind: entry.kind,
                download_url: entry.download_url.clone(),
            })
            .collect();
        Self {
            repository: repository.to_string(),
            branch: branch.to_string(),
            path: format!("/{}", path),
            has_parent: !path.is_empty(),
            rows,
        }
    }

    pub fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "{} @ {}  {}",
            self.repository, self.branch, self.path
        )];
        if self.has_parent {
            lines.push(format!("  {} ..", FOLDER_ICON));
        }
        for row in &self.rows {
            lines.push(format!("  {} {}", row.icon, row.name));
        }
        if self.rows.is_empty() {
            lines.push("  (empty)".to_string());
        }
        lines.join("\n")
    }
}

/// Repository summary card.
#[derive(Debug, Clone, Serialize)]
pub struct RepoCard {
    pub full_name: String,
    pub description: String,
    pub stars: u64,
    pub forks: u64,
    pub language: String,
}

impl RepoCard {
    pub fn render(repo: &Repository) -> Self {
        Self {
            full_name: repo.full_name.clone(),
            description: repo
                .description
                .clone()
                .unwrap_or_else(|| "No description".to_string()),
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            language: repo
                .language
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
        }
    }

    pub fn to_human(&self) -> String {
        format!(
            "{}\n  {}\n  ⭐ {}  🍴 {}  📝 {}",
            self.full_name, self.description, self.stars, self.forks, self.language
        )
    }
}

/// One row of a commits, branches, issues or pull requests tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListRow {
    pub title: String,
    pub meta: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

pub fn commit_rows(commits: &[Commit]) -> Vec<ListRow> {
    commits
        .iter()
        .map(|c| ListRow {
            title: c.summary().to_string(),
            meta: format!(
                "{} by {} on {}",
                c.short_sha(),
                c.commit.author.name,
                c.commit.author.date.format("%Y-%m-%d")
            ),
            labels: Vec::new(),
        })
        .collect()
}

pub fn branch_rows(branches: &[Branch], current: &str) -> Vec<ListRow> {
    branches
        .iter()
        .map(|b| {
            let short = crate::models::github::short_sha(&b.commit.sha);
            ListRow {
                title: b.name.clone(),
                meta: if b.name == current {
                    format!("{} (current)", short)
                } else {
                    short.to_string()
                },
                labels: Vec::new(),
            }
        })
        .collect()
}

pub fn issue_rows(issues: &[Issue]) -> Vec<ListRow> {
    issues
        .iter()
        .map(|i| ListRow {
            title: format!("#{} {}", i.number, i.title),
            meta: format!("by {} on {}", i.user.login, i.created_at.format("%Y-%m-%d")),
            labels: i.labels.iter().map(|l| l.name.clone()).collect(),
        })
        .collect()
}

pub fn pull_rows(pulls: &[PullRequest]) -> Vec<ListRow> {
    pulls
        .iter()
        .map(|p| ListRow {
            title: format!("#{} {}", p.number, p.title),
            meta: format!(
                "by {} on {} • {} → {}",
                p.user.login,
                p.created_at.format("%Y-%m-%d"),
                p.head.git_ref,
                p.base.git_ref
            ),
            labels: Vec::new(),
        })
        .collect()
}
