//! CLI argument definitions for hubdeck.

use crate::browser::Tab;
use crate::models::{Priority, TaskFilter, TaskStatus, Theme, ViewMode};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// hubdeck - Browse GitHub repositories, keep an offline task list and
/// manage a network-first response cache.
#[derive(Parser, Debug)]
#[command(name = "hd")]
#[command(author, version, about = "GitHub repository browser, offline task manager and response cache", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// GitHub API base URL (overrides HD_API_BASE and config.kdl)
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Repository browser commands
    Repo {
        #[command(subcommand)]
        command: RepoCommands,
    },

    /// Task manager commands
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// Offline response cache commands
    Cache {
        /// Origin used to resolve relative URLs (overrides HD_CACHE_ORIGIN and config.kdl)
        #[arg(long, global = true)]
        origin: Option<String>,

        #[command(subcommand)]
        command: CacheCommands,
    },

    /// Theme preference
    Theme {
        #[command(subcommand)]
        command: ThemeCommands,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Repository browser subcommands
#[derive(Subcommand, Debug)]
pub enum RepoCommands {
    /// Validate a GitHub token and store it
    Connect {
        /// Personal access token
        token: String,
    },

    /// Forget the stored token and the browsing session
    Disconnect,

    /// Show connection and browsing state
    Status,

    /// Search repositories by popularity
    Search {
        /// Search query
        query: String,
    },

    /// Select a repository and list its root
    Open {
        /// Repository as owner/name
        full_name: String,
    },

    /// List the current directory
    Ls,

    /// Enter a directory of the current listing (`..` goes up)
    Cd {
        /// Directory name
        dir: String,
    },

    /// Go up one directory
    Up,

    /// Print a file from the current listing
    Cat {
        /// File name
        name: String,
    },

    /// Show a repository tab (files, commits, branches, issues, pulls)
    Tab {
        /// Tab name
        tab: Tab,
    },

    /// Show the archive URL of the current branch, optionally saving it
    Download {
        /// Directory to save the archive into
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Reload the current repository from scratch
    Refresh,
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Add a task
    Add {
        /// Task description
        text: String,

        /// Priority (high, medium, low); defaults to the configured priority
        #[arg(short, long)]
        priority: Option<Priority>,
    },

    /// Toggle a task between done and to do
    Toggle {
        /// Task ID
        id: String,
    },

    /// Edit a task
    Edit {
        /// Task ID
        id: String,

        /// New description
        #[arg(long)]
        text: Option<String>,

        /// New priority
        #[arg(short, long)]
        priority: Option<Priority>,

        /// New status (todo, progress, done)
        #[arg(short, long)]
        status: Option<TaskStatus>,
    },

    /// Delete a task
    Rm {
        /// Task ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List tasks
    List {
        /// Filter (all, pending, completed, high, medium, low)
        #[arg(short, long, default_value = "all")]
        filter: TaskFilter,

        /// Layout (list, board)
        #[arg(short, long, default_value = "list")]
        view: ViewMode,
    },

    /// Synchronize tasks
    Sync,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Fetch the asset manifest into the current cache generation
    Install,

    /// Fetch a URL, network first with cache fallback
    Fetch {
        /// Absolute URL or origin-relative path
        url: String,

        /// Treat the request as a page navigation
        #[arg(long)]
        navigate: bool,

        /// Print the response body instead of a summary
        #[arg(long)]
        body: bool,
    },

    /// Delete every cache generation except the current one
    Activate,

    /// List cache generations and their entries
    List,

    /// Deliver a background sync event
    SyncEvent {
        /// Sync tag
        #[arg(default_value = crate::cache::BACKGROUND_SYNC_TAG)]
        tag: String,
    },
}

/// Theme subcommands
#[derive(Subcommand, Debug)]
pub enum ThemeCommands {
    /// Show the current theme
    Get,

    /// Set the theme (light, dark)
    Set {
        /// Theme name
        theme: Theme,
    },

    /// Switch between light and dark
    Toggle,
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show resolved configuration with value sources
    Show,

    /// Set a value in config.kdl
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_task_add_with_priority() {
        let cli = Cli::parse_from(["hd", "task", "add", "Buy milk", "-p", "low"]);
        match cli.command {
            Some(Commands::Task {
                command: TaskCommands::Add { text, priority },
            }) => {
                assert_eq!(text, "Buy milk");
                assert_eq!(priority, Some(Priority::Low));
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn test_parse_cache_origin_after_subcommand() {
        let cli = Cli::parse_from([
            "hd",
            "-H",
            "cache",
            "fetch",
            "/app.js",
            "--origin",
            "http://localhost:8080",
        ]);
        assert!(cli.human_readable);
        match cli.command {
            Some(Commands::Cache {
                origin,
                command: CacheCommands::Fetch { url, navigate, .. },
            }) => {
                assert_eq!(origin.as_deref(), Some("http://localhost:8080"));
                assert_eq!(url, "/app.js");
                assert!(!navigate);
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_tab() {
        assert!(Cli::try_parse_from(["hd", "repo", "tab", "wiki"]).is_err());
    }
}
