//! hubdeck - A GitHub repository browser, offline task manager and
//! network-first response cache.
//!
//! This library provides the core functionality for the `hd` CLI tool.
//! The three controllers are independent of each other:
//! - [`browser`] - GitHub repository browsing over the REST API
//! - [`tasks`] - Task list persisted to the local item store
//! - [`cache`] - Versioned response cache with network-first fetching

pub mod browser;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod debounce;
pub mod github;
pub mod models;
pub mod notify;
pub mod storage;
pub mod tasks;


/// Library-level error type for hubdeck operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Missing or rejected credentials. Blocks the action; no state changes.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Remote request failed (network or non-success status).
    #[error("Request failed: {0}")]
    Api(#[from] github::ApiError),

    #[error("Not connected: run `hd repo connect <token>` first")]
    NotConnected,

    #[error("No repository selected: run `hd repo open <owner/name>` first")]
    NoRepository,

    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Rejected before any state mutation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Offline: {0}")]
    Offline(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for hubdeck operations.
pub type Result<T> = std::result::Result<T, Error>;
