//! Precedence resolution for configuration and the GitHub token.
//!
//! ## Config Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. `HD_*` environment variables
//! 3. config.kdl (`$HD_CONFIG_DIR/config.kdl` or `~/.config/hubdeck/config.kdl`)
//! 4. Built-in defaults
//!
//! ## Token Precedence (highest to lowest)
//!
//! 1. `GITHUB_TOKEN` environment variable
//! 2. Token stored by `hd repo connect`

use crate::Result;
use crate::cache::{DEFAULT_CACHE_NAME, DEFAULT_MANIFEST, DEFAULT_OFFLINE_FALLBACK};
use crate::config::{HubdeckConfig, OutputFormat};
use crate::debounce::DEFAULT_DEBOUNCE_MS;
use crate::github::GITHUB_API_BASE;
use crate::models::Priority;
use crate::storage::{ItemStore, TOKEN_KEY};
use crate::tasks::sync::DEFAULT_SYNC_DELAY_MS;
use serde::Serialize;
use std::path::PathBuf;

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "HD_CONFIG_DIR";

/// Environment variable overriding the stored GitHub token.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

pub const API_BASE_ENV: &str = "HD_API_BASE";
pub const CACHE_ORIGIN_ENV: &str = "HD_CACHE_ORIGIN";
pub const CACHE_NAME_ENV: &str = "HD_CACHE_NAME";

const CONFIG_FILE: &str = "config.kdl";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from environment variable
    EnvVar(String),
    /// Value from config.kdl
    File,
    /// Value stored in the item store
    Stored,
    /// Value from CLI flag
    CliFlag,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::File => write!(f, "file"),
            ValueSource::Stored => write!(f, "stored"),
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

impl Serialize for ValueSource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, Serialize)]
pub struct Resolved<T> {
    pub value: T,
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    pub api_base: Resolved<String>,
    pub output_format: Resolved<OutputFormat>,
    pub search_debounce_ms: Resolved<u64>,
    pub default_priority: Resolved<Priority>,
    pub cache_name: Resolved<String>,
    /// Empty when unset; relative cache URLs are then used as given.
    pub cache_origin: Resolved<String>,
    pub offline_fallback: Resolved<String>,
    pub sync_delay_ms: Resolved<u64>,
    pub manifest: Resolved<Vec<String>>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        let d = ValueSource::Default;
        Self {
            api_base: Resolved::new(GITHUB_API_BASE.to_string(), d.clone()),
            output_format: Resolved::new(OutputFormat::Json, d.clone()),
            search_debounce_ms: Resolved::new(DEFAULT_DEBOUNCE_MS, d.clone()),
            default_priority: Resolved::new(Priority::Medium, d.clone()),
            cache_name: Resolved::new(DEFAULT_CACHE_NAME.to_string(), d.clone()),
            cache_origin: Resolved::new(String::new(), d.clone()),
            offline_fallback: Resolved::new(DEFAULT_OFFLINE_FALLBACK.to_string(), d.clone()),
            sync_delay_ms: Resolved::new(DEFAULT_SYNC_DELAY_MS, d.clone()),
            manifest: Resolved::new(DEFAULT_MANIFEST.iter().map(|s| s.to_string()).collect(), d),
        }
    }
}

impl ResolvedConfig {
    pub fn output_format(&self) -> &OutputFormat {
        &self.output_format.value
    }

    pub fn default_priority(&self) -> Priority {
        self.default_priority.value
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_base: Option<String>,
    pub output_format: Option<OutputFormat>,
    pub cache_origin: Option<String>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn with_cache_origin(mut self, origin: impl Into<String>) -> Self {
        self.cache_origin = Some(origin.into());
        self
    }
}

/// Directory holding config.kdl: `HD_CONFIG_DIR` if set, otherwise
/// `<platform config dir>/hubdeck`.
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        if !dir.is_empty() {
            return Some(PathBuf::from(dir));
        }
    }
    dirs::config_dir().map(|d| d.join("hubdeck"))
}

/// Path to config.kdl, if a config directory can be determined.
pub fn config_file_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join(CONFIG_FILE))
}

/// Read config.kdl from the resolved location.
pub fn load_config_file() -> Result<HubdeckConfig> {
    match config_file_path() {
        Some(path) => HubdeckConfig::load(&path),
        None => Ok(HubdeckConfig::new()),
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Pick the highest-precedence value among flag, env and file.
fn pick(
    target: &mut Resolved<String>,
    flag: Option<&String>,
    env: &str,
    file: Option<&String>,
) {
    if let Some(v) = flag {
        *target = Resolved::new(v.clone(), ValueSource::CliFlag);
    } else if let Some(v) = env_value(env) {
        *target = Resolved::new(v, ValueSource::EnvVar(env.to_string()));
    } else if let Some(v) = file {
        *target = Resolved::new(v.clone(), ValueSource::File);
    }
}

/// Resolve configuration with full precedence chain.
pub fn resolve_config(file: &HubdeckConfig, overrides: &ConfigOverrides) -> ResolvedConfig {
    let mut result = ResolvedConfig::default();

    pick(
        &mut result.api_base,
        overrides.api_base.as_ref(),
        API_BASE_ENV,
        file.api_base.as_ref(),
    );
    pick(
        &mut result.cache_origin,
        overrides.cache_origin.as_ref(),
        CACHE_ORIGIN_ENV,
        file.cache_origin.as_ref(),
    );
    pick(
        &mut result.cache_name,
        None,
        CACHE_NAME_ENV,
        file.cache_name.as_ref(),
    );

    if let Some(ref format) = overrides.output_format {
        result.output_format = Resolved::new(format.clone(), ValueSource::CliFlag);
    } else if let Some(ref format) = file.output_format {
        result.output_format = Resolved::new(format.clone(), ValueSource::File);
    }

    if let Some(ms) = file.search_debounce_ms {
        result.search_debounce_ms = Resolved::new(ms, ValueSource::File);
    }
    if let Some(priority) = file.default_priority {
        result.default_priority = Resolved::new(priority, ValueSource::File);
    }
    if let Some(ref fallback) = file.offline_fallback {
        result.offline_fallback = Resolved::new(fallback.clone(), ValueSource::File);
    }
    if let Some(ms) = file.sync_delay_ms {
        result.sync_delay_ms = Resolved::new(ms, ValueSource::File);
    }
    if let Some(ref manifest) = file.manifest {
        result.manifest = Resolved::new(manifest.clone(), ValueSource::File);
    }

    result
}

/// Resolve the GitHub token: `GITHUB_TOKEN` first, then the stored token.
pub fn resolve_token(store: &dyn ItemStore) -> Result<Option<Resolved<String>>> {
    if let Some(token) = env_value(GITHUB_TOKEN_ENV) {
        return Ok(Some(Resolved::new(
            token,
            ValueSource::EnvVar(GITHUB_TOKEN_ENV.to_string()),
        )));
    }
    Ok(store
        .get_item(TOKEN_KEY)?
        .filter(|t| !t.is_empty())
        .map(|t| Resolved::new(t, ValueSource::Stored)))
}

/// Mask a token for display, keeping the first and last four characters.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        let head: String = chars.iter().take(4).collect();
        format!("{}...", head)
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}
