//! KDL schema for config.kdl.
//!
//! ```kdl
//! api-base "https://api.github.com"
//! output-format "human"  // or "json"
//! search-debounce-ms 300
//! default-priority "medium"
//! cache-name "hubdeck-v1"
//! cache-origin "http://localhost:8080"
//! offline-fallback "/index.html"
//! sync-delay-ms 1000
//! manifest {
//!     asset "/"
//!     asset "/index.html"
//! }
//! ```
//!
//! Unknown nodes are ignored. Values of the wrong type are dropped when
//! parsing and reported by [`HubdeckConfig::validate`] only when set
//! through [`HubdeckConfig::set`].

use crate::models::Priority;
use crate::{Error, Result};
use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Keys accepted by `hd config set`.
pub const CONFIG_KEYS: &[&str] = &[
    "api-base",
    "output-format",
    "search-debounce-ms",
    "default-priority",
    "cache-name",
    "cache-origin",
    "offline-fallback",
    "sync-delay-ms",
];

/// User preferences stored in config.kdl.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubdeckConfig {
    /// GitHub REST API base URL
    pub api_base: Option<String>,
    pub output_format: Option<OutputFormat>,
    /// Quiet period before a typed search query is sent
    pub search_debounce_ms: Option<u64>,
    /// Priority for tasks added without `--priority`
    pub default_priority: Option<Priority>,
    /// Current cache generation name
    pub cache_name: Option<String>,
    /// Base URL for relative cache requests and manifest entries
    pub cache_origin: Option<String>,
    pub offline_fallback: Option<String>,
    pub sync_delay_ms: Option<u64>,
    /// Assets cached at install time
    pub manifest: Option<Vec<String>>,
}

impl HubdeckConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(ref base) = self.api_base {
            if !base.starts_with("http://") && !base.starts_with("https://") {
                return Err(format!("api-base must be an http(s) URL, got {}", base));
            }
        }
        if let Some(ref origin) = self.cache_origin {
            if !origin.contains("://") {
                return Err(format!("cache-origin must be an absolute URL, got {}", origin));
            }
        }
        if let Some(ref name) = self.cache_name {
            if name.trim().is_empty() {
                return Err("cache-name must not be empty".to_string());
            }
        }
        if let Some(ref manifest) = self.manifest {
            if manifest.iter().any(|a| a.trim().is_empty()) {
                return Err("manifest assets must not be empty".to_string());
            }
        }
        Ok(())
    }

    /// Parse config from a KDL document.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let mut config = Self::new();

        config.api_base = first_string(doc, "api-base");
        config.output_format = first_string(doc, "output-format").and_then(|s| OutputFormat::parse(&s));
        config.search_debounce_ms = first_millis(doc, "search-debounce-ms");
        config.default_priority = first_string(doc, "default-priority").and_then(|s| s.parse().ok());
        config.cache_name = first_string(doc, "cache-name");
        config.cache_origin = first_string(doc, "cache-origin");
        config.offline_fallback = first_string(doc, "offline-fallback");
        config.sync_delay_ms = first_millis(doc, "sync-delay-ms");

        if let Some(node) = doc.get("manifest") {
            let mut assets = Vec::new();
            if let Some(children) = node.children() {
                for child in children.nodes() {
                    if child.name().value() == "asset" {
                        if let Some(s) = child.entries().first().and_then(|e| e.value().as_string()) {
                            assets.push(s.to_string());
                        }
                    }
                }
            }
            config.manifest = Some(assets);
        }

        config
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        push_string(&mut doc, "api-base", self.api_base.as_deref());
        push_string(
            &mut doc,
            "output-format",
            self.output_format.as_ref().map(|f| f.as_str()),
        );
        push_integer(&mut doc, "search-debounce-ms", self.search_debounce_ms);
        push_string(
            &mut doc,
            "default-priority",
            self.default_priority.map(|p| p.as_str()),
        );
        push_string(&mut doc, "cache-name", self.cache_name.as_deref());
        push_string(&mut doc, "cache-origin", self.cache_origin.as_deref());
        push_string(&mut doc, "offline-fallback", self.offline_fallback.as_deref());
        push_integer(&mut doc, "sync-delay-ms", self.sync_delay_ms);

        if let Some(ref manifest) = self.manifest {
            let mut children = KdlDocument::new();
            for asset in manifest {
                let mut child = KdlNode::new("asset");
                child.push(KdlEntry::new(KdlValue::String(asset.clone())));
                children.nodes_mut().push(child);
            }
            let mut node = KdlNode::new("manifest");
            node.set_children(children);
            doc.nodes_mut().push(node);
        }

        doc
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &HubdeckConfig) {
        if other.api_base.is_some() {
            self.api_base = other.api_base.clone();
        }
        if other.output_format.is_some() {
            self.output_format = other.output_format.clone();
        }
        if other.search_debounce_ms.is_some() {
            self.search_debounce_ms = other.search_debounce_ms;
        }
        if other.default_priority.is_some() {
            self.default_priority = other.default_priority;
        }
        if other.cache_name.is_some() {
            self.cache_name = other.cache_name.clone();
        }
        if other.cache_origin.is_some() {
            self.cache_origin = other.cache_origin.clone();
        }
        if other.offline_fallback.is_some() {
            self.offline_fallback = other.offline_fallback.clone();
        }
        if other.sync_delay_ms.is_some() {
            self.sync_delay_ms = other.sync_delay_ms;
        }
        if other.manifest.is_some() {
            self.manifest = other.manifest.clone();
        }
    }

    /// Set a single scalar key from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = |what: &str| Error::Config(format!("{} expects {}, got {}", key, what, value));
        match key {
            "api-base" => self.api_base = Some(value.to_string()),
            "output-format" => {
                self.output_format = Some(OutputFormat::parse(value).ok_or_else(|| invalid("json or human"))?)
            }
            "search-debounce-ms" => {
                self.search_debounce_ms = Some(value.parse().map_err(|_| invalid("milliseconds"))?)
            }
            "default-priority" => {
                self.default_priority = Some(value.parse().map_err(|_| invalid("high, medium or low"))?)
            }
            "cache-name" => self.cache_name = Some(value.to_string()),
            "cache-origin" => self.cache_origin = Some(value.to_string()),
            "offline-fallback" => self.offline_fallback = Some(value.to_string()),
            "sync-delay-ms" => {
                self.sync_delay_ms = Some(value.parse().map_err(|_| invalid("milliseconds"))?)
            }
            _ => {
                return Err(Error::Config(format!(
                    "unknown key {}. Valid keys: {}",
                    key,
                    CONFIG_KEYS.join(", ")
                )));
            }
        }
        self.validate().map_err(Error::Config)
    }

    /// Read config.kdl, returning an empty config if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        let doc: KdlDocument = content
            .parse()
            .map_err(|e| Error::Config(format!("Failed to parse KDL in {}: {}", path.display(), e)))?;
        let config = Self::from_kdl(&doc);
        config
            .validate()
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Write config.kdl, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_kdl().to_string())?;
        Ok(())
    }
}

fn first_string(doc: &KdlDocument, name: &str) -> Option<String> {
    doc.get(name)?
        .entries()
        .first()?
        .value()
        .as_string()
        .map(|s| s.to_string())
}

fn first_millis(doc: &KdlDocument, name: &str) -> Option<u64> {
    let i = doc.get(name)?.entries().first()?.value().as_integer()?;
    u64::try_from(i).ok()
}

fn push_string(doc: &mut KdlDocument, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        let mut node = KdlNode::new(name);
        node.push(KdlEntry::new(KdlValue::String(value.to_string())));
        doc.nodes_mut().push(node);
    }
}

fn push_integer(doc: &mut KdlDocument, name: &str, value: Option<u64>) {
    if let Some(value) = value {
        let mut node = KdlNode::new(name);
        node.push(KdlEntry::new(KdlValue::Integer(value as i128)));
        doc.nodes_mut().push(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("human"), Some(OutputFormat::Human));
        assert_eq!(OutputFormat::parse("xml"), None);
    }

    #[test]
    fn test_from_kdl() {
        let doc: KdlDocument = r#"
            api-base "http://localhost:9000"
            output-format "human"
            search-debounce-ms 150
            default-priority "high"
            cache-name "hubdeck-v2"
            sync-delay-ms 0
            manifest {
                asset "/"
                asset "/app.js"
            }
            unknown-node "ignored"
        "#
        .parse()
        .unwrap();

        let config = HubdeckConfig::from_kdl(&doc);
        assert_eq!(config.api_base.as_deref(), Some("http://localhost:9000"));
        assert_eq!(config.output_format, Some(OutputFormat::Human));
        assert_eq!(config.search_debounce_ms, Some(150));
        assert_eq!(config.default_priority, Some(Priority::High));
        assert_eq!(config.cache_name.as_deref(), Some("hubdeck-v2"));
        assert_eq!(config.sync_delay_ms, Some(0));
        assert_eq!(
            config.manifest,
            Some(vec!["/".to_string(), "/app.js".to_string()])
        );
        assert!(config.cache_origin.is_none());
    }

    #[test]
    fn test_from_kdl_drops_bad_values() {
        let doc: KdlDocument = r#"
            output-format "yaml"
            search-debounce-ms -5
            default-priority "urgent"
        "#
        .parse()
        .unwrap();

        let config = HubdeckConfig::from_kdl(&doc);
        assert_eq!(config, HubdeckConfig::default());
    }

    #[test]
    fn test_kdl_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.kdl");
        let config = HubdeckConfig {
            cache_origin: Some("http://localhost:8080".to_string()),
            default_priority: Some(Priority::Low),
            manifest: Some(vec!["/index.html".to_string()]),
            search_debounce_ms: Some(500),
            ..Default::default()
        };

        config.save(&path).unwrap();
        assert_eq!(HubdeckConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let config = HubdeckConfig::load(&dir.path().join("config.kdl")).unwrap();
        assert_eq!(config, HubdeckConfig::default());
    }

    #[test]
    fn test_load_rejects_invalid_kdl() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.kdl");
        std::fs::write(&path, "api-base \"unterminated").unwrap();
        assert!(matches!(HubdeckConfig::load(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_merge() {
        let mut base = HubdeckConfig {
            cache_name: Some("a".to_string()),
            sync_delay_ms: Some(10),
            ..Default::default()
        };
        base.merge(&HubdeckConfig {
            cache_name: Some("b".to_string()),
            ..Default::default()
        });
        assert_eq!(base.cache_name.as_deref(), Some("b"));
        assert_eq!(base.sync_delay_ms, Some(10));
    }

    #[test]
    fn test_set() {
        let mut config = HubdeckConfig::new();
        config.set("default-priority", "low").unwrap();
        config.set("search-debounce-ms", "50").unwrap();
        assert_eq!(config.default_priority, Some(Priority::Low));
        assert_eq!(config.search_debounce_ms, Some(50));

        assert!(config.set("search-debounce-ms", "soon").is_err());
        assert!(config.set("api-base", "ftp://nope").is_err());
        assert!(config.set("editor", "vim").is_err());
    }
}
