//! Configuration for hubdeck.
//!
//! User preferences live in `config.kdl`:
//!
//! - `$HD_CONFIG_DIR/config.kdl`, or
//! - `~/.config/hubdeck/config.kdl`
//!
//! The GitHub token is not a preference; it is stored in the item store by
//! `hd repo connect` and may be overridden with `GITHUB_TOKEN`.
//!
//! Use the [`resolver`] module for precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    CONFIG_DIR_ENV, ConfigOverrides, GITHUB_TOKEN_ENV, Resolved, ResolvedConfig, ValueSource,
    config_file_path, load_config_file, mask_token, resolve_config, resolve_token,
};
pub use schema::{CONFIG_KEYS, HubdeckConfig, OutputFormat};
