use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Dashboard configuration, read from `.slate/config.toml`.
///
/// Every field has a default so a missing or partial file always yields a
/// usable config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashConfig {
    /// Items requested per list-query page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Undo records kept before the oldest is dropped.
    #[serde(default = "default_undo_cap")]
    pub undo_cap: usize,
    /// How long a toast stays on screen.
    #[serde(default = "default_toast_ttl_ms")]
    pub toast_ttl_ms: u64,
    /// Whether the completed column is shown on the board.
    #[serde(default = "default_true")]
    pub show_completed: bool,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            undo_cap: default_undo_cap(),
            toast_ttl_ms: default_toast_ttl_ms(),
            show_completed: default_true(),
        }
    }
}

const fn default_page_size() -> usize {
    50
}

const fn default_undo_cap() -> usize {
    crate::undo::DEFAULT_UNDO_CAP
}

const fn default_toast_ttl_ms() -> u64 {
    4000
}

const fn default_true() -> bool {
    true
}

/// Load config from `<root>/.slate/config.toml`; absent file means defaults.
///
/// # Errors
/// Returns an error when the file exists but cannot be read or parsed.
pub fn load_config(root: &Path) -> Result<DashConfig> {
    let path = root.join(".slate/config.toml");
    if !path.exists() {
        return Ok(DashConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<DashConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}
