//! Config file loading and discovery.

use std::path::Path;

use anyhow::{Context, Result};
use showcase_core::ShowcaseConfig;

/// File names searched for, in order, in each directory.
pub const CONFIG_NAMES: [&str; 3] = ["showcase.toml", ".showcase.toml", "showcase.json"];

/// Load config from a TOML or JSON file, chosen by extension.
pub fn load(path: &Path) -> Result<ShowcaseConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse(&content, is_json(path))
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn parse(content: &str, json: bool) -> Result<ShowcaseConfig> {
    let config = if json {
        serde_json::from_str(content)?
    } else {
        toml::from_str(content)?
    };
    Ok(config)
}

fn is_json(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "json")
}

/// Find the nearest config file, starting at `start` and walking up.
pub fn discover(start: &Path) -> Option<std::path::PathBuf> {
    start.ancestors().find_map(|dir| {
        CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    })
}

/// Default config serialized for `showcase init`.
pub fn generate_default_config(json: bool) -> Result<String> {
    let config = ShowcaseConfig::default();
    let content = if json {
        serde_json::to_string_pretty(&config)?
    } else {
        toml::to_string_pretty(&config)?
    };
    Ok(content)
}
