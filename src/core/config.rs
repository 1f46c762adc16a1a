//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.navchrome/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{LevelFilter, debug, info, warn};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::disclosure::{
    AutoHideConfig, DEFAULT_AUTO_HIDE_THRESHOLD, DEFAULT_SHORTCUT, DisclosureConfig,
    DisclosureState, Ownership,
};
use crate::core::overflow::{LayoutMetrics, OverflowConfig, VISIBLE_SLOTS};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct NavConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub disclosure: DisclosureSection,
    #[serde(default)]
    pub overflow: OverflowSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeneralConfig {
    pub tree_file: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DisclosureSection {
    pub ownership: Option<String>,
    pub initial_state: Option<DisclosureState>,
    pub shortcut: Option<String>,
    pub auto_hide: Option<bool>,
    pub auto_hide_threshold: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OverflowSection {
    pub capacity: Option<usize>,
    pub reserved_slots: Option<usize>,
    pub item_height: Option<f32>,
    pub vertical_padding: Option<f32>,
    pub container_border: Option<f32>,
    pub row_gap: Option<f32>,
    pub last_row_padding: Option<f32>,
    pub max_height_ratio: Option<f32>,
}

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub tree_file: Option<PathBuf>,
    pub log_level: LevelFilter,
    pub disclosure: DisclosureConfig,
    pub overflow: OverflowConfig,
}

/// Overrides collected from CLI flags. `None` = not specified.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub tree_file: Option<PathBuf>,
    pub shortcut: Option<char>,
    pub controlled: bool,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.navchrome/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".navchrome").join("config.toml"))
}

/// Load config from `~/.navchrome/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `NavConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<NavConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(NavConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(NavConfig::default());
    }

    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<NavConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: NavConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

fn generate_default_config(path: &Path) {
    let default_content = r#"# navchrome configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# tree_file = "nav.toml"             # .toml or .json, relative to ~/.navchrome/
# log_level = "debug"                # "error", "warn", "info", "debug", "trace", "off"

# [disclosure]
# ownership = "uncontrolled"         # or "controlled"
# initial_state = "expanded"         # "collapsed" or "expanded"
# shortcut = "/"
# auto_hide = true
# auto_hide_threshold = 64           # logical px of downward scroll

# [overflow]
# capacity = 5
# reserved_slots = 0
# item_height = 56.0
# vertical_padding = 8.0
# container_border = 1.0
# row_gap = 8.0
# last_row_padding = 16.0
# max_height_ratio = 0.85
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

fn parse_shortcut(raw: &str) -> Option<char> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => {
            warn!("Ignoring shortcut {raw:?}: expected a single character");
            None
        }
    }
}

fn parse_ownership(raw: &str) -> Option<Ownership> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "controlled" => Some(Ownership::Controlled),
        "uncontrolled" => Some(Ownership::Uncontrolled),
        other => {
            warn!("Ignoring ownership {other:?}: expected \"controlled\" or \"uncontrolled\"");
            None
        }
    }
}

fn parse_level(raw: &str) -> Option<LevelFilter> {
    match raw.parse::<LevelFilter>() {
        Ok(level) => Some(level),
        Err(_) => {
            warn!("Ignoring log level {raw:?}");
            None
        }
    }
}

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &NavConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Same as [`resolve`] with an injectable environment lookup.
pub fn resolve_with_env(
    config: &NavConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Tree file: CLI → env → config (relative to ~/.navchrome/)
    let tree_file = cli
        .tree_file
        .clone()
        .or_else(|| env("NAVCHROME_TREE_FILE").map(PathBuf::from))
        .or_else(|| config.general.tree_file.as_deref().map(resolve_relative));

    let log_level = config
        .general
        .log_level
        .as_deref()
        .and_then(parse_level)
        .unwrap_or(LevelFilter::Debug);

    // Shortcut: CLI → env → config → default
    let shortcut = cli
        .shortcut
        .or_else(|| env("NAVCHROME_SHORTCUT").as_deref().and_then(parse_shortcut))
        .or_else(|| config.disclosure.shortcut.as_deref().and_then(parse_shortcut))
        .unwrap_or(DEFAULT_SHORTCUT);

    // Ownership: CLI flag → env → config → default
    let ownership = cli
        .controlled
        .then_some(Ownership::Controlled)
        .or_else(|| env("NAVCHROME_OWNERSHIP").as_deref().and_then(parse_ownership))
        .or_else(|| config.disclosure.ownership.as_deref().and_then(parse_ownership))
        .unwrap_or_default();

    let initial = match config.disclosure.initial_state {
        Some(DisclosureState::Intermediate) => {
            warn!("initial_state \"intermediate\" is a hover preview; starting collapsed");
            DisclosureState::Collapsed
        }
        Some(state) => state,
        None => DisclosureState::Expanded,
    };

    let disclosure = DisclosureConfig {
        ownership,
        initial,
        shortcut,
        auto_hide: AutoHideConfig {
            enabled: config.disclosure.auto_hide.unwrap_or(true),
            threshold: config
                .disclosure
                .auto_hide_threshold
                .unwrap_or(DEFAULT_AUTO_HIDE_THRESHOLD),
        },
    };

    let o = &config.overflow;
    let defaults = LayoutMetrics::default();
    let overflow = OverflowConfig {
        capacity: o.capacity.filter(|c| *c > 0).unwrap_or(VISIBLE_SLOTS),
        reserved_slots: o.reserved_slots.unwrap_or(0),
        metrics: LayoutMetrics {
            item_height: o.item_height.unwrap_or(defaults.item_height),
            vertical_padding: o.vertical_padding.unwrap_or(defaults.vertical_padding),
            container_border: o.container_border.unwrap_or(defaults.container_border),
            row_gap: o.row_gap.unwrap_or(defaults.row_gap),
            last_row_padding: o.last_row_padding.unwrap_or(defaults.last_row_padding),
            max_height_ratio: o
                .max_height_ratio
                .filter(|r| *r > 0.0 && *r <= 1.0)
                .unwrap_or(defaults.max_height_ratio),
        },
    };

    ResolvedConfig {
        tree_file,
        log_level,
        disclosure,
        overflow,
    }
}

/// Relative tree paths are looked up under `~/.navchrome/`.
fn resolve_relative(file: &str) -> PathBuf {
    let path = PathBuf::from(file);
    if path.is_absolute() {
        return path;
    }
    match dirs::home_dir() {
        Some(home) => home.join(".navchrome").join(path),
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve_with_env(&NavConfig::default(), &CliOverrides::default(), no_env);
        assert_eq!(resolved.disclosure, DisclosureConfig::default());
        assert_eq!(resolved.overflow, OverflowConfig::default());
        assert_eq!(resolved.log_level, LevelFilter::Debug);
        assert!(resolved.tree_file.is_none());
    }

    #[test]
    fn test_toml_values_override_defaults() {
        let toml_str = r#"
[general]
tree_file = "/etc/nav.json"
log_level = "warn"

[disclosure]
ownership = "controlled"
initial_state = "collapsed"
shortcut = "b"
auto_hide = false
auto_hide_threshold = 10

[overflow]
capacity = 4
reserved_slots = 1
row_gap = 4.0
"#;
        let config: NavConfig = toml::from_str(toml_str).unwrap();
        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env);
        assert_eq!(resolved.tree_file, Some(PathBuf::from("/etc/nav.json")));
        assert_eq!(resolved.log_level, LevelFilter::Warn);
        assert_eq!(resolved.disclosure.ownership, Ownership::Controlled);
        assert_eq!(resolved.disclosure.initial, DisclosureState::Collapsed);
        assert_eq!(resolved.disclosure.shortcut, 'b');
        assert!(!resolved.disclosure.auto_hide.enabled);
        assert_eq!(resolved.disclosure.auto_hide.threshold, 10);
        assert_eq!(resolved.overflow.capacity, 4);
        assert_eq!(resolved.overflow.reserved_slots, 1);
        assert_eq!(resolved.overflow.metrics.row_gap, 4.0);
        assert_eq!(resolved.overflow.metrics.item_height, 56.0);
    }

    #[test]
    fn test_sparse_toml_parses() {
        let config: NavConfig = toml::from_str("[overflow]\ncapacity = 3\n").unwrap();
        assert_eq!(config.overflow.capacity, Some(3));
        assert!(config.disclosure.shortcut.is_none());
        assert!(config.general.tree_file.is_none());
    }

    #[test]
    fn test_env_beats_file_and_cli_beats_env() {
        let config: NavConfig =
            toml::from_str("[disclosure]\nshortcut = \"b\"\nownership = \"uncontrolled\"\n").unwrap();
        let env = |key: &str| match key {
            "NAVCHROME_SHORTCUT" => Some("k".to_string()),
            "NAVCHROME_OWNERSHIP" => Some("controlled".to_string()),
            _ => None,
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), env);
        assert_eq!(resolved.disclosure.shortcut, 'k');
        assert_eq!(resolved.disclosure.ownership, Ownership::Controlled);

        let cli = CliOverrides {
            shortcut: Some('j'),
            ..Default::default()
        };
        let resolved = resolve_with_env(&config, &cli, env);
        assert_eq!(resolved.disclosure.shortcut, 'j');
    }

    #[test]
    fn test_invalid_values_fall_through() {
        let config: NavConfig = toml::from_str(
            "[disclosure]\nshortcut = \"ab\"\nownership = \"shared\"\ninitial_state = \"intermediate\"\n[overflow]\ncapacity = 0\nmax_height_ratio = 2.0\n",
        )
        .unwrap();
        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env);
        assert_eq!(resolved.disclosure.shortcut, DEFAULT_SHORTCUT);
        assert_eq!(resolved.disclosure.ownership, Ownership::Uncontrolled);
        assert_eq!(resolved.disclosure.initial, DisclosureState::Collapsed);
        assert_eq!(resolved.overflow.capacity, VISIBLE_SLOTS);
        assert_eq!(resolved.overflow.metrics.max_height_ratio, 0.85);
    }

    #[test]
    fn test_cli_controlled_flag() {
        let cli = CliOverrides {
            controlled: true,
            tree_file: Some(PathBuf::from("nav.toml")),
            ..Default::default()
        };
        let resolved = resolve_with_env(&NavConfig::default(), &cli, no_env);
        assert_eq!(resolved.disclosure.ownership, Ownership::Controlled);
        assert_eq!(resolved.tree_file, Some(PathBuf::from("nav.toml")));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = std::env::temp_dir().join(format!("navchrome-cfg-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, "[disclosure\nshortcut = ").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("config parse error"));
        fs::remove_dir_all(&dir).unwrap();
    }
}
