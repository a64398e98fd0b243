//! Game configuration.
//!
//! Read from a TOML file. Every key is optional and falls back to the
//! built-in defaults, which reproduce the classic timings.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::{
    GameError, Position,
    agent::{patrol::PatrolRoute, portal::PortalTimings},
};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "trap_world.toml";

// ── Public Config Struct ──

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub timings: Timings,
    pub patrol: PatrolRoute,
    pub fixed_trap: Position,
    pub random_traps: usize,
    /// Seed for portal and trap placement. `None` seeds from the OS.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub patrol: Duration,
    pub vertical: Duration,
    pub portal: PortalTimings,
    pub trap_toggle: Duration,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    #[serde(default)]
    timings: TomlTimings,
    #[serde(default)]
    patrol: PatrolRoute,
    #[serde(default = "default_fixed_trap")]
    fixed_trap: Position,
    #[serde(default = "default_random_traps")]
    random_traps: usize,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct TomlTimings {
    #[serde(default = "default_patrol_ms")]
    patrol_ms: u64,
    #[serde(default = "default_vertical_ms")]
    vertical_ms: u64,
    #[serde(default = "default_portal_lifetime_ms")]
    portal_lifetime_ms: u64,
    #[serde(default = "default_portal_poll_ms")]
    portal_poll_ms: u64,
    #[serde(default = "default_portal_cooldown_ms")]
    portal_cooldown_ms: u64,
    #[serde(default = "default_trap_toggle_ms")]
    trap_toggle_ms: u64,
}

// ── Defaults ──

fn default_patrol_ms() -> u64 { 400 }
fn default_vertical_ms() -> u64 { 500 }
fn default_portal_lifetime_ms() -> u64 { 5_000 }
fn default_portal_poll_ms() -> u64 { 300 }
fn default_portal_cooldown_ms() -> u64 { 3_000 }
fn default_trap_toggle_ms() -> u64 { 3_000 }
fn default_fixed_trap() -> Position { Position::new(25, 15) }
fn default_random_traps() -> usize { 3 }

impl Default for TomlTimings {
    fn default() -> Self {
        TomlTimings {
            patrol_ms: default_patrol_ms(),
            vertical_ms: default_vertical_ms(),
            portal_lifetime_ms: default_portal_lifetime_ms(),
            portal_poll_ms: default_portal_poll_ms(),
            portal_cooldown_ms: default_portal_cooldown_ms(),
            trap_toggle_ms: default_trap_toggle_ms(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        TomlConfig {
            timings: TomlTimings::default(),
            patrol: PatrolRoute::default(),
            fixed_trap: default_fixed_trap(),
            random_traps: default_random_traps(),
            seed: None,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

// ── Loading ──

impl GameConfig {
    fn from_toml(cfg: TomlConfig) -> Self {
        let t = &cfg.timings;
        GameConfig {
            timings: Timings {
                patrol: Duration::from_millis(t.patrol_ms),
                vertical: Duration::from_millis(t.vertical_ms),
                portal: PortalTimings {
                    lifetime: Duration::from_millis(t.portal_lifetime_ms),
                    poll: Duration::from_millis(t.portal_poll_ms),
                    cooldown: Duration::from_millis(t.portal_cooldown_ms),
                },
                trap_toggle: Duration::from_millis(t.trap_toggle_ms),
            },
            patrol: cfg.patrol,
            fixed_trap: cfg.fixed_trap,
            random_traps: cfg.random_traps,
            seed: cfg.seed,
        }
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, GameError> {
        let cfg: TomlConfig = toml::from_str(text)?;
        let config = GameConfig::from_toml(cfg);
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, GameError> {
        let text = std::fs::read_to_string(path).map_err(|source| GameError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        GameConfig::from_toml_str(&text)
    }

    /// Loads `path` if given. Otherwise uses [`DEFAULT_CONFIG_FILE`] from the
    /// working directory when present, and the defaults when not.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, GameError> {
        match path {
            Some(path) => GameConfig::load(path),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    GameConfig::load(&fallback)
                } else {
                    Ok(GameConfig::default())
                }
            }
        }
    }

    fn validate(&self) -> Result<(), GameError> {
        let t = &self.timings;
        let intervals = [
            ("patrol_ms", t.patrol),
            ("vertical_ms", t.vertical),
            ("portal_lifetime_ms", t.portal.lifetime),
            ("portal_poll_ms", t.portal.poll),
            ("portal_cooldown_ms", t.portal.cooldown),
            ("trap_toggle_ms", t.trap_toggle),
        ];
        if let Some((name, _)) = intervals.iter().find(|(_, d)| d.is_zero()) {
            return Err(GameError::InvalidConfig(format!("{name} must be greater than zero")));
        }
        if self.patrol.x_min > self.patrol.x_max {
            return Err(GameError::InvalidConfig(format!(
                "patrol x_min ({}) is greater than x_max ({})",
                self.patrol.x_min, self.patrol.x_max
            )));
        }
        Ok(())
    }
}
