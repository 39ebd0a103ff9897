//! Configuration for the board component and the board host.
//!
//! [`BoardConfig`] is read from `GUESTBOARD_*` environment variables with
//! per-key fallback to defaults; a bad value is logged and ignored rather
//! than refusing to start a page. [`HostConfig`] is the host binary's
//! command line, with environment fallbacks through `clap`.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::env::VarError;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use tracing::warn;

use crate::brush::Brush;
use crate::consts::{DEFAULT_COLOR, DEFAULT_FLUSH_DELAY_MS, DEFAULT_STROKE_WIDTH};

const FLUSH_DELAY_KEY: &str = "GUESTBOARD_FLUSH_DELAY_MS";
const DEFAULT_COLOR_KEY: &str = "GUESTBOARD_DEFAULT_COLOR";
const DEFAULT_WIDTH_KEY: &str = "GUESTBOARD_DEFAULT_WIDTH";

// =============================================================================
// BOARD
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct BoardConfig {
    /// Pause between back-to-back flushes.
    pub flush_delay: Duration,
    /// Brush a freshly mounted board starts with.
    pub brush: Brush,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self { flush_delay: Duration::from_millis(DEFAULT_FLUSH_DELAY_MS), brush: Brush::default() }
    }
}

impl BoardConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env_value(key, std::env::var(key)))
    }

    /// Build from an arbitrary key lookup. Missing or invalid keys keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flush_delay_ms = parse_or(FLUSH_DELAY_KEY, lookup(FLUSH_DELAY_KEY), DEFAULT_FLUSH_DELAY_MS);
        let color = lookup(DEFAULT_COLOR_KEY).unwrap_or_else(|| DEFAULT_COLOR.to_owned());
        let width = parse_or(DEFAULT_WIDTH_KEY, lookup(DEFAULT_WIDTH_KEY), DEFAULT_STROKE_WIDTH);

        let brush = match Brush::new(&color, width) {
            Ok(brush) => brush,
            Err(e) => {
                warn!(error = %e, "invalid default brush; using built-in brush");
                Brush::default()
            }
        };

        Self { flush_delay: Duration::from_millis(flush_delay_ms), brush }
    }
}

/// A set but non-unicode variable is logged and treated as unset.
fn env_value(key: &str, value: Result<String, VarError>) -> Option<String> {
    match value {
        Ok(value) => Some(value),
        Err(VarError::NotPresent) => None,
        Err(VarError::NotUnicode(raw)) => {
            warn!(key, value = ?raw, "config value is not unicode; using default");
            None
        }
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            warn!(key, value = %raw, "invalid config value; using default");
            default
        }
    }
}

// =============================================================================
// HOST
// =============================================================================

#[derive(Parser, Debug, Clone)]
#[command(name = "guestboard", about = "Shared drawing board host")]
pub struct HostConfig {
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Static site served at `/`.
    #[arg(long, env = "GUESTBOARD_SITE_DIR")]
    pub site_dir: Option<PathBuf>,

    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 5)]
    pub db_max_connections: u32,
}
