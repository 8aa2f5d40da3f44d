//! Settings file
//!
//! Optional TOML file; every value can be overridden on the command line.
//!
//! ```toml
//! fixture = "demos/fixture.json"
//! session_token = "demo"
//! window_minutes = 30
//! timezone = "+05:30"
//! log_filter = "logscope_engine=debug"
//! latency_ms = 250
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::TimeDelta;
use serde::Deserialize;

use logscope_types::DisplayTimezone;

use crate::Args;

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Fixture document serving streams and records
    pub fixture: Option<PathBuf>,
    pub session_token: Option<String>,
    /// Length of the initial window
    pub window_minutes: Option<i64>,
    pub timezone: Option<String>,
    /// Tracing directive used when `RUST_LOG` is unset
    pub log_filter: Option<String>,
    /// Artificial delay for every fixture request
    pub latency_ms: Option<u64>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Command-line values win over file values
    pub fn merge_args(mut self, args: &Args) -> Self {
        if args.fixture.is_some() {
            self.fixture = args.fixture.clone();
        }
        if args.token.is_some() {
            self.session_token = args.token.clone();
        }
        if args.window_minutes.is_some() {
            self.window_minutes = args.window_minutes;
        }
        if args.tz.is_some() {
            self.timezone = args.tz.clone();
        }
        if args.latency_ms.is_some() {
            self.latency_ms = args.latency_ms;
        }
        self
    }

    pub fn initial_window(&self) -> Result<TimeDelta> {
        match self.window_minutes {
            None => Ok(TimeDelta::minutes(10)),
            Some(minutes) if minutes > 0 => TimeDelta::try_minutes(minutes)
                .with_context(|| format!("window of {minutes} minutes is too large")),
            Some(minutes) => anyhow::bail!("window_minutes must be positive, got {minutes}"),
        }
    }

    pub fn display_timezone(&self) -> Result<DisplayTimezone> {
        match &self.timezone {
            None => Ok(DisplayTimezone::Utc),
            Some(zone) => Ok(zone.parse()?),
        }
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms.unwrap_or(0))
    }
}
