//! sfl-overlay configuration
//!
//! Values come from the optional TOML file; CLI flags and environment
//! variables (handled by clap in main.rs) override them.

use clap::ValueEnum;
use serde::Deserialize;
use sfl_common::config::load_toml_or_default;
use sfl_common::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Session persistence backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// `session.json` in the root folder
    #[default]
    Json,
    /// `session.db` in the root folder
    Sqlite,
    /// Process memory only (lost on restart)
    Memory,
}

/// Overlay server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Root folder (only consulted during root folder resolution)
    pub root_folder: Option<PathBuf>,
    pub port: u16,
    pub bind_host: String,
    pub store: StoreBackend,
    /// Explicit Chrome/Edge executable for chart rasterization
    pub chrome_path: Option<PathBuf>,
    /// Set to false to skip PNG rasterization entirely
    pub render_png: bool,
    pub chart_width: u32,
    pub chart_height: u32,
    pub png_timeout_secs: u64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            port: 8080,
            bind_host: "127.0.0.1".to_string(),
            store: StoreBackend::Json,
            chrome_path: None,
            render_png: true,
            chart_width: 1436,
            chart_height: 180,
            png_timeout_secs: 20,
        }
    }
}

impl OverlayConfig {
    /// Load from `path`; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self> {
        load_toml_or_default(path)
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, port: Option<u16>, store: Option<StoreBackend>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(store) = store {
            self.store = store;
        }
        self
    }

    /// Chart rendering settings derived from this config
    pub fn chart_settings(&self) -> ChartSettings {
        ChartSettings {
            width: self.chart_width,
            height: self.chart_height,
            render_png: self.render_png,
            chrome_path: self.chrome_path.clone(),
            png_timeout: Duration::from_secs(self.png_timeout_secs),
        }
    }

    /// `host:port` string to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

/// Chart output settings
#[derive(Debug, Clone)]
pub struct ChartSettings {
    pub width: u32,
    pub height: u32,
    pub render_png: bool,
    pub chrome_path: Option<PathBuf>,
    pub png_timeout: Duration,
}

impl Default for ChartSettings {
    fn default() -> Self {
        OverlayConfig::default().chart_settings()
    }
}
