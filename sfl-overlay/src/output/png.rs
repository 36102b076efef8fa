//! Chart rasterization via a headless Chromium-family browser
//!
//! The browser screenshots the generated chart page into a temp file which is
//! then renamed over `mr-chart.png`, so OBS never reads a partial image.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Outcome of one rasterization attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered,
    /// No browser executable was found
    NoBrowser,
    /// The chart page does not exist yet
    NoChartPage,
}

/// Rasterization failure
#[derive(Error, Debug)]
pub enum PngError {
    /// Browser did not finish within the configured timeout
    #[error("browser timed out after {0:?}")]
    Timeout(Duration),

    /// Browser process could not be started
    #[error("failed to launch {}: {source}", path.display())]
    Launch { path: PathBuf, source: std::io::Error },

    /// Browser exited with a failure status
    #[error("browser exited with {status}: {stderr}")]
    Exit {
        status: std::process::ExitStatus,
        stderr: String,
    },

    /// Screenshot could not be moved into place
    #[error("screenshot not written to {}: {source}", path.display())]
    Rename { path: PathBuf, source: std::io::Error },
}

#[derive(Debug)]
pub struct PngRenderer {
    chrome_path: Option<PathBuf>,
    width: u32,
    height: u32,
    timeout: Duration,
    // Serializes renders that target the same output file
    busy: Mutex<()>,
}

impl PngRenderer {
    pub fn new(chrome_path: Option<PathBuf>, width: u32, height: u32, timeout: Duration) -> Self {
        Self {
            chrome_path,
            width,
            height,
            timeout,
            busy: Mutex::new(()),
        }
    }

    /// Screenshot `html_path` into `png_path`
    pub async fn render(&self, html_path: &Path, png_path: &Path) -> Result<RenderOutcome, PngError> {
        let _guard = self.busy.lock().await;

        if !tokio::fs::try_exists(html_path).await.unwrap_or(false) {
            debug!("Chart page {} missing, skipping PNG", html_path.display());
            return Ok(RenderOutcome::NoChartPage);
        }

        let Some(browser) = find_browser(self.chrome_path.as_deref()) else {
            warn!("No Chrome or Edge executable found; set chrome_path to enable chart PNG");
            return Ok(RenderOutcome::NoBrowser);
        };

        let temp_path = png_path.with_extension("tmp.png");
        let mut command = Command::new(&browser);
        command
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--hide-scrollbars")
            .arg("--default-background-color=00000000")
            .arg(format!("--window-size={},{}", self.width, self.height))
            .arg(format!("--screenshot={}", temp_path.display()))
            .arg(file_url(html_path))
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("Launching {} for chart PNG", browser.display());
        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| PngError::Timeout(self.timeout))?
            .map_err(|source| PngError::Launch {
                path: browser.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(PngError::Exit {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        tokio::fs::rename(&temp_path, png_path)
            .await
            .map_err(|source| PngError::Rename {
                path: temp_path.clone(),
                source,
            })?;

        info!("Chart PNG written: {}", png_path.display());
        Ok(RenderOutcome::Rendered)
    }
}

/// `file://` URL for a local path (forward slashes, Windows drive aware)
pub fn file_url(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    if normalized.starts_with('/') {
        format!("file://{}", normalized)
    } else {
        format!("file:///{}", normalized)
    }
}

/// Locate a Chromium-family browser
///
/// An explicitly configured path wins if it exists; otherwise well-known
/// install locations and `PATH` are searched.
pub fn find_browser(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        warn!("Configured chrome_path {} does not exist", path.display());
    }

    if let Some(found) = well_known_locations().into_iter().find(|p| p.is_file()) {
        return Some(found);
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .flat_map(|dir| BROWSER_BINARIES.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file())
}

const BROWSER_BINARIES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "microsoft-edge",
    "chrome.exe",
    "msedge.exe",
];

fn well_known_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();

    if cfg!(target_os = "windows") {
        locations.extend(
            [
                "C:\\Program Files\\Google\\Chrome\\Application\\chrome.exe",
                "C:\\Program Files (x86)\\Google\\Chrome\\Application\\chrome.exe",
                "C:\\Program Files\\Microsoft\\Edge\\Application\\msedge.exe",
                "C:\\Program Files (x86)\\Microsoft\\Edge\\Application\\msedge.exe",
            ]
            .map(PathBuf::from),
        );
        if let Some(local) = std::env::var_os("LOCALAPPDATA") {
            locations.push(
                PathBuf::from(local)
                    .join("Google")
                    .join("Chrome")
                    .join("Application")
                    .join("chrome.exe"),
            );
        }
    } else if cfg!(target_os = "macos") {
        locations.extend(
            [
                "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
                "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
                "/Applications/Chromium.app/Contents/MacOS/Chromium",
            ]
            .map(PathBuf::from),
        );
    }

    locations
}
