//! Presentation outputs for OBS
//!
//! Writes text fields, chart data and the chart page after each committed
//! observation, and rasterizes the chart in a background task. Nothing in
//! here returns an error to the intake path: failures are logged and the
//! committed session stands.

pub mod chart;
pub mod png;
pub mod rank;
pub mod text;

use serde_json::Value;
use sfl_common::config::ensure_directory_exists;
use sfl_session::{ChangeDescriptor, HistoryPoint, Session};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::config::ChartSettings;
use chart::{chart_points, render_chart_html, CHART_INSTRUCTIONS};
use png::PngRenderer;
use rank::rank_image_name;
use text::{text_fields, PlayerCard};

/// Output directory name inside the root folder
pub const OUTPUT_DIR_NAME: &str = "obs-output";
/// Chart page written to the root folder so the static server can serve it
pub const CHART_HTML_NAME: &str = "chart-generator.html";
pub const CHART_PNG_NAME: &str = "mr-chart.png";
pub const CHART_JSON_NAME: &str = "mr-chart.json";
pub const INSTRUCTIONS_NAME: &str = "chart-instructions.txt";

/// Writes overlay artifacts under a root folder
#[derive(Debug)]
pub struct OverlayOutput {
    root: PathBuf,
    output_dir: PathBuf,
    settings: ChartSettings,
    renderer: PngRenderer,
    // Held from session commit through the last artifact write
    writes: Mutex<()>,
}

impl OverlayOutput {
    pub fn new(root: &Path, settings: ChartSettings) -> Self {
        let renderer = PngRenderer::new(
            settings.chrome_path.clone(),
            settings.width,
            settings.height,
            settings.png_timeout,
        );
        Self {
            root: root.to_path_buf(),
            output_dir: root.join(OUTPUT_DIR_NAME),
            settings,
            renderer,
            writes: Mutex::new(()),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn chart_html_path(&self) -> PathBuf {
        self.root.join(CHART_HTML_NAME)
    }

    /// Exclusive access to the text, chart and player data files
    ///
    /// Not reentrant: `publish` and `write_*` must be called with the guard
    /// held, never while acquiring it.
    pub async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().await
    }

    /// Create the output directory and write the chart instructions
    pub fn prepare(&self) -> sfl_common::Result<()> {
        ensure_directory_exists(&self.output_dir)?;
        std::fs::write(self.output_dir.join(INSTRUCTIONS_NAME), CHART_INSTRUCTIONS)?;
        Ok(())
    }

    /// Refresh all artifacts after a committed observation
    ///
    /// Text fields are always rewritten; chart artifacts only when `change`
    /// says the history moved. PNG rasterization is spawned, not awaited.
    pub async fn publish(
        self: &Arc<Self>,
        payload: &Value,
        rating: i64,
        session: &Session,
        change: ChangeDescriptor,
    ) {
        let card = PlayerCard::from_payload(payload, rating);
        self.write_text_fields(&card, Some(session)).await;

        if change.needs_render(session) && self.write_chart(&session.mr_history).await {
            self.spawn_png_render();
        }
    }

    /// Write every text field and copy the rank icon
    pub async fn write_text_fields(&self, card: &PlayerCard, session: Option<&Session>) {
        if let Err(e) = tokio::fs::create_dir_all(&self.output_dir).await {
            warn!("Cannot create {}: {}", self.output_dir.display(), e);
            return;
        }

        for (name, content) in text_fields(card, session) {
            let path = self.output_dir.join(name);
            if let Err(e) = tokio::fs::write(&path, content).await {
                warn!("Failed to write {}: {}", path.display(), e);
            }
        }

        let icon = self.root.join("images").join(rank_image_name(card.rank));
        if tokio::fs::try_exists(&icon).await.unwrap_or(false) {
            if let Err(e) = tokio::fs::copy(&icon, self.output_dir.join("rank.png")).await {
                warn!("Failed to copy rank icon {}: {}", icon.display(), e);
            }
        } else {
            warn!("Rank icon not found: {}", icon.display());
        }

        debug!("Text fields updated - rank: {}, MR: {}", card.rank, card.mr);
    }

    /// Write chart data and page for `history`
    ///
    /// Returns `true` if a chart page was written.
    pub async fn write_chart(&self, history: &[HistoryPoint]) -> bool {
        let points = chart_points(history);
        let Some(html) = render_chart_html(points, self.settings.width, self.settings.height) else {
            debug!("Nothing to chart (empty history or unplottable range), skipping");
            return false;
        };

        match serde_json::to_string_pretty(points) {
            Ok(json) => {
                let path = self.output_dir.join(CHART_JSON_NAME);
                if let Err(e) = tokio::fs::write(&path, json).await {
                    warn!("Failed to write {}: {}", path.display(), e);
                }
            }
            Err(e) => warn!("Failed to encode chart data: {}", e),
        }

        let html_path = self.chart_html_path();
        match tokio::fs::write(&html_path, html).await {
            Ok(()) => {
                debug!("Chart page written: {}", html_path.display());
                true
            }
            Err(e) => {
                warn!("Failed to write {}: {}", html_path.display(), e);
                false
            }
        }
    }

    /// Rasterize the chart page in the background
    pub fn spawn_png_render(self: &Arc<Self>) {
        if !self.settings.render_png {
            return;
        }

        let output = Arc::clone(self);
        tokio::spawn(async move {
            let html = output.chart_html_path();
            let png = output.output_dir.join(CHART_PNG_NAME);
            if let Err(e) = output.renderer.render(&html, &png).await {
                warn!("Chart PNG generation failed: {}", e);
            }
        });
    }

    /// Regenerate the chart from a stored session at startup
    pub async fn restore(self: &Arc<Self>, session: Option<&Session>) {
        match session {
            Some(session) if !session.mr_history.is_empty() => {
                info!("Found stored session, regenerating chart");
                let _writes = self.lock_writes().await;
                if self.write_chart(&session.mr_history).await {
                    self.spawn_png_render();
                }
            }
            _ => info!("No session data, waiting for the first update"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn output_in(dir: &Path) -> Arc<OverlayOutput> {
        let settings = ChartSettings {
            render_png: false,
            ..ChartSettings::default()
        };
        let output = Arc::new(OverlayOutput::new(dir, settings));
        output.prepare().unwrap();
        output
    }

    fn read(dir: &Path, name: &str) -> String {
        std::fs::read_to_string(dir.join(OUTPUT_DIR_NAME).join(name)).unwrap()
    }

    #[tokio::test]
    async fn test_prepare_writes_instructions() {
        let dir = tempfile::tempdir().unwrap();
        output_in(dir.path());
        assert!(read(dir.path(), INSTRUCTIONS_NAME).contains("mr-chart.png"));
    }

    #[tokio::test]
    async fn test_publish_new_session_writes_text_and_chart() {
        let dir = tempfile::tempdir().unwrap();
        let output = output_in(dir.path());
        let session = Session::start(1500, 0);
        let change = ChangeDescriptor { mr_changed: false, is_new_session: true };

        output
            .publish(&json!({ "fighter_name": "P1", "mr": 1500 }), 1500, &session, change)
            .await;

        assert_eq!(read(dir.path(), "mr.txt"), "1500");
        assert_eq!(read(dir.path(), "player-name.txt"), "P1");
        assert_eq!(read(dir.path(), "win-loss.txt"), "0/0");
        assert!(dir.path().join(CHART_HTML_NAME).exists());
        let chart: Vec<HistoryPoint> =
            serde_json::from_str(&read(dir.path(), CHART_JSON_NAME)).unwrap();
        assert_eq!(chart, session.mr_history);
    }

    #[tokio::test]
    async fn test_publish_without_change_skips_chart() {
        let dir = tempfile::tempdir().unwrap();
        let output = output_in(dir.path());
        let session = Session::start(1500, 0);

        output
            .publish(&json!({}), 1500, &session, ChangeDescriptor::default())
            .await;

        assert_eq!(read(dir.path(), "mr.txt"), "1500");
        assert!(!dir.path().join(CHART_HTML_NAME).exists());
    }

    #[tokio::test]
    async fn test_rank_icon_copied_when_present() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("images")).unwrap();
        std::fs::write(dir.path().join("images").join("rank9_s.png"), b"png").unwrap();
        let output = output_in(dir.path());

        let card = PlayerCard::from_payload(&json!({ "ml": 9 }), 1200);
        output.write_text_fields(&card, None).await;

        assert_eq!(
            std::fs::read(dir.path().join(OUTPUT_DIR_NAME).join("rank.png")).unwrap(),
            b"png"
        );
        assert_eq!(read(dir.path(), "rank-name.txt"), "Bronze 1");
    }
}
