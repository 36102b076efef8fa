//! MR chart data and HTML generation
//!
//! The chart itself is drawn by a canvas script; this module only selects the
//! points, computes the Y axis range and fills the template.

use sfl_session::{HistoryPoint, HISTORY_CAPACITY};

const CHART_TEMPLATE: &str = include_str!("chart_template.html");

/// Minimum padding above and below the data range
const MIN_AXIS_PADDING: i64 = 10;
/// Axis bounds are rounded outward to this step
const AXIS_STEP: i64 = 10;

/// The most recent points that fit on the chart
pub fn chart_points(history: &[HistoryPoint]) -> &[HistoryPoint] {
    let start = history.len().saturating_sub(HISTORY_CAPACITY);
    &history[start..]
}

/// Y axis bounds `(min, max)` for `points`
///
/// Padding is a quarter of the data range (at least 10), then both bounds are
/// rounded outward to a multiple of 10. Returns `None` for no points, or if
/// the padded range does not fit in `i64`.
pub fn axis_bounds(points: &[HistoryPoint]) -> Option<(i64, i64)> {
    let min = points.iter().map(|p| p.mr).min()?;
    let max = points.iter().map(|p| p.mr).max()?;

    let padding = MIN_AXIS_PADDING.max(max.checked_sub(min)? / 4);
    let low = min.checked_sub(padding)?;
    let high = max.checked_add(padding)?;

    let lower = low.checked_sub(low.rem_euclid(AXIS_STEP))?;
    let upper = high.checked_add((AXIS_STEP - high.rem_euclid(AXIS_STEP)) % AXIS_STEP)?;
    Some((lower, upper))
}

/// Render the chart page for `points`
///
/// Returns `None` when there is nothing to plot.
pub fn render_chart_html(points: &[HistoryPoint], width: u32, height: u32) -> Option<String> {
    let (min_mr, max_mr) = axis_bounds(points)?;
    let data = serde_json::to_string(points).ok()?;

    Some(
        CHART_TEMPLATE
            .replace("{{WIDTH}}", &width.to_string())
            .replace("{{HEIGHT}}", &height.to_string())
            .replace("{{MIN_MR}}", &min_mr.to_string())
            .replace("{{MAX_MR}}", &max_mr.to_string())
            .replace("{{DATA}}", &data),
    )
}

/// Operator notes written next to the text fields
pub const CHART_INSTRUCTIONS: &str = "\
# MR chart

The chart image obs-output/mr-chart.png is regenerated automatically after
every rating change, using a locally installed Chrome or Edge in headless mode.
Set `chrome_path` in config.toml if the browser is not found automatically,
or `render_png = false` to disable rasterization.

Manual fallback:
1. Open http://localhost:8080/chart-generator.html
2. Open developer tools, run \"Capture node screenshot\" on the canvas
3. Save it as obs-output/mr-chart.png

OBS setup:
1. Add an Image source
2. Image file: obs-output/mr-chart.png
3. Position as needed

Chart data for custom renderers is in obs-output/mr-chart.json.
";
