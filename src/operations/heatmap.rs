//! Heatmaps of variables summarized per group.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::operations::plotting::{
    Colormap, Figure, HeatmapPlot, PanelStyle, obs_column, require_keys, variable_matrix,
};
use crate::operations::statistics::summarize_by_group;
use crate::operations::types::{PlotOptions, ReduceFunction};
use crate::repr::AnnData;
use crate::views::MatrixView;
use crate::ScPlotResult;

/// Configuration for [`heatmap`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    /// How each (variable, group) cell is summarized.
    pub reduce: ReduceFunction,
    /// Color scale of the cells.
    pub cmap: Colormap,
    /// Read the raw matrix: `None` whenever one is attached, `Some(true)` requires it.
    pub use_raw: Option<bool>,
    /// Styling laid over this builder's defaults.
    pub options: PlotOptions,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            reduce: ReduceFunction::Mean,
            cmap: Colormap::named("Reds"),
            use_raw: None,
            options: PlotOptions::default(),
        }
    }
}

/// A color grid of variables (x) against the groups of `by` (y).
///
/// Each cell is the configured reduction of the variable's values over the
/// group's observations.
///
/// # Errors
/// Returns an error if raw data is forced but missing, `keys` is empty, a key
/// is not a variable of the resolved matrix, or `by` is not an observation
/// field.
pub fn heatmap<S: AsRef<str>>(
    adata: &AnnData,
    keys: &[S],
    by: &str,
    config: &HeatmapConfig,
) -> ScPlotResult<Figure> {
    let view = MatrixView::resolve(adata, config.use_raw)?;
    require_keys(keys)?;
    let values = variable_matrix(&view, keys)?;
    let grouping = obs_column(adata, by)?.grouping();
    let summary = summarize_by_group(values.view(), &grouping, config.reduce).summary;
    debug!(
        keys = keys.len(),
        groups = grouping.n_groups(),
        reduce = config.reduce.name(),
        "heatmap"
    );

    let defaults = PlotOptions {
        width: Some(700),
        height: Some(300),
        colorbar: Some(true),
        x_label: Some(String::new()),
        y_label: Some(by.to_string()),
        x_tick_rotation: Some(90.0),
        ..Default::default()
    };
    let style = PanelStyle::from_options(&config.options.merged_over(&defaults));
    let plot = HeatmapPlot::new(
        keys.iter().map(|k| k.as_ref().to_string()).collect(),
        grouping.labels().to_vec(),
        summary,
        config.cmap.clone(),
        style,
    )?;
    Ok(Figure::new().add_element(plot))
}
