//! Pairwise scatter matrices with per-field histograms on the diagonal.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::operations::plotting::{
    Colormap, Figure, HistogramPlot, PanelStyle, ScatterPlot, color_encoding, require_keys,
};
use crate::operations::types::PlotOptions;
use crate::repr::AnnData;
use crate::views::{MatrixView, assemble_fields, numeric_field};
use crate::{ScPlotError, ScPlotResult};

/// Configuration for [`scatter_matrix`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterMatrixConfig {
    /// Observation field to color points by.
    pub color: Option<String>,
    /// Colormap; defaults to viridis for numbers and Category10 otherwise.
    pub cmap: Option<Colormap>,
    /// Read the raw matrix: `None` whenever one is attached, `Some(true)` requires it.
    pub use_raw: Option<bool>,
    /// Styling laid over this builder's defaults.
    pub options: PlotOptions,
}

/// An n×n grid over `keys`: histograms on the diagonal, `keys[row]` against
/// `keys[col]` everywhere else.
///
/// Axis labels are drawn on the outer panels only, and the colorbar or
/// legend on the first scatter.
///
/// # Errors
/// Returns [`ScPlotError::NotImplemented`] if `color` names a variable of the
/// resolved matrix; otherwise the errors of field resolution.
pub fn scatter_matrix<S: AsRef<str>>(
    adata: &AnnData,
    keys: &[S],
    config: &ScatterMatrixConfig,
) -> ScPlotResult<Figure> {
    let view = MatrixView::resolve(adata, config.use_raw)?;
    let color = config.color.as_deref();
    if let Some(name) = color
        && view.var().contains(name)
    {
        return Err(ScPlotError::NotImplemented(format!(
            "coloring a scatter matrix by the variable {name:?}"
        )));
    }
    require_keys(keys)?;

    let keys: Vec<&str> = keys.iter().map(|k| k.as_ref()).collect();
    let mut names = keys.clone();
    names.extend(color);
    let frame = assemble_fields(adata, &view, &names)?;
    let values = keys
        .iter()
        .map(|key| numeric_field(&frame, key))
        .collect::<ScPlotResult<Vec<_>>>()?;
    let cmap = match (&config.cmap, color.and_then(|c| frame.get(c))) {
        (Some(cmap), _) => cmap.clone(),
        (None, column) => Colormap::default_for(column.is_some_and(|c| c.is_numeric())),
    };

    let n = keys.len();
    debug!(n, color, raw = view.is_raw(), "scatter matrix");
    let defaults = PlotOptions {
        width: Some(200),
        height: Some(200),
        padding: Some(0.02),
        alpha: Some(1.0),
        box_select: Some(true),
        ..Default::default()
    };
    let options = config.options.merged_over(&defaults);
    let base = PanelStyle::from_options(&options);
    // the first off-diagonal panel carries the colorbar and the legend
    let key_panel = if n > 1 { 1 } else { 0 };

    let mut figure = Figure::new()
        .with_cols(n)
        .with_box_select(options.box_select.unwrap_or(true));
    for row in 0..n {
        for col in 0..n {
            let index = row * n + col;
            let mut style = base.clone();
            style.metadata.x_label = (row + 1 == n).then(|| keys[col].to_string());
            style.metadata.y_label = (col == 0).then(|| keys[row].to_string());
            style.show_legend = base.show_legend && index == key_panel;
            let encoding = color_encoding(&frame, color, &cmap, base.colorbar && index == key_panel)?;

            if row == col {
                figure.push(HistogramPlot::new(values[col].to_vec(), style).with_color(encoding)?);
            } else {
                let plot = ScatterPlot::new(values[col].to_vec(), values[row].to_vec(), style)?
                    .with_color(encoding)?;
                figure.push(plot);
            }
        }
    }
    Ok(figure)
}
