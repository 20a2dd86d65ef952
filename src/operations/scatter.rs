//! Scatter plots of two fields, optionally colored and size-encoded.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::operations::plotting::{
    Colormap, Figure, MarkerSizes, PanelStyle, ScatterPlot, color_encoding, size_by_field,
};
use crate::operations::types::PlotOptions;
use crate::repr::AnnData;
use crate::views::{MatrixView, assemble_fields, numeric_field};
use crate::ScPlotResult;

/// Marker size of a scatter: one fixed pixel size or a numeric field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeBy {
    /// Every marker this many pixels across.
    Pixels(f64),
    /// Markers sized by a numeric field, between `dot_min` and `dot_max`.
    Field(String),
}

/// Configuration for [`scatter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterConfig {
    /// Field to color points by.
    pub color: Option<String>,
    /// Marker size; the renderer's default when unset.
    pub size: Option<SizeBy>,
    /// Pixel size of the smallest value of a size field.
    pub dot_min: f64,
    /// Pixel size of the largest value of a size field.
    pub dot_max: f64,
    /// Panel width in pixels.
    pub width: usize,
    /// Panel height in pixels.
    pub height: usize,
    /// Colormap; defaults to viridis for numbers and Category10 otherwise.
    pub cmap: Option<Colormap>,
    /// Read the raw matrix: `None` whenever one is attached, `Some(true)` requires it.
    pub use_raw: Option<bool>,
    /// Styling laid over this builder's defaults.
    pub options: PlotOptions,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            color: None,
            size: None,
            dot_min: 2.0,
            dot_max: 14.0,
            width: 300,
            height: 300,
            cmap: None,
            use_raw: None,
            options: PlotOptions::default(),
        }
    }
}

/// Scatter `y` against `x`.
///
/// Both axes and the color may name variables or observation fields. A size
/// field adds a legend panel beside the scatter.
///
/// # Errors
/// Returns an error if raw data is forced but missing, a field cannot be
/// resolved, or an axis or size field is not numeric.
pub fn scatter(adata: &AnnData, x: &str, y: &str, config: &ScatterConfig) -> ScPlotResult<Figure> {
    let view = MatrixView::resolve(adata, config.use_raw)?;
    let size_field = match &config.size {
        Some(SizeBy::Field(name)) => Some(name.as_str()),
        _ => None,
    };
    let mut names = vec![x, y];
    names.extend(config.color.as_deref());
    names.extend(size_field);
    let frame = assemble_fields(adata, &view, &names)?;
    debug!(x, y, color = config.color.as_deref(), size = size_field, "scatter");

    let defaults = PlotOptions {
        width: Some(config.width),
        height: Some(config.height),
        title_font_size: Some(9),
        padding: Some(0.02),
        show_x_axis: Some(true),
        show_y_axis: Some(true),
        alpha: Some(1.0),
        nonselection_alpha: Some(0.1),
        box_select: Some(true),
        x_label: Some(x.to_string()),
        y_label: Some(y.to_string()),
        ..Default::default()
    };
    let options = config.options.merged_over(&defaults);
    let style = PanelStyle::from_options(&options);

    let color = config.color.as_deref();
    let cmap = match (&config.cmap, color.and_then(|c| frame.get(c))) {
        (Some(cmap), _) => cmap.clone(),
        (None, column) => Colormap::default_for(column.is_some_and(|c| c.is_numeric())),
    };
    let color = color_encoding(&frame, color, &cmap, style.colorbar)?;

    let xs = numeric_field(&frame, x)?.to_vec();
    let ys = numeric_field(&frame, y)?.to_vec();
    let plot = ScatterPlot::new(xs, ys, style)?.with_color(color)?;

    let figure = Figure::new().with_box_select(options.box_select.unwrap_or(true));
    match (&config.size, size_field) {
        (_, Some(name)) => {
            let encoding = size_by_field(name, numeric_field(&frame, name)?, config.dot_min, config.dot_max);
            let plot = plot
                .with_sizes(encoding.sizes)?
                .with_hover_text(encoding.hover)?;
            Ok(figure.add_element(plot).add_element(encoding.legend).with_cols(2))
        }
        (Some(SizeBy::Pixels(px)), None) => {
            Ok(figure.add_element(plot.with_sizes(MarkerSizes::Fixed(*px))?).with_cols(1))
        }
        (_, None) => Ok(figure.add_element(plot).with_cols(1)),
    }
}
