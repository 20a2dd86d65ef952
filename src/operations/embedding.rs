//! Embedding scatters: observations at their 2-D coordinates, one panel per
//! colored field.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::operations::plotting::{
    Colormap, ColorEncoding, Figure, MarkerSizes, PanelStyle, ScatterPlot, color_encoding,
};
use crate::operations::types::PlotOptions;
use crate::repr::AnnData;
use crate::views::{MatrixView, assemble_fields};
use crate::{ScPlotError, ScPlotResult};

/// Configuration for [`embedding`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Colors of categorical and numeric keys alike.
    pub cmap: Colormap,
    /// Marker opacity.
    pub alpha: f64,
    /// Marker size in pixels.
    pub size: f64,
    /// Panel width in pixels.
    pub width: usize,
    /// Panel height in pixels.
    pub height: usize,
    /// Panels per row.
    pub cols: usize,
    /// Read the raw matrix: `None` whenever one is attached, `Some(true)` requires it.
    pub use_raw: Option<bool>,
    /// Styling laid over this builder's defaults.
    pub options: PlotOptions,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            cmap: Colormap::named("viridis"),
            alpha: 1.0,
            size: 12.0,
            width: 400,
            height: 400,
            cols: 2,
            use_raw: None,
            options: PlotOptions::default(),
        }
    }
}

/// Scatter the observations on `obsm["X_<basis>"]`, one panel per key.
///
/// Each panel is titled and colored by its key. With no keys a single
/// uncolored panel titled `"None"` is drawn.
///
/// # Errors
/// Returns an error if raw data is forced but missing, the embedding is
/// missing or has fewer than two columns, or a key cannot be resolved.
pub fn embedding<S: AsRef<str>>(
    adata: &AnnData,
    basis: &str,
    keys: &[S],
    config: &EmbeddingConfig,
) -> ScPlotResult<Figure> {
    let view = MatrixView::resolve(adata, config.use_raw)?;
    let coords = adata
        .obsm(&format!("X_{basis}"))
        .ok_or_else(|| ScPlotError::EmbeddingNotFound(basis.to_string()))?;
    if coords.ncols() < 2 {
        return Err(ScPlotError::invalid_parameter(
            basis,
            format!("embedding has {} column(s), need at least 2", coords.ncols()),
        ));
    }
    let xs = coords.column(0).to_vec();
    let ys = coords.column(1).to_vec();
    let frame = assemble_fields(adata, &view, keys)?;
    debug!(basis, keys = keys.len(), raw = view.is_raw(), "embedding");

    let defaults = PlotOptions {
        width: Some(config.width),
        height: Some(config.height),
        alpha: Some(config.alpha),
        nonselection_alpha: Some(0.1),
        title_font_size: Some(9),
        padding: Some(0.02),
        show_x_axis: Some(false),
        show_y_axis: Some(false),
        x_label: Some(format!("{basis}1")),
        y_label: Some(format!("{basis}2")),
        box_select: Some(true),
        ..Default::default()
    };
    let options = config.options.merged_over(&defaults);
    let panel = |title: &str, color: Option<&str>| -> ScPlotResult<ScatterPlot> {
        let titled = PlotOptions {
            title: Some(title.to_string()),
            ..Default::default()
        };
        let style = PanelStyle::from_options(&options.merged_over(&titled));
        let color = match color {
            Some(key) => color_encoding(&frame, Some(key), &config.cmap, style.colorbar)?,
            None => ColorEncoding::Uniform,
        };
        ScatterPlot::new(xs.clone(), ys.clone(), style)?
            .with_color(color)?
            .with_sizes(MarkerSizes::Fixed(config.size))
    };

    let mut figure = Figure::new()
        .with_cols(config.cols)
        .with_box_select(options.box_select.unwrap_or(true));
    if keys.is_empty() {
        figure.push(panel("None", None)?);
    }
    for key in keys {
        let key = key.as_ref();
        figure.push(panel(key, Some(key))?);
    }
    Ok(figure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::operations::plotting::PlotElement;

    fn panel(figure: &Figure, i: usize) -> &ScatterPlot {
        figure.element::<ScatterPlot>(i).unwrap()
    }

    #[test]
    fn test_forced_raw_without_raw_fails() {
        let adata = fixtures::pbmc_like(false);
        let config = EmbeddingConfig {
            use_raw: Some(true),
            ..Default::default()
        };
        assert_eq!(
            embedding(&adata, "umap", &["louvain"], &config).unwrap_err(),
            ScPlotError::MissingRaw
        );
    }

    #[test]
    fn test_missing_basis() {
        let adata = fixtures::pbmc_like(false);
        let err = embedding(&adata, "pca", &["louvain"], &EmbeddingConfig::default()).unwrap_err();
        assert_eq!(err, ScPlotError::EmbeddingNotFound("pca".into()));
    }

    #[test]
    fn test_categorical_and_numeric_panels() {
        let adata = fixtures::pbmc_like(false);
        let figure = embedding(&adata, "umap", &["louvain", "n_genes"], &EmbeddingConfig::default()).unwrap();
        assert_eq!(figure.len(), 2);
        assert_eq!(figure.cols(), 2);
        assert!(figure.box_select());

        let categorical = panel(&figure, 0);
        assert!(!categorical.has_colorbar());
        assert!(matches!(categorical.color(), ColorEncoding::Categorical { .. }));
        assert_eq!(categorical.metadata().title.as_deref(), Some("louvain"));

        let numeric = panel(&figure, 1);
        assert!(numeric.has_colorbar());
        assert_eq!(numeric.points().0, &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(numeric.points().1, &[0.5, 1.5, 2.5, 3.5]);
        assert_eq!(numeric.sizes(), &MarkerSizes::Fixed(12.0));
        assert!(!numeric.x_axis().visible);
        assert_eq!(numeric.x_axis().label.as_deref(), Some("umap1"));
        assert_eq!(numeric.size(), (400, 400));
    }

    #[test]
    fn test_variable_colors_follow_the_resolved_view() {
        let adata = fixtures::pbmc_like(false);
        let figure = embedding(&adata, "umap", &["MS4A1"], &EmbeddingConfig::default()).unwrap();
        let ColorEncoding::Continuous { values, .. } = panel(&figure, 0).color() else {
            panic!("expected a continuous color");
        };
        assert_eq!(values, &[0.0, 2.0, 0.0, 4.0]);

        let adata = fixtures::pbmc_like(true);
        let figure = embedding(&adata, "umap", &["MS4A1"], &EmbeddingConfig::default()).unwrap();
        let ColorEncoding::Continuous { values, .. } = panel(&figure, 0).color() else {
            panic!("expected a continuous color");
        };
        assert_eq!(values, &[0.0, 20.0, 0.0, 40.0]);
    }

    #[test]
    fn test_hidden_axes_survive_past_eight_panels() {
        let adata = fixtures::pbmc_like(false);
        let figure = embedding(&adata, "umap", &["n_genes"; 9], &EmbeddingConfig::default()).unwrap();
        assert_eq!(figure.len(), 9);
        assert_eq!(panel(&figure, 8).style().nonselection_alpha, Some(0.1));

        let json: serde_json::Value = serde_json::from_str(&figure.to_json().unwrap()).unwrap();
        let layout = &json["layout"];
        assert_eq!(layout["xaxis9"]["visible"], false);
        assert_eq!(layout["yaxis9"]["visible"], false);
        assert!(layout["xaxis"]["domain"].is_array());
        assert_eq!(json["data"][8]["unselected"]["marker"]["opacity"], 0.1);
    }

    #[test]
    fn test_no_keys_draws_one_uncolored_panel() {
        let adata = fixtures::pbmc_like(false);
        let keys: [&str; 0] = [];
        let figure = embedding(&adata, "umap", &keys, &EmbeddingConfig::default()).unwrap();
        assert_eq!(figure.len(), 1);
        assert_eq!(panel(&figure, 0).metadata().title.as_deref(), Some("None"));
        assert_eq!(panel(&figure, 0).color(), &ColorEncoding::Uniform);
    }
}
