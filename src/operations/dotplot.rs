//! Dot plots: per-group summaries colored by value and sized by how many
//! observations express the variable.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::operations::plotting::{
    Colormap, DotCell, DotPlot, Figure, PanelStyle, SizeLegend, SizeScale, TickFormat,
    fraction_ticks, obs_column, require_keys, variable_matrix,
};
use crate::operations::statistics::summarize_by_group;
use crate::operations::types::{PlotOptions, ReduceFunction};
use crate::repr::AnnData;
use crate::views::MatrixView;
use crate::ScPlotResult;

/// Configuration for [`dotplot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DotplotConfig {
    /// Summary mapped to color.
    pub reduce: ReduceFunction,
    /// Fraction drawn at `dot_min`.
    pub fraction_min: f64,
    /// Fraction drawn at `dot_max`; the largest observed fraction if unset.
    pub fraction_max: Option<f64>,
    /// Pixel size at `fraction_min`.
    pub dot_min: f64,
    /// Pixel size at `fraction_max`.
    pub dot_max: f64,
    /// Color scale of the summary.
    pub cmap: Colormap,
    /// Read the raw matrix: `None` whenever one is attached, `Some(true)` requires it.
    pub use_raw: Option<bool>,
    /// Styling laid over this builder's defaults.
    pub options: PlotOptions,
}

impl Default for DotplotConfig {
    fn default() -> Self {
        Self {
            reduce: ReduceFunction::Mean,
            fraction_min: 0.0,
            fraction_max: None,
            dot_min: 0.0,
            dot_max: 14.0,
            cmap: Colormap::named("Reds"),
            use_raw: None,
            options: PlotOptions::default(),
        }
    }
}

/// One dot per (variable, group of `by`), with a fraction legend beside it.
///
/// # Errors
/// Returns an error if raw data is forced but missing, `keys` is empty, a key
/// is not a variable of the resolved matrix, or `by` is not an observation
/// field.
pub fn dotplot<S: AsRef<str>>(
    adata: &AnnData,
    keys: &[S],
    by: &str,
    config: &DotplotConfig,
) -> ScPlotResult<Figure> {
    let view = MatrixView::resolve(adata, config.use_raw)?;
    require_keys(keys)?;
    let values = variable_matrix(&view, keys)?;
    let grouping = obs_column(adata, by)?.grouping();
    let summary = summarize_by_group(values.view(), &grouping, config.reduce);

    let fraction_max = config.fraction_max.unwrap_or_else(|| {
        summary
            .fraction
            .iter()
            .copied()
            .filter(|f| f.is_finite())
            .fold(f64::NEG_INFINITY, f64::max)
    });
    let scale = SizeScale::new(
        (config.fraction_min, fraction_max),
        (config.dot_min, config.dot_max),
    );
    debug!(
        keys = keys.len(),
        groups = grouping.n_groups(),
        fraction_min = config.fraction_min,
        fraction_max,
        "dotplot"
    );

    let (n_groups, n_vars) = summary.summary.dim();
    let cells = (0..n_groups)
        .flat_map(|group| (0..n_vars).map(move |variable| (group, variable)))
        .map(|(group, variable)| {
            let fraction = summary.fraction[[group, variable]];
            DotCell {
                variable,
                group,
                summary: summary.summary[[group, variable]],
                fraction,
                pixels: scale.map(fraction),
            }
        })
        .collect();

    // Computed sizes are defaults only; the caller's width and height win.
    let defaults = PlotOptions {
        width: Some((config.dot_max * n_vars as f64 + 150.0).ceil() as usize),
        height: Some((config.dot_max * n_groups as f64 + 100.0).ceil() as usize),
        padding: Some(0.0),
        x_tick_rotation: Some(90.0),
        x_label: Some(String::new()),
        y_label: Some(by.to_string()),
        ..Default::default()
    };
    let style = PanelStyle::from_options(&config.options.merged_over(&defaults));
    let plot = DotPlot::new(
        cells,
        keys.iter().map(|k| k.as_ref().to_string()).collect(),
        grouping.labels().to_vec(),
        config.reduce.name(),
        config.cmap.clone(),
        style,
    )?;
    let legend = SizeLegend::new(
        scale,
        fraction_ticks(config.fraction_min, fraction_max),
        TickFormat::Percent,
    );
    Ok(Figure::new().add_element(plot).add_element(legend).with_cols(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::operations::plotting::PlotElement;
    use crate::ScPlotError;
    use approx_eq::assert_approx_eq;

    fn panel(figure: &Figure) -> &DotPlot {
        figure.element::<DotPlot>(0).unwrap()
    }

    #[test]
    fn test_forced_raw_without_raw_fails() {
        let adata = fixtures::pbmc_like(false);
        let config = DotplotConfig {
            use_raw: Some(true),
            ..Default::default()
        };
        assert_eq!(
            dotplot(&adata, &["CD3D"], "louvain", &config).unwrap_err(),
            ScPlotError::MissingRaw
        );
    }

    #[test]
    fn test_two_by_two_aggregation() {
        let adata = fixtures::pbmc_like(false);
        let figure = dotplot(&adata, &["CD3D", "MS4A1"], "louvain", &DotplotConfig::default()).unwrap();
        let plot = panel(&figure);
        assert_eq!(plot.cells().len(), 4);
        assert_eq!(plot.groups(), &["0", "1"]);

        let cd3d_0 = plot.cell(0, 0).unwrap();
        assert_approx_eq!(cd3d_0.summary, 2.0, 1e-12);
        assert_eq!(cd3d_0.fraction, 1.0);
        assert_eq!(cd3d_0.pixels, 14.0);

        let cd3d_1 = plot.cell(0, 1).unwrap();
        assert_eq!(cd3d_1.summary, 0.0);
        assert_eq!(cd3d_1.fraction, 0.0);
        assert_eq!(cd3d_1.pixels, 0.0);

        let ms4a1_0 = plot.cell(1, 0).unwrap();
        assert_eq!(ms4a1_0.summary, 0.0);
        assert_eq!(ms4a1_0.pixels, 0.0);

        let ms4a1_1 = plot.cell(1, 1).unwrap();
        assert_approx_eq!(ms4a1_1.summary, 3.0, 1e-12);
        assert_eq!(ms4a1_1.fraction, 1.0);

        assert_eq!(plot.size(), (178, 128));
        assert_eq!(plot.y_axis().label.as_deref(), Some("louvain"));
    }

    #[test]
    fn test_cells_are_group_major() {
        let adata = fixtures::pbmc_like(false);
        let figure = dotplot(&adata, &["CD3D", "MS4A1"], "louvain", &DotplotConfig::default()).unwrap();
        let order: Vec<(usize, usize)> = panel(&figure)
            .cells()
            .iter()
            .map(|c| (c.group, c.variable))
            .collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn test_fraction_legend_beside_panel() {
        let adata = fixtures::pbmc_like(false);
        let figure = dotplot(&adata, &["CD3D"], "louvain", &DotplotConfig::default()).unwrap();
        assert_eq!(figure.len(), 2);
        assert_eq!(figure.cols(), 2);

        let legend = figure.element::<SizeLegend>(1).unwrap();
        assert_eq!(legend.labels()[0], "20%");
        assert_approx_eq!(legend.pixels()[0], 2.8, 1e-9);
    }

    #[test]
    fn test_caller_size_overrides_computed_size() {
        let adata = fixtures::pbmc_like(true);
        let config = DotplotConfig {
            options: PlotOptions {
                width: Some(500),
                ..Default::default()
            },
            ..Default::default()
        };
        let figure = dotplot(&adata, &["CD3D"], "louvain", &config).unwrap();
        let plot = panel(&figure);
        assert_eq!(plot.size(), (500, 128));
        assert_approx_eq!(plot.cell(0, 0).unwrap().summary, 20.0, 1e-12);

        let config = DotplotConfig {
            options: PlotOptions {
                height: Some(90),
                ..Default::default()
            },
            ..Default::default()
        };
        let figure = dotplot(&adata, &["CD3D"], "louvain", &config).unwrap();
        assert_eq!(panel(&figure).size(), (164, 90));
    }
}
