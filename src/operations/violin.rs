//! Violin plots of variables or numeric observation fields.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::operations::plotting::{
    Colormap, Figure, PanelStyle, ViolinGroup, ViolinPlot, grouped_values, obs_column,
    require_keys,
};
use crate::operations::types::PlotOptions;
use crate::repr::AnnData;
use crate::views::{Field, MatrixView};
use crate::{ScPlotError, ScPlotResult};

/// Configuration for [`violin`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViolinConfig {
    /// Observation field to split each panel by.
    pub by: Option<String>,
    /// Panel width in pixels.
    pub width: usize,
    /// Colors of the groups.
    pub cmap: Colormap,
    /// Panels per row.
    pub cols: usize,
    /// Read the raw matrix: `None` whenever one is attached, `Some(true)` requires it.
    pub use_raw: Option<bool>,
    /// Styling laid over this builder's defaults.
    pub options: PlotOptions,
}

impl Default for ViolinConfig {
    fn default() -> Self {
        Self {
            by: None,
            width: 200,
            cmap: Colormap::named("Category20"),
            cols: 3,
            use_raw: None,
            options: PlotOptions::default(),
        }
    }
}

/// One violin panel per key.
///
/// Keys naming a variable read it from the resolved matrix; other keys must
/// be numeric observation fields. With `by` set, each panel holds one violin
/// per group of that observation field.
///
/// # Errors
/// Returns an error if raw data is forced but missing, `keys` is empty, a key
/// or `by` cannot be resolved, or a key names a non-numeric field.
pub fn violin<S: AsRef<str>>(
    adata: &AnnData,
    keys: &[S],
    config: &ViolinConfig,
) -> ScPlotResult<Figure> {
    let view = MatrixView::resolve(adata, config.use_raw)?;
    require_keys(keys)?;
    let by = config.by.as_deref();
    let grouping = by.map(|name| obs_column(adata, name)).transpose()?.map(|c| c.grouping());
    let colors = config
        .cmap
        .categorical_colors(grouping.as_ref().map_or(1, |g| g.n_groups()))?;
    debug!(keys = keys.len(), by, raw = view.is_raw(), "violin");

    let mut figure = Figure::new().with_cols(config.cols);
    for key in keys {
        let key = key.as_ref();
        let values = match Field::lookup(adata, &view, key)? {
            Field::Variable(values) => values.to_vec(),
            Field::Observation(column) => column
                .as_numeric()
                .ok_or_else(|| {
                    ScPlotError::invalid_parameter(key, "violin values must be numeric")
                })?
                .to_vec(),
        };

        let groups = match &grouping {
            Some(grouping) => grouped_values(&values, grouping)
                .into_iter()
                .zip(&colors)
                .map(|((label, values), color)| ViolinGroup {
                    label,
                    values,
                    color: color.clone(),
                })
                .collect(),
            None => vec![ViolinGroup {
                label: key.to_string(),
                values,
                color: colors[0].clone(),
            }],
        };

        let defaults = PlotOptions {
            width: Some(config.width),
            height: Some(300),
            padding: Some(0.02),
            x_label: Some(by.unwrap_or_default().to_string()),
            y_label: Some(key.to_string()),
            ..Default::default()
        };
        let style = PanelStyle::from_options(&config.options.merged_over(&defaults));
        figure.push(ViolinPlot::new(groups, style));
    }
    Ok(figure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::operations::plotting::PlotElement;

    fn panel(figure: &Figure, i: usize) -> &ViolinPlot {
        figure.element::<ViolinPlot>(i).unwrap()
    }

    #[test]
    fn test_forced_raw_without_raw_fails() {
        let adata = fixtures::pbmc_like(false);
        let config = ViolinConfig {
            use_raw: Some(true),
            ..Default::default()
        };
        assert_eq!(
            violin(&adata, &["CD3D"], &config).unwrap_err(),
            ScPlotError::MissingRaw
        );
    }

    #[test]
    fn test_auto_reads_raw_when_present() {
        let adata = fixtures::pbmc_like(true);
        let figure = violin(&adata, &["CD3D"], &ViolinConfig::default()).unwrap();
        assert_eq!(panel(&figure, 0).groups()[0].values, vec![10.0, 0.0, 30.0, 0.0]);
    }

    #[test]
    fn test_split_by_group() {
        let adata = fixtures::pbmc_like(false);
        let config = ViolinConfig {
            by: Some("louvain".into()),
            ..Default::default()
        };
        let figure = violin(&adata, &["CD3D", "n_genes"], &config).unwrap();
        assert_eq!(figure.len(), 2);

        let groups = panel(&figure, 0).groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "0");
        assert_eq!(groups[0].values, vec![1.0, 3.0]);
        assert_eq!(groups[1].values, vec![0.0, 0.0]);
        assert_ne!(groups[0].color, groups[1].color);

        assert_eq!(panel(&figure, 1).groups()[1].values, vec![200.0, 400.0]);
    }

    #[test]
    fn test_variable_wins_over_observation() {
        let adata = fixtures::pbmc_like(false);
        let figure = violin(&adata, &["MS4A1"], &ViolinConfig::default()).unwrap();
        assert_eq!(panel(&figure, 0).groups()[0].values, vec![0.0, 2.0, 0.0, 4.0]);
    }

    #[test]
    fn test_non_numeric_field_is_rejected() {
        let adata = fixtures::pbmc_like(false);
        let err = violin(&adata, &["batch"], &ViolinConfig::default()).unwrap_err();
        assert!(matches!(err, ScPlotError::InvalidParameter(_)));
    }

    #[test]
    fn test_panels_follow_layout_and_size() {
        let adata = fixtures::pbmc_like(false);
        let config = ViolinConfig {
            cols: 2,
            options: PlotOptions {
                height: Some(250),
                ..Default::default()
            },
            ..Default::default()
        };
        let figure = violin(&adata, &["CD3D", "LYZ", "n_genes"], &config).unwrap();
        assert_eq!(figure.grid_shape(), (2, 2));
        assert_eq!(panel(&figure, 2).size(), (200, 250));
    }
}
