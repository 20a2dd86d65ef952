//! Shared steps turning resolved fields into plot elements.
//!
//! The plot functions differ in what they draw but pull their inputs the
//! same way: variables from the resolved matrix, grouping columns from the
//! observation table, color and size encodings from an assembled frame.

use ndarray::Array2;
use tracing::debug;

use super::colormap::Colormap;
use super::core::finite_extent;
use super::elements::{ColorEncoding, MarkerSizes};
use super::size::{SizeLegend, SizeScale, TickFormat};
use crate::obs::{Grouping, ObsColumn};
use crate::repr::AnnData;
use crate::views::{FieldFrame, MatrixView};
use crate::{ScPlotError, ScPlotResult};

/// Reject an empty key list.
///
/// # Errors
/// Returns [`ScPlotError::InvalidParameter`] when `keys` is empty.
pub fn require_keys<S: AsRef<str>>(keys: &[S]) -> ScPlotResult<()> {
    if keys.is_empty() {
        return Err(ScPlotError::invalid_parameter(
            "keys",
            "at least one key is required",
        ));
    }
    Ok(())
}

/// An observation column used for grouping or coloring.
///
/// # Errors
/// Returns [`ScPlotError::FieldNotFound`] if the table has no such column.
pub fn obs_column<'a>(adata: &'a AnnData, name: &str) -> ScPlotResult<&'a ObsColumn> {
    adata
        .obs()
        .get(name)
        .ok_or_else(|| ScPlotError::FieldNotFound(name.to_string()))
}

/// Dense observations × keys matrix of variables from the resolved view.
///
/// # Errors
/// Returns [`ScPlotError::FieldNotFound`] if a key is not a variable of the view.
pub fn variable_matrix<S: AsRef<str>>(view: &MatrixView<'_>, keys: &[S]) -> ScPlotResult<Array2<f64>> {
    let positions = keys
        .iter()
        .map(|key| {
            let key = key.as_ref();
            view.var()
                .position(key)
                .ok_or_else(|| ScPlotError::FieldNotFound(key.to_string()))
        })
        .collect::<ScPlotResult<Vec<usize>>>()?;
    debug!(n_vars = positions.len(), raw = view.is_raw(), "extracted variable matrix");
    Ok(view.x().columns(&positions))
}

/// Color encoding of an optional frame column.
///
/// # Errors
/// Returns an error if the column is missing or the colormap cannot serve it.
pub fn color_encoding(
    frame: &FieldFrame,
    color: Option<&str>,
    colormap: &Colormap,
    colorbar: bool,
) -> ScPlotResult<ColorEncoding> {
    let Some(name) = color else {
        return Ok(ColorEncoding::Uniform);
    };
    let column = frame
        .get(name)
        .ok_or_else(|| ScPlotError::FieldNotFound(name.to_string()))?;
    ColorEncoding::from_column(column, colormap, colorbar)
}

/// Values split by group, in group order. Ungrouped observations are dropped.
pub fn grouped_values(values: &[f64], grouping: &Grouping) -> Vec<(String, Vec<f64>)> {
    grouping
        .labels()
        .iter()
        .enumerate()
        .map(|(g, label)| {
            let members = grouping.members(g).into_iter().map(|i| values[i]).collect();
            (label.clone(), members)
        })
        .collect()
}

/// A numeric field mapped onto marker sizes, with its legend.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeEncoding {
    /// Per-point marker sizes.
    pub sizes: MarkerSizes,
    /// Side panel explaining the sizes.
    pub legend: SizeLegend,
    /// `"<field>: <value>"` per point.
    pub hover: Vec<String>,
}

/// Size points by `values` between `dot_min` and `dot_max` pixels.
///
/// The legend shows the minimum, midpoint and maximum of the field.
pub fn size_by_field(name: &str, values: &[f64], dot_min: f64, dot_max: f64) -> SizeEncoding {
    let (lo, hi) = finite_extent(values).unwrap_or((f64::NAN, f64::NAN));
    let scale = SizeScale::new((lo, hi), (dot_min, dot_max));
    let legend = SizeLegend::new(scale, vec![lo, (lo + hi) / 2.0, hi], TickFormat::Fixed1);
    let hover = values.iter().map(|v| format!("{name}: {v}")).collect();
    debug!(field = name, min = lo, max = hi, dot_min, dot_max, "size encoding");
    SizeEncoding {
        sizes: MarkerSizes::PerPoint(scale.map_all(values)),
        legend,
        hover,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::views::assemble_fields;

    #[test]
    fn test_empty_keys_are_rejected() {
        let keys: [&str; 0] = [];
        assert!(matches!(
            require_keys(&keys),
            Err(ScPlotError::InvalidParameter(_))
        ));
        assert!(require_keys(&["CD3D"]).is_ok());
    }

    #[test]
    fn test_variable_matrix_reads_the_resolved_view() {
        let adata = fixtures::pbmc_like(true);
        let view = MatrixView::resolve(&adata, None).unwrap();
        let x = variable_matrix(&view, &["GNLY", "CD3D"]).unwrap();
        assert_eq!(x.column(1).to_vec(), vec![10.0, 0.0, 30.0, 0.0]);
        assert_eq!(x.column(0).to_vec(), vec![0.0, 0.0, 1.0, 0.0]);

        let err = variable_matrix(&view, &["louvain"]).unwrap_err();
        assert_eq!(err, ScPlotError::FieldNotFound("louvain".into()));
    }

    #[test]
    fn test_grouped_values_follow_group_order() {
        let grouping = ObsColumn::text(&["b", "a", "b"]).grouping();
        let groups = grouped_values(&[1.0, 2.0, 3.0], &grouping);
        assert_eq!(
            groups,
            vec![("a".to_string(), vec![2.0]), ("b".to_string(), vec![1.0, 3.0])]
        );
    }

    #[test]
    fn test_size_by_field_hits_endpoints_exactly() {
        let encoding = size_by_field("n_genes", &[100.0, 200.0, 400.0], 2.0, 14.0);
        let MarkerSizes::PerPoint(px) = &encoding.sizes else {
            panic!("expected per-point sizes");
        };
        assert_eq!(px[0], 2.0);
        assert_eq!(px[2], 14.0);
        assert_eq!(encoding.legend.labels(), &["100.0", "250.0", "400.0"]);
        assert_eq!(encoding.hover[1], "n_genes: 200");
    }

    #[test]
    fn test_color_encoding_from_frame() {
        let adata = fixtures::pbmc_like(false);
        let view = MatrixView::resolve(&adata, None).unwrap();
        let frame = assemble_fields(&adata, &view, &["louvain", "n_genes"]).unwrap();
        let cmap = Colormap::named("viridis");

        assert!(matches!(
            color_encoding(&frame, Some("louvain"), &cmap, true).unwrap(),
            ColorEncoding::Categorical { .. }
        ));
        assert!(matches!(
            color_encoding(&frame, Some("n_genes"), &cmap, true).unwrap(),
            ColorEncoding::Continuous { colorbar: true, .. }
        ));
        assert_eq!(
            color_encoding(&frame, None, &cmap, true).unwrap(),
            ColorEncoding::Uniform
        );
    }
}
