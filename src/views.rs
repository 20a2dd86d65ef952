//! Read-only views over an annotated matrix.
//!
//! Every plotting operation starts the same way: decide once whether to read
//! variables from the primary matrix or from its raw alternate, then resolve
//! each requested key to either a variable column or an observation field.
//! [`MatrixView`] captures the first decision and [`Field`] the second.

use ndarray::Array1;
use tracing::debug;

use crate::obs::{ObsColumn, ObsTable};
use crate::repr::{AnnData, FeatureMatrix, Variables};
use crate::{ScPlotError, ScPlotResult};

/// The matrix a plotting call reads variables from.
#[derive(Debug, Clone, Copy)]
pub struct MatrixView<'a> {
    x: &'a FeatureMatrix,
    var: &'a Variables,
    is_raw: bool,
}

impl<'a> MatrixView<'a> {
    /// Resolve the source matrix for a call.
    ///
    /// - `None`: the raw alternate when one is stored, else the primary matrix
    /// - `Some(true)`: the raw alternate, failing when absent
    /// - `Some(false)`: the primary matrix
    ///
    /// # Errors
    /// Returns [`ScPlotError::MissingRaw`] if raw data is forced but not stored.
    pub fn resolve(adata: &'a AnnData, use_raw: Option<bool>) -> ScPlotResult<Self> {
        let view = match (use_raw, adata.raw()) {
            (Some(true), None) => return Err(ScPlotError::MissingRaw),
            (Some(true) | None, Some(raw)) => Self {
                x: raw.x(),
                var: raw.var(),
                is_raw: true,
            },
            (Some(false), _) | (None, None) => Self {
                x: adata.x(),
                var: adata.var(),
                is_raw: false,
            },
        };
        debug!(?use_raw, is_raw = view.is_raw, "resolved matrix view");
        Ok(view)
    }

    /// Whether this view reads the raw alternate.
    pub const fn is_raw(&self) -> bool {
        self.is_raw
    }

    /// The underlying matrix.
    pub const fn x(&self) -> &'a FeatureMatrix {
        self.x
    }

    /// The variables of the underlying matrix.
    pub const fn var(&self) -> &'a Variables {
        self.var
    }

    /// Dense values of a variable, if it exists in this view.
    pub fn variable(&self, name: &str) -> Option<Array1<f64>> {
        self.var.position(name).map(|j| self.x.column(j))
    }
}

/// A resolved key: either a variable column or an observation field.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// Dense values of a variable from the resolved matrix.
    Variable(Array1<f64>),
    /// An observation metadata column, typing preserved.
    Observation(ObsColumn),
}

impl Field {
    /// Resolve `name`, preferring the variable interpretation.
    ///
    /// # Errors
    /// Returns [`ScPlotError::FieldNotFound`] if `name` is neither.
    pub fn lookup(adata: &AnnData, view: &MatrixView<'_>, name: &str) -> ScPlotResult<Self> {
        if let Some(values) = view.variable(name) {
            debug!(field = name, raw = view.is_raw(), "field resolved to variable");
            return Ok(Field::Variable(values));
        }
        match adata.obs().get(name) {
            Some(column) => {
                debug!(field = name, "field resolved to observation");
                Ok(Field::Observation(column.clone()))
            }
            None => Err(ScPlotError::FieldNotFound(name.to_string())),
        }
    }

    /// Whether this field came from the feature matrix.
    pub const fn is_variable(&self) -> bool {
        matches!(self, Field::Variable(_))
    }

    /// The values as a table column; variables become numeric columns.
    pub fn into_column(self) -> ObsColumn {
        match self {
            Field::Variable(values) => ObsColumn::Numeric(values.to_vec()),
            Field::Observation(column) => column,
        }
    }
}

/// Resolved fields assembled column by column, indexed by observation.
pub type FieldFrame = ObsTable;

/// Resolve every name and assemble one table indexed by observation.
///
/// Repeated names are resolved once.
///
/// # Errors
/// Returns an error if any name cannot be resolved.
pub fn assemble_fields<S: AsRef<str>>(
    adata: &AnnData,
    view: &MatrixView<'_>,
    names: &[S],
) -> ScPlotResult<FieldFrame> {
    let mut frame = FieldFrame::new(adata.obs_names());
    for name in names {
        let name = name.as_ref();
        if frame.contains(name) {
            continue;
        }
        let column = Field::lookup(adata, view, name)?.into_column();
        frame.insert(name, column)?;
    }
    Ok(frame)
}

/// Borrow a numeric column of an assembled table.
///
/// # Errors
/// Returns an error if the column is missing or not numeric.
pub fn numeric_field<'t>(frame: &'t FieldFrame, name: &str) -> ScPlotResult<&'t [f64]> {
    let column = frame
        .get(name)
        .ok_or_else(|| ScPlotError::FieldNotFound(name.to_string()))?;
    column.as_numeric().ok_or_else(|| {
        ScPlotError::invalid_parameter(name, "field must be numeric to be used here")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use ndarray::array;

    #[test]
    fn test_forced_raw_without_raw_fails() {
        let adata = fixtures::pbmc_like(false);
        let err = MatrixView::resolve(&adata, Some(true)).unwrap_err();
        assert_eq!(err, ScPlotError::MissingRaw);
    }

    #[test]
    fn test_auto_prefers_raw_when_present() {
        let with_raw = fixtures::pbmc_like(true);
        assert!(MatrixView::resolve(&with_raw, None).unwrap().is_raw());
        assert!(!MatrixView::resolve(&with_raw, Some(false)).unwrap().is_raw());

        let without_raw = fixtures::pbmc_like(false);
        assert!(!MatrixView::resolve(&without_raw, None).unwrap().is_raw());
    }

    #[test]
    fn test_auto_view_reads_raw_values() {
        let adata = fixtures::pbmc_like(true);
        let view = MatrixView::resolve(&adata, None).unwrap();
        assert_eq!(
            view.variable("CD3D").unwrap(),
            array![10.0, 0.0, 30.0, 0.0]
        );
    }

    #[test]
    fn test_variable_takes_precedence_over_observation() {
        let adata = fixtures::pbmc_like(false);
        let view = MatrixView::resolve(&adata, None).unwrap();
        // "MS4A1" is both a variable and an observation column in the fixture.
        let field = Field::lookup(&adata, &view, "MS4A1").unwrap();
        assert!(field.is_variable());
        assert_eq!(field, Field::Variable(array![0.0, 2.0, 0.0, 4.0]));
    }

    #[test]
    fn test_observation_field_keeps_type() {
        let adata = fixtures::pbmc_like(false);
        let view = MatrixView::resolve(&adata, None).unwrap();
        let field = Field::lookup(&adata, &view, "louvain").unwrap();
        assert!(matches!(field, Field::Observation(ObsColumn::Categorical(_))));
    }

    #[test]
    fn test_unknown_field_is_reported() {
        let adata = fixtures::pbmc_like(false);
        let view = MatrixView::resolve(&adata, None).unwrap();
        let err = Field::lookup(&adata, &view, "nope").unwrap_err();
        assert_eq!(err, ScPlotError::FieldNotFound("nope".into()));
    }

    #[test]
    fn test_assemble_fields_mixes_sources() {
        let adata = fixtures::pbmc_like(false);
        let view = MatrixView::resolve(&adata, None).unwrap();
        let frame = assemble_fields(&adata, &view, &["CD3D", "n_genes", "CD3D"]).unwrap();
        assert_eq!(frame.column_names().collect::<Vec<_>>(), vec!["CD3D", "n_genes"]);
        assert_eq!(numeric_field(&frame, "CD3D").unwrap(), &[1.0, 0.0, 3.0, 0.0]);
        assert_eq!(frame.index(), adata.obs_names());
    }
}
