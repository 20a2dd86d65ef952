//! Core annotated-matrix representation and data structures.
//!
//! This module provides the container every plotting operation reads from.
//! It pairs a numeric feature matrix (observations × variables) with an
//! observation metadata table, an optional raw alternate matrix and named
//! low-dimensional embeddings.
//!
//! # Architecture Overview
//!
//! - [`FeatureMatrix`] - dense (`ndarray`) or sparse (`nalgebra-sparse` CSR) storage
//! - [`RawData`] - an alternate matrix with its own variables, same observations
//! - [`AnnData`] - the annotated matrix tying everything together
//!
//! # Invariants
//!
//! Row counts of the primary matrix, the metadata table, the raw matrix and
//! every embedding are equal, and variable names are unique within a
//! matrix. Both are checked on construction, so plotting code can index
//! freely once it holds an `AnnData`.
//!
//! # Examples
//!
//! ```rust
//! use ndarray::array;
//! use scplot::{AnnData, ObsColumn, ObsTable};
//!
//! # fn example() -> scplot::ScPlotResult<()> {
//! let x = array![[0.0, 1.5], [2.0, 0.0], [1.0, 3.0]];
//! let obs = ObsTable::with_len(3).with_column("louvain", ObsColumn::categorical(&["0", "1", "0"]))?;
//! let adata = AnnData::new(x, obs, vec!["CD3D".into(), "MS4A1".into()])?
//!     .with_obsm("X_umap", array![[0.1, 0.2], [0.3, 0.4], [0.5, 0.6]])?;
//!
//! assert_eq!(adata.n_obs(), 3);
//! assert_eq!(adata.n_vars(), 2);
//! assert!(adata.raw().is_none());
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeMap, HashMap};

use nalgebra_sparse::CsrMatrix;
use ndarray::{Array1, Array2};
use num_traits::ToPrimitive;

use crate::obs::ObsTable;
use crate::{ScPlotError, ScPlotResult};

/// Numeric storage for a feature matrix, one row per observation.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureMatrix {
    /// Dense row-major storage.
    Dense(Array2<f64>),
    /// Compressed sparse row storage.
    Sparse(CsrMatrix<f64>),
}

impl FeatureMatrix {
    /// Dense matrix from any primitive numeric array.
    pub fn from_dense<T: ToPrimitive>(values: &Array2<T>) -> Self {
        FeatureMatrix::Dense(values.map(|v| v.to_f64().unwrap_or(f64::NAN)))
    }

    /// Number of observations (rows).
    pub fn nrows(&self) -> usize {
        match self {
            FeatureMatrix::Dense(m) => m.nrows(),
            FeatureMatrix::Sparse(m) => m.nrows(),
        }
    }

    /// Number of variables (columns).
    pub fn ncols(&self) -> usize {
        match self {
            FeatureMatrix::Dense(m) => m.ncols(),
            FeatureMatrix::Sparse(m) => m.ncols(),
        }
    }

    /// Whether the matrix uses sparse storage.
    pub const fn is_sparse(&self) -> bool {
        matches!(self, FeatureMatrix::Sparse(_))
    }

    /// Dense copy of column `j`, densifying sparse storage.
    ///
    /// # Panics
    /// Panics if `j` is out of bounds for dense storage.
    pub fn column(&self, j: usize) -> Array1<f64> {
        match self {
            FeatureMatrix::Dense(m) => m.column(j).to_owned(),
            FeatureMatrix::Sparse(m) => {
                let mut out = Array1::zeros(m.nrows());
                for (i, row) in m.row_iter().enumerate() {
                    if let Ok(pos) = row.col_indices().binary_search(&j) {
                        out[i] = row.values()[pos];
                    }
                }
                out
            }
        }
    }

    /// Dense copy of several columns, in the order given.
    pub fn columns(&self, js: &[usize]) -> Array2<f64> {
        let mut out = Array2::zeros((self.nrows(), js.len()));
        for (k, &j) in js.iter().enumerate() {
            out.column_mut(k).assign(&self.column(j));
        }
        out
    }
}

impl From<Array2<f64>> for FeatureMatrix {
    fn from(values: Array2<f64>) -> Self {
        FeatureMatrix::Dense(values)
    }
}

impl From<CsrMatrix<f64>> for FeatureMatrix {
    fn from(values: CsrMatrix<f64>) -> Self {
        FeatureMatrix::Sparse(values)
    }
}

/// Variable names with a name → column index lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Variables {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Variables {
    fn new(names: Vec<String>, ncols: usize) -> ScPlotResult<Self> {
        if names.len() != ncols {
            return Err(ScPlotError::DimensionMismatch(format!(
                "{} variable names for a matrix with {ncols} columns",
                names.len()
            )));
        }
        let mut index = HashMap::with_capacity(names.len());
        for (j, name) in names.iter().enumerate() {
            if index.insert(name.clone(), j).is_some() {
                return Err(ScPlotError::invalid_parameter(
                    "var_names",
                    format!("duplicate variable name '{name}'"),
                ));
            }
        }
        Ok(Self { names, index })
    }

    /// Variable names in column order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Column index of a variable.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Whether the variable exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether there are no variables.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// The raw alternate matrix: typically unfiltered, unscaled counts.
#[derive(Debug, Clone, PartialEq)]
pub struct RawData {
    x: FeatureMatrix,
    var: Variables,
}

impl RawData {
    /// Build a raw matrix.
    ///
    /// # Errors
    /// Returns an error if the names don't match the column count or repeat.
    pub fn new(x: impl Into<FeatureMatrix>, var_names: Vec<String>) -> ScPlotResult<Self> {
        let x = x.into();
        let var = Variables::new(var_names, x.ncols())?;
        Ok(Self { x, var })
    }

    /// The raw feature matrix.
    pub const fn x(&self) -> &FeatureMatrix {
        &self.x
    }

    /// The raw variables.
    pub const fn var(&self) -> &Variables {
        &self.var
    }
}

/// An annotated data matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnData {
    x: FeatureMatrix,
    var: Variables,
    obs: ObsTable,
    raw: Option<RawData>,
    obsm: BTreeMap<String, Array2<f64>>,
}

impl AnnData {
    /// Build an annotated matrix from a feature matrix, its metadata table and variable names.
    ///
    /// # Errors
    /// Returns an error if the metadata rows don't match the matrix rows or
    /// the variable names don't match its columns.
    pub fn new(
        x: impl Into<FeatureMatrix>,
        obs: ObsTable,
        var_names: Vec<String>,
    ) -> ScPlotResult<Self> {
        let x = x.into();
        if obs.len() != x.nrows() {
            return Err(ScPlotError::DimensionMismatch(format!(
                "observation table has {} rows but the matrix has {}",
                obs.len(),
                x.nrows()
            )));
        }
        let var = Variables::new(var_names, x.ncols())?;
        Ok(Self {
            x,
            var,
            obs,
            raw: None,
            obsm: BTreeMap::new(),
        })
    }

    /// Attach a raw alternate matrix.
    ///
    /// # Errors
    /// Returns an error if the raw matrix has a different number of observations.
    pub fn with_raw(mut self, raw: RawData) -> ScPlotResult<Self> {
        if raw.x.nrows() != self.n_obs() {
            return Err(ScPlotError::DimensionMismatch(format!(
                "raw matrix has {} rows but the annotated matrix has {}",
                raw.x.nrows(),
                self.n_obs()
            )));
        }
        self.raw = Some(raw);
        Ok(self)
    }

    /// Attach an embedding under `key` (conventionally `X_<basis>`).
    ///
    /// # Errors
    /// Returns an error if the coordinates have a different number of observations.
    pub fn with_obsm(mut self, key: &str, coords: Array2<f64>) -> ScPlotResult<Self> {
        if coords.nrows() != self.n_obs() {
            return Err(ScPlotError::DimensionMismatch(format!(
                "embedding '{key}' has {} rows but the annotated matrix has {}",
                coords.nrows(),
                self.n_obs()
            )));
        }
        self.obsm.insert(key.to_string(), coords);
        Ok(self)
    }

    /// Number of observations.
    pub fn n_obs(&self) -> usize {
        self.x.nrows()
    }

    /// Number of variables in the primary matrix.
    pub fn n_vars(&self) -> usize {
        self.x.ncols()
    }

    /// The primary feature matrix.
    pub const fn x(&self) -> &FeatureMatrix {
        &self.x
    }

    /// The primary variables.
    pub const fn var(&self) -> &Variables {
        &self.var
    }

    /// Variable names of the primary matrix.
    pub fn var_names(&self) -> &[String] {
        self.var.names()
    }

    /// Observation metadata.
    pub const fn obs(&self) -> &ObsTable {
        &self.obs
    }

    /// Observation names.
    pub fn obs_names(&self) -> &[String] {
        self.obs.index()
    }

    /// The raw alternate, when stored.
    pub const fn raw(&self) -> Option<&RawData> {
        self.raw.as_ref()
    }

    /// Embedding coordinates stored under `key`.
    pub fn obsm(&self, key: &str) -> Option<&Array2<f64>> {
        self.obsm.get(key)
    }

    /// Names of stored embeddings.
    pub fn obsm_keys(&self) -> impl Iterator<Item = &str> {
        self.obsm.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sparse_example() -> CsrMatrix<f64> {
        // [[0, 2, 0], [1, 0, 3]]
        CsrMatrix::try_from_csr_data(2, 3, vec![0, 1, 3], vec![1, 0, 2], vec![2.0, 1.0, 3.0])
            .expect("valid csr")
    }

    #[test]
    fn test_sparse_column_densifies() {
        let m = FeatureMatrix::from(sparse_example());
        assert!(m.is_sparse());
        assert_eq!(m.column(0), array![0.0, 1.0]);
        assert_eq!(m.column(1), array![2.0, 0.0]);
        assert_eq!(m.column(2), array![0.0, 3.0]);
    }

    #[test]
    fn test_dense_and_sparse_columns_agree() {
        let dense = FeatureMatrix::Dense(array![[0.0, 2.0, 0.0], [1.0, 0.0, 3.0]]);
        let sparse = FeatureMatrix::from(sparse_example());
        assert_eq!(dense.columns(&[2, 0]), sparse.columns(&[2, 0]));
    }

    #[test]
    fn test_from_dense_converts_integers() {
        let m = FeatureMatrix::from_dense(&array![[1i32, 2], [3, 4]]);
        assert_eq!(m.column(1), array![2.0, 4.0]);
    }

    #[test]
    fn test_new_rejects_misaligned_obs() {
        let err = AnnData::new(array![[1.0], [2.0]], ObsTable::with_len(3), vec!["g".into()])
            .unwrap_err();
        assert!(matches!(err, ScPlotError::DimensionMismatch(_)));
    }

    #[test]
    fn test_new_rejects_duplicate_variables() {
        let err = AnnData::new(
            array![[1.0, 2.0]],
            ObsTable::with_len(1),
            vec!["g".into(), "g".into()],
        )
        .unwrap_err();
        assert!(matches!(err, ScPlotError::InvalidParameter(_)));
    }

    #[test]
    fn test_with_raw_and_obsm_check_rows() {
        let adata = AnnData::new(array![[1.0], [2.0]], ObsTable::with_len(2), vec!["g".into()])
            .unwrap();
        let raw = RawData::new(array![[1.0]], vec!["g".into()]).unwrap();
        assert!(adata.clone().with_raw(raw).is_err());
        assert!(adata.clone().with_obsm("X_pca", array![[0.0, 1.0]]).is_err());

        let adata = adata.with_obsm("X_pca", array![[0.0, 1.0], [1.0, 0.0]]).unwrap();
        assert_eq!(adata.obsm_keys().collect::<Vec<_>>(), vec!["X_pca"]);
        assert_eq!(adata.var().position("g"), Some(0));
    }
}
