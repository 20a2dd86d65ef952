//! Method-call access to the plotting operations.
//!
//! The free functions in [`crate::operations`] are the primary interface;
//! [`AnnDataPlotting`] lets callers write `adata.dotplot(...)` instead.

use super::dotplot::{DotplotConfig, dotplot};
use super::embedding::{EmbeddingConfig, embedding};
use super::heatmap::{HeatmapConfig, heatmap};
use super::plotting::Figure;
use super::scatter::{ScatterConfig, scatter};
use super::scatter_matrix::{ScatterMatrixConfig, scatter_matrix};
use super::violin::{ViolinConfig, violin};
use crate::{AnnData, ScPlotResult};

/// Plotting operations on an annotated matrix.
///
/// Every method borrows the data immutably and returns a fresh [`Figure`].
pub trait AnnDataPlotting {
    /// See [`violin`].
    fn violin<S: AsRef<str>>(&self, keys: &[S], config: &ViolinConfig) -> ScPlotResult<Figure>;

    /// See [`heatmap`].
    fn heatmap<S: AsRef<str>>(
        &self,
        keys: &[S],
        by: &str,
        config: &HeatmapConfig,
    ) -> ScPlotResult<Figure>;

    /// See [`scatter`].
    fn scatter(&self, x: &str, y: &str, config: &ScatterConfig) -> ScPlotResult<Figure>;

    /// See [`dotplot`].
    fn dotplot<S: AsRef<str>>(
        &self,
        keys: &[S],
        by: &str,
        config: &DotplotConfig,
    ) -> ScPlotResult<Figure>;

    /// See [`scatter_matrix`].
    fn scatter_matrix<S: AsRef<str>>(
        &self,
        keys: &[S],
        config: &ScatterMatrixConfig,
    ) -> ScPlotResult<Figure>;

    /// See [`embedding`].
    fn embedding<S: AsRef<str>>(
        &self,
        basis: &str,
        keys: &[S],
        config: &EmbeddingConfig,
    ) -> ScPlotResult<Figure>;
}

impl AnnDataPlotting for AnnData {
    fn violin<S: AsRef<str>>(&self, keys: &[S], config: &ViolinConfig) -> ScPlotResult<Figure> {
        violin(self, keys, config)
    }

    fn heatmap<S: AsRef<str>>(
        &self,
        keys: &[S],
        by: &str,
        config: &HeatmapConfig,
    ) -> ScPlotResult<Figure> {
        heatmap(self, keys, by, config)
    }

    fn scatter(&self, x: &str, y: &str, config: &ScatterConfig) -> ScPlotResult<Figure> {
        scatter(self, x, y, config)
    }

    fn dotplot<S: AsRef<str>>(
        &self,
        keys: &[S],
        by: &str,
        config: &DotplotConfig,
    ) -> ScPlotResult<Figure> {
        dotplot(self, keys, by, config)
    }

    fn scatter_matrix<S: AsRef<str>>(
        &self,
        keys: &[S],
        config: &ScatterMatrixConfig,
    ) -> ScPlotResult<Figure> {
        scatter_matrix(self, keys, config)
    }

    fn embedding<S: AsRef<str>>(
        &self,
        basis: &str,
        keys: &[S],
        config: &EmbeddingConfig,
    ) -> ScPlotResult<Figure> {
        embedding(self, basis, keys, config)
    }
}
