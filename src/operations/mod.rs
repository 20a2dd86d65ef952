//! Plotting operations on annotated matrices.
//!
//! Each operation resolves the matrix to read (raw or primary), pulls the
//! requested fields, merges the caller's [`PlotOptions`] over its own
//! defaults and composes the resulting panels into a
//! [`Figure`](plotting::Figure).
//!
//! ## Module Organization
//!
//! - [`violin`] - Value distributions per key, optionally split by group
//! - [`heatmap`] - Grouped summaries as a color grid
//! - [`scatter`] - Two fields against each other, with color and size encodings
//! - [`dotplot`] - Grouped summaries with expression fractions as dot sizes
//! - [`scatter_matrix`] - Pairwise scatters with histograms on the diagonal
//! - [`embedding`] - Observations at their embedding coordinates
//! - [`statistics`] - Groupwise reductions
//! - [`plotting`] - Plot elements, layout and rendering
//! - [`traits`] - Method-call access on [`AnnData`](crate::AnnData)
//! - [`types`] - Supporting types
//!
//! ## Quick Start
//!
//! ```rust
//! use scplot::operations::*;
//! use scplot::{AnnData, ObsColumn, ObsTable};
//! use ndarray::array;
//!
//! # fn example() -> scplot::ScPlotResult<()> {
//! let obs = ObsTable::new(&["c0", "c1", "c2"])
//!     .with_column("cluster", ObsColumn::categorical(&["a", "b", "a"]))?;
//! let adata = AnnData::new(
//!     array![[1.0, 0.0], [0.0, 2.0], [3.0, 0.0]],
//!     obs,
//!     vec!["CD3D".into(), "MS4A1".into()],
//! )?;
//!
//! let figure = adata.dotplot(&["CD3D", "MS4A1"], "cluster", &DotplotConfig::default())?;
//! let json = figure.to_json()?;
//! # Ok(())
//! # }
//! ```

pub mod dotplot;
pub mod embedding;
pub mod heatmap;
pub mod plotting;
pub mod scatter;
pub mod scatter_matrix;
pub mod statistics;
pub mod traits;
pub mod types;
pub mod violin;

// Re-export the operations and their configuration
pub use dotplot::{DotplotConfig, dotplot};
pub use embedding::{EmbeddingConfig, embedding};
pub use heatmap::{HeatmapConfig, heatmap};
pub use scatter::{ScatterConfig, SizeBy, scatter};
pub use scatter_matrix::{ScatterMatrixConfig, scatter_matrix};
pub use statistics::{GroupSummary, non_zero_fraction, summarize_by_group};
pub use traits::AnnDataPlotting;
pub use types::{PlotOptions, ReduceFunction};
pub use violin::{ViolinConfig, violin};
