// Correctness and logic
#![warn(clippy::unit_cmp)] // Detects comparing unit types
#![warn(clippy::match_same_arms)]
// Duplicate match arms

// Performance-focused
#![warn(clippy::inefficient_to_string)] // `format!("{}", x)` vs `x.to_string()`
#![warn(clippy::map_clone)] // Cloning inside `map()` unnecessarily
#![warn(clippy::unnecessary_to_owned)] // Detects redundant `.to_owned()` or `.clone()`
#![warn(clippy::needless_collect)] // Avoids `.collect().iter()` chains

// Style and idiomatic Rust
#![warn(clippy::redundant_clone)] // Detects unnecessary `.clone()`
#![warn(clippy::identity_op)] // e.g., `x + 0`, `x * 1`
#![warn(clippy::needless_return)] // Avoids `return` at the end of functions
#![warn(clippy::manual_map)] // Use `.map()` instead of manual `match`
#![cfg_attr(not(test), warn(clippy::unwrap_used))] // Avoids using `unwrap()`

// Maintainability
#![warn(clippy::missing_panics_doc)] // Docs for functions that might panic
#![warn(clippy::missing_const_for_fn)] // Suggests making eligible functions `const`
#![deny(missing_docs)] // Documentation is a must for release

//! # scplot
//!
//! Plot builders for annotated single-cell matrices. Each builder takes an
//! annotated matrix and a few field names and returns a composed, interactive
//! [`plotly`] figure: violins, grouped heatmaps, scatters, dot plots,
//! scatter matrices and embedding scatters.
//!
//! ## Installation
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! scplot = "0.1.0"
//! ```
//!
//! ## Data model
//!
//! - [`AnnData`]: a feature matrix (observations × variables), dense or
//!   sparse, with an observation metadata table ([`ObsTable`]), an optional
//!   raw alternate matrix ([`RawData`]) and named embeddings.
//! - Field names resolve to a variable of the matrix first and to an
//!   observation column otherwise ([`Field`]).
//! - `use_raw: None` reads the raw matrix whenever one is attached;
//!   `Some(true)` requires it and fails with [`ScPlotError::MissingRaw`].
//!
//! ## Quick Start
//!
//! ```rust
//! use ndarray::array;
//! use scplot::{AnnData, AnnDataPlotting, ObsColumn, ObsTable, ScatterConfig, SizeBy};
//!
//! # fn example() -> scplot::ScPlotResult<()> {
//! let obs = ObsTable::new(&["c0", "c1", "c2"])
//!     .with_column("n_genes", ObsColumn::numeric(&[120, 340, 90]))?;
//! let adata = AnnData::new(
//!     array![[1.0, 0.0], [0.0, 2.0], [3.0, 1.0]],
//!     obs,
//!     vec!["CD3D".into(), "LYZ".into()],
//! )?;
//!
//! let config = ScatterConfig {
//!     size: Some(SizeBy::Field("n_genes".into())),
//!     ..Default::default()
//! };
//! let figure = adata.scatter("CD3D", "LYZ", &config)?;
//! assert_eq!(figure.len(), 2); // scatter + size legend
//!
//! let plot = figure.to_plot()?;
//! # let _ = plot;
//! # Ok(())
//! # }
//! ```
//!
//! Writing the figure to HTML or opening it in a browser is left to the
//! caller (`plot.write_html(...)`, `plot.show()`).
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (`debug` for field resolution and
//! figure assembly, `trace` for per-cell aggregation, `warn` for layout
//! fallbacks). Install a subscriber to see them.

mod error;
mod obs;
mod repr;

pub mod operations;
pub mod views;

#[cfg(test)]
mod fixtures;

pub use crate::error::{ScPlotError, ScPlotResult};
pub use crate::obs::{Categorical, Grouping, ObsColumn, ObsTable};
pub use crate::operations::plotting::{Colormap, Figure, PlotTheme};
pub use crate::operations::{
    AnnDataPlotting, DotplotConfig, EmbeddingConfig, HeatmapConfig, PlotOptions, ReduceFunction,
    ScatterConfig, ScatterMatrixConfig, SizeBy, ViolinConfig, dotplot, embedding, heatmap,
    scatter, scatter_matrix, violin,
};
pub use crate::repr::{AnnData, FeatureMatrix, RawData, Variables};
pub use crate::views::{Field, FieldFrame, MatrixView};
