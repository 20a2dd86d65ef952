//! Composable plotting system for annotated matrices.
//!
//! The plot functions in [`crate::operations`] reshape their inputs into
//! plot elements (one per panel) and compose them into a [`Figure`]. The
//! figure renders to a `plotly::Plot` or to plotly's JSON format; writing
//! files or opening a browser is left to the caller.
//!
//! # Quick Start
//!
//! ```rust
//! use scplot::operations::plotting::*;
//!
//! # fn example() -> scplot::ScPlotResult<()> {
//! let scatter = ScatterPlot::new(vec![0.0, 1.0, 2.0], vec![2.0, 0.5, 1.0], PanelStyle::default())?;
//! let legend = SizeLegend::new(
//!     SizeScale::new((0.0, 1.0), (2.0, 14.0)),
//!     vec![0.0, 0.5, 1.0],
//!     TickFormat::Fixed1,
//! );
//!
//! let json = Figure::new()
//!     .add_element(scatter)
//!     .add_element(legend)
//!     .with_cols(2)
//!     .to_json()?;
//! assert!(json.contains("xaxis2"));
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **PlotElement trait**: one panel's traces, axes and pixel size
//! - **Elements**: scatter, histogram, violin, heatmap and dot panels
//! - **SizeLegend**: the side panel explaining a size encoding
//! - **Figure**: grid layout and rendering
//! - **Builders**: shared steps turning assembled fields into elements

pub mod builders;
pub mod colormap;
pub mod composer;
pub mod core;
pub mod density;
pub mod elements;
pub mod size;

// Re-export the main types for easy access
pub use builders::*;
pub use colormap::Colormap;
pub use composer::*;
pub use self::core::*;
pub use density::{DensityOutline, gaussian_kde, scott_bandwidth};
pub use elements::*;
pub use size::*;
