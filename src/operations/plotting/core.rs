//! Core types and traits for the composable plotting system.
//!
//! Every plotting operation builds one or more plot elements (panels)
//! holding the reshaped, plotting-ready data. A [`Figure`](super::Figure)
//! lays the panels out in a grid and asks each one for its plotly traces
//! and axis configuration.

use std::any::Any;

use plotly::common::{Font, Title};
use plotly::layout::{Axis, Layout};
use plotly::{HeatMap, Histogram, Plot, Scatter};
use serde::{Deserialize, Serialize};

use crate::ScPlotResult;

/// Bounds for plot data in 2D space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotBounds {
    /// Left edge.
    pub x_min: f64,
    /// Right edge.
    pub x_max: f64,
    /// Bottom edge.
    pub y_min: f64,
    /// Top edge.
    pub y_max: f64,
}

impl PlotBounds {
    /// Bounds from explicit edges.
    pub const fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Bounds of a point cloud, ignoring `NaN` coordinates.
    ///
    /// Empty input gives the unit square.
    pub fn from_points(xs: &[f64], ys: &[f64]) -> Self {
        let (x_min, x_max) = finite_extent(xs).unwrap_or((0.0, 1.0));
        let (y_min, y_max) = finite_extent(ys).unwrap_or((0.0, 1.0));
        Self::new(x_min, x_max, y_min, y_max)
    }

    /// Grow every side by a fraction of the span.
    pub fn with_margin(&self, margin_percent: f64) -> Self {
        let x_margin = (self.x_max - self.x_min) * margin_percent;
        let y_margin = (self.y_max - self.y_min) * margin_percent;
        Self {
            x_min: self.x_min - x_margin,
            x_max: self.x_max + x_margin,
            y_min: self.y_min - y_margin,
            y_max: self.y_max + y_margin,
        }
    }
}

/// Minimum and maximum of the non-`NaN` values.
pub(crate) fn finite_extent(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Metadata about a plot element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotMetadata {
    /// Panel title, drawn above the panel.
    pub title: Option<String>,
    /// X axis title.
    pub x_label: Option<String>,
    /// Y axis title.
    pub y_label: Option<String>,
    /// Title font size in points; the theme's size when unset.
    pub title_font_size: Option<usize>,
}

/// Enum for different types of plotly traces
#[derive(Debug)]
pub enum PlotTrace {
    /// Markers or lines.
    Scatter(Box<Scatter<f64, f64>>),
    /// Color-coded matrix.
    HeatMap(Box<HeatMap<String, String, Vec<f64>>>),
    /// Binned counts.
    Histogram(Box<Histogram<f64>>),
}

impl PlotTrace {
    /// Bind the trace to a subplot's axes (`"x2"`, `"y2"`, ...).
    pub fn on_axes(self, x_axis: &str, y_axis: &str) -> Self {
        match self {
            PlotTrace::Scatter(trace) => PlotTrace::Scatter(trace.x_axis(x_axis).y_axis(y_axis)),
            PlotTrace::HeatMap(trace) => PlotTrace::HeatMap(trace.x_axis(x_axis).y_axis(y_axis)),
            PlotTrace::Histogram(trace) => {
                PlotTrace::Histogram(trace.x_axis(x_axis).y_axis(y_axis))
            }
        }
    }

    /// Add this trace to a plotly Plot
    pub fn add_to_plot(self, plot: &mut Plot) {
        match self {
            PlotTrace::Scatter(trace) => plot.add_trace(trace),
            PlotTrace::HeatMap(trace) => plot.add_trace(trace),
            PlotTrace::Histogram(trace) => plot.add_trace(trace),
        }
    }
}

/// Configuration for one axis of a panel
#[derive(Debug, Clone, PartialEq)]
pub struct AxisConfig {
    /// Axis title; `None` or empty hides it.
    pub label: Option<String>,
    /// Explicit range, low to high (reversed to invert the axis).
    pub range: Option<(f64, f64)>,
    /// Explicit tick positions and labels.
    pub ticks: Option<Vec<(f64, String)>>,
    /// Draw the axis line, ticks and title.
    pub visible: bool,
    /// Tick label angle in degrees, counter-clockwise negative.
    pub tick_angle: Option<f64>,
    /// Draw grid lines (only on visible axes).
    pub grid: bool,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            label: None,
            range: None,
            ticks: None,
            visible: true,
            tick_angle: None,
            grid: true,
        }
    }
}

impl AxisConfig {
    /// A labelled axis spanning `range`.
    pub fn labelled(label: Option<&str>, range: Option<(f64, f64)>) -> Self {
        Self {
            label: label.map(str::to_string),
            range,
            ..Default::default()
        }
    }

    /// An invisible axis fixed to `range`.
    pub fn hidden(range: (f64, f64)) -> Self {
        Self {
            range: Some(range),
            visible: false,
            grid: false,
            ..Default::default()
        }
    }

    /// The plotly axis, styled with the theme's fonts and grid color.
    pub fn to_plotly_axis(&self, theme: &PlotTheme) -> Axis {
        let mut axis = Axis::new()
            .visible(self.visible)
            .show_grid(self.visible && self.grid)
            .grid_color(theme.grid_color.clone())
            .tick_font(
                Font::new()
                    .family(theme.font_family.as_str())
                    .size(theme.tick_font_size)
                    .color(theme.text_color.clone()),
            );
        if let Some(label) = self.label.as_deref().filter(|l| !l.is_empty()) {
            axis = axis.title(
                Title::with_text(label).font(
                    Font::new()
                        .family(theme.font_family.as_str())
                        .size(theme.label_font_size)
                        .color(theme.text_color.clone()),
                ),
            );
        }
        if let Some((lo, hi)) = self.range {
            axis = axis.range(vec![lo, hi]);
        }
        if let Some(ticks) = &self.ticks {
            axis = axis
                .tick_values(ticks.iter().map(|(v, _)| *v).collect())
                .tick_text(ticks.iter().map(|(_, t)| t.clone()).collect());
        }
        if let Some(angle) = self.tick_angle {
            axis = axis.tick_angle(angle);
        }
        axis
    }
}

/// Where a panel sits in the composed figure, in paper coordinates.
#[derive(Debug, Clone, Copy)]
pub struct PanelContext<'a> {
    /// Theme of the whole figure.
    pub theme: &'a PlotTheme,
    /// Horizontal extent, left to right.
    pub x_domain: (f64, f64),
    /// Vertical extent, bottom to top.
    pub y_domain: (f64, f64),
}

impl PanelContext<'_> {
    /// Horizontal paper position just right of the panel, for its colorbar.
    pub fn colorbar_x(&self) -> f64 {
        self.x_domain.1 + 0.01
    }
}

/// Core trait for all plot elements
pub trait PlotElement: Any + Send + Sync {
    /// Get metadata about this element
    fn metadata(&self) -> &PlotMetadata;

    /// Panel size in pixels (width, height)
    fn size(&self) -> (usize, usize);

    /// Horizontal axis configuration
    fn x_axis(&self) -> AxisConfig {
        AxisConfig::labelled(self.metadata().x_label.as_deref(), None)
    }

    /// Vertical axis configuration
    fn y_axis(&self) -> AxisConfig {
        AxisConfig::labelled(self.metadata().y_label.as_deref(), None)
    }

    /// Generate Plotly traces for this element
    fn to_plotly_traces(&self, ctx: &PanelContext<'_>) -> ScPlotResult<Vec<PlotTrace>>;

    /// Whether the element draws a legend (discrete encodings)
    fn has_legend(&self) -> bool {
        false
    }

    /// Marker opacity of points outside a box selection, when the panel sets one
    fn unselected_opacity(&self) -> Option<f64> {
        None
    }

    /// Upcast for typed access through [`Figure::element`](super::Figure::element).
    fn as_any(&self) -> &dyn Any;
}

/// Theme configuration for plots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotTheme {
    /// Paper and plot area background.
    pub background_color: String,
    /// Grid line color.
    pub grid_color: String,
    /// Color of titles, labels and ticks.
    pub text_color: String,
    /// CSS font family.
    pub font_family: String,
    /// Base font size.
    pub font_size: usize,
    /// Panel title size.
    pub title_font_size: usize,
    /// Axis title size.
    pub label_font_size: usize,
    /// Tick label size.
    pub tick_font_size: usize,
}

impl PlotTheme {
    /// Base layout carrying the theme's font and background.
    pub fn to_plotly_layout(&self) -> Layout {
        Layout::new()
            .font(
                Font::new()
                    .family(self.font_family.as_str())
                    .size(self.font_size)
                    .color(self.text_color.clone()),
            )
            .paper_background_color(self.background_color.clone())
            .plot_background_color(self.background_color.clone())
    }

    /// Font for panel titles drawn as annotations
    pub fn title_font(&self, size: Option<usize>) -> Font {
        Font::new()
            .family(self.font_family.as_str())
            .size(size.unwrap_or(self.title_font_size))
            .color(self.text_color.clone())
    }
}

impl Default for PlotTheme {
    fn default() -> Self {
        Self {
            background_color: "#ffffff".to_string(),
            grid_color: "#f0f0f0".to_string(),
            text_color: "#000000".to_string(),
            font_family: "Arial, sans-serif".to_string(),
            font_size: 12,
            title_font_size: 14,
            label_font_size: 12,
            tick_font_size: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_ignore_nan_and_default_to_unit() {
        let b = PlotBounds::from_points(&[1.0, f64::NAN, 3.0], &[]);
        assert_eq!(b, PlotBounds::new(1.0, 3.0, 0.0, 1.0));
    }

    #[test]
    fn test_bounds_margin() {
        let b = PlotBounds::new(0.0, 10.0, -1.0, 1.0).with_margin(0.1);
        assert_eq!(b, PlotBounds::new(-1.0, 11.0, -1.2, 1.2));
    }

    #[test]
    fn test_theme_deserializes_partial_overrides() {
        let theme: PlotTheme = serde_json::from_str(r#"{"font_size": 20}"#).unwrap();
        assert_eq!(theme.font_size, 20);
        assert_eq!(theme.background_color, PlotTheme::default().background_color);
    }
}
