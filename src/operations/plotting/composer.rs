//! Figure composition.
//!
//! A [`Figure`] lays its panels out row by row in a fixed number of columns
//! and renders them into a single plotly [`Plot`]. Column widths and row
//! heights follow the largest panel in each column and row, so a narrow
//! legend panel beside a scatter keeps its own width.
//!
//! plotly.rs only types eight axis pairs on its layout. [`Figure::to_json`]
//! writes the axes of every further panel straight into the serialized
//! layout, so the JSON figure is complete for any panel count.

use std::fmt;

use plotly::Plot;
use plotly::common::Anchor;
use plotly::layout::{Annotation, Axis, DragMode, GridPattern, Layout, LayoutGrid, Margin};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use super::core::*;
use crate::{ScPlotError, ScPlotResult};

/// Panels whose axes can be styled individually; plotly.rs exposes eight
/// numbered axis pairs on its layout.
pub const MAX_STYLED_PANELS: usize = 8;

const MARGIN: usize = 60;
/// Horizontal gap between columns, room for a colorbar and tick labels.
const H_GAP: usize = 90;
const V_GAP: usize = 60;

/// Where a panel sits in the figure, in paper coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelCell {
    /// Grid row, from the top.
    pub row: usize,
    /// Grid column, from the left.
    pub col: usize,
    /// Horizontal extent, left to right.
    pub x_domain: (f64, f64),
    /// Vertical extent, bottom to top.
    pub y_domain: (f64, f64),
}

/// Composed panels ready for rendering
pub struct Figure {
    elements: Vec<Box<dyn PlotElement>>,
    cols: usize,
    theme: PlotTheme,
    box_select: bool,
}

impl Figure {
    /// An empty single-column figure.
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            cols: 1,
            theme: PlotTheme::default(),
            box_select: false,
        }
    }

    /// Add a panel to the composition
    pub fn add_element(mut self, element: impl PlotElement) -> Self {
        self.push(element);
        self
    }

    /// Add a panel in place.
    pub fn push(&mut self, element: impl PlotElement) {
        self.elements.push(Box::new(element));
    }

    /// Set the number of columns (at least one)
    pub fn with_cols(mut self, cols: usize) -> Self {
        self.cols = cols.max(1);
        self
    }

    /// Set the theme
    pub fn with_theme(mut self, theme: PlotTheme) -> Self {
        self.theme = theme;
        self
    }

    /// Make dragging select points instead of zooming.
    pub const fn with_box_select(mut self, enabled: bool) -> Self {
        self.box_select = enabled;
        self
    }

    /// Number of panels.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the figure has no panels.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Requested number of columns.
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// The theme panels are styled with.
    pub fn theme(&self) -> &PlotTheme {
        &self.theme
    }

    /// Whether dragging selects points.
    pub const fn box_select(&self) -> bool {
        self.box_select
    }

    /// Panels in layout order.
    pub fn elements(&self) -> impl Iterator<Item = &dyn PlotElement> {
        self.elements.iter().map(|e| e.as_ref())
    }

    /// The panel at `index`, if it is a `T`.
    pub fn element<T: PlotElement>(&self, index: usize) -> Option<&T> {
        self.elements.get(index)?.as_any().downcast_ref::<T>()
    }

    /// `(rows, cols)` actually used; never more columns than panels.
    pub fn grid_shape(&self) -> (usize, usize) {
        let n = self.elements.len();
        let cols = self.cols.clamp(1, n.max(1));
        (n.div_ceil(cols), cols)
    }

    fn track_sizes(&self) -> (Vec<usize>, Vec<usize>) {
        let (rows, cols) = self.grid_shape();
        let mut widths = vec![0; cols];
        let mut heights = vec![0; rows];
        for (i, element) in self.elements.iter().enumerate() {
            let (w, h) = element.size();
            widths[i % cols] = widths[i % cols].max(w);
            heights[i / cols] = heights[i / cols].max(h);
        }
        (widths, heights)
    }

    fn inner_extent(tracks: &[usize], gap: usize) -> usize {
        tracks.iter().sum::<usize>() + gap * tracks.len().saturating_sub(1)
    }

    /// Figure size in pixels, margins included.
    pub fn size(&self) -> (usize, usize) {
        let (widths, heights) = self.track_sizes();
        (
            Self::inner_extent(&widths, H_GAP) + 2 * MARGIN,
            Self::inner_extent(&heights, V_GAP) + 2 * MARGIN,
        )
    }

    /// Paper-coordinate cell of every panel, in panel order.
    ///
    /// Up to [`MAX_STYLED_PANELS`] panels get domains proportional to their
    /// pixel sizes; larger figures fall back to equal cells.
    pub fn cells(&self) -> Vec<PanelCell> {
        let (rows, cols) = self.grid_shape();
        if self.elements.len() > MAX_STYLED_PANELS {
            return (0..self.elements.len())
                .map(|i| {
                    let (row, col) = (i / cols, i % cols);
                    PanelCell {
                        row,
                        col,
                        x_domain: (col as f64 / cols as f64, (col + 1) as f64 / cols as f64),
                        y_domain: (
                            1.0 - (row + 1) as f64 / rows as f64,
                            1.0 - row as f64 / rows as f64,
                        ),
                    }
                })
                .collect();
        }

        let (widths, heights) = self.track_sizes();
        let inner_w = Self::inner_extent(&widths, H_GAP) as f64;
        let inner_h = Self::inner_extent(&heights, V_GAP) as f64;
        self.elements
            .iter()
            .enumerate()
            .map(|(i, element)| {
                let (row, col) = (i / cols, i % cols);
                let (w, h) = element.size();
                let left = widths[..col].iter().sum::<usize>() + col * H_GAP;
                let top = heights[..row].iter().sum::<usize>() + row * V_GAP;
                PanelCell {
                    row,
                    col,
                    x_domain: (left as f64 / inner_w, (left + w) as f64 / inner_w),
                    y_domain: (1.0 - (top + h) as f64 / inner_h, 1.0 - top as f64 / inner_h),
                }
            })
            .collect()
    }

    /// Axes of panel `i`, anchored to each other and optionally pinned to its cell.
    fn panel_axes(
        &self,
        i: usize,
        element: &dyn PlotElement,
        cell: &PanelCell,
        pinned: bool,
    ) -> (Axis, Axis) {
        let (x_ref, y_ref) = axis_refs(i);
        let x_axis = element.x_axis().to_plotly_axis(&self.theme).anchor(&y_ref);
        let y_axis = element.y_axis().to_plotly_axis(&self.theme).anchor(&x_ref);
        if pinned {
            (
                x_axis.domain(&[cell.x_domain.0, cell.x_domain.1]),
                y_axis.domain(&[cell.y_domain.0, cell.y_domain.1]),
            )
        } else {
            (x_axis, y_axis)
        }
    }

    /// Render into a plotly plot.
    ///
    /// With more than [`MAX_STYLED_PANELS`] panels the plot lays its panels
    /// out on plotly's grid and styles the axes of the first eight only;
    /// [`Figure::to_json`] styles all of them.
    ///
    /// # Errors
    /// Returns an error if the figure has no panels or a panel cannot build
    /// its traces.
    pub fn to_plot(&self) -> ScPlotResult<Plot> {
        if self.elements.is_empty() {
            return Err(ScPlotError::invalid_parameter(
                "figure",
                "no plot elements to render",
            ));
        }

        let (rows, cols) = self.grid_shape();
        let (width, height) = self.size();
        let overflow = self.elements.len() > MAX_STYLED_PANELS;

        let mut plot = Plot::new();
        let mut layout = self
            .theme
            .to_plotly_layout()
            .width(width)
            .height(height)
            .margin(
                Margin::new()
                    .left(MARGIN)
                    .right(MARGIN)
                    .top(MARGIN)
                    .bottom(MARGIN),
            )
            .show_legend(self.elements.iter().any(|e| e.has_legend()));
        if self.box_select {
            layout = layout.drag_mode(DragMode::Select);
        }
        if overflow {
            warn!(
                panels = self.elements.len(),
                styled = MAX_STYLED_PANELS,
                "plot styles the axes of the first panels only, to_json styles all"
            );
            layout = layout.grid(
                LayoutGrid::new()
                    .rows(rows)
                    .columns(cols)
                    .pattern(GridPattern::Independent),
            );
        }

        let mut annotations = Vec::new();
        for (i, (element, cell)) in self.elements.iter().zip(self.cells()).enumerate() {
            let ctx = PanelContext {
                theme: &self.theme,
                x_domain: cell.x_domain,
                y_domain: cell.y_domain,
            };
            let (x_ref, y_ref) = axis_refs(i);
            for trace in element.to_plotly_traces(&ctx)? {
                trace.on_axes(&x_ref, &y_ref).add_to_plot(&mut plot);
            }

            if i < MAX_STYLED_PANELS {
                let (x_axis, y_axis) = self.panel_axes(i, element.as_ref(), &cell, !overflow);
                layout = with_axes(layout, i, x_axis, y_axis);
            }

            let metadata = element.metadata();
            if let Some(title) = metadata.title.as_deref() {
                annotations.push(
                    Annotation::new()
                        .text(title)
                        .x_ref("paper")
                        .y_ref("paper")
                        .x((cell.x_domain.0 + cell.x_domain.1) / 2.0)
                        .y(cell.y_domain.1)
                        .x_anchor(Anchor::Center)
                        .y_anchor(Anchor::Bottom)
                        .show_arrow(false)
                        .font(self.theme.title_font(metadata.title_font_size)),
                );
            }
        }
        if !annotations.is_empty() {
            layout = layout.annotations(annotations);
        }

        plot.set_layout(layout);
        debug!(
            panels = self.elements.len(),
            rows, cols, width, height, "composed figure"
        );
        Ok(plot)
    }

    /// Render into plotly's JSON figure format.
    ///
    /// Every panel gets its own styled axis pair pinned to its cell, and
    /// scatter panels carry their unselected-marker opacity.
    ///
    /// # Errors
    /// Returns an error if rendering or serialization fails.
    pub fn to_json(&self) -> ScPlotResult<String> {
        let plot = self.to_plot()?;
        let mut figure = serde_json::to_value(&plot).map_err(json_error)?;

        if self.elements.len() > MAX_STYLED_PANELS {
            let layout = figure
                .get_mut("layout")
                .and_then(Value::as_object_mut)
                .ok_or_else(|| ScPlotError::Plotting("serialized figure has no layout".to_string()))?;
            self.write_all_axes(layout)?;
        }

        if let Some(traces) = figure.get_mut("data").and_then(Value::as_array_mut) {
            for trace in traces {
                let opacity = trace
                    .get("xaxis")
                    .and_then(Value::as_str)
                    .and_then(panel_index)
                    .and_then(|i| self.elements.get(i))
                    .and_then(|element| element.unselected_opacity());
                if let (Some(opacity), Some(trace)) = (opacity, trace.as_object_mut()) {
                    trace.insert(
                        "unselected".to_string(),
                        json!({ "marker": { "opacity": opacity } }),
                    );
                }
            }
        }

        serde_json::to_string(&figure).map_err(json_error)
    }

    /// Replace the grid with explicit, pinned axes for every panel.
    fn write_all_axes(&self, layout: &mut Map<String, Value>) -> ScPlotResult<()> {
        layout.remove("grid");
        for (i, (element, cell)) in self.elements.iter().zip(self.cells()).enumerate() {
            let (x_axis, y_axis) = self.panel_axes(i, element.as_ref(), &cell, true);
            let (x_key, y_key) = layout_axis_keys(i);
            layout.insert(x_key, serde_json::to_value(&x_axis).map_err(json_error)?);
            layout.insert(y_key, serde_json::to_value(&y_axis).map_err(json_error)?);
        }
        debug!(panels = self.elements.len(), "wrote axes past plotly.rs's typed layout");
        Ok(())
    }
}

fn json_error(e: serde_json::Error) -> ScPlotError {
    ScPlotError::Plotting(e.to_string())
}

impl Default for Figure {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Figure")
            .field("panels", &self.elements.len())
            .field("cols", &self.cols)
            .field("box_select", &self.box_select)
            .finish_non_exhaustive()
    }
}

/// Axis references of panel `i`: `("x", "y")`, `("x2", "y2")`, ...
fn axis_refs(i: usize) -> (String, String) {
    if i == 0 {
        ("x".to_string(), "y".to_string())
    } else {
        (format!("x{}", i + 1), format!("y{}", i + 1))
    }
}

/// Layout keys of panel `i`'s axes: `("xaxis", "yaxis")`, `("xaxis2", "yaxis2")`, ...
fn layout_axis_keys(i: usize) -> (String, String) {
    if i == 0 {
        ("xaxis".to_string(), "yaxis".to_string())
    } else {
        (format!("xaxis{}", i + 1), format!("yaxis{}", i + 1))
    }
}

/// Panel index of an x axis reference (`"x"` is 0, `"x3"` is 2).
fn panel_index(x_ref: &str) -> Option<usize> {
    match x_ref.strip_prefix('x')? {
        "" => Some(0),
        n => n.parse::<usize>().ok()?.checked_sub(1),
    }
}

fn with_axes(layout: Layout, i: usize, x_axis: Axis, y_axis: Axis) -> Layout {
    match i + 1 {
        1 => layout.x_axis(x_axis).y_axis(y_axis),
        2 => layout.x_axis2(x_axis).y_axis2(y_axis),
        3 => layout.x_axis3(x_axis).y_axis3(y_axis),
        4 => layout.x_axis4(x_axis).y_axis4(y_axis),
        5 => layout.x_axis5(x_axis).y_axis5(y_axis),
        6 => layout.x_axis6(x_axis).y_axis6(y_axis),
        7 => layout.x_axis7(x_axis).y_axis7(y_axis),
        8 => layout.x_axis8(x_axis).y_axis8(y_axis),
        _ => layout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::plotting::elements::{PanelStyle, ScatterPlot};
    use crate::operations::plotting::size::{SizeLegend, SizeScale, TickFormat};

    fn scatter(title: Option<&str>) -> ScatterPlot {
        let mut style = PanelStyle::default();
        style.metadata.title = title.map(str::to_string);
        ScatterPlot::new(vec![0.0, 1.0], vec![1.0, 0.0], style).unwrap()
    }

    fn legend() -> SizeLegend {
        SizeLegend::new(
            SizeScale::new((0.0, 1.0), (0.0, 14.0)),
            vec![0.5, 1.0],
            TickFormat::Percent,
        )
    }

    #[test]
    fn test_empty_figure_cannot_render() {
        assert!(Figure::new().to_plot().is_err());
    }

    #[test]
    fn test_single_column_stacks_panels() {
        let figure = Figure::new().add_element(scatter(None)).add_element(scatter(None));
        assert_eq!(figure.grid_shape(), (2, 1));
        assert_eq!(figure.size(), (300 + 2 * MARGIN, 600 + V_GAP + 2 * MARGIN));

        let cells = figure.cells();
        assert_eq!(cells[0].y_domain.1, 1.0);
        assert_eq!(cells[1].y_domain.0, 0.0);
        assert!(cells[1].y_domain.1 < cells[0].y_domain.0);
    }

    #[test]
    fn test_columns_follow_panel_widths() {
        let figure = Figure::new()
            .add_element(scatter(None))
            .add_element(legend())
            .with_cols(2);
        let cells = figure.cells();
        assert_eq!(cells[0].x_domain, (0.0, 300.0 / 515.0));
        assert_eq!(cells[1].x_domain, (390.0 / 515.0, 1.0));
    }

    #[test]
    fn test_typed_panel_access() {
        let figure = Figure::new().add_element(scatter(None)).add_element(legend());
        assert!(figure.element::<ScatterPlot>(0).is_some());
        assert!(figure.element::<SizeLegend>(0).is_none());
        assert!(figure.element::<SizeLegend>(1).is_some());
        assert!(figure.element::<SizeLegend>(2).is_none());
    }

    #[test]
    fn test_json_binds_panels_to_their_axes() {
        let json = Figure::new()
            .add_element(scatter(Some("first")))
            .add_element(scatter(None))
            .with_cols(2)
            .with_box_select(true)
            .to_json()
            .unwrap();
        assert!(json.contains("\"x2\""));
        assert!(json.contains("\"select\""));
        assert!(json.contains("first"));
    }

    #[test]
    fn test_more_than_eight_panels_get_axes_in_json() {
        let mut figure = Figure::new().with_cols(3);
        for _ in 0..9 {
            figure.push(scatter(None));
        }
        assert_eq!(figure.grid_shape(), (3, 3));

        let json: Value = serde_json::from_str(&figure.to_json().unwrap()).unwrap();
        let layout = &json["layout"];
        assert!(layout.get("grid").is_none());
        assert!(layout["xaxis"]["domain"].is_array());
        assert_eq!(layout["xaxis9"]["anchor"], "y9");
        assert_eq!(layout["yaxis9"]["anchor"], "x9");
        let domain = layout["xaxis9"]["domain"].as_array().unwrap();
        assert_eq!(domain[1].as_f64(), Some(1.0));
    }

    #[test]
    fn test_panel_index_reads_axis_refs() {
        assert_eq!(panel_index("x"), Some(0));
        assert_eq!(panel_index("x12"), Some(11));
        assert_eq!(panel_index("y2"), None);
    }

    #[test]
    fn test_unselected_opacity_reaches_scatter_traces() {
        let mut style = PanelStyle::default();
        style.nonselection_alpha = Some(0.1);
        let plot = ScatterPlot::new(vec![0.0, 1.0], vec![1.0, 0.0], style).unwrap();
        let json: Value = serde_json::from_str(
            &Figure::new()
                .add_element(plot)
                .add_element(legend())
                .with_cols(2)
                .to_json()
                .unwrap(),
        )
        .unwrap();
        assert_eq!(json["data"][0]["unselected"]["marker"]["opacity"], 0.1);
        assert!(json["data"][1].get("unselected").is_none());
    }

    #[test]
    fn test_theme_colors_reach_the_layout() {
        let theme: PlotTheme = serde_json::from_str(r##"{"background_color": "#202020"}"##).unwrap();
        let json: Value = serde_json::from_str(
            &Figure::new()
                .add_element(scatter(None))
                .with_theme(theme)
                .to_json()
                .unwrap(),
        )
        .unwrap();
        assert_eq!(json["layout"]["paper_bgcolor"], "#202020");
        assert_eq!(json["layout"]["plot_bgcolor"], "#202020");
    }
}
