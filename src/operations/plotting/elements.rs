//! Individual plot element implementations.
//!
//! Each element owns the reshaped, plotting-ready data of one panel and
//! knows how to turn it into plotly traces and axis settings.

use std::any::Any;

use ndarray::Array2;
use plotly::common::{ColorBar, Fill, Line, Marker, Mode};
use plotly::{HeatMap, Histogram, Scatter};

use super::colormap::Colormap;
use super::core::*;
use super::density::{DENSITY_POINTS, DensityOutline, gaussian_kde};
use super::size::to_pixels;
use crate::obs::ObsColumn;
use crate::operations::types::{PlotOptions, ReduceFunction};
use crate::{ScPlotError, ScPlotResult};

const DEFAULT_PANEL_SIZE: usize = 300;
const VIOLIN_HALF_WIDTH: f64 = 0.4;
const HISTOGRAM_GROUP_OPACITY: f64 = 0.6;

/// Styling of one data panel, resolved from merged [`PlotOptions`].
#[derive(Debug, Clone, PartialEq)]
pub struct PanelStyle {
    /// Title and axis labels.
    pub metadata: PlotMetadata,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Fraction of the data range added on each side.
    pub padding: f64,
    /// Whether the x axis is drawn.
    pub show_x_axis: bool,
    /// Whether the y axis is drawn.
    pub show_y_axis: bool,
    /// Counter-clockwise rotation of x tick labels in degrees.
    pub x_tick_rotation: Option<f64>,
    /// Marker or fill opacity.
    pub alpha: f64,
    /// Opacity of points outside a box selection; plotly's default when unset.
    pub nonselection_alpha: Option<f64>,
    /// Whether continuous encodings draw a colorbar.
    pub colorbar: bool,
    /// Whether discrete encodings add legend entries.
    pub show_legend: bool,
}

impl PanelStyle {
    /// Resolve merged options, filling what is still unset.
    pub fn from_options(options: &PlotOptions) -> Self {
        Self {
            metadata: PlotMetadata {
                title: options.title.clone(),
                x_label: options.x_label.clone(),
                y_label: options.y_label.clone(),
                title_font_size: options.title_font_size,
            },
            width: options.width.unwrap_or(DEFAULT_PANEL_SIZE),
            height: options.height.unwrap_or(DEFAULT_PANEL_SIZE),
            padding: options.padding_or_zero(),
            show_x_axis: options.show_x_axis.unwrap_or(true),
            show_y_axis: options.show_y_axis.unwrap_or(true),
            x_tick_rotation: options.x_tick_rotation,
            alpha: options.alpha.unwrap_or(1.0),
            nonselection_alpha: options.nonselection_alpha,
            colorbar: options.colorbar.unwrap_or(true),
            show_legend: options.show_legend.unwrap_or(true),
        }
    }

    fn x_axis(&self, range: Option<(f64, f64)>) -> AxisConfig {
        AxisConfig {
            visible: self.show_x_axis,
            // plotly measures clockwise
            tick_angle: self.x_tick_rotation.map(|r| -r),
            ..AxisConfig::labelled(self.metadata.x_label.as_deref(), range)
        }
    }

    fn y_axis(&self, range: Option<(f64, f64)>) -> AxisConfig {
        AxisConfig {
            visible: self.show_y_axis,
            ..AxisConfig::labelled(self.metadata.y_label.as_deref(), range)
        }
    }
}

impl Default for PanelStyle {
    fn default() -> Self {
        Self::from_options(&PlotOptions::default())
    }
}

fn padded(bounds: PlotBounds, padding: f64) -> PlotBounds {
    bounds.with_margin(padding)
}

fn mismatch(what: &str, expected: usize, got: usize) -> ScPlotError {
    ScPlotError::DimensionMismatch(format!("{what}: expected {expected} values, got {got}"))
}

/// How points are colored.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ColorEncoding {
    /// Every point in the renderer's default color.
    #[default]
    Uniform,
    /// Numbers mapped through a continuous color scale.
    Continuous {
        /// One value per point.
        values: Vec<f64>,
        /// Scale the values run through.
        colormap: Colormap,
        /// Whether a colorbar is drawn.
        colorbar: bool,
    },
    /// One trace, color and legend entry per category.
    Categorical {
        /// One label per point.
        labels: Vec<String>,
        /// Distinct labels in legend order.
        categories: Vec<String>,
        /// One color per category.
        colors: Vec<String>,
    },
}

impl ColorEncoding {
    /// Encode a column: numbers continuously, everything else by category.
    ///
    /// Categorical columns are turned into text labels here; categories keep
    /// the column's group order.
    ///
    /// # Errors
    /// Returns an error if the colormap cannot serve the encoding.
    pub fn from_column(column: &ObsColumn, colormap: &Colormap, colorbar: bool) -> ScPlotResult<Self> {
        match column.as_numeric() {
            Some(values) => {
                colormap.to_color_scale()?;
                Ok(ColorEncoding::Continuous {
                    values: values.to_vec(),
                    colormap: colormap.clone(),
                    colorbar,
                })
            }
            None => {
                let grouping = column.grouping();
                let colors = colormap.categorical_colors(grouping.n_groups())?;
                Ok(ColorEncoding::Categorical {
                    labels: column.to_text(),
                    categories: grouping.labels().to_vec(),
                    colors,
                })
            }
        }
    }

    fn len(&self) -> Option<usize> {
        match self {
            ColorEncoding::Uniform => None,
            ColorEncoding::Continuous { values, .. } => Some(values.len()),
            ColorEncoding::Categorical { labels, .. } => Some(labels.len()),
        }
    }

    /// Point indices per category, in category order.
    fn partition(labels: &[String], categories: &[String]) -> Vec<Vec<usize>> {
        categories
            .iter()
            .map(|cat| {
                labels
                    .iter()
                    .enumerate()
                    .filter_map(|(i, l)| (l == cat).then_some(i))
                    .collect()
            })
            .collect()
    }
}

/// Marker sizes of a scatter panel.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerSizes {
    /// One pixel size for every point.
    Fixed(f64),
    /// One pixel size per point.
    PerPoint(Vec<f64>),
}

fn pick<T: Clone>(values: &[T], idx: &[usize]) -> Vec<T> {
    idx.iter().map(|&i| values[i].clone()).collect()
}

/// Scatter panel
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPlot {
    x: Vec<f64>,
    y: Vec<f64>,
    color: ColorEncoding,
    sizes: MarkerSizes,
    hover: Option<Vec<String>>,
    style: PanelStyle,
    bounds: PlotBounds,
}

impl ScatterPlot {
    /// Points at `(x[i], y[i])` in a uniform color.
    ///
    /// # Errors
    /// Returns an error if `x` and `y` differ in length.
    pub fn new(x: Vec<f64>, y: Vec<f64>, style: PanelStyle) -> ScPlotResult<Self> {
        if x.len() != y.len() {
            return Err(mismatch("scatter y", x.len(), y.len()));
        }
        let bounds = PlotBounds::from_points(&x, &y);
        Ok(Self {
            x,
            y,
            color: ColorEncoding::Uniform,
            sizes: MarkerSizes::Fixed(6.0),
            hover: None,
            style,
            bounds,
        })
    }

    /// Color the points.
    ///
    /// # Errors
    /// Returns an error if the encoding has a different number of points.
    pub fn with_color(mut self, color: ColorEncoding) -> ScPlotResult<Self> {
        match color.len() {
            Some(n) if n != self.x.len() => Err(mismatch("scatter color", self.x.len(), n)),
            _ => {
                self.color = color;
                Ok(self)
            }
        }
    }

    /// Size the markers.
    ///
    /// # Errors
    /// Returns an error if per-point sizes have a different number of points.
    pub fn with_sizes(mut self, sizes: MarkerSizes) -> ScPlotResult<Self> {
        if let MarkerSizes::PerPoint(px) = &sizes
            && px.len() != self.x.len()
        {
            return Err(mismatch("scatter sizes", self.x.len(), px.len()));
        }
        self.sizes = sizes;
        Ok(self)
    }

    /// Hover text, one entry per point.
    ///
    /// # Errors
    /// Returns an error if the text has a different number of points.
    pub fn with_hover_text(mut self, text: Vec<String>) -> ScPlotResult<Self> {
        if text.len() != self.x.len() {
            return Err(mismatch("scatter hover text", self.x.len(), text.len()));
        }
        self.hover = Some(text);
        Ok(self)
    }

    /// The x and y coordinates.
    pub fn points(&self) -> (&[f64], &[f64]) {
        (&self.x, &self.y)
    }

    /// How the points are colored.
    pub fn color(&self) -> &ColorEncoding {
        &self.color
    }

    /// How the markers are sized.
    pub fn sizes(&self) -> &MarkerSizes {
        &self.sizes
    }

    /// Hover text, if any.
    pub fn hover_text(&self) -> Option<&[String]> {
        self.hover.as_deref()
    }

    /// The panel styling.
    pub fn style(&self) -> &PanelStyle {
        &self.style
    }

    /// Whether a continuous color scale is drawn with a colorbar.
    pub fn has_colorbar(&self) -> bool {
        matches!(self.color, ColorEncoding::Continuous { colorbar: true, .. })
    }

    fn marker(&self, idx: &[usize]) -> Marker {
        let marker = Marker::new().opacity(self.style.alpha);
        match &self.sizes {
            MarkerSizes::Fixed(px) => marker.size(to_pixels(*px)),
            MarkerSizes::PerPoint(px) => {
                marker.size_array(idx.iter().map(|&i| to_pixels(px[i])).collect())
            }
        }
    }

    fn trace(&self, idx: &[usize], marker: Marker) -> Box<Scatter<f64, f64>> {
        let mut trace = Scatter::new(pick(&self.x, idx), pick(&self.y, idx))
            .mode(Mode::Markers)
            .marker(marker);
        if let Some(hover) = &self.hover {
            trace = trace.hover_text_array(pick(hover, idx));
        }
        trace
    }
}

impl PlotElement for ScatterPlot {
    fn metadata(&self) -> &PlotMetadata {
        &self.style.metadata
    }

    fn size(&self) -> (usize, usize) {
        (self.style.width, self.style.height)
    }

    fn x_axis(&self) -> AxisConfig {
        let b = padded(self.bounds, self.style.padding);
        self.style.x_axis(Some((b.x_min, b.x_max)))
    }

    fn y_axis(&self) -> AxisConfig {
        let b = padded(self.bounds, self.style.padding);
        self.style.y_axis(Some((b.y_min, b.y_max)))
    }

    fn to_plotly_traces(&self, ctx: &PanelContext<'_>) -> ScPlotResult<Vec<PlotTrace>> {
        let all: Vec<usize> = (0..self.x.len()).collect();
        let traces = match &self.color {
            ColorEncoding::Uniform => {
                vec![PlotTrace::Scatter(self.trace(&all, self.marker(&all)).show_legend(false))]
            }
            ColorEncoding::Continuous {
                values,
                colormap,
                colorbar,
            } => {
                let marker = self
                    .marker(&all)
                    .color_array(values.clone())
                    .color_scale(colormap.to_color_scale()?)
                    .show_scale(*colorbar)
                    .color_bar(ColorBar::new().x(ctx.colorbar_x()));
                vec![PlotTrace::Scatter(self.trace(&all, marker).show_legend(false))]
            }
            ColorEncoding::Categorical {
                labels,
                categories,
                colors,
            } => ColorEncoding::partition(labels, categories)
                .iter()
                .zip(categories.iter().zip(colors))
                .map(|(idx, (category, color))| {
                    let marker = self.marker(idx).color(color.clone());
                    PlotTrace::Scatter(
                        self.trace(idx, marker)
                            .name(category)
                            .legend_group(category)
                            .show_legend(self.style.show_legend),
                    )
                })
                .collect(),
        };
        Ok(traces)
    }

    fn has_legend(&self) -> bool {
        self.style.show_legend && matches!(self.color, ColorEncoding::Categorical { .. })
    }

    fn unselected_opacity(&self) -> Option<f64> {
        self.style.nonselection_alpha
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Histogram panel, optionally split by category
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramPlot {
    values: Vec<f64>,
    color: ColorEncoding,
    style: PanelStyle,
    bounds: PlotBounds,
}

impl HistogramPlot {
    /// Histogram of `values`; `NaN` values are left out.
    pub fn new(values: Vec<f64>, style: PanelStyle) -> Self {
        let (lo, hi) = finite_extent(&values).unwrap_or((0.0, 1.0));
        Self {
            values,
            color: ColorEncoding::Uniform,
            style,
            bounds: PlotBounds::new(lo, hi, 0.0, 1.0),
        }
    }

    /// Split the histogram by category. Continuous encodings are ignored.
    ///
    /// # Errors
    /// Returns an error if the encoding has a different number of values.
    pub fn with_color(mut self, color: ColorEncoding) -> ScPlotResult<Self> {
        match color.len() {
            Some(n) if n != self.values.len() => {
                Err(mismatch("histogram color", self.values.len(), n))
            }
            _ => {
                self.color = color;
                Ok(self)
            }
        }
    }

    /// The binned values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

impl PlotElement for HistogramPlot {
    fn metadata(&self) -> &PlotMetadata {
        &self.style.metadata
    }

    fn size(&self) -> (usize, usize) {
        (self.style.width, self.style.height)
    }

    fn x_axis(&self) -> AxisConfig {
        let b = padded(self.bounds, self.style.padding);
        self.style.x_axis(Some((b.x_min, b.x_max)))
    }

    fn y_axis(&self) -> AxisConfig {
        self.style.y_axis(None)
    }

    fn to_plotly_traces(&self, _ctx: &PanelContext<'_>) -> ScPlotResult<Vec<PlotTrace>> {
        let finite = |idx: &[usize]| -> Vec<f64> {
            idx.iter()
                .map(|&i| self.values[i])
                .filter(|v| !v.is_nan())
                .collect()
        };
        let traces = match &self.color {
            ColorEncoding::Categorical {
                labels,
                categories,
                colors,
            } => ColorEncoding::partition(labels, categories)
                .iter()
                .zip(categories.iter().zip(colors))
                .map(|(idx, (category, color))| {
                    PlotTrace::Histogram(
                        Histogram::new(finite(idx))
                            .name(category)
                            .legend_group(category)
                            .opacity(HISTOGRAM_GROUP_OPACITY)
                            .marker(Marker::new().color(color.clone()))
                            .show_legend(false),
                    )
                })
                .collect(),
            _ => {
                let all: Vec<usize> = (0..self.values.len()).collect();
                vec![PlotTrace::Histogram(
                    Histogram::new(finite(&all))
                        .opacity(self.style.alpha)
                        .show_legend(false),
                )]
            }
        };
        Ok(traces)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// One violin: the values of a group and its fill color.
#[derive(Debug, Clone, PartialEq)]
pub struct ViolinGroup {
    /// Tick label under the violin.
    pub label: String,
    /// Values of the group's observations.
    pub values: Vec<f64>,
    /// Fill color.
    pub color: String,
}

/// Violin panel: one density outline per group, side by side
#[derive(Debug, Clone, PartialEq)]
pub struct ViolinPlot {
    groups: Vec<ViolinGroup>,
    outlines: Vec<Option<DensityOutline>>,
    style: PanelStyle,
    bounds: PlotBounds,
}

impl ViolinPlot {
    /// Violins side by side in group order, densities estimated up front.
    pub fn new(groups: Vec<ViolinGroup>, style: PanelStyle) -> Self {
        let outlines: Vec<Option<DensityOutline>> = groups
            .iter()
            .map(|g| gaussian_kde(&g.values, DENSITY_POINTS))
            .collect();

        let mut ys: Vec<f64> = groups.iter().flat_map(|g| g.values.iter().copied()).collect();
        ys.extend(outlines.iter().flatten().flat_map(|o| o.grid.iter().copied()));
        let (y_min, y_max) = finite_extent(&ys).unwrap_or((0.0, 1.0));
        let bounds = PlotBounds::new(-0.5, groups.len() as f64 - 0.5, y_min, y_max);

        Self {
            groups,
            outlines,
            style,
            bounds,
        }
    }

    /// The groups, in drawing order.
    pub fn groups(&self) -> &[ViolinGroup] {
        &self.groups
    }

    /// Density outline of group `i`; `None` when its spread is zero.
    pub fn outline(&self, i: usize) -> Option<&DensityOutline> {
        self.outlines.get(i).and_then(Option::as_ref)
    }

    fn body(&self, pos: f64, group: &ViolinGroup, outline: Option<&DensityOutline>) -> Option<Box<Scatter<f64, f64>>> {
        let line = Line::new().color(group.color.clone()).width(1.0);
        match outline {
            Some(outline) => {
                let peak = outline.peak();
                let half: Vec<f64> = outline
                    .density
                    .iter()
                    .map(|d| if peak > 0.0 { VIOLIN_HALF_WIDTH * d / peak } else { 0.0 })
                    .collect();
                let mut xs: Vec<f64> = half.iter().map(|h| pos + h).collect();
                xs.extend(half.iter().rev().map(|h| pos - h));
                let mut ys = outline.grid.clone();
                ys.extend(outline.grid.iter().rev());
                Some(
                    Scatter::new(xs, ys)
                        .mode(Mode::Lines)
                        .fill(Fill::ToSelf)
                        .fill_color(group.color.clone())
                        .line(line)
                        .opacity(self.style.alpha),
                )
            }
            None => {
                // Zero spread: a flat bar at the single value.
                let value = group.values.iter().copied().find(|v| !v.is_nan())?;
                Some(
                    Scatter::new(
                        vec![pos - VIOLIN_HALF_WIDTH, pos + VIOLIN_HALF_WIDTH],
                        vec![value, value],
                    )
                    .mode(Mode::Lines)
                    .line(line.width(2.0)),
                )
            }
        }
    }
}

impl PlotElement for ViolinPlot {
    fn metadata(&self) -> &PlotMetadata {
        &self.style.metadata
    }

    fn size(&self) -> (usize, usize) {
        (self.style.width, self.style.height)
    }

    fn x_axis(&self) -> AxisConfig {
        let ticks = self
            .groups
            .iter()
            .enumerate()
            .map(|(i, g)| (i as f64, g.label.clone()))
            .collect();
        AxisConfig {
            ticks: Some(ticks),
            grid: false,
            ..self.style.x_axis(Some((self.bounds.x_min, self.bounds.x_max)))
        }
    }

    fn y_axis(&self) -> AxisConfig {
        let b = padded(self.bounds, self.style.padding);
        self.style.y_axis(Some((b.y_min, b.y_max)))
    }

    fn to_plotly_traces(&self, _ctx: &PanelContext<'_>) -> ScPlotResult<Vec<PlotTrace>> {
        let mut traces = Vec::with_capacity(self.groups.len() * 2);
        for (i, (group, outline)) in self.groups.iter().zip(&self.outlines).enumerate() {
            let pos = i as f64;
            if let Some(body) = self.body(pos, group, outline.as_ref()) {
                traces.push(PlotTrace::Scatter(
                    body.name(&group.label).show_legend(false),
                ));
            }
            let finite: Vec<f64> = group.values.iter().copied().filter(|v| !v.is_nan()).collect();
            if finite.is_empty() {
                continue;
            }
            let median = ReduceFunction::Median.apply(&finite);
            traces.push(PlotTrace::Scatter(
                Scatter::new(vec![pos], vec![median])
                    .mode(Mode::Markers)
                    .marker(
                        Marker::new()
                            .color("white".to_string())
                            .size(6)
                            .line(Line::new().color("black".to_string()).width(1.0)),
                    )
                    .name(&group.label)
                    .show_legend(false),
            ));
        }
        Ok(traces)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Color grid of one summarized value per (feature, group) cell
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapPlot {
    features: Vec<String>,
    groups: Vec<String>,
    /// groups × features; `NaN` where a cell has no observations
    values: Array2<f64>,
    colormap: Colormap,
    style: PanelStyle,
}

impl HeatmapPlot {
    /// Heatmap of a groups × features summary.
    ///
    /// # Errors
    /// Returns an error if `values` is not groups × features or the colormap is unknown.
    pub fn new(
        features: Vec<String>,
        groups: Vec<String>,
        values: Array2<f64>,
        colormap: Colormap,
        style: PanelStyle,
    ) -> ScPlotResult<Self> {
        if values.dim() != (groups.len(), features.len()) {
            return Err(ScPlotError::DimensionMismatch(format!(
                "heatmap values are {:?}, expected ({}, {})",
                values.dim(),
                groups.len(),
                features.len()
            )));
        }
        colormap.to_color_scale()?;
        Ok(Self {
            features,
            groups,
            values,
            colormap,
            style,
        })
    }

    /// Column labels.
    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Row labels.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// The summarized value of a cell, by name.
    pub fn value(&self, feature: &str, group: &str) -> Option<f64> {
        let f = self.features.iter().position(|x| x == feature)?;
        let g = self.groups.iter().position(|x| x == group)?;
        Some(self.values[[g, f]])
    }
}

impl PlotElement for HeatmapPlot {
    fn metadata(&self) -> &PlotMetadata {
        &self.style.metadata
    }

    fn size(&self) -> (usize, usize) {
        (self.style.width, self.style.height)
    }

    fn x_axis(&self) -> AxisConfig {
        AxisConfig {
            grid: false,
            ..self.style.x_axis(None)
        }
    }

    fn y_axis(&self) -> AxisConfig {
        AxisConfig {
            grid: false,
            ..self.style.y_axis(None)
        }
    }

    fn to_plotly_traces(&self, ctx: &PanelContext<'_>) -> ScPlotResult<Vec<PlotTrace>> {
        let z: Vec<Vec<f64>> = self.values.rows().into_iter().map(|r| r.to_vec()).collect();
        let trace = HeatMap::new(self.features.clone(), self.groups.clone(), z)
            .color_scale(self.colormap.to_color_scale()?)
            .show_scale(self.style.colorbar)
            .color_bar(ColorBar::new().x(ctx.colorbar_x()));
        Ok(vec![PlotTrace::HeatMap(trace)])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// One (variable, group) cell of a dot plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotCell {
    /// Column index into the variables.
    pub variable: usize,
    /// Row index into the groups.
    pub group: usize,
    /// Reduced value, mapped to color.
    pub summary: f64,
    /// Non-zero fraction, mapped to size.
    pub fraction: f64,
    /// Marker size in pixels.
    pub pixels: f64,
}

/// Dot plot panel: variables across, groups down
#[derive(Debug, Clone, PartialEq)]
pub struct DotPlot {
    cells: Vec<DotCell>,
    variables: Vec<String>,
    groups: Vec<String>,
    summary_label: String,
    colormap: Colormap,
    style: PanelStyle,
}

impl DotPlot {
    /// Dot plot over a variables × groups grid.
    ///
    /// # Errors
    /// Returns an error if a cell indexes outside the grid or the colormap is unknown.
    pub fn new(
        cells: Vec<DotCell>,
        variables: Vec<String>,
        groups: Vec<String>,
        summary_label: &str,
        colormap: Colormap,
        style: PanelStyle,
    ) -> ScPlotResult<Self> {
        if let Some(cell) = cells
            .iter()
            .find(|c| c.variable >= variables.len() || c.group >= groups.len())
        {
            return Err(ScPlotError::DimensionMismatch(format!(
                "dot cell ({}, {}) outside a {}×{} grid",
                cell.variable,
                cell.group,
                variables.len(),
                groups.len()
            )));
        }
        colormap.to_color_scale()?;
        Ok(Self {
            cells,
            variables,
            groups,
            summary_label: summary_label.to_string(),
            colormap,
            style,
        })
    }

    /// Every cell, in construction order.
    pub fn cells(&self) -> &[DotCell] {
        &self.cells
    }

    /// The cell at a grid position.
    pub fn cell(&self, variable: usize, group: usize) -> Option<&DotCell> {
        self.cells
            .iter()
            .find(|c| c.variable == variable && c.group == group)
    }

    /// Column labels.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Row labels.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Half a step of room around the outer dots.
    fn bounds(&self) -> PlotBounds {
        PlotBounds::new(
            -0.5,
            self.variables.len() as f64 + 0.5,
            -0.5,
            self.groups.len() as f64 + 0.5,
        )
    }

    fn hover(&self, cell: &DotCell) -> String {
        format!(
            "{} | {}<br>{}: {:.3}<br>fraction: {:.1}%",
            self.variables[cell.variable],
            self.groups[cell.group],
            self.summary_label,
            cell.summary,
            cell.fraction * 100.0
        )
    }
}

fn tick_labels(labels: &[String]) -> Vec<(f64, String)> {
    labels
        .iter()
        .enumerate()
        .map(|(i, l)| (i as f64, l.clone()))
        .collect()
}

impl PlotElement for DotPlot {
    fn metadata(&self) -> &PlotMetadata {
        &self.style.metadata
    }

    fn size(&self) -> (usize, usize) {
        (self.style.width, self.style.height)
    }

    fn x_axis(&self) -> AxisConfig {
        let b = self.bounds();
        AxisConfig {
            ticks: Some(tick_labels(&self.variables)),
            ..self.style.x_axis(Some((b.x_min, b.x_max)))
        }
    }

    fn y_axis(&self) -> AxisConfig {
        let b = self.bounds();
        AxisConfig {
            ticks: Some(tick_labels(&self.groups)),
            ..self.style.y_axis(Some((b.y_min, b.y_max)))
        }
    }

    fn to_plotly_traces(&self, ctx: &PanelContext<'_>) -> ScPlotResult<Vec<PlotTrace>> {
        let x: Vec<f64> = self.cells.iter().map(|c| c.variable as f64).collect();
        let y: Vec<f64> = self.cells.iter().map(|c| c.group as f64).collect();
        let marker = Marker::new()
            .size_array(self.cells.iter().map(|c| to_pixels(c.pixels)).collect())
            .color_array(self.cells.iter().map(|c| c.summary).collect::<Vec<f64>>())
            .color_scale(self.colormap.to_color_scale()?)
            .show_scale(self.style.colorbar)
            .color_bar(ColorBar::new().x(ctx.colorbar_x()))
            .opacity(self.style.alpha);
        let trace = Scatter::new(x, y)
            .mode(Mode::Markers)
            .marker(marker)
            .hover_text_array(self.cells.iter().map(|c| self.hover(c)).collect::<Vec<_>>())
            .show_legend(false);
        Ok(vec![PlotTrace::Scatter(trace)])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn ctx(theme: &PlotTheme) -> PanelContext<'_> {
        PanelContext {
            theme,
            x_domain: (0.0, 0.5),
            y_domain: (0.0, 1.0),
        }
    }

    #[test]
    fn test_panel_style_from_options() {
        let style = PanelStyle::from_options(&PlotOptions {
            width: Some(400),
            x_tick_rotation: Some(90.0),
            padding: Some(0.1),
            ..Default::default()
        });
        assert_eq!(style.width, 400);
        assert_eq!(style.height, DEFAULT_PANEL_SIZE);
        assert_eq!(style.x_axis(None).tick_angle, Some(-90.0));
        assert!(style.show_y_axis);
        assert_eq!(style.nonselection_alpha, None);
    }

    #[test]
    fn test_scatter_reports_unselected_opacity() {
        let style = PanelStyle::from_options(&PlotOptions {
            nonselection_alpha: Some(0.1),
            ..Default::default()
        });
        let plot = ScatterPlot::new(vec![0.0], vec![1.0], style).unwrap();
        assert_eq!(plot.unselected_opacity(), Some(0.1));

        let histogram = HistogramPlot::new(vec![0.0, 1.0], PanelStyle::default());
        assert_eq!(histogram.unselected_opacity(), None);
    }

    #[test]
    fn test_scatter_rejects_mismatched_lengths() {
        let err = ScatterPlot::new(vec![1.0, 2.0], vec![1.0], PanelStyle::default()).unwrap_err();
        assert!(matches!(err, ScPlotError::DimensionMismatch(_)));

        let plot = ScatterPlot::new(vec![1.0, 2.0], vec![1.0, 2.0], PanelStyle::default()).unwrap();
        assert!(plot.with_sizes(MarkerSizes::PerPoint(vec![1.0])).is_err());
    }

    #[test]
    fn test_categorical_scatter_has_one_trace_per_category() {
        let column = ObsColumn::categorical(&["b", "a", "b"]);
        let color = ColorEncoding::from_column(&column, &Colormap::named("Category10"), true).unwrap();
        let plot = ScatterPlot::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 2.0], PanelStyle::default())
            .unwrap()
            .with_color(color)
            .unwrap();

        let theme = PlotTheme::default();
        let traces = plot.to_plotly_traces(&ctx(&theme)).unwrap();
        assert_eq!(traces.len(), 2);
        assert!(!plot.has_colorbar());
        assert!(plot.has_legend());
    }

    #[test]
    fn test_numeric_color_is_continuous() {
        let column = ObsColumn::numeric(&[1, 2, 3]);
        let color = ColorEncoding::from_column(&column, &Colormap::named("viridis"), true).unwrap();
        let plot = ScatterPlot::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 2.0], PanelStyle::default())
            .unwrap()
            .with_color(color)
            .unwrap();
        assert!(plot.has_colorbar());
        assert!(!plot.has_legend());

        let theme = PlotTheme::default();
        assert_eq!(plot.to_plotly_traces(&ctx(&theme)).unwrap().len(), 1);
    }

    #[test]
    fn test_scatter_axis_range_is_padded() {
        let style = PanelStyle {
            padding: 0.5,
            ..PanelStyle::default()
        };
        let plot = ScatterPlot::new(vec![0.0, 2.0], vec![1.0, 1.0], style).unwrap();
        assert_eq!(plot.x_axis().range, Some((-1.0, 3.0)));
    }

    #[test]
    fn test_violin_outlines_and_flat_groups() {
        let plot = ViolinPlot::new(
            vec![
                ViolinGroup {
                    label: "a".into(),
                    values: vec![1.0, 2.0, 3.0, 4.0],
                    color: "#1f77b4".into(),
                },
                ViolinGroup {
                    label: "b".into(),
                    values: vec![5.0, 5.0],
                    color: "#aec7e8".into(),
                },
            ],
            PanelStyle::default(),
        );
        assert!(plot.outline(0).is_some());
        assert!(plot.outline(1).is_none());
        assert_eq!(plot.x_axis().range, Some((-0.5, 1.5)));

        let theme = PlotTheme::default();
        // body + median for each group
        assert_eq!(plot.to_plotly_traces(&ctx(&theme)).unwrap().len(), 4);
    }

    #[test]
    fn test_heatmap_lookup_and_shape_check() {
        let plot = HeatmapPlot::new(
            vec!["CD3D".into(), "LYZ".into()],
            vec!["0".into()],
            array![[1.0, 2.0]],
            Colormap::named("Reds"),
            PanelStyle::default(),
        )
        .unwrap();
        assert_eq!(plot.value("LYZ", "0"), Some(2.0));
        assert_eq!(plot.value("LYZ", "1"), None);

        let err = HeatmapPlot::new(
            vec!["CD3D".into()],
            vec!["0".into()],
            array![[1.0, 2.0]],
            Colormap::named("Reds"),
            PanelStyle::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ScPlotError::DimensionMismatch(_)));
    }

    #[test]
    fn test_dotplot_axes_cover_grid() {
        let cell = DotCell {
            variable: 1,
            group: 0,
            summary: 2.0,
            fraction: 0.5,
            pixels: 7.0,
        };
        let plot = DotPlot::new(
            vec![cell],
            vec!["CD3D".into(), "LYZ".into()],
            vec!["0".into()],
            "mean",
            Colormap::named("Reds"),
            PanelStyle::default(),
        )
        .unwrap();
        assert_eq!(plot.x_axis().range, Some((-0.5, 2.5)));
        assert_eq!(plot.y_axis().range, Some((-0.5, 1.5)));
        assert_eq!(plot.cell(1, 0), Some(&cell));
        assert!(plot.hover(&cell).contains("fraction: 50.0%"));
    }
}
