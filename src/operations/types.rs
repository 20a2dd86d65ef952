//! Supporting types shared by the plotting operations.

use serde::{Deserialize, Serialize};

/// Pass-through styling options.
///
/// Every plotting operation starts from its own defaults and lays the
/// caller's options over them with [`PlotOptions::merged_over`]: any field
/// the caller sets wins, everything else keeps the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotOptions {
    /// Panel title.
    pub title: Option<String>,
    /// Panel width in pixels.
    pub width: Option<usize>,
    /// Panel height in pixels.
    pub height: Option<usize>,
    /// X axis label; an empty string hides it.
    pub x_label: Option<String>,
    /// Y axis label; an empty string hides it.
    pub y_label: Option<String>,
    /// Fraction of the data range added on each side of both axes.
    pub padding: Option<f64>,
    /// Whether the x axis is drawn.
    pub show_x_axis: Option<bool>,
    /// Whether the y axis is drawn.
    pub show_y_axis: Option<bool>,
    /// Marker opacity.
    pub alpha: Option<f64>,
    /// Marker opacity of points left out of a box selection.
    pub nonselection_alpha: Option<f64>,
    /// Rotation of x tick labels in degrees.
    pub x_tick_rotation: Option<f64>,
    /// Whether continuous color encodings show a colorbar.
    pub colorbar: Option<bool>,
    /// Title font size in points.
    pub title_font_size: Option<usize>,
    /// Whether discrete encodings show a legend.
    pub show_legend: Option<bool>,
    /// Whether dragging selects points instead of zooming.
    pub box_select: Option<bool>,
}

impl PlotOptions {
    /// Lay these options over `defaults`, field by field.
    pub fn merged_over(&self, defaults: &PlotOptions) -> PlotOptions {
        PlotOptions {
            title: self.title.clone().or_else(|| defaults.title.clone()),
            width: self.width.or(defaults.width),
            height: self.height.or(defaults.height),
            x_label: self.x_label.clone().or_else(|| defaults.x_label.clone()),
            y_label: self.y_label.clone().or_else(|| defaults.y_label.clone()),
            padding: self.padding.or(defaults.padding),
            show_x_axis: self.show_x_axis.or(defaults.show_x_axis),
            show_y_axis: self.show_y_axis.or(defaults.show_y_axis),
            alpha: self.alpha.or(defaults.alpha),
            nonselection_alpha: self.nonselection_alpha.or(defaults.nonselection_alpha),
            x_tick_rotation: self.x_tick_rotation.or(defaults.x_tick_rotation),
            colorbar: self.colorbar.or(defaults.colorbar),
            title_font_size: self.title_font_size.or(defaults.title_font_size),
            show_legend: self.show_legend.or(defaults.show_legend),
            box_select: self.box_select.or(defaults.box_select),
        }
    }

    /// Padding, defaulting to none.
    pub fn padding_or_zero(&self) -> f64 {
        self.padding.unwrap_or(0.0)
    }
}

/// How the values of one (variable, group) cell are summarized.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub enum ReduceFunction {
    /// Arithmetic mean.
    #[default]
    Mean,
    /// Median (mean of the two middle values for even counts).
    Median,
    /// Sum.
    Sum,
    /// Minimum.
    Min,
    /// Maximum.
    Max,
    /// A caller-supplied reduction.
    #[serde(skip)]
    Custom(fn(&[f64]) -> f64),
}

impl PartialEq for ReduceFunction {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ReduceFunction::Custom(a), ReduceFunction::Custom(b)) => std::ptr::fn_addr_eq(*a, *b),
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}
