//! Size encoding: mapping a numeric field onto marker pixel sizes, and the
//! side panel that explains the mapping.

use std::any::Any;

use plotly::Scatter;
use plotly::common::{Font, Marker, Mode, Position};

use super::core::{AxisConfig, PanelContext, PlotElement, PlotMetadata, PlotTrace};
use crate::ScPlotResult;

/// Linear interpolation with clamping at the endpoints.
///
/// Values at or beyond `x_range.1` map to `y_range.1`, values at or below
/// `x_range.0` map to `y_range.0`. A degenerate range maps everything at or
/// above it to `y_range.1`. `NaN` stays `NaN`.
pub fn interp(x: f64, x_range: (f64, f64), y_range: (f64, f64)) -> f64 {
    let ((x0, x1), (y0, y1)) = (x_range, y_range);
    if x.is_nan() {
        f64::NAN
    } else if x >= x1 {
        y1
    } else if x <= x0 {
        y0
    } else {
        y0 + (x - x0) * (y1 - y0) / (x1 - x0)
    }
}

/// Marker size in whole pixels; non-finite sizes draw nothing.
pub(crate) fn to_pixels(size: f64) -> usize {
    if size.is_finite() {
        size.max(0.0).round() as usize
    } else {
        0
    }
}

/// A value range mapped linearly onto a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeScale {
    /// Field values at the small and large end.
    pub value_range: (f64, f64),
    /// Marker sizes in pixels at the small and large end.
    pub pixel_range: (f64, f64),
}

impl SizeScale {
    /// Map `value_range` onto `pixel_range`.
    pub const fn new(value_range: (f64, f64), pixel_range: (f64, f64)) -> Self {
        Self {
            value_range,
            pixel_range,
        }
    }

    /// Pixel size for one value.
    pub fn map(&self, value: f64) -> f64 {
        interp(value, self.value_range, self.pixel_range)
    }

    /// Pixel sizes for many values.
    pub fn map_all(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.map(v)).collect()
    }
}

/// Legend step for a fraction range of width `span`.
///
/// | span            | step |
/// |-----------------|------|
/// | `<= 0.3`        | 0.05 |
/// | `(0.3, 0.6]`    | 0.1  |
/// | `> 0.6`         | 0.2  |
pub fn fraction_legend_step(span: f64) -> f64 {
    if span > 0.3 && span <= 0.6 {
        0.1
    } else if span <= 0.3 {
        0.05
    } else {
        0.2
    }
}

/// Evenly spaced values in `[start, stop)`, `ceil((stop - start) / step)` of them.
pub fn arange(start: f64, stop: f64, step: f64) -> Vec<f64> {
    let n = ((stop - start) / step).ceil();
    if !n.is_finite() || n <= 0.0 {
        return Vec::new();
    }
    (0..n as usize).map(|i| start + i as f64 * step).collect()
}

/// Legend ticks for a fraction range.
///
/// Ticks start at `fraction_min` when it is positive and one step above it
/// otherwise, and run up to and including `fraction_max` where the step
/// lands on it.
// TODO: the zero-start rule skips a 0% tick even when fraction_min is
// deliberately 0; revisit once someone needs a 0% entry in the legend.
pub fn fraction_ticks(fraction_min: f64, fraction_max: f64) -> Vec<f64> {
    let step = fraction_legend_step(fraction_max - fraction_min);
    let start = if fraction_min > 0.0 {
        fraction_min
    } else {
        fraction_min + step
    };
    arange(start, fraction_max + step, step)
}

/// How legend tick values are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFormat {
    /// One decimal: `3.5`.
    Fixed1,
    /// Whole percent: `20%`.
    Percent,
}

impl TickFormat {
    /// Print one tick value.
    pub fn format(self, value: f64) -> String {
        match self {
            TickFormat::Fixed1 => format!("{value:.1}"),
            TickFormat::Percent => format!("{:.0}%", value * 100.0),
        }
    }
}

const LEGEND_WIDTH: usize = 125;
const LEGEND_MARKER_X: f64 = 0.1;
const LEGEND_LABEL_X: f64 = 0.2;

/// Side panel listing sample values next to markers of the matching size.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeLegend {
    ticks: Vec<f64>,
    pixels: Vec<f64>,
    labels: Vec<String>,
    dot_max: f64,
    metadata: PlotMetadata,
}

impl SizeLegend {
    /// One row per tick, the marker sized through `scale`.
    pub fn new(scale: SizeScale, ticks: Vec<f64>, format: TickFormat) -> Self {
        let pixels = scale.map_all(&ticks);
        let labels = ticks.iter().map(|&t| format.format(t)).collect();
        Self {
            ticks,
            pixels,
            labels,
            dot_max: scale.pixel_range.1,
            metadata: PlotMetadata::default(),
        }
    }

    /// Tick values, top to bottom.
    pub fn ticks(&self) -> &[f64] {
        &self.ticks
    }

    /// Marker size of every tick.
    pub fn pixels(&self) -> &[f64] {
        &self.pixels
    }

    /// Printed tick values.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Rows are stacked top to bottom: the first tick sits at y = n.
    fn rows(&self) -> Vec<f64> {
        let n = self.ticks.len();
        (0..n).map(|i| (n - i) as f64).collect()
    }
}

impl PlotElement for SizeLegend {
    fn metadata(&self) -> &PlotMetadata {
        &self.metadata
    }

    fn size(&self) -> (usize, usize) {
        let height = (self.ticks.len() as f64 * (self.dot_max + 12.0)) as usize;
        (LEGEND_WIDTH, height)
    }

    fn x_axis(&self) -> AxisConfig {
        AxisConfig::hidden((0.0, 1.0))
    }

    fn y_axis(&self) -> AxisConfig {
        // Inverted: first tick on top.
        AxisConfig::hidden((self.ticks.len() as f64 + 1.0, 0.0))
    }

    fn to_plotly_traces(&self, ctx: &PanelContext<'_>) -> ScPlotResult<Vec<PlotTrace>> {
        let rows = self.rows();
        let n = rows.len();
        let sizes: Vec<usize> = self.pixels.iter().map(|&p| to_pixels(p)).collect();

        let markers = Scatter::new(vec![LEGEND_MARKER_X; n], rows.clone())
            .mode(Mode::Markers)
            .marker(Marker::new().size_array(sizes).color("black".to_string()))
            .hover_text_array(self.labels.clone())
            .show_legend(false);

        let labels = Scatter::new(vec![LEGEND_LABEL_X; n], rows)
            .mode(Mode::Text)
            .text_array(self.labels.clone())
            .text_position(Position::MiddleRight)
            .text_font(
                Font::new()
                    .family(ctx.theme.font_family.as_str())
                    .size(9)
                    .color(ctx.theme.text_color.clone()),
            )
            .show_legend(false);

        Ok(vec![PlotTrace::Scatter(markers), PlotTrace::Scatter(labels)])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    #[test]
    fn test_interp_endpoints_are_exact() {
        let scale = SizeScale::new((3.0, 11.0), (2.0, 14.0));
        assert_eq!(scale.map(3.0), 2.0);
        assert_eq!(scale.map(11.0), 14.0);
        assert_approx_eq!(scale.map(7.0), 8.0, 1e-12);
    }

    #[test]
    fn test_interp_clamps_outside_range() {
        let scale = SizeScale::new((0.2, 0.8), (0.0, 14.0));
        assert_eq!(scale.map(0.0), 0.0);
        assert_eq!(scale.map(1.0), 14.0);
        assert!(scale.map(f64::NAN).is_nan());
    }

    #[test]
    fn test_interp_degenerate_range() {
        assert_eq!(interp(5.0, (5.0, 5.0), (2.0, 14.0)), 14.0);
        assert_eq!(interp(4.0, (5.0, 5.0), (2.0, 14.0)), 2.0);
    }

    #[test]
    fn test_fraction_legend_step_rules() {
        assert_eq!(fraction_legend_step(0.25), 0.05);
        assert_eq!(fraction_legend_step(0.45), 0.1);
        assert_eq!(fraction_legend_step(0.8), 0.2);
        assert_eq!(fraction_legend_step(0.3), 0.05);
        assert_eq!(fraction_legend_step(0.6), 0.1);
    }

    #[test]
    fn test_fraction_ticks_skip_zero_start() {
        let ticks = fraction_ticks(0.0, 0.45);
        assert_eq!(ticks.len(), 5);
        assert_approx_eq!(ticks[0], 0.1, 1e-12);
        assert_approx_eq!(ticks[4], 0.5, 1e-12);
    }

    #[test]
    fn test_fraction_ticks_start_at_positive_min() {
        let ticks = fraction_ticks(0.1, 0.9);
        assert_approx_eq!(ticks[0], 0.1, 1e-12);
        assert_approx_eq!(ticks[1], 0.3, 1e-12);
    }

    #[test]
    fn test_arange_empty_for_non_positive_span() {
        assert!(arange(1.0, 1.0, 0.1).is_empty());
        assert!(arange(1.0, 0.0, 0.1).is_empty());
    }

    #[test]
    fn test_tick_formats() {
        assert_eq!(TickFormat::Fixed1.format(3.25), "3.2");
        assert_eq!(TickFormat::Fixed1.format(7.0), "7.0");
        assert_eq!(TickFormat::Percent.format(0.2), "20%");
    }

    #[test]
    fn test_legend_layout() {
        let legend = SizeLegend::new(
            SizeScale::new((0.0, 1.0), (0.0, 14.0)),
            vec![0.5, 1.0],
            TickFormat::Percent,
        );
        assert_eq!(legend.labels(), &["50%", "100%"]);
        assert_eq!(legend.pixels(), &[7.0, 14.0]);
        assert_eq!(legend.rows(), vec![2.0, 1.0]);
        assert_eq!(legend.size(), (125, 52));
        assert_eq!(legend.y_axis().range, Some((3.0, 0.0)));
    }
}
