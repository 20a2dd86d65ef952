//! Colormap selection for continuous scales and categorical palettes.
//!
//! A [`Colormap`] is either the name of a palette or an explicit list of
//! colors. Continuous encodings hand it to plotly as a color scale; discrete
//! encodings sample one color per category from it.

use plotly::common::{ColorScale, ColorScaleElement, ColorScalePalette};
use serde::{Deserialize, Serialize};

use crate::{ScPlotError, ScPlotResult};

const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

const CATEGORY20: [&str; 20] = [
    "#1f77b4", "#aec7e8", "#ff7f0e", "#ffbb78", "#2ca02c", "#98df8a", "#d62728", "#ff9896",
    "#9467bd", "#c5b0d5", "#8c564b", "#c49c94", "#e377c2", "#f7b6d2", "#7f7f7f", "#c7c7c7",
    "#bcbd22", "#dbdb8d", "#17becf", "#9edae5",
];

// Anchor colors for sampling sequential palettes into discrete colors.
const VIRIDIS: [&str; 9] = [
    "#440154", "#482777", "#3f4a8a", "#31678e", "#26838f", "#1f9d8a", "#6cce5a", "#b6de2b",
    "#fee825",
];
const REDS: [&str; 9] = [
    "#fff5f0", "#fee0d2", "#fcbba1", "#fc9272", "#fb6a4a", "#ef3b2c", "#cb181d", "#a50f15",
    "#67000d",
];
const BLUES: [&str; 9] = [
    "#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5", "#08519c",
    "#08306b",
];
const GREENS: [&str; 9] = [
    "#f7fcf5", "#e5f5e0", "#c7e9c0", "#a1d99b", "#74c476", "#41ab5d", "#238b45", "#006d2c",
    "#00441b",
];
const GREYS: [&str; 9] = [
    "#ffffff", "#f0f0f0", "#d9d9d9", "#bdbdbd", "#969696", "#737373", "#525252", "#252525",
    "#000000",
];

/// A named palette or an explicit list of colors (hex or CSS names).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Colormap {
    /// Palette name, matched case-insensitively (`"Reds"`, `"viridis"`, `"Category20"`, ...).
    Named(String),
    /// Explicit colors, spread evenly over a continuous scale or cycled for categories.
    Colors(Vec<String>),
}

impl Colormap {
    /// Colormap by palette name.
    pub fn named(name: &str) -> Self {
        Colormap::Named(name.to_string())
    }

    /// `viridis` for numeric encodings, `Category10` for categorical ones.
    pub fn default_for(numeric: bool) -> Self {
        if numeric {
            Colormap::named("viridis")
        } else {
            Colormap::named("Category10")
        }
    }

    fn key(name: &str) -> String {
        name.to_ascii_lowercase()
    }

    /// Discrete anchor colors for a named palette, if this crate knows them.
    fn anchors(name: &str) -> Option<&'static [&'static str]> {
        match Self::key(name).as_str() {
            "category10" => Some(&CATEGORY10[..]),
            "category20" => Some(&CATEGORY20[..]),
            "viridis" => Some(&VIRIDIS[..]),
            "reds" => Some(&REDS[..]),
            "blues" => Some(&BLUES[..]),
            "greens" => Some(&GREENS[..]),
            "greys" | "grays" => Some(&GREYS[..]),
            _ => None,
        }
    }

    fn is_qualitative(name: &str) -> bool {
        name.eq_ignore_ascii_case("category10") || name.eq_ignore_ascii_case("category20")
    }

    fn palette(name: &str) -> Option<ColorScalePalette> {
        let palette = match Self::key(name).as_str() {
            "greys" | "grays" => ColorScalePalette::Greys,
            "ylgnbu" => ColorScalePalette::YlGnBu,
            "greens" => ColorScalePalette::Greens,
            "ylorrd" => ColorScalePalette::YlOrRd,
            "bluered" => ColorScalePalette::Bluered,
            "rdbu" => ColorScalePalette::RdBu,
            "reds" => ColorScalePalette::Reds,
            "blues" => ColorScalePalette::Blues,
            "picnic" => ColorScalePalette::Picnic,
            "rainbow" => ColorScalePalette::Rainbow,
            "portland" => ColorScalePalette::Portland,
            "jet" => ColorScalePalette::Jet,
            "hot" => ColorScalePalette::Hot,
            "blackbody" => ColorScalePalette::Blackbody,
            "earth" => ColorScalePalette::Earth,
            "electric" => ColorScalePalette::Electric,
            "viridis" => ColorScalePalette::Viridis,
            "cividis" => ColorScalePalette::Cividis,
            _ => return None,
        };
        Some(palette)
    }

    fn spread<S: AsRef<str>>(colors: &[S]) -> ColorScale {
        let n = colors.len();
        let elements = colors
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let stop = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 };
                ColorScaleElement(stop, c.as_ref().to_string())
            })
            .collect();
        ColorScale::Vector(elements)
    }

    /// Color scale for continuous encodings.
    ///
    /// # Errors
    /// Returns an error for an unknown palette name or an empty color list.
    pub fn to_color_scale(&self) -> ScPlotResult<ColorScale> {
        match self {
            Colormap::Colors(colors) if colors.is_empty() => Err(ScPlotError::invalid_parameter(
                "cmap",
                "color list must not be empty",
            )),
            Colormap::Colors(colors) if colors.len() == 1 => {
                Ok(Self::spread(&[colors[0].as_str(), colors[0].as_str()]))
            }
            Colormap::Colors(colors) => Ok(Self::spread(colors)),
            Colormap::Named(name) if Self::is_qualitative(name) => {
                Ok(Self::spread(Self::anchors(name).unwrap_or(&CATEGORY10[..])))
            }
            Colormap::Named(name) => Self::palette(name)
                .map(ColorScale::Palette)
                .ok_or_else(|| {
                    ScPlotError::invalid_parameter("cmap", format!("unknown colormap '{name}'"))
                }),
        }
    }

    /// One color per category.
    ///
    /// Explicit lists and qualitative palettes are cycled; sequential
    /// palettes are sampled evenly from end to end.
    ///
    /// # Errors
    /// Returns an error if no discrete colors are known for the palette.
    pub fn categorical_colors(&self, n: usize) -> ScPlotResult<Vec<String>> {
        let (colors, cycle): (Vec<&str>, bool) = match self {
            Colormap::Colors(colors) if colors.is_empty() => {
                return Err(ScPlotError::invalid_parameter(
                    "cmap",
                    "color list must not be empty",
                ));
            }
            Colormap::Colors(colors) => (colors.iter().map(String::as_str).collect(), true),
            Colormap::Named(name) => {
                let anchors = Self::anchors(name).ok_or_else(|| {
                    ScPlotError::invalid_parameter(
                        "cmap",
                        format!("no discrete colors known for colormap '{name}'"),
                    )
                })?;
                (anchors.to_vec(), Self::is_qualitative(name))
            }
        };
        let picked = (0..n)
            .map(|i| {
                let idx = if cycle {
                    i % colors.len()
                } else if n > 1 {
                    ((i as f64 / (n - 1) as f64) * (colors.len() - 1) as f64).round() as usize
                } else {
                    colors.len() / 2
                };
                colors[idx].to_string()
            })
            .collect();
        Ok(picked)
    }
}

impl From<&str> for Colormap {
    fn from(name: &str) -> Self {
        Colormap::named(name)
    }
}

impl From<Vec<String>> for Colormap {
    fn from(colors: Vec<String>) -> Self {
        Colormap::Colors(colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualitative_palettes_cycle() {
        let colors = Colormap::named("Category10").categorical_colors(12).unwrap();
        assert_eq!(colors.len(), 12);
        assert_eq!(colors[0], "#1f77b4");
        assert_eq!(colors[10], colors[0]);
    }

    #[test]
    fn test_sequential_palettes_are_sampled_end_to_end() {
        let colors = Colormap::named("viridis").categorical_colors(3).unwrap();
        assert_eq!(colors, vec!["#440154", "#26838f", "#fee825"]);
    }

    #[test]
    fn test_explicit_colors_cycle() {
        let cmap = Colormap::Colors(vec!["red".into(), "blue".into()]);
        assert_eq!(cmap.categorical_colors(3).unwrap(), vec!["red", "blue", "red"]);
    }

    #[test]
    fn test_named_lookup_is_case_insensitive() {
        assert!(Colormap::named("REDS").to_color_scale().is_ok());
        assert!(Colormap::named("Category20").to_color_scale().is_ok());
    }

    #[test]
    fn test_unknown_names_are_rejected() {
        assert!(Colormap::named("not-a-cmap").to_color_scale().is_err());
        assert!(Colormap::named("jet").categorical_colors(2).is_err());
        assert!(Colormap::Colors(Vec::new()).to_color_scale().is_err());
    }

    #[test]
    fn test_colormap_deserializes_from_name_or_list() {
        let named: Colormap = serde_json::from_str("\"Reds\"").unwrap();
        assert_eq!(named, Colormap::named("Reds"));
        let list: Colormap = serde_json::from_str("[\"#000000\", \"#ffffff\"]").unwrap();
        assert_eq!(list, Colormap::Colors(vec!["#000000".into(), "#ffffff".into()]));
    }
}
