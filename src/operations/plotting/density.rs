//! Gaussian kernel density outlines for violin panels.

use ndarray::{Array1, ArrayView1};

/// Grid points per outline.
pub const DENSITY_POINTS: usize = 100;

/// The outline extends this many bandwidths past the data on both ends.
pub const DENSITY_CUT: f64 = 5.0;

/// A density curve sampled on an even grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityOutline {
    /// Evaluation points, ascending.
    pub grid: Vec<f64>,
    /// Density at each grid point.
    pub density: Vec<f64>,
}

impl DensityOutline {
    /// Largest density on the grid.
    pub fn peak(&self) -> f64 {
        self.density.iter().copied().fold(0.0, f64::max)
    }
}

/// Scott's rule bandwidth, `n^(-1/5)` times the sample standard deviation.
///
/// `None` for fewer than two values or zero spread.
pub fn scott_bandwidth(values: ArrayView1<'_, f64>) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let std = values.std(1.0);
    if !std.is_finite() || std <= 0.0 {
        return None;
    }
    Some(std * (n as f64).powf(-0.2))
}

/// Gaussian KDE of the non-`NaN` values, sampled at `points` grid points.
///
/// `None` when no bandwidth can be estimated.
pub fn gaussian_kde(values: &[f64], points: usize) -> Option<DensityOutline> {
    let data: Array1<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    let bandwidth = scott_bandwidth(data.view())?;
    let lo = data.fold(f64::INFINITY, |acc, &v| acc.min(v)) - DENSITY_CUT * bandwidth;
    let hi = data.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v)) + DENSITY_CUT * bandwidth;

    let grid = Array1::linspace(lo, hi, points.max(2));
    let norm = data.len() as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt();
    let density = grid
        .iter()
        .map(|&x| {
            data.iter()
                .map(|&xi| {
                    let z = (x - xi) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum::<f64>()
                / norm
        })
        .collect();

    Some(DensityOutline {
        grid: grid.to_vec(),
        density,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    #[test]
    fn test_scott_bandwidth() {
        let values = Array1::from(vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        let expected = 2.5f64.sqrt() * 5f64.powf(-0.2);
        assert_approx_eq!(scott_bandwidth(values.view()).unwrap(), expected, 1e-12);
    }

    #[test]
    fn test_degenerate_samples_have_no_outline() {
        assert!(gaussian_kde(&[1.0], DENSITY_POINTS).is_none());
        assert!(gaussian_kde(&[2.0, 2.0, 2.0], DENSITY_POINTS).is_none());
        assert!(gaussian_kde(&[f64::NAN, 2.0], DENSITY_POINTS).is_none());
    }

    #[test]
    fn test_density_integrates_to_one() {
        let outline = gaussian_kde(&[0.0, 1.0, 2.0, 3.0, 4.0], DENSITY_POINTS).unwrap();
        let step = outline.grid[1] - outline.grid[0];
        let area: f64 = outline
            .density
            .windows(2)
            .map(|w| (w[0] + w[1]) * step / 2.0)
            .sum();
        assert_approx_eq!(area, 1.0, 1e-2);
    }

    #[test]
    fn test_symmetric_data_peaks_in_the_middle() {
        let outline = gaussian_kde(&[-1.0, 0.0, 0.0, 1.0], 101).unwrap();
        let peak_at = outline
            .density
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak_at, 50);
        assert!(outline.grid[50].abs() < 1e-9);
    }
}
