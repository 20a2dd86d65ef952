//! Groupwise summaries of variable columns.
//!
//! Dot plots and heatmaps summarize each (variable, group) cell of the
//! extracted values. The reductions themselves come from `ndarray`; this
//! module only does the grouping and bookkeeping.

use ndarray::{Array2, ArrayView1, ArrayView2};
use tracing::trace;

use crate::obs::Grouping;
use crate::operations::types::ReduceFunction;

impl ReduceFunction {
    /// Reduce a slice of values. Empty slices give `NaN` except for `Sum`.
    pub fn apply(&self, values: &[f64]) -> f64 {
        let view = ArrayView1::from(values);
        match self {
            ReduceFunction::Mean => view.mean().unwrap_or(f64::NAN),
            ReduceFunction::Median => median(values),
            ReduceFunction::Sum => view.sum(),
            ReduceFunction::Min if values.is_empty() => f64::NAN,
            ReduceFunction::Min => view.fold(f64::INFINITY, |acc, &v| acc.min(v)),
            ReduceFunction::Max if values.is_empty() => f64::NAN,
            ReduceFunction::Max => view.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v)),
            ReduceFunction::Custom(f) => f(values),
        }
    }

    /// Short name used in hover text.
    pub const fn name(&self) -> &'static str {
        match self {
            ReduceFunction::Mean => "mean",
            ReduceFunction::Median => "median",
            ReduceFunction::Sum => "sum",
            ReduceFunction::Min => "min",
            ReduceFunction::Max => "max",
            ReduceFunction::Custom(_) => "summary",
        }
    }
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Fraction of entries that are non-zero (`NaN` counts as non-zero).
pub fn non_zero_fraction(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().filter(|&&v| v != 0.0).count() as f64 / values.len() as f64
}

/// Per-(group, variable) summaries, laid out groups × variables.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    /// Reduced value of each cell.
    pub summary: Array2<f64>,
    /// Non-zero fraction of each cell.
    pub fraction: Array2<f64>,
}

/// Summarize the columns of `values` (observations × variables) per group.
pub fn summarize_by_group(
    values: ArrayView2<'_, f64>,
    grouping: &Grouping,
    reduce: ReduceFunction,
) -> GroupSummary {
    let n_groups = grouping.n_groups();
    let n_vars = values.ncols();
    let mut summary = Array2::from_elem((n_groups, n_vars), f64::NAN);
    let mut fraction = Array2::from_elem((n_groups, n_vars), f64::NAN);

    for group in 0..n_groups {
        let members = grouping.members(group);
        for var in 0..n_vars {
            let cell: Vec<f64> = members.iter().map(|&i| values[[i, var]]).collect();
            summary[[group, var]] = reduce.apply(&cell);
            fraction[[group, var]] = non_zero_fraction(&cell);
            trace!(
                group = %grouping.labels()[group],
                var,
                n = cell.len(),
                summary = summary[[group, var]],
                fraction = fraction[[group, var]],
                "summarized cell"
            );
        }
    }
    GroupSummary { summary, fraction }
}
