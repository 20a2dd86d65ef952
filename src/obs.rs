//! Observation metadata: the per-row table that sits beside the feature matrix.
//!
//! Columns are dynamically typed the way data-frame columns are. Numeric
//! columns drive continuous color scales and size encodings, while
//! categorical and text columns drive grouping and discrete coloring.
//! Categorical columns keep an explicit category order, which is the order
//! groups appear in every grouped plot.

use std::collections::BTreeSet;

use num_traits::{NumCast, ToPrimitive};

use crate::{ScPlotError, ScPlotResult};

/// Category labels plus one optional code per observation.
///
/// A `None` code marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct Categorical {
    categories: Vec<String>,
    codes: Vec<Option<usize>>,
}

impl Categorical {
    /// Build a categorical column from explicit categories and codes.
    ///
    /// # Errors
    /// Returns an error if a category is repeated or a code is out of range.
    pub fn new(categories: Vec<String>, codes: Vec<Option<usize>>) -> ScPlotResult<Self> {
        let unique: BTreeSet<&str> = categories.iter().map(String::as_str).collect();
        if unique.len() != categories.len() {
            return Err(ScPlotError::invalid_parameter(
                "categories",
                "category labels must be unique",
            ));
        }
        if let Some(bad) = codes.iter().flatten().find(|&&c| c >= categories.len()) {
            return Err(ScPlotError::invalid_parameter(
                "codes",
                format!(
                    "code {bad} out of range for {} categories",
                    categories.len()
                ),
            ));
        }
        Ok(Self { categories, codes })
    }

    /// Build a categorical column from labels, with categories in sorted order.
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Self {
        let categories: Vec<String> = labels
            .iter()
            .map(|s| s.as_ref().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let codes = labels
            .iter()
            .map(|s| categories.iter().position(|c| c == s.as_ref()))
            .collect();
        Self { categories, codes }
    }

    /// The category labels, in category order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Per-observation category codes.
    pub fn codes(&self) -> &[Option<usize>] {
        &self.codes
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether the column has no observations.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Label of observation `i`, or `None` when missing.
    pub fn label(&self, i: usize) -> Option<&str> {
        self.codes
            .get(i)
            .copied()
            .flatten()
            .map(|c| self.categories[c].as_str())
    }
}

/// A single observation metadata column.
#[derive(Debug, Clone, PartialEq)]
pub enum ObsColumn {
    /// Numeric values; `NaN` marks a missing value.
    Numeric(Vec<f64>),
    /// Whole numbers read from integer input, kept as `f64` for arithmetic.
    ///
    /// Labels print without a fractional part (`"0"`, `"1"`). `NaN` marks a
    /// missing value.
    Integer(Vec<f64>),
    /// Categorical values with an explicit category order.
    Categorical(Categorical),
    /// Free text values.
    Text(Vec<String>),
}

impl ObsColumn {
    /// Numeric column from any primitive numeric slice.
    ///
    /// Integer element types give an [`ObsColumn::Integer`] column.
    pub fn numeric<T: NumCast>(values: &[T]) -> Self {
        let converted = values
            .iter()
            .map(|v| v.to_f64().unwrap_or(f64::NAN))
            .collect();
        // An integer type cannot hold one half.
        let integral = <T as NumCast>::from(0.5).and_then(|half| half.to_f64()) != Some(0.5);
        if integral {
            ObsColumn::Integer(converted)
        } else {
            ObsColumn::Numeric(converted)
        }
    }

    /// Categorical column from labels, categories sorted.
    pub fn categorical<S: AsRef<str>>(labels: &[S]) -> Self {
        ObsColumn::Categorical(Categorical::from_labels(labels))
    }

    /// Text column from labels.
    pub fn text<S: AsRef<str>>(labels: &[S]) -> Self {
        ObsColumn::Text(labels.iter().map(|s| s.as_ref().to_string()).collect())
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        match self {
            ObsColumn::Numeric(v) | ObsColumn::Integer(v) => v.len(),
            ObsColumn::Categorical(c) => c.len(),
            ObsColumn::Text(v) => v.len(),
        }
    }

    /// Whether the column has no observations.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the column holds numbers (continuous color, size encoding).
    pub const fn is_numeric(&self) -> bool {
        matches!(self, ObsColumn::Numeric(_) | ObsColumn::Integer(_))
    }

    /// Borrow the numeric values, if any.
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            ObsColumn::Numeric(v) | ObsColumn::Integer(v) => Some(v),
            _ => None,
        }
    }

    /// Plain text rendition of every value.
    ///
    /// The renderer groups and colors by text labels, so categorical
    /// columns go through here before reaching it. Missing values render
    /// as `"nan"`.
    pub fn to_text(&self) -> Vec<String> {
        match self {
            ObsColumn::Numeric(v) => v.iter().map(|&x| format_number(x)).collect(),
            ObsColumn::Integer(v) => v.iter().map(|&x| format_integer(x)).collect(),
            ObsColumn::Categorical(c) => (0..c.len())
                .map(|i| c.label(i).unwrap_or("nan").to_string())
                .collect(),
            ObsColumn::Text(v) => v.clone(),
        }
    }

    /// Partition observations into groups.
    ///
    /// Group order is category order for categoricals (unobserved
    /// categories dropped), sorted order for text and ascending order for
    /// numbers. Missing values belong to no group.
    pub fn grouping(&self) -> Grouping {
        match self {
            ObsColumn::Categorical(c) => {
                let mut observed = vec![false; c.categories().len()];
                for code in c.codes().iter().flatten() {
                    observed[*code] = true;
                }
                let mut remap = vec![None; observed.len()];
                let mut labels = Vec::new();
                for (code, seen) in observed.iter().enumerate() {
                    if *seen {
                        remap[code] = Some(labels.len());
                        labels.push(c.categories()[code].clone());
                    }
                }
                let assignment = c
                    .codes()
                    .iter()
                    .map(|code| code.and_then(|k| remap[k]))
                    .collect();
                Grouping { labels, assignment }
            }
            ObsColumn::Text(values) => {
                let labels: Vec<String> = values
                    .iter()
                    .cloned()
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect();
                let assignment = values
                    .iter()
                    .map(|v| labels.binary_search(v).ok())
                    .collect();
                Grouping { labels, assignment }
            }
            ObsColumn::Numeric(values) => numeric_grouping(values, format_number),
            ObsColumn::Integer(values) => numeric_grouping(values, format_integer),
        }
    }
}

fn numeric_grouping(values: &[f64], format: fn(f64) -> String) -> Grouping {
    let mut unique: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    unique.sort_by(f64::total_cmp);
    unique.dedup();
    let assignment = values
        .iter()
        .map(|v| {
            if v.is_nan() {
                None
            } else {
                unique.binary_search_by(|u| u.total_cmp(v)).ok()
            }
        })
        .collect();
    let labels = unique.into_iter().map(format).collect();
    Grouping { labels, assignment }
}

impl From<Vec<f64>> for ObsColumn {
    fn from(values: Vec<f64>) -> Self {
        ObsColumn::Numeric(values)
    }
}

impl From<Vec<i64>> for ObsColumn {
    fn from(values: Vec<i64>) -> Self {
        ObsColumn::numeric(&values)
    }
}

impl From<Categorical> for ObsColumn {
    fn from(values: Categorical) -> Self {
        ObsColumn::Categorical(values)
    }
}

/// Formats a number the way data-frame string conversion does (`1.0`, `0.25`, `nan`).
pub(crate) fn format_number(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Formats a whole number the way integer columns print (`3`, `nan`).
fn format_integer(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        format!("{value:.0}")
    }
}

/// Observations partitioned into ordered, labelled groups.
#[derive(Debug, Clone, PartialEq)]
pub struct Grouping {
    labels: Vec<String>,
    assignment: Vec<Option<usize>>,
}

impl Grouping {
    /// Group labels in group order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Group index for each observation.
    pub fn assignment(&self) -> &[Option<usize>] {
        &self.assignment
    }

    /// Number of groups.
    pub fn n_groups(&self) -> usize {
        self.labels.len()
    }

    /// Observation indices belonging to group `group`.
    pub fn members(&self, group: usize) -> Vec<usize> {
        self.assignment
            .iter()
            .enumerate()
            .filter_map(|(i, g)| (*g == Some(group)).then_some(i))
            .collect()
    }
}

/// The observation metadata table, indexed by observation name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObsTable {
    index: Vec<String>,
    columns: Vec<(String, ObsColumn)>,
}

impl ObsTable {
    /// An empty table over the given observation names.
    pub fn new<S: AsRef<str>>(index: &[S]) -> Self {
        Self {
            index: index.iter().map(|s| s.as_ref().to_string()).collect(),
            columns: Vec::new(),
        }
    }

    /// An empty table with observations named `"0"`, `"1"`, ...
    pub fn with_len(n_obs: usize) -> Self {
        Self {
            index: (0..n_obs).map(|i| i.to_string()).collect(),
            columns: Vec::new(),
        }
    }

    /// Add (or replace) a column, consuming and returning the table.
    ///
    /// # Errors
    /// Returns an error if the column length differs from the index length.
    pub fn with_column(mut self, name: &str, column: impl Into<ObsColumn>) -> ScPlotResult<Self> {
        self.insert(name, column)?;
        Ok(self)
    }

    /// Add (or replace) a column.
    ///
    /// # Errors
    /// Returns an error if the column length differs from the index length.
    pub fn insert(&mut self, name: &str, column: impl Into<ObsColumn>) -> ScPlotResult<()> {
        let column = column.into();
        if column.len() != self.index.len() {
            return Err(ScPlotError::DimensionMismatch(format!(
                "observation column '{name}' has {} values but the table has {} rows",
                column.len(),
                self.index.len()
            )));
        }
        match self.columns.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = column,
            None => self.columns.push((name.to_string(), column)),
        }
        Ok(())
    }

    /// Look up a column by name.
    pub fn get(&self, name: &str) -> Option<&ObsColumn> {
        self.columns
            .iter()
            .find_map(|(n, c)| (n == name).then_some(c))
    }

    /// Whether a column with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Observation names.
    pub fn index(&self) -> &[String] {
        &self.index
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the table has no observations.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
