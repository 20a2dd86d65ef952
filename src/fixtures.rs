//! Small annotated matrices shared by the unit tests.

use nalgebra_sparse::{CooMatrix, CsrMatrix};
use ndarray::array;

use crate::obs::{ObsColumn, ObsTable};
use crate::repr::{AnnData, RawData};

/// Four cells, three genes, two clusters.
///
/// Primary matrix (dense):
///
/// | cell | CD3D | MS4A1 | LYZ |
/// |------|------|-------|-----|
/// | c0   | 1    | 0     | 5   |
/// | c1   | 0    | 2     | 6   |
/// | c2   | 3    | 0     | 7   |
/// | c3   | 0    | 4     | 8   |
///
/// The raw matrix (sparse) is ten times the primary plus a fourth gene
/// `GNLY`. The observation table also has a numeric column called `MS4A1`
/// so the variable/observation precedence can be exercised.
pub(crate) fn pbmc_like(with_raw: bool) -> AnnData {
    let x = array![
        [1.0, 0.0, 5.0],
        [0.0, 2.0, 6.0],
        [3.0, 0.0, 7.0],
        [0.0, 4.0, 8.0]
    ];
    let obs = ObsTable::new(&["c0", "c1", "c2", "c3"])
        .with_column("louvain", ObsColumn::categorical(&["0", "1", "0", "1"]))
        .and_then(|t| t.with_column("n_genes", vec![100.0, 200.0, 300.0, 400.0]))
        .and_then(|t| t.with_column("MS4A1", vec![9.0, 9.0, 9.0, 9.0]))
        .and_then(|t| t.with_column("batch", ObsColumn::text(&["b", "a", "b", "a"])))
        .expect("fixture obs");
    let adata = AnnData::new(
        x,
        obs,
        vec!["CD3D".into(), "MS4A1".into(), "LYZ".into()],
    )
    .and_then(|a| {
        a.with_obsm(
            "X_umap",
            array![[0.0, 0.5, 9.0], [1.0, 1.5, 9.0], [2.0, 2.5, 9.0], [3.0, 3.5, 9.0]],
        )
    })
    .expect("fixture adata");

    if !with_raw {
        return adata;
    }
    let mut coo = CooMatrix::new(4, 4);
    for (i, j, v) in [
        (0, 0, 10.0),
        (2, 0, 30.0),
        (1, 1, 20.0),
        (3, 1, 40.0),
        (0, 2, 50.0),
        (1, 2, 60.0),
        (2, 2, 70.0),
        (3, 2, 80.0),
        (2, 3, 1.0),
    ] {
        coo.push(i, j, v);
    }
    let raw = RawData::new(
        CsrMatrix::from(&coo),
        vec!["CD3D".into(), "MS4A1".into(), "LYZ".into(), "GNLY".into()],
    )
    .expect("fixture raw");
    adata.with_raw(raw).expect("fixture raw rows")
}
