use nalgebra::{DMatrix, DVector};

/// Eigen decomposition of a symmetric matrix with eigenvalues in ascending
/// order and eigenvector signs fixed by `align_eigenvectors`.
pub fn symmetric_eigen(m: &DMatrix<f64>) -> (DVector<f64>, DMatrix<f64>) {
    let eig = m.clone().symmetric_eigen();
    let mut indices: Vec<usize> = (0..eig.eigenvalues.len()).collect();
    indices.sort_by(|&a, &b| eig.eigenvalues[a].total_cmp(&eig.eigenvalues[b]));
    let values = DVector::from_fn(indices.len(), |i, _| eig.eigenvalues[indices[i]]);
    let vectors = eig.eigenvectors.select_columns(&indices);
    (values, align_eigenvectors(vectors))
}

/// S^-1/2 of a symmetric positive definite matrix.
pub fn inverse_sqrt(m: &DMatrix<f64>) -> DMatrix<f64> {
    let (values, vectors) = symmetric_eigen(m);
    let diag = DMatrix::from_diagonal(&values.map(|v| 1.0 / v.sqrt()));
    &vectors * diag * vectors.transpose()
}

/// Flip each eigenvector so that its entry of largest magnitude is positive.
pub fn align_eigenvectors(mut eigvecs: DMatrix<f64>) -> DMatrix<f64> {
    for mut col in eigvecs.column_iter_mut() {
        let largest = col
            .iter()
            .copied()
            .fold(0.0_f64, |acc, v| if v.abs() > acc.abs() { v } else { acc });
        if largest < 0.0 {
            col.neg_mut();
        }
    }
    eigvecs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_eigen() {
        let m = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 2.0]);
        let (values, vectors) = symmetric_eigen(&m);
        assert!((values[0] - 1.0).abs() < 1e-12);
        assert!((values[1] - 3.0).abs() < 1e-12);
        for j in 0..2 {
            let col = vectors.column(j);
            assert!((&m * col - col * values[j]).norm() < 1e-12);
        }
    }

    #[test]
    fn test_inverse_sqrt() {
        let s = DMatrix::from_row_slice(2, 2, &[1.0, 0.6593, 0.6593, 1.0]);
        let x = inverse_sqrt(&s);
        let identity = &x * &s * &x;
        assert!((identity - DMatrix::identity(2, 2)).norm() < 1e-12);
    }

    #[test]
    fn test_align_eigenvectors() {
        let m = DMatrix::from_row_slice(2, 2, &[-0.8, 0.1, 0.6, -0.9]);
        let aligned = align_eigenvectors(m);
        assert_eq!(aligned[(0, 0)], 0.8);
        assert_eq!(aligned[(1, 1)], 0.9);
    }
}
