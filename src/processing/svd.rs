//! Truncated SVD by power iteration with deflation
//!
//! The eigenvectors are taken from the Gram matrix of the smaller side
//! (sections x sections for a TF-IDF matrix), then projected back to recover
//! the other side. No LAPACK dependency.

use ndarray::{Array1, Array2};

const MAX_ITERATIONS: usize = 300;
const EIGENVALUE_TOLERANCE: f64 = 1e-14;
const VECTOR_TOLERANCE: f64 = 1e-8;
const EPSILON: f64 = 1e-10;

#[derive(Debug, Clone)]
pub struct TruncatedSvd {
    /// Left singular vectors, rows x k
    pub u: Array2<f64>,
    pub singular_values: Array1<f64>,
    /// Right singular vectors, k x columns
    pub vt: Array2<f64>,
}

impl TruncatedSvd {
    /// Decompose `matrix` into its `k` leading components
    ///
    /// Components beyond the rank of `matrix` are left as zeros.
    pub fn fit(matrix: &Array2<f64>, k: usize) -> Self {
        let (m, n) = matrix.dim();
        let mut u = Array2::zeros((m, k));
        let mut singular_values = Array1::zeros(k);
        let mut vt = Array2::zeros((k, n));

        if m <= n {
            let rows = sparse_rows(matrix);
            let eigenpairs = leading_eigenpairs(row_gram(&rows, m), k);
            for (i, (eigenvalue, left)) in eigenpairs.into_iter().enumerate() {
                let sigma = eigenvalue.sqrt();
                singular_values[i] = sigma;

                // v = A^T u / sigma, accumulated over the non-zero entries only
                for (row, entries) in rows.iter().enumerate() {
                    let weight = left[row] / sigma;
                    if weight == 0.0 {
                        continue;
                    }
                    for &(col, value) in entries {
                        vt[[i, col]] += weight * value;
                    }
                }
                u.column_mut(i).assign(&left);
            }
        } else {
            let eigenpairs = leading_eigenpairs(matrix.t().dot(matrix), k);
            for (i, (eigenvalue, right)) in eigenpairs.into_iter().enumerate() {
                let sigma = eigenvalue.sqrt();
                singular_values[i] = sigma;
                u.column_mut(i).assign(&(matrix.dot(&right) / sigma));
                vt.row_mut(i).assign(&right);
            }
        }

        Self { u, singular_values, vt }
    }

    pub fn n_components(&self) -> usize {
        self.singular_values.len()
    }

    /// Rows projected into the latent space (U * S)
    pub fn reduced(&self) -> Array2<f64> {
        &self.u * &self.singular_values
    }

    /// Indices of the `n` terms with the largest absolute loading on `component`
    pub fn top_term_indices(&self, component: usize, n: usize) -> Vec<usize> {
        let mut loadings: Vec<(usize, f64)> = self
            .vt
            .row(component)
            .iter()
            .enumerate()
            .map(|(idx, &weight)| (idx, weight.abs()))
            .filter(|(_, weight)| *weight > EPSILON)
            .collect();

        loadings.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        loadings.into_iter().take(n).map(|(idx, _)| idx).collect()
    }
}

/// Number of components to request for a vocabulary of `vocabulary_size` terms
pub fn component_count(requested: usize, vocabulary_size: usize) -> usize {
    requested.min(vocabulary_size.saturating_sub(1))
}

/// Non-zero `(column, value)` entries of each row, in column order
fn sparse_rows(matrix: &Array2<f64>) -> Vec<Vec<(usize, f64)>> {
    matrix
        .rows()
        .into_iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .filter(|(_, &value)| value != 0.0)
                .map(|(col, &value)| (col, value))
                .collect()
        })
        .collect()
}

fn sparse_dot(a: &[(usize, f64)], b: &[(usize, f64)]) -> f64 {
    let (mut i, mut j) = (0, 0);
    let mut sum = 0.0;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}

/// A * A^T from sparse rows
fn row_gram(rows: &[Vec<(usize, f64)>], m: usize) -> Array2<f64> {
    let mut gram = Array2::zeros((m, m));
    for i in 0..m {
        for j in 0..=i {
            let dot = sparse_dot(&rows[i], &rows[j]);
            gram[[i, j]] = dot;
            gram[[j, i]] = dot;
        }
    }
    gram
}

/// Up to `k` largest eigenpairs of a symmetric positive semi-definite matrix,
/// stopping early once the remaining spectrum is numerically zero
fn leading_eigenpairs(mut gram: Array2<f64>, k: usize) -> Vec<(f64, Array1<f64>)> {
    let mut pairs = Vec::new();
    for _ in 0..k.min(gram.nrows()) {
        let (eigenvalue, vector) = power_iteration(&gram);
        if eigenvalue < EPSILON {
            break;
        }

        // Deflate: gram -= lambda * v * v^T
        for (row, &vi) in vector.iter().enumerate() {
            gram.row_mut(row).scaled_add(-eigenvalue * vi, &vector);
        }
        pairs.push((eigenvalue, vector));
    }
    pairs
}

fn power_iteration(matrix: &Array2<f64>) -> (f64, Array1<f64>) {
    let n = matrix.nrows();

    let mut v: Array1<f64> = Array1::from_iter((0..n).map(|i| ((i + 1) as f64).sin()));
    let norm = v.dot(&v).sqrt();
    if norm > EPSILON {
        v /= norm;
    }

    let mut eigenvalue = 0.0;
    for _ in 0..MAX_ITERATIONS {
        let w = matrix.dot(&v);
        let norm_w = w.dot(&w).sqrt();
        if norm_w < EPSILON {
            return (0.0, v);
        }
        let next = w / norm_w;

        let shift = (&next - &v).fold(0.0f64, |max, x| max.max(x.abs()));
        let settled = (norm_w - eigenvalue).abs() <= EIGENVALUE_TOLERANCE * norm_w.max(1.0);
        v = next;
        eigenvalue = norm_w;
        if settled || shift <= VECTOR_TOLERANCE {
            break;
        }
    }

    (eigenvalue, v)
}
