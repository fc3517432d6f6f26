//! Dense least squares for the small design matrices the seasonal model builds.

/// Solves the ridge system `(XᵀX + diag(penalty)) β = Xᵀy`.
///
/// `rows` holds one design row per observation, all of length `penalty.len()`.
/// Returns `None` when the regularised normal matrix is not positive definite.
pub(crate) fn ridge_solve(rows: &[Vec<f64>], y: &[f64], penalty: &[f64]) -> Option<Vec<f64>> {
    let p = penalty.len();
    let mut normal = vec![0.0; p * p];
    let mut rhs = vec![0.0; p];

    for (row, &target) in rows.iter().zip(y) {
        debug_assert_eq!(row.len(), p);
        for i in 0..p {
            let xi = row[i];
            if xi == 0.0 {
                continue;
            }
            rhs[i] += xi * target;
            // Upper triangle only, mirrored below.
            for j in i..p {
                normal[i * p + j] += xi * row[j];
            }
        }
    }
    for i in 0..p {
        for j in 0..i {
            normal[i * p + j] = normal[j * p + i];
        }
        normal[i * p + i] += penalty[i];
    }

    cholesky_in_place(&mut normal, p)?;
    Some(cholesky_solve(&normal, p, &rhs))
}

/// Overwrites the lower triangle of `a` with its Cholesky factor `L`.
fn cholesky_in_place(a: &mut [f64], n: usize) -> Option<()> {
    for j in 0..n {
        let mut diag = a[j * n + j];
        for k in 0..j {
            diag -= a[j * n + k] * a[j * n + k];
        }
        if !diag.is_finite() || diag <= 0.0 {
            return None;
        }
        let diag = diag.sqrt();
        a[j * n + j] = diag;
        for i in (j + 1)..n {
            let mut value = a[i * n + j];
            for k in 0..j {
                value -= a[i * n + k] * a[j * n + k];
            }
            a[i * n + j] = value / diag;
        }
    }
    Some(())
}

/// Solves `L Lᵀ x = b` given the factor from [`cholesky_in_place`].
fn cholesky_solve(l: &[f64], n: usize, b: &[f64]) -> Vec<f64> {
    let mut z = vec![0.0; n];
    for i in 0..n {
        let mut value = b[i];
        for k in 0..i {
            value -= l[i * n + k] * z[k];
        }
        z[i] = value / l[i * n + i];
    }
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut value = z[i];
        for k in (i + 1)..n {
            value -= l[k * n + i] * x[k];
        }
        x[i] = value / l[i * n + i];
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_exact_line() {
        let rows: Vec<Vec<f64>> = (0..10).map(|i| vec![1.0, i as f64]).collect();
        let y: Vec<f64> = (0..10).map(|i| 3.0 + 0.5 * i as f64).collect();

        let beta = ridge_solve(&rows, &y, &[0.0, 0.0]).unwrap();
        assert!((beta[0] - 3.0).abs() < 1e-9);
        assert!((beta[1] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn penalty_shrinks_towards_zero() {
        let rows: Vec<Vec<f64>> = (0..20).map(|_| vec![1.0]).collect();
        let y = vec![2.0; 20];

        let free = ridge_solve(&rows, &y, &[0.0]).unwrap();
        let shrunk = ridge_solve(&rows, &y, &[20.0]).unwrap();
        assert!((free[0] - 2.0).abs() < 1e-12);
        assert!((shrunk[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_column_without_penalty_is_rejected() {
        let rows: Vec<Vec<f64>> = (0..5).map(|i| vec![i as f64, 0.0]).collect();
        let y: Vec<f64> = (0..5).map(|i| i as f64).collect();
        assert!(ridge_solve(&rows, &y, &[0.0, 0.0]).is_none());
    }
}
