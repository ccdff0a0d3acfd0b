/// Least-squares polynomial fitting shared by calibration and smoothing.

/// Fit `ys = p(xs)` with a polynomial of the given degree by solving the
/// normal equations. Coefficients are returned in ascending power order.
/// Returns `None` when the system is singular (e.g. duplicate x values).
pub fn polyfit(xs: &[f64], ys: &[f64], degree: usize) -> Option<Vec<f64>> {
    debug_assert_eq!(xs.len(), ys.len());
    let terms = degree + 1;
    if xs.len() < terms {
        return None;
    }

    // Normal equations: A^T A c = A^T y with A the Vandermonde matrix.
    // Power sums S_k = sum x^k fill the Gram matrix band-by-band.
    let mut power_sums = vec![0.0; 2 * degree + 1];
    for &x in xs {
        let mut xp = 1.0;
        for s in power_sums.iter_mut() {
            *s += xp;
            xp *= x;
        }
    }
    let mut rhs = vec![0.0; terms];
    for (&x, &y) in xs.iter().zip(ys) {
        let mut xp = 1.0;
        for r in rhs.iter_mut() {
            *r += xp * y;
            xp *= x;
        }
    }

    let mut matrix = vec![vec![0.0; terms]; terms];
    for i in 0..terms {
        for j in 0..terms {
            matrix[i][j] = power_sums[i + j];
        }
    }

    solve(matrix, rhs)
}

/// Evaluate a polynomial (ascending power coefficients) at `x`.
pub fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&r1, &r2| {
                a[r1][col]
                    .abs()
                    .partial_cmp(&a[r2][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })?;
        if a[pivot_row][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}
