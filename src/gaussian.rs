use crate::error::{FecError, FecResult};
use crate::octet_matrix::DenseOctetMatrix;

/// Solves `a * x = d` over GF(256) by Gauss-Jordan elimination, with `a` having at least as many
/// rows as columns. Both matrices are used as scratch space.
///
/// Returns the `a.width()` rows of `x`, or `Singular` when `a` does not have full column rank.
pub fn gaussian_elimination(
    mut a: DenseOctetMatrix,
    mut d: DenseOctetMatrix,
) -> FecResult<DenseOctetMatrix> {
    assert_eq!(a.height(), d.height());
    let rows = a.height();
    let cols = a.width();
    // Rows are swapped through the permutation only
    let mut row_permutation: Vec<usize> = (0..rows).collect();

    for col in 0..cols {
        let pivot = (col..rows)
            .find(|&i| !a.get(row_permutation[i], col).is_zero())
            .ok_or(FecError::Singular)?;
        row_permutation.swap(col, pivot);

        let pivot_row = row_permutation[col];
        let inverse = a.get(pivot_row, col).inverse();
        a.mul_assign_row(pivot_row, &inverse);
        d.mul_assign_row(pivot_row, &inverse);

        for &row in row_permutation.iter() {
            if row == pivot_row {
                continue;
            }
            let factor = a.get(row, col);
            if factor.is_zero() {
                continue;
            }
            a.fma_rows(row, pivot_row, &factor);
            d.fma_rows(row, pivot_row, &factor);
        }
    }

    Ok(d.select_rows(&row_permutation[..cols]))
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use crate::error::FecError;
    use crate::gaussian::gaussian_elimination;
    use crate::octet::Octet;
    use crate::octet_matrix::DenseOctetMatrix;

    fn random_matrix(height: usize, width: usize) -> DenseOctetMatrix {
        let mut matrix = DenseOctetMatrix::new(height, width);
        for i in 0..height {
            for j in 0..width {
                matrix.set(i, j, Octet::new(rand::thread_rng().gen()));
            }
        }
        matrix
    }

    fn multiply(a: &DenseOctetMatrix, x: &DenseOctetMatrix) -> DenseOctetMatrix {
        let mut result = DenseOctetMatrix::new(a.height(), x.width());
        for i in 0..a.height() {
            for k in 0..a.width() {
                result.fma_row_from(i, x, k, &a.get(i, k));
            }
        }
        result
    }

    // Random lower triangular matrix with a nonzero diagonal, so always invertible
    fn invertible_matrix(size: usize) -> DenseOctetMatrix {
        let mut matrix = DenseOctetMatrix::new(size, size);
        for i in 0..size {
            for j in 0..i {
                matrix.set(i, j, Octet::new(rand::thread_rng().gen()));
            }
            matrix.set(i, i, Octet::new(rand::thread_rng().gen_range(1u16, 256) as u8));
        }
        // Shuffle rows so elimination has to pivot
        let permutation: Vec<usize> = (0..size).rev().collect();
        matrix.apply_row_permutation(&permutation)
    }

    #[test]
    fn solves_square_system() {
        let size = 40;
        let a = invertible_matrix(size);
        let x = random_matrix(size, 13);
        let d = multiply(&a, &x);
        let solved = gaussian_elimination(a, d).unwrap();
        assert_eq!(x, solved);
    }

    #[test]
    fn solves_overdetermined_system() {
        let a = invertible_matrix(20);
        let extra = random_matrix(5, 20);
        let mut stacked = DenseOctetMatrix::new(25, 20);
        stacked.set_block(0, 0, &a);
        stacked.set_block(20, 0, &extra);
        let x = random_matrix(20, 7);
        let d = multiply(&stacked, &x);
        let solved = gaussian_elimination(stacked, d).unwrap();
        assert_eq!(x, solved);
    }

    #[test]
    fn singular() {
        let mut a = random_matrix(6, 6);
        for j in 0..6 {
            let value = a.get(0, j);
            a.set(3, j, value);
        }
        let d = random_matrix(6, 2);
        assert_eq!(Err(FecError::Singular), gaussian_elimination(a, d));
    }
}
