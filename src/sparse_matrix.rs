use crate::generator::{BlockView, Generator, PermutationGenerator, TransposeGenerator};
use crate::matrix::DenseBinaryMatrix;
use crate::octet_matrix::DenseOctetMatrix;
#[cfg(feature = "benchmarking")]
use std::mem::size_of;

/// GF(2) matrix in compressed column form: the row indices of column `c` are
/// `row_indices[col_offsets[c]..col_offsets[c + 1]]`, ascending.
///
/// The matrix is immutable once built. Permutations and sub blocks produce new matrices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SparseBinaryMatrix {
    rows: usize,
    cols: usize,
    col_offsets: Vec<u32>,
    row_indices: Vec<u32>,
}

impl SparseBinaryMatrix {
    pub fn from_generator(generator: &dyn Generator) -> SparseBinaryMatrix {
        let rows = generator.rows();
        let cols = generator.cols();
        let mut col_offsets = vec![0u32; cols + 1];
        generator.generate(&mut |_, col| col_offsets[col + 1] += 1);
        for col in 0..cols {
            col_offsets[col + 1] += col_offsets[col];
        }

        let mut next: Vec<u32> = col_offsets[..cols].to_vec();
        let mut row_indices = vec![0u32; col_offsets[cols] as usize];
        generator.generate(&mut |row, col| {
            row_indices[next[col] as usize] = row as u32;
            next[col] += 1;
        });

        for col in 0..cols {
            let column =
                &mut row_indices[col_offsets[col] as usize..col_offsets[col + 1] as usize];
            column.sort_unstable();
            debug_assert!(column.windows(2).all(|pair| pair[0] < pair[1]));
        }

        SparseBinaryMatrix {
            rows,
            cols,
            col_offsets,
            row_indices,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[cfg(feature = "benchmarking")]
    pub fn size_in_bytes(&self) -> usize {
        size_of::<Self>() + size_of::<u32>() * (self.col_offsets.len() + self.row_indices.len())
    }

    /// Rows with a one in `col`, ascending.
    pub fn col(&self, col: usize) -> &[u32] {
        &self.row_indices[self.col_offsets[col] as usize..self.col_offsets[col + 1] as usize]
    }

    /// Rows with a one in `col`, starting at the first row not less than `from_row`.
    pub fn col_from(&self, col: usize, from_row: usize) -> &[u32] {
        let column = self.col(col);
        let start = column.partition_point(|row| (*row as usize) < from_row);
        &column[start..]
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        self.col(col).binary_search(&(row as u32)).is_ok()
    }

    pub fn transpose(&self) -> SparseBinaryMatrix {
        SparseBinaryMatrix::from_generator(&TransposeGenerator::new(self))
    }

    /// New matrix whose column `i` is column `permutation[i]` of this one.
    pub fn apply_col_permutation(&self, permutation: &[usize]) -> SparseBinaryMatrix {
        SparseBinaryMatrix::from_generator(&PermutationGenerator::new(self, permutation))
    }

    /// New matrix whose row `i` is row `permutation[i]` of this one.
    pub fn apply_row_permutation(&self, permutation: &[usize]) -> SparseBinaryMatrix {
        // Storage is by column, so permute the columns of the transpose
        self.transpose()
            .apply_col_permutation(permutation)
            .transpose()
    }

    /// Visits the ones of a sub block, with coordinates relative to the block.
    pub fn block_for_each<F: FnMut(usize, usize)>(
        &self,
        row_start: usize,
        col_start: usize,
        rows: usize,
        cols: usize,
        mut visit: F,
    ) {
        assert!(row_start + rows <= self.rows);
        assert!(col_start + cols <= self.cols);
        for col in col_start..(col_start + cols) {
            for &row in self.col_from(col, row_start) {
                let row = row as usize;
                if row >= row_start + rows {
                    break;
                }
                visit(row - row_start, col - col_start);
            }
        }
    }

    pub fn block_dense(
        &self,
        row_start: usize,
        col_start: usize,
        rows: usize,
        cols: usize,
    ) -> DenseBinaryMatrix {
        let mut result = DenseBinaryMatrix::new(rows, cols);
        self.block_for_each(row_start, col_start, rows, cols, |row, col| {
            result.set(row, col, true)
        });
        result
    }

    pub fn block_sparse(
        &self,
        row_start: usize,
        col_start: usize,
        rows: usize,
        cols: usize,
    ) -> SparseBinaryMatrix {
        SparseBinaryMatrix::from_generator(&BlockView::new(self, row_start, col_start, rows, cols))
    }

    /// self * other over GF(2)
    pub fn mul_binary(&self, other: &DenseBinaryMatrix) -> DenseBinaryMatrix {
        assert_eq!(self.cols, other.height());
        let mut result = DenseBinaryMatrix::new(self.rows, other.width());
        for col in 0..self.cols {
            for &row in self.col(col) {
                result.add_assign_row_from(row as usize, other, col);
            }
        }
        result
    }

    /// self * other over GF(256)
    pub fn mul_octets(&self, other: &DenseOctetMatrix) -> DenseOctetMatrix {
        assert_eq!(self.cols, other.height());
        let mut result = DenseOctetMatrix::new(self.rows, other.width());
        for col in 0..self.cols {
            for &row in self.col(col) {
                result.add_assign_row_from(row as usize, other, col);
            }
        }
        result
    }
}

impl Generator for SparseBinaryMatrix {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn non_zeros(&self) -> usize {
        self.row_indices.len()
    }

    fn generate(&self, visit: &mut dyn FnMut(usize, usize)) {
        for col in 0..self.cols {
            for &row in self.col(col) {
                visit(row as usize, col);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use crate::generator::{Generator, IdentityGenerator};
    use crate::matrix::DenseBinaryMatrix;
    use crate::octet::Octet;
    use crate::octet_matrix::DenseOctetMatrix;
    use crate::sparse_matrix::SparseBinaryMatrix;

    struct ListGenerator {
        rows: usize,
        cols: usize,
        ones: Vec<(usize, usize)>,
    }

    impl Generator for ListGenerator {
        fn rows(&self) -> usize {
            self.rows
        }

        fn cols(&self) -> usize {
            self.cols
        }

        fn non_zeros(&self) -> usize {
            self.ones.len()
        }

        fn generate(&self, visit: &mut dyn FnMut(usize, usize)) {
            for &(row, col) in self.ones.iter() {
                visit(row, col);
            }
        }
    }

    fn rand_dense_and_sparse(rows: usize, cols: usize) -> (DenseBinaryMatrix, SparseBinaryMatrix) {
        let mut dense = DenseBinaryMatrix::new(rows, cols);
        let mut ones = vec![];
        for i in 0..rows {
            for j in 0..cols {
                if rand::thread_rng().gen_range(0, 4) == 0 {
                    dense.set(i, j, true);
                    ones.push((i, j));
                }
            }
        }
        let sparse = SparseBinaryMatrix::from_generator(&ListGenerator { rows, cols, ones });
        (dense, sparse)
    }

    fn assert_same(dense: &DenseBinaryMatrix, sparse: &SparseBinaryMatrix) {
        assert_eq!(dense.height(), sparse.rows());
        assert_eq!(dense.width(), sparse.cols());
        for i in 0..dense.height() {
            for j in 0..dense.width() {
                assert_eq!(dense.get(i, j), sparse.get(i, j), "({}, {})", i, j);
            }
        }
    }

    #[test]
    fn build_from_unordered_generator() {
        let (dense, sparse) = rand_dense_and_sparse(20, 13);
        assert_same(&dense, &sparse);
        for col in 0..13 {
            assert!(sparse.col(col).windows(2).all(|pair| pair[0] < pair[1]));
        }
    }

    #[test]
    fn transpose() {
        let (dense, sparse) = rand_dense_and_sparse(11, 7);
        let transposed = sparse.transpose();
        for i in 0..11 {
            for j in 0..7 {
                assert_eq!(dense.get(i, j), transposed.get(j, i));
            }
        }
    }

    #[test]
    fn permutations() {
        let (dense, sparse) = rand_dense_and_sparse(6, 5);
        let col_permutation = vec![4, 2, 0, 1, 3];
        let row_permutation = vec![5, 0, 3, 1, 2, 4];
        let permuted = sparse
            .apply_row_permutation(&row_permutation)
            .apply_col_permutation(&col_permutation);
        for i in 0..6 {
            for j in 0..5 {
                assert_eq!(
                    dense.get(row_permutation[i], col_permutation[j]),
                    permuted.get(i, j)
                );
            }
        }
    }

    #[test]
    fn col_from_skips_leading_rows() {
        let identity = SparseBinaryMatrix::from_generator(&IdentityGenerator::new(4));
        assert_eq!(&[2u32][..], identity.col_from(2, 1));
        assert!(identity.col_from(2, 3).is_empty());
    }

    #[test]
    fn blocks() {
        let (dense, sparse) = rand_dense_and_sparse(10, 9);
        let block = sparse.block_dense(2, 3, 5, 4);
        let block_sparse = sparse.block_sparse(2, 3, 5, 4);
        assert_same(&block, &block_sparse);
        for i in 0..5 {
            for j in 0..4 {
                assert_eq!(dense.get(i + 2, j + 3), block.get(i, j));
            }
        }
    }

    #[test]
    fn multiply() {
        let (left_dense, left) = rand_dense_and_sparse(6, 8);
        let (right, _) = rand_dense_and_sparse(8, 5);
        let product = left.mul_binary(&right);
        for i in 0..6 {
            for j in 0..5 {
                let mut expected = false;
                for k in 0..8 {
                    expected ^= left_dense.get(i, k) && right.get(k, j);
                }
                assert_eq!(expected, product.get(i, j));
            }
        }

        let mut octets = DenseOctetMatrix::new(8, 3);
        for i in 0..8 {
            for j in 0..3 {
                octets.set(i, j, Octet::new(rand::thread_rng().gen()));
            }
        }
        let product = left.mul_octets(&octets);
        for i in 0..6 {
            for j in 0..3 {
                let mut expected = Octet::zero();
                for k in 0..8 {
                    if left_dense.get(i, k) {
                        expected += octets.get(k, j);
                    }
                }
                assert_eq!(expected, product.get(i, j));
            }
        }
    }
}
