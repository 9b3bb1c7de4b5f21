use crate::error::{FecError, FecResult};
use crate::generator::Generator;
use crate::sparse_matrix::SparseBinaryMatrix;
use log::*;

/// Outcome of inactivation decoding.
///
/// After applying `row_permutation` to the rows and `col_permutation` to the columns of the
/// decoded matrix, its top left `size` x `size` block is lower triangular with ones on the
/// diagonal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InactivationResult {
    pub size: usize,
    pub row_permutation: Vec<usize>,
    pub col_permutation: Vec<usize>,
}

/// Greedy peeling of the sparse constraint matrix (first phase of section 5.4.2.2).
///
/// Repeatedly picks an unused row with the fewest remaining active columns, chooses one of its
/// active columns as the pivot and inactivates the rest. The last `pi_symbols` columns are
/// permanently inactive.
pub struct InactivationDecoder<'a> {
    matrix: &'a SparseBinaryMatrix,
    // Row major copy so the ones of a row can be walked
    matrix_rows: SparseBinaryMatrix,
    rows: usize,
    cols: usize,
    pi_symbols: usize,
    col_count: Vec<u32>,
    row_count: Vec<u32>,
    // XOR of the active columns of each row, which is the column itself once one is left
    row_xor: Vec<u32>,
    // sorted_rows[bucket_start[c]..bucket_start[c + 1]] hold the rows with c active columns
    bucket_start: Vec<usize>,
    sorted_rows: Vec<usize>,
    row_position: Vec<usize>,
    col_done: Vec<bool>,
    row_done: Vec<bool>,
    chosen_rows: Vec<usize>,
    chosen_cols: Vec<usize>,
    inactive_cols: Vec<usize>,
}

impl<'a> InactivationDecoder<'a> {
    pub fn new(matrix: &'a SparseBinaryMatrix, pi_symbols: usize) -> InactivationDecoder<'a> {
        assert!(pi_symbols <= matrix.cols());
        let rows = matrix.rows();
        let cols = matrix.cols() - pi_symbols;
        InactivationDecoder {
            matrix,
            matrix_rows: matrix.transpose(),
            rows,
            cols,
            pi_symbols,
            col_count: vec![0; cols],
            row_count: vec![0; rows],
            row_xor: vec![0; rows],
            bucket_start: vec![0; cols + 2],
            sorted_rows: vec![0; rows],
            row_position: vec![0; rows],
            col_done: vec![false; cols],
            row_done: vec![false; rows],
            chosen_rows: Vec::with_capacity(rows),
            chosen_cols: Vec::with_capacity(cols + pi_symbols),
            inactive_cols: vec![],
        }
    }

    pub fn run(mut self) -> FecResult<InactivationResult> {
        if self.rows < self.cols {
            return Err(FecError::NotEnoughSymbols {
                received: self.rows as u32,
                needed: self.cols as u32,
            });
        }

        self.count_ones();
        self.sort_rows();
        self.peel();

        for row in 0..self.rows {
            if !self.row_done[row] {
                self.chosen_rows.push(row);
            }
        }

        let size = self.chosen_cols.len();
        // Columns without any one are never chosen nor inactivated
        for col in 0..self.cols {
            if !self.col_done[col] {
                self.inactive_cols.push(col);
            }
        }
        let mut col_permutation = self.chosen_cols;
        col_permutation.extend(self.inactive_cols.iter().rev());
        col_permutation.extend(self.cols..(self.cols + self.pi_symbols));

        trace!(
            "inactivation: rows={}, cols={}, size={}, inactive={}",
            self.rows,
            self.cols + self.pi_symbols,
            size,
            col_permutation.len() - size
        );

        Ok(InactivationResult {
            size,
            row_permutation: self.chosen_rows,
            col_permutation,
        })
    }

    fn count_ones(&mut self) {
        let cols = self.cols;
        let col_count = &mut self.col_count;
        let row_count = &mut self.row_count;
        let row_xor = &mut self.row_xor;
        self.matrix.generate(&mut |row, col| {
            if col >= cols {
                return;
            }
            col_count[col] += 1;
            row_count[row] += 1;
            row_xor[row] ^= col as u32;
        });
    }

    // Counting sort of the rows by number of active columns
    fn sort_rows(&mut self) {
        for row in 0..self.rows {
            self.bucket_start[self.row_count[row] as usize + 1] += 1;
        }
        for count in 1..self.bucket_start.len() {
            self.bucket_start[count] += self.bucket_start[count - 1];
        }
        let mut next = self.bucket_start.clone();
        for row in 0..self.rows {
            let count = self.row_count[row] as usize;
            let position = next[count];
            next[count] += 1;
            self.sorted_rows[position] = row;
            self.row_position[row] = position;
        }
    }

    fn peel(&mut self) {
        // Rows with zero active columns are parked in bucket 0
        while self.bucket_start[1] != self.rows {
            let row = self.sorted_rows[self.bucket_start[1]];
            let count = self.row_count[row];
            let col = self.choose_col(row);
            self.chosen_cols.push(col);
            self.chosen_rows.push(row);

            if count == 1 {
                self.inactivate_col(col);
            } else {
                let others: Vec<usize> = self
                    .matrix_rows
                    .col(row)
                    .iter()
                    .map(|x| *x as usize)
                    .filter(|x| *x < self.cols && !self.col_done[*x])
                    .collect();
                for x in others {
                    if x != col {
                        self.inactive_cols.push(x);
                    }
                    self.inactivate_col(x);
                }
            }
            self.row_done[row] = true;
        }
    }

    fn choose_col(&self, row: usize) -> usize {
        if self.row_count[row] == 1 {
            return self.row_xor[row] as usize;
        }
        let mut best: Option<usize> = None;
        for &col in self.matrix_rows.col(row) {
            let col = col as usize;
            if col >= self.cols || self.col_done[col] {
                continue;
            }
            match best {
                Some(best_col) if self.col_count[best_col] <= self.col_count[col] => {}
                _ => best = Some(col),
            }
        }
        // A row outside bucket 0 has at least one active column
        best.unwrap_or(self.row_xor[row] as usize)
    }

    fn inactivate_col(&mut self, col: usize) {
        self.col_done[col] = true;
        let matrix = self.matrix;
        for &row in matrix.col(col) {
            let row = row as usize;
            if self.row_done[row] {
                continue;
            }
            // Swap the row to the front of its bucket, then shrink the bucket past it
            let count = self.row_count[row] as usize;
            let position = self.row_position[row];
            let front = self.bucket_start[count];
            self.sorted_rows.swap(position, front);
            self.row_position[self.sorted_rows[position]] = position;
            self.row_position[self.sorted_rows[front]] = front;
            self.bucket_start[count] += 1;
            self.row_count[row] -= 1;
            self.row_xor[row] ^= col as u32;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::constraint_matrix::build_constraint_matrix;
    use crate::error::FecError;
    use crate::generator::IdentityGenerator;
    use crate::inactivation::InactivationDecoder;
    use crate::sparse_matrix::SparseBinaryMatrix;
    use crate::systematic_constants::Parameters;
    use crate::tuple::EncodingTuple;

    fn is_permutation(values: &[usize]) -> bool {
        let mut sorted = values.to_vec();
        sorted.sort_unstable();
        sorted.iter().enumerate().all(|(i, v)| i == *v)
    }

    fn check_lower_triangular(k: u32, extra: u32) {
        let params = Parameters::for_source_symbols(k).unwrap();
        let count = params.extended_source_symbols() + extra;
        let tuples: Vec<EncodingTuple> = (0..count)
            .map(|isi| EncodingTuple::new(&params, isi))
            .collect();
        let matrix = build_constraint_matrix(&params, &tuples);
        let result = InactivationDecoder::new(&matrix, params.pi_symbols() as usize)
            .run()
            .unwrap();

        assert_eq!(matrix.rows(), result.row_permutation.len());
        assert_eq!(matrix.cols(), result.col_permutation.len());
        assert!(is_permutation(&result.row_permutation));
        assert!(is_permutation(&result.col_permutation));
        assert!(result.size <= params.lt_symbols() as usize);

        let permuted = matrix
            .apply_row_permutation(&result.row_permutation)
            .apply_col_permutation(&result.col_permutation);
        for i in 0..result.size {
            assert!(permuted.get(i, i), "K = {}, missing diagonal at {}", k, i);
            for &row in permuted.col(i) {
                let row = row as usize;
                if row >= result.size {
                    break;
                }
                assert!(row >= i, "K = {}, one above diagonal at ({}, {})", k, row, i);
            }
        }
    }

    #[test]
    fn lower_triangular_block() {
        for &k in [1u32, 10, 57, 100, 400].iter() {
            check_lower_triangular(k, 0);
            check_lower_triangular(k, 5);
        }
    }

    #[test]
    fn pi_columns_are_last() {
        let params = Parameters::for_source_symbols(30).unwrap();
        let tuples: Vec<EncodingTuple> = (0..params.extended_source_symbols())
            .map(|isi| EncodingTuple::new(&params, isi))
            .collect();
        let matrix = build_constraint_matrix(&params, &tuples);
        let pi = params.pi_symbols() as usize;
        let result = InactivationDecoder::new(&matrix, pi).run().unwrap();
        let w = params.lt_symbols() as usize;
        assert_eq!(
            (w..(w + pi)).collect::<Vec<usize>>(),
            result.col_permutation[(matrix.cols() - pi)..].to_vec()
        );
    }

    #[test]
    fn identity_is_fully_peeled() {
        let matrix = SparseBinaryMatrix::from_generator(&IdentityGenerator::new(6));
        let result = InactivationDecoder::new(&matrix, 0).run().unwrap();
        assert_eq!(6, result.size);
        assert_eq!(result.row_permutation, result.col_permutation);
    }

    #[test]
    fn too_few_rows() {
        let params = Parameters::for_source_symbols(20).unwrap();
        let tuples: Vec<EncodingTuple> = (0..5)
            .map(|isi| EncodingTuple::new(&params, isi))
            .collect();
        let matrix = build_constraint_matrix(&params, &tuples);
        match InactivationDecoder::new(&matrix, params.pi_symbols() as usize).run() {
            Err(FecError::NotEnoughSymbols { .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
    }
}
