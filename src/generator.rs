use crate::systematic_constants::Parameters;
use crate::tuple::EncodingTuple;

/// Describes where the ones of a 0/1 matrix are, without storing them.
///
/// Structural blocks of the constraint matrix implement this and are composed by wrapping one
/// generator in another. `SparseBinaryMatrix::from_generator` is the only place that materializes
/// them.
pub trait Generator {
    fn rows(&self) -> usize;

    fn cols(&self) -> usize;

    /// Exact number of (row, col) pairs `generate` will visit.
    fn non_zeros(&self) -> usize;

    fn generate(&self, visit: &mut dyn FnMut(usize, usize));
}

/// I_n
pub struct IdentityGenerator {
    size: usize,
}

impl IdentityGenerator {
    pub fn new(size: usize) -> IdentityGenerator {
        IdentityGenerator { size }
    }
}

impl Generator for IdentityGenerator {
    fn rows(&self) -> usize {
        self.size
    }

    fn cols(&self) -> usize {
        self.size
    }

    fn non_zeros(&self) -> usize {
        self.size
    }

    fn generate(&self, visit: &mut dyn FnMut(usize, usize)) {
        for i in 0..self.size {
            visit(i, i);
        }
    }
}

/// G_LDPC,1 of section 5.3.3.3: S rows, B columns, three ones per column.
pub struct Ldpc1Generator {
    rows: usize,
    cols: usize,
}

impl Ldpc1Generator {
    pub fn new(ldpc_symbols: usize, cols: usize) -> Ldpc1Generator {
        Ldpc1Generator {
            rows: ldpc_symbols,
            cols,
        }
    }
}

impl Generator for Ldpc1Generator {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn non_zeros(&self) -> usize {
        self.cols * 3
    }

    fn generate(&self, visit: &mut dyn FnMut(usize, usize)) {
        let s = self.rows;
        for col in 0..self.cols {
            let a = 1 + col / s;
            let b = col % s;
            let mut rows = [b, (b + a) % s, (b + 2 * a) % s];
            rows.sort_unstable();
            for row in rows {
                visit(row, col);
            }
        }
    }
}

/// G_LDPC,2 of section 5.3.3.3: S rows over the P PI columns, two consecutive ones per row.
pub struct Ldpc2Generator {
    rows: usize,
    cols: usize,
}

impl Ldpc2Generator {
    pub fn new(ldpc_symbols: usize, pi_symbols: usize) -> Ldpc2Generator {
        Ldpc2Generator {
            rows: ldpc_symbols,
            cols: pi_symbols,
        }
    }
}

impl Generator for Ldpc2Generator {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn non_zeros(&self) -> usize {
        self.rows * 2
    }

    fn generate(&self, visit: &mut dyn FnMut(usize, usize)) {
        for row in 0..self.rows {
            visit(row, row % self.cols);
            visit(row, (row + 1) % self.cols);
        }
    }
}

/// G_ENC: one row per encoding symbol, ones at the indices of its tuple.
pub struct EncodingGenerator<'a> {
    params: &'a Parameters,
    tuples: &'a [EncodingTuple],
}

impl<'a> EncodingGenerator<'a> {
    pub fn new(params: &'a Parameters, tuples: &'a [EncodingTuple]) -> EncodingGenerator<'a> {
        EncodingGenerator { params, tuples }
    }
}

impl<'a> Generator for EncodingGenerator<'a> {
    fn rows(&self) -> usize {
        self.tuples.len()
    }

    fn cols(&self) -> usize {
        self.params.intermediate_symbols() as usize
    }

    fn non_zeros(&self) -> usize {
        self.tuples.iter().map(|tuple| tuple.len()).sum()
    }

    fn generate(&self, visit: &mut dyn FnMut(usize, usize)) {
        for (row, tuple) in self.tuples.iter().enumerate() {
            tuple.for_each_index(self.params, |col| visit(row, col));
        }
    }
}

/// Tiles sub generators left to right. Once a band spans all columns, the next block starts a new
/// band below the first block of the current one.
pub struct BlockGenerator<'a> {
    rows: usize,
    cols: usize,
    blocks: Vec<&'a dyn Generator>,
}

impl<'a> BlockGenerator<'a> {
    pub fn new(rows: usize, cols: usize, blocks: Vec<&'a dyn Generator>) -> BlockGenerator<'a> {
        BlockGenerator { rows, cols, blocks }
    }
}

impl<'a> Generator for BlockGenerator<'a> {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn non_zeros(&self) -> usize {
        self.blocks.iter().map(|block| block.non_zeros()).sum()
    }

    fn generate(&self, visit: &mut dyn FnMut(usize, usize)) {
        let mut row_offset = 0;
        let mut next_row_offset = 0;
        let mut col_offset = 0;
        for block in self.blocks.iter() {
            if col_offset == 0 {
                next_row_offset = row_offset + block.rows();
            }
            block.generate(&mut |row, col| {
                debug_assert!(row + row_offset < self.rows && col + col_offset < self.cols);
                visit(row + row_offset, col + col_offset)
            });
            col_offset += block.cols();
            if col_offset >= self.cols {
                col_offset = 0;
                row_offset = next_row_offset;
            }
        }
    }
}

pub struct TransposeGenerator<'a> {
    inner: &'a dyn Generator,
}

impl<'a> TransposeGenerator<'a> {
    pub fn new(inner: &'a dyn Generator) -> TransposeGenerator<'a> {
        TransposeGenerator { inner }
    }
}

impl<'a> Generator for TransposeGenerator<'a> {
    fn rows(&self) -> usize {
        self.inner.cols()
    }

    fn cols(&self) -> usize {
        self.inner.rows()
    }

    fn non_zeros(&self) -> usize {
        self.inner.non_zeros()
    }

    fn generate(&self, visit: &mut dyn FnMut(usize, usize)) {
        self.inner.generate(&mut |row, col| visit(col, row));
    }
}

/// Reorders columns: column `i` of the view is column `permutation[i]` of the inner generator.
pub struct PermutationGenerator<'a> {
    inner: &'a dyn Generator,
    inverse: Vec<usize>,
}

impl<'a> PermutationGenerator<'a> {
    pub fn new(inner: &'a dyn Generator, permutation: &[usize]) -> PermutationGenerator<'a> {
        assert_eq!(inner.cols(), permutation.len());
        PermutationGenerator {
            inner,
            inverse: inverse_permutation(permutation),
        }
    }
}

impl<'a> Generator for PermutationGenerator<'a> {
    fn rows(&self) -> usize {
        self.inner.rows()
    }

    fn cols(&self) -> usize {
        self.inner.cols()
    }

    fn non_zeros(&self) -> usize {
        self.inner.non_zeros()
    }

    fn generate(&self, visit: &mut dyn FnMut(usize, usize)) {
        self.inner
            .generate(&mut |row, col| visit(row, self.inverse[col]));
    }
}

/// The `rows` x `cols` window of another generator starting at (`row_start`, `col_start`).
pub struct BlockView<'a> {
    inner: &'a dyn Generator,
    row_start: usize,
    col_start: usize,
    rows: usize,
    cols: usize,
    non_zeros: usize,
}

impl<'a> BlockView<'a> {
    pub fn new(
        inner: &'a dyn Generator,
        row_start: usize,
        col_start: usize,
        rows: usize,
        cols: usize,
    ) -> BlockView<'a> {
        assert!(row_start + rows <= inner.rows());
        assert!(col_start + cols <= inner.cols());
        let mut view = BlockView {
            inner,
            row_start,
            col_start,
            rows,
            cols,
            non_zeros: 0,
        };
        let mut non_zeros = 0;
        view.generate(&mut |_, _| non_zeros += 1);
        view.non_zeros = non_zeros;
        view
    }
}

impl<'a> Generator for BlockView<'a> {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn non_zeros(&self) -> usize {
        self.non_zeros
    }

    fn generate(&self, visit: &mut dyn FnMut(usize, usize)) {
        let rows = self.row_start..(self.row_start + self.rows);
        let cols = self.col_start..(self.col_start + self.cols);
        self.inner.generate(&mut |row, col| {
            if rows.contains(&row) && cols.contains(&col) {
                visit(row - self.row_start, col - self.col_start);
            }
        });
    }
}

/// `result[permutation[i]] == i`. Panics if `permutation` is not a permutation of `0..len`.
pub fn inverse_permutation(permutation: &[usize]) -> Vec<usize> {
    let mut inverse = vec![usize::MAX; permutation.len()];
    for (i, &old) in permutation.iter().enumerate() {
        assert_eq!(usize::MAX, inverse[old], "{} appears twice in permutation", old);
        inverse[old] = i;
    }
    inverse
}
