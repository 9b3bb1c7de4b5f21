use crate::octet::Octet;
use crate::octet_matrix::DenseOctetMatrix;
use crate::util::get_both_indices;

const WORD_WIDTH: usize = 64;

fn add_assign_binary(dest: &mut [u64], src: &[u64]) {
    for (d, s) in dest.iter_mut().zip(src) {
        *d ^= *s;
    }
}

/// Bit packed GF(2) matrix, one `Vec<u64>` per row.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DenseBinaryMatrix {
    height: usize,
    width: usize,
    elements: Vec<Vec<u64>>,
}

impl DenseBinaryMatrix {
    // Returns (word in row, bit in word) for the given col
    fn bit_position(col: usize) -> (usize, usize) {
        (col / WORD_WIDTH, col % WORD_WIDTH)
    }

    fn select_mask(bit: usize) -> u64 {
        1u64 << (bit as u64)
    }

    pub fn new(height: usize, width: usize) -> DenseBinaryMatrix {
        let words = (width + WORD_WIDTH - 1) / WORD_WIDTH;
        DenseBinaryMatrix {
            height,
            width,
            elements: vec![vec![0; words]; height],
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn get(&self, i: usize, j: usize) -> bool {
        assert!(j < self.width);
        let (word, bit) = DenseBinaryMatrix::bit_position(j);
        self.elements[i][word] & DenseBinaryMatrix::select_mask(bit) != 0
    }

    pub fn set(&mut self, i: usize, j: usize, value: bool) {
        assert!(j < self.width);
        let (word, bit) = DenseBinaryMatrix::bit_position(j);
        if value {
            self.elements[i][word] |= DenseBinaryMatrix::select_mask(bit);
        } else {
            self.elements[i][word] &= !DenseBinaryMatrix::select_mask(bit);
        }
    }

    #[cfg(test)]
    pub fn count_ones(&self, row: usize) -> usize {
        self.elements[row]
            .iter()
            .map(|word| word.count_ones() as usize)
            .sum()
    }

    /// Columns holding a one in `row`, ascending.
    pub fn ones_in_row(&self, row: usize) -> Vec<usize> {
        let mut result = vec![];
        for (index, &word) in self.elements[row].iter().enumerate() {
            let mut word = word;
            while word != 0 {
                let bit = word.trailing_zeros() as usize;
                result.push(index * WORD_WIDTH + bit);
                word &= word - 1;
            }
        }
        result
    }

    /// row[dest] += row[src]
    pub fn add_assign_rows(&mut self, dest: usize, src: usize) {
        let (dest_row, src_row) = get_both_indices(&mut self.elements, dest, src);
        add_assign_binary(dest_row, src_row);
    }

    /// row[dest] += other.row[src]
    pub fn add_assign_row_from(&mut self, dest: usize, other: &DenseBinaryMatrix, src: usize) {
        assert_eq!(self.width, other.width);
        add_assign_binary(&mut self.elements[dest], &other.elements[src]);
    }

    /// Same matrix with GF(256) elements.
    pub fn to_octet_matrix(&self) -> DenseOctetMatrix {
        let mut result = DenseOctetMatrix::new(self.height, self.width);
        for row in 0..self.height {
            for col in self.ones_in_row(row) {
                result.set(row, col, Octet::one());
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use crate::matrix::DenseBinaryMatrix;
    use crate::octet::Octet;

    fn random_matrix(height: usize, width: usize) -> DenseBinaryMatrix {
        let mut matrix = DenseBinaryMatrix::new(height, width);
        for i in 0..height {
            for j in 0..width {
                matrix.set(i, j, rand::thread_rng().gen_range(0, 2) == 1);
            }
        }
        matrix
    }

    #[test]
    fn set_get() {
        let mut matrix = DenseBinaryMatrix::new(3, 130);
        matrix.set(1, 129, true);
        matrix.set(1, 64, true);
        assert!(matrix.get(1, 129));
        assert!(matrix.get(1, 64));
        assert!(!matrix.get(0, 129));
        assert_eq!(vec![64, 129], matrix.ones_in_row(1));
        assert_eq!(2, matrix.count_ones(1));
        matrix.set(1, 64, false);
        assert_eq!(vec![129], matrix.ones_in_row(1));
    }

    #[test]
    fn add_rows() {
        let mut matrix = random_matrix(4, 100);
        let original = matrix.clone();
        matrix.add_assign_rows(2, 0);
        for j in 0..100 {
            assert_eq!(original.get(2, j) ^ original.get(0, j), matrix.get(2, j));
        }
        matrix.add_assign_rows(2, 0);
        assert_eq!(original, matrix);
    }

    #[test]
    fn octet_conversion() {
        let matrix = random_matrix(5, 70);
        let octets = matrix.to_octet_matrix();
        for i in 0..5 {
            for j in 0..70 {
                let expected = if matrix.get(i, j) {
                    Octet::one()
                } else {
                    Octet::zero()
                };
                assert_eq!(expected, octets.get(i, j));
            }
        }
    }
}
