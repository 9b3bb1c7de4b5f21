use crate::octet::Octet;
use crate::octets::{add_assign, fused_addassign_mul_scalar, mulassign_scalar};
use crate::util::get_both_indices;
#[cfg(feature = "benchmarking")]
use std::mem::size_of;

/// Row major GF(256) matrix. Rows of the right hand side and of C are symbols, so every row
/// operation here is a symbol operation.
#[derive(Clone, Debug, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct DenseOctetMatrix {
    height: usize,
    width: usize,
    elements: Vec<Vec<u8>>,
}

impl DenseOctetMatrix {
    pub fn new(height: usize, width: usize) -> DenseOctetMatrix {
        DenseOctetMatrix {
            height,
            width,
            elements: vec![vec![0; width]; height],
        }
    }

    /// One row per symbol. All symbols must have the same length.
    pub fn from_rows(rows: Vec<Vec<u8>>, width: usize) -> DenseOctetMatrix {
        assert!(rows.iter().all(|row| row.len() == width));
        DenseOctetMatrix {
            height: rows.len(),
            width,
            elements: rows,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    #[cfg(feature = "benchmarking")]
    pub fn size_in_bytes(&self) -> usize {
        let mut bytes = size_of::<Self>();
        bytes += size_of::<Vec<u8>>() * self.elements.len();
        bytes += size_of::<u8>() * self.height * self.width;

        bytes
    }

    pub fn get(&self, i: usize, j: usize) -> Octet {
        Octet::new(self.elements[i][j])
    }

    pub fn set(&mut self, i: usize, j: usize, value: Octet) {
        self.elements[i][j] = value.byte();
    }

    pub fn row(&self, i: usize) -> &[u8] {
        &self.elements[i]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [u8] {
        &mut self.elements[i]
    }

    pub fn into_rows(self) -> Vec<Vec<u8>> {
        self.elements
    }

    pub fn mul_assign_row(&mut self, row: usize, value: &Octet) {
        mulassign_scalar(&mut self.elements[row], value);
    }

    /// row[dest] += row[src]
    pub fn add_assign_rows(&mut self, dest: usize, src: usize) {
        let (dest_row, src_row) = get_both_indices(&mut self.elements, dest, src);
        add_assign(dest_row, src_row);
    }

    /// row[dest] += scalar * row[src]
    pub fn fma_rows(&mut self, dest: usize, src: usize, scalar: &Octet) {
        let (dest_row, src_row) = get_both_indices(&mut self.elements, dest, src);
        fused_addassign_mul_scalar(dest_row, src_row, scalar);
    }

    /// row[dest] += other.row[src]
    pub fn add_assign_row_from(&mut self, dest: usize, other: &DenseOctetMatrix, src: usize) {
        add_assign(&mut self.elements[dest], &other.elements[src]);
    }

    /// row[dest] += scalar * other.row[src]
    pub fn fma_row_from(
        &mut self,
        dest: usize,
        other: &DenseOctetMatrix,
        src: usize,
        scalar: &Octet,
    ) {
        fused_addassign_mul_scalar(&mut self.elements[dest], &other.elements[src], scalar);
    }

    /// self += other
    pub fn add_assign(&mut self, other: &DenseOctetMatrix) {
        assert_eq!(self.height, other.height);
        assert_eq!(self.width, other.width);
        for (dest, src) in self.elements.iter_mut().zip(other.elements.iter()) {
            add_assign(dest, src);
        }
    }

    /// Copies `other` into the block starting at (`row_offset`, `col_offset`).
    pub fn set_block(&mut self, row_offset: usize, col_offset: usize, other: &DenseOctetMatrix) {
        assert!(row_offset + other.height <= self.height);
        assert!(col_offset + other.width <= self.width);
        for (i, row) in other.elements.iter().enumerate() {
            self.elements[row_offset + i][col_offset..(col_offset + other.width)]
                .copy_from_slice(row);
        }
    }

    /// Copy of rows `start..start + count`.
    pub fn block_rows(&self, start: usize, count: usize) -> DenseOctetMatrix {
        assert!(start + count <= self.height);
        DenseOctetMatrix {
            height: count,
            width: self.width,
            elements: self.elements[start..(start + count)].to_vec(),
        }
    }

    /// `self` on top of `bottom`.
    pub fn stack(mut self, bottom: DenseOctetMatrix) -> DenseOctetMatrix {
        assert_eq!(self.width, bottom.width);
        self.height += bottom.height;
        self.elements.extend(bottom.elements);
        self
    }

    /// New matrix whose row `i` is row `permutation[i]` of this one.
    pub fn apply_row_permutation(&self, permutation: &[usize]) -> DenseOctetMatrix {
        assert_eq!(self.height, permutation.len());
        DenseOctetMatrix {
            height: self.height,
            width: self.width,
            elements: permutation
                .iter()
                .map(|&old| self.elements[old].clone())
                .collect(),
        }
    }

    /// New matrix made of the rows listed in `rows`, in that order.
    pub fn select_rows(&self, rows: &[usize]) -> DenseOctetMatrix {
        DenseOctetMatrix {
            height: rows.len(),
            width: self.width,
            elements: rows.iter().map(|&row| self.elements[row].clone()).collect(),
        }
    }
}
