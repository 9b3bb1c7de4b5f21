use crate::generator::{
    BlockGenerator, EncodingGenerator, Generator, IdentityGenerator, Ldpc1Generator,
    Ldpc2Generator,
};
use crate::octet::Octet;
use crate::octet_matrix::DenseOctetMatrix;
use crate::rng::rand;
use crate::sparse_matrix::SparseBinaryMatrix;
use crate::systematic_constants::Parameters;
use crate::tuple::EncodingTuple;

// See section 5.3.3.4.2
// The sparse part of the constraint matrix: S LDPC rows followed by one row per received encoding
// symbol, L columns. The HDPC rows are never materialized; see `hdpc_multiply`.
//
// +--------+-----+-------+
// | LDPC1  | I_S | LDPC2 |
// +--------+-----+-------+
// | ENC                  |
// +----------------------+
#[allow(non_snake_case)]
pub fn build_constraint_matrix(
    params: &Parameters,
    tuples: &[EncodingTuple],
) -> SparseBinaryMatrix {
    let S = params.ldpc_symbols() as usize;
    let B = params.b() as usize;
    let P = params.pi_symbols() as usize;
    let L = params.intermediate_symbols() as usize;

    let ldpc1 = Ldpc1Generator::new(S, B);
    let identity = IdentityGenerator::new(S);
    let ldpc2 = Ldpc2Generator::new(S, P);
    let encoding = EncodingGenerator::new(params, tuples);
    let blocks: Vec<&dyn Generator> = vec![&ldpc1, &identity, &ldpc2, &encoding];

    SparseBinaryMatrix::from_generator(&BlockGenerator::new(S + tuples.len(), L, blocks))
}

/// Computes MT * GAMMA * `v` for the HDPC rows of section 5.3.3.3, where `v` has K' + S rows.
///
/// GAMMA is applied in place, so `v` is consumed as scratch space.
pub fn hdpc_multiply(hdpc_symbols: usize, mut v: DenseOctetMatrix) -> DenseOctetMatrix {
    let h = hdpc_symbols;
    let rows = v.height();
    let alpha = Octet::alpha(1);
    // GAMMA is lower triangular with alpha^(i-j), so it is a running sum scaled by alpha
    for i in 1..rows {
        v.fma_rows(i, i - 1, &alpha);
    }

    let mut result = DenseOctetMatrix::new(h, v.width());
    // Last column of MT is alpha^i
    for i in 0..h {
        result.fma_row_from(i, &v, rows - 1, &Octet::alpha(i));
    }
    // Every other column of MT has exactly two ones
    for col in 0..(rows - 1) {
        let a = rand((col + 1) as u32, 6, h as u32) as usize;
        let b = (a + rand((col + 1) as u32, 7, (h - 1) as u32) as usize + 1) % h;
        result.add_assign_row_from(a, &v, col);
        result.add_assign_row_from(b, &v, col);
    }

    result
}

/// HDPC rows restricted to the first `m.height()` permuted columns, times `m`.
///
/// Row `i` of `m` belongs to intermediate symbol `col_permutation[i]`.
pub fn hdpc_left_multiply(
    params: &Parameters,
    col_permutation: &[usize],
    m: &DenseOctetMatrix,
) -> DenseOctetMatrix {
    let rows = (params.extended_source_symbols() + params.ldpc_symbols()) as usize;
    let mut t = DenseOctetMatrix::new(rows, m.width());
    for i in 0..m.height() {
        t.row_mut(col_permutation[i]).copy_from_slice(m.row(i));
    }
    hdpc_multiply(params.hdpc_symbols() as usize, t)
}

#[cfg(test)]
mod tests {
    use crate::constraint_matrix::{build_constraint_matrix, hdpc_left_multiply, hdpc_multiply};
    use crate::generator::Generator;
    use crate::octet::Octet;
    use crate::octet_matrix::DenseOctetMatrix;
    use crate::rng::rand;
    use crate::systematic_constants::Parameters;
    use crate::tuple::EncodingTuple;

    fn tuples(params: &Parameters, count: u32) -> Vec<EncodingTuple> {
        (0..count).map(|isi| EncodingTuple::new(params, isi)).collect()
    }

    // MT * GAMMA written out as in section 5.3.3.3
    #[allow(non_snake_case)]
    fn explicit_hdpc(params: &Parameters) -> DenseOctetMatrix {
        let H = params.hdpc_symbols() as usize;
        let KS = (params.extended_source_symbols() + params.ldpc_symbols()) as usize;
        let mut mt = DenseOctetMatrix::new(H, KS);
        for j in 0..(KS - 1) {
            let rand6 = rand((j + 1) as u32, 6, H as u32) as usize;
            let rand7 = rand((j + 1) as u32, 7, (H - 1) as u32) as usize;
            mt.set(rand6, j, Octet::one());
            mt.set((rand6 + rand7 + 1) % H, j, Octet::one());
        }
        for i in 0..H {
            mt.set(i, KS - 1, Octet::alpha(i));
        }

        let mut result = DenseOctetMatrix::new(H, KS);
        for i in 0..H {
            for j in 0..KS {
                let mut value = Octet::zero();
                for k in j..KS {
                    value.fma(&mt.get(i, k), &Octet::alpha((k - j) % 255));
                }
                result.set(i, j, value);
            }
        }
        result
    }

    fn identity(size: usize) -> DenseOctetMatrix {
        let mut matrix = DenseOctetMatrix::new(size, size);
        for i in 0..size {
            matrix.set(i, i, Octet::one());
        }
        matrix
    }

    #[test]
    fn shape_and_ldpc_rows() {
        let params = Parameters::for_source_symbols(10).unwrap();
        let s = params.ldpc_symbols() as usize;
        let b = params.b() as usize;
        let w = params.lt_symbols() as usize;
        let p = params.pi_symbols() as usize;
        let k_prime = params.extended_source_symbols();
        let matrix = build_constraint_matrix(&params, &tuples(&params, k_prime));
        assert_eq!(s + k_prime as usize, matrix.rows());
        assert_eq!(params.intermediate_symbols() as usize, matrix.cols());

        // I_S sits right after the B LDPC1 columns
        for i in 0..s {
            assert!(matrix.get(i, b + i));
            assert!(matrix.get(i, w + i % p));
            assert!(matrix.get(i, w + (i + 1) % p));
        }
        for col in 0..b {
            let ones = matrix.col(col).iter().filter(|row| (**row as usize) < s).count();
            assert_eq!(3, ones);
        }
    }

    #[test]
    fn encoding_rows_follow_tuples() {
        let params = Parameters::for_source_symbols(100).unwrap();
        let s = params.ldpc_symbols() as usize;
        let tuples = tuples(&params, 120);
        let matrix = build_constraint_matrix(&params, &tuples);
        let rows = matrix.transpose();
        for (i, tuple) in tuples.iter().enumerate() {
            let mut expected = tuple.indices(&params);
            expected.sort_unstable();
            let actual: Vec<usize> = rows.col(s + i).iter().map(|c| *c as usize).collect();
            assert_eq!(expected, actual);
        }
        let expected_ones: usize = 3 * params.b() as usize
            + 3 * s
            + tuples.iter().map(|tuple| tuple.len()).sum::<usize>();
        assert_eq!(expected_ones, matrix.non_zeros());
    }

    #[test]
    fn hdpc_matches_explicit_matrix() {
        for &k in [10u32, 101, 300].iter() {
            let params = Parameters::for_source_symbols(k).unwrap();
            let ks = (params.extended_source_symbols() + params.ldpc_symbols()) as usize;
            let product = hdpc_multiply(params.hdpc_symbols() as usize, identity(ks));
            assert_eq!(explicit_hdpc(&params), product, "K = {}", k);
        }
    }

    #[test]
    fn left_multiply_scatters_rows() {
        let params = Parameters::for_source_symbols(10).unwrap();
        let ks = (params.extended_source_symbols() + params.ldpc_symbols()) as usize;
        let h = params.hdpc_symbols() as usize;
        let explicit = explicit_hdpc(&params);

        // One row picks a single column of the HDPC matrix
        let mut m = DenseOctetMatrix::new(1, 1);
        m.set(0, 0, Octet::one());
        let permutation: Vec<usize> = (0..ks).rev().collect();
        let result = hdpc_left_multiply(&params, &permutation, &m);
        for i in 0..h {
            assert_eq!(explicit.get(i, ks - 1), result.get(i, 0));
        }
    }
}
