use crate::config::SolverConfig;
use crate::constraint_matrix::{build_constraint_matrix, hdpc_left_multiply, hdpc_multiply};
use crate::error::{FecError, FecResult};
use crate::gaussian::gaussian_elimination;
use crate::generator::inverse_permutation;
use crate::inactivation::{InactivationDecoder, InactivationResult};
use crate::octet::Octet;
use crate::octet_matrix::DenseOctetMatrix;
use crate::octets::add_assign;
use crate::systematic_constants::Parameters;
use crate::tuple::EncodingTuple;
use log::*;
use std::time::{Duration, Instant};

/// Receives the named checkpoints of a solve with the time spent since the previous one.
pub trait SolveObserver {
    fn checkpoint(&mut self, name: &'static str, elapsed: Duration);
}

/// Writes checkpoints to the log at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl SolveObserver for LogObserver {
    fn checkpoint(&mut self, name: &'static str, elapsed: Duration) {
        debug!("solve checkpoint {}: {:?}", name, elapsed);
    }
}

struct Stopwatch<'a> {
    observer: Option<&'a mut dyn SolveObserver>,
    last: Instant,
}

impl<'a> Stopwatch<'a> {
    fn new(observer: Option<&'a mut dyn SolveObserver>) -> Self {
        Self {
            observer,
            last: Instant::now(),
        }
    }

    fn checkpoint(&mut self, name: &'static str) {
        if let Some(observer) = self.observer.as_mut() {
            let now = Instant::now();
            observer.checkpoint(name, now - self.last);
            self.last = now;
        }
    }
}

/// Solves A * C = D for the L intermediate symbols C.
///
/// `symbols[i]` is the encoding symbol with internal symbol index `ids[i]`. At least K' symbols
/// are required; padding symbols must be passed explicitly as zero symbols.
pub fn solve(
    params: &Parameters,
    symbols: Vec<Vec<u8>>,
    ids: &[u32],
    config: &SolverConfig,
) -> FecResult<DenseOctetMatrix> {
    if config.perf_log {
        solve_with_observer(params, symbols, ids, &mut LogObserver)
    } else {
        solve_observed(params, symbols, ids, None)
    }
}

pub fn solve_with_observer(
    params: &Parameters,
    symbols: Vec<Vec<u8>>,
    ids: &[u32],
    observer: &mut dyn SolveObserver,
) -> FecResult<DenseOctetMatrix> {
    solve_observed(params, symbols, ids, Some(observer))
}

// A:
// +--------+-----+-------+
// | LDPC1  | I_S | LDPC2 |
// +--------+-----+-------+
// | ENC                  |
// +---------------+------+
// | HDPC          | I_H  |
// +---------------+------+
//
// After inactivation the sparse rows are permuted into
// +--------+---------+        +---------+
// | U      | E       |        | D_upper |
// +--------+---------+        +---------+
// | G_left | G_right | * C =  |         |
// +--------+--+------+        | D_lower |
// | HDPC      | I_H  |        |         |
// +-----------+------+        +---------+
#[allow(non_snake_case)]
fn solve_observed(
    params: &Parameters,
    symbols: Vec<Vec<u8>>,
    ids: &[u32],
    observer: Option<&mut dyn SolveObserver>,
) -> FecResult<DenseOctetMatrix> {
    assert_eq!(symbols.len(), ids.len());
    let K_prime = params.extended_source_symbols() as usize;
    if symbols.len() < K_prime {
        return Err(FecError::NotEnoughSymbols {
            received: symbols.len() as u32,
            needed: K_prime as u32,
        });
    }
    let symbol_size = symbols[0].len();
    if let Some(symbol) = symbols.iter().find(|symbol| symbol.len() != symbol_size) {
        return Err(FecError::InvalidSymbolSize {
            expected: symbol_size,
            got: symbol.len(),
        });
    }

    let S = params.ldpc_symbols() as usize;
    let H = params.hdpc_symbols() as usize;
    let L = params.intermediate_symbols() as usize;
    let P = params.pi_symbols() as usize;
    let mut stopwatch = Stopwatch::new(observer);
    trace!("solve {} with {} symbols", params, symbols.len());

    let tuples: Vec<EncodingTuple> = ids
        .iter()
        .map(|&id| EncodingTuple::new(params, id))
        .collect();
    let upper_a = build_constraint_matrix(params, &tuples);
    let d = create_d(params, symbols, symbol_size);

    let InactivationResult {
        size: u,
        mut row_permutation,
        col_permutation,
    } = InactivationDecoder::new(&upper_a, P).run()?;
    stopwatch.checkpoint("inactivation");

    let rows = upper_a.rows();
    // The HDPC rows of D stay in place
    row_permutation.extend(rows..d.height());
    let mut d = d.apply_row_permutation(&row_permutation);
    let upper_a = upper_a
        .apply_row_permutation(&row_permutation[..rows])
        .apply_col_permutation(&col_permutation);

    let mut e = upper_a.block_dense(0, u, u, L - u);
    // Back substitution needs D_upper as it is before U is reduced
    let mut c = DenseOctetMatrix::new(L, symbol_size);
    c.set_block(0, 0, &d.block_rows(0, u));

    // U is lower triangular with a unit diagonal: reduce it to the identity, carrying E and D
    for i in 0..u {
        for &row in upper_a.col(i) {
            let row = row as usize;
            if row == i {
                continue;
            }
            if row >= u {
                break;
            }
            e.add_assign_rows(row, i);
            d.add_assign_rows(row, i);
        }
    }
    stopwatch.checkpoint("triangular");

    let g_left = upper_a.block_sparse(u, 0, rows - u, u);

    // small_A_upper = G_right + G_left * E
    let mut small_upper_a = DenseOctetMatrix::new(rows - u, L - u);
    upper_a.block_for_each(u, u, rows - u, L - u, |row, col| {
        small_upper_a.set(row, col, Octet::one())
    });
    small_upper_a.add_assign(&g_left.mul_binary(&e).to_octet_matrix());

    // small_A_lower = HDPC_right | I_H, then += HDPC_left * E
    let ks = K_prime + S;
    let mut t = DenseOctetMatrix::new(ks, ks - u);
    for i in 0..(ks - u) {
        t.set(col_permutation[i + u], i, Octet::one());
    }
    let mut small_lower_a = DenseOctetMatrix::new(H, L - u);
    small_lower_a.set_block(0, 0, &hdpc_multiply(H, t));
    for i in 1..=H {
        small_lower_a.set(H - i, L - u - i, Octet::one());
    }
    small_lower_a.add_assign(&hdpc_left_multiply(
        params,
        &col_permutation,
        &e.to_octet_matrix(),
    ));

    let upper_d = d.block_rows(0, u);
    let mut small_upper_d = d.block_rows(u, rows - u);
    small_upper_d.add_assign(&g_left.mul_octets(&upper_d));
    let mut small_lower_d = d.block_rows(rows, H);
    small_lower_d.add_assign(&hdpc_left_multiply(params, &col_permutation, &upper_d));
    stopwatch.checkpoint("small_system");

    let small_c = gaussian_elimination(
        small_upper_a.stack(small_lower_a),
        small_upper_d.stack(small_lower_d),
    )?;
    stopwatch.checkpoint("gaussian");

    c.set_block(u, 0, &small_c);
    let upper_a_rows = upper_a.transpose();
    for row in 0..u {
        for &col in upper_a_rows.col(row) {
            let col = col as usize;
            if col == row {
                continue;
            }
            c.add_assign_rows(row, col);
        }
    }

    let result = c.apply_row_permutation(&inverse_permutation(&col_permutation));
    stopwatch.checkpoint("back_substitution");

    Ok(result)
}

// S zero rows for the LDPC constraints, the symbols, then H zero rows for the HDPC constraints
fn create_d(params: &Parameters, symbols: Vec<Vec<u8>>, symbol_size: usize) -> DenseOctetMatrix {
    let s = params.ldpc_symbols() as usize;
    let h = params.hdpc_symbols() as usize;
    let mut rows = Vec::with_capacity(s + symbols.len() + h);
    rows.resize(s, vec![0; symbol_size]);
    rows.extend(symbols);
    rows.resize(rows.len() + h, vec![0; symbol_size]);
    DenseOctetMatrix::from_rows(rows, symbol_size)
}

/// Sum of the intermediate symbols selected by the tuple of `internal_symbol_id`.
pub fn encode_symbol(
    params: &Parameters,
    intermediate_symbols: &DenseOctetMatrix,
    internal_symbol_id: u32,
    dest: &mut [u8],
) {
    assert_eq!(intermediate_symbols.width(), dest.len());
    dest.iter_mut().for_each(|x| *x = 0);
    EncodingTuple::new(params, internal_symbol_id).for_each_index(params, |index| {
        add_assign(dest, intermediate_symbols.row(index));
    });
}
