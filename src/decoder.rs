use crate::config::{CodecConfig, SolverConfig};
use crate::encoder::Encoder;
use crate::error::{FecError, FecResult};
use crate::octet_matrix::DenseOctetMatrix;
use crate::solver::{encode_symbol, solve};
use crate::systematic_constants::Parameters;
use log::*;
use once_cell::sync::OnceCell;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecoderState {
    // Fewer than K distinct symbols
    Collecting,
    // Enough symbols, not solved yet
    Decodable,
    Solved,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeStatus {
    Step, // the symbol advanced decoding
    Keep, // duplicate, or decoding was already complete
    Done, // the data can be retrieved
}

/// Decoder for one source block.
///
/// Symbols are fed with `add_symbol` in any order. Source symbols are stored in place, repair
/// symbols are kept by internal symbol index until a solve needs them.
pub struct Decoder {
    params: Parameters,
    symbol_size: usize,
    data_len: usize,
    solver: SolverConfig,
    // K symbols back to back
    source_data: Vec<u8>,
    source_mask: Vec<bool>,
    received_source_symbols: u32,
    recovered_source_symbols: u32,
    repair_ids: HashSet<u32>,
    // In arrival order, keyed by internal symbol index
    repair_symbols: Vec<(u32, Vec<u8>)>,
    intermediate_symbols: OnceCell<Arc<DenseOctetMatrix>>,
}

impl Decoder {
    pub fn new(data_len: u64, symbol_size: u16) -> FecResult<Decoder> {
        Decoder::with_config(data_len, &CodecConfig::with_symbol_size(symbol_size))
    }

    pub fn with_config(data_len: u64, config: &CodecConfig) -> FecResult<Decoder> {
        let params = config.parameters(data_len)?;
        let symbol_size = config.symbol_size as usize;
        let source_symbols = params.source_symbols() as usize;
        Ok(Decoder {
            params,
            symbol_size,
            data_len: data_len as usize,
            solver: config.solver,
            source_data: vec![0; source_symbols * symbol_size],
            source_mask: vec![false; source_symbols],
            received_source_symbols: 0,
            recovered_source_symbols: 0,
            repair_ids: HashSet::new(),
            repair_symbols: vec![],
            intermediate_symbols: OnceCell::new(),
        })
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    pub fn symbol_size(&self) -> usize {
        self.symbol_size
    }

    pub fn data_len(&self) -> usize {
        self.data_len
    }

    pub fn received_source_symbols(&self) -> u32 {
        self.received_source_symbols
    }

    pub fn received_repair_symbols(&self) -> u32 {
        self.repair_symbols.len() as u32
    }

    pub fn state(&self) -> DecoderState {
        if self.intermediate_symbols.get().is_some() {
            DecoderState::Solved
        } else if self.is_decodable() {
            DecoderState::Decodable
        } else {
            DecoderState::Collecting
        }
    }

    /// True once the data can be produced: every source symbol is known, the system is solved,
    /// or at least K distinct symbols arrived.
    pub fn is_decodable(&self) -> bool {
        if self.is_complete() {
            return true;
        }
        // The K' - K padding symbols are known zeros, so K received symbols make K'
        self.received_source_symbols + self.received_repair_symbols()
            >= self.params.source_symbols()
    }

    /// True when no solve is needed anymore to produce the data.
    pub fn is_complete(&self) -> bool {
        self.known_source_symbols() == self.params.source_symbols()
            || self.intermediate_symbols.get().is_some()
    }

    fn known_source_symbols(&self) -> u32 {
        self.received_source_symbols + self.recovered_source_symbols
    }

    /// Feeds the symbol with encoding symbol id `symbol_id`. Returns whether the data can now be
    /// decoded. Symbols already known are ignored.
    pub fn add_symbol(&mut self, symbol_id: u32, payload: &[u8]) -> FecResult<bool> {
        self.insert_symbol(symbol_id, payload)?;
        Ok(self.is_decodable())
    }

    /// Like `add_symbol`, and also tries to solve as soon as enough symbols arrived.
    pub fn push_symbol(&mut self, symbol_id: u32, payload: &[u8]) -> FecResult<DecodeStatus> {
        self.check_symbol(symbol_id, payload)?;
        if self.is_complete() {
            return Ok(DecodeStatus::Keep);
        }
        if !self.insert_symbol(symbol_id, payload)? {
            return Ok(DecodeStatus::Keep);
        }
        if self.is_complete() {
            return Ok(DecodeStatus::Done);
        }
        if !self.is_decodable() {
            return Ok(DecodeStatus::Step);
        }
        match self.solve() {
            Ok(_) => Ok(DecodeStatus::Done),
            Err(e) if e.is_recoverable() => Ok(DecodeStatus::Step),
            Err(e) => Err(e),
        }
    }

    // Internal symbol index of a well formed symbol
    fn check_symbol(&self, symbol_id: u32, payload: &[u8]) -> FecResult<u32> {
        if payload.len() != self.symbol_size {
            return Err(FecError::InvalidSymbolSize {
                expected: self.symbol_size,
                got: payload.len(),
            });
        }
        if symbol_id < self.params.source_symbols() {
            return Ok(symbol_id);
        }
        symbol_id
            .checked_add(self.params.padding_symbols())
            .ok_or(FecError::InvalidSymbolId {
                id: symbol_id as u64,
            })
    }

    // Returns false for a symbol that was already known
    fn insert_symbol(&mut self, symbol_id: u32, payload: &[u8]) -> FecResult<bool> {
        let internal_symbol_id = self.check_symbol(symbol_id, payload)?;

        if symbol_id < self.params.source_symbols() {
            let id = symbol_id as usize;
            if self.source_mask[id] {
                return Ok(false);
            }
            let offset = id * self.symbol_size;
            self.source_data[offset..(offset + self.symbol_size)].copy_from_slice(payload);
            self.source_mask[id] = true;
            self.received_source_symbols += 1;
            return Ok(true);
        }

        if !self.repair_ids.insert(internal_symbol_id) {
            return Ok(false);
        }
        self.repair_symbols.push((internal_symbol_id, payload.to_vec()));
        Ok(true)
    }

    /// Solved intermediate symbols. The first successful call runs the solver; later calls return
    /// the cached result. A failed solve leaves the decoder ready for more symbols.
    pub fn solve(&self) -> FecResult<&Arc<DenseOctetMatrix>> {
        self.intermediate_symbols.get_or_try_init(|| {
            if !self.is_decodable() {
                return Err(FecError::NotEnoughSymbols {
                    received: self.received_source_symbols + self.received_repair_symbols(),
                    needed: self.params.source_symbols(),
                });
            }

            let k = self.params.source_symbols();
            let k_prime = self.params.extended_source_symbols();
            let count =
                self.received_source_symbols + (k_prime - k) + self.received_repair_symbols();
            let mut ids = Vec::with_capacity(count as usize);
            let mut symbols = Vec::with_capacity(count as usize);
            for (id, known) in self.source_mask.iter().enumerate() {
                if *known {
                    let offset = id * self.symbol_size;
                    ids.push(id as u32);
                    symbols.push(self.source_data[offset..(offset + self.symbol_size)].to_vec());
                }
            }
            for id in k..k_prime {
                ids.push(id);
                symbols.push(vec![0; self.symbol_size]);
            }
            for (id, symbol) in self.repair_symbols.iter() {
                ids.push(*id);
                symbols.push(symbol.clone());
            }

            debug!(
                "{} solving with source={}, repair={}",
                self,
                self.received_source_symbols,
                self.received_repair_symbols()
            );
            match solve(&self.params, symbols, &ids, &self.solver) {
                Ok(c) => {
                    debug!("{} solved", self);
                    Ok(Arc::new(c))
                }
                Err(e) => {
                    warn!("{} solve failed: {}", self, e);
                    Err(e)
                }
            }
        })
    }

    fn recover_symbol(&mut self, symbol_id: usize, intermediate_symbols: &DenseOctetMatrix) {
        if self.source_mask[symbol_id] {
            return;
        }
        let offset = symbol_id * self.symbol_size;
        encode_symbol(
            &self.params,
            intermediate_symbols,
            symbol_id as u32,
            &mut self.source_data[offset..(offset + self.symbol_size)],
        );
        self.source_mask[symbol_id] = true;
        self.recovered_source_symbols += 1;
    }

    /// Copies bytes `start..end` of the data into `dest`, recovering only the source symbols that
    /// overlap the range. Stops at the first missing symbol that cannot be recovered yet.
    ///
    /// Returns the number of bytes written. `dest` must hold the whole clipped range.
    pub fn decode_range(
        &mut self,
        dest: &mut [u8],
        start: usize,
        end: usize,
    ) -> FecResult<usize> {
        let end = end.min(self.data_len);
        if start >= end {
            return Ok(0);
        }
        if dest.len() < end - start {
            return Err(FecError::InvalidParam(format!(
                "destination holds {} bytes, range is {} bytes",
                dest.len(),
                end - start
            )));
        }

        let mut written = 0;
        for symbol_id in (start / self.symbol_size)..=((end - 1) / self.symbol_size) {
            if !self.source_mask[symbol_id] {
                let c = match self.solve() {
                    Ok(c) => c.clone(),
                    Err(_) => break,
                };
                self.recover_symbol(symbol_id, &c);
            }
            let symbol_start = symbol_id * self.symbol_size;
            let from = start.max(symbol_start);
            let to = end.min(symbol_start + self.symbol_size);
            dest[written..(written + to - from)].copy_from_slice(&self.source_data[from..to]);
            written += to - from;
        }
        Ok(written)
    }

    pub fn decode_into(&mut self, dest: &mut [u8]) -> FecResult<()> {
        if dest.len() < self.data_len {
            return Err(FecError::InvalidParam(format!(
                "destination holds {} bytes, data is {} bytes",
                dest.len(),
                self.data_len
            )));
        }
        if self.known_source_symbols() != self.params.source_symbols() {
            self.solve()?;
        }
        let written = self.decode_range(dest, 0, self.data_len)?;
        debug_assert_eq!(self.data_len, written);
        Ok(())
    }

    pub fn decode(&mut self) -> FecResult<Vec<u8>> {
        let mut result = vec![0; self.data_len];
        self.decode_into(&mut result)?;
        Ok(result)
    }

    /// Encoder for the same block built from the solved intermediate symbols, so repair symbols
    /// can be produced without solving again. `None` until the decoder has solved.
    pub fn solved_encoder(&mut self) -> Option<Encoder> {
        let c = self.intermediate_symbols.get()?.clone();
        for symbol_id in 0..self.source_mask.len() {
            self.recover_symbol(symbol_id, &c);
        }

        let mut source_symbols: Vec<Vec<u8>> = self
            .source_data
            .chunks_exact(self.symbol_size)
            .map(|symbol| symbol.to_vec())
            .collect();
        source_symbols.resize(
            self.params.extended_source_symbols() as usize,
            vec![0; self.symbol_size],
        );
        Some(Encoder::with_solved(
            self.params,
            self.data_len,
            source_symbols,
            self.solver,
            c,
        ))
    }
}

impl fmt::Display for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Decoder{{K:{}, symbol_size:{}, data_len:{}}}",
            self.params.source_symbols(),
            self.symbol_size,
            self.data_len
        )
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use crate::decoder::{DecodeStatus, Decoder, DecoderState};
    use crate::encoder::Encoder;
    use crate::error::FecError;

    fn random_data(len: usize) -> Vec<u8> {
        let mut data = vec![0u8; len];
        for byte in data.iter_mut() {
            *byte = rand::thread_rng().gen();
        }
        data
    }

    #[test]
    fn state_transitions() {
        crate::init_simple_log("test-decoder-state", Some("debug"));
        let data = random_data(120);
        let encoder = Encoder::new(&data, 12).unwrap();
        let mut decoder = Decoder::new(120, 12).unwrap();
        assert_eq!(DecoderState::Collecting, decoder.state());

        for id in 1..10u32 {
            assert!(!decoder.add_symbol(id, &encoder.encode(id).unwrap()).unwrap());
        }
        assert_eq!(DecoderState::Collecting, decoder.state());
        assert!(decoder.add_symbol(10, &encoder.encode(10).unwrap()).unwrap());
        assert_eq!(DecoderState::Decodable, decoder.state());
        // A little overhead keeps the solve from hitting a rank deficient set
        for id in 11..14u32 {
            assert!(decoder.add_symbol(id, &encoder.encode(id).unwrap()).unwrap());
        }

        decoder.solve().unwrap();
        assert_eq!(DecoderState::Solved, decoder.state());
        assert_eq!(data, decoder.decode().unwrap());
        assert_eq!(9, decoder.received_source_symbols());
        assert_eq!(4, decoder.received_repair_symbols());
    }

    #[test]
    fn duplicates_are_ignored() {
        let mut decoder = Decoder::new(40, 4).unwrap();
        let first = vec![1u8, 2, 3, 4];
        let second = vec![9u8, 9, 9, 9];
        decoder.add_symbol(0, &first).unwrap();
        decoder.add_symbol(0, &second).unwrap();
        assert_eq!(1, decoder.received_source_symbols());
        decoder.add_symbol(12, &first).unwrap();
        decoder.add_symbol(12, &second).unwrap();
        assert_eq!(1, decoder.received_repair_symbols());

        let mut dest = vec![0u8; 4];
        assert_eq!(4, decoder.decode_range(&mut dest, 0, 4).unwrap());
        assert_eq!(first, dest);
    }

    #[test]
    fn rejects_bad_input_without_mutation() {
        let mut decoder = Decoder::new(30, 10).unwrap();
        assert_eq!(
            Err(FecError::InvalidSymbolSize {
                expected: 10,
                got: 3
            }),
            decoder.add_symbol(0, &[0, 1, 2])
        );
        assert_eq!(
            Err(FecError::InvalidSymbolId {
                id: u32::MAX as u64
            }),
            decoder.add_symbol(u32::MAX, &[0; 10])
        );
        assert_eq!(0, decoder.received_source_symbols());
        assert_eq!(0, decoder.received_repair_symbols());
        assert_eq!(DecoderState::Collecting, decoder.state());
    }

    #[test]
    fn not_enough_symbols() {
        let mut decoder = Decoder::new(100, 10).unwrap();
        decoder.add_symbol(3, &[7; 10]).unwrap();
        match decoder.decode() {
            Err(e) => assert!(e.is_recoverable()),
            Ok(_) => panic!("decoded from one symbol"),
        }
        // Symbols present are still readable
        let mut dest = vec![0u8; 15];
        assert_eq!(10, decoder.decode_range(&mut dest, 30, 45).unwrap());
        assert_eq!(&[7u8; 10][..], &dest[..10]);
        assert_eq!(0, decoder.decode_range(&mut dest, 0, 10).unwrap());
    }

    #[test]
    fn partial_range() {
        let data = random_data(100);
        let encoder = Encoder::new(&data, 10).unwrap();
        let mut decoder = Decoder::new(100, 10).unwrap();
        for id in 3..16u32 {
            decoder.add_symbol(id, &encoder.encode(id).unwrap()).unwrap();
        }
        let mut dest = vec![0u8; 100];
        assert_eq!(25, decoder.decode_range(&mut dest, 5, 30).unwrap());
        assert_eq!(&data[5..30], &dest[..25]);
        // Range end is clipped to the data
        assert_eq!(10, decoder.decode_range(&mut dest, 90, 200).unwrap());
        assert_eq!(&data[90..], &dest[..10]);

        let mut short = vec![0u8; 9];
        match decoder.decode_range(&mut short, 0, 10) {
            Err(FecError::InvalidParam(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn push_symbol_status() {
        let data = random_data(64);
        let encoder = Encoder::new(&data, 8).unwrap();
        let mut decoder = Decoder::new(64, 8).unwrap();
        for id in 0..7u32 {
            assert_eq!(
                DecodeStatus::Step,
                decoder.push_symbol(id, &encoder.encode(id).unwrap()).unwrap()
            );
        }
        assert_eq!(
            DecodeStatus::Keep,
            decoder.push_symbol(0, &encoder.encode(0).unwrap()).unwrap()
        );
        assert_eq!(
            DecodeStatus::Done,
            decoder.push_symbol(7, &encoder.encode(7).unwrap()).unwrap()
        );
        assert_eq!(
            DecodeStatus::Keep,
            decoder.push_symbol(8, &encoder.encode(8).unwrap()).unwrap()
        );
        // Malformed symbols are still rejected once decoding is complete
        assert_eq!(
            Err(FecError::InvalidSymbolSize {
                expected: 8,
                got: 3
            }),
            decoder.push_symbol(9, &[0; 3])
        );
        assert_eq!(
            Err(FecError::InvalidSymbolId {
                id: u32::MAX as u64
            }),
            decoder.push_symbol(u32::MAX, &[0; 8])
        );
        assert_eq!(data, decoder.decode().unwrap());
    }

    #[test]
    fn empty_data_is_rejected() {
        match Decoder::new(0, 16) {
            Err(FecError::UnsupportedSourceSymbols { symbols, .. }) => assert_eq!(0, symbols),
            Err(e) => panic!("unexpected {}", e),
            Ok(decoder) => panic!("created {}", decoder),
        }
        assert!(Encoder::new(&[], 16).is_err());
    }

    #[test]
    fn solved_encoder_reuses_solution() {
        let data = random_data(333);
        let encoder = Encoder::new(&data, 16).unwrap();
        let mut decoder = Decoder::new(333, 16).unwrap();
        assert!(decoder.solved_encoder().is_none());

        let k = encoder.parameters().source_symbols();
        for id in 2..(k + 4) {
            decoder.add_symbol(id, &encoder.encode(id).unwrap()).unwrap();
        }
        decoder.solve().unwrap();
        let solved = decoder.solved_encoder().unwrap();
        assert_eq!(k, decoder.received_source_symbols() + 2);
        for id in 0..(k + 20) {
            assert_eq!(encoder.encode(id).unwrap(), solved.encode(id).unwrap());
        }
    }
}
