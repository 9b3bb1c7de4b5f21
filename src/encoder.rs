use crate::config::{CodecConfig, SolverConfig};
use crate::error::{FecError, FecResult};
use crate::octet_matrix::DenseOctetMatrix;
use crate::solver::{encode_symbol, solve};
use crate::systematic_constants::Parameters;
use log::*;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Systematic encoder for one source block.
///
/// Source symbols come back verbatim. The first repair symbol request solves for the intermediate
/// symbols; the result is cached and shared by every later request, from any thread.
pub struct Encoder {
    params: Parameters,
    symbol_size: usize,
    data_len: usize,
    // K' symbols, the tail of the data and the padding symbols filled with zeros
    source_symbols: Vec<Vec<u8>>,
    solver: SolverConfig,
    intermediate_symbols: OnceCell<Arc<DenseOctetMatrix>>,
}

impl Encoder {
    pub fn new(data: &[u8], symbol_size: u16) -> FecResult<Encoder> {
        Encoder::with_config(data, &CodecConfig::with_symbol_size(symbol_size))
    }

    pub fn with_config(data: &[u8], config: &CodecConfig) -> FecResult<Encoder> {
        let params = config.parameters(data.len() as u64)?;
        let symbol_size = config.symbol_size as usize;
        let source_symbols = (0..params.extended_source_symbols() as usize)
            .map(|id| {
                let mut symbol = vec![0; symbol_size];
                let offset = id * symbol_size;
                if offset < data.len() {
                    let len = symbol_size.min(data.len() - offset);
                    symbol[..len].copy_from_slice(&data[offset..(offset + len)]);
                }
                symbol
            })
            .collect();

        Ok(Encoder {
            params,
            symbol_size,
            data_len: data.len(),
            source_symbols,
            solver: config.solver,
            intermediate_symbols: OnceCell::new(),
        })
    }

    // Encoder over already recovered source symbols and their solved intermediate symbols.
    pub(crate) fn with_solved(
        params: Parameters,
        data_len: usize,
        source_symbols: Vec<Vec<u8>>,
        solver: SolverConfig,
        intermediate_symbols: Arc<DenseOctetMatrix>,
    ) -> Encoder {
        assert_eq!(
            params.extended_source_symbols() as usize,
            source_symbols.len()
        );
        Encoder {
            params,
            symbol_size: intermediate_symbols.width(),
            data_len,
            source_symbols,
            solver,
            intermediate_symbols: OnceCell::with_value(intermediate_symbols),
        }
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

    /// Solved intermediate symbols, computing them on first use.
    pub fn intermediate_symbols(&self) -> FecResult<&Arc<DenseOctetMatrix>> {
        self.intermediate_symbols.get_or_try_init(|| {
            debug!("encoder solving intermediate symbols, {}", self.params);
            let ids: Vec<u32> = (0..self.params.extended_source_symbols()).collect();
            let c = solve(
                &self.params,
                self.source_symbols.clone(),
                &ids,
                &self.solver,
            )
            .map_err(|e| {
                error!("encoder solve failed: {}, {}", self.params, e);
                e
            })?;
            Ok(Arc::new(c))
        })
    }

    pub fn raw_encoder(&self) -> FecResult<RawEncoder> {
        Ok(RawEncoder::new(
            self.params,
            self.intermediate_symbols()?.clone(),
        ))
    }

    /// Symbol with encoding symbol id `symbol_id`: ids below K are source symbols, the rest are
    /// repair symbols.
    pub fn encode(&self, symbol_id: u32) -> FecResult<Vec<u8>> {
        let mut symbol = vec![0; self.symbol_size];
        self.encode_into(symbol_id, &mut symbol)?;
        Ok(symbol)
    }

    pub fn encode_into(&self, symbol_id: u32, dest: &mut [u8]) -> FecResult<()> {
        if dest.len() != self.symbol_size {
            return Err(FecError::InvalidSymbolSize {
                expected: self.symbol_size,
                got: dest.len(),
            });
        }

        if symbol_id < self.params.source_symbols() {
            dest.copy_from_slice(&self.source_symbols[symbol_id as usize]);
            return Ok(());
        }

        let internal_symbol_id = symbol_id
            .checked_add(self.params.padding_symbols())
            .ok_or(FecError::InvalidSymbolId {
                id: symbol_id as u64,
            })?;
        let c = self.intermediate_symbols()?;
        encode_symbol(&self.params, c, internal_symbol_id, dest);
        Ok(())
    }
}

/// Produces the encoding symbol of any internal symbol index from solved intermediate symbols.
///
/// Unlike `Encoder` it has no systematic shortcut: every symbol is summed from C.
#[derive(Clone)]
pub struct RawEncoder {
    params: Parameters,
    intermediate_symbols: Arc<DenseOctetMatrix>,
}

impl RawEncoder {
    pub fn new(params: Parameters, intermediate_symbols: Arc<DenseOctetMatrix>) -> RawEncoder {
        assert_eq!(
            params.intermediate_symbols() as usize,
            intermediate_symbols.height()
        );
        RawEncoder {
            params,
            intermediate_symbols,
        }
    }

    pub fn symbol_size(&self) -> usize {
        self.intermediate_symbols.width()
    }

    pub fn encode(&self, internal_symbol_id: u32) -> Vec<u8> {
        let mut symbol = vec![0; self.symbol_size()];
        encode_symbol(
            &self.params,
            &self.intermediate_symbols,
            internal_symbol_id,
            &mut symbol,
        );
        symbol
    }

    pub fn encode_into(&self, internal_symbol_id: u32, dest: &mut [u8]) -> FecResult<()> {
        if dest.len() != self.symbol_size() {
            return Err(FecError::InvalidSymbolSize {
                expected: self.symbol_size(),
                got: dest.len(),
            });
        }
        encode_symbol(
            &self.params,
            &self.intermediate_symbols,
            internal_symbol_id,
            dest,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;
    use std::sync::Arc;

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
    fn systematic() {
        let data = random_data(1000);
        let encoder = Encoder::new(&data, 64).unwrap();
        assert_eq!(16, encoder.parameters().source_symbols());
        for id in 0..15u32 {
            let offset = id as usize * 64;
            assert_eq!(&data[offset..offset + 64], &encoder.encode(id).unwrap()[..]);
        }
        // The last symbol is zero padded
        let last = encoder.encode(15).unwrap();
        assert_eq!(&data[960..], &last[..40]);
        assert!(last[40..].iter().all(|x| *x == 0));
    }

    #[test]
    fn raw_encoder_matches_source_symbols() {
        let data = random_data(200);
        let encoder = Encoder::new(&data, 20).unwrap();
        let raw = encoder.raw_encoder().unwrap();
        // Source symbols are the first K intermediate encoding symbols
        for id in 0..10u32 {
            assert_eq!(encoder.encode(id).unwrap(), raw.encode(id));
        }
        let padding = encoder.parameters().padding_symbols();
        assert_eq!(encoder.encode(10).unwrap(), raw.encode(10 + padding));
    }

    #[test]
    fn deterministic() {
        let data = random_data(777);
        let first = Encoder::new(&data, 16).unwrap();
        let second = Encoder::new(&data, 16).unwrap();
        for id in 0..120u32 {
            assert_eq!(first.encode(id).unwrap(), second.encode(id).unwrap());
        }
    }

    #[test]
    fn wrong_destination_size() {
        let encoder = Encoder::new(&random_data(50), 10).unwrap();
        let mut dest = vec![0u8; 9];
        assert_eq!(
            Err(FecError::InvalidSymbolSize {
                expected: 10,
                got: 9
            }),
            encoder.encode_into(0, &mut dest)
        );
    }

    #[test]
    fn id_overflow() {
        // K = 3 has padding, so the largest ids have no internal index
        let encoder = Encoder::new(&random_data(30), 10).unwrap();
        assert!(encoder.parameters().padding_symbols() > 0);
        assert_eq!(
            Err(FecError::InvalidSymbolId {
                id: u32::MAX as u64
            }),
            encoder.encode(u32::MAX)
        );
    }

    #[test]
    fn concurrent_repair_symbols() {
        let data = random_data(4000);
        let encoder = Arc::new(Encoder::new(&data, 32).unwrap());
        let expected: Vec<Vec<u8>> = {
            let reference = Encoder::new(&data, 32).unwrap();
            (125..150u32).map(|id| reference.encode(id).unwrap()).collect()
        };

        let pool = threadpool::Builder::new().num_threads(4).build();
        let (sender, receiver) = std::sync::mpsc::channel();
        for id in 125..150u32 {
            let encoder = encoder.clone();
            let sender = sender.clone();
            pool.execute(move || {
                let symbol = encoder.encode(id).unwrap();
                sender.send((id, symbol)).unwrap();
            });
        }
        pool.join();
        drop(sender);
        let mut received = 0;
        for (id, symbol) in receiver.iter() {
            assert_eq!(expected[(id - 125) as usize], symbol);
            received += 1;
        }
        assert_eq!(25, received);
    }
}
