use crate::decoder::{DecodeStatus, Decoder};
use crate::error::{FecError, FecResult};
use log::*;
use std::fmt;

//
// Piece oriented decoder for transport code:
// * feed (seq, piece) as they arrive, in any order
// * once decode_raw returns Done every piece can be retrieved
//
#[allow(non_snake_case)]
pub struct RaptorDecoder {
    decoder: Decoder,
    K: u32,
    piece_size: u16,
}

#[allow(non_snake_case)]
impl RaptorDecoder {
    pub fn new(K: u32, piece_size: u16) -> FecResult<Self> {
        if K == 0 {
            return Err(FecError::InvalidParam("no pieces to decode".to_owned()));
        }
        Ok(Self {
            decoder: Decoder::new(K as u64 * piece_size as u64, piece_size)?,
            K,
            piece_size,
        })
    }

    pub fn piece_size(&self) -> usize {
        self.piece_size as usize
    }

    pub fn is_done(&self) -> bool {
        self.decoder.is_complete()
    }

    // Decodes with a received (seq, piece)
    pub fn decode_raw(&mut self, seq: u32, piece: &[u8]) -> FecResult<DecodeStatus> {
        let status = self.decoder.push_symbol(seq, piece).map_err(|e| {
            error!("{} decode piece failed: seq={}, {}", self, seq, e);
            e
        })?;
        if status == DecodeStatus::Done {
            info!(
                "{} decode done: source={}, repair={}",
                self,
                self.decoder.received_source_symbols(),
                self.decoder.received_repair_symbols()
            );
        }
        Ok(status)
    }

    // Copies piece `index` into `buffer`; Ok(false) when it cannot be recovered yet
    pub fn retrieve_piece(&mut self, index: usize, buffer: &mut [u8]) -> FecResult<bool> {
        if index >= self.K as usize {
            return Err(FecError::InvalidSymbolId { id: index as u64 });
        }
        if buffer.len() != self.piece_size() {
            return Err(FecError::InvalidSymbolSize {
                expected: self.piece_size(),
                got: buffer.len(),
            });
        }

        let start = index * self.piece_size();
        let finish = start + self.piece_size();
        let written = self.decoder.decode_range(buffer, start, finish)?;
        Ok(written == self.piece_size())
    }
}

impl fmt::Display for RaptorDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RaptorDecoder{{K:{}, piece_size:{}}}", self.K, self.piece_size)
    }
}
