use crate::encoder::Encoder;
use crate::error::{FecError, FecResult};
use crate::systematic_constants::Parameters;
use log::*;
use std::fmt;

//
// Piece oriented encoder for transport code:
// * the data is cut into K pieces of piece_size bytes
// * piece seq < K is the piece itself, larger seq are repair pieces
//
#[allow(non_snake_case)]
pub struct RaptorEncoder {
    encoder: Option<Encoder>,
    K: u32,
    piece_size: u16,
}

#[allow(non_snake_case)]
impl RaptorEncoder {
    pub fn new(K: u32, piece_size: u16) -> FecResult<Self> {
        Parameters::for_source_symbols(K)?;
        if piece_size == 0 {
            return Err(FecError::InvalidParam("piece size must be positive".to_owned()));
        }
        Ok(Self {
            encoder: None,
            K,
            piece_size,
        })
    }

    pub fn source_pieces(&self) -> u32 {
        self.K
    }

    pub fn encode_piece_size(&self) -> usize {
        self.piece_size as usize
    }

    // Data shorter than K pieces is zero filled
    pub fn precode(&mut self, data: &[u8]) -> FecResult<()> {
        let block_len = self.K as usize * self.piece_size as usize;
        if data.len() > block_len {
            let msg = format!(
                "{} precode data too long: len={}, block={}",
                self,
                data.len(),
                block_len
            );
            error!("{}", msg);
            return Err(FecError::InvalidParam(msg));
        }

        let mut block = data.to_vec();
        block.resize(block_len, 0);
        self.encoder = Some(Encoder::new(&block, self.piece_size)?);
        debug!("{} precoded {} bytes", self, data.len());
        Ok(())
    }

    pub fn encode_raw(&self, seq: u32, buf: &mut [u8]) -> FecResult<usize> {
        let encoder = self.encoder.as_ref().ok_or_else(|| {
            let msg = format!("{} encode before precode", self);
            error!("{}", msg);
            FecError::InvalidParam(msg)
        })?;

        let piece_size = self.encode_piece_size();
        if buf.len() < piece_size {
            return Err(FecError::InvalidSymbolSize {
                expected: piece_size,
                got: buf.len(),
            });
        }
        encoder.encode_into(seq, &mut buf[..piece_size])?;
        Ok(piece_size)
    }
}

impl fmt::Display for RaptorEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RaptorEncoder{{K:{}, piece_size:{}}}", self.K, self.piece_size)
    }
}
