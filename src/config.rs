use crate::error::FecResult;
use crate::systematic_constants::Parameters;
#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_SYMBOL_SIZE: u16 = 1024;
pub const DEFAULT_REPAIR_OVERHEAD_SYMBOLS: u32 = 2;

/// Knobs for the solve pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct SolverConfig {
    /// Report elapsed time at each checkpoint of the solve.
    pub perf_log: bool,
}

/// Codec settings shared by an encoding side and a decoding side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct CodecConfig {
    pub symbol_size: u16,
    // Symbols to collect beyond K before trying to decode
    pub repair_overhead_symbols: u32,
    pub solver: SolverConfig,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            symbol_size: DEFAULT_SYMBOL_SIZE,
            repair_overhead_symbols: DEFAULT_REPAIR_OVERHEAD_SYMBOLS,
            solver: SolverConfig::default(),
        }
    }
}

impl CodecConfig {
    pub fn with_symbol_size(symbol_size: u16) -> Self {
        Self {
            symbol_size,
            ..Default::default()
        }
    }

    pub fn parameters(&self, data_len: u64) -> FecResult<Parameters> {
        Parameters::for_data_size(data_len, self.symbol_size)
    }

    /// K for `data_len` bytes.
    pub fn source_symbols(&self, data_len: u64) -> FecResult<u32> {
        Ok(self.parameters(data_len)?.source_symbols())
    }

    /// How many distinct symbols a sender should plan to deliver for `data_len` bytes.
    pub fn recommended_symbols(&self, data_len: u64) -> FecResult<u32> {
        Ok(self.source_symbols(data_len)? + self.repair_overhead_symbols)
    }
}
