#![allow(clippy::needless_return, clippy::unreadable_literal)]
mod config;
mod constraint_matrix;
mod decoder;
mod encoder;
mod error;
mod gaussian;
mod generator;
mod inactivation;
mod matrix;
mod octet;
mod octet_matrix;
mod octets;
mod rng;
mod solver;
mod sparse_matrix;
mod systematic_constants;
mod tuple;
mod util;
mod raptor_decoder;
mod raptor_encoder;

pub use raptor_decoder::*;
pub use raptor_encoder::*;

pub use crate::config::CodecConfig;
pub use crate::config::SolverConfig;
pub use crate::config::DEFAULT_REPAIR_OVERHEAD_SYMBOLS;
pub use crate::config::DEFAULT_SYMBOL_SIZE;
pub use crate::decoder::DecodeStatus;
pub use crate::decoder::Decoder;
pub use crate::decoder::DecoderState;
pub use crate::encoder::Encoder;
pub use crate::encoder::RawEncoder;
pub use crate::error::FecError;
pub use crate::error::FecResult;
pub use crate::octet_matrix::DenseOctetMatrix;
pub use crate::solver::solve;
pub use crate::solver::solve_with_observer;
pub use crate::solver::LogObserver;
pub use crate::solver::SolveObserver;
pub use crate::systematic_constants::Parameters;
pub use crate::systematic_constants::MAX_SOURCE_SYMBOLS_PER_BLOCK;
pub use crate::tuple::EncodingTuple;

#[cfg(feature = "benchmarking")]
pub use crate::constraint_matrix::build_constraint_matrix;
#[cfg(feature = "benchmarking")]
pub use crate::gaussian::gaussian_elimination;
#[cfg(feature = "benchmarking")]
pub use crate::inactivation::InactivationDecoder;
#[cfg(feature = "benchmarking")]
pub use crate::inactivation::InactivationResult;
#[cfg(feature = "benchmarking")]
pub use crate::matrix::DenseBinaryMatrix;
#[cfg(feature = "benchmarking")]
pub use crate::octet::Octet;
#[cfg(feature = "benchmarking")]
pub use crate::sparse_matrix::SparseBinaryMatrix;

// only use in test cases!
#[cfg(test)]
pub(crate) fn init_simple_log(_service_name: &str, log_level: Option<&str>) {
    use log::LevelFilter;

    let level = match log_level.unwrap_or("info") {
        "none" => LevelFilter::Off,
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Debug,
    };

    if let Err(e) = simple_logger::SimpleLogger::new().with_level(level).init() {
        println!("init simple log error! {}", e);
    }
}
