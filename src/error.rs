use thiserror::Error;

/// Errors reported by the codec.
///
/// Only `NotEnoughSymbols` and `Singular` are expected at runtime during decoding: the caller
/// should feed more symbols and try again. The rest reject bad input or configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FecError {
    /// No parameter table entry covers this many source symbols.
    #[error("unsupported source symbol count {symbols}: must be in 1..={max}")]
    UnsupportedSourceSymbols { symbols: u64, max: u32 },

    #[error("invalid symbol size: expected {expected}, got {got}")]
    InvalidSymbolSize { expected: usize, got: usize },

    /// The symbol id does not map to an internal symbol index.
    #[error("invalid symbol id {id}")]
    InvalidSymbolId { id: u64 },

    #[error("invalid param: {0}")]
    InvalidParam(String),

    /// Fewer symbols than unknowns.
    #[error("not enough symbols: received {received}, need {needed}")]
    NotEnoughSymbols { received: u32, needed: u32 },

    /// The received symbols do not span the intermediate symbols yet.
    #[error("constraint matrix is singular for the received symbols")]
    Singular,
}

impl FecError {
    /// True when feeding more symbols may make a later attempt succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FecError::NotEnoughSymbols { .. } | FecError::Singular
        )
    }
}

pub type FecResult<T> = Result<T, FecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FecError::UnsupportedSourceSymbols {
            symbols: 56404,
            max: 56403,
        };
        assert_eq!(
            err.to_string(),
            "unsupported source symbol count 56404: must be in 1..=56403"
        );

        let err = FecError::InvalidSymbolSize {
            expected: 8,
            got: 7,
        };
        assert_eq!(err.to_string(), "invalid symbol size: expected 8, got 7");

        let err = FecError::NotEnoughSymbols {
            received: 3,
            needed: 10,
        };
        assert!(err.to_string().contains("received 3"));
    }

    #[test]
    fn recoverable_kinds() {
        assert!(FecError::Singular.is_recoverable());
        assert!(FecError::NotEnoughSymbols {
            received: 0,
            needed: 1
        }
        .is_recoverable());
        assert!(!FecError::InvalidParam("x".into()).is_recoverable());
        assert!(!FecError::InvalidSymbolId { id: 7 }.is_recoverable());
        assert!(!FecError::InvalidSymbolSize {
            expected: 1,
            got: 2
        }
        .is_recoverable());
    }
}
