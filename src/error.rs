//! Error kinds for the search, per the error-handling design: configuration
//! errors are fatal at construction time, board-contract violations and
//! numeric overflow are fatal but test-observable `Result`s rather than bare
//! panics, and stats/persistence I/O failures are logged and swallowed by
//! their callers rather than propagated through this type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NrpaError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("board contract violation: {0}")]
    BoardContractViolation(String),

    #[error("softmax denominator is not finite after recentering (step {step})")]
    NumericOverflow { step: usize },

    #[error("stats I/O failure: {0}")]
    StatsIo(#[from] std::io::Error),
}

pub type NrpaResult<T> = Result<T, NrpaError>;
