use std::path::PathBuf;

use thiserror::Error;

use crate::memory::Level;

/// Top-level error type for the simulator
#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("Invalid configuration: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Failed to read trace: {0}")]
    TraceError(#[from] TraceError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Failed to draw plot: {0}")]
    PlotError(String),
}

/// Errors related to the cache geometry,
/// all of them detected before the first access
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{level} associativity must be at least 1")]
    InvalidAssociativity { level: Level },

    #[error(
        "{level} block size must be a non-zero power of 2, got {block_size}"
    )]
    InvalidBlockSize { level: Level, block_size: usize },

    #[error(
        "{level} size {cache_size} is not a multiple of \
         associativity ({associativity}) x block size ({block_size})"
    )]
    UnevenSets {
        level: Level,
        cache_size: usize,
        associativity: usize,
        block_size: usize,
    },

    #[error("{level} size {cache_size} exceeds the 32-bit address space")]
    CapacityTooLarge { level: Level, cache_size: usize },

    #[error("{level} size {cache_size} yields no sets")]
    NoSets { level: Level, cache_size: usize },

    #[error("L1 and L2 block sizes differ: {0} vs {1}")]
    BlockSizeMismatch(usize, usize),
}

/// Errors related to trace files
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Failed to read trace file '{0}': {1}")]
    FileReadError(PathBuf, #[source] std::io::Error),

    #[error("{path}:{line}: {kind}")]
    ParseError {
        path: PathBuf,
        line: usize,
        kind: RecordError,
    },
}

/// Specific kinds of malformed trace records
#[derive(Error, Debug, PartialEq)]
pub enum RecordError {
    #[error("expected '<r|w> <hex address>', got {0} field(s)")]
    FieldCount(usize),

    #[error("invalid operation '{0}': expected 'r' or 'w'")]
    InvalidOperation(String),

    #[error("invalid hexadecimal address '{0}'")]
    InvalidAddress(String),
}

/// Type alias for Result with SimulatorError
pub type SimulatorResult<T> = Result<T, SimulatorError>;
