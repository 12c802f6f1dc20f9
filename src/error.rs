//! Error types for fleetgrid.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, FleetError>;

/// Errors surfaced by the decode, index, and query stages.
///
/// I/O and configuration errors are fatal to a run; query-level errors
/// (`VehicleNotFound`, `InvalidCoordinate`) are local to one query and
/// never abort a batch.
#[derive(Error, Debug)]
pub enum FleetError {
    /// The position dump could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Block size must be strictly positive and finite.
    #[error("invalid block size: {0} (must be strictly positive)")]
    InvalidBlockSize(f32),

    /// Query coordinates were NaN or infinite.
    #[error("invalid query coordinates: ({0}, {1})")]
    InvalidCoordinate(f32, f32),

    /// The index holds no positions, or no candidate block contained one.
    #[error("no vehicle found")]
    VehicleNotFound,

    /// Malformed configuration or caller input.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
