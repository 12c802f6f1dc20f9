//! Exact nearest-vehicle search over binary GPS position dumps.
//!
//! A dump is decoded in chunks by a carry-over stream decoder, the
//! resulting vehicle positions are bucketed into a uniform coordinate
//! grid, and each query runs a block-level branch and bound followed
//! by an exact scan of the surviving cells.
//!
//! ```rust
//! use fleetgrid::{GpsSample, Location, VehicleRecord, build_index, find_nearest};
//!
//! let vehicles = vec![VehicleRecord::new(
//!     "AB12 CDE".to_string(),
//!     GpsSample {
//!         id: 1,
//!         location: Location::new(51.5, -0.12),
//!         recorded_time_utc: 1_700_000_000,
//!     },
//! )];
//!
//! let index = build_index(&vehicles, 0.25)?;
//! let nearest = find_nearest(&index, Location::new(51.4, -0.1))?;
//! assert_eq!(nearest.vehicle.registration, "AB12 CDE");
//! # Ok::<(), fleetgrid::FleetError>(())
//! ```

pub mod decode;
pub mod dedup;
pub mod error;
pub mod grid;
pub mod locate;
pub mod types;

pub use decode::{DEFAULT_CHUNK_SIZE, DecodeReport, StreamDecoder, decode_stream};
pub use dedup::resolve_duplicates;
pub use error::{FleetError, Result};
pub use grid::{IndexStats, IndexedPosition, SpatialIndex, build_index};
pub use locate::{Nearest, find_nearest};
pub use types::{BlockKey, Config, DuplicateFilter, GpsSample, Location, VehicleRecord};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{FleetError, Result};

    pub use crate::{decode_stream, resolve_duplicates};

    pub use crate::{build_index, find_nearest};

    pub use crate::{Config, DuplicateFilter, GpsSample, Location, VehicleRecord};
}
