//! Core data model: samples, vehicles, grid cells, and configuration.

use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use std::str::FromStr;

/// A planar coordinate pair in degrees.
///
/// Stored as `f32` to match the dump format. Distances are plain
/// Euclidean in coordinate units; the dump's producers treat the
/// coordinate plane as flat.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Location {
    pub latitude: f32,
    pub longitude: f32,
}

impl Location {
    pub fn new(latitude: f32, longitude: f32) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True when neither coordinate is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Euclidean distance to `other` in coordinate units.
    pub fn distance_to(&self, other: &Location) -> f32 {
        let delta_lat = self.latitude - other.latitude;
        let delta_long = self.longitude - other.longitude;
        (delta_lat * delta_lat + delta_long * delta_long).sqrt()
    }
}

/// A single position fix reported by a tracker unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsSample {
    /// Originating tracker id.
    pub id: i32,
    pub location: Location,
    /// Seconds since the Unix epoch.
    pub recorded_time_utc: u64,
}

/// All samples decoded for one registration, in file arrival order.
///
/// The registration string uniquely keys a vehicle; duplicate sightings
/// during decode append to `samples`. Most vehicles carry one or two
/// samples, hence the inline capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleRecord {
    pub registration: String,
    pub samples: SmallVec<[GpsSample; 2]>,
}

impl VehicleRecord {
    pub fn new(registration: String, sample: GpsSample) -> Self {
        Self {
            registration,
            samples: smallvec![sample],
        }
    }

    pub fn push_sample(&mut self, sample: GpsSample) {
        self.samples.push(sample);
    }
}

/// Integer grid cell address derived from a location and a block size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockKey {
    pub latitude: i32,
    pub longitude: i32,
}

impl BlockKey {
    /// Quantize a location onto the grid.
    ///
    /// The division truncates toward zero, matching the tooling that
    /// produces the dumps: the four cells around the origin are
    /// double-width. Do not switch to `floor`.
    pub fn for_location(location: &Location, block_size: f32) -> Self {
        Self {
            latitude: (location.latitude / block_size) as i32,
            longitude: (location.longitude / block_size) as i32,
        }
    }
}

/// Which sample survives for a vehicle seen multiple times.
///
/// `Latest` keeps a sample only when a strictly newer one arrives;
/// `Oldest` also replaces on an equal timestamp. See
/// [`resolve_duplicates`](crate::dedup::resolve_duplicates) for the
/// exact tie rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateFilter {
    /// Index every sample of every vehicle.
    #[default]
    None,
    /// Keep the most recently recorded sample per vehicle.
    Latest,
    /// Keep the earliest recorded sample per vehicle.
    Oldest,
}

impl FromStr for DuplicateFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "latest" => Ok(Self::Latest),
            "oldest" => Ok(Self::Oldest),
            other => Err(format!(
                "unknown duplicate filter '{other}' (expected none, latest, or oldest)"
            )),
        }
    }
}

/// Runtime configuration for the load-and-query pipeline.
///
/// Designed to be loadable from JSON while keeping complexity minimal.
///
/// # Example
///
/// ```rust
/// use fleetgrid::Config;
///
/// let config = Config::default();
///
/// let json = r#"{
///     "block_size": 0.5,
///     "duplicate_filter": "latest"
/// }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.block_size, 0.5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Grid cell edge length in coordinate units.
    #[serde(default = "Config::default_block_size")]
    pub block_size: f32,

    /// Duplicate filter applied between decode and index build.
    #[serde(default)]
    pub duplicate_filter: DuplicateFilter,

    /// Read chunk size for the stream decoder, in bytes.
    #[serde(default = "Config::default_chunk_size")]
    pub chunk_size: usize,
}

impl Config {
    const fn default_block_size() -> f32 {
        0.25
    }

    const fn default_chunk_size() -> usize {
        1024 * 1024
    }

    pub fn with_block_size(mut self, block_size: f32) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_duplicate_filter(mut self, filter: DuplicateFilter) -> Self {
        self.duplicate_filter = filter;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "Chunk size must be greater than zero");
        self.chunk_size = chunk_size;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if !self.block_size.is_finite() {
            return Err("Block size must be finite (not NaN or infinity)".to_string());
        }
        if self.block_size <= 0.0 {
            return Err("Block size must be strictly positive".to_string());
        }
        if self.chunk_size == 0 {
            return Err("Chunk size must be greater than zero".to_string());
        }
        Ok(())
    }

    /// Load configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        use serde::de::Error;

        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            block_size: Self::default_block_size(),
            duplicate_filter: DuplicateFilter::default(),
            chunk_size: Self::default_chunk_size(),
        }
    }
}
