//! Uniform-grid spatial index over vehicle positions.
//!
//! The index buckets every selected (vehicle, sample) pair by its
//! [`BlockKey`] and is built in a single pass. It borrows the vehicle
//! slice — the vehicle collection owns record lifetime, the index never
//! does — and is immutable once built, so concurrent queries against
//! the same index need no locking.

use crate::error::{FleetError, Result};
use crate::types::{BlockKey, Location, VehicleRecord};
use rustc_hash::FxHashMap;

/// One indexed position and the vehicle it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct IndexedPosition<'a> {
    pub location: Location,
    pub vehicle: &'a VehicleRecord,
}

/// Grid directory: block key to positions in insertion order.
#[derive(Debug)]
pub struct SpatialIndex<'a> {
    blocks: FxHashMap<BlockKey, Vec<IndexedPosition<'a>>>,
    block_size: f32,
    positions: usize,
}

impl<'a> SpatialIndex<'a> {
    /// Cell edge length this index was built with.
    pub fn block_size(&self) -> f32 {
        self.block_size
    }

    /// Number of indexed positions.
    pub fn len(&self) -> usize {
        self.positions
    }

    pub fn is_empty(&self) -> bool {
        self.positions == 0
    }

    /// Number of occupied grid cells.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Positions bucketed under `key`, in insertion order.
    pub fn bucket(&self, key: &BlockKey) -> Option<&[IndexedPosition<'a>]> {
        self.blocks.get(key).map(Vec::as_slice)
    }

    /// Iterate over every occupied block. Order is unspecified.
    pub(crate) fn keys(&self) -> impl Iterator<Item = &BlockKey> {
        self.blocks.keys()
    }

    /// Summary counters for reporting.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            blocks: self.blocks.len(),
            positions: self.positions,
            block_size: self.block_size,
        }
    }
}

/// Statistics about a built index.
#[derive(Debug, Clone)]
pub struct IndexStats {
    /// Number of occupied grid cells.
    pub blocks: usize,
    /// Total indexed positions across all cells.
    pub positions: usize,
    pub block_size: f32,
}

/// Build a grid index over every sample of every vehicle.
///
/// Run [`resolve_duplicates`](crate::dedup::resolve_duplicates) first
/// when at most one position per vehicle should be indexed. Rejects a
/// non-finite or non-positive block size before any query can run.
pub fn build_index(vehicles: &[VehicleRecord], block_size: f32) -> Result<SpatialIndex<'_>> {
    if !block_size.is_finite() || block_size <= 0.0 {
        return Err(FleetError::InvalidBlockSize(block_size));
    }

    let mut blocks: FxHashMap<BlockKey, Vec<IndexedPosition<'_>>> = FxHashMap::default();
    let mut positions = 0;

    for vehicle in vehicles {
        for sample in &vehicle.samples {
            let key = BlockKey::for_location(&sample.location, block_size);
            blocks.entry(key).or_default().push(IndexedPosition {
                location: sample.location,
                vehicle,
            });
            positions += 1;
        }
    }

    log::debug!(
        "indexed {} positions into {} blocks (block size {})",
        positions,
        blocks.len(),
        block_size
    );

    Ok(SpatialIndex {
        blocks,
        block_size,
        positions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GpsSample;

    fn vehicle(registration: &str, locations: &[(f32, f32)]) -> VehicleRecord {
        let mut samples = locations.iter().enumerate().map(|(i, &(lat, long))| GpsSample {
            id: i as i32,
            location: Location::new(lat, long),
            recorded_time_utc: i as u64,
        });
        let mut record = VehicleRecord::new(registration.to_string(), samples.next().unwrap());
        for sample in samples {
            record.push_sample(sample);
        }
        record
    }

    #[test]
    fn test_rejects_invalid_block_size() {
        let vehicles = vec![vehicle("A", &[(1.0, 1.0)])];
        for bad in [0.0, -0.25, f32::NAN, f32::INFINITY] {
            match build_index(&vehicles, bad) {
                Err(FleetError::InvalidBlockSize(_)) => {}
                other => panic!("expected InvalidBlockSize for {bad}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_empty_input_builds_empty_index() {
        let index = build_index(&[], 0.25).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.block_count(), 0);
    }

    #[test]
    fn test_every_sample_is_indexed() {
        // One vehicle in two cells, one in a shared cell.
        let vehicles = vec![
            vehicle("A", &[(0.1, 0.1), (1.1, 1.1)]),
            vehicle("B", &[(0.2, 0.2)]),
        ];
        let index = build_index(&vehicles, 0.25).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.block_count(), 2);

        let origin = index
            .bucket(&BlockKey {
                latitude: 0,
                longitude: 0,
            })
            .unwrap();
        assert_eq!(origin.len(), 2);
        // Insertion order within the bucket.
        assert_eq!(origin[0].vehicle.registration, "A");
        assert_eq!(origin[1].vehicle.registration, "B");
    }

    #[test]
    fn test_truncation_buckets_around_origin() {
        // -0.1 / 0.25 truncates to 0, same cell as +0.1.
        let vehicles = vec![vehicle("A", &[(0.1, 0.1)]), vehicle("B", &[(-0.1, -0.1)])];
        let index = build_index(&vehicles, 0.25).unwrap();
        assert_eq!(index.block_count(), 1);
        assert_eq!(
            index
                .bucket(&BlockKey {
                    latitude: 0,
                    longitude: 0
                })
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn test_stats() {
        let vehicles = vec![vehicle("A", &[(0.1, 0.1), (5.0, 5.0)])];
        let index = build_index(&vehicles, 0.5).unwrap();
        let stats = index.stats();
        assert_eq!(stats.positions, 2);
        assert_eq!(stats.blocks, 2);
        assert_eq!(stats.block_size, 0.5);
    }
}
