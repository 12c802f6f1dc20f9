//! Per-vehicle duplicate sample resolution.

use crate::types::{DuplicateFilter, VehicleRecord};

/// Collapse each vehicle's samples to one according to `filter`.
///
/// Applied once, after decoding and before indexing. With
/// [`DuplicateFilter::None`] the input is returned untouched and every
/// sample gets indexed individually. Otherwise samples are scanned in
/// file order keeping a running winner: `Latest` replaces it only on a
/// strictly greater timestamp, `Oldest` on a less-than-or-equal one.
/// The asymmetry is deliberate: on an equal timestamp `Latest` keeps
/// the earlier-seen sample and `Oldest` the later-seen one; consumers
/// of the dump format rely on this.
pub fn resolve_duplicates(
    mut vehicles: Vec<VehicleRecord>,
    filter: DuplicateFilter,
) -> Vec<VehicleRecord> {
    if filter == DuplicateFilter::None {
        return vehicles;
    }

    for vehicle in &mut vehicles {
        let Some(&first) = vehicle.samples.first() else {
            continue;
        };

        let mut kept = first;
        for sample in &vehicle.samples[1..] {
            let replace = match filter {
                DuplicateFilter::Latest => sample.recorded_time_utc > kept.recorded_time_utc,
                DuplicateFilter::Oldest => sample.recorded_time_utc <= kept.recorded_time_utc,
                DuplicateFilter::None => unreachable!(),
            };
            if replace {
                kept = *sample;
            }
        }

        vehicle.samples.clear();
        vehicle.samples.push(kept);
    }

    vehicles
}
