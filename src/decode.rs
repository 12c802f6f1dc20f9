//! Streaming decoder for the binary vehicle position dump format.
//!
//! # Dump format
//!
//! A dump is a plain concatenation of records with no header, record
//! count, or trailer. All numeric fields are little-endian:
//!
//! ```text
//! ┌──────────┬────────────────────┬──────────┬───────────┬───────────────┐
//! │ id: i32  │ registration + NUL │ lat: f32 │ long: f32 │ recorded: u64 │
//! │ 4 bytes  │ variable           │ 4 bytes  │ 4 bytes   │ 8 bytes, secs │
//! └──────────┴────────────────────┴──────────┴───────────┴───────────────┘
//! ```
//!
//! Because records have no length prefix, a record boundary can fall
//! anywhere relative to a read chunk. [`StreamDecoder`] keeps the
//! unconsumed trailing bytes in a carry-over buffer; decoding the same
//! stream with any chunking yields the same vehicle collection.
//!
//! Duplicate registrations merge into the existing record, appending
//! the new sample in arrival order. A final record that never becomes
//! decodable by end of stream is dropped, counted in the
//! [`DecodeReport`], and logged as a warning.

use crate::error::Result;
use crate::types::{GpsSample, Location, VehicleRecord};
use bytes::{Buf, BytesMut};
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::io::{ErrorKind, Read};

/// Default read chunk size: 1 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

const ID_SIZE: usize = size_of::<i32>();
const TAIL_SIZE: usize = size_of::<f32>() * 2 + size_of::<u64>();
/// Smallest possible record: id, empty registration's NUL, fixed tail.
const MIN_RECORD_SIZE: usize = ID_SIZE + 1 + TAIL_SIZE;

/// Counters accumulated over one decode run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeReport {
    /// Distinct registrations decoded.
    pub vehicles: usize,
    /// Total samples decoded, across all vehicles.
    pub samples: usize,
    /// Samples that merged into an already-seen registration.
    pub duplicates: usize,
    /// Trailing records dropped because the stream ended mid-record.
    pub truncated_records: usize,
    /// Bytes belonging to the dropped trailing record.
    pub truncated_bytes: usize,
}

/// Incremental decoder tolerant of arbitrary chunk boundaries.
///
/// Feed byte chunks in any sizes with [`feed`](Self::feed), then call
/// [`finish`](Self::finish) once the stream is exhausted. The
/// carry-over buffer is the only cross-chunk state, so memory use is
/// bounded by one chunk plus one partial record.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    carry: BytesMut,
    vehicles: Vec<VehicleRecord>,
    by_registration: FxHashMap<String, usize>,
    samples: usize,
    duplicates: usize,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain every complete record from the buffer.
    pub fn feed(&mut self, chunk: &[u8]) {
        self.carry.extend_from_slice(chunk);

        let mut consumed = 0;
        while let Some(entry) = decode_entry(&self.carry[consumed..]) {
            consumed += entry.consumed;
            self.insert(entry.registration, entry.sample);
        }
        self.carry.advance(consumed);
    }

    /// Finalize the stream, returning the vehicles in first-seen order
    /// plus the run's counters.
    pub fn finish(self) -> (Vec<VehicleRecord>, DecodeReport) {
        let mut report = DecodeReport {
            vehicles: self.vehicles.len(),
            samples: self.samples,
            duplicates: self.duplicates,
            ..DecodeReport::default()
        };

        if !self.carry.is_empty() {
            report.truncated_records = 1;
            report.truncated_bytes = self.carry.len();
            log::warn!(
                "dropped {} trailing bytes that never formed a complete record",
                self.carry.len()
            );
        }

        (self.vehicles, report)
    }

    /// Bytes currently held in the carry-over buffer.
    pub fn pending_bytes(&self) -> usize {
        self.carry.len()
    }

    fn insert(&mut self, registration: String, sample: GpsSample) {
        self.samples += 1;
        match self.by_registration.entry(registration) {
            Entry::Occupied(slot) => {
                self.duplicates += 1;
                self.vehicles[*slot.get()].push_sample(sample);
            }
            Entry::Vacant(slot) => {
                let record = VehicleRecord::new(slot.key().clone(), sample);
                slot.insert(self.vehicles.len());
                self.vehicles.push(record);
            }
        }
    }
}

struct DecodedEntry {
    registration: String,
    sample: GpsSample,
    consumed: usize,
}

/// One decode attempt at the front of `buf`.
///
/// Returns `None` when the buffer does not yet hold a complete record:
/// fewer than the minimum record size, no NUL terminator within the
/// available bytes, or a missing fixed tail after the terminator.
fn decode_entry(buf: &[u8]) -> Option<DecodedEntry> {
    if buf.len() < MIN_RECORD_SIZE {
        return None;
    }

    // The terminator scan starts just past the id field.
    let registration_len = buf[ID_SIZE..].iter().position(|&b| b == 0)?;
    let tail_start = ID_SIZE + registration_len + 1;
    if buf.len() - tail_start < TAIL_SIZE {
        return None;
    }

    let mut head = &buf[..ID_SIZE];
    let id = head.get_i32_le();
    let registration =
        String::from_utf8_lossy(&buf[ID_SIZE..ID_SIZE + registration_len]).into_owned();

    let mut tail = &buf[tail_start..tail_start + TAIL_SIZE];
    let latitude = tail.get_f32_le();
    let longitude = tail.get_f32_le();
    let recorded_time_utc = tail.get_u64_le();

    Some(DecodedEntry {
        registration,
        sample: GpsSample {
            id,
            location: Location::new(latitude, longitude),
            recorded_time_utc,
        },
        consumed: tail_start + TAIL_SIZE,
    })
}

/// Decode an entire byte stream, reading `chunk_size` bytes at a time.
///
/// Memory use is O(chunk size), not O(stream size). I/O errors are
/// fatal and propagate; a trailing truncated record is reported in the
/// [`DecodeReport`] instead.
pub fn decode_stream<R: Read>(
    mut source: R,
    chunk_size: usize,
) -> Result<(Vec<VehicleRecord>, DecodeReport)> {
    let mut decoder = StreamDecoder::new();
    let mut chunk = vec![0u8; chunk_size.max(1)];

    loop {
        match source.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => decoder.feed(&chunk[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(decoder.finish())
}
