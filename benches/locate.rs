use criterion::{Criterion, black_box, criterion_group, criterion_main};
use fleetgrid::{GpsSample, Location, VehicleRecord, build_index, decode_stream, find_nearest};
use rand::{Rng, SeedableRng};
use std::io::Cursor;

fn random_fleet(count: usize) -> Vec<VehicleRecord> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    (0..count)
        .map(|i| {
            VehicleRecord::new(
                format!("REG {i:06}"),
                GpsSample {
                    id: i as i32,
                    location: Location::new(
                        rng.random_range(0.0f32..90.0),
                        rng.random_range(0.0f32..90.0),
                    ),
                    recorded_time_utc: i as u64,
                },
            )
        })
        .collect()
}

fn encode_dump(vehicles: &[VehicleRecord]) -> Vec<u8> {
    let mut buf = Vec::new();
    for vehicle in vehicles {
        for sample in &vehicle.samples {
            buf.extend_from_slice(&sample.id.to_le_bytes());
            buf.extend_from_slice(vehicle.registration.as_bytes());
            buf.push(0);
            buf.extend_from_slice(&sample.location.latitude.to_le_bytes());
            buf.extend_from_slice(&sample.location.longitude.to_le_bytes());
            buf.extend_from_slice(&sample.recorded_time_utc.to_le_bytes());
        }
    }
    buf
}

fn benchmark_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    let dump = encode_dump(&random_fleet(100_000));
    group.bench_function("decode_stream_100k", |b| {
        b.iter(|| decode_stream(Cursor::new(black_box(&dump)), 1024 * 1024).unwrap())
    });

    group.finish();
}

fn benchmark_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid");

    let vehicles = random_fleet(100_000);
    group.bench_function("build_index_100k", |b| {
        b.iter(|| build_index(black_box(&vehicles), 0.25).unwrap())
    });

    let index = build_index(&vehicles, 0.25).unwrap();
    group.bench_function("find_nearest_100k", |b| {
        b.iter(|| find_nearest(black_box(&index), black_box(Location::new(45.3, 45.7))).unwrap())
    });

    let mut rng = rand::rngs::StdRng::seed_from_u64(11);
    group.bench_function("find_nearest_100k_scattered", |b| {
        b.iter(|| {
            let query = Location::new(
                rng.random_range(0.0f32..90.0),
                rng.random_range(0.0f32..90.0),
            );
            find_nearest(black_box(&index), query).unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_decode, benchmark_grid);
criterion_main!(benches);
