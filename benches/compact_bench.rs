//! Benchmarks for compact protocol encode/decode/skip operations.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tcompact::codec::varint::{read_varint, write_varint};
use tcompact::{
    from_slice, to_vec, CompactDecode, CompactEncode, CompactProtocol, MemoryTransport, TType,
};

// ============================================================================
// Test Data Structures
// ============================================================================

/// Simple struct for benchmarking
#[derive(Debug, Clone, PartialEq, CompactEncode, CompactDecode)]
struct Person {
    #[compact(id = 1)]
    name: String,
    #[compact(id = 2)]
    age: i64,
    #[compact(id = 3)]
    active: bool,
}

/// Struct with more fields
#[derive(Debug, Clone, PartialEq, CompactEncode, CompactDecode)]
struct UserProfile {
    #[compact(id = 1)]
    id: i64,
    #[compact(id = 2)]
    username: String,
    #[compact(id = 3)]
    email: String,
    #[compact(id = 4)]
    age: i64,
    #[compact(id = 5)]
    verified: bool,
    #[compact(id = 6)]
    score: f64,
}

/// Struct with lists
#[derive(Debug, Clone, PartialEq, CompactEncode, CompactDecode)]
struct DataSet {
    #[compact(id = 1)]
    numbers: Vec<i64>,
    #[compact(id = 2)]
    values: Vec<f64>,
}

fn person() -> Person {
    Person {
        name: "Alice".to_string(),
        age: 30,
        active: true,
    }
}

fn user_profile() -> UserProfile {
    UserProfile {
        id: 12345,
        username: "alice_wonder".to_string(),
        email: "alice@example.com".to_string(),
        age: 28,
        verified: true,
        score: 98.5,
    }
}

fn dataset(n: i64) -> DataSet {
    DataSet {
        numbers: (0..n).collect(),
        values: (0..n).map(|i| i as f64 * 0.1).collect(),
    }
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_varint(c: &mut Criterion) {
    let mut group = c.benchmark_group("varint");
    for value in [1u64, 300, u64::from(u32::MAX), u64::MAX] {
        let mut encoded = Vec::new();
        write_varint(&mut encoded, value);

        group.bench_with_input(BenchmarkId::new("write", value), &value, |b, &v| {
            let mut out = Vec::with_capacity(10);
            b.iter(|| {
                out.clear();
                write_varint(&mut out, black_box(v));
            })
        });
        group.bench_with_input(BenchmarkId::new("read", value), &encoded, |b, bytes| {
            b.iter(|| {
                let mut src = MemoryTransport::from(bytes.as_slice());
                read_varint(&mut src).unwrap()
            })
        });
    }
    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Elements(1));

    let person = person();
    group.bench_function("person", |b| b.iter(|| to_vec(black_box(&person)).unwrap()));

    let user = user_profile();
    group.bench_function("user_profile", |b| {
        b.iter(|| to_vec(black_box(&user)).unwrap())
    });

    for n in [10i64, 100, 1000] {
        let data = dataset(n);
        group.bench_with_input(BenchmarkId::new("dataset", n), &data, |b, d| {
            b.iter(|| to_vec(black_box(d)).unwrap())
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Elements(1));

    let bytes = to_vec(&person()).unwrap();
    group.bench_function("person", |b| {
        b.iter(|| from_slice::<Person>(black_box(&bytes)).unwrap())
    });

    let bytes = to_vec(&user_profile()).unwrap();
    group.bench_function("user_profile", |b| {
        b.iter(|| from_slice::<UserProfile>(black_box(&bytes)).unwrap())
    });

    for n in [10i64, 100, 1000] {
        let bytes = to_vec(&dataset(n)).unwrap();
        group.bench_with_input(BenchmarkId::new("dataset", n), &bytes, |b, bytes| {
            b.iter(|| from_slice::<DataSet>(black_box(bytes)).unwrap())
        });
    }

    group.finish();
}

fn bench_skip_and_value(c: &mut Criterion) {
    let mut group = c.benchmark_group("dynamic");
    let bytes = to_vec(&dataset(100)).unwrap();
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("skip/dataset_100", |b| {
        b.iter(|| {
            let mut p = CompactProtocol::new(MemoryTransport::from(black_box(bytes.as_slice())));
            p.skip(TType::Struct).unwrap();
        })
    });

    group.bench_function("read_value/dataset_100", |b| {
        b.iter(|| {
            let mut p = CompactProtocol::new(MemoryTransport::from(black_box(bytes.as_slice())));
            p.read_value(TType::Struct).unwrap()
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_varint,
    bench_encode,
    bench_decode,
    bench_skip_and_value,
);
criterion_main!(benches);
