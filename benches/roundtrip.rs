//! Benchmark flexbuf roundtrip performance

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use flexbuf::{get_root, Builder, BuilderFlags};

fn bench_scalar_roundtrip(c: &mut Criterion) {
    c.bench_function("scalar_roundtrip", |b| {
        b.iter(|| {
            let mut builder = Builder::new(64);
            let v = builder.start_vector();
            builder.add_int(black_box(42));
            builder.add_double(black_box(3.14));
            builder.add_bool(black_box(true));
            builder.end_vector(v, false, false);
            builder.finish();

            let vec = get_root(black_box(builder.bytes())).unwrap().as_vector();
            let _ = vec.index(0).as_int();
            let _ = vec.index(1).as_double();
            let _ = vec.index(2).as_bool();
        });
    });
}

fn bench_string_roundtrip(c: &mut Criterion) {
    let test_string = "Hello, flexbuf! This is a test string for benchmarking.";

    c.bench_function("string_roundtrip", |b| {
        b.iter(|| {
            let mut builder = Builder::new(128);
            builder.add_string(black_box(test_string));
            builder.finish();

            let _: &str = get_root(black_box(builder.bytes())).unwrap().as_str();
        });
    });
}

fn bench_typed_vector_roundtrip(c: &mut Criterion) {
    let test_vector: Vec<u64> = (0..1000).collect();

    c.bench_function("typed_vector_roundtrip", |b| {
        b.iter(|| {
            let mut builder = Builder::new(16 * 1024);
            builder.create_typed_vector(black_box(&test_vector));
            builder.finish();

            let vec = get_root(black_box(builder.bytes())).unwrap().as_vector();
            let mut sum = 0u64;
            for i in 0..vec.len() {
                sum += vec.index(i).as_uint();
            }
            black_box(sum)
        });
    });
}

fn bench_map_build(c: &mut Criterion) {
    let keys: Vec<String> = (0..100).map(|i| format!("field_{i:03}")).collect();

    c.bench_function("map_build_100_keys", |b| {
        b.iter(|| {
            let mut builder = Builder::new(8 * 1024);
            let m = builder.start_map();
            for (i, key) in keys.iter().enumerate() {
                builder.add_int_with_key(i as i64, key);
            }
            builder.end_map(m);
            builder.finish();
            black_box(builder.bytes().len())
        });
    });
}

fn bench_map_lookup(c: &mut Criterion) {
    let keys: Vec<String> = (0..100).map(|i| format!("field_{i:03}")).collect();
    let mut builder = Builder::new(8 * 1024);
    let m = builder.start_map();
    for (i, key) in keys.iter().enumerate() {
        builder.add_int_with_key(i as i64, key);
    }
    builder.end_map(m);
    builder.finish();
    let data = builder.into_bytes();

    c.bench_function("map_lookup", |b| {
        b.iter(|| {
            let map = get_root(black_box(&data)).unwrap().as_map();
            let _ = map.get(black_box("field_057")).unwrap().as_int();
        });
    });
}

fn bench_shared_keys(c: &mut Criterion) {
    c.bench_function("shared_keys_50_maps", |b| {
        b.iter(|| {
            let mut builder = Builder::with_flags(8 * 1024, BuilderFlags::ShareAll);
            let outer = builder.start_vector();
            for i in 0..50i64 {
                let m = builder.start_map();
                builder.add_int_with_key(i, "x");
                builder.add_int_with_key(i * 2, "y");
                builder.add_string_with_key("constant", "tag");
                builder.end_map(m);
            }
            builder.end_vector(outer, false, false);
            builder.finish();
            black_box(builder.bytes().len())
        });
    });
}

fn bench_serialization_only(c: &mut Criterion) {
    c.bench_function("serialization_only", |b| {
        b.iter(|| {
            let mut builder = Builder::new(256);
            let m = builder.start_map();
            builder.add_int_with_key(42, "id");
            builder.add_double_with_key(3.14, "ratio");
            builder.add_string_with_key("test string", "name");
            builder.end_map(m);
            builder.finish();
            black_box(builder.bytes().len())
        });
    });
}

fn bench_deserialization_only(c: &mut Criterion) {
    // Pre-create the data
    let mut builder = Builder::new(256);
    let m = builder.start_map();
    builder.add_int_with_key(42, "id");
    builder.add_double_with_key(3.14, "ratio");
    builder.add_string_with_key("test string", "name");
    builder.end_map(m);
    builder.finish();
    let data = builder.into_bytes();

    c.bench_function("deserialization_only", |b| {
        b.iter(|| {
            let map = get_root(black_box(&data)).unwrap().as_map();
            let _ = map.get("id").unwrap().as_int();
            let _ = map.get("ratio").unwrap().as_double();
            let _ = map.get("name").unwrap().as_str();
        });
    });
}

criterion_group!(
    benches,
    bench_scalar_roundtrip,
    bench_string_roundtrip,
    bench_typed_vector_roundtrip,
    bench_map_build,
    bench_map_lookup,
    bench_shared_keys,
    bench_serialization_only,
    bench_deserialization_only
);

criterion_main!(benches);
