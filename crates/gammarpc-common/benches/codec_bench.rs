// Criterion benchmarks for the gammarpc-common codec layer
//
// Run benchmarks with:
//   cargo bench -p gammarpc-common

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gammarpc_common::{Message, Payload, WireBuffer, WireCodec};

fn bench_gamma(c: &mut Criterion) {
    let mut group = c.benchmark_group("gamma");

    group.bench_function("encode_small", |b| {
        b.iter(|| {
            let mut buf = WireBuffer::new();
            WireCodec::write_size(&mut buf, black_box(5));
            buf
        });
    });

    group.bench_function("encode_max_frame_size", |b| {
        b.iter(|| {
            let mut buf = WireBuffer::new();
            WireCodec::write_size(&mut buf, black_box(1_000_000));
            buf
        });
    });

    group.bench_function("decode_max_frame_size", |b| {
        let mut encoded = WireBuffer::new();
        WireCodec::write_size(&mut encoded, 1_000_000);
        let bytes = encoded.as_slice().to_vec();
        b.iter(|| {
            let mut buf = WireBuffer::from_vec(black_box(bytes.clone()));
            WireCodec::read_size(&mut buf).unwrap()
        });
    });

    group.finish();
}

fn bench_message(c: &mut Criterion) {
    let mut group = c.benchmark_group("message");

    let small = Message::call("add2", Payload::with_blob(3, vec![100]));
    let medium = Message::call("bulk", Payload::with_blob(0, vec![0xAB; 1024]));
    let large = Message::call("bulk", Payload::with_blob(0, vec![0xAB; 512 * 1024]));

    group.bench_function("encode_small", |b| {
        b.iter(|| WireCodec::encode_message(black_box(&small)).unwrap());
    });

    group.bench_function("encode_medium", |b| {
        b.iter(|| WireCodec::encode_message(black_box(&medium)).unwrap());
    });

    group.bench_function("encode_large", |b| {
        b.iter(|| WireCodec::encode_message(black_box(&large)).unwrap());
    });

    let small_bytes = WireCodec::encode_message(&small).unwrap().into_vec();
    let medium_bytes = WireCodec::encode_message(&medium).unwrap().into_vec();

    group.bench_function("decode_small", |b| {
        b.iter(|| {
            let mut buf = WireBuffer::from_vec(black_box(small_bytes.clone()));
            WireCodec::decode_message(&mut buf).unwrap()
        });
    });

    group.bench_function("decode_medium", |b| {
        b.iter(|| {
            let mut buf = WireBuffer::from_vec(black_box(medium_bytes.clone()));
            WireCodec::decode_message(&mut buf).unwrap()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_gamma, bench_message);
criterion_main!(benches);
