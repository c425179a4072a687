use {
    criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput},
    shapecodec::{
        marshal, marshal_into, unmarshal, CodecCache, DecoderPool, EncoderPool, Reflect,
    },
    std::{collections::HashMap, hint::black_box},
};

#[derive(Reflect, Default, Clone)]
pub struct SimpleStruct {
    pub id: u64,
    pub value: u64,
    pub flag: bool,
}

#[derive(Reflect, Default, Clone)]
pub struct Record {
    pub name: String,
    pub tags: Vec<String>,
    pub payload: Vec<u8>,
    pub inner: SimpleStruct,
    pub scores: HashMap<u32, f64>,
}

fn record(i: u64) -> Record {
    Record {
        name: format!("record-{i}"),
        tags: vec!["alpha".into(), "beta".into()],
        payload: vec![i as u8; 64],
        inner: SimpleStruct {
            id: i,
            value: i.wrapping_mul(0x9E37_79B9),
            flag: i % 2 == 0,
        },
        scores: (0..4).map(|k| (k, k as f64 * 0.5)).collect(),
    }
}

fn bench_primitives(c: &mut Criterion) {
    let mut group = c.benchmark_group("Primitives");
    group.throughput(Throughput::Elements(1));

    let data = 0xDEADBEEFCAFEBABEu64;
    let bytes = marshal(&data).unwrap();

    group.bench_function("u64/marshal", |b| {
        b.iter(|| marshal(black_box(&data)).unwrap());
    });

    group.bench_function("u64/marshal_into", |b| {
        let mut buffer = Vec::with_capacity(16);
        b.iter(|| {
            buffer.clear();
            marshal_into(black_box(&data), &mut buffer).unwrap();
        });
    });

    group.bench_function("u64/unmarshal", |b| {
        let mut target = 0u64;
        b.iter(|| unmarshal(black_box(&bytes), &mut target).unwrap());
    });

    group.finish();
}

fn bench_vec(c: &mut Criterion) {
    let mut group = c.benchmark_group("Vec");

    for size in [100, 1_000, 10_000] {
        let data: Vec<u64> = (0..size).collect();
        let bytes = marshal(&data).unwrap();
        group.throughput(Throughput::Bytes(bytes.len() as u64));

        group.bench_with_input(BenchmarkId::new("u64/marshal", size), &data, |b, d| {
            b.iter(|| marshal(black_box(d)).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("u64/unmarshal", size), &bytes, |b, s| {
            let mut target = Vec::new();
            b.iter(|| unmarshal(black_box(s), &mut target).unwrap());
        });

        let raw = vec![0xabu8; size as usize];
        let raw_bytes = marshal(&raw).unwrap();
        group.bench_with_input(BenchmarkId::new("u8/marshal", size), &raw, |b, d| {
            b.iter(|| marshal(black_box(d)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("u8/unmarshal", size), &raw_bytes, |b, s| {
            let mut target = Vec::new();
            b.iter(|| unmarshal(black_box(s), &mut target).unwrap());
        });
    }

    group.finish();
}

fn bench_struct(c: &mut Criterion) {
    let mut group = c.benchmark_group("Struct");

    let data = record(7);
    let bytes = marshal(&data).unwrap();
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("record/marshal", |b| {
        b.iter(|| marshal(black_box(&data)).unwrap());
    });

    group.bench_function("record/unmarshal", |b| {
        let mut target = Record::default();
        b.iter(|| unmarshal(black_box(&bytes), &mut target).unwrap());
    });

    let batch: Vec<Record> = (0..100).map(record).collect();
    let batch_bytes = marshal(&batch).unwrap();
    group.bench_function("record_batch/marshal", |b| {
        b.iter(|| marshal(black_box(&batch)).unwrap());
    });
    group.bench_function("record_batch/unmarshal", |b| {
        let mut target = Vec::<Record>::new();
        b.iter(|| unmarshal(black_box(&batch_bytes), &mut target).unwrap());
    });

    group.finish();
}

fn bench_pools(c: &mut Criterion) {
    let mut group = c.benchmark_group("Pools");

    let data = record(3);
    let bytes = marshal(&data).unwrap();
    let encoders = EncoderPool::with_capacity(1);
    let decoders = DecoderPool::with_capacity(1);

    group.bench_function("record/pooled_marshal", |b| {
        b.iter(|| encoders.marshal(black_box(&data)).unwrap());
    });

    group.bench_function("record/pooled_unmarshal", |b| {
        let mut target = Record::default();
        b.iter(|| decoders.unmarshal(black_box(&bytes), &mut target).unwrap());
    });

    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("Scan");

    group.bench_function("record/cold", |b| {
        b.iter(|| {
            let cache = CodecCache::new();
            cache.scan::<Record>().unwrap()
        });
    });

    group.bench_function("record/warm", |b| {
        let cache = CodecCache::new();
        cache.scan::<Record>().unwrap();
        b.iter(|| cache.scan::<Record>().unwrap());
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_primitives,
    bench_vec,
    bench_struct,
    bench_pools,
    bench_scan
);
criterion_main!(benches);
