//! Performance benchmarks for dummymore
//!
//! Run with: cargo bench

use dummymore::{classify, inspect, Direction, LogRecord, MemoryTransport, MessageEvent};
use dummymore::{MessageInterceptor, PipelineContext};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn bench_classify(c: &mut Criterion) {
    let dummy = b"<FONT>?DUMMY:6f1c0a9b2e7d4c3f8a5b1e0d9c7f2a4b";
    let real = "Hello, how are you? ".repeat(20);

    c.bench_function("classify dummy", |b| {
        b.iter(|| classify(black_box(dummy)));
    });

    c.bench_function("classify real", |b| {
        b.iter(|| classify(black_box(real.as_bytes())));
    });

    c.bench_function("inspect", |b| {
        b.iter(|| inspect(black_box(b"?OTR:AAMGAAAAAAAAAAAAAAAAAAAAAAA")));
    });
}

fn bench_record_build(c: &mut Criterion) {
    let event = MessageEvent::new(Direction::Incoming, "alice@example.org", "?DUMMY:".to_string() + &"x".repeat(256));

    c.bench_function("LogRecord::build", |b| {
        b.iter(|| LogRecord::build(black_box(&event)));
    });
}

fn bench_memory_process(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let pipeline = rt.block_on(async { PipelineContext::start(MemoryTransport::new()).await.unwrap() });

    c.bench_function("MemoryTransport process", |b| {
        b.to_async(&rt).iter(|| async {
            pipeline
                .process(MessageEvent::new(Direction::Incoming, "alice", "?DUMMY:noise123"))
                .await
        });
    });
}

criterion_group!(benches, bench_classify, bench_record_build, bench_memory_process);
criterion_main!(benches);
