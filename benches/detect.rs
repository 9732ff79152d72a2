use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};

use faultline::{
    DedupSlot, DetectionEvent, DetectionSink, DetectorConfig, FaultlineResult, IdentityResolver,
    StreamDetector,
};

struct NullSink;

impl DetectionSink for NullSink {
    fn on_detection(&self, _event: &DetectionEvent) -> FaultlineResult<()> {
        Ok(())
    }
}

fn make_detector() -> StreamDetector {
    StreamDetector::new(
        IdentityResolver::default(),
        Arc::new(DedupSlot::new()),
        DetectorConfig::default(),
        vec![Arc::new(NullSink)],
    )
}

fn bench_scan_clean_chunk(c: &mut Criterion) {
    let detector = make_detector();
    let chunk = "INFO  com.example.Service - request handled in 12ms, 200 OK, payload=4821 bytes\n"
        .repeat(8);

    let mut group = c.benchmark_group("detect");
    group.throughput(Throughput::Bytes(chunk.len() as u64));
    group.bench_function("scan_clean_chunk", |b| {
        b.iter(|| detector.on_text(&chunk));
    });
    group.finish();
}

fn bench_scan_stack_trace_chunk(c: &mut Criterion) {
    let detector = make_detector();
    let chunk = "Exception in thread \"main\" java.lang.NullPointerException: boom\n\
                 \tat com.example.App.run(App.java:42)\n\
                 \tat com.example.App.main(App.java:12)\n";

    let mut group = c.benchmark_group("detect");
    group.throughput(Throughput::Bytes(chunk.len() as u64));
    group.bench_function("scan_stack_trace_chunk", |b| {
        b.iter(|| detector.on_text(chunk));
    });
    group.finish();
}

criterion_group!(benches, bench_scan_clean_chunk, bench_scan_stack_trace_chunk);
criterion_main!(benches);
