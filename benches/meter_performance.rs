//! Metering Performance Benchmarks
//!
//! The metering tap runs once per frame on the host's audio-processing
//! context, so frame analysis must finish well inside the frame budget:
//!
//! ```text
//! time_budget = frame_size / sample_rate
//! ```
//!
//! | Sample Rate | Frame 256 | Frame 512 | Frame 1024 | Frame 2048 |
//! |-------------|-----------|-----------|------------|------------|
//! | 44.1 kHz    | 5.80 ms   | 11.61 ms  | 23.22 ms   | 46.44 ms   |
//! | 48 kHz      | 5.33 ms   | 10.67 ms  | 21.33 ms   | 42.67 ms   |
//!
//! Topology toggling happens on user clicks, not per frame, but it must
//! stay cheap enough to land between two callbacks.

use cinch::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;

const FRAME_SIZES: [usize; 4] = [256, 512, 1024, 2048];
const METER_HEIGHT: f64 = 400.0;

/// A frame with enough signal variation to defeat trivial folding
fn test_frame(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| ((i % 64) as f32 / 64.0) - 0.5)
        .collect()
}

/// Source + two-stage chain + {tap, destination}, ready to toggle
fn patched_graph(bay: &PatchBay) -> (SignalGraph, EndpointHandle) {
    let source = bay.jack();
    let mut graph = SignalGraph::new();
    graph
        .chain(vec![
            NodeSpec::new("compressor", bay.dynamics()),
            NodeSpec::new("makeup", bay.gain()),
        ])
        .unwrap();
    graph.feed_from(source.as_ref()).unwrap();
    graph.route_to(bay.jack()).unwrap();
    graph.route_to(bay.jack()).unwrap();
    (graph, source)
}

fn bench_frame_decibels(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_decibels");

    for frame_size in FRAME_SIZES {
        let frame = test_frame(frame_size);
        group.throughput(Throughput::Elements(frame_size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(frame_size),
            &frame,
            |b, frame| b.iter(|| frame_decibels(black_box(frame))),
        );
    }

    group.finish();
}

fn bench_tap_callback(c: &mut Criterion) {
    let bay = PatchBay::new();
    let comp = bay.dynamics();
    comp.set_reduction(-6.0);
    let playing = Arc::new(PlayState::new(true));
    let tap = MeterTap::new(playing, comp, Arc::new(LevelBridge::new()));
    let frame = test_frame(DEFAULT_FRAME_SIZE);

    c.bench_function("tap_process_frame_1024", |b| {
        b.iter(|| tap.process_frame(black_box(&frame)))
    });
}

fn bench_meter_heights(c: &mut Criterion) {
    let scale = MeterScale::default();

    c.bench_function("meter_heights", |b| {
        b.iter(|| {
            let out = scale.output_height(black_box(-18.3), METER_HEIGHT);
            let red = scale.reduction_height(black_box(-7.2), METER_HEIGHT);
            (out, red)
        })
    });
}

fn bench_bypass_restore_toggle(c: &mut Criterion) {
    let bay = PatchBay::new();
    let (graph, source) = patched_graph(&bay);

    c.bench_function("bypass_restore_toggle", |b| {
        b.iter(|| {
            graph.unpatch_from(source.as_ref()).unwrap();
            graph.patch_into(source.as_ref()).unwrap();
        })
    });
}

criterion_group!(
    benches,
    bench_frame_decibels,
    bench_tap_callback,
    bench_meter_heights,
    bench_bypass_restore_toggle
);
criterion_main!(benches);
