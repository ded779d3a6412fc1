//! Benchmarks for the BB84 pipeline
//!
//! Run with: cargo bench

use bb84_qkd::backend::{CircuitSimulator, UnavailableService};
use bb84_qkd::channel::{AttackKind, ChannelModel};
use bb84_qkd::orchestration::{SimulationOrchestrator, SimulationRequest};
use bb84_qkd::protocol::{amplify, qber, sift};
use bb84_qkd::randomness::{ClassicalRng, RandomSource};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use std::time::Duration;

fn orchestrator() -> SimulationOrchestrator {
    SimulationOrchestrator::new(RandomSource::new(
        ClassicalRng::seed_from_u64(7),
        Arc::new(UnavailableService),
        Arc::new(CircuitSimulator::with_seed(32, 7)),
        Duration::from_secs(1),
    ))
}

/// Benchmark complete classical runs
fn bench_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_run");

    for num_qubits in &[16, 256, 4096] {
        group.bench_with_input(BenchmarkId::new("auto", num_qubits), num_qubits, |b, &n| {
            let mut orch = orchestrator();
            let request = SimulationRequest::auto(n);
            b.iter(|| orch.run(black_box(&request)));
        });
        group.bench_with_input(
            BenchmarkId::new("intercept_resend", num_qubits),
            num_qubits,
            |b, &n| {
                let mut orch = orchestrator();
                let request = SimulationRequest::auto(n).with_attack(AttackKind::InterceptResend);
                b.iter(|| orch.run(black_box(&request)));
            },
        );
    }

    group.finish();
}

/// Benchmark the individual stages on a fixed input
fn bench_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("stages");
    let mut rng = ClassicalRng::seed_from_u64(1);
    let alice_bits = rng.bits(4096);
    let alice_bases = rng.bases(4096);
    let bob_bases = rng.bases(4096);
    let channel = ChannelModel::new(10.0, 0.01).unwrap();
    let received = channel.transmit(&alice_bits, &mut rng).received;

    group.bench_function("transmit", |b| {
        b.iter(|| channel.transmit(black_box(&alice_bits), &mut rng));
    });

    group.bench_function("sift", |b| {
        b.iter(|| sift(black_box(&alice_bits), &alice_bases, &received, &bob_bases));
    });

    let keys = sift(&alice_bits, &alice_bases, &received, &bob_bases).unwrap();
    group.bench_function("qber", |b| {
        b.iter(|| qber(black_box(&keys.alice), black_box(&keys.bob)));
    });

    group.bench_function("amplify", |b| {
        b.iter(|| amplify(black_box(&keys.alice), black_box(0.5)));
    });

    group.finish();
}

criterion_group!(benches, bench_full_run, bench_stages);
criterion_main!(benches);
