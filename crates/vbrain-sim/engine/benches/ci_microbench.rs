// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! CI Microbenchmarks
//!
//! Purpose:
//! - Track the three hot paths of a simulation step: delayed coupling,
//!   history ring-buffer access and a full `Simulator::step`
//! - Sizes stay small enough for a CI runner
//!
//! Notes:
//! - Keep runtime low (short warm-up and measurement windows)
//! - Networks are uniform all-to-all graphs so edge count is `N * (N - 1)`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;
use vbrain_sim_engine::{Integrator, Monitor, Noise, Simulator};
use vbrain_sim_neural::coupling::{Difference, Sigmoidal};
use vbrain_sim_neural::{Connectivity, Coupling, Generic2dOscillator, StateArray};
use vbrain_sim_runtime::{
    DelayedView, HistoryBuffer, HistoryLayout, HistoryStorage, RuntimeConfig, StdRuntime,
};

const NODE_COUNTS: [usize; 3] = [16, 64, 256];
const DT: f64 = 0.0625;

fn ramp_state(n_nodes: usize) -> StateArray {
    let data = (0..n_nodes).map(|i| (i as f64 * 0.37).sin()).collect();
    StateArray::from_vec(1, n_nodes, 1, data).unwrap()
}

fn bench_coupling(c: &mut Criterion) {
    let mut group = c.benchmark_group("coupling");

    for &n in &NODE_COUNTS {
        let connectivity = Connectivity::uniform(n, 0.5, 20.0, 4.0).unwrap();
        let delays = connectivity.delays_in_steps(DT).unwrap();
        let graph = connectivity.sparse_rows(&delays).unwrap();
        let layout = HistoryLayout {
            depth: delays.max_delay() + 1,
            n_cvar: 1,
            n_nodes: n,
            n_modes: 1,
        };
        let mut history = HistoryBuffer::allocate(layout, None).unwrap();
        let current = ramp_state(n);
        history.initialize(&current).unwrap();

        group.throughput(Throughput::Elements(graph.edge_count() as u64));

        for (label, coupling) in [
            ("difference", Coupling::Difference(Difference { a: 0.014 })),
            ("sigmoidal", Coupling::Sigmoidal(Sigmoidal::default())),
        ] {
            group.bench_with_input(BenchmarkId::new(label, n), &n, |b, _| {
                let mut out = StateArray::zeros(1, n, 1);
                let view = DelayedView::new(&history, 0);
                b.iter(|| {
                    coupling
                        .compute(&graph, black_box(&current), &view, &mut out, false)
                        .unwrap();
                    black_box(&out);
                });
            });
        }
    }

    group.finish();
}

fn bench_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("history");

    for &n in &NODE_COUNTS {
        let layout = HistoryLayout {
            depth: 64,
            n_cvar: 1,
            n_nodes: n,
            n_modes: 1,
        };
        let mut history = HistoryBuffer::allocate(layout, None).unwrap();
        let state = ramp_state(n);
        history.initialize(&state).unwrap();

        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("write", n), &n, |b, _| {
            let mut t = 0u64;
            b.iter(|| {
                t += 1;
                history.write(black_box(t), &state).unwrap();
            });
        });

        group.bench_with_input(BenchmarkId::new("query_row", n), &n, |b, &n| {
            b.iter(|| {
                let mut sum = 0.0;
                for node in 0..n {
                    sum += history.query(black_box(100), node % 64, 0, node, 0);
                }
                black_box(sum)
            });
        });
    }

    group.finish();
}

fn bench_simulator_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulator_step");

    for &n in &NODE_COUNTS {
        group.throughput(Throughput::Elements(n as u64));

        for (label, threads) in [("sequential", 1usize), ("parallel", 0)] {
            let runtime = StdRuntime::with_config(RuntimeConfig {
                num_threads: threads,
                parallel_threshold: 64,
                ..RuntimeConfig::default()
            });
            let mut sim = Simulator::with_runtime(
                Box::new(Generic2dOscillator::default()),
                Connectivity::uniform(n, 0.5, 20.0, 4.0).unwrap(),
                Coupling::Difference(Difference { a: 0.014 }),
                Integrator::heun_stochastic(DT, Noise::additive(0.001), 42),
                vec![Monitor::temporal_average(1.0)],
                runtime,
            );
            sim.configure().unwrap();

            group.bench_with_input(BenchmarkId::new(label, n), &n, |b, _| {
                b.iter(|| black_box(sim.step().unwrap()));
            });
        }
    }

    group.finish();
}

fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(Duration::from_millis(500))
        .measurement_time(Duration::from_secs(1))
        .sample_size(20)
}

criterion_group! {
    name = ci_microbench;
    config = criterion_config();
    targets = bench_coupling, bench_history, bench_simulator_step
}
criterion_main!(ci_microbench);
