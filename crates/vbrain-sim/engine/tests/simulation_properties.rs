// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end numerical properties of the simulator
//!
//! Each test builds a small network, runs it through the public API and
//! checks the result against a hand-computed trajectory or a second run.

use vbrain_sim_engine::{
    InitialConditions, Integrator, Monitor, Noise, NoiseGenerator, SimulationOptions, Simulator,
    SimulatorState,
};
use vbrain_sim_neural::coupling::{Difference, Linear};
use vbrain_sim_neural::{
    Connectivity, Coupling, Generic2dOscillator, LinearModel, LinearParameters, StateArray,
};
use vbrain_sim_runtime::{RuntimeConfig, StdRuntime};

fn explicit(state: StateArray) -> SimulationOptions {
    SimulationOptions {
        initial_conditions: Some(InitialConditions::State(state)),
        ..SimulationOptions::default()
    }
}

/// Raw samples of every step, in order
fn raw_trace<R: vbrain_sim_runtime::Runtime>(sim: &mut Simulator<R>, length: f64) -> Vec<StateArray> {
    sim.configure().unwrap();
    sim.run_to_end(length)
        .unwrap()
        .remove(0)
        .into_iter()
        .map(|(_, data)| data)
        .collect()
}

// ═══════════════════════════════════════════════════════════
// Stochastic reference trace
// ═══════════════════════════════════════════════════════════

/// Two-node Euler-Maruyama trajectory for seed 42, nsig 0.01, Difference a=0.014,
/// dt=1/16, x0 = [0.5, -0.25], as IEEE-754 bit patterns
const REFERENCE_TRACE: [[u64; 2]; 4] = [
    [0x3fce6f1086d0c01a, 0xbfbc0ae9ad3cbf62],
    [0x3fb016c5960dfcc4, 0xbfb14c1dc6a5435e],
    [0x3fa4cac1fa276030, 0xbf5a9a8d2d411e40],
    [0x3f99df8688355a56, 0xbf9de44c0126360c],
];

#[test]
fn test_two_node_euler_maruyama_matches_reference() {
    let dt = 1.0 / 16.0;

    let build = || {
        let connectivity = Connectivity::uniform(2, 1.0, 0.0, 4.0).unwrap();
        Simulator::new(
            Box::new(LinearModel::default()),
            connectivity,
            Coupling::Difference(Difference { a: 0.014 }),
            Integrator::euler_maruyama(dt, Noise::additive(0.01), 42),
            vec![Monitor::raw()],
        )
        .with_options(explicit(
            StateArray::from_vec(1, 2, 1, vec![0.5, -0.25]).unwrap(),
        ))
    };

    let trace = raw_trace(&mut build(), 4.0 * dt);
    assert_eq!(trace.len(), 4);
    for (step, (sample, bits)) in trace.iter().zip(REFERENCE_TRACE.iter()).enumerate() {
        let expected = [f64::from_bits(bits[0]), f64::from_bits(bits[1])];
        assert_eq!(sample.as_slice(), &expected[..], "step {}", step + 1);
    }

    // Same seed, same trajectory
    assert_eq!(raw_trace(&mut build(), 4.0 * dt), trace);
}

#[test]
fn test_noise_generator_first_draws() {
    // Box-Muller pair from the first two uniforms of ChaCha8 seeded with 42
    let mut generator = NoiseGenerator::new(42);
    let first = f64::from_bits(0x3ff70b47dc7bf440);
    let second = f64::from_bits(0xbfddc60d12edd588);
    assert_eq!(generator.standard_normal(), first);
    assert_eq!(generator.standard_normal(), second);

    generator.reset();
    assert_eq!(generator.standard_normal(), first);
}

#[test]
fn test_noise_independent_of_parallelism() {
    let build = |runtime: StdRuntime| {
        let connectivity = Connectivity::uniform(6, 0.2, 12.0, 4.0).unwrap();
        Simulator::with_runtime(
            Box::new(Generic2dOscillator::default()),
            connectivity,
            Coupling::Difference(Difference { a: 0.1 }),
            Integrator::heun_stochastic(0.0625, Noise::additive(0.001), 9),
            vec![Monitor::raw(), Monitor::temporal_average(0.25)],
            runtime,
        )
    };
    let sequential = StdRuntime::with_config(RuntimeConfig {
        num_threads: 1,
        ..RuntimeConfig::default()
    });
    let parallel = StdRuntime::with_config(RuntimeConfig {
        parallel_threshold: 1,
        ..RuntimeConfig::default()
    });

    let mut a = build(sequential);
    let mut b = build(parallel);
    a.configure().unwrap();
    b.configure().unwrap();
    assert!(!a.is_parallel());
    assert!(b.is_parallel());
    assert_eq!(a.run_to_end(2.0).unwrap(), b.run_to_end(2.0).unwrap());
}

// ═══════════════════════════════════════════════════════════
// Scheme equivalences
// ═══════════════════════════════════════════════════════════

#[test]
fn test_zero_noise_heun_stochastic_equals_heun() {
    let build = |integrator: Integrator| {
        let connectivity = Connectivity::uniform(4, 0.5, 20.0, 4.0).unwrap();
        Simulator::new(
            Box::new(Generic2dOscillator::default()),
            connectivity,
            Coupling::Linear(Linear { a: 0.1, b: 0.0 }),
            integrator,
            vec![Monitor::raw()],
        )
    };
    let deterministic = raw_trace(&mut build(Integrator::heun(0.0625)), 5.0);
    let stochastic = raw_trace(
        &mut build(Integrator::heun_stochastic(
            0.0625,
            Noise::additive(0.0),
            1234,
        )),
        5.0,
    );
    assert_eq!(deterministic.len(), 80);
    assert_eq!(deterministic, stochastic);
}

#[test]
fn test_difference_coupling_vanishes_for_identical_nodes() {
    let dt = 0.01;
    let gamma = LinearParameters::default().gamma;
    let connectivity = Connectivity::uniform(3, 2.0, 0.0, 4.0).unwrap();
    let mut sim = Simulator::new(
        Box::new(LinearModel::default()),
        connectivity,
        Coupling::Difference(Difference { a: 5.0 }),
        Integrator::euler(dt),
        vec![Monitor::raw()],
    )
    .with_options(explicit(StateArray::filled(1, 3, 1, 0.75)));

    let trace = raw_trace(&mut sim, 10.0 * dt);
    let mut x = 0.75f64;
    for sample in &trace {
        x += dt * (gamma * x + 0.0 + 0.0 * x);
        assert!(sample.as_slice().iter().all(|&v| v == x));
    }
}

#[test]
fn test_modes_evolve_independently() {
    let build = |modes: usize| {
        let connectivity = Connectivity::uniform(3, 0.3, 10.0, 2.0).unwrap();
        let initial =
            StateArray::from_vec(2, 3, 1, vec![0.1, -0.4, 0.9, 1.2, -0.3, 0.0]).unwrap();
        Simulator::new(
            Box::new(Generic2dOscillator::default().with_modes(modes)),
            connectivity,
            Coupling::Difference(Difference { a: 0.05 }),
            Integrator::runge_kutta4(0.05),
            vec![Monitor::raw()],
        )
        .with_options(explicit(initial))
    };

    let single = raw_trace(&mut build(1), 2.0);
    let double = raw_trace(&mut build(2), 2.0);
    assert_eq!(single.len(), double.len());
    for (one, two) in single.iter().zip(&double) {
        assert_eq!(two.shape(), (2, 3, 2));
        for v in 0..2 {
            for n in 0..3 {
                assert_eq!(two.get(v, n, 0), one.get(v, n, 0));
                assert_eq!(two.get(v, n, 1), one.get(v, n, 0));
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Delays and sampling
// ═══════════════════════════════════════════════════════════

#[test]
fn test_pulse_arrives_after_exact_delay() {
    // Node 0 drives node 1 through a 3-step delay; node 1 integrates its input
    let weights = vec![vec![0.0, 0.0], vec![1.0, 0.0]];
    let tracts = vec![vec![0.0, 0.0], vec![3.0, 0.0]];
    let connectivity = Connectivity::new(weights, tracts, 1.0).unwrap();

    let quiet = StateArray::zeros(1, 2, 1);
    let pulse = StateArray::from_vec(1, 2, 1, vec![1.0, 0.0]).unwrap();
    let trajectory = vec![quiet.clone(), quiet.clone(), quiet, pulse];

    let mut sim = Simulator::new(
        Box::new(LinearModel::new(LinearParameters { gamma: 0.0 })),
        connectivity,
        Coupling::Linear(Linear { a: 1.0, b: 0.0 }),
        Integrator::euler(1.0),
        vec![Monitor::raw()],
    )
    .with_options(SimulationOptions {
        initial_conditions: Some(InitialConditions::Trajectory(trajectory)),
        ..SimulationOptions::default()
    });

    let trace = raw_trace(&mut sim, 5.0);
    let node1: Vec<f64> = trace.iter().map(|s| s.get(0, 1, 0)).collect();
    assert_eq!(node1, vec![0.0, 0.0, 0.0, 1.0, 2.0]);
    assert!(trace.iter().all(|s| s.get(0, 0, 0) == 1.0));
    assert_eq!(sim.history_depth(), Some(4));
}

#[test]
fn test_sampling_period_of_three_steps() {
    let connectivity = Connectivity::uniform(2, 0.1, 4.0, 4.0).unwrap();
    let mut sim = Simulator::new(
        Box::new(LinearModel::default()),
        connectivity,
        Coupling::default(),
        Integrator::euler(0.1),
        vec![Monitor::sub_sample(0.3), Monitor::temporal_average(0.3)],
    );
    sim.configure().unwrap();

    let first = sim.step().unwrap();
    let second = sim.step().unwrap();
    assert!(first.samples.iter().chain(&second.samples).all(|s| s.is_none()));

    let third = sim.step().unwrap();
    assert_eq!(third.step, 3);
    assert!(third.samples.iter().all(|s| s.is_some()));
    let stamp = |i: usize| third.samples[i].as_ref().map(|s| s.time).unwrap_or(f64::NAN);
    assert!((stamp(0) - 0.3).abs() < 1e-12);
    assert!((stamp(1) - 0.15).abs() < 1e-12);
    assert_eq!(sim.status(), SimulatorState::Running);
}

// ═══════════════════════════════════════════════════════════
// Lifecycle
// ═══════════════════════════════════════════════════════════

#[test]
fn test_early_stop_leaves_consistent_state() {
    let connectivity = Connectivity::uniform(3, 0.1, 4.0, 4.0).unwrap();
    let mut sim = Simulator::new(
        Box::new(Generic2dOscillator::default()),
        connectivity,
        Coupling::default(),
        Integrator::heun(0.1),
        vec![Monitor::raw()],
    );
    sim.configure().unwrap();

    let taken: Vec<_> = sim.run(100.0).unwrap().take(3).collect();
    assert_eq!(taken.len(), 3);
    assert_eq!(sim.status(), SimulatorState::Finished);
    assert_eq!(sim.current_step(), 3);
    let last = taken[2].as_ref().unwrap().samples[0].as_ref().unwrap();
    assert_eq!(Some(&last.data), sim.state());
    assert!(sim.check_finite().is_ok());

    assert!(sim.run(1.0).is_err());
    assert!(sim.step().is_err());
    sim.configure().unwrap();
    assert_eq!(sim.run(1.0).unwrap().count(), 10);
}

#[test]
fn test_reconfigure_replays_identical_run() {
    let connectivity = Connectivity::uniform(4, 0.3, 6.0, 3.0).unwrap();
    let mut sim = Simulator::new(
        Box::new(Generic2dOscillator::default()),
        connectivity,
        Coupling::Difference(Difference { a: 0.2 }),
        Integrator::euler_maruyama(0.05, Noise::additive(0.002), 3),
        vec![Monitor::sub_sample(0.25)],
    );
    let first = raw_trace(&mut sim, 3.0);
    let second = raw_trace(&mut sim, 3.0);
    assert_eq!(first.len(), 12);
    assert_eq!(first, second);
}
