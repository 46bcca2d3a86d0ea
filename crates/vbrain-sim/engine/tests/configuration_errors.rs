// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration failures surface from `configure()` with the right class,
//! and a simulator built from a `vbrain-config` file runs.

use vbrain_config::{CouplingConfig, IntegratorScheme, MonitorConfig, MonitorKind, SimulationConfig};
use vbrain_sim_engine::{
    EegReference, FromConfig, Integrator, Monitor, Noise, RegionMapping, SensorProjection,
    Simulator, SimulatorState,
};
use vbrain_sim_neural::coupling::{PreSigmoidal, Sigmoidal};
use vbrain_sim_neural::{
    Connectivity, Coupling, ErrorKind, Generic2dOscillator, LinearModel, SimError,
};
use vbrain_sim_runtime::{RuntimeConfig, StdRuntime};

fn linear_sim(coupling: Coupling, integrator: Integrator, monitors: Vec<Monitor>) -> Simulator {
    Simulator::new(
        Box::new(LinearModel::default()),
        Connectivity::uniform(3, 0.5, 8.0, 4.0).unwrap(),
        coupling,
        integrator,
        monitors,
    )
}

#[test]
fn test_zero_sigma_is_parameter_domain() {
    let mut sim = linear_sim(
        Coupling::Sigmoidal(Sigmoidal {
            sigma: 0.0,
            ..Sigmoidal::default()
        }),
        Integrator::heun(0.1),
        vec![],
    );
    let err = sim.configure().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParameterDomain);
    assert_eq!(sim.status(), SimulatorState::Unconfigured);
}

#[test]
fn test_two_variable_coupling_needs_two_coupling_variables() {
    let mut sim = linear_sim(
        Coupling::PreSigmoidal(PreSigmoidal::default()),
        Integrator::heun(0.1),
        vec![],
    );
    assert!(matches!(
        sim.configure(),
        Err(SimError::DimensionMismatch { expected: 2, actual: 1, .. })
    ));

    let mut sim = Simulator::new(
        Box::new(Generic2dOscillator::default().with_coupling_variables(vec![0, 1])),
        Connectivity::uniform(3, 0.5, 8.0, 4.0).unwrap(),
        Coupling::PreSigmoidal(PreSigmoidal::default()),
        Integrator::heun(0.1),
        vec![],
    );
    sim.configure().unwrap();
    assert_eq!(sim.run(1.0).unwrap().filter(|r| r.is_ok()).count(), 10);
}

#[test]
fn test_non_positive_dt() {
    for dt in [0.0, -0.1, f64::INFINITY] {
        let mut sim = linear_sim(Coupling::default(), Integrator::euler(dt), vec![]);
        assert!(matches!(
            sim.configure(),
            Err(SimError::ParameterDomain { parameter: "dt", .. })
        ));
    }
}

#[test]
fn test_monitor_period_not_multiple_of_dt() {
    let mut sim = linear_sim(
        Coupling::default(),
        Integrator::euler(0.1),
        vec![Monitor::raw(), Monitor::temporal_average(0.25)],
    );
    match sim.configure() {
        Err(SimError::InvalidMonitorPeriod { monitor, period, .. }) => {
            assert_eq!(monitor, "TemporalAverage");
            assert_eq!(period, 0.25);
        }
        other => panic!("expected InvalidMonitorPeriod, got {:?}", other),
    }
}

#[test]
fn test_noise_shape_mismatch() {
    let noise = Noise::Additive {
        nsig: vec![0.1, 0.2],
    };
    let mut sim = linear_sim(
        Coupling::default(),
        Integrator::euler_maruyama(0.1, noise, 1),
        vec![],
    );
    assert!(matches!(
        sim.configure(),
        Err(SimError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_history_above_memory_limit() {
    // 3 nodes x 1 cvar x 1 mode x 81 slots x 8 bytes = 1944 bytes
    let runtime = StdRuntime::with_config(RuntimeConfig {
        history_memory_limit_bytes: Some(1024),
        ..RuntimeConfig::default()
    });
    let mut sim = Simulator::with_runtime(
        Box::new(LinearModel::default()),
        Connectivity::uniform(3, 0.5, 20.0, 1.0).unwrap(),
        Coupling::default(),
        Integrator::euler(0.25),
        vec![],
        runtime,
    );
    match sim.configure() {
        Err(SimError::HistoryTooLarge {
            requested_bytes,
            limit_bytes,
        }) => {
            assert_eq!(requested_bytes, 1944);
            assert_eq!(limit_bytes, 1024);
        }
        other => panic!("expected HistoryTooLarge, got {:?}", other),
    }
}

#[test]
fn test_invalid_model_layout() {
    let mut sim = Simulator::new(
        Box::new(LinearModel::default().with_modes(0)),
        Connectivity::uniform(2, 0.5, 8.0, 4.0).unwrap(),
        Coupling::default(),
        Integrator::euler(0.1),
        vec![],
    );
    assert!(sim.configure().is_err());
}

#[test]
fn test_sensor_projection_checked_against_nodes() {
    let projection = SensorProjection::new(vec![vec![1.0, 1.0]]).unwrap();
    let mut sim = linear_sim(
        Coupling::default(),
        Integrator::euler(0.1),
        vec![Monitor::eeg(0.1, projection, EegReference::None)],
    );
    assert!(matches!(
        sim.configure(),
        Err(SimError::DimensionMismatch { .. })
    ));

    // Three nodes averaged into two regions
    let projection = SensorProjection::new(vec![vec![1.0, 0.0], vec![0.0, 1.0]])
        .unwrap()
        .with_region_mapping(RegionMapping::new(vec![0, 0, 1], 2).unwrap())
        .unwrap();
    let mut sim = linear_sim(
        Coupling::default(),
        Integrator::euler(0.1),
        vec![Monitor::ieeg(0.5, projection)],
    );
    sim.configure().unwrap();
    let samples = sim.run_to_end(1.0).unwrap();
    assert_eq!(samples[0].len(), 2);
    assert_eq!(samples[0][0].1.shape(), (1, 2, 1));
}

#[test]
fn test_simulator_from_config() {
    let mut config = SimulationConfig::default();
    config.simulation.dt = 0.0625;
    config.simulation.check_finite_interval = 10;
    config.coupling = CouplingConfig::Difference { a: Some(0.014) };
    config.integrator.scheme = IntegratorScheme::HeunStochastic;
    config.integrator.noise.nsig = vec![0.001];
    config.monitors = vec![
        MonitorConfig {
            kind: MonitorKind::TemporalAverage,
            period: 0.5,
            variables: None,
        },
        MonitorConfig {
            kind: MonitorKind::Raw,
            ..MonitorConfig::default()
        },
    ];

    let connectivity = Connectivity::uniform(4, 1.0, 10.0, 1.0).unwrap();
    let mut sim =
        Simulator::from_config(Box::new(Generic2dOscillator::default()), connectivity, &config)
            .unwrap();
    assert_eq!(sim.connectivity().speed(), 4.0);
    assert_eq!(sim.integrator().name(), "HeunStochastic");
    assert_eq!(sim.options().check_finite_interval, 10);

    sim.configure().unwrap();
    // 10 / 4 = 2.5 time units = 40 steps
    assert_eq!(sim.history_depth(), Some(41));
    let samples = sim.run_to_end(4.0).unwrap();
    assert_eq!(samples[0].len(), 8);
    assert_eq!(samples[1].len(), 64);
}

#[test]
fn test_invalid_config_rejected_before_building() {
    let mut config = SimulationConfig::default();
    config.simulation.dt = 0.1;
    config.monitors.push(MonitorConfig {
        kind: MonitorKind::SubSample,
        period: 0.15,
        variables: None,
    });
    let result = Simulator::from_config(
        Box::new(LinearModel::default()),
        Connectivity::uniform(2, 1.0, 1.0, 1.0).unwrap(),
        &config,
    );
    assert!(matches!(result, Err(SimError::Configuration(msg)) if msg.contains("monitors[0].period")));
}

#[test]
fn test_components_from_config_sections() {
    let coupling = Coupling::from_config(&CouplingConfig::Scaling { a: Some(0.5) }).unwrap();
    assert_eq!(coupling.name(), "Scaling");
    let runtime = RuntimeConfig::from_config(&SimulationConfig::default().runtime).unwrap();
    assert_eq!(runtime.history_memory_limit_bytes, Some(4096 * 1024 * 1024));
}
