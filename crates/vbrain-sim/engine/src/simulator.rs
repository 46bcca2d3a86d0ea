// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Simulator
//!
//! Owns every component of one simulation and steps them in order:
//!
//! ```text
//! history(t) -> coupling -> integrator(dfun) -> state(t+1)
//!                                                 |-> history.write(t+1)
//!                                                 |-> finite check (every K steps)
//!                                                 '-> monitors
//! ```
//!
//! Lifecycle: `Unconfigured -> Configured -> Running -> Finished`. Calling
//! [`Simulator::configure`] from any state discards the current run and
//! starts over from the initial conditions.

use crate::integrators::Integrator;
use crate::monitors::{Monitor, MonitorSample};
use crate::run::SimulationRun;
use crate::SimulationStats;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::sync::OnceLock;
use std::time::Instant;
use tracing::{debug, error, info, trace, warn};
use vbrain_sim_neural::{
    Connectivity, Coupling, CouplingGraph, LocalDynamics, Result, SimError, StateArray,
};
use vbrain_sim_runtime::{DelayedView, HistoryLayout, HistoryStorage, Runtime, StdRuntime};

/// Steps slower than this are logged as warnings
const SLOW_STEP_US: u64 = 50_000;

/// Runtime-gated per-step tracing
///
/// Enabled with `VBRAIN_TRACE_STEPS=1`; `VBRAIN_TRACE_NODE=<n>` restricts the
/// output to one node.
struct StepTraceCfg {
    enabled: bool,
    node_filter: Option<usize>,
}

fn step_trace_cfg() -> &'static StepTraceCfg {
    static CFG: OnceLock<StepTraceCfg> = OnceLock::new();
    CFG.get_or_init(|| {
        let enabled = std::env::var("VBRAIN_TRACE_STEPS")
            .ok()
            .as_deref()
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let node_filter = std::env::var("VBRAIN_TRACE_NODE").ok().and_then(|v| v.parse().ok());

        StepTraceCfg {
            enabled,
            node_filter,
        }
    })
}

/// Lifecycle of a [`Simulator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatorState {
    Unconfigured,
    Configured,
    Running,
    Finished,
}

impl SimulatorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimulatorState::Unconfigured => "Unconfigured",
            SimulatorState::Configured => "Configured",
            SimulatorState::Running => "Running",
            SimulatorState::Finished => "Finished",
        }
    }
}

/// Explicit starting point for a run
#[derive(Debug, Clone, PartialEq)]
pub enum InitialConditions {
    /// State at `t = 0`, also used to fill the whole history
    ///
    /// A single-mode state is replicated across all modes.
    State(StateArray),
    /// Warm-up trajectory, oldest first, one state per history slot
    ///
    /// The last state is the state at `t = 0`.
    Trajectory(Vec<StateArray>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOptions {
    /// Seed for random initial conditions
    pub seed: u64,
    /// Check the state for non-finite values every N steps (0 = never)
    pub check_finite_interval: u64,
    pub local_coupling_strength: f64,
    /// None draws uniform random values within the model's variable ranges
    pub initial_conditions: Option<InitialConditions>,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            seed: 42,
            check_finite_interval: 0,
            local_coupling_strength: 0.0,
            initial_conditions: None,
        }
    }
}

/// Result of one integration step
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutput {
    pub step: u64,
    pub time: f64,
    /// One entry per monitor, in configuration order
    pub samples: Vec<Option<MonitorSample>>,
}

/// Everything derived by `configure()` and mutated by stepping
struct RunState<H> {
    graph: CouplingGraph,
    history: H,
    cvars: Vec<usize>,
    state: StateArray,
    /// Coupling variables of `state`
    cvar_state: StateArray,
    coupling_input: StateArray,
    step: u64,
    parallel: bool,
}

/// Delay-coupled network simulator
pub struct Simulator<R: Runtime = StdRuntime> {
    model: Box<dyn LocalDynamics>,
    connectivity: Connectivity,
    coupling: Coupling,
    integrator: Integrator,
    monitors: Vec<Monitor>,
    options: SimulationOptions,
    runtime: R,
    status: SimulatorState,
    run: Option<RunState<R::History>>,
    stats: SimulationStats,
}

impl Simulator<StdRuntime> {
    /// Create a simulator on the standard runtime
    pub fn new(
        model: Box<dyn LocalDynamics>,
        connectivity: Connectivity,
        coupling: Coupling,
        integrator: Integrator,
        monitors: Vec<Monitor>,
    ) -> Self {
        Self::with_runtime(
            model,
            connectivity,
            coupling,
            integrator,
            monitors,
            StdRuntime::new(),
        )
    }
}

impl<R: Runtime> Simulator<R> {
    pub fn with_runtime(
        model: Box<dyn LocalDynamics>,
        connectivity: Connectivity,
        coupling: Coupling,
        integrator: Integrator,
        monitors: Vec<Monitor>,
        runtime: R,
    ) -> Self {
        Self {
            model,
            connectivity,
            coupling,
            integrator,
            monitors,
            options: SimulationOptions::default(),
            runtime,
            status: SimulatorState::Unconfigured,
            run: None,
            stats: SimulationStats::default(),
        }
    }

    pub fn with_options(mut self, options: SimulationOptions) -> Self {
        self.options = options;
        self.invalidate();
        self
    }

    /// Replace the options; the simulator must be configured again
    pub fn set_options(&mut self, options: SimulationOptions) {
        self.options = options;
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.status = SimulatorState::Unconfigured;
        self.run = None;
    }

    /// Validate all components and prepare a run from the initial conditions
    ///
    /// # Errors
    /// Any configuration or parameter-domain problem; the simulator stays
    /// `Unconfigured` on failure.
    pub fn configure(&mut self) -> Result<()> {
        self.invalidate();
        self.stats = SimulationStats::default();

        self.model.validate()?;
        self.connectivity.validate()?;

        let n_nodes = self.connectivity.n_nodes();
        let nvar = self.model.nvar();
        let n_modes = self.model.number_of_modes();
        let cvars = self.model.coupling_variables().to_vec();

        self.integrator.configure(nvar)?;
        self.coupling.configure()?;
        if cvars.len() < self.coupling.required_coupling_variables() {
            return Err(SimError::mismatch(
                format!("{} coupling variables of {}", self.coupling.name(), self.model.model_name()),
                self.coupling.required_coupling_variables(),
                cvars.len(),
            ));
        }
        if !self.options.local_coupling_strength.is_finite() {
            return Err(SimError::domain(
                "Simulator",
                "local_coupling_strength",
                "must be finite",
            ));
        }

        let dt = self.integrator.dt();
        let delays = self.connectivity.delays_in_steps(dt)?;
        let graph = self.connectivity.sparse_rows(&delays)?;
        let layout = HistoryLayout {
            depth: delays.max_delay() + 1,
            n_cvar: cvars.len(),
            n_nodes,
            n_modes,
        };
        let mut history = self.runtime.create_history(layout)?;
        debug!(
            "[SIMULATOR] max delay {} steps, {} edges, history {} bytes",
            delays.max_delay(),
            graph.edge_count(),
            history.memory_bytes()
        );
        if let Some(limit) = self.runtime.memory_limit() {
            if history.memory_bytes() > limit / 2 {
                warn!(
                    "[SIMULATOR] History uses {} of {} allowed bytes",
                    history.memory_bytes(),
                    limit
                );
            }
        }

        let state = match &self.options.initial_conditions {
            None => {
                let state = random_state(self.model.as_ref(), n_nodes, self.options.seed)?;
                history.initialize(&state.select_variables(&cvars)?)?;
                state
            }
            Some(InitialConditions::State(initial)) => {
                let state = fit_state(initial, nvar, n_nodes, n_modes)?;
                history.initialize(&state.select_variables(&cvars)?)?;
                state
            }
            Some(InitialConditions::Trajectory(states)) => {
                if states.len() != layout.depth {
                    return Err(SimError::mismatch(
                        "initial trajectory length (history depth)",
                        layout.depth,
                        states.len(),
                    ));
                }
                let full = states
                    .iter()
                    .map(|s| fit_state(s, nvar, n_nodes, n_modes))
                    .collect::<Result<Vec<_>>>()?;
                let coupled = full
                    .iter()
                    .map(|s| s.select_variables(&cvars))
                    .collect::<Result<Vec<_>>>()?;
                history.initialize_with_trajectory(&coupled)?;
                match full.into_iter().last() {
                    Some(state) => state,
                    None => {
                        return Err(SimError::Configuration("empty initial trajectory".into()))
                    }
                }
            }
        };

        for monitor in &mut self.monitors {
            monitor.configure(dt, self.model.as_ref(), n_nodes)?;
        }

        let parallel =
            self.runtime.supports_parallel() && n_nodes >= self.runtime.parallel_threshold();

        info!(
            "[SIMULATOR] Configured {} on {} nodes x {} modes: {} coupling, {} integrator (dt={}), history depth {}, {} monitors, parallel={} ({})",
            self.model.model_name(),
            n_nodes,
            n_modes,
            self.coupling.name(),
            self.integrator.name(),
            dt,
            layout.depth,
            self.monitors.len(),
            parallel,
            self.runtime.platform_name()
        );

        let cvar_state = state.select_variables(&cvars)?;
        let coupling_input = StateArray::zeros(cvars.len(), n_nodes, n_modes);
        self.run = Some(RunState {
            graph,
            history,
            cvars,
            state,
            cvar_state,
            coupling_input,
            step: 0,
            parallel,
        });
        self.status = SimulatorState::Configured;
        Ok(())
    }

    /// Lazily run for `round(simulation_length / dt)` steps
    ///
    /// Requires a freshly configured simulator. Dropping the returned
    /// iterator ends the run early; the simulator is `Finished` either way.
    pub fn run(&mut self, simulation_length: f64) -> Result<SimulationRun<'_, R>> {
        if self.status != SimulatorState::Configured {
            return Err(SimError::InvalidState {
                expected: SimulatorState::Configured.as_str(),
                actual: self.status.as_str(),
            });
        }
        if !(simulation_length.is_finite() && simulation_length > 0.0) {
            return Err(SimError::Configuration(format!(
                "simulation length must be positive and finite, got {}",
                simulation_length
            )));
        }
        let steps = (simulation_length / self.integrator.dt()).round() as u64;
        info!(
            "[SIMULATOR] Starting run: {} steps ({} time units)",
            steps, simulation_length
        );
        Ok(SimulationRun::new(self, steps))
    }

    /// Run to completion and collect `(time, data)` samples per monitor
    pub fn run_to_end(&mut self, simulation_length: f64) -> Result<Vec<Vec<(f64, StateArray)>>> {
        let mut collected: Vec<Vec<(f64, StateArray)>> = vec![Vec::new(); self.monitors.len()];
        for output in self.run(simulation_length)? {
            for (per_monitor, sample) in collected.iter_mut().zip(output?.samples) {
                if let Some(sample) = sample {
                    per_monitor.push((sample.time, sample.data));
                }
            }
        }
        Ok(collected)
    }

    /// Advance one integration step
    pub fn step(&mut self) -> Result<StepOutput> {
        match self.status {
            SimulatorState::Configured | SimulatorState::Running => {}
            other => {
                return Err(SimError::InvalidState {
                    expected: SimulatorState::Running.as_str(),
                    actual: other.as_str(),
                })
            }
        }
        let Some(run) = self.run.as_mut() else {
            return Err(SimError::InvalidState {
                expected: SimulatorState::Configured.as_str(),
                actual: SimulatorState::Unconfigured.as_str(),
            });
        };
        self.status = SimulatorState::Running;
        let started = Instant::now();
        let t = run.step;
        let parallel = run.parallel;

        // Coupling from history at t
        {
            let view = DelayedView::new(&run.history, t);
            self.coupling.compute(
                &run.graph,
                &run.cvar_state,
                &view,
                &mut run.coupling_input,
                parallel,
            )?;
        }

        // Integrate with the coupling input held fixed
        let model = self.model.as_ref();
        let coupling_input = &run.coupling_input;
        let lc = self.options.local_coupling_strength;
        run.state = self
            .integrator
            .step(&run.state, |x| model.dfun_with(x, coupling_input, lc, parallel));
        run.step += 1;
        let step = run.step;

        run.state.select_variables_into(&run.cvars, &mut run.cvar_state)?;
        run.history.write(step, &run.cvar_state)?;

        let interval = self.options.check_finite_interval;
        if interval > 0 && step % interval == 0 {
            if let Some((variable, node, mode)) = run.state.first_non_finite() {
                error!(
                    "[SIMULATOR] Non-finite state at step {}: variable {}, node {}, mode {}",
                    step, variable, node, mode
                );
                self.status = SimulatorState::Finished;
                return Err(SimError::NumericalInstability {
                    step,
                    variable,
                    node,
                    mode,
                });
            }
        }

        let state = &run.state;
        let samples = if parallel && self.monitors.len() > 1 {
            self.monitors
                .par_iter_mut()
                .map(|m| m.sample(step, state))
                .collect::<Result<Vec<_>>>()?
        } else {
            self.monitors
                .iter_mut()
                .map(|m| m.sample(step, state))
                .collect::<Result<Vec<_>>>()?
        };

        let cfg = step_trace_cfg();
        if cfg.enabled {
            let n_nodes = state.n_nodes();
            let nodes = match cfg.node_filter {
                Some(n) if n < n_nodes => n..n + 1,
                Some(_) => 0..0,
                None => 0..n_nodes,
            };
            for node in nodes {
                trace!(
                    target: "vbrain_sim_engine::step_trace",
                    "[STEP-TRACE] step={} node={} state={:?} coupling={:?}",
                    step,
                    node,
                    state.point(node, 0),
                    run.coupling_input.point(node, 0)
                );
            }
        }

        let elapsed_us = started.elapsed().as_micros() as u64;
        self.stats.total_steps += 1;
        self.stats.total_samples += samples.iter().filter(|s| s.is_some()).count() as u64;
        self.stats.total_processing_time_us += elapsed_us;
        self.stats.max_step_time_us = self.stats.max_step_time_us.max(elapsed_us);
        if elapsed_us > SLOW_STEP_US {
            self.stats.slow_steps += 1;
            warn!(
                "[SIMULATOR] Slow step {}: {:.1} ms",
                step,
                elapsed_us as f64 / 1000.0
            );
        }

        Ok(StepOutput {
            step,
            time: step as f64 * self.integrator.dt(),
            samples,
        })
    }

    /// Mark the current run as finished
    pub(crate) fn finish(&mut self) {
        if matches!(
            self.status,
            SimulatorState::Configured | SimulatorState::Running
        ) {
            info!(
                "[SIMULATOR] Run finished at step {}: {} samples, avg step {:.1} us",
                self.current_step(),
                self.stats.total_samples,
                self.stats.avg_step_time_us()
            );
        }
        if self.status != SimulatorState::Unconfigured {
            self.status = SimulatorState::Finished;
        }
    }

    /// Scan the current state for NaN/Inf
    pub fn check_finite(&self) -> Result<()> {
        let Some(run) = self.run.as_ref() else {
            return Err(SimError::InvalidState {
                expected: SimulatorState::Configured.as_str(),
                actual: self.status.as_str(),
            });
        };
        match run.state.first_non_finite() {
            Some((variable, node, mode)) => Err(SimError::NumericalInstability {
                step: run.step,
                variable,
                node,
                mode,
            }),
            None => Ok(()),
        }
    }

    pub fn status(&self) -> SimulatorState {
        self.status
    }

    /// Current state (None until configured)
    pub fn state(&self) -> Option<&StateArray> {
        self.run.as_ref().map(|r| &r.state)
    }

    pub fn current_step(&self) -> u64 {
        self.run.as_ref().map(|r| r.step).unwrap_or(0)
    }

    pub fn current_time(&self) -> f64 {
        self.current_step() as f64 * self.integrator.dt()
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    /// Number of history slots (None until configured)
    pub fn history_depth(&self) -> Option<usize> {
        self.run.as_ref().map(|r| r.history.depth())
    }

    /// Whether intra-step work runs on the thread pool
    pub fn is_parallel(&self) -> bool {
        self.run.as_ref().map(|r| r.parallel).unwrap_or(false)
    }

    pub fn model(&self) -> &dyn LocalDynamics {
        self.model.as_ref()
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    pub fn coupling(&self) -> &Coupling {
        &self.coupling
    }

    pub fn integrator(&self) -> &Integrator {
        &self.integrator
    }

    pub fn monitors(&self) -> &[Monitor] {
        &self.monitors
    }

    pub fn options(&self) -> &SimulationOptions {
        &self.options
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }
}

/// Uniform random state within each variable's range, drawn in flat order
fn random_state(model: &dyn LocalDynamics, n_nodes: usize, seed: u64) -> Result<StateArray> {
    let ranges = model.state_variable_range();
    if ranges.len() != model.nvar() {
        return Err(SimError::mismatch(
            format!("{} state variable ranges", model.model_name()),
            model.nvar(),
            ranges.len(),
        ));
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut state = StateArray::zeros(model.nvar(), n_nodes, model.number_of_modes());
    for (v, (lo, hi)) in ranges.into_iter().enumerate() {
        for value in state.variable_mut(v) {
            *value = lo + (hi - lo) * rng.gen::<f64>();
        }
    }
    Ok(state)
}

/// Check an explicit state against the model shape, replicating a single mode
fn fit_state(
    initial: &StateArray,
    nvar: usize,
    n_nodes: usize,
    n_modes: usize,
) -> Result<StateArray> {
    let state = match initial.shape() {
        shape if shape == (nvar, n_nodes, n_modes) => initial.clone(),
        (v, n, 1) if v == nvar && n == n_nodes => StateArray::broadcast_modes(initial, n_modes),
        _ => {
            return Err(SimError::mismatch(
                "initial state size",
                nvar * n_nodes * n_modes,
                initial.len(),
            ))
        }
    };
    if let Some((variable, node, mode)) = state.first_non_finite() {
        return Err(SimError::Configuration(format!(
            "initial state is not finite at variable {}, node {}, mode {}",
            variable, node, mode
        )));
    }
    Ok(state)
}
