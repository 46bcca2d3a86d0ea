// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Build engine components from a `vbrain-config` [`SimulationConfig`]
//!
//! Parameters left out of the TOML file fall back to each component's own
//! defaults. Only components that need no external data are covered; the
//! model and connectivity are always passed in by the caller.

use crate::integrators::Integrator;
use crate::monitors::Monitor;
use crate::noise::Noise;
use crate::simulator::{SimulationOptions, Simulator};
use tracing::debug;
use vbrain_config::{
    validate_config, CouplingConfig, IntegratorScheme, MonitorConfig, MonitorKind, NoiseKind,
    RuntimeSection, SimulationConfig, WeightScalingConfig,
};
use vbrain_sim_neural::coupling::{
    Difference, HyperbolicTangent, Kuramoto, Linear, PreSigmoidal, Scaling, Sigmoidal,
    SigmoidalJansenRit,
};
use vbrain_sim_neural::{
    Connectivity, Coupling, LocalDynamics, Result, SimError, WeightScaling,
};
use vbrain_sim_runtime::{RuntimeConfig, StdRuntime};

/// Construction from a configuration section
pub trait FromConfig<C>: Sized {
    fn from_config(config: &C) -> Result<Self>;
}

impl FromConfig<CouplingConfig> for Coupling {
    fn from_config(config: &CouplingConfig) -> Result<Self> {
        let coupling = match *config {
            CouplingConfig::Linear { a, b } => {
                let d = Linear::default();
                Coupling::Linear(Linear {
                    a: a.unwrap_or(d.a),
                    b: b.unwrap_or(d.b),
                })
            }
            CouplingConfig::Scaling { a } => Coupling::Scaling(Scaling {
                a: a.unwrap_or(Scaling::default().a),
            }),
            CouplingConfig::Difference { a } => Coupling::Difference(Difference {
                a: a.unwrap_or(Difference::default().a),
            }),
            CouplingConfig::Sigmoidal {
                cmin,
                cmax,
                midpoint,
                sigma,
                a,
            } => {
                let d = Sigmoidal::default();
                Coupling::Sigmoidal(Sigmoidal {
                    cmin: cmin.unwrap_or(d.cmin),
                    cmax: cmax.unwrap_or(d.cmax),
                    midpoint: midpoint.unwrap_or(d.midpoint),
                    sigma: sigma.unwrap_or(d.sigma),
                    a: a.unwrap_or(d.a),
                })
            }
            CouplingConfig::HyperbolicTangent {
                a,
                b,
                midpoint,
                sigma,
            } => {
                let d = HyperbolicTangent::default();
                Coupling::HyperbolicTangent(HyperbolicTangent {
                    a: a.unwrap_or(d.a),
                    b: b.unwrap_or(d.b),
                    midpoint: midpoint.unwrap_or(d.midpoint),
                    sigma: sigma.unwrap_or(d.sigma),
                })
            }
            CouplingConfig::Kuramoto { a } => Coupling::Kuramoto(Kuramoto {
                a: a.unwrap_or(Kuramoto::default().a),
            }),
            CouplingConfig::PreSigmoidal {
                h,
                q,
                g,
                p,
                theta,
                dynamic,
                global_t,
            } => {
                let d = PreSigmoidal::default();
                Coupling::PreSigmoidal(PreSigmoidal {
                    h: h.unwrap_or(d.h),
                    q: q.unwrap_or(d.q),
                    g: g.unwrap_or(d.g),
                    p: p.unwrap_or(d.p),
                    theta: theta.unwrap_or(d.theta),
                    dynamic: dynamic.unwrap_or(d.dynamic),
                    global_t: global_t.unwrap_or(d.global_t),
                })
            }
            CouplingConfig::SigmoidalJansenRit {
                cmin,
                cmax,
                midpoint,
                r,
                a,
            } => {
                let d = SigmoidalJansenRit::default();
                Coupling::SigmoidalJansenRit(SigmoidalJansenRit {
                    cmin: cmin.unwrap_or(d.cmin),
                    cmax: cmax.unwrap_or(d.cmax),
                    midpoint: midpoint.unwrap_or(d.midpoint),
                    r: r.unwrap_or(d.r),
                    a: a.unwrap_or(d.a),
                })
            }
        };
        coupling.configure()?;
        Ok(coupling)
    }
}

impl FromConfig<SimulationConfig> for Integrator {
    fn from_config(config: &SimulationConfig) -> Result<Self> {
        let dt = config.simulation.dt;
        let noise_cfg = &config.integrator.noise;
        let noise = match noise_cfg.kind {
            NoiseKind::Additive => Noise::Additive {
                nsig: noise_cfg.nsig.clone(),
            },
            NoiseKind::Multiplicative => Noise::Multiplicative {
                nsig: noise_cfg.nsig.clone(),
                slope: noise_cfg.slope,
                intercept: noise_cfg.intercept,
            },
        };
        Ok(match config.integrator.scheme {
            IntegratorScheme::Euler => Integrator::euler(dt),
            IntegratorScheme::Heun => Integrator::heun(dt),
            IntegratorScheme::RungeKutta4 => Integrator::runge_kutta4(dt),
            IntegratorScheme::EulerMaruyama => {
                Integrator::euler_maruyama(dt, noise, noise_cfg.seed)
            }
            IntegratorScheme::HeunStochastic => {
                Integrator::heun_stochastic(dt, noise, noise_cfg.seed)
            }
        })
    }
}

impl FromConfig<MonitorConfig> for Monitor {
    fn from_config(config: &MonitorConfig) -> Result<Self> {
        let monitor = match config.kind {
            MonitorKind::Raw => Monitor::raw(),
            MonitorKind::SubSample => Monitor::sub_sample(config.period),
            MonitorKind::TemporalAverage => Monitor::temporal_average(config.period),
            MonitorKind::GlobalAverage => Monitor::global_average(config.period),
        };
        Ok(match &config.variables {
            Some(variables) => monitor.with_variables(variables.clone()),
            None => monitor,
        })
    }
}

impl FromConfig<SimulationConfig> for SimulationOptions {
    fn from_config(config: &SimulationConfig) -> Result<Self> {
        Ok(SimulationOptions {
            seed: config.simulation.seed,
            check_finite_interval: config.simulation.check_finite_interval,
            local_coupling_strength: config.simulation.local_coupling_strength,
            initial_conditions: None,
        })
    }
}

impl FromConfig<RuntimeSection> for RuntimeConfig {
    fn from_config(config: &RuntimeSection) -> Result<Self> {
        let limit = usize::try_from(config.history_memory_limit_mb)
            .ok()
            .and_then(|mb| mb.checked_mul(1024 * 1024))
            .unwrap_or(usize::MAX);
        Ok(RuntimeConfig {
            num_threads: config.num_threads,
            parallel_threshold: config.parallel_threshold,
            history_memory_limit_bytes: Some(limit),
        })
    }
}

impl FromConfig<WeightScalingConfig> for WeightScaling {
    fn from_config(config: &WeightScalingConfig) -> Result<Self> {
        Ok(match config {
            WeightScalingConfig::None => WeightScaling::None,
            WeightScalingConfig::Tract => WeightScaling::Tract,
            WeightScalingConfig::Region => WeightScaling::Region,
        })
    }
}

impl Simulator<StdRuntime> {
    /// Assemble an unconfigured simulator from a validated configuration
    ///
    /// The connectivity takes the configured conduction speed and weight
    /// scaling. Call [`Simulator::configure`] before running.
    pub fn from_config(
        model: Box<dyn LocalDynamics>,
        connectivity: Connectivity,
        config: &SimulationConfig,
    ) -> Result<Self> {
        validate_config(config).map_err(|e| SimError::Configuration(e.to_string()))?;

        let mut connectivity =
            connectivity.scaled(WeightScaling::from_config(&config.connectivity.weight_scaling)?);
        connectivity.set_speed(config.connectivity.speed)?;

        let coupling = Coupling::from_config(&config.coupling)?;
        let integrator = Integrator::from_config(config)?;
        let monitors = config
            .monitors
            .iter()
            .map(Monitor::from_config)
            .collect::<Result<Vec<_>>>()?;
        let options = SimulationOptions::from_config(config)?;

        let runtime = StdRuntime::with_config(RuntimeConfig::from_config(&config.runtime)?);
        if let Err(e) = runtime.init_thread_pool() {
            debug!("[SIMULATOR] Keeping existing thread pool: {}", e);
        }

        Ok(
            Simulator::with_runtime(model, connectivity, coupling, integrator, monitors, runtime)
                .with_options(options),
        )
    }
}
