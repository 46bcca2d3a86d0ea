// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Integration Schemes
//!
//! One step advances the full network state by `dt` with the coupling input
//! held fixed:
//!
//! ```text
//! Euler            x + dt f(x)
//! Heun             i = x + dt f(x);          x + (f(x) + f(i)) dt/2
//! RungeKutta4      x + dt/6 (k1 + 2 k2 + 2 k3 + k4)
//! EulerMaruyama    x + dt f(x) + g(x) dW
//! HeunStochastic   n = g(x) dW; i = x + dt f(x) + n;  x + (f(x) + f(i)) dt/2 + n
//! ```
//!
//! The stochastic Heun corrector reuses the predictor's noise draw. Both Heun
//! variants run through the same arithmetic, so zero noise reproduces the
//! deterministic scheme exactly.

use crate::noise::{Noise, NoiseGenerator};
use vbrain_sim_neural::{Result, SimError, StateArray};

/// Integration scheme with its step size and, when stochastic, its noise
#[derive(Debug, Clone)]
pub enum Integrator {
    Euler {
        dt: f64,
    },
    Heun {
        dt: f64,
    },
    RungeKutta4 {
        dt: f64,
    },
    EulerMaruyama {
        dt: f64,
        noise: Noise,
        generator: NoiseGenerator,
    },
    HeunStochastic {
        dt: f64,
        noise: Noise,
        generator: NoiseGenerator,
    },
}

impl Integrator {
    pub fn euler(dt: f64) -> Self {
        Integrator::Euler { dt }
    }

    pub fn heun(dt: f64) -> Self {
        Integrator::Heun { dt }
    }

    pub fn runge_kutta4(dt: f64) -> Self {
        Integrator::RungeKutta4 { dt }
    }

    pub fn euler_maruyama(dt: f64, noise: Noise, seed: u64) -> Self {
        Integrator::EulerMaruyama {
            dt,
            noise,
            generator: NoiseGenerator::new(seed),
        }
    }

    pub fn heun_stochastic(dt: f64, noise: Noise, seed: u64) -> Self {
        Integrator::HeunStochastic {
            dt,
            noise,
            generator: NoiseGenerator::new(seed),
        }
    }

    pub fn dt(&self) -> f64 {
        match self {
            Integrator::Euler { dt }
            | Integrator::Heun { dt }
            | Integrator::RungeKutta4 { dt }
            | Integrator::EulerMaruyama { dt, .. }
            | Integrator::HeunStochastic { dt, .. } => *dt,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Integrator::Euler { .. } => "Euler",
            Integrator::Heun { .. } => "Heun",
            Integrator::RungeKutta4 { .. } => "RungeKutta4",
            Integrator::EulerMaruyama { .. } => "EulerMaruyama",
            Integrator::HeunStochastic { .. } => "HeunStochastic",
        }
    }

    pub fn is_stochastic(&self) -> bool {
        matches!(
            self,
            Integrator::EulerMaruyama { .. } | Integrator::HeunStochastic { .. }
        )
    }

    pub fn noise(&self) -> Option<&Noise> {
        match self {
            Integrator::EulerMaruyama { noise, .. } | Integrator::HeunStochastic { noise, .. } => {
                Some(noise)
            }
            _ => None,
        }
    }

    /// Validate `dt` and the noise shape for a model with `nvar` state variables
    ///
    /// Also rewinds the noise stream, so a reconfigured simulation replays the
    /// same draws.
    pub fn configure(&mut self, nvar: usize) -> Result<()> {
        let dt = self.dt();
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SimError::domain(
                self.name(),
                "dt",
                format!("must be positive and finite, got {}", dt),
            ));
        }
        if let Some(noise) = self.noise() {
            noise.validate(nvar)?;
        }
        self.reset();
        Ok(())
    }

    /// Restart the noise stream from its seed
    pub fn reset(&mut self) {
        if let Integrator::EulerMaruyama { generator, .. }
        | Integrator::HeunStochastic { generator, .. } = self
        {
            generator.reset();
        }
    }

    /// Advance `state` by one step
    ///
    /// `dfun` evaluates the network derivative with the step's coupling input
    /// already bound.
    pub fn step<F>(&mut self, state: &StateArray, mut dfun: F) -> StateArray
    where
        F: FnMut(&StateArray) -> StateArray,
    {
        match self {
            Integrator::Euler { dt } => {
                let fx = dfun(state);
                StateArray::offset(state, *dt, &fx)
            }
            Integrator::Heun { dt } => heun(state, *dt, None, &mut dfun),
            Integrator::RungeKutta4 { dt } => {
                let dt = *dt;
                let k1 = dfun(state);
                let k2 = dfun(&StateArray::offset(state, dt / 2.0, &k1));
                let k3 = dfun(&StateArray::offset(state, dt / 2.0, &k2));
                let k4 = dfun(&StateArray::offset(state, dt, &k3));
                StateArray::lincomb(
                    state,
                    &[
                        (dt / 6.0, &k1),
                        (dt / 3.0, &k2),
                        (dt / 3.0, &k3),
                        (dt / 6.0, &k4),
                    ],
                )
            }
            Integrator::EulerMaruyama {
                dt,
                noise,
                generator,
            } => {
                let forcing = draw(noise, generator, state, *dt);
                let fx = dfun(state);
                let mut next = StateArray::offset(state, *dt, &fx);
                next.add_scaled(1.0, &forcing);
                next
            }
            Integrator::HeunStochastic {
                dt,
                noise,
                generator,
            } => {
                let forcing = draw(noise, generator, state, *dt);
                heun(state, *dt, Some(&forcing), &mut dfun)
            }
        }
    }
}

fn draw(noise: &Noise, generator: &mut NoiseGenerator, state: &StateArray, dt: f64) -> StateArray {
    let dw = generator.wiener_increment(dt, state.shape());
    noise.forcing(state, &dw)
}

fn heun<F>(state: &StateArray, dt: f64, forcing: Option<&StateArray>, dfun: &mut F) -> StateArray
where
    F: FnMut(&StateArray) -> StateArray,
{
    let fx = dfun(state);
    let mut inter = StateArray::offset(state, dt, &fx);
    if let Some(n) = forcing {
        inter.add_scaled(1.0, n);
    }
    let fi = dfun(&inter);

    let mut next = state.clone();
    for ((x, a), b) in next
        .as_mut_slice()
        .iter_mut()
        .zip(fx.as_slice())
        .zip(fi.as_slice())
    {
        *x += (a + b) * dt / 2.0;
    }
    if let Some(n) = forcing {
        next.add_scaled(1.0, n);
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    /// dx = -x, exact solution x0 e^{-t}
    fn decay(x: &StateArray) -> StateArray {
        let mut out = x.clone();
        out.as_mut_slice().iter_mut().for_each(|v| *v = -*v);
        out
    }

    fn run(integrator: &mut Integrator, steps: usize) -> f64 {
        let mut x = StateArray::filled(1, 1, 1, 1.0);
        for _ in 0..steps {
            x = integrator.step(&x, decay);
        }
        x.get(0, 0, 0)
    }

    #[test]
    fn test_euler_single_step() {
        let mut integrator = Integrator::euler(0.1);
        assert_eq!(run(&mut integrator, 1), 0.9);
    }

    #[test]
    fn test_orders_of_accuracy() {
        let exact = (-1.0f64).exp();
        let err_euler = (run(&mut Integrator::euler(0.01), 100) - exact).abs();
        let err_heun = (run(&mut Integrator::heun(0.01), 100) - exact).abs();
        let err_rk4 = (run(&mut Integrator::runge_kutta4(0.01), 100) - exact).abs();
        assert!(err_euler < 2e-3, "euler {}", err_euler);
        assert!(err_heun < 1e-5, "heun {}", err_heun);
        assert!(err_rk4 < 1e-10, "rk4 {}", err_rk4);
        assert!(err_rk4 < err_heun && err_heun < err_euler);
    }

    #[test]
    fn test_zero_noise_heun_matches_deterministic() {
        let mut deterministic = Integrator::heun(0.05);
        let mut stochastic = Integrator::heun_stochastic(0.05, Noise::additive(0.0), 11);
        stochastic.configure(1).unwrap();
        let nonlinear = |x: &StateArray| {
            let mut out = x.clone();
            out.as_mut_slice().iter_mut().for_each(|v| *v = v.sin() - 0.3 * *v);
            out
        };
        let mut a = StateArray::from_vec(1, 3, 1, vec![0.1, -0.7, 2.3]).unwrap();
        let mut b = a.clone();
        for _ in 0..25 {
            a = deterministic.step(&a, nonlinear);
            b = stochastic.step(&b, nonlinear);
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_euler_maruyama_reproducible_after_reset() {
        let mut integrator = Integrator::euler_maruyama(0.1, Noise::additive(0.5), 5);
        integrator.configure(1).unwrap();
        let first = run(&mut integrator, 10);
        integrator.reset();
        let second = run(&mut integrator, 10);
        assert_eq!(first, second);
        assert_ne!(first, run(&mut Integrator::euler(0.1), 10));
    }

    #[test]
    fn test_configure_rejects_bad_dt_and_noise() {
        assert!(matches!(
            Integrator::euler(0.0).configure(1),
            Err(SimError::ParameterDomain { parameter: "dt", .. })
        ));
        assert!(Integrator::heun(f64::NAN).configure(1).is_err());
        let mut bad_noise = Integrator::euler_maruyama(
            0.1,
            Noise::Additive {
                nsig: vec![0.1, 0.1, 0.1],
            },
            1,
        );
        assert!(matches!(
            bad_noise.configure(2),
            Err(SimError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_metadata() {
        let integrator = Integrator::heun_stochastic(0.25, Noise::additive(0.1), 1);
        assert_eq!(integrator.dt(), 0.25);
        assert_eq!(integrator.name(), "HeunStochastic");
        assert!(integrator.is_stochastic());
        assert!(!Integrator::runge_kutta4(0.1).is_stochastic());
        assert!(Integrator::euler(0.1).noise().is_none());
    }
}
