// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Lazy simulation run
//!
//! Each `next()` performs exactly one integration step; nothing is computed
//! ahead and no output is retained. Dropping the iterator is the only
//! cancellation mechanism.

use crate::simulator::{Simulator, StepOutput};
use vbrain_sim_neural::Result;
use vbrain_sim_runtime::{Runtime, StdRuntime};

/// Iterator over the steps of one run
///
/// Yields `Err` at most once; iteration stops after the first error.
pub struct SimulationRun<'a, R: Runtime = StdRuntime> {
    simulator: &'a mut Simulator<R>,
    remaining: u64,
    failed: bool,
}

impl<'a, R: Runtime> SimulationRun<'a, R> {
    pub(crate) fn new(simulator: &'a mut Simulator<R>, steps: u64) -> Self {
        Self {
            simulator,
            remaining: steps,
            failed: false,
        }
    }

    /// Steps still to be taken
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Read access to the simulator between steps
    pub fn simulator(&self) -> &Simulator<R> {
        self.simulator
    }
}

impl<R: Runtime> Iterator for SimulationRun<'_, R> {
    type Item = Result<StepOutput>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 || self.failed {
            return None;
        }
        self.remaining -= 1;
        match self.simulator.step() {
            Ok(output) => Some(Ok(output)),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (0, Some(remaining))
    }
}

impl<R: Runtime> Drop for SimulationRun<'_, R> {
    fn drop(&mut self) {
        self.simulator.finish();
    }
}
