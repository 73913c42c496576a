//! Simulated process for exercising controllers from the command line.
//!
//! First-order lag: `dy/dt = (gain * u - y) / tau`, integrated with explicit
//! Euler at the controller's sample period.

use lk_controls::{ControlError, ControlResult};

#[derive(Debug, Clone)]
pub struct FirstOrderPlant {
    /// Steady-state gain from controller output to measurement.
    pub gain: f64,
    /// Time constant (seconds), must be positive.
    pub tau: f64,
    /// Current measurement.
    pub value: f64,
}

impl FirstOrderPlant {
    /// # Errors
    ///
    /// Returns error if `tau` is not positive.
    pub fn new(gain: f64, tau: f64, initial: f64) -> ControlResult<Self> {
        if tau <= 0.0 || !tau.is_finite() {
            return Err(ControlError::InvalidArg {
                what: "plant tau must be positive",
            });
        }
        Ok(Self {
            gain,
            tau,
            value: initial,
        })
    }

    pub fn dydt(&self, command: f64) -> f64 {
        (self.gain * command - self.value) / self.tau
    }

    /// Advance by `dt` seconds holding `command`, returning the new value.
    pub fn step(&mut self, dt: f64, command: f64) -> f64 {
        self.value += self.dydt(command) * dt;
        self.value
    }
}
