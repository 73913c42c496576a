//! Discrete-time PID controller.
//!
//! [`PidState`] holds the numeric state and implements the compute step and
//! the validated setters. [`PidController`] wraps it with a name and a result
//! sink and implements the scheduler contract.
//!
//! Features:
//! - Derivative on input (no kick on setpoint changes)
//! - Integral clamped to the output limits (anti-windup)
//! - Output clamping
//! - Bumpless MANUAL → AUTOMATIC transfer
//! - Direct/reverse action

use serde::{Deserialize, Serialize};

use crate::config::PidConfig;
use crate::error::{ControlError, ControlResult};
use crate::introspect::{Introspect, expect_args};
use crate::lifecycle::{ResultSink, SinkSlot, Steppable, deliver};
use crate::mode::{Direction, Mode};
use crate::sampled::SampleTime;

/// Clamp without panicking on NaN bounds.
fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value > max {
        max
    } else if value < min {
        min
    } else {
        value
    }
}

/// Numeric state of a PID controller.
///
/// `ki` and `kd` are stored already scaled by the sample time.
#[derive(Debug, Clone, PartialEq)]
pub struct PidState {
    input: f64,
    setpoint: f64,
    kp: f64,
    ki: f64,
    kd: f64,
    integral: f64,
    last_input: f64,
    out_min: f64,
    out_max: f64,
    direction: Direction,
    mode: Mode,
    output: f64,
    sample_time: SampleTime,
}

impl PidState {
    /// Build the state from a configuration.
    ///
    /// Settings are applied in order: input, setpoint, tunings, mode, limits,
    /// direction. An initial `Automatic` mode goes through the bumpless path.
    /// The initial output of 0 is clamped into the configured limits.
    ///
    /// # Errors
    ///
    /// Returns error if the configured sample time is invalid.
    pub fn new(config: &PidConfig) -> ControlResult<Self> {
        let mut state = Self {
            input: 0.0,
            setpoint: 0.0,
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            integral: 0.0,
            last_input: 0.0,
            out_min: 0.0,
            out_max: 0.0,
            direction: Direction::Direct,
            mode: Mode::Manual,
            output: 0.0,
            sample_time: config.sample_time()?,
        };
        state.set_input(config.input);
        state.set_setpoint(config.set_point);
        state.set_tunings(config.kp, config.ki, config.kd);
        state.set_mode(config.mode);
        state.set_limits(config.limits.out_min, config.limits.out_max);
        state.set_direction(config.direction);
        state.output = clamp(state.output, state.out_min, state.out_max);
        Ok(state)
    }

    /// Run one control step and return the clamped output.
    ///
    /// `last_input` is refreshed to the current input at the end of every
    /// call so the next derivative term sees the previous tick's measurement.
    /// The step runs in both modes; in `Manual` the result is informational.
    ///
    /// A non-finite input or setpoint skips the step: state is left untouched
    /// and the previous output is returned.
    pub fn compute(&mut self) -> f64 {
        let input = self.input;
        let error = self.setpoint - input;
        if !error.is_finite() {
            tracing::warn!(input, setpoint = self.setpoint, "non-finite error, step skipped");
            return self.output;
        }

        self.integral += self.ki * error;
        self.clamp_integral();

        let d_input = input - self.last_input;
        let raw = (self.kp * error + self.integral - self.kd * d_input) * self.direction.sign();

        self.output = clamp(raw, self.out_min, self.out_max);
        self.last_input = input;

        tracing::debug!(
            error,
            integral = self.integral,
            d_input,
            output = self.output,
            "pid compute"
        );
        self.output
    }

    /// Set gains in continuous-time units.
    ///
    /// Rejected as a whole if any gain is negative or not finite; returns
    /// whether the new gains were applied.
    pub fn set_tunings(&mut self, kp: f64, ki: f64, kd: f64) -> bool {
        let valid = |gain: f64| gain.is_finite() && gain >= 0.0;
        if !(valid(kp) && valid(ki) && valid(kd)) {
            tracing::debug!(kp, ki, kd, "rejected invalid tunings");
            return false;
        }
        let dt = self.sample_time.seconds();
        self.kp = kp;
        self.ki = ki * dt;
        self.kd = kd / dt;
        tracing::debug!(kp = self.kp, ki = self.ki, kd = self.kd, "tunings set");
        true
    }

    /// Set output limits. `min >= max` collapses the range to `[max, max]`.
    pub fn set_limits(&mut self, min: f64, max: f64) {
        let min = if min >= max { max } else { min };
        self.out_min = min;
        self.out_max = max;
        tracing::debug!(out_min = min, out_max = max, "limits set");

        if self.mode.is_automatic() {
            self.output = clamp(self.output, self.out_min, self.out_max);
            self.clamp_integral();
        }
    }

    /// Switch mode. Only MANUAL → AUTOMATIC has side effects: the integral is
    /// reseeded from the held output and `last_input` from the current input.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode.is_automatic() && !self.mode.is_automatic() {
            self.integral = self.output;
            self.last_input = self.input;
            self.clamp_integral();
            tracing::debug!(integral = self.integral, "bumpless transfer to automatic");
        }
        self.mode = mode;
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn set_input(&mut self, value: f64) {
        self.input = value;
    }

    pub fn set_setpoint(&mut self, value: f64) {
        self.setpoint = value;
    }

    /// Set the output while in `Manual`, clamped into the limits.
    ///
    /// The value seeds the integral on the next switch to `Automatic`. The
    /// step still runs in `Manual`, so the next tick replaces it. Ignored in
    /// `Automatic` mode; returns whether the value was taken.
    pub fn set_output(&mut self, value: f64) -> bool {
        if self.mode.is_automatic() {
            tracing::debug!(value, "manual output ignored in automatic mode");
            return false;
        }
        self.output = clamp(value, self.out_min, self.out_max);
        true
    }

    fn clamp_integral(&mut self) {
        self.integral = clamp(self.integral, self.out_min, self.out_max);
    }

    pub fn input(&self) -> f64 {
        self.input
    }

    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// Proportional gain.
    pub fn kp(&self) -> f64 {
        self.kp
    }

    /// Integral gain scaled by the sample time.
    pub fn ki(&self) -> f64 {
        self.ki
    }

    /// Derivative gain divided by the sample time.
    pub fn kd(&self) -> f64 {
        self.kd
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn last_input(&self) -> f64 {
        self.last_input
    }

    /// Output limits as `(min, max)`.
    pub fn limits(&self) -> (f64, f64) {
        (self.out_min, self.out_max)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn output(&self) -> f64 {
        self.output
    }

    pub fn sample_time(&self) -> SampleTime {
        self.sample_time
    }
}

/// Read snapshot of a PID controller for external inspection.
///
/// Gains are reported as stored, i.e. scaled by the sample time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PidAttributes {
    pub setpoint: f64,
    pub input: f64,
    pub output: f64,
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub mode: Mode,
    pub direction: Direction,
    pub min_limit: f64,
    pub max_limit: f64,
}

/// PID controller driven by an external scheduler.
///
/// # Example
///
/// ```
/// use lk_controls::{Mode, PidConfig, PidController};
///
/// let config = PidConfig {
///     kp: 1.0,
///     set_point: 10.0,
///     input: 4.0,
///     mode: Mode::Automatic,
///     ..PidConfig::default()
/// };
/// let mut pid = PidController::new("heater", &config).unwrap();
/// assert_eq!(pid.control(), 6.0);
/// ```
#[derive(Debug)]
pub struct PidController {
    name: String,
    state: PidState,
    sink: SinkSlot<PidController, f64>,
}

impl PidController {
    /// Create a named controller from a configuration.
    pub fn new(name: impl Into<String>, config: &PidConfig) -> ControlResult<Self> {
        Ok(Self {
            name: name.into(),
            state: PidState::new(config)?,
            sink: SinkSlot::empty(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &PidState {
        &self.state
    }

    /// Register the result sink, replacing any previous one.
    pub fn on_compute<S>(&mut self, sink: S)
    where
        S: ResultSink<PidController, f64> + Send + 'static,
    {
        self.sink.set(Box::new(sink));
    }

    /// Compute a new output and publish it to the registered sink.
    ///
    /// State is committed before the sink runs. A failing sink is logged and
    /// otherwise ignored.
    pub fn control(&mut self) -> f64 {
        let output = self.state.compute();
        tracing::debug!(controller = %self.name, output, "pid output");

        let mut sink = self.sink.take();
        if let Some(sink) = sink.as_mut() {
            deliver(&self.name, &mut **sink, self, output);
        }
        self.sink.restore(sink);
        output
    }

    pub fn set_tunings(&mut self, kp: f64, ki: f64, kd: f64) -> bool {
        self.state.set_tunings(kp, ki, kd)
    }

    pub fn set_limits(&mut self, min: f64, max: f64) {
        self.state.set_limits(min, max);
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.state.set_mode(mode);
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.state.set_direction(direction);
    }

    pub fn set_input(&mut self, value: f64) {
        self.state.set_input(value);
    }

    pub fn set_setpoint(&mut self, value: f64) {
        self.state.set_setpoint(value);
    }

    pub fn set_output(&mut self, value: f64) -> bool {
        self.state.set_output(value)
    }

    pub fn output(&self) -> f64 {
        self.state.output()
    }
}

impl Steppable for PidController {
    fn start(&mut self) {
        self.sink.ensure();
        tracing::info!(
            controller = %self.name,
            mode = ?self.state.mode(),
            "pid controller started"
        );
    }

    fn step(&mut self) {
        self.control();
    }
}

impl Introspect for PidController {
    type Attributes = PidAttributes;

    fn attributes(&self) -> PidAttributes {
        let (min_limit, max_limit) = self.state.limits();
        PidAttributes {
            setpoint: self.state.setpoint(),
            input: self.state.input(),
            output: self.state.output(),
            kp: self.state.kp(),
            ki: self.state.ki(),
            kd: self.state.kd(),
            mode: self.state.mode(),
            direction: self.state.direction(),
            min_limit,
            max_limit,
        }
    }

    fn command_names(&self) -> &'static [&'static str] {
        &["set_setpoint", "set_tunings", "set_direction", "set_limits"]
    }

    fn execute(&mut self, command: &str, args: &[f64]) -> ControlResult<()> {
        match command {
            "set_setpoint" => {
                expect_args(command, args, 1)?;
                self.set_setpoint(args[0]);
            }
            "set_tunings" => {
                expect_args(command, args, 3)?;
                self.set_tunings(args[0], args[1], args[2]);
            }
            "set_direction" => {
                expect_args(command, args, 1)?;
                let direction = if args[0] == Direction::DIRECT_TAG as f64 {
                    Direction::Direct
                } else {
                    Direction::Reverse
                };
                self.set_direction(direction);
            }
            "set_limits" => {
                expect_args(command, args, 2)?;
                self.set_limits(args[0], args[1]);
            }
            _ => {
                return Err(ControlError::UnknownCommand {
                    name: command.to_string(),
                });
            }
        }
        Ok(())
    }
}
