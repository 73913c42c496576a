//! Periodic control components for loopkit.
//!
//! Each controller samples a process variable, computes a decision and
//! publishes it to a result sink on every scheduler tick.
//!
//! # Architecture
//!
//! - [`PidController`]: discrete-time PID with anti-windup, output clamping,
//!   bumpless MANUAL → AUTOMATIC transfer and direct/reverse action
//! - [`LevelController`]: input-above-setpoint threshold check
//! - [`TimeIntervalController`]: membership of the local time in daily intervals
//!
//! All controllers implement [`Steppable`]. The host calls `start()` once and
//! `step()` once per sample period; scheduling itself is left to the host.
//! Results go to a single registered [`ResultSink`]; sink failures are logged
//! and never reach the scheduler.

pub mod config;
pub mod error;
pub mod interval;
pub mod introspect;
pub mod level;
pub mod lifecycle;
pub mod mode;
pub mod pid;
pub mod sampled;

pub use config::{
    Controller, ControllerKind, ControllerSpec, ControllersFile, IntervalSpec, LevelConfig,
    OutputLimits, PidConfig, TimeIntervalConfig,
};
pub use error::{ControlError, ControlResult};
pub use interval::{Clock, FixedClock, SystemClock, TimeInterval, TimeIntervalController};
pub use introspect::{Introspect, attributes_json};
pub use level::{LevelAttributes, LevelController};
pub use lifecycle::{NoopSink, ResultSink, Steppable};
pub use mode::{Direction, Mode};
pub use pid::{PidAttributes, PidController, PidState};
pub use sampled::SampleTime;
