//! Threshold level controller.
//!
//! Reports on every step whether the input exceeds the setpoint.

use serde::{Deserialize, Serialize};

use crate::config::LevelConfig;
use crate::error::{ControlError, ControlResult};
use crate::introspect::{Introspect, expect_args};
use crate::lifecycle::{ResultSink, SinkSlot, Steppable, deliver};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelAttributes {
    pub setpoint: f64,
    pub input: f64,
    pub level_exceeded: bool,
}

/// Boolean threshold comparison driven by an external scheduler.
#[derive(Debug)]
pub struct LevelController {
    name: String,
    input: f64,
    setpoint: f64,
    sink: SinkSlot<LevelController, bool>,
}

impl LevelController {
    pub fn new(name: impl Into<String>, config: &LevelConfig) -> Self {
        Self {
            name: name.into(),
            input: config.input,
            setpoint: config.set_point,
            sink: SinkSlot::empty(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `true` when the input is strictly above the setpoint.
    pub fn check_level(&self) -> bool {
        self.input > self.setpoint
    }

    /// Register the result sink, replacing any previous one.
    pub fn on_check_level<S>(&mut self, sink: S)
    where
        S: ResultSink<LevelController, bool> + Send + 'static,
    {
        self.sink.set(Box::new(sink));
    }

    /// Evaluate the level and publish it to the registered sink.
    pub fn control(&mut self) -> bool {
        let exceeded = self.check_level();
        tracing::debug!(controller = %self.name, exceeded, "level check");

        let mut sink = self.sink.take();
        if let Some(sink) = sink.as_mut() {
            deliver(&self.name, &mut **sink, self, exceeded);
        }
        self.sink.restore(sink);
        exceeded
    }

    pub fn set_input(&mut self, value: f64) {
        self.input = value;
    }

    pub fn set_setpoint(&mut self, value: f64) {
        self.setpoint = value;
    }

    pub fn input(&self) -> f64 {
        self.input
    }

    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }
}

impl Steppable for LevelController {
    fn start(&mut self) {
        self.sink.ensure();
        tracing::info!(controller = %self.name, "level controller started");
    }

    fn step(&mut self) {
        self.control();
    }
}

impl Introspect for LevelController {
    type Attributes = LevelAttributes;

    fn attributes(&self) -> LevelAttributes {
        LevelAttributes {
            setpoint: self.setpoint,
            input: self.input,
            level_exceeded: self.check_level(),
        }
    }

    fn command_names(&self) -> &'static [&'static str] {
        &["set_setpoint"]
    }

    fn execute(&mut self, command: &str, args: &[f64]) -> ControlResult<()> {
        match command {
            "set_setpoint" => {
                expect_args(command, args, 1)?;
                self.set_setpoint(args[0]);
                Ok(())
            }
            _ => Err(ControlError::UnknownCommand {
                name: command.to_string(),
            }),
        }
    }
}
