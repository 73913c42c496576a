//! Construction-time configuration for controllers.
//!
//! Every field is optional; missing values take the documented defaults.
//! A [`ControllersFile`] groups several named controllers and is read from
//! YAML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ControlResult;
use crate::interval::TimeIntervalController;
use crate::level::LevelController;
use crate::lifecycle::Steppable;
use crate::mode::{Direction, Mode};
use crate::pid::PidController;
use crate::sampled::SampleTime;

/// Output clamp bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputLimits {
    #[serde(alias = "outMin")]
    pub out_min: f64,
    #[serde(alias = "outMax")]
    pub out_max: f64,
}

impl Default for OutputLimits {
    fn default() -> Self {
        Self {
            out_min: 0.0,
            out_max: 255.0,
        }
    }
}

/// PID controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidConfig {
    pub input: f64,
    #[serde(alias = "setPoint")]
    pub set_point: f64,
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub mode: Mode,
    pub limits: OutputLimits,
    pub direction: Direction,
    /// Control period in seconds.
    pub sample_time: SampleTime,
    /// Scheduler tick interval in milliseconds. Overrides `sample_time`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_interval_ms: Option<u64>,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            input: 0.0,
            set_point: 0.0,
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            mode: Mode::Manual,
            limits: OutputLimits::default(),
            direction: Direction::Direct,
            sample_time: SampleTime::default(),
            control_interval_ms: None,
        }
    }
}

impl PidConfig {
    /// Effective sample time.
    pub fn sample_time(&self) -> ControlResult<SampleTime> {
        match self.control_interval_ms {
            Some(millis) => SampleTime::from_millis(millis),
            None => Ok(self.sample_time),
        }
    }
}

/// Level controller configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub input: f64,
    #[serde(alias = "setPoint")]
    pub set_point: f64,
}

/// One daily interval, bounds as time-of-day strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalSpec {
    pub start: String,
    pub end: String,
}

/// Time-interval controller configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeIntervalConfig {
    pub intervals: Vec<IntervalSpec>,
}

/// Controller kind and its settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControllerKind {
    Pid(PidConfig),
    Level(LevelConfig),
    TimeInterval(TimeIntervalConfig),
}

/// Named controller entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: ControllerKind,
}

impl ControllerSpec {
    /// Instantiate the configured controller.
    pub fn build(&self) -> ControlResult<Controller> {
        Ok(match &self.kind {
            ControllerKind::Pid(config) => {
                Controller::Pid(PidController::new(self.name.clone(), config)?)
            }
            ControllerKind::Level(config) => {
                Controller::Level(LevelController::new(self.name.clone(), config))
            }
            ControllerKind::TimeInterval(config) => {
                Controller::TimeInterval(TimeIntervalController::new(self.name.clone(), config)?)
            }
        })
    }
}

/// A configured controller of any kind.
#[derive(Debug)]
pub enum Controller {
    Pid(PidController),
    Level(LevelController),
    TimeInterval(TimeIntervalController),
}

impl Controller {
    pub fn name(&self) -> &str {
        match self {
            Self::Pid(c) => c.name(),
            Self::Level(c) => c.name(),
            Self::TimeInterval(c) => c.name(),
        }
    }
}

impl Steppable for Controller {
    fn start(&mut self) {
        match self {
            Self::Pid(c) => c.start(),
            Self::Level(c) => c.start(),
            Self::TimeInterval(c) => c.start(),
        }
    }

    fn step(&mut self) {
        match self {
            Self::Pid(c) => c.step(),
            Self::Level(c) => c.step(),
            Self::TimeInterval(c) => c.step(),
        }
    }
}

/// File holding several named controllers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllersFile {
    #[serde(default)]
    pub controllers: Vec<ControllerSpec>,
}

impl ControllersFile {
    pub fn from_yaml_str(content: &str) -> ControlResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn to_yaml_string(&self) -> ControlResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn load_yaml(path: &Path) -> ControlResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Instantiate every controller, failing on the first invalid entry.
    pub fn build_all(&self) -> ControlResult<Vec<Controller>> {
        self.controllers.iter().map(ControllerSpec::build).collect()
    }

    pub fn find(&self, name: &str) -> Option<&ControllerSpec> {
        self.controllers.iter().find(|spec| spec.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pid_defaults() {
        let config: PidConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, PidConfig::default());
        assert_eq!(config.limits.out_min, 0.0);
        assert_eq!(config.limits.out_max, 255.0);
        assert_eq!(config.mode, Mode::Manual);
        assert_eq!(config.direction, Direction::Direct);
        assert_eq!(config.sample_time().unwrap().seconds(), 1.0);
    }

    #[test]
    fn control_interval_overrides_sample_time() {
        let config: PidConfig =
            serde_yaml::from_str("sample_time: 2.0\ncontrol_interval_ms: 100\n").unwrap();
        assert!((config.sample_time().unwrap().seconds() - 0.1).abs() < 1e-12);

        let config = PidConfig {
            control_interval_ms: Some(0),
            ..PidConfig::default()
        };
        assert!(config.sample_time().is_err());
    }

    #[test]
    fn accepts_legacy_field_names_and_codes() {
        let yaml = "setPoint: 40\nmode: 0\ndirection: 1\nlimits:\n  outMax: 100\n";
        let config: PidConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.set_point, 40.0);
        assert_eq!(config.mode, Mode::Automatic);
        assert_eq!(config.direction, Direction::Reverse);
        assert_eq!(config.limits.out_min, 0.0);
        assert_eq!(config.limits.out_max, 100.0);
    }

    #[test]
    fn rejects_invalid_sample_time() {
        assert!(serde_yaml::from_str::<PidConfig>("sample_time: -1").is_err());
    }

    #[test]
    fn controllers_file_kinds() {
        let yaml = r#"
controllers:
  - name: heater
    type: pid
    kp: 2.0
    mode: automatic
  - name: tank
    type: level
    set_point: 3.5
  - name: lights
    type: time_interval
    intervals:
      - { start: "7", end: "9:30" }
"#;
        let file = ControllersFile::from_yaml_str(yaml).unwrap();
        assert_eq!(file.controllers.len(), 3);
        match &file.find("heater").unwrap().kind {
            ControllerKind::Pid(config) => {
                assert_eq!(config.kp, 2.0);
                assert_eq!(config.mode, Mode::Automatic);
            }
            other => panic!("unexpected kind: {other:?}"),
        }
        assert!(matches!(
            file.find("tank").unwrap().kind,
            ControllerKind::Level(LevelConfig { set_point, .. }) if set_point == 3.5
        ));

        let controllers = file.build_all().unwrap();
        let names: Vec<_> = controllers.iter().map(Controller::name).collect();
        assert_eq!(names, vec!["heater", "tank", "lights"]);
    }

    #[test]
    fn yaml_round_trip() {
        let file = ControllersFile {
            controllers: vec![ControllerSpec {
                name: "heater".to_string(),
                kind: ControllerKind::Pid(PidConfig {
                    kp: 1.5,
                    mode: Mode::Automatic,
                    direction: Direction::Reverse,
                    ..PidConfig::default()
                }),
            }],
        };
        let text = file.to_yaml_string().unwrap();
        assert_eq!(ControllersFile::from_yaml_str(&text).unwrap(), file);
    }

    #[test]
    fn unknown_kind_is_config_error() {
        let err = ControllersFile::from_yaml_str("controllers:\n  - name: x\n    type: fuzzy\n")
            .unwrap_err();
        assert!(matches!(err, crate::error::ControlError::Config(_)));
    }
}
