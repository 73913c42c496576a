use std::sync::{Arc, Mutex};

use lk_controls::{
    ControlError, ControlResult, Direction, Mode, OutputLimits, PidConfig, PidController,
    SampleTime, Steppable,
};

/// First-order plant: `dy/dt = (gain * u - y) / tau`, explicit Euler.
struct Plant {
    y: f64,
    gain: f64,
    tau: f64,
}

impl Plant {
    fn step(&mut self, u: f64, dt: f64) -> f64 {
        self.y += dt * (self.gain * u - self.y) / self.tau;
        self.y
    }
}

fn heater_config() -> PidConfig {
    PidConfig {
        kp: 2.0,
        ki: 1.0,
        kd: 0.1,
        set_point: 20.0,
        mode: Mode::Automatic,
        limits: OutputLimits {
            out_min: 0.0,
            out_max: 100.0,
        },
        sample_time: SampleTime::new(0.1).unwrap(),
        ..PidConfig::default()
    }
}

#[test]
fn closed_loop_reaches_setpoint() {
    let mut pid = PidController::new("heater", &heater_config()).unwrap();
    let mut plant = Plant {
        y: 0.0,
        gain: 1.0,
        tau: 1.0,
    };
    pid.start();

    for _ in 0..600 {
        pid.set_input(plant.y);
        let u = pid.control();
        assert!((0.0..=100.0).contains(&u));
        plant.step(u, 0.1);
    }

    assert!((plant.y - 20.0).abs() < 0.1, "plant settled at {}", plant.y);
}

#[test]
fn reverse_acting_proportional_loop() {
    // Cooling: more output lowers the measurement.
    let config = PidConfig {
        ki: 0.0,
        kd: 0.0,
        direction: Direction::Reverse,
        set_point: -10.0,
        ..heater_config()
    };
    let mut pid = PidController::new("chiller", &config).unwrap();
    let mut plant = Plant {
        y: 0.0,
        gain: -1.0,
        tau: 1.0,
    };

    let mut u = 0.0;
    for _ in 0..600 {
        pid.set_input(plant.y);
        u = pid.control();
        plant.step(u, 0.1);
    }

    // P-only steady state: u = 2 * (y + 10), y = -u.
    assert!((plant.y + 20.0 / 3.0).abs() < 0.05, "plant settled at {}", plant.y);
    assert!(u > 0.0);
}

#[test]
fn manual_hold_then_bumpless_switch() {
    let config = PidConfig {
        mode: Mode::Manual,
        ..heater_config()
    };
    let mut pid = PidController::new("heater", &config).unwrap();

    pid.set_output(120.0);
    assert_eq!(pid.output(), 100.0);

    pid.set_input(20.0);
    pid.set_mode(Mode::Automatic);
    assert_eq!(pid.state().integral(), 100.0);
    assert_eq!(pid.state().last_input(), 20.0);

    // At setpoint with a steady input the first automatic tick holds the output.
    assert_eq!(pid.control(), 100.0);
}

#[test]
fn failing_sink_never_stops_the_loop() {
    let mut pid = PidController::new("heater", &heater_config()).unwrap();
    let calls = Arc::new(Mutex::new(0));
    let sink_calls = Arc::clone(&calls);
    pid.on_compute(move |_: &PidController, _: f64| -> ControlResult<()> {
        *sink_calls.lock().unwrap() += 1;
        Err(ControlError::sink("downstream unavailable"))
    });
    pid.start();

    let mut outputs = Vec::new();
    for input in [0.0, 5.0, 10.0] {
        pid.set_input(input);
        pid.step();
        outputs.push(pid.output());
    }

    assert_eq!(*calls.lock().unwrap(), 3);
    assert!(outputs.iter().all(|u| (0.0..=100.0).contains(u)));
    assert!(pid.state().integral() > 0.0);
}

#[test]
fn degenerate_limits_pin_output() {
    let mut pid = PidController::new("heater", &heater_config()).unwrap();
    pid.set_limits(200.0, 100.0);
    assert_eq!(pid.state().limits(), (100.0, 100.0));

    pid.set_limits(200.0, 200.0);
    for input in [0.0, 150.0, 400.0] {
        pid.set_input(input);
        assert_eq!(pid.control(), 200.0);
    }
}
