//! Time-of-day interval controller.
//!
//! Tracks whether the local time falls inside any of a set of daily
//! intervals and notifies a sink whenever that membership changes.
//!
//! Interval bounds are written as `H[:MM][ ][am|pm|a|p]`, e.g. `"7"`,
//! `"7:30"`, `"7:30p"`, `"19:05"`. An interval whose end is before its start
//! spans midnight. Both bounds are exclusive.

use chrono::{Local, NaiveTime};

use crate::config::{IntervalSpec, TimeIntervalConfig};
use crate::error::{ControlError, ControlResult};
use crate::lifecycle::{ResultSink, SinkSlot, Steppable, deliver};

/// Source of the current time of day.
pub trait Clock {
    fn time_of_day(&self) -> NaiveTime;
}

/// Local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn time_of_day(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Clock pinned to a settable time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    time: NaiveTime,
}

impl FixedClock {
    pub fn new(time: NaiveTime) -> Self {
        Self { time }
    }

    pub fn set(&mut self, time: NaiveTime) {
        self.time = time;
    }
}

impl Clock for FixedClock {
    fn time_of_day(&self) -> NaiveTime {
        self.time
    }
}

/// Parse a time-of-day string.
///
/// # Errors
///
/// Returns error if the string is not of the form `H[:MM][ ][am|pm|a|p]` or
/// names an impossible time.
pub fn parse_time_of_day(text: &str) -> ControlResult<NaiveTime> {
    let invalid = || ControlError::InvalidTime {
        what: text.to_string(),
    };
    let trimmed = text.trim();

    let hour_len = trimmed.bytes().take_while(u8::is_ascii_digit).count();
    if hour_len == 0 || hour_len > 2 {
        return Err(invalid());
    }
    let mut hour: u32 = trimmed[..hour_len].parse().map_err(|_| invalid())?;
    let mut rest = &trimmed[hour_len..];

    let mut minute = 0;
    if let Some(after_colon) = rest.strip_prefix(':') {
        let digits = after_colon.get(..2).ok_or_else(invalid)?;
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        minute = digits.parse().map_err(|_| invalid())?;
        rest = &after_colon[2..];
    }

    match rest.trim_start().to_ascii_lowercase().as_str() {
        "" => {}
        "a" | "am" => {
            if !(1..=12).contains(&hour) {
                return Err(invalid());
            }
            if hour == 12 {
                hour = 0;
            }
        }
        "p" | "pm" => {
            if !(1..=12).contains(&hour) {
                return Err(invalid());
            }
            if hour < 12 {
                hour += 12;
            }
        }
        _ => return Err(invalid()),
    }

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// Daily time interval with exclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeInterval {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn parse(spec: &IntervalSpec) -> ControlResult<Self> {
        Ok(Self::new(
            parse_time_of_day(&spec.start)?,
            parse_time_of_day(&spec.end)?,
        ))
    }

    /// `true` when the interval wraps past midnight.
    pub fn spans_midnight(&self) -> bool {
        self.end < self.start
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.spans_midnight() {
            time > self.start || time < self.end
        } else {
            time > self.start && time < self.end
        }
    }
}

/// Reports membership of the current time in a set of daily intervals.
#[derive(Debug)]
pub struct TimeIntervalController<K: Clock = SystemClock> {
    name: String,
    intervals: Vec<TimeInterval>,
    clock: K,
    in_interval: bool,
    on_start: SinkSlot<TimeIntervalController<K>, bool>,
    on_tick: SinkSlot<TimeIntervalController<K>, bool>,
}

impl TimeIntervalController<SystemClock> {
    /// Create a controller reading the local wall clock.
    pub fn new(name: impl Into<String>, config: &TimeIntervalConfig) -> ControlResult<Self> {
        Self::with_clock(name, config, SystemClock)
    }
}

impl<K: Clock> TimeIntervalController<K> {
    /// Create a controller reading `clock`.
    ///
    /// # Errors
    ///
    /// Returns error if any interval bound cannot be parsed.
    pub fn with_clock(
        name: impl Into<String>,
        config: &TimeIntervalConfig,
        clock: K,
    ) -> ControlResult<Self> {
        let intervals = config
            .intervals
            .iter()
            .map(TimeInterval::parse)
            .collect::<ControlResult<Vec<_>>>()?;
        let name = name.into();
        let in_interval = Self::evaluate(&intervals, clock.time_of_day());
        tracing::debug!(
            controller = %name,
            intervals = intervals.len(),
            in_interval,
            "time intervals parsed"
        );
        Ok(Self {
            name,
            intervals,
            clock,
            in_interval,
            on_start: SinkSlot::empty(),
            on_tick: SinkSlot::empty(),
        })
    }

    fn evaluate(intervals: &[TimeInterval], time: NaiveTime) -> bool {
        intervals.iter().any(|interval| interval.contains(time))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn intervals(&self) -> &[TimeInterval] {
        &self.intervals
    }

    /// Membership as of the last evaluation.
    pub fn in_interval(&self) -> bool {
        self.in_interval
    }

    pub fn clock_mut(&mut self) -> &mut K {
        &mut self.clock
    }

    /// Register the sink told the current membership on start.
    pub fn is_in_interval<S>(&mut self, sink: S)
    where
        S: ResultSink<TimeIntervalController<K>, bool> + Send + 'static,
    {
        self.on_start.set(Box::new(sink));
    }

    /// Register the sink told about membership changes.
    pub fn on_tick<S>(&mut self, sink: S)
    where
        S: ResultSink<TimeIntervalController<K>, bool> + Send + 'static,
    {
        self.on_tick.set(Box::new(sink));
    }

    /// Re-evaluate membership; notifies the tick sink only on change.
    pub fn control(&mut self) -> bool {
        let in_interval = Self::evaluate(&self.intervals, self.clock.time_of_day());
        if in_interval != self.in_interval {
            tracing::debug!(controller = %self.name, in_interval, "interval membership changed");
            self.in_interval = in_interval;
            self.tick();
        }
        in_interval
    }

    fn tick(&mut self) {
        let value = self.in_interval;
        let mut sink = self.on_tick.take();
        if let Some(sink) = sink.as_mut() {
            deliver(&self.name, &mut **sink, self, value);
        }
        self.on_tick.restore(sink);
    }
}

impl<K: Clock> Steppable for TimeIntervalController<K> {
    fn start(&mut self) {
        tracing::info!(
            controller = %self.name,
            in_interval = self.in_interval,
            "time interval controller started"
        );
        let value = self.in_interval;
        let mut sink = self.on_start.take();
        if let Some(sink) = sink.as_mut() {
            deliver(&self.name, &mut **sink, self, value);
        }
        self.on_start.restore(sink);
    }

    fn step(&mut self) {
        self.control();
    }
}
