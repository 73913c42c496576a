//! Lifecycle contract between controllers and the host scheduler.
//!
//! A host calls [`Steppable::start`] once and then [`Steppable::step`] once per
//! sample period. Each step publishes its result to a single registered
//! [`ResultSink`]. Sink failures are caught by [`deliver`] and logged; they
//! never reach the scheduler and never touch controller state.

use crate::error::ControlResult;

/// Periodic control component driven by an external scheduler.
pub trait Steppable {
    /// Called once before periodic stepping begins.
    fn start(&mut self);

    /// Called once per sample period.
    fn step(&mut self);
}

/// Receiver of controller results.
///
/// `C` is the controller type, `T` the result value.
pub trait ResultSink<C: ?Sized, T> {
    /// Accept one result. Returning an error is reported, never propagated.
    fn accept(&mut self, controller: &C, value: T) -> ControlResult<()>;
}

impl<C: ?Sized, T, F> ResultSink<C, T> for F
where
    F: FnMut(&C, T) -> ControlResult<()>,
{
    fn accept(&mut self, controller: &C, value: T) -> ControlResult<()> {
        self(controller, value)
    }
}

/// Sink that discards every result.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl<C: ?Sized, T> ResultSink<C, T> for NoopSink {
    fn accept(&mut self, _controller: &C, _value: T) -> ControlResult<()> {
        Ok(())
    }
}

/// Boxed sink as stored by controllers.
pub type BoxedSink<C, T> = Box<dyn ResultSink<C, T> + Send>;

/// Hand `value` to `sink`, logging any failure.
///
/// Returns `true` when the sink accepted the value.
pub fn deliver<C: ?Sized, T>(
    name: &str,
    sink: &mut dyn ResultSink<C, T>,
    controller: &C,
    value: T,
) -> bool {
    match sink.accept(controller, value) {
        Ok(()) => true,
        Err(err) => {
            tracing::error!(controller = name, error = %err, "result sink failed");
            false
        }
    }
}

/// Single-slot holder for a controller's result sink.
///
/// The sink is moved out while it runs so it can borrow the controller.
pub struct SinkSlot<C: ?Sized, T> {
    sink: Option<BoxedSink<C, T>>,
}

impl<C: ?Sized, T> SinkSlot<C, T> {
    pub fn empty() -> Self {
        Self { sink: None }
    }

    /// Replace the registered sink.
    pub fn set(&mut self, sink: BoxedSink<C, T>) {
        self.sink = Some(sink);
    }

    /// Install a [`NoopSink`] when nothing is registered.
    pub fn ensure(&mut self) {
        if self.sink.is_none() {
            self.sink = Some(Box::new(NoopSink));
        }
    }

    /// Take the sink out of the slot so it can be called with a borrow of
    /// the owning controller. Pair with [`SinkSlot::restore`].
    pub fn take(&mut self) -> Option<BoxedSink<C, T>> {
        self.sink.take()
    }

    /// Put a taken sink back unless a new one was registered meanwhile.
    pub fn restore(&mut self, sink: Option<BoxedSink<C, T>>) {
        if self.sink.is_none() {
            self.sink = sink;
        }
    }
}

impl<C: ?Sized, T> Default for SinkSlot<C, T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<C: ?Sized, T> std::fmt::Debug for SinkSlot<C, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkSlot")
            .field("registered", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ControlError;

    struct Dummy;

    #[test]
    fn deliver_reports_success() {
        let mut seen = Vec::new();
        let mut sink = |_: &Dummy, v: f64| -> ControlResult<()> {
            seen.push(v);
            Ok(())
        };
        assert!(deliver("dummy", &mut sink, &Dummy, 1.5));
        assert_eq!(seen, vec![1.5]);
    }

    #[test]
    fn deliver_swallows_failure() {
        let mut sink =
            |_: &Dummy, _: f64| -> ControlResult<()> { Err(ControlError::sink("boom")) };
        assert!(!deliver("dummy", &mut sink, &Dummy, 1.0));
    }

    #[test]
    fn slot_ensure_installs_noop_once() {
        let mut slot: SinkSlot<Dummy, f64> = SinkSlot::empty();
        assert!(slot.take().is_none());
        slot.ensure();

        let taken = slot.take();
        assert!(taken.is_some());
        assert!(slot.take().is_none());
        slot.restore(taken);
        assert!(slot.take().is_some());
    }
}
