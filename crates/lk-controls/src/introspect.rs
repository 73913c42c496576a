//! Attribute snapshots and named commands for external management layers.
//!
//! Controllers expose a serializable read snapshot and a small set of named
//! mutators. No transport is provided; hosts decide how names and arguments
//! reach [`Introspect::execute`].

use serde::Serialize;

use crate::error::{ControlError, ControlResult};

/// Inspection and command surface of a controller.
pub trait Introspect {
    /// Read snapshot type.
    type Attributes: Serialize;

    /// Current attribute values.
    fn attributes(&self) -> Self::Attributes;

    /// Names accepted by [`Introspect::execute`].
    fn command_names(&self) -> &'static [&'static str];

    /// Run a named command with numeric arguments.
    ///
    /// # Errors
    ///
    /// Returns error for unknown names and wrong argument counts.
    fn execute(&mut self, command: &str, args: &[f64]) -> ControlResult<()>;
}

/// Check the argument count of a command.
pub fn expect_args(command: &str, args: &[f64], expected: usize) -> ControlResult<()> {
    if args.len() != expected {
        return Err(ControlError::CommandArity {
            name: command.to_string(),
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

/// Render a controller's attributes as JSON.
pub fn attributes_json<I: Introspect>(controller: &I) -> ControlResult<serde_json::Value> {
    Ok(serde_json::to_value(controller.attributes())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_check() {
        assert!(expect_args("x", &[1.0, 2.0], 2).is_ok());
        let err = expect_args("x", &[], 1).unwrap_err();
        assert_eq!(err.to_string(), "Command x expects 1 argument(s), got 0");
    }
}
