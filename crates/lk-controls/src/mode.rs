//! Operating mode and action direction tags.
//!
//! Both tags are closed two-variant enums. Decoding from raw numeric codes or
//! names never fails: anything that is not the primary variant falls back to
//! the other one (`Manual` for modes, `Reverse` for directions).

use serde::{Deserialize, Serialize};

/// Raw tag as it may appear in configuration or in a remote command.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TagRepr {
    Code(i64),
    Name(String),
}

/// Controller operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "TagRepr")]
pub enum Mode {
    /// Output is computed by the PID loop.
    Automatic,
    /// Output is held by the host.
    #[default]
    Manual,
}

impl Mode {
    /// Numeric code for `Automatic`.
    pub const AUTOMATIC_TAG: i64 = 0;
    /// Numeric code for `Manual`.
    pub const MANUAL_TAG: i64 = 1;

    /// Decode a numeric mode code. Unknown codes map to `Manual`.
    pub fn from_tag(tag: i64) -> Self {
        if tag == Self::AUTOMATIC_TAG {
            Self::Automatic
        } else {
            Self::Manual
        }
    }

    /// Decode a mode name. Unknown names map to `Manual`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "automatic" | "auto" => Self::Automatic,
            _ => Self::Manual,
        }
    }

    pub fn is_automatic(&self) -> bool {
        matches!(self, Self::Automatic)
    }
}

impl From<TagRepr> for Mode {
    fn from(repr: TagRepr) -> Self {
        match repr {
            TagRepr::Code(code) => Self::from_tag(code),
            TagRepr::Name(name) => Self::from_name(&name),
        }
    }
}

/// Controller action direction.
///
/// Applied as a sign on the raw PID sum: `Direct` keeps it, `Reverse` negates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "TagRepr")]
pub enum Direction {
    #[default]
    Direct,
    Reverse,
}

impl Direction {
    /// Numeric code for `Direct`.
    pub const DIRECT_TAG: i64 = 0;
    /// Numeric code for `Reverse`.
    pub const REVERSE_TAG: i64 = 1;

    /// Decode a numeric direction code. Unknown codes map to `Reverse`.
    pub fn from_tag(tag: i64) -> Self {
        if tag == Self::DIRECT_TAG {
            Self::Direct
        } else {
            Self::Reverse
        }
    }

    /// Decode a direction name. Unknown names map to `Reverse`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "direct" => Self::Direct,
            _ => Self::Reverse,
        }
    }

    /// Multiplier applied to the raw PID sum.
    pub fn sign(&self) -> f64 {
        match self {
            Self::Direct => 1.0,
            Self::Reverse => -1.0,
        }
    }
}

impl From<TagRepr> for Direction {
    fn from(repr: TagRepr) -> Self {
        match repr {
            TagRepr::Code(code) => Self::from_tag(code),
            TagRepr::Name(name) => Self::from_name(&name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_tags() {
        assert_eq!(Mode::from_tag(0), Mode::Automatic);
        assert_eq!(Mode::from_tag(1), Mode::Manual);
        assert_eq!(Mode::from_tag(42), Mode::Manual);
        assert_eq!(Mode::from_name("AUTOMATIC"), Mode::Automatic);
        assert_eq!(Mode::from_name("bogus"), Mode::Manual);
    }

    #[test]
    fn direction_tags() {
        assert_eq!(Direction::from_tag(0), Direction::Direct);
        assert_eq!(Direction::from_tag(1), Direction::Reverse);
        assert_eq!(Direction::from_tag(-7), Direction::Reverse);
        assert_eq!(Direction::from_name("Direct"), Direction::Direct);
        assert_eq!(Direction::from_name("sideways"), Direction::Reverse);
        assert_eq!(Direction::Direct.sign(), 1.0);
        assert_eq!(Direction::Reverse.sign(), -1.0);
    }

    #[test]
    fn lenient_deserialization() {
        let mode: Mode = serde_json::from_str("\"automatic\"").unwrap();
        assert_eq!(mode, Mode::Automatic);
        let mode: Mode = serde_json::from_str("0").unwrap();
        assert_eq!(mode, Mode::Automatic);
        let mode: Mode = serde_json::from_str("\"whatever\"").unwrap();
        assert_eq!(mode, Mode::Manual);

        let dir: Direction = serde_json::from_str("\"reverse\"").unwrap();
        assert_eq!(dir, Direction::Reverse);
        let dir: Direction = serde_json::from_str("3").unwrap();
        assert_eq!(dir, Direction::Reverse);
    }

    #[test]
    fn serializes_as_names() {
        assert_eq!(serde_json::to_string(&Mode::Automatic).unwrap(), "\"automatic\"");
        assert_eq!(serde_json::to_string(&Direction::Reverse).unwrap(), "\"reverse\"");
    }
}
