//! File mode value rendered in base 8.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// Numeric file mode that displays in octal, e.g. `0660`.
///
/// The wrapped value is the mode itself; only its rendering changes.
/// Deserialization accepts plain integers and octal literals (`01750`,
/// `0o1750`). Serde serialization emits the plain integer; app metadata
/// rewrites it to the octal literal when rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OctalMode(u32);

impl OctalMode {
    pub const fn new(mode: u32) -> Self {
        Self(mode)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    /// Parses `01750` or `0o1750`; plain decimal text is rejected.
    pub fn parse_literal(text: &str) -> Option<Self> {
        let digits = text
            .strip_prefix("0o")
            .or_else(|| text.strip_prefix('0'))?;
        if digits.is_empty() {
            return Some(Self(0));
        }
        u32::from_str_radix(digits, 8).ok().map(Self)
    }
}

impl From<u32> for OctalMode {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl Display for OctalMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "0{:o}", self.0)
    }
}

impl Serialize for OctalMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}

impl<'de> Deserialize<'de> for OctalMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(OctalModeVisitor)
    }
}

struct OctalModeVisitor;

impl<'de> Visitor<'de> for OctalModeVisitor {
    type Value = OctalMode;

    fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("a file mode as an integer or an octal literal")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<OctalMode, E> {
        u32::try_from(value)
            .map(OctalMode)
            .map_err(|_| E::custom(format!("file mode {value} is out of range")))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<OctalMode, E> {
        u32::try_from(value)
            .map(OctalMode)
            .map_err(|_| E::custom(format!("file mode {value} is out of range")))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<OctalMode, E> {
        OctalMode::parse_literal(value)
            .ok_or_else(|| E::custom(format!("invalid octal file mode `{value}`")))
    }
}
