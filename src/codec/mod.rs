//! Type-directed conversion between raw kernel bytes and typed values.

use std::fmt;

use base64::Engine as _;
use serde::{Serialize, Serializer};

mod decode;
mod encode;
mod parse;

pub use decode::decode;
pub use encode::encode;
pub use parse::parse;

/// Decoded value of a leaf node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    /// Text, trimmed at the first NUL.
    Text(String),
    /// One signed integer.
    Int(i64),
    /// One unsigned integer.
    UInt(u64),
    /// Array of signed integers, in buffer order.
    IntList(Vec<i64>),
    /// Array of unsigned integers, in buffer order.
    UIntList(Vec<u64>),
    /// Kernel clock rates.
    Clock(ClockInfo),
    /// Opaque bytes with no known layout.
    Bytes(#[serde(serialize_with = "serialize_base64")] Vec<u8>),
}

impl TypedValue {
    /// Short name of the representation, used in type errors.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Int(_) | Self::UInt(_) => "an integer",
            Self::IntList(_) | Self::UIntList(_) => "an integer list",
            Self::Clock(_) => "a clock record",
            Self::Bytes(_) => "bytes",
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::IntList(values) => write_list(f, values),
            Self::UIntList(values) => write_list(f, values),
            Self::Clock(clock) => write!(f, "{clock}"),
            Self::Bytes(bytes) => {
                f.write_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
            }
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, values: &[T]) -> fmt::Result {
    let mut first = true;
    for value in values {
        if !first {
            f.write_str(" ")?;
        }
        write!(f, "{value}")?;
        first = false;
    }
    Ok(())
}

fn serialize_base64<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
}

/// `struct clockinfo`: kernel clock frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClockInfo {
    /// Clock frequency.
    pub hz: u32,
    /// Micro-seconds per hz tick.
    pub tick: u32,
    /// Profiling clock frequency.
    pub profhz: u32,
    /// Statistics clock frequency.
    pub stathz: u32,
}

impl ClockInfo {
    /// Encoded size: hz, tick, spare, stathz, profhz.
    pub const SIZE: usize = 20;
}

impl fmt::Display for ClockInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ hz = {}, tick = {}, profhz = {}, stathz = {} }}",
            self.hz, self.tick, self.profhz, self.stathz
        )
    }
}
