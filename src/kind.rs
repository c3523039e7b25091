//! Node type tags, capability flags and format hints.
//!
//! The kernel packs a [`CtlType`] and a handful of flag bits into one
//! 32-bit word; [`Kind`] keeps that word and exposes typed accessors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Mask selecting the type tag from a packed kind word.
pub const CTLTYPE: u32 = 0xf;
/// Readable.
pub const CTLFLAG_RD: u32 = 0x8000_0000;
/// Writable at runtime.
pub const CTLFLAG_WR: u32 = 0x4000_0000;
/// Settable from the loader before normal operation begins.
pub const CTLFLAG_TUN: u32 = 0x0008_0000;
/// Left out of whole-namespace enumeration.
pub const CTLFLAG_SKIP: u32 = 0x0100_0000;

/// Value type tag of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CtlType {
    /// Interior node, no scalar value.
    Node,
    /// C `int`.
    Int,
    /// NUL-terminated text.
    String,
    /// 64-bit signed (historically QUAD).
    S64,
    /// Opaque structure, optionally described by a format hint.
    Opaque,
    /// C `unsigned int`.
    Uint,
    /// C `long`.
    Long,
    /// C `unsigned long`.
    Ulong,
    /// 64-bit unsigned.
    U64,
    /// 8-bit unsigned.
    U8,
    /// 16-bit unsigned.
    U16,
    /// 8-bit signed.
    S8,
    /// 16-bit signed.
    S16,
    /// 32-bit signed.
    S32,
    /// 32-bit unsigned.
    U32,
    /// Tag this crate does not know.
    Unknown(u32),
}

impl CtlType {
    /// Decode the type tag of a packed kind word.
    pub fn from_raw(raw: u32) -> Self {
        match raw & CTLTYPE {
            1 => Self::Node,
            2 => Self::Int,
            3 => Self::String,
            4 => Self::S64,
            5 => Self::Opaque,
            6 => Self::Uint,
            7 => Self::Long,
            8 => Self::Ulong,
            9 => Self::U64,
            0xa => Self::U8,
            0xb => Self::U16,
            0xc => Self::S8,
            0xd => Self::S16,
            0xe => Self::S32,
            0xf => Self::U32,
            other => Self::Unknown(other),
        }
    }

    /// Kernel numeric tag.
    pub fn to_raw(self) -> u32 {
        match self {
            Self::Node => 1,
            Self::Int => 2,
            Self::String => 3,
            Self::S64 => 4,
            Self::Opaque => 5,
            Self::Uint => 6,
            Self::Long => 7,
            Self::Ulong => 8,
            Self::U64 => 9,
            Self::U8 => 0xa,
            Self::U16 => 0xb,
            Self::S8 => 0xc,
            Self::S16 => 0xd,
            Self::S32 => 0xe,
            Self::U32 => 0xf,
            Self::Unknown(raw) => raw & CTLTYPE,
        }
    }

    /// Byte width of one element for fixed-width integer types.
    pub fn element_width(self) -> Option<usize> {
        match self {
            Self::S8 | Self::U8 => Some(1),
            Self::S16 | Self::U16 => Some(2),
            Self::Int | Self::Uint | Self::S32 | Self::U32 => Some(4),
            Self::Long | Self::Ulong => Some(std::mem::size_of::<libc::c_long>()),
            Self::S64 | Self::U64 => Some(8),
            Self::Node | Self::String | Self::Opaque | Self::Unknown(_) => None,
        }
    }

    /// Whether integer elements of this type are signed.
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Self::Int | Self::Long | Self::S64 | Self::S8 | Self::S16 | Self::S32
        )
    }

    /// Short lowercase label, as printed by `sysctl -t`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Int => "integer",
            Self::String => "string",
            Self::S64 => "int64_t",
            Self::Opaque => "opaque",
            Self::Uint => "unsigned integer",
            Self::Long => "long integer",
            Self::Ulong => "unsigned long",
            Self::U64 => "uint64_t",
            Self::U8 => "uint8_t",
            Self::U16 => "uint16_t",
            Self::S8 => "int8_t",
            Self::S16 => "int16_t",
            Self::S32 => "int32_t",
            Self::U32 => "uint32_t",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for CtlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(raw) => write!(f, "unknown type {raw:#x}"),
            other => f.write_str(other.label()),
        }
    }
}

/// Packed type tag plus capability flags, as returned by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kind(u32);

impl Kind {
    /// Wrap a raw kind word.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Build a kind from a type tag and flag bits.
    pub fn new(ctl_type: CtlType, flags: u32) -> Self {
        Self((flags & !CTLTYPE) | ctl_type.to_raw())
    }

    /// Raw kind word.
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Type tag.
    pub fn ctl_type(self) -> CtlType {
        CtlType::from_raw(self.0)
    }

    /// Whether this is an interior node.
    pub fn is_node(self) -> bool {
        self.ctl_type() == CtlType::Node
    }

    /// Writable at runtime.
    pub fn is_writable(self) -> bool {
        self.0 & CTLFLAG_WR != 0
    }

    /// Settable at boot time.
    pub fn is_tuneable(self) -> bool {
        self.0 & CTLFLAG_TUN != 0
    }

    /// Hidden from whole-namespace walks.
    pub fn is_skipped(self) -> bool {
        self.0 & CTLFLAG_SKIP != 0
    }
}

/// Layout marker the kernel reports for `struct clockinfo`.
pub const CLOCKINFO_FORMAT: &str = "S,clockinfo";

/// Optional textual hint naming the layout of an opaque value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatHint(String);

impl FormatHint {
    /// Wrap a hint string.
    pub fn new(hint: impl Into<String>) -> Self {
        Self(hint.into())
    }

    /// Parse the NUL-terminated hint that trails the kind word.
    pub fn from_c_bytes(raw: &[u8]) -> Self {
        let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
        Self(String::from_utf8_lossy(&raw[..end]).into_owned())
    }

    /// Hint text; empty when absent.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the kernel reported no hint.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the hint names the clock-rate record.
    pub fn is_clockinfo(&self) -> bool {
        self.0 == CLOCKINFO_FORMAT
    }
}
