use crate::error::{Result, SysctlError};
use crate::kind::{CtlType, FormatHint, Kind};

use super::{ClockInfo, TypedValue};

/// Decode raw value bytes according to the node's kind and format hint.
///
/// Fixed-width integer kinds decode as a scalar when the buffer holds
/// exactly one element and as a list otherwise, so a one-element list
/// written through [`super::encode`] reads back as a scalar; the kernel
/// keeps no record of which one was meant. Strings stop at the first NUL. Opaque values decode as [`ClockInfo`] when the hint names
/// that layout and as raw bytes otherwise.
///
/// # Errors
///
/// [`SysctlError::Decode`] when the length is not a whole number of
/// elements, when a clock record is short, or when asked to decode an
/// interior node.
pub fn decode(raw: &[u8], kind: Kind, format: &FormatHint) -> Result<TypedValue> {
    let ctl_type = kind.ctl_type();
    match ctl_type {
        CtlType::Node => Err(SysctlError::Decode {
            kind: ctl_type,
            len: raw.len(),
            reason: "interior nodes have no value",
        }),
        CtlType::String => {
            let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
            Ok(TypedValue::Text(
                String::from_utf8_lossy(&raw[..end]).into_owned(),
            ))
        }
        CtlType::Opaque if format.is_clockinfo() => clockinfo(raw).map(TypedValue::Clock),
        CtlType::Opaque | CtlType::Unknown(_) => Ok(TypedValue::Bytes(raw.to_vec())),
        _ => integers(raw, ctl_type),
    }
}

fn integers(raw: &[u8], ctl_type: CtlType) -> Result<TypedValue> {
    let decode_error = |reason| SysctlError::Decode {
        kind: ctl_type,
        len: raw.len(),
        reason,
    };
    let width = ctl_type
        .element_width()
        .ok_or_else(|| decode_error("not an integer type"))?;
    if raw.len().checked_rem(width) != Some(0) {
        return Err(decode_error("length is not a multiple of the element width"));
    }

    let chunks = raw.chunks_exact(width);
    if ctl_type.is_signed() {
        let mut values = chunks
            .map(|chunk| signed(chunk).ok_or_else(|| decode_error("bad element width")))
            .collect::<Result<Vec<_>>>()?;
        Ok(match values.len() {
            1 => TypedValue::Int(values.remove(0)),
            _ => TypedValue::IntList(values),
        })
    } else {
        let mut values = chunks
            .map(|chunk| unsigned(chunk).ok_or_else(|| decode_error("bad element width")))
            .collect::<Result<Vec<_>>>()?;
        Ok(match values.len() {
            1 => TypedValue::UInt(values.remove(0)),
            _ => TypedValue::UIntList(values),
        })
    }
}

fn signed(chunk: &[u8]) -> Option<i64> {
    Some(match chunk.len() {
        1 => i64::from(i8::from_ne_bytes(chunk.try_into().ok()?)),
        2 => i64::from(i16::from_ne_bytes(chunk.try_into().ok()?)),
        4 => i64::from(i32::from_ne_bytes(chunk.try_into().ok()?)),
        8 => i64::from_ne_bytes(chunk.try_into().ok()?),
        _ => return None,
    })
}

fn unsigned(chunk: &[u8]) -> Option<u64> {
    Some(match chunk.len() {
        1 => u64::from(u8::from_ne_bytes(chunk.try_into().ok()?)),
        2 => u64::from(u16::from_ne_bytes(chunk.try_into().ok()?)),
        4 => u64::from(u32::from_ne_bytes(chunk.try_into().ok()?)),
        8 => u64::from_ne_bytes(chunk.try_into().ok()?),
        _ => return None,
    })
}

fn clockinfo(raw: &[u8]) -> Result<ClockInfo> {
    let field = |offset: usize| -> Option<u32> {
        let end = offset.checked_add(4)?;
        Some(u32::from_ne_bytes(raw.get(offset..end)?.try_into().ok()?))
    };
    let short = || SysctlError::Decode {
        kind: CtlType::Opaque,
        len: raw.len(),
        reason: "too short for struct clockinfo",
    };
    // hz, tick, spare, stathz, profhz
    Ok(ClockInfo {
        hz: field(0).ok_or_else(short)?,
        tick: field(4).ok_or_else(short)?,
        stathz: field(12).ok_or_else(short)?,
        profhz: field(16).ok_or_else(short)?,
    })
}
