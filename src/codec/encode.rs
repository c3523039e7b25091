use crate::error::{Result, SysctlError};
use crate::kind::{CtlType, FormatHint, Kind};

use super::{ClockInfo, TypedValue};

/// Encode `value` for writing to a node of `kind`.
///
/// Checks run in order: the kind must be writable, then the value's
/// representation must match the kind. Text is written without a
/// trailing NUL; opaque bytes are copied verbatim. A [`ClockInfo`] is
/// only accepted when `format` names the clock layout. Integers are range
/// checked against the element width and lists are encoded element-wise.
///
/// # Errors
///
/// [`SysctlError::NotWritable`], [`SysctlError::TypeMismatch`] (also for
/// interior nodes and kinds this crate does not know) and
/// [`SysctlError::OutOfRange`].
pub fn encode(value: &TypedValue, kind: Kind, format: &FormatHint) -> Result<Vec<u8>> {
    let ctl_type = kind.ctl_type();
    if !kind.is_writable() {
        return Err(SysctlError::NotWritable(format!("{ctl_type} node is read-only")));
    }
    let mismatch = || SysctlError::TypeMismatch {
        kind: ctl_type,
        got: value.shape(),
    };

    match (ctl_type, value) {
        (CtlType::String, TypedValue::Text(text)) => Ok(text.as_bytes().to_vec()),
        (CtlType::String, _) => Err(mismatch()),
        (CtlType::Opaque, TypedValue::Bytes(bytes)) => Ok(bytes.clone()),
        (CtlType::Opaque, TypedValue::Clock(clock)) if format.is_clockinfo() => {
            Ok(clockinfo(clock))
        }
        (CtlType::Opaque, _) => Err(mismatch()),
        (CtlType::Node | CtlType::Unknown(_), _) => Err(mismatch()),
        (_, TypedValue::Int(v)) => integers(ctl_type, &[i128::from(*v)]),
        (_, TypedValue::UInt(v)) => integers(ctl_type, &[i128::from(*v)]),
        (_, TypedValue::IntList(values)) => {
            integers(ctl_type, &values.iter().copied().map(i128::from).collect::<Vec<_>>())
        }
        (_, TypedValue::UIntList(values)) => {
            integers(ctl_type, &values.iter().copied().map(i128::from).collect::<Vec<_>>())
        }
        (_, TypedValue::Text(_) | TypedValue::Bytes(_) | TypedValue::Clock(_)) => Err(mismatch()),
    }
}

fn integers(ctl_type: CtlType, values: &[i128]) -> Result<Vec<u8>> {
    let width = ctl_type.element_width().ok_or(SysctlError::TypeMismatch {
        kind: ctl_type,
        got: "an integer",
    })?;
    let mut out = Vec::with_capacity(width.saturating_mul(values.len()));
    for value in values {
        put(&mut out, *value, ctl_type.is_signed(), width).ok_or_else(|| {
            SysctlError::OutOfRange {
                kind: ctl_type,
                value: value.to_string(),
            }
        })?;
    }
    Ok(out)
}

fn put(out: &mut Vec<u8>, value: i128, signed: bool, width: usize) -> Option<()> {
    match (signed, width) {
        (true, 1) => out.extend(i8::try_from(value).ok()?.to_ne_bytes()),
        (true, 2) => out.extend(i16::try_from(value).ok()?.to_ne_bytes()),
        (true, 4) => out.extend(i32::try_from(value).ok()?.to_ne_bytes()),
        (true, 8) => out.extend(i64::try_from(value).ok()?.to_ne_bytes()),
        (false, 1) => out.extend(u8::try_from(value).ok()?.to_ne_bytes()),
        (false, 2) => out.extend(u16::try_from(value).ok()?.to_ne_bytes()),
        (false, 4) => out.extend(u32::try_from(value).ok()?.to_ne_bytes()),
        (false, 8) => out.extend(u64::try_from(value).ok()?.to_ne_bytes()),
        _ => return None,
    }
    Some(())
}

fn clockinfo(clock: &ClockInfo) -> Vec<u8> {
    let mut out = Vec::with_capacity(ClockInfo::SIZE);
    for field in [clock.hz, clock.tick, 0, clock.stathz, clock.profhz] {
        out.extend(field.to_ne_bytes());
    }
    out
}
