use base64::Engine as _;

use crate::error::{Result, SysctlError};
use crate::kind::{CtlType, Kind};

use super::TypedValue;

/// Interpret command-line text as a value for a node of `kind`.
///
/// Integers accept decimal or `0x` hex, and several separated by commas
/// or whitespace form a list. Opaque values are base64. Strings are taken
/// verbatim.
///
/// # Errors
///
/// [`SysctlError::TypeMismatch`] when the text cannot represent a value of
/// that kind.
pub fn parse(text: &str, kind: Kind) -> Result<TypedValue> {
    let ctl_type = kind.ctl_type();
    let unparseable = || SysctlError::TypeMismatch {
        kind: ctl_type,
        got: "unparseable text",
    };
    match ctl_type {
        CtlType::String => Ok(TypedValue::Text(text.to_owned())),
        CtlType::Opaque => base64::engine::general_purpose::STANDARD
            .decode(text.trim())
            .map(TypedValue::Bytes)
            .map_err(|_| unparseable()),
        CtlType::Node | CtlType::Unknown(_) => Err(SysctlError::TypeMismatch {
            kind: ctl_type,
            got: "text",
        }),
        _ => {
            let parts: Vec<&str> = text
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|part| !part.is_empty())
                .collect();
            if parts.is_empty() {
                return Err(unparseable());
            }
            if ctl_type.is_signed() {
                let mut values = parts
                    .iter()
                    .map(|part| signed(part).ok_or_else(unparseable))
                    .collect::<Result<Vec<_>>>()?;
                Ok(match values.len() {
                    1 => TypedValue::Int(values.remove(0)),
                    _ => TypedValue::IntList(values),
                })
            } else {
                let mut values = parts
                    .iter()
                    .map(|part| unsigned(part).ok_or_else(unparseable))
                    .collect::<Result<Vec<_>>>()?;
                Ok(match values.len() {
                    1 => TypedValue::UInt(values.remove(0)),
                    _ => TypedValue::UIntList(values),
                })
            }
        }
    }
}

fn signed(part: &str) -> Option<i64> {
    let (negative, digits) = match part.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, part),
    };
    let magnitude = i128::from(unsigned(digits)?);
    let value = if negative {
        magnitude.checked_neg()?
    } else {
        magnitude
    };
    i64::try_from(value).ok()
}

fn unsigned(part: &str) -> Option<u64> {
    match part
        .strip_prefix("0x")
        .or_else(|| part.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => part.parse().ok(),
    }
}
