//! Meta-path queries: facts about a path rather than its value.

use crate::error::{Errno, Result, SysctlError};
use crate::kernel::{
    Kernel, CTL_SYSCTL, CTL_SYSCTL_NAME, CTL_SYSCTL_NAME2OID, CTL_SYSCTL_NEXT,
    CTL_SYSCTL_NEXTNOSKIP, CTL_SYSCTL_OIDDESCR, CTL_SYSCTL_OIDFMT,
};
use crate::kind::{FormatHint, Kind};
use crate::oid::Oid;
use crate::query::{self, Fetched, QueryError, QueryLimits};

/// Kind word and format hint of `oid`.
///
/// # Errors
///
/// [`SysctlError::NotFound`] when the path does not exist, otherwise the
/// kernel failure.
pub fn kind(kernel: &dyn Kernel, limits: &QueryLimits, oid: &Oid) -> Result<(Kind, FormatHint)> {
    let name = oid.prefixed(&[CTL_SYSCTL, CTL_SYSCTL_OIDFMT]);
    let raw = match query::read(kernel, &name, None, limits) {
        Err(QueryError::Kernel(Errno::ENOENT)) => {
            return Err(SysctlError::NotFound(oid.to_string()))
        }
        other => value(other, oid)?,
    };
    let word: [u8; 4] = raw
        .get(..4)
        .and_then(|head| head.try_into().ok())
        .ok_or_else(|| SysctlError::MalformedPath(format!("{oid}: short kind record")))?;
    Ok((
        Kind::from_raw(u32::from_ne_bytes(word)),
        FormatHint::from_c_bytes(&raw[4..]),
    ))
}

/// Dotted display name of `oid`.
///
/// # Errors
///
/// [`SysctlError::NotFound`] when the path does not exist, otherwise the
/// kernel failure.
pub fn name(kernel: &dyn Kernel, limits: &QueryLimits, oid: &Oid) -> Result<String> {
    let name = oid.prefixed(&[CTL_SYSCTL, CTL_SYSCTL_NAME]);
    match query::read(kernel, &name, None, limits) {
        Err(QueryError::Kernel(Errno::ENOENT)) => Err(SysctlError::NotFound(oid.to_string())),
        other => value(other, oid).map(|raw| c_text(&raw)),
    }
}

/// Numeric path of a dotted name.
///
/// # Errors
///
/// [`SysctlError::NotFound`] when no node carries that name, otherwise
/// the kernel failure.
pub fn oid(kernel: &dyn Kernel, limits: &QueryLimits, dotted: &str) -> Result<Oid> {
    if dotted.is_empty() {
        return Err(SysctlError::NotFound(String::new()));
    }
    let name = [CTL_SYSCTL, CTL_SYSCTL_NAME2OID];
    match query::read(kernel, &name, Some(dotted.as_bytes()), limits) {
        Err(QueryError::Kernel(Errno::ENOENT)) => Err(SysctlError::NotFound(dotted.to_owned())),
        other => {
            let found = Oid::from_ne_bytes(&value(other, &Oid::from(&name[..]))?);
            if found.is_empty() {
                return Err(SysctlError::NotFound(dotted.to_owned()));
            }
            Ok(found)
        }
    }
}

/// Description text of `oid`; empty when the node has none.
///
/// # Errors
///
/// [`SysctlError::Unsupported`] when the platform has no descriptions,
/// otherwise the kernel failure.
pub fn description(kernel: &dyn Kernel, limits: &QueryLimits, oid: &Oid) -> Result<String> {
    let name = oid.prefixed(&[CTL_SYSCTL, CTL_SYSCTL_OIDDESCR]);
    match query::read(kernel, &name, None, limits) {
        Err(QueryError::Kernel(Errno::ENOENT)) => Ok(String::new()),
        Err(QueryError::Kernel(Errno::EOPNOTSUPP)) => Err(SysctlError::Unsupported(format!(
            "descriptions are not available for {oid}"
        ))),
        other => value(other, oid).map(|raw| c_text(&raw)),
    }
}

/// Next leaf after `oid` in namespace order, `None` at the end.
///
/// Entries the kernel marks as skipped are passed over.
///
/// # Errors
///
/// Any kernel failure other than end-of-namespace.
pub fn next(kernel: &dyn Kernel, limits: &QueryLimits, oid: &Oid) -> Result<Option<Oid>> {
    next_with(kernel, limits, oid, CTL_SYSCTL_NEXT)
}

/// Like [`next`], but also returns entries marked as skipped.
///
/// # Errors
///
/// Any kernel failure other than end-of-namespace.
pub fn next_noskip(kernel: &dyn Kernel, limits: &QueryLimits, oid: &Oid) -> Result<Option<Oid>> {
    next_with(kernel, limits, oid, CTL_SYSCTL_NEXTNOSKIP)
}

fn next_with(
    kernel: &dyn Kernel,
    limits: &QueryLimits,
    oid: &Oid,
    selector: i32,
) -> Result<Option<Oid>> {
    let name = oid.prefixed(&[CTL_SYSCTL, selector]);
    match query::read(kernel, &name, None, limits) {
        Err(QueryError::Kernel(Errno::ENOENT)) => Ok(None),
        other => {
            let found = Oid::from_ne_bytes(&value(other, oid)?);
            Ok((!found.is_empty()).then_some(found))
        }
    }
}

fn value(
    fetched: std::result::Result<Fetched, QueryError>,
    oid: &Oid,
) -> Result<Vec<u8>> {
    match fetched {
        Ok(Fetched::Value(raw)) => Ok(raw),
        Ok(Fetched::Container) => Err(SysctlError::MalformedPath(format!(
            "{oid}: meta query answered as a container"
        ))),
        Err(err) => Err(err.into_error(oid.as_slice())),
    }
}

fn c_text(raw: &[u8]) -> String {
    let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}
