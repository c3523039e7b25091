//! Buffered kernel query: size probe, fetch, and the resize-retry loop.
//!
//! The kernel never promises that a value keeps the size it reported on
//! the probe. A fetch that comes back `ENOMEM` means the value grew in
//! between, so the buffer is enlarged and the fetch repeated until it
//! fits or the configured ceiling is reached.

use serde::Deserialize;
use tracing::{debug, trace};

use crate::error::{Errno, SysctlError};
use crate::kernel::Kernel;
use crate::oid::Oid;

/// Bounds for the resize-retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct QueryLimits {
    /// Largest buffer the loop will allocate before giving up.
    #[serde(default = "default_max_buffer_bytes")]
    pub max_buffer_bytes: usize,

    /// Extra bytes allocated beyond the probed size.
    #[serde(default = "default_headroom_bytes")]
    pub headroom_bytes: usize,

    /// Double the probed size up front to absorb small races.
    #[serde(default = "default_probe_doubling")]
    pub probe_doubling: bool,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            max_buffer_bytes: default_max_buffer_bytes(),
            headroom_bytes: default_headroom_bytes(),
            probe_doubling: default_probe_doubling(),
        }
    }
}

fn default_max_buffer_bytes() -> usize {
    4_194_304
}
fn default_headroom_bytes() -> usize {
    16
}
fn default_probe_doubling() -> bool {
    true
}

/// Outcome of a read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    /// Leaf value bytes, exactly as long as the kernel reported.
    Value(Vec<u8>),
    /// The path is an interior node and has no value.
    Container,
}

/// Low-level failure of a single query, before it is given a meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryError {
    /// Kernel call failed.
    Kernel(Errno),
    /// Value outgrew [`QueryLimits::max_buffer_bytes`].
    BufferLimit(usize),
}

impl QueryError {
    /// Generic mapping used when the caller has no special case for the errno.
    pub fn into_error(self, name: &[i32]) -> SysctlError {
        let path = Oid::from(name).to_string();
        match self {
            Self::Kernel(Errno::ENOTDIR) => SysctlError::MalformedPath(path),
            Self::Kernel(errno) => SysctlError::KernelIo { path, errno },
            Self::BufferLimit(limit) => SysctlError::BufferLimit { path, limit },
        }
    }

    /// Mapping for write failures.
    pub fn into_write_error(self, name: &[i32]) -> SysctlError {
        let path = Oid::from(name).to_string();
        match self {
            Self::Kernel(Errno::EOPNOTSUPP) => {
                SysctlError::Unsupported(format!("value is not available: {path}"))
            }
            Self::Kernel(Errno::ENOMEM) => SysctlError::UnknownType(path),
            other => other.into_error(name),
        }
    }
}

/// Read the value at `name`, passing `input` on every call when given.
///
/// `EISDIR` at any point yields [`Fetched::Container`]. Any error other
/// than `ENOMEM` on a fetch is returned unchanged. Only the size the
/// kernel reports, or an `ENOMEM` on a buffer already at the ceiling,
/// counts against [`QueryLimits::max_buffer_bytes`]; the doubling and
/// growth guesses are clamped to it.
///
/// # Errors
///
/// [`QueryError::Kernel`] for kernel failures, [`QueryError::BufferLimit`]
/// when the value does not fit under the ceiling.
pub fn read(
    kernel: &dyn Kernel,
    name: &[i32],
    input: Option<&[u8]>,
    limits: &QueryLimits,
) -> Result<Fetched, QueryError> {
    let mut needed = match kernel.sysctl(name, None, input) {
        Ok(size) => size,
        Err(Errno::EISDIR) => return Ok(Fetched::Container),
        Err(errno) => return Err(QueryError::Kernel(errno)),
    };
    // Heuristic size guess, never more than the ceiling.
    let mut guess = if limits.probe_doubling {
        needed.saturating_mul(2)
    } else {
        needed
    };

    loop {
        if needed > limits.max_buffer_bytes {
            return Err(QueryError::BufferLimit(limits.max_buffer_bytes));
        }
        let capacity = guess
            .max(needed)
            .saturating_add(limits.headroom_bytes)
            .clamp(1, limits.max_buffer_bytes.max(1));
        let mut buf = vec![0_u8; capacity];
        match kernel.sysctl(name, Some(&mut buf), input) {
            Ok(len) => {
                buf.truncate(len);
                trace!(path = ?name, len, "fetched value");
                return Ok(Fetched::Value(buf));
            }
            Err(Errno::EISDIR) => return Ok(Fetched::Container),
            Err(Errno::ENOMEM) => {
                // The value did not fit in the largest buffer allowed.
                if capacity >= limits.max_buffer_bytes {
                    return Err(QueryError::BufferLimit(limits.max_buffer_bytes));
                }
                needed = match kernel.sysctl(name, None, input) {
                    Ok(probed) => probed,
                    Err(Errno::EISDIR) => return Ok(Fetched::Container),
                    Err(errno) => return Err(QueryError::Kernel(errno)),
                };
                guess = capacity.saturating_mul(2);
                debug!(path = ?name, capacity, needed, "value grew during fetch, retrying");
            }
            Err(errno) => return Err(QueryError::Kernel(errno)),
        }
    }
}

/// Write `bytes` as the new value of `name`.
///
/// # Errors
///
/// [`QueryError::Kernel`] when the kernel rejects the write.
pub fn write(kernel: &dyn Kernel, name: &[i32], bytes: &[u8]) -> Result<(), QueryError> {
    kernel
        .sysctl(name, None, Some(bytes))
        .map(|_| ())
        .map_err(QueryError::Kernel)
}
