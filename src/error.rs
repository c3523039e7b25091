//! Error taxonomy shared by every layer of the crate.

use std::fmt;

use crate::kind::CtlType;

/// Raw platform error number reported by a kernel call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Errno(pub i32);

impl Errno {
    /// Buffer too small for the value.
    pub const ENOMEM: Self = Self(libc::ENOMEM);
    /// Path denotes an interior node.
    pub const EISDIR: Self = Self(libc::EISDIR);
    /// No such entry, or end of namespace.
    pub const ENOENT: Self = Self(libc::ENOENT);
    /// Incomplete path.
    pub const ENOTDIR: Self = Self(libc::ENOTDIR);
    /// Operation not supported.
    pub const EOPNOTSUPP: Self = Self(libc::EOPNOTSUPP);
    /// Permission denied by the kernel.
    pub const EPERM: Self = Self(libc::EPERM);
    /// Invalid argument.
    pub const EINVAL: Self = Self(libc::EINVAL);

    /// Capture `errno` left behind by the last failed libc call.
    pub fn last() -> Self {
        Self(
            std::io::Error::last_os_error()
                .raw_os_error()
                .unwrap_or(libc::EIO),
        )
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", std::io::Error::from_raw_os_error(self.0))
    }
}

/// Errors produced by namespace queries, codec validation and enumeration.
#[derive(Debug, thiserror::Error)]
pub enum SysctlError {
    /// Reverse name lookup found no matching path.
    #[error("no such sysctl: {0}")]
    NotFound(String),

    /// Operation is not available for this node or platform.
    #[error("operation not supported: {0}")]
    Unsupported(String),

    /// Write attempted on a read-only (or boot-time only) node.
    #[error("sysctl is not writable: {0}")]
    NotWritable(String),

    /// Supplied value does not have the representation the kind requires.
    #[error("invalid type: {kind} does not accept {got}")]
    TypeMismatch {
        /// Kind of the target node.
        kind: CtlType,
        /// Short description of the value that was supplied.
        got: &'static str,
    },

    /// Integer does not fit the kind's element width.
    #[error("value {value} out of range for {kind}")]
    OutOfRange {
        /// Kind of the target node.
        kind: CtlType,
        /// Offending value, rendered as text to cover both signednesses.
        value: String,
    },

    /// Kernel reported an incomplete or invalid path.
    #[error("specification is incomplete: {0}")]
    MalformedPath(String),

    /// Kernel rejected the value type on write.
    #[error("type is unknown to this program: {0}")]
    UnknownType(String),

    /// Raw bytes are inconsistent with the declared kind.
    #[error("cannot decode {len} bytes as {kind}: {reason}")]
    Decode {
        /// Declared kind.
        kind: CtlType,
        /// Length of the raw buffer.
        len: usize,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// Value kept growing past the configured buffer ceiling.
    #[error("value for {path} exceeds buffer limit of {limit} bytes")]
    BufferLimit {
        /// Dotted numeric path being read.
        path: String,
        /// Configured ceiling.
        limit: usize,
    },

    /// Blocking task running a kernel call did not complete.
    #[error("blocking sysctl task failed: {0}")]
    Task(String),

    /// Any other kernel failure.
    #[error("sysctl failed for {path}: {errno}")]
    KernelIo {
        /// Dotted numeric path being queried.
        path: String,
        /// Underlying error number.
        errno: Errno,
    },
}

impl SysctlError {
    /// Platform error number, when the failure came straight from the kernel.
    pub fn errno(&self) -> Option<Errno> {
        match self {
            Self::KernelIo { errno, .. } => Some(*errno),
            _ => None,
        }
    }

    /// Whether callers may degrade gracefully instead of failing.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SysctlError>;
