//! The kernel seam: one get/set primitive and its backends.

use std::fmt;

use crate::error::Errno;

pub mod mock;
pub mod native;

pub use mock::MockKernel;
pub use native::NativeKernel;

/// Meta-path root: queries about other paths live under it.
pub const CTL_SYSCTL: i32 = 0;
/// Dotted name of a path.
pub const CTL_SYSCTL_NAME: i32 = 1;
/// Next leaf after a path, in namespace order.
pub const CTL_SYSCTL_NEXT: i32 = 2;
/// Path of a dotted name.
pub const CTL_SYSCTL_NAME2OID: i32 = 3;
/// Kind word and format hint of a path.
pub const CTL_SYSCTL_OIDFMT: i32 = 4;
/// Description of a path.
pub const CTL_SYSCTL_OIDDESCR: i32 = 5;
/// Next leaf after a path, not passing over skipped entries.
pub const CTL_SYSCTL_NEXTNOSKIP: i32 = 6;
/// First top-level branch; whole-namespace walks start after it.
pub const CTL_KERN: i32 = 1;

/// The single kernel primitive everything else is built on.
///
/// Semantics follow `sysctl(3)`:
/// - `old = None` and `new = None` probes the value size and returns it.
/// - `old = Some(buf)` copies the value into `buf` and returns the number
///   of bytes written, or fails with `ENOMEM` when `buf` is too small.
/// - `new = Some(bytes)` replaces the value.
pub trait Kernel: Send + Sync + fmt::Debug {
    /// Perform one raw call against `name`.
    fn sysctl(
        &self,
        name: &[i32],
        old: Option<&mut [u8]>,
        new: Option<&[u8]>,
    ) -> Result<usize, Errno>;
}
