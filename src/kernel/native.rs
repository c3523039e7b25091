//! `sysctl(3)` backend for the host kernel.
#![allow(unsafe_code)]

use crate::error::{Errno, Result, SysctlError};

use super::Kernel;

/// Backend that calls the host's `sysctl(3)`.
#[derive(Debug, Clone, Copy)]
pub struct NativeKernel {
    _private: (),
}

impl NativeKernel {
    /// Open the host backend.
    ///
    /// # Errors
    ///
    /// Returns [`SysctlError::Unsupported`] on targets without a numeric
    /// sysctl namespace exposing the meta-path protocol.
    pub fn open() -> Result<Self> {
        if cfg!(target_os = "freebsd") {
            Ok(Self { _private: () })
        } else {
            Err(SysctlError::Unsupported(format!(
                "sysctl namespace is not available on {}",
                std::env::consts::OS
            )))
        }
    }
}

#[cfg(target_os = "freebsd")]
impl Kernel for NativeKernel {
    fn sysctl(
        &self,
        name: &[i32],
        old: Option<&mut [u8]>,
        new: Option<&[u8]>,
    ) -> std::result::Result<usize, Errno> {
        let namelen = libc::c_uint::try_from(name.len()).map_err(|_| Errno::EINVAL)?;
        let (old_ptr, mut old_len) = match old {
            Some(buf) => (buf.as_mut_ptr().cast::<libc::c_void>(), buf.len()),
            None => (std::ptr::null_mut(), 0),
        };
        let (new_ptr, new_len) = match new {
            Some(bytes) => (bytes.as_ptr().cast::<libc::c_void>(), bytes.len()),
            None => (std::ptr::null(), 0),
        };
        // SAFETY: `name` is valid for `namelen` ints; `old_ptr` is either
        // null or valid for `old_len` writable bytes; `new_ptr` is either
        // null or valid for `new_len` readable bytes. The kernel writes at
        // most `old_len` bytes and updates `old_len` in place.
        let rc = unsafe {
            libc::sysctl(
                name.as_ptr(),
                namelen,
                old_ptr,
                &mut old_len,
                new_ptr,
                new_len,
            )
        };
        if rc == -1 {
            return Err(Errno::last());
        }
        Ok(old_len)
    }
}

#[cfg(not(target_os = "freebsd"))]
impl Kernel for NativeKernel {
    fn sysctl(
        &self,
        _name: &[i32],
        _old: Option<&mut [u8]>,
        _new: Option<&[u8]>,
    ) -> std::result::Result<usize, Errno> {
        Err(Errno::EOPNOTSUPP)
    }
}
