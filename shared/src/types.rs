//! Opaque native values that cross the driver boundary.
//!
//! These are plain integers on purpose so that the crate stays usable (and testable) on hosts that
//! have no Windows bindings. The native layer converts them at the call site.

use std::ffi::c_void;
use std::fmt;

/// A pointer-sized OS handle value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawHandle(isize);

impl RawHandle {
    /// `INVALID_HANDLE_VALUE`: all bits set. Marks a handle that was never opened.
    pub const INVALID: RawHandle = RawHandle(-1);

    /// The NULL handle, e.g. "no root directory".
    pub const NULL: RawHandle = RawHandle(0);

    #[inline]
    pub const fn from_raw(value: isize) -> Self {
        RawHandle(value)
    }

    #[inline]
    pub fn from_ptr(ptr: *mut c_void) -> Self {
        RawHandle(ptr as isize)
    }

    #[inline]
    pub const fn as_raw(self) -> isize {
        self.0
    }

    #[inline]
    pub fn as_ptr(self) -> *mut c_void {
        self.0 as *mut c_void
    }

    /// True for anything other than the NULL and INVALID sentinels.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0 && self.0 != Self::NULL.0
    }
}

impl fmt::Display for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0 as usize)
    }
}

/// NTSTATUS as returned by the native API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NtStatus(pub i32);

impl NtStatus {
    pub const SUCCESS: NtStatus = NtStatus(0);
    pub const UNSUCCESSFUL: NtStatus = NtStatus(0xC000_0001_u32 as i32);
    pub const OBJECT_NAME_NOT_FOUND: NtStatus = NtStatus(0xC000_0034_u32 as i32);
    pub const ACCESS_DENIED: NtStatus = NtStatus(0xC000_0022_u32 as i32);

    /// NT_SUCCESS(): success and informational codes have the sign bit clear.
    #[inline]
    pub const fn is_success(self) -> bool {
        self.0 >= 0
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0 as u32
    }
}

impl fmt::Display for NtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010X}", self.as_u32())
    }
}

/// Completion record filled in by `NtCreateFile`. Kept alongside the handle, never interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoStatusBlock {
    pub status: NtStatus,
    pub information: usize,
}

impl Default for IoStatusBlock {
    fn default() -> Self {
        Self {
            status: NtStatus::SUCCESS,
            information: 0,
        }
    }
}
