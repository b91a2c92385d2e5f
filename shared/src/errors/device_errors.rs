use crate::types::NtStatus;
use thiserror::Error;

/// Failures on the device open / configuration query path.
///
/// Nothing here is retried by the library; every variant is handed back to the caller.
#[derive(Debug, Error)]
pub enum VsockError {
    /// The object name or attributes could not be marshaled.
    #[error("cannot build object attributes for `{name}`: {reason}")]
    AttributeConstruction { name: String, reason: String },

    /// `NtCreateFile` returned a non-success status. Any handle value it produced is discarded.
    #[error("NtCreateFile(`{path}`) failed with status {status}")]
    OpenFailed { path: String, status: NtStatus },

    /// `DeviceIoControl` reported an OS error (handle closed, driver gone, buffer too small).
    #[error("DeviceIoControl({code:#010x}) failed: {source}")]
    IoctlFailed {
        code: u32,
        #[source]
        source: std::io::Error,
    },

    /// The IOCTL succeeded but did not return exactly the contracted number of bytes.
    #[error("IOCTL {code:#010x} returned {actual} bytes, expected {expected}")]
    ShortRead {
        code: u32,
        expected: usize,
        actual: usize,
    },

    /// Releasing a handle failed.
    #[error("CloseHandle failed: {0}")]
    CloseFailed(#[source] std::io::Error),
}

impl VsockError {
    /// OS error code carried by an IOCTL or close failure, if any.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            VsockError::IoctlFailed { source, .. } => source.raw_os_error(),
            VsockError::CloseFailed(source) => source.raw_os_error(),
            _ => None,
        }
    }

    /// Native status carried by an open failure.
    pub fn nt_status(&self) -> Option<NtStatus> {
        match self {
            VsockError::OpenFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}
