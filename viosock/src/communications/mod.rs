//! Driver communication: the native primitives behind a small trait, and the open/query
//! sequence built on top of them.

pub mod ioctl;
#[cfg(windows)]
pub mod native;

use shared::types::{IoStatusBlock, NtStatus, RawHandle};
use shared::wire::ObjectAttributesDescriptor;
use std::io;

#[cfg(windows)]
pub use native::NativeTransport;

/// Parameters of one `NtCreateFile` call.
#[derive(Debug, Clone, Copy)]
pub struct OpenRequest<'a> {
    pub attributes: ObjectAttributesDescriptor<'a>,
    pub desired_access: u32,
    pub share_access: u32,
    pub create_disposition: u32,
    pub create_options: u32,
}

/// Raw result of `NtCreateFile`. `handle` is meaningless unless `status` is a success code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOutcome {
    pub status: NtStatus,
    pub handle: RawHandle,
    pub io_status: IoStatusBlock,
}

/// The native calls the device client needs. Every method blocks until the OS completes it.
pub trait DriverTransport {
    /// Issue exactly one `NtCreateFile`.
    fn create_file(&self, request: &OpenRequest<'_>) -> OpenOutcome;

    /// Issue one synchronous `DeviceIoControl` and return the number of bytes written to
    /// `output`.
    fn device_io_control(
        &self,
        handle: RawHandle,
        code: u32,
        input: &[u8],
        output: &mut [u8],
    ) -> io::Result<usize>;

    fn close_handle(&self, handle: RawHandle) -> io::Result<()>;
}

impl<T: DriverTransport + ?Sized> DriverTransport for &T {
    fn create_file(&self, request: &OpenRequest<'_>) -> OpenOutcome {
        (**self).create_file(request)
    }

    fn device_io_control(
        &self,
        handle: RawHandle,
        code: u32,
        input: &[u8],
        output: &mut [u8],
    ) -> io::Result<usize> {
        (**self).device_io_control(handle, code, input, output)
    }

    fn close_handle(&self, handle: RawHandle) -> io::Result<()> {
        (**self).close_handle(handle)
    }
}
