//! Handle type and the capability interface higher layers program against.

use crate::communications::DriverTransport;
use crate::communications::ioctl::{close_device_with, open_device_with, query_config_with};
use shared::errors::VsockError;
use shared::types::{IoStatusBlock, NtStatus, RawHandle};
use shared::wire::SocketConfig;

/// An open viosock device handle.
///
/// Only produced by a successful open, so holding one means the handle is valid. It is
/// neither `Clone` nor `Copy`; whoever holds it owns it. Dropping it does not close the
/// handle: release it with [`VsockDevice::close`] or take it over with [`into_raw`](Self::into_raw).
#[derive(Debug, PartialEq, Eq)]
pub struct DeviceHandle {
    raw: RawHandle,
    open_status: NtStatus,
    io_status: IoStatusBlock,
}

impl DeviceHandle {
    pub(crate) fn new(raw: RawHandle, open_status: NtStatus, io_status: IoStatusBlock) -> Self {
        Self {
            raw,
            open_status,
            io_status,
        }
    }

    #[inline]
    pub fn as_raw(&self) -> RawHandle {
        self.raw
    }

    /// Status `NtCreateFile` returned for this handle.
    #[inline]
    pub fn open_status(&self) -> NtStatus {
        self.open_status
    }

    /// Completion record reported by the open call.
    #[inline]
    pub fn io_status(&self) -> IoStatusBlock {
        self.io_status
    }

    /// Give up the wrapper and take responsibility for the OS handle.
    #[inline]
    pub fn into_raw(self) -> RawHandle {
        self.raw
    }
}

/// Open the well-known device, read its configuration, release it.
pub trait VsockDevice {
    fn open(&self) -> Result<DeviceHandle, VsockError>;
    fn query_config(&self, handle: &DeviceHandle) -> Result<SocketConfig, VsockError>;
    fn close(&self, handle: DeviceHandle) -> Result<(), VsockError>;
}

/// The viosock device reached through a [`DriverTransport`].
#[derive(Debug, Clone, Default)]
pub struct VioSockDevice<T> {
    transport: T,
}

impl<T: DriverTransport> VioSockDevice<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[cfg(windows)]
impl VioSockDevice<crate::communications::NativeTransport> {
    pub fn native() -> Self {
        Self::with_transport(crate::communications::NativeTransport)
    }
}

impl<T: DriverTransport> VsockDevice for VioSockDevice<T> {
    fn open(&self) -> Result<DeviceHandle, VsockError> {
        open_device_with(&self.transport)
    }

    fn query_config(&self, handle: &DeviceHandle) -> Result<SocketConfig, VsockError> {
        query_config_with(&self.transport, handle)
    }

    fn close(&self, handle: DeviceHandle) -> Result<(), VsockError> {
        close_device_with(&self.transport, handle)
    }
}
