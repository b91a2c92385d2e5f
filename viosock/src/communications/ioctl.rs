//! Open the viosock device and ask the driver for the guest configuration.
//!
//! The device lives at `\??\Viosock` in the object namespace, which `CreateFileW` cannot reach,
//! so the open goes through `NtCreateFile` with a hand-built OBJECT_ATTRIBUTES. The configuration
//! is fetched with a METHOD_BUFFERED IOCTL into an 8-byte output buffer.
//!
//! Both calls are synchronous (no OVERLAPPED), so the calling thread blocks until the driver
//! completes. Nothing is retried.

use super::{DriverTransport, OpenRequest};
use crate::device::DeviceHandle;
use log::{debug, error, info};
use shared::constants::{
    FILE_GENERIC_READ, FILE_GENERIC_WRITE, FILE_NON_DIRECTORY_FILE, FILE_OPEN, FILE_SHARE_READ,
    FILE_SHARE_WRITE, IOCTL_VIOSOCK_GET_CONFIG, OBJ_CASE_INSENSITIVE, VIOSOCK_DEVICE_PATH,
};
use shared::errors::VsockError;
use shared::wire::{ObjectAttributesBuilder, SOCKET_CONFIG_LEN, SocketConfig};

/// Open the viosock device through `transport`.
///
/// Requests generic read/write, shares read/write with other openers, and refuses to open a
/// directory. Each call opens an independent handle.
///
/// # Errors
/// - `AttributeConstruction` if the device path cannot be marshaled.
/// - `OpenFailed` carrying the NTSTATUS if `NtCreateFile` does not succeed. The handle value
///   returned by the failed call is dropped and never exposed.
pub fn open_device_with<T: DriverTransport + ?Sized>(
    transport: &T,
) -> Result<DeviceHandle, VsockError> {
    let attributes = ObjectAttributesBuilder::new(VIOSOCK_DEVICE_PATH, OBJ_CASE_INSENSITIVE)?;

    let request = OpenRequest {
        attributes: attributes.descriptor(),
        desired_access: FILE_GENERIC_READ | FILE_GENERIC_WRITE,
        share_access: FILE_SHARE_READ | FILE_SHARE_WRITE,
        create_disposition: FILE_OPEN,
        create_options: FILE_NON_DIRECTORY_FILE,
    };

    let outcome = transport.create_file(&request);
    debug!(
        "NtCreateFile({VIOSOCK_DEVICE_PATH}) status={} handle={} information={}",
        outcome.status, outcome.handle, outcome.io_status.information
    );

    if !outcome.status.is_success() {
        error!(
            "NtCreateFile({VIOSOCK_DEVICE_PATH}) failed: status={}",
            outcome.status
        );
        return Err(VsockError::OpenFailed {
            path: VIOSOCK_DEVICE_PATH.to_owned(),
            status: outcome.status,
        });
    }

    info!("Device opened: {VIOSOCK_DEVICE_PATH}");
    Ok(DeviceHandle::new(
        outcome.handle,
        outcome.status,
        outcome.io_status,
    ))
}

/// Ask the driver for the guest's `SocketConfig`.
///
/// Contract:
/// - METHOD_BUFFERED, no input buffer, output buffer of exactly `SOCKET_CONFIG_LEN` bytes.
/// - The driver must report exactly `SOCKET_CONFIG_LEN` bytes written.
///
/// # Errors
/// - `IoctlFailed` with the OS error if `DeviceIoControl` fails.
/// - `ShortRead` if the returned byte count is anything other than `SOCKET_CONFIG_LEN`.
pub fn query_config_with<T: DriverTransport + ?Sized>(
    transport: &T,
    handle: &DeviceHandle,
) -> Result<SocketConfig, VsockError> {
    let mut out = [0u8; SOCKET_CONFIG_LEN];

    let returned = transport
        .device_io_control(handle.as_raw(), IOCTL_VIOSOCK_GET_CONFIG, &[], &mut out)
        .map_err(|source| {
            error!("DeviceIoControl(IOCTL_VIOSOCK_GET_CONFIG) failed: {source}");
            VsockError::IoctlFailed {
                code: IOCTL_VIOSOCK_GET_CONFIG,
                source,
            }
        })?;

    debug!(
        "DeviceIoControl(IOCTL_VIOSOCK_GET_CONFIG) handle={} bytes={returned}",
        handle.as_raw()
    );

    let config = out
        .get(..returned)
        .and_then(SocketConfig::decode)
        .ok_or_else(|| {
            error!(
                "IOCTL_VIOSOCK_GET_CONFIG returned {returned} bytes, expected {SOCKET_CONFIG_LEN}"
            );
            VsockError::ShortRead {
                code: IOCTL_VIOSOCK_GET_CONFIG,
                expected: SOCKET_CONFIG_LEN,
                actual: returned,
            }
        })?;

    info!("Guest CID is {}", config.guest_cid);
    Ok(config)
}

/// Release a handle obtained from [`open_device_with`].
pub fn close_device_with<T: DriverTransport + ?Sized>(
    transport: &T,
    handle: DeviceHandle,
) -> Result<(), VsockError> {
    let raw = handle.into_raw();
    transport.close_handle(raw).map_err(|e| {
        error!("CloseHandle({raw}) failed: {e}");
        VsockError::CloseFailed(e)
    })?;
    debug!("Closed device handle {raw}");
    Ok(())
}

/// Open `\??\Viosock` with the native API.
#[cfg(windows)]
pub fn open_device() -> Result<DeviceHandle, VsockError> {
    open_device_with(&super::NativeTransport)
}

/// Query the guest configuration on a handle from [`open_device`].
#[cfg(windows)]
pub fn query_config(handle: &DeviceHandle) -> Result<SocketConfig, VsockError> {
    query_config_with(&super::NativeTransport, handle)
}

#[cfg(windows)]
pub fn close_device(handle: DeviceHandle) -> Result<(), VsockError> {
    close_device_with(&super::NativeTransport, handle)
}
