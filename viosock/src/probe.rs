//! One-shot device probe used by the `viosock-probe` binary.

use crate::config::ProbeConfig;
use crate::device::{DeviceHandle, VsockDevice};
use log::{info, warn};
use shared::errors::VsockError;
use shared::types::NtStatus;
use shared::wire::SocketConfig;

/// What a successful probe observed.
#[derive(Debug, PartialEq, Eq)]
pub struct ProbeReport {
    /// Status returned by `NtCreateFile`.
    pub open_status: NtStatus,
    pub config: SocketConfig,
    /// The still-open handle when `close_after_query` is off. The caller owns it from here.
    pub handle: Option<DeviceHandle>,
}

impl ProbeReport {
    pub fn closed(&self) -> bool {
        self.handle.is_none()
    }
}

/// Open the device, read its configuration and either close the handle or hand it back.
///
/// A failed query always closes the handle before returning; the query error wins over a close
/// error.
pub fn run_probe<D: VsockDevice + ?Sized>(
    device: &D,
    settings: &ProbeConfig,
) -> Result<ProbeReport, VsockError> {
    let handle = device.open()?;
    let open_status = handle.open_status();

    let config = match device.query_config(&handle) {
        Ok(config) => config,
        Err(e) => {
            if let Err(close_err) = device.close(handle) {
                warn!("Query failed and the handle could not be closed: {close_err}");
            }
            return Err(e);
        }
    };

    if !settings.close_after_query {
        info!("Leaving device handle {} open", handle.as_raw());
        return Ok(ProbeReport {
            open_status,
            config,
            handle: Some(handle),
        });
    }

    device.close(handle)?;

    Ok(ProbeReport {
        open_status,
        config,
        handle: None,
    })
}
