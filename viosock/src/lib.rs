//! Guest-side access to the virtio-vsock (viosock) driver.
//!
//! Opens the driver's device object and reads the guest's context identifier. Socket I/O on the
//! returned handle is left to the layers above.

pub mod communications;
pub mod config;
pub mod device;
pub mod logger;
pub mod probe;

pub use communications::{DriverTransport, OpenOutcome, OpenRequest};
#[cfg(windows)]
pub use communications::NativeTransport;
#[cfg(windows)]
pub use communications::ioctl::{close_device, open_device, query_config};
pub use device::{DeviceHandle, VioSockDevice, VsockDevice};
pub use shared::errors::VsockError;
pub use shared::wire::SocketConfig;
