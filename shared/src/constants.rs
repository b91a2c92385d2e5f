/// Kernel object-namespace path of the virtio-vsock device.
///
/// The `\??\` prefix makes the object manager resolve the name through the DOS devices
/// directory, so this must be opened with `NtCreateFile` rather than `CreateFileW`.
pub const VIOSOCK_DEVICE_PATH: &str = r"\??\Viosock";

/// Device type for drivers that do not register an explicit class.
pub const FILE_DEVICE_UNKNOWN: u32 = 0x22;

/// How the I/O manager moves the IOCTL buffers between user and kernel mode.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMethod {
    Buffered = 0,
    InDirect = 1,
    OutDirect = 2,
    Neither = 3,
}

/// Access the caller's handle must hold for the I/O manager to dispatch the IOCTL.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredAccess {
    Any = 0,
    Read = 1,
    Write = 2,
    ReadWrite = 3,
}

/// Largest function number that fits the 12-bit function field.
pub const CTL_FUNCTION_MAX: u32 = 0xFFF;

/// CTL_CODE(DeviceType, Function, Method, Access)
/// = (DeviceType << 16) | (Access << 14) | (Function << 2) | Method
///
/// `function` is truncated to its 12-bit field so it can never spill into the access bits.
pub const fn ctl_code(
    device_type: u32,
    function: u32,
    method: TransferMethod,
    access: RequiredAccess,
) -> u32 {
    (device_type << 16)
        | ((access as u32) << 14)
        | ((function & CTL_FUNCTION_MAX) << 2)
        | method as u32
}

/// Function number the viosock driver assigns to "get configuration".
pub const VIOSOCK_GET_CONFIG_FUNCTION: u32 = 0x800;

/// Returns the guest `SocketConfig` (8 bytes) in the output buffer. No input buffer.
///
/// CTL_CODE(FILE_DEVICE_UNKNOWN, 0x800, METHOD_BUFFERED, FILE_READ_ACCESS)
pub const IOCTL_VIOSOCK_GET_CONFIG: u32 = ctl_code(
    FILE_DEVICE_UNKNOWN,
    VIOSOCK_GET_CONFIG_FUNCTION,
    TransferMethod::Buffered,
    RequiredAccess::Read,
);

// Standard rights (winnt.h).
pub const READ_CONTROL: u32 = 0x0002_0000;
pub const SYNCHRONIZE: u32 = 0x0010_0000;
pub const STANDARD_RIGHTS_REQUIRED: u32 = 0x000F_0000;
pub const STANDARD_RIGHTS_READ: u32 = READ_CONTROL;
pub const STANDARD_RIGHTS_WRITE: u32 = READ_CONTROL;
pub const STANDARD_RIGHTS_EXECUTE: u32 = READ_CONTROL;

// File-specific access rights.
pub const FILE_READ_DATA: u32 = 0x0001;
pub const FILE_WRITE_DATA: u32 = 0x0002;
pub const FILE_APPEND_DATA: u32 = 0x0004;
pub const FILE_READ_EA: u32 = 0x0008;
pub const FILE_WRITE_EA: u32 = 0x0010;
pub const FILE_EXECUTE: u32 = 0x0020;
pub const FILE_READ_ATTRIBUTES: u32 = 0x0080;
pub const FILE_WRITE_ATTRIBUTES: u32 = 0x0100;
pub const FILE_ALL_ACCESS: u32 = STANDARD_RIGHTS_REQUIRED | SYNCHRONIZE | 0x01FF;

pub const FILE_GENERIC_READ: u32 =
    STANDARD_RIGHTS_READ | FILE_READ_DATA | FILE_READ_ATTRIBUTES | FILE_READ_EA | SYNCHRONIZE;

pub const FILE_GENERIC_WRITE: u32 = STANDARD_RIGHTS_WRITE
    | FILE_WRITE_DATA
    | FILE_WRITE_ATTRIBUTES
    | FILE_WRITE_EA
    | FILE_APPEND_DATA
    | SYNCHRONIZE;

pub const FILE_GENERIC_EXECUTE: u32 =
    STANDARD_RIGHTS_EXECUTE | FILE_READ_ATTRIBUTES | FILE_EXECUTE | SYNCHRONIZE;

// NtCreateFile share modes, disposition and options.
pub const FILE_SHARE_READ: u32 = 0x0000_0001;
pub const FILE_SHARE_WRITE: u32 = 0x0000_0002;
pub const FILE_OPEN: u32 = 0x0000_0001;
pub const FILE_NON_DIRECTORY_FILE: u32 = 0x0000_0040;

/// OBJECT_ATTRIBUTES flag: name lookup ignores case.
pub const OBJ_CASE_INSENSITIVE: u32 = 0x0000_0040;
