//! Open / query / close against a scripted in-process driver.
//!
//! `MockDriver` stands in for ntdll and the viosock driver: it records every native call and
//! replies with whatever the test configured. Nothing here touches a real device.

use shared::constants::{
    FILE_GENERIC_READ, FILE_GENERIC_WRITE, FILE_NON_DIRECTORY_FILE, FILE_OPEN, FILE_SHARE_READ,
    FILE_SHARE_WRITE, IOCTL_VIOSOCK_GET_CONFIG, OBJ_CASE_INSENSITIVE, VIOSOCK_DEVICE_PATH,
};
use shared::types::{IoStatusBlock, NtStatus, RawHandle};
use shared::wire::{OBJECT_ATTRIBUTES_LEN, SOCKET_CONFIG_LEN};
use std::cell::{Cell, RefCell};
use std::io;
use viosock::communications::ioctl::{close_device_with, open_device_with, query_config_with};
use viosock::config::ProbeConfig;
use viosock::probe::run_probe;
use viosock::{
    DriverTransport, OpenOutcome, OpenRequest, SocketConfig, VioSockDevice, VsockDevice,
    VsockError,
};

const ERROR_INVALID_HANDLE: i32 = 6;
const ERROR_INSUFFICIENT_BUFFER: i32 = 122;

/// What the mock saw on an `NtCreateFile`, copied out of the borrowed request.
#[derive(Debug, Clone, PartialEq)]
struct SeenOpen {
    name: Option<String>,
    name_bytes: Option<(u16, u16)>,
    total_size: u32,
    attributes: u32,
    has_root: bool,
    has_security_descriptor: bool,
    desired_access: u32,
    share_access: u32,
    create_disposition: u32,
    create_options: u32,
}

#[derive(Debug, Clone, PartialEq)]
struct SeenIoctl {
    handle: RawHandle,
    code: u32,
    input_len: usize,
    output_len: usize,
}

struct MockDriver {
    open_status: NtStatus,
    next_handle: Cell<isize>,
    /// Bytes the "driver" writes plus the count it reports, or an OS error.
    reply: Result<(Vec<u8>, usize), i32>,
    close_error: Option<i32>,
    opens: RefCell<Vec<SeenOpen>>,
    ioctls: RefCell<Vec<SeenIoctl>>,
    closed: RefCell<Vec<RawHandle>>,
}

impl MockDriver {
    fn new() -> Self {
        Self {
            open_status: NtStatus::SUCCESS,
            next_handle: Cell::new(0x100),
            reply: Ok((Vec::new(), 0)),
            close_error: None,
            opens: RefCell::new(Vec::new()),
            ioctls: RefCell::new(Vec::new()),
            closed: RefCell::new(Vec::new()),
        }
    }

    fn replying_cid(cid: u64) -> Self {
        let bytes = cid.to_le_bytes().to_vec();
        let n = bytes.len();
        Self {
            reply: Ok((bytes, n)),
            ..Self::new()
        }
    }

    fn failing_open(status: NtStatus) -> Self {
        Self {
            open_status: status,
            ..Self::new()
        }
    }
}

impl DriverTransport for MockDriver {
    fn create_file(&self, request: &OpenRequest<'_>) -> OpenOutcome {
        let attrs = &request.attributes;
        self.opens.borrow_mut().push(SeenOpen {
            name: attrs.name().map(|n| n.to_string_lossy()),
            name_bytes: attrs.name().map(|n| (n.byte_length(), n.max_byte_length())),
            total_size: attrs.total_size(),
            attributes: attrs.attributes(),
            has_root: attrs.root_directory().is_some(),
            has_security_descriptor: attrs.security_descriptor().is_some(),
            desired_access: request.desired_access,
            share_access: request.share_access,
            create_disposition: request.create_disposition,
            create_options: request.create_options,
        });

        if !self.open_status.is_success() {
            // Whatever the native call leaves in the out-parameter must not leak out.
            return OpenOutcome {
                status: self.open_status,
                handle: RawHandle::from_raw(0xDEAD),
                io_status: IoStatusBlock {
                    status: self.open_status,
                    information: 0,
                },
            };
        }

        let handle = self.next_handle.get();
        self.next_handle.set(handle + 4);
        OpenOutcome {
            status: self.open_status,
            handle: RawHandle::from_raw(handle),
            io_status: IoStatusBlock {
                status: NtStatus::SUCCESS,
                information: 1, // FILE_OPENED
            },
        }
    }

    fn device_io_control(
        &self,
        handle: RawHandle,
        code: u32,
        input: &[u8],
        output: &mut [u8],
    ) -> io::Result<usize> {
        self.ioctls.borrow_mut().push(SeenIoctl {
            handle,
            code,
            input_len: input.len(),
            output_len: output.len(),
        });

        match &self.reply {
            Ok((bytes, reported)) => {
                let n = bytes.len().min(output.len());
                output[..n].copy_from_slice(&bytes[..n]);
                Ok(*reported)
            }
            Err(code) => Err(io::Error::from_raw_os_error(*code)),
        }
    }

    fn close_handle(&self, handle: RawHandle) -> io::Result<()> {
        self.closed.borrow_mut().push(handle);
        match self.close_error {
            Some(code) => Err(io::Error::from_raw_os_error(code)),
            None => Ok(()),
        }
    }
}

#[test]
fn open_issues_single_create_with_expected_parameters() {
    let driver = MockDriver::new();
    let handle = open_device_with(&driver).expect("open succeeds");

    assert!(handle.as_raw().is_valid());
    assert_eq!(handle.io_status().information, 1);

    let opens = driver.opens.borrow();
    assert_eq!(opens.len(), 1);
    let seen = &opens[0];

    assert_eq!(seen.name.as_deref(), Some(VIOSOCK_DEVICE_PATH));
    assert_eq!(seen.name.as_deref(), Some(r"\??\Viosock"));
    assert_eq!(seen.name_bytes, Some((22, 22)));
    assert_eq!(seen.total_size as usize, OBJECT_ATTRIBUTES_LEN);
    assert_eq!(seen.attributes, OBJ_CASE_INSENSITIVE);
    assert!(!seen.has_root);
    assert!(!seen.has_security_descriptor);
    assert_eq!(seen.desired_access, FILE_GENERIC_READ | FILE_GENERIC_WRITE);
    assert_eq!(seen.desired_access, 0x0012_019F);
    assert_eq!(seen.share_access, FILE_SHARE_READ | FILE_SHARE_WRITE);
    assert_eq!(seen.create_disposition, FILE_OPEN);
    assert_eq!(seen.create_options, FILE_NON_DIRECTORY_FILE);
}

#[test]
fn failed_open_reports_status_and_no_handle() {
    let driver = MockDriver::failing_open(NtStatus::OBJECT_NAME_NOT_FOUND);

    let err = open_device_with(&driver).unwrap_err();
    match &err {
        VsockError::OpenFailed { path, status } => {
            assert_eq!(path, VIOSOCK_DEVICE_PATH);
            assert_eq!(*status, NtStatus::OBJECT_NAME_NOT_FOUND);
        }
        other => panic!("expected OpenFailed, got {other:?}"),
    }
    assert_eq!(err.nt_status(), Some(NtStatus::OBJECT_NAME_NOT_FOUND));
    assert!(err.to_string().contains("0xC0000034"));

    // No retry.
    assert_eq!(driver.opens.borrow().len(), 1);
}

#[test]
fn repeated_opens_are_independent() {
    let driver = MockDriver::new();
    let a = open_device_with(&driver).unwrap();
    let b = open_device_with(&driver).unwrap();

    assert_ne!(a.as_raw(), b.as_raw());
    assert_eq!(driver.opens.borrow().len(), 2);
}

#[test]
fn query_decodes_guest_cid() {
    let driver = MockDriver::replying_cid(42);
    let handle = open_device_with(&driver).unwrap();

    let cfg = query_config_with(&driver, &handle).expect("query succeeds");
    assert_eq!(cfg, SocketConfig { guest_cid: 42 });

    let ioctls = driver.ioctls.borrow();
    assert_eq!(
        ioctls.as_slice(),
        &[SeenIoctl {
            handle: handle.as_raw(),
            code: IOCTL_VIOSOCK_GET_CONFIG,
            input_len: 0,
            output_len: SOCKET_CONFIG_LEN,
        }]
    );
}

#[test]
fn query_does_not_consume_the_handle() {
    let driver = MockDriver::replying_cid(3);
    let handle = open_device_with(&driver).unwrap();

    let first = query_config_with(&driver, &handle).unwrap();
    let second = query_config_with(&driver, &handle).unwrap();
    assert_eq!(first, second);
    assert!(driver.closed.borrow().is_empty());
}

#[test]
fn four_byte_reply_is_a_short_read() {
    let driver = MockDriver {
        reply: Ok((vec![42, 0, 0, 0], 4)),
        ..MockDriver::new()
    };
    let handle = open_device_with(&driver).unwrap();

    let err = query_config_with(&driver, &handle).unwrap_err();
    assert!(matches!(
        err,
        VsockError::ShortRead {
            code: IOCTL_VIOSOCK_GET_CONFIG,
            expected: 8,
            actual: 4,
        }
    ));
}

#[test]
fn overlong_byte_count_is_rejected() {
    let driver = MockDriver {
        reply: Ok((42u64.to_le_bytes().to_vec(), 9)),
        ..MockDriver::new()
    };
    let handle = open_device_with(&driver).unwrap();

    let err = query_config_with(&driver, &handle).unwrap_err();
    assert!(matches!(err, VsockError::ShortRead { actual: 9, .. }));
}

#[test]
fn ioctl_failure_keeps_os_error() {
    let driver = MockDriver {
        reply: Err(ERROR_INSUFFICIENT_BUFFER),
        ..MockDriver::new()
    };
    let handle = open_device_with(&driver).unwrap();

    let err = query_config_with(&driver, &handle).unwrap_err();
    assert!(matches!(
        err,
        VsockError::IoctlFailed {
            code: IOCTL_VIOSOCK_GET_CONFIG,
            ..
        }
    ));
    assert_eq!(err.raw_os_error(), Some(ERROR_INSUFFICIENT_BUFFER));
}

#[test]
fn close_releases_the_opened_handle() {
    let driver = MockDriver::new();
    let handle = open_device_with(&driver).unwrap();
    let raw = handle.as_raw();

    close_device_with(&driver, handle).unwrap();
    assert_eq!(driver.closed.borrow().as_slice(), &[raw]);
}

#[test]
fn close_failure_is_surfaced() {
    let driver = MockDriver {
        close_error: Some(ERROR_INVALID_HANDLE),
        ..MockDriver::new()
    };
    let handle = open_device_with(&driver).unwrap();

    let err = close_device_with(&driver, handle).unwrap_err();
    assert!(matches!(err, VsockError::CloseFailed(_)));
    assert_eq!(err.raw_os_error(), Some(ERROR_INVALID_HANDLE));
}

#[test]
fn capability_interface_round_trip() {
    let device = VioSockDevice::with_transport(MockDriver::replying_cid(7));

    let handle = device.open().unwrap();
    let raw = handle.as_raw();
    assert_eq!(device.query_config(&handle).unwrap().guest_cid, 7);
    device.close(handle).unwrap();

    assert_eq!(device.transport().closed.borrow().as_slice(), &[raw]);
}

#[test]
fn probe_closes_after_query() {
    let device = VioSockDevice::with_transport(MockDriver::replying_cid(1234));

    let report = run_probe(&device, &ProbeConfig::default()).unwrap();
    assert_eq!(report.config.guest_cid, 1234);
    assert_eq!(report.open_status, NtStatus::SUCCESS);
    assert!(report.closed());
    assert!(report.handle.is_none());
    assert_eq!(device.transport().closed.borrow().len(), 1);
}

#[test]
fn probe_can_leave_handle_open() {
    let device = VioSockDevice::with_transport(MockDriver::replying_cid(5));
    let settings = ProbeConfig {
        close_after_query: false,
    };

    let report = run_probe(&device, &settings).unwrap();
    assert!(!report.closed());
    assert!(device.transport().closed.borrow().is_empty());

    let handle = report.handle.expect("open handle is handed back");
    let raw = handle.as_raw();
    assert!(raw.is_valid());
    assert_eq!(device.query_config(&handle).unwrap().guest_cid, 5);

    device.close(handle).unwrap();
    assert_eq!(device.transport().closed.borrow().as_slice(), &[raw]);
}

#[test]
fn failed_query_closes_handle_even_when_kept_open() {
    let device = VioSockDevice::with_transport(MockDriver {
        reply: Ok((vec![1, 2], 2)),
        ..MockDriver::new()
    });
    let settings = ProbeConfig {
        close_after_query: false,
    };

    let err = run_probe(&device, &settings).unwrap_err();
    assert!(matches!(err, VsockError::ShortRead { actual: 2, .. }));
    assert_eq!(device.transport().opens.borrow().len(), 1);
    assert_eq!(device.transport().closed.borrow().len(), 1);
}

#[test]
fn open_status_is_the_create_return_value() {
    // STATUS_OBJECT_NAME_EXISTS: informational, so still a successful open.
    let informational = NtStatus(0x4000_0000);
    let driver = MockDriver {
        open_status: informational,
        ..MockDriver::replying_cid(9)
    };

    let handle = open_device_with(&driver).unwrap();
    assert_eq!(handle.open_status(), informational);
    assert_eq!(handle.io_status().status, NtStatus::SUCCESS);
    close_device_with(&driver, handle).unwrap();

    let device = VioSockDevice::with_transport(driver);
    let report = run_probe(&device, &ProbeConfig::default()).unwrap();
    assert_eq!(report.open_status, informational);
}

#[test]
fn probe_closes_even_when_query_fails() {
    let device = VioSockDevice::with_transport(MockDriver {
        reply: Err(ERROR_INVALID_HANDLE),
        ..MockDriver::new()
    });

    let err = run_probe(&device, &ProbeConfig::default()).unwrap_err();
    assert!(matches!(err, VsockError::IoctlFailed { .. }));
    assert_eq!(device.transport().closed.borrow().len(), 1);
}

#[test]
fn probe_stops_at_failed_open() {
    let device =
        VioSockDevice::with_transport(MockDriver::failing_open(NtStatus::ACCESS_DENIED));

    let err = run_probe(&device, &ProbeConfig::default()).unwrap_err();
    assert_eq!(err.nt_status(), Some(NtStatus::ACCESS_DENIED));
    assert!(device.transport().ioctls.borrow().is_empty());
    assert!(device.transport().closed.borrow().is_empty());
}
