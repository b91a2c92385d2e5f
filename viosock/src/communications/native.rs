//! `DriverTransport` over the real Windows APIs.

use super::{DriverTransport, OpenOutcome, OpenRequest};
use shared::types::{IoStatusBlock, NtStatus, RawHandle};
use shared::wire::{OBJECT_ATTRIBUTES_LEN, offsets};
use std::{ffi::c_void, io, mem::offset_of, mem::size_of, ptr};

use windows_sys::Wdk::Foundation::OBJECT_ATTRIBUTES;
use windows_sys::Wdk::Storage::FileSystem::NtCreateFile;
use windows_sys::Win32::Foundation::{CloseHandle, HANDLE, UNICODE_STRING};
use windows_sys::Win32::System::IO::{DeviceIoControl, IO_STATUS_BLOCK};

// The marshaled descriptor advertises OBJECT_ATTRIBUTES_LEN as its Length; it must be the real
// structure size on this target.
const _: () = {
    assert!(size_of::<OBJECT_ATTRIBUTES>() == OBJECT_ATTRIBUTES_LEN);
    assert!(offset_of!(OBJECT_ATTRIBUTES, Length) == offsets::LENGTH);
    assert!(offset_of!(OBJECT_ATTRIBUTES, RootDirectory) == offsets::ROOT_DIRECTORY);
    assert!(offset_of!(OBJECT_ATTRIBUTES, ObjectName) == offsets::OBJECT_NAME);
    assert!(offset_of!(OBJECT_ATTRIBUTES, Attributes) == offsets::ATTRIBUTES);
    assert!(offset_of!(OBJECT_ATTRIBUTES, SecurityDescriptor) == offsets::SECURITY_DESCRIPTOR);
    assert!(
        offset_of!(OBJECT_ATTRIBUTES, SecurityQualityOfService)
            == offsets::SECURITY_QUALITY_OF_SERVICE
    );
};

/// Calls straight into ntdll / kernel32. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeTransport;

impl DriverTransport for NativeTransport {
    fn create_file(&self, request: &OpenRequest<'_>) -> OpenOutcome {
        let attrs = &request.attributes;

        // Lives on this frame for the duration of NtCreateFile; the buffer it points at is
        // borrowed from the request.
        let name = attrs.name().map(|n| UNICODE_STRING {
            Length: n.byte_length(),
            MaximumLength: n.max_byte_length(),
            Buffer: n.as_ptr() as *mut u16,
        });

        let object_attributes = OBJECT_ATTRIBUTES {
            Length: attrs.total_size(),
            RootDirectory: attrs
                .root_directory()
                .map_or(ptr::null_mut(), RawHandle::as_ptr),
            ObjectName: name.as_ref().map_or(ptr::null(), |n| n as *const UNICODE_STRING),
            Attributes: attrs.attributes(),
            SecurityDescriptor: attrs
                .security_descriptor()
                .map_or(ptr::null(), |sd| sd.as_ptr() as *const c_void),
            SecurityQualityOfService: ptr::null(),
        };

        let mut handle: HANDLE = RawHandle::INVALID.as_ptr();
        // SAFETY: IO_STATUS_BLOCK is plain data; all-zero is a valid value.
        let mut iosb: IO_STATUS_BLOCK = unsafe { std::mem::zeroed() };

        // SAFETY: every pointer refers to a local or to memory borrowed by `request`, all of
        // which outlive this synchronous call.
        let status = unsafe {
            NtCreateFile(
                &mut handle,
                request.desired_access,
                &object_attributes,
                &mut iosb,
                ptr::null(),    // allocation size
                0,              // file attributes
                request.share_access,
                request.create_disposition,
                request.create_options,
                ptr::null(),    // EA buffer
                0,
            )
        };

        // SAFETY: both union members are plain integers/pointers; NtCreateFile writes Status.
        let iosb_status = unsafe { iosb.Anonymous.Status };

        OpenOutcome {
            status: NtStatus(status),
            handle: RawHandle::from_ptr(handle),
            io_status: IoStatusBlock {
                status: NtStatus(iosb_status),
                information: iosb.Information,
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
        let mut bytes: u32 = 0;

        let in_ptr = if input.is_empty() {
            ptr::null()
        } else {
            input.as_ptr() as *const c_void
        };

        // SAFETY: buffers are valid for their stated lengths; no OVERLAPPED, so the call
        // completes before returning and nothing retains the pointers.
        let ok = unsafe {
            DeviceIoControl(
                handle.as_ptr(),
                code,
                in_ptr,
                input.len() as u32,
                output.as_mut_ptr() as *mut c_void,
                output.len() as u32,
                &mut bytes,
                ptr::null_mut(),
            )
        };

        if ok == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(bytes as usize)
    }

    fn close_handle(&self, handle: RawHandle) -> io::Result<()> {
        // SAFETY: the caller hands over ownership of `handle`.
        let ok = unsafe { CloseHandle(handle.as_ptr()) };
        if ok == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}
