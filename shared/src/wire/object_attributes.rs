use super::unicode::{UnicodeStringDescriptor, WideString};
use crate::errors::VsockError;
use crate::types::RawHandle;
use std::mem::size_of;

const PTR: usize = size_of::<usize>();

/// Byte offsets of the OBJECT_ATTRIBUTES fields on the current target.
///
/// `Length` and `Attributes` are 32-bit but each is followed by padding up to pointer
/// alignment, so every field starts on a pointer-width boundary.
pub mod offsets {
    use super::PTR;

    pub const LENGTH: usize = 0;
    pub const ROOT_DIRECTORY: usize = PTR;
    pub const OBJECT_NAME: usize = 2 * PTR;
    pub const ATTRIBUTES: usize = 3 * PTR;
    pub const SECURITY_DESCRIPTOR: usize = 4 * PTR;
    pub const SECURITY_QUALITY_OF_SERVICE: usize = 5 * PTR;
}

/// Serialized size of OBJECT_ATTRIBUTES: 48 bytes on 64-bit targets, 24 on 32-bit.
pub const OBJECT_ATTRIBUTES_LEN: usize = 6 * PTR;

/// A borrowed, self-relative security descriptor passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityDescriptorRef<'a>(&'a [u8]);

impl<'a> SecurityDescriptorRef<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.0.as_ptr()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// OBJECT_ATTRIBUTES as handed to `NtCreateFile`.
///
/// `name` is `None` when the object was built from an empty name. An absent name and a present
/// zero-length name are different things to the object manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectAttributesDescriptor<'a> {
    total_size: u32,
    root_directory: Option<RawHandle>,
    name: Option<UnicodeStringDescriptor<'a>>,
    attributes: u32,
    security_descriptor: Option<SecurityDescriptorRef<'a>>,
}

impl<'a> ObjectAttributesDescriptor<'a> {
    #[inline]
    pub fn total_size(&self) -> u32 {
        self.total_size
    }

    #[inline]
    pub fn root_directory(&self) -> Option<RawHandle> {
        self.root_directory
    }

    #[inline]
    pub fn name(&self) -> Option<UnicodeStringDescriptor<'a>> {
        self.name
    }

    #[inline]
    pub fn attributes(&self) -> u32 {
        self.attributes
    }

    #[inline]
    pub fn security_descriptor(&self) -> Option<SecurityDescriptorRef<'a>> {
        self.security_descriptor
    }
}

/// Owns the encoded object name and hands out descriptors that borrow it.
///
/// Build it right before the native call, take a [`descriptor`](Self::descriptor), make the
/// call, then let it drop.
#[derive(Debug)]
pub struct ObjectAttributesBuilder<'a> {
    name: Option<WideString>,
    attributes: u32,
    root_directory: Option<RawHandle>,
    security_descriptor: Option<SecurityDescriptorRef<'a>>,
}

impl<'a> ObjectAttributesBuilder<'a> {
    /// Start from an object name and `OBJ_*` flags. The name is only encoded when non-empty.
    pub fn new(name: &str, attributes: u32) -> Result<Self, VsockError> {
        let name = if name.is_empty() {
            None
        } else {
            Some(WideString::encode(name)?)
        };

        Ok(Self {
            name,
            attributes,
            root_directory: None,
            security_descriptor: None,
        })
    }

    /// Resolve the name relative to an already open directory handle.
    pub fn root_directory(mut self, root: RawHandle) -> Self {
        self.root_directory = Some(root);
        self
    }

    pub fn security_descriptor(mut self, sd: SecurityDescriptorRef<'a>) -> Self {
        self.security_descriptor = Some(sd);
        self
    }

    pub fn descriptor(&self) -> ObjectAttributesDescriptor<'_> {
        ObjectAttributesDescriptor {
            total_size: OBJECT_ATTRIBUTES_LEN as u32,
            root_directory: self.root_directory,
            name: self.name.as_ref().map(WideString::descriptor),
            attributes: self.attributes,
            security_descriptor: self.security_descriptor,
        }
    }
}
