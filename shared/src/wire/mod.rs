//! Fixed-layout structures exchanged with the native API and the viosock driver.
//!
//! Nothing in here reinterprets memory. Strings are encoded into owned UTF-16 buffers and the
//! descriptors that point at them borrow those buffers, so a descriptor can never outlive the
//! storage it names. The configuration record is decoded from bytes at documented offsets.

mod object_attributes;
mod socket_config;
mod unicode;

pub use object_attributes::{
    ObjectAttributesBuilder, ObjectAttributesDescriptor, SecurityDescriptorRef,
    OBJECT_ATTRIBUTES_LEN, offsets,
};
pub use socket_config::{SocketConfig, SOCKET_CONFIG_LEN};
pub use unicode::{UnicodeStringDescriptor, WideString};
