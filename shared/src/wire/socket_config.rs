/// Size of the driver's VIRTIO_VSOCK_CONFIG record.
pub const SOCKET_CONFIG_LEN: usize = 8;

const GUEST_CID: std::ops::Range<usize> = 0..8;

/// Guest configuration reported by the viosock driver.
///
/// Wire layout (8 bytes, no header, no padding):
///
/// | offset | size | field       |
/// |--------|------|-------------|
/// | 0      | 8    | `guest_cid` (little-endian u64) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SocketConfig {
    pub guest_cid: u64,
}

impl SocketConfig {
    pub fn from_wire(bytes: &[u8; SOCKET_CONFIG_LEN]) -> Self {
        let mut cid = [0u8; 8];
        cid.copy_from_slice(&bytes[GUEST_CID]);
        Self {
            guest_cid: u64::from_le_bytes(cid),
        }
    }

    pub fn to_wire(&self) -> [u8; SOCKET_CONFIG_LEN] {
        let mut out = [0u8; SOCKET_CONFIG_LEN];
        out[GUEST_CID].copy_from_slice(&self.guest_cid.to_le_bytes());
        out
    }

    /// Decode from a slice that must be exactly [`SOCKET_CONFIG_LEN`] bytes long.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let fixed: &[u8; SOCKET_CONFIG_LEN] = bytes.try_into().ok()?;
        Some(Self::from_wire(fixed))
    }
}
