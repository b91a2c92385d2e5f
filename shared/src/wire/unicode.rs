use crate::errors::VsockError;

/// Owned UTF-16 backing storage for a counted native string.
///
/// The buffer holds exactly the code units of the source text. It is not NUL-terminated:
/// counted strings carry their length and the native open call does not need the terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WideString {
    units: Vec<u16>,
}

impl WideString {
    /// Encode `s` as UTF-16.
    ///
    /// No normalization or case folding is applied. Fails if the byte length does not fit the
    /// 16-bit length fields of the descriptor.
    pub fn encode(s: &str) -> Result<Self, VsockError> {
        let units: Vec<u16> = s.encode_utf16().collect();
        if units.len() * 2 > u16::MAX as usize {
            return Err(VsockError::AttributeConstruction {
                name: s.to_owned(),
                reason: format!(
                    "{} UTF-16 code units exceed the {} byte limit of a counted string",
                    units.len(),
                    u16::MAX
                ),
            });
        }
        Ok(Self { units })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Borrow a counted-string descriptor over this buffer.
    pub fn descriptor(&self) -> UnicodeStringDescriptor<'_> {
        // Length checked in `encode`.
        let bytes = (self.units.len() * 2) as u16;
        UnicodeStringDescriptor {
            byte_length: bytes,
            max_byte_length: bytes,
            buffer: &self.units,
        }
    }
}

/// UNICODE_STRING: `{ Length, MaximumLength, Buffer }`, lengths in bytes.
///
/// Owns nothing. The lifetime ties it to the [`WideString`] it was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnicodeStringDescriptor<'a> {
    byte_length: u16,
    max_byte_length: u16,
    buffer: &'a [u16],
}

impl<'a> UnicodeStringDescriptor<'a> {
    #[inline]
    pub fn byte_length(&self) -> u16 {
        self.byte_length
    }

    #[inline]
    pub fn max_byte_length(&self) -> u16 {
        self.max_byte_length
    }

    /// The code units covered by `byte_length`.
    #[inline]
    pub fn code_units(&self) -> &'a [u16] {
        &self.buffer[..self.byte_length as usize / 2]
    }

    #[inline]
    pub fn as_ptr(&self) -> *const u16 {
        self.buffer.as_ptr()
    }

    /// Decode back to text. Unpaired surrogates become U+FFFD.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(self.code_units())
    }
}
