use super::{AttributeHeader, Attributes, ATTRIBUTE_HEADER_LEN};
use super::{DecodeError, Malformed, Result};
use bitflags::bitflags;

bitflags! {
    /// Flag bits carried in the upper bits of the attribute type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AttributeFlags: u16 {
        /// The payload is a sequence of attributes.
        const NESTED = 1 << 15;
        /// The payload is in network byte order.
        const NET_BYTEORDER = 1 << 14;
    }
}

/// Mask selecting the tag out of the raw attribute type.
pub const ATTRIBUTE_TAG_MASK: u16 = !(AttributeFlags::NESTED.bits() | AttributeFlags::NET_BYTEORDER.bits());

/// Round `len` up to the 4 byte attribute alignment.
pub const fn align(len: usize) -> usize {
    (len + 3) & !3
}

/// A reader/writer for a single attribute.
///
/// ```notrust
/// +--------+------+--------------------+---------+
/// | Length | Type | Payload...         | Padding |
/// +--------+------+--------------------+---------+
/// 0        2      4                    Length    align(Length)
/// ```
///
/// The buffer may be longer than the attribute; [`Attribute::payload`] only
/// covers `Length - 4` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute<T: AsRef<[u8]>> {
    buffer: T,
}

impl<T: AsRef<[u8]>> Attribute<T> {
    /// Create a new [`Attribute`] reader/writer from a given buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is too short for the header, or if the
    /// declared length is shorter than the header or longer than the buffer.
    pub fn new(buffer: T) -> Result<Self> {
        let attr = Self::new_unchecked(buffer);
        attr.check_len()?;
        Ok(attr)
    }

    /// Check that the header and the declared payload fit in the buffer.
    pub fn check_len(&self) -> Result<()> {
        let available = self.buffer.as_ref().len();
        if available < ATTRIBUTE_HEADER_LEN {
            return Err(DecodeError::Malformed(Malformed::Truncated {
                needed: ATTRIBUTE_HEADER_LEN,
                available,
            }));
        }

        let length = self.length();
        if (length as usize) < ATTRIBUTE_HEADER_LEN {
            return Err(DecodeError::Malformed(Malformed::ShortLength {
                tag: self.tag(),
                length,
            }));
        }

        if length as usize > available {
            return Err(DecodeError::Malformed(Malformed::Overrun {
                tag: self.tag(),
                length,
                available,
            }));
        }

        Ok(())
    }

    /// Create a new [`Attribute`] reader/writer without length checking.
    pub fn new_unchecked(buffer: T) -> Self {
        Self { buffer }
    }

    fn header(&self) -> AttributeHeader<&[u8]> {
        AttributeHeader::new_unchecked(&self.buffer.as_ref()[..ATTRIBUTE_HEADER_LEN])
    }

    /// Return the declared length (header and payload, padding excluded).
    pub fn length(&self) -> u16 {
        self.header().length()
    }

    /// Return the attribute tag, with the flag bits masked off.
    pub fn tag(&self) -> u16 {
        self.header().kind() & ATTRIBUTE_TAG_MASK
    }

    /// Return the [`AttributeFlags`].
    pub fn flags(&self) -> AttributeFlags {
        AttributeFlags::from_bits_truncate(self.header().kind())
    }

    /// Return the number of bytes the attribute occupies, padding included.
    pub fn total_len(&self) -> usize {
        align(self.length() as usize)
    }

    /// Return the payload.
    pub fn payload(&self) -> &[u8] {
        &self.buffer.as_ref()[ATTRIBUTE_HEADER_LEN..self.length() as usize]
    }

    fn fixed<const N: usize>(&self) -> Result<[u8; N]> {
        let payload = self.payload();
        if payload.len() != N {
            return Err(DecodeError::Malformed(Malformed::WidthMismatch {
                tag: self.tag(),
                expected: N,
                found: payload.len(),
            }));
        }

        let mut raw = [0u8; N];
        raw.copy_from_slice(payload);
        Ok(raw)
    }

    /// Read the payload as a `u8`.
    pub fn as_u8(&self) -> Result<u8> {
        self.fixed::<1>().map(u8::from_le_bytes)
    }

    /// Read the payload as an `i8`.
    pub fn as_s8(&self) -> Result<i8> {
        self.fixed::<1>().map(i8::from_le_bytes)
    }

    /// Read the payload as a `u16`.
    pub fn as_u16(&self) -> Result<u16> {
        self.fixed::<2>().map(u16::from_le_bytes)
    }

    /// Read the payload as a `u32`.
    pub fn as_u32(&self) -> Result<u32> {
        self.fixed::<4>().map(u32::from_le_bytes)
    }

    /// Read the payload as an `i32`.
    pub fn as_s32(&self) -> Result<i32> {
        self.fixed::<4>().map(i32::from_le_bytes)
    }

    /// Read the payload as a `u64`.
    pub fn as_u64(&self) -> Result<u64> {
        self.fixed::<8>().map(u64::from_le_bytes)
    }

    /// Read the payload as an `i64`.
    pub fn as_s64(&self) -> Result<i64> {
        self.fixed::<8>().map(i64::from_le_bytes)
    }

    /// Read the payload as a string. Everything from the first NUL on is
    /// ignored; a payload without terminator is accepted.
    pub fn as_str(&self) -> Result<&str> {
        let payload = self.payload();
        let end = payload.iter().position(|b| *b == 0).unwrap_or(payload.len());
        core::str::from_utf8(&payload[..end])
            .map_err(|_| DecodeError::Malformed(Malformed::InvalidUtf8 { tag: self.tag() }))
    }

    /// Return an [`Iterator`] over the attributes nested in the payload.
    pub fn nested(&self) -> Attributes<'_> {
        Attributes::new(self.payload())
    }
}

impl<'a> Attribute<&'a [u8]> {
    /// Return the payload with the lifetime of the underlying buffer.
    pub fn payload_ref(&self) -> &'a [u8] {
        let length = self.length() as usize;
        &self.buffer[ATTRIBUTE_HEADER_LEN..length]
    }

    /// Like [`Attribute::nested`], borrowing from the underlying buffer.
    pub fn nested_ref(&self) -> Attributes<'a> {
        Attributes::new(self.payload_ref())
    }

    /// Like [`Attribute::as_str`], borrowing from the underlying buffer.
    pub fn as_str_ref(&self) -> Result<&'a str> {
        let payload = self.payload_ref();
        let end = payload.iter().position(|b| *b == 0).unwrap_or(payload.len());
        core::str::from_utf8(&payload[..end])
            .map_err(|_| DecodeError::Malformed(Malformed::InvalidUtf8 { tag: self.tag() }))
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Attribute<T> {
    /// Set the declared length (header and payload).
    pub fn set_length(&mut self, length: u16) {
        AttributeHeader::new_unchecked(&mut self.buffer.as_mut()[..ATTRIBUTE_HEADER_LEN])
            .set_length(length);
    }

    /// Set the tag and the flag bits.
    pub fn set_tag(&mut self, tag: u16, flags: AttributeFlags) {
        AttributeHeader::new_unchecked(&mut self.buffer.as_mut()[..ATTRIBUTE_HEADER_LEN])
            .set_kind((tag & ATTRIBUTE_TAG_MASK) | flags.bits());
    }

    /// Return a mutable reference to everything after the header.
    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.buffer.as_mut()[ATTRIBUTE_HEADER_LEN..]
    }
}

impl<T: AsRef<[u8]>> core::fmt::Display for Attribute<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "attr {} ({} bytes)", self.tag(), self.payload().len())?;
        if self.flags().contains(AttributeFlags::NESTED) {
            write!(f, " nested")?;
        }
        Ok(())
    }
}
