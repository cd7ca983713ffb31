use super::{align, Attribute, AttributeFlags, AttributeValue, EncodeError, ATTRIBUTE_HEADER_LEN};

/// Appends attributes to a byte buffer.
///
/// Every attribute is written with its header, its payload and zeroed padding
/// up to the next 4 byte boundary. A failed write leaves the buffer contents
/// before the failing attribute untouched.
#[derive(Debug)]
pub struct AttributeWriter<'b> {
    buffer: &'b mut [u8],
    len: usize,
}

impl<'b> AttributeWriter<'b> {
    /// Create a writer appending at the start of `buffer`.
    pub fn new(buffer: &'b mut [u8]) -> Self {
        Self { buffer, len: 0 }
    }

    /// Return the number of bytes written, padding included.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing was written.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Consume the writer and return the number of bytes written.
    pub fn finish(self) -> usize {
        self.len
    }

    fn reserve(&mut self, payload_len: usize) -> Result<usize, EncodeError> {
        let needed = align(ATTRIBUTE_HEADER_LEN + payload_len);
        let remaining = self.buffer.len() - self.len;
        if needed > remaining || ATTRIBUTE_HEADER_LEN + payload_len > u16::MAX as usize {
            return Err(EncodeError::BufferExhausted { needed, remaining });
        }
        Ok(needed)
    }

    fn put_with(
        &mut self,
        tag: u16,
        flags: AttributeFlags,
        payload_len: usize,
        fill: impl FnOnce(&mut [u8]),
    ) -> Result<(), EncodeError> {
        let total = self.reserve(payload_len)?;
        let region = &mut self.buffer[self.len..][..total];
        region.fill(0);

        let mut attr = Attribute::new_unchecked(&mut region[..]);
        attr.set_length((ATTRIBUTE_HEADER_LEN + payload_len) as u16);
        attr.set_tag(tag, flags);
        fill(&mut attr.payload_mut()[..payload_len]);

        self.len += total;
        Ok(())
    }

    /// Append a raw payload.
    pub fn put_bytes(&mut self, tag: impl Into<u16>, payload: &[u8]) -> Result<(), EncodeError> {
        self.put_with(tag.into(), AttributeFlags::empty(), payload.len(), |p| {
            p.copy_from_slice(payload)
        })
    }

    /// Append a `u8`.
    pub fn put_u8(&mut self, tag: impl Into<u16>, value: u8) -> Result<(), EncodeError> {
        self.put_bytes(tag, &value.to_le_bytes())
    }

    /// Append an `i8`.
    pub fn put_s8(&mut self, tag: impl Into<u16>, value: i8) -> Result<(), EncodeError> {
        self.put_bytes(tag, &value.to_le_bytes())
    }

    /// Append a `u16`.
    pub fn put_u16(&mut self, tag: impl Into<u16>, value: u16) -> Result<(), EncodeError> {
        self.put_bytes(tag, &value.to_le_bytes())
    }

    /// Append a `u32`.
    pub fn put_u32(&mut self, tag: impl Into<u16>, value: u32) -> Result<(), EncodeError> {
        self.put_bytes(tag, &value.to_le_bytes())
    }

    /// Append an `i32`.
    pub fn put_s32(&mut self, tag: impl Into<u16>, value: i32) -> Result<(), EncodeError> {
        self.put_bytes(tag, &value.to_le_bytes())
    }

    /// Append a `u64`.
    pub fn put_u64(&mut self, tag: impl Into<u16>, value: u64) -> Result<(), EncodeError> {
        self.put_bytes(tag, &value.to_le_bytes())
    }

    /// Append an `i64`.
    pub fn put_s64(&mut self, tag: impl Into<u16>, value: i64) -> Result<(), EncodeError> {
        self.put_bytes(tag, &value.to_le_bytes())
    }

    /// Append a NUL terminated string.
    pub fn put_string(&mut self, tag: impl Into<u16>, value: &str) -> Result<(), EncodeError> {
        let bytes = value.as_bytes();
        // The terminator is already zero.
        self.put_with(tag.into(), AttributeFlags::empty(), bytes.len() + 1, |p| {
            p[..bytes.len()].copy_from_slice(bytes)
        })
    }

    /// Append a zero-length attribute.
    pub fn put_flag(&mut self, tag: impl Into<u16>) -> Result<(), EncodeError> {
        self.put_bytes(tag, &[])
    }

    /// Append a typed value.
    pub fn put_value(
        &mut self,
        tag: impl Into<u16>,
        value: &AttributeValue<'_>,
    ) -> Result<(), EncodeError> {
        match *value {
            AttributeValue::U8(v) => self.put_u8(tag, v),
            AttributeValue::S8(v) => self.put_s8(tag, v),
            AttributeValue::U16(v) => self.put_u16(tag, v),
            AttributeValue::U32(v) => self.put_u32(tag, v),
            AttributeValue::S32(v) => self.put_s32(tag, v),
            AttributeValue::U64(v) => self.put_u64(tag, v),
            AttributeValue::S64(v) => self.put_s64(tag, v),
            AttributeValue::Bytes(v) => self.put_bytes(tag, v),
            AttributeValue::String(v) => self.put_string(tag, v),
            AttributeValue::Flag => self.put_flag(tag),
            AttributeValue::Nested(v) => self.put_with(tag.into(), AttributeFlags::NESTED, v.len(), |p| {
                p.copy_from_slice(v)
            }),
        }
    }

    /// Append a nested attribute whose children are written by `f`.
    ///
    /// The header is patched once `f` returns; if `f` fails, nothing of the
    /// nested attribute is kept.
    pub fn nested<F>(&mut self, tag: impl Into<u16>, f: F) -> Result<(), EncodeError>
    where
        F: FnOnce(&mut AttributeWriter<'_>) -> Result<(), EncodeError>,
    {
        let tag = tag.into();
        self.reserve(0)?;

        let start = self.len;
        let (header, rest) = self.buffer[start..].split_at_mut(ATTRIBUTE_HEADER_LEN);
        let mut children = AttributeWriter::new(rest);
        f(&mut children)?;
        let children_len = children.finish();

        let length = ATTRIBUTE_HEADER_LEN + children_len;
        if length > u16::MAX as usize {
            return Err(EncodeError::BufferExhausted {
                needed: length,
                remaining: u16::MAX as usize,
            });
        }

        let mut attr = Attribute::new_unchecked(&mut header[..]);
        attr.set_length(length as u16);
        attr.set_tag(tag, AttributeFlags::NESTED);

        self.len += length;
        Ok(())
    }
}
