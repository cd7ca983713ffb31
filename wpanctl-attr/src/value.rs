use super::{Attribute, AttributeKind, Attributes, DecodeError, Malformed, Result};

/// A typed attribute payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeValue<'a> {
    U8(u8),
    S8(i8),
    U16(u16),
    U32(u32),
    S32(i32),
    U64(u64),
    S64(i64),
    /// A raw byte array.
    Bytes(&'a [u8]),
    /// A string, encoded with a NUL terminator.
    String(&'a str),
    /// A zero-length attribute whose presence is the value.
    Flag,
    /// The encoded payload of a nested attribute list.
    Nested(&'a [u8]),
}

impl<'a> AttributeValue<'a> {
    /// Decode the payload of `attr` as the given kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload width does not match a fixed-width
    /// kind, if a string is not UTF-8, if a flag carries a payload or if a
    /// nested payload is not a valid attribute sequence.
    pub fn parse(attr: &Attribute<&'a [u8]>, kind: AttributeKind<'_>) -> Result<Self> {
        Ok(match kind {
            AttributeKind::U8 => Self::U8(attr.as_u8()?),
            AttributeKind::S8 => Self::S8(attr.as_s8()?),
            AttributeKind::U16 => Self::U16(attr.as_u16()?),
            AttributeKind::U32 => Self::U32(attr.as_u32()?),
            AttributeKind::S32 => Self::S32(attr.as_s32()?),
            AttributeKind::U64 => Self::U64(attr.as_u64()?),
            AttributeKind::S64 => Self::S64(attr.as_s64()?),
            AttributeKind::String { .. } => Self::String(attr.as_str_ref()?),
            AttributeKind::Flag => {
                if !attr.payload_ref().is_empty() {
                    return Err(DecodeError::Malformed(Malformed::WidthMismatch {
                        tag: attr.tag(),
                        expected: 0,
                        found: attr.payload_ref().len(),
                    }));
                }
                Self::Flag
            }
            AttributeKind::Nested(_) | AttributeKind::NestedArray(_) => {
                for nested in attr.nested_ref() {
                    nested?;
                }
                Self::Nested(attr.payload_ref())
            }
            AttributeKind::Binary { .. } | AttributeKind::Unchecked => {
                Self::Bytes(attr.payload_ref())
            }
        })
    }

    /// The [`AttributeKind`] that decodes back into this value.
    pub fn kind(&self) -> AttributeKind<'static> {
        match self {
            Self::U8(_) => AttributeKind::U8,
            Self::S8(_) => AttributeKind::S8,
            Self::U16(_) => AttributeKind::U16,
            Self::U32(_) => AttributeKind::U32,
            Self::S32(_) => AttributeKind::S32,
            Self::U64(_) => AttributeKind::U64,
            Self::S64(_) => AttributeKind::S64,
            Self::Bytes(_) => AttributeKind::Unchecked,
            Self::String(_) => AttributeKind::String { max_len: None },
            Self::Flag => AttributeKind::Flag,
            Self::Nested(_) => AttributeKind::Nested(None),
        }
    }

    /// Length of the encoded payload, padding excluded.
    pub fn payload_len(&self) -> usize {
        match self {
            Self::U8(_) | Self::S8(_) => 1,
            Self::U16(_) => 2,
            Self::U32(_) | Self::S32(_) => 4,
            Self::U64(_) | Self::S64(_) => 8,
            Self::Bytes(bytes) | Self::Nested(bytes) => bytes.len(),
            Self::String(s) => s.len() + 1,
            Self::Flag => 0,
        }
    }

    /// Return an [`Iterator`] over the children of a nested value.
    pub fn children(&self) -> Option<Attributes<'a>> {
        match self {
            Self::Nested(payload) => Some(Attributes::new(payload)),
            _ => None,
        }
    }
}

impl core::fmt::Display for AttributeValue<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::U8(v) => write!(f, "{v}"),
            Self::S8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::S32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::S64(v) => write!(f, "{v}"),
            Self::Bytes(b) => write!(f, "{b:02x?}"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Flag => write!(f, "flag"),
            Self::Nested(b) => write!(f, "nested ({} bytes)", b.len()),
        }
    }
}
