use super::{Attribute, AttributeKind, AttributeValue, Attributes, Policy, Result};
use super::{DecodeError, Malformed};
use heapless::Vec;

/// The maximum number of distinct tags an [`AttributeSet`] can hold.
pub const MAX_ATTRIBUTES: usize = 64;

/// The attributes of one sequence, indexed by tag.
///
/// When a tag occurs more than once the last occurrence wins; the attribute
/// keeps the position of the first one in [`AttributeSet::iter`].
#[derive(Debug, Clone, Default)]
pub struct AttributeSet<'a> {
    attributes: Vec<Attribute<&'a [u8]>, MAX_ATTRIBUTES>,
}

impl<'a> AttributeSet<'a> {
    /// Collect a sequence of attributes without validating payloads.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let mut set = Self::default();
        for attr in Attributes::new(data) {
            set.insert(attr?)?;
        }
        Ok(set)
    }

    /// Collect a sequence of attributes, validating every payload with
    /// `policy`.
    pub fn parse_with(data: &'a [u8], policy: &Policy<'_>) -> Result<Self> {
        let mut set = Self::default();
        for attr in Attributes::new(data) {
            let attr = attr?;
            policy.validate(&attr)?;
            set.insert(attr)?;
        }
        Ok(set)
    }

    fn insert(&mut self, attr: Attribute<&'a [u8]>) -> Result<()> {
        if let Some(slot) = self.attributes.iter_mut().find(|a| a.tag() == attr.tag()) {
            *slot = attr;
            return Ok(());
        }

        self.attributes.push(attr).map_err(|_| {
            DecodeError::Malformed(Malformed::TooManyAttributes {
                capacity: MAX_ATTRIBUTES,
            })
        })
    }

    /// Return the attribute with the given tag.
    pub fn get(&self, tag: impl Into<u16>) -> Option<&Attribute<&'a [u8]>> {
        let tag = tag.into();
        self.attributes.iter().find(|a| a.tag() == tag)
    }

    /// Returns `true` if an attribute with the given tag is present.
    pub fn contains(&self, tag: impl Into<u16>) -> bool {
        self.get(tag).is_some()
    }

    /// Return an [`Iterator`] over the attributes, in order of first
    /// occurrence.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute<&'a [u8]>> {
        self.attributes.iter()
    }

    /// Return the number of distinct tags.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns `true` if the set holds no attributes.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    fn read<V>(
        &self,
        tag: impl Into<u16>,
        f: impl FnOnce(&Attribute<&'a [u8]>) -> Result<V>,
    ) -> Result<Option<V>> {
        self.get(tag).map(f).transpose()
    }

    /// Read an optional `u8`.
    pub fn u8(&self, tag: impl Into<u16>) -> Result<Option<u8>> {
        self.read(tag, |a| a.as_u8())
    }

    /// Read an optional `i8`.
    pub fn s8(&self, tag: impl Into<u16>) -> Result<Option<i8>> {
        self.read(tag, |a| a.as_s8())
    }

    /// Read an optional `u16`.
    pub fn u16(&self, tag: impl Into<u16>) -> Result<Option<u16>> {
        self.read(tag, |a| a.as_u16())
    }

    /// Read an optional `u32`.
    pub fn u32(&self, tag: impl Into<u16>) -> Result<Option<u32>> {
        self.read(tag, |a| a.as_u32())
    }

    /// Read an optional `i32`.
    pub fn s32(&self, tag: impl Into<u16>) -> Result<Option<i32>> {
        self.read(tag, |a| a.as_s32())
    }

    /// Read an optional `u64`.
    pub fn u64(&self, tag: impl Into<u16>) -> Result<Option<u64>> {
        self.read(tag, |a| a.as_u64())
    }

    /// Read an optional `i64`.
    pub fn s64(&self, tag: impl Into<u16>) -> Result<Option<i64>> {
        self.read(tag, |a| a.as_s64())
    }

    /// Read an optional string.
    pub fn string(&self, tag: impl Into<u16>) -> Result<Option<&'a str>> {
        self.read(tag, |a| a.as_str_ref())
    }

    /// Read an optional raw payload.
    pub fn bytes(&self, tag: impl Into<u16>) -> Option<&'a [u8]> {
        self.get(tag).map(|a| a.payload_ref())
    }

    /// Index the attributes nested in an optional attribute.
    pub fn nested(&self, tag: impl Into<u16>) -> Result<Option<AttributeSet<'a>>> {
        self.read(tag, |a| AttributeSet::parse(a.payload_ref()))
    }

    /// Like [`AttributeSet::nested`], validating the children with `policy`.
    pub fn nested_with(
        &self,
        tag: impl Into<u16>,
        policy: &Policy<'_>,
    ) -> Result<Option<AttributeSet<'a>>> {
        self.read(tag, |a| AttributeSet::parse_with(a.payload_ref(), policy))
    }

    /// Decode an optional attribute as the given kind.
    pub fn value(
        &self,
        tag: impl Into<u16>,
        kind: AttributeKind<'_>,
    ) -> Result<Option<AttributeValue<'a>>> {
        self.read(tag, |a| AttributeValue::parse(a, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_occurrence_wins() {
        let data = [
            0x05, 0x00, 0x08, 0x00, 0x0b, 0x00, 0x00, 0x00, // channel 11
            0x05, 0x00, 0x07, 0x00, 0x00, 0x00, 0x00, 0x00, // page 0
            0x05, 0x00, 0x08, 0x00, 0x0f, 0x00, 0x00, 0x00, // channel 15
        ];
        let set = AttributeSet::parse(&data).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.u8(8u16), Ok(Some(15)));
        let tags: std::vec::Vec<u16> = set.iter().map(|a| a.tag()).collect();
        assert_eq!(tags, [8, 7]);
    }

    #[test]
    fn missing_is_none() {
        let set = AttributeSet::parse(&[]).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.u16(9u16), Ok(None));
        assert!(!set.contains(9u16));
    }

    #[test]
    fn typed_read_checks_width() {
        let data = [0x05, 0x00, 0x09, 0x00, 0x34, 0x00, 0x00, 0x00];
        let set = AttributeSet::parse(&data).unwrap();
        assert!(set.u16(9u16).is_err());
        assert_eq!(set.bytes(9u16), Some(&[0x34][..]));
    }

    #[test]
    fn capacity() {
        let mut data = std::vec::Vec::new();
        for tag in 0..=MAX_ATTRIBUTES as u16 {
            data.extend_from_slice(&[0x04, 0x00]);
            data.extend_from_slice(&tag.to_le_bytes());
        }
        assert_eq!(
            AttributeSet::parse(&data).unwrap_err(),
            DecodeError::Malformed(Malformed::TooManyAttributes {
                capacity: MAX_ATTRIBUTES
            })
        );
    }
}
