use super::{Attribute, DecodeError, Malformed, Result, ATTRIBUTE_HEADER_LEN};

/// An [`Iterator`] over a sequence of attributes, as found in the attribute
/// area of a message or in the payload of a nested attribute.
///
/// Every item is either a checked [`Attribute`] or the error that stopped the
/// walk; after an error the iterator is terminated.
#[derive(Debug, Clone)]
pub struct Attributes<'f> {
    data: &'f [u8],
    offset: usize,
    terminated: bool,
}

impl<'f> Attributes<'f> {
    /// Create a new [`Attributes`] iterator.
    pub fn new(data: &'f [u8]) -> Self {
        Self {
            data,
            offset: 0,
            terminated: data.is_empty(),
        }
    }

    /// The number of bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<'f> Iterator for Attributes<'f> {
    type Item = Result<Attribute<&'f [u8]>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.terminated {
            return None;
        }

        let remaining = &self.data[self.offset..];
        match Attribute::new(remaining) {
            Ok(attr) => {
                // The padding of the last attribute may be cut off.
                self.offset += attr.total_len().min(remaining.len());
                if self.offset >= self.data.len() {
                    self.terminated = true;
                }
                Some(Ok(attr))
            }
            Err(err) => {
                self.terminated = true;
                Some(Err(err))
            }
        }
    }
}

/// Walk the entries nested in `container` and copy the `u8` payload of every
/// entry tagged `expected_tag` into `out`.
///
/// The walk stops at the first entry with another tag or that is not a
/// single byte wide, at the first malformed entry, or once `out` is full.
/// Returns the number of entries copied.
pub fn decode_nested_array(container: &[u8], expected_tag: u16, out: &mut [u8]) -> usize {
    let mut len = 0;

    for entry in Attributes::new(container) {
        if len >= out.len() {
            break;
        }

        let Ok(entry) = entry else {
            break;
        };

        if entry.tag() != expected_tag {
            break;
        }

        let Ok(value) = entry.as_u8() else {
            break;
        };

        out[len] = value;
        len += 1;
    }

    len
}

/// Check that `data` is a complete sequence of well-formed attributes.
pub fn check_stream(data: &[u8]) -> Result<usize> {
    let mut count = 0;
    for attr in Attributes::new(data) {
        attr?;
        count += 1;
    }
    Ok(count)
}

pub(crate) fn truncated(needed: usize, available: usize) -> DecodeError {
    DecodeError::Malformed(Malformed::Truncated { needed, available })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRY: u16 = 31;

    fn entry(tag: u16, value: u8) -> [u8; 8] {
        let tag = tag.to_le_bytes();
        [0x05, 0x00, tag[0], tag[1], value, 0x00, 0x00, 0x00]
    }

    #[test]
    fn iterate() {
        let mut data = std::vec::Vec::new();
        data.extend_from_slice(&entry(ENTRY, 10));
        data.extend_from_slice(&entry(ENTRY, 20));

        let mut iter = Attributes::new(&data);
        assert_eq!(iter.next().unwrap().unwrap().as_u8(), Ok(10));
        assert_eq!(iter.next().unwrap().unwrap().as_u8(), Ok(20));
        assert!(iter.next().is_none());
        assert_eq!(iter.offset(), 16);
    }

    #[test]
    fn last_padding_may_be_missing() {
        let data = [0x05, 0x00, 0x01, 0x00, 0x2a];
        let attrs: std::vec::Vec<_> = Attributes::new(&data).collect();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].unwrap().as_u8(), Ok(0x2a));
    }

    #[test]
    fn stops_mid_attribute() {
        let mut data = std::vec::Vec::new();
        data.extend_from_slice(&entry(ENTRY, 10));
        data.extend_from_slice(&[0x05, 0x00]);

        let mut iter = Attributes::new(&data);
        assert!(iter.next().unwrap().is_ok());
        assert_eq!(
            iter.next().unwrap(),
            Err(truncated(ATTRIBUTE_HEADER_LEN, 2))
        );
        assert!(iter.next().is_none());
        assert!(check_stream(&data).is_err());
    }

    #[test]
    fn array_stops_at_mismatch() {
        let mut data = std::vec::Vec::new();
        data.extend_from_slice(&entry(ENTRY, 1));
        data.extend_from_slice(&entry(ENTRY, 2));
        data.extend_from_slice(&entry(ENTRY + 1, 3));
        data.extend_from_slice(&entry(ENTRY, 4));

        let mut out = [0u8; 27];
        assert_eq!(decode_nested_array(&data, ENTRY, &mut out), 2);
        assert_eq!(&out[..2], &[1, 2]);
    }

    #[test]
    fn array_is_bounded() {
        let mut data = std::vec::Vec::new();
        for i in 0..6 {
            data.extend_from_slice(&entry(ENTRY, i));
        }

        let mut out = [0u8; 4];
        assert_eq!(decode_nested_array(&data, ENTRY, &mut out), 4);
        assert_eq!(out, [0, 1, 2, 3]);
    }

    #[test]
    fn array_stops_at_wide_entry() {
        let mut data = std::vec::Vec::new();
        data.extend_from_slice(&entry(ENTRY, 1));
        data.extend_from_slice(&[0x06, 0x00, ENTRY as u8, 0x00, 0x01, 0x02, 0x00, 0x00]);

        let mut out = [0u8; 4];
        assert_eq!(decode_nested_array(&data, ENTRY, &mut out), 1);
    }
}
