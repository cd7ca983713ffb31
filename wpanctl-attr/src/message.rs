use super::{AttributeSet, AttributeWriter, Attributes, Policy, Result};
use super::{DecodeError, EncodeError, Malformed};
use super::{GenlHeader, NetlinkHeader, MESSAGE_HEADER_LEN, NETLINK_HEADER_LEN};
use super::{NLMSG_DONE, NLMSG_ERROR};
use bitflags::bitflags;

bitflags! {
    /// Netlink message flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MessageFlags: u16 {
        /// The message is a request.
        const REQUEST = 0x1;
        /// The message is part of a multipart reply.
        const MULTI = 0x2;
        /// Request an acknowledgement.
        const ACK = 0x4;
        /// Request the whole table (`ROOT | MATCH`).
        const DUMP = 0x300;
    }
}

/// A reader/writer for a generic netlink message.
///
/// ```notrust
/// +----------------+-------------+-------------------------+
/// | Netlink header | Genl header | Attributes...           |
/// +----------------+-------------+-------------------------+
/// 0                16            20                        Length
/// ```
///
/// Bytes past the length declared in the netlink header are ignored.
#[derive(Debug, Clone, Copy)]
pub struct Message<T: AsRef<[u8]>> {
    buffer: T,
}

impl<T: AsRef<[u8]>> Message<T> {
    /// Create a new [`Message`] reader/writer from a given buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer cannot hold the netlink header, or if
    /// the declared length is shorter than the netlink header or longer than
    /// the buffer.
    pub fn new(buffer: T) -> Result<Self> {
        let message = Self::new_unchecked(buffer);
        message.check_len()?;
        Ok(message)
    }

    /// Check the buffer against the declared message length.
    ///
    /// Only the netlink header is required: error and done messages carry no
    /// generic netlink header.
    pub fn check_len(&self) -> Result<()> {
        let available = self.buffer.as_ref().len();
        if available < NETLINK_HEADER_LEN {
            return Err(DecodeError::Malformed(Malformed::Truncated {
                needed: NETLINK_HEADER_LEN,
                available,
            }));
        }

        let length = self.netlink_header().length();
        if (length as usize) < NETLINK_HEADER_LEN || length as usize > available {
            return Err(DecodeError::Malformed(Malformed::BadMessageLength {
                length,
                available,
            }));
        }

        Ok(())
    }

    /// Create a new [`Message`] reader/writer without checking the buffer.
    pub fn new_unchecked(buffer: T) -> Self {
        Self { buffer }
    }

    /// Return the bytes of the message, bounded by the declared length.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer.as_ref()[..self.length()]
    }

    fn length(&self) -> usize {
        self.netlink_header().length() as usize
    }

    /// Return a [`NetlinkHeader`] reader.
    pub fn netlink_header(&self) -> NetlinkHeader<&[u8]> {
        NetlinkHeader::new_unchecked(&self.buffer.as_ref()[..NETLINK_HEADER_LEN])
    }

    /// Return the message type.
    pub fn kind(&self) -> u16 {
        self.netlink_header().kind()
    }

    /// Return the [`MessageFlags`].
    pub fn flags(&self) -> MessageFlags {
        MessageFlags::from_bits_truncate(self.netlink_header().flags())
    }

    /// Return a [`GenlHeader`] reader.
    pub fn genl_header(&self) -> Result<GenlHeader<&[u8]>> {
        let bytes = &self.buffer.as_ref()[NETLINK_HEADER_LEN..self.length()];
        GenlHeader::new(bytes)
    }

    /// Return the generic netlink command, or 0 when there is no generic
    /// netlink header.
    pub fn command(&self) -> u8 {
        self.genl_header().map(|h| h.command()).unwrap_or(0)
    }

    /// Return the attribute area.
    pub fn attribute_area(&self) -> &[u8] {
        let length = self.length();
        if length < MESSAGE_HEADER_LEN {
            return &[];
        }
        &self.buffer.as_ref()[MESSAGE_HEADER_LEN..length]
    }

    /// Return an [`Iterator`] over the attribute area.
    pub fn attributes(&self) -> Attributes<'_> {
        Attributes::new(self.attribute_area())
    }

    /// Collect the attribute area into an [`AttributeSet`], validating every
    /// attribute with `policy`.
    pub fn parse(&self, policy: &Policy<'_>) -> Result<AttributeSet<'_>> {
        AttributeSet::parse_with(self.attribute_area(), policy)
    }

    /// Returns `true` for the message terminating a dump.
    pub fn is_done(&self) -> bool {
        self.kind() == NLMSG_DONE
    }

    /// Return the error code of an error message. Zero is an acknowledgement.
    pub fn error_code(&self) -> Option<Result<i32>> {
        if self.kind() != NLMSG_ERROR {
            return None;
        }

        let payload = &self.buffer.as_ref()[NETLINK_HEADER_LEN..self.length()];
        Some(match payload.get(..4) {
            Some(raw) => {
                let mut code = [0u8; 4];
                code.copy_from_slice(raw);
                Ok(i32::from_le_bytes(code))
            }
            None => Err(DecodeError::Malformed(Malformed::Truncated {
                needed: NETLINK_HEADER_LEN + 4,
                available: self.length(),
            })),
        })
    }
}

/// Writes a generic netlink request: both headers followed by attributes.
#[derive(Debug)]
pub struct MessageWriter<'b> {
    header: &'b mut [u8],
    attributes: AttributeWriter<'b>,
}

impl<'b> MessageWriter<'b> {
    /// Write both headers at the start of `buffer`.
    pub fn new(
        buffer: &'b mut [u8],
        family: u16,
        flags: MessageFlags,
        sequence: u32,
        command: u8,
        version: u8,
    ) -> core::result::Result<Self, EncodeError> {
        if buffer.len() < MESSAGE_HEADER_LEN {
            return Err(EncodeError::BufferExhausted {
                needed: MESSAGE_HEADER_LEN,
                remaining: buffer.len(),
            });
        }

        let (header, rest) = buffer.split_at_mut(MESSAGE_HEADER_LEN);
        header.fill(0);

        let mut nl = NetlinkHeader::new_unchecked(&mut header[..NETLINK_HEADER_LEN]);
        nl.set_kind(family);
        nl.set_flags(flags.bits());
        nl.set_sequence(sequence);

        let mut genl = GenlHeader::new_unchecked(&mut header[NETLINK_HEADER_LEN..]);
        genl.set_command(command);
        genl.set_version(version);

        Ok(Self {
            header,
            attributes: AttributeWriter::new(rest),
        })
    }

    /// Return the [`AttributeWriter`] appending to the attribute area.
    pub fn attributes(&mut self) -> &mut AttributeWriter<'b> {
        &mut self.attributes
    }

    /// Return the message length so far.
    pub fn len(&self) -> usize {
        MESSAGE_HEADER_LEN + self.attributes.len()
    }

    /// Always `false`: a message holds at least its headers.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Patch the message length into the netlink header and return it.
    pub fn finish(mut self) -> usize {
        let len = self.len();
        let mut nl = NetlinkHeader::new_unchecked(&mut self.header[..NETLINK_HEADER_LEN]);
        nl.set_length(len as u32);
        len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{policy, Nl802154Attr, Nl802154Command};

    fn set_channel() -> ([u8; 64], usize) {
        let mut buffer = [0u8; 64];
        let mut w = MessageWriter::new(
            &mut buffer[..],
            0x1a,
            MessageFlags::REQUEST | MessageFlags::ACK,
            7,
            Nl802154Command::SetChannel as u8,
            1,
        )
        .unwrap();
        w.attributes().put_u32(Nl802154Attr::Ifindex, 3).unwrap();
        w.attributes().put_u8(Nl802154Attr::Page, 0).unwrap();
        w.attributes().put_u8(Nl802154Attr::Channel, 11).unwrap();
        let len = w.finish();
        (buffer, len)
    }

    #[test]
    fn write_request() {
        let (buffer, len) = set_channel();
        assert_eq!(len, 44);
        assert_eq!(
            &buffer[..20],
            &[
                0x2c, 0x00, 0x00, 0x00, 0x1a, 0x00, 0x05, 0x00, 0x07, 0x00, 0x00, 0x00, 0x00,
                0x00, 0x00, 0x00, 0x09, 0x01, 0x00, 0x00
            ]
        );
    }

    #[test]
    fn read_back() {
        let (buffer, _) = set_channel();
        let message = Message::new(&buffer[..]).unwrap();
        assert_eq!(message.kind(), 0x1a);
        assert_eq!(message.flags(), MessageFlags::REQUEST | MessageFlags::ACK);
        assert_eq!(message.command(), Nl802154Command::SetChannel as u8);
        assert_eq!(message.as_bytes().len(), 44);

        let set = message.parse(&policy::NL802154).unwrap();
        assert_eq!(set.u32(Nl802154Attr::Ifindex), Ok(Some(3)));
        assert_eq!(set.u8(Nl802154Attr::Channel), Ok(Some(11)));
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let (mut buffer, len) = set_channel();
        // Garbage after the declared length.
        buffer[len..len + 3].copy_from_slice(&[0x02, 0x00, 0x01]);
        let message = Message::new(&buffer[..]).unwrap();
        assert_eq!(message.attributes().count(), 3);
    }

    #[test]
    fn bad_length() {
        let (mut buffer, _) = set_channel();
        buffer[0] = 0xff;
        assert_eq!(
            Message::new(&buffer[..]).unwrap_err(),
            DecodeError::Malformed(Malformed::BadMessageLength {
                length: 0xff,
                available: 64
            })
        );
    }

    #[test]
    fn error_message() {
        let mut buffer = [0u8; 36];
        buffer[0] = 36;
        buffer[4] = NLMSG_ERROR as u8;
        buffer[16..20].copy_from_slice(&(-22i32).to_le_bytes());
        let message = Message::new(&buffer[..]).unwrap();
        assert_eq!(message.error_code(), Some(Ok(-22)));
        assert!(!message.is_done());
    }

    #[test]
    fn done_message() {
        let mut buffer = [0u8; 20];
        buffer[0] = 20;
        buffer[4] = NLMSG_DONE as u8;
        let message = Message::new(&buffer[..]).unwrap();
        assert!(message.is_done());
        assert_eq!(message.error_code(), None);
    }
}
