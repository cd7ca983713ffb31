//! Fixed-layout headers of a generic netlink message.

use wpanctl_macros::wire;

/// A reader/writer for the netlink message header.
///
/// ```notrust
/// +--------+------+-------+----------+------+
/// | Length | Type | Flags | Sequence | Port |
/// +--------+------+-------+----------+------+
/// 0        4      6       8          12     16
/// ```
#[wire]
#[derive(Debug, Clone, Copy)]
pub struct NetlinkHeader {
    /// Return the length of the whole message, headers included.
    length: u32,
    /// Return the message type (the generic netlink family ID for requests).
    kind: u16,
    /// Return the raw message flags.
    flags: u16,
    /// Return the sequence number.
    sequence: u32,
    /// Return the sending port ID.
    port: u32,
}

/// A reader/writer for the generic netlink header that follows the netlink
/// header.
///
/// ```notrust
/// +---------+---------+----------+
/// | Command | Version | Reserved |
/// +---------+---------+----------+
/// 0         1         2          4
/// ```
#[wire]
#[derive(Debug, Clone, Copy)]
pub struct GenlHeader {
    /// Return the family specific command.
    command: u8,
    /// Return the family version.
    version: u8,
    reserved: u16,
}

/// A reader/writer for an attribute header.
#[wire]
#[derive(Debug, Clone, Copy)]
pub struct AttributeHeader {
    /// Return the attribute length: header plus payload, without padding.
    length: u16,
    /// Return the raw attribute type: the tag plus the flag bits.
    kind: u16,
}

/// Length of the netlink header.
pub const NETLINK_HEADER_LEN: usize = 16;
/// Length of the generic netlink header.
pub const GENL_HEADER_LEN: usize = 4;
/// Length of both headers, the offset of the attribute area.
pub const MESSAGE_HEADER_LEN: usize = NETLINK_HEADER_LEN + GENL_HEADER_LEN;
/// Length of an attribute header.
pub const ATTRIBUTE_HEADER_LEN: usize = 4;

/// Netlink message type of an error or acknowledgement.
pub const NLMSG_ERROR: u16 = 2;
/// Netlink message type terminating a dump.
pub const NLMSG_DONE: u16 = 3;
