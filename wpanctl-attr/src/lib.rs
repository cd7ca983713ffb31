//! Zero-copy read and write structures for nl802154 generic netlink messages.
//!
//! Each reader contains the following functions:
//! - [`new`]: Create a new reader, checking the buffer.
//! - [`check_len`]: Check if the buffer is long enough.
//! - [`new_unchecked`]: Create a new reader without checking the buffer.
//!
//! The most important reader is the [`Message`] reader, which is used to read
//! a full message as it is received from the kernel. It provides:
//! - [`netlink_header`]: returns a [`NetlinkHeader`] reader.
//! - [`genl_header`]: returns a [`GenlHeader`] reader.
//! - [`attributes`]: returns an [`Attributes`] iterator over the attribute
//!   area, bounded by the length declared in the netlink header.
//! - [`parse`]: collects the attribute area into an [`AttributeSet`],
//!   validated against a [`Policy`].
//!
//! ## Reading a message
//! ```
//! # use wpanctl_attr::{Message, Nl802154Attr, Nl802154Command, policy};
//! # let message: [u8; 36] = [
//! #     0x24, 0x00, 0x00, 0x00, 0x1a, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
//! #     0x00, 0x00, 0x00, 0x00, 0x18, 0x01, 0x00, 0x00, 0x06, 0x00, 0x0a, 0x00,
//! #     0x34, 0x12, 0x00, 0x00, 0x05, 0x00, 0x28, 0x00, 0x00, 0x00, 0x00, 0x00,
//! # ];
//! let message = Message::new(&message[..]).unwrap();
//! assert_eq!(message.command(), Nl802154Command::AssocCnf as u8);
//!
//! let attributes = message.parse(&policy::NL802154).unwrap();
//! assert_eq!(attributes.u16(Nl802154Attr::ShortAddr).unwrap(), Some(0x1234));
//! assert_eq!(attributes.u8(Nl802154Attr::AssocStatus).unwrap(), Some(0));
//! ```
//!
//! ## Writing a message
//! ```
//! # use wpanctl_attr::{MessageWriter, MessageFlags, Nl802154Attr, Nl802154Command};
//! let mut buffer = [0u8; 64];
//! let mut w = MessageWriter::new(
//!     &mut buffer[..],
//!     0x1a,
//!     MessageFlags::REQUEST | MessageFlags::ACK,
//!     1,
//!     Nl802154Command::SetChannel as u8,
//!     1,
//! )
//! .unwrap();
//! w.attributes().put_u8(Nl802154Attr::Page, 0).unwrap();
//! w.attributes().put_u8(Nl802154Attr::Channel, 11).unwrap();
//! let len = w.finish();
//! assert_eq!(len, 36);
//! ```
//!
//! ## Attributes
//!
//! Every attribute is encoded as a 4 byte header followed by its payload,
//! padded to a multiple of 4 bytes:
//!
//! ```notrust
//! +--------+--------+-----------------------+-----------+
//! | Length |  Type  | Payload (Length - 4)  | Padding   |
//! +--------+--------+-----------------------+-----------+
//! 0        2        4
//! ```
//!
//! Nested attributes carry a sequence of attributes as their payload. The
//! [`Attributes`] iterator walks such a sequence, [`AttributeSet`] indexes it
//! by tag, and [`decode_nested_array`] extracts homogeneous `u8` arrays.
//!
//! [`new`]: Message::new
//! [`check_len`]: Message::check_len
//! [`new_unchecked`]: Message::new_unchecked
//! [`netlink_header`]: Message::netlink_header
//! [`genl_header`]: Message::genl_header
//! [`attributes`]: Message::attributes
//! [`parse`]: Message::parse
#![no_std]
#![deny(unsafe_code)]

#[cfg(any(feature = "std", test))]
#[macro_use]
extern crate std;

#[cfg(test)]
mod tests;

mod header;
pub use header::*;

mod attribute;
pub use attribute::*;

mod nested;
pub use nested::*;

mod value;
pub use value::*;

mod set;
pub use set::*;

mod writer;
pub use writer::*;

mod message;
pub use message::*;

pub mod policy;
pub use policy::{AttributeKind, Policy, PolicyEntry};

mod nl802154;
pub use nl802154::*;

mod addressing;
pub use addressing::*;

/// The reason a byte sequence could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformed {
    /// The buffer ends before the structure it should contain.
    Truncated { needed: usize, available: usize },
    /// An attribute declares a length smaller than its own header.
    ShortLength { tag: u16, length: u16 },
    /// An attribute declares more bytes than remain in the buffer.
    Overrun {
        tag: u16,
        length: u16,
        available: usize,
    },
    /// A fixed-width attribute carries a payload of the wrong size.
    WidthMismatch {
        tag: u16,
        expected: usize,
        found: usize,
    },
    /// A variable-size attribute exceeds its policy maximum.
    TooLong { tag: u16, max: usize, found: usize },
    /// A string attribute is not valid UTF-8.
    InvalidUtf8 { tag: u16 },
    /// The netlink header declares a length that does not fit the buffer.
    BadMessageLength { length: u32, available: usize },
    /// More distinct attributes than an [`AttributeSet`] can hold.
    TooManyAttributes { capacity: usize },
}

/// An error that can occur when reading a message or an attribute stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The bytes do not form a valid message or attribute stream.
    Malformed(Malformed),
}

impl DecodeError {
    /// The tag of the offending attribute, when the error concerns one.
    pub fn tag(&self) -> Option<u16> {
        let DecodeError::Malformed(reason) = self;
        match *reason {
            Malformed::ShortLength { tag, .. }
            | Malformed::Overrun { tag, .. }
            | Malformed::WidthMismatch { tag, .. }
            | Malformed::TooLong { tag, .. }
            | Malformed::InvalidUtf8 { tag } => Some(tag),
            _ => None,
        }
    }
}

impl From<Malformed> for DecodeError {
    fn from(value: Malformed) -> Self {
        Self::Malformed(value)
    }
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let DecodeError::Malformed(reason) = self;
        write!(f, "malformed message: ")?;
        match *reason {
            Malformed::Truncated { needed, available } => {
                write!(f, "need {needed} bytes, only {available} available")
            }
            Malformed::ShortLength { tag, length } => {
                write!(f, "attribute {tag} declares length {length}")
            }
            Malformed::Overrun {
                tag,
                length,
                available,
            } => write!(
                f,
                "attribute {tag} declares length {length}, only {available} bytes remain"
            ),
            Malformed::WidthMismatch {
                tag,
                expected,
                found,
            } => write!(
                f,
                "attribute {tag} should be {expected} bytes wide, found {found}"
            ),
            Malformed::TooLong { tag, max, found } => {
                write!(f, "attribute {tag} is {found} bytes long, at most {max} allowed")
            }
            Malformed::InvalidUtf8 { tag } => write!(f, "attribute {tag} is not valid UTF-8"),
            Malformed::BadMessageLength { length, available } => write!(
                f,
                "message declares length {length}, buffer holds {available} bytes"
            ),
            Malformed::TooManyAttributes { capacity } => {
                write!(f, "more than {capacity} attributes")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

/// An error that can occur when writing a message or an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// The destination buffer cannot hold the next attribute.
    BufferExhausted { needed: usize, remaining: usize },
}

impl core::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BufferExhausted { needed, remaining } => write!(
                f,
                "message buffer exhausted: need {needed} bytes, {remaining} remaining"
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EncodeError {}

/// A type alias for `Result<T, DecodeError>`.
pub type Result<T> = core::result::Result<T, DecodeError>;
