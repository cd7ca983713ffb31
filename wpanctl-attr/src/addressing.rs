//! Short and extended IEEE 802.15.4 addresses in attribute form.

use super::{AttributeSet, AttributeWriter, DecodeError, EncodeError};

/// The addressing mode of a device address.
#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[repr(u8)]
pub enum AddressMode {
    Short = 0b10,
    Extended = 0b11,
}

impl AddressMode {
    /// The mode a raw value needs: extended if any bit above bit 15 is set.
    pub fn classify(raw: u64) -> Self {
        if raw > u16::MAX as u64 {
            Self::Extended
        } else {
            Self::Short
        }
    }

    /// Return the size of the address in octets.
    pub fn size(&self) -> usize {
        match self {
            Self::Short => 2,
            Self::Extended => 8,
        }
    }
}

impl TryFrom<u8> for AddressMode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0b10 => Ok(Self::Short),
            0b11 => Ok(Self::Extended),
            other => Err(other),
        }
    }
}

impl From<AddressMode> for u8 {
    fn from(value: AddressMode) -> Self {
        value as u8
    }
}

impl core::fmt::Display for AddressMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Short => write!(f, "short"),
            Self::Extended => write!(f, "extended"),
        }
    }
}

/// An IEEE 802.15.4 device address.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub enum DeviceAddress {
    Short(u16),
    Extended(u64),
}

impl DeviceAddress {
    /// The broadcast address.
    pub const BROADCAST: DeviceAddress = DeviceAddress::Short(0xffff);

    /// Return the [`AddressMode`] of the address.
    pub fn mode(&self) -> AddressMode {
        match self {
            Self::Short(_) => AddressMode::Short,
            Self::Extended(_) => AddressMode::Extended,
        }
    }

    /// Return the address widened to 64 bits.
    pub fn raw(&self) -> u64 {
        match *self {
            Self::Short(value) => value as u64,
            Self::Extended(value) => value,
        }
    }

    /// Read an address from a raw little-endian payload.
    ///
    /// With a known mode the payload must have that mode's width. Without
    /// one the width decides: 2 bytes are short, 8 bytes extended.
    pub fn from_payload(payload: &[u8], mode: Option<AddressMode>) -> Option<Self> {
        let mode = match mode {
            Some(mode) => mode,
            None => match payload.len() {
                2 => AddressMode::Short,
                8 => AddressMode::Extended,
                _ => return None,
            },
        };

        match (mode, payload.len()) {
            (AddressMode::Short, 2) => {
                let mut raw = [0u8; 2];
                raw.copy_from_slice(payload);
                Some(Self::Short(u16::from_le_bytes(raw)))
            }
            (AddressMode::Extended, 8) => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(payload);
                Some(Self::Extended(u64::from_le_bytes(raw)))
            }
            _ => None,
        }
    }
}

impl core::fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {
            Self::Short(value) => write!(f, "0x{value:04x}"),
            Self::Extended(value) => {
                let b = value.to_be_bytes();
                write!(
                    f,
                    "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
                    b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]
                )
            }
        }
    }
}

/// The attribute tags an address is written to and read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressFields {
    /// Tag of the `u16` short address.
    pub short: u16,
    /// Tag of the `u64` extended address.
    pub extended: u16,
    /// Tag of the `u8` address mode, if the command carries one.
    pub mode: Option<u16>,
}

/// An address together with the mode it is sent with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub struct AddressSpec {
    mode: AddressMode,
    raw: u64,
    explicit: bool,
}

impl AddressSpec {
    /// An address whose mode follows from its magnitude.
    pub fn inferred(raw: u64) -> Self {
        Self {
            mode: AddressMode::classify(raw),
            raw,
            explicit: false,
        }
    }

    /// An address with a caller-supplied mode. The mode wins over the
    /// magnitude: a short address is truncated to its low 16 bits.
    pub fn explicit(mode: AddressMode, raw: u64) -> Self {
        Self {
            mode,
            raw,
            explicit: true,
        }
    }

    /// Return the mode the address is sent with.
    pub fn mode(&self) -> AddressMode {
        self.mode
    }

    /// Returns `true` if the mode was supplied by the caller.
    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    /// Returns `true` if an explicit mode differs from the one the magnitude
    /// implies.
    pub fn disagrees(&self) -> bool {
        self.explicit && self.mode != AddressMode::classify(self.raw)
    }

    /// Return the address as it goes on the wire.
    pub fn address(&self) -> DeviceAddress {
        match self.mode {
            AddressMode::Short => DeviceAddress::Short(self.raw as u16),
            AddressMode::Extended => DeviceAddress::Extended(self.raw),
        }
    }

    /// Write the address, and its mode when `fields` has a mode tag.
    pub fn emit(
        &self,
        writer: &mut AttributeWriter<'_>,
        fields: &AddressFields,
    ) -> Result<(), EncodeError> {
        if let Some(tag) = fields.mode {
            writer.put_u8(tag, self.mode.into())?;
        }

        match self.address() {
            DeviceAddress::Short(value) => writer.put_u16(fields.short, value),
            DeviceAddress::Extended(value) => writer.put_u64(fields.extended, value),
        }
    }

    /// Read an address back: first the mode, then the field it selects.
    ///
    /// Without a mode tag in `fields` the short field is tried first.
    pub fn parse(set: &AttributeSet<'_>, fields: &AddressFields) -> Result<Self, AddressError> {
        let mode = match fields.mode {
            Some(tag) => {
                let raw = set.u8(tag)?.ok_or(AddressError::Missing(tag))?;
                Some(AddressMode::try_from(raw).map_err(AddressError::UnknownMode)?)
            }
            None => None,
        };

        let short = || -> Result<Self, AddressError> {
            let value = set
                .u16(fields.short)?
                .ok_or(AddressError::Missing(fields.short))?;
            Ok(Self::explicit(AddressMode::Short, value as u64))
        };
        let extended = || -> Result<Self, AddressError> {
            let value = set
                .u64(fields.extended)?
                .ok_or(AddressError::Missing(fields.extended))?;
            Ok(Self::explicit(AddressMode::Extended, value))
        };

        match mode {
            Some(AddressMode::Short) => short(),
            Some(AddressMode::Extended) => extended(),
            None if set.contains(fields.short) => short(),
            None => extended(),
        }
    }
}

/// An error reading an [`AddressSpec`] from an [`AttributeSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressError {
    /// The address mode attribute holds an unknown value.
    UnknownMode(u8),
    /// The attribute with this tag is absent.
    Missing(u16),
    /// An attribute is malformed.
    Decode(DecodeError),
}

impl From<DecodeError> for AddressError {
    fn from(value: DecodeError) -> Self {
        Self::Decode(value)
    }
}

impl core::fmt::Display for AddressError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownMode(mode) => write!(f, "unknown address mode {mode}"),
            Self::Missing(tag) => write!(f, "attribute {tag} is missing"),
            Self::Decode(err) => write!(f, "{err}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AddressError {}
