use crate::args::Arguments;
use crate::error::{DispatchError, ResponseError};
use crate::response::Report;
use wpanctl_attr::{AttributeSet, AttributeWriter, MessageFlags, Nl802154Command};

/// What identifies the object a command acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierMode {
    /// The command takes no identifier.
    None,
    /// A network device, sent as [`Nl802154Attr::Ifindex`].
    ///
    /// [`Nl802154Attr::Ifindex`]: wpanctl_attr::Nl802154Attr::Ifindex
    NetDevice,
    /// A wpan phy, sent as [`Nl802154Attr::WpanPhy`].
    ///
    /// [`Nl802154Attr::WpanPhy`]: wpanctl_attr::Nl802154Attr::WpanPhy
    Phy,
}

impl IdentifierMode {
    /// Describe the identifier for usage and error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::None => "no identifier",
            Self::NetDevice => "a network device",
            Self::Phy => "a wpan phy",
        }
    }
}

/// What an encoder remembers for the decoder of the same request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestState {
    /// The channel mask a scan was requested for.
    pub scan_channels: Option<u32>,
}

/// Writes the attributes of a request from its arguments.
pub type EncodeFn = fn(
    &mut Arguments<'_>,
    &mut AttributeWriter<'_>,
    &mut RequestState,
) -> Result<(), DispatchError>;

/// Turns the attributes of one response message into a [`Report`].
pub type DecodeFn = fn(&AttributeSet<'_>, &RequestState) -> Result<Report, ResponseError>;

/// One entry of the command table.
#[derive(Debug, Clone, Copy)]
pub struct Command {
    pub section: &'static str,
    pub verb: &'static str,
    pub command: Nl802154Command,
    /// The arguments after the identifier.
    pub usage: &'static str,
    pub identifier: IdentifierMode,
    /// Whether the request asks for a dump.
    pub dump: bool,
    pub encode: EncodeFn,
    pub decode: Option<DecodeFn>,
}

impl Command {
    /// Return the netlink flags of the request.
    pub fn flags(&self) -> MessageFlags {
        if self.dump {
            MessageFlags::REQUEST | MessageFlags::DUMP
        } else {
            MessageFlags::REQUEST | MessageFlags::ACK
        }
    }
}

/// The encoder of commands without arguments.
pub fn no_arguments(
    _: &mut Arguments<'_>,
    _: &mut AttributeWriter<'_>,
    _: &mut RequestState,
) -> Result<(), DispatchError> {
    Ok(())
}

impl core::fmt::Display for Command {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}", self.section, self.verb)?;
        match self.identifier {
            IdentifierMode::None => {}
            IdentifierMode::NetDevice => write!(f, " <dev>")?,
            IdentifierMode::Phy => write!(f, " <phy>")?,
        }
        if !self.usage.is_empty() {
            write!(f, " {}", self.usage)?;
        }
        Ok(())
    }
}
