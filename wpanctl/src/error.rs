use std::path::PathBuf;

use thiserror::Error;
use wpanctl_attr::{AddressError, DecodeError, EncodeError, Nl802154Attr};

/// Why an argument was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArgumentErrorKind {
    #[error("missing")]
    TooFew,
    #[error("malformed")]
    Malformed,
    #[error("out of range")]
    OutOfRange,
    #[error("unexpected")]
    TooMany,
}

/// A command argument that could not be parsed. Raised before any I/O.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("argument {index} <{name}> is {kind}, expected {expected}")]
pub struct ArgumentError {
    /// Position among the command arguments, the identifier excluded.
    pub index: usize,
    pub name: &'static str,
    pub expected: &'static str,
    pub kind: ArgumentErrorKind,
}

/// A well-formed response that lacks a field or carries an unknown
/// discriminant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("missing attribute {}", attribute_name(.0))]
    MissingField(u16),
    #[error("unknown address mode {0}")]
    UnknownAddressMode(u8),
    #[error("unknown key mode {0}")]
    UnknownKeyMode(u8),
    #[error("response is neither a beacon nor a scan confirm")]
    UnrecognizedVariant,
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl ProtocolError {
    pub(crate) fn missing(attr: Nl802154Attr) -> Self {
        Self::MissingField(attr.into())
    }
}

impl From<AddressError> for ProtocolError {
    fn from(value: AddressError) -> Self {
        match value {
            AddressError::UnknownMode(mode) => Self::UnknownAddressMode(mode),
            AddressError::Missing(tag) => Self::MissingField(tag),
            AddressError::Decode(err) => Self::Decode(err),
        }
    }
}

fn attribute_name(tag: &u16) -> String {
    let tag = *tag;
    match Nl802154Attr::try_from(tag) {
        Ok(attr) => format!("{attr} ({tag})"),
        Err(tag) => format!("{tag}"),
    }
}

/// An interface or phy name that could not be turned into an index.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no network device named `{0}`")]
    UnknownInterface(String),
    #[error("no wpan phy named `{0}`")]
    UnknownPhy(String),
    #[error("{} does not hold an index", .0.display())]
    MalformedIndex(PathBuf),
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to turn a CLI invocation into a request.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown command `{section} {verb}`")]
    UnknownCommand { section: String, verb: String },
    #[error("`{section} {verb}` needs {what}")]
    MissingIdentifier {
        section: &'static str,
        verb: &'static str,
        what: &'static str,
    },
    #[error(transparent)]
    Argument(#[from] ArgumentError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Failure to interpret the messages answering a request.
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("kernel error: {}", os_error(.0))]
    Kernel(i32),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl From<DecodeError> for ResponseError {
    fn from(value: DecodeError) -> Self {
        Self::Protocol(ProtocolError::Decode(value))
    }
}

fn os_error(code: &i32) -> std::io::Error {
    std::io::Error::from_raw_os_error(code.wrapping_neg())
}

/// Failure of the transport carrying messages to and from the kernel.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no response left to replay")]
    Exhausted,
    #[error("invalid response hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure to build the command registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("command `{section} {verb}` registered twice")]
    Duplicate {
        section: &'static str,
        verb: &'static str,
    },
}

/// Any error of a `wpanctl` invocation.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Response(#[from] ResponseError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl Error {
    /// The process exit code: 1 for usage errors, 2 for protocol, decode and
    /// kernel errors, 3 for internal errors.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Dispatch(DispatchError::Encode(_)) => 3,
            Self::Dispatch(_) => 1,
            Self::Response(_) => 2,
            Self::Transport(_) | Self::Registry(_) => 3,
        }
    }
}
