//! Attribute validation policies.
//!
//! A [`Policy`] maps attribute tags to the [`AttributeKind`] their payload
//! must have. Tags without an entry are accepted as they are.

use super::nl802154::{Nl802154Attr as A, PanDescriptorAttr as P, NL802154_LLSEC_KEY_SIZE};
use super::{check_stream, Attribute, Attributes, DecodeError, Malformed, Result};

/// The expected encoding of an attribute payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind<'p> {
    /// Anything goes.
    Unchecked,
    U8,
    S8,
    U16,
    U32,
    S32,
    U64,
    S64,
    /// A UTF-8 string, optionally NUL terminated. `max_len` excludes the
    /// terminator.
    String { max_len: Option<usize> },
    /// A byte array of at most `max_len` bytes.
    Binary { max_len: usize },
    /// No payload at all.
    Flag,
    /// A sequence of attributes, validated against the given policy if any.
    Nested(Option<&'p Policy<'p>>),
    /// A sequence of nested entries, each validated against the given policy
    /// if any. The entry tags are not checked.
    NestedArray(Option<&'p Policy<'p>>),
}

impl AttributeKind<'_> {
    /// The exact payload width of fixed-width kinds.
    pub fn width(&self) -> Option<usize> {
        match self {
            Self::U8 | Self::S8 => Some(1),
            Self::U16 => Some(2),
            Self::U32 | Self::S32 => Some(4),
            Self::U64 | Self::S64 => Some(8),
            Self::Flag => Some(0),
            _ => None,
        }
    }
}

/// The kind of a single tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyEntry<'p> {
    pub tag: u16,
    pub kind: AttributeKind<'p>,
}

impl<'p> PolicyEntry<'p> {
    pub const fn new(tag: u16, kind: AttributeKind<'p>) -> Self {
        Self { tag, kind }
    }
}

/// A table of [`PolicyEntry`] for one attribute namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy<'p> {
    entries: &'p [PolicyEntry<'p>],
}

impl<'p> Policy<'p> {
    pub const fn new(entries: &'p [PolicyEntry<'p>]) -> Self {
        Self { entries }
    }

    /// Return the kind registered for `tag`.
    pub fn kind(&self, tag: u16) -> Option<AttributeKind<'p>> {
        self.entries
            .iter()
            .find(|entry| entry.tag == tag)
            .map(|entry| entry.kind)
    }

    /// Return the registered entries.
    pub fn entries(&self) -> &'p [PolicyEntry<'p>] {
        self.entries
    }

    /// Validate a single attribute, descending into nested payloads.
    pub fn validate(&self, attr: &Attribute<&[u8]>) -> Result<()> {
        match self.kind(attr.tag()) {
            Some(kind) => validate_kind(attr, kind),
            None => Ok(()),
        }
    }

    /// Validate every attribute of a sequence.
    pub fn validate_stream(&self, data: &[u8]) -> Result<()> {
        for attr in Attributes::new(data) {
            self.validate(&attr?)?;
        }
        Ok(())
    }
}

fn validate_kind(attr: &Attribute<&[u8]>, kind: AttributeKind<'_>) -> Result<()> {
    let payload = attr.payload_ref();

    if let Some(expected) = kind.width() {
        if payload.len() != expected {
            return Err(DecodeError::Malformed(Malformed::WidthMismatch {
                tag: attr.tag(),
                expected,
                found: payload.len(),
            }));
        }
        return Ok(());
    }

    match kind {
        AttributeKind::String { max_len } => {
            let s = attr.as_str_ref()?;
            match max_len {
                Some(max) if s.len() > max => Err(too_long(attr, max, s.len())),
                _ => Ok(()),
            }
        }
        AttributeKind::Binary { max_len } if payload.len() > max_len => {
            Err(too_long(attr, max_len, payload.len()))
        }
        AttributeKind::Nested(Some(policy)) => policy.validate_stream(payload),
        AttributeKind::Nested(None) => check_stream(payload).map(|_| ()),
        AttributeKind::NestedArray(policy) => {
            for entry in Attributes::new(payload) {
                let entry = entry?;
                match policy {
                    Some(policy) => policy.validate_stream(entry.payload_ref())?,
                    None => {
                        check_stream(entry.payload_ref())?;
                    }
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn too_long(attr: &Attribute<&[u8]>, max: usize, found: usize) -> DecodeError {
    DecodeError::Malformed(Malformed::TooLong {
        tag: attr.tag(),
        max,
        found,
    })
}

use AttributeKind::*;

const IFNAME_MAX: usize = 15;

/// Entries of the energy detection list.
pub static ED_LIST: Policy<'static> = Policy::new(&[PolicyEntry::new(
    A::ScanEnergyDetectListEntry as u16,
    U8,
)]);

/// Attributes of a PAN descriptor.
///
/// The source address is polymorphic: its width follows the source address
/// mode, so it is left unchecked here.
pub static PAN_DESCRIPTOR: Policy<'static> = Policy::new(&[
    PolicyEntry::new(P::SrcAddrMode as u16, U8),
    PolicyEntry::new(P::SrcPanId as u16, U16),
    PolicyEntry::new(P::SrcAddr as u16, Unchecked),
    PolicyEntry::new(P::ChannelNum as u16, U8),
    PolicyEntry::new(P::ChannelPage as u16, U8),
    PolicyEntry::new(P::SuperframeSpec as u16, U8),
    PolicyEntry::new(P::GtsPermit as u16, U32),
    PolicyEntry::new(P::Lqi as u16, U8),
    PolicyEntry::new(P::TimeStamp as u16, U32),
    PolicyEntry::new(P::SecStatus as u16, U8),
    PolicyEntry::new(P::SecLevel as u16, U8),
    PolicyEntry::new(P::KeyIdMode as u16, U8),
    PolicyEntry::new(P::KeySrc as u16, U8),
    PolicyEntry::new(P::KeyIndex as u16, U8),
]);

/// Attributes of a link-layer security key entry.
pub static LLSEC_KEY: Policy<'static> = Policy::new(&[
    PolicyEntry::new(A::LlsecKeyMode as u16, U8),
    PolicyEntry::new(A::LlsecKeyId as u16, U8),
    PolicyEntry::new(A::PanId as u16, U16),
    PolicyEntry::new(A::ShortAddr as u16, U16),
    PolicyEntry::new(A::ExtendedAddr as u16, U64),
    PolicyEntry::new(A::LlsecKeySourceShort as u16, U32),
    PolicyEntry::new(A::LlsecKeySourceExtended as u16, U64),
    PolicyEntry::new(A::LlsecKeyUsageFrameTypes as u16, U8),
    PolicyEntry::new(
        A::LlsecKeyBytes as u16,
        Binary {
            max_len: NL802154_LLSEC_KEY_SIZE,
        },
    ),
]);

/// The top-level nl802154 attributes.
pub static NL802154: Policy<'static> = Policy::new(&[
    PolicyEntry::new(A::WpanPhy as u16, U32),
    PolicyEntry::new(A::WpanPhyName as u16, String { max_len: None }),
    PolicyEntry::new(A::Ifindex as u16, U32),
    PolicyEntry::new(
        A::Ifname as u16,
        String {
            max_len: Some(IFNAME_MAX),
        },
    ),
    PolicyEntry::new(A::Iftype as u16, U32),
    PolicyEntry::new(A::WpanDev as u16, U64),
    PolicyEntry::new(A::Page as u16, U8),
    PolicyEntry::new(A::Channel as u16, U8),
    PolicyEntry::new(A::PanId as u16, U16),
    PolicyEntry::new(A::ShortAddr as u16, U16),
    PolicyEntry::new(A::TxPower as u16, S32),
    PolicyEntry::new(A::CcaMode as u16, U32),
    PolicyEntry::new(A::CcaOpt as u16, U32),
    PolicyEntry::new(A::CcaEdLevel as u16, S32),
    PolicyEntry::new(A::MaxFrameRetries as u16, S8),
    PolicyEntry::new(A::MaxBe as u16, U8),
    PolicyEntry::new(A::MinBe as u16, U8),
    PolicyEntry::new(A::MaxCsmaBackoffs as u16, U8),
    PolicyEntry::new(A::LbtMode as u16, U8),
    PolicyEntry::new(A::Generation as u16, U32),
    PolicyEntry::new(A::SupportedChannel as u16, U32),
    PolicyEntry::new(A::ExtendedAddr as u16, U64),
    PolicyEntry::new(A::WpanPhyCaps as u16, Nested(None)),
    PolicyEntry::new(A::SupportedCommands as u16, Nested(None)),
    PolicyEntry::new(A::ScanStatus as u16, U8),
    PolicyEntry::new(A::ScanType as u16, U8),
    PolicyEntry::new(A::ScanDuration as u16, U8),
    PolicyEntry::new(A::ScanResultListSize as u16, U8),
    PolicyEntry::new(A::ScanEnergyDetectList as u16, Nested(Some(&ED_LIST))),
    PolicyEntry::new(A::ScanEnergyDetectListEntry as u16, U8),
    PolicyEntry::new(A::ScanDetectedCategory as u16, U8),
    PolicyEntry::new(A::SecLevel as u16, U8),
    PolicyEntry::new(A::SecKeyIdMode as u16, U8),
    PolicyEntry::new(A::SecKeySourceEntry as u16, U8),
    PolicyEntry::new(A::SecKeyIndex as u16, U8),
    PolicyEntry::new(A::AddrMode as u16, U8),
    PolicyEntry::new(A::AssocCapInfo as u16, U8),
    PolicyEntry::new(A::AssocStatus as u16, U8),
    PolicyEntry::new(A::PanDescriptor as u16, Nested(Some(&PAN_DESCRIPTOR))),
    PolicyEntry::new(A::BeaconSequenceNumber as u16, U32),
    PolicyEntry::new(A::DisassocReason as u16, U8),
    PolicyEntry::new(A::DisassocStatus as u16, U8),
    PolicyEntry::new(A::TxIndirect as u16, U8),
    PolicyEntry::new(A::LlsecEnabled as u16, U8),
    PolicyEntry::new(A::LlsecKeyMode as u16, U8),
    PolicyEntry::new(A::LlsecKeyId as u16, U8),
    PolicyEntry::new(A::LlsecKeySourceShort as u16, U32),
    PolicyEntry::new(A::LlsecKeySourceExtended as u16, U64),
    PolicyEntry::new(A::LlsecSeclevel as u16, U8),
    PolicyEntry::new(A::LlsecFrameCounter as u16, U32),
    PolicyEntry::new(A::LlsecKeyTable as u16, NestedArray(Some(&LLSEC_KEY))),
    PolicyEntry::new(A::LlsecKeyUsageFrameTypes as u16, U8),
    PolicyEntry::new(
        A::LlsecKeyBytes as u16,
        Binary {
            max_len: NL802154_LLSEC_KEY_SIZE,
        },
    ),
    PolicyEntry::new(A::LlsecKeyEntry as u16, Nested(Some(&LLSEC_KEY))),
]);
