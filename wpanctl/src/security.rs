//! Link-layer security parameters and keys.

use wpanctl_attr::{
    policy, AddressError, AddressFields, AddressMode, AddressSpec, AttributeSet, AttributeWriter,
    DeviceAddress, KeyMode, Nl802154Attr, NL802154_LLSEC_KEY_SIZE,
};

use crate::args::Arguments;
use crate::error::{DispatchError, ProtocolError};
use crate::response::required;

/// Where the device address of an implicit key is written.
const DEVICE_ADDRESS: AddressFields = AddressFields {
    short: Nl802154Attr::ShortAddr as u16,
    extended: Nl802154Attr::ExtendedAddr as u16,
    mode: None,
};

/// How a key is identified. Fields the kernel left out are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyId {
    Implicit {
        pan_id: Option<u16>,
        address: Option<DeviceAddress>,
    },
    Index {
        index: Option<u8>,
    },
    ShortIndex {
        index: Option<u8>,
        source: Option<u32>,
    },
    ExtendedIndex {
        index: Option<u8>,
        source: Option<u64>,
    },
}

impl KeyId {
    /// Return the [`KeyMode`].
    pub fn mode(&self) -> KeyMode {
        match self {
            Self::Implicit { .. } => KeyMode::Implicit,
            Self::Index { .. } => KeyMode::Index,
            Self::ShortIndex { .. } => KeyMode::ShortIndex,
            Self::ExtendedIndex { .. } => KeyMode::ExtendedIndex,
        }
    }

    /// Returns `true` if every field of the mode is present.
    pub fn is_complete(&self) -> bool {
        match *self {
            Self::Implicit { pan_id, address } => pan_id.is_some() && address.is_some(),
            Self::Index { index } => index.is_some(),
            Self::ShortIndex { index, source } => index.is_some() && source.is_some(),
            Self::ExtendedIndex { index, source } => index.is_some() && source.is_some(),
        }
    }

    /// Read a key identifier. The key mode is required, the fields it
    /// selects are not.
    pub fn parse(set: &AttributeSet<'_>) -> Result<Self, ProtocolError> {
        use Nl802154Attr::*;

        let mode = required(set.u8(LlsecKeyMode)?, LlsecKeyMode)?;
        let mode = KeyMode::try_from(mode).map_err(ProtocolError::UnknownKeyMode)?;

        Ok(match mode {
            KeyMode::Implicit => {
                let address = match AddressSpec::parse(set, &DEVICE_ADDRESS) {
                    Ok(spec) => Some(spec.address()),
                    Err(AddressError::Missing(_)) => None,
                    Err(err) => return Err(err.into()),
                };
                Self::Implicit {
                    pan_id: set.u16(PanId)?,
                    address,
                }
            }
            KeyMode::Index => Self::Index {
                index: set.u8(LlsecKeyId)?,
            },
            KeyMode::ShortIndex => Self::ShortIndex {
                index: set.u8(LlsecKeyId)?,
                source: set.u32(LlsecKeySourceShort)?,
            },
            KeyMode::ExtendedIndex => Self::ExtendedIndex {
                index: set.u8(LlsecKeyId)?,
                source: set.u64(LlsecKeySourceExtended)?,
            },
        })
    }
}

/// Parse `<key_mode> <mode args>` and write the key identifier.
///
/// The mode arguments are:
/// - implicit (0): `<pan_id> <addr_mode> <dev_addr>`
/// - index (1): `<index>`
/// - short index (2): `<index> <source>`
/// - extended index (3): `<index> <source>`
pub fn encode_key_id(
    args: &mut Arguments<'_>,
    w: &mut AttributeWriter<'_>,
) -> Result<KeyMode, DispatchError> {
    use Nl802154Attr::*;

    let mode: KeyMode = args.choice::<u8, _>("key_mode", "0..=3")?;
    w.put_u8(LlsecKeyMode, mode.into())?;

    match mode {
        KeyMode::Implicit => {
            let pan_id = args.unsigned::<u16>("pan_id")?;
            let addr_mode: AddressMode = args.choice::<u8, _>("addr_mode", "2 or 3")?;
            let address = args.unsigned::<u64>("dev_addr")?;
            w.put_u16(PanId, pan_id)?;
            AddressSpec::explicit(addr_mode, address).emit(w, &DEVICE_ADDRESS)?;
        }
        KeyMode::Index => {
            w.put_u8(LlsecKeyId, args.unsigned("index")?)?;
        }
        KeyMode::ShortIndex => {
            w.put_u8(LlsecKeyId, args.unsigned("index")?)?;
            w.put_u32(LlsecKeySourceShort, args.unsigned("source")?)?;
        }
        KeyMode::ExtendedIndex => {
            w.put_u8(LlsecKeyId, args.unsigned("index")?)?;
            w.put_u64(LlsecKeySourceExtended, args.unsigned("source")?)?;
        }
    }

    Ok(mode)
}

/// The link-layer security parameters of an interface. Every field is
/// optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SecurityParams {
    pub enabled: Option<bool>,
    pub key_id: Option<KeyId>,
    pub seclevel: Option<u8>,
    pub frame_counter: Option<u32>,
}

impl SecurityParams {
    pub fn parse(set: &AttributeSet<'_>) -> Result<Self, ProtocolError> {
        use Nl802154Attr::*;

        let key_id = if set.contains(LlsecKeyMode) {
            Some(KeyId::parse(set)?)
        } else {
            None
        };

        Ok(Self {
            enabled: set.u8(LlsecEnabled)?.map(|enabled| enabled != 0),
            key_id,
            seclevel: set.u8(LlsecSeclevel)?,
            frame_counter: set.u32(LlsecFrameCounter)?,
        })
    }
}

/// One key of a key table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityKeyEntry {
    pub key_id: KeyId,
    /// Bit `n` is set when the key may protect frames of type `n`.
    pub frame_types: Option<u8>,
    pub key: Option<[u8; NL802154_LLSEC_KEY_SIZE]>,
}

impl SecurityKeyEntry {
    pub fn parse(set: &AttributeSet<'_>) -> Result<Self, ProtocolError> {
        let key = set
            .bytes(Nl802154Attr::LlsecKeyBytes)
            .and_then(|bytes| <[u8; NL802154_LLSEC_KEY_SIZE]>::try_from(bytes).ok());

        Ok(Self {
            key_id: KeyId::parse(set)?,
            frame_types: set.u8(Nl802154Attr::LlsecKeyUsageFrameTypes)?,
            key,
        })
    }

    /// Returns `true` if a field of the key mode is missing.
    pub fn is_partial(&self) -> bool {
        !self.key_id.is_complete()
    }
}

/// The keys of one interface, as reported by a key dump.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyTable {
    pub phy: Option<u32>,
    pub ifname: Option<String>,
    pub ifindex: Option<u32>,
    pub wpan_dev: Option<u64>,
    pub entries: Vec<SecurityKeyEntry>,
}

impl KeyTable {
    /// Read the keys of one dump message, either as a
    /// [`Nl802154Attr::LlsecKeyTable`] or as a single
    /// [`Nl802154Attr::LlsecKeyEntry`].
    pub fn parse(set: &AttributeSet<'_>) -> Result<Self, ProtocolError> {
        use Nl802154Attr::*;

        let mut entries = Vec::new();
        if let Some(table) = set.get(LlsecKeyTable) {
            for entry in table.nested_ref() {
                let entry = AttributeSet::parse_with(entry?.payload_ref(), &policy::LLSEC_KEY)?;
                entries.push(SecurityKeyEntry::parse(&entry)?);
            }
        }
        if let Some(entry) = set.nested_with(LlsecKeyEntry, &policy::LLSEC_KEY)? {
            entries.push(SecurityKeyEntry::parse(&entry)?);
        }

        Ok(Self {
            phy: set.u32(WpanPhy)?,
            ifname: set.string(Ifname)?.map(str::to_string),
            ifindex: set.u32(Ifindex)?,
            wpan_dev: set.u64(WpanDev)?,
            entries,
        })
    }
}
