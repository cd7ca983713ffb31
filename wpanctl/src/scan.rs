//! Energy detection and active scan results.

use log::warn;
use wpanctl_attr::{
    decode_nested_array, AddressMode, AttributeSet, DecodeError, DeviceAddress, Malformed,
    Nl802154Attr, PanDescriptorAttr,
};

use crate::command::RequestState;
use crate::config::MAX_CHANNEL;
use crate::error::ProtocolError;
use crate::response::required;

/// The outcome of an energy detection scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub status: u8,
    pub scan_type: u8,
    pub page: u8,
    /// The channels that were scanned.
    pub channels: u32,
    /// The number of results the kernel announced.
    pub result_list_size: u8,
    /// `(channel, energy)` pairs.
    pub energies: Vec<(u8, u8)>,
    pub detected_category: u8,
}

impl ScanResult {
    /// Read an ED scan confirm. Every field is required.
    pub fn parse(set: &AttributeSet<'_>, state: &RequestState) -> Result<Self, ProtocolError> {
        use Nl802154Attr::*;

        let status = required(set.u8(ScanStatus)?, ScanStatus)?;
        let scan_type = required(set.u8(ScanType)?, ScanType)?;
        let page = required(set.u8(Page)?, Page)?;
        let channels = required(set.u32(SupportedChannel)?, SupportedChannel)?;
        let result_list_size = required(set.u8(ScanResultListSize)?, ScanResultListSize)?;
        let list = required(set.bytes(ScanEnergyDetectList), ScanEnergyDetectList)?;
        let detected_category = required(set.u8(ScanDetectedCategory)?, ScanDetectedCategory)?;

        if let Some(requested) = state.scan_channels {
            if requested != channels {
                warn!("scanned channels {channels:#x} differ from the requested {requested:#x}");
            }
        }

        let mut levels = [0u8; MAX_CHANNEL as usize + 1];
        let len = decode_nested_array(list, ScanEnergyDetectListEntry.into(), &mut levels);
        if result_list_size as usize > len {
            warn!("{result_list_size} results announced, {len} decoded");
        }

        Ok(Self {
            status,
            scan_type,
            page,
            channels,
            result_list_size,
            energies: pair_energies(channels, &levels[..len], result_list_size as usize),
            detected_category,
        })
    }
}

/// Pair the i-th set bit of `channels`, from low to high, with the i-th
/// energy level.
///
/// At most `hint` pairs are returned, never more than there are levels or
/// channels up to [`MAX_CHANNEL`].
pub fn pair_energies(channels: u32, levels: &[u8], hint: usize) -> Vec<(u8, u8)> {
    let limit = hint.min(levels.len());
    let mut pairs = Vec::with_capacity(limit);

    for channel in 0..=MAX_CHANNEL {
        if pairs.len() >= limit {
            break;
        }

        let scanned = 1u32
            .checked_shl(channel as u32)
            .is_some_and(|bit| channels & bit != 0);
        if scanned {
            pairs.push((channel, levels[pairs.len()]));
        }
    }

    pairs
}

/// The description of a PAN found by an active scan. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanDescriptor {
    pub src_addr_mode: Option<AddressMode>,
    pub src_pan_id: Option<u16>,
    pub src_addr: Option<DeviceAddress>,
    pub channel: Option<u8>,
    pub page: Option<u8>,
    pub superframe_spec: Option<u8>,
    pub gts_permit: Option<bool>,
    pub lqi: Option<u8>,
    pub timestamp: Option<u32>,
    pub sec_status: Option<u8>,
    pub sec_level: Option<u8>,
    pub key_id_mode: Option<u8>,
    pub key_source: Option<u8>,
    pub key_index: Option<u8>,
}

impl PanDescriptor {
    /// Read the attributes nested in [`Nl802154Attr::PanDescriptor`].
    ///
    /// The source address is read with the width its mode gives, or, without
    /// a mode, with the width of its payload.
    pub fn parse(set: &AttributeSet<'_>) -> Result<Self, ProtocolError> {
        use PanDescriptorAttr::*;

        let src_addr_mode = set
            .u8(SrcAddrMode)?
            .map(|mode| AddressMode::try_from(mode).map_err(ProtocolError::UnknownAddressMode))
            .transpose()?;

        let src_addr = match set.bytes(SrcAddr) {
            Some(payload) => Some(
                DeviceAddress::from_payload(payload, src_addr_mode).ok_or(
                    DecodeError::Malformed(Malformed::WidthMismatch {
                        tag: SrcAddr.into(),
                        expected: src_addr_mode.map_or(8, |mode| mode.size()),
                        found: payload.len(),
                    }),
                )?,
            ),
            None => None,
        };

        Ok(Self {
            src_addr_mode,
            src_pan_id: set.u16(SrcPanId)?,
            src_addr,
            channel: set.u8(ChannelNum)?,
            page: set.u8(ChannelPage)?,
            superframe_spec: set.u8(SuperframeSpec)?,
            gts_permit: set.u32(GtsPermit)?.map(|gts| gts != 0),
            lqi: set.u8(Lqi)?,
            timestamp: set.u32(TimeStamp)?,
            sec_status: set.u8(SecStatus)?,
            sec_level: set.u8(SecLevel)?,
            key_id_mode: set.u8(KeyIdMode)?,
            key_source: set.u8(KeySrc)?,
            key_index: set.u8(KeyIndex)?,
        })
    }
}

/// The final status of an active scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveScanStatus {
    pub status: u8,
    pub scan_type: u8,
    pub page: u8,
    pub detected_category: u8,
    pub result_list_size: u8,
}

impl ActiveScanStatus {
    /// Read an active scan confirm. Every field is required.
    pub fn parse(set: &AttributeSet<'_>) -> Result<Self, ProtocolError> {
        use Nl802154Attr::*;

        Ok(Self {
            status: required(set.u8(ScanStatus)?, ScanStatus)?,
            scan_type: required(set.u8(ScanType)?, ScanType)?,
            page: required(set.u8(Page)?, Page)?,
            detected_category: required(set.u8(ScanDetectedCategory)?, ScanDetectedCategory)?,
            result_list_size: required(set.u8(ScanResultListSize)?, ScanResultListSize)?,
        })
    }
}
