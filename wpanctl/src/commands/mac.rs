//! MAC configuration, association and active scans, addressed to a network
//! device.

use log::warn;
use wpanctl_attr::{
    policy, AddressFields, AddressMode, AddressSpec, AttributeSet, AttributeWriter, Nl802154Attr,
    Nl802154Command, ScanType,
};

use crate::args::Arguments;
use crate::command::{Command, IdentifierMode, RequestState};
use crate::config::{MAX_CHANNEL, MAX_PAGE};
use crate::error::{DispatchError, ProtocolError, ResponseError};
use crate::response::{required, Report};
use crate::scan::{ActiveScanStatus, PanDescriptor};

use super::phy::put_scan;

/// The peer address of association and disassociation.
const PEER_ADDRESS: AddressFields = AddressFields {
    short: Nl802154Attr::ShortAddr as u16,
    extended: Nl802154Attr::ExtendedAddr as u16,
    mode: Some(Nl802154Attr::AddrMode as u16),
};

pub const COMMANDS: &[Command] = &[
    Command {
        section: "set",
        verb: "pan_id",
        command: Nl802154Command::SetPanId,
        usage: "<pan_id>",
        identifier: IdentifierMode::NetDevice,
        dump: false,
        encode: set_pan_id,
        decode: None,
    },
    Command {
        section: "set",
        verb: "short_addr",
        command: Nl802154Command::SetShortAddr,
        usage: "<short_addr>",
        identifier: IdentifierMode::NetDevice,
        dump: false,
        encode: set_short_addr,
        decode: None,
    },
    Command {
        section: "set",
        verb: "max_frame_retries",
        command: Nl802154Command::SetMaxFrameRetries,
        usage: "<retries>",
        identifier: IdentifierMode::NetDevice,
        dump: false,
        encode: set_max_frame_retries,
        decode: None,
    },
    Command {
        section: "set",
        verb: "backoff_exponents",
        command: Nl802154Command::SetBackoffExponent,
        usage: "<min_be> <max_be>",
        identifier: IdentifierMode::NetDevice,
        dump: false,
        encode: set_backoff_exponents,
        decode: None,
    },
    Command {
        section: "set",
        verb: "max_csma_backoffs",
        command: Nl802154Command::SetMaxCsmaBackoffs,
        usage: "<backoffs>",
        identifier: IdentifierMode::NetDevice,
        dump: false,
        encode: set_max_csma_backoffs,
        decode: None,
    },
    Command {
        section: "set",
        verb: "lbt",
        command: Nl802154Command::SetLbtMode,
        usage: "<1|0>",
        identifier: IdentifierMode::NetDevice,
        dump: false,
        encode: set_lbt,
        decode: None,
    },
    Command {
        section: "set",
        verb: "associate",
        command: Nl802154Command::AssocReq,
        usage: "<channel> <page> <addr_mode> <pan_id> <coord_addr> <cap_info>",
        identifier: IdentifierMode::NetDevice,
        dump: false,
        encode: associate,
        decode: Some(association_confirm),
    },
    Command {
        section: "set",
        verb: "disassociate",
        command: Nl802154Command::DisassocReq,
        usage: "<pan_id> <device_addr> <reason> [<tx_indirect>]",
        identifier: IdentifierMode::NetDevice,
        dump: false,
        encode: disassociate,
        decode: Some(disassociation_confirm),
    },
    Command {
        section: "set",
        verb: "active_scan",
        command: Nl802154Command::ActiveScanReq,
        usage: "<page> <channels> <duration>",
        identifier: IdentifierMode::NetDevice,
        dump: false,
        encode: active_scan,
        decode: Some(active_scan_report),
    },
];

fn set_pan_id(
    args: &mut Arguments<'_>,
    w: &mut AttributeWriter<'_>,
    _: &mut RequestState,
) -> Result<(), DispatchError> {
    w.put_u16(Nl802154Attr::PanId, args.unsigned("pan_id")?)?;
    Ok(())
}

fn set_short_addr(
    args: &mut Arguments<'_>,
    w: &mut AttributeWriter<'_>,
    _: &mut RequestState,
) -> Result<(), DispatchError> {
    w.put_u16(Nl802154Attr::ShortAddr, args.unsigned("short_addr")?)?;
    Ok(())
}

fn set_max_frame_retries(
    args: &mut Arguments<'_>,
    w: &mut AttributeWriter<'_>,
    _: &mut RequestState,
) -> Result<(), DispatchError> {
    w.put_s8(Nl802154Attr::MaxFrameRetries, args.signed("retries")?)?;
    Ok(())
}

fn set_backoff_exponents(
    args: &mut Arguments<'_>,
    w: &mut AttributeWriter<'_>,
    _: &mut RequestState,
) -> Result<(), DispatchError> {
    let min_be: u8 = args.unsigned("min_be")?;
    let max_be: u8 = args.unsigned("max_be")?;
    w.put_u8(Nl802154Attr::MinBe, min_be)?;
    w.put_u8(Nl802154Attr::MaxBe, max_be)?;
    Ok(())
}

fn set_max_csma_backoffs(
    args: &mut Arguments<'_>,
    w: &mut AttributeWriter<'_>,
    _: &mut RequestState,
) -> Result<(), DispatchError> {
    w.put_u8(Nl802154Attr::MaxCsmaBackoffs, args.unsigned("backoffs")?)?;
    Ok(())
}

fn set_lbt(
    args: &mut Arguments<'_>,
    w: &mut AttributeWriter<'_>,
    _: &mut RequestState,
) -> Result<(), DispatchError> {
    w.put_u8(Nl802154Attr::LbtMode, args.boolean("mode")? as u8)?;
    Ok(())
}

fn associate(
    args: &mut Arguments<'_>,
    w: &mut AttributeWriter<'_>,
    _: &mut RequestState,
) -> Result<(), DispatchError> {
    let channel: u8 = args.bounded("channel", MAX_CHANNEL as u64, "channel 0..=26")?;
    let page: u8 = args.bounded("page", MAX_PAGE as u64, "page 0..=31")?;
    let mode: AddressMode = args.choice::<u8, _>("addr_mode", "2 (short) or 3 (extended)")?;
    let pan_id: u16 = args.unsigned("pan_id")?;
    let raw: u64 = args.unsigned("coord_addr")?;
    let cap_info: u8 = args.unsigned("cap_info")?;

    let address = AddressSpec::explicit(mode, raw);
    if address.disagrees() {
        warn!(
            "coordinator address {raw:#x} sent in {mode} mode as {}",
            address.address()
        );
    }

    w.put_u8(Nl802154Attr::Channel, channel)?;
    w.put_u8(Nl802154Attr::Page, page)?;
    w.put_u8(Nl802154Attr::AddrMode, mode.into())?;
    w.put_u16(Nl802154Attr::PanId, pan_id)?;
    address.emit(
        w,
        &AddressFields {
            mode: None,
            ..PEER_ADDRESS
        },
    )?;
    w.put_u8(Nl802154Attr::AssocCapInfo, cap_info)?;
    Ok(())
}

fn association_confirm(set: &AttributeSet<'_>, _: &RequestState) -> Result<Report, ResponseError> {
    use Nl802154Attr::*;

    Ok(Report::AssociationConfirm {
        short_addr: required(set.u16(ShortAddr)?, ShortAddr)?,
        status: required(set.u8(AssocStatus)?, AssocStatus)?,
    })
}

fn disassociate(
    args: &mut Arguments<'_>,
    w: &mut AttributeWriter<'_>,
    _: &mut RequestState,
) -> Result<(), DispatchError> {
    let pan_id: u16 = args.unsigned("pan_id")?;
    let address = AddressSpec::inferred(args.unsigned("device_addr")?);
    let reason: u8 = args.unsigned("reason")?;
    let tx_indirect = args.optional(|args| args.boolean("tx_indirect"))?;

    w.put_u16(Nl802154Attr::PanId, pan_id)?;
    address.emit(w, &PEER_ADDRESS)?;
    w.put_u8(Nl802154Attr::DisassocReason, reason)?;
    if let Some(tx_indirect) = tx_indirect {
        w.put_u8(Nl802154Attr::TxIndirect, tx_indirect as u8)?;
    }
    Ok(())
}

fn disassociation_confirm(
    set: &AttributeSet<'_>,
    _: &RequestState,
) -> Result<Report, ResponseError> {
    use Nl802154Attr::*;

    let status = required(set.u8(DisassocStatus)?, DisassocStatus)?;
    let address = AddressSpec::parse(set, &PEER_ADDRESS).map_err(ProtocolError::from)?;
    let pan_id = required(set.u16(PanId)?, PanId)?;

    Ok(Report::DisassociationConfirm {
        status,
        pan_id,
        address: address.address(),
    })
}

fn active_scan(
    args: &mut Arguments<'_>,
    w: &mut AttributeWriter<'_>,
    state: &mut RequestState,
) -> Result<(), DispatchError> {
    let page: u8 = args.bounded("page", MAX_PAGE as u64, "page 0..=31")?;
    let channels: u32 = args.unsigned("channels")?;
    let duration: u8 = args.unsigned("duration")?;
    put_scan(w, state, ScanType::Active, page, channels, duration)
}

/// A beacon carries a PAN descriptor, the final message the scan status.
fn active_scan_report(set: &AttributeSet<'_>, _: &RequestState) -> Result<Report, ResponseError> {
    if let Some(pd) = set.nested_with(Nl802154Attr::PanDescriptor, &policy::PAN_DESCRIPTOR)? {
        return Ok(Report::Beacon(PanDescriptor::parse(&pd)?));
    }

    if set.contains(Nl802154Attr::ScanStatus) {
        return Ok(Report::ActiveScanConfirm(ActiveScanStatus::parse(set)?));
    }

    Err(ProtocolError::UnrecognizedVariant.into())
}
