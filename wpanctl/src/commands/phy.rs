//! Radio configuration and energy detection, addressed to a wpan phy.

use wpanctl_attr::{
    AttributeSet, AttributeWriter, CcaMode, CcaOption, Nl802154Attr, Nl802154Command, ScanType,
};

use crate::args::Arguments;
use crate::command::{no_arguments, Command, IdentifierMode, RequestState};
use crate::config::{DEFAULT_PAGE0_CHANNELS, DEFAULT_SCAN_DURATION, MAX_CHANNEL, MAX_PAGE};
use crate::error::{ArgumentError, ArgumentErrorKind, DispatchError, ResponseError};
use crate::response::{required, Report};
use crate::scan::ScanResult;

pub const COMMANDS: &[Command] = &[
    Command {
        section: "set",
        verb: "channel",
        command: Nl802154Command::SetChannel,
        usage: "<page> <channel>",
        identifier: IdentifierMode::Phy,
        dump: false,
        encode: set_channel,
        decode: None,
    },
    Command {
        section: "set",
        verb: "tx_power",
        command: Nl802154Command::SetTxPower,
        usage: "<dBm>",
        identifier: IdentifierMode::Phy,
        dump: false,
        encode: set_tx_power,
        decode: None,
    },
    Command {
        section: "set",
        verb: "cca_mode",
        command: Nl802154Command::SetCcaMode,
        usage: "<mode> [<opt>]",
        identifier: IdentifierMode::Phy,
        dump: false,
        encode: set_cca_mode,
        decode: None,
    },
    Command {
        section: "set",
        verb: "cca_ed_level",
        command: Nl802154Command::SetCcaEdLevel,
        usage: "<dBm>",
        identifier: IdentifierMode::Phy,
        dump: false,
        encode: set_cca_ed_level,
        decode: None,
    },
    Command {
        section: "get",
        verb: "ed_scan",
        command: Nl802154Command::EdScanReq,
        usage: "[<page> [<channels> [<duration>]]]",
        identifier: IdentifierMode::Phy,
        dump: false,
        encode: ed_scan,
        decode: Some(ed_scan_confirm),
    },
    Command {
        section: "set",
        verb: "beacon_notify",
        command: Nl802154Command::BeaconNotifyInd,
        usage: "",
        identifier: IdentifierMode::Phy,
        dump: false,
        encode: no_arguments,
        decode: Some(beacon_notify),
    },
];

fn page(args: &mut Arguments<'_>) -> Result<u8, ArgumentError> {
    args.bounded("page", MAX_PAGE as u64, "page 0..=31")
}

fn set_channel(
    args: &mut Arguments<'_>,
    w: &mut AttributeWriter<'_>,
    _: &mut RequestState,
) -> Result<(), DispatchError> {
    let page = page(args)?;
    let channel: u8 = args.bounded("channel", MAX_CHANNEL as u64, "channel 0..=26")?;
    w.put_u8(Nl802154Attr::Page, page)?;
    w.put_u8(Nl802154Attr::Channel, channel)?;
    Ok(())
}

fn set_tx_power(
    args: &mut Arguments<'_>,
    w: &mut AttributeWriter<'_>,
    _: &mut RequestState,
) -> Result<(), DispatchError> {
    w.put_s32(Nl802154Attr::TxPower, args.dbm("dBm")?)?;
    Ok(())
}

fn set_cca_mode(
    args: &mut Arguments<'_>,
    w: &mut AttributeWriter<'_>,
    _: &mut RequestState,
) -> Result<(), DispatchError> {
    let mode: CcaMode = args.choice::<u32, _>("mode", "cca mode 1..=6")?;

    // Only the combined mode takes an option.
    if mode == CcaMode::EnergyCarrier {
        let option: CcaOption = args.choice::<u32, _>("opt", "0 (and) or 1 (or)")?;
        w.put_u32(Nl802154Attr::CcaOpt, option.into())?;
    }
    w.put_u32(Nl802154Attr::CcaMode, mode.into())?;
    Ok(())
}

fn set_cca_ed_level(
    args: &mut Arguments<'_>,
    w: &mut AttributeWriter<'_>,
    _: &mut RequestState,
) -> Result<(), DispatchError> {
    w.put_s32(Nl802154Attr::CcaEdLevel, args.dbm("dBm")?)?;
    Ok(())
}

/// Write a scan request. The channel mask is remembered to check it against
/// the confirm.
pub(crate) fn put_scan(
    w: &mut AttributeWriter<'_>,
    state: &mut RequestState,
    scan_type: ScanType,
    page: u8,
    channels: u32,
    duration: u8,
) -> Result<(), DispatchError> {
    w.put_u8(Nl802154Attr::ScanType, scan_type.into())?;
    w.put_u32(Nl802154Attr::SupportedChannel, channels)?;
    w.put_u8(Nl802154Attr::ScanDuration, duration)?;
    w.put_u8(Nl802154Attr::Page, page)?;
    state.scan_channels = Some(channels);
    Ok(())
}

fn ed_scan(
    args: &mut Arguments<'_>,
    w: &mut AttributeWriter<'_>,
    state: &mut RequestState,
) -> Result<(), DispatchError> {
    let page = args.optional(page)?.unwrap_or(0);

    let channels = match args.optional(|args| args.unsigned::<u32>("channels"))? {
        Some(channels) => channels,
        None if page == 0 => DEFAULT_PAGE0_CHANNELS,
        None => {
            return Err(ArgumentError {
                index: args.index(),
                name: "channels",
                expected: "a channel mask for pages other than 0",
                kind: ArgumentErrorKind::TooFew,
            }
            .into())
        }
    };

    let duration = args
        .optional(|args| args.unsigned::<u8>("duration"))?
        .unwrap_or(DEFAULT_SCAN_DURATION);

    put_scan(w, state, ScanType::Ed, page, channels, duration)
}

fn ed_scan_confirm(set: &AttributeSet<'_>, state: &RequestState) -> Result<Report, ResponseError> {
    Ok(Report::EdScan(ScanResult::parse(set, state)?))
}

fn beacon_notify(set: &AttributeSet<'_>, _: &RequestState) -> Result<Report, ResponseError> {
    let sequence_number = required(
        set.u32(Nl802154Attr::BeaconSequenceNumber)?,
        Nl802154Attr::BeaconSequenceNumber,
    )?;
    Ok(Report::BeaconNotify { sequence_number })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(
        f: crate::command::EncodeFn,
        tokens: &[&str],
    ) -> Result<(Vec<u8>, RequestState), DispatchError> {
        let mut buffer = [0u8; 128];
        let mut w = AttributeWriter::new(&mut buffer[..]);
        let mut state = RequestState::default();
        let mut args = Arguments::new(tokens);
        f(&mut args, &mut w, &mut state)?;
        args.finish()?;
        let len = w.finish();
        Ok((buffer[..len].to_vec(), state))
    }

    #[test]
    fn channel_is_bounded() {
        let err = encode(set_channel, &["0", "27"]).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Argument(ArgumentError {
                index: 1,
                name: "channel",
                kind: ArgumentErrorKind::OutOfRange,
                ..
            })
        ));
    }

    #[test]
    fn tx_power_in_mbm() {
        let (bytes, _) = encode(set_tx_power, &["-2.5"]).unwrap();
        let set = AttributeSet::parse(&bytes).unwrap();
        assert_eq!(set.s32(Nl802154Attr::TxPower), Ok(Some(-250)));
    }

    #[test]
    fn cca_option_comes_first() {
        let (bytes, _) = encode(set_cca_mode, &["3", "1"]).unwrap();
        let tags: Vec<u16> = AttributeSet::parse(&bytes)
            .unwrap()
            .iter()
            .map(|a| a.tag())
            .collect();
        assert_eq!(
            tags,
            vec![u16::from(Nl802154Attr::CcaOpt), u16::from(Nl802154Attr::CcaMode)]
        );

        // Other modes take no option.
        assert!(matches!(
            encode(set_cca_mode, &["1", "1"]),
            Err(DispatchError::Argument(ArgumentError {
                kind: ArgumentErrorKind::TooMany,
                ..
            }))
        ));
        assert!(matches!(
            encode(set_cca_mode, &["3"]),
            Err(DispatchError::Argument(ArgumentError {
                name: "opt",
                kind: ArgumentErrorKind::TooFew,
                ..
            }))
        ));
    }

    #[test]
    fn ed_scan_defaults() {
        let (bytes, state) = encode(ed_scan, &[]).unwrap();
        let set = AttributeSet::parse(&bytes).unwrap();
        assert_eq!(set.u8(Nl802154Attr::ScanType), Ok(Some(u8::from(ScanType::Ed))));
        assert_eq!(
            set.u32(Nl802154Attr::SupportedChannel),
            Ok(Some(DEFAULT_PAGE0_CHANNELS))
        );
        assert_eq!(
            set.u8(Nl802154Attr::ScanDuration),
            Ok(Some(DEFAULT_SCAN_DURATION))
        );
        assert_eq!(set.u8(Nl802154Attr::Page), Ok(Some(0)));
        assert_eq!(state.scan_channels, Some(DEFAULT_PAGE0_CHANNELS));
    }

    #[test]
    fn ed_scan_other_page_needs_channels() {
        assert!(matches!(
            encode(ed_scan, &["2"]),
            Err(DispatchError::Argument(ArgumentError {
                index: 1,
                name: "channels",
                kind: ArgumentErrorKind::TooFew,
                ..
            }))
        ));

        let (bytes, _) = encode(ed_scan, &["2", "0x7", "5"]).unwrap();
        let set = AttributeSet::parse(&bytes).unwrap();
        assert_eq!(set.u32(Nl802154Attr::SupportedChannel), Ok(Some(7)));
        assert_eq!(set.u8(Nl802154Attr::ScanDuration), Ok(Some(5)));
    }
}
