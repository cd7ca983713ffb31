//! Link-layer security parameters and keys, addressed to a network device.

use log::warn;
use wpanctl_attr::{
    AttributeSet, AttributeWriter, Nl802154Attr, Nl802154Command, SecurityLevel,
    NL802154_LLSEC_KEY_SIZE,
};

use crate::args::Arguments;
use crate::command::{no_arguments, Command, IdentifierMode, RequestState};
use crate::error::{DispatchError, ResponseError};
use crate::response::Report;
use crate::security::{encode_key_id, KeyTable, SecurityParams};

pub const COMMANDS: &[Command] = &[
    Command {
        section: "set",
        verb: "secparams",
        command: Nl802154Command::SetLlsecParams,
        usage: "<enabled> <key_mode> <mode args> <seclevel> [<frame_counter>]",
        identifier: IdentifierMode::NetDevice,
        dump: false,
        encode: set_secparams,
        decode: None,
    },
    Command {
        section: "get",
        verb: "secparams",
        command: Nl802154Command::GetLlsecParams,
        usage: "",
        identifier: IdentifierMode::NetDevice,
        dump: false,
        encode: no_arguments,
        decode: Some(secparams),
    },
    Command {
        section: "key",
        verb: "dump",
        command: Nl802154Command::GetLlsecKey,
        usage: "",
        identifier: IdentifierMode::NetDevice,
        dump: true,
        encode: no_arguments,
        decode: Some(key_table),
    },
    Command {
        section: "key",
        verb: "add",
        command: Nl802154Command::NewLlsecKey,
        usage: "<key_hex> <frame_types> <key_mode> <mode args>",
        identifier: IdentifierMode::NetDevice,
        dump: false,
        encode: add_key,
        decode: None,
    },
    Command {
        section: "key",
        verb: "del",
        command: Nl802154Command::DelLlsecKey,
        usage: "<key_mode> <mode args>",
        identifier: IdentifierMode::NetDevice,
        dump: false,
        encode: del_key,
        decode: None,
    },
];

fn set_secparams(
    args: &mut Arguments<'_>,
    w: &mut AttributeWriter<'_>,
    _: &mut RequestState,
) -> Result<(), DispatchError> {
    let enabled = args.boolean("enabled")?;
    w.put_u8(Nl802154Attr::LlsecEnabled, enabled as u8)?;

    encode_key_id(args, w)?;

    let level: SecurityLevel = args.choice::<u8, _>("seclevel", "security level 0..=7")?;
    w.put_u8(Nl802154Attr::LlsecSeclevel, level.into())?;

    if let Some(counter) = args.optional(|args| args.unsigned::<u32>("frame_counter"))? {
        w.put_u32(Nl802154Attr::LlsecFrameCounter, counter)?;
    }
    Ok(())
}

fn secparams(set: &AttributeSet<'_>, _: &RequestState) -> Result<Report, ResponseError> {
    Ok(Report::SecurityParams(SecurityParams::parse(set)?))
}

fn key_table(set: &AttributeSet<'_>, _: &RequestState) -> Result<Report, ResponseError> {
    let table = KeyTable::parse(set)?;
    for entry in table.entries.iter().filter(|entry| entry.is_partial()) {
        warn!("partial {:?} key entry: {:?}", entry.key_id.mode(), entry.key_id);
    }
    Ok(Report::KeyTable(table))
}

fn add_key(
    args: &mut Arguments<'_>,
    w: &mut AttributeWriter<'_>,
    _: &mut RequestState,
) -> Result<(), DispatchError> {
    let key: [u8; NL802154_LLSEC_KEY_SIZE] = args.hex("key", "16 hex encoded bytes")?;
    let frame_types: u8 = args.bounded("frame_types", 0x0f, "frame type mask 0x0..=0xf")?;

    w.put_u8(Nl802154Attr::LlsecKeyUsageFrameTypes, frame_types)?;
    w.put_bytes(Nl802154Attr::LlsecKeyBytes, &key)?;
    encode_key_id(args, w)?;
    Ok(())
}

fn del_key(
    args: &mut Arguments<'_>,
    w: &mut AttributeWriter<'_>,
    _: &mut RequestState,
) -> Result<(), DispatchError> {
    encode_key_id(args, w)?;
    Ok(())
}
