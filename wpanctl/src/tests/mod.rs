use super::*;

use crate::error::{ArgumentError, ArgumentErrorKind, DispatchError, ProtocolError, ResponseError};
use crate::scan::ScanResult;
use crate::security::KeyId;
use wpanctl_attr::{
    AddressMode, AttributeSet, AttributeWriter, DeviceAddress, EncodeError, KeyMode, Message,
    MessageFlags, MessageWriter, NetlinkHeader, Nl802154Attr, Nl802154Command, NLMSG_DONE,
    NLMSG_ERROR,
};

const FAMILY: u16 = 0x1a;
const SEQUENCE: u32 = 100;

/// Route the library's logs to the test harness, `RUST_LOG` picks the level.
fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn dispatcher(registry: &Registry) -> Dispatcher<'_, StaticResolver> {
    let resolver = StaticResolver::new()
        .with_phy("phy0", 0)
        .with_interface("wpan0", 4);
    Dispatcher::with_sequence(registry, resolver, FAMILY, SEQUENCE)
}

/// A message as the kernel sends it.
fn response(
    command: Nl802154Command,
    sequence: u32,
    f: impl FnOnce(&mut AttributeWriter<'_>) -> Result<(), EncodeError>,
) -> Vec<u8> {
    let mut buffer = vec![0u8; 512];
    let mut w = MessageWriter::new(
        &mut buffer[..],
        FAMILY,
        MessageFlags::empty(),
        sequence,
        command.into(),
        1,
    )
    .unwrap();
    f(w.attributes()).unwrap();
    let len = w.finish();
    buffer.truncate(len);
    buffer
}

/// An error, acknowledgement or done message.
fn control(kind: u16, sequence: u32, code: i32) -> Vec<u8> {
    let mut buffer = vec![0u8; 20];
    let mut header = NetlinkHeader::new_unchecked(&mut buffer[..16]);
    header.set_length(20);
    header.set_kind(kind);
    header.set_sequence(sequence);
    buffer[16..].copy_from_slice(&code.to_le_bytes());
    buffer
}

fn attributes(request: &Request) -> AttributeSet<'_> {
    // Leak the message so the returned set can borrow from it.
    let message: &Message<&[u8]> = Box::leak(Box::new(Message::new(&request.bytes[..]).unwrap()));
    message
        .parse(&attr::policy::NL802154)
        .unwrap()
}

#[test]
fn set_channel() {
    let registry = Registry::standard().unwrap();
    let mut dispatcher = dispatcher(&registry);

    let request = dispatcher
        .dispatch("set", "channel", Some("phy0"), &["0", "11"])
        .unwrap();
    assert_eq!(request.command, Nl802154Command::SetChannel);
    assert_eq!(request.sequence, SEQUENCE);

    let message = Message::new(&request.bytes[..]).unwrap();
    assert_eq!(message.kind(), FAMILY);
    assert_eq!(message.flags(), MessageFlags::REQUEST | MessageFlags::ACK);
    assert_eq!(message.command(), Nl802154Command::SetChannel as u8);

    // The identifier, then page and channel in that order.
    let tags: Vec<u16> = message.attributes().map(|a| a.unwrap().tag()).collect();
    assert_eq!(
        tags,
        vec![
            u16::from(Nl802154Attr::WpanPhy),
            u16::from(Nl802154Attr::Page),
            u16::from(Nl802154Attr::Channel),
        ]
    );

    let set = attributes(&request);
    assert_eq!(set.u32(Nl802154Attr::WpanPhy), Ok(Some(0)));
    assert_eq!(set.u8(Nl802154Attr::Page), Ok(Some(0)));
    assert_eq!(set.u8(Nl802154Attr::Channel), Ok(Some(11)));

    // The sequence number advances with every request.
    let request = dispatcher
        .dispatch("set", "channel", Some("phy0"), &["0", "12"])
        .unwrap();
    assert_eq!(request.sequence, SEQUENCE + 1);
}

#[test]
fn set_pan_id() {
    let registry = Registry::standard().unwrap();
    let request = dispatcher(&registry)
        .dispatch_tokens("set", "pan_id", &["wpan0", "0x1234"])
        .unwrap();

    let set = attributes(&request);
    assert_eq!(set.len(), 2);
    assert_eq!(set.u32(Nl802154Attr::Ifindex), Ok(Some(4)));
    assert_eq!(
        set.get(Nl802154Attr::PanId).unwrap().payload(),
        &[0x34, 0x12]
    );
}

#[test]
fn max_frame_retries_not_a_number() {
    let registry = Registry::standard().unwrap();
    let err = dispatcher(&registry)
        .dispatch_tokens("set", "max_frame_retries", &["wpan0", "abc"])
        .unwrap_err();

    match err {
        DispatchError::Argument(err) => assert_eq!(
            err,
            ArgumentError {
                index: 0,
                name: "retries",
                expected: "integer",
                kind: ArgumentErrorKind::Malformed,
            }
        ),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn dispatch_errors() {
    let registry = Registry::standard().unwrap();
    let mut dispatcher = dispatcher(&registry);

    assert!(matches!(
        dispatcher.dispatch("set", "frequency", Some("phy0"), &["2405"]),
        Err(DispatchError::UnknownCommand { .. })
    ));
    assert!(matches!(
        dispatcher.dispatch_tokens("set", "pan_id", &[]),
        Err(DispatchError::MissingIdentifier {
            what: "a network device",
            ..
        })
    ));
    assert!(matches!(
        dispatcher.dispatch("set", "pan_id", Some("wpan9"), &["1"]),
        Err(DispatchError::Resolve(_))
    ));
    assert!(matches!(
        dispatcher.dispatch("set", "pan_id", Some("wpan0"), &["1", "2"]),
        Err(DispatchError::Argument(ArgumentError {
            index: 1,
            kind: ArgumentErrorKind::TooMany,
            ..
        }))
    ));
}

#[test]
fn ed_scan() {
    init_logger();
    let registry = Registry::standard().unwrap();
    let request = dispatcher(&registry)
        .dispatch_tokens("get", "ed_scan", &["phy0", "0", "0b101"])
        .unwrap_err();
    assert!(matches!(request, DispatchError::Argument(_)));

    let request = dispatcher(&registry)
        .dispatch_tokens("get", "ed_scan", &["phy0", "0", "5"])
        .unwrap();
    assert_eq!(request.state.scan_channels, Some(0b101));

    let confirm = response(Nl802154Command::EdScanCnf, SEQUENCE, |w| {
        w.put_u8(Nl802154Attr::ScanStatus, 0)?;
        w.put_u8(Nl802154Attr::ScanType, 0)?;
        w.put_u8(Nl802154Attr::Page, 0)?;
        w.put_u32(Nl802154Attr::SupportedChannel, 0b101)?;
        w.put_u8(Nl802154Attr::ScanResultListSize, 2)?;
        w.nested(Nl802154Attr::ScanEnergyDetectList, |w| {
            w.put_u8(Nl802154Attr::ScanEnergyDetectListEntry, 10)?;
            w.put_u8(Nl802154Attr::ScanEnergyDetectListEntry, 20)
        })?;
        w.put_u8(Nl802154Attr::ScanDetectedCategory, 0)
    });

    let mut transport = ReplayTransport::new();
    transport.push(vec![confirm]);
    let responses = transport
        .send_and_await(&request.bytes, request.dump)
        .unwrap();

    assert_eq!(
        request.complete(&responses).unwrap(),
        vec![Report::EdScan(ScanResult {
            status: 0,
            scan_type: 0,
            page: 0,
            channels: 0b101,
            result_list_size: 2,
            energies: vec![(0, 10), (2, 20)],
            detected_category: 0,
        })]
    );
    assert_eq!(transport.sent(), &[request.bytes.clone()]);
}

#[test]
fn ed_scan_missing_field() {
    let registry = Registry::standard().unwrap();
    let request = dispatcher(&registry)
        .dispatch_tokens("get", "ed_scan", &["phy0"])
        .unwrap();

    let confirm = response(Nl802154Command::EdScanCnf, SEQUENCE, |w| {
        w.put_u8(Nl802154Attr::ScanStatus, 0)
    });
    assert!(matches!(
        request.complete(&[confirm]),
        Err(ResponseError::Protocol(ProtocolError::MissingField(tag)))
            if tag == u16::from(Nl802154Attr::ScanType)
    ));
}

#[test]
fn association_confirm_with_only_status() {
    let registry = Registry::standard().unwrap();
    let request = dispatcher(&registry)
        .dispatch_tokens(
            "set",
            "associate",
            &["wpan0", "11", "0", "2", "0xabcd", "0x0001", "0x80"],
        )
        .unwrap();

    let confirm = response(Nl802154Command::AssocCnf, SEQUENCE, |w| {
        w.put_u8(Nl802154Attr::AssocStatus, 0)
    });
    let err = request.complete(&[confirm]).unwrap_err();
    assert!(matches!(
        err,
        ResponseError::Protocol(ProtocolError::MissingField(10))
    ));
    assert_eq!(Error::from(err).exit_code(), 2);

    let confirm = response(Nl802154Command::AssocCnf, SEQUENCE, |w| {
        w.put_u16(Nl802154Attr::ShortAddr, 0x0042)?;
        w.put_u8(Nl802154Attr::AssocStatus, 0)
    });
    assert_eq!(
        request.complete(&[confirm]).unwrap(),
        vec![Report::AssociationConfirm {
            short_addr: 0x0042,
            status: 0
        }]
    );
}

#[test]
fn disassociation_confirm_never_misreads() {
    init_logger();
    let registry = Registry::standard().unwrap();
    let request = dispatcher(&registry)
        .dispatch_tokens("set", "disassociate", &["wpan0", "0xabcd", "0x1", "2"])
        .unwrap();

    // Extended mode, but only a short address.
    let confirm = response(Nl802154Command::DisassocCnf, SEQUENCE, |w| {
        w.put_u8(Nl802154Attr::DisassocStatus, 0)?;
        w.put_u8(Nl802154Attr::AddrMode, AddressMode::Extended.into())?;
        w.put_u16(Nl802154Attr::PanId, 0xabcd)?;
        w.put_u16(Nl802154Attr::ShortAddr, 0x0001)
    });
    assert!(matches!(
        request.complete(&[confirm]),
        Err(ResponseError::Protocol(ProtocolError::MissingField(23)))
    ));

    let confirm = response(Nl802154Command::DisassocCnf, SEQUENCE, |w| {
        w.put_u8(Nl802154Attr::DisassocStatus, 0)?;
        w.put_u8(Nl802154Attr::AddrMode, 0x01)?;
        w.put_u16(Nl802154Attr::PanId, 0xabcd)
    });
    assert!(matches!(
        request.complete(&[confirm]),
        Err(ResponseError::Protocol(ProtocolError::UnknownAddressMode(1)))
    ));
}

#[test]
fn active_scan_stream() {
    init_logger();
    let registry = Registry::standard().unwrap();
    let request = dispatcher(&registry)
        .dispatch_tokens("set", "active_scan", &["wpan0", "0", "0x800", "4"])
        .unwrap();

    let beacon = response(Nl802154Command::ActiveScanReq, SEQUENCE, |w| {
        w.nested(Nl802154Attr::PanDescriptor, |w| {
            w.put_u8(attr::PanDescriptorAttr::SrcAddrMode, AddressMode::Short.into())?;
            w.put_u16(attr::PanDescriptorAttr::SrcPanId, 0xabcd)?;
            w.put_u16(attr::PanDescriptorAttr::SrcAddr, 0x0001)?;
            w.put_u8(attr::PanDescriptorAttr::ChannelNum, 11)
        })
    });
    let status = response(Nl802154Command::ActiveScanReq, SEQUENCE, |w| {
        w.put_u8(Nl802154Attr::ScanStatus, 0)?;
        w.put_u8(Nl802154Attr::ScanType, 1)?;
        w.put_u8(Nl802154Attr::Page, 0)?;
        w.put_u8(Nl802154Attr::ScanDetectedCategory, 0)?;
        w.put_u8(Nl802154Attr::ScanResultListSize, 1)
    });

    let reports = request.complete(&[beacon, status]).unwrap();
    assert_eq!(reports.len(), 2);
    match &reports[0] {
        Report::Beacon(pd) => {
            assert_eq!(pd.src_addr, Some(DeviceAddress::Short(1)));
            assert_eq!(pd.channel, Some(11));
        }
        other => panic!("expected a beacon, got {other:?}"),
    }
    assert!(matches!(&reports[1], Report::ActiveScanConfirm(s) if s.result_list_size == 1));
}

#[test]
fn key_dump_stream() {
    init_logger();
    let registry = Registry::standard().unwrap();
    let request = dispatcher(&registry)
        .dispatch_tokens("key", "dump", &["wpan0"])
        .unwrap();
    assert!(request.dump);
    assert_eq!(
        Message::new(&request.bytes[..]).unwrap().flags(),
        MessageFlags::REQUEST | MessageFlags::DUMP
    );

    let table = response(Nl802154Command::GetLlsecKey, SEQUENCE, |w| {
        w.put_u32(Nl802154Attr::WpanPhy, 0)?;
        w.put_string(Nl802154Attr::Ifname, "wpan0")?;
        w.put_u32(Nl802154Attr::Ifindex, 4)?;
        w.nested(Nl802154Attr::LlsecKeyTable, |w| {
            w.nested(Nl802154Attr::LlsecKeyEntry, |w| {
                w.put_u8(Nl802154Attr::LlsecKeyMode, KeyMode::Index.into())?;
                w.put_u8(Nl802154Attr::LlsecKeyId, 3)
            })?;
            // Partial: the source is missing.
            w.nested(Nl802154Attr::LlsecKeyEntry, |w| {
                w.put_u8(Nl802154Attr::LlsecKeyMode, KeyMode::ExtendedIndex.into())?;
                w.put_u8(Nl802154Attr::LlsecKeyId, 4)
            })
        })
    });
    let done = control(NLMSG_DONE, SEQUENCE, 0);
    let trailing = vec![0xff; 3];

    let reports = request.complete(&[table, done, trailing]).unwrap();
    let [Report::KeyTable(table)] = &reports[..] else {
        panic!("expected one key table, got {reports:?}");
    };
    assert_eq!(table.ifname.as_deref(), Some("wpan0"));
    assert_eq!(table.entries.len(), 2);
    assert_eq!(table.entries[0].key_id, KeyId::Index { index: Some(3) });
    assert!(table.entries[1].is_partial());
}

#[test]
fn key_entry_without_mode() {
    let registry = Registry::standard().unwrap();
    let request = dispatcher(&registry)
        .dispatch_tokens("key", "dump", &["wpan0"])
        .unwrap();

    let table = response(Nl802154Command::GetLlsecKey, SEQUENCE, |w| {
        w.nested(Nl802154Attr::LlsecKeyTable, |w| {
            w.nested(Nl802154Attr::LlsecKeyEntry, |w| {
                w.put_u8(Nl802154Attr::LlsecKeyId, 3)
            })
        })
    });
    assert!(matches!(
        request.complete(&[table]),
        Err(ResponseError::Protocol(ProtocolError::MissingField(tag)))
            if tag == u16::from(Nl802154Attr::LlsecKeyMode)
    ));
}

#[test]
fn kernel_error() {
    let registry = Registry::standard().unwrap();
    let request = dispatcher(&registry)
        .dispatch_tokens("set", "lbt", &["wpan0", "1"])
        .unwrap();

    let err = request
        .complete(&[control(NLMSG_ERROR, SEQUENCE, -22)])
        .unwrap_err();
    assert!(matches!(err, ResponseError::Kernel(-22)));
    assert_eq!(Error::from(err).exit_code(), 2);

    assert_eq!(
        request
            .complete(&[control(NLMSG_ERROR, SEQUENCE, 0)])
            .unwrap(),
        vec![Report::Ack]
    );
}

#[test]
fn truncated_response() {
    let registry = Registry::standard().unwrap();
    let request = dispatcher(&registry)
        .dispatch_tokens("get", "secparams", &["wpan0"])
        .unwrap();

    let mut params = response(Nl802154Command::GetLlsecParams, SEQUENCE, |w| {
        w.put_u8(Nl802154Attr::LlsecEnabled, 1)
    });
    params.truncate(params.len() - 2);
    assert!(matches!(
        request.complete(&[params]),
        Err(ResponseError::Protocol(ProtocolError::Decode(_)))
    ));
}

#[test]
fn duplicate_registration() {
    let mut builder = RegistryBuilder::new();
    builder
        .register_all(commands::phy::COMMANDS.iter().copied())
        .unwrap();
    assert!(matches!(
        builder.register(commands::phy::COMMANDS[0]),
        Err(error::RegistryError::Duplicate {
            section: "set",
            verb: "channel"
        })
    ));
}

#[test]
fn every_command_has_a_usage() {
    let registry = Registry::standard().unwrap();
    for command in registry.iter() {
        let line = command.to_string();
        assert!(line.starts_with(command.section), "{line}");
        match command.identifier {
            IdentifierMode::NetDevice => assert!(line.contains("<dev>"), "{line}"),
            IdentifierMode::Phy => assert!(line.contains("<phy>"), "{line}"),
            IdentifierMode::None => {}
        }
    }
}
