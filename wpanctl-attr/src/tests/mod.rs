use super::*;

#[test]
fn every_value_survives_the_wire() {
    let nested = [0x05, 0x00, 0x1f, 0x00, 0x0a, 0x00, 0x00, 0x00];
    let values = [
        AttributeValue::U8(0xfe),
        AttributeValue::S8(-3),
        AttributeValue::U16(0xabcd),
        AttributeValue::U32(0x0001_0203),
        AttributeValue::S32(-1000),
        AttributeValue::U64(0x0011_2233_4455_6677),
        AttributeValue::S64(i64::MIN),
        AttributeValue::Bytes(&[1, 2, 3, 4, 5]),
        AttributeValue::String("wpan0"),
        AttributeValue::Flag,
        AttributeValue::Nested(&nested),
    ];

    let mut buffer = [0u8; 256];
    let mut w = AttributeWriter::new(&mut buffer[..]);
    for (tag, value) in values.iter().enumerate() {
        w.put_value(tag as u16 + 1, value).unwrap();
    }
    let len = w.finish();

    let set = AttributeSet::parse(&buffer[..len]).unwrap();
    assert_eq!(set.len(), values.len());
    for (tag, value) in values.iter().enumerate() {
        let decoded = set.value(tag as u16 + 1, value.kind()).unwrap();
        assert_eq!(decoded, Some(*value));
    }

    let flag = set.get(10u16).unwrap();
    assert!(!flag.flags().contains(AttributeFlags::NESTED));
    let nested = set.get(11u16).unwrap();
    assert!(nested.flags().contains(AttributeFlags::NESTED));
}

#[test]
fn string_length_counts_terminator() {
    let value = AttributeValue::String("wpan0");
    assert_eq!(value.payload_len(), 6);

    let mut buffer = [0u8; 16];
    let mut w = AttributeWriter::new(&mut buffer[..]);
    w.put_value(Nl802154Attr::Ifname, &value).unwrap();
    let attr = Attribute::new(&buffer[..]).unwrap();
    assert_eq!(attr.length() as usize, ATTRIBUTE_HEADER_LEN + value.payload_len());
}

/// An ED scan confirm as sent by the kernel.
const ED_SCAN_CNF: &str = concat!(
    "58000000", "1a000000", "01000000", "00000000", // netlink header
    "14010000", // genl header: ED_SCAN_CNF v1
    "05001a00", "00000000", // scan status 0
    "05001b00", "00000000", // scan type ED
    "05000700", "00000000", // page 0
    "08001600", "05000000", // supported channels 0b101
    "05001d00", "02000000", // result list size 2
    "14001e80", // energy list
    "05001f00", "0a000000", //   10
    "05001f00", "14000000", //   20
    "05002000", "00000000", // detected category
);

#[test]
fn ed_scan_confirm() {
    let bytes = hex::decode(ED_SCAN_CNF).unwrap();
    let message = Message::new(&bytes[..]).unwrap();
    assert_eq!(message.command(), Nl802154Command::EdScanCnf as u8);

    let set = message.parse(&policy::NL802154).unwrap();
    assert_eq!(set.u8(Nl802154Attr::ScanStatus), Ok(Some(0)));
    assert_eq!(set.u32(Nl802154Attr::SupportedChannel), Ok(Some(0b101)));
    assert_eq!(set.u8(Nl802154Attr::ScanResultListSize), Ok(Some(2)));

    let list = set.bytes(Nl802154Attr::ScanEnergyDetectList).unwrap();
    let mut energies = [0u8; IEEE802154_MAX_CHANNEL as usize + 1];
    let len = decode_nested_array(
        list,
        Nl802154Attr::ScanEnergyDetectListEntry.into(),
        &mut energies,
    );
    assert_eq!(&energies[..len], &[10, 20]);
}

#[test]
fn truncated_message_is_rejected() {
    let bytes = hex::decode(ED_SCAN_CNF).unwrap();
    assert!(matches!(
        Message::new(&bytes[..bytes.len() - 1]),
        Err(DecodeError::Malformed(Malformed::BadMessageLength { .. }))
    ));
}

#[test]
fn attribute_cut_by_declared_length() {
    // The declared length ends in the middle of the channel attribute.
    let bytes = hex::decode(concat!(
        "18000000", "1a000000", "00000000", "00000000", //
        "09010000", //
        "05000800", "0b000000",
    ))
    .unwrap();
    let message = Message::new(&bytes[..]).unwrap();
    assert_eq!(
        message.parse(&policy::NL802154).unwrap_err(),
        DecodeError::Malformed(Malformed::Overrun {
            tag: Nl802154Attr::Channel.into(),
            length: 5,
            available: 4
        })
    );
}

#[test]
fn key_table() {
    let mut buffer = [0u8; 128];
    let mut w = AttributeWriter::new(&mut buffer[..]);
    w.nested(Nl802154Attr::LlsecKeyTable, |w| {
        w.nested(Nl802154Attr::LlsecKeyEntry, |w| {
            w.put_u8(Nl802154Attr::LlsecKeyMode, KeyMode::Index.into())?;
            w.put_u8(Nl802154Attr::LlsecKeyId, 5)?;
            w.put_bytes(Nl802154Attr::LlsecKeyBytes, &[0xaa; NL802154_LLSEC_KEY_SIZE])
        })?;
        w.nested(Nl802154Attr::LlsecKeyEntry, |w| {
            w.put_u8(Nl802154Attr::LlsecKeyMode, KeyMode::ShortIndex.into())?;
            w.put_u32(Nl802154Attr::LlsecKeySourceShort, 0xdead_beef)
        })
    })
    .unwrap();
    let len = w.finish();

    let set = AttributeSet::parse_with(&buffer[..len], &policy::NL802154).unwrap();
    let table = set.get(Nl802154Attr::LlsecKeyTable).unwrap();
    let entries: std::vec::Vec<_> = table
        .nested_ref()
        .map(|entry| AttributeSet::parse(entry.unwrap().payload_ref()).unwrap())
        .collect();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].u8(Nl802154Attr::LlsecKeyId), Ok(Some(5)));
    assert_eq!(
        entries[1].u32(Nl802154Attr::LlsecKeySourceShort),
        Ok(Some(0xdead_beef))
    );
    assert_eq!(entries[1].u8(Nl802154Attr::LlsecKeyId), Ok(None));
}

#[test]
fn pan_descriptor_address_follows_mode() {
    let mut buffer = [0u8; 64];
    let mut w = AttributeWriter::new(&mut buffer[..]);
    w.nested(Nl802154Attr::PanDescriptor, |w| {
        w.put_u8(PanDescriptorAttr::SrcAddrMode, AddressMode::Extended.into())?;
        w.put_u16(PanDescriptorAttr::SrcPanId, 0xabcd)?;
        w.put_u64(PanDescriptorAttr::SrcAddr, 0x0012_4b00_14b5_d9c7)
    })
    .unwrap();
    let len = w.finish();

    let set = AttributeSet::parse_with(&buffer[..len], &policy::NL802154).unwrap();
    let pd = set
        .nested_with(Nl802154Attr::PanDescriptor, &policy::PAN_DESCRIPTOR)
        .unwrap()
        .unwrap();
    let mode = pd
        .u8(PanDescriptorAttr::SrcAddrMode)
        .unwrap()
        .map(|m| AddressMode::try_from(m).unwrap());
    let addr = DeviceAddress::from_payload(pd.bytes(PanDescriptorAttr::SrcAddr).unwrap(), mode);
    assert_eq!(addr, Some(DeviceAddress::Extended(0x0012_4b00_14b5_d9c7)));
}
