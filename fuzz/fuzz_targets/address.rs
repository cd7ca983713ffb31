#![no_main]

use wpanctl_attr::{AddressFields, AddressSpec, AttributeSet, AttributeWriter, Nl802154Attr};

use libfuzzer_sys::fuzz_target;

const FIELDS: AddressFields = AddressFields {
    short: Nl802154Attr::ShortAddr as u16,
    extended: Nl802154Attr::ExtendedAddr as u16,
    mode: Some(Nl802154Attr::AddrMode as u16),
};

fuzz_target!(|spec: AddressSpec| {
    let mut buffer = [0u8; 32];
    let mut w = AttributeWriter::new(&mut buffer[..]);
    spec.emit(&mut w, &FIELDS).unwrap();
    let len = w.finish();

    let set = AttributeSet::parse(&buffer[..len]).unwrap();
    let parsed = AddressSpec::parse(&set, &FIELDS).unwrap();
    assert_eq!(parsed.address(), spec.address());
});
