#![no_main]

use wpanctl_attr::{decode_nested_array, policy, Message, Nl802154Attr};

use libfuzzer_sys::{fuzz_target, Corpus};

fuzz_target!(|data: &[u8]| -> Corpus {
    if data.len() > 4096 {
        return Corpus::Reject;
    }

    let Ok(message) = Message::new(data) else {
        return Corpus::Keep;
    };
    let _ = message.error_code();

    if let Ok(set) = message.parse(&policy::NL802154) {
        if let Some(list) = set.bytes(Nl802154Attr::ScanEnergyDetectList) {
            let mut levels = [0u8; 27];
            let len = decode_nested_array(
                list,
                Nl802154Attr::ScanEnergyDetectListEntry.into(),
                &mut levels,
            );
            assert!(len <= levels.len());
        }

        for attr in set.iter() {
            let _ = attr.nested_ref().count();
        }
    }

    Corpus::Keep
});
