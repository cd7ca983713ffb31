//! The nl802154 generic netlink ABI.
//!
//! The values up to [`Nl802154Command::AssocCnf`] and
//! [`Nl802154Attr::AssocStatus`] follow the `nl802154.h` header. Values after
//! those are extensions used by the association, scan and link-layer security
//! commands; they are appended so that the header values never move.

/// Name of the generic netlink family.
pub const NL802154_GENL_NAME: &str = "nl802154";

/// Highest channel number of the 2.4 GHz O-QPSK page.
pub const IEEE802154_MAX_CHANNEL: u8 = 26;
/// Highest channel page.
pub const IEEE802154_MAX_PAGE: u8 = 31;
/// Size of a link-layer security key.
pub const NL802154_LLSEC_KEY_SIZE: usize = 16;

macro_rules! abi_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident: $repr:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
        #[repr($repr)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant = $value,
            )+
        }

        impl TryFrom<$repr> for $name {
            type Error = $repr;

            /// Convert a raw value, returning it back if it has no variant.
            fn try_from(value: $repr) -> core::result::Result<Self, Self::Error> {
                match value {
                    $($value => Ok(Self::$variant),)+
                    other => Err(other),
                }
            }
        }

        impl From<$name> for $repr {
            fn from(value: $name) -> Self {
                value as $repr
            }
        }
    };
}

abi_enum! {
    /// nl802154 commands.
    pub enum Nl802154Command: u8 {
        Unspec = 0,
        GetWpanPhy = 1,
        SetWpanPhy = 2,
        NewWpanPhy = 3,
        DelWpanPhy = 4,
        GetInterface = 5,
        SetInterface = 6,
        NewInterface = 7,
        DelInterface = 8,
        SetChannel = 9,
        SetPanId = 10,
        SetShortAddr = 11,
        SetTxPower = 12,
        SetCcaMode = 13,
        SetCcaEdLevel = 14,
        SetMaxFrameRetries = 15,
        SetBackoffExponent = 16,
        SetMaxCsmaBackoffs = 17,
        SetLbtMode = 18,
        EdScanReq = 19,
        EdScanCnf = 20,
        AssocReq = 21,
        AssocInd = 22,
        AssocRsp = 23,
        AssocCnf = 24,
        DisassocReq = 25,
        DisassocInd = 26,
        DisassocCnf = 27,
        ActiveScanReq = 28,
        BeaconNotifyInd = 29,
        SetLlsecParams = 30,
        GetLlsecParams = 31,
        GetLlsecKey = 32,
        NewLlsecKey = 33,
        DelLlsecKey = 34,
    }
}

abi_enum! {
    /// nl802154 top-level attributes.
    pub enum Nl802154Attr: u16 {
        Unspec = 0,
        WpanPhy = 1,
        WpanPhyName = 2,
        Ifindex = 3,
        Ifname = 4,
        Iftype = 5,
        WpanDev = 6,
        Page = 7,
        Channel = 8,
        PanId = 9,
        ShortAddr = 10,
        TxPower = 11,
        CcaMode = 12,
        CcaOpt = 13,
        CcaEdLevel = 14,
        MaxFrameRetries = 15,
        MaxBe = 16,
        MinBe = 17,
        MaxCsmaBackoffs = 18,
        LbtMode = 19,
        Generation = 20,
        ChannelsSupported = 21,
        SupportedChannel = 22,
        ExtendedAddr = 23,
        WpanPhyCaps = 24,
        SupportedCommands = 25,
        ScanStatus = 26,
        ScanType = 27,
        ScanDuration = 28,
        ScanResultListSize = 29,
        ScanEnergyDetectList = 30,
        ScanEnergyDetectListEntry = 31,
        ScanDetectedCategory = 32,
        SecLevel = 33,
        SecKeyIdMode = 34,
        SecKeySource = 35,
        SecKeySourceEntry = 36,
        SecKeyIndex = 37,
        AddrMode = 38,
        AssocCapInfo = 39,
        AssocStatus = 40,
        PanDescriptor = 41,
        BeaconSequenceNumber = 42,
        DisassocReason = 43,
        DisassocStatus = 44,
        TxIndirect = 45,
        LlsecEnabled = 46,
        LlsecKeyMode = 47,
        LlsecKeyId = 48,
        LlsecKeySourceShort = 49,
        LlsecKeySourceExtended = 50,
        LlsecSeclevel = 51,
        LlsecFrameCounter = 52,
        LlsecKeyTable = 53,
        LlsecKeyUsageFrameTypes = 54,
        LlsecKeyBytes = 55,
        LlsecKeyEntry = 56,
    }
}

abi_enum! {
    /// Attributes nested in [`Nl802154Attr::PanDescriptor`].
    pub enum PanDescriptorAttr: u16 {
        Unspec = 0,
        SrcAddrMode = 1,
        SrcPanId = 2,
        SrcAddr = 3,
        ChannelNum = 4,
        ChannelPage = 5,
        SuperframeSpec = 6,
        GtsPermit = 7,
        Lqi = 8,
        TimeStamp = 9,
        SecStatus = 10,
        SecLevel = 11,
        KeyIdMode = 12,
        KeySrc = 13,
        KeyIndex = 14,
    }
}

abi_enum! {
    /// Clear channel assessment modes.
    pub enum CcaMode: u32 {
        /// Energy above threshold.
        Energy = 1,
        /// Carrier sense only.
        Carrier = 2,
        /// Carrier sense combined with energy above threshold, see
        /// [`CcaOption`].
        EnergyCarrier = 3,
        /// Always report an idle medium.
        Aloha = 4,
        /// UWB preamble sense based on the SHR of a frame.
        UwbShr = 5,
        /// UWB preamble sense based on the packet with the multiplexed
        /// preamble.
        UwbMultiplexed = 6,
    }
}

abi_enum! {
    /// How energy and carrier are combined in [`CcaMode::EnergyCarrier`].
    pub enum CcaOption: u32 {
        EnergyCarrierAnd = 0,
        EnergyCarrierOr = 1,
    }
}

abi_enum! {
    /// MLME scan types.
    pub enum ScanType: u8 {
        Ed = 0,
        Active = 1,
        Passive = 2,
        Orphan = 3,
    }
}

abi_enum! {
    /// Key identifier modes of the link-layer security.
    pub enum KeyMode: u8 {
        /// The key is derived from the device address.
        Implicit = 0,
        /// The key is selected by a key index.
        Index = 1,
        /// Key index plus a 4 byte key source.
        ShortIndex = 2,
        /// Key index plus an 8 byte key source.
        ExtendedIndex = 3,
    }
}

abi_enum! {
    /// Link-layer security levels.
    pub enum SecurityLevel: u8 {
        None = 0,
        Mic32 = 1,
        Mic64 = 2,
        Mic128 = 3,
        Enc = 4,
        EncMic32 = 5,
        EncMic64 = 6,
        EncMic128 = 7,
    }
}

abi_enum! {
    /// MAC frame types, used as bit positions of a key usage mask.
    pub enum FrameType: u8 {
        Beacon = 0,
        Data = 1,
        Ack = 2,
        Command = 3,
    }
}

impl core::fmt::Display for Nl802154Attr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl core::fmt::Display for PanDescriptorAttr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_values() {
        assert_eq!(Nl802154Command::SetChannel as u8, 9);
        assert_eq!(Nl802154Command::EdScanReq as u8, 19);
        assert_eq!(Nl802154Command::AssocCnf as u8, 24);
        assert_eq!(Nl802154Attr::Page as u16, 7);
        assert_eq!(Nl802154Attr::PanId as u16, 9);
        assert_eq!(Nl802154Attr::ExtendedAddr as u16, 23);
        assert_eq!(Nl802154Attr::ScanEnergyDetectListEntry as u16, 31);
        assert_eq!(Nl802154Attr::AssocStatus as u16, 40);
    }

    #[test]
    fn try_from_rejects_unknown() {
        assert_eq!(CcaMode::try_from(3), Ok(CcaMode::EnergyCarrier));
        assert_eq!(CcaMode::try_from(0), Err(0));
        assert_eq!(CcaMode::try_from(7), Err(7));
        assert_eq!(KeyMode::try_from(4), Err(4));
        assert_eq!(Nl802154Attr::try_from(31), Ok(Nl802154Attr::ScanEnergyDetectListEntry));
        assert_eq!(u16::from(Nl802154Attr::Channel), 8);
    }
}
