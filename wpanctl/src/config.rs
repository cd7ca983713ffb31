//! Build-time configuration.
//!
//! Every constant can be overridden by setting `WPANCTL_<NAME>` when
//! building, e.g. `WPANCTL_MESSAGE_BUFFER_SIZE=8192`.
//!
//! - `MAX_CHANNEL`: highest channel number an energy list is paired with.
//! - `MAX_PAGE`: highest accepted channel page.
//! - `MESSAGE_BUFFER_SIZE`: capacity of an encoded request.
//! - `DEFAULT_SCAN_DURATION`: scan duration exponent when none is given.
//! - `DEFAULT_PAGE0_CHANNELS`: channel mask scanned on page 0 by default.
//! - `GENL_VERSION`: generic netlink family version put in requests.
#![allow(unused)]

include!(concat!(env!("OUT_DIR"), "/config.rs"));
