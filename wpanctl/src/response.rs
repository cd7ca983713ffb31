//! Decoding the messages that answer a request.

use log::{debug, trace, warn};
use wpanctl_attr::{policy, DeviceAddress, Message, Nl802154Attr};

use crate::dispatch::Request;
use crate::error::{ProtocolError, ResponseError};
use crate::scan::{ActiveScanStatus, PanDescriptor, ScanResult};
use crate::security::{KeyTable, SecurityParams};

/// What a response message says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// The kernel accepted the request.
    Ack,
    AssociationConfirm {
        short_addr: u16,
        status: u8,
    },
    DisassociationConfirm {
        status: u8,
        pan_id: u16,
        address: DeviceAddress,
    },
    EdScan(ScanResult),
    /// A beacon received during an active scan.
    Beacon(PanDescriptor),
    ActiveScanConfirm(ActiveScanStatus),
    BeaconNotify {
        sequence_number: u32,
    },
    SecurityParams(SecurityParams),
    KeyTable(KeyTable),
}

/// Turn a missing attribute into [`ProtocolError::MissingField`].
pub(crate) fn required<T>(value: Option<T>, attr: Nl802154Attr) -> Result<T, ProtocolError> {
    value.ok_or(ProtocolError::missing(attr))
}

impl Request {
    /// Decode the messages answering this request.
    ///
    /// A negative error code fails the whole request. Messages after the one
    /// terminating a dump are ignored. When no message carries data the
    /// report is a single [`Report::Ack`] if the kernel acknowledged the
    /// request.
    pub fn complete<B: AsRef<[u8]>>(&self, responses: &[B]) -> Result<Vec<Report>, ResponseError> {
        let mut reports = Vec::new();
        let mut acknowledged = false;

        for bytes in responses {
            let message = Message::new(bytes.as_ref())?;

            let sequence = message.netlink_header().sequence();
            if sequence != self.sequence {
                warn!(
                    "response sequence {sequence} does not match the request's {}",
                    self.sequence
                );
            }

            if let Some(code) = message.error_code() {
                match code? {
                    0 => {
                        debug!("request {} acknowledged", self.sequence);
                        acknowledged = true;
                    }
                    code => return Err(ResponseError::Kernel(code)),
                }
                continue;
            }

            if message.is_done() {
                debug!("dump {} done", self.sequence);
                break;
            }

            let set = message.parse(&policy::NL802154)?;
            for attr in set.iter() {
                trace!("{attr}");
            }

            match self.decode {
                Some(decode) => reports.push(decode(&set, &self.state)?),
                None => debug!(
                    "no decoder for {:?}, ignoring command {}",
                    self.command,
                    message.command()
                ),
            }
        }

        if reports.is_empty() && acknowledged {
            reports.push(Report::Ack);
        }

        Ok(reports)
    }
}
