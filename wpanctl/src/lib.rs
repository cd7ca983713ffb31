//! Command registry, dispatcher and response decoding for the nl802154
//! generic netlink family.
//!
//! An invocation goes through the following steps:
//! - the [`Registry`] maps a (section, verb) pair to a [`Command`],
//! - the [`Dispatcher`] resolves the identifier, parses the arguments and
//!   encodes a [`Request`],
//! - a [`Transport`] carries the request to the kernel and returns the
//!   response messages,
//! - [`Request::complete`] decodes those into [`Report`]s.
//!
//! ```
//! # use wpanctl::{Dispatcher, Registry, StaticResolver, Report, ReplayTransport, Transport};
//! let registry = Registry::standard().unwrap();
//! let resolver = StaticResolver::new().with_phy("phy0", 0);
//! let mut dispatcher = Dispatcher::with_sequence(&registry, resolver, 0x1a, 1);
//!
//! let request = dispatcher.dispatch("set", "channel", Some("phy0"), &["0", "11"]).unwrap();
//!
//! let mut transport = ReplayTransport::new();
//! transport.push_hex(["1400000002000000010000000000000000000000"]).unwrap();
//! let responses = transport.send_and_await(&request.bytes, request.dump).unwrap();
//! assert_eq!(request.complete(&responses).unwrap(), vec![Report::Ack]);
//! ```

pub use wpanctl_attr as attr;

mod config;
pub use config::*;

pub mod args;
pub mod command;
pub mod commands;
pub mod error;
pub mod resolve;
pub mod scan;
pub mod security;
pub mod transport;

mod dispatch;
pub use dispatch::{Dispatcher, Request};

mod registry;
pub use registry::{Registry, RegistryBuilder};

mod response;
pub use response::Report;

pub use command::{Command, IdentifierMode, RequestState};
pub use error::Error;
pub use resolve::{IdentifierResolver, StaticResolver, SysfsResolver};
pub use transport::{ReplayTransport, Transport};

#[cfg(test)]
mod tests;
