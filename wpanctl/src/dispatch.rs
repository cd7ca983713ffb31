//! Turning a CLI invocation into a request message.

use log::debug;
use rand::Rng;
use wpanctl_attr::{MessageWriter, Nl802154Attr, Nl802154Command};

use crate::args::Arguments;
use crate::command::{DecodeFn, IdentifierMode, RequestState};
use crate::config::{GENL_VERSION, MESSAGE_BUFFER_SIZE};
use crate::error::DispatchError;
use crate::registry::Registry;
use crate::resolve::IdentifierResolver;

/// An encoded request, ready to be sent.
#[derive(Debug, Clone)]
pub struct Request {
    pub command: Nl802154Command,
    pub dump: bool,
    pub sequence: u32,
    /// The whole message, headers included.
    pub bytes: Vec<u8>,
    pub state: RequestState,
    pub(crate) decode: Option<DecodeFn>,
}

/// Resolves (section, verb) in a [`Registry`] and encodes requests.
pub struct Dispatcher<'r, R: IdentifierResolver> {
    registry: &'r Registry,
    resolver: R,
    family: u16,
    sequence: u32,
}

impl<'r, R: IdentifierResolver> Dispatcher<'r, R> {
    /// Create a dispatcher for the generic netlink family `family`, starting
    /// at a random sequence number.
    pub fn new(registry: &'r Registry, resolver: R, family: u16) -> Self {
        let sequence = rand::thread_rng().gen();
        Self::with_sequence(registry, resolver, family, sequence)
    }

    pub fn with_sequence(registry: &'r Registry, resolver: R, family: u16, sequence: u32) -> Self {
        Self {
            registry,
            resolver,
            family,
            sequence,
        }
    }

    pub fn family(&self) -> u16 {
        self.family
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Encode `section verb` for `identifier` with the arguments `args`.
    ///
    /// Every argument must be consumed.
    pub fn dispatch(
        &mut self,
        section: &str,
        verb: &str,
        identifier: Option<&str>,
        args: &[&str],
    ) -> Result<Request, DispatchError> {
        let command = self
            .registry
            .lookup(section, verb)
            .ok_or_else(|| DispatchError::UnknownCommand {
                section: section.to_string(),
                verb: verb.to_string(),
            })?;

        let missing = || DispatchError::MissingIdentifier {
            section: command.section,
            verb: command.verb,
            what: command.identifier.describe(),
        };
        let identifier = match command.identifier {
            IdentifierMode::None => None,
            IdentifierMode::NetDevice => {
                let name = identifier.ok_or_else(missing)?;
                Some((Nl802154Attr::Ifindex, self.resolver.interface_index(name)?))
            }
            IdentifierMode::Phy => {
                let name = identifier.ok_or_else(missing)?;
                Some((Nl802154Attr::WpanPhy, self.resolver.phy_index(name)?))
            }
        };

        let sequence = self.sequence;
        self.sequence = self.sequence.wrapping_add(1);

        let mut buffer = vec![0u8; MESSAGE_BUFFER_SIZE];
        let mut w = MessageWriter::new(
            &mut buffer[..],
            self.family,
            command.flags(),
            sequence,
            command.command.into(),
            GENL_VERSION,
        )?;

        if let Some((tag, index)) = identifier {
            debug!("{command}: {tag} = {index}");
            w.attributes().put_u32(tag, index)?;
        }

        let mut state = RequestState::default();
        let mut arguments = Arguments::new(args);
        (command.encode)(&mut arguments, w.attributes(), &mut state)?;
        arguments.finish()?;

        let len = w.finish();
        buffer.truncate(len);
        debug!("{command}: encoded {len} bytes, sequence {sequence}");

        Ok(Request {
            command: command.command,
            dump: command.dump,
            sequence,
            bytes: buffer,
            state,
            decode: command.decode,
        })
    }

    /// Like [`Dispatcher::dispatch`], taking the identifier from the first
    /// token when the command needs one.
    pub fn dispatch_tokens(
        &mut self,
        section: &str,
        verb: &str,
        tokens: &[&str],
    ) -> Result<Request, DispatchError> {
        let needs_identifier = self
            .registry
            .lookup(section, verb)
            .is_some_and(|command| command.identifier != IdentifierMode::None);

        match tokens.split_first() {
            Some((identifier, args)) if needs_identifier => {
                self.dispatch(section, verb, Some(*identifier), args)
            }
            _ => self.dispatch(section, verb, None, tokens),
        }
    }
}
