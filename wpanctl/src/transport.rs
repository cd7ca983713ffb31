//! The link carrying requests to the kernel and responses back.

use std::collections::VecDeque;

use log::debug;

use crate::error::TransportError;

/// Sends one request and collects the messages answering it.
pub trait Transport {
    /// Send `request` and return the response messages, in order.
    ///
    /// For a dump the stream is returned up to and including the message
    /// terminating it.
    fn send_and_await(&mut self, request: &[u8], dump: bool)
        -> Result<Vec<Vec<u8>>, TransportError>;
}

/// Answers every request with the next batch of canned responses.
#[derive(Debug, Clone, Default)]
pub struct ReplayTransport {
    batches: VecDeque<Vec<Vec<u8>>>,
    sent: Vec<Vec<u8>>,
}

impl ReplayTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer to one request.
    pub fn push(&mut self, messages: Vec<Vec<u8>>) -> &mut Self {
        self.batches.push_back(messages);
        self
    }

    /// Queue one request's answer given as hex strings, one per message.
    pub fn push_hex<S: AsRef<str>>(
        &mut self,
        messages: impl IntoIterator<Item = S>,
    ) -> Result<&mut Self, TransportError> {
        let messages = messages
            .into_iter()
            .map(|m| hex::decode(m.as_ref().trim()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.push(messages))
    }

    /// Return the requests sent so far.
    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }
}

impl Transport for ReplayTransport {
    fn send_and_await(
        &mut self,
        request: &[u8],
        dump: bool,
    ) -> Result<Vec<Vec<u8>>, TransportError> {
        self.sent.push(request.to_vec());
        let batch = self.batches.pop_front().ok_or(TransportError::Exhausted)?;
        debug!(
            "replaying {} message(s) for a {} request",
            batch.len(),
            if dump { "dump" } else { "plain" }
        );
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay() {
        let mut transport = ReplayTransport::new();
        transport.push_hex(["1400 0000", "abcd"]).unwrap_err();
        transport.push_hex(["14000000", "abcd"]).unwrap();

        let responses = transport.send_and_await(&[1, 2], false).unwrap();
        assert_eq!(responses, vec![vec![0x14, 0, 0, 0], vec![0xab, 0xcd]]);
        assert_eq!(transport.sent(), &[vec![1, 2]]);
        assert!(matches!(
            transport.send_and_await(&[3], true),
            Err(TransportError::Exhausted)
        ));
    }
}
