use std::collections::HashMap;

use snafu::prelude::*;
use tokio::sync::oneshot;

use crate::ws::{event::Response, message::Request, url::ResumeArguments};

/// Received event sequence number is not the expected one
#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(display("missed websocket event, expected seq {expected} but received {received}"))]
pub(crate) struct SequenceGap {
    pub expected: u64,
    pub received: u64,
}

/// Counters and identity which survive connection churn.
#[derive(Debug)]
pub(crate) struct Session {
    response_sequence: u64,
    server_sequence: u64,
    connection_id: String,
    pending: HashMap<u64, oneshot::Sender<Response>>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            response_sequence: 1,
            server_sequence: 0,
            connection_id: String::new(),
            pending: HashMap::new(),
        }
    }
}

impl Session {
    pub fn server_sequence(&self) -> u64 {
        self.server_sequence
    }

    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn resume(&self) -> ResumeArguments {
        ResumeArguments {
            connection_id: self.connection_id.clone(),
            sequence_number: self.server_sequence,
        }
    }

    pub fn reset_response_sequence(&mut self) {
        self.response_sequence = 1;
    }

    /// Tag a new request with the next outgoing sequence number, registering its reply slot.
    pub fn next_request(
        &mut self,
        action: String,
        data: Option<serde_json::Value>,
        reply: Option<oneshot::Sender<Response>>,
    ) -> Request {
        let seq = self.response_sequence;
        self.response_sequence += 1;

        if let Some(reply) = reply {
            if self.pending.insert(seq, reply).is_some() {
                log::debug!("Response slot of seq {} superseded by a new request", seq);
            }
        }

        Request { action, seq, data }
    }

    /// Deliver a response to its pending slot, returns false if no slot is waiting for it.
    pub fn resolve(&mut self, response: Response) -> bool {
        match self.pending.remove(&response.seq_reply) {
            Some(reply) => {
                let seq = response.seq_reply;
                if reply.send(response).is_err() {
                    log::trace!("Receiver of response {} dropped", seq);
                }
                true
            }
            None => false,
        }
    }

    /// Record connection id from a hello event.
    ///
    /// Returns true if a different, previously held id is replaced, which means the server
    /// can not resume our stream and events were missed. Inbound counter restarts from 0 then.
    pub fn observe_hello(&mut self, connection_id: &str) -> bool {
        let missed = !self.connection_id.is_empty() && self.connection_id != connection_id;

        if missed {
            log::debug!(
                "Connection id changed from {} to {}",
                self.connection_id,
                connection_id
            );
            self.server_sequence = 0;
        }

        self.connection_id = connection_id.to_string();

        missed
    }

    /// Check event seq against inbound counter, advance counter if in order.
    pub fn check_sequence(&mut self, seq: u64) -> Result<(), SequenceGap> {
        ensure!(
            seq == self.server_sequence,
            SequenceGapSnafu {
                expected: self.server_sequence,
                received: seq,
            }
        );

        self.server_sequence = seq + 1;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn response(seq_reply: u64) -> Response {
        serde_json::from_value(json!({"seq_reply": seq_reply, "status": "OK"})).unwrap()
    }

    #[test]
    fn test_request_sequence_starts_from_one() {
        let mut session = Session::default();

        let first = session.next_request("a".to_string(), None, None);
        let second = session.next_request("b".to_string(), None, None);

        assert_eq!(first.seq, 1);
        assert_eq!(second.seq, 2);

        session.reset_response_sequence();
        assert_eq!(session.next_request("c".to_string(), None, None).seq, 1);
    }

    #[test]
    fn test_in_order_events_advance_counter() {
        let mut session = Session::default();

        assert!(!session.observe_hello("A"));
        assert!(session.check_sequence(0).is_ok());
        assert_eq!(session.server_sequence(), 1);
        assert!(session.check_sequence(1).is_ok());
        assert_eq!(session.server_sequence(), 2);
    }

    #[test]
    fn test_gap_is_rejected_without_advance() {
        let mut session = Session::default();
        session.check_sequence(0).unwrap();
        session.check_sequence(1).unwrap();

        let gap = session.check_sequence(5).unwrap_err();
        assert_eq!(
            gap,
            SequenceGap {
                expected: 2,
                received: 5
            }
        );
        assert_eq!(session.server_sequence(), 2);
    }

    #[test]
    fn test_replayed_event_is_rejected() {
        let mut session = Session::default();
        session.check_sequence(0).unwrap();
        assert!(session.check_sequence(0).is_err());
    }

    #[test]
    fn test_hello_with_new_connection_id_means_missed_events() {
        let mut session = Session::default();
        session.observe_hello("A");
        session.check_sequence(0).unwrap();
        session.check_sequence(1).unwrap();

        assert!(session.observe_hello("B"));
        assert_eq!(session.server_sequence(), 0);
        assert_eq!(session.connection_id(), "B");
        assert!(session.check_sequence(0).is_ok());
    }

    #[test]
    fn test_hello_with_same_connection_id_keeps_counter() {
        let mut session = Session::default();
        session.observe_hello("A");
        session.check_sequence(0).unwrap();
        session.check_sequence(1).unwrap();

        assert!(!session.observe_hello("A"));
        assert_eq!(session.server_sequence(), 2);
        assert_eq!(
            session.resume(),
            ResumeArguments {
                connection_id: "A".to_string(),
                sequence_number: 2
            }
        );
    }

    #[test]
    fn test_responses_resolve_their_own_slot() {
        let mut session = Session::default();
        let (tx1, mut rx1) = oneshot::channel();
        let (tx2, mut rx2) = oneshot::channel();

        let n = session.next_request("get_statuses".to_string(), None, Some(tx1)).seq;
        let m = session.next_request("get_statuses".to_string(), None, Some(tx2)).seq;
        assert_eq!(m, n + 1);
        assert_eq!(session.pending_count(), 2);

        assert!(session.resolve(response(n)));
        assert_eq!(rx1.try_recv().unwrap().seq_reply, n);
        assert!(rx2.try_recv().is_err());
        assert_eq!(session.pending_count(), 1);

        assert!(session.resolve(response(m)));
        assert_eq!(rx2.try_recv().unwrap().seq_reply, m);
        assert_eq!(session.pending_count(), 0);
    }

    #[test]
    fn test_response_without_slot() {
        let mut session = Session::default();
        session.next_request("user_typing".to_string(), None, None);
        assert!(!session.resolve(response(1)));
    }

    #[test]
    fn test_reused_sequence_supersedes_old_slot() {
        let mut session = Session::default();
        let (tx1, mut rx1) = oneshot::channel();
        let (tx2, mut rx2) = oneshot::channel();

        session.next_request("a".to_string(), None, Some(tx1));
        session.reset_response_sequence();
        session.next_request("b".to_string(), None, Some(tx2));

        assert_eq!(session.pending_count(), 1);
        assert!(matches!(
            rx1.try_recv(),
            Err(oneshot::error::TryRecvError::Closed)
        ));

        assert!(session.resolve(response(1)));
        assert!(rx2.try_recv().is_ok());
    }
}
