//! Websocket wire messages.

mod stream;
mod types;

pub use stream::{MessageStreamSink, MessageStreamSinkError};
pub use types::{action, Request};

use bytes::Bytes;
use enum_as_inner::EnumAsInner;
use snafu::prelude::*;

use super::event::{Event, Response};

/// Error when parse frame data as message
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(super)), module(error), context(suffix(false)))]
pub enum ParseMessageError {
    /// data is invalid json
    #[snafu(display("parse json failed: {source:?}"))]
    ParseJSONFailed {
        /// data for decode
        data: Bytes,
        /// source error
        source: serde_json::Error,
    },

    /// data json is not an object
    #[snafu(display("parsed message is not object: {json}"))]
    MessageNotObject {
        /// json string
        json: String,
    },

    /// data json is neither an event nor a response
    #[snafu(display("message has no event or seq_reply field: {json}"))]
    UnknownMessageType {
        /// json string
        json: String,
    },

    /// event has no `seq`, or it is not an unsigned integer
    #[snafu(display("event {event} has no valid seq: {json}"))]
    InvalidEventSequence {
        /// event name
        event: String,
        /// json string
        json: String,
    },

    /// data json is not valid typed message
    #[snafu(display("parse to {type_name} message failed: {source}"))]
    ParseJSONToTypedMessageFailed {
        /// type name
        type_name: String,
        /// source error
        source: serde_json::Error,
    },
}

/// Inbound message, server -> client
#[derive(Debug, Clone, PartialEq, EnumAsInner)]
pub enum Message {
    /// server pushed event
    Event(Event),
    /// reply of a client request
    Response(Response),
}

impl Message {
    /// Decode frame data to a message.
    ///
    /// A message carrying `seq_reply` is a response, otherwise it must carry an `event` name.
    pub fn decode(buff: Bytes) -> Result<Self, ParseMessageError> {
        let value: serde_json::Value =
            serde_json::from_slice(&buff).context(error::ParseJSONFailed { data: buff.clone() })?;

        let obj = value.as_object().with_context(|| error::MessageNotObject {
            json: String::from_utf8_lossy(&buff),
        })?;

        let type_name = if obj.contains_key("seq_reply") {
            "Response"
        } else if let Some(event) = obj.get("event") {
            ensure!(
                obj.get("seq").and_then(serde_json::Value::as_u64).is_some(),
                error::InvalidEventSequence {
                    event: event.as_str().unwrap_or_default(),
                    json: String::from_utf8_lossy(&buff),
                }
            );
            "Event"
        } else {
            return error::UnknownMessageType {
                json: String::from_utf8_lossy(&buff),
            }
            .fail();
        };

        let message = match type_name {
            "Response" => serde_json::from_value(value).map(Self::Response),
            _ => serde_json::from_value(value).map(Self::Event),
        };

        message.context(error::ParseJSONToTypedMessageFailed { type_name })
    }

    /// get type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Event(_) => "Event",
            Self::Response(_) => "Response",
        }
    }
}

#[cfg(test)]
mod test {
    mod decode {
        use super::super::*;
        use serde_json::json;

        fn bytes(value: serde_json::Value) -> Bytes {
            serde_json::to_vec(&value).unwrap().into()
        }

        #[test]
        fn test_message_decode_event() {
            let data = bytes(json!({
                "event": "posted",
                "seq": 4,
                "data": {"channel_id": "c1"},
            }));

            let msg = Message::decode(data).unwrap();

            if let Message::Event(event) = msg {
                assert_eq!(event.event, "posted");
                assert_eq!(event.seq, 4);
                assert_eq!(event.data["channel_id"], "c1");
            } else {
                panic!("decoded message is not event")
            }
        }

        #[test]
        fn test_message_decode_response() {
            let data = bytes(json!({
                "status": "OK",
                "seq_reply": 3,
                "data": {"u1": "online"},
            }));

            let msg = Message::decode(data).unwrap();
            assert_eq!(msg.type_name(), "Response");

            let resp = msg.into_response().unwrap();
            assert_eq!(resp.seq_reply, 3);
            assert!(resp.is_ok());
        }

        #[test]
        fn test_message_with_seq_reply_and_event_is_response() {
            let data = bytes(json!({
                "seq_reply": 1,
                "event": "posted",
            }));

            assert!(Message::decode(data).unwrap().as_response().is_some());
        }

        #[test]
        fn test_message_decode_not_object() {
            let err = Message::decode(bytes(json!([1, 2]))).unwrap_err();
            assert!(matches!(err, ParseMessageError::MessageNotObject { .. }));
        }

        #[test]
        fn test_message_decode_unknown() {
            let err = Message::decode(bytes(json!({"seq": 1}))).unwrap_err();
            assert!(matches!(err, ParseMessageError::UnknownMessageType { .. }));
        }

        #[test]
        fn test_message_decode_event_without_seq() {
            let err = Message::decode(bytes(json!({"event": "posted"}))).unwrap_err();
            assert!(matches!(
                err,
                ParseMessageError::InvalidEventSequence { ref event, .. } if event == "posted"
            ));
        }

        #[test]
        fn test_message_decode_event_with_invalid_seq() {
            for seq in [json!("3"), json!(-1), json!(1.5), json!(null)] {
                let err = Message::decode(bytes(json!({"event": "posted", "seq": seq})))
                    .unwrap_err();
                assert!(matches!(err, ParseMessageError::InvalidEventSequence { .. }));
            }
        }

        #[test]
        fn test_message_decode_event_with_bad_name() {
            let err = Message::decode(bytes(json!({"event": 5, "seq": 1}))).unwrap_err();
            assert!(matches!(
                err,
                ParseMessageError::ParseJSONToTypedMessageFailed { .. }
            ));
        }

        #[test]
        fn test_message_decode_invalid_json() {
            let err = Message::decode(Bytes::from_static(b"{not json")).unwrap_err();
            assert!(matches!(err, ParseMessageError::ParseJSONFailed { .. }));
        }
    }

    mod encode {
        use super::super::*;
        use serde_json::json;

        #[test]
        fn test_request_encode() {
            let req = Request {
                action: action::USER_TYPING.to_string(),
                seq: 5,
                data: Some(json!({"channel_id": "c1", "parent_id": ""})),
            };

            let value: serde_json::Value = serde_json::from_str(&req.encode().unwrap()).unwrap();
            assert_eq!(
                value,
                json!({
                    "action": "user_typing",
                    "seq": 5,
                    "data": {"channel_id": "c1", "parent_id": ""},
                })
            );
        }

        #[test]
        fn test_request_encode_null_data() {
            let req = Request {
                action: action::GET_STATUSES.to_string(),
                seq: 1,
                data: None,
            };

            let value: serde_json::Value = serde_json::from_str(&req.encode().unwrap()).unwrap();
            assert!(value["data"].is_null());
        }
    }
}
