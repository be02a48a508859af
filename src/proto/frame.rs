//! Transport frames
//!
//! Every frame on the streaming transport is one JSON object tagged by
//! `"type"`. The first client frame selects the call.

use serde::{Deserialize, Serialize};

use super::message::{Ack, Pong, Reading, ReadingWithMeta, Subscription};

/// Frames sent from a client to the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Open a publish call
    Publish,
    /// One reading on an open publish call
    Reading(Reading),
    /// Open a subscribe call
    Subscribe(Subscription),
    /// Bench round trip
    Ping { n: u64 },
}

impl ClientFrame {
    /// Short name used in logs and protocol errors
    pub fn kind(&self) -> &'static str {
        match self {
            ClientFrame::Publish => "publish",
            ClientFrame::Reading(_) => "reading",
            ClientFrame::Subscribe(_) => "subscribe",
            ClientFrame::Ping { .. } => "ping",
        }
    }
}

/// Frames sent from the server to a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Terminal reply to a publish call
    Ack(Ack),
    /// Subscribe call accepted, readings follow
    Subscribed,
    /// One delivered reading
    Reading(ReadingWithMeta),
    /// Call rejected; the server closes the connection after this frame
    Error { message: String },
    /// Bench reply
    Pong(Pong),
}

impl ServerFrame {
    /// Short name used in logs and protocol errors
    pub fn kind(&self) -> &'static str {
        match self {
            ServerFrame::Ack(_) => "ack",
            ServerFrame::Subscribed => "subscribed",
            ServerFrame::Reading(_) => "reading",
            ServerFrame::Error { .. } => "error",
            ServerFrame::Pong(_) => "pong",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_client_frame_tags() {
        let json = serde_json::to_value(ClientFrame::Publish).unwrap();
        assert_eq!(json, serde_json::json!({"type": "publish"}));

        let json =
            serde_json::to_value(ClientFrame::Reading(Reading::new("s1", 5, 1.5, 3))).unwrap();
        assert_eq!(json["type"], "reading");
        assert_eq!(json["sensor_id"], "s1");
        assert_eq!(json["seq"], 3);
    }

    #[test]
    fn test_subscribe_frame_from_minimal_json() {
        let frame: ClientFrame = serde_json::from_str(r#"{"type":"subscribe"}"#).unwrap();
        assert_eq!(frame, ClientFrame::Subscribe(Subscription::all()));

        let frame: ClientFrame = serde_json::from_str(
            r#"{"type":"subscribe","sensor_ids":["a","b"],"sample_rate_hz":5.0}"#,
        )
        .unwrap();
        assert_eq!(
            frame,
            ClientFrame::Subscribe(Subscription::sensors(["a", "b"]).sample_rate(5.0))
        );
    }

    #[test]
    fn test_server_reading_frame_shape() {
        let msg = ReadingWithMeta::stamped(Arc::new(Reading::new("s1", 1, 2.0, 3)), 4);
        let json = serde_json::to_value(ServerFrame::Reading(msg)).unwrap();

        assert_eq!(json["type"], "reading");
        assert_eq!(json["reading"]["sensor_id"], "s1");
        assert_eq!(json["meta"]["received_unix_nano"], 4);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let result: Result<ClientFrame, _> = serde_json::from_str(r#"{"type":"replay"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_kind() {
        assert_eq!(ClientFrame::Ping { n: 1 }.kind(), "ping");
        assert_eq!(ServerFrame::Subscribed.kind(), "subscribed");
        assert_eq!(ServerFrame::Ack(Ack { last_seq: 1 }).kind(), "ack");
    }
}
