//! Length-delimited JSON frame codec
//!
//! Frames are a 4-byte big-endian length followed by one JSON document. The
//! codec is typed on both ends: `D` is what this side decodes, `E` what it
//! encodes.

use std::marker::PhantomData;

use bytes::{Bytes, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::codec::{Decoder, Encoder, LengthDelimitedCodec};

use crate::error::Error;

use super::frame::{ClientFrame, ServerFrame};

/// Default maximum frame length (1 MiB)
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 1024 * 1024;

/// Codec used by the server: decodes client frames, encodes server frames
pub type ServerCodec = JsonFrameCodec<ClientFrame, ServerFrame>;

/// Codec used by clients: decodes server frames, encodes client frames
pub type ClientCodec = JsonFrameCodec<ServerFrame, ClientFrame>;

/// Typed JSON codec on top of [`LengthDelimitedCodec`]
#[derive(Debug)]
pub struct JsonFrameCodec<D, E> {
    inner: LengthDelimitedCodec,
    _marker: PhantomData<fn(E) -> D>,
}

impl<D, E> JsonFrameCodec<D, E> {
    /// Create a codec that rejects frames longer than `max_frame_length`
    pub fn new(max_frame_length: usize) -> Self {
        Self {
            inner: LengthDelimitedCodec::builder()
                .max_frame_length(max_frame_length)
                .new_codec(),
            _marker: PhantomData,
        }
    }
}

impl<D, E> Default for JsonFrameCodec<D, E> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_LENGTH)
    }
}

impl<D: DeserializeOwned, E> Decoder for JsonFrameCodec<D, E> {
    type Item = D;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<D>, Error> {
        match self.inner.decode(src)? {
            Some(buf) => Ok(Some(serde_json::from_slice(&buf)?)),
            None => Ok(None),
        }
    }
}

impl<D, E: Serialize> Encoder<E> for JsonFrameCodec<D, E> {
    type Error = Error;

    fn encode(&mut self, item: E, dst: &mut BytesMut) -> Result<(), Error> {
        let buf = serde_json::to_vec(&item)?;
        self.inner.encode(Bytes::from(buf), dst)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bytes::BufMut;

    use super::*;
    use crate::proto::message::Ack;

    #[test]
    fn test_client_frame_through_server_codec() {
        let mut client = ClientCodec::default();
        let mut server = ServerCodec::default();
        let mut buf = BytesMut::new();

        client.encode(ClientFrame::Publish, &mut buf).unwrap();
        client.encode(ClientFrame::Ping { n: 9 }, &mut buf).unwrap();

        assert_eq!(server.decode(&mut buf).unwrap(), Some(ClientFrame::Publish));
        assert_eq!(
            server.decode(&mut buf).unwrap(),
            Some(ClientFrame::Ping { n: 9 })
        );
        assert_eq!(server.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_partial_frame_waits_for_more_data() {
        let mut server = ServerCodec::default();
        let mut encoded = BytesMut::new();
        ClientCodec::default()
            .encode(ClientFrame::Publish, &mut encoded)
            .unwrap();

        let mut buf = BytesMut::new();
        buf.extend_from_slice(&encoded[..encoded.len() - 1]);
        assert_eq!(server.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(&encoded[encoded.len() - 1..]);
        assert_eq!(server.decode(&mut buf).unwrap(), Some(ClientFrame::Publish));
    }

    #[test]
    fn test_invalid_json_is_codec_error() {
        let mut client = ClientCodec::default();
        let payload = b"not json";
        let mut buf = BytesMut::new();
        buf.put_u32(payload.len() as u32);
        buf.extend_from_slice(payload);

        assert!(matches!(client.decode(&mut buf), Err(Error::Codec(_))));
    }

    #[test]
    fn test_oversized_frame_is_rejected() {
        let mut server = ServerCodec::new(16);
        let mut buf = BytesMut::new();
        buf.put_u32(1024);
        buf.extend_from_slice(&[b' '; 32]);

        assert!(matches!(server.decode(&mut buf), Err(Error::Io(_))));
    }

    #[test]
    fn test_server_frame_encoding_is_length_prefixed_json() {
        let mut server = ServerCodec::default();
        let mut buf = BytesMut::new();
        server
            .encode(ServerFrame::Ack(Ack { last_seq: 2 }), &mut buf)
            .unwrap();

        let len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
        assert_eq!(len, buf.len() - 4);
        let json: serde_json::Value = serde_json::from_slice(&buf[4..]).unwrap();
        assert_eq!(json, serde_json::json!({"type": "ack", "last_seq": 2}));
    }

    #[tokio::test]
    async fn test_framed_read_over_mock_io() {
        use futures::StreamExt;
        use tokio_util::codec::FramedRead;

        let mut wire = BytesMut::new();
        let mut client = ClientCodec::default();
        client.encode(ClientFrame::Publish, &mut wire).unwrap();
        client
            .encode(ClientFrame::Reading(crate::proto::Reading::new("s1", 5, 21.0, 1)), &mut wire)
            .unwrap();

        // Split delivery across reads to exercise reassembly
        let split = wire.len() / 2;
        let io = tokio_test::io::Builder::new()
            .read(&wire[..split])
            .read(&wire[split..])
            .build();
        let mut frames = FramedRead::new(io, ServerCodec::default());

        assert_eq!(frames.next().await.unwrap().unwrap(), ClientFrame::Publish);
        match frames.next().await.unwrap().unwrap() {
            ClientFrame::Reading(reading) => assert_eq!(reading.seq, 1),
            other => panic!("unexpected frame {:?}", other),
        }
        assert!(frames.next().await.is_none());
    }
}
