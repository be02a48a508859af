//! End-to-end tests of the WebSocket gateway

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use streamswitch::bridge::{Gateway, HubUpstream, PushFrame, SUBSCRIBE_FAILED_FRAME};
use streamswitch::client::{ClientConfig, TelemetryClient};
use streamswitch::hub::Hub;
use streamswitch::proto::Reading;
use streamswitch::server::{ServerConfig, TelemetryServer};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_server() -> (Arc<TelemetryServer>, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = Arc::new(TelemetryServer::new(ServerConfig::default()));

    let serving = Arc::clone(&server);
    tokio::spawn(async move { serving.serve(listener).await });
    (server, addr)
}

async fn start_gateway(upstream: SocketAddr) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let gateway = Gateway::new(TelemetryClient::new(ClientConfig::new(&upstream.to_string())));

    tokio::spawn(async move { gateway.serve(listener).await });
    addr
}

async fn connect(gateway: SocketAddr, query: &str) -> WsClient {
    let url = format!("ws://{}/ws/subscribe{}", gateway, query);
    let (ws, _) = connect_async(url).await.unwrap();
    ws
}

async fn wait_for_topics(hub: &Hub, expected: usize) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while hub.topic_count() != expected {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
}

async fn next_frame(ws: &mut WsClient) -> PushFrame {
    let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    serde_json::from_str(msg.to_text().unwrap()).unwrap()
}

#[tokio::test]
async fn test_bridge_pushes_readings() {
    let (server, server_addr) = start_server().await;
    let gateway = start_gateway(server_addr).await;
    let mut ws = connect(gateway, "?sensor_id=s1").await;
    wait_for_topics(server.hub(), 1).await;

    let client = TelemetryClient::new(ClientConfig::new(&server_addr.to_string()));
    let mut publisher = client.publish().await.unwrap();
    for seq in 1..=3 {
        publisher.send(Reading::new("s2", 0, 25.0, 100 + seq)).await.unwrap();
        publisher.send(Reading::new("s1", 0, 25.0, seq)).await.unwrap();
    }
    publisher.finish().await.unwrap();

    for seq in 1..=3 {
        let frame = next_frame(&mut ws).await;
        assert_eq!(frame.reading.sensor_id, "s1");
        assert_eq!(frame.reading.seq, seq);
        assert!(frame.client_recv_unix_nano >= frame.meta.sent_ts);
    }
}

#[tokio::test]
async fn test_upstream_unavailable_sends_error_frame() {
    // Reserve a port with nothing listening on it
    let unused = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = unused.local_addr().unwrap();
    drop(unused);

    let gateway = start_gateway(dead_addr).await;
    let mut ws = connect(gateway, "").await;

    let msg = ws.next().await.unwrap().unwrap();
    assert_eq!(msg.to_text().unwrap(), SUBSCRIBE_FAILED_FRAME);

    // Nothing follows except the close
    match ws.next().await {
        None | Some(Ok(Message::Close(_))) | Some(Err(_)) => {}
        Some(Ok(other)) => panic!("unexpected message {:?}", other),
    }
}

#[tokio::test]
async fn test_client_disconnect_releases_subscription() {
    let (server, server_addr) = start_server().await;
    let gateway = start_gateway(server_addr).await;

    let mut ws = connect(gateway, "?sensor_id=s1").await;
    wait_for_topics(server.hub(), 1).await;

    ws.close(None).await.unwrap();
    wait_for_topics(server.hub(), 0).await;
}

#[tokio::test]
async fn test_in_process_gateway() {
    let hub = Arc::new(Hub::new());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let gateway = Gateway::new(HubUpstream::new(Arc::clone(&hub)));
    tokio::spawn(async move { gateway.serve(listener).await });

    let mut ws = connect(addr, "?sensor_id=").await;
    wait_for_topics(&hub, 1).await;

    hub.broadcast(Reading::new("any-sensor", 0, 21.0, 9));

    let frame = next_frame(&mut ws).await;
    assert_eq!(frame.reading.sensor_id, "any-sensor");
    assert_eq!(frame.reading.seq, 9);
}

#[tokio::test]
async fn test_invalid_rate_sends_error_frame() {
    let hub = Arc::new(Hub::new());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let gateway = Gateway::new(HubUpstream::new(Arc::clone(&hub)));
    tokio::spawn(async move { gateway.serve(listener).await });

    let mut ws = connect(addr, "?sample_rate_hz=-1").await;

    let msg = ws.next().await.unwrap().unwrap();
    assert_eq!(msg.to_text().unwrap(), SUBSCRIBE_FAILED_FRAME);
    assert_eq!(hub.topic_count(), 0);
}

#[tokio::test]
async fn test_health() {
    let hub = Arc::new(Hub::new());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let gateway = Gateway::new(HubUpstream::new(hub));
    tokio::spawn(async move { gateway.serve(listener).await });

    let mut socket = TcpStream::connect(addr).await.unwrap();
    socket
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = String::new();
    socket.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.ends_with(r#"{"status":"ok"}"#));
}
