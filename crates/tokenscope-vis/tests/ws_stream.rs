//! WebSocket stream against a live server on an ephemeral port.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokenscope_vis::{VisConfig, VisServer};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = VisServer::new(VisConfig::default()).router();
    tokio::spawn(async move { axum::serve(listener, router).await });
    addr
}

async fn connect(addr: SocketAddr) -> Client {
    let url = format!("ws://{addr}/ws");
    let (ws, _) = connect_async(url.as_str()).await.unwrap();
    ws
}

async fn send(ws: &mut Client, cmd: Value) {
    ws.send(Message::Text(cmd.to_string().into())).await.unwrap();
}

async fn next_json(ws: &mut Client) -> Value {
    loop {
        let frame = timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("no message within 5s")
            .expect("stream closed")
            .unwrap();
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

#[tokio::test]
async fn activate_streams_cascade_until_counter_settles() {
    let addr = start_server().await;
    let mut ws = connect(addr).await;

    let initial = next_json(&mut ws).await;
    assert_eq!(initial["type"], "snapshot");
    assert_eq!(initial["phase"], "idle");

    send(&mut ws, json!({"type": "activate", "core": "brand-300"})).await;

    let mut leverage = vec![0.0];
    let last = loop {
        let msg = next_json(&mut ws).await;
        assert_eq!(msg["type"], "snapshot", "unexpected reply {msg}");
        leverage.push(msg["leverage"].as_f64().unwrap());
        if msg["counter_done"] == true {
            break msg;
        }
    };

    assert!(leverage.windows(2).all(|w| w[0] <= w[1]), "counter went backwards: {leverage:?}");
    assert_eq!(last["phase"], "settling");
    assert_eq!(last["selected_core"], "brand-300");
    assert_eq!(last["leverage_display"], 240);
    assert_eq!(last["activated_nodes"].as_array().unwrap().len(), 6);
    assert_eq!(last["activated_edges"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn bad_commands_get_error_replies() {
    let addr = start_server().await;
    let mut ws = connect(addr).await;
    next_json(&mut ws).await;

    send(&mut ws, json!({"type": "activate", "core": "nope"})).await;
    let reply = next_json(&mut ws).await;
    assert_eq!(reply["type"], "error");
    assert!(reply["message"].as_str().unwrap().contains("nope"));

    ws.send(Message::Text("not json".into())).await.unwrap();
    assert_eq!(next_json(&mut ws).await["type"], "error");

    send(&mut ws, json!({"type": "get_snapshot"})).await;
    let snapshot = next_json(&mut ws).await;
    assert_eq!(snapshot["type"], "snapshot");
    assert_eq!(snapshot["phase"], "idle");
}

#[tokio::test]
async fn reset_is_streamed_to_every_client() {
    let addr = start_server().await;
    let mut controller = connect(addr).await;
    let mut viewer = connect(addr).await;
    next_json(&mut controller).await;
    next_json(&mut viewer).await;

    send(&mut controller, json!({"type": "activate", "core": "neutral-900"})).await;
    send(&mut controller, json!({"type": "reset"})).await;

    loop {
        let msg = next_json(&mut viewer).await;
        if msg["phase"] == "idle" {
            assert_eq!(msg["selected_core"], Value::Null);
            assert_eq!(msg["activated_nodes"].as_array().unwrap().len(), 0);
            break;
        }
    }
}
