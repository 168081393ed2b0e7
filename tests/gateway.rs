//! End-to-end tests: serve the full router on an ephemeral port and drive
//! it over real WebSocket and HTTP connections.

#![allow(clippy::panic, clippy::indexing_slicing)]

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use gavel_gateway::app_state::AppState;
use gavel_gateway::build_app;
use gavel_gateway::config::GatewayConfig;
use gavel_gateway::domain::Catalog;

async fn spawn_app() -> (SocketAddr, AppState) {
    let config = GatewayConfig {
        auction_autostart: false,
        ..GatewayConfig::default()
    };
    let state = AppState::new(&config, Catalog::default());
    state.auction.start_next_round().await;
    let app = build_app(state.clone(), Duration::from_secs(5));

    let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind ephemeral port");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, state)
}

struct Client {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    next_id: u64,
}

impl Client {
    async fn connect(addr: SocketAddr, path: &str) -> Self {
        let Ok((stream, _)) = connect_async(format!("ws://{addr}{path}")).await else {
            panic!("ws connect {path}");
        };
        let mut client = Self { stream, next_id: 0 };
        let greeting = client.recv().await;
        assert_eq!(greeting["type"], "event");
        assert_eq!(greeting["payload"]["event"], "connected");
        client
    }

    async fn recv(&mut self) -> Value {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    let Ok(value) = serde_json::from_str(text.as_str()) else {
                        panic!("server sent invalid JSON: {text}");
                    };
                    return value;
                }
                Some(Ok(_)) => {}
                other => panic!("socket ended: {other:?}"),
            }
        }
    }

    async fn send_raw(&mut self, text: String) -> Value {
        if self.stream.send(Message::text(text)).await.is_err() {
            panic!("ws send");
        }
        self.recv().await
    }

    /// Sends a command and returns the whole reply envelope.
    async fn call(&mut self, payload: Value) -> Value {
        self.next_id += 1;
        let id = self.next_id.to_string();
        let reply = self
            .send_raw(json!({ "id": id, "type": "command", "payload": payload }).to_string())
            .await;
        assert_eq!(reply["id"], id.as_str());
        reply
    }

    /// Sends a command that must succeed and returns its payload.
    async fn ok(&mut self, payload: Value) -> Value {
        let reply = self.call(payload).await;
        assert_eq!(reply["type"], "response", "unexpected reply: {reply}");
        reply["payload"].clone()
    }

    async fn poll_types(&mut self, method: &str) -> Vec<String> {
        let batch = self.ok(json!({ "method": method })).await;
        batch
            .as_array()
            .map(|a| {
                a.iter()
                    .filter_map(|n| n["type"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}

#[tokio::test]
async fn health_and_catalog_are_served() {
    let (addr, _) = spawn_app().await;
    let http = reqwest::Client::new();

    let Ok(resp) = http.get(format!("http://{addr}/health")).send().await else {
        panic!("health request");
    };
    assert_eq!(resp.status(), 200);
    let Ok(body) = resp.json::<Value>().await else {
        panic!("health body");
    };
    assert_eq!(body["status"], "healthy");

    let Ok(resp) = http.get(format!("http://{addr}/config/lots")).send().await else {
        panic!("lots request");
    };
    let Ok(lots) = resp.json::<Value>().await else {
        panic!("lots body");
    };
    assert_eq!(lots.as_array().map(Vec::len), Some(6));
    assert_eq!(lots[0]["starting_price"], 50_000);
}

#[tokio::test]
async fn auction_bids_flow_into_history() {
    let (addr, _) = spawn_app().await;
    let http = reqwest::Client::new();
    let mut a = Client::connect(addr, "/ws/auction").await;
    let mut b = Client::connect(addr, "/ws/auction").await;

    let ack = a.ok(json!({ "method": "join", "username": "A" })).await;
    assert_eq!(ack["state"]["status"], "active");
    b.ok(json!({ "method": "join", "username": "B" })).await;

    a.ok(json!({ "method": "placeBid", "amount": 50_000 })).await;
    let rejected = b.call(json!({ "method": "placeBid", "amount": 50_999 })).await;
    assert_eq!(rejected["type"], "error");
    assert_eq!(rejected["payload"]["code"], 1002);
    assert_eq!(rejected["payload"]["message"], "bid must be at least $51,000");
    let accepted = b.ok(json!({ "method": "placeBid", "amount": 51_000 })).await;
    assert_eq!(accepted["bid_count"], 2);

    assert_eq!(
        a.poll_types("pollMessages").await,
        ["welcome", "user_joined", "bid_update", "bid_update"]
    );
    assert!(a.poll_types("pollMessages").await.is_empty());

    let Ok(resp) = http
        .post(format!("http://{addr}/api/v1/auction/end"))
        .send()
        .await
    else {
        panic!("end request");
    };
    assert_eq!(resp.status(), 200);

    let history = b.ok(json!({ "method": "getHistory" })).await;
    assert_eq!(history[0]["winner"], "B");
    assert_eq!(history[0]["final_price"], 51_000);
    assert_eq!(b.poll_types("pollMessages").await.last().map(String::as_str), Some("auction_end"));

    let Ok(resp) = http
        .post(format!("http://{addr}/api/v1/auction/end"))
        .send()
        .await
    else {
        panic!("end request");
    };
    assert_eq!(resp.status(), 409);

    let Ok(resp) = http
        .get(format!("http://{addr}/api/v1/auction/stats"))
        .send()
        .await
    else {
        panic!("stats request");
    };
    let Ok(stats) = resp.json::<Value>().await else {
        panic!("stats body");
    };
    assert_eq!(stats["lots_sold"], 1);
    assert_eq!(stats["total_sales"], 51_000);
    assert_eq!(stats["active_users"], 2);
}

#[tokio::test]
async fn chat_disconnect_broadcasts_user_left() {
    let (addr, state) = spawn_app().await;
    let mut ana = Client::connect(addr, "/ws/chat").await;
    let mut bo = Client::connect(addr, "/ws/chat").await;

    ana.ok(json!({ "method": "joinChat", "username": "ana" })).await;
    bo.ok(json!({ "method": "joinChat", "username": "bo" })).await;
    let empty = bo.call(json!({ "method": "sendMessage", "message": "   " })).await;
    assert_eq!(empty["payload"]["code"], 1004);
    bo.ok(json!({ "method": "sendMessage", "message": "hi ana" })).await;

    assert_eq!(
        ana.poll_types("pollMessages").await,
        ["welcome", "user_joined", "message"]
    );

    bo.close().await;
    let mut seen = Vec::new();
    for _ in 0..50 {
        seen.extend(ana.poll_types("pollMessages").await);
        if !seen.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(seen, ["user_left"]);
    assert_eq!(state.chat.state().await.online_users.len(), 1);
}

#[tokio::test]
async fn notes_writes_reach_other_clients() {
    let (addr, _) = spawn_app().await;
    let mut one = Client::connect(addr, "/ws/notes").await;
    let mut two = Client::connect(addr, "/ws/notes").await;

    let denied = one
        .call(json!({ "method": "createNote", "note": { "id": "n1", "title": "x" } }))
        .await;
    assert_eq!(denied["payload"]["code"], 1005);

    one.ok(json!({ "method": "connect", "clientId": "c1" })).await;
    two.ok(json!({ "method": "connect", "clientId": "c2" })).await;
    let stored = one
        .ok(json!({ "method": "createNote", "note": { "id": "n1", "title": "groceries" } }))
        .await;
    assert!(stored["updated_at"].as_i64().is_some_and(|t| t > 0));

    let updates = two.ok(json!({ "method": "pollUpdates" })).await;
    assert_eq!(updates[0]["type"], "note_created");
    assert_eq!(updates[0]["note"]["title"], "groceries");

    let missing = two
        .call(json!({ "method": "deleteNote", "noteId": "nope" }))
        .await;
    assert_eq!(missing["payload"]["code"], 2002);

    let Ok(resp) = reqwest::get(format!("http://{addr}/api/v1/notes")).await else {
        panic!("notes request");
    };
    let Ok(list) = resp.json::<Value>().await else {
        panic!("notes body");
    };
    assert_eq!(list["count"], 1);
}

#[tokio::test]
async fn malformed_frames_get_error_envelopes() {
    let (addr, _) = spawn_app().await;
    let mut client = Client::connect(addr, "/ws/auction").await;

    let reply = client.send_raw("not json".to_string()).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["payload"]["code"], 1001);

    let reply = client.call(json!({ "method": "fly" })).await;
    assert_eq!(reply["type"], "error");

    let state = client.ok(json!({ "method": "getCurrentState" })).await;
    assert_eq!(state["round"], 1);
}
