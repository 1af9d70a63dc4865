//! Integration tests for the relay running in-process on an ephemeral port.
//!
//! Each client is a real WebSocket connection (tokio-tungstenite) and the
//! publish interface is called over HTTP (reqwest).

use std::{sync::Arc, time::Duration};

use dengon_server::{
    app::build_server,
    config::RelayConfig,
    domain::{ConversationId, ConversationRecord, ConversationStore, Identity},
    infrastructure::repository::InMemoryConversationStore,
};
use dengon_shared::time::SystemClock;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::{net::TcpListener, task::JoinHandle};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type Socket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

const FRAME_TIMEOUT: Duration = Duration::from_secs(2);

/// Helper struct to manage the in-process server lifecycle
struct TestServer {
    handle: JoinHandle<()>,
    addr: std::net::SocketAddr,
    store: Arc<InMemoryConversationStore>,
}

impl TestServer {
    async fn start(records: Vec<ConversationRecord>) -> Self {
        let store = Arc::new(InMemoryConversationStore::with_records(records));
        let config = RelayConfig {
            store_timeout: Duration::from_secs(1),
            ..RelayConfig::default()
        };
        let server = build_server(&config, store.clone(), Arc::new(SystemClock));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let _ = server.serve(listener).await;
        });

        TestServer {
            handle,
            addr,
            store,
        }
    }

    fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Connect a client and consume its `connected` frame
    async fn connect(&self) -> (Socket, Value) {
        let (mut socket, _) = connect_async(self.ws_url()).await.unwrap();
        let connected = next_event(&mut socket).await;
        assert_eq!(connected["event"], "connected");
        (socket, connected)
    }

    async fn publish(&self, body: Value) -> (reqwest::StatusCode, Value) {
        let response = reqwest::Client::new()
            .post(self.http_url("/api/publish"))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    async fn get(&self, path: &str) -> Value {
        reqwest::get(self.http_url(path))
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    async fn unread_count(&self, conversation_id: &str, identity: &str) -> u32 {
        self.store
            .find_conversation(&conversation_id_of(conversation_id))
            .await
            .unwrap()
            .unwrap()
            .unread_count_for(&identity_of(identity))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn identity_of(value: &str) -> Identity {
    Identity::new(value.to_string()).unwrap()
}

fn conversation_id_of(value: &str) -> ConversationId {
    ConversationId::new(value.to_string()).unwrap()
}

fn conv1(bob_unread: u32) -> ConversationRecord {
    let mut record = ConversationRecord::new(
        conversation_id_of("conv1"),
        vec![identity_of("alice@example.com"), identity_of("bob@example.com")],
    );
    record.participants[1].unread_count = bob_unread;
    record
}

async fn send(socket: &mut Socket, frame: Value) {
    socket
        .send(Message::Text(frame.to_string().into()))
        .await
        .unwrap();
}

/// Next text frame as JSON
async fn next_event(socket: &mut Socket) -> Value {
    loop {
        let frame = tokio::time::timeout(FRAME_TIMEOUT, socket.next())
            .await
            .expect("timed out waiting for frame")
            .expect("socket closed")
            .unwrap();
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Skip frames until a presenceChanged with exactly `online` arrives
async fn expect_presence(socket: &mut Socket, online: &[&str]) {
    loop {
        let event = next_event(socket).await;
        if event["event"] == "presenceChanged" && event["data"]["online"] == json!(online) {
            return;
        }
    }
}

async fn assert_silent(socket: &mut Socket) {
    let result = tokio::time::timeout(Duration::from_millis(200), socket.next()).await;
    assert!(result.is_err(), "unexpected frame: {:?}", result);
}

/// Wait until the background reconciliation has updated the store
async fn wait_for_unread(server: &TestServer, identity: &str, expected: u32) {
    for _ in 0..40 {
        if server.unread_count("conv1", identity).await == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("unread count of {identity} never became {expected}");
}

#[tokio::test]
async fn test_health_and_connected_frame() {
    // テスト項目: ヘルスチェックに応答し、接続直後に connected が届く
    // given (前提条件):
    let server = TestServer::start(vec![]).await;

    // when (操作):
    let health = server.get("/api/health").await;
    let (_socket, connected) = server.connect().await;

    // then (期待する結果):
    assert_eq!(health, json!({"status": "ok"}));
    assert!(connected["data"]["connectionId"].is_string());
    assert_eq!(connected["data"]["online"], json!([]));
    assert!(connected["data"]["connectedAt"].is_string());
}

#[tokio::test]
async fn test_new_message_reaches_room_and_online_receiver() {
    // テスト項目: A だけが conv1 に参加し、B は identify のみの状態で newMessage を publish すると、
    //            A にはルーム配信が、B には conversationUpdate が届き、B の未読数が増える
    // given (前提条件):
    let server = TestServer::start(vec![conv1(0)]).await;
    let (mut alice, _) = server.connect().await;
    let (mut bob, _) = server.connect().await;
    send(&mut alice, json!({"event": "joinRoom", "roomId": "conv1"})).await;
    send(&mut alice, json!({"event": "identify", "identity": "alice@example.com"})).await;
    expect_presence(&mut alice, &["alice@example.com"]).await;
    send(&mut bob, json!({"event": "identify", "identity": "bob@example.com"})).await;
    expect_presence(&mut alice, &["alice@example.com", "bob@example.com"]).await;
    expect_presence(&mut bob, &["alice@example.com", "bob@example.com"]).await;

    // when (操作):
    let (status, body) = server
        .publish(json!({
            "conversationId": "conv1",
            "action": "newMessage",
            "data": {
                "sender": "alice@example.com",
                "receiver": "bob@example.com",
                "text": "hi bob"
            }
        }))
        .await;

    // then (期待する結果):
    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let relayed = next_event(&mut alice).await;
    assert_eq!(relayed["event"], "newMessage");
    assert_eq!(relayed["data"]["conversationId"], "conv1");
    assert_eq!(relayed["data"]["payload"]["text"], "hi bob");

    let update = next_event(&mut bob).await;
    assert_eq!(update["event"], "conversationUpdate");
    assert_eq!(update["data"]["conversationId"], "conv1");
    assert_eq!(update["data"]["unreadCount"], 1);
    assert_eq!(server.unread_count("conv1", "bob@example.com").await, 1);
    assert_silent(&mut alice).await;
}

#[tokio::test]
async fn test_unknown_action_is_rejected() {
    // テスト項目: 未知のアクション "foo" は 400 UNKNOWN_ACTION で拒否され、何も配信されない
    // given (前提条件):
    let server = TestServer::start(vec![conv1(0)]).await;
    let (mut alice, _) = server.connect().await;
    send(&mut alice, json!({"event": "joinRoom", "roomId": "conv1"})).await;
    send(&mut alice, json!({"event": "identify", "identity": "alice@example.com"})).await;
    expect_presence(&mut alice, &["alice@example.com"]).await;

    // when (操作):
    let (status, body) = server
        .publish(json!({
            "conversationId": "conv1",
            "action": "foo",
            "data": {"receiver": "bob@example.com"}
        }))
        .await;

    // then (期待する結果):
    assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNKNOWN_ACTION");
    assert!(body["error"].as_str().unwrap().contains("foo"));
    assert_silent(&mut alice).await;
    assert_eq!(server.unread_count("conv1", "bob@example.com").await, 0);
}

#[tokio::test]
async fn test_publish_mistyped_fields_keep_error_shape() {
    // テスト項目: 数値の action や JSON でないボディも 400 と code つきの JSON で拒否される
    // given (前提条件):
    let server = TestServer::start(vec![conv1(0)]).await;
    let (mut alice, _) = server.connect().await;
    send(&mut alice, json!({"event": "joinRoom", "roomId": "conv1"})).await;
    send(&mut alice, json!({"event": "identify", "identity": "alice@example.com"})).await;
    expect_presence(&mut alice, &["alice@example.com"]).await;

    // when (操作):
    let (action_status, action_body) = server
        .publish(json!({"conversationId": "conv1", "action": 42, "data": {}}))
        .await;
    let (conversation_status, conversation_body) = server
        .publish(json!({"conversationId": 7, "action": "newMessage", "data": {}}))
        .await;
    let raw = reqwest::Client::new()
        .post(server.http_url("/api/publish"))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    let raw_status = raw.status();
    let raw_body: Value = raw.json().await.unwrap();

    // then (期待する結果):
    assert_eq!(action_status, reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(action_body["success"], false);
    assert_eq!(action_body["code"], "UNKNOWN_ACTION");
    assert_eq!(conversation_status, reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(conversation_body["code"], "INVALID_FIELD");
    assert_eq!(raw_status, reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(raw_body["code"], "INVALID_FIELD");
    assert!(raw_body["error"].is_string());
    assert_silent(&mut alice).await;
}

#[tokio::test]
async fn test_publish_missing_field_and_partial_success() {
    // テスト項目: トップレベルのフィールド欠落は MISSING_FIELD、receiver のない newMessage は警告つきで成功する
    // given (前提条件):
    let server = TestServer::start(vec![conv1(0)]).await;

    // when (操作):
    let (missing_status, missing_body) = server
        .publish(json!({"conversationId": "conv1", "action": "newMessage"}))
        .await;
    let (partial_status, partial_body) = server
        .publish(json!({
            "conversationId": "conv1",
            "action": "newMessage",
            "data": {"text": "hello"}
        }))
        .await;

    // then (期待する結果):
    assert_eq!(missing_status, reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(missing_body["code"], "MISSING_FIELD");
    assert_eq!(partial_status, reqwest::StatusCode::OK);
    assert_eq!(partial_body["success"], true);
    assert!(partial_body["warning"].is_string());
}

#[tokio::test]
async fn test_conversation_seen_by_sole_member_resets_unread() {
    // テスト項目: 閲覧者しかいないルームでの conversationSeen は誰にも届かないが、未読数は 0 になる
    // given (前提条件):
    let server = TestServer::start(vec![conv1(3)]).await;
    let (mut bob, _) = server.connect().await;
    send(&mut bob, json!({"event": "joinRoom", "roomId": "conv1"})).await;

    // when (操作):
    send(
        &mut bob,
        json!({"event": "conversationSeen", "roomId": "conv1", "viewer": "bob@example.com"}),
    )
    .await;

    // then (期待する結果):
    wait_for_unread(&server, "bob@example.com", 0).await;
    assert_silent(&mut bob).await;
}

#[tokio::test]
async fn test_message_seen_broadcasts_to_whole_room() {
    // テスト項目: messageSeen は送信者を含むルーム全員に messageSeenUpdate が届き、未読数がリセットされる
    // given (前提条件):
    let server = TestServer::start(vec![conv1(2)]).await;
    let (mut alice, _) = server.connect().await;
    let (mut bob, _) = server.connect().await;
    send(&mut alice, json!({"event": "joinRoom", "roomId": "conv1"})).await;
    send(&mut alice, json!({"event": "identify", "identity": "alice@example.com"})).await;
    expect_presence(&mut alice, &["alice@example.com"]).await;
    send(&mut bob, json!({"event": "joinRoom", "roomId": "conv1"})).await;

    // when (操作):
    send(
        &mut bob,
        json!({
            "event": "messageSeen",
            "roomId": "conv1",
            "messageId": "m1",
            "viewer": "bob@example.com"
        }),
    )
    .await;

    // then (期待する結果):
    let seen_by_alice = next_event(&mut alice).await;
    assert_eq!(seen_by_alice["event"], "messageSeenUpdate");
    assert_eq!(seen_by_alice["data"]["messageId"], "m1");

    // bob は alice の presenceChanged を先に受け取っている場合がある
    loop {
        let event = next_event(&mut bob).await;
        if event["event"] == "messageSeenUpdate" {
            assert_eq!(event["data"]["viewer"], "bob@example.com");
            break;
        }
    }
    wait_for_unread(&server, "bob@example.com", 0).await;
}

#[tokio::test]
async fn test_typing_is_not_echoed_to_sender() {
    // テスト項目: typing は同じルームの他のメンバーにだけ届き、送信者には戻らない
    // given (前提条件):
    let server = TestServer::start(vec![]).await;
    let (mut alice, _) = server.connect().await;
    let (mut bob, _) = server.connect().await;
    send(&mut bob, json!({"event": "joinRoom", "roomId": "conv1"})).await;
    send(&mut bob, json!({"event": "identify", "identity": "bob@example.com"})).await;
    expect_presence(&mut bob, &["bob@example.com"]).await;
    send(&mut alice, json!({"event": "joinRoom", "roomId": "conv1"})).await;
    send(&mut alice, json!({"event": "identify", "identity": "alice@example.com"})).await;
    expect_presence(&mut alice, &["alice@example.com", "bob@example.com"]).await;
    expect_presence(&mut bob, &["alice@example.com", "bob@example.com"]).await;

    // when (操作):
    send(
        &mut alice,
        json!({"event": "typing", "roomId": "conv1", "senderIdentity": "alice@example.com"}),
    )
    .await;

    // then (期待する結果):
    let typing = next_event(&mut bob).await;
    assert_eq!(typing["event"], "typing");
    assert_eq!(typing["data"]["sender"], "alice@example.com");
    assert_silent(&mut alice).await;
}

#[tokio::test]
async fn test_malformed_frames_are_dropped() {
    // テスト項目: パースできないフレームや必須フィールドのないフレームは捨てられ、接続は使い続けられる
    // given (前提条件):
    let server = TestServer::start(vec![]).await;
    let (mut alice, _) = server.connect().await;

    // when (操作):
    send(&mut alice, json!({"event": "selfDestruct"})).await;
    send(&mut alice, json!({"event": "identify"})).await;
    alice
        .send(Message::Text("not json".into()))
        .await
        .unwrap();
    send(&mut alice, json!({"event": "identify", "identity": "alice@example.com"})).await;

    // then (期待する結果):
    let event = next_event(&mut alice).await;
    assert_eq!(event["event"], "presenceChanged");
    assert_eq!(event["data"]["online"], json!(["alice@example.com"]));
}

#[tokio::test]
async fn test_disconnect_clears_presence_and_rooms() {
    // テスト項目: 切断するとオンライン一覧とルームから消え、残りの接続に presenceChanged が届く
    // given (前提条件):
    let server = TestServer::start(vec![]).await;
    let (mut alice, _) = server.connect().await;
    let (mut bob, _) = server.connect().await;
    send(&mut alice, json!({"event": "joinRoom", "roomId": "conv1"})).await;
    send(&mut alice, json!({"event": "identify", "identity": "alice@example.com"})).await;
    expect_presence(&mut bob, &["alice@example.com"]).await;
    assert_eq!(server.get("/api/rooms/conv1").await["memberCount"], 1);

    // when (操作):
    alice.close(None).await.unwrap();
    drop(alice);

    // then (期待する結果):
    expect_presence(&mut bob, &[]).await;
    assert_eq!(server.get("/api/presence").await, json!({"online": []}));
    assert_eq!(
        server.get("/api/rooms/conv1").await,
        json!({"id": "conv1", "memberCount": 0})
    );
}

#[tokio::test]
async fn test_displaced_connection_disconnect_keeps_newer_mapping() {
    // テスト項目: 同じ Identity の古い接続が切断しても、新しい接続はオンラインのまま
    // given (前提条件):
    let server = TestServer::start(vec![]).await;
    let (mut old, _) = server.connect().await;
    let (mut new, _) = server.connect().await;
    send(&mut old, json!({"event": "identify", "identity": "bob@example.com"})).await;
    expect_presence(&mut new, &["bob@example.com"]).await;
    send(&mut new, json!({"event": "identify", "identity": "bob@example.com"})).await;
    expect_presence(&mut new, &["bob@example.com"]).await;

    // when (操作):
    old.close(None).await.unwrap();
    drop(old);

    // then (期待する結果):
    assert_silent(&mut new).await;
    assert_eq!(
        server.get("/api/presence").await,
        json!({"online": ["bob@example.com"]})
    );
}
