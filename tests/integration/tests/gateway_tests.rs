//! Gateway session integration tests
//!
//! Drive a real `GatewayClient` against the fake gateway over WebSockets and
//! observe its webhooks and persisted state.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use integration_tests::{bot, sink_webhooks, FakeGateway, RunningRelay, WebhookSink};
use relay_store::SessionState;
use serde_json::json;
use std::time::Duration;

const HEARTBEAT_MS: u64 = 45_000;

// ============================================================================
// Handshake
// ============================================================================

#[tokio::test]
async fn test_identify_ready_persists_session() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let sink = WebhookSink::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let bot = bot(sink_webhooks(&sink));
    let relay = RunningRelay::spawn(&gateway, &bot, dir.path()).unwrap();

    let mut socket = gateway.accept().await.unwrap();
    socket.hello(HEARTBEAT_MS).unwrap();

    let identify = socket.recv_op(2).await.unwrap();
    assert_eq!(identify["d"]["token"], bot.token.as_str());
    assert_eq!(identify["d"]["large_threshold"], 250);
    assert_eq!(identify["d"]["compress"], false);
    assert!(identify["d"]["properties"]["$os"].is_string());

    socket
        .dispatch("READY", 1, json!({"v": 10, "session_id": "S1"}))
        .unwrap();

    let connected = sink.wait_for("connected", 1).await.unwrap();
    assert_eq!(connected[0], json!({}));

    relay
        .wait_persisted(|s| *s == SessionState::with_session("S1", Some(1)))
        .await
        .unwrap();

    let on_disk: serde_json::Value =
        serde_json::from_slice(&std::fs::read(relay.store.path_for(&relay.token)).unwrap()).unwrap();
    assert_eq!(on_disk, json!({"session_id": "S1", "seq": 1}));

    relay.stop().await.unwrap();
    assert_eq!(sink.bodies("connected").len(), 1);
}

#[tokio::test]
async fn test_restart_resumes_from_disk() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let sink = WebhookSink::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let bot = bot(sink_webhooks(&sink));

    // First process: establish a session
    let relay = RunningRelay::spawn(&gateway, &bot, dir.path()).unwrap();
    let mut socket = gateway.accept().await.unwrap();
    socket.hello(HEARTBEAT_MS).unwrap();
    socket.recv_op(2).await.unwrap();
    socket.dispatch("READY", 1, json!({"session_id": "S1"})).unwrap();
    socket.dispatch("MESSAGE_CREATE", 2, json!({})).unwrap();
    relay
        .wait_persisted(|s| s.seq == Some(2))
        .await
        .unwrap();
    relay.stop().await.unwrap();

    // Second process with the same state directory
    let relay = RunningRelay::spawn(&gateway, &bot, dir.path()).unwrap();
    let mut socket = gateway.accept().await.unwrap();
    socket.hello(HEARTBEAT_MS).unwrap();

    let resume = socket.recv_op(6).await.unwrap();
    assert_eq!(
        resume["d"],
        json!({"token": bot.token, "session_id": "S1", "seq": 2})
    );

    relay.stop().await.unwrap();
}

// ============================================================================
// Reconnect
// ============================================================================

#[tokio::test]
async fn test_unexpected_close_resumes() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let sink = WebhookSink::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let bot = bot(sink_webhooks(&sink));
    let relay = RunningRelay::spawn(&gateway, &bot, dir.path()).unwrap();

    let mut socket = gateway.accept().await.unwrap();
    socket.hello(HEARTBEAT_MS).unwrap();
    socket.recv_op(2).await.unwrap();
    socket.dispatch("READY", 1, json!({"session_id": "S1"})).unwrap();
    socket.dispatch("MESSAGE_CREATE", 2, json!({"content": "hi"})).unwrap();
    sink.wait_for("connected", 1).await.unwrap();
    relay
        .wait_persisted(|s| s.seq == Some(2))
        .await
        .unwrap();

    socket.close(4000).unwrap();

    let disconnected = sink.wait_for("disconnected", 1).await.unwrap();
    assert_eq!(disconnected[0], json!({}));

    let mut socket = gateway.accept().await.unwrap();
    socket.hello(HEARTBEAT_MS).unwrap();

    let resume = socket.recv_op(6).await.unwrap();
    assert_eq!(resume["d"]["session_id"], "S1");
    assert_eq!(resume["d"]["seq"], 2);

    socket.dispatch("RESUMED", 3, json!({})).unwrap();
    sink.wait_for("connected", 2).await.unwrap();

    relay.stop().await.unwrap();
    assert_eq!(sink.bodies("disconnected").len(), 1);
}

#[tokio::test]
async fn test_invalid_session_reidentifies() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let sink = WebhookSink::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let bot = bot(sink_webhooks(&sink));
    let relay = RunningRelay::spawn(&gateway, &bot, dir.path()).unwrap();

    let mut socket = gateway.accept().await.unwrap();
    socket.hello(HEARTBEAT_MS).unwrap();
    socket.recv_op(2).await.unwrap();
    socket.dispatch("READY", 1, json!({"session_id": "S1"})).unwrap();
    relay
        .wait_persisted(|s| s.is_resumable())
        .await
        .unwrap();

    socket.send(json!({"op": 9, "d": false})).unwrap();

    // Relay drops the socket itself
    socket.closed().await.unwrap();
    assert!(relay.persisted().await.is_empty());

    let mut socket = gateway.accept().await.unwrap();
    socket.hello(HEARTBEAT_MS).unwrap();
    let identify = socket.recv_op(2).await.unwrap();
    assert_eq!(identify["d"]["token"], bot.token.as_str());

    relay.stop().await.unwrap();
}

#[tokio::test]
async fn test_reconnect_request_resumes() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let sink = WebhookSink::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let bot = bot(sink_webhooks(&sink));
    let relay = RunningRelay::spawn(&gateway, &bot, dir.path()).unwrap();

    let mut socket = gateway.accept().await.unwrap();
    socket.hello(HEARTBEAT_MS).unwrap();
    socket.recv_op(2).await.unwrap();
    socket.dispatch("READY", 5, json!({"session_id": "S9"})).unwrap();
    relay
        .wait_persisted(|s| s.is_resumable())
        .await
        .unwrap();

    socket.send(json!({"op": 7, "d": null})).unwrap();
    socket.closed().await.unwrap();

    let mut socket = gateway.accept().await.unwrap();
    socket.hello(HEARTBEAT_MS).unwrap();
    let resume = socket.recv_op(6).await.unwrap();
    assert_eq!(resume["d"]["session_id"], "S9");
    assert_eq!(resume["d"]["seq"], 5);

    sink.wait_for("disconnected", 1).await.unwrap();
    relay.stop().await.unwrap();
}

#[tokio::test]
async fn test_unreachable_gateway_fires_no_webhooks() {
    let sink = WebhookSink::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let bot = bot(sink_webhooks(&sink));

    // Reserve a port, then close it so connects are refused
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let relay = RunningRelay::spawn_with_url(
        &format!("ws://{addr}/ws/?encoding=json"),
        &bot,
        dir.path(),
    )
    .unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    relay.stop().await.unwrap();

    assert!(sink.bodies("disconnected").is_empty());
    assert!(sink.bodies("connected").is_empty());
}

// ============================================================================
// Heartbeat
// ============================================================================

#[tokio::test]
async fn test_heartbeat_carries_sequence() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let sink = WebhookSink::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let bot = bot(sink_webhooks(&sink));
    let relay = RunningRelay::spawn(&gateway, &bot, dir.path()).unwrap();

    let mut socket = gateway.accept().await.unwrap();
    socket.hello(50).unwrap();
    socket.recv_op(2).await.unwrap();

    socket.dispatch("READY", 7, json!({"session_id": "S1"})).unwrap();

    // Skip any heartbeat sent before READY was processed
    let heartbeat = loop {
        let frame = socket.recv_op(1).await.unwrap();
        if frame["d"] == 7 {
            break frame;
        }
        assert!(frame["d"].is_null(), "unexpected heartbeat {frame}");
    };
    assert_eq!(heartbeat, json!({"op": 1, "d": 7}));

    socket.send(json!({"op": 11})).unwrap();
    relay.stop().await.unwrap();
}

#[tokio::test]
async fn test_server_heartbeat_request_answered() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let sink = WebhookSink::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let bot = bot(sink_webhooks(&sink));
    let relay = RunningRelay::spawn(&gateway, &bot, dir.path()).unwrap();

    let mut socket = gateway.accept().await.unwrap();
    socket.send(json!({"op": 1, "d": null})).unwrap();

    let reply = socket.recv_op(1).await.unwrap();
    assert_eq!(reply, json!({"op": 1, "d": null}));

    relay.stop().await.unwrap();
}

// ============================================================================
// Event forwarding
// ============================================================================

#[tokio::test]
async fn test_events_filtered_and_forwarded_whole() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let sink = WebhookSink::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut webhooks = sink_webhooks(&sink);
    webhooks.include = vec!["MESSAGE_CREATE".to_string(), "TYPING_START".to_string()];
    webhooks.exclude = vec!["TYPING_START".to_string()];
    let bot = bot(webhooks);
    let relay = RunningRelay::spawn(&gateway, &bot, dir.path()).unwrap();

    let mut socket = gateway.accept().await.unwrap();
    socket.hello(HEARTBEAT_MS).unwrap();
    socket.recv_op(2).await.unwrap();

    socket.dispatch("READY", 1, json!({"session_id": "S1"})).unwrap();
    socket.dispatch("TYPING_START", 2, json!({"user_id": "1"})).unwrap();
    socket.dispatch("GUILD_CREATE", 3, json!({"id": "g"})).unwrap();
    socket
        .dispatch("MESSAGE_CREATE", 4, json!({"content": "hello"}))
        .unwrap();

    let events = sink.wait_for("events", 1).await.unwrap();
    assert_eq!(
        events[0],
        json!({"op": 0, "t": "MESSAGE_CREATE", "s": 4, "d": {"content": "hello"}})
    );

    relay
        .wait_persisted(|s| s.seq == Some(4))
        .await
        .unwrap();
    relay.stop().await.unwrap();

    // READY, TYPING_START and GUILD_CREATE all fail the filter
    assert_eq!(sink.bodies("events").len(), 1);
}

#[tokio::test]
async fn test_no_events_hook_forwards_nothing() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let sink = WebhookSink::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut webhooks = sink_webhooks(&sink);
    webhooks.events = None;
    let bot = bot(webhooks);
    let relay = RunningRelay::spawn(&gateway, &bot, dir.path()).unwrap();

    let mut socket = gateway.accept().await.unwrap();
    socket.hello(HEARTBEAT_MS).unwrap();
    socket.recv_op(2).await.unwrap();
    socket.dispatch("READY", 1, json!({"session_id": "S1"})).unwrap();
    socket.dispatch("MESSAGE_CREATE", 2, json!({})).unwrap();

    sink.wait_for("connected", 1).await.unwrap();
    relay
        .wait_persisted(|s| s.seq == Some(2))
        .await
        .unwrap();
    relay.stop().await.unwrap();

    assert!(sink.bodies("events").is_empty());
}

// ============================================================================
// Shutdown
// ============================================================================

#[tokio::test]
async fn test_shutdown_keeps_session_resumable() {
    let mut gateway = FakeGateway::start().await.unwrap();
    let sink = WebhookSink::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let bot = bot(sink_webhooks(&sink));
    let relay = RunningRelay::spawn(&gateway, &bot, dir.path()).unwrap();

    let mut socket = gateway.accept().await.unwrap();
    socket.hello(HEARTBEAT_MS).unwrap();
    socket.recv_op(2).await.unwrap();
    socket.dispatch("READY", 3, json!({"session_id": "S1"})).unwrap();
    sink.wait_for("connected", 1).await.unwrap();

    let session = relay.stop().await.unwrap();
    assert_eq!(session.state(), &SessionState::with_session("S1", Some(3)));

    socket.closed().await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(sink.bodies("disconnected").is_empty());
}
