//! Gateway Session Integration Tests
//!
//! Each test runs a real session against a fake gateway on a loopback port
//! and a recording OpenApi; nothing leaves the machine.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use std::sync::Arc;
use std::time::Duration;

use integration_tests::*;
use nano_gateway::api::ReplyTarget;
use nano_gateway::connection::ConnectionState;
use nano_gateway::protocol::{Envelope, IdentifyPayload, OpCode, ResumePayload};
use nano_gateway::{rules, Engine, Session};
use serde_json::Value;

async fn connected(gateway: &FakeGateway) -> (Arc<Session>, Arc<RecordingApi>, GatewaySocket, String) {
    let api = RecordingApi::new();
    let bot = test_bot(&gateway.url(), Arc::clone(&api)).expect("bot");
    let session = Session::spawn(bot, [0, 1]);

    let mut socket = gateway.accept().await.expect("accept");
    let id = session_id();
    socket.handshake(60_000, &id, 1).await.expect("handshake");
    wait_until(|| session.connection().state() == ConnectionState::Connected)
        .await
        .expect("session never connected");
    (session, api, socket, id)
}

// ============================================================================
// Handshake Tests
// ============================================================================

#[tokio::test]
async fn test_identify_carries_credentials_and_shard() {
    let gateway = FakeGateway::bind().await.unwrap();
    let api = RecordingApi::new();
    let bot = test_bot(&gateway.url(), api).unwrap();
    let session = Session::spawn(Arc::clone(&bot), [0, 1]);

    let mut socket = gateway.accept().await.unwrap();
    let id = session_id();
    let identify = socket.handshake(60_000, &id, 1).await.unwrap();
    let payload: IdentifyPayload = identify.decode().unwrap();

    assert_eq!(payload.token, format!("Bot {APP_ID}.{TOKEN}"));
    assert_eq!(payload.shard, [0, 1]);

    wait_until(|| bot.sessions().contains(&id)).await.unwrap();
    assert_eq!(session.session_id().as_deref(), Some(id.as_str()));
    assert_eq!(session.connection().last_seq(), Some(1));
    assert_eq!(session.at_me(), format!("<@!{BOT_USER_ID}>"));
}

#[tokio::test]
async fn test_heartbeat_carries_last_seq() {
    let gateway = FakeGateway::bind().await.unwrap();
    let api = RecordingApi::new();
    let bot = test_bot(&gateway.url(), api).unwrap();
    let _session = Session::spawn(bot, [0, 1]);

    let mut socket = gateway.accept().await.unwrap();
    socket.handshake(50, &session_id(), 4).await.unwrap();

    // A beat may race the READY; the next one must carry its sequence
    let mut beat = socket.recv_op(OpCode::Heartbeat).await.unwrap();
    if matches!(beat.d, None | Some(Value::Null)) {
        beat = socket.recv_op(OpCode::Heartbeat).await.unwrap();
    }
    assert_eq!(beat.d, Some(Value::from(4)));
}

// ============================================================================
// Dispatch Tests
// ============================================================================

#[tokio::test]
async fn test_mention_reaches_matcher() {
    let gateway = FakeGateway::bind().await.unwrap();
    let (session, api, mut socket, _) = connected(&gateway).await;

    let engine = Engine::new(Arc::clone(session.bot().matchers()));
    engine
        .on_message_full_match("ping", [rules::only_to_me()])
        .handle_owned(|ctx| async move {
            let _ = ctx.send_text("pong").await;
        });

    socket.send(&at_message(2, "m-1", "ping")).await.unwrap();

    let replies = api.wait_for_replies(1).await.unwrap();
    let (target, post) = &replies[0];
    assert_eq!(target, &ReplyTarget::Channel { channel_id: "100".into() });
    assert_eq!(post.content, "pong");
    assert_eq!(post.msg_id.as_deref(), Some("m-1"));
}

#[tokio::test]
async fn test_replayed_seq_is_dropped() {
    let gateway = FakeGateway::bind().await.unwrap();
    let (session, api, mut socket, _) = connected(&gateway).await;

    let engine = Engine::new(Arc::clone(session.bot().matchers()));
    engine
        .on_message_full_match("ping", [rules::only_to_me()])
        .handle_owned(|ctx| async move {
            let _ = ctx.send_text("pong").await;
        });

    socket.send(&at_message(5, "m-1", "ping")).await.unwrap();
    api.wait_for_replies(1).await.unwrap();

    socket.send(&at_message(5, "m-1", "ping")).await.unwrap();
    socket.send(&at_message(3, "m-0", "ping")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(api.replies().len(), 1);
    assert_eq!(session.connection().last_seq(), Some(5));
}

// ============================================================================
// Recovery Tests
// ============================================================================

#[tokio::test]
async fn test_dropped_socket_resumes_with_last_seq() {
    let gateway = FakeGateway::bind().await.unwrap();
    let (session, api, mut socket, id) = connected(&gateway).await;

    let engine = Engine::new(Arc::clone(session.bot().matchers()));
    engine
        .on_message_full_match("ping", [rules::only_to_me()])
        .handle_owned(|ctx| async move {
            let _ = ctx.send_text("pong").await;
        });

    socket
        .send(&Envelope::dispatch("GUILD_CREATE", 7, serde_json::json!({ "id": "200" })))
        .await
        .unwrap();
    wait_until(|| session.connection().last_seq() == Some(7)).await.unwrap();
    drop(socket);

    let mut socket = gateway.accept().await.unwrap();
    let resume = socket.recv_op(OpCode::Resume).await.unwrap();
    let payload: ResumePayload = resume.decode().unwrap();

    assert_eq!(payload.session_id, id);
    assert_eq!(payload.seq, 7);
    assert_eq!(payload.token, format!("Bot {APP_ID}.{TOKEN}"));
    wait_until(|| session.bot().sessions().contains(&id)).await.unwrap();

    // The next sequence after the resume is new, the last one is a replay
    socket.send(&at_message(8, "m-8", "ping")).await.unwrap();
    let replies = api.wait_for_replies(1).await.unwrap();
    assert_eq!(replies[0].1.msg_id.as_deref(), Some("m-8"));
    assert_eq!(session.connection().last_seq(), Some(8));

    socket.send(&at_message(7, "m-7", "ping")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(api.replies().len(), 1);
    assert_eq!(session.connection().last_seq(), Some(8));
}

#[tokio::test]
async fn test_reconnect_request_identifies_again() {
    let gateway = FakeGateway::bind().await.unwrap();
    let (session, _api, mut socket, first) = connected(&gateway).await;

    socket.send(&Envelope::bare(OpCode::Reconnect)).await.unwrap();

    let mut socket = gateway.accept().await.unwrap();
    let second = session_id();
    let identify = socket.handshake(60_000, &second, 1).await.unwrap();
    assert_eq!(identify.op, OpCode::Identify);

    wait_until(|| session.session_id().as_deref() == Some(second.as_str()))
        .await
        .unwrap();
    wait_until(|| session.bot().sessions().contains(&second)).await.unwrap();
    assert!(!session.bot().sessions().contains(&first));
}

#[tokio::test]
async fn test_failed_dial_is_retried() {
    let gateway = FakeGateway::bind().await.unwrap();
    let api = RecordingApi::new();
    let bot = test_bot(&gateway.url(), api).unwrap();
    let session = Session::spawn(bot, [0, 1]);

    // First attempt never sees a Hello and is dropped
    let first = gateway.accept().await.unwrap();
    drop(first);

    let mut socket = gateway.accept().await.unwrap();
    socket.handshake(60_000, &session_id(), 1).await.unwrap();
    wait_until(|| session.connection().state() == ConnectionState::Connected)
        .await
        .unwrap();
}
