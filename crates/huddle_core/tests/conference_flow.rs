use std::time::Duration;

use huddle_core::chat::{ChatConfig, ChatEvent, ChatTimeline, SendOutcome, start_chat};
use huddle_core::codec::{JsonCodec, TextCodec};
use huddle_core::layout::{LayoutCoordinator, exclude_focused};
use huddle_core::session::{LocalSession, LocalSessionConfig};
use huddle_core::tracks::{SourceRequest, TrackEvent, TrackRoster};
use huddle_domain::{ParticipantIdentity, TrackSid, TrackSource};
use tokio::sync::mpsc;
use tokio::time::timeout;

fn identity(s: &str) -> ParticipantIdentity {
	ParticipantIdentity::new(s).unwrap()
}

fn sid(s: &str) -> TrackSid {
	TrackSid::new(s).unwrap()
}

async fn pump_until(rx: &mut mpsc::UnboundedReceiver<ChatEvent>, timeline: &mut ChatTimeline, messages: usize) {
	while timeline.len() < messages {
		let event = timeout(Duration::from_millis(500), rx.recv())
			.await
			.expect("timed out waiting for chat events")
			.expect("event stream ended");
		timeline.apply(event);
	}
}

#[tokio::test]
async fn two_participants_exchange_messages() {
	let session = LocalSession::new(LocalSessionConfig::default());
	let cfg = ChatConfig::default();

	let alice = session.join(identity("alice")).await;
	let bob = session.join(identity("bob")).await;
	let (alice_handle, mut alice_events) = start_chat(alice, TextCodec, &cfg);
	let (bob_handle, mut bob_events) = start_chat(bob, TextCodec, &cfg);

	alice_handle.send("hello bob").await.unwrap();
	bob_handle.send("hey alice").await.unwrap();

	let mut alice_timeline = ChatTimeline::new(cfg.history_limit);
	let mut bob_timeline = ChatTimeline::new(cfg.history_limit);
	pump_until(&mut alice_events, &mut alice_timeline, 2).await;
	pump_until(&mut bob_events, &mut bob_timeline, 2).await;

	for timeline in [&alice_timeline, &bob_timeline] {
		let view: Vec<(&str, &str)> = timeline.iter().map(|m| (m.from.as_str(), m.body.as_str())).collect();
		assert_eq!(view, vec![("alice", "hello bob"), ("bob", "hey alice")]);
	}

	// delivery stamped both timelines in non-decreasing order
	for timeline in [&alice_timeline, &bob_timeline] {
		let stamps: Vec<i64> = timeline.iter().map(|m| m.timestamp_ms).collect();
		assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
	}
}

#[tokio::test]
async fn unread_flow_across_visibility_changes() {
	let session = LocalSession::new(LocalSessionConfig::default());
	let cfg = ChatConfig::default();

	let carol = session.join(identity("carol")).await;
	let dan = session.join(identity("dan")).await;
	let (_carol_handle, mut carol_events) = start_chat(carol, TextCodec, &cfg);
	let (dan_handle, _dan_events) = start_chat(dan, TextCodec, &cfg);

	let mut timeline = ChatTimeline::new(cfg.history_limit);
	let mut coordinator = LayoutCoordinator::new();

	dan_handle.send("first").await.unwrap();
	dan_handle.send("second").await.unwrap();
	pump_until(&mut carol_events, &mut timeline, 2).await;

	assert!(coordinator.sync_unread(&timeline));
	assert_eq!(coordinator.widget().unread_messages, 2);

	coordinator.toggle_chat(&timeline);
	assert!(coordinator.widget().show_chat);
	assert_eq!(coordinator.widget().unread_messages, 0);

	// arrivals while open are read immediately
	dan_handle.send("third").await.unwrap();
	pump_until(&mut carol_events, &mut timeline, 3).await;
	assert!(!coordinator.sync_unread(&timeline));
	assert_eq!(coordinator.widget().unread_messages, 0);

	coordinator.toggle_chat(&timeline);
	assert!(!coordinator.widget().show_chat);

	dan_handle.send("fourth").await.unwrap();
	pump_until(&mut carol_events, &mut timeline, 4).await;
	assert!(coordinator.sync_unread(&timeline));
	assert_eq!(coordinator.widget().unread_messages, 1);
}

#[tokio::test]
async fn screen_share_focus_follows_the_roster() {
	let mut roster = TrackRoster::new();
	let mut coordinator = LayoutCoordinator::new();

	roster.apply(TrackEvent::ParticipantJoined(identity("erin")));
	roster.apply(TrackEvent::ParticipantJoined(identity("frank")));
	roster.apply(TrackEvent::Published {
		participant: identity("frank"),
		source: TrackSource::ScreenShare,
		sid: sid("TR_frank"),
	});

	coordinator.sync_screen_shares(&roster.screen_shares());
	assert!(coordinator.pin().is_empty());

	roster.apply(TrackEvent::Subscribed { sid: sid("TR_frank") });
	coordinator.sync_screen_shares(&roster.screen_shares());
	assert_eq!(coordinator.auto_focused().unwrap().as_str(), "TR_frank");

	// the carousel shows every other tile
	let tiles = roster.select(&[
		SourceRequest::new(TrackSource::Camera, true),
		SourceRequest::new(TrackSource::ScreenShare, false),
	]);
	let carousel = exclude_focused(&tiles, coordinator.pin().focused());
	assert_eq!(tiles.len(), 3);
	assert_eq!(carousel.len(), 2);
	assert!(carousel.iter().all(|t| t.sid().map(|s| s.as_str()) != Some("TR_frank")));

	roster.apply(TrackEvent::Unpublished { sid: sid("TR_frank") });
	coordinator.sync_screen_shares(&roster.screen_shares());
	assert!(coordinator.auto_focused().is_none());
	assert!(coordinator.pin().is_empty());
}

#[tokio::test]
async fn json_codec_preserves_message_identity_end_to_end() {
	let session = LocalSession::new(LocalSessionConfig::default());
	let cfg = ChatConfig::default();

	let fay = session.join(identity("fay")).await;
	let gil = session.join(identity("gil")).await;
	let (fay_handle, _fay_events) = start_chat(fay, JsonCodec, &cfg);
	let (_gil_handle, mut gil_events) = start_chat(gil, JsonCodec, &cfg);

	let delivered = match fay_handle.send("ids travel with me").await.unwrap() {
		SendOutcome::Delivered(message) => message,
		other => panic!("expected delivery, got {other:?}"),
	};

	let mut timeline = ChatTimeline::new(cfg.history_limit);
	pump_until(&mut gil_events, &mut timeline, 1).await;

	let received = timeline.last().unwrap();
	assert_eq!(received.id, delivered.id);
	assert_eq!(received.timestamp_ms, delivered.timestamp_ms);
	assert_eq!(received.from.as_str(), "fay");
	assert_eq!(received.body, "ids travel with me");
}

#[tokio::test]
async fn closed_session_ends_chat_cleanly() {
	let session = LocalSession::new(LocalSessionConfig::default());
	let cfg = ChatConfig::default();

	let eve = session.join(identity("eve")).await;
	let (handle, mut events) = start_chat(eve, TextCodec, &cfg);

	session.close().await;

	let mut timeline = ChatTimeline::new(cfg.history_limit);
	loop {
		match timeout(Duration::from_millis(500), events.recv()).await {
			Ok(Some(event)) => timeline.apply(event),
			Ok(None) => break,
			Err(_) => panic!("timed out waiting for channel teardown"),
		}
	}
	assert!(timeline.is_closed());

	assert!(handle.send("late").await.is_err());
}
