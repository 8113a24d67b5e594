use huddle_domain::{ChatMessage, ParticipantIdentity, TrackPublication, TrackRef, TrackSid, TrackSource};

use super::coordinator::LayoutCoordinator;
use super::state::{PinAction, WidgetAction};
use crate::chat::ChatTimeline;

fn msg(from: &str, timestamp_ms: i64) -> ChatMessage {
	ChatMessage::with_timestamp(ParticipantIdentity::new(from).unwrap(), "hello", timestamp_ms)
}

fn share(participant: &str, sid: &str, subscribed: bool) -> TrackRef {
	TrackRef::published(
		ParticipantIdentity::new(participant).unwrap(),
		TrackSource::ScreenShare,
		TrackPublication::new(TrackSid::new(sid).unwrap(), subscribed),
	)
}

#[test]
fn unset_marker_counts_every_message() {
	let mut coordinator = LayoutCoordinator::new();
	let mut timeline = ChatTimeline::default();
	for i in 0..3 {
		timeline.push(msg("bob", i));
	}

	assert!(coordinator.sync_unread(&timeline));
	assert_eq!(coordinator.widget().unread_messages, 3);
}

#[test]
fn visible_chat_marks_read_without_dispatch() {
	let mut coordinator = LayoutCoordinator::new();
	let mut timeline = ChatTimeline::default();
	timeline.push(msg("bob", 1_000));
	timeline.push(msg("bob", 2_000));

	coordinator.toggle_chat(&timeline);
	assert!(coordinator.widget().show_chat);
	assert_eq!(coordinator.widget().unread_messages, 0);

	// arrivals while the panel is open only advance the marker
	timeline.push(msg("bob", 3_000));
	assert!(!coordinator.sync_unread(&timeline));
	assert_eq!(coordinator.widget().unread_messages, 0);

	// nothing newer than the marker once the panel closes
	coordinator.toggle_chat(&timeline);
	assert!(!coordinator.widget().show_chat);
	assert_eq!(coordinator.widget().unread_messages, 0);

	timeline.push(msg("bob", 4_000));
	assert!(coordinator.sync_unread(&timeline));
	assert_eq!(coordinator.widget().unread_messages, 1);
}

#[test]
fn opening_the_panel_zeroes_unread() {
	let mut coordinator = LayoutCoordinator::new();
	let mut timeline = ChatTimeline::default();
	for i in 0..4 {
		timeline.push(msg("bob", i));
	}

	coordinator.sync_unread(&timeline);
	assert_eq!(coordinator.widget().unread_messages, 4);

	coordinator.toggle_chat(&timeline);
	assert_eq!(coordinator.widget().unread_messages, 0);
}

#[test]
fn recompute_with_unchanged_inputs_is_idempotent() {
	let mut coordinator = LayoutCoordinator::new();
	let mut timeline = ChatTimeline::default();
	timeline.push(msg("bob", 1_000));
	timeline.push(msg("carol", 2_000));

	assert!(coordinator.sync_unread(&timeline));
	let after_first = coordinator.widget();

	for _ in 0..3 {
		assert!(!coordinator.sync_unread(&timeline));
		assert_eq!(coordinator.widget(), after_first);
	}
}

#[test]
fn dispatches_once_per_distinct_count() {
	let mut coordinator = LayoutCoordinator::new();
	let mut timeline = ChatTimeline::default();

	let mut dispatches = 0;
	for i in 0..3 {
		timeline.push(msg("bob", i));
		if coordinator.sync_unread(&timeline) {
			dispatches += 1;
		}
		if coordinator.sync_unread(&timeline) {
			dispatches += 1;
		}
	}

	// one dispatch per count change: 1, 2, 3
	assert_eq!(dispatches, 3);
	assert_eq!(coordinator.widget().unread_messages, 3);
}

#[test]
fn auto_focus_pins_the_first_subscribed_share() {
	let mut coordinator = LayoutCoordinator::new();
	let shares = [
		share("alice", "TR_a", false),
		share("bob", "TR_b", true),
		share("carol", "TR_c", true),
	];

	coordinator.sync_screen_shares(&shares);

	assert_eq!(coordinator.auto_focused().unwrap().as_str(), "TR_b");
	assert_eq!(coordinator.pin().focused().unwrap().sid().unwrap().as_str(), "TR_b");
}

#[test]
fn auto_focus_waits_for_a_subscription() {
	let mut coordinator = LayoutCoordinator::new();

	coordinator.sync_screen_shares(&[share("alice", "TR_a", false)]);
	assert!(coordinator.auto_focused().is_none());
	assert!(coordinator.pin().is_empty());

	coordinator.sync_screen_shares(&[share("alice", "TR_a", true)]);
	assert_eq!(coordinator.auto_focused().unwrap().as_str(), "TR_a");
}

#[test]
fn auto_focus_clears_when_the_publication_leaves() {
	let mut coordinator = LayoutCoordinator::new();
	coordinator.sync_screen_shares(&[share("bob", "TR_b", true), share("carol", "TR_c", true)]);
	assert_eq!(coordinator.auto_focused().unwrap().as_str(), "TR_b");

	// one transition per observation: first the clear
	coordinator.sync_screen_shares(&[share("carol", "TR_c", true)]);
	assert!(coordinator.auto_focused().is_none());
	assert!(coordinator.pin().is_empty());

	// then the remaining share wins on the next pass
	coordinator.sync_screen_shares(&[share("carol", "TR_c", true)]);
	assert_eq!(coordinator.auto_focused().unwrap().as_str(), "TR_c");
}

#[test]
fn auto_focus_survives_unsubscribe_while_published() {
	let mut coordinator = LayoutCoordinator::new();
	coordinator.sync_screen_shares(&[share("bob", "TR_b", true)]);

	coordinator.sync_screen_shares(&[share("bob", "TR_b", false)]);
	assert_eq!(coordinator.auto_focused().unwrap().as_str(), "TR_b");
	assert!(!coordinator.pin().is_empty());
}

#[test]
fn manual_pins_leave_the_marker_alone() {
	let mut coordinator = LayoutCoordinator::new();

	coordinator.dispatch_pin(PinAction::Set(share("alice", "TR_a", true)));
	assert!(coordinator.auto_focused().is_none());

	coordinator.dispatch_pin(PinAction::Clear);
	assert!(coordinator.auto_focused().is_none());
}

#[test]
fn manual_widget_actions_flow_through_the_coordinator() {
	let mut coordinator = LayoutCoordinator::new();

	coordinator.dispatch_widget(WidgetAction::SetUnread { count: 9 });
	assert_eq!(coordinator.widget().unread_messages, 9);

	let timeline = ChatTimeline::default();
	coordinator.toggle_chat(&timeline);
	assert!(coordinator.widget().show_chat);
	assert_eq!(coordinator.widget().unread_messages, 0);
}
