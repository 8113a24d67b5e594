#![forbid(unsafe_code)]

use huddle_domain::{TrackRef, TrackSid};
use tracing::debug;

use super::state::{LayoutContext, PinAction, PinState, WidgetAction, WidgetState};
use crate::chat::ChatTimeline;

/// Derives unread counts and screen-share focus into the shared layout
/// context.
///
/// The coordinator owns the context: every widget and pin update funnels
/// through this single writer, whether it originates here or from a user
/// action.
#[derive(Debug, Default)]
pub struct LayoutCoordinator {
	ctx: LayoutContext,
	last_read_ms: Option<i64>,
	auto_focused: Option<TrackSid>,
}

impl LayoutCoordinator {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn widget(&self) -> WidgetState {
		self.ctx.widget()
	}

	pub fn pin(&self) -> &PinState {
		self.ctx.pin()
	}

	pub fn context(&self) -> &LayoutContext {
		&self.ctx
	}

	/// Sid of the auto-focused share, if any.
	pub fn auto_focused(&self) -> Option<&TrackSid> {
		self.auto_focused.as_ref()
	}

	/// Manual widget action. Chat toggles should go through `toggle_chat`
	/// so the unread state reconciles in the same step.
	pub fn dispatch_widget(&mut self, action: WidgetAction) {
		self.ctx.dispatch_widget(action);
	}

	/// Manual pin action. Never touches the auto-focus marker.
	pub fn dispatch_pin(&mut self, action: PinAction) {
		self.ctx.dispatch_pin(action);
	}

	/// Flip chat visibility and immediately reconcile unread state.
	pub fn toggle_chat(&mut self, timeline: &ChatTimeline) {
		self.ctx.dispatch_widget(WidgetAction::ToggleChat);
		self.sync_unread(timeline);
	}

	/// Recompute the unread count against the timeline. Returns whether a
	/// widget update was dispatched.
	///
	/// Call on every message-sequence or visibility change. While the
	/// panel is visible everything counts as read: the last-read marker
	/// advances and nothing is dispatched. Otherwise messages newer than
	/// the marker are counted (all of them while the marker is unset) and
	/// the count is dispatched only when it differs from the stored one.
	pub fn sync_unread(&mut self, timeline: &ChatTimeline) -> bool {
		let widget = self.ctx.widget();

		if widget.show_chat && !timeline.is_empty() {
			self.last_read_ms = timeline.last_timestamp_ms();
			return false;
		}

		let count = match self.last_read_ms {
			Some(last_read) => timeline.iter().filter(|m| m.timestamp_ms > last_read).count(),
			None => timeline.len(),
		};

		if count != widget.unread_messages {
			debug!(count, "layout: unread count changed");
			self.ctx.dispatch_widget(WidgetAction::SetUnread { count });
			return true;
		}

		false
	}

	/// Reconcile screen-share auto focus with the current share set.
	///
	/// Call on every publication or subscription change. Pins the first
	/// subscribed share while nothing is auto-focused; clears the pin once
	/// the pinned publication disappears from `screen_shares`. At most one
	/// transition per call, and manual pins are left alone.
	pub fn sync_screen_shares(&mut self, screen_shares: &[TrackRef]) {
		match self.auto_focused.clone() {
			None => {
				if let Some(track) = screen_shares.iter().find(|t| t.is_subscribed()) {
					debug!(track = %track, "layout: auto focusing screen share");
					self.auto_focused = track.sid().cloned();
					self.ctx.dispatch_pin(PinAction::Set(track.clone()));
				}
			}
			Some(focused_sid) => {
				let still_present = screen_shares.iter().any(|t| t.sid() == Some(&focused_sid));
				if !still_present {
					debug!(sid = %focused_sid, "layout: auto focused screen share ended");
					self.auto_focused = None;
					self.ctx.dispatch_pin(PinAction::Clear);
				}
			}
		}
	}
}
