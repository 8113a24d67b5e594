#![forbid(unsafe_code)]

use huddle_domain::TrackRef;
use tracing::debug;

/// Shared chat widget state. One instance per conference, mutated only
/// through dispatched actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WidgetState {
	pub show_chat: bool,

	/// Recomputed from the timeline and the last-read marker, never
	/// incremented in place.
	pub unread_messages: usize,
}

/// Actions accepted by the widget reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetAction {
	/// Store a freshly computed unread count.
	SetUnread { count: usize },

	/// Flip chat visibility. Opening zeroes the unread count.
	ToggleChat,
}

impl WidgetState {
	pub fn apply(self, action: WidgetAction) -> WidgetState {
		match action {
			WidgetAction::SetUnread { count } => WidgetState {
				unread_messages: count,
				..self
			},
			WidgetAction::ToggleChat => {
				let show_chat = !self.show_chat;
				WidgetState {
					show_chat,
					unread_messages: if show_chat { 0 } else { self.unread_messages },
				}
			}
		}
	}
}

/// Ordered pin sequence; the first entry is the focused track. Empty
/// means grid layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PinState {
	tracks: Vec<TrackRef>,
}

/// Actions accepted by the pin reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum PinAction {
	/// Focus a single track.
	Set(TrackRef),

	/// Return to grid layout.
	Clear,
}

impl PinState {
	pub fn apply(self, action: PinAction) -> PinState {
		match action {
			PinAction::Set(track) => PinState { tracks: vec![track] },
			PinAction::Clear => PinState { tracks: Vec::new() },
		}
	}

	pub fn focused(&self) -> Option<&TrackRef> {
		self.tracks.first()
	}

	pub fn tracks(&self) -> &[TrackRef] {
		&self.tracks
	}

	pub fn is_empty(&self) -> bool {
		self.tracks.is_empty()
	}
}

/// Shared layout state of one conference. All mutation funnels through
/// the two dispatch entry points.
#[derive(Debug, Clone, Default)]
pub struct LayoutContext {
	widget: WidgetState,
	pin: PinState,
}

impl LayoutContext {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn widget(&self) -> WidgetState {
		self.widget
	}

	pub fn pin(&self) -> &PinState {
		&self.pin
	}

	pub fn dispatch_widget(&mut self, action: WidgetAction) {
		debug!(?action, "layout: updating widget state");
		self.widget = self.widget.apply(action);
	}

	pub fn dispatch_pin(&mut self, action: PinAction) {
		debug!(?action, "layout: updating pin state");
		self.pin = std::mem::take(&mut self.pin).apply(action);
	}
}

/// Carousel helper: every track except the focused one.
pub fn exclude_focused<'a>(tracks: &'a [TrackRef], focused: Option<&TrackRef>) -> Vec<&'a TrackRef> {
	tracks
		.iter()
		.filter(|t| focused.map_or(true, |f| !t.same_track(f)))
		.collect()
}
