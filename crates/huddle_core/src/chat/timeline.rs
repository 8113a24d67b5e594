#![forbid(unsafe_code)]

use std::collections::VecDeque;

use huddle_domain::ChatMessage;

use super::{ChatConfig, ChatEvent};

/// Gap under which consecutive same-sender messages share one timestamp.
pub const TIMESTAMP_GROUP_WINDOW_MS: i64 = 60_000;

/// Which labels a rendered message row shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageLabels {
	pub show_name: bool,
	pub show_timestamp: bool,
}

/// Display labels for `message` rendered directly after `prev`.
///
/// The sender name is hidden when `prev` has the same sender. The
/// timestamp is hidden when the gap to `prev` is under
/// `TIMESTAMP_GROUP_WINDOW_MS` and the name is hidden too; a shown name
/// always comes with a shown timestamp.
pub fn labels(prev: Option<&ChatMessage>, message: &ChatMessage) -> MessageLabels {
	let same_sender = prev.is_some_and(|p| p.from == message.from);
	let close_in_time = prev.is_some_and(|p| message.timestamp_ms - p.timestamp_ms < TIMESTAMP_GROUP_WINDOW_MS);

	let show_name = !same_sender;
	MessageLabels {
		show_name,
		show_timestamp: show_name || !close_in_time,
	}
}

/// Chronological chat history plus send state for one conference session.
///
/// Messages are kept in arrival order and never reordered or rewritten.
/// The history bound evicts oldest first; evicted messages leave the
/// unread computation's domain.
#[derive(Debug, Clone)]
pub struct ChatTimeline {
	messages: VecDeque<ChatMessage>,
	history_limit: usize,
	sending: bool,
	closed: bool,
}

impl Default for ChatTimeline {
	fn default() -> Self {
		Self::new(ChatConfig::default().history_limit)
	}
}

impl ChatTimeline {
	/// A `history_limit` of 0 keeps everything.
	pub fn new(history_limit: usize) -> Self {
		Self {
			messages: VecDeque::new(),
			history_limit,
			sending: false,
			closed: false,
		}
	}

	/// Fold one worker event into the timeline.
	pub fn apply(&mut self, event: ChatEvent) {
		match event {
			ChatEvent::Message(message) => self.push(message),
			ChatEvent::SendStateChanged { sending } => self.sending = sending,
			ChatEvent::Closed { .. } => self.closed = true,
		}
	}

	pub fn push(&mut self, message: ChatMessage) {
		if self.history_limit > 0 {
			while self.messages.len() >= self.history_limit {
				self.messages.pop_front();
			}
		}
		self.messages.push_back(message);
	}

	pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
		self.messages.iter()
	}

	pub fn len(&self) -> usize {
		self.messages.len()
	}

	pub fn is_empty(&self) -> bool {
		self.messages.is_empty()
	}

	pub fn last(&self) -> Option<&ChatMessage> {
		self.messages.back()
	}

	pub fn last_timestamp_ms(&self) -> Option<i64> {
		self.messages.back().map(|m| m.timestamp_ms)
	}

	/// True while at least one send is in flight.
	pub fn is_sending(&self) -> bool {
		self.sending
	}

	/// True once the session channel ended.
	pub fn is_closed(&self) -> bool {
		self.closed
	}

	/// Messages paired with their display labels, oldest first.
	pub fn grouped(&self) -> impl Iterator<Item = (MessageLabels, &ChatMessage)> {
		let mut prev: Option<&ChatMessage> = None;
		self.messages.iter().map(move |message| {
			let l = labels(prev, message);
			prev = Some(message);
			(l, message)
		})
	}
}
