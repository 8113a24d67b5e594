#![forbid(unsafe_code)]

pub mod handle;
pub mod timeline;

mod worker;


pub use handle::{ChatHandle, SendError, SendOutcome};
pub use timeline::{ChatTimeline, MessageLabels, TIMESTAMP_GROUP_WINDOW_MS, labels};

use huddle_domain::ChatMessage;
use tokio::sync::mpsc;

use crate::codec::MessageCodec;
use crate::session::SessionChannel;

/// Configuration for a chat session.
#[derive(Debug, Clone)]
pub struct ChatConfig {
	/// Maximum retained timeline messages; 0 keeps everything.
	pub history_limit: usize,

	/// Capacity of the handle to worker command queue.
	pub command_queue_capacity: usize,
}

impl Default for ChatConfig {
	fn default() -> Self {
		Self {
			history_limit: 512,
			command_queue_capacity: 64,
		}
	}
}

/// State changes emitted by the chat worker.
#[derive(Debug, Clone)]
pub enum ChatEvent {
	/// A message entered the timeline (remote arrival or local echo).
	Message(ChatMessage),

	/// The send-in-flight flag flipped.
	SendStateChanged { sending: bool },

	/// The inbound stream ended; no further events follow.
	Closed { reason: String },
}

/// Spawn the chat worker for an established session.
///
/// The worker owns the channel subscription, decodes inbound frames, and
/// executes sends without blocking event processing. It stops when every
/// `ChatHandle` is dropped or the inbound stream ends.
pub fn start_chat<C, K>(channel: C, codec: K, cfg: &ChatConfig) -> (ChatHandle, mpsc::UnboundedReceiver<ChatEvent>)
where
	C: SessionChannel,
	K: MessageCodec,
{
	let (cmd_tx, cmd_rx) = mpsc::channel(cfg.command_queue_capacity);
	let (event_tx, event_rx) = mpsc::unbounded_channel();

	tokio::spawn(worker::run_chat_worker(channel, codec, cmd_rx, event_tx));

	(ChatHandle::new(cmd_tx), event_rx)
}
