#![forbid(unsafe_code)]

use huddle_domain::ChatMessage;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Result of a successful `ChatHandle::send`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
	/// The message was published and appended to the timeline.
	Delivered(ChatMessage),

	/// Input trimmed to nothing; nothing was sent.
	EmptyInput,
}

/// Errors surfaced by `ChatHandle::send`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendError {
	/// No session channel is available. Callers should disable the
	/// composer until the session is ready.
	#[error("chat channel is not available")]
	ChannelUnavailable,

	/// The transport rejected the message. It is not retried; the caller
	/// decides whether to resubmit.
	#[error("message transmission failed: {0}")]
	TransmitFailed(String),
}

#[derive(Debug)]
pub(crate) enum ChatCommand {
	Send {
		text: String,
		resp: oneshot::Sender<Result<SendOutcome, SendError>>,
	},
}

/// Clonable handle for submitting chat messages to the worker.
#[derive(Debug, Clone)]
pub struct ChatHandle {
	cmd_tx: mpsc::Sender<ChatCommand>,
}

impl ChatHandle {
	pub(crate) fn new(cmd_tx: mpsc::Sender<ChatCommand>) -> Self {
		Self { cmd_tx }
	}

	/// Submit `text` for transmission and wait for the round trip.
	///
	/// Input whose trimmed form is empty resolves to
	/// `SendOutcome::EmptyInput` without touching the channel; otherwise
	/// the text is transmitted as written, surrounding whitespace intact.
	/// The local echo enters the timeline only after the channel accepts
	/// the message.
	pub async fn send(&self, text: impl Into<String>) -> Result<SendOutcome, SendError> {
		let text = text.into();
		if text.trim().is_empty() {
			return Ok(SendOutcome::EmptyInput);
		}

		let (resp_tx, resp_rx) = oneshot::channel();
		self.cmd_tx
			.send(ChatCommand::Send { text, resp: resp_tx })
			.await
			.map_err(|_| SendError::ChannelUnavailable)?;

		resp_rx.await.map_err(|_| SendError::ChannelUnavailable)?
	}
}
