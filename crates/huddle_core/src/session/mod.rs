#![forbid(unsafe_code)]

pub mod local;


pub use local::{LocalParticipant, LocalSession, LocalSessionConfig};

use bytes::Bytes;
use huddle_domain::ParticipantIdentity;
use thiserror::Error;
use tokio::sync::mpsc;

/// A raw data frame delivered by the session channel.
///
/// The envelope carries sender and delivery time; the payload is opaque
/// until a codec decodes it.
#[derive(Debug, Clone)]
pub struct InboundFrame {
	pub from: ParticipantIdentity,
	/// Unix milliseconds at which the channel accepted the frame.
	pub timestamp_ms: i64,
	pub payload: Bytes,
}

/// Errors raised by a session channel.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChannelError {
	/// No session is established yet.
	#[error("session channel is not connected")]
	NotConnected,

	/// The session was torn down; no further publishes are possible.
	#[error("session channel is closed")]
	Closed,

	/// The transport rejected or lost the frame.
	#[error("transport error: {0}")]
	Transport(String),
}

/// Data channel of an established conference session.
///
/// Implementations stamp outgoing frames with the local identity and the
/// send time, and serialize delivery per subscriber. Dropping a
/// subscription receiver releases it.
#[async_trait::async_trait]
pub trait SessionChannel: Send + Sync + 'static {
	/// Identity this channel publishes as.
	fn local_identity(&self) -> ParticipantIdentity;

	/// Stream of frames published by other participants.
	async fn subscribe(&self) -> mpsc::Receiver<InboundFrame>;

	/// Publish a payload to every other participant.
	async fn publish(&self, payload: Bytes) -> Result<(), ChannelError>;

	/// Whether the channel can currently accept publishes.
	fn is_ready(&self) -> bool {
		true
	}
}
