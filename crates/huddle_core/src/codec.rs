#![forbid(unsafe_code)]

use bytes::Bytes;
use huddle_domain::ChatMessage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::InboundFrame;

/// Errors raised while encoding or decoding chat payloads.
#[derive(Debug, Error)]
pub enum CodecError {
	#[error("payload is not valid utf-8: {0}")]
	Utf8(#[from] std::string::FromUtf8Error),

	#[error("payload is not valid json: {0}")]
	Json(#[from] serde_json::Error),
}

/// Translates chat messages to and from channel payloads.
///
/// `encode` runs on a locally created message before publish; `decode`
/// turns an inbound frame into a timeline message.
pub trait MessageCodec: Send + Sync + 'static {
	fn encode(&self, message: &ChatMessage) -> Result<Bytes, CodecError>;
	fn decode(&self, frame: &InboundFrame) -> Result<ChatMessage, CodecError>;
}

/// Default codec: the payload is the utf-8 message body. Sender and
/// timestamp come from the channel envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl MessageCodec for TextCodec {
	fn encode(&self, message: &ChatMessage) -> Result<Bytes, CodecError> {
		Ok(Bytes::copy_from_slice(message.body.as_bytes()))
	}

	fn decode(&self, frame: &InboundFrame) -> Result<ChatMessage, CodecError> {
		let body = String::from_utf8(frame.payload.to_vec())?;
		Ok(ChatMessage::with_timestamp(frame.from.clone(), body, frame.timestamp_ms))
	}
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonPayload {
	id: huddle_domain::MessageId,
	body: String,
	timestamp_ms: i64,
}

/// Legacy codec carrying message id and creation time inside a json
/// payload, for interop with clients that predate envelope timestamps.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl MessageCodec for JsonCodec {
	fn encode(&self, message: &ChatMessage) -> Result<Bytes, CodecError> {
		let payload = JsonPayload {
			id: message.id,
			body: message.body.clone(),
			timestamp_ms: message.timestamp_ms,
		};
		Ok(Bytes::from(serde_json::to_vec(&payload)?))
	}

	fn decode(&self, frame: &InboundFrame) -> Result<ChatMessage, CodecError> {
		let payload: JsonPayload = serde_json::from_slice(&frame.payload)?;
		Ok(ChatMessage {
			id: payload.id,
			from: frame.from.clone(),
			body: payload.body,
			timestamp_ms: payload.timestamp_ms,
		})
	}
}
