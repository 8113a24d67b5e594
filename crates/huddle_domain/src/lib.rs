#![forbid(unsafe_code)]

use core::fmt;
use core::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current wall-clock time as unix milliseconds.
pub fn unix_ms_now() -> i64 {
	match SystemTime::now().duration_since(UNIX_EPOCH) {
		Ok(d) => d.as_millis() as i64,
		Err(_) => 0,
	}
}

/// Media sources a conference participant can publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackSource {
	Camera,
	Microphone,
	ScreenShare,
	ScreenShareAudio,
}

impl TrackSource {
	/// Stable string identifier.
	pub const fn as_str(self) -> &'static str {
		match self {
			TrackSource::Camera => "camera",
			TrackSource::Microphone => "microphone",
			TrackSource::ScreenShare => "screen_share",
			TrackSource::ScreenShareAudio => "screen_share_audio",
		}
	}
}

impl fmt::Display for TrackSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Errors for parsing identifiers from strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseIdError {
	#[error("empty value")]
	Empty,
	#[error("unknown track source: {0}")]
	UnknownSource(String),
}

impl FromStr for TrackSource {
	type Err = ParseIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let s = s.trim();
		if s.is_empty() {
			return Err(ParseIdError::Empty);
		}

		match s.to_ascii_lowercase().as_str() {
			"camera" | "cam" => Ok(TrackSource::Camera),
			"microphone" | "mic" => Ok(TrackSource::Microphone),
			"screen_share" | "screenshare" => Ok(TrackSource::ScreenShare),
			"screen_share_audio" | "screenshare_audio" => Ok(TrackSource::ScreenShareAudio),
			other => Err(ParseIdError::UnknownSource(other.to_string())),
		}
	}
}

/// Participant identity, unique within a conference room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantIdentity(String);

impl ParticipantIdentity {
	/// Create a non-empty `ParticipantIdentity`.
	pub fn new(id: impl Into<String>) -> Result<Self, ParseIdError> {
		let id = id.into();
		if id.trim().is_empty() {
			return Err(ParseIdError::Empty);
		}
		Ok(Self(id))
	}
	pub fn as_str(&self) -> &str {
		&self.0
	}
	pub fn into_string(self) -> String {
		self.0
	}
}

impl fmt::Display for ParticipantIdentity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl FromStr for ParticipantIdentity {
	type Err = ParseIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		ParticipantIdentity::new(s.to_string())
	}
}

/// Client-assigned chat message identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub uuid::Uuid);

impl MessageId {
	/// Create a new random message id.
	pub fn new_v4() -> Self {
		Self(uuid::Uuid::new_v4())
	}
}

impl fmt::Display for MessageId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Server-assigned identifier of a published track.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackSid(String);

impl TrackSid {
	/// Create a non-empty track sid.
	pub fn new(sid: impl Into<String>) -> Result<Self, ParseIdError> {
		let sid = sid.into();
		if sid.trim().is_empty() {
			return Err(ParseIdError::Empty);
		}
		Ok(Self(sid))
	}
	pub fn as_str(&self) -> &str {
		&self.0
	}
	pub fn into_string(self) -> String {
		self.0
	}
}

impl fmt::Display for TrackSid {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl FromStr for TrackSid {
	type Err = ParseIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		TrackSid::new(s.to_string())
	}
}

/// A single chat message. Immutable once created; timelines keep these in
/// arrival order and never rewrite them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
	pub id: MessageId,
	pub from: ParticipantIdentity,
	pub body: String,
	/// Unix milliseconds at creation time.
	pub timestamp_ms: i64,
}

impl ChatMessage {
	/// Create a message stamped with a fresh id and the current time.
	pub fn new(from: ParticipantIdentity, body: impl Into<String>) -> Self {
		Self::with_timestamp(from, body, unix_ms_now())
	}

	/// Create a message with an explicit timestamp (decoders, replays).
	pub fn with_timestamp(from: ParticipantIdentity, body: impl Into<String>, timestamp_ms: i64) -> Self {
		Self {
			id: MessageId::new_v4(),
			from,
			body: body.into(),
			timestamp_ms,
		}
	}
}

/// Server-side publication details for a track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackPublication {
	pub sid: TrackSid,
	/// Whether the local client currently receives media for this track.
	pub subscribed: bool,
}

impl TrackPublication {
	pub fn new(sid: TrackSid, subscribed: bool) -> Self {
		Self { sid, subscribed }
	}
}

/// Reference to a participant's track slot for a given source.
///
/// `Published` points at a live server-side publication; `Placeholder`
/// stands in for a participant that has not published the source yet, so
/// layouts can still reserve a tile for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackRef {
	Published {
		participant: ParticipantIdentity,
		source: TrackSource,
		publication: TrackPublication,
	},
	Placeholder {
		participant: ParticipantIdentity,
		source: TrackSource,
	},
}

impl TrackRef {
	pub fn published(participant: ParticipantIdentity, source: TrackSource, publication: TrackPublication) -> Self {
		TrackRef::Published { participant, source, publication }
	}

	pub fn placeholder(participant: ParticipantIdentity, source: TrackSource) -> Self {
		TrackRef::Placeholder { participant, source }
	}

	pub fn participant(&self) -> &ParticipantIdentity {
		match self {
			TrackRef::Published { participant, .. } | TrackRef::Placeholder { participant, .. } => participant,
		}
	}

	pub fn source(&self) -> TrackSource {
		match self {
			TrackRef::Published { source, .. } | TrackRef::Placeholder { source, .. } => *source,
		}
	}

	/// Publication details, `None` for placeholders.
	pub fn publication(&self) -> Option<&TrackPublication> {
		match self {
			TrackRef::Published { publication, .. } => Some(publication),
			TrackRef::Placeholder { .. } => None,
		}
	}

	pub fn sid(&self) -> Option<&TrackSid> {
		self.publication().map(|p| &p.sid)
	}

	pub fn is_placeholder(&self) -> bool {
		matches!(self, TrackRef::Placeholder { .. })
	}

	/// Placeholders are never subscribed.
	pub fn is_subscribed(&self) -> bool {
		self.publication().is_some_and(|p| p.subscribed)
	}

	/// Whether two references point at the same track slot.
	///
	/// Compares by sid when both sides are published, by participant and
	/// source otherwise. A placeholder never equals a published reference.
	pub fn same_track(&self, other: &TrackRef) -> bool {
		match (self.sid(), other.sid()) {
			(Some(a), Some(b)) => a == b,
			(None, None) => self.participant() == other.participant() && self.source() == other.source(),
			_ => false,
		}
	}
}

impl fmt::Display for TrackRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TrackRef::Published { participant, source, publication } => {
				write!(f, "{}/{} ({})", participant, source, publication.sid)
			}
			TrackRef::Placeholder { participant, source } => {
				write!(f, "{}/{} (placeholder)", participant, source)
			}
		}
	}
}
