#![forbid(unsafe_code)]

use huddle_domain::{ParticipantIdentity, TrackPublication, TrackRef, TrackSid, TrackSource};
use tracing::debug;

/// One source slot a caller wants rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRequest {
	pub source: TrackSource,
	/// Emit a placeholder for participants without a live publication.
	pub with_placeholder: bool,
}

impl SourceRequest {
	pub fn new(source: TrackSource, with_placeholder: bool) -> Self {
		Self { source, with_placeholder }
	}
}

/// Publication and membership changes observed from the media session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackEvent {
	ParticipantJoined(ParticipantIdentity),
	ParticipantLeft(ParticipantIdentity),
	Published {
		participant: ParticipantIdentity,
		source: TrackSource,
		sid: TrackSid,
	},
	Unpublished {
		sid: TrackSid,
	},
	Subscribed {
		sid: TrackSid,
	},
	Unsubscribed {
		sid: TrackSid,
	},
}

/// Current track state of a conference, fed by `TrackEvent`s.
#[derive(Debug, Default, Clone)]
pub struct TrackRoster {
	participants: Vec<ParticipantIdentity>,
	publications: Vec<PublishedTrack>,
}

#[derive(Debug, Clone)]
struct PublishedTrack {
	participant: ParticipantIdentity,
	source: TrackSource,
	publication: TrackPublication,
}

impl TrackRoster {
	pub fn new() -> Self {
		Self::default()
	}

	/// Apply one observed change. Tracks start unsubscribed; duplicate
	/// publishes of a sid are ignored.
	pub fn apply(&mut self, event: TrackEvent) {
		match event {
			TrackEvent::ParticipantJoined(identity) => {
				if !self.participants.contains(&identity) {
					self.participants.push(identity);
				}
			}
			TrackEvent::ParticipantLeft(identity) => {
				self.participants.retain(|p| *p != identity);
				self.publications.retain(|t| t.participant != identity);
			}
			TrackEvent::Published { participant, source, sid } => {
				if self.publications.iter().any(|t| t.publication.sid == sid) {
					debug!(sid = %sid, "track roster: duplicate publish ignored");
					return;
				}
				if !self.participants.contains(&participant) {
					self.participants.push(participant.clone());
				}
				self.publications.push(PublishedTrack {
					participant,
					source,
					publication: TrackPublication::new(sid, false),
				});
			}
			TrackEvent::Unpublished { sid } => {
				self.publications.retain(|t| t.publication.sid != sid);
			}
			TrackEvent::Subscribed { sid } => self.set_subscribed(&sid, true),
			TrackEvent::Unsubscribed { sid } => self.set_subscribed(&sid, false),
		}
	}

	fn set_subscribed(&mut self, sid: &TrackSid, subscribed: bool) {
		if let Some(track) = self.publications.iter_mut().find(|t| t.publication.sid == *sid) {
			track.publication.subscribed = subscribed;
		}
	}

	/// Render the requested sources as track references, in participant
	/// join order, request order within a participant. A placeholder is
	/// emitted for a participant with no live publication of a source only
	/// when the request opts in.
	pub fn select(&self, requests: &[SourceRequest]) -> Vec<TrackRef> {
		let mut out = Vec::new();
		for participant in &self.participants {
			for request in requests {
				let mut found = false;
				for track in self
					.publications
					.iter()
					.filter(|t| t.participant == *participant && t.source == request.source)
				{
					found = true;
					out.push(TrackRef::published(track.participant.clone(), track.source, track.publication.clone()));
				}
				if !found && request.with_placeholder {
					out.push(TrackRef::placeholder(participant.clone(), request.source));
				}
			}
		}
		out
	}

	/// All live screen share references.
	pub fn screen_shares(&self) -> Vec<TrackRef> {
		self.select(&[SourceRequest::new(TrackSource::ScreenShare, false)])
	}

	pub fn participants(&self) -> &[ParticipantIdentity] {
		&self.participants
	}
}
