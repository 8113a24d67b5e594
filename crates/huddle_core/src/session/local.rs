#![forbid(unsafe_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use huddle_domain::{ParticipantIdentity, unix_ms_now};
use tokio::sync::{Mutex, mpsc};
use tracing::debug;

use super::{ChannelError, InboundFrame, SessionChannel};

/// Configuration for `LocalSession`.
#[derive(Debug, Clone)]
pub struct LocalSessionConfig {
	/// Maximum number of queued frames per subscriber.
	pub subscriber_queue_capacity: usize,
}

impl Default for LocalSessionConfig {
	fn default() -> Self {
		Self {
			subscriber_queue_capacity: 256,
		}
	}
}

/// In-process loopback session.
///
/// Every joined participant's publishes fan out to all other participants'
/// subscribers. Demos and tests run on this; a real deployment implements
/// `SessionChannel` on top of the media SDK instead.
#[derive(Debug, Clone)]
pub struct LocalSession {
	inner: Arc<Mutex<Inner>>,
	closed: Arc<AtomicBool>,
	cfg: LocalSessionConfig,
}

#[derive(Debug, Default)]
struct Inner {
	members: Vec<Member>,
}

#[derive(Debug)]
struct Member {
	identity: ParticipantIdentity,
	subscribers: Vec<mpsc::Sender<InboundFrame>>,
}

impl LocalSession {
	pub fn new(cfg: LocalSessionConfig) -> Self {
		Self {
			inner: Arc::new(Mutex::new(Inner::default())),
			closed: Arc::new(AtomicBool::new(false)),
			cfg,
		}
	}

	/// Join the session under `identity`.
	pub async fn join(&self, identity: ParticipantIdentity) -> LocalParticipant {
		let mut inner = self.inner.lock().await;
		if !inner.members.iter().any(|m| m.identity == identity) {
			inner.members.push(Member {
				identity: identity.clone(),
				subscribers: Vec::new(),
			});
		}
		debug!(participant = %identity, members = inner.members.len(), "local session: joined");

		LocalParticipant {
			session: self.clone(),
			identity,
		}
	}

	/// Tear the session down. Subsequent publishes fail with `Closed` and
	/// every subscriber stream ends.
	pub async fn close(&self) {
		self.closed.store(true, Ordering::Relaxed);
		let mut inner = self.inner.lock().await;
		for member in &mut inner.members {
			member.subscribers.clear();
		}
		debug!("local session: closed");
	}

	async fn subscribe_as(&self, identity: &ParticipantIdentity) -> mpsc::Receiver<InboundFrame> {
		let (tx, rx) = mpsc::channel(self.cfg.subscriber_queue_capacity);

		let mut inner = self.inner.lock().await;
		if let Some(member) = inner.members.iter_mut().find(|m| m.identity == *identity) {
			prune_closed_subscribers(member);
			member.subscribers.push(tx);
			debug!(participant = %identity, subs = member.subscribers.len(), "local session: subscribed");
		}

		rx
	}

	async fn publish_from(&self, from: &ParticipantIdentity, payload: Bytes) -> Result<(), ChannelError> {
		if self.closed.load(Ordering::Relaxed) {
			return Err(ChannelError::Closed);
		}

		let frame = InboundFrame {
			from: from.clone(),
			timestamp_ms: unix_ms_now(),
			payload,
		};

		let mut inner = self.inner.lock().await;
		let mut dropped_total: u64 = 0;

		for member in inner.members.iter_mut().filter(|m| m.identity != *from) {
			prune_closed_subscribers(member);

			for sub in &member.subscribers {
				match sub.try_send(frame.clone()) {
					Ok(()) => {}
					Err(mpsc::error::TrySendError::Full(_)) => {
						dropped_total += 1;
					}
					Err(mpsc::error::TrySendError::Closed(_)) => {}
				}
			}

			prune_closed_subscribers(member);
		}

		if dropped_total > 0 {
			debug!(
				from = %frame.from,
				dropped = dropped_total,
				"local session: dropped frames due to full subscriber queues"
			);
		}

		Ok(())
	}
}

/// A joined participant's handle onto the loopback channel.
#[derive(Debug, Clone)]
pub struct LocalParticipant {
	session: LocalSession,
	identity: ParticipantIdentity,
}

#[async_trait::async_trait]
impl SessionChannel for LocalParticipant {
	fn local_identity(&self) -> ParticipantIdentity {
		self.identity.clone()
	}

	async fn subscribe(&self) -> mpsc::Receiver<InboundFrame> {
		self.session.subscribe_as(&self.identity).await
	}

	async fn publish(&self, payload: Bytes) -> Result<(), ChannelError> {
		self.session.publish_from(&self.identity, payload).await
	}

	fn is_ready(&self) -> bool {
		!self.session.closed.load(Ordering::Relaxed)
	}
}

fn prune_closed_subscribers(member: &mut Member) {
	member.subscribers.retain(|s| !s.is_closed());
}
