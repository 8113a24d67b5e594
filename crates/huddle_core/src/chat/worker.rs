#![forbid(unsafe_code)]

use std::sync::Arc;

use huddle_domain::ChatMessage;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::ChatEvent;
use super::handle::{ChatCommand, SendError, SendOutcome};
use crate::codec::MessageCodec;
use crate::session::{ChannelError, SessionChannel};

struct SendDone {
	message: ChatMessage,
	result: Result<(), ChannelError>,
	resp: oneshot::Sender<Result<SendOutcome, SendError>>,
}

/// Chat worker loop.
///
/// Merges handle commands, inbound frames, and completions of in-flight
/// publishes. Each publish runs on its own task so a slow transmission
/// never stalls event processing; the channel itself serializes delivery.
pub(crate) async fn run_chat_worker<C, K>(
	channel: C,
	codec: K,
	mut cmd_rx: mpsc::Receiver<ChatCommand>,
	event_tx: mpsc::UnboundedSender<ChatEvent>,
) where
	C: SessionChannel,
	K: MessageCodec,
{
	let mut inbound = channel.subscribe().await;
	let channel = Arc::new(channel);
	let (done_tx, mut done_rx) = mpsc::unbounded_channel::<SendDone>();
	let mut in_flight: usize = 0;

	loop {
		tokio::select! {
			cmd = cmd_rx.recv() => {
				match cmd {
					Some(ChatCommand::Send { text, resp }) => {
						if !channel.is_ready() {
							let _ = resp.send(Err(SendError::ChannelUnavailable));
							continue;
						}

						let message = ChatMessage::new(channel.local_identity(), text);
						let payload = match codec.encode(&message) {
							Ok(payload) => payload,
							Err(err) => {
								let _ = resp.send(Err(SendError::TransmitFailed(err.to_string())));
								continue;
							}
						};

						in_flight += 1;
						if in_flight == 1 {
							let _ = event_tx.send(ChatEvent::SendStateChanged { sending: true });
						}

						let channel = Arc::clone(&channel);
						let done_tx = done_tx.clone();
						tokio::spawn(async move {
							let result = channel.publish(payload).await;
							let _ = done_tx.send(SendDone { message, result, resp });
						});
					}
					None => {
						debug!("chat worker: all handles dropped, stopping");
						break;
					}
				}
			}
			frame = inbound.recv() => {
				match frame {
					Some(frame) => match codec.decode(&frame) {
						Ok(message) => {
							let _ = event_tx.send(ChatEvent::Message(message));
						}
						Err(err) => {
							warn!(from = %frame.from, error = %err, "chat worker: dropping undecodable frame");
						}
					},
					None => {
						debug!("chat worker: inbound stream ended");
						let _ = event_tx.send(ChatEvent::Closed {
							reason: "session channel closed".to_string(),
						});
						break;
					}
				}
			}
			Some(done) = done_rx.recv() => {
				in_flight = in_flight.saturating_sub(1);

				let SendDone { message, result, resp } = done;
				match result {
					Ok(()) => {
						let _ = event_tx.send(ChatEvent::Message(message.clone()));
						let _ = resp.send(Ok(SendOutcome::Delivered(message)));
					}
					Err(err) => {
						debug!(error = %err, "chat worker: send failed");
						let mapped = match err {
							ChannelError::NotConnected => SendError::ChannelUnavailable,
							other => SendError::TransmitFailed(other.to_string()),
						};
						let _ = resp.send(Err(mapped));
					}
				}

				if in_flight == 0 {
					let _ = event_tx.send(ChatEvent::SendStateChanged { sending: false });
				}
			}
		}
	}
}
