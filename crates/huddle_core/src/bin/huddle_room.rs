#![forbid(unsafe_code)]

use std::time::Duration;

use huddle_core::chat::{ChatConfig, ChatEvent, ChatTimeline, SendOutcome, start_chat};
use huddle_core::codec::{JsonCodec, TextCodec};
use huddle_core::identity::{StaticIdentity, participant_identity};
use huddle_core::layout::LayoutCoordinator;
use huddle_core::session::{LocalSession, LocalSessionConfig};
use huddle_core::tracks::{TrackEvent, TrackRoster};
use huddle_domain::{ParticipantIdentity, TrackSid, TrackSource};
use tracing::{info, warn};

fn usage_and_exit() -> ! {
	eprintln!(
		"Usage: huddle_room [--name NAME] [--peer NAME]... [--messages N] [--interval-ms MS] [--json]\n\
\n\
Options:\n\
	--name         Local participant name (default: you)\n\
	--peer         Add a scripted remote participant (repeatable; default: ana, marco)\n\
	--messages     Messages each peer sends (default: 6)\n\
	--interval-ms  Delay between scripted messages (default: 400)\n\
	--json         Use the legacy json payload codec\n\
	--help         Show this help\n\
\n\
Runs a loopback conference: scripted peers chat and share a screen while\n\
the local client tracks unread counts, chat visibility, and focus.\n"
	);
	std::process::exit(2)
}

fn init_tracing() {
	let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info,huddle_core=debug".to_string());
	tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

struct DemoArgs {
	name: String,
	peers: Vec<ParticipantIdentity>,
	messages: usize,
	interval: Duration,
	json: bool,
}

fn parse_args() -> DemoArgs {
	let mut name = "you".to_string();
	let mut peers: Vec<ParticipantIdentity> = Vec::new();
	let mut messages: usize = 6;
	let mut interval = Duration::from_millis(400);
	let mut json = false;

	let mut it = std::env::args().skip(1);
	while let Some(arg) = it.next() {
		match arg.as_str() {
			"--help" | "-h" => usage_and_exit(),
			"--name" => {
				let v = it.next().unwrap_or_else(|| usage_and_exit());
				if v.trim().is_empty() {
					eprintln!("--name must be non-empty");
					usage_and_exit();
				}
				name = v;
			}
			"--peer" => {
				let v = it.next().unwrap_or_else(|| usage_and_exit());
				let peer = ParticipantIdentity::new(v).unwrap_or_else(|e| {
					eprintln!("Invalid --peer value: {e}");
					usage_and_exit()
				});
				peers.push(peer);
			}
			"--messages" => {
				let v = it.next().unwrap_or_else(|| usage_and_exit());
				messages = v.parse().unwrap_or_else(|_| {
					eprintln!("Invalid --messages value: {v}");
					usage_and_exit()
				});
			}
			"--interval-ms" => {
				let v = it.next().unwrap_or_else(|| usage_and_exit());
				let ms: u64 = v.parse().unwrap_or_else(|_| {
					eprintln!("Invalid --interval-ms value: {v}");
					usage_and_exit()
				});
				interval = Duration::from_millis(ms);
			}
			"--json" => json = true,
			other => {
				eprintln!("Unknown argument: {other}");
				usage_and_exit();
			}
		}
	}

	if peers.is_empty() {
		peers.push(ParticipantIdentity::new("ana").expect("static identity"));
		peers.push(ParticipantIdentity::new("marco").expect("static identity"));
	}

	DemoArgs {
		name,
		peers,
		messages,
		interval,
		json,
	}
}

const SCRIPT_LINES: [&str; 6] = [
	"hey everyone",
	"can you see my screen?",
	"one sec",
	"ok it's up now",
	"looks good here",
	"wrapping up",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	init_tracing();
	let args = parse_args();

	let provider = StaticIdentity::authenticated(args.name.clone(), None);
	let Some(local_identity) = participant_identity(&provider) else {
		eprintln!("--name must form a valid identity");
		usage_and_exit();
	};

	let session = LocalSession::new(LocalSessionConfig::default());
	let chat_cfg = ChatConfig::default();

	let local_channel = session.join(local_identity.clone()).await;
	let (handle, mut events) = if args.json {
		start_chat(local_channel, JsonCodec, &chat_cfg)
	} else {
		start_chat(local_channel, TextCodec, &chat_cfg)
	};

	let (track_tx, mut track_rx) = tokio::sync::mpsc::channel::<TrackEvent>(16);
	let mut scripts = Vec::new();

	for (peer_idx, peer) in args.peers.iter().cloned().enumerate() {
		let channel = session.join(peer.clone()).await;
		let (peer_handle, _peer_events) = if args.json {
			start_chat(channel, JsonCodec, &chat_cfg)
		} else {
			start_chat(channel, TextCodec, &chat_cfg)
		};

		let interval = args.interval;
		let messages = args.messages;
		scripts.push(tokio::spawn(async move {
			for i in 0..messages {
				tokio::time::sleep(interval).await;
				let line = SCRIPT_LINES[i % SCRIPT_LINES.len()];
				if let Err(err) = peer_handle.send(line).await {
					warn!(peer = %peer, error = %err, "scripted send failed");
				}
			}
		}));

		// the first peer also runs a short screen share
		if peer_idx == 0 {
			let track_tx = track_tx.clone();
			let sharer = args.peers[0].clone();
			let sid = TrackSid::new("TR_demo_share").expect("static sid");
			scripts.push(tokio::spawn(async move {
				tokio::time::sleep(Duration::from_millis(500)).await;
				let _ = track_tx
					.send(TrackEvent::Published {
						participant: sharer,
						source: TrackSource::ScreenShare,
						sid: sid.clone(),
					})
					.await;
				tokio::time::sleep(Duration::from_millis(250)).await;
				let _ = track_tx.send(TrackEvent::Subscribed { sid: sid.clone() }).await;
				tokio::time::sleep(Duration::from_millis(2_000)).await;
				let _ = track_tx.send(TrackEvent::Unpublished { sid }).await;
			}));
		}
	}
	drop(track_tx);

	if let Ok(SendOutcome::EmptyInput) = handle.send("   ").await {
		info!("blank input ignored without touching the channel");
	}
	handle.send(format!("hi, {} here", args.name)).await?;

	let mut timeline = ChatTimeline::new(chat_cfg.history_limit);
	let mut coordinator = LayoutCoordinator::new();
	let mut roster = TrackRoster::new();
	for peer in &args.peers {
		roster.apply(TrackEvent::ParticipantJoined(peer.clone()));
	}

	let expected = args.peers.len() * args.messages + 1;
	let mut seen = 0usize;
	let mut track_done = false;

	let mut toggle = tokio::time::interval(Duration::from_millis(1_500));
	toggle.tick().await;

	loop {
		tokio::select! {
			event = events.recv() => {
				let Some(event) = event else { break };
				if let ChatEvent::Message(message) = &event {
					seen += 1;
					println!("{}: {}", message.from, message.body);
				}
				timeline.apply(event);
				coordinator.sync_unread(&timeline);
			}
			track = track_rx.recv(), if !track_done => {
				match track {
					Some(track_event) => {
						roster.apply(track_event);
						coordinator.sync_screen_shares(&roster.screen_shares());
						match coordinator.pin().focused() {
							Some(track) => info!(track = %track, "focus layout"),
							None => info!("grid layout"),
						}
					}
					None => track_done = true,
				}
			}
			_ = toggle.tick() => {
				coordinator.toggle_chat(&timeline);
				let widget = coordinator.widget();
				info!(
					show_chat = widget.show_chat,
					unread = widget.unread_messages,
					"chat panel toggled"
				);
			}
		}

		if seen >= expected && track_done {
			break;
		}
	}

	for script in scripts {
		let _ = script.await;
	}
	session.close().await;

	match handle.send("anyone still here?").await {
		Err(err) => warn!(error = %err, "send after close rejected"),
		Ok(outcome) => warn!(?outcome, "send unexpectedly succeeded after close"),
	}

	let widget = coordinator.widget();
	println!();
	println!(
		"--- transcript ({} messages, unread {}, chat {}) ---",
		timeline.len(),
		widget.unread_messages,
		if widget.show_chat { "open" } else { "closed" }
	);
	let base = timeline.iter().next().map(|m| m.timestamp_ms).unwrap_or_default();
	for (labels, message) in timeline.grouped() {
		let when = if labels.show_timestamp {
			format!("+{:>5.1}s", (message.timestamp_ms - base) as f64 / 1000.0)
		} else {
			" ".repeat(7)
		};
		let who = if labels.show_name { message.from.as_str() } else { "" };
		println!("{when} {who:>8}  {}", message.body);
	}

	Ok(())
}
