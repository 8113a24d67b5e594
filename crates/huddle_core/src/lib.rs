#![forbid(unsafe_code)]

pub mod chat;
pub mod codec;
pub mod identity;
pub mod layout;
pub mod session;
pub mod tracks;

pub use chat::{ChatConfig, ChatEvent, ChatHandle, ChatTimeline, MessageLabels, SendError, SendOutcome, start_chat};
pub use codec::{CodecError, JsonCodec, MessageCodec, TextCodec};
pub use identity::{AuthStatus, IdentityProvider, StaticIdentity, UserProfile};
pub use layout::{LayoutContext, LayoutCoordinator, PinAction, PinState, WidgetAction, WidgetState};
pub use session::{ChannelError, InboundFrame, LocalSession, LocalSessionConfig, SessionChannel};
pub use tracks::{SourceRequest, TrackEvent, TrackRoster};
