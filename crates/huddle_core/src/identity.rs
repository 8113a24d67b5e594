#![forbid(unsafe_code)]

use huddle_domain::ParticipantIdentity;

/// Authentication state of the identity capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
	Unauthenticated,
	Loading,
	Authenticated,
}

/// Profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
	pub name: String,
	pub image_url: Option<String>,
}

/// Read-only view onto the host application's identity system. The
/// authentication flow itself lives outside this crate.
pub trait IdentityProvider: Send + Sync {
	fn status(&self) -> AuthStatus;

	/// `None` until authentication resolves.
	fn profile(&self) -> Option<UserProfile>;
}

/// Fixed identity for demos and tests.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
	status: AuthStatus,
	profile: Option<UserProfile>,
}

impl StaticIdentity {
	pub fn authenticated(name: impl Into<String>, image_url: Option<String>) -> Self {
		Self {
			status: AuthStatus::Authenticated,
			profile: Some(UserProfile {
				name: name.into(),
				image_url,
			}),
		}
	}

	pub fn unauthenticated() -> Self {
		Self {
			status: AuthStatus::Unauthenticated,
			profile: None,
		}
	}
}

impl IdentityProvider for StaticIdentity {
	fn status(&self) -> AuthStatus {
		self.status
	}

	fn profile(&self) -> Option<UserProfile> {
		self.profile.clone()
	}
}

/// Participant identity for the resolved profile, `None` while signed out
/// or when the profile name is blank.
pub fn participant_identity(provider: &dyn IdentityProvider) -> Option<ParticipantIdentity> {
	provider.profile().and_then(|p| ParticipantIdentity::new(p.name).ok())
}
