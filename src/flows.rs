//! Session lifecycle controller: the three browser-facing operations and the cookies they own.
//!
//! [`Authenticator`] holds the immutable [`Settings`], the identity-provider adapter, and the
//! session store. Each operation resolves to a [`FlowRedirect`]; failures surface as [`Error`]
//! and are rendered by the server's error boundary.

mod callback;
mod sign_in;
mod sign_out;

pub use callback::*;

// self
use crate::{
	_prelude::*,
	auth::{Session, SessionId},
	config::Settings,
	cookie::SetCookie,
	idp::IdentityProvider,
	store::{self, SessionStore, StoreError},
};

/// Redirect issued by a successful operation, with the cookie directives to attach.
#[derive(Clone, Debug)]
pub struct FlowRedirect {
	/// `Location` target of the 302.
	pub location: Url,
	/// `Set-Cookie` directives, in emission order.
	pub cookies: Vec<SetCookie>,
}

/// Orchestrates sign-in, callback, and sign-out against one identity provider and store.
#[derive(Clone)]
pub struct Authenticator {
	settings: Arc<Settings>,
	provider: Arc<dyn IdentityProvider>,
	store: Arc<dyn SessionStore>,
}
impl Authenticator {
	/// Wires the controller to its collaborators.
	pub fn new(
		settings: Arc<Settings>,
		provider: Arc<dyn IdentityProvider>,
		store: Arc<dyn SessionStore>,
	) -> Self {
		Self { settings, provider, store }
	}

	/// Resolved configuration.
	pub fn settings(&self) -> &Settings {
		&self.settings
	}

	/// Fetches the session stored under `id`, bounded by the upstream timeout.
	pub async fn lookup_session(&self, id: &SessionId) -> Result<Option<Session>, StoreError> {
		store::with_timeout("get", self.settings.upstream_timeout, self.store.get(id)).await
	}
}
impl Debug for Authenticator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Authenticator")
			.field("client_id", &self.settings.provider.client_id)
			.field("auth_domain", &self.settings.auth_domain)
			.field("protected_domain", &self.settings.protected_domain)
			.finish()
	}
}
