//! `GET /auth`: validate the attempt, exchange the code, and open a session.

// crates.io
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{Session, SessionId, state},
	config::EmailPolicy,
	cookie::SetCookie,
	flows::{Authenticator, FlowRedirect},
	idp::IdpError,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store,
};

/// Query parameters the identity provider appends to the callback URL.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackParams {
	/// Authorization code.
	pub code: Option<String>,
	/// Echoed CSRF state.
	pub state: Option<String>,
	/// OAuth error code, present when the provider refused the sign-in.
	pub error: Option<String>,
	/// Human-readable companion to `error`.
	pub error_description: Option<String>,
}
impl CallbackParams {
	/// Parses a raw query string, keeping the first value of each repeated key.
	///
	/// Unknown keys are ignored and a missing query yields empty parameters, so malformed
	/// callbacks still reach state validation instead of failing at extraction.
	pub fn from_query(query: Option<&str>) -> Self {
		let mut params = Self::default();

		for (key, value) in form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
			let slot = match &*key {
				"code" => &mut params.code,
				"state" => &mut params.state,
				"error" => &mut params.error,
				"error_description" => &mut params.error_description,
				_ => continue,
			};

			if slot.is_none() {
				*slot = Some(value.into_owned());
			}
		}

		params
	}
}

impl Authenticator {
	/// Completes a sign-in attempt.
	///
	/// Steps run in order and the first failure aborts the rest: state validation, code
	/// exchange, user lookup, session id generation, then the store write. Nothing already
	/// committed upstream is rolled back. On success the state cookie is cleared and the session
	/// cookie is issued on the protected domain.
	pub async fn complete_sign_in(
		&self,
		state_cookie: Option<&str>,
		params: CallbackParams,
	) -> Result<FlowRedirect> {
		const KIND: FlowKind = FlowKind::Callback;

		let span = FlowSpan::new(KIND, "complete_sign_in");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				state::validate_state(state_cookie, params.state.as_deref())?;

				if let Some(error) = params.error {
					let description = params.error_description;

					return Err(Error::ProviderDenied { error, description });
				}

				let code = params.code.unwrap_or_default();
				let token = self.provider.exchange_code(&code).await.map_err(Error::TokenExchange)?;
				let profile = self.provider.fetch_user(&token).await.map_err(Error::UserLookup)?;

				tracing::debug!(username = %profile.username, "user resolved");

				let email = match (profile.email(), self.settings.email_policy) {
					(Some(email), _) => Some(email.to_owned()),
					(None, EmailPolicy::AllowMissing) => None,
					(None, EmailPolicy::Require) =>
						return Err(Error::UserLookup(IdpError::MissingAttribute { name: "email" })),
				};
				let session_id = SessionId::generate()?;
				let session =
					Session { session_id: session_id.clone(), username: profile.username, email };

				store::with_timeout("put", self.settings.upstream_timeout, self.store.put(session))
					.await
					.map_err(Error::SessionPersist)?;

				tracing::info!("session created");

				Ok(FlowRedirect {
					location: self.settings.success_redirect.clone(),
					cookies: vec![
						SetCookie::clear_state(&self.settings.auth_domain),
						SetCookie::session(session_id, &self.settings.protected_domain),
					],
				})
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
