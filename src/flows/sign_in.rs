//! `GET /signin`: issue a CSRF state and send the browser to the provider's login page.

// self
use crate::{
	_prelude::*,
	auth::StateToken,
	config::ProviderConfig,
	cookie::SetCookie,
	flows::{Authenticator, FlowRedirect},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl Authenticator {
	/// Starts a sign-in attempt.
	///
	/// The only side effect is the `monolith-state` cookie on the auth domain; the session store
	/// is not touched.
	pub async fn begin_sign_in(&self) -> Result<FlowRedirect> {
		const KIND: FlowKind = FlowKind::SignIn;

		let span = FlowSpan::new(KIND, "begin_sign_in");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let state = StateToken::generate()?;
				let location = build_authorize_url(&self.settings.provider, state.as_str());

				tracing::debug!(authorize_url = %location, "redirecting to identity provider");

				Ok(FlowRedirect {
					location,
					cookies: vec![SetCookie::state(state.as_str(), &self.settings.auth_domain)],
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

fn build_authorize_url(config: &ProviderConfig, state: &str) -> Url {
	let mut url = config.endpoints.authorization.clone();
	let mut pairs = url.query_pairs_mut();

	pairs.append_pair("response_type", "code");
	pairs.append_pair("client_id", &config.client_id);
	pairs.append_pair("redirect_uri", config.redirect_url.as_str());

	if !config.scopes.is_empty() {
		pairs.append_pair("scope", &config.scopes.to_param());
	}

	pairs.append_pair("state", state);

	drop(pairs);

	url
}
