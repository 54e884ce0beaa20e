//! `GET /signout`: best-effort session teardown.

// self
use crate::{
	_prelude::*,
	auth::SessionId,
	cookie::SetCookie,
	flows::{Authenticator, FlowRedirect},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store,
};

impl Authenticator {
	/// Ends the caller's session.
	///
	/// A present, well-formed session cookie triggers one delete against the store. A failed
	/// delete is logged as [`Error::SessionDelete`] and swallowed; the session cookie is cleared
	/// and the browser is redirected either way.
	pub async fn sign_out(&self, session_cookie: Option<&str>) -> FlowRedirect {
		const KIND: FlowKind = FlowKind::SignOut;

		let span = FlowSpan::new(KIND, "sign_out");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let deleted = span
			.instrument(async move {
				let Some(raw) = session_cookie.filter(|value| !value.is_empty()) else {
					return true;
				};
				let id = match SessionId::new(raw) {
					Ok(id) => id,
					Err(e) => {
						tracing::debug!(error = %e, "ignoring malformed session cookie");

						return true;
					},
				};

				match store::with_timeout(
					"delete",
					self.settings.upstream_timeout,
					self.store.delete(&id),
				)
				.await
				{
					Ok(existed) => {
						tracing::info!(existed, "session deleted");

						true
					},
					Err(e) => {
						let err = Error::SessionDelete(e);

						tracing::warn!(kind = err.kind(), error = %err.chain(), "session delete failed");

						false
					},
				}
			})
			.await;

		obs::record_flow_outcome(
			KIND,
			if deleted { FlowOutcome::Success } else { FlowOutcome::Failure },
		);

		FlowRedirect {
			location: self.settings.success_redirect.clone(),
			cookies: vec![SetCookie::clear_session(&self.settings.protected_domain)],
		}
	}
}
