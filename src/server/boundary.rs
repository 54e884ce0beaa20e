//! Error boundary shared by the sign-in and callback routes.

// crates.io
use axum::{
	http::{HeaderValue, StatusCode, header::SET_COOKIE},
	response::{Html, IntoResponse, Response},
};
// self
use crate::{
	_prelude::*,
	config::{ErrorDetail, Settings},
	cookie::SetCookie,
	obs::FlowKind,
};

const ERROR_PAGE: &str = include_str!("error.html");

/// Logs `err` with its full causal chain and renders the 403 page.
///
/// Callback failures also clear the state cookie, since an attempt is single-use.
pub(crate) fn reject(err: &Error, flow: FlowKind, settings: &Settings) -> Response {
	let chain = err.chain();

	if is_client_caused(err) {
		tracing::warn!(%flow, kind = err.kind(), error = %chain, "request rejected");
	} else {
		tracing::error!(%flow, kind = err.kind(), error = %chain, "request failed");
	}

	let message = match settings.error_detail {
		ErrorDetail::Verbose => chain,
		ErrorDetail::Redacted => err.public_message().to_owned(),
	};
	let mut response = (StatusCode::FORBIDDEN, render_page(&message)).into_response();

	if flow == FlowKind::Callback {
		let clear = SetCookie::clear_state(&settings.auth_domain).to_string();

		match HeaderValue::from_str(&clear) {
			Ok(value) => {
				response.headers_mut().append(SET_COOKIE, value);
			},
			Err(e) => {
				tracing::error!(error = %e, "state cookie could not be encoded");
			},
		}
	}

	response
}

fn is_client_caused(err: &Error) -> bool {
	matches!(
		err,
		Error::MissingAttemptContext { .. } | Error::StateMismatch | Error::ProviderDenied { .. }
	)
}

fn render_page(message: &str) -> Html<String> {
	Html(ERROR_PAGE.replace("{message}", &escape_html(message)))
}

fn escape_html(raw: &str) -> String {
	let mut escaped = String::with_capacity(raw.len());

	for c in raw.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&#x27;"),
			_ => escaped.push(c),
		}
	}

	escaped
}
