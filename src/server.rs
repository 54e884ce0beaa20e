//! HTTP surface: routes, redirect rendering, and the serve loop.

mod boundary;

// std
use std::io::Result as IoResult;
// crates.io
use axum::{
	Router,
	extract::{RawQuery, State},
	http::{
		HeaderMap, HeaderValue, StatusCode,
		header::{InvalidHeaderValue, LOCATION, SET_COOKIE},
	},
	response::{IntoResponse, Response},
	routing::get,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
// self
use crate::{
	_prelude::*,
	cookie::{self, SESSION_COOKIE_NAME, STATE_COOKIE_NAME},
	flows::{Authenticator, CallbackParams, FlowRedirect},
	obs::FlowKind,
};

/// Builds the router serving `/signin`, `/auth`, `/signout`, and `/health`.
pub fn router(authenticator: Arc<Authenticator>) -> Router {
	Router::new()
		.route("/signin", get(sign_in))
		.route("/auth", get(callback))
		.route("/signout", get(sign_out))
		.route("/health", get(health))
		.layer(TraceLayer::new_for_http())
		.with_state(authenticator)
}

/// Binds the configured address and serves until Ctrl+C or SIGTERM.
pub async fn serve(authenticator: Arc<Authenticator>) -> IoResult<()> {
	let addr = authenticator.settings().bind_address;
	let listener = TcpListener::bind(addr).await?;

	tracing::info!(addr = %listener.local_addr()?, "listening");

	axum::serve(listener, router(authenticator)).with_graceful_shutdown(shutdown_signal()).await?;

	tracing::info!("shutdown complete");

	Ok(())
}

async fn sign_in(State(authenticator): State<Arc<Authenticator>>) -> Response {
	match authenticator.begin_sign_in().await {
		Ok(outcome) => redirect(outcome),
		Err(e) => boundary::reject(&e, FlowKind::SignIn, authenticator.settings()),
	}
}

async fn callback(
	State(authenticator): State<Arc<Authenticator>>,
	RawQuery(query): RawQuery,
	headers: HeaderMap,
) -> Response {
	let state_cookie = cookie::read_cookie(&headers, STATE_COOKIE_NAME);
	let params = CallbackParams::from_query(query.as_deref());

	match authenticator.complete_sign_in(state_cookie.as_deref(), params).await {
		Ok(outcome) => redirect(outcome),
		Err(e) => boundary::reject(&e, FlowKind::Callback, authenticator.settings()),
	}
}

async fn sign_out(State(authenticator): State<Arc<Authenticator>>, headers: HeaderMap) -> Response {
	let session_cookie = cookie::read_cookie(&headers, SESSION_COOKIE_NAME);

	redirect(authenticator.sign_out(session_cookie.as_deref()).await)
}

async fn health() -> &'static str {
	"ok"
}

fn redirect(outcome: FlowRedirect) -> Response {
	match redirect_headers(&outcome) {
		Ok(headers) => (StatusCode::FOUND, headers).into_response(),
		Err(e) => {
			tracing::error!(error = %e, "redirect could not be encoded");

			StatusCode::INTERNAL_SERVER_ERROR.into_response()
		},
	}
}

fn redirect_headers(outcome: &FlowRedirect) -> Result<HeaderMap, InvalidHeaderValue> {
	let mut headers = HeaderMap::new();

	headers.insert(LOCATION, HeaderValue::from_str(outcome.location.as_str())?);

	for cookie in &outcome.cookies {
		headers.append(SET_COOKIE, HeaderValue::from_str(&cookie.to_string())?);
	}

	Ok(headers)
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = tokio::signal::ctrl_c().await {
			tracing::error!(error = %e, "failed to listen for Ctrl+C");
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut signal) => {
				signal.recv().await;
			},
			Err(e) => {
				tracing::error!(error = %e, "failed to listen for SIGTERM");
				std::future::pending::<()>().await;
			},
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		() = ctrl_c => {},
		() = terminate => {},
	}

	tracing::info!("shutdown signal received");
}
