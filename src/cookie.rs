//! `Set-Cookie` rendering and request cookie extraction for the state and session cookies.

// crates.io
use axum::http::{HeaderMap, header::COOKIE};
// self
use crate::_prelude::*;

/// Cookie carrying the CSRF state of an in-flight sign-in attempt.
pub const STATE_COOKIE_NAME: &str = "monolith-state";
/// Cookie carrying the opaque session identifier.
pub const SESSION_COOKIE_NAME: &str = "monolith-session";
/// Lifetime of a sign-in attempt.
pub const STATE_COOKIE_MAX_AGE: Duration = Duration::seconds(300);
/// Lifetime of a browser session.
pub const SESSION_COOKIE_MAX_AGE: Duration = Duration::seconds(3600);

/// A single `Set-Cookie` directive.
///
/// Both cookies issued by this service are `Secure`, `HttpOnly`, `SameSite=Lax`, and scoped to
/// `Path=/` on an explicit domain.
#[derive(Clone, PartialEq, Eq)]
pub struct SetCookie {
	/// Cookie name.
	pub name: &'static str,
	/// Cookie value; empty when clearing.
	pub value: String,
	/// `Domain` attribute.
	pub domain: String,
	/// `Max-Age` attribute; zero or negative clears the cookie.
	pub max_age: Duration,
}
impl SetCookie {
	/// Issues the CSRF state cookie.
	pub fn state(value: impl Into<String>, domain: impl Into<String>) -> Self {
		Self::new(STATE_COOKIE_NAME, value.into(), domain.into(), STATE_COOKIE_MAX_AGE)
	}

	/// Clears the CSRF state cookie.
	pub fn clear_state(domain: impl Into<String>) -> Self {
		Self::new(STATE_COOKIE_NAME, String::new(), domain.into(), Duration::ZERO)
	}

	/// Issues the session cookie.
	pub fn session(value: impl Into<String>, domain: impl Into<String>) -> Self {
		Self::new(SESSION_COOKIE_NAME, value.into(), domain.into(), SESSION_COOKIE_MAX_AGE)
	}

	/// Clears the session cookie.
	pub fn clear_session(domain: impl Into<String>) -> Self {
		Self::new(SESSION_COOKIE_NAME, String::new(), domain.into(), Duration::ZERO)
	}

	/// Returns true when the directive removes the cookie.
	pub fn is_clearing(&self) -> bool {
		!self.max_age.is_positive()
	}

	fn new(name: &'static str, value: String, domain: String, max_age: Duration) -> Self {
		Self { name, value, domain, max_age }
	}
}
impl Display for SetCookie {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let max_age = self.max_age.whole_seconds().max(0);

		write!(
			f,
			"{}={}; Domain={}; Path=/; Max-Age={max_age}; Secure; HttpOnly; SameSite=Lax",
			self.name,
			self.value,
			self.domain
		)
	}
}
impl Debug for SetCookie {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SetCookie")
			.field("name", &self.name)
			.field("domain", &self.domain)
			.field("max_age", &self.max_age.whole_seconds())
			.finish()
	}
}

/// Returns the first value of cookie `name` across every `Cookie` header.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
	headers
		.get_all(COOKIE)
		.iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(|raw| raw.split(';'))
		.filter_map(|pair| pair.trim().split_once('='))
		.find(|(key, _)| *key == name)
		.map(|(_, value)| value.trim().trim_matches('"').to_owned())
}
