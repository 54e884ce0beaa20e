//! Identity-provider boundary: the authorization-code exchange and the user-attribute lookup.
//!
//! The controller only sees [`IdentityProvider`]; it owns nothing durable and performs exactly
//! one network call per method invocation, with no retries.

pub mod cognito;
pub mod pool;

pub use cognito::*;
pub use pool::*;

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, UserProfile},
	error::BoxError,
};

/// Boxed future returned by [`IdentityProvider`] implementations.
pub type IdpFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, IdpError>> + 'a + Send>>;

/// Stateless request/response adapter for the identity provider.
pub trait IdentityProvider
where
	Self: Send + Sync,
{
	/// Exchanges an authorization code for an access token.
	fn exchange_code<'a>(&'a self, code: &'a str) -> IdpFuture<'a, AccessToken>;

	/// Fetches the attributes of the user that owns `token`.
	fn fetch_user<'a>(&'a self, token: &'a AccessToken) -> IdpFuture<'a, UserProfile>;
}

/// Failures raised by identity-provider calls.
#[derive(Debug, ThisError)]
pub enum IdpError {
	/// The callback did not carry an authorization code.
	#[error("Authorization code is missing from the callback.")]
	MissingCode,
	/// The token endpoint answered with an OAuth error document.
	#[error("Token endpoint returned an OAuth error: {}.", .description.as_deref().unwrap_or(.error))]
	OAuth {
		/// OAuth `error` field.
		error: String,
		/// OAuth `error_description` field, when supplied.
		description: Option<String>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// The token endpoint answered with something that is neither a token nor an OAuth error.
	#[error("{endpoint} endpoint returned an unexpected response: {message}.")]
	UnexpectedResponse {
		/// Endpoint label.
		endpoint: &'static str,
		/// Failure summary.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// The token endpoint answered with malformed JSON.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// The user endpoint rejected the lookup.
	#[error("User endpoint returned HTTP {status}: {message}.")]
	UserEndpoint {
		/// HTTP status code.
		status: u16,
		/// Provider-supplied message or body preview.
		message: String,
	},
	/// The user endpoint answered with malformed JSON.
	#[error("User endpoint returned malformed JSON.")]
	UserResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// A required user attribute is absent.
	#[error("User attribute `{name}` is missing.")]
	MissingAttribute {
		/// Attribute name.
		name: &'static str,
	},
	/// The request body could not be encoded.
	#[error("Could not encode the {endpoint} request.")]
	Encode {
		/// Endpoint label.
		endpoint: &'static str,
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
	/// The call did not complete within the upstream timeout.
	#[error("Request to the {endpoint} endpoint timed out.")]
	Timeout {
		/// Endpoint label.
		endpoint: &'static str,
	},
	/// Network failure (DNS, TCP, TLS, I/O).
	#[error("Network error occurred while calling the {endpoint} endpoint.")]
	Transport {
		/// Endpoint label.
		endpoint: &'static str,
		/// Transport-specific failure.
		#[source]
		source: BoxError,
	},
}
impl IdpError {
	/// HTTP status reported by the provider, when one arrived.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::OAuth { status, .. }
			| Self::UnexpectedResponse { status, .. }
			| Self::TokenResponseParse { status, .. } => *status,
			Self::UserEndpoint { status, .. } => Some(*status),
			_ => None,
		}
	}
}
