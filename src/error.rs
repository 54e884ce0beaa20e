//! Error types shared by the sign-in controller, its collaborators, and startup wiring.

// self
use crate::{_prelude::*, idp::IdpError, store::StoreError};

/// Controller-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical failure raised by the sign-in, callback, and sign-out operations.
///
/// Every variant except [`Error::SessionDelete`] aborts the in-flight request and is rendered
/// by the error boundary as an HTTP 403 page.
#[derive(Debug, ThisError)]
pub enum Error {
	/// The callback arrived without the CSRF-state cookie set by `/signin`.
	#[error("Missing attempt context: cookie `{cookie}` is not present.")]
	MissingAttemptContext {
		/// Name of the absent cookie.
		cookie: &'static str,
	},
	/// The returned `state` parameter does not match the attempt cookie.
	#[error("CSRF validation failed: the returned state does not match the sign-in attempt.")]
	StateMismatch,
	/// The identity provider redirected back with an OAuth error instead of a code.
	#[error("Identity provider rejected the sign-in: {error}.")]
	ProviderDenied {
		/// OAuth `error` query value.
		error: String,
		/// OAuth `error_description` query value, when supplied.
		description: Option<String>,
	},
	/// Exchanging the authorization code failed.
	#[error("Token exchange failed.")]
	TokenExchange(#[source] IdpError),
	/// Fetching the authenticated user's attributes failed.
	#[error("User lookup failed.")]
	UserLookup(#[source] IdpError),
	/// The operating system RNG could not produce a CSRF state token.
	#[error("Could not generate a new sign-in state.")]
	StateGeneration {
		/// Underlying RNG failure.
		#[source]
		source: BoxError,
	},
	/// The operating system RNG could not produce a session identifier.
	#[error("Could not generate a new session id.")]
	SessionIdGeneration {
		/// Underlying RNG failure.
		#[source]
		source: BoxError,
	},
	/// Writing the new session record failed.
	#[error("Session store write failed.")]
	SessionPersist(#[source] StoreError),
	/// Deleting a session record failed; recovered locally during sign-out.
	#[error("Session store delete failed.")]
	SessionDelete(#[source] StoreError),
}
impl Error {
	/// Stable, user-safe label for the failure class.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::MissingAttemptContext { .. } => "missing_attempt_context",
			Self::StateMismatch => "state_mismatch",
			Self::ProviderDenied { .. } => "provider_denied",
			Self::TokenExchange(_) => "token_exchange_failed",
			Self::UserLookup(_) => "user_lookup_failed",
			Self::StateGeneration { .. } => "state_generation_failed",
			Self::SessionIdGeneration { .. } => "session_id_generation_failed",
			Self::SessionPersist(_) => "session_persist_failed",
			Self::SessionDelete(_) => "session_delete_failed",
		}
	}

	/// Short message that is safe to show to an end user.
	pub fn public_message(&self) -> &'static str {
		match self {
			Self::MissingAttemptContext { .. } | Self::StateMismatch =>
				"Your sign-in attempt expired or was not started here. Please sign in again.",
			Self::ProviderDenied { .. } => "The identity provider did not approve the sign-in.",
			Self::TokenExchange(_) | Self::UserLookup(_) =>
				"The identity provider could not complete the sign-in.",
			Self::StateGeneration { .. }
			| Self::SessionIdGeneration { .. }
			| Self::SessionPersist(_)
			| Self::SessionDelete(_) => "The sign-in service is temporarily unavailable.",
		}
	}

	/// Formats the error followed by every `source` in its causal chain.
	pub fn chain(&self) -> String {
		format_chain(self)
	}
}

/// Startup configuration failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required setting is absent or empty.
	#[error("Property `{name}` is not defined.")]
	Missing {
		/// Environment variable name.
		name: &'static str,
	},
	/// A setting could not be parsed.
	#[error("Property `{name}` is invalid: {reason}.")]
	Invalid {
		/// Environment variable name.
		name: &'static str,
		/// Human-readable parsing failure.
		reason: String,
	},
	/// A URL-valued setting could not be parsed.
	#[error("Property `{name}` is not a valid URL.")]
	InvalidUrl {
		/// Environment variable name.
		name: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A setting is neither defined nor published by the user pool.
	#[error("Property `{name}` is not defined and the user pool does not publish it.")]
	Unresolved {
		/// Environment variable name.
		name: &'static str,
	},
	/// No session store location is configured.
	#[error("One of `DDB_TABLE_NAME` or `SESSION_STORE_PATH` must be defined.")]
	NoSessionStore,
	/// Provider configuration failed validation.
	#[error(transparent)]
	Provider(#[from] crate::config::ProviderConfigError),
	/// The user pool could not be described.
	#[error("User pool metadata could not be resolved.")]
	PoolMetadata(#[from] crate::idp::PoolMetadataError),
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<reqwest::Error> for ConfigError {
	fn from(e: reqwest::Error) -> Self {
		Self::http_client_build(e)
	}
}

/// Joins an error and its sources with `": "`.
pub fn format_chain(err: &dyn StdError) -> String {
	let mut buf = err.to_string();
	let mut source = err.source();

	while let Some(cause) = source {
		buf.push_str(": ");
		buf.push_str(&cause.to_string());

		source = cause.source();
	}

	buf
}
