//! Startup configuration resolved once from the process environment.
//!
//! [`Settings::from_env`] validates every required property before the server starts serving.
//! Client settings the environment leaves out are read from the user pool. The resulting value
//! is immutable and shared behind an `Arc` for the lifetime of the process.

pub mod provider;
pub mod scope;

pub use provider::*;
pub use scope::*;

// std
use std::{net::SocketAddr, path::PathBuf, str::FromStr};
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	idp::{PoolDetails, PoolMetadata},
};

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SCOPES: &str = "aws.cognito.signin.user.admin openid email";

/// Whether a signed-in user must carry an `email` attribute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmailPolicy {
	/// Missing email fails the callback as a user-lookup failure.
	#[default]
	Require,
	/// Missing email is stored as a null attribute.
	AllowMissing,
}

/// How much failure detail the error page shows to the browser.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorDetail {
	/// A short message per failure class; the causal chain is only logged.
	#[default]
	Redacted,
	/// The full causal chain, for internal-only deployments.
	Verbose,
}
impl FromStr for ErrorDetail {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"redacted" => Ok(Self::Redacted),
			"verbose" => Ok(Self::Verbose),
			other => Err(format!("expected `redacted` or `verbose`, got `{other}`")),
		}
	}
}

/// Where session records live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionStoreLocation {
	/// Managed key-value table, keyed by `sessionid`.
	Table(String),
	/// Local JSON snapshot, for development.
	File(PathBuf),
}

/// Immutable service configuration.
#[derive(Clone, Debug)]
pub struct Settings {
	/// Identity-provider credentials and endpoints.
	pub provider: ProviderConfig,
	/// User-pool identifier; its prefix names the region.
	pub pool_id: String,
	/// Session store backend.
	pub session_store: SessionStoreLocation,
	/// Where the browser lands after sign-in and sign-out.
	pub success_redirect: Url,
	/// Cookie domain for the CSRF state cookie.
	pub auth_domain: String,
	/// Cookie domain for the session cookie.
	pub protected_domain: String,
	/// Listen address for the HTTP server.
	pub bind_address: SocketAddr,
	/// Upper bound for each identity-provider and session-store call.
	pub upstream_timeout: StdDuration,
	/// Handling of users without an email attribute.
	pub email_policy: EmailPolicy,
	/// Error page verbosity.
	pub error_detail: ErrorDetail,
}
impl Settings {
	/// Resolves settings from the process environment, describing the user pool for any of
	/// `APP_CLIENT_SECRET`, `IDP_DOMAIN`, or `CALLBACK_URL` that are not set.
	pub async fn from_env(metadata: &dyn PoolMetadata) -> Result<Self, ConfigError> {
		Self::resolve(|name| std::env::var(name).ok(), metadata).await
	}

	/// Resolves settings through `lookup`, which maps a property name to its raw value.
	///
	/// Every environment property is validated before `metadata` is consulted, and the pool is
	/// described at most once.
	pub async fn resolve<F>(lookup: F, metadata: &dyn PoolMetadata) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let env = Lookup(lookup);
		let table = env.optional("DDB_TABLE_NAME");
		let path = env.optional("SESSION_STORE_PATH");
		let session_store = match (table, path) {
			(Some(table), None) => SessionStoreLocation::Table(table),
			(None, Some(path)) => SessionStoreLocation::File(PathBuf::from(path)),
			(Some(_), Some(_)) =>
				return Err(ConfigError::Invalid {
					name: "DDB_TABLE_NAME",
					reason: "cannot be combined with `SESSION_STORE_PATH`".into(),
				}),
			(None, None) => return Err(ConfigError::NoSessionStore),
		};
		let pool_id = env.required("USER_POOL_ID")?;
		let client_id = env.required("APP_CLIENT_ID")?;
		let success_redirect = env.required_url("SUCCESS_REDIRECT")?;
		let auth_domain = env.required("AUTH_DOMAIN_NAME")?;
		let protected_domain = env.required("PROTECTED_DOMAIN_NAME")?;
		let authorization_override = env.optional_url("IDP_AUTHORIZATION_ENDPOINT")?;
		let token_override = env.optional_url("IDP_TOKEN_ENDPOINT")?;
		let user_override = env.optional_url("IDP_USER_ENDPOINT")?;
		let scopes = env.optional("IDP_SCOPES").unwrap_or_else(|| DEFAULT_SCOPES.to_owned());
		let bind_address = env.parsed("BIND_ADDRESS", DEFAULT_BIND_ADDRESS)?;
		let timeout_secs: u64 =
			env.parsed("UPSTREAM_TIMEOUT_SECS", &DEFAULT_UPSTREAM_TIMEOUT_SECS.to_string())?;

		if timeout_secs == 0 {
			return Err(ConfigError::Invalid {
				name: "UPSTREAM_TIMEOUT_SECS",
				reason: "must be positive".into(),
			});
		}

		let require_email: bool = env.parsed("REQUIRE_EMAIL", "true")?;
		let error_detail = env.parsed("ERROR_DETAIL", "redacted")?;
		let mut pool = PoolDetails {
			domain: env.optional("IDP_DOMAIN"),
			client_secret: env.optional("APP_CLIENT_SECRET"),
			callback_url: env.optional("CALLBACK_URL"),
		};

		if !pool.is_complete() {
			pool = pool.or(metadata.describe(&pool_id, &client_id).await?);
		}

		let domain = pool.domain.ok_or(ConfigError::Unresolved { name: "IDP_DOMAIN" })?;
		let client_secret =
			pool.client_secret.ok_or(ConfigError::Unresolved { name: "APP_CLIENT_SECRET" })?;
		let callback_url =
			pool.callback_url.ok_or(ConfigError::Unresolved { name: "CALLBACK_URL" })?;
		let redirect_url = Url::parse(&callback_url)
			.map_err(|source| ConfigError::InvalidUrl { name: "CALLBACK_URL", source })?;
		let mut endpoints = ProviderConfig::pool_endpoints(&domain, &pool_id)
			.map_err(|source| ConfigError::InvalidUrl { name: "IDP_DOMAIN", source })?;

		if let Some(url) = authorization_override {
			endpoints.authorization = url;
		}
		if let Some(url) = token_override {
			endpoints.token = url;
		}
		if let Some(url) = user_override {
			endpoints.user = url;
		}

		let provider = ProviderConfig::builder(client_id)
			.client_secret(client_secret)
			.endpoints(endpoints)
			.redirect_url(redirect_url)
			.scopes(scopes.split_whitespace())
			.build()?;

		Ok(Self {
			provider,
			pool_id,
			session_store,
			success_redirect,
			auth_domain,
			protected_domain,
			bind_address,
			upstream_timeout: StdDuration::from_secs(timeout_secs),
			email_policy: if require_email { EmailPolicy::Require } else { EmailPolicy::AllowMissing },
			error_detail,
		})
	}

	/// Logs every non-secret property at `info`.
	pub fn log_summary(&self) {
		let (store_backend, store_location) = match &self.session_store {
			SessionStoreLocation::Table(table) => ("table", table.clone()),
			SessionStoreLocation::File(path) => ("file", path.display().to_string()),
		};

		tracing::info!(
			store_backend,
			store_location = %store_location,
			pool_id = %self.pool_id,
			client_id = %self.provider.client_id,
			client_secret_set = self.provider.client_secret.is_some(),
			authorization_endpoint = %self.provider.endpoints.authorization,
			token_endpoint = %self.provider.endpoints.token,
			user_endpoint = %self.provider.endpoints.user,
			redirect_url = %self.provider.redirect_url,
			scopes = %self.provider.scopes,
			success_redirect = %self.success_redirect,
			auth_domain = %self.auth_domain,
			protected_domain = %self.protected_domain,
			bind_address = %self.bind_address,
			upstream_timeout_secs = self.upstream_timeout.as_secs(),
			email_policy = ?self.email_policy,
			error_detail = ?self.error_detail,
			"configuration resolved"
		);
	}
}

struct Lookup<F>(F);
impl<F> Lookup<F>
where
	F: Fn(&str) -> Option<String>,
{
	fn optional(&self, name: &'static str) -> Option<String> {
		(self.0)(name).map(|value| value.trim().to_owned()).filter(|value| !value.is_empty())
	}

	fn required(&self, name: &'static str) -> Result<String, ConfigError> {
		self.optional(name).ok_or(ConfigError::Missing { name })
	}

	fn required_url(&self, name: &'static str) -> Result<Url, ConfigError> {
		Url::parse(&self.required(name)?).map_err(|source| ConfigError::InvalidUrl { name, source })
	}

	fn optional_url(&self, name: &'static str) -> Result<Option<Url>, ConfigError> {
		self.optional(name)
			.map(|raw| Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl { name, source }))
			.transpose()
	}

	fn parsed<T>(&self, name: &'static str, default: &str) -> Result<T, ConfigError>
	where
		T: FromStr,
		T::Err: Display,
	{
		let raw = self.optional(name).unwrap_or_else(|| default.to_owned());

		raw.parse().map_err(|e: T::Err| ConfigError::Invalid { name, reason: e.to_string() })
	}
}
