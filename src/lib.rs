//! OAuth 2.0 authorization-code login broker for an edge-served web property: CSRF-safe
//! sign-in attempts, code exchange, user lookup, and server-side sessions that the edge layer
//! consults on every request.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod cookie;
pub mod error;
pub mod flows;
pub mod http;
pub mod idp;
pub mod obs;
pub mod server;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::{EmailPolicy, ErrorDetail, ProviderConfig, SessionStoreLocation, Settings},
		flows::Authenticator,
		http::ReqwestHttpClient,
		idp::{CognitoIdentityProvider, IdentityProvider},
		store::{MemoryStore, SessionStore},
	};

	/// Client identifier used by test fixtures.
	pub const TEST_CLIENT_ID: &str = "client-it";
	/// Client secret used by test fixtures.
	pub const TEST_CLIENT_SECRET: &str = "secret-it";
	/// Auth domain used by test fixtures.
	pub const TEST_AUTH_DOMAIN: &str = "auth.example.com";
	/// User-pool id used by test fixtures.
	pub const TEST_POOL_ID: &str = "eu-west-1_TestPool";
	/// Protected domain used by test fixtures.
	pub const TEST_PROTECTED_DOMAIN: &str = "example.com";
	/// Post-login redirect used by test fixtures.
	pub const TEST_SUCCESS_REDIRECT: &str = "https://www.example.com/welcome";

	/// Builds a provider configuration whose endpoints live under `base` (usually an
	/// `httpmock` server URL).
	pub fn test_provider_config(base: &str) -> ProviderConfig {
		let endpoint = |path: &str| {
			Url::parse(&format!("{base}{path}")).expect("Mock endpoint URL should parse.")
		};

		ProviderConfig::builder(TEST_CLIENT_ID)
			.client_secret(TEST_CLIENT_SECRET)
			.authorization_endpoint(endpoint("/login"))
			.token_endpoint(endpoint("/token"))
			.user_endpoint(endpoint("/"))
			.redirect_url(
				Url::parse("https://auth.example.com/auth")
					.expect("Callback URL fixture should parse."),
			)
			.scopes(["aws.cognito.signin.user.admin", "openid", "email"])
			.build()
			.expect("Provider configuration fixture should build.")
	}

	/// Builds settings around [`test_provider_config`] with the default policies.
	pub fn test_settings(base: &str) -> Settings {
		Settings {
			provider: test_provider_config(base),
			pool_id: TEST_POOL_ID.into(),
			session_store: SessionStoreLocation::File(
				std::env::temp_dir().join("monolith-auth-test-sessions.json"),
			),
			success_redirect: Url::parse(TEST_SUCCESS_REDIRECT)
				.expect("Success redirect fixture should parse."),
			auth_domain: TEST_AUTH_DOMAIN.into(),
			protected_domain: TEST_PROTECTED_DOMAIN.into(),
			bind_address: "127.0.0.1:0".parse().expect("Bind address fixture should parse."),
			upstream_timeout: StdDuration::from_secs(5),
			email_policy: EmailPolicy::Require,
			error_detail: ErrorDetail::Verbose,
		}
	}

	/// Builds an [`Authenticator`] that talks to the mock provider at `base` and keeps sessions
	/// in memory.
	pub fn build_test_authenticator(settings: Settings) -> (Authenticator, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());

		(build_test_authenticator_with_store(settings, store_backend.clone()), store_backend)
	}

	/// Same as [`build_test_authenticator`], with a caller-supplied session store.
	pub fn build_test_authenticator_with_store(
		settings: Settings,
		store: Arc<dyn SessionStore>,
	) -> Authenticator {
		let http_client = ReqwestHttpClient::with_timeout(settings.upstream_timeout)
			.expect("Reqwest client fixture should build.");
		let provider: Arc<dyn IdentityProvider> = Arc::new(
			CognitoIdentityProvider::new(settings.provider.clone(), http_client)
				.expect("Identity provider fixture should build."),
		);

		Authenticator::new(Arc::new(settings), provider, store)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::Duration;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use url;
// Used by the `monolith-auth` binary only.
use {color_eyre as _, tracing_subscriber as _};
#[cfg(test)] use {httpmock as _, monolith_auth as _, tower as _};
