//! Immutable identity-provider configuration and its validating builder.

// self
use crate::{
	_prelude::*,
	auth::ClientSecret,
	config::{InvalidScope, Scopes},
};

/// Errors raised while constructing or validating a [`ProviderConfig`].
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ProviderConfigError {
	/// The client identifier is empty.
	#[error("Client identifier cannot be empty.")]
	EmptyClientId,
	/// An endpoint was never supplied.
	#[error("Missing {endpoint} endpoint.")]
	MissingEndpoint {
		/// Which endpoint is missing.
		endpoint: &'static str,
	},
	/// The redirect URL was never supplied.
	#[error("Missing redirect URL.")]
	MissingRedirectUrl,
	/// Endpoints must be reachable over HTTP(S).
	#[error("The {endpoint} endpoint must use http or https: {url}.")]
	UnsupportedScheme {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// At least one scope must be requested.
	#[error("At least one scope must be requested.")]
	NoScopes,
	/// A requested scope is malformed.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] InvalidScope),
}

/// Endpoints exposed by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderEndpoints {
	/// Hosted login page that starts the authorization-code flow.
	pub authorization: Url,
	/// Token endpoint used for the code exchange.
	pub token: Url,
	/// User-attribute lookup endpoint.
	pub user: Url,
}

/// Client credentials and endpoints resolved once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderConfig {
	/// OAuth client identifier.
	pub client_id: String,
	/// Confidential client secret, sent with HTTP Basic auth on the token endpoint.
	pub client_secret: Option<ClientSecret>,
	/// Provider endpoints.
	pub endpoints: ProviderEndpoints,
	/// Callback URL registered with the provider (this service's `/auth` route).
	pub redirect_url: Url,
	/// Scopes requested at the authorization endpoint.
	pub scopes: Scopes,
}
impl ProviderConfig {
	/// Creates a new builder for the provided client identifier.
	pub fn builder(client_id: impl Into<String>) -> ProviderConfigBuilder {
		ProviderConfigBuilder::new(client_id)
	}

	/// Endpoints for a managed user pool served from `domain`, as `https://{domain}/login` and
	/// `https://{domain}/token`, plus the regional user-lookup API derived from `pool_id`.
	pub fn pool_endpoints(domain: &str, pool_id: &str) -> Result<ProviderEndpoints, url::ParseError> {
		let region = pool_region(pool_id);

		Ok(ProviderEndpoints {
			authorization: Url::parse(&format!("https://{domain}/login"))?,
			token: Url::parse(&format!("https://{domain}/token"))?,
			user: Url::parse(&format!("https://cognito-idp.{region}.amazonaws.com/"))?,
		})
	}
}

/// Builder for [`ProviderConfig`] values.
#[derive(Debug)]
pub struct ProviderConfigBuilder {
	client_id: String,
	client_secret: Option<ClientSecret>,
	authorization_endpoint: Option<Url>,
	token_endpoint: Option<Url>,
	user_endpoint: Option<Url>,
	redirect_url: Option<Url>,
	scopes: Vec<String>,
}
impl ProviderConfigBuilder {
	/// Creates a new builder seeded with the provided client identifier.
	pub fn new(client_id: impl Into<String>) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: None,
			authorization_endpoint: None,
			token_endpoint: None,
			user_endpoint: None,
			redirect_url: None,
			scopes: Vec::new(),
		}
	}

	/// Sets the confidential client secret.
	pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(ClientSecret::new(secret));

		self
	}

	/// Sets all three endpoints at once.
	pub fn endpoints(mut self, endpoints: ProviderEndpoints) -> Self {
		self.authorization_endpoint = Some(endpoints.authorization);
		self.token_endpoint = Some(endpoints.token);
		self.user_endpoint = Some(endpoints.user);

		self
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the user-lookup endpoint.
	pub fn user_endpoint(mut self, url: Url) -> Self {
		self.user_endpoint = Some(url);

		self
	}

	/// Sets the callback URL registered with the provider.
	pub fn redirect_url(mut self, url: Url) -> Self {
		self.redirect_url = Some(url);

		self
	}

	/// Replaces the requested scopes.
	pub fn scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes = scopes.into_iter().map(Into::into).collect();

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ProviderConfig, ProviderConfigError> {
		if self.client_id.trim().is_empty() {
			return Err(ProviderConfigError::EmptyClientId);
		}

		let authorization = self
			.authorization_endpoint
			.ok_or(ProviderConfigError::MissingEndpoint { endpoint: "authorization" })?;
		let token =
			self.token_endpoint.ok_or(ProviderConfigError::MissingEndpoint { endpoint: "token" })?;
		let user =
			self.user_endpoint.ok_or(ProviderConfigError::MissingEndpoint { endpoint: "user" })?;
		let redirect_url = self.redirect_url.ok_or(ProviderConfigError::MissingRedirectUrl)?;

		validate_endpoint("authorization", &authorization)?;
		validate_endpoint("token", &token)?;
		validate_endpoint("user", &user)?;
		validate_endpoint("redirect", &redirect_url)?;

		let scopes = Scopes::new(self.scopes)?;

		if scopes.is_empty() {
			return Err(ProviderConfigError::NoScopes);
		}

		Ok(ProviderConfig {
			client_id: self.client_id,
			client_secret: self.client_secret.filter(|secret| !secret.expose().is_empty()),
			endpoints: ProviderEndpoints { authorization, token, user },
			redirect_url,
			scopes,
		})
	}
}

/// Region prefix of a user-pool id (`eu-west-1` for `eu-west-1_AbCdEf`).
pub fn pool_region(pool_id: &str) -> &str {
	pool_id.split_once('_').map_or(pool_id, |(region, _)| region)
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderConfigError> {
	match url.scheme() {
		"https" | "http" => Ok(()),
		_ => Err(ProviderConfigError::UnsupportedScheme { endpoint: name, url: url.to_string() }),
	}
}
