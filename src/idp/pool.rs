//! User-pool metadata: the hosted domain, client secret, and callback URL registered with the pool.
//!
//! Settings that are not supplied explicitly are read from here once at startup.

// crates.io
use aws_config::SdkConfig;
use aws_sdk_cognitoidentityprovider::{
	Client, Config as CognitoConfig, config::Region, error::DisplayErrorContext,
};
// self
use crate::{_prelude::*, config::pool_region};

/// Boxed future returned by [`PoolMetadata`] implementations.
pub type PoolFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, PoolMetadataError>> + 'a + Send>>;

/// Client settings published by the user pool. Fields the pool does not publish are `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolDetails {
	/// Host serving the hosted login and token endpoints.
	pub domain: Option<String>,
	/// Confidential client secret.
	pub client_secret: Option<String>,
	/// First callback URL registered for the client.
	pub callback_url: Option<String>,
}
impl PoolDetails {
	/// Returns true when every field is present.
	pub fn is_complete(&self) -> bool {
		self.domain.is_some() && self.client_secret.is_some() && self.callback_url.is_some()
	}

	/// Fills the fields missing from `self` with the ones from `fallback`.
	pub fn or(self, fallback: Self) -> Self {
		Self {
			domain: self.domain.or(fallback.domain),
			client_secret: self.client_secret.or(fallback.client_secret),
			callback_url: self.callback_url.or(fallback.callback_url),
		}
	}
}

/// Source of [`PoolDetails`].
pub trait PoolMetadata
where
	Self: Send + Sync,
{
	/// Describes the pool `pool_id` and its app client `client_id`.
	fn describe<'a>(&'a self, pool_id: &'a str, client_id: &'a str) -> PoolFuture<'a, PoolDetails>;
}

/// Failures raised while describing the user pool.
#[derive(Debug, ThisError)]
pub enum PoolMetadataError {
	/// The management API rejected or failed the request.
	#[error("User pool {operation} request failed: {message}.")]
	Request {
		/// Management operation name.
		operation: &'static str,
		/// Error context reported by the SDK.
		message: String,
	},
}

/// [`PoolMetadata`] backed by the managed user-pool API (`DescribeUserPool` and
/// `DescribeUserPoolClient`).
#[derive(Clone, Debug)]
pub struct CognitoPoolMetadata {
	config: CognitoConfig,
}
impl CognitoPoolMetadata {
	/// Uses the shared SDK configuration (credentials, region, endpoint overrides).
	pub fn new(sdk_config: &SdkConfig) -> Self {
		Self::from_conf(CognitoConfig::new(sdk_config))
	}

	/// Uses an explicit service configuration.
	pub fn from_conf(config: CognitoConfig) -> Self {
		Self { config }
	}

	fn client(&self, pool_id: &str) -> Client {
		let mut builder = self.config.to_builder();

		if self.config.region().is_none() {
			builder.set_region(Some(Region::new(pool_region(pool_id).to_owned())));
		}

		Client::from_conf(builder.build())
	}
}
impl PoolMetadata for CognitoPoolMetadata {
	fn describe<'a>(&'a self, pool_id: &'a str, client_id: &'a str) -> PoolFuture<'a, PoolDetails> {
		Box::pin(async move {
			let client = self.client(pool_id);
			let pool = client
				.describe_user_pool()
				.user_pool_id(pool_id)
				.send()
				.await
				.map_err(|e| PoolMetadataError::Request {
					operation: "DescribeUserPool",
					message: DisplayErrorContext(e).to_string(),
				})?;
			let app_client = client
				.describe_user_pool_client()
				.user_pool_id(pool_id)
				.client_id(client_id)
				.send()
				.await
				.map_err(|e| PoolMetadataError::Request {
					operation: "DescribeUserPoolClient",
					message: DisplayErrorContext(e).to_string(),
				})?;
			let domain = pool
				.user_pool()
				.and_then(|pool| pool.custom_domain().or(pool.domain()))
				.map(|domain| hosted_domain(domain, pool_region(pool_id)));
			let app_client = app_client.user_pool_client();
			let details = PoolDetails {
				domain,
				client_secret: app_client.and_then(|c| c.client_secret()).map(str::to_owned),
				callback_url: app_client
					.and_then(|c| c.callback_urls().first())
					.map(String::to_owned),
			};

			tracing::debug!(
				pool_id,
				domain = ?details.domain,
				client_secret_set = details.client_secret.is_some(),
				callback_url = ?details.callback_url,
				"user pool described"
			);

			Ok(details)
		})
	}
}

/// A bare domain prefix expands to the pool's default hosted domain in `region`.
fn hosted_domain(domain: &str, region: &str) -> String {
	if domain.contains('.') {
		domain.to_owned()
	} else {
		format!("{domain}.auth.{region}.amazoncognito.com")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn prefix_domain_expands_to_hosted_domain() {
		assert_eq!(
			hosted_domain("monolith", "eu-west-1"),
			"monolith.auth.eu-west-1.amazoncognito.com"
		);
		assert_eq!(hosted_domain("login.example.com", "eu-west-1"), "login.example.com");
	}

	#[test]
	fn explicit_fields_win_over_fallback() {
		let explicit =
			PoolDetails { domain: Some("login.example.com".into()), ..Default::default() };
		let merged = explicit.or(PoolDetails {
			domain: Some("ignored.example.com".into()),
			client_secret: Some("s3cr3t".into()),
			callback_url: None,
		});

		assert_eq!(merged.domain.as_deref(), Some("login.example.com"));
		assert_eq!(merged.client_secret.as_deref(), Some("s3cr3t"));
		assert!(!merged.is_complete());
	}
}
