//! `monolith-auth` server binary.

// std
use std::sync::Arc;
// crates.io
use aws_config::BehaviorVersion;
use color_eyre::Result;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
// self
use monolith_auth::{
	config::{SessionStoreLocation, Settings, pool_region},
	flows::Authenticator,
	http::ReqwestHttpClient,
	idp::{CognitoIdentityProvider, CognitoPoolMetadata, IdentityProvider},
	server,
	store::{DynamoStore, FileStore, SessionStore},
};

const DEFAULT_LOG_FILTER: &str = "monolith_auth=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
		.with(fmt::layer())
		.init();

	let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
	let settings = Arc::new(Settings::from_env(&CognitoPoolMetadata::new(&sdk_config)).await?);

	settings.log_summary();

	let store: Arc<dyn SessionStore> = match &settings.session_store {
		SessionStoreLocation::Table(table) =>
			Arc::new(DynamoStore::new(&sdk_config, pool_region(&settings.pool_id), table.as_str())),
		SessionStoreLocation::File(path) => Arc::new(FileStore::open(path)?),
	};
	let http_client = ReqwestHttpClient::with_timeout(settings.upstream_timeout)?;
	let provider: Arc<dyn IdentityProvider> =
		Arc::new(CognitoIdentityProvider::new(settings.provider.clone(), http_client)?);
	let authenticator = Arc::new(Authenticator::new(settings, provider, store));

	server::serve(authenticator).await?;

	Ok(())
}
