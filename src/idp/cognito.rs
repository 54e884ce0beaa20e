//! Managed user-pool adapter: `oauth2` code exchange plus the pool's `GetUser` API.

// crates.io
use oauth2::{
	AuthorizationCode, ClientId, ClientSecret as OAuthClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RedirectUrl, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicRequestTokenError},
};
use reqwest::{Error as ReqwestError, header::CONTENT_TYPE};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, UserProfile},
	config::ProviderConfig,
	error::ConfigError,
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot},
	idp::{IdentityProvider, IdpError, IdpFuture},
};

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

const TOKEN_ENDPOINT: &str = "token";
const USER_ENDPOINT: &str = "user";
const GET_USER_TARGET: &str = "AWSCognitoIdentityProviderService.GetUser";
const AMZ_JSON: &str = "application/x-amz-json-1.1";
const BODY_PREVIEW_LIMIT: usize = 256;

/// [`IdentityProvider`] backed by a managed user pool.
///
/// The code exchange authenticates with the client secret over HTTP Basic; the user lookup
/// posts the access token to the pool's `GetUser` action, which needs no request signing.
#[derive(Clone)]
pub struct CognitoIdentityProvider {
	oauth_client: ConfiguredBasicClient,
	http_client: ReqwestHttpClient,
	token_endpoint: Url,
	user_endpoint: Url,
}
impl CognitoIdentityProvider {
	/// Builds the adapter from the resolved provider configuration.
	pub fn new(
		config: ProviderConfig,
		http_client: ReqwestHttpClient,
	) -> Result<Self, ConfigError> {
		let token_url = TokenUrl::new(config.endpoints.token.to_string())
			.map_err(|source| ConfigError::InvalidUrl { name: "token endpoint", source })?;
		let redirect_url = RedirectUrl::new(config.redirect_url.to_string())
			.map_err(|source| ConfigError::InvalidUrl { name: "redirect url", source })?;
		let mut oauth_client = BasicClient::new(ClientId::new(config.client_id))
			.set_token_uri(token_url)
			.set_redirect_uri(redirect_url);

		if let Some(secret) = config.client_secret {
			oauth_client =
				oauth_client.set_client_secret(OAuthClientSecret::new(secret.expose().to_owned()));
		}

		Ok(Self {
			oauth_client,
			http_client,
			token_endpoint: config.endpoints.token,
			user_endpoint: config.endpoints.user,
		})
	}
}
impl IdentityProvider for CognitoIdentityProvider {
	fn exchange_code<'a>(&'a self, code: &'a str) -> IdpFuture<'a, AccessToken> {
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			if code.is_empty() {
				return Err(IdpError::MissingCode);
			}

			let handle = self.http_client.instrumented(meta.clone());
			let response = self
				.oauth_client
				.exchange_code(AuthorizationCode::new(code.to_owned()))
				.request_async(&handle)
				.await
				.map_err(|err| map_token_error(meta.take(), err))?;

			Ok(AccessToken::new(response.access_token().secret().to_owned()))
		})
	}

	fn fetch_user<'a>(&'a self, token: &'a AccessToken) -> IdpFuture<'a, UserProfile> {
		Box::pin(async move {
			let body = serde_json::to_vec(&GetUserRequest { access_token: token.expose() })
				.map_err(|source| IdpError::Encode { endpoint: USER_ENDPOINT, source })?;
			let response = self
				.http_client
				.post(self.user_endpoint.clone())
				.header(CONTENT_TYPE, AMZ_JSON)
				.header("x-amz-target", GET_USER_TARGET)
				.body(body)
				.send()
				.await
				.map_err(|err| map_reqwest_error(USER_ENDPOINT, err))?;
			let status = response.status();
			let bytes =
				response.bytes().await.map_err(|err| map_reqwest_error(USER_ENDPOINT, err))?;

			if !status.is_success() {
				return Err(IdpError::UserEndpoint {
					status: status.as_u16(),
					message: describe_error_body(&bytes),
				});
			}

			let mut de = serde_json::Deserializer::from_slice(&bytes);
			let user: GetUserResponse = serde_path_to_error::deserialize(&mut de)
				.map_err(|source| IdpError::UserResponseParse { source })?;

			Ok(user.into())
		})
	}
}
impl Debug for CognitoIdentityProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CognitoIdentityProvider")
			.field("token_endpoint", &self.token_endpoint.as_str())
			.field("user_endpoint", &self.user_endpoint.as_str())
			.finish()
	}
}

#[derive(Serialize)]
struct GetUserRequest<'a> {
	#[serde(rename = "AccessToken")]
	access_token: &'a str,
}

#[derive(Deserialize)]
struct GetUserResponse {
	#[serde(rename = "Username")]
	username: String,
	#[serde(rename = "UserAttributes", default)]
	user_attributes: Vec<UserAttribute>,
}
impl From<GetUserResponse> for UserProfile {
	fn from(value: GetUserResponse) -> Self {
		let attributes = value
			.user_attributes
			.into_iter()
			.filter_map(|attr| attr.value.map(|value| (attr.name, value)))
			.collect();

		Self { username: value.username, attributes }
	}
}

#[derive(Deserialize)]
struct UserAttribute {
	#[serde(rename = "Name")]
	name: String,
	#[serde(rename = "Value")]
	value: Option<String>,
}

#[derive(Deserialize)]
struct ServiceErrorBody {
	#[serde(rename = "__type")]
	kind: Option<String>,
	#[serde(alias = "Message")]
	message: Option<String>,
}

fn describe_error_body(bytes: &[u8]) -> String {
	if let Ok(body) = serde_json::from_slice::<ServiceErrorBody>(bytes) {
		match (body.kind, body.message) {
			(Some(kind), Some(message)) => return format!("{kind}: {message}"),
			(Some(kind), None) => return kind,
			(None, Some(message)) => return message,
			(None, None) => {},
		}
	}

	String::from_utf8_lossy(bytes).chars().take(BODY_PREVIEW_LIMIT).collect()
}

fn map_token_error(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> IdpError {
	let status = meta.and_then(|value| value.status);

	match err {
		RequestTokenError::ServerResponse(response) => IdpError::OAuth {
			error: response.error().as_ref().to_owned(),
			description: response.error_description().cloned(),
			status,
		},
		RequestTokenError::Request(HttpClientError::Reqwest(inner)) =>
			map_reqwest_error(TOKEN_ENDPOINT, *inner),
		RequestTokenError::Request(HttpClientError::Http(inner)) =>
			IdpError::Transport { endpoint: TOKEN_ENDPOINT, source: Box::new(inner) },
		RequestTokenError::Request(HttpClientError::Io(inner)) =>
			IdpError::Transport { endpoint: TOKEN_ENDPOINT, source: Box::new(inner) },
		RequestTokenError::Request(HttpClientError::Other(message)) =>
			IdpError::UnexpectedResponse { endpoint: TOKEN_ENDPOINT, message, status },
		RequestTokenError::Request(_) => IdpError::UnexpectedResponse {
			endpoint: TOKEN_ENDPOINT,
			message: "unknown HTTP client failure".into(),
			status,
		},
		RequestTokenError::Parse(source, _body) => IdpError::TokenResponseParse { source, status },
		RequestTokenError::Other(message) =>
			IdpError::UnexpectedResponse { endpoint: TOKEN_ENDPOINT, message, status },
	}
}

fn map_reqwest_error(endpoint: &'static str, err: ReqwestError) -> IdpError {
	if err.is_timeout() {
		IdpError::Timeout { endpoint }
	} else {
		IdpError::Transport { endpoint, source: Box::new(err) }
	}
}
