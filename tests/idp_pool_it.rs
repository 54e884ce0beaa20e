// crates.io
use aws_sdk_cognitoidentityprovider::{
	Config,
	config::{BehaviorVersion, Credentials, Region},
};
use httpmock::prelude::*;
// self
use monolith_auth::idp::{CognitoPoolMetadata, PoolDetails, PoolMetadata, PoolMetadataError};

const POOL_ID: &str = "eu-west-1_AbCdEf";
const CLIENT_ID: &str = "client-123";
const AMZ_JSON: &str = "application/x-amz-json-1.1";

fn metadata(server: &MockServer) -> CognitoPoolMetadata {
	CognitoPoolMetadata::from_conf(
		Config::builder()
			.behavior_version(BehaviorVersion::latest())
			.region(Region::new("eu-west-1"))
			.credentials_provider(Credentials::new("AKIDTEST", "secret-test", None, None, "fixture"))
			.endpoint_url(server.base_url())
			.build(),
	)
}

async fn mock_client(server: &MockServer) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/")
				.header("x-amz-target", "AWSCognitoIdentityProviderService.DescribeUserPoolClient")
				.json_body_includes(format!(
					r#"{{ "UserPoolId": "{POOL_ID}", "ClientId": "{CLIENT_ID}" }}"#
				));
			then.status(200).header("content-type", AMZ_JSON).body(
				r#"{"UserPoolClient":{
					"UserPoolId":"eu-west-1_AbCdEf",
					"ClientId":"client-123",
					"ClientSecret":"pool-secret",
					"CallbackURLs":["https://auth.example.com/auth","https://auth.example.com/other"]
				}}"#,
			);
		})
		.await
}

#[tokio::test]
async fn describes_domain_secret_and_first_callback() {
	let server = MockServer::start_async().await;
	let pool_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/")
				.header("x-amz-target", "AWSCognitoIdentityProviderService.DescribeUserPool")
				.json_body_includes(format!(r#"{{ "UserPoolId": "{POOL_ID}" }}"#));
			then.status(200)
				.header("content-type", AMZ_JSON)
				.body(r#"{"UserPool":{"Id":"eu-west-1_AbCdEf","Domain":"login.example.com"}}"#);
		})
		.await;
	let client_mock = mock_client(&server).await;
	let details = metadata(&server)
		.describe(POOL_ID, CLIENT_ID)
		.await
		.expect("Describing the pool should succeed.");

	pool_mock.assert_calls_async(1).await;
	client_mock.assert_calls_async(1).await;

	assert_eq!(
		details,
		PoolDetails {
			domain: Some("login.example.com".into()),
			client_secret: Some("pool-secret".into()),
			callback_url: Some("https://auth.example.com/auth".into()),
		}
	);
}

#[tokio::test]
async fn domain_prefix_expands_to_hosted_domain() {
	let server = MockServer::start_async().await;
	let _pool_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/")
				.header("x-amz-target", "AWSCognitoIdentityProviderService.DescribeUserPool");
			then.status(200)
				.header("content-type", AMZ_JSON)
				.body(r#"{"UserPool":{"Id":"eu-west-1_AbCdEf","Domain":"monolith"}}"#);
		})
		.await;
	let _client_mock = mock_client(&server).await;
	let details = metadata(&server)
		.describe(POOL_ID, CLIENT_ID)
		.await
		.expect("Describing the pool should succeed.");

	assert_eq!(details.domain.as_deref(), Some("monolith.auth.eu-west-1.amazoncognito.com"));
}

#[tokio::test]
async fn unknown_pool_is_request_failure() {
	let server = MockServer::start_async().await;
	let _pool_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/")
				.header("x-amz-target", "AWSCognitoIdentityProviderService.DescribeUserPool");
			then.status(400).header("content-type", AMZ_JSON).body(
				r#"{"__type":"ResourceNotFoundException","message":"User pool eu-west-1_AbCdEf does not exist."}"#,
			);
		})
		.await;
	let client_mock = mock_client(&server).await;
	let err = metadata(&server)
		.describe(POOL_ID, CLIENT_ID)
		.await
		.expect_err("Unknown pool should fail.");

	client_mock.assert_calls_async(0).await;

	let PoolMetadataError::Request { operation, message } = err;

	assert_eq!(operation, "DescribeUserPool");
	assert!(message.contains("ResourceNotFoundException"));
}
