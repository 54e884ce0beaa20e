// crates.io
use axum::{
	body::{Body, to_bytes},
	http::{
		Request, StatusCode,
		header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
	},
	response::Response,
};
use httpmock::prelude::*;
use tower::ServiceExt;
// self
use monolith_auth::{
	_preludet::*,
	auth::{Session, SessionId},
	config::ErrorDetail,
	server,
	store::{SessionStore, StoreError, StoreFuture},
};

const TOKEN_BODY: &str =
	"{\"access_token\":\"access-1\",\"token_type\":\"bearer\",\"expires_in\":3600}";
const USER_BODY: &str =
	r#"{"Username":"alice","UserAttributes":[{"Name":"email","Value":"a@b.com"}]}"#;

struct FailingStore;
impl SessionStore for FailingStore {
	fn put(&self, _session: Session) -> StoreFuture<'_, ()> {
		Box::pin(async { Err(StoreError::Backend { message: "table unavailable".into() }) })
	}

	fn get<'a>(&'a self, _id: &'a SessionId) -> StoreFuture<'a, Option<Session>> {
		Box::pin(async { Ok(None) })
	}

	fn delete<'a>(&'a self, _id: &'a SessionId) -> StoreFuture<'a, bool> {
		Box::pin(async { Ok(false) })
	}
}

fn set_cookies(response: &Response) -> Vec<String> {
	response
		.headers()
		.get_all(SET_COOKIE)
		.iter()
		.filter_map(|value| value.to_str().ok().map(str::to_owned))
		.collect()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
	let mut builder = Request::get(uri);

	if let Some(cookie) = cookie {
		builder = builder.header(COOKIE, cookie);
	}

	builder.body(Body::empty()).expect("Request fixture should build.")
}

async fn body_text(response: Response) -> String {
	let bytes = to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Response body should be readable.");

	String::from_utf8(bytes.to_vec()).expect("Response body should be UTF-8.")
}

async fn mock_token(server: &MockServer) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await
}

async fn mock_user(server: &MockServer) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(POST).path("/");
			then.status(200).header("content-type", "application/x-amz-json-1.1").body(USER_BODY);
		})
		.await
}

#[tokio::test]
async fn health_reports_ok() {
	let (authenticator, _) = build_test_authenticator(test_settings("https://login.example.com"));
	let response = server::router(Arc::new(authenticator))
		.oneshot(get("/health", None))
		.await
		.expect("Router should answer.");

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn signin_redirects_with_state_cookie() {
	let (authenticator, _) = build_test_authenticator(test_settings("https://login.example.com"));
	let response = server::router(Arc::new(authenticator))
		.oneshot(get("/signin", None))
		.await
		.expect("Router should answer.");
	let location = response
		.headers()
		.get(LOCATION)
		.and_then(|value| value.to_str().ok())
		.expect("Redirect should carry a location.")
		.to_owned();
	let cookies = set_cookies(&response);

	assert_eq!(response.status(), StatusCode::FOUND);
	assert!(location.starts_with("https://login.example.com/login?response_type=code"));
	assert_eq!(cookies.len(), 1);
	assert!(cookies[0].starts_with("monolith-state="));
	assert!(cookies[0].contains("Domain=auth.example.com"));
	assert!(cookies[0].contains("Max-Age=300"));
	assert!(cookies[0].contains("Secure; HttpOnly; SameSite=Lax"));
}

#[tokio::test]
async fn forged_callback_renders_forbidden_page() {
	let (authenticator, store) = build_test_authenticator(test_settings("https://login.example.com"));
	let response = server::router(Arc::new(authenticator))
		.oneshot(get("/auth?code=c1&state=forged", Some("monolith-state=genuine")))
		.await
		.expect("Router should answer.");
	let cookies = set_cookies(&response);

	assert_eq!(response.status(), StatusCode::FORBIDDEN);
	assert!(
		response
			.headers()
			.get(CONTENT_TYPE)
			.and_then(|value| value.to_str().ok())
			.is_some_and(|value| value.starts_with("text/html"))
	);
	assert_eq!(cookies.len(), 1);
	assert!(cookies[0].starts_with("monolith-state=;"));
	assert!(cookies.iter().all(|cookie| !cookie.starts_with("monolith-session=")));
	assert!(body_text(response).await.contains("CSRF validation failed"));
	assert!(store.is_empty());
}

#[tokio::test]
async fn redacted_page_shows_generic_message() {
	let mut settings = test_settings("https://login.example.com");

	settings.error_detail = ErrorDetail::Redacted;

	let (authenticator, _) = build_test_authenticator(settings);
	let response = server::router(Arc::new(authenticator))
		.oneshot(get("/auth?code=c1&state=s1", None))
		.await
		.expect("Router should answer.");

	assert_eq!(response.status(), StatusCode::FORBIDDEN);

	let body = body_text(response).await;

	assert!(body.contains("Please sign in again."));
	assert!(!body.contains("monolith-state"));
}

#[tokio::test]
async fn callback_then_signout_round_trip() {
	let server = MockServer::start_async().await;
	let _token_mock = mock_token(&server).await;
	let _user_mock = mock_user(&server).await;
	let (authenticator, store) = build_test_authenticator(test_settings(&server.base_url()));
	let router = server::router(Arc::new(authenticator));
	let response = router
		.clone()
		.oneshot(get("/auth?code=c1&state=s1", Some("theme=dark; monolith-state=s1")))
		.await
		.expect("Router should answer.");
	let cookies = set_cookies(&response);

	assert_eq!(response.status(), StatusCode::FOUND);
	assert_eq!(
		response.headers().get(LOCATION).and_then(|value| value.to_str().ok()),
		Some(TEST_SUCCESS_REDIRECT)
	);
	assert_eq!(cookies.len(), 2);
	assert!(cookies[0].starts_with("monolith-state=;"));
	assert!(cookies[1].starts_with("monolith-session="));
	assert!(cookies[1].contains("Domain=example.com"));
	assert!(cookies[1].contains("Max-Age=3600"));
	assert_eq!(store.len(), 1);

	let session_cookie = cookies[1]
		.split(';')
		.next()
		.expect("Session cookie should have a name/value pair.")
		.to_owned();
	let response = router
		.oneshot(get("/signout", Some(&session_cookie)))
		.await
		.expect("Router should answer.");
	let cookies = set_cookies(&response);

	assert_eq!(response.status(), StatusCode::FOUND);
	assert_eq!(cookies.len(), 1);
	assert!(cookies[0].starts_with("monolith-session=;"));
	assert!(cookies[0].contains("Max-Age=0"));
	assert!(store.is_empty());
}

#[tokio::test]
async fn repeated_query_keys_fail_through_the_error_page() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\"}");
		})
		.await;
	let (authenticator, store) = build_test_authenticator(test_settings(&server.base_url()));
	let response = server::router(Arc::new(authenticator))
		.oneshot(get("/auth?code=c1&state=s1&state=s1", Some("monolith-state=s1")))
		.await
		.expect("Router should answer.");
	let cookies = set_cookies(&response);

	token_mock.assert_calls_async(1).await;

	assert_eq!(response.status(), StatusCode::FORBIDDEN);
	assert_eq!(cookies.len(), 1);
	assert!(cookies[0].starts_with("monolith-state=;"));
	assert!(body_text(response).await.contains("invalid_grant"));
	assert!(store.is_empty());
}

#[tokio::test]
async fn first_state_value_is_the_one_validated() {
	let server = MockServer::start_async().await;
	let token_mock = mock_token(&server).await;
	let (authenticator, store) = build_test_authenticator(test_settings(&server.base_url()));
	let response = server::router(Arc::new(authenticator))
		.oneshot(get("/auth?code=c1&state=forged&state=s1", Some("monolith-state=s1")))
		.await
		.expect("Router should answer.");
	let cookies = set_cookies(&response);

	token_mock.assert_calls_async(0).await;

	assert_eq!(response.status(), StatusCode::FORBIDDEN);
	assert_eq!(cookies.len(), 1);
	assert!(cookies[0].starts_with("monolith-state=;"));
	assert!(body_text(response).await.contains("CSRF validation failed"));
	assert!(store.is_empty());
}

#[tokio::test]
async fn persist_failure_renders_forbidden_without_session_cookie() {
	let server = MockServer::start_async().await;
	let _token_mock = mock_token(&server).await;
	let user_mock = mock_user(&server).await;
	let authenticator = build_test_authenticator_with_store(
		test_settings(&server.base_url()),
		Arc::new(FailingStore),
	);
	let response = server::router(Arc::new(authenticator))
		.oneshot(get("/auth?code=c1&state=s1", Some("monolith-state=s1")))
		.await
		.expect("Router should answer.");
	let cookies = set_cookies(&response);

	user_mock.assert_calls_async(1).await;

	assert_eq!(response.status(), StatusCode::FORBIDDEN);
	assert!(response.headers().get(LOCATION).is_none());
	assert_eq!(cookies.len(), 1);
	assert!(cookies[0].starts_with("monolith-state=;"));
	assert!(cookies.iter().all(|cookie| !cookie.starts_with("monolith-session=")));
	assert!(body_text(response).await.contains("table unavailable"));
}
