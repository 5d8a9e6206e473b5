mod common;

// crates.io
use serde::Deserialize;
// self
use common::{BASIC_AUTH, ScriptedTransport, TOKEN_URI};
use oauth2_orchestrator::{
	auth::{Subject, UserId},
	error::{Error, TransportError},
	oauth::oauth2::http::Method,
	orchestrator::Reply,
	request::ResourceRequest,
	store::{MemoryStore, TokenStore},
};

#[derive(Debug, Deserialize)]
struct Profile {
	id: u64,
	name: String,
}

#[tokio::test]
async fn cached_client_token_needs_a_single_call() {
	let store = MemoryStore::default();

	common::seed(&store, common::token("cached", None, None)).await;

	let (orchestrator, transport) =
		common::orchestrator(ScriptedTransport::default().respond(200, r#"{"ok":true}"#), &store);
	let reply = orchestrator
		.send(ResourceRequest::client(Method::GET, "/status"))
		.await
		.expect("Resource call should succeed.");

	assert_eq!(reply, Reply::Document(serde_json::json!({ "ok": true })));
	assert_eq!(orchestrator.base_url().as_str(), "https://api.example.com/v1/");

	let calls = transport.calls();

	assert_eq!(calls.len(), 1);
	assert_eq!(calls[0].uri, "https://api.example.com/v1/status");
	assert_eq!(calls[0].method, "GET");
	assert_eq!(calls[0].bearer(), Some("cached"));
}

#[tokio::test]
async fn cached_user_token_needs_a_single_call() {
	let store = MemoryStore::default();
	let user = UserId::new(42);

	common::seed(&store, common::token("user-42", None, Some(user))).await;

	let (orchestrator, transport) = common::orchestrator(
		ScriptedTransport::default().respond(200, r#"{"id":42,"name":"ada"}"#),
		&store,
	);
	let profile: Profile = orchestrator
		.send_as(ResourceRequest::user(user, Method::GET, "users/me"))
		.await
		.expect("Typed resource call should succeed.");

	assert_eq!(profile.id, 42);
	assert_eq!(profile.name, "ada");

	let calls = transport.calls();

	assert_eq!(calls.len(), 1);
	assert_eq!(calls[0].bearer(), Some("user-42"));
}

#[tokio::test]
async fn missing_client_token_is_acquired_before_the_call() {
	let store = MemoryStore::default();
	let (orchestrator, transport) = common::orchestrator(
		ScriptedTransport::default()
			.respond(200, common::token_body("fresh", None))
			.respond(200, r#"{"ok":true}"#),
		&store,
	);

	orchestrator
		.send(ResourceRequest::client(Method::GET, "/status"))
		.await
		.expect("Resource call should succeed after acquisition.");

	let calls = transport.calls();

	assert_eq!(calls.len(), 2);
	assert_eq!(calls[0].uri, TOKEN_URI);
	assert_eq!(calls[0].method, "POST");
	assert_eq!(calls[0].authorization.as_deref(), Some(BASIC_AUTH));
	assert_eq!(calls[0].body, "grant_type=client_credentials");
	assert_eq!(calls[1].bearer(), Some("fresh"));

	let client = common::config().name().clone();
	let stored = store
		.load_client_token(&client)
		.await
		.expect("Store lookup should succeed.")
		.expect("Acquired token should be persisted.");

	assert_eq!(stored.access_token().expose(), "fresh");
}

#[tokio::test]
async fn missing_user_token_requires_authentication_without_calls() {
	let store = MemoryStore::default();
	let (orchestrator, transport) = common::orchestrator(ScriptedTransport::default(), &store);
	let err = orchestrator
		.send(ResourceRequest::user(UserId::new(7), Method::GET, "users/me"))
		.await
		.expect_err("Unknown users must authenticate first.");

	assert!(matches!(err, Error::UserAuthenticationRequired { user_id } if user_id == UserId::new(7)));
	assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn unauthorized_once_refreshes_and_retries() {
	let store = MemoryStore::default();

	common::seed(&store, common::token("stale", Some("r1"), None)).await;

	let (orchestrator, transport) = common::orchestrator(
		ScriptedTransport::default()
			.respond(401, "expired")
			.respond(200, common::token_body("renewed", Some("r2")))
			.respond(200, r#"{"ok":true}"#),
		&store,
	);
	let reply = orchestrator
		.send(ResourceRequest::client(Method::GET, "/status"))
		.await
		.expect("Retry after refresh should succeed.");

	assert_eq!(reply.into_document(), Some(serde_json::json!({ "ok": true })));

	let calls = transport.calls();

	assert_eq!(calls.len(), 3);
	assert_eq!(calls[0].bearer(), Some("stale"));
	assert!(calls[1].is_token_call());
	assert_eq!(calls[1].authorization.as_deref(), Some(BASIC_AUTH));
	assert_eq!(calls[1].body, "grant_type=refresh_token&refresh_token=r1");
	assert_eq!(calls[2].bearer(), Some("renewed"));
	assert_eq!(orchestrator.retry_metrics.unauthorized(), 1);
	assert_eq!(orchestrator.retry_metrics.refreshes(), 1);

	let cached = orchestrator
		.client_token()
		.await
		.expect("Cache lookup should succeed.")
		.expect("Refreshed token should be cached.");

	assert_eq!(cached.access_token().expose(), "renewed");
	assert_eq!(cached.refresh_token().map(|secret| secret.expose()), Some("r2"));
}

#[tokio::test]
async fn unauthorized_twice_exhausts_the_budget() {
	let store = MemoryStore::default();

	common::seed(&store, common::token("stale", Some("r1"), None)).await;

	let (orchestrator, transport) = common::orchestrator(
		ScriptedTransport::default()
			.respond(401, "expired")
			.respond(200, common::token_body("renewed", None))
			.respond(401, "still expired"),
		&store,
	);
	let err = orchestrator
		.send(ResourceRequest::client(Method::GET, "/status"))
		.await
		.expect_err("Second 401 should be terminal.");

	match &err {
		Error::RequestMaxTryExceeded { attempts, source } => {
			assert_eq!(*attempts, 2);
			assert_eq!(source.status, 401);
			assert_eq!(source.body_text(), "still expired");
		},
		other => panic!("Unexpected error: {other:?}."),
	}

	let calls = transport.calls();
	let resource_calls = calls.iter().filter(|call| !call.is_token_call()).count();

	assert_eq!(calls.len(), 3);
	assert_eq!(resource_calls, 2);
	assert_eq!(orchestrator.retry_metrics.exhausted(), 1);
	assert_eq!(orchestrator.retry_metrics.unauthorized(), 2);
}

#[tokio::test]
async fn rejected_refresh_falls_back_to_reissuance() {
	let store = MemoryStore::default();

	common::seed(&store, common::token("stale", Some("revoked"), None)).await;

	let (orchestrator, transport) = common::orchestrator(
		ScriptedTransport::default()
			.respond(401, "expired")
			.respond(400, r#"{"error":"invalid_grant"}"#)
			.respond(200, common::token_body("reissued", None))
			.respond(200, r#"{"ok":true}"#),
		&store,
	);

	orchestrator
		.send(ResourceRequest::client(Method::GET, "/status"))
		.await
		.expect("Reissuance should recover the call.");

	let calls = transport.calls();

	assert_eq!(calls.len(), 4);
	assert!(calls[1].body.starts_with("grant_type=refresh_token"));
	assert_eq!(calls[2].body, "grant_type=client_credentials");
	assert_eq!(calls[3].bearer(), Some("reissued"));
	assert_eq!(orchestrator.retry_metrics.refreshes(), 0);
	assert_eq!(orchestrator.retry_metrics.reissues(), 1);
}

#[tokio::test]
async fn refresh_server_errors_propagate() {
	let store = MemoryStore::default();

	common::seed(&store, common::token("stale", Some("r1"), None)).await;

	let (orchestrator, transport) = common::orchestrator(
		ScriptedTransport::default().respond(401, "expired").respond(503, "maintenance"),
		&store,
	);
	let err = orchestrator
		.send(ResourceRequest::client(Method::GET, "/status"))
		.await
		.expect_err("A 5xx from the token endpoint should propagate.");

	assert_eq!(err.bad_response().map(|response| response.status), Some(503));
	assert_eq!(transport.calls().len(), 2);
}

#[tokio::test]
async fn user_token_without_refresh_is_not_reissued() {
	let store = MemoryStore::default();
	let user = UserId::new(42);

	common::seed(&store, common::token("user-stale", None, Some(user))).await;

	let (orchestrator, transport) =
		common::orchestrator(ScriptedTransport::default().respond(401, "expired"), &store);
	let err = orchestrator
		.send(ResourceRequest::user(user, Method::GET, "users/me"))
		.await
		.expect_err("User subjects are never reissued automatically.");

	assert!(matches!(err, Error::UserAuthenticationRequired { .. }));
	assert_eq!(transport.calls().len(), 1);
}

#[tokio::test]
async fn user_refresh_keeps_owner_and_previous_refresh_token() {
	let store = MemoryStore::default();
	let user = UserId::new(42);

	common::seed(&store, common::token("user-stale", Some("user-r"), Some(user))).await;

	let (orchestrator, transport) = common::orchestrator(
		ScriptedTransport::default()
			.respond(401, "expired")
			.respond(200, common::token_body("user-renewed", None))
			.respond(200, "{}"),
		&store,
	);

	orchestrator
		.send(ResourceRequest::user(user, Method::GET, "users/me"))
		.await
		.expect("User refresh should recover the call.");

	assert_eq!(transport.calls()[2].bearer(), Some("user-renewed"));

	let client = common::config().name().clone();
	let persisted = store
		.load_user_token(&client, user)
		.await
		.expect("Store lookup should succeed.")
		.expect("Refreshed user token should be persisted.");

	assert_eq!(persisted.subject(), Subject::User(user));
	assert_eq!(persisted.access_token().expose(), "user-renewed");
	assert_eq!(persisted.refresh_token().map(|secret| secret.expose()), Some("user-r"));
	assert!(
		orchestrator.client_token().await.expect("Cache lookup should succeed.").is_none(),
		"A user refresh must not touch the client slot."
	);
}

#[tokio::test]
async fn other_failures_are_not_retried() {
	let store = MemoryStore::default();

	common::seed(&store, common::token("cached", Some("r1"), None)).await;

	let (orchestrator, transport) = common::orchestrator(
		ScriptedTransport::default().respond(403, "forbidden").fail("connection reset"),
		&store,
	);
	let forbidden = orchestrator
		.send(ResourceRequest::client(Method::DELETE, "/things/1"))
		.await
		.expect_err("403 should propagate.");

	assert!(matches!(&forbidden, Error::BadResponse(response) if response.status == 403));

	let network = orchestrator
		.send(ResourceRequest::client(Method::GET, "/status"))
		.await
		.expect_err("Transport failures should propagate.");

	assert!(matches!(network, Error::Transport(TransportError::Network { .. })));
	assert_eq!(transport.calls().len(), 2);
	assert_eq!(transport.remaining(), 0);
	assert_eq!(orchestrator.retry_metrics.unauthorized(), 0);
}

#[tokio::test]
async fn decode_failures_propagate_without_retry() {
	let store = MemoryStore::default();

	common::seed(&store, common::token("cached", None, None)).await;

	let (orchestrator, transport) =
		common::orchestrator(ScriptedTransport::default().respond(200, r#"{"id":"x"}"#), &store);
	let err = orchestrator
		.send_as::<Profile>(ResourceRequest::client(Method::GET, "users/1"))
		.await
		.expect_err("Mistyped body should fail to decode.");

	assert!(matches!(err, Error::Codec(_)));
	assert_eq!(transport.calls().len(), 1);
}

#[tokio::test]
async fn reissued_client_token_ignores_echoed_owner() {
	let store = MemoryStore::default();

	common::seed(&store, common::token("stale", None, None)).await;

	let (orchestrator, transport) = common::orchestrator(
		ScriptedTransport::default()
			.respond(401, "expired")
			.respond(200, r#"{"access_token":"fresh","user_id":5}"#)
			.respond(200, "{}")
			.respond(200, "{}"),
		&store,
	);

	for _ in 0..2 {
		orchestrator
			.send(ResourceRequest::client(Method::GET, "/status"))
			.await
			.expect("Reissued token should serve the client.");
	}

	let calls = transport.calls();

	assert_eq!(calls.len(), 4);
	assert_eq!(calls[2].bearer(), Some("fresh"));
	assert_eq!(calls[3].bearer(), Some("fresh"));

	let cached = orchestrator
		.client_token()
		.await
		.expect("Cache lookup should succeed.")
		.expect("Reissued token should fill the client slot.");

	assert_eq!(cached.access_token().expose(), "fresh");
	assert_eq!(cached.subject(), Subject::Client);
	assert!(
		orchestrator
			.user_token(UserId::new(5))
			.await
			.expect("Cache lookup should succeed.")
			.is_none()
	);
}

#[tokio::test]
async fn acquired_client_token_ignores_echoed_owner() {
	let store = MemoryStore::default();
	let (orchestrator, transport) = common::orchestrator(
		ScriptedTransport::default()
			.respond(200, r#"{"access_token":"acquired","user_id":"9"}"#)
			.respond(200, "{}")
			.respond(200, "{}"),
		&store,
	);

	for _ in 0..2 {
		orchestrator
			.send(ResourceRequest::client(Method::GET, "/status"))
			.await
			.expect("Acquired token should serve the client.");
	}

	let calls = transport.calls();

	assert_eq!(calls.len(), 3);
	assert_eq!(calls.iter().filter(|call| call.is_token_call()).count(), 1);
	assert_eq!(calls[2].bearer(), Some("acquired"));

	let client = common::config().name().clone();
	let stray = store
		.load_user_token(&client, UserId::new(9))
		.await
		.expect("Store lookup should succeed.");

	assert!(stray.is_none());
}

#[tokio::test]
async fn user_refresh_rejected_requires_authentication() {
	let store = MemoryStore::default();
	let user = UserId::new(3);

	common::seed(&store, common::token("user-stale", Some("user-revoked"), Some(user))).await;

	let (orchestrator, transport) = common::orchestrator(
		ScriptedTransport::default()
			.respond(401, "expired")
			.respond(400, r#"{"error":"invalid_grant"}"#),
		&store,
	);
	let err = orchestrator
		.send(ResourceRequest::user(user, Method::GET, "users/me"))
		.await
		.expect_err("A rejected user refresh must not fall back to reissuance.");

	assert!(matches!(err, Error::UserAuthenticationRequired { user_id } if user_id == user));

	let calls = transport.calls();

	assert_eq!(calls.len(), 2);
	assert_eq!(calls[1].body, "grant_type=refresh_token&refresh_token=user-revoked");
	assert_eq!(orchestrator.retry_metrics.reissues(), 0);
	assert_eq!(transport.remaining(), 0);
}
