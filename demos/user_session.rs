//! Demonstrates a user session: a password grant stores the user's token, an expired access
//! token is refreshed transparently after a 401, and an unknown user is asked to sign in.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use oauth2_orchestrator::{
	auth::UserId,
	config::ClientConfig,
	error::Error,
	oauth::oauth2::http::Method,
	orchestrator::ReqwestOrchestrator,
	request::{ResourceRequest, TokenRequest},
	store::MemoryStore,
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let password_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token").body_includes("grant_type=password");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"session-1\",\"refresh_token\":\"session-r\",\"expires_in\":60}",
			);
		})
		.await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token").body_includes("grant_type=refresh_token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"session-2\",\"expires_in\":60}");
		})
		.await;
	let expired_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/profile").header("authorization", "Bearer session-1");
			then.status(401).body("token expired");
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/profile").header("authorization", "Bearer session-2");
			then.status(200).header("content-type", "application/json").body("{\"name\":\"Ada\"}");
		})
		.await;
	let config = ClientConfig::builder("portal")
		.api_base_url(Url::parse(&server.url("/api/"))?)
		.client_id("portal-client")
		.client_secret("portal-secret")
		.token_endpoint(server.url("/oauth/token"))
		.build()?;
	let orchestrator = ReqwestOrchestrator::new(config, Arc::new(MemoryStore::default()));
	let user = UserId::new(1001);

	orchestrator
		.request_access_token(TokenRequest::user_credentials("ada", "correct-horse").for_user(user))
		.await?;

	let profile = orchestrator.send(ResourceRequest::user(user, Method::GET, "profile")).await?;

	println!("Profile after transparent refresh: {:?}.", profile.into_document());
	println!("Refreshes performed: {}.", orchestrator.retry_metrics.refreshes());

	match orchestrator
		.send(ResourceRequest::user(UserId::new(2002), Method::GET, "profile"))
		.await
	{
		Err(Error::UserAuthenticationRequired { user_id }) =>
			println!("User {user_id} needs to sign in first."),
		other => println!("Unexpected outcome for an unknown user: {other:?}."),
	}

	password_mock.assert_async().await;
	refresh_mock.assert_async().await;
	expired_mock.assert_async().await;
	profile_mock.assert_async().await;

	Ok(())
}
