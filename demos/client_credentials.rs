//! Demonstrates client-credentials acquisition on the first resource call with the default
//! reqwest transport and the in-memory token store.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use oauth2_orchestrator::{
	config::ClientConfig,
	http::ReqwestHttpClient,
	oauth::{ReqwestTransportErrorMapper, oauth2::http::Method},
	orchestrator::ReqwestOrchestrator,
	reqwest::Client,
	request::ResourceRequest,
	store::{MemoryStore, TokenStore},
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let store: Arc<dyn TokenStore> = Arc::new(MemoryStore::default());
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":900}",
			);
		})
		.await;
	let resource_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/reports").header("authorization", "Bearer demo-access");
			then.status(200).header("content-type", "application/json").body("{\"reports\":[]}");
		})
		.await;
	let config = ClientConfig::builder("reporting")
		.api_base_url(Url::parse(&server.url("/v1"))?)
		.client_id("demo-client")
		.client_secret("super-secret")
		.token_endpoint(server.url("/oauth/token"))
		.build()?;
	let http_client = ReqwestHttpClient::with_client(Client::builder().build()?);
	let orchestrator = ReqwestOrchestrator::with_http_client(
		config,
		store,
		http_client,
		Arc::new(ReqwestTransportErrorMapper),
	);

	for _ in 0..2 {
		let reply = orchestrator.send(ResourceRequest::client(Method::GET, "/reports")).await?;

		println!("Reports: {:?}.", reply.into_document());
	}

	token_mock.assert_async().await;
	resource_mock.assert_calls_async(2).await;

	Ok(())
}
