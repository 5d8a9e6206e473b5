//! Shared fixtures: a scripted in-process transport and orchestrator builders.

#![allow(dead_code)]

// std
use std::{
	collections::VecDeque,
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	sync::{Arc, Mutex},
};
// self
use oauth2_orchestrator::{
	auth::{Token, UserId},
	config::ClientConfig,
	http::{HttpClientError, HttpRequest, HttpResponse, HttpTransport, TransportFuture},
	oauth::{
		DefaultTransportErrorMapper,
		oauth2::http::{StatusCode, header::AUTHORIZATION},
	},
	orchestrator::Orchestrator,
	store::{MemoryStore, TokenStore},
	url::Url,
};

pub const TOKEN_URI: &str = "https://api.example.com/oauth/token";
pub const BASIC_AUTH: &str = "Basic Y2xpZW50OnNlY3JldA==";

pub type ScriptedOrchestrator = Orchestrator<ScriptedTransport, DefaultTransportErrorMapper>;

/// Error emitted by [`ScriptedTransport`] for scripted network failures.
#[derive(Debug)]
pub struct ScriptedFailure(pub String);
impl Display for ScriptedFailure {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl StdError for ScriptedFailure {}

/// One call observed by [`ScriptedTransport`].
#[derive(Clone, Debug)]
pub struct RecordedCall {
	pub method: String,
	pub uri: String,
	pub authorization: Option<String>,
	pub body: String,
}
impl RecordedCall {
	pub fn is_token_call(&self) -> bool {
		self.uri == TOKEN_URI
	}

	pub fn bearer(&self) -> Option<&str> {
		self.authorization.as_deref().and_then(|value| value.strip_prefix("Bearer "))
	}
}

enum Step {
	Respond { status: u16, body: String },
	Fail(String),
}

/// Transport that answers from a fixed script and records every call.
#[derive(Default)]
pub struct ScriptedTransport {
	steps: Mutex<VecDeque<Step>>,
	calls: Mutex<Vec<RecordedCall>>,
}
impl ScriptedTransport {
	pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
		self.steps
			.lock()
			.expect("Script lock should not be poisoned.")
			.push_back(Step::Respond { status, body: body.into() });

		self
	}

	pub fn fail(self, message: impl Into<String>) -> Self {
		self.steps
			.lock()
			.expect("Script lock should not be poisoned.")
			.push_back(Step::Fail(message.into()));

		self
	}

	pub fn calls(&self) -> Vec<RecordedCall> {
		self.calls.lock().expect("Call log lock should not be poisoned.").clone()
	}

	pub fn remaining(&self) -> usize {
		self.steps.lock().expect("Script lock should not be poisoned.").len()
	}
}
impl HttpTransport for ScriptedTransport {
	type TransportError = ScriptedFailure;

	fn execute(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError> {
		Box::pin(async move {
			tokio::task::yield_now().await;

			self.calls.lock().expect("Call log lock should not be poisoned.").push(RecordedCall {
				method: request.method().to_string(),
				uri: request.uri().to_string(),
				authorization: request
					.headers()
					.get(AUTHORIZATION)
					.and_then(|value| value.to_str().ok())
					.map(ToOwned::to_owned),
				body: String::from_utf8_lossy(request.body()).into_owned(),
			});

			let step = self
				.steps
				.lock()
				.expect("Script lock should not be poisoned.")
				.pop_front()
				.expect("Transport was called more often than scripted.");

			match step {
				Step::Respond { status, body } => {
					let mut response = HttpResponse::new(body.into_bytes());

					*response.status_mut() =
						StatusCode::from_u16(status).expect("Scripted status should be valid.");

					Ok(response)
				},
				Step::Fail(message) =>
					Err(HttpClientError::Reqwest(Box::new(ScriptedFailure(message)))),
			}
		})
	}
}

pub fn config() -> ClientConfig {
	ClientConfig::builder("crm")
		.api_base_url(Url::parse("https://api.example.com/v1").expect("Base URL should parse."))
		.client_id("client")
		.client_secret("secret")
		.token_endpoint("https://api.example.com/oauth/token")
		.build()
		.expect("Config fixture should build.")
}

pub fn orchestrator(
	transport: ScriptedTransport,
	store: &MemoryStore,
) -> (ScriptedOrchestrator, Arc<ScriptedTransport>) {
	let transport = Arc::new(transport);
	let store: Arc<dyn TokenStore> = Arc::new(store.clone());
	let orchestrator: ScriptedOrchestrator = Orchestrator::with_http_client(
		config(),
		store,
		transport.clone(),
		Arc::new(DefaultTransportErrorMapper),
	);

	(orchestrator, transport)
}

pub fn token(access: &str, refresh: Option<&str>, owner: Option<UserId>) -> Token {
	let mut builder = Token::builder().access_token(access).expires_in(3600);

	if let Some(refresh) = refresh {
		builder = builder.refresh_token(refresh);
	}
	if let Some(owner) = owner {
		builder = builder.owner(owner);
	}

	builder.build().expect("Token fixture should build.")
}

pub fn token_body(access: &str, refresh: Option<&str>) -> String {
	match refresh {
		Some(refresh) => format!(
			r#"{{"access_token":"{access}","token_type":"Bearer","expires_in":3600,"refresh_token":"{refresh}"}}"#
		),
		None => format!(r#"{{"access_token":"{access}","token_type":"Bearer","expires_in":3600}}"#),
	}
}

pub async fn seed(store: &MemoryStore, token: Token) {
	let client = config().name().clone();

	store.save_token(&client, token).await.expect("Seeding the store should succeed.");
}
