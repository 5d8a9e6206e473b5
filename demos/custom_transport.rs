//! Demonstrates registering a custom transport and mapper that emit non-reqwest errors.
//!
//! 1. Implement [`HttpTransport`] for the transport type.
//! 2. Provide a [`TransportErrorMapper`] that understands the transport's error type.
//! 3. Wrap both in `Arc` and pass them to [`Orchestrator::with_http_client`].

// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	sync::Arc,
};
// crates.io
use color_eyre::Result;
// self
use oauth2_orchestrator::{
	config::ClientConfig,
	error::{Error, TransportError},
	http::{HttpClientError, HttpRequest, HttpResponse, HttpTransport, TransportFuture},
	oauth::{TransportErrorMapper, oauth2::http::Method},
	orchestrator::Orchestrator,
	request::{RequestClass, ResourceRequest},
	store::{MemoryStore, TokenStore},
	url::Url,
};

type MockOrchestrator = Orchestrator<MockTransport, MockTransportErrorMapper>;

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let store: Arc<dyn TokenStore> = Arc::new(MemoryStore::default());
	let config = ClientConfig::builder("inventory")
		.api_base_url(Url::parse("https://inventory.example.com/api/")?)
		.client_id("demo-client")
		.client_secret("demo-secret")
		.token_endpoint("/oauth/token")
		.build()?;
	let mapper = Arc::new(MockTransportErrorMapper);
	let orchestrator: MockOrchestrator = Orchestrator::with_http_client(
		config.clone(),
		Arc::clone(&store),
		Arc::new(MockTransport::success()),
		Arc::clone(&mapper),
	);
	let reply = orchestrator.send(ResourceRequest::client(Method::GET, "items")).await?;

	println!("Items served by the mock transport: {:?}.", reply.into_document());

	let failing: MockOrchestrator = Orchestrator::with_http_client(
		config,
		store,
		MockTransport::transport_error(MockTransportError::DnsFailure {
			host: "inventory.example.com",
		}),
		Arc::clone(&mapper),
	);

	match failing.send(ResourceRequest::client(Method::GET, "items")).await {
		Ok(_) => println!("Mock transport unexpectedly succeeded."),
		Err(e) => println!("Transport error mapped by the orchestrator: {e}."),
	}

	Ok(())
}

#[derive(Clone, Debug)]
enum MockTransportError {
	DnsFailure { host: &'static str },
}
impl Display for MockTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::DnsFailure { host } => write!(f, "DNS lookup failed for {host}"),
		}
	}
}
impl StdError for MockTransportError {}

#[derive(Clone)]
enum MockBehavior {
	Success,
	TransportError(MockTransportError),
}

struct MockTransport {
	behavior: MockBehavior,
}
impl MockTransport {
	fn success() -> Self {
		Self { behavior: MockBehavior::Success }
	}

	fn transport_error(error: MockTransportError) -> Self {
		Self { behavior: MockBehavior::TransportError(error) }
	}
}
impl HttpTransport for MockTransport {
	type TransportError = MockTransportError;

	fn execute(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError> {
		let behavior = self.behavior.clone();

		Box::pin(async move {
			match behavior {
				MockBehavior::Success if request.uri().path().ends_with("/oauth/token") =>
					Ok(HttpResponse::new(
						b"{\"access_token\":\"mock-access\",\"token_type\":\"Bearer\",\"expires_in\":900}"
							.to_vec(),
					)),
				MockBehavior::Success => Ok(HttpResponse::new(b"[{\"sku\":\"A-1\"}]".to_vec())),
				// `HttpClientError::Reqwest` boxes any transport error despite its name.
				MockBehavior::TransportError(error) => Err(HttpClientError::Reqwest(Box::new(error))),
			}
		})
	}
}

#[derive(Clone, Default)]
struct MockTransportErrorMapper;
impl TransportErrorMapper<MockTransportError> for MockTransportErrorMapper {
	fn map_transport_error(
		&self,
		class: RequestClass,
		error: HttpClientError<MockTransportError>,
	) -> Error {
		match error {
			HttpClientError::Reqwest(inner) => TransportError::network(*inner).into(),
			HttpClientError::Other(message) => TransportError::Other {
				message: format!("mock transport failed during {class} call: {message}"),
			}
			.into(),
			_ => TransportError::Other { message: format!("mock transport failed during {class} call") }
				.into(),
		}
	}
}
