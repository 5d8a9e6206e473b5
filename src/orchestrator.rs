//! The orchestrator: classifies requests, resolves bearer tokens, and recovers from 401s.
//!
//! One [`Orchestrator`] serves one named client configuration and exclusively owns its
//! [`TokenCache`]. Every top-level call runs as a single sequential flow; the only state that
//! outlives a call is the cache content.

mod metrics;
mod resource;
mod token;

pub use metrics::RetryMetrics;

// self
use crate::{
	_prelude::*,
	auth::Token,
	cache::TokenCache,
	codec::{Codec, SerdeCodec},
	config::ClientConfig,
	http::{HttpRequest, HttpResponse, HttpTransport},
	oauth::TransportErrorMapper,
	request::RequestClass,
	store::TokenStore,
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

/// Number of retries allowed after a 401; bounds a top-level call to two resource attempts.
pub const REQUEST_MAX_TRY: u32 = 1;

#[cfg(feature = "reqwest")]
/// Orchestrator specialized for the crate's default reqwest transport stack.
pub type ReqwestOrchestrator = Orchestrator<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Decoded result of [`Orchestrator::send`].
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
	/// Token issued by a token request (not stored).
	Token(Token),
	/// Generic document decoded from a resource response.
	Document(Value),
}
impl Reply {
	/// Returns the issued token, if this reply carries one.
	pub fn into_token(self) -> Option<Token> {
		match self {
			Self::Token(token) => Some(token),
			Self::Document(_) => None,
		}
	}

	/// Returns the decoded document, if this reply carries one.
	pub fn into_document(self) -> Option<Value> {
		match self {
			Self::Token(_) => None,
			Self::Document(document) => Some(document),
		}
	}
}

/// Coordinates token resolution, transport, and decoding for one client configuration.
pub struct Orchestrator<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP transport used for every outbound call.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Codec decoding token and resource bodies.
	pub codec: Arc<dyn Codec>,
	/// Shared counters for the 401 recovery protocol.
	pub retry_metrics: Arc<RetryMetrics>,
	config: ClientConfig,
	cache: Arc<TokenCache>,
}
impl<C, M> Orchestrator<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates an orchestrator that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		config: ClientConfig,
		store: Arc<dyn TokenStore>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		let cache = Arc::new(TokenCache::new(config.name().clone(), store));

		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			codec: Arc::new(SerdeCodec),
			retry_metrics: Default::default(),
			config,
			cache,
		}
	}

	/// Replaces the codec (defaults to [`SerdeCodec`]).
	pub fn with_codec(mut self, codec: Arc<dyn Codec>) -> Self {
		self.codec = codec;

		self
	}

	/// Client configuration served by this orchestrator.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// API base URL resource URIs are resolved against.
	pub fn base_url(&self) -> &Url {
		self.config.api_base_url()
	}

	/// Token cache owned by this orchestrator.
	pub fn cache(&self) -> &TokenCache {
		&self.cache
	}

	async fn dispatch(&self, class: RequestClass, request: HttpRequest) -> Result<HttpResponse> {
		self.http_client
			.execute(request)
			.await
			.map_err(|err| self.transport_mapper.map_transport_error(class, err))
	}
}
#[cfg(feature = "reqwest")]
impl Orchestrator<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates an orchestrator with its own reqwest-backed transport.
	pub fn new(config: ClientConfig, store: Arc<dyn TokenStore>) -> Self {
		Self::with_http_client(
			config,
			store,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Clone for Orchestrator<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			transport_mapper: self.transport_mapper.clone(),
			codec: self.codec.clone(),
			retry_metrics: self.retry_metrics.clone(),
			config: self.config.clone(),
			cache: self.cache.clone(),
		}
	}
}
impl<C, M> Debug for Orchestrator<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Orchestrator")
			.field("config", &self.config)
			.field("cache", &self.cache)
			.field("retry_metrics", &self.retry_metrics)
			.finish()
	}
}
