//! Orchestrator-level error types shared by requests, transports, codecs, and stores.

// self
use crate::{_prelude::*, auth::UserId, http::BadResponse};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical orchestrator error exposed by public APIs.
///
/// Only an HTTP 401 on a resource call is handled locally (refresh-and-retry); every other
/// variant reaches the caller unchanged.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Persistence-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, IO).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body could not be decoded.
	#[error(transparent)]
	Codec(#[from] crate::codec::CodecError),
	/// Server answered with an error status (4xx/5xx).
	#[error(transparent)]
	BadResponse(#[from] BadResponse),

	/// Request is neither a recognized token request nor a recognized resource request.
	#[error("Invalid request kind: {reason}.")]
	InvalidRequestKind {
		/// Why the request could not be classified.
		reason: String,
	},
	/// No token is stored for the user and no automatic reissuance path exists.
	#[error("User {user_id} must authenticate before this request can be sent.")]
	UserAuthenticationRequired {
		/// User subject of the failing request.
		user_id: UserId,
	},
	/// Retry budget exhausted: the request still failed with 401 after a refresh.
	#[error("Request was rejected as unauthorized after {attempts} attempts.")]
	RequestMaxTryExceeded {
		/// Number of resource calls performed.
		attempts: u32,
		/// Last unauthorized response.
		#[source]
		source: BadResponse,
	},
}
impl Error {
	pub(crate) fn invalid_request_kind(reason: impl Into<String>) -> Self {
		Self::InvalidRequestKind { reason: reason.into() }
	}

	/// Returns the server response carried by this error, if any.
	pub fn bad_response(&self) -> Option<&BadResponse> {
		match self {
			Self::BadResponse(response) | Self::RequestMaxTryExceeded { source: response, .. } =>
				Some(response),
			_ => None,
		}
	}
}

/// Configuration and validation failures raised by the orchestrator.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Client name failed validation.
	#[error(transparent)]
	InvalidName(#[from] crate::auth::IdentifierError),
	/// A configured or requested URL could not be parsed.
	#[error("The {field} URL is invalid.")]
	InvalidUrl {
		/// Which URL failed to parse.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A URL uses a scheme other than `http`/`https`.
	#[error("The {field} URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Which URL failed validation.
		field: &'static str,
		/// URL that failed validation.
		url: String,
	},
	/// Base URL cannot carry relative paths (e.g. `mailto:`).
	#[error("The API base URL cannot be used as a base: {url}.")]
	CannotBeABase {
		/// URL that failed validation.
		url: String,
	},
	/// API base URL was not supplied.
	#[error("Missing API base URL.")]
	MissingBaseUrl,
	/// Token endpoint was not supplied.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// Client identifier was empty or not supplied.
	#[error("Missing client identifier.")]
	MissingClientId,
	/// Header name or value is not valid HTTP.
	#[error("Header `{name}` is invalid.")]
	InvalidHeader {
		/// Offending header name.
		name: String,
	},
	/// Token builder validation failed.
	#[error("Unable to build token.")]
	TokenBuild(#[from] crate::auth::TokenBuilderError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while sending the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying HTTP client gave up waiting for the server.
	#[error("Request timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while sending the request.")]
	Io(#[from] std::io::Error),
	/// Transport reported a failure without a typed error.
	#[error("HTTP client error occurred while sending the request: {message}.")]
	Other {
		/// Transport-supplied description.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}
