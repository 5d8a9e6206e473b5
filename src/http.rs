//! Transport seam for token-endpoint and resource calls.
//!
//! The orchestrator's only dependency on an HTTP stack is [`HttpTransport`]: callers provide an
//! implementation (typically behind `Arc<T>`) that turns an [`HttpRequest`] into an
//! [`HttpResponse`]. Non-success statuses are classified into [`BadResponse`] by the orchestrator,
//! never by the transport, so custom clients only report network-level failures.

pub use oauth2::{HttpClientError, HttpRequest, HttpResponse};

// std
use std::time::Duration as StdDuration;
// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use oauth2::http::header::RETRY_AFTER;
use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a, E> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, HttpClientError<E>>> + 'a + Send>>;

/// Abstraction over HTTP clients able to send a method + URI + headers + body request and return
/// the status, headers, and raw body.
///
/// Implementations must be `Send + Sync + 'static` so they can be shared across orchestrator
/// instances. Per-request [`RequestOptions`] travel in the request extensions; transports honour
/// the options they understand and ignore the rest.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Sends `request` and resolves with the raw response, whatever its status.
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError>;
}

/// Free-form transport options attached to a request (e.g. `timeout` in seconds).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestOptions(BTreeMap<String, Value>);
impl RequestOptions {
	/// Option key carrying the request timeout in (fractional) seconds.
	pub const TIMEOUT: &'static str = "timeout";

	/// Adds or replaces an option.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.0.insert(key.into(), value.into());

		self
	}

	/// Sets the `timeout` option.
	pub fn with_timeout(self, timeout: StdDuration) -> Self {
		self.with(Self::TIMEOUT, timeout.as_secs_f64())
	}

	/// Returns a raw option value.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	/// Returns `true` when no option is set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates over the options in key order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.0.iter().map(|(key, value)| (key.as_str(), value))
	}

	/// Parses the `timeout` option; numeric strings are accepted, negative values ignored.
	pub fn timeout(&self) -> Option<StdDuration> {
		let secs = match self.get(Self::TIMEOUT)? {
			Value::Number(number) => number.as_f64()?,
			Value::String(text) => text.trim().parse().ok()?,
			_ => return None,
		};

		StdDuration::try_from_secs_f64(secs).ok()
	}
}
impl<K, V> FromIterator<(K, V)> for RequestOptions
where
	K: Into<String>,
	V: Into<Value>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		Self(iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
	}
}

/// Non-success HTTP response (status >= 400) captured for the caller.
#[derive(Clone, ThisError)]
#[error("Server responded with HTTP {status}.")]
pub struct BadResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers snapshot.
	pub headers: HeaderMap,
	/// Raw response body.
	pub body: Vec<u8>,
	/// `Retry-After` hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}
impl BadResponse {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Creates a bad response from its parts.
	pub fn new(status: u16, headers: HeaderMap, body: Vec<u8>) -> Self {
		let retry_after = parse_retry_after(&headers);

		Self { status, headers, body, retry_after }
	}

	/// Captures a transport response.
	pub fn from_response(response: HttpResponse) -> Self {
		let status = response.status().as_u16();
		let (parts, body) = response.into_parts();

		Self::new(status, parts.headers, body)
	}

	/// Returns `true` for HTTP 401.
	pub fn is_unauthorized(&self) -> bool {
		self.status == 401
	}

	/// Returns `true` for 4xx statuses.
	pub fn is_client_error(&self) -> bool {
		(400..500).contains(&self.status)
	}

	/// Returns `true` for 5xx statuses.
	pub fn is_server_error(&self) -> bool {
		(500..600).contains(&self.status)
	}

	/// Body decoded as UTF-8 (lossy).
	pub fn body_text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	fn body_preview(&self) -> String {
		let text = self.body_text();

		if text.chars().count() <= Self::BODY_PREVIEW_LIMIT {
			return text;
		}

		let mut buf = text.chars().take(Self::BODY_PREVIEW_LIMIT).collect::<String>();

		buf.push('…');

		buf
	}
}
impl Debug for BadResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BadResponse")
			.field("status", &self.status)
			.field("retry_after", &self.retry_after)
			.field("body", &self.body_preview())
			.finish()
	}
}

/// Passes responses with status < 400 through; everything else becomes a [`BadResponse`].
pub fn check_status(response: HttpResponse) -> Result<HttpResponse, BadResponse> {
	if response.status().as_u16() < 400 {
		Ok(response)
	} else {
		Err(BadResponse::from_response(response))
	}
}

/// Parses `Retry-After` as delta-seconds or an RFC 2822 date in the future.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u32>() {
		return Some(Duration::seconds(secs.into()));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

/// Builds an HTTP Basic `Authorization` value from client credentials.
pub fn basic_authorization(
	client_id: &str,
	client_secret: Option<&str>,
) -> Result<HeaderValue, ConfigError> {
	let encoded = STANDARD.encode(format!("{client_id}:{}", client_secret.unwrap_or_default()));

	sensitive_header(format!("Basic {encoded}"))
}

/// Builds a `Bearer` `Authorization` value from an access token.
pub fn bearer_authorization(token: &TokenSecret) -> Result<HeaderValue, ConfigError> {
	sensitive_header(format!("Bearer {}", token.expose()))
}

fn sensitive_header(raw: String) -> Result<HeaderValue, ConfigError> {
	let mut value = HeaderValue::try_from(raw)
		.map_err(|_| ConfigError::InvalidHeader { name: "authorization".into() })?;

	value.set_sensitive(true);

	Ok(value)
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Honours the `timeout` request option by setting a per-request timeout.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute(&self, mut request: HttpRequest) -> TransportFuture<'_, Self::TransportError> {
		Box::pin(async move {
			let timeout =
				request.extensions_mut().remove::<RequestOptions>().and_then(|opts| opts.timeout());
			let mut outbound: reqwest::Request = request.try_into().map_err(Box::new)?;

			if let Some(timeout) = timeout {
				*outbound.timeout_mut() = Some(timeout);
			}

			let response = self.0.execute(outbound).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn response(status: u16, body: &str) -> HttpResponse {
		let mut response = HttpResponse::new(body.as_bytes().to_vec());

		*response.status_mut() =
			oauth2::http::StatusCode::from_u16(status).expect("Status fixture should be valid.");

		response
	}

	#[test]
	fn status_classification() {
		assert!(check_status(response(200, "{}")).is_ok());
		assert!(check_status(response(302, "")).is_ok());

		let unauthorized = check_status(response(401, "expired")).expect_err("401 should fail.");

		assert!(unauthorized.is_unauthorized());
		assert!(unauthorized.is_client_error());
		assert_eq!(unauthorized.body_text(), "expired");

		let unavailable = check_status(response(503, "")).expect_err("503 should fail.");

		assert!(unavailable.is_server_error());
		assert!(!unavailable.is_client_error());
	}

	#[test]
	fn retry_after_parses_seconds() {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, HeaderValue::from_static("30"));

		assert_eq!(parse_retry_after(&headers), Some(Duration::seconds(30)));
		assert_eq!(BadResponse::new(429, headers, Vec::new()).retry_after, Some(Duration::seconds(30)));
		assert_eq!(parse_retry_after(&HeaderMap::new()), None);
	}

	#[test]
	fn authorization_headers_are_sensitive() {
		let basic = basic_authorization("client", Some("secret"))
			.expect("Basic credentials should form a header.");

		assert_eq!(basic.to_str().expect("Header should be ASCII."), "Basic Y2xpZW50OnNlY3JldA==");
		assert!(basic.is_sensitive());

		let bearer = bearer_authorization(&TokenSecret::new("abc"))
			.expect("Bearer token should form a header.");

		assert_eq!(bearer.to_str().expect("Header should be ASCII."), "Bearer abc");
		assert!(bearer.is_sensitive());
		assert!(bearer_authorization(&TokenSecret::new("bad\nvalue")).is_err());
	}

	#[test]
	fn timeout_option_accepts_numbers_and_strings() {
		let options = RequestOptions::default().with(RequestOptions::TIMEOUT, 2.5);

		assert_eq!(options.timeout(), Some(StdDuration::from_millis(2500)));
		assert_eq!(
			RequestOptions::from_iter([("timeout", "3")]).timeout(),
			Some(StdDuration::from_secs(3))
		);
		assert_eq!(RequestOptions::from_iter([("timeout", -1)]).timeout(), None);
		assert_eq!(RequestOptions::default().timeout(), None);
	}

	#[test]
	fn debug_truncates_large_bodies() {
		let bad = BadResponse::new(500, HeaderMap::new(), "x".repeat(1_000).into_bytes());
		let rendered = format!("{bad:?}");

		assert!(rendered.contains('…'));
		assert!(rendered.len() < 400);
	}
}
