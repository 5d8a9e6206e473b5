//! `send` entry points and the bounded resource retry loop.

// crates.io
use oauth2::http::{
	Request as WireRequest,
	header::{ACCEPT, AUTHORIZATION},
};
// self
use crate::{
	_prelude::*,
	auth::Token,
	codec,
	error::ConfigError,
	http::{self, BadResponse, HttpRequest, HttpTransport},
	oauth::TransportErrorMapper,
	obs::{self, FlowKind, FlowOutcome, FlowSpan, RetryEvent},
	orchestrator::{Orchestrator, REQUEST_MAX_TRY, Reply},
	request::{Request, RequestClass, ResourceRequest},
};

impl<C, M> Orchestrator<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Sends `request` and decodes the response with the generic decoder.
	///
	/// Token requests return the issued [`Token`] without storing it (see
	/// [`Orchestrator::request_access_token`]); resource requests return the decoded document.
	pub async fn send(&self, request: impl Into<Request>) -> Result<Reply> {
		let request = request.into();
		let kind = FlowKind::from(request.class());
		let span = FlowSpan::new(kind, "send");

		obs::record_flow_outcome(kind, "send", FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				match request {
					Request::Token(token_request) =>
						self.exchange(&token_request).await.map(Reply::Token),
					Request::Resource(resource) => {
						let body = self.execute_resource(&resource).await?;
						let document =
							self.codec.decode(&body, None, self.config.format()).map_err(Error::from)?;

						Ok(Reply::Document(document))
					},
				}
			})
			.await;

		obs::record_flow_result(kind, "send", &result);

		result
	}

	/// Sends a resource request and decodes the response into `T`.
	pub async fn send_as<T>(&self, request: ResourceRequest) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let kind = FlowKind::from(RequestClass::of_resource(&request));
		let span = FlowSpan::new(kind, "send_as");

		obs::record_flow_outcome(kind, "send_as", FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let body = self.execute_resource(&request).await?;

				codec::decode_as::<T>(self.codec.as_ref(), &body, self.config.format())
					.map_err(Error::from)
			})
			.await;

		obs::record_flow_result(kind, "send_as", &result);

		result
	}

	/// Resolves the bearer, sends, and retries once after a 401; returns the success body.
	async fn execute_resource(&self, request: &ResourceRequest) -> Result<Vec<u8>> {
		let subject = request.subject();
		let class = RequestClass::of_resource(request);
		let mut token = self.resolve_token(subject).await?;
		let mut attempt = 0;

		loop {
			let wire = self.resource_http_request(request, &token)?;
			let response = self.dispatch(class, wire).await?;
			let failure = match http::check_status(response) {
				Ok(response) => return Ok(response.into_body()),
				Err(failure) if failure.is_unauthorized() => failure,
				Err(failure) => return Err(failure.into()),
			};

			self.retry_metrics.record_unauthorized();
			obs::record_retry_event(RetryEvent::Unauthorized, subject, attempt);

			if attempt == REQUEST_MAX_TRY {
				return Err(self.exhausted(request, attempt, failure));
			}

			token = self.refresh_or_reissue(subject, &token, attempt).await?;
			attempt += 1;
		}
	}

	fn exhausted(&self, request: &ResourceRequest, attempt: u32, failure: BadResponse) -> Error {
		self.retry_metrics.record_exhausted();
		obs::record_retry_event(RetryEvent::Exhausted, request.subject(), attempt);

		Error::RequestMaxTryExceeded { attempts: attempt + 1, source: failure }
	}

	/// Builds the wire request: resolved URI, caller headers, and a bearer that replaces any
	/// other `Authorization` value.
	fn resource_http_request(&self, request: &ResourceRequest, token: &Token) -> Result<HttpRequest> {
		let uri = self.config.resolve(request.uri())?;
		let mut wire = WireRequest::builder()
			.method(request.method().clone())
			.uri(uri.as_str())
			.body(request.body().map(<[u8]>::to_vec).unwrap_or_default())
			.map_err(ConfigError::from)?;
		let headers = wire.headers_mut();

		for (name, value) in request.headers() {
			headers.insert(name.clone(), value.clone());
		}

		if !headers.contains_key(ACCEPT) {
			headers.insert(ACCEPT, HeaderValue::from_static(self.config.format().media_type()));
		}

		headers.insert(AUTHORIZATION, http::bearer_authorization(token.access_token())?);
		wire.extensions_mut().insert(request.options().clone());

		Ok(wire)
	}
}
