//! Token acquisition, lookup, and the refresh-or-reissue protocol.

// self
use crate::{
	_prelude::*,
	auth::{Subject, Token, TokenSecret, UserId},
	http::{self, HttpTransport},
	oauth::{self, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan, RetryEvent},
	orchestrator::Orchestrator,
	request::{RequestClass, TokenRequest},
};

impl<C, M> Orchestrator<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Performs a token request and stores the issued token in the cache (write-through).
	///
	/// Tokens issued for user-bound requests are stamped with the request's owner unless the
	/// server echoed one back, so they land in that user's slot.
	pub async fn request_access_token(&self, request: TokenRequest) -> Result<Token> {
		const KIND: FlowKind = FlowKind::TokenAcquisition;

		const STAGE: &str = "request_access_token";

		let span = FlowSpan::new(KIND, STAGE);

		obs::record_flow_outcome(KIND, STAGE, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let token = self.exchange(&request).await?;

				self.cache.put(token.clone()).await?;

				Ok(token)
			})
			.await;

		obs::record_flow_result(KIND, STAGE, &result);

		result
	}

	/// Returns the client token from the cache or persistence, without acquiring one.
	pub async fn client_token(&self) -> Result<Option<Token>> {
		self.cache.client_token().await
	}

	/// Returns the token of `user` from the cache or persistence.
	pub async fn user_token(&self, user: UserId) -> Result<Option<Token>> {
		self.cache.user_token(user).await
	}

	/// Sends a token request to the token endpoint and decodes the issued token.
	///
	/// Never retried: a rejected token request surfaces as [`Error::BadResponse`].
	pub(crate) async fn exchange(&self, request: &TokenRequest) -> Result<Token> {
		let wire = oauth::token_http_request(&self.config, request)?;
		let response = self.dispatch(RequestClass::TokenAcquisition, wire).await?;
		let response = http::check_status(response)?;

		oauth::decode_token(
			self.codec.as_ref(),
			self.config.format(),
			response.body(),
			request.owner(),
		)
	}

	/// Returns the bearer for `subject`, acquiring a client token on a total miss.
	pub(crate) async fn resolve_token(&self, subject: Subject) -> Result<Token> {
		match subject {
			Subject::User(user) => self
				.cache
				.user_token(user)
				.await?
				.ok_or(Error::UserAuthenticationRequired { user_id: user }),
			Subject::Client => {
				if let Some(token) = self.cache.client_token().await? {
					return Ok(token);
				}

				let guard = self.cache.guard(subject);
				let _singleflight = guard.lock().await;

				if let Some(token) = self.cache.cached(subject) {
					return Ok(token);
				}

				let token =
					self.exchange(&TokenRequest::client_credentials()).await?.for_subject(subject);

				self.cache.put(token.clone()).await?;

				Ok(token)
			},
		}
	}

	/// Replaces `stale` after a 401: refresh when possible, otherwise reissue.
	///
	/// Runs under the per-subject guard; a caller that waited on the guard reuses the token the
	/// previous holder stored instead of refreshing again. The replacement is always filed under
	/// `subject`, whatever owner the token endpoint echoes.
	pub(crate) async fn refresh_or_reissue(
		&self,
		subject: Subject,
		stale: &Token,
		attempt: u32,
	) -> Result<Token> {
		let guard = self.cache.guard(subject);
		let _singleflight = guard.lock().await;

		if let Some(current) = self.cache.cached(subject).filter(|current| current != stale) {
			obs::record_retry_event(RetryEvent::Coalesced, subject, attempt);

			return Ok(current);
		}

		let refreshed = match stale.refresh_token() {
			Some(previous) => self
				.refresh(subject, previous, attempt)
				.await?
				.map(|token| token.retain_refresh_token(previous)),
			None => None,
		};
		let token = match refreshed {
			Some(token) => token,
			None => self.reissue(subject).await?,
		}
		.for_subject(subject);

		self.cache.put(token.clone()).await?;

		Ok(token)
	}

	/// Redeems `refresh_token`; `Ok(None)` means the server rejected it with a 4xx.
	async fn refresh(
		&self,
		subject: Subject,
		refresh_token: &TokenSecret,
		attempt: u32,
	) -> Result<Option<Token>> {
		const KIND: FlowKind = FlowKind::Refresh;
		const STAGE: &str = "refresh";

		let span = FlowSpan::new(KIND, STAGE);
		let mut request = TokenRequest::refresh(refresh_token.clone());

		if let Some(user) = subject.user_id() {
			request = request.for_user(user);
		}

		obs::record_flow_outcome(KIND, STAGE, FlowOutcome::Attempt);

		let result = span.instrument(self.exchange(&request)).await;

		match result {
			Ok(token) => {
				obs::record_flow_outcome(KIND, STAGE, FlowOutcome::Success);
				self.retry_metrics.record_refresh();

				Ok(Some(token))
			},
			Err(Error::BadResponse(response)) if response.is_client_error() => {
				obs::record_flow_outcome(KIND, STAGE, FlowOutcome::Failure);
				obs::record_retry_event(RetryEvent::RefreshRejected, subject, attempt);

				Ok(None)
			},
			Err(err) => {
				obs::record_flow_outcome(KIND, STAGE, FlowOutcome::Failure);

				Err(err)
			},
		}
	}

	/// Full reissuance; only the client subject can be reissued automatically.
	async fn reissue(&self, subject: Subject) -> Result<Token> {
		const KIND: FlowKind = FlowKind::Reissue;
		const STAGE: &str = "reissue";

		if let Subject::User(user_id) = subject {
			return Err(Error::UserAuthenticationRequired { user_id });
		}

		let span = FlowSpan::new(KIND, STAGE);

		obs::record_flow_outcome(KIND, STAGE, FlowOutcome::Attempt);

		let result = span.instrument(self.exchange(&TokenRequest::client_credentials())).await;

		obs::record_flow_result(KIND, STAGE, &result);

		if result.is_ok() {
			self.retry_metrics.record_reissue();
		}

		result
	}
}
