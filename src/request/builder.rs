//! Field-by-field request assembly with variant validation.

// self
use crate::{
	_prelude::*,
	auth::{Subject, UserId},
	request::{Grant, Request, RequestOptions, ResourceRequest, TokenRequest},
};

/// Builder that assembles a [`Request`] and decides its variant.
///
/// Setting a [`Grant`] yields a token request; setting a subject (`client`/`user`) yields a
/// resource request. [`RequestBuilder::build`] fails with [`Error::InvalidRequestKind`] when the
/// fields describe neither or both.
#[derive(Clone, Debug, Default)]
pub struct RequestBuilder {
	method: Option<Method>,
	uri: Option<String>,
	headers: HeaderMap,
	body: Option<Vec<u8>>,
	options: RequestOptions,
	grant: Option<Grant>,
	owner: Option<UserId>,
	subject: Option<Subject>,
}
impl RequestBuilder {
	/// Sets the HTTP method (token requests default to `POST`, resource requests to `GET`).
	pub fn method(mut self, method: Method) -> Self {
		self.method = Some(method);

		self
	}

	/// Sets the target URI; token requests always target the configured token endpoint.
	pub fn uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = Some(uri.into());

		self
	}

	/// Adds or replaces a header.
	pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Sets the body of a resource request.
	pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Adds a transport option.
	pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.options = self.options.with(key, value);

		self
	}

	/// Marks the request as a token request for `grant`.
	pub fn grant(mut self, grant: Grant) -> Self {
		self.grant = Some(grant);

		self
	}

	/// Stamps the token issued by a token request with `user_id`.
	pub fn owner(mut self, user_id: UserId) -> Self {
		self.owner = Some(user_id);

		self
	}

	/// Marks the request as a resource request for `subject`.
	pub fn subject(mut self, subject: Subject) -> Self {
		self.subject = Some(subject);

		self
	}

	/// Marks the request as a client resource request.
	pub fn client(self) -> Self {
		self.subject(Subject::Client)
	}

	/// Marks the request as a user resource request.
	pub fn user(self, user_id: UserId) -> Self {
		self.subject(Subject::User(user_id))
	}

	/// Validates the fields and produces the request variant they describe.
	pub fn build(self) -> Result<Request> {
		match (self.grant, self.subject) {
			(Some(_), Some(_)) => Err(Error::invalid_request_kind(
				"request carries both a grant and a resource subject",
			)),
			(None, None) => Err(Error::invalid_request_kind(
				"request carries neither a grant nor a resource subject",
			)),
			(Some(grant), None) => {
				if self.body.is_some() {
					return Err(Error::invalid_request_kind(
						"token request bodies are derived from the grant",
					));
				}

				let mut request = TokenRequest::new(grant).with_options(self.options);

				if let Some(method) = self.method {
					request = request.with_method(method);
				}
				if let Some(owner) = self.owner {
					request = request.for_user(owner);
				}
				for (name, value) in self.headers.iter() {
					request = request.with_header(name.clone(), value.clone());
				}

				Ok(Request::Token(request))
			},
			(None, Some(subject)) => {
				if self.owner.is_some() {
					return Err(Error::invalid_request_kind(
						"only token requests can carry an owner",
					));
				}

				let uri = self
					.uri
					.ok_or_else(|| Error::invalid_request_kind("resource request has no URI"))?;
				let mut request =
					ResourceRequest::new(subject, self.method.unwrap_or(Method::GET), uri)
						.with_options(self.options);

				if let Some(body) = self.body {
					request = request.with_body(body);
				}
				for (name, value) in self.headers.iter() {
					request = request.with_header(name.clone(), value.clone());
				}

				Ok(Request::Resource(request))
			},
		}
	}
}
