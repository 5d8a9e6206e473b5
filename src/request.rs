//! Request model: a closed set of token-acquisition and resource-access variants.
//!
//! A [`Request`] is either a [`TokenRequest`] (grant parameters sent to the token endpoint with
//! HTTP Basic client authentication) or a [`ResourceRequest`] (an API call authorized with a
//! bearer token of its [`Subject`]). [`RequestClass::of`] is the classifier the orchestrator
//! dispatches on.

pub mod builder;
pub mod grant;

pub use builder::*;
pub use grant::*;

pub use crate::http::RequestOptions;

// self
use crate::{
	_prelude::*,
	auth::{Subject, TokenSecret, UserId},
};

/// Orchestration path selected for a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestClass {
	/// Token endpoint call authenticated with client credentials.
	TokenAcquisition,
	/// Resource call authorized with the client token.
	ClientResource,
	/// Resource call authorized with a user token.
	UserResource,
}
impl RequestClass {
	/// Classifies a request by its variant tag.
	pub fn of(request: &Request) -> Self {
		match request {
			Request::Token(_) => Self::TokenAcquisition,
			Request::Resource(resource) => Self::of_resource(resource),
		}
	}

	/// Classifies a resource request by its subject.
	pub fn of_resource(request: &ResourceRequest) -> Self {
		match request.subject() {
			Subject::Client => Self::ClientResource,
			Subject::User(_) => Self::UserResource,
		}
	}

	/// Returns a stable label suitable for logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::TokenAcquisition => "token_acquisition",
			Self::ClientResource => "client_resource",
			Self::UserResource => "user_resource",
		}
	}
}
impl Display for RequestClass {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outgoing request handled by the orchestrator.
#[derive(Clone, Debug)]
pub enum Request {
	/// Token acquisition.
	Token(TokenRequest),
	/// Resource access.
	Resource(ResourceRequest),
}
impl Request {
	/// Returns a builder for requests assembled field by field.
	pub fn builder() -> RequestBuilder {
		RequestBuilder::default()
	}

	/// Classifies the request.
	pub fn class(&self) -> RequestClass {
		RequestClass::of(self)
	}
}
impl From<TokenRequest> for Request {
	fn from(value: TokenRequest) -> Self {
		Self::Token(value)
	}
}
impl From<ResourceRequest> for Request {
	fn from(value: ResourceRequest) -> Self {
		Self::Resource(value)
	}
}

/// Token endpoint request.
///
/// The target URI is always the configured token endpoint; the body is derived from the
/// [`Grant`].
#[derive(Clone, Debug)]
pub struct TokenRequest {
	grant: Grant,
	owner: Option<UserId>,
	method: Method,
	headers: HeaderMap,
	options: RequestOptions,
}
impl TokenRequest {
	/// Creates a request for the provided grant (method defaults to `POST`).
	pub fn new(grant: Grant) -> Self {
		Self {
			grant,
			owner: None,
			method: Method::POST,
			headers: HeaderMap::new(),
			options: RequestOptions::default(),
		}
	}

	/// `grant_type=client_credentials`.
	pub fn client_credentials() -> Self {
		Self::new(Grant::ClientCredentials)
	}

	/// `grant_type=authorization_code` with an optional `redirect_uri`.
	pub fn authorization_code(code: impl Into<String>, redirect_uri: Option<Url>) -> Self {
		Self::new(Grant::AuthorizationCode { code: TokenSecret::new(code), redirect_uri })
	}

	/// `grant_type=refresh_token`.
	pub fn refresh(refresh_token: impl Into<TokenSecret>) -> Self {
		Self::new(Grant::RefreshToken { refresh_token: refresh_token.into() })
	}

	/// `grant_type=password`.
	pub fn user_credentials(username: impl Into<String>, password: impl Into<String>) -> Self {
		Self::new(Grant::UserCredentials {
			username: username.into(),
			password: TokenSecret::new(password),
		})
	}

	/// Binds the issued token to `user_id` unless the server echoes an owner back.
	pub fn for_user(mut self, user_id: UserId) -> Self {
		self.owner = Some(user_id);

		self
	}

	/// Overrides the HTTP method.
	pub fn with_method(mut self, method: Method) -> Self {
		self.method = method;

		self
	}

	/// Adds or replaces a request header.
	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Replaces the transport options.
	pub fn with_options(mut self, options: RequestOptions) -> Self {
		self.options = options;

		self
	}

	/// Grant parameters.
	pub fn grant(&self) -> &Grant {
		&self.grant
	}

	/// Grant type discriminator.
	pub fn grant_type(&self) -> GrantType {
		self.grant.grant_type()
	}

	/// User the issued token is stamped with.
	pub fn owner(&self) -> Option<UserId> {
		self.owner
	}

	/// HTTP method.
	pub fn method(&self) -> &Method {
		&self.method
	}

	/// Extra request headers.
	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	/// Transport options.
	pub fn options(&self) -> &RequestOptions {
		&self.options
	}
}
impl TryFrom<Request> for TokenRequest {
	type Error = Error;

	fn try_from(value: Request) -> Result<Self> {
		match value {
			Request::Token(request) => Ok(request),
			Request::Resource(_) =>
				Err(Error::invalid_request_kind("expected a token request, found a resource request")),
		}
	}
}

/// API call authorized with the bearer token of its subject.
#[derive(Clone, Debug)]
pub struct ResourceRequest {
	subject: Subject,
	method: Method,
	uri: String,
	headers: HeaderMap,
	body: Option<Vec<u8>>,
	options: RequestOptions,
}
impl ResourceRequest {
	/// Creates a request for `subject`; `uri` is absolute or relative to the API base URL.
	pub fn new(subject: Subject, method: Method, uri: impl Into<String>) -> Self {
		Self {
			subject,
			method,
			uri: uri.into(),
			headers: HeaderMap::new(),
			body: None,
			options: RequestOptions::default(),
		}
	}

	/// Request acting for the client itself.
	pub fn client(method: Method, uri: impl Into<String>) -> Self {
		Self::new(Subject::Client, method, uri)
	}

	/// Request acting for `user_id`.
	pub fn user(user_id: UserId, method: Method, uri: impl Into<String>) -> Self {
		Self::new(Subject::User(user_id), method, uri)
	}

	/// Adds or replaces a request header.
	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Sets an opaque request body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Replaces the transport options.
	pub fn with_options(mut self, options: RequestOptions) -> Self {
		self.options = options;

		self
	}

	/// Subject the bearer token is resolved for.
	pub fn subject(&self) -> Subject {
		self.subject
	}

	/// Owning user for user requests.
	pub fn user_id(&self) -> Option<UserId> {
		self.subject.user_id()
	}

	/// HTTP method.
	pub fn method(&self) -> &Method {
		&self.method
	}

	/// Target URI as supplied.
	pub fn uri(&self) -> &str {
		&self.uri
	}

	/// Extra request headers.
	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	/// Opaque body.
	pub fn body(&self) -> Option<&[u8]> {
		self.body.as_deref()
	}

	/// Transport options.
	pub fn options(&self) -> &RequestOptions {
		&self.options
	}
}
impl TryFrom<Request> for ResourceRequest {
	type Error = Error;

	fn try_from(value: Request) -> Result<Self> {
		match value {
			Request::Resource(request) => Ok(request),
			Request::Token(_) =>
				Err(Error::invalid_request_kind("expected a resource request, found a token request")),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn classifier_follows_variant_tags() {
		let token = Request::from(TokenRequest::client_credentials());
		let client = Request::from(ResourceRequest::client(Method::GET, "/me"));
		let user = Request::from(ResourceRequest::user(UserId::new(3), Method::GET, "/me"));

		assert_eq!(token.class(), RequestClass::TokenAcquisition);
		assert_eq!(client.class(), RequestClass::ClientResource);
		assert_eq!(user.class(), RequestClass::UserResource);
	}

	#[test]
	fn token_requests_default_to_post() {
		let request = TokenRequest::authorization_code("code", None).for_user(UserId::new(9));

		assert_eq!(request.method(), Method::POST);
		assert_eq!(request.grant_type(), GrantType::AuthorizationCode);
		assert_eq!(request.owner(), Some(UserId::new(9)));
		assert_eq!(
			TokenRequest::client_credentials().with_method(Method::PUT).method(),
			Method::PUT
		);
	}

	#[test]
	fn family_conversions_reject_the_other_family() {
		let err = TokenRequest::try_from(Request::from(ResourceRequest::client(Method::GET, "/")))
			.expect_err("Resource requests are not token requests.");

		assert!(matches!(err, Error::InvalidRequestKind { .. }));
		assert!(ResourceRequest::try_from(Request::from(TokenRequest::client_credentials())).is_err());
		assert!(TokenRequest::try_from(Request::from(TokenRequest::client_credentials())).is_ok());
	}
}
