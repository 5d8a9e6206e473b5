//! Issued token values, their builder, and the token-endpoint wire form.

// crates.io
use serde::{Deserializer, de::Error as _};
// self
use crate::{
	_prelude::*,
	auth::{Subject, UserId, token::secret::TokenSecret},
};

const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Errors produced by [`TokenBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum TokenBuilderError {
	/// Issued when no (or an empty) access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when the relative lifetime is negative.
	#[error("The expires_in value must not be negative.")]
	NegativeExpiresIn,
}

/// Token issued by the authorization server.
///
/// A token is a value: it is never edited in place. Newer tokens from the same acquisition or
/// refresh flow replace it wholesale, and [`Token::with_owner`] returns a stamped copy.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
	access_token: TokenSecret,
	refresh_token: Option<TokenSecret>,
	token_type: String,
	scope: Option<String>,
	expires_in: Option<i64>,
	owner: Option<UserId>,
	issued_at: OffsetDateTime,
}
impl Token {
	/// Returns a builder for assembling tokens by hand.
	pub fn builder() -> TokenBuilder {
		TokenBuilder::default()
	}

	/// Converts a decoded token-endpoint response into a token.
	pub fn from_response(response: TokenResponse) -> Result<Self, TokenBuilderError> {
		let mut builder = Self::builder()
			.access_token(response.access_token)
			.token_type(response.token_type);

		if let Some(refresh) = response.refresh_token {
			builder = builder.refresh_token(refresh);
		}
		if let Some(scope) = response.scope {
			builder = builder.scope(scope);
		}
		if let Some(expires_in) = response.expires_in {
			builder = builder.expires_in(expires_in);
		}
		if let Some(owner) = response.user_id {
			builder = builder.owner(owner);
		}

		builder.build()
	}

	/// Access token secret presented as the bearer credential.
	pub fn access_token(&self) -> &TokenSecret {
		&self.access_token
	}

	/// Refresh token secret, if the server issued one.
	pub fn refresh_token(&self) -> Option<&TokenSecret> {
		self.refresh_token.as_ref()
	}

	/// Token type reported by the server (e.g. `Bearer`).
	pub fn token_type(&self) -> &str {
		&self.token_type
	}

	/// Scope string reported by the server.
	pub fn scope(&self) -> Option<&str> {
		self.scope.as_deref()
	}

	/// Relative lifetime in seconds, as issued.
	pub fn expires_in(&self) -> Option<i64> {
		self.expires_in
	}

	/// Owning user; `None` for client tokens.
	pub fn owner(&self) -> Option<UserId> {
		self.owner
	}

	/// Instant the token was received.
	pub fn issued_at(&self) -> OffsetDateTime {
		self.issued_at
	}

	/// Returns `true` when the token belongs to an end user.
	pub fn is_user_token(&self) -> bool {
		self.owner.is_some()
	}

	/// Subject this token acts for.
	pub fn subject(&self) -> Subject {
		Subject::from_owner(self.owner)
	}

	/// Absolute expiry derived from `issued_at + expires_in`, when a lifetime was issued.
	///
	/// Informational only: the orchestrator discovers expiry reactively through 401 responses.
	/// Lifetimes beyond the representable date range yield `None`.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.expires_in.and_then(|secs| self.issued_at.checked_add(Duration::seconds(secs)))
	}

	/// Returns `true` when a known expiry lies at or before `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at().is_some_and(|expires_at| instant >= expires_at)
	}

	/// Returns a copy stamped with the owning user.
	pub fn with_owner(mut self, owner: UserId) -> Self {
		self.owner = Some(owner);

		self
	}

	/// Files the token under `subject`, replacing any owner the server echoed back.
	pub(crate) fn for_subject(mut self, subject: Subject) -> Self {
		self.owner = subject.user_id();

		self
	}

	/// Stamps `owner` unless the server already echoed one back.
	pub(crate) fn stamp_owner(self, owner: Option<UserId>) -> Self {
		match (self.owner, owner) {
			(None, Some(owner)) => self.with_owner(owner),
			_ => self,
		}
	}

	/// Keeps `previous` as the refresh token when a refresh response omitted a new one.
	pub(crate) fn retain_refresh_token(mut self, previous: &TokenSecret) -> Self {
		if self.refresh_token.is_none() {
			self.refresh_token = Some(previous.clone());
		}

		self
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("token_type", &self.token_type)
			.field("scope", &self.scope)
			.field("expires_in", &self.expires_in)
			.field("owner", &self.owner)
			.field("issued_at", &self.issued_at)
			.finish()
	}
}

/// Builder for [`Token`].
#[derive(Clone, Debug, Default)]
pub struct TokenBuilder {
	access_token: Option<TokenSecret>,
	refresh_token: Option<TokenSecret>,
	token_type: Option<String>,
	scope: Option<String>,
	expires_in: Option<i64>,
	owner: Option<UserId>,
	issued_at: Option<OffsetDateTime>,
}
impl TokenBuilder {
	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Overrides the token type (defaults to `Bearer`).
	pub fn token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = Some(token_type.into());

		self
	}

	/// Sets the granted scope string.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Sets the relative lifetime in seconds.
	pub fn expires_in(mut self, seconds: i64) -> Self {
		self.expires_in = Some(seconds);

		self
	}

	/// Marks the token as a user token.
	pub fn owner(mut self, owner: UserId) -> Self {
		self.owner = Some(owner);

		self
	}

	/// Sets the issued-at instant (defaults to now).
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Consumes the builder and produces a [`Token`].
	pub fn build(self) -> Result<Token, TokenBuilderError> {
		let access_token = self
			.access_token
			.filter(|secret| !secret.is_empty())
			.ok_or(TokenBuilderError::MissingAccessToken)?;

		if self.expires_in.is_some_and(|secs| secs < 0) {
			return Err(TokenBuilderError::NegativeExpiresIn);
		}

		Ok(Token {
			access_token,
			refresh_token: self.refresh_token,
			token_type: self.token_type.unwrap_or_else(|| DEFAULT_TOKEN_TYPE.into()),
			scope: self.scope,
			expires_in: self.expires_in,
			owner: self.owner,
			issued_at: self.issued_at.unwrap_or_else(OffsetDateTime::now_utc),
		})
	}
}

/// Raw token-endpoint payload (`access_token`, `expires_in`, `token_type`, `scope`,
/// `refresh_token`, and an optional echoed `user_id`).
///
/// Numeric fields accept both JSON numbers and numeric strings so form-encoded replies decode too.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenResponse {
	/// Issued access token.
	pub access_token: String,
	/// Token type; `Bearer` when omitted.
	#[serde(default = "default_token_type")]
	pub token_type: String,
	/// Relative lifetime in seconds.
	#[serde(default, deserialize_with = "lenient_i64", skip_serializing_if = "Option::is_none")]
	pub expires_in: Option<i64>,
	/// Granted scope string.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub scope: Option<String>,
	/// Issued refresh token.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<String>,
	/// Owning user, when the server echoes it back.
	#[serde(default, deserialize_with = "lenient_user_id", skip_serializing_if = "Option::is_none")]
	pub user_id: Option<UserId>,
}
impl TryFrom<TokenResponse> for Token {
	type Error = TokenBuilderError;

	fn try_from(response: TokenResponse) -> Result<Self, Self::Error> {
		Token::from_response(response)
	}
}
impl Debug for TokenResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenResponse")
			.field("access_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("expires_in", &self.expires_in)
			.field("scope", &self.scope)
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("user_id", &self.user_id)
			.finish()
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient {
	Unsigned(u64),
	Signed(i64),
	Text(String),
}

fn default_token_type() -> String {
	DEFAULT_TOKEN_TYPE.into()
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
	D: Deserializer<'de>,
{
	match Option::<Lenient>::deserialize(deserializer)? {
		None => Ok(None),
		Some(Lenient::Unsigned(value)) => i64::try_from(value).map(Some).map_err(D::Error::custom),
		Some(Lenient::Signed(value)) => Ok(Some(value)),
		Some(Lenient::Text(text)) => text.trim().parse().map(Some).map_err(D::Error::custom),
	}
}

fn lenient_user_id<'de, D>(deserializer: D) -> Result<Option<UserId>, D::Error>
where
	D: Deserializer<'de>,
{
	match Option::<Lenient>::deserialize(deserializer)? {
		None => Ok(None),
		Some(Lenient::Unsigned(value)) => Ok(Some(UserId::new(value))),
		Some(Lenient::Signed(value)) =>
			u64::try_from(value).map(|raw| Some(UserId::new(raw))).map_err(D::Error::custom),
		Some(Lenient::Text(text)) => text.parse().map(Some).map_err(D::Error::custom),
	}
}
