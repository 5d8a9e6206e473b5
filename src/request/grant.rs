//! Grant parameters contributed by token requests.

// crates.io
use url::form_urlencoded::Serializer;
// self
use crate::{_prelude::*, auth::TokenSecret};

/// OAuth 2.0 grant types understood by the token endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// `client_credentials`.
	ClientCredentials,
	/// `authorization_code`.
	AuthorizationCode,
	/// `refresh_token`.
	RefreshToken,
	/// `password` (resource owner credentials).
	#[serde(rename = "password")]
	UserCredentials,
}
impl GrantType {
	/// Wire value sent as `grant_type`.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::ClientCredentials => "client_credentials",
			Self::AuthorizationCode => "authorization_code",
			Self::RefreshToken => "refresh_token",
			Self::UserCredentials => "password",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Grant-specific parameters; they become the token request body.
///
/// Secret-bearing parameters are stored as [`TokenSecret`] so `Debug` output stays redacted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Grant {
	/// The client authenticates as itself.
	ClientCredentials,
	/// Exchange of an authorization code obtained out of band.
	AuthorizationCode {
		/// Authorization code.
		code: TokenSecret,
		/// Redirect URI used when the code was issued.
		redirect_uri: Option<Url>,
	},
	/// Rotation of an existing refresh token.
	RefreshToken {
		/// Refresh token to redeem.
		refresh_token: TokenSecret,
	},
	/// Resource owner password credentials.
	UserCredentials {
		/// End-user login.
		username: String,
		/// End-user password.
		password: TokenSecret,
	},
}
impl Grant {
	/// Grant type discriminator.
	pub const fn grant_type(&self) -> GrantType {
		match self {
			Self::ClientCredentials => GrantType::ClientCredentials,
			Self::AuthorizationCode { .. } => GrantType::AuthorizationCode,
			Self::RefreshToken { .. } => GrantType::RefreshToken,
			Self::UserCredentials { .. } => GrantType::UserCredentials,
		}
	}

	/// Ordered `(name, value)` parameters, `grant_type` first.
	pub fn params(&self) -> Vec<(&'static str, &str)> {
		let mut params = vec![("grant_type", self.grant_type().as_str())];

		match self {
			Self::ClientCredentials => {},
			Self::AuthorizationCode { code, redirect_uri } => {
				params.push(("code", code.expose()));

				if let Some(redirect_uri) = redirect_uri {
					params.push(("redirect_uri", redirect_uri.as_str()));
				}
			},
			Self::RefreshToken { refresh_token } => {
				params.push(("refresh_token", refresh_token.expose()));
			},
			Self::UserCredentials { username, password } => {
				params.push(("username", username.as_str()));
				params.push(("password", password.expose()));
			},
		}

		params
	}

	/// Form-urlencoded request body.
	pub fn form_body(&self) -> String {
		Serializer::new(String::new()).extend_pairs(self.params()).finish()
	}
}
