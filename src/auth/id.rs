//! Strongly typed identifiers for OAuth client configurations and end users.

// std
use std::{borrow::Borrow, num::ParseIntError, ops::Deref};
// self
use crate::_prelude::*;

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier.
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier.
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier.
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Name of an OAuth client configuration; partitions persisted tokens.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientName(String);
impl ClientName {
	const KIND: &'static str = "Client";

	/// Creates a new client name after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
		let view = value.as_ref();

		validate_view(Self::KIND, view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Deref for ClientName {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for ClientName {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for ClientName {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<ClientName> for String {
	fn from(value: ClientName) -> Self {
		value.0
	}
}
impl TryFrom<String> for ClientName {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(Self::KIND, &value)?;

		Ok(Self(value))
	}
}
impl Debug for ClientName {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Client({})", self.0)
	}
}
impl Display for ClientName {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for ClientName {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

/// Identifier of the end user a user token belongs to.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);
impl UserId {
	/// Wraps a raw user identifier.
	pub const fn new(value: u64) -> Self {
		Self(value)
	}

	/// Returns the raw identifier.
	pub const fn get(self) -> u64 {
		self.0
	}
}
impl From<u64> for UserId {
	fn from(value: u64) -> Self {
		Self(value)
	}
}
impl From<UserId> for u64 {
	fn from(value: UserId) -> Self {
		value.0
	}
}
impl Debug for UserId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "User({})", self.0)
	}
}
impl Display for UserId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		Display::fmt(&self.0, f)
	}
}
impl FromStr for UserId {
	type Err = ParseIntError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		s.trim().parse().map(Self)
	}
}

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}
