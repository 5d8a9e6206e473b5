//! Token subjects: the application itself or a specific end user.

// self
use crate::{_prelude::*, auth::UserId};

/// Who a token (and a resource call) acts for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
	/// The OAuth client acting on its own behalf.
	Client,
	/// A specific end user.
	User(UserId),
}
impl Subject {
	/// Returns the owning user, if any.
	pub fn user_id(self) -> Option<UserId> {
		match self {
			Self::Client => None,
			Self::User(user_id) => Some(user_id),
		}
	}

	/// Maps an optional owner onto a subject.
	pub fn from_owner(owner: Option<UserId>) -> Self {
		owner.map_or(Self::Client, Self::User)
	}
}
impl Display for Subject {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Client => f.write_str("client"),
			Self::User(user_id) => write!(f, "user:{user_id}"),
		}
	}
}
