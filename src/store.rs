//! Persistence contract for issued tokens and the built-in in-memory implementation.
//!
//! Stores are shared across orchestrator instances (and often processes) and are the source of
//! truth on cold start. Tokens are partitioned by client configuration name and subject.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{ClientName, Subject, Token, UserId},
};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract implemented by token stores.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Fetches the client token persisted for `client`, if present.
	fn load_client_token<'a>(&'a self, client: &'a ClientName) -> StoreFuture<'a, Option<Token>>;

	/// Fetches the token persisted for `user` under `client`, if present.
	fn load_user_token<'a>(
		&'a self,
		client: &'a ClientName,
		user: UserId,
	) -> StoreFuture<'a, Option<Token>>;

	/// Persists or replaces `token`; its owner decides between the client and a user slot.
	fn save_token<'a>(&'a self, client: &'a ClientName, token: Token) -> StoreFuture<'a, ()>;
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Unique key identifying a stored token.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreKey {
	/// Client configuration the token was issued to.
	pub client: ClientName,
	/// Subject the token acts for.
	pub subject: Subject,
}
impl StoreKey {
	/// Builds a key for `subject` under `client`.
	pub fn new(client: &ClientName, subject: Subject) -> Self {
		Self { client: client.clone(), subject }
	}

	/// Builds the key a token is filed under.
	pub fn for_token(client: &ClientName, token: &Token) -> Self {
		Self::new(client, token.subject())
	}
}
