//! Thread-safe in-memory [`TokenStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{ClientName, Subject, Token, UserId},
	store::{StoreError, StoreFuture, StoreKey, TokenStore},
};

type StoreMap = Arc<RwLock<HashMap<StoreKey, Token>>>;

/// Storage backend that keeps tokens in-process; clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Number of persisted tokens.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when nothing is persisted.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn save_now(map: StoreMap, key: StoreKey, token: Token) -> Result<(), StoreError> {
		map.write().insert(key, token);

		Ok(())
	}

	fn load_now(map: StoreMap, key: StoreKey) -> Option<Token> {
		map.read().get(&key).cloned()
	}
}
impl TokenStore for MemoryStore {
	fn load_client_token<'a>(&'a self, client: &'a ClientName) -> StoreFuture<'a, Option<Token>> {
		let map = self.0.clone();
		let key = StoreKey::new(client, Subject::Client);

		Box::pin(async move { Ok(Self::load_now(map, key)) })
	}

	fn load_user_token<'a>(
		&'a self,
		client: &'a ClientName,
		user: UserId,
	) -> StoreFuture<'a, Option<Token>> {
		let map = self.0.clone();
		let key = StoreKey::new(client, Subject::User(user));

		Box::pin(async move { Ok(Self::load_now(map, key)) })
	}

	fn save_token<'a>(&'a self, client: &'a ClientName, token: Token) -> StoreFuture<'a, ()> {
		let map = self.0.clone();
		let key = StoreKey::for_token(client, &token);

		Box::pin(async move { Self::save_now(map, key, token) })
	}
}
