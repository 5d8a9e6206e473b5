//! In-memory token cache backed by a pluggable [`TokenStore`].
//!
//! Entries are populated lazily from persistence on the first lookup per key, overwritten on
//! every acquisition or refresh, and never expired by wall-clock time. Writes go through to the
//! store.

// self
use crate::{
	_prelude::*,
	auth::{ClientName, Subject, Token, UserId},
	store::TokenStore,
};

/// Holder of the current client token and the per-user tokens of one client configuration.
pub struct TokenCache {
	client: ClientName,
	store: Arc<dyn TokenStore>,
	client_token: RwLock<Option<Token>>,
	user_tokens: RwLock<HashMap<UserId, Token>>,
	guards: Mutex<HashMap<Subject, Arc<AsyncMutex<()>>>>,
}
impl TokenCache {
	/// Creates an empty cache for `client` persisting through `store`.
	pub fn new(client: ClientName, store: Arc<dyn TokenStore>) -> Self {
		Self {
			client,
			store,
			client_token: RwLock::new(None),
			user_tokens: RwLock::new(HashMap::new()),
			guards: Mutex::new(HashMap::new()),
		}
	}

	/// Client configuration the cache belongs to.
	pub fn client(&self) -> &ClientName {
		&self.client
	}

	/// Backing store.
	pub fn store(&self) -> &Arc<dyn TokenStore> {
		&self.store
	}

	/// Returns the client token, consulting persistence on a miss.
	pub async fn client_token(&self) -> Result<Option<Token>> {
		if let Some(token) = self.client_token.read().clone() {
			return Ok(Some(token));
		}

		let loaded = self.store.load_client_token(&self.client).await?;

		if let Some(token) = &loaded {
			*self.client_token.write() = Some(token.clone());
		}

		Ok(loaded)
	}

	/// Returns the token of `user`, consulting persistence on a miss.
	pub async fn user_token(&self, user: UserId) -> Result<Option<Token>> {
		if let Some(token) = self.user_tokens.read().get(&user).cloned() {
			return Ok(Some(token));
		}

		let loaded = self.store.load_user_token(&self.client, user).await?;

		if let Some(token) = &loaded {
			self.user_tokens.write().insert(user, token.clone());
		}

		Ok(loaded)
	}

	/// Returns the token acting for `subject`.
	pub async fn token_for(&self, subject: Subject) -> Result<Option<Token>> {
		match subject {
			Subject::Client => self.client_token().await,
			Subject::User(user) => self.user_token(user).await,
		}
	}

	/// Stores `token` under its owner (or as the client token) and writes it through.
	pub async fn put(&self, token: Token) -> Result<()> {
		match token.owner() {
			Some(user) => {
				self.user_tokens.write().insert(user, token.clone());
			},
			None => {
				*self.client_token.write() = Some(token.clone());
			},
		}

		self.store.save_token(&self.client, token).await?;

		Ok(())
	}

	/// Returns the in-memory entry for `subject` without touching persistence.
	pub fn cached(&self, subject: Subject) -> Option<Token> {
		match subject {
			Subject::Client => self.client_token.read().clone(),
			Subject::User(user) => self.user_tokens.read().get(&user).cloned(),
		}
	}

	/// Returns (and creates on demand) the single-flight guard for `subject`.
	pub(crate) fn guard(&self, subject: Subject) -> Arc<AsyncMutex<()>> {
		let mut guards = self.guards.lock();

		guards.entry(subject).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}
}
impl Debug for TokenCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache")
			.field("client", &self.client)
			.field("client_token_cached", &self.client_token.read().is_some())
			.field("user_tokens_cached", &self.user_tokens.read().len())
			.finish()
	}
}
