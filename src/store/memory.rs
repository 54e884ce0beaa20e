//! Thread-safe in-memory [`SessionStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{Session, SessionId},
	store::{SessionStore, StoreFuture},
};

type SessionMap = Arc<RwLock<HashMap<SessionId, Session>>>;

/// Storage backend that keeps session records in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(SessionMap);
impl MemoryStore {
	/// Number of stored sessions.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns true when no sessions are stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	/// Snapshot of every stored session.
	pub fn sessions(&self) -> Vec<Session> {
		self.0.read().values().cloned().collect()
	}
}
impl SessionStore for MemoryStore {
	fn put(&self, session: Session) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().insert(session.session_id.clone(), session);

			Ok(())
		})
	}

	fn get<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, Option<Session>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(id).cloned()) })
	}

	fn delete<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, bool> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.write().remove(id).is_some()) })
	}
}
