//! File-backed [`SessionStore`] that keeps the session table in a JSON snapshot.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// crates.io
use async_lock::MutexGuardArc;
// self
use crate::{
	_prelude::*,
	auth::{Session, SessionId},
	store::{SessionStore, StoreError, StoreFuture},
};

/// Persists the session table to a JSON file after each mutation.
///
/// The file holds an array of `{sessionid, username, email}` rows and is replaced atomically
/// (write to a sibling `.tmp`, fsync, rename) on the blocking pool. Mutations are serialized
/// through an async gate and only reach the in-memory table once the snapshot is on disk, so
/// readers never observe a record that was not persisted.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<HashMap<SessionId, Session>>>,
	write_gate: Arc<AsyncMutex<()>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing rows.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self {
			path,
			inner: Arc::new(RwLock::new(snapshot)),
			write_gate: Arc::new(AsyncMutex::new(())),
		})
	}

	/// Location of the snapshot file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<HashMap<SessionId, Session>, StoreError> {
		if !path.exists() {
			return Ok(HashMap::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.is_empty() {
			return Ok(HashMap::new());
		}

		let rows: Vec<Session> =
			serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
				message: format!("Failed to parse {}: {e}", path.display()),
			})?;

		Ok(rows.into_iter().map(|session| (session.session_id.clone(), session)).collect())
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	/// Writes `rows` on the blocking pool.
	///
	/// The gate travels with the write and comes back on success; if the caller stops waiting,
	/// the gate is released only once the write has finished.
	async fn persist(
		&self,
		gate: MutexGuardArc<()>,
		rows: Vec<Session>,
	) -> Result<MutexGuardArc<()>, StoreError> {
		let path = self.path.clone();
		let (gate, result) = tokio::task::spawn_blocking(move || {
			let result = write_snapshot(&path, &rows);

			(gate, result)
		})
		.await
		.map_err(|e| StoreError::Backend { message: format!("Snapshot writer failed: {e}") })?;

		result.map(|()| gate)
	}
}
impl SessionStore for FileStore {
	fn put(&self, session: Session) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let gate = self.write_gate.lock_arc().await;
			let mut rows = self.inner.read().clone();

			rows.insert(session.session_id.clone(), session.clone());

			let _gate = self.persist(gate, rows.into_values().collect()).await?;

			self.inner.write().insert(session.session_id.clone(), session);

			Ok(())
		})
	}

	fn get<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, Option<Session>> {
		Box::pin(async move { Ok(self.inner.read().get(id).cloned()) })
	}

	fn delete<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, bool> {
		Box::pin(async move {
			let gate = self.write_gate.lock_arc().await;
			let mut rows = self.inner.read().clone();

			if rows.remove(id).is_none() {
				return Ok(false);
			}

			let _gate = self.persist(gate, rows.into_values().collect()).await?;

			self.inner.write().remove(id);

			Ok(true)
		})
	}
}

fn write_snapshot(path: &Path, rows: &[Session]) -> Result<(), StoreError> {
	let serialized = serde_json::to_vec_pretty(rows).map_err(|e| StoreError::Serialization {
		message: format!("Failed to serialize session table: {e}"),
	})?;
	let mut tmp_path = path.to_path_buf();

	tmp_path.set_extension("tmp");

	{
		let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
			message: format!("Failed to create {}: {e}", tmp_path.display()),
		})?;

		file.write_all(&serialized).map_err(|e| StoreError::Backend {
			message: format!("Failed to write {}: {e}", tmp_path.display()),
		})?;
		file.sync_all().map_err(|e| StoreError::Backend {
			message: format!("Failed to sync {}: {e}", tmp_path.display()),
		})?;
	}

	fs::rename(&tmp_path, path).map_err(|e| StoreError::Backend {
		message: format!("Failed to replace {}: {e}", path.display()),
	})
}
