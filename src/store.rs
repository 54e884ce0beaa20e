//! Session persistence contract and built-in store implementations.
//!
//! Stores are plain key-value tables keyed by [`SessionId`]: writes always use a fresh key and
//! deletes use an exact key. Every call must yield while waiting on I/O so the controller's
//! timeout can fire.

pub mod dynamo;
pub mod file;
pub mod memory;

pub use dynamo::DynamoStore;
pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{Session, SessionId},
};

/// Boxed future returned by [`SessionStore`] implementations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for session records.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Persists a session record under its identifier.
	fn put(&self, session: Session) -> StoreFuture<'_, ()>;

	/// Fetches the record stored under `id`, if present.
	fn get<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, Option<Session>>;

	/// Removes the record stored under `id`, returning whether one existed.
	fn delete<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, bool>;
}

/// Error type produced by [`SessionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
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
	/// The operation did not finish within the upstream timeout.
	#[error("Session store {operation} timed out after {timeout:?}.")]
	Timeout {
		/// Store operation label.
		operation: &'static str,
		/// Deadline that elapsed.
		timeout: StdDuration,
	},
}

/// Runs a store operation under `timeout`, mapping elapsed deadlines to [`StoreError::Timeout`].
pub async fn with_timeout<T>(
	operation: &'static str,
	timeout: StdDuration,
	fut: StoreFuture<'_, T>,
) -> Result<T, StoreError> {
	tokio::time::timeout(timeout, fut)
		.await
		.map_err(|_| StoreError::Timeout { operation, timeout })?
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn store_error_converts_into_controller_error_with_source() {
		let store_error = StoreError::Backend { message: "table unreachable".into() };
		let err = Error::SessionPersist(store_error.clone());
		let source =
			StdError::source(&err).expect("Controller error should expose the store error.");

		assert_eq!(source.to_string(), store_error.to_string());
		assert!(err.chain().contains("table unreachable"));
	}

	#[tokio::test]
	async fn slow_operations_time_out() {
		let fut: StoreFuture<'_, ()> = Box::pin(async {
			tokio::time::sleep(StdDuration::from_secs(60)).await;

			Ok(())
		});
		let timeout = StdDuration::from_millis(20);
		let err = with_timeout("put", timeout, fut)
			.await
			.expect_err("Sleeping store call should time out.");

		assert_eq!(err, StoreError::Timeout { operation: "put", timeout });
	}
}
