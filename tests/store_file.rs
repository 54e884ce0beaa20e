// std
use std::{fs, path::PathBuf};
// self
use monolith_auth::{
	auth::{Session, SessionId},
	store::{FileStore, SessionStore, StoreError},
};

fn temp_path(label: &str) -> PathBuf {
	std::env::temp_dir()
		.join(format!("monolith-auth-{label}-{}", uuid::Uuid::new_v4()))
		.join("sessions.json")
}

fn session(id: &str) -> Session {
	Session {
		session_id: SessionId::new(id).expect("Session id fixture should be valid."),
		username: "alice".into(),
		email: Some("a@b.com".into()),
	}
}

#[tokio::test]
async fn sessions_survive_reopen() {
	let path = temp_path("reopen");
	let store = FileStore::open(&path).expect("Opening a fresh file store should succeed.");

	store.put(session("sid-1")).await.expect("Saving a session should succeed.");
	store.put(session("sid-2")).await.expect("Saving a session should succeed.");
	assert!(store.delete(&session("sid-2").session_id).await.expect("Delete should succeed."));

	let reopened = FileStore::open(&path).expect("Reopening the file store should succeed.");
	let fetched = reopened
		.get(&session("sid-1").session_id)
		.await
		.expect("Fetching a session should succeed.");

	assert_eq!(fetched, Some(session("sid-1")));
	assert_eq!(
		reopened.get(&session("sid-2").session_id).await.expect("Fetching should succeed."),
		None
	);

	let raw: serde_json::Value = serde_json::from_slice(
		&fs::read(&path).expect("Snapshot file should be readable."),
	)
	.expect("Snapshot file should be JSON.");

	assert_eq!(
		raw,
		serde_json::json!([{ "sessionid": "sid-1", "username": "alice", "email": "a@b.com" }])
	);

	let _ = fs::remove_dir_all(path.parent().expect("Temp path should have a parent."));
}

#[test]
fn corrupt_snapshot_is_rejected() {
	let path = temp_path("corrupt");
	let dir = path.parent().expect("Temp path should have a parent.");

	fs::create_dir_all(dir).expect("Temp directory should be creatable.");
	fs::write(&path, b"{not json").expect("Corrupt fixture should be writable.");

	assert!(matches!(FileStore::open(&path), Err(StoreError::Serialization { .. })));

	let _ = fs::remove_dir_all(dir);
}
