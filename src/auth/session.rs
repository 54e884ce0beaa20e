//! Session records and the user attributes they are built from.

// self
use crate::{_prelude::*, auth::SessionId};

/// Persisted session, keyed by [`SessionId`].
///
/// Serialized field names match the store schema consulted by the edge layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
	/// Primary key.
	#[serde(rename = "sessionid")]
	pub session_id: SessionId,
	/// Identity-provider username of the signed-in user.
	pub username: String,
	/// `email` attribute, absent only when the email policy allows it.
	pub email: Option<String>,
}

/// Attributes returned by the identity provider's user lookup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserProfile {
	/// Identity-provider username.
	pub username: String,
	/// Attribute name/value pairs in provider order.
	pub attributes: Vec<(String, String)>,
}
impl UserProfile {
	/// Returns the first attribute with the provided name.
	pub fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
	}

	/// Shorthand for the `email` attribute.
	pub fn email(&self) -> Option<&str> {
		self.attribute("email")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn session_serializes_with_store_schema() {
		let session = Session {
			session_id: SessionId::new("sid-1").expect("Session id fixture should be valid."),
			username: "alice".into(),
			email: Some("a@b.com".into()),
		};
		let payload = serde_json::to_value(&session).expect("Session should serialize.");

		assert_eq!(
			payload,
			serde_json::json!({ "sessionid": "sid-1", "username": "alice", "email": "a@b.com" })
		);
	}

	#[test]
	fn attribute_lookup_takes_first_match() {
		let profile = UserProfile {
			username: "alice".into(),
			attributes: vec![
				("sub".into(), "1234".into()),
				("email".into(), "a@b.com".into()),
				("email".into(), "second@b.com".into()),
			],
		};

		assert_eq!(profile.email(), Some("a@b.com"));
		assert_eq!(profile.attribute("phone_number"), None);
	}
}
