//! Session identifiers: the only key material placed in the browser-visible session cookie.

// std
use std::{borrow::Borrow, ops::Deref, str::FromStr};
// crates.io
use uuid::Builder as UuidBuilder;
// self
use crate::{_prelude::*, auth::state};

const SESSION_ID_MAX_LEN: usize = 128;

/// Opaque, globally unique handle for a persisted session.
///
/// Fresh identifiers are random version-4 UUIDs drawn from the operating system RNG. Values read
/// back from cookies go through the same validation as deserialized ones.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);
impl SessionId {
	/// Generates a new random identifier.
	pub fn generate() -> Result<Self> {
		let bytes = state::random_bytes::<16>()
			.map_err(|source| Error::SessionIdGeneration { source })?;

		Ok(Self(UuidBuilder::from_random_bytes(bytes).into_uuid().to_string()))
	}

	/// Validates an identifier received from a cookie or a collaborator.
	pub fn new(value: impl AsRef<str>) -> Result<Self, SessionIdError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Deref for SessionId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for SessionId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for SessionId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<SessionId> for String {
	fn from(value: SessionId) -> Self {
		value.0
	}
}
impl TryFrom<String> for SessionId {
	type Error = SessionIdError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl FromStr for SessionId {
	type Err = SessionIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for SessionId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "SessionId({})", self.0)
	}
}
impl Display for SessionId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Error returned when a session identifier fails validation.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum SessionIdError {
	/// The identifier was empty.
	#[error("Session identifier cannot be empty.")]
	Empty,
	/// The identifier contains characters that cannot appear in a cookie value.
	#[error("Session identifier contains whitespace or cookie delimiters.")]
	InvalidCharacter,
	/// The identifier exceeded the allowed character count.
	#[error("Session identifier exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

fn validate_view(view: &str) -> Result<(), SessionIdError> {
	if view.is_empty() {
		return Err(SessionIdError::Empty);
	}
	if view.chars().any(|c| c.is_whitespace() || c.is_control() || matches!(c, ';' | ',' | '"')) {
		return Err(SessionIdError::InvalidCharacter);
	}
	if view.len() > SESSION_ID_MAX_LEN {
		return Err(SessionIdError::TooLong { max: SESSION_ID_MAX_LEN });
	}

	Ok(())
}
