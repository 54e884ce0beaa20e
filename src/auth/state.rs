//! CSRF state tokens that bind a callback to a sign-in attempt started by this service.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{TryRngCore, rngs::OsRng};
// self
use crate::{_prelude::*, error::BoxError};

const STATE_BYTES: usize = 32;

/// Opaque random value carried by the state cookie and echoed back by the identity provider.
#[derive(Clone, PartialEq, Eq)]
pub struct StateToken(String);
impl StateToken {
	/// Draws a new token from the operating system RNG.
	pub fn generate() -> Result<Self> {
		let bytes = random_bytes::<STATE_BYTES>().map_err(|source| Error::StateGeneration { source })?;

		Ok(Self(URL_SAFE_NO_PAD.encode(bytes)))
	}

	/// Returns the encoded token.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Debug for StateToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("StateToken").field(&self.0).finish()
	}
}
impl Display for StateToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Checks the attempt cookie against the `state` query value.
///
/// A missing cookie is [`Error::MissingAttemptContext`]. Any difference, including both sides
/// being empty, is [`Error::StateMismatch`].
pub fn validate_state(cookie_state: Option<&str>, returned_state: Option<&str>) -> Result<()> {
	let expected = cookie_state
		.ok_or(Error::MissingAttemptContext { cookie: crate::cookie::STATE_COOKIE_NAME })?;

	match returned_state {
		Some(returned) if !expected.is_empty() && returned == expected => Ok(()),
		_ => Err(Error::StateMismatch),
	}
}

pub(crate) fn random_bytes<const N: usize>() -> Result<[u8; N], BoxError> {
	let mut bytes = [0_u8; N];

	OsRng.try_fill_bytes(&mut bytes).map_err(BoxError::from)?;

	Ok(bytes)
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashSet;
	// self
	use super::*;

	#[test]
	fn tokens_are_url_safe_and_high_entropy() {
		let token = StateToken::generate().expect("OS RNG should be available in tests.");

		assert_eq!(token.as_str().len(), 43);
		assert!(token.as_str().chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
	}

	#[test]
	fn tokens_are_distinct_across_attempts() {
		let tokens: HashSet<_> = (0..10_000)
			.map(|_| StateToken::generate().expect("OS RNG should be available in tests.").0)
			.collect();

		assert_eq!(tokens.len(), 10_000);
	}

	#[test]
	fn validation_requires_cookie_and_exact_match() {
		assert!(validate_state(Some("expected"), Some("expected")).is_ok());
		assert!(matches!(
			validate_state(None, Some("expected")),
			Err(Error::MissingAttemptContext { .. })
		));
		assert!(matches!(validate_state(Some("expected"), Some("other")), Err(Error::StateMismatch)));
		assert!(matches!(validate_state(Some("expected"), None), Err(Error::StateMismatch)));
		assert!(matches!(validate_state(Some("Expected"), Some("expected")), Err(Error::StateMismatch)));
	}

	#[test]
	fn empty_values_never_match() {
		assert!(matches!(validate_state(Some(""), Some("")), Err(Error::StateMismatch)));
		assert!(matches!(validate_state(Some(""), None), Err(Error::StateMismatch)));
	}
}
