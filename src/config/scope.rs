//! Scopes requested at the authorization endpoint.

// self
use crate::_prelude::*;

/// A requested scope was empty or contained whitespace.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Scope `{scope}` is empty or contains whitespace.")]
pub struct InvalidScope {
	/// The offending scope string.
	pub scope: String,
}

/// Scopes in the order they were configured, without duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scopes(Vec<String>);
impl Scopes {
	/// Validates `scopes`, keeping the first occurrence of each entry in place.
	pub fn new<I, S>(scopes: I) -> Result<Self, InvalidScope>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut ordered = Vec::<String>::new();

		for scope in scopes {
			let scope = scope.into();

			if scope.is_empty() || scope.chars().any(char::is_whitespace) {
				return Err(InvalidScope { scope });
			}
			if !ordered.contains(&scope) {
				ordered.push(scope);
			}
		}

		Ok(Self(ordered))
	}

	/// Returns true if no scopes are configured.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Space-delimited value of the `scope` query parameter.
	pub fn to_param(&self) -> String {
		self.0.join(" ")
	}
}
impl Display for Scopes {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.to_param())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn configured_order_is_kept() {
		let scopes = Scopes::new(["aws.cognito.signin.user.admin", "openid", "email", "openid"])
			.expect("Scope list should be valid.");

		assert_eq!(scopes.to_param(), "aws.cognito.signin.user.admin openid email");
	}

	#[test]
	fn malformed_scopes_are_rejected() {
		assert_eq!(Scopes::new([""]), Err(InvalidScope { scope: String::new() }));
		assert_eq!(
			Scopes::new(["openid", "contains space"]),
			Err(InvalidScope { scope: "contains space".into() })
		);
	}
}
