//! [`SessionStore`] backed by a managed key-value table.

// crates.io
use aws_config::SdkConfig;
use aws_sdk_dynamodb::{
	Client, Config as DynamoConfig,
	config::Region,
	error::DisplayErrorContext,
	types::{AttributeValue, ReturnValue},
};
// self
use crate::{
	_prelude::*,
	auth::{Session, SessionId},
	store::{SessionStore, StoreError, StoreFuture},
};

const SESSION_ID: &str = "sessionid";
const USERNAME: &str = "username";
const EMAIL: &str = "email";

/// Stores one item per session, keyed by the `sessionid` string attribute, with `username` and
/// `email` alongside. A user without an email gets a null `email` attribute.
#[derive(Clone, Debug)]
pub struct DynamoStore {
	client: Client,
	table: String,
}
impl DynamoStore {
	/// Builds a client from the shared SDK configuration; `fallback_region` applies when the
	/// environment names none.
	pub fn new(sdk_config: &SdkConfig, fallback_region: &str, table: impl Into<String>) -> Self {
		let mut builder = DynamoConfig::new(sdk_config).to_builder();

		if sdk_config.region().is_none() {
			builder.set_region(Some(Region::new(fallback_region.to_owned())));
		}

		Self::from_client(Client::from_conf(builder.build()), table)
	}

	/// Uses an existing client.
	pub fn from_client(client: Client, table: impl Into<String>) -> Self {
		Self { client, table: table.into() }
	}

	/// Table name.
	pub fn table(&self) -> &str {
		&self.table
	}
}
impl SessionStore for DynamoStore {
	fn put(&self, session: Session) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let email = session.email.map_or(AttributeValue::Null(true), AttributeValue::S);

			self.client
				.put_item()
				.table_name(&self.table)
				.item(SESSION_ID, AttributeValue::S(session.session_id.to_string()))
				.item(USERNAME, AttributeValue::S(session.username))
				.item(EMAIL, email)
				.send()
				.await
				.map_err(|e| backend("PutItem", e))?;

			Ok(())
		})
	}

	fn get<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, Option<Session>> {
		Box::pin(async move {
			let output = self
				.client
				.get_item()
				.table_name(&self.table)
				.key(SESSION_ID, AttributeValue::S(id.to_string()))
				.consistent_read(true)
				.send()
				.await
				.map_err(|e| backend("GetItem", e))?;

			output.item().map(|item| session_from_item(id, item)).transpose()
		})
	}

	fn delete<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, bool> {
		Box::pin(async move {
			let output = self
				.client
				.delete_item()
				.table_name(&self.table)
				.key(SESSION_ID, AttributeValue::S(id.to_string()))
				.return_values(ReturnValue::AllOld)
				.send()
				.await
				.map_err(|e| backend("DeleteItem", e))?;

			Ok(output.attributes().is_some_and(|attributes| !attributes.is_empty()))
		})
	}
}

fn backend<E>(operation: &'static str, err: E) -> StoreError
where
	E: StdError,
{
	StoreError::Backend { message: format!("{operation}: {}", DisplayErrorContext(err)) }
}

fn session_from_item(
	id: &SessionId,
	item: &HashMap<String, AttributeValue>,
) -> Result<Session, StoreError> {
	let username = item
		.get(USERNAME)
		.and_then(|value| value.as_s().ok())
		.ok_or_else(|| StoreError::Serialization {
			message: format!("Item {id} has no string `{USERNAME}` attribute"),
		})?;
	let email = match item.get(EMAIL) {
		None | Some(AttributeValue::Null(_)) => None,
		Some(AttributeValue::S(email)) => Some(email.clone()),
		Some(_) =>
			return Err(StoreError::Serialization {
				message: format!("Item {id} has a non-string `{EMAIL}` attribute"),
			}),
	};

	Ok(Session { session_id: id.clone(), username: username.clone(), email })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn id() -> SessionId {
		SessionId::new("sid-1").expect("Session id fixture should be valid.")
	}

	#[test]
	fn item_with_null_email_decodes() {
		let item = HashMap::from([
			(SESSION_ID.to_owned(), AttributeValue::S("sid-1".into())),
			(USERNAME.to_owned(), AttributeValue::S("bob".into())),
			(EMAIL.to_owned(), AttributeValue::Null(true)),
		]);
		let session = session_from_item(&id(), &item).expect("Item should decode.");

		assert_eq!(session.username, "bob");
		assert_eq!(session.email, None);
	}

	#[test]
	fn item_without_username_is_rejected() {
		let item = HashMap::from([(EMAIL.to_owned(), AttributeValue::S("a@b.com".into()))]);

		assert!(matches!(
			session_from_item(&id(), &item),
			Err(StoreError::Serialization { .. })
		));
	}
}
