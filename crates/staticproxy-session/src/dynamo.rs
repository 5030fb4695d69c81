//! DynamoDB-backed session store.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::error::SessionError;
use crate::record::{SESSION_KEY_ATTRIBUTE, SessionRecord};
use crate::store::SessionStore;

/// Session store reading from DynamoDB tables keyed by `_idx`.
#[derive(Debug, Clone)]
pub struct DynamoSessionStore {
    client: aws_sdk_dynamodb::Client,
}

impl DynamoSessionStore {
    /// Wrap a configured DynamoDB client.
    #[must_use]
    pub fn new(client: aws_sdk_dynamodb::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SessionStore for DynamoSessionStore {
    async fn get_by_key(&self, table: &str, key: &str) -> Result<SessionRecord, SessionError> {
        let output = self
            .client
            .get_item()
            .table_name(table)
            .consistent_read(true)
            .key(SESSION_KEY_ATTRIBUTE, AttributeValue::S(key.to_owned()))
            .send()
            .await
            .map_err(|e| SessionError::Backend(Box::new(e)))?;

        let Some(item) = output.item else {
            debug!(table, key, "no session record, returning placeholder");
            return Ok(SessionRecord::placeholder(key));
        };

        let mut attributes = item_to_json(item);
        attributes.remove(SESSION_KEY_ATTRIBUTE);
        Ok(SessionRecord::new(key, attributes))
    }
}

/// Convert a DynamoDB item into a JSON object.
fn item_to_json(item: HashMap<String, AttributeValue>) -> Map<String, Value> {
    item.into_iter()
        .map(|(name, value)| (name, attribute_to_json(value)))
        .collect()
}

/// Convert a single attribute value into JSON.
///
/// Numbers that do not fit a JSON number are kept as strings; binary values
/// become base64 strings.
fn attribute_to_json(value: AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => Value::String(s),
        AttributeValue::N(n) => number_to_json(n),
        AttributeValue::Bool(b) => Value::Bool(b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(list) => Value::Array(list.into_iter().map(attribute_to_json).collect()),
        AttributeValue::M(map) => Value::Object(item_to_json(map)),
        AttributeValue::Ss(set) => Value::Array(set.into_iter().map(Value::String).collect()),
        AttributeValue::Ns(set) => Value::Array(set.into_iter().map(number_to_json).collect()),
        AttributeValue::B(blob) => Value::String(BASE64_STANDARD.encode(blob.into_inner())),
        AttributeValue::Bs(set) => Value::Array(
            set.into_iter()
                .map(|b| Value::String(BASE64_STANDARD.encode(b.into_inner())))
                .collect(),
        ),
        _ => Value::Null,
    }
}

fn number_to_json(n: String) -> Value {
    serde_json::from_str::<Number>(&n).map_or(Value::String(n), Value::Number)
}
