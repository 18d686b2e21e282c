//! Records returned by the data-access layer

use serde_json::{Map, Value};

/// An object as returned by the data-access collaborator: field name to
/// value, in declaration order.
pub type Record = Map<String, Value>;

/// Render a scalar the way it appears inside a URL or a message
///
/// Strings are inserted without quotes; every other value uses its JSON text.
///
/// # Examples
///
/// ```
/// use reinhardt_embed_core::record::plain_string;
/// use serde_json::json;
///
/// assert_eq!(plain_string(&json!(42)), "42");
/// assert_eq!(plain_string(&json!("abc")), "abc");
/// assert_eq!(plain_string(&json!(null)), "null");
/// ```
pub fn plain_string(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

/// Convert a JSON value into a [`Record`], if it is an object
pub fn into_record(value: Value) -> Option<Record> {
	match value {
		Value::Object(map) => Some(map),
		_ => None,
	}
}
