//! The public JSON shape of stored records.
//!
//! Stored documents carry MongoDB's `_id`; clients only ever see `id`, as a
//! hex string. BSON-only types are flattened into plain JSON.

use mongodb::bson::{Bson, Document};
use serde_json::{Map, Number, Value};

/// Internal identifier field used by the store.
pub const STORE_ID_FIELD: &str = "_id";
/// Identifier field exposed to clients.
pub const PUBLIC_ID_FIELD: &str = "id";

/// Convert a stored document into its public JSON representation.
pub fn to_public(document: Document) -> Value {
    let mut object = Map::with_capacity(document.len());
    for (key, value) in document {
        let key = if key == STORE_ID_FIELD {
            PUBLIC_ID_FIELD.to_string()
        } else {
            key
        };
        object.insert(key, bson_to_json(value));
    }
    Value::Object(object)
}

fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Int32(i) => Value::from(i),
        Bson::Int64(i) => Value::from(i),
        Bson::Double(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        Bson::String(s) => Value::String(s),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(s) => Value::String(s),
            Err(_) => Value::from(dt.timestamp_millis()),
        },
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::Document(doc) => {
            Value::Object(doc.into_iter().map(|(k, v)| (k, bson_to_json(v))).collect())
        }
        other => other.into_relaxed_extjson(),
    }
}
