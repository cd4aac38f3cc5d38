//! Firestore REST API types.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Firestore document value types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(()),
    BooleanValue(bool),
    IntegerValue(String), // Firestore sends integers as strings
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String), // base64
    ReferenceValue(String),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

impl Value {
    /// Wrap raw bytes.
    pub fn bytes(data: &[u8]) -> Self {
        Value::BytesValue(STANDARD.encode(data))
    }

    /// Wrap a nested map.
    pub fn map(fields: HashMap<String, Value>) -> Self {
        Value::MapValue(MapValue {
            fields: Some(fields),
        })
    }

    /// Decode a bytes value. `None` for other types or malformed base64.
    pub fn as_bytes(&self) -> Option<Vec<u8>> {
        match self {
            Value::BytesValue(encoded) => STANDARD.decode(encoded.as_bytes()).ok(),
            _ => None,
        }
    }

    /// Borrow the fields of a map value.
    pub fn as_map(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::MapValue(MapValue { fields: Some(f) }) => Some(f),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    pub values: Option<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    pub fields: Option<HashMap<String, Value>>,
}

/// Firestore document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Document fields
    pub fields: Option<HashMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

impl Document {
    /// Create a new document with the given fields.
    pub fn new(fields: HashMap<String, Value>) -> Self {
        Self {
            name: None,
            fields: Some(fields),
            create_time: None,
            update_time: None,
        }
    }

    /// Last path segment of the resource name.
    pub fn id(&self) -> Option<&str> {
        self.name.as_deref().and_then(|n| n.rsplit('/').next())
    }
}

// ============================================================================
// Structured queries
// ============================================================================

/// Body of a `:runQuery` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryRequest {
    pub structured_query: StructuredQuery,
}

/// One element of the `:runQuery` response stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryResponse {
    pub document: Option<Document>,
    pub read_time: Option<String>,
    pub skipped_results: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredQuery {
    /// Field mask; `None` returns whole documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<Projection>,
    pub from: Vec<CollectionSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#where: Option<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<Vec<Order>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
}

impl StructuredQuery {
    /// Query over a single collection.
    pub fn collection(collection_id: impl Into<String>) -> Self {
        Self {
            from: vec![CollectionSelector {
                collection_id: collection_id.into(),
                all_descendants: None,
            }],
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub fields: Vec<FieldReference>,
}

impl Projection {
    pub fn of(paths: &[&str]) -> Self {
        Self {
            fields: paths.iter().map(|p| FieldReference::new(*p)).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSelector {
    pub collection_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_descendants: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite_filter: Option<CompositeFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_filter: Option<FieldFilter>,
}

impl Filter {
    /// `field == value`.
    pub fn equal(path: impl Into<String>, value: Value) -> Self {
        Self {
            composite_filter: None,
            field_filter: Some(FieldFilter {
                field: FieldReference::new(path),
                op: "EQUAL".to_string(),
                value,
            }),
        }
    }

    /// Conjunction. A single filter is returned unwrapped.
    pub fn and(mut filters: Vec<Filter>) -> Self {
        if filters.len() == 1 {
            return filters.remove(0);
        }
        Self {
            composite_filter: Some(CompositeFilter {
                op: "AND".to_string(),
                filters,
            }),
            field_filter: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeFilter {
    pub op: String,
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldFilter {
    pub field: FieldReference,
    pub op: String,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReference {
    pub field_path: String,
}

impl FieldReference {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            field_path: path.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub field: FieldReference,
    pub direction: String,
}

impl Order {
    pub fn new(path: impl Into<String>, descending: bool) -> Self {
        Self {
            field: FieldReference::new(path),
            direction: if descending { "DESCENDING" } else { "ASCENDING" }.to_string(),
        }
    }
}

// ============================================================================
// Value conversion
// ============================================================================

/// Convert a Rust value to Firestore Value.
pub trait ToFirestoreValue {
    fn to_firestore_value(&self) -> Value;
}

impl ToFirestoreValue for String {
    fn to_firestore_value(&self) -> Value {
        Value::StringValue(self.clone())
    }
}

impl ToFirestoreValue for &str {
    fn to_firestore_value(&self) -> Value {
        Value::StringValue(self.to_string())
    }
}

impl ToFirestoreValue for i64 {
    fn to_firestore_value(&self) -> Value {
        Value::IntegerValue(self.to_string())
    }
}

impl ToFirestoreValue for u64 {
    fn to_firestore_value(&self) -> Value {
        Value::IntegerValue((*self as i64).to_string())
    }
}

impl ToFirestoreValue for bool {
    fn to_firestore_value(&self) -> Value {
        Value::BooleanValue(*self)
    }
}

impl ToFirestoreValue for DateTime<Utc> {
    fn to_firestore_value(&self) -> Value {
        Value::TimestampValue(self.to_rfc3339())
    }
}

impl<T: ToFirestoreValue> ToFirestoreValue for Option<T> {
    fn to_firestore_value(&self) -> Value {
        match self {
            Some(v) => v.to_firestore_value(),
            None => Value::NullValue(()),
        }
    }
}

/// Convert Firestore Value to Rust type.
pub trait FromFirestoreValue: Sized {
    fn from_firestore_value(value: &Value) -> Option<Self>;
}

impl FromFirestoreValue for String {
    fn from_firestore_value(value: &Value) -> Option<Self> {
        match value {
            Value::StringValue(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromFirestoreValue for i64 {
    fn from_firestore_value(value: &Value) -> Option<Self> {
        match value {
            Value::IntegerValue(s) => s.parse().ok(),
            Value::DoubleValue(f) => Some(*f as i64),
            _ => None,
        }
    }
}

impl FromFirestoreValue for u64 {
    fn from_firestore_value(value: &Value) -> Option<Self> {
        match value {
            Value::IntegerValue(s) => s.parse().ok(),
            Value::DoubleValue(f) => Some(*f as u64),
            _ => None,
        }
    }
}

impl FromFirestoreValue for bool {
    fn from_firestore_value(value: &Value) -> Option<Self> {
        match value {
            Value::BooleanValue(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromFirestoreValue for DateTime<Utc> {
    fn from_firestore_value(value: &Value) -> Option<Self> {
        match value {
            Value::TimestampValue(s) => DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.into()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_value_roundtrip_and_wire_shape() {
        let value = Value::bytes(&[0xde, 0xad]);
        assert_eq!(serde_json::to_value(&value).unwrap(), serde_json::json!({"bytesValue": "3q0="}));
        assert_eq!(value.as_bytes(), Some(vec![0xde, 0xad]));
        assert_eq!(Value::StringValue("x".into()).as_bytes(), None);
    }

    #[test]
    fn test_document_id_from_name() {
        let mut doc = Document::new(HashMap::new());
        assert_eq!(doc.id(), None);
        doc.name = Some("projects/p/databases/(default)/documents/jobs/abc".into());
        assert_eq!(doc.id(), Some("abc"));
    }

    #[test]
    fn test_structured_query_serialization() {
        let mut query = StructuredQuery::collection("applications");
        query.select = Some(Projection::of(&["name", "resume.content_type"]));
        query.r#where = Some(Filter::and(vec![Filter::equal(
            "employer_id.user",
            Value::StringValue("emp".into()),
        )]));
        query.order_by = Some(vec![Order::new("applied_at", true)]);

        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["from"][0]["collectionId"], "applications");
        assert_eq!(json["select"]["fields"][1]["fieldPath"], "resume.content_type");
        assert_eq!(json["where"]["fieldFilter"]["op"], "EQUAL");
        assert_eq!(json["orderBy"][0]["direction"], "DESCENDING");
        assert!(json.get("limit").is_none());
    }

    #[test]
    fn test_and_filter_composes() {
        let filter = Filter::and(vec![
            Filter::equal("expired", Value::BooleanValue(false)),
            Filter::equal("category", Value::StringValue("IT".into())),
        ]);
        let composite = filter.composite_filter.expect("composite");
        assert_eq!(composite.op, "AND");
        assert_eq!(composite.filters.len(), 2);
    }

    #[test]
    fn test_run_query_response_tolerates_read_time_only() {
        let raw = r#"[{"readTime":"2024-01-01T00:00:00Z"}]"#;
        let parsed: Vec<RunQueryResponse> = serde_json::from_str(raw).unwrap();
        assert!(parsed[0].document.is_none());
    }
}
