//! Result normalization.
//!
//! Both stores return loosely shaped JSON rows: the document store uses
//! search-optimized property names and a `metadata` subtree, the relational
//! store uses flat column names and sometimes ships nested structures as
//! embedded JSON text. Field-name mapping and shape coercion happen exactly
//! once, here; callers only ever see [`CustomerRecord`].

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::Error;
use crate::model::{Address, CustomerRecord};

/// Which store a raw record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Primary encrypted document store.
    Document,
    /// Secondary relational store.
    Relational,
}

/// Property name holding the correlation identifier in document-store
/// records.
pub const DOCUMENT_ID_FIELD: &str = "record_id";

/// Normalize one raw backend record into the canonical customer shape.
///
/// The only hard requirement is the correlation identifier; every other
/// field degrades to a typed default when absent or malformed.
pub fn normalize(raw: &Value, kind: BackendKind) -> Result<CustomerRecord, Error> {
    match kind {
        BackendKind::Document => normalize_document(raw),
        BackendKind::Relational => normalize_row(raw),
    }
}

fn normalize_document(doc: &Value) -> Result<CustomerRecord, Error> {
    let customer_id = string_at(doc, DOCUMENT_ID_FIELD).ok_or(Error::MissingIdentifier)?;
    let metadata = doc.get("metadata").cloned().unwrap_or(Value::Null);

    Ok(CustomerRecord {
        customer_id,
        full_name: string_at(doc, "searchable_name").unwrap_or_default(),
        email: string_at(doc, "searchable_email").unwrap_or_default(),
        phone: string_at(doc, "searchable_phone").unwrap_or_default(),
        address: parse_address(doc.get("address")),
        preferences: parse_preferences(doc.get("preferences")),
        tier: string_at(&metadata, "tier").unwrap_or_default(),
        loyalty_points: integer_at(&metadata, "loyalty_points"),
        last_purchase_date: string_at(&metadata, "last_purchase_date").unwrap_or_default(),
        lifetime_value: decimal_at(&metadata, "lifetime_value"),
    })
}

fn normalize_row(row: &Value) -> Result<CustomerRecord, Error> {
    let customer_id = string_at(row, "customer_id").ok_or(Error::MissingIdentifier)?;

    Ok(CustomerRecord {
        customer_id,
        full_name: string_at(row, "full_name").unwrap_or_default(),
        email: string_at(row, "email").unwrap_or_default(),
        phone: string_at(row, "phone").unwrap_or_default(),
        address: parse_address(row.get("address")),
        preferences: parse_preferences(row.get("preferences")),
        tier: string_at(row, "tier").unwrap_or_default(),
        loyalty_points: integer_at(row, "loyalty_points"),
        last_purchase_date: string_at(row, "last_purchase_date").unwrap_or_default(),
        lifetime_value: decimal_at(row, "lifetime_value"),
    })
}

/// Parse a nested structure that may arrive as a JSON object or as embedded
/// JSON text. Parse failure degrades to the empty value; the field's
/// presence is guaranteed upstream, its shape is not.
fn structured(value: Option<&Value>) -> Option<Value> {
    match value {
        Some(Value::Object(_)) => value.cloned(),
        Some(Value::String(text)) => serde_json::from_str::<Value>(text)
            .ok()
            .filter(Value::is_object),
        _ => None,
    }
}

fn parse_address(value: Option<&Value>) -> Address {
    structured(value)
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

fn parse_preferences(value: Option<&Value>) -> BTreeMap<String, Value> {
    structured(value)
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

fn string_at(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn integer_at(value: &Value, key: &str) -> u64 {
    match value.get(key) {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

fn decimal_at(value: &Value, key: &str) -> f64 {
    match value.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        // NUMERIC columns commonly arrive as text.
        Some(Value::String(s)) => s.parse().unwrap_or(0.0),
        _ => 0.0,
    }
}
