use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const NATIVE_ID_FIELD: &str = "_id";
pub const REV_FIELD: &str = "_rev";
pub const DELETED_FIELD: &str = "_deleted";

/// A schema-less CouchDB document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pub data: Map<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> Option<&str> {
        self.data.get(NATIVE_ID_FIELD).and_then(Value::as_str)
    }

    pub fn rev(&self) -> Option<&str> {
        self.data.get(REV_FIELD).and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.data.insert(field.into(), value)
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.data.remove(field)
    }

    /// Shallow merge: every top-level field of `patch` replaces the field of
    /// the same name.
    pub fn merge(&mut self, patch: &Patch) {
        for (key, value) in &patch.fields {
            self.data.insert(key.clone(), value.clone());
        }
    }

    pub fn mark_deleted(&mut self) {
        self.data.insert(DELETED_FIELD.to_string(), Value::Bool(true));
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.data)
    }
}

impl From<Map<String, Value>> for Document {
    fn from(data: Map<String, Value>) -> Self {
        Self { data }
    }
}

impl TryFrom<Value> for Document {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        serde_json::from_value(value)
    }
}

/// Update payload. A `$set` envelope is unwrapped so that both
/// `{"c": 1}` and `{"$set": {"c": 1}}` merge the field `c`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    pub fields: Map<String, Value>,
}

impl Patch {
    pub fn from_map(mut map: Map<String, Value>) -> Self {
        match map.remove("$set") {
            Some(Value::Object(set)) => {
                let mut fields = map;
                fields.extend(set);
                Self { fields }
            }
            Some(other) => {
                map.insert("$set".to_string(), other);
                Self { fields: map }
            }
            None => Self { fields: map },
        }
    }
}

impl TryFrom<Value> for Patch {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        let map: Map<String, Value> = serde_json::from_value(value)?;
        Ok(Self::from_map(map))
    }
}

/// Right-hand side of one filter entry.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// A plain value, matched by equality.
    Literal(Value),
    /// An operator object such as `{"$gt": 5}` or `{"$in": [1, 2]}`.
    Comparison(Map<String, Value>),
}

impl FilterValue {
    pub fn literal(value: impl Into<Value>) -> Self {
        FilterValue::Literal(value.into())
    }
}

impl From<Value> for FilterValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) if is_operator_map(&map) => FilterValue::Comparison(map),
            other => FilterValue::Literal(other),
        }
    }
}

fn is_operator_map(map: &Map<String, Value>) -> bool {
    !map.is_empty() && map.keys().all(|k| k.starts_with('$'))
}

/// A query filter keyed by field name. Keys starting with `$` are selector
/// combinators (`$or`, `$and`, ...) and are forwarded as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub fields: BTreeMap<String, FilterValue>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: FilterValue) -> Self {
        self.fields.insert(field.into(), value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Map<String, Value>> for Filter {
    fn from(map: Map<String, Value>) -> Self {
        let fields = map
            .into_iter()
            .map(|(key, value)| {
                if key.starts_with('$') {
                    (key, FilterValue::Literal(value))
                } else {
                    (key, FilterValue::from(value))
                }
            })
            .collect();
        Self { fields }
    }
}

impl TryFrom<Value> for Filter {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        let map: Map<String, Value> = serde_json::from_value(value)?;
        Ok(Self::from(map))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    pub field: String,
    pub direction: SortDirection,
}

impl SortField {
    /// Parses `"name"` (ascending) or `"-name"` (descending).
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        let (field, direction) = match spec.strip_prefix('-') {
            Some(rest) => (rest, SortDirection::Desc),
            None => (spec, SortDirection::Asc),
        };
        if field.is_empty() {
            return None;
        }
        Some(Self {
            field: field.to_string(),
            direction,
        })
    }

    /// Parses a space or comma separated list such as `"name -age"`.
    pub fn parse_list(spec: &str) -> Vec<Self> {
        spec.split(|c: char| c == ' ' || c == ',')
            .filter_map(Self::parse)
            .collect()
    }
}

/// Options for a filtered query. Every field is optional; `None` leaves the
/// server default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindParams {
    pub query: Filter,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub sort: Vec<SortField>,
    pub fields: Option<Vec<String>>,
}

impl FindParams {
    pub fn new(query: Filter) -> Self {
        Self {
            query,
            ..Self::default()
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn sort(mut self, sort: Vec<SortField>) -> Self {
        self.sort = sort;
        self
    }

    pub fn fields(mut self, fields: Vec<String>) -> Self {
        self.fields = Some(fields);
        self
    }
}

impl From<Filter> for FindParams {
    fn from(query: Filter) -> Self {
        Self::new(query)
    }
}

/// Body of a CouchDB `_find` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MangoQuery {
    pub selector: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<BTreeMap<String, SortDirection>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<String>,
}

/// Outcome of a single-document write.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WriteResult {
    pub id: String,
    pub rev: String,
}

/// One row of a `_bulk_docs` reply. Failed rows carry `error` and `reason`
/// instead of `rev`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BulkResult {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub rev: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}
