//! Normalized in-memory cache.
//!
//! The cache is a flat record store. Fetched entities are deduplicated by
//! identity: any object carrying an `id` field is stored exactly once under
//! its entity key and referenced from enclosing values as `{"__ref": key}`.
//! Operation results live under the `ROOT_QUERY` record, keyed by operation
//! key. The whole store snapshots to a plain JSON object ([`CacheState`]),
//! which is the only channel carrying server-fetched data to the browser.

use serde_json::{Map, Value};

/// A serialized cache snapshot. JSON-serializable by construction.
pub type CacheState = Map<String, Value>;

/// Record holding operation results, mirroring how entity records are stored.
const ROOT_QUERY: &str = "ROOT_QUERY";

/// Marker field for a reference to a normalized entity record.
const REF_KEY: &str = "__ref";

/// Optional type discriminator on fetched objects.
const TYPENAME_KEY: &str = "__typename";

/// A store that deduplicates fetched entities by identity so repeated
/// queries referencing the same entity reuse one copy.
#[derive(Debug, Clone, Default)]
pub struct NormalizedCache {
    records: Map<String, Value>,
}

impl NormalizedCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cache from a previously extracted snapshot.
    pub fn restore(state: CacheState) -> Self {
        Self { records: state }
    }

    /// Snapshot the full record store.
    pub fn extract(&self) -> CacheState {
        self.records.clone()
    }

    /// True when nothing has been written or restored yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records, the `ROOT_QUERY` record included.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Store an operation result, normalizing every entity it contains.
    ///
    /// Entity records are merged field-wise with whatever is already stored,
    /// so partial selections from different queries accumulate on one copy.
    pub fn write_query(&mut self, key: &str, data: &Value) {
        let normalized = self.normalize(data);
        let root = self
            .records
            .entry(ROOT_QUERY.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = root {
            map.insert(key.to_string(), normalized);
        }
    }

    /// Read an operation result back, resolving entity references.
    ///
    /// Returns `None` when the operation has never been written. Dangling
    /// references and reference cycles resolve to `null` rather than
    /// failing or diverging.
    pub fn read_query(&self, key: &str) -> Option<Value> {
        let root = self.records.get(ROOT_QUERY)?.as_object()?;
        let stored = root.get(key)?;
        Some(self.materialize(stored, &mut Vec::new()))
    }

    /// Replace a value's identifiable objects with refs, storing the records.
    fn normalize(&mut self, value: &Value) -> Value {
        match value {
            Value::Object(map) => {
                let fields: Map<String, Value> = map
                    .iter()
                    .map(|(k, v)| (k.clone(), self.normalize(v)))
                    .collect();
                match entity_key(map) {
                    Some(key) => {
                        self.merge_entity(&key, fields);
                        let mut reference = Map::new();
                        reference.insert(REF_KEY.to_string(), Value::String(key));
                        Value::Object(reference)
                    }
                    None => Value::Object(fields),
                }
            }
            Value::Array(items) => {
                Value::Array(items.iter().map(|v| self.normalize(v)).collect())
            }
            other => other.clone(),
        }
    }

    fn merge_entity(&mut self, key: &str, fields: Map<String, Value>) {
        match self.records.get_mut(key) {
            Some(Value::Object(existing)) => {
                for (k, v) in fields {
                    existing.insert(k, v);
                }
            }
            _ => {
                self.records.insert(key.to_string(), Value::Object(fields));
            }
        }
    }

    /// Resolve refs back into full values. `path` tracks the entity keys on
    /// the current resolution branch so cycles terminate as `null`.
    fn materialize(&self, value: &Value, path: &mut Vec<String>) -> Value {
        match value {
            Value::Object(map) => {
                if let Some(Value::String(key)) = map.get(REF_KEY) {
                    if path.iter().any(|seen| seen == key) {
                        return Value::Null;
                    }
                    path.push(key.clone());
                    let resolved = match self.records.get(key) {
                        Some(record) => self.materialize(record, path),
                        None => Value::Null,
                    };
                    path.pop();
                    resolved
                } else {
                    Value::Object(
                        map.iter()
                            .map(|(k, v)| (k.clone(), self.materialize(v, path)))
                            .collect(),
                    )
                }
            }
            Value::Array(items) => {
                Value::Array(items.iter().map(|v| self.materialize(v, path)).collect())
            }
            other => other.clone(),
        }
    }
}

/// Identity of a fetched object, when it has one.
///
/// Keys are `__typename:id` when the selection included a typename, and the
/// bare `id` otherwise. The Star Wars service hands out globally unique
/// opaque ids, so the bare id is collision-free there.
fn entity_key(map: &Map<String, Value>) -> Option<String> {
    let id = map.get("id")?.as_str()?;
    match map.get(TYPENAME_KEY).and_then(Value::as_str) {
        Some(typename) => Some(format!("{}:{}", typename, id)),
        None => Some(id.to_string()),
    }
}
