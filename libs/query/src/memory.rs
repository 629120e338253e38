//! In-memory [`PlanExecutor`] over JSON documents.
//!
//! Evaluates plans with the same semantics the SQL backend compiles to, which makes it
//! the reference for tests and a lightweight backend for local development.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value as JsonValue};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use tokio::sync::RwLock;

use crate::clause::FieldPath;
use crate::error::StoreError;
use crate::executor::PlanExecutor;
use crate::id::{coerce_object_id, ObjectId};
use crate::join::{JoinSpec, ID_FIELD};
use crate::plan::{Projection, QueryPlan, SortDirection, SortKey, SortKind, Stage};
use crate::tenant::TenantId;

type Collections = HashMap<String, Vec<JsonValue>>;

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from `{"<collection>": [<document>, ...], ...}`.
    pub fn from_seed(seed: JsonValue) -> Result<Self, StoreError> {
        let JsonValue::Object(map) = seed else {
            return Err(StoreError::Decode {
                collection: "<seed>".to_string(),
                message: "seed must be an object of collections".to_string(),
            });
        };

        let mut collections = Collections::new();
        for (name, docs) in map {
            let JsonValue::Array(docs) = docs else {
                return Err(StoreError::Decode {
                    collection: name,
                    message: "collection must be an array".to_string(),
                });
            };
            if let Some(bad) = docs.iter().position(|d| !d.is_object()) {
                return Err(StoreError::Decode {
                    collection: name,
                    message: format!("document {bad} is not an object"),
                });
            }
            collections.insert(name, docs);
        }

        Ok(Self {
            collections: RwLock::new(collections),
            unavailable: AtomicBool::new(false),
        })
    }

    pub async fn insert(&self, collection: &str, doc: JsonValue) {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(doc);
    }

    pub async fn insert_many(&self, collection: &str, docs: impl IntoIterator<Item = JsonValue>) {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .extend(docs);
    }

    pub async fn document_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }

    /// Makes every subsequent query fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, AtomicOrdering::SeqCst);
    }

    async fn evaluate(&self, plan: &QueryPlan) -> Result<Vec<JsonValue>, StoreError> {
        if self.unavailable.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Unavailable(
                "memory store marked unavailable".to_string(),
            ));
        }

        let collections = self.collections.read().await;
        let mut rows: Vec<JsonValue> = collections
            .get(plan.collection)
            .cloned()
            .unwrap_or_default();

        for stage in &plan.stages {
            match stage {
                Stage::Match(conditions) => {
                    rows.retain(|row| conditions.iter().all(|c| c.matches(row)));
                }
                Stage::Join { join, tenant } => {
                    let foreign = scoped(&collections, join.from_collection(), *tenant);
                    for row in rows.iter_mut() {
                        if let JsonValue::Object(fields) = row {
                            apply_join(join, fields, &foreign);
                        }
                    }
                }
                Stage::Project(projection) => {
                    for row in rows.iter_mut() {
                        if let JsonValue::Object(fields) = row {
                            apply_projection(projection, fields);
                        }
                    }
                }
                Stage::Sort(keys) => rows.sort_by(|a, b| compare_rows(keys, a, b)),
                Stage::Skip(n) => {
                    let n = usize::try_from(*n).unwrap_or(usize::MAX).min(rows.len());
                    rows.drain(..n);
                }
                Stage::Limit(n) => rows.truncate(usize::try_from(*n).unwrap_or(usize::MAX)),
            }
        }

        Ok(rows)
    }
}

#[async_trait]
impl PlanExecutor for MemoryStore {
    async fn count(&self, plan: &QueryPlan) -> Result<u64, StoreError> {
        Ok(self.evaluate(plan).await?.len() as u64)
    }

    async fn fetch(&self, plan: &QueryPlan) -> Result<Vec<JsonValue>, StoreError> {
        self.evaluate(plan).await
    }
}

fn scoped<'a>(collections: &'a Collections, name: &str, tenant: TenantId) -> Vec<&'a JsonValue> {
    let clause = tenant.clause();
    collections
        .get(name)
        .map(|docs| docs.iter().filter(|d| clause.matches(d)).collect())
        .unwrap_or_default()
}

fn doc_id(doc: &JsonValue) -> Option<ObjectId> {
    doc.get(ID_FIELD).and_then(coerce_object_id)
}

/// Documents of `foreign` referenced by `local` in `source`, in list order, each once.
fn resolve_many(local: &FieldPath, source: &JsonValue, foreign: &[&JsonValue]) -> Vec<JsonValue> {
    let mut seen = Vec::new();
    let mut joined = Vec::new();
    for id in local.values(source).into_iter().filter_map(coerce_object_id) {
        if seen.contains(&id) {
            continue;
        }
        seen.push(id);
        if let Some(doc) = foreign.iter().find(|d| doc_id(d) == Some(id)) {
            joined.push((*doc).clone());
        }
    }
    joined
}

fn apply_join(join: &JoinSpec, row: &mut Map<String, JsonValue>, foreign: &[&JsonValue]) {
    match join {
        JoinSpec::ManyById {
            local, as_field, ..
        } => {
            let joined = resolve_many(local, &JsonValue::Object(row.clone()), foreign);
            row.insert((*as_field).to_string(), JsonValue::Array(joined));
        }
        JoinSpec::NestedManyById {
            within,
            local,
            as_field,
            ..
        } => {
            let Some(JsonValue::Array(elements)) = row.get_mut(*within) else {
                return;
            };
            for element in elements.iter_mut() {
                let joined = resolve_many(local, element, foreign);
                if let JsonValue::Object(fields) = element {
                    fields.insert((*as_field).to_string(), JsonValue::Array(joined));
                }
            }
        }
        JoinSpec::OneByCoercedKey {
            local,
            scaffold,
            as_field,
            ..
        } => {
            let coerced = row.get(*local).and_then(coerce_object_id);
            row.insert(
                (*scaffold).to_string(),
                coerced.map_or(JsonValue::Null, |id| JsonValue::String(id.to_hex())),
            );
            let target = coerced.and_then(|id| foreign.iter().find(|d| doc_id(d) == Some(id)));
            match target {
                Some(doc) => {
                    row.insert((*as_field).to_string(), (*doc).clone());
                }
                None => {
                    row.remove(*as_field);
                }
            }
        }
        JoinSpec::ReferencedBy {
            foreign: foreign_field,
            filter,
            as_field,
            ..
        } => {
            let Some(own_id) = row.get(ID_FIELD).and_then(coerce_object_id) else {
                row.insert((*as_field).to_string(), JsonValue::Array(Vec::new()));
                return;
            };
            let joined = foreign
                .iter()
                .filter(|d| {
                    foreign_field
                        .values(d)
                        .into_iter()
                        .any(|v| coerce_object_id(v) == Some(own_id))
                })
                .filter(|d| filter.iter().all(|c| c.matches(d)))
                .map(|d| (*d).clone())
                .collect();
            row.insert((*as_field).to_string(), JsonValue::Array(joined));
        }
    }
}

fn apply_projection(projection: &Projection, row: &mut Map<String, JsonValue>) {
    let snapshot = JsonValue::Object(row.clone());
    for derived in &projection.derive {
        match derived.from.values(&snapshot).first() {
            Some(value) => {
                row.insert(derived.name.to_string(), (*value).clone());
            }
            None => {
                row.remove(derived.name);
            }
        }
    }
    for field in &projection.exclude {
        row.remove(*field);
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortValue {
    Text(String),
    Instant(DateTime<Utc>),
}

/// Value of `key` in `doc`; `None` (missing, null, or an unparseable timestamp) sorts
/// first ascending.
fn sort_value(doc: &JsonValue, key: &SortKey) -> Option<SortValue> {
    let mut current = doc;
    for segment in key.field.segments() {
        current = current.get(segment.as_str())?;
    }
    match (key.kind, current) {
        (_, JsonValue::Null) => None,
        (SortKind::Timestamp, JsonValue::String(s)) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|at| SortValue::Instant(at.with_timezone(&Utc))),
        (SortKind::Timestamp, _) => None,
        (SortKind::Text, JsonValue::String(s)) => Some(SortValue::Text(s.clone())),
        (SortKind::Text, other) => Some(SortValue::Text(other.to_string())),
    }
}

fn compare_rows(keys: &[SortKey], a: &JsonValue, b: &JsonValue) -> Ordering {
    for key in keys {
        let ord = sort_value(a, key).cmp(&sort_value(b, key));
        let ord = match key.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}
