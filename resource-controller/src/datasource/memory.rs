//! In-memory datasource
//!
//! A reference [`Datasource`] backed by a [`DashMap`]. Useful for tests, demos
//! and as a template for real adapters. Identifiers are UUID v7 strings, so
//! sorting by id yields insertion order.

use dashmap::DashMap;
use serde_json::Value;
use uuid::Uuid;

use super::error::{DatasourceError, DatasourceOperation};
use super::traits::{Constraints, Datasource, DatasourceResult, Record};

/// Name of the identifier field assigned on insert
pub const ID_FIELD: &str = "id";

/// Datasource storing JSON object records in memory
#[derive(Debug, Default)]
pub struct MemoryDatasource {
    records: DashMap<String, Record>,
}

impl MemoryDatasource {
    /// Create an empty datasource
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the datasource holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A constraint matches a string field by value and any other field by its JSON text
fn field_matches(record: &Record, field: &str, expected: &str) -> bool {
    match record.get(field) {
        Some(Value::String(s)) => s == expected,
        Some(other) => other.to_string() == expected,
        None => false,
    }
}

fn with_id(mut record: Record, id: &str, operation: DatasourceOperation) -> DatasourceResult<Record> {
    match record.as_object_mut() {
        Some(fields) => {
            fields.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
            Ok(record)
        }
        None => Err(DatasourceError::serialization(
            operation,
            "Records must be JSON objects",
        )),
    }
}

impl Datasource for MemoryDatasource {
    async fn query(&self, constraints: &Constraints) -> DatasourceResult<Vec<Record>> {
        let mut matched: Vec<(String, Record)> = self
            .records
            .iter()
            .filter(|entry| {
                constraints
                    .iter()
                    .all(|(field, expected)| field_matches(entry.value(), field, expected))
            })
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        matched.sort_by(|a, b| a.0.cmp(&b.0));

        tracing::debug!(
            constraints = constraints.len(),
            matched = matched.len(),
            "Memory datasource query"
        );
        Ok(matched.into_iter().map(|(_, record)| record).collect())
    }

    async fn retrieve(&self, id: &str) -> DatasourceResult<Option<Record>> {
        Ok(self.records.get(id).map(|entry| entry.value().clone()))
    }

    async fn insert(&self, record: Record) -> DatasourceResult<Record> {
        let id = Uuid::now_v7().to_string();
        let record = with_id(record, &id, DatasourceOperation::Insert)?;
        self.records.insert(id.clone(), record.clone());
        tracing::debug!(id = %id, "Memory datasource insert");
        Ok(record)
    }

    async fn update(&self, id: &str, old: Record, new: Record) -> DatasourceResult<()> {
        let new = with_id(new, id, DatasourceOperation::Update)?;

        // Compare and replace under the entry's shard lock.
        let mut stored = self.records.get_mut(id).ok_or_else(|| {
            DatasourceError::not_found(id).with_operation(DatasourceOperation::Update)
        })?;
        if *stored != old {
            tracing::debug!(id = %id, "Memory datasource update rejected: stale original");
            return Err(DatasourceError::conflict(id));
        }
        *stored = new;
        Ok(())
    }

    async fn delete(&self, id: &str) -> DatasourceResult<()> {
        self.records
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DatasourceError::not_found(id).with_operation(DatasourceOperation::Delete))
    }
}
