// ABOUTME: In-process backend holding JSON rows per collection
// ABOUTME: Evaluates queries locally and supports injected failures for tests and demos
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

//! In-memory [`Backend`] with the same filtering and ordering semantics as the
//! hosted service: ascending sorts put nulls last, descending sorts put them
//! first; inserts receive a generated UUID `id` when none is supplied.

use super::query::{Filter, FilterOp, Query};
use super::Backend;
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Kind of backend call, used to target injected failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `select`
    Select,
    /// `insert`
    Insert,
    /// `update`
    Update,
    /// `delete`
    Delete,
}

#[derive(Debug)]
struct FailureRule {
    collection: String,
    operation: Operation,
    status: u16,
    message: String,
}

/// Backend storing rows in process memory
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: RwLock<HashMap<String, Vec<Value>>>,
    failures: RwLock<Vec<FailureRule>>,
    calls: AtomicUsize,
}

impl MemoryBackend {
    /// Create an empty backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append rows to a collection without going through `insert`
    pub async fn seed(&self, collection: &str, rows: impl IntoIterator<Item = Value>) {
        let mut tables = self.tables.write().await;
        let table = tables.entry(collection.to_owned()).or_default();
        for mut row in rows {
            ensure_id(&mut row);
            table.push(row);
        }
    }

    /// Snapshot of every row in a collection, in insertion order
    pub async fn rows(&self, collection: &str) -> Vec<Value> {
        self.tables
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Make the next `operation` on `collection` fail with `status` and `message`
    pub async fn fail_next(
        &self,
        collection: &str,
        operation: Operation,
        status: u16,
        message: impl Into<String>,
    ) {
        self.failures.write().await.push(FailureRule {
            collection: collection.to_owned(),
            operation,
            status,
            message: message.into(),
        });
    }

    /// Number of calls served (including failed ones)
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(AtomicOrdering::Relaxed)
    }

    async fn check_failure(&self, collection: &str, operation: Operation) -> AppResult<()> {
        self.calls.fetch_add(1, AtomicOrdering::Relaxed);
        let mut failures = self.failures.write().await;
        if let Some(index) = failures
            .iter()
            .position(|f| f.collection == collection && f.operation == operation)
        {
            let rule = failures.remove(index);
            return Err(AppError::backend(rule.status, rule.message).with_collection(collection));
        }
        Ok(())
    }
}

fn ensure_id(row: &mut Value) {
    if let Value::Object(map) = row {
        if !map.contains_key("id") || map.get("id").is_some_and(Value::is_null) {
            map.insert("id".to_owned(), Value::String(Uuid::new_v4().to_string()));
        }
    }
}

/// Text form used for filter comparison, matching how the query string renders values
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_owned(),
        other => other.to_string(),
    }
}

fn matches_filter(row: &Value, filter: &Filter) -> bool {
    let cell = row.get(&filter.column).unwrap_or(&Value::Null);
    match &filter.op {
        FilterOp::Eq(expected) => !cell.is_null() && render(cell) == *expected,
        FilterOp::Neq(expected) => !cell.is_null() && render(cell) != *expected,
        FilterOp::In(values) => !cell.is_null() && values.contains(&render(cell)),
        FilterOp::IsNull => cell.is_null(),
        FilterOp::ILike(pattern) => cell
            .as_str()
            .is_some_and(|s| s.to_lowercase().contains(&pattern.to_lowercase())),
    }
}

fn matches(row: &Value, query: &Query) -> bool {
    query.filters.iter().all(|f| matches_filter(row, f))
}

fn compare_present(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::String(x), Value::String(y)) => {
            match (x.parse::<DateTime<Utc>>(), y.parse::<DateTime<Utc>>()) {
                (Ok(dx), Ok(dy)) => dx.cmp(&dy),
                _ => x.cmp(y),
            }
        }
        _ => render(a).cmp(&render(b)),
    }
}

fn compare_rows(a: &Value, b: &Value, query: &Query) -> Ordering {
    for key in &query.order {
        let left = a.get(&key.column).unwrap_or(&Value::Null);
        let right = b.get(&key.column).unwrap_or(&Value::Null);
        let ordering = match (left.is_null(), right.is_null()) {
            (true, true) => Ordering::Equal,
            // Nulls sort as the largest value: last ascending, first descending
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => compare_present(left, right),
        };
        let ordering = if key.ascending {
            ordering
        } else {
            ordering.reverse()
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn merge(row: &mut Value, patch: &Map<String, Value>) {
    if let Value::Object(map) = row {
        for (key, value) in patch {
            map.insert(key.clone(), value.clone());
        }
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn select(&self, query: &Query) -> AppResult<Vec<Value>> {
        self.check_failure(&query.collection, Operation::Select)
            .await?;
        let tables = self.tables.read().await;
        let mut rows: Vec<Value> = tables
            .get(&query.collection)
            .map(|table| table.iter().filter(|r| matches(r, query)).cloned().collect())
            .unwrap_or_default();
        rows.sort_by(|a, b| compare_rows(a, b, query));
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(&self, collection: &str, rows: Vec<Value>) -> AppResult<Vec<Value>> {
        self.check_failure(collection, Operation::Insert).await?;
        let mut stored = Vec::with_capacity(rows.len());
        for mut row in rows {
            if !row.is_object() {
                return Err(AppError::invalid_input("Rows must be JSON objects")
                    .with_collection(collection));
            }
            ensure_id(&mut row);
            stored.push(row);
        }
        self.tables
            .write()
            .await
            .entry(collection.to_owned())
            .or_default()
            .extend(stored.iter().cloned());
        Ok(stored)
    }

    async fn update(&self, query: &Query, patch: Value) -> AppResult<Vec<Value>> {
        self.check_failure(&query.collection, Operation::Update)
            .await?;
        let Value::Object(patch) = patch else {
            return Err(AppError::invalid_input("Patch must be a JSON object")
                .with_collection(query.collection.clone()));
        };
        let mut tables = self.tables.write().await;
        let mut updated = Vec::new();
        if let Some(table) = tables.get_mut(&query.collection) {
            for row in table.iter_mut().filter(|r| matches(r, query)) {
                merge(row, &patch);
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, query: &Query) -> AppResult<Vec<Value>> {
        self.check_failure(&query.collection, Operation::Delete)
            .await?;
        let mut tables = self.tables.write().await;
        let Some(table) = tables.get_mut(&query.collection) else {
            return Ok(Vec::new());
        };
        let (removed, kept): (Vec<Value>, Vec<Value>) =
            table.drain(..).partition(|r| matches(r, query));
        *table = kept;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_assigns_ids() {
        let backend = MemoryBackend::new();
        let stored = backend
            .insert("workouts", vec![json!({ "name": "Push" })])
            .await
            .unwrap();
        let id = stored[0]["id"].as_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn test_select_orders_with_nulls_last_ascending() {
        let backend = MemoryBackend::new();
        backend
            .seed(
                "workouts",
                vec![
                    json!({ "n": 2, "done": null }),
                    json!({ "n": 1, "done": "2026-01-02T00:00:00Z" }),
                    json!({ "n": 3, "done": "2026-01-01T00:00:00.500Z" }),
                ],
            )
            .await;

        let asc = backend
            .select(&Query::table("workouts").order("done", true))
            .await
            .unwrap();
        let ns: Vec<i64> = asc.iter().map(|r| r["n"].as_i64().unwrap()).collect();
        assert_eq!(ns, vec![3, 1, 2]);

        let desc = backend
            .select(&Query::table("workouts").order("done", false).limit(2))
            .await
            .unwrap();
        let ns: Vec<i64> = desc.iter().map(|r| r["n"].as_i64().unwrap()).collect();
        assert_eq!(ns, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_filters_compare_rendered_values() {
        let backend = MemoryBackend::new();
        backend
            .seed(
                "workout_sets",
                vec![
                    json!({ "set_number": 1, "is_warmup": true }),
                    json!({ "set_number": 2, "is_warmup": false }),
                ],
            )
            .await;
        let rows = backend
            .select(&Query::table("workout_sets").eq("is_warmup", false))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["set_number"], 2);
    }

    #[tokio::test]
    async fn test_update_and_delete_return_affected_rows() {
        let backend = MemoryBackend::new();
        backend
            .seed("workouts", vec![json!({ "id": "a", "status": "in_progress" })])
            .await;

        let updated = backend
            .update(
                &Query::table("workouts").eq("id", "a"),
                json!({ "status": "completed" }),
            )
            .await
            .unwrap();
        assert_eq!(updated[0]["status"], "completed");

        let removed = backend
            .delete(&Query::table("workouts").eq("id", "a"))
            .await
            .unwrap();
        assert_eq!(removed.len(), 1);
        assert!(backend.rows("workouts").await.is_empty());
    }

    #[tokio::test]
    async fn test_injected_failure_fires_once() {
        let backend = MemoryBackend::new();
        backend
            .fail_next("workouts", Operation::Insert, 500, "boom")
            .await;

        let err = backend
            .insert("workouts", vec![json!({})])
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "boom");
        assert!(backend.insert("workouts", vec![json!({})]).await.is_ok());
        assert_eq!(backend.call_count(), 2);
    }
}
