//! In-memory execution history
//!
//! Process-lifetime, append-only record log. Records are never mutated or
//! evicted, so the list grows for as long as the process lives - a known
//! limitation, not something to fix here. A single lock serializes appends
//! from concurrent requests.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Completed,
    Failed,
}

/// One finished crew run.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionRecord {
    pub id: String,
    pub topic: String,
    pub crew_type: String,
    pub model: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_seconds: f64,
    pub result: String,
    pub status: ExecutionStatus,
}

impl ExecutionRecord {
    /// Fresh execution identifier.
    pub fn new_id() -> String {
        format!("exec_{}", Uuid::new_v4().simple())
    }
}

#[derive(Default)]
pub struct ExecutionHistory {
    records: RwLock<Vec<ExecutionRecord>>,
}

impl ExecutionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, record: ExecutionRecord) {
        self.records.write().push(record);
    }

    pub fn get(&self, id: &str) -> Option<ExecutionRecord> {
        self.records.read().iter().find(|r| r.id == id).cloned()
    }

    /// The most recent `limit` records, newest first.
    pub fn recent(&self, limit: usize) -> Vec<ExecutionRecord> {
        self.records
            .read()
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn record(id: &str) -> ExecutionRecord {
        let now = Utc::now();
        ExecutionRecord {
            id: id.to_string(),
            topic: "t".to_string(),
            crew_type: "research".to_string(),
            model: "m".to_string(),
            started_at: now,
            completed_at: now,
            duration_seconds: 0.0,
            result: "r".to_string(),
            status: ExecutionStatus::Completed,
        }
    }

    #[test]
    fn append_and_get_by_id() {
        let history = ExecutionHistory::new();
        history.append(record("a"));
        history.append(record("b"));

        assert_eq!(history.len(), 2);
        assert_eq!(history.get("a").unwrap().id, "a");
        assert!(history.get("missing").is_none());
    }

    #[test]
    fn recent_returns_newest_first_bounded_by_limit() {
        let history = ExecutionHistory::new();
        for i in 0..5 {
            history.append(record(&format!("exec_{i}")));
        }

        let recent = history.recent(3);
        let ids: Vec<&str> = recent.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["exec_4", "exec_3", "exec_2"]);

        // limit larger than the log returns everything
        assert_eq!(history.recent(100).len(), 5);
    }

    #[test]
    fn concurrent_appends_lose_nothing() {
        let history = Arc::new(ExecutionHistory::new());
        let mut handles = Vec::new();

        for i in 0..32 {
            let history = history.clone();
            handles.push(std::thread::spawn(move || {
                history.append(record(&format!("exec_{i}")));
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(history.len(), 32);
        for i in 0..32 {
            assert!(history.get(&format!("exec_{i}")).is_some());
        }
    }

    #[test]
    fn ids_are_unique() {
        let a = ExecutionRecord::new_id();
        let b = ExecutionRecord::new_id();
        assert_ne!(a, b);
        assert!(a.starts_with("exec_"));
    }
}
