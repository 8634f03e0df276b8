#![allow(dead_code)]

use async_trait::async_trait;
use quarry::{Context, ExecResult, Executor, MemoryRows, QuarryResult, Rows, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Collapse runs of whitespace so layout newlines do not matter.
pub fn normalize_sql(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Records every statement and answers queries from a queue of result sets.
#[derive(Default)]
pub struct MockDb {
    calls: Mutex<Vec<(String, Vec<Value>)>>,
    results: Mutex<VecDeque<MemoryRows>>,
    closed: Arc<AtomicUsize>,
}

impl MockDb {
    pub fn new(results: Vec<MemoryRows>) -> Self {
        Self {
            calls: Mutex::default(),
            results: Mutex::new(results.into()),
            closed: Arc::default(),
        }
    }

    pub fn push(&self, rows: MemoryRows) {
        self.results.lock().unwrap().push_back(rows);
    }

    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    /// How many result sets handed out so far were closed.
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    fn record(&self, sql: &str, args: &[Value]) {
        self.calls
            .lock()
            .unwrap()
            .push((normalize_sql(sql), args.to_vec()));
    }
}

#[async_trait]
impl Executor for MockDb {
    async fn execute(&self, _ctx: &Context, sql: &str, args: &[Value]) -> QuarryResult<ExecResult> {
        self.record(sql, args);
        Ok(ExecResult {
            rows_affected: 1,
            last_insert_id: Some(42),
        })
    }

    async fn query(
        &self,
        _ctx: &Context,
        sql: &str,
        args: &[Value],
    ) -> QuarryResult<Box<dyn Rows>> {
        self.record(sql, args);
        let rows = self.results.lock().unwrap().pop_front().unwrap_or_default();
        Ok(Box::new(TrackedRows {
            rows,
            closed: self.closed.clone(),
        }))
    }
}

/// Counts `close` calls on the wrapped rows.
struct TrackedRows {
    rows: MemoryRows,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl Rows for TrackedRows {
    fn columns(&self) -> &[String] {
        self.rows.columns()
    }

    async fn next(&mut self) -> QuarryResult<Option<Vec<Value>>> {
        self.rows.next().await
    }

    async fn close(&mut self) -> QuarryResult<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        self.rows.close().await
    }
}
