//! Testing utilities for the deck workspace
//!
//! Card fixtures and a store whose calls can be held open or made to fail.

#![allow(missing_docs)]

use deck_filter::Record;
use parking_lot::Mutex;
use deck_sync::{Collection, CollectionStore, MemoryStore, StoreError};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Semaphore;

const OPEN_GATE_PERMITS: usize = 1024;

pub fn card(id: &str, title: &str, status: &str) -> Record {
    let value = json!({
        "id": id,
        "cardTitle": title,
        "currentWorkflow": status,
        "campaignId": "CN201701182",
        "likes": 10,
        "views": 30,
    });
    into_record(value)
}

pub fn into_record(value: Value) -> Record {
    match value {
        Value::Object(record) => record,
        other => panic!("fixture is not an object: {other}"),
    }
}

/// Ten cards covering every workflow status
pub fn sample_cards() -> Collection {
    vec![
        card("c1", "Title 1", "paused"),
        card("c2", "Title 2", "expired"),
        card("c3", "Title 1", "declined"),
        card("c4", "Title 1", "active"),
        card("c5", "Title 1", "active"),
        card("c6", "Title 1", "active"),
        card("c7", "title--3", "active"),
        card("c8", "title--4", "active"),
        card("c9", "title--5", "terminated"),
        card("c10", "title--6", "saved"),
    ]
}

/// Store wrapper for concurrency and failure tests
///
/// While gated, every call waits for a permit from [`release`](Self::release).
/// Call counters are bumped before waiting, so a test can tell a call has
/// reached the store.
#[derive(Debug)]
pub struct GatedStore {
    inner: MemoryStore,
    gate: Semaphore,
    gated: AtomicBool,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    reads: AtomicUsize,
    writes: AtomicUsize,
    echo: Mutex<Option<Collection>>,
}

impl GatedStore {
    pub fn new(items: Collection) -> Self {
        Self {
            inner: MemoryStore::new(items),
            gate: Semaphore::new(0),
            gated: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            echo: Mutex::new(None),
        }
    }

    /// Start holding calls until released
    pub fn close_gate(&self) {
        self.gated.store(true, Ordering::SeqCst);
    }

    /// Let `calls` held calls through
    pub fn release(&self, calls: usize) {
        self.gate.add_permits(calls);
    }

    /// Stop holding calls and let every held call through
    pub fn open_gate(&self) {
        self.gated.store(false, Ordering::SeqCst);
        self.gate.add_permits(OPEN_GATE_PERMITS);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Answer writes with `items` instead of what was written
    pub fn echo_on_write(&self, items: Collection) {
        *self.echo.lock() = Some(items);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> Collection {
        self.inner.snapshot()
    }

    async fn pass_gate(&self) {
        if self.gated.load(Ordering::SeqCst) {
            // the semaphore is never closed
            if let Ok(permit) = self.gate.acquire().await {
                permit.forget();
            }
        }
    }
}

#[async_trait::async_trait]
impl CollectionStore for GatedStore {
    async fn fetch_all(&self) -> Result<Collection, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads disabled".into()));
        }
        self.inner.fetch_all().await
    }

    async fn replace_all(&self, items: Collection) -> Result<Collection, StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".into()));
        }
        let stored = self.inner.replace_all(items).await?;
        let echo = self.echo.lock().clone();
        Ok(echo.unwrap_or(stored))
    }
}
