//! In-memory collaborators for tests and local experiments.
//!
//! Each fake counts calls so tests can assert that validation failures never
//! reach the data service, and can be switched into an error mode where
//! every call fails.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Url;
use serde_json::Value;
use uuid::Uuid;

use models::StoredObject;

use crate::errors::ServiceError;
use crate::query::{join_segments, parse_base, Query};
use crate::store::{Clock, ImageFetcher, ObjectStore, TableStore};

fn unavailable() -> ServiceError {
    ServiceError::Upstream("memory store unavailable".into())
}

/// Tables as vectors of JSON rows, in insertion order.
#[derive(Default)]
pub struct MemoryTableStore {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    calls: AtomicUsize,
    failing: AtomicBool,
    /// When set, inserts report success but echo no rows.
    swallow_inserts: AtomicBool,
}

impl MemoryTableStore {
    pub fn new() -> Self { Self::default() }

    /// Seed `table` with raw rows, bypassing id assignment.
    pub fn with_rows(self, table: &str, rows: Vec<Value>) -> Self {
        self.tables.lock().unwrap().entry(table.to_string()).or_default().extend(rows);
        self
    }

    pub fn set_failing(&self, failing: bool) { self.failing.store(failing, Ordering::SeqCst); }

    pub fn set_swallow_inserts(&self, swallow: bool) { self.swallow_inserts.store(swallow, Ordering::SeqCst); }

    pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables.lock().unwrap().get(table).cloned().unwrap_or_default()
    }

    fn enter(&self) -> Result<(), ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) { Err(unavailable()) } else { Ok(()) }
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, ServiceError> {
        self.enter()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .get(table)
            .map(|rows| rows.iter().filter(|r| query.matches(r)).map(|r| query.project(r)).collect())
            .unwrap_or_default())
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Vec<Value>, ServiceError> {
        self.enter()?;
        let Value::Object(mut fields) = row else {
            return Err(ServiceError::Upstream("insert expects a JSON object".into()));
        };
        if self.swallow_inserts.load(Ordering::SeqCst) {
            return Ok(Vec::new());
        }
        fields.entry("id").or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        fields.entry("created_at").or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
        let stored = Value::Object(fields);
        self.tables.lock().unwrap().entry(table.to_string()).or_default().push(stored.clone());
        Ok(vec![stored])
    }

    async fn update(&self, table: &str, query: &Query, patch: Value) -> Result<Vec<Value>, ServiceError> {
        self.enter()?;
        let Value::Object(patch) = patch else {
            return Err(ServiceError::Upstream("update expects a JSON object".into()));
        };
        let mut tables = self.tables.lock().unwrap();
        let mut affected = Vec::new();
        for row in tables.get_mut(table).into_iter().flatten() {
            if !query.matches(row) {
                continue;
            }
            if let Value::Object(fields) = row {
                for (k, v) in &patch {
                    fields.insert(k.clone(), v.clone());
                }
            }
            affected.push(row.clone());
        }
        Ok(affected)
    }

    async fn delete(&self, table: &str, query: &Query) -> Result<(), ServiceError> {
        self.enter()?;
        if let Some(rows) = self.tables.lock().unwrap().get_mut(table) {
            rows.retain(|r| !query.matches(r));
        }
        Ok(())
    }
}

/// One bucket; listing returns objects in insertion order, which is what the
/// newest-image lookup must not rely on.
pub struct MemoryObjectStore {
    base: Url,
    bucket: String,
    objects: Mutex<Vec<(String, Vec<u8>, String)>>,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl Default for MemoryObjectStore {
    fn default() -> Self { Self::new("http://localhost:54321", "event-images") }
}

impl MemoryObjectStore {
    pub fn new(base_url: &str, bucket: &str) -> Self {
        Self {
            base: parse_base(base_url).unwrap_or_else(|_| Url::parse("http://localhost:54321").unwrap()),
            bucket: bucket.to_string(),
            objects: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    /// Pre-populate the listing with empty objects.
    pub fn with_names(self, names: &[&str]) -> Self {
        {
            let mut objects = self.objects.lock().unwrap();
            for name in names {
                objects.push((name.to_string(), Vec::new(), "image/png".to_string()));
            }
        }
        self
    }

    pub fn set_failing(&self, failing: bool) { self.failing.store(failing, Ordering::SeqCst); }

    pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }

    pub fn object(&self, name: &str) -> Option<(Vec<u8>, String)> {
        self.objects
            .lock()
            .unwrap()
            .iter()
            .find(|(n, _, _)| n == name)
            .map(|(_, bytes, ct)| (bytes.clone(), ct.clone()))
    }

    pub fn names(&self) -> Vec<String> {
        self.objects.lock().unwrap().iter().map(|(n, _, _)| n.clone()).collect()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_object(&self, name: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ServiceError::Upstream("Failed to upload image: memory store unavailable".into()));
        }
        let mut objects = self.objects.lock().unwrap();
        let entry = (name.to_string(), bytes, content_type.to_string());
        match objects.iter_mut().find(|(n, _, _)| n == name) {
            Some(existing) => *existing = entry,
            None => objects.push(entry),
        }
        Ok(())
    }

    async fn list_objects(&self) -> Result<Vec<StoredObject>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ServiceError::UpstreamStatus { status: 503, message: "Supabase API error".into() });
        }
        Ok(self.names().into_iter().map(|name| StoredObject { name }).collect())
    }

    fn public_url(&self, name: &str) -> Result<String, ServiceError> {
        let url = join_segments(&self.base, &["storage", "v1", "object", "public", &self.bucket, name])?;
        Ok(url.to_string())
    }
}

/// Serves registered URLs; anything else answers like a 404 from the source.
#[derive(Default)]
pub struct MemoryImageFetcher {
    images: Mutex<HashMap<String, Vec<u8>>>,
    calls: AtomicUsize,
}

impl MemoryImageFetcher {
    pub fn new() -> Self { Self::default() }

    pub fn with_image(self, url: &str, bytes: Vec<u8>) -> Self {
        self.images.lock().unwrap().insert(url.to_string(), bytes);
        self
    }

    pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
}

#[async_trait]
impl ImageFetcher for MemoryImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.images
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| ServiceError::UpstreamStatus { status: 404, message: "Failed to fetch image".into() })
    }
}

/// Clock that advances by `step` seconds on every reading.
pub struct StepClock {
    next: AtomicI64,
    step: i64,
}

impl StepClock {
    pub fn new(start: i64, step: i64) -> Self { Self { next: AtomicI64::new(start), step } }

    pub fn fixed(at: i64) -> Self { Self::new(at, 0) }
}

impl Clock for StepClock {
    fn now_unix(&self) -> i64 { self.next.fetch_add(self.step, Ordering::SeqCst) }
}
