#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use trk::config::IdentityConfig;
use trk::http::{build_router, AppState};
use trk::storage::Paths;
use trk::store::Backend;

pub struct TestEnv {
    dir: TempDir,
    pub paths: Paths,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let paths = Paths::new(dir.path().join("data"));
        paths.init_all().expect("failed to init data dir");
        Self { dir, paths }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn memory_backend(&self) -> Arc<Backend> {
        Arc::new(Backend::open(trk::config::BackendKind::Memory, &self.paths).unwrap())
    }

    pub fn document_backend(&self) -> Arc<Backend> {
        Arc::new(Backend::open(trk::config::BackendKind::Document, &self.paths).unwrap())
    }

    pub fn workbook_backend(&self) -> Arc<Backend> {
        Arc::new(Backend::open(trk::config::BackendKind::Workbook, &self.paths).unwrap())
    }

    /// Every backend behind the shared contract, labeled for assertions
    pub fn all_backends(&self) -> Vec<(&'static str, Arc<Backend>)> {
        vec![
            ("memory", self.memory_backend()),
            ("document", self.document_backend()),
            ("workbook", self.workbook_backend()),
        ]
    }

    pub fn router(&self, backend: Arc<Backend>) -> Router {
        self.router_with_identity(backend, IdentityConfig::default())
    }

    pub fn router_with_identity(&self, backend: Arc<Backend>, identity: IdentityConfig) -> Router {
        build_router(AppState::new(backend, identity))
    }
}

pub fn task_body(title: &str) -> Value {
    json!({"title": title})
}

pub fn habit_body(title: &str) -> Value {
    json!({"title": title, "frequency": ["Daily"]})
}

pub fn transaction_body(amount: f64, tx_type: &str, category: &str, date: &str) -> Value {
    json!({
        "amount": amount,
        "type": tx_type,
        "category": category,
        "date": date,
    })
}

pub fn time_block_body(title: &str, day: &str, start_hour: u32, duration: u32) -> Value {
    json!({
        "title": title,
        "day": day,
        "startHour": start_hour,
        "duration": duration,
        "category": "Work",
    })
}
