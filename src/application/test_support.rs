// Test doubles shared by the application tests
use crate::application::data_source::{
    DataSource, HovmollerRequest, HovmollerResponse, TimeseriesRequest, TimeseriesResponse,
};
use crate::application::preferences::PreferenceBackend;
use crate::error::{PreferenceError, TransportError};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Serves canned JSON bodies and records what it was asked for.
pub struct StubDataSource {
    hovmoller: Mutex<Value>,
    timeseries: Mutex<Value>,
    failing: Mutex<bool>,
    calls: AtomicUsize,
    gate: Mutex<Option<Arc<Notify>>>,
    last_hovmoller: Mutex<Option<HovmollerRequest>>,
    last_timeseries: Mutex<Option<TimeseriesRequest>>,
}

impl Default for StubDataSource {
    fn default() -> Self {
        Self {
            hovmoller: Mutex::new(json!({})),
            timeseries: Mutex::new(json!({})),
            failing: Mutex::new(false),
            calls: AtomicUsize::new(0),
            gate: Mutex::new(None),
            last_hovmoller: Mutex::new(None),
            last_timeseries: Mutex::new(None),
        }
    }
}

impl StubDataSource {
    pub fn set_hovmoller(&self, body: Value) {
        *self.hovmoller.lock().unwrap() = body;
    }

    pub fn set_timeseries(&self, body: Value) {
        *self.timeseries.lock().unwrap() = body;
    }

    /// Make every following request fail as if the network dropped.
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_hovmoller_request(&self) -> Option<HovmollerRequest> {
        self.last_hovmoller.lock().unwrap().clone()
    }

    pub fn last_timeseries_request(&self) -> Option<TimeseriesRequest> {
        self.last_timeseries.lock().unwrap().clone()
    }

    /// Hold every following request open until `gate` is notified.
    pub fn hold_until(&self, gate: Arc<Notify>) {
        *self.gate.lock().unwrap() = Some(gate);
    }

    async fn pass_gate(&self) {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn check_failing(&self) -> Result<(), TransportError> {
        if *self.failing.lock().unwrap() {
            return Err(TransportError::Status {
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DataSource for StubDataSource {
    async fn load_hovmoller(&self, request: &HovmollerRequest) -> Result<HovmollerResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_hovmoller.lock().unwrap() = Some(request.clone());
        self.pass_gate().await;
        self.check_failing()?;
        let body = self.hovmoller.lock().unwrap().clone();
        serde_json::from_value(body).map_err(|e| TransportError::Decode(e.to_string()))
    }

    async fn load_timeseries(&self, request: &TimeseriesRequest) -> Result<TimeseriesResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_timeseries.lock().unwrap() = Some(request.clone());
        self.pass_gate().await;
        self.check_failing()?;
        let body = self.timeseries.lock().unwrap().clone();
        serde_json::from_value(body).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

/// Preference backend that lives only as long as the test.
#[derive(Default)]
pub struct MemoryPreferences {
    entries: Mutex<HashMap<String, String>>,
}

impl PreferenceBackend for MemoryPreferences {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn put(&self, entries: &[(String, String)]) -> Result<(), PreferenceError> {
        self.entries.lock().unwrap().extend(entries.iter().cloned());
        Ok(())
    }

    fn remove(&self, keys: &[String]) -> Result<(), PreferenceError> {
        let mut entries = self.entries.lock().unwrap();
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }
}
