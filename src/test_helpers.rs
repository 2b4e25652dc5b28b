//! Shared fakes for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;

use crate::device::{DeviceError, DeviceKind, MediaDevices, MediaStream};
use crate::features::FeatureContext;
use crate::prefs::{PreferenceStore, Preferences};
use crate::remote::types::{DegradeReason, ProcessingOutcome};
use crate::remote::{ProcessingRequest, RemoteProcessing};
use crate::session::{LocalSessionProvider, Token};
use crate::storage::InMemoryImageStore;

pub const TEST_TTL: Duration = Duration::from_secs(5);

// =========================================================================
// MockRemote
// =========================================================================

type SendHook = Box<dyn FnOnce() + Send>;

/// Scripted remote: pops queued outcomes, records every request.
#[derive(Default)]
pub struct MockRemote {
    outcomes: Mutex<VecDeque<ProcessingOutcome>>,
    calls: Mutex<Vec<ProcessingRequest>>,
    gate: Option<Arc<Notify>>,
    hook: Mutex<Option<SendHook>>,
}

impl MockRemote {
    pub fn new(outcomes: Vec<ProcessingOutcome>) -> Self {
        Self { outcomes: Mutex::new(outcomes.into()), ..Self::default() }
    }

    /// Every call waits on `gate` before answering.
    pub fn gated(outcomes: Vec<ProcessingOutcome>, gate: Arc<Notify>) -> Self {
        Self { gate: Some(gate), ..Self::new(outcomes) }
    }

    /// Run `hook` inside the next call, before it answers.
    pub fn with_hook(self, hook: impl FnOnce() + Send + 'static) -> Self {
        *self.hook.lock().unwrap() = Some(Box::new(hook));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<ProcessingRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RemoteProcessing for MockRemote {
    async fn send(&self, request: &ProcessingRequest, _token: &Token) -> ProcessingOutcome {
        self.calls.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let hook = self.hook.lock().unwrap().take();
        if let Some(hook) = hook {
            hook();
        }
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ProcessingOutcome::degraded(DegradeReason::ServiceError, "status 500"))
    }
}

// =========================================================================
// FakeDevices
// =========================================================================

#[derive(Default)]
pub struct FakeDevices {
    deny: bool,
    opens: AtomicUsize,
    stops: Arc<AtomicUsize>,
}

impl FakeDevices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn denying() -> Self {
        Self { deny: true, ..Self::default() }
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl MediaDevices for FakeDevices {
    fn open(&self, kind: DeviceKind) -> Result<Box<dyn MediaStream>, DeviceError> {
        if self.deny {
            return Err(DeviceError::PermissionDenied(kind));
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeStream { kind, stops: Arc::clone(&self.stops) }))
    }
}

struct FakeStream {
    kind: DeviceKind,
    stops: Arc<AtomicUsize>,
}

impl MediaStream for FakeStream {
    fn kind(&self) -> DeviceKind {
        self.kind
    }

    fn capture(&mut self) -> Result<Vec<u8>, DeviceError> {
        Ok(format!("fake-{}", self.kind).into_bytes())
    }

    fn stop(&mut self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

// =========================================================================
// Harness
// =========================================================================

pub struct Harness {
    pub ctx: FeatureContext,
    pub session: Arc<LocalSessionProvider>,
    pub remote: Arc<MockRemote>,
    pub devices: Arc<FakeDevices>,
    pub store: Arc<InMemoryImageStore>,
}

impl Harness {
    pub fn new(remote: MockRemote) -> Self {
        Self::build(remote, FakeDevices::new(), Preferences::default())
    }

    pub fn build(remote: MockRemote, devices: FakeDevices, prefs: Preferences) -> Self {
        let session = Arc::new(LocalSessionProvider::new());
        let remote = Arc::new(remote);
        let devices = Arc::new(devices);
        let store = Arc::new(InMemoryImageStore::new());
        let ctx = FeatureContext {
            session: session.clone(),
            remote: remote.clone(),
            prefs: Arc::new(PreferenceStore::in_memory(prefs)),
            store: store.clone(),
            devices: devices.clone(),
            status_ttl: TEST_TTL,
            history_limit: 20,
        };
        Self { ctx, session, remote, devices, store }
    }

    pub fn signed_in(self) -> Self {
        self.session
            .sign_in_federated("artisan-uid", Some("Ravi"), "id-token")
            .unwrap();
        self
    }
}
