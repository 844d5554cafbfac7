//! Deterministic fakes for the host ports.

use std::sync::atomic::{AtomicI64, Ordering};

use parking_lot::Mutex;

use crate::errors::AuthError;
use crate::backend::MemoryStore;
use crate::ports::{Clock, KeyValueStore, Navigator, RandomSource};

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(now_ms),
        }
    }

    pub fn advance_ms(&self, delta: i64) {
        let _ = self.now.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Repeats a single character.
#[derive(Debug)]
pub struct FixedRandom(pub char);

impl RandomSource for FixedRandom {
    fn random_string(&self, length: usize) -> String {
        std::iter::repeat_n(self.0, length).collect()
    }
}

/// Records every navigation instead of performing it.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    pub visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn last(&self) -> Option<String> {
        self.visited.lock().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &str) -> Result<(), AuthError> {
        self.visited.lock().push(url.to_string());
        Ok(())
    }
}

/// Always fails to navigate.
#[derive(Debug)]
pub struct FailingNavigator;

impl Navigator for FailingNavigator {
    fn navigate(&self, _url: &str) -> Result<(), AuthError> {
        Err(AuthError::Navigation("no user agent".to_string()))
    }
}

/// Base URI of a local port with nothing listening on it.
pub fn closed_port_uri() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

/// Serves reads from an inner [`MemoryStore`] and rejects every write.
#[derive(Debug, Default)]
pub struct ReadOnlyStore(pub MemoryStore);

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), AuthError> {
        Err(AuthError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only store",
        )))
    }

    fn remove(&self, _key: &str) -> Result<(), AuthError> {
        Err(AuthError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only store",
        )))
    }
}
