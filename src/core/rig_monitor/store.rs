//! Sensor store clients.
//!
//! The rig publishes every reading as a string value under a fixed key. The
//! monitor only needs two operations: an atomic pipelined read of many keys
//! and a plain write for the logging signal.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use redis::Commands;

use crate::core::config::StoreConfig;
use crate::error::{Result, RigError};

/// An open connection to the sensor store
pub trait StoreClient: Send {
    /// Read all `keys` in one round trip.
    ///
    /// The reply has one entry per key, in order; `None` means the key is
    /// not set.
    fn fetch(&mut self, keys: &[&str]) -> Result<Vec<Option<String>>>;

    /// Write a single key
    fn put(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Opens store connections
pub trait StoreConnector {
    type Client: StoreClient;

    fn connect(&self) -> Result<Self::Client>;

    /// Human-readable target, used in logs and the dashboard header
    fn describe(&self) -> String;
}

/// Connector for a Redis server
#[derive(Debug, Clone)]
pub struct RedisConnector {
    url: String,
    timeout: Duration,
}

impl RedisConnector {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            url: config.url(),
            timeout: Duration::from_millis(config.connect_timeout_ms),
        }
    }
}

impl StoreConnector for RedisConnector {
    type Client = RedisStore;

    fn connect(&self) -> Result<RedisStore> {
        if self.timeout.is_zero() {
            return Err(RigError::config("store.connect_timeout_ms must be greater than 0"));
        }
        log::info!("Connecting to sensor store at {}", self.url);
        let client = redis::Client::open(self.url.as_str())?;
        let mut conn = client.get_connection_with_timeout(self.timeout)?;
        conn.set_read_timeout(Some(self.timeout))?;
        conn.set_write_timeout(Some(self.timeout))?;
        Ok(RedisStore { conn })
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Live Redis connection
pub struct RedisStore {
    conn: redis::Connection,
}

impl StoreClient for RedisStore {
    fn fetch(&mut self, keys: &[&str]) -> Result<Vec<Option<String>>> {
        let mut pipe = redis::pipe();
        pipe.atomic();
        for key in keys {
            pipe.get(*key);
        }

        // Raw bytes so one non-UTF-8 value cannot fail the whole reply
        let raw: Vec<Option<Vec<u8>>> = pipe.query(&mut self.conn)?;

        Ok(raw
            .into_iter()
            .map(|value| value.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
            .collect())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        let _: () = self.conn.set(key, value)?;
        Ok(())
    }
}

/// In-process store shared between a connector, its clients and the caller.
///
/// Used by tests and for dry runs; every clone sees the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    values: HashMap<String, String>,
    refuse_connections: bool,
    fail_reads: bool,
    fetches: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: &str, value: impl Into<String>) {
        self.inner.lock().values.insert(key.to_string(), value.into());
    }

    pub fn remove(&self, key: &str) {
        self.inner.lock().values.remove(key);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().values.get(key).cloned()
    }

    /// Make subsequent `connect` calls fail
    pub fn refuse_connections(&self, refuse: bool) {
        self.inner.lock().refuse_connections = refuse;
    }

    /// Make subsequent reads fail as if the connection dropped
    pub fn fail_reads(&self, fail: bool) {
        self.inner.lock().fail_reads = fail;
    }

    /// Number of multi-key reads served so far
    pub fn fetch_count(&self) -> u64 {
        self.inner.lock().fetches
    }
}

impl StoreClient for MemoryStore {
    fn fetch(&mut self, keys: &[&str]) -> Result<Vec<Option<String>>> {
        let mut inner = self.inner.lock();
        if inner.fail_reads {
            return Err(RigError::other("memory store read failure"));
        }
        inner.fetches += 1;
        Ok(keys.iter().map(|k| inner.values.get(*k).cloned()).collect())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.set(key, value);
        Ok(())
    }
}

impl StoreConnector for MemoryStore {
    type Client = MemoryStore;

    fn connect(&self) -> Result<MemoryStore> {
        if self.inner.lock().refuse_connections {
            return Err(RigError::other("memory store refused the connection"));
        }
        Ok(self.clone())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
