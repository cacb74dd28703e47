use std::env;
use std::time::Duration;

use crate::session::DEFAULT_MAX_SESSIONS;

const DEFAULT_MAX_CONNECTIONS: usize = 16;
const DEFAULT_LOCK_TIMEOUT_SECS: u64 = 5;
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 300;
const DEFAULT_MAX_REQUEST_BYTES: usize = 1_048_576; // 1MB

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub max_connections: usize,
    pub lock_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_request_bytes: usize,
    pub max_sessions: usize,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl DaemonConfig {
    pub fn from_env() -> Self {
        Self {
            max_connections: env::var("UIDRIVER_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            lock_timeout: Duration::from_secs(
                env::var("UIDRIVER_LOCK_TIMEOUT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_LOCK_TIMEOUT_SECS),
            ),
            idle_timeout: Duration::from_secs(
                env::var("UIDRIVER_IDLE_TIMEOUT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_IDLE_TIMEOUT_SECS),
            ),
            max_request_bytes: env::var("UIDRIVER_MAX_REQUEST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_REQUEST_BYTES),
            max_sessions: env::var("UIDRIVER_MAX_SESSIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_SESSIONS),
        }
    }

    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn with_max_request_bytes(mut self, max: usize) -> Self {
        self.max_request_bytes = max;
        self
    }

    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max;
        self
    }
}
