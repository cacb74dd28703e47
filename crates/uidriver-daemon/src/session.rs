use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::RwLock;
use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use tracing::debug;
use tracing::info;
use uuid::Uuid;

use uidriver_common::rwlock_read_or_recover;
use uidriver_common::rwlock_write_or_recover;
use uidriver_core::ElementCache;
use uidriver_core::ElementHandle;
use uidriver_core::Point;
use uidriver_core::Rect;
use uidriver_core::Selector;

use crate::device::BackendFactory;
use crate::device::DeviceError;
use crate::device::UiBackend;
use crate::error::CommandError;
use crate::lock_helpers::acquire_lock;
use crate::resolve::TargetParams;
use crate::resolve::resolve_point;

pub const DEFAULT_MAX_SESSIONS: usize = 8;

/// Opaque session identifier handed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generate a new unique session ID.
pub fn generate_session_id() -> SessionId {
    SessionId::new(Uuid::new_v4().to_string()[..8].to_string())
}

/// One automation context: an element cache plus the backend that talks to
/// the device. Element references live and die with the session.
pub struct Session {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    cache: ElementCache,
    backend: Box<dyn UiBackend>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

impl Session {
    fn new(id: SessionId, backend: Box<dyn UiBackend>) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            cache: ElementCache::new(),
            backend,
        }
    }

    pub fn cache(&self) -> &ElementCache {
        &self.cache
    }

    /// Discovery collaborators insert handles here directly.
    pub fn cache_mut(&mut self) -> &mut ElementCache {
        &mut self.cache
    }

    pub fn resolve_target(&self, params: &TargetParams) -> Result<Point, CommandError> {
        resolve_point(params, &self.cache)
    }

    pub fn tap(&mut self, point: Point) -> Result<(), CommandError> {
        self.backend.tap(point).map_err(CommandError::from)
    }

    pub fn double_tap(&mut self, point: Point) -> Result<(), CommandError> {
        self.backend.double_tap(point).map_err(CommandError::from)
    }

    pub fn long_tap(&mut self, point: Point, duration: Duration) -> Result<(), CommandError> {
        self.backend
            .long_tap(point, duration)
            .map_err(CommandError::from)
    }

    pub fn touch_down(&mut self, point: Point) -> Result<(), CommandError> {
        self.backend.touch_down(point).map_err(CommandError::from)
    }

    pub fn touch_up(&mut self, point: Point) -> Result<(), CommandError> {
        self.backend.touch_up(point).map_err(CommandError::from)
    }

    pub fn touch_move(&mut self, point: Point) -> Result<(), CommandError> {
        self.backend.touch_move(point).map_err(CommandError::from)
    }

    pub fn drag(&mut self, from: Point, to: Point, steps: u32) -> Result<(), CommandError> {
        self.backend
            .drag(from, to, steps)
            .map_err(CommandError::from)
    }

    /// Look an element up on the device and cache the result under a fresh
    /// reference id.
    pub fn find_element(&mut self, selector: Selector) -> Result<ElementHandle, CommandError> {
        match self.backend.find_element(&selector)? {
            Some(bounds) => {
                let handle = ElementHandle::with_selector(bounds, selector);
                self.cache.put(handle.clone());
                debug!(element = %handle.id, bounds = %handle.bounds, "cached element");
                Ok(handle)
            }
            None => Err(CommandError::ElementNotFound(selector.to_string())),
        }
    }

    /// Re-read a cached element's rectangle from the device, refreshing the
    /// cache. A stale element is invalidated and reported as not found.
    pub fn element_rect(&mut self, element_id: &str) -> Result<Rect, CommandError> {
        let handle = self
            .cache
            .get(element_id)
            .cloned()
            .ok_or_else(|| CommandError::ElementNotFound(element_id.to_string()))?;

        // Handles inserted without a selector cannot be re-located; their
        // last-known bounds are the best available answer.
        let Some(selector) = &handle.selector else {
            return Ok(handle.bounds);
        };

        match self.backend.element_bounds(selector) {
            Ok(bounds) => {
                self.cache.update_bounds(element_id, bounds);
                Ok(bounds)
            }
            Err(DeviceError::Stale) => {
                debug!(element = element_id, "element went stale, invalidating");
                self.cache.invalidate(element_id);
                Err(CommandError::ElementNotFound(element_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn element_count(&self) -> usize {
        self.cache.len()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub id: String,
    pub created_at: String,
    pub elements: usize,
}

/// All live sessions, each behind its own mutex so concurrent sessions
/// never block one another.
///
/// Lock ordering: sessions → active → Session mutex.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<Session>>>>,
    active: RwLock<Option<SessionId>>,
    backends: BackendFactory,
    max_sessions: usize,
}

impl SessionRegistry {
    pub fn new(backends: BackendFactory) -> Self {
        Self::with_max_sessions(DEFAULT_MAX_SESSIONS, backends)
    }

    pub fn with_max_sessions(max_sessions: usize, backends: BackendFactory) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            active: RwLock::new(None),
            backends,
            max_sessions,
        }
    }

    /// Open a backend and register a new session around it. The new session
    /// becomes the active one.
    pub fn create(&self) -> Result<SessionId, CommandError> {
        {
            let sessions = rwlock_read_or_recover(&self.sessions);
            if sessions.len() >= self.max_sessions {
                return Err(CommandError::SessionLimit(self.max_sessions));
            }
        }

        let backend = (self.backends)()
            .map_err(|e| CommandError::ExecutionFailed(format!("failed to open backend: {}", e)))?;

        let id = generate_session_id();
        let session = Arc::new(Mutex::new(Session::new(id.clone(), backend)));

        {
            let mut sessions = rwlock_write_or_recover(&self.sessions);
            sessions.insert(id.clone(), session);
        }
        {
            let mut active = rwlock_write_or_recover(&self.active);
            *active = Some(id.clone());
        }

        info!(session = %id, "session created");
        Ok(id)
    }

    pub fn get(&self, session_id: &str) -> Result<Arc<Mutex<Session>>, CommandError> {
        let sessions = rwlock_read_or_recover(&self.sessions);
        sessions
            .get(&SessionId::new(session_id))
            .cloned()
            .ok_or_else(|| CommandError::SessionNotFound(session_id.to_string()))
    }

    pub fn active(&self) -> Result<Arc<Mutex<Session>>, CommandError> {
        let active_id = {
            let active = rwlock_read_or_recover(&self.active);
            active.clone()
        };
        match active_id {
            Some(id) => self.get(id.as_str()),
            None => Err(CommandError::NoActiveSession),
        }
    }

    /// An explicit session id wins; otherwise the active session serves.
    pub fn resolve(&self, session_id: Option<&str>) -> Result<Arc<Mutex<Session>>, CommandError> {
        match session_id {
            Some(id) => self.get(id),
            None => self.active(),
        }
    }

    pub fn set_active(&self, session_id: &str) -> Result<(), CommandError> {
        let id = SessionId::new(session_id);
        let sessions = rwlock_read_or_recover(&self.sessions);
        if !sessions.contains_key(&id) {
            return Err(CommandError::SessionNotFound(session_id.to_string()));
        }
        let mut active = rwlock_write_or_recover(&self.active);
        *active = Some(id);
        Ok(())
    }

    pub fn list(&self) -> Vec<SessionInfo> {
        let session_refs: Vec<(SessionId, Arc<Mutex<Session>>)> = {
            let sessions = rwlock_read_or_recover(&self.sessions);
            sessions
                .iter()
                .map(|(id, session)| (id.clone(), Arc::clone(session)))
                .collect()
        };

        session_refs
            .into_iter()
            .map(|(id, session)| {
                match acquire_lock(&session, Duration::from_millis(100)) {
                    Some(sess) => SessionInfo {
                        id: id.to_string(),
                        created_at: sess.created_at.to_rfc3339(),
                        elements: sess.element_count(),
                    },
                    // busy running a command; report what is known
                    None => SessionInfo {
                        id: id.to_string(),
                        created_at: String::new(),
                        elements: 0,
                    },
                }
            })
            .collect()
    }

    pub fn delete(&self, session_id: &str) -> Result<(), CommandError> {
        let id = SessionId::new(session_id);

        {
            let mut sessions = rwlock_write_or_recover(&self.sessions);
            let mut active = rwlock_write_or_recover(&self.active);

            sessions
                .remove(&id)
                .ok_or_else(|| CommandError::SessionNotFound(session_id.to_string()))?;

            if active.as_ref() == Some(&id) {
                *active = None;
            }
        }

        info!(session = session_id, "session deleted");
        Ok(())
    }

    pub fn count(&self) -> usize {
        rwlock_read_or_recover(&self.sessions).len()
    }

    pub fn active_session_id(&self) -> Option<SessionId> {
        rwlock_read_or_recover(&self.active).clone()
    }
}
