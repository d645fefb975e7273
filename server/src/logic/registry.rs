use std::{
    sync::{Arc, Mutex as StdMutex, PoisonError},
    time::Duration,
};

use dashmap::{DashMap, Entry};
use jirai_common::models::MineField;
use nanoid::nanoid;
use tokio::{sync::Mutex, time::Instant};
use tracing::{debug, info, instrument, warn};

use crate::{error::Error, logic::session::Session};

pub type SharedSession = Arc<Mutex<Session>>;

pub const DEFAULT_CAPACITY: usize = 500;
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Owns every live session.
///
/// Each session sits behind its own async mutex, so touches on one session
/// are serialized while the map itself stays available to other requests.
pub struct SessionRegistry {
    sessions: DashMap<String, SharedSession>,
    admission: StdMutex<()>,
    capacity: usize,
    ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

impl SessionRegistry {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            admission: StdMutex::new(()),
            capacity,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Opens a new session on `field` under a fresh id.
    #[instrument(level = "trace", skip(self, field), fields(field_id = field.id()))]
    pub fn create(&self, field: Arc<MineField>) -> Result<SharedSession, Error> {
        let _admission = self
            .admission
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if self.sessions.len() >= self.capacity {
            warn!("Refusing new session, {} already live", self.sessions.len());
            return Err(Error::Capacity {
                limit: self.capacity,
            });
        }

        let mut id_length = 8;
        let max_attempts_per_length = 10;

        loop {
            for _ in 0..max_attempts_per_length {
                let id = nanoid!(id_length);
                match self.sessions.entry(id.clone()) {
                    Entry::Occupied(_) => {
                        debug!("Session ID collision, trying another: {}", id);
                    }
                    Entry::Vacant(entry) => {
                        let session =
                            Arc::new(Mutex::new(Session::new(id.clone(), Arc::clone(&field))));
                        entry.insert(session.clone());
                        info!("Created session {} on field {}", id, field.id());
                        return Ok(session);
                    }
                }
            }

            warn!(
                "Exhausted ID attempts at length {}, increasing to {}",
                id_length,
                id_length + 1
            );
            id_length += 1;
        }
    }

    pub fn get(&self, id: &str) -> Result<SharedSession, Error> {
        self.sessions
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::not_found(format!("session({id}) not found")))
    }

    /// Whether `id` still maps to this very session.
    pub fn holds(&self, id: &str, session: &SharedSession) -> bool {
        self.sessions
            .get(id)
            .is_some_and(|current| Arc::ptr_eq(current.value(), session))
    }

    /// Drops a session. Removing an unknown id is not an error.
    pub fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            debug!("Removed session {}", id);
        }
        removed
    }

    /// Drops every session older than the TTL, whatever its status.
    ///
    /// Sessions locked by an in-flight touch are left for the next sweep.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        self.sessions.retain(|id, session| match session.try_lock() {
            Ok(session) if session.is_expired(self.ttl, now) => {
                debug!("Expiring session {} ({:?})", id, session.status());
                removed += 1;
                false
            }
            Ok(_) => true,
            Err(_) => {
                debug!("Session {} busy, skipping this sweep", id);
                true
            }
        });

        if removed > 0 {
            info!("Expired {} sessions, {} still live", removed, self.sessions.len());
        }
        removed
    }
}
