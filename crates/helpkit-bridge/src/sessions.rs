use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use helpkit_core::{Catalog, Session};

pub const DEFAULT_MAX_SESSIONS: usize = 64;

pub struct SessionSlot {
    pub session: Session,
    pub opened_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub turns: u32,
}

/// Independent conversations sharing one catalog, keyed by ULID.
pub struct SessionRegistry {
    catalog: Arc<Catalog>,
    sessions: HashMap<String, SessionSlot>,
    max_sessions: usize,
}

impl SessionRegistry {
    pub fn new(catalog: Arc<Catalog>, max_sessions: usize) -> Self {
        Self {
            catalog,
            sessions: HashMap::new(),
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Open a session, evicting the least recently active one when full.
    pub fn open(&mut self) -> (String, &SessionSlot) {
        if self.sessions.len() >= self.max_sessions {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|(_, slot)| slot.last_active)
                .map(|(id, _)| id.clone());
            if let Some(id) = oldest {
                debug!(session = %id, "evicting idle session");
                self.sessions.remove(&id);
            }
        }

        let id = ulid::Ulid::new().to_string();
        let now = Utc::now();
        let slot = self.sessions.entry(id.clone()).or_insert(SessionSlot {
            session: Session::new(Arc::clone(&self.catalog)),
            opened_at: now,
            last_active: now,
            turns: 0,
        });
        (id, &*slot)
    }

    /// Look up a session for a turn and mark it active.
    pub fn touch(&mut self, id: &str) -> Option<&mut SessionSlot> {
        let slot = self.sessions.get_mut(id)?;
        slot.last_active = Utc::now();
        Some(slot)
    }

    /// Remove a session, returning its slot if it was open.
    pub fn close(&mut self, id: &str) -> Option<SessionSlot> {
        self.sessions.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
