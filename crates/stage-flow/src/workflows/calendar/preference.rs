use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use super::term::{window, Term};
use crate::workflows::actor::{Actor, Role};
use crate::workflows::error::GuardViolation;

/// Key used before selections were scoped per actor. Cleared on restore, never read.
pub const LEGACY_KEY: &str = "selectedTerm";
/// Scope used when the role or the user id is unknown.
pub const ANONYMOUS_KEY: &str = "selectedTerm:anonymous";

/// Storage key for one actor's term preference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActorKey(String);

impl ActorKey {
    pub fn new(role: Option<Role>, user_id: Option<&str>) -> Self {
        match (role, user_id.map(str::trim).filter(|id| !id.is_empty())) {
            (Some(role), Some(user_id)) => Self(format!("{LEGACY_KEY}:{}:{user_id}", role.label())),
            _ => Self(ANONYMOUS_KEY.to_string()),
        }
    }

    pub fn for_actor(actor: &Actor) -> Self {
        Self::new(actor.role, actor.user_id.as_deref())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scoped key-value storage for user preferences (browser storage, a file, a remote profile).
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;
    fn set(&self, key: &str, value: String) -> Result<(), PreferenceError>;
    fn delete(&self, key: &str) -> Result<(), PreferenceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PreferenceError {
    #[error("preference storage unavailable: {0}")]
    Unavailable(String),
    #[error("stored preference under '{key}' is malformed: {reason}")]
    Malformed { key: String, reason: String },
}

/// Process-local store; also the session fallback when durable storage is absent.
#[derive(Debug, Default, Clone)]
pub struct MemoryPreferenceStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryPreferenceStore {
    fn entries(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, PreferenceError> {
        self.entries
            .lock()
            .map_err(|_| PreferenceError::Unavailable("preference mutex poisoned".to_string()))
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), PreferenceError> {
        self.entries()?.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), PreferenceError> {
        self.entries()?.remove(key);
        Ok(())
    }
}

pub fn persist(
    store: &dyn PreferenceStore,
    key: &ActorKey,
    term: Term,
) -> Result<(), PreferenceError> {
    let encoded = serde_json::to_string(&term).map_err(|err| PreferenceError::Malformed {
        key: key.to_string(),
        reason: err.to_string(),
    })?;
    store.set(key.as_str(), encoded)
}

/// Reads the actor's stored term. The legacy global key is deleted first, whatever the outcome.
pub fn restore(store: &dyn PreferenceStore, key: &ActorKey) -> Result<Option<Term>, PreferenceError> {
    if let Err(err) = store.delete(LEGACY_KEY) {
        warn!(error = %err, "failed to clear legacy term preference");
    }

    let Some(raw) = store.get(key.as_str())? else {
        return Ok(None);
    };

    serde_json::from_str::<Term>(&raw)
        .map(Some)
        .map_err(|err| PreferenceError::Malformed {
            key: key.to_string(),
            reason: err.to_string(),
        })
}

/// The term an actor currently filters by, kept in sync with the preference store.
///
/// Storage is best-effort: when a write fails the selection lives on in memory for the rest of
/// the session and [`TermSelection::is_durable`] turns false.
pub struct TermSelection {
    store: Arc<dyn PreferenceStore>,
    key: ActorKey,
    selected: Term,
    durable: bool,
}

impl TermSelection {
    /// Restores the actor's term, resetting it to the current term when it fell out of the
    /// window.
    pub fn initialize(store: Arc<dyn PreferenceStore>, actor: &Actor, now: NaiveDate) -> Self {
        let key = ActorKey::for_actor(actor);
        let current = Term::current(now);

        let restored = match restore(store.as_ref(), &key) {
            Ok(term) => term,
            Err(err) => {
                warn!(key = %key, error = %err, "could not restore term preference");
                None
            }
        };

        let mut selection = Self {
            store,
            key,
            selected: current,
            durable: true,
        };

        match restored {
            Some(term) if window(now).contains(&term) => selection.selected = term,
            Some(stale) => {
                info!(key = %selection.key, %stale, %current, "stored term left the window; resetting");
                selection.save();
            }
            None => {}
        }

        selection
    }

    pub fn selected(&self) -> Term {
        self.selected
    }

    pub fn key(&self) -> &ActorKey {
        &self.key
    }

    pub fn is_durable(&self) -> bool {
        self.durable
    }

    /// Selects a term from `window(now)` and persists it.
    pub fn select(&mut self, term: Term, now: NaiveDate) -> Result<Term, GuardViolation> {
        if !window(now).contains(&term) {
            return Err(GuardViolation::TermOutsideWindow(term));
        }

        self.selected = term;
        self.save();
        Ok(term)
    }

    /// Drops the stored preference (logout) and falls back to the current term.
    pub fn clear(&mut self, now: NaiveDate) {
        if let Err(err) = self.store.delete(self.key.as_str()) {
            warn!(key = %self.key, error = %err, "failed to delete term preference");
        }
        self.selected = Term::current(now);
    }

    fn save(&mut self) {
        match persist(self.store.as_ref(), &self.key, self.selected) {
            Ok(()) => self.durable = true,
            Err(err) => {
                warn!(key = %self.key, error = %err, "term preference kept in memory only");
                self.durable = false;
            }
        }
    }
}
