pub mod session;
pub mod state_machine;
mod sync;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::{config::AppConfig, question::GameDefinition, state::session::Session};

pub use self::state_machine::{
    InvalidTransition, SessionCommand, SessionStateMachine, SessionStatus,
};
pub use self::sync::SnapshotHub;

/// Shared handle to the whole application state.
pub type SharedState = Arc<AppState>;

/// Everything attached to one live session: the authoritative document, its
/// snapshot fan-out hub, and the gate serializing host commands.
pub struct SessionHandle {
    /// Authoritative session document. Player writes take the write lock
    /// briefly and only touch their own subtree; host commands go through
    /// the gate first.
    pub session: RwLock<Session>,
    /// Per-session snapshot broadcast.
    pub hub: SnapshotHub,
    /// Serializes host lifecycle commands so two commands can never
    /// interleave their validate/apply/mutate sequence.
    pub command_gate: Mutex<()>,
}

impl SessionHandle {
    fn new(session: Session, snapshot_capacity: usize) -> Self {
        Self {
            session: RwLock::new(session),
            hub: SnapshotHub::new(snapshot_capacity),
            command_gate: Mutex::new(()),
        }
    }

    /// Run a read-only closure against the session document.
    pub async fn with_session<T>(&self, f: impl FnOnce(&Session) -> T) -> T {
        let guard = self.session.read().await;
        f(&guard)
    }

    /// Run a mutating closure against the session document.
    pub async fn with_session_mut<T>(&self, f: impl FnOnce(&mut Session) -> T) -> T {
        let mut guard = self.session.write().await;
        f(&mut guard)
    }
}

/// Central application state: the read-only game catalog and the registry of
/// live sessions, both keyed by the game's join code.
pub struct AppState {
    config: Arc<AppConfig>,
    catalog: DashMap<String, Arc<GameDefinition>>,
    sessions: DashMap<String, Arc<SessionHandle>>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig) -> SharedState {
        Arc::new(Self {
            config: Arc::new(config),
            catalog: DashMap::new(),
            sessions: DashMap::new(),
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Install or replace a game definition in the catalog.
    pub fn register_definition(&self, definition: GameDefinition) {
        self.catalog
            .insert(definition.id.clone(), Arc::new(definition));
    }

    /// Look up a registered game definition.
    pub fn definition(&self, game_id: &str) -> Option<Arc<GameDefinition>> {
        self.catalog.get(game_id).map(|entry| entry.clone())
    }

    /// Look up the live session for `game_id`.
    pub fn session(&self, game_id: &str) -> Option<Arc<SessionHandle>> {
        self.sessions.get(game_id).map(|entry| entry.clone())
    }

    /// Create a fresh lobby session for a registered game.
    ///
    /// Returns `None` when a session for the game already exists; callers
    /// surface that as a conflict rather than silently replacing a live
    /// session.
    pub fn create_session(
        &self,
        game_id: &str,
        host_id: Uuid,
        definition: Arc<GameDefinition>,
    ) -> Option<Arc<SessionHandle>> {
        let session = Session::new(game_id.to_string(), host_id, definition);
        let handle = Arc::new(SessionHandle::new(
            session,
            self.config.snapshot_capacity,
        ));

        match self.sessions.entry(game_id.to_string()) {
            dashmap::Entry::Occupied(_) => None,
            dashmap::Entry::Vacant(slot) => {
                slot.insert(handle.clone());
                Some(handle)
            }
        }
    }

    /// Drop the live session for `game_id`, if any.
    pub fn remove_session(&self, game_id: &str) -> bool {
        self.sessions.remove(game_id).is_some()
    }

    /// Number of live sessions currently held in memory.
    pub fn live_session_count(&self) -> usize {
        self.sessions.len()
    }
}
