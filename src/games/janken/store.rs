//! Reactive game state store.
//!
//! The store holds one [`GameState`] behind an `Arc`. Every write builds a
//! new snapshot from a [`StatePatch`] and swaps it in, so a snapshot handed
//! out by [`GameStateStore::get_state`] is never affected by later writes.
//! Subscribers are notified synchronously, in registration order, outside
//! the state lock. Deliveries from concurrent writers never interleave: each
//! writer holds the delivery lock from its write until its last listener
//! returns, so every subscriber sees snapshots in the order they were stored.

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, error, instrument, trace};

use super::config::GameConfig;
use super::{Card, GamePhase, GameState, Player, PlayerId, RoundResult};

/// Callback invoked with every new snapshot.
pub type Listener = Arc<dyn Fn(&Arc<GameState>) + Send + Sync>;

/// Identifies one registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[display("listener-{}", _0)]
pub struct ListenerId(u64);

/// Partial update: supplied fields replace the current ones, the rest are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatePatch {
    phase: Option<GamePhase>,
    players: Option<Vec<Player>>,
    discard: Option<Vec<Card>>,
    current_round: Option<u32>,
    last_result: Option<Option<RoundResult>>,
    selected_cards: Option<BTreeMap<PlayerId, Card>>,
    session: Option<u64>,
}

impl StatePatch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the phase.
    pub fn phase(mut self, phase: GamePhase) -> Self {
        self.phase = Some(phase);
        self
    }

    /// Replaces every player.
    pub fn players(mut self, players: Vec<Player>) -> Self {
        self.players = Some(players);
        self
    }

    /// Replaces the discard.
    pub fn discard(mut self, discard: Vec<Card>) -> Self {
        self.discard = Some(discard);
        self
    }

    /// Sets the round number.
    pub fn current_round(mut self, round: u32) -> Self {
        self.current_round = Some(round);
        self
    }

    /// Sets or clears the last round result.
    pub fn last_result(mut self, result: Option<RoundResult>) -> Self {
        self.last_result = Some(result);
        self
    }

    /// Replaces the committed selections.
    pub fn selected_cards(mut self, selected: BTreeMap<PlayerId, Card>) -> Self {
        self.selected_cards = Some(selected);
        self
    }

    /// Sets the deal token.
    pub fn session(mut self, session: u64) -> Self {
        self.session = Some(session);
        self
    }

    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Builds the state that results from applying this patch to `state`.
    pub fn apply(self, state: &GameState) -> GameState {
        GameState {
            phase: self.phase.unwrap_or(state.phase),
            players: self.players.unwrap_or_else(|| state.players.clone()),
            discard: self.discard.unwrap_or_else(|| state.discard.clone()),
            current_round: self.current_round.unwrap_or(state.current_round),
            last_result: self.last_result.unwrap_or(state.last_result),
            selected_cards: self
                .selected_cards
                .unwrap_or_else(|| state.selected_cards.clone()),
            session: self.session.unwrap_or(state.session),
        }
    }
}

struct Registry {
    state: Arc<GameState>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

/// Single source of truth for the game state.
///
/// Cloning the store yields another handle to the same state.
#[derive(Clone)]
pub struct GameStateStore {
    inner: Arc<Mutex<Registry>>,
    // Lock order: `delivery` before `inner`.
    delivery: Arc<Mutex<()>>,
}

impl std::fmt::Debug for GameStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.lock();
        f.debug_struct("GameStateStore")
            .field("phase", &registry.state.phase)
            .field("session", &registry.state.session)
            .field("listeners", &registry.listeners.len())
            .finish()
    }
}

impl GameStateStore {
    /// Creates a store holding the undealt state for `config`.
    #[instrument(skip(config))]
    pub fn new(config: &GameConfig) -> Self {
        Self::from_state(GameState::new(config))
    }

    /// Creates a store holding `state`.
    #[instrument(skip(state), fields(phase = %state.phase))]
    pub fn from_state(state: GameState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry {
                state: Arc::new(state),
                listeners: Vec::new(),
                next_listener: 0,
            })),
            delivery: Arc::new(Mutex::new(())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the current snapshot.
    pub fn get_state(&self) -> Arc<GameState> {
        Arc::clone(&self.lock().state)
    }

    /// Merges `patch` into the current state and notifies every subscriber.
    ///
    /// Returns the new snapshot.
    #[instrument(skip(self, patch))]
    pub fn set_state(&self, patch: StatePatch) -> Arc<GameState> {
        match self.try_update(|_| Ok::<_, std::convert::Infallible>(patch)) {
            Ok(snapshot) => snapshot,
            Err(never) => match never {},
        }
    }

    /// Atomically derives a patch from the current state and applies it.
    ///
    /// `derive` runs under the store lock, so no other write can land between
    /// the read and the write. If it returns `Err`, nothing changes and no
    /// subscriber is notified.
    ///
    /// A concurrent writer blocks until this write's listeners have returned.
    /// Listeners may call [`GameStateStore::get_state`] but must not write.
    #[instrument(skip(self, derive))]
    pub fn try_update<E, F>(&self, derive: F) -> Result<Arc<GameState>, E>
    where
        F: FnOnce(&GameState) -> Result<StatePatch, E>,
    {
        let _delivery = self
            .delivery
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let (snapshot, listeners) = {
            let mut registry = self.lock();
            let patch = derive(&registry.state)?;
            let next = Arc::new(patch.apply(&registry.state));
            registry.state = Arc::clone(&next);
            let listeners: Vec<_> = registry.listeners.clone();
            (next, listeners)
        };

        debug!(
            phase = %snapshot.phase,
            round = snapshot.current_round,
            listeners = listeners.len(),
            "State updated"
        );
        Self::notify(&snapshot, &listeners);
        Ok(snapshot)
    }

    fn notify(snapshot: &Arc<GameState>, listeners: &[(ListenerId, Listener)]) {
        for (id, listener) in listeners {
            trace!(listener = %id, "Notifying listener");
            if catch_unwind(AssertUnwindSafe(|| listener(snapshot))).is_err() {
                error!(listener = %id, "State listener panicked; continuing with the rest");
            }
        }
    }

    /// Registers `listener` for every subsequent snapshot.
    ///
    /// Listeners run on the writer's thread and must not write to the store
    /// or issue controller commands synchronously.
    #[instrument(skip(self, listener))]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Arc<GameState>) + Send + Sync + 'static,
    {
        let mut registry = self.lock();
        let id = ListenerId(registry.next_listener);
        registry.next_listener += 1;
        registry.listeners.push((id, Arc::new(listener)));
        debug!(listener = %id, total = registry.listeners.len(), "Listener subscribed");
        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Number of active listeners.
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }
}

/// Handle returned by [`GameStateStore::subscribe`].
///
/// Dropping the handle does not unsubscribe; call
/// [`Subscription::unsubscribe`].
#[derive(Debug)]
pub struct Subscription {
    id: ListenerId,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Returns the listener id.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Removes exactly this listener. Idempotent.
    ///
    /// Returns true if the listener was still registered.
    #[instrument(skip(self), fields(listener = %self.id))]
    pub fn unsubscribe(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let mut registry = registry.lock().unwrap_or_else(PoisonError::into_inner);
        let before = registry.listeners.len();
        registry.listeners.retain(|(id, _)| *id != self.id);
        let removed = registry.listeners.len() != before;
        debug!(removed, "Listener unsubscribed");
        removed
    }
}
