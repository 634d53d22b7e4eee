//! State store and action bus.
//!
//! `dispatch` applies the root reducer synchronously, publishes the new state
//! to `watch` subscribers, and only then broadcasts the action to effect
//! subscribers. Every broadcast carries the state tree as it stood right after
//! its own action was reduced, so effects never see later actions' changes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::action::{Action, ActionKind};
use crate::state::{reduce, StateTree};

/// Actions buffered per subscriber before it starts lagging.
pub const DEFAULT_BUS_CAPACITY: usize = 1024;

/// An action as delivered on the bus, with its per-kind sequence number.
#[derive(Debug, Clone)]
pub struct Dispatched {
    pub action: Action,
    pub seq: u64,
    /// The tree right after `action` was reduced
    pub state: Arc<StateTree>,
}

/// Latest sequence number handed out per action kind
type Ledger = HashMap<ActionKind, u64>;

pub struct Store {
    actions: broadcast::Sender<Dispatched>,
    ledger: Mutex<Ledger>,
    state: watch::Sender<Arc<StateTree>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUS_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (actions, _) = broadcast::channel(capacity);
        let (state, _) = watch::channel(Arc::new(StateTree::default()));
        Self {
            actions,
            ledger: Mutex::new(Ledger::new()),
            state,
        }
    }

    /// Reduce `action` into the state tree and broadcast it to effects.
    ///
    /// Returns the sequence number assigned to the action within its kind.
    pub fn dispatch(&self, action: Action) -> u64 {
        let mut ledger = self.ledger();
        self.apply(&mut ledger, action)
    }

    /// Dispatch `action` only if no action of `kind` was dispatched after `seq`.
    ///
    /// The check and the dispatch happen under one lock, so a superseding
    /// action can never slip in between them.
    pub fn dispatch_if_current(&self, kind: ActionKind, seq: u64, action: Action) -> bool {
        let mut ledger = self.ledger();
        if ledger.get(&kind).copied().unwrap_or(0) != seq {
            return false;
        }
        self.apply(&mut ledger, action);
        true
    }

    /// Whether `seq` is still the newest dispatched action of `kind`.
    pub fn is_current(&self, kind: ActionKind, seq: u64) -> bool {
        self.ledger().get(&kind).copied().unwrap_or(0) == seq
    }

    /// Clone of the whole state tree.
    pub fn state(&self) -> StateTree {
        StateTree::clone(&self.state.borrow())
    }

    /// Read the state tree without cloning it. `f` must not dispatch.
    pub fn with_state<R>(&self, f: impl FnOnce(&StateTree) -> R) -> R {
        f(&**self.state.borrow())
    }

    /// Current value of a slice of state plus a subscription to its changes.
    pub fn select<T: Clone + PartialEq>(&self, selector: fn(&StateTree) -> T) -> Selection<T> {
        let rx = self.state.subscribe();
        let last = selector(&**rx.borrow());
        Selection { last, rx, selector }
    }

    /// Subscribe to every action dispatched from now on.
    pub fn actions(&self) -> ActionStream {
        ActionStream {
            rx: self.actions.subscribe(),
        }
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply(&self, ledger: &mut Ledger, action: Action) -> u64 {
        let kind = action.kind();
        let seq = {
            let latest = ledger.entry(kind).or_insert(0);
            *latest += 1;
            *latest
        };

        let mut snapshot = None;
        let changed = self.state.send_if_modified(|state| {
            let next = reduce(&**state, &action);
            let changed = next != **state;
            if changed {
                *state = Arc::new(next);
            }
            snapshot = Some(Arc::clone(state));
            changed
        });
        let state = snapshot.unwrap_or_else(|| self.state.borrow().clone());

        let receivers = self
            .actions
            .send(Dispatched { action, seq, state })
            .unwrap_or(0);
        debug!(kind = %kind, seq, changed, receivers, "Action dispatched");
        seq
    }
}

/// A derived slice of state that can be awaited for changes.
pub struct Selection<T> {
    last: T,
    rx: watch::Receiver<Arc<StateTree>>,
    selector: fn(&StateTree) -> T,
}

impl<T: Clone + PartialEq> Selection<T> {
    pub fn current(&self) -> T {
        (self.selector)(&**self.rx.borrow())
    }

    /// Wait until the selected value differs from the last one observed.
    ///
    /// Returns `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<T> {
        loop {
            if self.rx.changed().await.is_err() {
                return None;
            }
            let next = (self.selector)(&**self.rx.borrow_and_update());
            if next != self.last {
                self.last = next.clone();
                return Some(next);
            }
        }
    }

    /// Wait until the selected value satisfies `predicate`, checking the current value first.
    pub async fn wait_for(&mut self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        loop {
            let value = (self.selector)(&**self.rx.borrow_and_update());
            if predicate(&value) {
                self.last = value.clone();
                return Some(value);
            }
            if self.rx.changed().await.is_err() {
                return None;
            }
        }
    }
}

/// A subscription to the action bus.
pub struct ActionStream {
    rx: broadcast::Receiver<Dispatched>,
}

impl ActionStream {
    /// Next dispatched action, or `None` once the store is gone. Cancel safe.
    pub async fn next(&mut self) -> Option<Dispatched> {
        loop {
            match self.rx.recv().await {
                Ok(dispatched) => return Some(dispatched),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Action subscriber lagged; actions were dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next action whose kind is one of `kinds`.
    pub async fn next_of(&mut self, kinds: &[ActionKind]) -> Option<Action> {
        while let Some(dispatched) = self.next().await {
            if kinds.contains(&dispatched.action.kind()) {
                return Some(dispatched.action);
            }
        }
        None
    }
}
