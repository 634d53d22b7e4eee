//! The effect pipeline.
//!
//! Every effect is a static [`EffectDef`]: the action kinds it listens to,
//! whether it may emit a follow-up action, its concurrency policy, and a plain
//! handler function. [`start`] gives each definition its own bus subscription
//! and runner task. Handlers receive the state tree as it stood right after
//! their triggering action was reduced.

mod auth;
mod collection;

use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::action::{Action, ActionKind};
use crate::expiration::ExpirationScheduler;
use crate::navigation::{Navigator, Routes};
use crate::state::StateTree;
use crate::remote::{AuthEndpoint, CollectionEndpoint};
use crate::storage::SessionStore;
use crate::store::{ActionStream, Store};

pub use auth::{AUTO_LOGIN, LOGIN, SESSION_LIFECYCLE, SIGNUP};
pub use collection::{FETCH_COLLECTION, STORE_COLLECTION};

/// Every effect, in registration order.
pub const EFFECTS: &[EffectDef] = &[
    LOGIN,
    SIGNUP,
    SESSION_LIFECYCLE,
    AUTO_LOGIN,
    FETCH_COLLECTION,
    STORE_COLLECTION,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Every invocation runs to completion independently.
    Concurrent,
    /// Invocations run one at a time, in bus order, inside the runner itself.
    Sequential,
    /// A new matching action aborts the pending invocation and discards its result.
    Switch,
}

pub type HandlerFuture = BoxFuture<'static, Option<Action>>;

/// Receives the triggering action and the state tree produced by reducing it.
pub type Handler = fn(Arc<EffectEnv>, Action, Arc<StateTree>) -> HandlerFuture;

pub struct EffectDef {
    /// Emits the handler's result; side-effect-only effects set this to false
    pub dispatch: bool,
    pub handler: Handler,
    pub kinds: &'static [ActionKind],
    pub name: &'static str,
    pub policy: Policy,
}

/// Collaborators shared by all handlers
pub struct EffectEnv {
    pub auth: Arc<dyn AuthEndpoint>,
    pub collection: Arc<dyn CollectionEndpoint>,
    pub navigator: Arc<dyn Navigator>,
    pub routes: Routes,
    pub scheduler: ExpirationScheduler,
    pub sessions: Arc<dyn SessionStore>,
    pub store: Arc<Store>,
}

/// Start one runner per registered effect.
///
/// Subscriptions are taken before this returns, so every action dispatched
/// afterwards reaches every effect.
pub fn start(env: Arc<EffectEnv>, shutdown: CancellationToken) -> Vec<JoinHandle<()>> {
    EFFECTS
        .iter()
        .map(|def| {
            let actions = env.store.actions();
            tokio::spawn(run_effect(
                def,
                Arc::clone(&env),
                actions,
                shutdown.clone(),
            ))
        })
        .collect()
}

async fn run_effect(
    def: &'static EffectDef,
    env: Arc<EffectEnv>,
    mut actions: ActionStream,
    shutdown: CancellationToken,
) {
    debug!(effect = def.name, kinds = ?def.kinds, policy = ?def.policy, "Effect started");
    let mut in_flight: Option<JoinHandle<()>> = None;

    loop {
        let dispatched = tokio::select! {
            _ = shutdown.cancelled() => break,
            next = actions.next() => match next {
                Some(dispatched) => dispatched,
                None => break,
            },
        };

        let kind = dispatched.action.kind();
        if !def.kinds.contains(&kind) {
            continue;
        }

        let invocation = (def.handler)(
            Arc::clone(&env),
            dispatched.action,
            dispatched.state,
        );
        let task_env = Arc::clone(&env);

        match def.policy {
            Policy::Switch => {
                if let Some(previous) = in_flight.take() {
                    if !previous.is_finished() {
                        debug!(effect = def.name, "Superseding in-flight invocation");
                    }
                    previous.abort();
                }
                let seq = dispatched.seq;
                in_flight = Some(tokio::spawn(async move {
                    let outcome = invocation.await;
                    emit(def, &task_env, outcome, Some((kind, seq)));
                }));
            }
            Policy::Sequential => {
                let outcome = invocation.await;
                emit(def, &task_env, outcome, None);
            }
            Policy::Concurrent => {
                tokio::spawn(async move {
                    let outcome = invocation.await;
                    emit(def, &task_env, outcome, None);
                });
            }
        }
    }

    if let Some(pending) = in_flight {
        pending.abort();
    }
    debug!(effect = def.name, "Effect stopped");
}

fn emit(
    def: &EffectDef,
    env: &EffectEnv,
    outcome: Option<Action>,
    supersession: Option<(ActionKind, u64)>,
) {
    let Some(action) = outcome else {
        return;
    };

    if !def.dispatch {
        warn!(effect = def.name, kind = %action.kind(), "Side-effect-only handler produced an action; dropped");
        return;
    }

    match supersession {
        Some((kind, seq)) => {
            if !env.store.dispatch_if_current(kind, seq, action) {
                debug!(effect = def.name, trigger = %kind, seq, "Discarded result of superseded invocation");
            }
        }
        None => {
            env.store.dispatch(action);
        }
    }
}
