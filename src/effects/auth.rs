use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::{EffectDef, EffectEnv, HandlerFuture, Policy};
use crate::action::{Action, ActionKind};
use crate::failure::AuthFailure;
use crate::remote::{AuthGrant, RemoteError};
use crate::session::Session;
use crate::state::StateTree;
use crate::storage::StoredSnapshot;

pub const LOGIN: EffectDef = EffectDef {
    dispatch: true,
    handler: login,
    kinds: &[ActionKind::LoginStart],
    name: "auth_login",
    policy: Policy::Switch,
};

pub const SIGNUP: EffectDef = EffectDef {
    dispatch: true,
    handler: signup,
    kinds: &[ActionKind::SignupStart],
    name: "auth_signup",
    policy: Policy::Switch,
};

/// Timer, snapshot and navigation for every session transition.
///
/// Success arms the timer, saves the snapshot, then redirects. Logout and
/// expiry cancel the timer, clear the snapshot, then go to the login route.
/// One sequential runner keeps these in bus order, so a logout can never be
/// overtaken by the save of the session it ends.
pub const SESSION_LIFECYCLE: EffectDef = EffectDef {
    dispatch: false,
    handler: session_lifecycle,
    kinds: &[
        ActionKind::AuthenticateSuccess,
        ActionKind::Logout,
        ActionKind::SessionExpired,
    ],
    name: "auth_session_lifecycle",
    policy: Policy::Sequential,
};

pub const AUTO_LOGIN: EffectDef = EffectDef {
    dispatch: true,
    handler: auto_login,
    kinds: &[ActionKind::AutoLogin],
    name: "auth_auto_login",
    policy: Policy::Concurrent,
};

fn login(env: Arc<EffectEnv>, action: Action, _state: Arc<StateTree>) -> HandlerFuture {
    Box::pin(async move {
        let Action::LoginStart(credentials) = action else {
            return None;
        };
        let result = env.auth.login(&credentials).await;
        Some(authentication_result("login", result))
    })
}

fn signup(env: Arc<EffectEnv>, action: Action, _state: Arc<StateTree>) -> HandlerFuture {
    Box::pin(async move {
        let Action::SignupStart(credentials) = action else {
            return None;
        };
        let result = env.auth.signup(&credentials).await;
        Some(authentication_result("signup", result))
    })
}

/// Map a remote auth outcome to the terminating action.
fn authentication_result(operation: &str, result: Result<AuthGrant, RemoteError>) -> Action {
    match result {
        Ok(grant) => {
            let session = Session::from_grant(grant, Utc::now());
            info!(operation, user_id = %session.user_id, expires_at = %session.expires_at, "Authenticated");
            Action::AuthenticateSuccess {
                session,
                redirect: true,
            }
        }
        Err(e) => {
            let failure = AuthFailure::classify(&e);
            warn!(operation, error = %e, failure = ?failure, "Authentication failed");
            Action::AuthenticateFail(failure.message().to_string())
        }
    }
}

fn session_lifecycle(env: Arc<EffectEnv>, action: Action, _state: Arc<StateTree>) -> HandlerFuture {
    Box::pin(async move {
        match action {
            Action::AuthenticateSuccess { session, redirect } => {
                authenticated(&env, &session, redirect);
            }
            Action::Logout | Action::SessionExpired => signed_out(&env),
            _ => {}
        }
        None
    })
}

fn authenticated(env: &EffectEnv, session: &Session, redirect: bool) {
    env.scheduler.arm(session, Arc::clone(&env.store));

    if let Err(e) = env
        .sessions
        .save(&StoredSnapshot::capture(session, Utc::now()))
    {
        error!(error = %e, "Failed to persist session snapshot");
    }

    if redirect {
        env.navigator.go_to(&env.routes.home);
    }
}

fn signed_out(env: &EffectEnv) {
    env.scheduler.cancel();

    match env.sessions.clear() {
        Ok(true) => debug!("Removed stored session"),
        Ok(false) => {}
        Err(e) => error!(error = %e, "Failed to remove stored session"),
    }

    env.navigator.go_to(&env.routes.login);
}

fn auto_login(env: Arc<EffectEnv>, _action: Action, _state: Arc<StateTree>) -> HandlerFuture {
    Box::pin(async move {
        let snapshot = match env.sessions.load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                debug!("No stored session to restore");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Stored session is unreadable; ignoring it");
                return None;
            }
        };

        let session = snapshot.into_session();
        if !session.is_valid_at(Utc::now()) {
            debug!(expires_at = %session.expires_at, "Stored session has expired");
            return None;
        }

        info!(user_id = %session.user_id, expires_at = %session.expires_at, "Restored stored session");
        Some(Action::AuthenticateSuccess {
            session,
            redirect: false,
        })
    })
}
