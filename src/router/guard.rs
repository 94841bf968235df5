//! Per-navigation access decision.
//!
//! DESIGN
//! ======
//! The decision is split in two. [`plan`] is a pure function of route
//! metadata, token presence and whether a profile is cached; it either
//! decides outright or asks for a profile fetch along with the outcome for
//! each result. [`evaluate`] runs that plan against a live [`Session`].
//!
//! The table is evaluated on every navigation; nothing is remembered between
//! calls, since token and profile can change in between.
//!
//! A failed fetch never produces a visible error. To the visitor a transient
//! failure looks the same as being signed out.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use super::routes::{self, HOME_PATH, LOGIN_PATH, RouteDescriptor};
use crate::state::session::Session;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(&'static str),
}

/// Outcome of [`plan`]: a decision, or a profile fetch with both branches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardStep {
    Decided(GuardDecision),
    /// On failure the stored token is cleared before `on_failure` applies.
    FetchProfile { on_success: GuardDecision, on_failure: GuardDecision },
}

pub fn plan(route: &RouteDescriptor, token_present: bool, profile_cached: bool) -> GuardStep {
    use GuardDecision::{Allow, Redirect};
    use GuardStep::{Decided, FetchProfile};

    if route.requires_auth {
        return match (token_present, profile_cached) {
            (false, _) => Decided(Redirect(LOGIN_PATH)),
            (true, true) => Decided(Allow),
            (true, false) => FetchProfile { on_success: Allow, on_failure: Redirect(LOGIN_PATH) },
        };
    }
    if !route.is_auth_route() {
        return Decided(Allow);
    }
    match (token_present, profile_cached) {
        (false, _) => Decided(Allow),
        (true, true) => Decided(Redirect(HOME_PATH)),
        (true, false) => FetchProfile { on_success: Redirect(HOME_PATH), on_failure: Allow },
    }
}

/// Decide whether navigation to `path` may proceed.
///
/// Unknown paths are allowed so the not-found view can render.
pub async fn evaluate(session: &Session, path: &str) -> GuardDecision {
    let Some(route) = routes::resolve(path) else {
        return GuardDecision::Allow;
    };

    match plan(route, session.has_token(), session.is_authenticated()) {
        GuardStep::Decided(decision) => {
            log::debug!("guard {path}: {decision:?}");
            decision
        }
        GuardStep::FetchProfile { on_success, on_failure } => match session.refetch_profile().await {
            Ok(_) => on_success,
            Err(err) => {
                log::debug!("guard {path}: profile fetch failed ({err}); clearing token");
                session.discard_token();
                on_failure
            }
        },
    }
}
