//! Signed-in landing page: profile summary and logout.
//!
//! Only reachable through the guard, so a cached profile normally exists by
//! the time this renders. A missing one shows the loading or error line.

#[cfg(test)]
#[path = "home_test.rs"]
mod home_test;

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use super::message_line;
use crate::app::SessionHandle;
use crate::net::types::User;
use crate::router::routes::LOGIN_PATH;
use crate::state::auth::AuthState;

/// Text shown while no profile is available.
fn status_line(state: &AuthState) -> Option<&'static str> {
    match (&state.user, state.loading) {
        (Some(_), _) => None,
        (None, true) => Some("Loading profile..."),
        (None, false) => Some("Not signed in."),
    }
}

fn profile_rows(user: &User) -> [(&'static str, String); 2] {
    [("Email", user.email.clone()), ("Role", user.role.label().to_owned())]
}

#[component]
pub fn HomePage() -> impl IntoView {
    let session = expect_context::<SessionHandle>();
    let auth = expect_context::<RwSignal<AuthState>>();
    let navigate = use_navigate();

    let on_logout = move |_| {
        let session = session.get_value();
        session.logout();
        auth.set(session.snapshot());
        navigate(LOGIN_PATH, leptos_router::NavigateOptions::default());
    };

    view! {
        <div class="home-page">
            <header class="home-header">
                <h1>"Your profile"</h1>
                <button class="auth-button auth-button--secondary" on:click=on_logout>
                    "Log out"
                </button>
            </header>
            {move || message_line(auth.get().error, "auth-message auth-message--error")}
            {move || status_line(&auth.get()).map(|text| view! { <p class="home-status">{text}</p> })}
            {move || {
                auth.get()
                    .user
                    .map(|user| {
                        view! {
                            <dl class="home-profile">
                                {profile_rows(&user)
                                    .into_iter()
                                    .map(|(label, value)| view! { <dt>{label}</dt><dd>{value}</dd> })
                                    .collect_view()}
                            </dl>
                        }
                    })
            }}
        </div>
    }
}
