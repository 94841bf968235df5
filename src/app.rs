//! Root application component with routing, the navigation guard and
//! context providers.
//!
//! SYSTEM CONTEXT
//! ==============
//! One [`Session`] is built here and shared through context as a
//! [`SessionHandle`]. Pages read the rendered [`AuthState`] signal and call
//! back into the session for actions; the guard runs on every path change
//! before the matched route is shown.

use std::rc::Rc;

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::components::{Route, Router, Routes};
use leptos_router::hooks::{use_location, use_navigate};
use leptos_router::StaticSegment;

use crate::config::ClientConfig;
use crate::pages::{home::HomePage, login::LoginPage, not_found::NotFoundPage, register::RegisterPage};
#[cfg(feature = "csr")]
use crate::router::guard::{self, GuardDecision};
use crate::state::auth::AuthState;
use crate::state::session::Session;

/// The session shared with every page. Local storage: the session is
/// single-threaded and never leaves the UI thread.
pub type SessionHandle = StoredValue<Rc<Session>, LocalStorage>;

/// Root application component.
#[component]
pub fn App(config: ClientConfig) -> impl IntoView {
    provide_meta_context();

    log::info!("starting client against {}", config.api_base_domain);
    let session: SessionHandle = StoredValue::new_local(Rc::new(Session::browser(&config)));
    let auth = RwSignal::new(AuthState::default());

    provide_context(session);
    provide_context(auth);

    #[cfg(feature = "csr")]
    leptos::task::spawn_local(async move {
        let session = session.get_value();
        if let Err(e) = session.load_profile().await {
            log::debug!("initial profile load failed: {e}");
        }
        auth.set(session.snapshot());
    });

    view! {
        <Title text="Campus"/>

        <Router>
            <RouteGuard>
                <Routes fallback=|| view! { <NotFoundPage/> }>
                    <Route path=StaticSegment("") view=HomePage/>
                    <Route path=StaticSegment("login") view=LoginPage/>
                    <Route path=StaticSegment("register") view=RegisterPage/>
                </Routes>
            </RouteGuard>
        </Router>
    }
}

/// Evaluates the guard whenever the path changes and renders its children
/// only once the current path has been allowed.
#[component]
fn RouteGuard(children: ChildrenFn) -> impl IntoView {
    let session = expect_context::<SessionHandle>();
    let auth = expect_context::<RwSignal<AuthState>>();
    let location = use_location();
    let navigate = use_navigate();
    let allowed = RwSignal::new(None::<String>);

    Effect::new(move || {
        let path = location.pathname.get();

        #[cfg(feature = "csr")]
        {
            let session = session.get_value();
            let navigate = navigate.clone();
            leptos::task::spawn_local(async move {
                let decision = guard::evaluate(&session, &path).await;
                auth.set(session.snapshot());
                // A later navigation superseded this one.
                if location.pathname.get_untracked() != path {
                    return;
                }
                match decision {
                    GuardDecision::Allow => {
                        session.navigation_completed(&path);
                        allowed.set(Some(path));
                    }
                    GuardDecision::Redirect(to) => {
                        log::debug!("guard redirected {path} to {to}");
                        navigate(to, leptos_router::NavigateOptions { replace: true, ..Default::default() });
                    }
                }
            });
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = (session, auth, &navigate);
            allowed.set(Some(path));
        }
    });

    move || (allowed.get() == Some(location.pathname.get())).then(|| children())
}
