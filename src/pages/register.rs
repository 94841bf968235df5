//! Account creation with a role picked from a select.

use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;

use super::{FormHandle, message_line};
use crate::app::SessionHandle;
use crate::form::schemas::{EMAIL, PASSWORD, ROLE, RegisterForm};
use crate::form::state::FormState;
use crate::net::types::{AuthResponse, Role};
use crate::router::routes::{HOME_PATH, LOGIN_PATH};
use crate::state::auth::AuthState;

#[component]
pub fn RegisterPage() -> impl IntoView {
    let session = expect_context::<SessionHandle>();
    let auth = expect_context::<RwSignal<AuthState>>();
    let navigate = use_navigate();
    let form = FormHandle::new(FormState::<RegisterForm, AuthResponse>::new(RegisterForm::default()));

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if form.get().is_loading() {
            return;
        }

        #[cfg(feature = "csr")]
        {
            let navigate = navigate.clone();
            leptos::task::spawn_local(async move {
                let session = session.get_value();
                let state = form.get();
                let result = state
                    .handle_submit(|data| {
                        form.touch();
                        let session = session.clone();
                        async move {
                            let payload = data
                                .to_payload()
                                .ok_or_else(|| crate::net::error::ApiError::unknown("Invalid role"))?;
                            session.register(&payload).await
                        }
                    })
                    .await;
                form.touch();
                auth.set(session.snapshot());
                if let Ok(Some(_)) = result {
                    navigate(HOME_PATH, leptos_router::NavigateOptions::default());
                }
            });
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = (session, auth, &navigate);
        }
        form.touch();
    };

    view! {
        <div class="auth-page">
            <div class="auth-card">
                <h1>"Create account"</h1>
                <form class="auth-form" on:submit=on_submit novalidate=true>
                    <label class="auth-label" for="register-email">"Email"</label>
                    <input
                        id="register-email"
                        class="auth-input"
                        type="email"
                        placeholder="you@example.com"
                        prop:value=move || form.read(|f| f.data().email)
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            form.change(|f| f.update(EMAIL, |d| d.email = value));
                        }
                        on:blur=move |_| form.change(|f| f.handle_blur(EMAIL))
                    />
                    {move || message_line(form.read(|f| f.visible_error(EMAIL)), "auth-field-error")}

                    <label class="auth-label" for="register-password">"Password"</label>
                    <input
                        id="register-password"
                        class="auth-input"
                        type="password"
                        prop:value=move || form.read(|f| f.data().password)
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            form.change(|f| f.update(PASSWORD, |d| d.password = value));
                        }
                        on:blur=move |_| form.change(|f| f.handle_blur(PASSWORD))
                    />
                    {move || message_line(form.read(|f| f.visible_error(PASSWORD)), "auth-field-error")}

                    <label class="auth-label" for="register-role">"Role"</label>
                    <select
                        id="register-role"
                        class="auth-input"
                        prop:value=move || form.read(|f| f.data().role)
                        on:change=move |ev| {
                            let value = event_target_value(&ev);
                            form.change(|f| f.update(ROLE, |d| d.role = value));
                        }
                        on:blur=move |_| form.change(|f| f.handle_blur(ROLE))
                    >
                        <option value="">"Select a role"</option>
                        {Role::ALL
                            .into_iter()
                            .map(|role| view! { <option value=role.as_str()>{role.label()}</option> })
                            .collect_view()}
                    </select>
                    {move || message_line(form.read(|f| f.visible_error(ROLE)), "auth-field-error")}

                    {move || message_line(form.read(|f| f.server_error()), "auth-message auth-message--error")}

                    <button class="auth-button" type="submit" disabled=move || form.read(|f| f.is_loading())>
                        {move || if form.read(|f| f.is_loading()) { "Creating account..." } else { "Create account" }}
                    </button>
                </form>
                <p class="auth-switch">
                    "Already registered? "
                    <A href=LOGIN_PATH>"Sign in"</A>
                </p>
            </div>
        </div>
    }
}
