//! Fallback view for paths outside the route table.

use leptos::prelude::*;
use leptos_router::components::A;

use crate::router::routes::HOME_PATH;

#[component]
pub fn NotFoundPage() -> impl IntoView {
    view! {
        <div class="auth-page">
            <div class="auth-card">
                <h1>"Page not found"</h1>
                <A href=HOME_PATH>"Back to home"</A>
            </div>
        </div>
    }
}
