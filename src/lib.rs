//! # campus-client
//!
//! Leptos + WASM frontend for the student/teacher platform: login, registration,
//! logout and profile display.
//!
//! The crate is split so the session lifecycle stays testable off the browser:
//! `net` wraps HTTP with bearer-token and 401 handling, `state` holds the query
//! cache and the session coordinator, `router` decides every navigation, and
//! `form` composes schema validation with submit state. `pages` and `app` are
//! the thin Leptos layer on top.

pub mod app;
pub mod config;
pub mod form;
pub mod net;
pub mod pages;
pub mod router;
pub mod state;
pub mod util;

#[cfg(test)]
mod testing;

/// Browser entrypoint: install logging and mount the application.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    let config = config::ClientConfig::from_build_env().unwrap_or_else(|err| {
        leptos::logging::warn!("invalid build configuration, using defaults: {err}");
        config::ClientConfig::default()
    });
    let _ = console_log::init_with_level(config.log_level);

    leptos::mount::mount_to_body(move || {
        use leptos::prelude::*;

        use crate::app::App;

        view! { <App config=config/> }
    });
}
