//! Route views. Each page reads the shared session from context and keeps
//! its own form state for the lifetime of the mount.

pub mod home;
pub mod login;
pub mod not_found;
pub mod register;

use std::rc::Rc;

use leptos::prelude::*;

use crate::form::state::FormState;

/// Per-mount form state plus the signal views subscribe to for changes.
pub(crate) struct FormHandle<T: 'static, R: 'static> {
    state: StoredValue<Rc<FormState<T, R>>, LocalStorage>,
    revision: RwSignal<u64>,
}

impl<T: 'static, R: 'static> Clone for FormHandle<T, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static, R: 'static> Copy for FormHandle<T, R> {}

impl<T, R> FormHandle<T, R>
where
    T: validator::Validate + Clone + 'static,
    R: 'static,
{
    pub(crate) fn new(form: FormState<T, R>) -> Self {
        Self { state: StoredValue::new_local(Rc::new(form)), revision: RwSignal::new(0) }
    }

    pub(crate) fn get(&self) -> Rc<FormState<T, R>> {
        self.state.get_value()
    }

    /// Run `f` against the state and notify views.
    pub(crate) fn change(&self, f: impl FnOnce(&FormState<T, R>)) {
        f(&self.get());
        self.touch();
    }

    /// Read through the state, subscribing the caller to changes.
    pub(crate) fn read<O>(&self, f: impl FnOnce(&FormState<T, R>) -> O) -> O {
        self.revision.track();
        f(&self.get())
    }

    pub(crate) fn touch(&self) {
        self.revision.update(|r| *r = r.wrapping_add(1));
    }
}

/// Inline message under a field or form, rendered only when present.
pub(crate) fn message_line(message: Option<String>, class: &'static str) -> impl IntoView {
    message.map(|m| view! { <p class=class>{m}</p> })
}
