//! Full-page navigation used by the HTTP layer when a session expires.

#[cfg(test)]
#[path = "navigation_test.rs"]
mod navigation_test;

use std::cell::RefCell;

/// Access to the document location.
pub trait Navigator {
    /// Path component of the current location (e.g. `/login`).
    fn current_path(&self) -> String;
    /// Replace the whole page with `path`.
    fn redirect(&self, path: &str);
}

/// Navigator driving `window.location`.
#[derive(Clone, Copy, Debug, Default)]
pub struct WindowNavigator;

impl Navigator for WindowNavigator {
    fn current_path(&self) -> String {
        #[cfg(feature = "csr")]
        {
            web_sys::window()
                .and_then(|w| w.location().pathname().ok())
                .unwrap_or_else(|| "/".to_owned())
        }
        #[cfg(not(feature = "csr"))]
        {
            "/".to_owned()
        }
    }

    fn redirect(&self, path: &str) {
        #[cfg(feature = "csr")]
        {
            if let Some(window) = web_sys::window() {
                let _ = window.location().set_href(path);
            }
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = path;
        }
    }
}

/// Navigator that records redirects instead of performing them.
///
/// A redirect also moves `current_path`, like a real page load would.
#[derive(Debug)]
pub struct RecordingNavigator {
    path: RefCell<String>,
    redirects: RefCell<Vec<String>>,
}

impl RecordingNavigator {
    pub fn at(path: &str) -> Self {
        Self { path: RefCell::new(path.to_owned()), redirects: RefCell::new(Vec::new()) }
    }

    /// Client-side route change: moves the path without recording a redirect.
    pub fn visit(&self, path: &str) {
        *self.path.borrow_mut() = path.to_owned();
    }

    pub fn redirects(&self) -> Vec<String> {
        self.redirects.borrow().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        self.path.borrow().clone()
    }

    fn redirect(&self, path: &str) {
        self.redirects.borrow_mut().push(path.to_owned());
        *self.path.borrow_mut() = path.to_owned();
    }
}
