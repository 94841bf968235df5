//! Static route table.
//!
//! Three routes, fixed at start-up. `requires_auth` is the only metadata the
//! guard reads; login and register are the "auth routes" a signed-in user is
//! bounced away from.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RouteName {
    Home,
    Login,
    Register,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub path: &'static str,
    pub name: RouteName,
    pub requires_auth: bool,
}

impl RouteDescriptor {
    /// Login and register: pages only a signed-out visitor should see.
    pub fn is_auth_route(&self) -> bool {
        matches!(self.name, RouteName::Login | RouteName::Register)
    }
}

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";

pub const ROUTES: [RouteDescriptor; 3] = [
    RouteDescriptor { path: HOME_PATH, name: RouteName::Home, requires_auth: true },
    RouteDescriptor { path: LOGIN_PATH, name: RouteName::Login, requires_auth: false },
    RouteDescriptor { path: REGISTER_PATH, name: RouteName::Register, requires_auth: false },
];

/// Route for `path`, ignoring a query string, fragment and trailing slash.
pub fn resolve(path: &str) -> Option<&'static RouteDescriptor> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    let normalized = if trimmed.is_empty() { HOME_PATH } else { trimmed };
    ROUTES.iter().find(|route| route.path == normalized)
}
