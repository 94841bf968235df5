use super::*;

#[test]
fn resolve_known_paths() {
    assert_eq!(resolve("/").map(|r| r.name), Some(RouteName::Home));
    assert_eq!(resolve("/login").map(|r| r.name), Some(RouteName::Login));
    assert_eq!(resolve("/register").map(|r| r.name), Some(RouteName::Register));
}

#[test]
fn resolve_ignores_trailing_slash_and_query() {
    assert_eq!(resolve("/login/").map(|r| r.name), Some(RouteName::Login));
    assert_eq!(resolve("/register?from=home").map(|r| r.name), Some(RouteName::Register));
    assert_eq!(resolve("").map(|r| r.name), Some(RouteName::Home));
}

#[test]
fn resolve_unknown_path() {
    assert!(resolve("/courses").is_none());
    assert!(resolve("/loginx").is_none());
}

#[test]
fn only_home_requires_auth() {
    let protected: Vec<_> = ROUTES.iter().filter(|r| r.requires_auth).map(|r| r.name).collect();
    assert_eq!(protected, vec![RouteName::Home]);
}

#[test]
fn auth_routes_are_login_and_register() {
    assert!(!resolve("/").unwrap().is_auth_route());
    assert!(resolve("/login").unwrap().is_auth_route());
    assert!(resolve("/register").unwrap().is_auth_route());
}
