use futures::executor::block_on;

use super::*;
use crate::net::interceptors::{RedirectLatch, SessionExpiryInterceptor};
use crate::net::transport::Method;
use crate::net::types::Role;
use crate::testing::{ScriptedTransport, auth_json, user_json};
use crate::util::navigation::RecordingNavigator;
use crate::util::storage::MemoryTokenStore;

fn api_with(transport: Rc<ScriptedTransport>, navigator: Rc<RecordingNavigator>) -> AuthApi {
    let tokens = Rc::new(MemoryTokenStore::new());
    let expiry = SessionExpiryInterceptor::new(tokens.clone(), navigator, Rc::new(RedirectLatch::default()));
    AuthApi::new(Rc::new(HttpClient::new("http://localhost:3000", transport, tokens, expiry)))
}

#[test]
fn auth_endpoint_formats_expected_path() {
    assert_eq!(auth_endpoint("login"), "/auth/login");
    assert_eq!(auth_endpoint("profile"), "/auth/profile");
}

#[test]
fn login_posts_credentials() {
    let transport = Rc::new(ScriptedTransport::new());
    transport.reply(200, auth_json());
    let api = api_with(transport.clone(), Rc::new(RecordingNavigator::at("/login")));

    let data = LoginData { email: "a@b.com".to_owned(), password: "secret1".to_owned() };
    let resp = block_on(api.login(&data)).unwrap();
    assert_eq!(resp.access_token, "tok123");

    let sent = &transport.requests()[0];
    assert_eq!(sent.method, Method::Post);
    assert_eq!(sent.path, "/auth/login");
    assert_eq!(sent.body, Some(serde_json::json!({"email": "a@b.com", "password": "secret1"})));
}

#[test]
fn register_posts_role() {
    let transport = Rc::new(ScriptedTransport::new());
    transport.reply(201, auth_json());
    let api = api_with(transport.clone(), Rc::new(RecordingNavigator::at("/register")));

    let data = RegisterData { email: "a@b.com".to_owned(), password: "secret1".to_owned(), role: Role::Teacher };
    block_on(api.register(&data)).unwrap();
    assert_eq!(transport.requests()[0].path, "/auth/register");
    assert_eq!(transport.requests()[0].body.as_ref().unwrap()["role"], "teacher");
}

#[test]
fn rejected_login_is_not_turned_into_redirect() {
    let transport = Rc::new(ScriptedTransport::new());
    transport.reply(401, serde_json::json!({"message": "Invalid credentials"}));
    let navigator = Rc::new(RecordingNavigator::at("/"));
    let api = api_with(transport, navigator.clone());

    let data = LoginData { email: "a@b.com".to_owned(), password: "wrong00".to_owned() };
    let err = block_on(api.login(&data)).unwrap_err();
    assert_eq!(err.user_message(), "Invalid credentials");
    assert!(navigator.redirects().is_empty());
}

#[test]
fn profile_gets_user() {
    let transport = Rc::new(ScriptedTransport::new());
    transport.reply(200, user_json());
    let api = api_with(transport.clone(), Rc::new(RecordingNavigator::at("/")));

    let user = block_on(api.profile()).unwrap();
    assert_eq!(user.role, Role::Student);
    assert_eq!(transport.paths(), vec!["/auth/profile".to_owned()]);
}
