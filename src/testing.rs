//! Shared fakes for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;

use crate::config::ClientConfig;
use crate::net::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use crate::state::session::Session;
use crate::util::clock::ManualClock;
use crate::util::navigation::RecordingNavigator;
use crate::util::storage::MemoryTokenStore;

/// Transport answering from a queue of canned replies and recording every request.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: RefCell<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: RefCell<Vec<HttpRequest>>,
    yields: Cell<bool>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, status: u16, body: serde_json::Value) -> &Self {
        self.replies
            .borrow_mut()
            .push_back(Ok(HttpResponse { status, body: body.to_string() }));
        self
    }

    pub fn reply_empty(&self, status: u16) -> &Self {
        self.replies
            .borrow_mut()
            .push_back(Ok(HttpResponse { status, body: String::new() }));
        self
    }

    pub fn fail(&self, cause: &str) -> &Self {
        self.replies.borrow_mut().push_back(Err(TransportError(cause.to_owned())));
        self
    }

    /// Make every send suspend once before answering, so concurrent callers interleave.
    pub fn yield_before_reply(&self) -> &Self {
        self.yields.set(true);
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests.borrow().iter().map(|r| r.path.clone()).collect()
    }
}

#[async_trait(?Send)]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(request.clone());
        if self.yields.get() {
            yield_now().await;
        }
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError(format!("no scripted reply for {}", request.path))))
    }
}

/// Suspend once, waking immediately, so sibling futures get polled.
pub async fn yield_now() {
    YieldOnce(false).await;
}

struct YieldOnce(bool);

impl std::future::Future for YieldOnce {
    type Output = ();

    fn poll(mut self: std::pin::Pin<&mut Self>, cx: &mut std::task::Context<'_>) -> std::task::Poll<()> {
        if self.0 {
            std::task::Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            std::task::Poll::Pending
        }
    }
}

/// A session wired to in-memory fakes.
pub struct Harness {
    pub tokens: Rc<MemoryTokenStore>,
    pub transport: Rc<ScriptedTransport>,
    pub navigator: Rc<RecordingNavigator>,
    pub clock: Rc<ManualClock>,
    pub session: Session,
}

impl Harness {
    pub fn new(token: Option<&str>, path: &str) -> Self {
        let tokens = Rc::new(token.map_or_else(MemoryTokenStore::new, MemoryTokenStore::with_token));
        let transport = Rc::new(ScriptedTransport::new());
        let navigator = Rc::new(RecordingNavigator::at(path));
        let clock = Rc::new(ManualClock::new(1_000));
        let session = Session::new(
            &ClientConfig::default(),
            tokens.clone(),
            transport.clone(),
            navigator.clone(),
            clock.clone(),
        );
        Self { tokens, transport, navigator, clock, session }
    }
}

pub fn user_json() -> serde_json::Value {
    serde_json::json!({"id": 1, "email": "a@b.com", "role": "student"})
}

pub fn auth_json() -> serde_json::Value {
    serde_json::json!({"access_token": "tok123", "user": user_json()})
}
