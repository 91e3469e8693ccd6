//! Shared fixtures for cache, mutation and guard tests.
//!
//! `ScriptedTransport` answers requests from per-path reply queues, or parks
//! them until the test answers explicitly, so tests control exactly when and
//! in which order responses arrive. `Harness` wires an `AuthCache` to it on a
//! single-threaded `LocalPool` with a manual clock.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;
use futures::executor::LocalPool;

use crate::net::error::TransportError;
use crate::net::gateway::SessionGateway;
use crate::net::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::net::types::Principal;
use crate::state::auth::AuthCache;
use crate::util::runtime::Clock;

type Reply = Result<HttpResponse, TransportError>;

/// A request the test has not answered yet.
pub struct PendingCall {
    pub request: HttpRequest,
    reply: oneshot::Sender<Reply>,
}

impl PendingCall {
    pub fn respond(self, status: u16, body: &str) {
        let _ = self.reply.send(Ok(HttpResponse::new(status, body)));
    }

    pub fn fail(self, error: TransportError) {
        let _ = self.reply.send(Err(error));
    }
}

#[derive(Default)]
struct Script {
    replies: HashMap<&'static str, VecDeque<Reply>>,
    pending: Vec<PendingCall>,
    requests: Vec<HttpRequest>,
}

#[derive(Default)]
pub struct ScriptedTransport {
    script: RefCell<Script>,
}

impl ScriptedTransport {
    /// Answer the next request to `path` immediately.
    pub fn reply(&self, path: &'static str, status: u16, body: &str) {
        self.script
            .borrow_mut()
            .replies
            .entry(path)
            .or_default()
            .push_back(Ok(HttpResponse::new(status, body)));
    }

    pub fn reply_err(&self, path: &'static str, error: TransportError) {
        self.script.borrow_mut().replies.entry(path).or_default().push_back(Err(error));
    }

    /// Remove the oldest parked request to `path`.
    pub fn take(&self, path: &str) -> Option<PendingCall> {
        let mut script = self.script.borrow_mut();
        let index = script.pending.iter().position(|call| call.request.path == path)?;
        Some(script.pending.remove(index))
    }

    /// Requests issued to `path` so far, answered or not.
    pub fn requests_to(&self, path: &str) -> usize {
        self.script.borrow().requests.iter().filter(|r| r.path == path).count()
    }

    pub fn last_request_to(&self, path: &str) -> Option<HttpRequest> {
        self.script.borrow().requests.iter().rev().find(|r| r.path == path).cloned()
    }
}

#[async_trait(?Send)]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let receiver = {
            let mut script = self.script.borrow_mut();
            script.requests.push(request.clone());
            if let Some(reply) = script.replies.get_mut(request.path).and_then(VecDeque::pop_front) {
                return reply;
            }
            let (reply, receiver) = oneshot::channel();
            script.pending.push(PendingCall { request, reply });
            receiver
        };
        receiver
            .await
            .unwrap_or_else(|_| Err(TransportError::Network("reply dropped".to_owned())))
    }
}

#[derive(Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

pub struct Harness {
    pub pool: LocalPool,
    pub transport: Rc<ScriptedTransport>,
    pub clock: Rc<ManualClock>,
    pub cache: AuthCache,
}

impl Harness {
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let transport = Rc::new(ScriptedTransport::default());
        let clock = Rc::new(ManualClock::default());
        let gateway = SessionGateway::new(transport.clone());
        let cache = AuthCache::new(gateway, Rc::new(pool.spawner()), clock.clone());
        Self { pool, transport, clock, cache }
    }

    /// Run spawned fetches until every one is finished or parked.
    pub fn settle(&mut self) {
        self.pool.run_until_stalled();
    }

    /// Drive `future` to completion; every request it makes must already
    /// have a queued reply.
    pub fn run<F: Future>(&mut self, future: F) -> F::Output {
        self.pool.run_until(future)
    }
}

pub fn principal(id: i64, username: &str) -> Principal {
    Principal {
        id,
        account_created_at: "2024-01-01T00:00:00Z".to_owned(),
        profile_picture_url: format!("https://cdn.example.com/{username}.png"),
        username: username.to_owned(),
        email: format!("{username}@example.com"),
        email_is_verified: true,
        password_reset_is_required: false,
        account_is_locked: false,
        account_is_banned: false,
    }
}

pub fn principal_json(principal: &Principal) -> String {
    serde_json::to_string(principal).unwrap_or_default()
}
