//! In-memory ports whose calls stay pending until the test resolves them

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use futures::FutureExt;
use tokio::sync::oneshot;

use postboard::core::{cancel::FetchToken, error::TransportFailure};
use postboard::domain::{Comment, EntityRequest, Page, PageRequest, Post, User};
use postboard::infrastructure::port::{EntityPort, FetchFuture, PagePort};

type Reply<O> = oneshot::Sender<Result<O, TransportFailure>>;

/// One port call waiting for its outcome
pub struct Pending<R, O> {
    pub request: R,
    pub token: FetchToken,
    reply: Reply<O>,
}

impl<R, O> Pending<R, O> {
    pub fn resolve(self, result: Result<O, TransportFailure>) {
        // The executor may already have given up on a cancelled call
        let _ = self.reply.send(result);
    }

    pub fn fail(self, failure: TransportFailure) {
        self.resolve(Err(failure));
    }
}

impl<R, T> Pending<R, Page<T>> {
    pub fn succeed(self, items: Vec<T>, total_count: u64) {
        self.resolve(Ok(Page::new(items, total_count)));
    }
}

pub struct Gated<R, O> {
    calls: Mutex<Vec<Pending<R, O>>>,
}

impl<R, O> Gated<R, O> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Remove the oldest pending call matching `pred`
    pub fn take_where(&self, pred: impl Fn(&R) -> bool) -> Pending<R, O> {
        let mut calls = self.calls.lock().unwrap();
        let index = calls
            .iter()
            .position(|call| pred(&call.request))
            .expect("no matching pending call");
        calls.remove(index)
    }

    pub fn pending(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn push(&self, request: R, token: FetchToken) -> oneshot::Receiver<Result<O, TransportFailure>> {
        let (reply, receiver) = oneshot::channel();
        self.calls.lock().unwrap().push(Pending {
            request,
            token,
            reply,
        });
        receiver
    }
}

pub type GatedPages<T> = Gated<PageRequest, Page<T>>;
pub type GatedEntities<T> = Gated<EntityRequest, T>;

impl<T> GatedPages<T> {
    pub fn take(&self, page: u32) -> Pending<PageRequest, Page<T>> {
        self.take_where(|request| request.page == page)
    }
}

impl<T> GatedEntities<T> {
    pub fn take(&self, id: i64) -> Pending<EntityRequest, T> {
        self.take_where(|request| request.id == id)
    }
}

async fn wait<O>(receiver: oneshot::Receiver<Result<O, TransportFailure>>) -> Result<O, TransportFailure> {
    receiver
        .await
        .unwrap_or_else(|_| Err(TransportFailure::network()))
}

impl<T: Send + 'static> PagePort<T> for GatedPages<T> {
    fn fetch_page(&self, request: PageRequest, token: FetchToken) -> FetchFuture<Page<T>> {
        wait(self.push(request, token)).boxed()
    }
}

impl<T: Send + 'static> EntityPort<T> for GatedEntities<T> {
    fn fetch_entity(&self, request: EntityRequest, token: FetchToken) -> FetchFuture<T> {
        wait(self.push(request, token)).boxed()
    }
}

pub fn posts(ids: std::ops::RangeInclusive<i64>) -> Vec<Post> {
    ids.map(|id| Post {
        id,
        user_id: id % 3 + 1,
        title: format!("title {id}"),
        body: format!("body {id}"),
    })
    .collect()
}

pub fn comments(post_id: i64, ids: std::ops::RangeInclusive<i64>) -> Vec<Comment> {
    ids.map(|id| Comment {
        id,
        post_id,
        name: format!("commenter {id}"),
        email: format!("c{id}@example.com"),
        body: format!("comment {id}"),
    })
    .collect()
}

pub fn user(id: i64, name: &str) -> User {
    User {
        id,
        name: name.to_string(),
        email: None,
        gender: None,
        status: Some("active".to_string()),
    }
}
