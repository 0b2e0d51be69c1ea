//! Resource fetch ports
//!
//! The narrow interface the state machines fetch through. Implementations own
//! transport, serialization and authentication; the core only needs these two
//! call shapes and the ability to cancel.

use futures::future::BoxFuture;

use crate::core::{cancel::FetchToken, error::TransportFailure};
use crate::domain::{EntityRequest, Page, PageRequest};

pub type FetchFuture<O> = BoxFuture<'static, Result<O, TransportFailure>>;

/// Fetches one page of a collection.
///
/// Implementations should stop work once `token` is cancelled; the executor
/// ignores their result after that point either way.
pub trait PagePort<T>: Send + Sync {
    fn fetch_page(&self, request: PageRequest, token: FetchToken) -> FetchFuture<Page<T>>;
}

/// Fetches one entity by id.
pub trait EntityPort<T>: Send + Sync {
    fn fetch_entity(&self, request: EntityRequest, token: FetchToken) -> FetchFuture<T>;
}

/// A [`PagePort`] backed by a plain function.
pub struct FnPagePort<F>(pub F);

impl<T, F> PagePort<T> for FnPagePort<F>
where
    F: Fn(PageRequest, FetchToken) -> FetchFuture<Page<T>> + Send + Sync,
{
    fn fetch_page(&self, request: PageRequest, token: FetchToken) -> FetchFuture<Page<T>> {
        (self.0)(request, token)
    }
}

/// An [`EntityPort`] backed by a plain function.
pub struct FnEntityPort<F>(pub F);

impl<T, F> EntityPort<T> for FnEntityPort<F>
where
    F: Fn(EntityRequest, FetchToken) -> FetchFuture<T> + Send + Sync,
{
    fn fetch_entity(&self, request: EntityRequest, token: FetchToken) -> FetchFuture<T> {
        (self.0)(request, token)
    }
}
