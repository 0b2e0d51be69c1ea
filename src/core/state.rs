//! Fetch state machines
//!
//! - [`PageState`]: fetch-accumulate-by-page (posts feed, comments of a post)
//! - [`EntityState`]: fetch-one-by-key (post by id, user by id)

pub mod entity;
pub mod page;
pub mod pagination;

pub use entity::{EntitySnapshot, EntityState};
pub use page::{PageSnapshot, PageState};
pub use pagination::PaginationState;

use crate::core::{
    cmd::Cmd,
    msg::{EntityMsg, PageMsg, Settled},
};

/// What a [`Runtime`](crate::core::runtime::Runtime) needs from a state machine.
pub trait FetchMachine {
    /// Item type delivered by the port
    type Item;
    type Msg;

    fn update(&mut self, msg: Self::Msg) -> Vec<Cmd>;

    /// Message for a settlement, or `None` if it is not addressed to this kind of machine
    fn settled_msg(settled: Settled<Self::Item>) -> Option<Self::Msg>;

    fn teardown_msg() -> Self::Msg;

    fn has_live_attempt(&self) -> bool;
}

impl<T> FetchMachine for PageState<T> {
    type Item = T;
    type Msg = PageMsg<T>;

    fn update(&mut self, msg: PageMsg<T>) -> Vec<Cmd> {
        PageState::update(self, msg)
    }

    fn settled_msg(settled: Settled<T>) -> Option<PageMsg<T>> {
        PageMsg::from_settled(settled)
    }

    fn teardown_msg() -> PageMsg<T> {
        PageMsg::Teardown
    }

    fn has_live_attempt(&self) -> bool {
        PageState::has_live_attempt(self)
    }
}

impl<T> FetchMachine for EntityState<T> {
    type Item = T;
    type Msg = EntityMsg<T>;

    fn update(&mut self, msg: EntityMsg<T>) -> Vec<Cmd> {
        EntityState::update(self, msg)
    }

    fn settled_msg(settled: Settled<T>) -> Option<EntityMsg<T>> {
        EntityMsg::from_settled(settled)
    }

    fn teardown_msg() -> EntityMsg<T> {
        EntityMsg::Teardown
    }

    fn has_live_attempt(&self) -> bool {
        EntityState::has_live_attempt(self)
    }
}
