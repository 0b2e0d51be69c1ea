//! Transitions of the fetch state machines
//!
//! Each machine accepts a closed set of messages and handles them with an
//! exhaustive `match`, so adding a transition is a compile error until every
//! machine handles it.

use serde::{Deserialize, Serialize};

use crate::core::cancel::AttemptId;
use crate::core::error::TransportFailure;
use crate::domain::Page;

/// Messages of the paginated fetch state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PageMsg<T> {
    /// Fresh start at page 1; discards accumulated items
    Start,
    /// Fetch another page, keeping accumulated items
    ChangePage(u32),
    /// An attempt settled with a page
    Succeed { attempt: AttemptId, page: Page<T> },
    /// An attempt settled with a failure
    Fail {
        attempt: AttemptId,
        failure: TransportFailure,
    },
    /// The owning consumer is going away
    Teardown,
}

/// Messages of the single-entity fetch state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityMsg<T> {
    /// Fetch the entity with this id
    Start(i64),
    Succeed {
        attempt: AttemptId,
        item: T,
    },
    Fail {
        attempt: AttemptId,
        failure: TransportFailure,
    },
    Teardown,
}

/// Outcome of a port call, as delivered back by the executor.
#[derive(Debug, Clone, PartialEq)]
pub enum Settled<T> {
    Page {
        attempt: AttemptId,
        result: Result<Page<T>, TransportFailure>,
    },
    Entity {
        attempt: AttemptId,
        result: Result<T, TransportFailure>,
    },
}

impl<T> Settled<T> {
    pub fn attempt(&self) -> AttemptId {
        match self {
            Settled::Page { attempt, .. } | Settled::Entity { attempt, .. } => *attempt,
        }
    }
}

impl<T> PageMsg<T> {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            PageMsg::Start => "Start",
            PageMsg::ChangePage(_) => "ChangePage",
            PageMsg::Succeed { .. } => "Succeed",
            PageMsg::Fail { .. } => "Fail",
            PageMsg::Teardown => "Teardown",
        }
    }
}

impl<T> EntityMsg<T> {
    pub fn name(&self) -> &'static str {
        match self {
            EntityMsg::Start(_) => "Start",
            EntityMsg::Succeed { .. } => "Succeed",
            EntityMsg::Fail { .. } => "Fail",
            EntityMsg::Teardown => "Teardown",
        }
    }
}

impl<T> PageMsg<T> {
    /// Translate a page settlement; entity settlements do not belong here.
    pub fn from_settled(settled: Settled<T>) -> Option<Self> {
        match settled {
            Settled::Page {
                attempt,
                result: Ok(page),
            } => Some(PageMsg::Succeed { attempt, page }),
            Settled::Page {
                attempt,
                result: Err(failure),
            } => Some(PageMsg::Fail { attempt, failure }),
            Settled::Entity { .. } => None,
        }
    }
}

impl<T> EntityMsg<T> {
    /// Translate an entity settlement; page settlements do not belong here.
    pub fn from_settled(settled: Settled<T>) -> Option<Self> {
        match settled {
            Settled::Entity {
                attempt,
                result: Ok(item),
            } => Some(EntityMsg::Succeed { attempt, item }),
            Settled::Entity {
                attempt,
                result: Err(failure),
            } => Some(EntityMsg::Fail { attempt, failure }),
            Settled::Page { .. } => None,
        }
    }
}
