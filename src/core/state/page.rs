use std::num::NonZeroU32;

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::core::{
    cancel::{AttemptId, AttemptSlot},
    cmd::Cmd,
    error::{classify, ClassifiedError, TransportFailure},
    msg::PageMsg,
    state::pagination::PaginationState,
};
use crate::domain::{Page, PageRequest, ResourceKind};

/// Paginated fetch state machine.
///
/// Accumulates pages in arrival order. Only the attempt started by the most
/// recent `Start`/`ChangePage` may write state; earlier attempts are cancelled
/// and their settlements ignored.
#[derive(Debug)]
pub struct PageState<T> {
    resource: ResourceKind,
    parent: Option<i64>,
    pagination: PaginationState,
    items: Vec<T>,
    is_loading: bool,
    error: Option<ClassifiedError>,
    attempts: AttemptSlot,
}

/// Read-only copy of a [`PageState`] for consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSnapshot<T> {
    pub is_loading: bool,
    pub page_size: u32,
    pub current_page: u32,
    pub page_count: u64,
    pub total_count: u64,
    pub items: Vec<T>,
    pub error: Option<ClassifiedError>,
}

impl<T> PageState<T> {
    /// A top-level feed such as all posts
    pub fn new(resource: ResourceKind, page_size: NonZeroU32) -> Self {
        Self {
            resource,
            parent: None,
            pagination: PaginationState::new(page_size),
            items: Vec::new(),
            is_loading: false,
            error: None,
            attempts: AttemptSlot::new(),
        }
    }

    /// A feed nested under a parent entity, such as the comments of a post
    pub fn with_parent(resource: ResourceKind, parent: i64, page_size: NonZeroU32) -> Self {
        Self {
            parent: Some(parent),
            ..Self::new(resource, page_size)
        }
    }

    /// Page-specific update function
    /// Returns: Generated commands
    pub fn update(&mut self, msg: PageMsg<T>) -> Vec<Cmd> {
        match msg {
            PageMsg::Start => {
                self.items.clear();
                self.pagination.reset();
                self.begin_fetch()
            }

            PageMsg::ChangePage(page) => {
                if !self.pagination.set_current_page(page) {
                    warn!(resource = %self.resource, "ignoring change to page 0");
                    return vec![];
                }
                self.begin_fetch()
            }

            PageMsg::Succeed { attempt, page } => {
                if !self.settle(attempt) {
                    return vec![];
                }
                self.apply_page(page);
                vec![]
            }

            PageMsg::Fail { attempt, failure } => {
                self.apply_failure(attempt, &failure);
                vec![]
            }

            PageMsg::Teardown => {
                trace!(resource = %self.resource, "teardown");
                self.attempts.retire();
                vec![]
            }
        }
    }

    /// `ChangePage(current_page + 1)`, or nothing once the last known page
    /// has been requested.
    pub fn load_more(&mut self) -> Vec<Cmd> {
        match self.pagination.next_page() {
            Some(page) => self.update(PageMsg::ChangePage(page)),
            None => {
                debug!(
                    resource = %self.resource,
                    current_page = self.pagination.current_page(),
                    page_count = self.pagination.page_count(),
                    "load_more past last page ignored"
                );
                vec![]
            }
        }
    }

    fn begin_fetch(&mut self) -> Vec<Cmd> {
        let token = self.attempts.begin();
        self.is_loading = true;
        self.error = None;

        let request = PageRequest {
            resource: self.resource,
            page: self.pagination.current_page(),
            page_size: self.pagination.page_size(),
            parent: self.parent,
        };
        debug!(
            resource = %self.resource,
            page = request.page,
            attempt = %token.attempt(),
            "page fetch started"
        );
        vec![Cmd::FetchPage { token, request }]
    }

    fn settle(&mut self, attempt: AttemptId) -> bool {
        let live = self.attempts.settle(attempt);
        if !live {
            debug!(resource = %self.resource, %attempt, "stale settlement discarded");
        }
        live
    }

    fn apply_page(&mut self, page: Page<T>) {
        self.items.extend(page.items);
        self.pagination.set_total_count(page.total_count);
        self.is_loading = false;
        self.error = None;
    }

    fn apply_failure(&mut self, attempt: AttemptId, failure: &TransportFailure) {
        if !self.settle(attempt) {
            return;
        }
        // The port gave up on its own; end the attempt without surfacing an error
        let Some(error) = classify(failure) else {
            warn!(resource = %self.resource, %attempt, "port reported cancellation of a live attempt");
            self.is_loading = false;
            return;
        };
        warn!(
            resource = %self.resource,
            page = self.pagination.current_page(),
            status = ?failure.status,
            message = %error.message,
            "page fetch failed"
        );
        self.error = Some(error);
        self.is_loading = false;
    }

    pub fn resource(&self) -> ResourceKind {
        self.resource
    }

    pub fn parent(&self) -> Option<i64> {
        self.parent
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn error(&self) -> Option<&ClassifiedError> {
        self.error.as_ref()
    }

    pub fn page_size(&self) -> u32 {
        self.pagination.page_size()
    }

    pub fn current_page(&self) -> u32 {
        self.pagination.current_page()
    }

    pub fn page_count(&self) -> u64 {
        self.pagination.page_count()
    }

    pub fn total_count(&self) -> u64 {
        self.pagination.total_count()
    }

    /// Whether `load_more` would issue a fetch
    pub fn has_more(&self) -> bool {
        self.pagination.next_page().is_some()
    }

    /// Whether an attempt is outstanding
    pub fn has_live_attempt(&self) -> bool {
        self.attempts.has_live()
    }

    pub fn snapshot(&self) -> PageSnapshot<T>
    where
        T: Clone,
    {
        PageSnapshot {
            is_loading: self.is_loading,
            page_size: self.page_size(),
            current_page: self.current_page(),
            page_count: self.page_count(),
            total_count: self.total_count(),
            items: self.items.clone(),
            error: self.error.clone(),
        }
    }
}
