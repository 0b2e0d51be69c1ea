use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::core::{
    cancel::AttemptSlot,
    cmd::Cmd,
    error::{classify, ClassifiedError},
    msg::EntityMsg,
};
use crate::domain::{EntityRequest, ResourceKind};

/// Single-entity fetch state machine (post by id, user by id).
///
/// Re-entrant: a new `Start` always goes back to loading and retires the
/// attempt in flight.
#[derive(Debug)]
pub struct EntityState<T> {
    resource: ResourceKind,
    key: Option<i64>,
    item: Option<T>,
    is_loading: bool,
    error: Option<ClassifiedError>,
    attempts: AttemptSlot,
}

/// Read-only copy of an [`EntityState`] for consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySnapshot<T> {
    pub is_loading: bool,
    pub item: Option<T>,
    pub error: Option<ClassifiedError>,
}

impl<T> EntityState<T> {
    pub fn new(resource: ResourceKind) -> Self {
        Self {
            resource,
            key: None,
            item: None,
            is_loading: false,
            error: None,
            attempts: AttemptSlot::new(),
        }
    }

    /// Entity-specific update function
    /// Returns: Generated commands
    pub fn update(&mut self, msg: EntityMsg<T>) -> Vec<Cmd> {
        match msg {
            EntityMsg::Start(id) => {
                self.attempts.retire();
                if self.key != Some(id) {
                    self.item = None;
                }
                self.key = Some(id);

                if id <= 0 {
                    let error = ClassifiedError::invalid_key(self.resource.singular(), id);
                    warn!(resource = %self.resource, id, "rejected invalid key");
                    self.error = Some(error);
                    self.is_loading = false;
                    return vec![];
                }

                let token = self.attempts.begin();
                self.is_loading = true;
                self.error = None;
                debug!(resource = %self.resource, id, attempt = %token.attempt(), "entity fetch started");

                vec![Cmd::FetchEntity {
                    token,
                    request: EntityRequest {
                        resource: self.resource,
                        id,
                    },
                }]
            }

            EntityMsg::Succeed { attempt, item } => {
                if !self.attempts.settle(attempt) {
                    debug!(resource = %self.resource, %attempt, "stale settlement discarded");
                    return vec![];
                }
                self.item = Some(item);
                self.is_loading = false;
                self.error = None;
                vec![]
            }

            EntityMsg::Fail { attempt, failure } => {
                if !self.attempts.settle(attempt) {
                    debug!(resource = %self.resource, %attempt, "stale settlement discarded");
                    return vec![];
                }
                // The port gave up on its own; end the attempt without surfacing an error
                let Some(error) = classify(&failure) else {
                    warn!(resource = %self.resource, %attempt, "port reported cancellation of a live attempt");
                    self.is_loading = false;
                    return vec![];
                };
                warn!(
                    resource = %self.resource,
                    id = ?self.key,
                    status = ?failure.status,
                    message = %error.message,
                    "entity fetch failed"
                );
                self.error = Some(error);
                self.is_loading = false;
                vec![]
            }

            EntityMsg::Teardown => {
                trace!(resource = %self.resource, "teardown");
                self.attempts.retire();
                vec![]
            }
        }
    }

    pub fn resource(&self) -> ResourceKind {
        self.resource
    }

    /// Id of the most recent `Start`
    pub fn key(&self) -> Option<i64> {
        self.key
    }

    pub fn item(&self) -> Option<&T> {
        self.item.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&ClassifiedError> {
        self.error.as_ref()
    }

    pub fn has_live_attempt(&self) -> bool {
        self.attempts.has_live()
    }

    pub fn snapshot(&self) -> EntitySnapshot<T>
    where
        T: Clone,
    {
        EntitySnapshot {
            is_loading: self.is_loading,
            item: self.item.clone(),
            error: self.error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::*;

    use super::*;
    use crate::core::{cancel::FetchToken, error::TransportFailure};

    fn create_test_state() -> EntityState<String> {
        EntityState::new(ResourceKind::Users)
    }

    fn token_of(cmds: &[Cmd]) -> FetchToken {
        assert_eq!(cmds.len(), 1, "expected exactly one command");
        cmds[0].token().clone()
    }

    #[test]
    fn test_start_issues_fetch() {
        let mut state = create_test_state();
        let cmds = state.update(EntityMsg::Start(42));

        assert!(state.is_loading());
        assert_eq!(state.key(), Some(42));
        match &cmds[..] {
            [Cmd::FetchEntity { request, .. }] => assert_eq!(
                request,
                &EntityRequest {
                    resource: ResourceKind::Users,
                    id: 42,
                }
            ),
            other => panic!("Expected one FetchEntity command, got {other:?}"),
        }
    }

    #[test]
    fn test_success_sets_item() {
        let mut state = create_test_state();
        let token = token_of(&state.update(EntityMsg::Start(42)));

        state.update(EntityMsg::Succeed {
            attempt: token.attempt(),
            item: "Jacob".to_string(),
        });

        assert_eq!(state.item().map(String::as_str), Some("Jacob"));
        assert!(!state.is_loading());
        assert_eq!(state.error(), None);
    }

    #[test]
    fn test_failure_sets_error() {
        let mut state = create_test_state();
        let token = token_of(&state.update(EntityMsg::Start(42)));

        state.update(EntityMsg::Fail {
            attempt: token.attempt(),
            failure: TransportFailure::status(500),
        });

        assert_eq!(
            state.error(),
            Some(&ClassifiedError::new("Service Unavailable", false))
        );
        assert!(!state.is_loading());
    }

    #[rstest]
    #[case(0)]
    #[case(-3)]
    fn test_invalid_key_rejected_before_fetch(#[case] id: i64) {
        let mut state = create_test_state();
        let cmds = state.update(EntityMsg::Start(id));

        assert!(cmds.is_empty());
        assert!(!state.is_loading());
        let error = state.error().cloned();
        assert_eq!(
            error,
            Some(ClassifiedError::new(format!("Invalid user id: {id}"), false))
        );
    }

    #[test]
    fn test_invalid_key_retires_live_attempt() {
        let mut state = create_test_state();
        let token = token_of(&state.update(EntityMsg::Start(1)));

        state.update(EntityMsg::Start(0));

        assert!(token.is_cancelled());
        assert!(!state.has_live_attempt());
    }

    #[test]
    fn test_key_change_discards_previous_attempt() {
        let mut state = create_test_state();
        let first = token_of(&state.update(EntityMsg::Start(1)));
        let second = token_of(&state.update(EntityMsg::Start(2)));

        state.update(EntityMsg::Succeed {
            attempt: first.attempt(),
            item: "first".to_string(),
        });
        assert_eq!(state.item(), None);
        assert!(state.is_loading());

        state.update(EntityMsg::Succeed {
            attempt: second.attempt(),
            item: "second".to_string(),
        });
        assert_eq!(state.item().map(String::as_str), Some("second"));
    }

    #[test]
    fn test_restart_same_key_keeps_item_while_loading() {
        let mut state = create_test_state();
        let token = token_of(&state.update(EntityMsg::Start(5)));
        state.update(EntityMsg::Succeed {
            attempt: token.attempt(),
            item: "kept".to_string(),
        });

        state.update(EntityMsg::Start(5));
        assert!(state.is_loading());
        assert_eq!(state.item().map(String::as_str), Some("kept"));

        state.update(EntityMsg::Start(6));
        assert_eq!(state.item(), None);
    }

    #[test]
    fn test_stale_cancelled_failure_causes_no_transition() {
        let mut state = create_test_state();
        let stale = token_of(&state.update(EntityMsg::Start(5)));
        token_of(&state.update(EntityMsg::Start(6)));

        state.update(EntityMsg::Fail {
            attempt: stale.attempt(),
            failure: TransportFailure::cancelled(),
        });

        assert!(state.is_loading());
        assert_eq!(state.error(), None);
        assert!(state.has_live_attempt());
    }

    #[test]
    fn test_port_cancellation_ends_live_attempt_without_error() {
        let mut state = create_test_state();
        let token = token_of(&state.update(EntityMsg::Start(5)));

        state.update(EntityMsg::Fail {
            attempt: token.attempt(),
            failure: TransportFailure::cancelled(),
        });

        assert!(!state.is_loading());
        assert_eq!(state.error(), None);
        assert!(!state.has_live_attempt());
    }

    #[test]
    fn test_teardown_ignores_late_settlement() {
        let mut state = create_test_state();
        let token = token_of(&state.update(EntityMsg::Start(5)));

        state.update(EntityMsg::Teardown);
        state.update(EntityMsg::Succeed {
            attempt: token.attempt(),
            item: "late".to_string(),
        });

        assert!(token.is_cancelled());
        assert_eq!(state.item(), None);
    }

    #[test]
    fn test_snapshot() {
        let mut state = create_test_state();
        state.update(EntityMsg::Start(5));

        assert_eq!(
            state.snapshot(),
            EntitySnapshot {
                is_loading: true,
                item: None,
                error: None,
            }
        );
    }
}
