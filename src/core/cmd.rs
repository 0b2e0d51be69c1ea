use crate::core::cancel::FetchToken;
use crate::domain::{EntityRequest, PageRequest};

/// Side effects requested by the fetch state machines.
///
/// A command only describes the fetch; [`CmdExecutor`](crate::core::executor::CmdExecutor)
/// runs it against a port and feeds the settlement back as a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    FetchPage {
        token: FetchToken,
        request: PageRequest,
    },
    FetchEntity {
        token: FetchToken,
        request: EntityRequest,
    },
}

impl Cmd {
    pub fn token(&self) -> &FetchToken {
        match self {
            Cmd::FetchPage { token, .. } | Cmd::FetchEntity { token, .. } => token,
        }
    }

    pub fn name(&self) -> String {
        match self {
            Cmd::FetchPage { request, .. } => format!(
                "FetchPage({} page {})",
                request.resource, request.page
            ),
            Cmd::FetchEntity { request, .. } => {
                format!("FetchEntity({} {})", request.resource, request.id)
            }
        }
    }
}
