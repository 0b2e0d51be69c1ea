use std::sync::Arc;

use color_eyre::eyre::{eyre, Result};
use tokio::sync::mpsc;

use crate::{
    core::{cancel::FetchToken, cmd::Cmd, error::TransportFailure, msg::Settled},
    infrastructure::port::{EntityPort, FetchFuture, PagePort},
};

/// Command executor that runs fetch commands against the resource ports
///
/// Each fetch runs on its own task and races its port call against the
/// attempt's token. Whatever happens, exactly one [`Settled`] is sent back.
pub struct CmdExecutor<T> {
    page_port: Option<Arc<dyn PagePort<T>>>,
    entity_port: Option<Arc<dyn EntityPort<T>>>,
    settled_sender: mpsc::UnboundedSender<Settled<T>>,
}

impl<T> Clone for CmdExecutor<T> {
    fn clone(&self) -> Self {
        Self {
            page_port: self.page_port.as_ref().map(Arc::clone),
            entity_port: self.entity_port.as_ref().map(Arc::clone),
            settled_sender: self.settled_sender.clone(),
        }
    }
}

impl<T: Send + 'static> CmdExecutor<T> {
    /// Create a new command executor without ports
    pub fn new(settled_sender: mpsc::UnboundedSender<Settled<T>>) -> Self {
        Self {
            page_port: None,
            entity_port: None,
            settled_sender,
        }
    }

    /// Route `FetchPage` commands to `port`
    pub fn set_page_port(&mut self, port: Arc<dyn PagePort<T>>) {
        self.page_port = Some(port);
    }

    /// Route `FetchEntity` commands to `port`
    pub fn set_entity_port(&mut self, port: Arc<dyn EntityPort<T>>) {
        self.entity_port = Some(port);
    }

    /// Execute a single command by spawning its port call
    pub fn execute_command(&self, cmd: Cmd) -> Result<()> {
        match cmd {
            Cmd::FetchPage { token, request } => {
                let port = self
                    .page_port
                    .as_ref()
                    .ok_or_else(|| eyre!("FetchPage({}) has no page port", request.resource))?;
                let call = port.fetch_page(request, token.clone());
                let sender = self.settled_sender.clone();
                tokio::spawn(async move {
                    let attempt = token.attempt();
                    let result = race(&token, call).await;
                    if sender.send(Settled::Page { attempt, result }).is_err() {
                        log::debug!("Settlement of {attempt} dropped: runtime gone");
                    }
                });
            }

            Cmd::FetchEntity { token, request } => {
                let port = self
                    .entity_port
                    .as_ref()
                    .ok_or_else(|| eyre!("FetchEntity({}) has no entity port", request.resource))?;
                let call = port.fetch_entity(request, token.clone());
                let sender = self.settled_sender.clone();
                tokio::spawn(async move {
                    let attempt = token.attempt();
                    let result = race(&token, call).await;
                    if sender.send(Settled::Entity { attempt, result }).is_err() {
                        log::debug!("Settlement of {attempt} dropped: runtime gone");
                    }
                });
            }
        }

        Ok(())
    }

    /// Execute multiple commands, stopping at the first that cannot be routed
    pub fn execute_commands(&self, commands: Vec<Cmd>) -> Result<usize> {
        let count = commands.len();
        for cmd in commands {
            let name = cmd.name();
            if let Err(e) = self.execute_command(cmd) {
                log::error!("Failed to execute {name}: {e}");
                return Err(e);
            }
            log::trace!("Executed: {name}");
        }
        Ok(count)
    }

    pub fn has_page_port(&self) -> bool {
        self.page_port.is_some()
    }

    pub fn has_entity_port(&self) -> bool {
        self.entity_port.is_some()
    }
}

/// Resolve to the port's result, or to a cancelled failure as soon as the
/// attempt is retired.
async fn race<O>(token: &FetchToken, call: FetchFuture<O>) -> Result<O, TransportFailure> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(TransportFailure::cancelled()),
        result = call => result,
    }
}
