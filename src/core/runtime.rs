use std::{num::NonZeroU32, sync::Arc};

use color_eyre::eyre::Result;
use tokio::sync::mpsc;

use crate::{
    core::{
        cmd::Cmd,
        executor::CmdExecutor,
        msg::{EntityMsg, PageMsg, Settled},
        state::{EntitySnapshot, EntityState, FetchMachine, PageSnapshot, PageState},
    },
    domain::ResourceKind,
    infrastructure::port::{EntityPort, PagePort},
};

/// Owner of one fetch state machine and the event loop around it
///
/// Messages are applied one at a time on the owner's task; settlements come
/// back from the executor's tasks through a channel and are applied in the
/// order they arrive. Dropping the runtime tears the machine down, which
/// retires any live attempt.
pub struct Runtime<M: FetchMachine> {
    machine: M,
    cmd_executor: CmdExecutor<M::Item>,
    settled_rx: mpsc::UnboundedReceiver<Settled<M::Item>>,
    stats: RuntimeStats,
}

/// Runtime statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    pub processed_messages: usize,
    pub executed_commands: usize,
    pub received_settlements: usize,
}

impl<M> Runtime<M>
where
    M: FetchMachine,
    M::Item: Send + 'static,
{
    fn new(machine: M) -> Self {
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        Self {
            machine,
            cmd_executor: CmdExecutor::new(settled_tx),
            settled_rx,
            stats: RuntimeStats::default(),
        }
    }

    /// Create a runtime whose machine fetches pages through `port`
    pub fn with_page_port(machine: M, port: Arc<dyn PagePort<M::Item>>) -> Self {
        let mut runtime = Self::new(machine);
        runtime.cmd_executor.set_page_port(port);
        runtime
    }

    /// Create a runtime whose machine fetches single entities through `port`
    pub fn with_entity_port(machine: M, port: Arc<dyn EntityPort<M::Item>>) -> Self {
        let mut runtime = Self::new(machine);
        runtime.cmd_executor.set_entity_port(port);
        runtime
    }

    /// Get current machine (read-only)
    pub fn machine(&self) -> &M {
        &self.machine
    }

    /// Process a single message and execute the commands it produced
    pub fn send_msg(&mut self, msg: M::Msg) -> Result<()> {
        let commands = self.machine.update(msg);
        self.stats.processed_messages += 1;
        self.execute(commands)
    }

    fn execute(&mut self, commands: Vec<Cmd>) -> Result<()> {
        self.stats.executed_commands += self.cmd_executor.execute_commands(commands)?;
        Ok(())
    }

    fn apply_settled(&mut self, settled: Settled<M::Item>) {
        self.stats.received_settlements += 1;
        let attempt = settled.attempt();
        match M::settled_msg(settled) {
            Some(msg) => {
                // Settlements never produce commands
                let _ = self.machine.update(msg);
                self.stats.processed_messages += 1;
            }
            None => log::warn!("Settlement of {attempt} does not match this machine"),
        }
    }

    /// Apply every settlement that has already arrived. Returns how many.
    pub fn process_settled(&mut self) -> usize {
        let mut count = 0;
        while let Ok(settled) = self.settled_rx.try_recv() {
            self.apply_settled(settled);
            count += 1;
        }
        count
    }

    /// Wait for the next settlement and apply it.
    ///
    /// Returns false without waiting when no attempt is live.
    pub async fn settle_next(&mut self) -> bool {
        if !self.machine.has_live_attempt() {
            self.process_settled();
            return false;
        }
        match self.settled_rx.recv().await {
            Some(settled) => {
                self.apply_settled(settled);
                true
            }
            None => false,
        }
    }

    /// Apply settlements until the live attempt has settled.
    pub async fn run_until_settled(&mut self) {
        while self.settle_next().await {}
    }

    pub fn get_stats(&self) -> RuntimeStats {
        self.stats
    }
}

impl<M: FetchMachine> Drop for Runtime<M> {
    fn drop(&mut self) {
        let _ = self.machine.update(M::teardown_msg());
    }
}

impl<T: Clone + Send + 'static> Runtime<PageState<T>> {
    /// Build a paginated runtime and start it at page 1
    pub fn start_paginated(
        resource: ResourceKind,
        parent: Option<i64>,
        page_size: NonZeroU32,
        port: Arc<dyn PagePort<T>>,
    ) -> Result<Self> {
        let machine = match parent {
            Some(parent) => PageState::with_parent(resource, parent, page_size),
            None => PageState::new(resource, page_size),
        };
        let mut runtime = Self::with_page_port(machine, port);
        runtime.start()?;
        Ok(runtime)
    }

    pub fn start(&mut self) -> Result<()> {
        self.send_msg(PageMsg::Start)
    }

    pub fn change_page(&mut self, page: u32) -> Result<()> {
        self.send_msg(PageMsg::ChangePage(page))
    }

    /// Request the next page, unless the last known page was already requested
    pub fn load_more(&mut self) -> Result<()> {
        let commands = self.machine.load_more();
        if !commands.is_empty() {
            self.stats.processed_messages += 1;
        }
        self.execute(commands)
    }

    pub fn snapshot(&self) -> PageSnapshot<T> {
        self.machine.snapshot()
    }
}

impl<T: Clone + Send + 'static> Runtime<EntityState<T>> {
    /// Build a single-entity runtime and start fetching `id`
    pub fn start_entity(resource: ResourceKind, id: i64, port: Arc<dyn EntityPort<T>>) -> Result<Self> {
        let mut runtime = Self::with_entity_port(EntityState::new(resource), port);
        runtime.start(id)?;
        Ok(runtime)
    }

    pub fn start(&mut self, id: i64) -> Result<()> {
        self.send_msg(EntityMsg::Start(id))
    }

    pub fn snapshot(&self) -> EntitySnapshot<T> {
        self.machine.snapshot()
    }
}
