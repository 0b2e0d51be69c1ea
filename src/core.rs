//! Core fetch architecture
//!
//! This module contains the pieces of the fetch loop:
//! - Failure classification and cancellation tokens
//! - Messages and commands
//! - Paginated and single-entity state machines
//! - Command execution and the runtime that owns a machine

pub mod cancel;
pub mod cmd;
pub mod error;
pub mod executor;
pub mod msg;
pub mod resources;
pub mod runtime;
pub mod state;
