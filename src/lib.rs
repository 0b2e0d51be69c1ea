//! # Postboard - paginated posts client core
//!
//! A client for a posts/comments/users service, built around small fetch
//! state machines driven in an Elm-like loop.
//!
//! ## Architecture Overview
//!
//! - **Model** (`core::state`): paginated and single-entity fetch machines
//! - **Message** (`core::msg`): events that change a machine
//! - **Update** (`update` on each machine): applies a message, returns commands
//! - **Command** (`core::cmd`): fetches to run against a port
//! - **Runtime** (`core::runtime`): owns one machine, runs its commands and
//!   applies their settlements in arrival order
//!
//! Every fetch runs under its own cancellation token. Starting a new fetch,
//! changing page or dropping the runtime cancels the previous one, and a
//! late result from a cancelled fetch never reaches the machine's state.
//!
//! ## Example Usage
//!
//! ```rust
//! use std::num::NonZeroU32;
//! use postboard::core::{cmd::Cmd, msg::PageMsg, state::PageState};
//! use postboard::domain::{Page, ResourceKind};
//!
//! let mut feed: PageState<u32> = PageState::new(ResourceKind::Posts, NonZeroU32::MIN);
//! let commands = feed.update(PageMsg::Start);
//! let Some(Cmd::FetchPage { token, .. }) = commands.first() else {
//!     panic!("start should fetch page 1");
//! };
//!
//! feed.update(PageMsg::Succeed {
//!     attempt: token.attempt(),
//!     page: Page::new(vec![7], 3),
//! });
//! assert_eq!(feed.items(), &[7]);
//! assert_eq!(feed.page_count(), 3);
//! ```
//!
//! ## Modules
//!
//! - [`core`] - Machines, messages, commands and the runtime
//! - [`domain`] - Entities, resource keys and pages
//! - [`infrastructure`] - Ports, HTTP adapter, configuration and CLI
//! - [`presentation`] - Notifications and text rendering
//! - [`app`] - The command-line screens

pub mod app;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
pub mod utils;

pub use crate::core::{
    cmd::Cmd,
    error::{classify, ClassifiedError, TransportFailure},
    runtime::{Runtime, RuntimeStats},
};

/// Result type used throughout the library
pub type Result<T> = color_eyre::eyre::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
