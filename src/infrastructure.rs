//! Infrastructure layer
//!
//! This module handles external integrations:
//! - Fetch ports and the HTTP adapter behind them
//! - Configuration loading
//! - CLI argument processing

pub mod cli;
pub mod config;
pub mod http;
pub mod port;
