//! Presentation layer
//!
//! - Notification channel for transient messages
//! - Plain-text rendering for the command-line screens

pub mod notification;
pub mod render;
