//! Domain types
//!
//! This module contains the entities the client displays and the keys used
//! to request them:
//! - Posts, comments and users
//! - Resource kinds, page/entity requests and page payloads

pub mod models;
pub mod resource;

pub use models::{Comment, Post, User};
pub use resource::{EntityRequest, Page, PageRequest, ResourceKind};
