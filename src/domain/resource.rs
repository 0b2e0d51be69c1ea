//! Resource keys and page payloads exchanged with the fetch ports

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Kinds of remote resources the client reads.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Posts,
    Comments,
    Users,
}

impl ResourceKind {
    /// Singular noun used in user-facing messages.
    pub fn singular(&self) -> &'static str {
        match self {
            ResourceKind::Posts => "post",
            ResourceKind::Comments => "comment",
            ResourceKind::Users => "user",
        }
    }
}

/// Key inputs of one page fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub resource: ResourceKind,
    /// 1-based page index
    pub page: u32,
    pub page_size: u32,
    /// Owning entity for nested collections (e.g. the post of a comments feed)
    pub parent: Option<i64>,
}

/// Key inputs of one single-entity fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRequest {
    pub resource: ResourceKind,
    pub id: i64,
}

/// One settled page.
///
/// `total_count` must be supplied explicitly by whoever produced the page; the
/// paginated state machine derives its page count from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: u64) -> Self {
        Self { items, total_count }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
