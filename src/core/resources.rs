//! Ready-made fetch runtimes for the four screens of the client
//!
//! Each constructor builds the machine, wires its port and dispatches the
//! initial `Start`, so the returned runtime already has an attempt in flight.

use std::{num::NonZeroU32, sync::Arc};

use color_eyre::eyre::Result;

use crate::{
    core::{
        runtime::Runtime,
        state::{EntityState, PageState},
    },
    domain::{Comment, Post, ResourceKind, User},
    infrastructure::port::{EntityPort, PagePort},
};

pub type PostFeed = Runtime<PageState<Post>>;
pub type CommentFeed = Runtime<PageState<Comment>>;
pub type PostDetails = Runtime<EntityState<Post>>;
pub type UserDetails = Runtime<EntityState<User>>;

/// Feed of all posts, starting at page 1
pub fn all_posts(port: Arc<dyn PagePort<Post>>, page_size: NonZeroU32) -> Result<PostFeed> {
    Runtime::start_paginated(ResourceKind::Posts, None, page_size, port)
}

/// Feed of the comments of one post
///
/// The feed stays bound to `post_id`; build another one to follow a different post.
pub fn post_comments(
    port: Arc<dyn PagePort<Comment>>,
    post_id: i64,
    page_size: NonZeroU32,
) -> Result<CommentFeed> {
    Runtime::start_paginated(ResourceKind::Comments, Some(post_id), page_size, port)
}

pub fn post_details(port: Arc<dyn EntityPort<Post>>, id: i64) -> Result<PostDetails> {
    Runtime::start_entity(ResourceKind::Posts, id, port)
}

pub fn user_details(port: Arc<dyn EntityPort<User>>, id: i64) -> Result<UserDetails> {
    Runtime::start_entity(ResourceKind::Users, id, port)
}
