//! Plain-text rendering of machine snapshots

use std::fmt::Write;

use crate::{
    core::state::{EntitySnapshot, PageSnapshot},
    domain::{Comment, Post, User},
};

pub const LOADING: &str = "Loading...";
const RULE: &str = "----------------------------------------";

/// Name shown for an author whose user record is not available
pub fn author_name(user: Option<&User>, user_id: i64) -> String {
    match user {
        Some(user) => user.name.clone(),
        None => format!("user #{user_id}"),
    }
}

pub fn post(post: &Post, author: &str) -> String {
    format!("#{} {}\nby {author}\n\n{}\n", post.id, post.title, post.body)
}

pub fn comment(comment: &Comment) -> String {
    format!("{} <{}>\n  {}\n", comment.name, comment.email, comment.body)
}

pub fn user(user: &User) -> String {
    let mut out = format!("#{} {}\n", user.id, user.name);
    for (label, value) in [
        ("email", &user.email),
        ("gender", &user.gender),
        ("status", &user.status),
    ] {
        if let Some(value) = value {
            let _ = writeln!(out, "  {label}: {value}");
        }
    }
    out
}

/// One-line summary of where a feed stands
pub fn page_status<T>(snapshot: &PageSnapshot<T>) -> String {
    if snapshot.is_loading {
        return LOADING.to_string();
    }
    if snapshot.page_count == 0 {
        return "Nothing here yet".to_string();
    }
    format!(
        "page {}/{} ({} of {})",
        snapshot.current_page,
        snapshot.page_count,
        snapshot.items.len(),
        snapshot.total_count
    )
}

/// Render every item of a feed followed by its status line
pub fn feed<T>(snapshot: &PageSnapshot<T>, mut item: impl FnMut(&T) -> String) -> String {
    let mut out = String::new();
    for entry in &snapshot.items {
        out.push_str(&item(entry));
        out.push_str(RULE);
        out.push('\n');
    }
    out.push_str(&page_status(snapshot));
    out.push('\n');
    out
}

/// Render an entity, or the loading/error placeholder standing in for it
pub fn entity<T>(snapshot: &EntitySnapshot<T>, item: impl FnOnce(&T) -> String) -> String {
    match (&snapshot.item, &snapshot.error) {
        (_, Some(error)) => format!("! {}\n", error.message),
        (Some(value), None) => item(value),
        (None, None) if snapshot.is_loading => format!("{LOADING}\n"),
        (None, None) => String::new(),
    }
}
