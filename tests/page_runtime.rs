mod common;

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::Result;
use pretty_assertions::assert_eq;
use serde_json::json;

use postboard::core::error::TransportFailure;
use postboard::core::resources::{all_posts, post_comments};
use postboard::domain::{Comment, Post};
use postboard::infrastructure::port::PagePort;

use common::{comments, posts, GatedPages};

fn page_size(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap()
}

fn ids(items: &[Post]) -> Vec<i64> {
    items.iter().map(|post| post.id).collect()
}

fn posts_port(port: &Arc<GatedPages<Post>>) -> Arc<dyn PagePort<Post>> {
    Arc::clone(port) as Arc<dyn PagePort<Post>>
}

#[tokio::test]
async fn test_feed_accumulates_pages_up_to_total() -> Result<()> {
    let port = GatedPages::new();
    let mut feed = all_posts(posts_port(&port), page_size(10))?;

    port.take(1).succeed(posts(1..=10), 25);
    feed.run_until_settled().await;
    let snapshot = feed.snapshot();
    assert_eq!(snapshot.items.len(), 10);
    assert_eq!(snapshot.page_count, 3);
    assert!(!snapshot.is_loading);
    assert_eq!(snapshot.error, None);

    feed.load_more()?;
    assert!(feed.snapshot().is_loading);
    port.take(2).succeed(posts(11..=20), 25);
    feed.run_until_settled().await;
    assert_eq!(feed.snapshot().items.len(), 20);

    feed.load_more()?;
    port.take(3).succeed(posts(21..=25), 25);
    feed.run_until_settled().await;

    let snapshot = feed.snapshot();
    assert_eq!(ids(&snapshot.items), (1..=25).collect::<Vec<_>>());
    assert_eq!(snapshot.items.len() as u64, snapshot.total_count);
    assert_eq!(snapshot.current_page, 3);

    // Past the last page nothing is requested
    feed.load_more()?;
    assert_eq!(port.pending(), 0);
    assert!(!feed.snapshot().is_loading);
    Ok(())
}

#[tokio::test]
async fn test_superseded_page_is_discarded() -> Result<()> {
    let port = GatedPages::new();
    let mut feed = all_posts(posts_port(&port), page_size(10))?;
    port.take(1).succeed(posts(1..=10), 25);
    feed.run_until_settled().await;

    feed.change_page(2)?;
    feed.change_page(3)?;

    let page_two = port.take(2);
    assert!(page_two.token.is_cancelled());
    page_two.succeed(posts(11..=20), 25);
    let page_three = port.take(3);
    assert!(!page_three.token.is_cancelled());
    page_three.succeed(posts(21..=25), 25);
    feed.run_until_settled().await;

    let snapshot = feed.snapshot();
    assert_eq!(
        ids(&snapshot.items),
        (1..=10).chain(21..=25).collect::<Vec<_>>()
    );
    assert_eq!(snapshot.current_page, 3);
    assert!(!snapshot.is_loading);
    Ok(())
}

#[tokio::test]
async fn test_superseded_failure_is_discarded() -> Result<()> {
    let port = GatedPages::new();
    let mut feed = all_posts(posts_port(&port), page_size(10))?;
    port.take(1).succeed(posts(1..=10), 25);
    feed.run_until_settled().await;

    feed.change_page(2)?;
    feed.change_page(3)?;
    port.take(2).fail(TransportFailure::status(500));
    port.take(3).succeed(posts(21..=25), 25);
    feed.run_until_settled().await;

    let snapshot = feed.snapshot();
    assert_eq!(snapshot.error, None);
    assert_eq!(snapshot.items.len(), 15);
    Ok(())
}

#[tokio::test]
async fn test_failure_is_classified_and_items_are_kept() -> Result<()> {
    let port = GatedPages::new();
    let mut feed = all_posts(posts_port(&port), page_size(10))?;
    port.take(1).succeed(posts(1..=10), 25);
    feed.run_until_settled().await;

    feed.load_more()?;
    port.take(2).fail(
        TransportFailure::status(422)
            .with_body(json!({"message": ["body is required", "title is required"]})),
    );
    feed.run_until_settled().await;

    let snapshot = feed.snapshot();
    let error = snapshot.error.expect("failure should be surfaced");
    assert_eq!(error.message, "body is required");
    assert!(!error.is_auth_failure);
    assert!(!snapshot.is_loading);
    assert_eq!(snapshot.items.len(), 10);

    // Retrying the page clears the error while it loads
    feed.change_page(2)?;
    assert_eq!(feed.snapshot().error, None);
    assert!(feed.snapshot().is_loading);
    port.take(2).succeed(posts(11..=20), 25);
    feed.run_until_settled().await;
    assert_eq!(feed.snapshot().items.len(), 20);
    Ok(())
}

#[tokio::test]
async fn test_restart_discards_in_flight_page() -> Result<()> {
    let port = GatedPages::new();
    let mut feed = all_posts(posts_port(&port), page_size(10))?;
    port.take(1).succeed(posts(1..=10), 25);
    feed.run_until_settled().await;

    feed.load_more()?;
    feed.start()?;
    assert!(feed.snapshot().items.is_empty());
    assert_eq!(feed.snapshot().current_page, 1);

    port.take(2).succeed(posts(11..=20), 25);
    port.take(1).succeed(posts(1..=10), 30);
    feed.run_until_settled().await;

    let snapshot = feed.snapshot();
    assert_eq!(ids(&snapshot.items), (1..=10).collect::<Vec<_>>());
    assert_eq!(snapshot.total_count, 30);
    Ok(())
}

#[tokio::test]
async fn test_dropping_feed_cancels_live_attempt() -> Result<()> {
    let port = GatedPages::new();
    let feed = all_posts(posts_port(&port), page_size(10))?;
    assert_eq!(port.pending(), 1);

    drop(feed);

    let page_one = port.take(1);
    assert!(page_one.token.is_cancelled());
    // Delivering the result after teardown is harmless
    page_one.succeed(posts(1..=10), 25);
    Ok(())
}

#[tokio::test]
async fn test_empty_collection() -> Result<()> {
    let port = GatedPages::new();
    let mut feed = all_posts(posts_port(&port), page_size(10))?;
    port.take(1).succeed(Vec::new(), 0);
    feed.run_until_settled().await;

    let snapshot = feed.snapshot();
    assert_eq!(snapshot.page_count, 0);
    assert!(snapshot.items.is_empty());
    assert!(!snapshot.is_loading);

    feed.load_more()?;
    assert_eq!(port.pending(), 0);
    Ok(())
}

#[tokio::test]
async fn test_comment_feed_requests_pages_of_its_post() -> Result<()> {
    let port = GatedPages::new();
    let mut feed = post_comments(
        Arc::clone(&port) as Arc<dyn PagePort<Comment>>,
        42,
        page_size(2),
    )?;

    let first = port.take(1);
    assert_eq!(first.request.parent, Some(42));
    assert_eq!(first.request.page_size, 2);
    first.succeed(comments(42, 1..=2), 3);
    feed.run_until_settled().await;

    feed.load_more()?;
    port.take(2).succeed(comments(42, 3..=3), 3);
    feed.run_until_settled().await;

    let snapshot = feed.snapshot();
    assert_eq!(snapshot.items, comments(42, 1..=3));
    assert!(!feed.machine().has_more());
    Ok(())
}

#[tokio::test]
async fn test_port_cancellation_does_not_leave_feed_loading() -> Result<()> {
    let port = GatedPages::new();
    let mut feed = all_posts(posts_port(&port), page_size(10))?;

    port.take(1).fail(TransportFailure::cancelled());
    tokio::time::timeout(Duration::from_secs(2), feed.run_until_settled()).await?;

    let snapshot = feed.snapshot();
    assert!(!snapshot.is_loading);
    assert_eq!(snapshot.error, None);
    assert!(!feed.machine().has_live_attempt());

    // The feed can be restarted afterwards
    feed.start()?;
    port.take(1).succeed(posts(1..=3), 3);
    feed.run_until_settled().await;
    assert_eq!(feed.snapshot().items.len(), 3);
    Ok(())
}
