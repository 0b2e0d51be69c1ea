//! The command-line screens
//!
//! Each screen builds the runtimes it needs, drives them until the requested
//! amount of data has settled and renders the result as text. Errors are
//! pushed to the screen's [`Notifier`] as they are observed.

use std::{
    collections::{BTreeMap, BTreeSet},
    num::NonZeroU32,
    sync::Arc,
};

use color_eyre::eyre::Result;

use crate::{
    core::{
        error::ClassifiedError,
        resources,
        runtime::Runtime,
        state::PageState,
    },
    domain::{Comment, Post, User},
    infrastructure::{
        cli::Command,
        http::HttpClient,
        port::{EntityPort, PagePort},
    },
    presentation::{notification::Notifier, render},
};

/// The ports each screen fetches through
#[derive(Clone)]
pub struct Ports {
    pub posts: Arc<dyn PagePort<Post>>,
    pub comments: Arc<dyn PagePort<Comment>>,
    pub post: Arc<dyn EntityPort<Post>>,
    pub user: Arc<dyn EntityPort<User>>,
}

impl Ports {
    pub fn from_client(client: HttpClient) -> Self {
        let client = Arc::new(client);
        Self {
            posts: Arc::clone(&client) as Arc<dyn PagePort<Post>>,
            comments: Arc::clone(&client) as Arc<dyn PagePort<Comment>>,
            post: Arc::clone(&client) as Arc<dyn EntityPort<Post>>,
            user: client as Arc<dyn EntityPort<User>>,
        }
    }
}

pub struct App {
    ports: Ports,
    notifier: Notifier,
    page_size: NonZeroU32,
}

impl App {
    pub fn new(ports: Ports, notifier: Notifier, page_size: NonZeroU32) -> Self {
        Self {
            ports,
            notifier,
            page_size,
        }
    }

    pub async fn run(&self, command: Command) -> Result<String> {
        match command {
            Command::Posts { pages } => self.posts(pages).await,
            Command::Post { id, comments_pages } => self.post(id, comments_pages).await,
            Command::User { id } => self.user(id).await,
        }
    }

    fn report(&self, error: Option<&ClassifiedError>) {
        if let Some(error) = error {
            self.notifier.notify_error(error);
        }
    }

    async fn posts(&self, pages: u32) -> Result<String> {
        let mut feed = resources::all_posts(Arc::clone(&self.ports.posts), self.page_size)?;
        self.load_pages(&mut feed, pages).await?;

        let snapshot = feed.snapshot();
        let authors = self
            .authors(snapshot.items.iter().map(|post| post.user_id))
            .await?;
        Ok(render::feed(&snapshot, |post| {
            let author = render::author_name(authors.get(&post.user_id), post.user_id);
            render::post(post, &author)
        }))
    }

    async fn post(&self, id: i64, comments_pages: u32) -> Result<String> {
        // Both fetches are in flight before either is awaited
        let mut details = resources::post_details(Arc::clone(&self.ports.post), id)?;
        let mut comments =
            resources::post_comments(Arc::clone(&self.ports.comments), id, self.page_size)?;

        details.run_until_settled().await;
        self.report(details.machine().error());
        let details = details.snapshot();

        let authors = self
            .authors(details.item.iter().map(|post| post.user_id))
            .await?;
        let mut out = render::entity(&details, |post| {
            let author = render::author_name(authors.get(&post.user_id), post.user_id);
            render::post(post, &author)
        });

        self.load_pages(&mut comments, comments_pages).await?;
        out.push_str("\nComments\n");
        out.push_str(&render::feed(&comments.snapshot(), render::comment));
        Ok(out)
    }

    async fn user(&self, id: i64) -> Result<String> {
        let mut details = resources::user_details(Arc::clone(&self.ports.user), id)?;
        details.run_until_settled().await;
        self.report(details.machine().error());
        Ok(render::entity(&details.snapshot(), render::user))
    }

    /// Load pages until `pages` are shown, the last page is reached or a fetch fails
    async fn load_pages<T>(&self, feed: &mut Runtime<PageState<T>>, pages: u32) -> Result<()>
    where
        T: Clone + Send + 'static,
    {
        feed.run_until_settled().await;
        self.report(feed.machine().error());
        while feed.machine().current_page() < pages
            && feed.machine().has_more()
            && feed.machine().error().is_none()
        {
            feed.load_more()?;
            feed.run_until_settled().await;
            self.report(feed.machine().error());
        }
        let shown = feed.machine().current_page();
        if shown < pages && feed.machine().error().is_none() {
            self.notifier
                .notify_info(format!("Only {shown} of {pages} pages available"));
        }
        Ok(())
    }

    /// Resolve each distinct user id once, fetching them concurrently
    async fn authors(&self, user_ids: impl Iterator<Item = i64>) -> Result<BTreeMap<i64, User>> {
        let user_ids: BTreeSet<i64> = user_ids.collect();
        let mut pending = Vec::with_capacity(user_ids.len());
        for user_id in user_ids {
            pending.push(resources::user_details(Arc::clone(&self.ports.user), user_id)?);
        }

        let mut authors = BTreeMap::new();
        for mut details in pending {
            details.run_until_settled().await;
            self.report(details.machine().error());
            if let (Some(id), Some(user)) = (details.machine().key(), details.machine().item()) {
                authors.insert(id, user.clone());
            }
        }
        Ok(authors)
    }
}
