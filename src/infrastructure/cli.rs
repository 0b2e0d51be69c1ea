use clap::{Parser, Subcommand};

use crate::utils::version;

#[derive(Parser, Debug)]
#[command(author, version = version(), about)]
pub struct Cli {
    /// Items requested per page. Overrides the configured page size.
    #[arg(short = 's', long, value_name = "SIZE", global = true)]
    pub page_size: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the feed of all posts with their authors
    Posts {
        /// How many pages to load before stopping
        #[arg(short, long, value_name = "N", default_value_t = 1)]
        pages: u32,
    },
    /// Show one post and its comments
    Post {
        id: i64,
        /// How many pages of comments to load
        #[arg(short, long, value_name = "N", default_value_t = 1)]
        comments_pages: u32,
    },
    /// Show one user
    User { id: i64 },
}
