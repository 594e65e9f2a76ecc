use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "shelfscout")]
#[command(
    about = "Search, similarity, recommendations and integrity checks for your book library",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory (defaults to the platform data dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search the library
    #[command(alias = "s")]
    Search {
        /// Free-text query matched against title or author
        query: Option<String>,

        /// Filter by author (substring)
        #[arg(short, long)]
        author: Option<String>,

        /// Filter by status (wishlist, reading, completed, on_hold, dnf)
        #[arg(long)]
        status: Option<String>,

        /// Filter by tag; repeat for several tags
        #[arg(short, long)]
        tag: Vec<String>,

        /// Require all tags instead of any
        #[arg(long)]
        all_tags: bool,

        /// Minimum own rating (1-5)
        #[arg(long)]
        min_rating: Option<i32>,

        /// Filter by series name (substring)
        #[arg(long)]
        series: Option<String>,

        /// Sort order (e.g. title_asc, rating_desc, date_added_desc)
        #[arg(long)]
        sort: Option<String>,

        #[arg(short, long, default_value_t = 50)]
        limit: usize,

        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// Find books similar to the given book
    #[command(alias = "sim")]
    Similar {
        /// Book ID
        id: Uuid,

        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        /// Also consider books you have already read
        #[arg(long)]
        include_read: bool,
    },

    /// Unread books similar to your favorites
    #[command(alias = "fav")]
    Favorites {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Ranked reading recommendations
    #[command(alias = "rec")]
    Recommend {
        /// Single strategy only (e.g. read_next, by_series, quick_read)
        #[arg(short, long)]
        kind: Option<String>,

        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// The single best pick for what to read next
    Next,

    /// Check data integrity
    Check {
        /// Check a single book instead of the whole library
        #[arg(long)]
        book: Option<Uuid>,
    },

    /// Repair auto-fixable integrity issues (dry run unless --apply)
    Fix {
        /// Actually write the fixes instead of reporting them
        #[arg(long)]
        apply: bool,
    },
}
