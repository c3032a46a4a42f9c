use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "inkpad")]
#[command(about = "Local administration CLI for an inkpad blog", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory (defaults to the platform data dir)
    #[arg(long, global = true)]
    pub data_dir: Option<std::path::PathBuf>,

    /// Act as an anonymous reader instead of the author
    #[arg(long, global = true)]
    pub public: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the data directory and an empty blog
    Init,

    /// List posts
    #[command(alias = "ls")]
    List {
        /// Restrict to a category subtree (0 = uncategorized)
        #[arg(short, long)]
        category: Option<u32>,

        /// Keywords matched against title and content
        #[arg(short, long)]
        keywords: Option<String>,

        /// Restrict to posts carrying at least one of these tags
        #[arg(short, long, num_args = 1..)]
        tags: Vec<String>,

        /// Order mode: recent | relevant
        #[arg(long, default_value = "recent")]
        order: String,

        /// Page number, starting at 0
        #[arg(short, long, default_value_t = 0)]
        page: usize,
    },

    /// View one post
    #[command(alias = "v")]
    View {
        id: u32,

        /// Look the post up among soft-deleted ones
        #[arg(long)]
        deleted: bool,
    },

    /// Create a post
    #[command(alias = "n")]
    Create {
        title: String,

        /// Post body (plain text)
        #[arg(default_value = "")]
        content: String,

        /// Category id
        #[arg(short, long)]
        category: Option<u32>,

        /// Tags to attach
        #[arg(short, long, num_args = 1..)]
        tags: Vec<String>,

        /// Create the post hidden from anonymous readers
        #[arg(long)]
        hidden: bool,
    },

    /// Soft-delete one or more posts
    #[command(alias = "rm")]
    Delete {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<u32>,

        /// Also delete tags this leaves orphaned
        #[arg(long)]
        gc_tags: bool,
    },

    /// Show the category hierarchy with post counts
    Tree,

    /// Manage categories
    #[command(subcommand)]
    Category(CategoryCommands),

    /// List hashtags
    Tags {
        /// Name prefix to match (case-insensitive)
        keyword: Option<String>,
    },

    /// Show or update the site info record
    Info {
        /// New site title
        #[arg(long)]
        title: Option<String>,

        /// New site description
        #[arg(long)]
        description: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// Create a category
    Add {
        name: String,

        #[arg(default_value = "")]
        description: String,

        /// Parent category id
        #[arg(short, long)]
        parent: Option<u32>,

        /// Create hidden from anonymous readers
        #[arg(long)]
        hidden: bool,
    },

    /// List categories
    #[command(alias = "ls")]
    List,

    /// Hide a category (cascades to its subtree)
    Hide { id: u32 },

    /// Soft-delete a category and its subtree
    #[command(alias = "rm")]
    Delete {
        id: u32,

        /// Delete the posts underneath instead of detaching them
        #[arg(long)]
        delete_posts: bool,
    },
}
