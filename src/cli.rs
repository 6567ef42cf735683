//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Download every page image of a book preview and bundle them into a `.cbz`.
///
/// INPUT is either a single document id or the path of a text file holding
/// one document id per line; blank lines are ignored and documents are
/// processed in order.
#[derive(Parser, Debug, Clone)]
#[command(name = "pagegrab")]
#[command(author, version, about)]
pub struct Args {
    /// Document id, or path to a file with one document id per line
    pub input: String,

    /// Directory for page folders, archives and discovery files [default: downloads]
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Keep loose page images instead of packaging them into a .cbz
    #[arg(long)]
    pub no_archive: bool,

    /// Keep the page folder and discovery file after packaging
    #[arg(long)]
    pub no_cleanup: bool,

    /// Carry session cookies from one document to the next
    #[arg(long)]
    pub reuse_session: bool,

    /// Seconds to wait between documents (0-3600) [default: 30]
    #[arg(long, value_parser = clap::value_parser!(u64).range(0..=3600))]
    pub cooldown: Option<u64>,

    /// Upper bound of the random wait between requests in milliseconds (0 disables, max 60000) [default: 2000]
    #[arg(long, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub max_delay: Option<u64>,

    /// Base URL of the book host
    #[arg(long)]
    pub base_url: Option<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored log output
    #[arg(long)]
    pub no_color: bool,
}
