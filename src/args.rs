use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "site-context")]
#[command(about = "Crawls a site section and prints its text as context for a language model")]
#[command(version)]
pub struct Args {
    /// Seed URL to start crawling from (optional when --config provides one)
    pub seed: Option<String>,

    /// Path to a JSON crawl configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Maximum number of pages to collect
    #[arg(short = 'n', long)]
    pub max_pages: Option<usize>,

    /// Number of concurrent fetches (1 keeps strict breadth-first order)
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Overall crawl timeout in milliseconds
    #[arg(short, long)]
    pub timeout_ms: Option<u64>,

    /// Follow any path on the seed's origin, not just the seed's directory
    #[arg(long)]
    pub same_origin: bool,

    /// Fetch through a WebDriver server at this URL (renders JavaScript)
    #[arg(long)]
    pub webdriver: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Summary)]
    pub format: OutputFormat,

    /// Also write each page's text to this directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per page plus totals
    Summary,
    /// The full crawl result as JSON
    Json,
    /// All page text concatenated into one document
    Document,
}
