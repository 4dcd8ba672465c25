use clap::Parser;
use site_context::config::{FetcherConfig, WebDriverFetcherConfig};
use site_context::utils::page_file_name;
use site_context::{CrawlError, CrawlResult, OriginPolicy, SiteCrawler};
use std::path::Path;
use std::process::ExitCode;

mod args;
use args::{Args, OutputFormat};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let crawler = match build_crawler(&args) {
        Ok(crawler) => crawler,
        Err(e) => {
            ::log::error!("{}", e);
            return ExitCode::from(2);
        }
    };

    let start_time = std::time::Instant::now();
    let result = match crawler.run().await {
        Ok(result) => result,
        Err(e) => {
            ::log::error!("Crawl failed: {}", e);
            return ExitCode::from(2);
        }
    };
    ::log::info!(
        "Crawled {} pages in {:.2} seconds",
        result.pages.len(),
        start_time.elapsed().as_secs_f64()
    );

    if let Some(dir) = &args.output_dir {
        if let Err(e) = write_pages(&result, dir) {
            ::log::error!("Failed to write pages to {}: {}", dir.display(), e);
            return ExitCode::from(2);
        }
    }

    if let Err(e) = print_result(&result, args.format) {
        ::log::error!("Failed to print result: {}", e);
        return ExitCode::from(2);
    }

    ExitCode::SUCCESS
}

/// Config file first, then command-line overrides
fn build_crawler(args: &Args) -> Result<SiteCrawler, CrawlError> {
    let mut crawler = match (&args.config, &args.seed) {
        (Some(path), _) => SiteCrawler::new("").with_config_file(path)?,
        (None, Some(seed)) => SiteCrawler::new(seed),
        (None, None) => {
            return Err(CrawlError::InvalidInput(
                "a seed URL or --config is required".to_string(),
            ));
        }
    };

    if let (Some(_), Some(seed)) = (&args.config, &args.seed) {
        let mut config = crawler.config().clone();
        config.seed_url = seed.clone();
        crawler = crawler.with_config(config);
    }
    if let Some(max_pages) = args.max_pages {
        crawler = crawler.with_max_pages(max_pages);
    }
    if let Some(concurrency) = args.concurrency {
        crawler = crawler.with_max_concurrency(concurrency);
    }
    if args.timeout_ms.is_some() {
        crawler = crawler.with_timeout_ms(args.timeout_ms);
    }
    if args.same_origin {
        crawler = crawler.with_origin_policy(OriginPolicy::SameOrigin);
    }
    if let Some(webdriver_url) = &args.webdriver {
        crawler = crawler.with_fetcher(FetcherConfig::WebDriver(WebDriverFetcherConfig {
            webdriver_url: webdriver_url.clone(),
        }));
    }

    Ok(crawler)
}

fn print_result(result: &CrawlResult, format: OutputFormat) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Document => println!("{}", result.to_document()),
        OutputFormat::Summary => print_summary(result),
    }
    Ok(())
}

fn print_summary(result: &CrawlResult) {
    for page in &result.pages {
        let title = page.title.as_deref().unwrap_or("(untitled)");
        println!("{:<70} {:>8} chars  {}", page.url, page.text.chars().count(), title);
    }
    for skipped in &result.skipped {
        println!("{:<70} skipped  {}", skipped.url, skipped.reason);
    }

    println!();
    println!("Pages:       {}", result.pages.len());
    println!("Skipped:     {}", result.skipped_count());
    println!("Unattempted: {}", result.unattempted);
    if result.timed_out {
        println!("Stopped at the deadline; results are partial.");
    } else if result.skipped_count() > 0 {
        println!("Some pages failed; results may be incomplete.");
    }
}

fn write_pages(result: &CrawlResult, dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    for (index, page) in result.pages.iter().enumerate() {
        let path = dir.join(page_file_name(index, &page.url));
        std::fs::write(&path, &page.text)?;
        ::log::debug!("Wrote {}", path.display());
    }
    Ok(())
}
