use std::time::Duration;
use url::Url;

const MAX_FILENAME_LEN: usize = 100;

/// Per-page navigation budget: a base plus a little extra for long URLs
pub fn page_timeout(base: Duration, url: &Url) -> Duration {
    let extra_ms = (url.as_str().len() / 20) as u64 * 100;
    base + Duration::from_millis(extra_ms)
}

/// Turns a page URL into a filesystem-safe file stem
pub fn sanitize_filename(url: &str) -> String {
    let stripped = url
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');

    let name: String = stripped
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '?' | '&' | '=' | '#' | '%' | '*' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .take(MAX_FILENAME_LEN)
        .collect();

    if name.is_empty() { "index".to_string() } else { name }
}

/// Output file name for the page at `index`; the index keeps truncated names apart
pub fn page_file_name(index: usize, url: &str) -> String {
    format!("{:03}_{}.txt", index, sanitize_filename(url))
}
