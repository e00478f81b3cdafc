use recipe_harvest::config::CrawlerConfig;
use recipe_harvest::{ArchiveCrawler, Fetcher, HarvestError, SiteConfig, StopReason};
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::{Duration, Instant};

const ARCHIVE: &str = "https://www.essen-und-trinken.de/rezepte/archiv/";

/// Serves canned archive pages and remembers which URLs were requested
#[derive(Default)]
struct StubFetcher {
    pages: HashMap<String, String>,
    requested: RefCell<Vec<String>>,
}

impl StubFetcher {
    fn page(mut self, page: usize, html: String) -> Self {
        let url = if page == 1 {
            ARCHIVE.to_string()
        } else {
            format!("{ARCHIVE}?page={page}")
        };
        self.pages.insert(url, html);
        self
    }
}

impl Fetcher for StubFetcher {
    fn fetch(&self, url: &str) -> Result<String, HarvestError> {
        self.requested.borrow_mut().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| HarvestError::StatusError {
                url: url.to_string(),
                status: 404,
            })
    }
}

fn recipe_url(id: usize) -> String {
    format!("https://www.essen-und-trinken.de/rezepte/gericht-{id}-rezept-{id}.html")
}

/// Archive page linking recipes `ids`, optionally with a pagination link
fn archive_page(ids: std::ops::Range<usize>, next: bool) -> String {
    let mut html = String::from("<html><body><ul>");
    for id in ids {
        html.push_str(&format!(
            r#"<li><a href="/rezepte/gericht-{id}-rezept-{id}.html">Gericht {id}</a></li>"#
        ));
        // Teaser image linking the same recipe again
        html.push_str(&format!(
            r#"<li><a href="{}"><img src="x.jpg"></a></li>"#,
            recipe_url(id)
        ));
    }
    html.push_str(r#"</ul><a href="/rezepte/">Alle Rezepte</a>"#);
    if next {
        html.push_str(r#"<a href="/rezepte/archiv/?page=99">Weiter</a>"#);
    }
    html.push_str("</body></html>");
    html
}

fn config() -> CrawlerConfig {
    CrawlerConfig {
        page_delay_ms: 0,
        ..CrawlerConfig::default()
    }
}

fn crawler(fetcher: &StubFetcher) -> ArchiveCrawler<&StubFetcher> {
    ArchiveCrawler::new(fetcher, SiteConfig::default(), &config())
}

#[test]
fn test_stops_on_empty_page_and_keeps_earlier_urls() {
    let fetcher = StubFetcher::default()
        .page(1, archive_page(0..12, true))
        .page(2, archive_page(12..24, true))
        .page(3, archive_page(0..0, true));

    let state = crawler(&fetcher).crawl_state(ARCHIVE, None);

    assert_eq!(state.stopped, Some(StopReason::EmptyPage));
    assert_eq!(state.page, 3);
    assert_eq!(state.urls.len(), 24);
    assert_eq!(fetcher.requested.borrow().len(), 3);
}

#[test]
fn test_empty_first_page_yields_nothing() {
    let fetcher = StubFetcher::default().page(1, archive_page(0..0, true));

    let urls = crawler(&fetcher).crawl(ARCHIVE, None);

    assert!(urls.is_empty());
}

#[test]
fn test_page_limit_one_fetches_one_page() {
    let fetcher = StubFetcher::default()
        .page(1, archive_page(0..12, true))
        .page(2, archive_page(12..24, true));

    let state = crawler(&fetcher).crawl_state(ARCHIVE, Some(1));

    assert_eq!(state.stopped, Some(StopReason::PageLimit));
    assert_eq!(state.urls.len(), 12);
    assert_eq!(*fetcher.requested.borrow(), vec![ARCHIVE.to_string()]);
}

#[test]
fn test_few_links_without_pagination_is_last_page() {
    let fetcher = StubFetcher::default()
        .page(1, archive_page(0..12, false))
        .page(2, archive_page(12..21, false))
        .page(3, archive_page(21..40, true));

    let state = crawler(&fetcher).crawl_state(ARCHIVE, None);

    // Page 1 has no pagination link but enough recipes to keep going
    assert_eq!(state.stopped, Some(StopReason::NoPagination));
    assert_eq!(state.page, 2);
    assert_eq!(state.urls.len(), 21);
}

#[test]
fn test_few_links_with_pagination_continues() {
    let fetcher = StubFetcher::default()
        .page(1, archive_page(0..3, true))
        .page(2, archive_page(3..6, false));

    let state = crawler(&fetcher).crawl_state(ARCHIVE, None);

    assert_eq!(state.stopped, Some(StopReason::NoPagination));
    assert_eq!(state.urls.len(), 6);
}

#[test]
fn test_fetch_failure_returns_partial_result() {
    let fetcher = StubFetcher::default()
        .page(1, archive_page(0..12, true))
        .page(2, archive_page(12..24, true));

    let state = crawler(&fetcher).crawl_state(ARCHIVE, None);

    assert_eq!(state.stopped, Some(StopReason::FetchFailed));
    assert_eq!(state.page, 3);
    assert_eq!(state.urls.len(), 24);
}

#[test]
fn test_hard_ceiling() {
    let mut fetcher = StubFetcher::default();
    for page in 1..=6 {
        fetcher = fetcher.page(page, archive_page(page * 20..page * 20 + 20, true));
    }
    let config = CrawlerConfig {
        page_delay_ms: 0,
        max_pages: 4,
        ..CrawlerConfig::default()
    };

    let crawler = ArchiveCrawler::new(&fetcher, SiteConfig::default(), &config);
    let state = crawler.crawl_state(ARCHIVE, None);

    assert_eq!(state.stopped, Some(StopReason::HardCeiling));
    assert_eq!(fetcher.requested.borrow().len(), 4);
    assert_eq!(state.urls.len(), 80);
}

#[test]
fn test_urls_are_deduplicated_and_sorted() {
    let fetcher = StubFetcher::default()
        .page(1, archive_page(5..15, true))
        // Page 2 repeats half of page 1
        .page(2, archive_page(10..20, true))
        .page(3, archive_page(0..0, true));

    let urls = crawler(&fetcher).crawl(ARCHIVE, None);

    assert_eq!(urls.len(), 15);
    let mut sorted = urls.clone();
    sorted.sort();
    assert_eq!(urls, sorted);
    assert!(urls.contains(&recipe_url(5)));
    assert!(urls.contains(&recipe_url(19)));
}

#[test]
fn test_delay_between_pages_but_not_after_the_stop() {
    let fetcher = StubFetcher::default()
        .page(1, archive_page(0..12, true))
        .page(2, archive_page(12..24, true))
        .page(3, archive_page(0..0, true));
    let config = CrawlerConfig {
        page_delay_ms: 60,
        ..CrawlerConfig::default()
    };
    let crawler = ArchiveCrawler::new(&fetcher, SiteConfig::default(), &config);

    let started = Instant::now();
    let state = crawler.crawl_state(ARCHIVE, None);
    let elapsed = started.elapsed();

    assert_eq!(state.stopped, Some(StopReason::EmptyPage));
    assert_eq!(fetcher.requested.borrow().len(), 3);
    assert!(elapsed >= Duration::from_millis(120), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(180), "{elapsed:?}");
}
