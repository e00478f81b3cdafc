//! Archive pagination
//!
//! Walks `archiv/`, `archiv/?page=2`, ... and collects recipe links until
//! the archive looks exhausted.

use crate::config::{CrawlerConfig, SiteConfig};
use crate::fetchers::Fetcher;
use log::{info, warn};
use scraper::{Html, Selector};
use std::collections::{BTreeSet, HashSet};
use std::thread;
use std::time::Duration;
use url::Url;

/// Why pagination ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A page could not be fetched
    FetchFailed,
    /// A page had no recipe links
    EmptyPage,
    /// The caller's page limit was reached
    PageLimit,
    /// No pagination links and only a few recipes on the page
    NoPagination,
    /// The hard page ceiling was reached
    HardCeiling,
}

/// Progress of one crawl
#[derive(Debug, Clone)]
pub struct CrawlState {
    pub urls: BTreeSet<String>,
    /// 1-based number of the page to fetch next
    pub page: usize,
    pub stopped: Option<StopReason>,
}

impl Default for CrawlState {
    fn default() -> Self {
        Self {
            urls: BTreeSet::new(),
            page: 1,
            stopped: None,
        }
    }
}

pub struct ArchiveCrawler<F> {
    fetcher: F,
    site: SiteConfig,
    page_delay: Duration,
    max_pages: usize,
    low_count_threshold: usize,
}

impl<F: Fetcher> ArchiveCrawler<F> {
    pub fn new(fetcher: F, site: SiteConfig, config: &CrawlerConfig) -> Self {
        Self {
            fetcher,
            site,
            page_delay: config.page_delay(),
            max_pages: config.max_pages,
            low_count_threshold: config.low_count_threshold,
        }
    }

    /// Collect recipe URLs from the archive, sorted.
    pub fn crawl(&self, archive_url: &str, page_limit: Option<usize>) -> Vec<String> {
        let state = self.crawl_state(archive_url, page_limit);
        state.urls.into_iter().collect()
    }

    /// Same as [`crawl`](Self::crawl) but keeps the final state around.
    pub fn crawl_state(&self, archive_url: &str, page_limit: Option<usize>) -> CrawlState {
        let mut state = CrawlState::default();

        while state.stopped.is_none() {
            let url = page_url(archive_url, state.page);
            info!("Fetching page {}: {}", state.page, url);

            let html = match self.fetcher.fetch(&url) {
                Ok(html) => html,
                Err(e) => {
                    warn!("Error fetching page {}: {}", state.page, e);
                    state.stopped = Some(StopReason::FetchFailed);
                    break;
                }
            };

            let document = Html::parse_document(&html);
            let links = candidate_links(&document, &url, &self.site);
            info!("Found {} recipe URLs on page {}", links.len(), state.page);

            state.stopped = self.stop_reason(&document, links.len(), state.page, page_limit);
            state.urls.extend(links);

            if state.stopped.is_none() {
                state.page += 1;
                if !self.page_delay.is_zero() {
                    thread::sleep(self.page_delay);
                }
            }
        }

        info!(
            "Stopped after page {} ({:?}), {} recipe URLs collected",
            state.page,
            state.stopped,
            state.urls.len()
        );
        state
    }

    fn stop_reason(
        &self,
        document: &Html,
        found: usize,
        page: usize,
        page_limit: Option<usize>,
    ) -> Option<StopReason> {
        if found == 0 {
            return Some(StopReason::EmptyPage);
        }
        if page_limit.is_some_and(|limit| page >= limit) {
            return Some(StopReason::PageLimit);
        }
        if !has_pagination(document) && found < self.low_count_threshold {
            return Some(StopReason::NoPagination);
        }
        if page >= self.max_pages {
            return Some(StopReason::HardCeiling);
        }
        None
    }
}

/// URL of the n-th archive page. Page 1 is the bare archive URL.
pub fn page_url(archive_url: &str, page: usize) -> String {
    if page <= 1 {
        archive_url.to_string()
    } else {
        format!("{archive_url}?page={page}")
    }
}

/// Distinct recipe links on a page, resolved against `page_url`.
pub fn candidate_links(document: &Html, page_url: &str, site: &SiteConfig) -> HashSet<String> {
    let Ok(anchors) = Selector::parse("a[href]") else {
        return HashSet::new();
    };
    let base = Url::parse(page_url).ok();
    let prefix = site.recipe_link_prefix();

    document
        .select(&anchors)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| resolve(base.as_ref(), href))
        .filter(|url| url.contains("/rezepte/") && url.contains("-rezept-"))
        .filter(|url| url.starts_with(&prefix) && url.ends_with(".html"))
        .collect()
}

fn resolve(base: Option<&Url>, href: &str) -> Option<String> {
    match base {
        Some(base) => base.join(href).ok().map(String::from),
        None => Url::parse(href).ok().map(String::from),
    }
}

/// Whether the page links to further archive pages.
pub fn has_pagination(document: &Html) -> bool {
    let Ok(anchors) = Selector::parse("a[href]") else {
        return false;
    };

    document.select(&anchors).any(|anchor| {
        let href = anchor.value().attr("href").unwrap_or_default();
        let text = anchor.text().collect::<String>().to_lowercase();
        href.contains("page=") || text.contains("weiter") || text.contains("next")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://www.essen-und-trinken.de/rezepte/archiv/";

    #[test]
    fn test_page_url() {
        assert_eq!(page_url(PAGE, 1), PAGE);
        assert_eq!(page_url(PAGE, 2), format!("{PAGE}?page=2"));
        assert_eq!(page_url(PAGE, 17), format!("{PAGE}?page=17"));
    }

    #[test]
    fn test_candidate_links_filter_and_resolve() {
        let document = Html::parse_document(
            r#"<a href="/rezepte/linsensuppe-rezept-123.html">relative</a>
               <a href="https://www.essen-und-trinken.de/rezepte/linsensuppe-rezept-123.html">duplicate</a>
               <a href="https://www.essen-und-trinken.de/rezepte/gulasch-rezept-9.html#kommentare">fragment</a>
               <a href="/rezepte/archiv/">archive</a>
               <a href="/kochen/tipps-rezept-1.html">wrong section</a>
               <a href="https://www.chefkoch.de/rezepte/salat-rezept-5.html">other site</a>
               <a href="/rezepte/kuchen-rezept-7">no suffix</a>
               <a href="/rezepte/brot-rezept-8.html?utm=x">query</a>"#,
        );
        let links = candidate_links(&document, PAGE, &SiteConfig::default());

        assert_eq!(links.len(), 1);
        assert!(links.contains("https://www.essen-und-trinken.de/rezepte/linsensuppe-rezept-123.html"));
    }

    #[test]
    fn test_candidate_links_resolve_path_relative_href() {
        let document = Html::parse_document(
            r#"<a href="gulasch-rezept-9.html">relative to page</a>
               <a href="../../kochen/tipps-rezept-1.html">leaves section</a>"#,
        );
        let links = candidate_links(
            &document,
            "https://www.essen-und-trinken.de/rezepte/archiv/",
            &SiteConfig::default(),
        );

        assert_eq!(links.len(), 1);
        assert!(links.contains("https://www.essen-und-trinken.de/rezepte/archiv/gulasch-rezept-9.html"));
    }

    #[test]
    fn test_has_pagination() {
        let with_query = Html::parse_document(r#"<a href="?page=2">2</a>"#);
        let with_text = Html::parse_document(r##"<a href="#">Weiter &raquo;</a>"##);
        let with_next = Html::parse_document(r##"<a href="#">Next</a>"##);
        let without = Html::parse_document(r#"<a href="/rezepte/">Rezepte</a><span>weiter</span>"#);

        assert!(has_pagination(&with_query));
        assert!(has_pagination(&with_text));
        assert!(has_pagination(&with_next));
        assert!(!has_pagination(&without));
    }
}
