use crate::error::HarvestError;

mod request;

pub use request::RequestFetcher;

/// Fetches the body of a page.
///
/// Implementations fail on network errors and on non-success statuses.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<String, HarvestError>;
}

impl<T: Fetcher + ?Sized> Fetcher for &T {
    fn fetch(&self, url: &str) -> Result<String, HarvestError> {
        (**self).fetch(url)
    }
}
