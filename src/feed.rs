use tracing::debug;

use crate::catalog::Envelope;
use crate::format::Movie;
use crate::storefront::{FeedKind, FeedOptions, Storefront};

/// Accumulated list and pagination cursor behind a "load more" grid.
///
/// Every load borrows the feed mutably, so a page is appended only after the
/// previous request has settled.
#[derive(Debug, Clone)]
pub struct MovieFeed {
    kind: FeedKind,
    query: Option<String>,
    genre_id: Option<u64>,
    movies: Vec<Movie>,
    current_page: u32,
    total_pages: u32,
    total_results: Option<u64>,
    error: Option<String>,
}

impl MovieFeed {
    pub fn new(kind: FeedKind, query: Option<String>, genre_id: Option<u64>) -> Self {
        Self {
            kind,
            query,
            genre_id,
            movies: Vec::new(),
            current_page: 0,
            total_pages: 0,
            total_results: None,
            error: None,
        }
    }

    pub fn kind(&self) -> FeedKind {
        self.kind
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn total_results(&self) -> Option<u64> {
        self.total_results
    }

    /// Message of the last failed load, cleared by the next successful one.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.current_page > 0 && self.current_page < self.total_pages
    }

    /// Loads page 1, replacing anything accumulated so far.
    pub async fn load_first(&mut self, store: &Storefront) -> bool {
        self.load(store, 1, false).await
    }

    /// Appends the next page. Returns false when there is nothing more or the load failed.
    pub async fn load_more(&mut self, store: &Storefront) -> bool {
        if !self.has_more() {
            return false;
        }
        let next = self.current_page + 1;
        self.load(store, next, true).await
    }

    async fn load(&mut self, store: &Storefront, page: u32, append: bool) -> bool {
        let options = FeedOptions {
            query: self.query.clone(),
            page,
            genre_id: self.genre_id,
        };
        match store.formatted_movies(self.kind, &options).await {
            Envelope::Success(result) => {
                if !append {
                    self.movies.clear();
                }
                self.movies.extend(result.movies);
                self.current_page = result.current_page.max(page);
                self.total_pages = result.total_pages;
                self.total_results = result.total_results;
                self.error = None;
                debug!(
                    feed = self.kind.as_str(),
                    page = self.current_page,
                    total_pages = self.total_pages,
                    accumulated = self.movies.len(),
                    "Feed page loaded"
                );
                true
            }
            Envelope::Failure(msg) => {
                if !append {
                    self.movies.clear();
                    self.current_page = 0;
                    self.total_pages = 0;
                    self.total_results = None;
                }
                self.error = Some(msg);
                false
            }
        }
    }
}
