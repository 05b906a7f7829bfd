use serde_json::Value;
use tracing::warn;

use crate::catalog::{Catalog, Envelope, GenreList, MovieItem, MoviePage};
use crate::error::ApiError;
use crate::format::{self, Genre, Movie, MovieDetails};

/// Which listing a movie feed shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedKind {
    #[default]
    Popular,
    NowPlaying,
    Search,
    Genre,
}

impl FeedKind {
    /// Unknown names fall back to the popular listing.
    pub fn from_name(name: &str) -> Self {
        match name {
            "now_playing" => FeedKind::NowPlaying,
            "search" => FeedKind::Search,
            "genre" => FeedKind::Genre,
            _ => FeedKind::Popular,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKind::Popular => "popular",
            FeedKind::NowPlaying => "now_playing",
            FeedKind::Search => "search",
            FeedKind::Genre => "genre",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedOptions {
    pub query: Option<String>,
    pub page: u32,
    pub genre_id: Option<u64>,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            query: None,
            page: 1,
            genre_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Related {
    Recommendations,
    Similar,
}

/// Ready-to-render listings: catalog results passed through the formatters.
#[derive(Clone)]
pub struct Storefront {
    catalog: Catalog,
}

impl Storefront {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub async fn formatted_movies(
        &self,
        kind: FeedKind,
        options: &FeedOptions,
    ) -> Envelope<MoviePage<Movie>> {
        let page = options.page;
        let envelope = match kind {
            FeedKind::Popular => self.catalog.popular(page).await,
            FeedKind::NowPlaying => self.catalog.now_playing(page).await,
            FeedKind::Search => {
                let query = options.query.as_deref().unwrap_or_default();
                self.catalog.search(query, page).await
            }
            FeedKind::Genre => {
                let genre_id = options.genre_id.unwrap_or_default();
                self.catalog.by_genre(genre_id, page).await
            }
        };
        envelope.map(format_movies)
    }

    pub async fn formatted_genres(&self) -> Envelope<GenreList<Genre>> {
        self.catalog.genres().await.map(|list| GenreList {
            genres: list.genres.iter().filter_map(format::format_genre).collect(),
        })
    }

    pub async fn formatted_movie_details(
        &self,
        movie_id: u64,
    ) -> Envelope<MovieItem<MovieDetails>> {
        match self.catalog.details(movie_id).await {
            Envelope::Success(item) => match format::format_movie_details(&item.movie) {
                Some(movie) => Envelope::Success(MovieItem { movie }),
                None => {
                    warn!(movie_id, "Details payload could not be formatted");
                    Envelope::Failure(ApiError::Unexpected.to_string())
                }
            },
            Envelope::Failure(msg) => Envelope::Failure(msg),
        }
    }

    pub async fn formatted_related(
        &self,
        movie_id: u64,
        related: Related,
        page: u32,
    ) -> Envelope<MoviePage<Movie>> {
        let envelope = match related {
            Related::Recommendations => self.catalog.recommendations(movie_id, page).await,
            Related::Similar => self.catalog.similar(movie_id, page).await,
        };
        envelope.map(format_movies)
    }
}

fn format_movies(page: MoviePage<Value>) -> MoviePage<Movie> {
    page.filter_map(|raw| format::format_movie(&raw))
}
