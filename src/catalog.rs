use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use crate::config::DEFAULT_REGION;
use crate::error::{ApiError, CatalogError};
use crate::tmdb::TmdbApi;

pub const MIN_QUERY_CHARS: usize = 2;
const SEARCH_TOO_SHORT: &str = "Digite pelo menos 2 caracteres para buscar";
const GENRE_REQUIRED: &str = "ID do gênero é obrigatório";
const MOVIE_REQUIRED: &str = "ID do filme é obrigatório";
const DETAIL_APPENDS: &str = "credits,videos,reviews";

/// Outcome of one catalog operation. Failures carry only the user-facing message.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<P> {
    Success(P),
    Failure(String),
}

impl<P> Envelope<P> {
    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success(_))
    }

    pub fn payload(&self) -> Option<&P> {
        match self {
            Envelope::Success(p) => Some(p),
            Envelope::Failure(_) => None,
        }
    }

    pub fn into_payload(self) -> Option<P> {
        match self {
            Envelope::Success(p) => Some(p),
            Envelope::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Envelope::Success(_) => None,
            Envelope::Failure(msg) => Some(msg),
        }
    }

    /// Transforms the payload; failures pass through untouched.
    pub fn map<Q>(self, f: impl FnOnce(P) -> Q) -> Envelope<Q> {
        match self {
            Envelope::Success(p) => Envelope::Success(f(p)),
            Envelope::Failure(msg) => Envelope::Failure(msg),
        }
    }
}

impl<P> From<Result<P, CatalogError>> for Envelope<P> {
    fn from(result: Result<P, CatalogError>) -> Self {
        match result {
            Ok(p) => Envelope::Success(p),
            Err(e) => Envelope::Failure(e.to_string()),
        }
    }
}

// `{"success":true, ...payload}` or `{"success":false,"error":"...","data":null}`
impl<P: Serialize> Serialize for Envelope<P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Success<'a, P> {
            success: bool,
            #[serde(flatten)]
            payload: &'a P,
        }

        #[derive(Serialize)]
        struct Failure<'a> {
            success: bool,
            error: &'a str,
            data: Option<()>,
        }

        match self {
            Envelope::Success(payload) => Success {
                success: true,
                payload,
            }
            .serialize(serializer),
            Envelope::Failure(error) => Failure {
                success: false,
                error: error.as_str(),
                data: None,
            }
            .serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviePage<T> {
    pub movies: Vec<T>,
    pub current_page: u32,
    pub total_pages: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_results: Option<u64>,
}

impl<T> MoviePage<T> {
    /// Keeps pagination, replaces the list with the `Some` results of `f`.
    pub fn filter_map<U>(self, f: impl FnMut(T) -> Option<U>) -> MoviePage<U> {
        MoviePage {
            movies: self.movies.into_iter().filter_map(f).collect(),
            current_page: self.current_page,
            total_pages: self.total_pages,
            total_results: self.total_results,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreList<T> {
    pub genres: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieItem<T> {
    pub movie: T,
}

#[derive(Debug, Deserialize)]
struct PagedResponse {
    page: Option<u32>,
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    total_pages: u32,
    total_results: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct GenreResponse {
    #[serde(default)]
    genres: Vec<Value>,
}

#[derive(Clone)]
pub struct Catalog {
    api: Arc<dyn TmdbApi>,
    region: String,
}

impl Catalog {
    pub fn new(api: Arc<dyn TmdbApi>) -> Self {
        Self {
            api,
            region: DEFAULT_REGION.to_string(),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub async fn popular(&self, page: u32) -> Envelope<MoviePage<Value>> {
        let query = self.paged(page);
        settle("popular", self.fetch_page("/movie/popular", page, query).await)
    }

    pub async fn now_playing(&self, page: u32) -> Envelope<MoviePage<Value>> {
        let query = self.paged(page);
        settle(
            "now_playing",
            self.fetch_page("/movie/now_playing", page, query).await,
        )
    }

    pub async fn search(&self, query: &str, page: u32) -> Envelope<MoviePage<Value>> {
        settle("search", self.try_search(query, page).await)
    }

    pub async fn by_genre(&self, genre_id: u64, page: u32) -> Envelope<MoviePage<Value>> {
        settle("by_genre", self.try_by_genre(genre_id, page).await)
    }

    pub async fn details(&self, movie_id: u64) -> Envelope<MovieItem<Value>> {
        settle("details", self.try_details(movie_id).await)
    }

    pub async fn recommendations(&self, movie_id: u64, page: u32) -> Envelope<MoviePage<Value>> {
        settle(
            "recommendations",
            self.try_related(movie_id, "recommendations", page).await,
        )
    }

    pub async fn similar(&self, movie_id: u64, page: u32) -> Envelope<MoviePage<Value>> {
        settle("similar", self.try_related(movie_id, "similar", page).await)
    }

    pub async fn genres(&self) -> Envelope<GenreList<Value>> {
        settle("genres", self.try_genres().await)
    }

    async fn try_search(&self, query: &str, page: u32) -> Result<MoviePage<Value>, CatalogError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Err(CatalogError::InvalidArgument(SEARCH_TOO_SHORT));
        }
        let mut params = vec![("query", query.to_string())];
        params.extend(self.paged(page));
        params.push(("include_adult", "false".to_string()));
        self.fetch_page("/search/movie", page, params).await
    }

    async fn try_by_genre(
        &self,
        genre_id: u64,
        page: u32,
    ) -> Result<MoviePage<Value>, CatalogError> {
        let genre_id = require_id(genre_id, GENRE_REQUIRED)?;
        let mut params = vec![("with_genres", genre_id.to_string())];
        params.extend(self.paged(page));
        params.push(("sort_by", "popularity.desc".to_string()));
        self.fetch_page("/discover/movie", page, params).await
    }

    async fn try_details(&self, movie_id: u64) -> Result<MovieItem<Value>, CatalogError> {
        let movie_id = require_id(movie_id, MOVIE_REQUIRED)?;
        let movie = self
            .api
            .request(
                &format!("/movie/{movie_id}"),
                &[("append_to_response", DETAIL_APPENDS.to_string())],
            )
            .await?;
        Ok(MovieItem { movie })
    }

    async fn try_related(
        &self,
        movie_id: u64,
        relation: &str,
        page: u32,
    ) -> Result<MoviePage<Value>, CatalogError> {
        let movie_id = require_id(movie_id, MOVIE_REQUIRED)?;
        let query = self.paged(page);
        self.fetch_page(&format!("/movie/{movie_id}/{relation}"), page, query)
            .await
    }

    async fn try_genres(&self) -> Result<GenreList<Value>, CatalogError> {
        let raw = self.api.request("/genre/movie/list", &[]).await?;
        let parsed: GenreResponse = decode("/genre/movie/list", raw)?;
        Ok(GenreList {
            genres: parsed.genres,
        })
    }

    async fn fetch_page(
        &self,
        path: &str,
        page: u32,
        query: Vec<(&str, String)>,
    ) -> Result<MoviePage<Value>, CatalogError> {
        let raw = self.api.request(path, &query).await?;
        let parsed: PagedResponse = decode(path, raw)?;
        Ok(MoviePage {
            movies: parsed.results,
            current_page: parsed.page.unwrap_or(page.max(1)),
            total_pages: parsed.total_pages,
            total_results: parsed.total_results,
        })
    }

    fn paged(&self, page: u32) -> Vec<(&'static str, String)> {
        vec![
            ("page", page.max(1).to_string()),
            ("region", self.region.clone()),
        ]
    }
}

fn require_id(id: u64, message: &'static str) -> Result<u64, CatalogError> {
    if id == 0 {
        return Err(CatalogError::InvalidArgument(message));
    }
    Ok(id)
}

fn decode<T: for<'de> Deserialize<'de>>(path: &str, raw: Value) -> Result<T, CatalogError> {
    serde_json::from_value(raw).map_err(|e| {
        warn!("Unexpected TMDB payload for {}: {}", path, e);
        CatalogError::Api(ApiError::Unexpected)
    })
}

fn settle<P>(operation: &str, result: Result<P, CatalogError>) -> Envelope<P> {
    if let Err(e) = &result {
        warn!(operation, error = %e, "Catalog request failed");
    }
    result.into()
}
