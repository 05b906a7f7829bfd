use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use cinestore::app::{build_router, AppState};
use cinestore::error::ApiError;
use cinestore::tmdb::TmdbApi;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

struct FakeTmdb {
    failure: Option<ApiError>,
    calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl FakeTmdb {
    fn ok() -> Self {
        Self {
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing(err: ApiError) -> Self {
        Self {
            failure: Some(err),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn paths(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(p, _)| p.clone())
            .collect()
    }
}

fn movie(id: u64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "release_date": "2010-07-16",
        "vote_average": 8.4,
        "poster_path": "/inception.jpg",
        "genre_ids": [28, 878]
    })
}

#[async_trait::async_trait]
impl TmdbApi for FakeTmdb {
    async fn request(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        self.calls.lock().unwrap().push((
            path.to_string(),
            query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        ));
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        let page = query
            .iter()
            .find(|(k, _)| *k == "page")
            .map(|(_, v)| v.parse::<u32>().unwrap())
            .unwrap_or(1);
        match path {
            "/genre/movie/list" => Ok(json!({
                "genres": [{ "id": 28, "name": "Ação" }, { "id": 99, "name": "Documentário" }]
            })),
            "/movie/27205" => {
                let mut details = movie(27205, "A Origem");
                details["runtime"] = json!(148);
                details["credits"] = json!({
                    "cast": [{ "id": 6193, "name": "Leonardo DiCaprio", "order": 0 }],
                    "crew": []
                });
                Ok(details)
            }
            _ => Ok(json!({
                "page": page,
                "results": [movie(27205, "A Origem"), null, movie(157336, "Interestelar")],
                "total_pages": 3,
                "total_results": 60
            })),
        }
    }
}

fn app_with(tmdb: Arc<FakeTmdb>) -> Router {
    build_router(AppState::new(tmdb, "BR"))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let res = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_is_ok() {
    let res = app_with(Arc::new(FakeTmdb::ok()))
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn lists_popular_movies_formatted() {
    let tmdb = Arc::new(FakeTmdb::ok());
    let (status, body) = get_json(app_with(tmdb.clone()), "/api/movies?page=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["currentPage"], 2);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(body["totalResults"], 60);
    let movies = body["movies"].as_array().unwrap();
    assert_eq!(movies.len(), 2);
    assert_eq!(movies[0]["title"], "A Origem");
    assert_eq!(movies[0]["year"], 2010);
    assert_eq!(movies[0]["rating"], "8.4");
    assert_eq!(movies[0]["formattedPrice"], "R$ 29,90");
    assert_eq!(
        movies[0]["posterUrl"],
        "https://image.tmdb.org/t/p/w500/inception.jpg"
    );
    assert_eq!(tmdb.paths(), vec!["/movie/popular"]);
}

#[tokio::test]
async fn unknown_type_falls_back_to_popular() {
    let tmdb = Arc::new(FakeTmdb::ok());
    let (_, body) = get_json(app_with(tmdb.clone()), "/api/movies?type=trending").await;
    assert_eq!(body["success"], true);
    assert_eq!(tmdb.paths(), vec!["/movie/popular"]);
}

#[tokio::test]
async fn short_search_fails_without_calling_tmdb() {
    let tmdb = Arc::new(FakeTmdb::ok());
    let (status, body) = get_json(app_with(tmdb.clone()), "/api/movies?type=search&query=a").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": "Digite pelo menos 2 caracteres para buscar",
            "data": null
        })
    );
    assert!(tmdb.paths().is_empty());
}

#[tokio::test]
async fn genre_feed_uses_discover() {
    let tmdb = Arc::new(FakeTmdb::ok());
    let (_, body) = get_json(
        app_with(tmdb.clone()),
        "/api/movies?type=genre&genreId=28&page=1",
    )
    .await;
    assert_eq!(body["success"], true);
    assert_eq!(tmdb.paths(), vec!["/discover/movie"]);
}

#[tokio::test]
async fn rate_limit_surfaces_as_failure_envelope() {
    let tmdb = Arc::new(FakeTmdb::failing(ApiError::RateLimited));
    let (status, body) = get_json(app_with(tmdb), "/api/movies?type=now_playing").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "Muitas requisições. Tente novamente em alguns minutos"
    );
    assert_eq!(body["data"], Value::Null);
}

#[tokio::test]
async fn lists_genres_with_icons() {
    let (_, body) = get_json(app_with(Arc::new(FakeTmdb::ok())), "/api/genres").await;
    assert_eq!(body["success"], true);
    assert_eq!(
        body["genres"],
        json!([
            { "id": 28, "name": "Ação", "movieCount": 0, "icon": "🎬" },
            { "id": 99, "name": "Documentário", "movieCount": 0, "icon": "📺" }
        ])
    );
}

#[tokio::test]
async fn movie_details_are_formatted() {
    let (_, body) = get_json(app_with(Arc::new(FakeTmdb::ok())), "/api/movies/27205").await;
    assert_eq!(body["success"], true);
    let movie = &body["movie"];
    assert_eq!(movie["title"], "A Origem");
    assert_eq!(movie["formattedDuration"], "2h 28min");
    assert_eq!(movie["cast"][0]["name"], "Leonardo DiCaprio");
    assert_eq!(movie["ageRating"], "Livre");
}

#[tokio::test]
async fn zero_movie_id_is_rejected() {
    let tmdb = Arc::new(FakeTmdb::ok());
    let (_, body) = get_json(app_with(tmdb.clone()), "/api/movies/0").await;
    assert_eq!(body["error"], "ID do filme é obrigatório");
    assert!(tmdb.paths().is_empty());
}

#[tokio::test]
async fn related_movies_routes() {
    let tmdb = Arc::new(FakeTmdb::ok());
    let (_, body) = get_json(
        app_with(tmdb.clone()),
        "/api/movies/27205/recommendations?page=2",
    )
    .await;
    assert_eq!(body["currentPage"], 2);
    let (_, body) = get_json(app_with(tmdb.clone()), "/api/movies/27205/similar").await;
    assert_eq!(body["movies"].as_array().unwrap().len(), 2);
    assert_eq!(
        tmdb.paths(),
        vec!["/movie/27205/recommendations", "/movie/27205/similar"]
    );
}

#[tokio::test]
async fn empty_genre_id_is_rejected_in_envelope() {
    let tmdb = Arc::new(FakeTmdb::ok());
    let (status, body) = get_json(app_with(tmdb.clone()), "/api/movies?type=genre&genreId=").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": "ID do gênero é obrigatório",
            "data": null
        })
    );
    assert!(tmdb.paths().is_empty());
}

#[tokio::test]
async fn non_numeric_page_falls_back_to_first() {
    let tmdb = Arc::new(FakeTmdb::ok());
    let (status, body) = get_json(app_with(tmdb.clone()), "/api/movies?page=abc").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["currentPage"], 1);
    assert_eq!(tmdb.paths(), vec!["/movie/popular"]);
}

#[tokio::test]
async fn non_numeric_movie_id_is_rejected_in_envelope() {
    let tmdb = Arc::new(FakeTmdb::ok());
    for uri in [
        "/api/movies/abc",
        "/api/movies/abc/similar",
        "/api/movies/abc/recommendations?page=x",
    ] {
        let (status, body) = get_json(app_with(tmdb.clone()), uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["success"], false, "{uri}");
        assert_eq!(body["error"], "ID do filme é obrigatório", "{uri}");
    }
    assert!(tmdb.paths().is_empty());
}
