use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Mutex;

use crate::error::ApiError;
use crate::tmdb::TmdbApi;

type Responder = Box<dyn Fn(&RecordedCall) -> Result<Value, ApiError> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl RecordedCall {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

pub struct FakeTmdb {
    responder: Responder,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeTmdb {
    pub fn new(
        responder: impl Fn(&RecordedCall) -> Result<Value, ApiError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn always(response: Result<Value, ApiError>) -> Self {
        Self::new(move |_| response.clone())
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TmdbApi for FakeTmdb {
    async fn request(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        let call = RecordedCall {
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        };
        let response = (self.responder)(&call);
        self.calls.lock().unwrap().push(call);
        response
    }
}

pub fn raw_movie(id: u64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "overview": format!("{title} overview"),
        "release_date": "2024-03-01",
        "vote_average": 7.3,
        "vote_count": 100,
        "popularity": 12.5,
        "adult": false,
        "genre_ids": [28],
        "poster_path": format!("/poster{id}.jpg"),
        "backdrop_path": null,
        "original_language": "en"
    })
}

pub fn page_json(page: u32, total_pages: u32, results: Vec<Value>) -> Value {
    json!({
        "page": page,
        "results": results,
        "total_pages": total_pages,
        "total_results": total_pages as u64 * 20
    })
}
