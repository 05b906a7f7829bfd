use serde::Deserialize;
use thiserror::Error;

const UNKNOWN_API_ERROR: &str = "Erro desconhecido na API";

/// Failure of a single outbound call to the movie API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Chave da API inválida ou expirada")]
    Unauthorized,
    #[error("Recurso não encontrado")]
    NotFound,
    #[error("Muitas requisições. Tente novamente em alguns minutos")]
    RateLimited,
    #[error("Erro interno do servidor")]
    ServerError,
    #[error("{0}")]
    Api(String),
    #[error("Erro de conexão. Verifique sua internet")]
    Network,
    #[error("Erro inesperado")]
    Unexpected,
}

impl ApiError {
    /// Maps a non-success HTTP status and its body onto the taxonomy.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 => ApiError::Unauthorized,
            404 => ApiError::NotFound,
            429 => ApiError::RateLimited,
            500 => ApiError::ServerError,
            _ => ApiError::Api(
                status_message(body).unwrap_or_else(|| UNKNOWN_API_ERROR.to_string()),
            ),
        }
    }
}

fn status_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        status_message: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.status_message)
        .filter(|m| !m.trim().is_empty())
}

/// Anything that can make a catalog operation fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("{0}")]
    InvalidArgument(&'static str),
    #[error(transparent)]
    Api(#[from] ApiError),
}
