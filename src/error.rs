use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::model::EntityKind;

/// A single request to the upstream HR API failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("malformed {kind} payload: {source}")]
    Decode {
        kind: EntityKind,
        #[source]
        source: serde_json::Error,
    },
}

/// Storage failure inside the local cache. Never leaves the cache module.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("could not encode cache entry {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not write cache entry {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of a whole aggregation cycle. This is the only error the engine returns;
/// per-record problems (orphans, bad dates, cache misses) degrade silently.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to load {kind}: {source}")]
    Load {
        kind: EntityKind,
        #[source]
        source: FetchError,
    },
}

impl EngineError {
    pub fn kind(&self) -> EntityKind {
        match self {
            EngineError::Load { kind, .. } => *kind,
        }
    }
}

impl ResponseError for EngineError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_GATEWAY
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": "Failed to load dashboard data",
            "details": self.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_error_maps_to_bad_gateway() {
        let err = EngineError::Load {
            kind: EntityKind::Incomes,
            source: FetchError::Status {
                url: "http://hr.local/incomes?limit=100&page=2".into(),
                status: 503,
            },
        };

        assert_eq!(err.kind(), EntityKind::Incomes);
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(err.to_string().starts_with("failed to load incomes"));
    }
}
