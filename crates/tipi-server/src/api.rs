use crate::metrics::{QUERIES_TOTAL, QUERY_BUILD_SECONDS};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use prometheus::{Encoder, TextEncoder};
use serde_json::json;
use std::sync::Arc;
use tipi_core::{FinalQuery, RawParameters, SearchError, SearchQueryBuilder};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

const RETRY_AFTER_SECS: &str = "5";

#[derive(Clone)]
pub struct AppState {
    pub builder: Arc<SearchQueryBuilder>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/initiatives/query", get(build_query))
        .route("/metrics", get(metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn metrics() -> impl IntoResponse {
    let mut buf = Vec::new();
    let encoder = TextEncoder::new();
    let _ = encoder.encode(&prometheus::gather(), &mut buf);
    (StatusCode::OK, String::from_utf8(buf).unwrap_or_default())
}

async fn build_query(
    State(app): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let params = RawParameters::from_pairs(pairs);
    let span = tracing::info_span!("build_query", request_id = %Uuid::new_v4());
    let timer = QUERY_BUILD_SECONDS.start_timer();
    let builder = app.builder.clone();
    // collaborators may block on their backing store
    let result = tokio::task::spawn_blocking(move || span.in_scope(|| builder.build(&params))).await;
    timer.observe_duration();
    match result {
        Ok(Ok(query)) => {
            QUERIES_TOTAL.with_label_values(&["ok"]).inc();
            (StatusCode::OK, Json(query_body(&query))).into_response()
        }
        Ok(Err(e)) => error_response(e),
        Err(join) => {
            tracing::error!(error = %join, "query builder task failed");
            error_response(SearchError::Internal(join.to_string()))
        }
    }
}

fn query_body(query: &FinalQuery) -> serde_json::Value {
    json!({
        "filter": query.filter_document(),
        "pagination": query.pagination(),
        "limit": query.limit(),
        "offset": query.offset(),
    })
}

fn error_response(e: SearchError) -> Response {
    let (status, outcome) = if e.is_client_error() {
        (StatusCode::BAD_REQUEST, "client_error")
    } else if e.is_retryable() {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "internal")
    };
    QUERIES_TOTAL.with_label_values(&[outcome]).inc();
    if status.is_server_error() {
        tracing::warn!(error = %e, "query build failed");
    } else {
        tracing::debug!(error = %e, "query rejected");
    }
    let body = match e.field() {
        Some(field) => json!({"error": e.to_string(), "field": field}),
        None => json!({"error": e.to_string()}),
    };
    if e.is_retryable() {
        return (
            status,
            [(header::RETRY_AFTER, RETRY_AFTER_SECS)],
            Json(body),
        )
            .into_response();
    }
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tipi_core::{BuilderConfig, FilterFragment, InitiativeTypeManager, LookupError};
    use tipi_storage::{InMemoryGroupDirectory, TableTypeManager};
    use tower::ServiceExt;

    struct Offline;
    impl InitiativeTypeManager for Offline {
        fn get_search_for(&self, _: &str) -> Result<FilterFragment, LookupError> {
            Err(LookupError::Unavailable("taxonomy store offline".into()))
        }
    }

    fn app() -> Router {
        let groups = InMemoryGroupDirectory::with_groups(["Grupo Parlamentario Socialista"]);
        let types = TableTypeManager::for_country("es").unwrap();
        let builder = SearchQueryBuilder::new(Arc::new(types), Arc::new(groups))
            .with_config(BuilderConfig::default());
        router(AppState {
            builder: Arc::new(builder),
        })
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Option<String>, serde_json::Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let retry = resp
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, retry, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_ok() {
        let resp = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn builds_filter_from_query_string() {
        let (status, _, body) = get_json(
            app(),
            "/v1/initiatives/query?title=pension&tags=fiscal&tags=empleo&subtopics=&page=2\
             &author=Grupo%20Parlamentario%20Socialista&startdate=2020-01-01&enddate=",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["filter"],
            json!({
                "title": {"$regex": "pension", "$options": "im"},
                "tags": {"$elemMatch": {"tag": {"$in": ["fiscal", "empleo"]}}},
                "author_parliamentarygroups": "Grupo Parlamentario Socialista",
                "updated": {"$gte": "2020-01-01"}
            })
        );
        assert_eq!(
            body["pagination"],
            json!({"style": "page", "page": 2, "per_page": 20})
        );
        assert_eq!(body["limit"], json!(20));
        assert_eq!(body["offset"], json!(20));
    }

    #[tokio::test]
    async fn type_uses_taxonomy() {
        let (status, _, body) = get_json(
            app(),
            "/v1/initiatives/query?type=Proposici%C3%B3n%20no%20de%20Ley",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["filter"],
            json!({"initiative_type": {"$in": ["161", "162"]}})
        );
    }

    #[tokio::test]
    async fn unknown_field_is_bad_request() {
        let (status, _, body) = get_json(app(), "/v1/initiatives/query?foo=bar").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], json!("foo"));
    }

    #[tokio::test]
    async fn malformed_page_is_bad_request() {
        let (status, _, body) = get_json(app(), "/v1/initiatives/query?page=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], json!("page"));
    }

    #[tokio::test]
    async fn collaborator_outage_is_retryable() {
        let builder = SearchQueryBuilder::new(
            Arc::new(Offline),
            Arc::new(InMemoryGroupDirectory::new()),
        );
        let app = router(AppState {
            builder: Arc::new(builder),
        });
        let (status, retry, body) = get_json(app, "/v1/initiatives/query?type=Pregunta").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(retry.as_deref(), Some(RETRY_AFTER_SECS));
        assert!(body["error"].as_str().unwrap().contains("unavailable"));
    }

    #[tokio::test]
    async fn metrics_exposed() {
        let app = app();
        let _ = get_json(app.clone(), "/v1/initiatives/query?title=x").await;
        let resp = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("tipi_queries_total"));
    }
}
