use axum::{
    routing::{get, post},
    Router,
    extract::{Json, Path, State},
    http::StatusCode,
};
use tower_http::cors::{CorsLayer, Any};
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::api::response::{self, ApiResponse};
use crate::models::ScrapeJobSpec;
use crate::AppState;

type Reply<T> = (StatusCode, Json<ApiResponse<T>>);

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/jobs", get(list_jobs))
        .route("/api/jobs/:name", get(get_job))
        .route("/api/validate", post(validate_job))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn list_jobs(State(state): State<AppState>) -> Reply<Vec<ScrapeJobSpec>> {
    let jobs: Vec<ScrapeJobSpec> = state.jobs.list().into_iter().cloned().collect();
    info!("Listing {} job(s)", jobs.len());
    response::success(jobs)
}

async fn get_job(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Reply<ScrapeJobSpec>> {
    match state.jobs.get(&name) {
        Some(spec) => Ok(response::success(spec.clone())),
        None => {
            warn!("Unknown job requested: {}", name);
            Err(AppError::NotFound(format!("job '{}'", name)))
        }
    }
}

/// Parses and validates a YAML job document without registering it.
async fn validate_job(body: String) -> Result<Reply<ScrapeJobSpec>> {
    let spec = ScrapeJobSpec::from_yaml_str(&body)
        .and_then(|spec| spec.validate().map(|_| spec))
        .inspect_err(|err| warn!("Rejected job document: {}", err))?;

    info!(job = %spec.name, driver = %spec.driver, "Job document is valid");
    Ok(response::success(spec))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::JobRegistry;
    use crate::models::Driver;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn spec(name: &str) -> ScrapeJobSpec {
        ScrapeJobSpec {
            name: name.to_string(),
            url: "https://books.example.com/catalogue".to_string(),
            driver: Driver::Colly,
            item_container: "article.product_pod".to_string(),
            selectors: BTreeMap::from([("title".to_string(), "h3 a".to_string())]),
        }
    }

    fn state() -> AppState {
        AppState {
            jobs: Arc::new(JobRegistry::from_specs([spec("books")]).unwrap()),
        }
    }

    async fn send(router: Router, method: Method, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn job_named_validate_is_reachable() {
        let state = AppState {
            jobs: Arc::new(JobRegistry::from_specs([spec("validate")]).unwrap()),
        };

        let (status, body) = send(create_router(state), Method::GET, "/api/jobs/validate", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "validate");
    }

    #[tokio::test]
    async fn router_serves_validation_and_missing_jobs() {
        let yaml = "name: films\nurl: https://films.example.com\ndriver: chromedp\nitem_container: div.film\nselectors:\n  title: h2\n";
        let (status, body) = send(create_router(state()), Method::POST, "/api/validate", yaml).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["driver"], "chromedp");

        let (status, body) = send(create_router(state()), Method::GET, "/api/jobs/films", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["meta"]["status"], "error");
    }

    #[tokio::test]
    async fn lists_registered_jobs() {
        let (status, Json(body)) = list_jobs(State(state())).await;
        assert_eq!(status, StatusCode::OK);
        let jobs = body.data.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].name, "books");
        assert_eq!(body.meta.status, "success");
    }

    #[tokio::test]
    async fn gets_job_by_name() {
        let (status, Json(body)) = get_job(State(state()), Path("books".to_string()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.data.unwrap().driver, Driver::Colly);
    }

    #[tokio::test]
    async fn unknown_job_is_not_found() {
        let err = get_job(State(state()), Path("films".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn validates_job_document() {
        let yaml = "name: films\nurl: https://films.example.com\ndriver: chromedp\nitem_container: div.film\nselectors:\n  title: h2\n  year: span.year\n";
        let (status, Json(body)) = validate_job(yaml.to_string()).await.unwrap();
        assert_eq!(status, StatusCode::OK);
        let spec = body.data.unwrap();
        assert_eq!(spec.driver, Driver::Chromedp);
        assert_eq!(spec.selectors["year"], "span.year");
    }

    #[tokio::test]
    async fn rejects_malformed_and_invalid_documents() {
        let err = validate_job("name: films\n".to_string()).await.unwrap_err();
        assert!(matches!(err, AppError::ConfigParseError(_)));
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let yaml = "name: films\nurl: mailto:someone@example.com\ndriver: colly\nitem_container: div\nselectors:\n  title: h2\n";
        let err = validate_job(yaml.to_string()).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
