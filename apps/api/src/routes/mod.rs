pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::parser::handlers;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/emails/parse", post(handlers::handle_parse_email))
        .route(
            "/api/v1/emails/parse/batch",
            post(handlers::handle_parse_batch),
        )
        .fallback(not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::parser::EmailParser;

    fn app() -> Router {
        build_router(AppState::new(Config::default(), EmailParser::new().unwrap()))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_route() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_parse_route_round_trip() {
        let request = Request::post("/api/v1/emails/parse")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"id": "msg-1", "subject": "Application received", "body": "Name: Jane Doe\nPosition: Data Analyst\nCompany: Initech LLC"}"#,
            ))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["email_id"], "msg-1");
        assert_eq!(body["result"]["applicant_name"], "Jane Doe");
        assert_eq!(body["result"]["job_title"], "Data Analyst");
        assert_eq!(body["result"]["company_name"], "Initech LLC");
        assert!(body["result"]["job_id"].is_null());
        assert_eq!(body["needs_review"], false);
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let response = app()
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"]["code"], "NOT_FOUND");
    }
}
