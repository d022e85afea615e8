pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::auth::require_api_key;
use crate::extraction::handlers::{handle_parse, MAX_UPLOAD_BYTES};
use crate::recommendation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let ai = Router::new()
        .route(
            "/parse",
            post(handle_parse).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/generate/work-profile",
            post(handlers::handle_work_profile),
        )
        .route(
            "/generate/work-experience",
            post(handlers::handle_work_experience),
        )
        .route("/generate/education", post(handlers::handle_education))
        .route("/generate/skills", post(handlers::handle_skills));

    Router::new()
        .route("/", get(health::health_handler))
        .nest("/api/v1/ai", ai)
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::stub::{Reply, StubBackend};
    use crate::llm_client::usage_log::UsageLog;
    use crate::llm_client::GenerationClient;

    const KEY: &str = "server-secret";

    fn app(generator: Arc<StubBackend>, extractor: Arc<StubBackend>) -> Router {
        build_router(AppState {
            config: Config::for_tests(KEY),
            generator: GenerationClient::new(generator),
            extractor: GenerationClient::new(extractor),
            usage_log: UsageLog::disabled(),
        })
    }

    fn post_json(uri: &str, key: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(key) = key {
            builder = builder.header("x-api-key", key);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn work_profile_body() -> Value {
        json!({
            "name": "Ann",
            "role": "Engineer",
            "target_role": "Staff Engineer",
            "description": "built services"
        })
    }

    #[tokio::test]
    async fn test_work_profile_end_to_end() {
        let backend =
            StubBackend::text("```json\n{\"recommendations\":[\"Built scalable services\"]}\n```");
        let response = app(backend.clone(), StubBackend::text("{}"))
            .oneshot(post_json(
                "/api/v1/ai/generate/work-profile",
                Some(KEY),
                work_profile_body(),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"data": {"recommendations": ["Built scalable services"]}})
        );
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_or_wrong_key_is_401_without_backend_call() {
        let routes = [
            ("/api/v1/ai/generate/work-profile", work_profile_body()),
            ("/api/v1/ai/generate/work-experience", json!({"current_role": "Data Engineer"})),
            ("/api/v1/ai/generate/education", json!({"current_major": "Biology"})),
            ("/api/v1/ai/generate/skills", json!({"current_role": "Data Engineer"})),
        ];

        for (uri, body) in routes {
            for key in [None, Some("wrong-key")] {
                let backend = StubBackend::text("```json\n{}\n```");
                let response = app(backend.clone(), StubBackend::text("{}"))
                    .oneshot(post_json(uri, key, body.clone()))
                    .await
                    .unwrap();

                assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
                assert_eq!(body_json(response).await, json!({"message": "Invalid API key"}));
                assert_eq!(backend.calls(), 0, "{uri}");
            }
        }
    }

    #[tokio::test]
    async fn test_health_requires_key() {
        let router = app(StubBackend::text(""), StubBackend::text(""));
        let unauthenticated = router
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(unauthenticated.status(), StatusCode::UNAUTHORIZED);

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("x-api-key", KEY)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("The CVParser service is healthy"));
    }

    #[tokio::test]
    async fn test_short_name_is_422_and_skips_backend() {
        let backend = StubBackend::text("```json\n{}\n```");
        let mut body = work_profile_body();
        body["name"] = json!("An");

        let response = app(backend.clone(), StubBackend::text("{}"))
            .oneshot(post_json("/api/v1/ai/generate/work-profile", Some(KEY), body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["detail"][0]["loc"], json!(["body", "name"]));
        assert_eq!(body["detail"][0]["type"], "string_too_short");
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_field_is_422() {
        let backend = StubBackend::text("```json\n{}\n```");
        let response = app(backend.clone(), StubBackend::text("{}"))
            .oneshot(post_json("/api/v1/ai/generate/education", Some(KEY), json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert!(body["detail"][0]["msg"]
            .as_str()
            .unwrap()
            .contains("current_major"));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_answer_is_500_with_detail() {
        let backend = StubBackend::text("```json\n{\"recommendations\": [\n```");
        let response = app(backend, StubBackend::text("{}"))
            .oneshot(post_json(
                "/api/v1/ai/generate/education",
                Some(KEY),
                json!({"current_major": "Computer Science"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .starts_with("Malformed JSON in response block"));
    }

    #[tokio::test]
    async fn test_empty_generation_is_500() {
        let response = app(StubBackend::new(Reply::NoChoices), StubBackend::text("{}"))
            .oneshot(post_json(
                "/api/v1/ai/generate/skills",
                Some(KEY),
                json!({"current_role": "Data Engineer"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"detail": "error: no answer from AI LLM"})
        );
    }

    #[tokio::test]
    async fn test_blank_answer_is_500_not_empty_payload() {
        let backend = StubBackend::text("");
        let response = app(backend.clone(), StubBackend::text("{}"))
            .oneshot(post_json(
                "/api/v1/ai/generate/work-experience",
                Some(KEY),
                json!({"current_role": "Data Engineer"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"detail": "error: no answer from AI LLM"})
        );
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_returns_empty_payloads() {
        let router = app(StubBackend::new(Reply::TransportError), StubBackend::text("{}"));

        let response = router
            .clone()
            .oneshot(post_json(
                "/api/v1/ai/generate/work-experience",
                Some(KEY),
                json!({"current_role": "Data Engineer"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"data": {"recommendations": []}}));

        let response = router
            .oneshot(post_json(
                "/api/v1/ai/generate/skills",
                Some(KEY),
                json!({"current_role": "Data Engineer"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"data": {}}));
    }

    #[tokio::test]
    async fn test_skills_returns_mapping_as_data() {
        let backend = StubBackend::text(
            "```json\n{\"Technical Skills\": [\"Spark\"], \"Tools\": [\"dbt\"]}\n```",
        );
        let response = app(backend, StubBackend::text("{}"))
            .oneshot(post_json(
                "/api/v1/ai/generate/skills",
                Some(KEY),
                json!({"current_role": "Data Engineer"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"data": {"Technical Skills": ["Spark"], "Tools": ["dbt"]}})
        );
    }

    fn multipart_upload(key: Option<&str>, file_name: &str, contents: &str) -> Request<Body> {
        let boundary = "cvparser-test-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             {contents}\r\n\
             --{boundary}--\r\n"
        );
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/v1/ai/parse")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            );
        if let Some(key) = key {
            builder = builder.header("x-api-key", key);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn test_parse_upload_returns_record() {
        let extractor = StubBackend::text(
            "{\"name\": \"Ann Lee\", \"skills\": [\"Rust\", \"PostgreSQL\"]}",
        );
        let generator = StubBackend::text("");
        let response = app(generator.clone(), extractor.clone())
            .oneshot(multipart_upload(
                Some(KEY),
                "cv.txt",
                "Ann Lee\nSkills: Rust, PostgreSQL",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["name"], "Ann Lee");
        assert_eq!(body["data"]["skills"], json!(["Rust", "PostgreSQL"]));
        assert_eq!(extractor.calls(), 1);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_parse_without_valid_key_is_401_before_extraction() {
        for key in [None, Some("wrong-key")] {
            let extractor = StubBackend::text("{\"name\": \"Ann Lee\"}");
            let response = app(StubBackend::text(""), extractor.clone())
                .oneshot(multipart_upload(key, "cv.txt", "Ann Lee\nSkills: Rust"))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{key:?}");
            assert_eq!(body_json(response).await, json!({"message": "Invalid API key"}));
            assert_eq!(extractor.calls(), 0, "{key:?}");
        }
    }

    #[tokio::test]
    async fn test_parse_without_file_field_is_422() {
        let boundary = "cvparser-test-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"note\"\r\n\r\n\
             hello\r\n\
             --{boundary}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/ai/parse")
            .header("x-api-key", KEY)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app(StubBackend::text(""), StubBackend::text(""))
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body_json(response).await["detail"][0]["loc"],
            json!(["body", "file"])
        );
    }
}
