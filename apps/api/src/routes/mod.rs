pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::career::handlers as career;
use crate::chat::handle_chat;
use crate::events::handle_log_event;
use crate::interview::handlers as interview;
use crate::mentor::handlers as mentor;
use crate::profile::handlers as profile;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Mentor agent (authenticated)
        .route("/api/mentor/respond", post(mentor::handle_respond))
        .route("/api/mentor/reflect", post(mentor::handle_reflect))
        .route("/api/mentor/trajectory", post(mentor::handle_trajectory))
        .route("/api/mentor/memories", get(mentor::handle_list_memories))
        // Profile intake
        .route("/api/parse-resume", post(profile::handle_parse_resume))
        .route(
            "/api/parse-resume/upload",
            post(profile::handle_upload_resume),
        )
        .route(
            "/api/onboarding/extract",
            post(profile::handle_onboarding_extract),
        )
        .route("/api/events/log", post(handle_log_event))
        // Stateless helpers
        .route("/api/chat", post(handle_chat))
        .route(
            "/api/interview/generate-questions",
            post(interview::handle_generate_questions),
        )
        .route(
            "/api/interview/evaluate-answer",
            post(interview::handle_evaluate_answer),
        )
        .route(
            "/api/career/analyze-patterns",
            post(career::handle_analyze_patterns),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::models::memory::MemoryMetadata;
    use crate::test_support::{record_at, test_state, InMemoryStore, ScriptedLlm, TEST_TOKEN};

    fn app(store: Arc<InMemoryStore>, llm: Arc<ScriptedLlm>) -> Router {
        build_router(test_state(store, llm))
    }

    fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(Default::default(), Default::default())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "mentor-api");
    }

    #[tokio::test]
    async fn test_mentor_routes_require_bearer_token() {
        let store = Arc::new(InMemoryStore::default());
        let llm = Arc::new(ScriptedLlm::replying("unused"));

        for uri in ["/api/mentor/respond", "/api/mentor/trajectory"] {
            let response = app(store.clone(), llm.clone())
                .oneshot(post_json(uri, None, json!({"message": "hi"})))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            let body = json_body(response).await;
            assert_eq!(body["error"]["message"], "Unauthorized - please sign in");
        }

        let response = app(store.clone(), llm.clone())
            .oneshot(post_json(
                "/api/mentor/reflect",
                Some("forged"),
                json!({"message": "bad", "previousAdvice": "x"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        assert!(store.records().is_empty());
        assert!(llm.calls().is_empty());
    }

    #[tokio::test]
    async fn test_respond_round_trip() {
        let store = Arc::new(InMemoryStore::default());
        let llm = Arc::new(ScriptedLlm::replying("Ship a side project this month."));

        let response = app(store.clone(), llm)
            .oneshot(post_json(
                "/api/mentor/respond",
                Some(TEST_TOKEN),
                json!({"message": "How do I stand out?"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(
            body,
            json!({"response": "Ship a side project this month.", "success": true})
        );
        assert_eq!(store.records().len(), 2);
    }

    #[tokio::test]
    async fn test_respond_passes_message_through_untrimmed() {
        let raw = "  Line one\n\n";
        let store = Arc::new(InMemoryStore::default());
        let llm = Arc::new(ScriptedLlm::replying("Noted."));

        let response = app(store.clone(), llm.clone())
            .oneshot(post_json(
                "/api/mentor/respond",
                Some(TEST_TOKEN),
                json!({"message": raw}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let calls = llm.calls();
        let (_, messages) = &calls[0];
        assert_eq!(messages[1].content, raw);

        let inputs = store.records_of("user_input");
        assert_eq!(inputs[0].content, raw);
        assert_eq!(
            store.records_of("mentor_advice")[0].metadata,
            Some(MemoryMetadata::MentorAdvice {
                context: Some("mentor_conversation".into()),
                user_input: Some(raw.into()),
            })
        );
    }

    #[tokio::test]
    async fn test_blank_message_is_bad_request() {
        let llm = Arc::new(ScriptedLlm::replying("unused"));
        let response = app(Default::default(), llm.clone())
            .oneshot(post_json(
                "/api/mentor/respond",
                Some(TEST_TOKEN),
                json!({"message": "  "}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
        assert!(llm.calls().is_empty());
    }

    #[tokio::test]
    async fn test_reflect_requires_previous_advice() {
        let response = app(Default::default(), Default::default())
            .oneshot(post_json(
                "/api/mentor/reflect",
                Some(TEST_TOKEN),
                json!({"message": "Too long", "previousAdvice": ""}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_memories_listed_newest_first_with_limit() {
        let store = Arc::new(InMemoryStore::with_records(vec![
            record_at("first", Some(MemoryMetadata::UserInput { context: None }), 1),
            record_at("second", Some(MemoryMetadata::UserInput { context: None }), 2),
            record_at("third", None, 3),
        ]));

        let response = app(store, Default::default())
            .oneshot(
                Request::get("/api/mentor/memories?limit=2")
                    .header(header::AUTHORIZATION, format!("Bearer {TEST_TOKEN}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let memories = body["memories"].as_array().unwrap();
        assert_eq!(memories.len(), 2);
        assert_eq!(memories[0]["content"], "third");
        assert_eq!(memories[0]["metadata"], Value::Null);
        assert_eq!(memories[1]["metadata"]["type"], "user_input");
    }

    #[tokio::test]
    async fn test_trajectory_failure_shape_over_http() {
        let llm = Arc::new(ScriptedLlm::replying("No structured answer today."));
        let response = app(Default::default(), llm)
            .oneshot(post_json(
                "/api/mentor/trajectory",
                Some(TEST_TOKEN),
                json!({"message": "Startup or big tech?"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["trajectories"], json!([]));
        assert_eq!(body["rawResponse"], "No structured answer today.");
        assert!(body.get("decisionContext").is_none());
    }

    #[tokio::test]
    async fn test_evaluate_answer_fallback_is_ok() {
        let llm = Arc::new(ScriptedLlm::replying("Nice answer!"));
        let response = app(Default::default(), llm)
            .oneshot(post_json(
                "/api/interview/evaluate-answer",
                None,
                json!({"question": "Why us?", "answer": "Because of the mission."}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["score"], 70);
        assert_eq!(body["summary"], "AI evaluation is processing. Your answer was recorded.");
    }

    #[tokio::test]
    async fn test_parse_resume_anonymous_is_not_stored() {
        let llm = Arc::new(ScriptedLlm::replying(
            r#"{"fullName": "Jane Doe", "skills": ["Rust"]}"#,
        ));
        let response = app(Default::default(), llm)
            .oneshot(post_json(
                "/api/parse-resume",
                None,
                json!({"resumeText": "Jane Doe - Rust engineer, 5 years"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["fullName"], "Jane Doe");
        assert_eq!(body["stored"], false);
    }

    #[tokio::test]
    async fn test_parse_resume_rejects_short_text() {
        let response = app(Default::default(), Default::default())
            .oneshot(post_json("/api/parse-resume", None, json!({"resumeText": "short"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analyze_patterns_computes_when_reply_is_prose() {
        let llm = Arc::new(ScriptedLlm::replying("Keep at it!"));
        let response = app(Default::default(), llm)
            .oneshot(post_json(
                "/api/career/analyze-patterns",
                None,
                json!({
                    "interviewHistory": [{"score": 75}],
                    "applicationHistory": [{"outcome": "offer"}, {"outcome": "rejected"}],
                    "userProfile": {"skills": ["Python"], "targetRoles": ["Data Analyst"], "experience": "2 years"}
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let analysis = &body["analysis"];
        assert!(analysis["summary"]
            .as_str()
            .unwrap()
            .contains("You've received 1 offer(s) with a 50% acceptance rate."));
        assert_eq!(analysis["rootCauses"].as_array().unwrap().len(), 3);
        assert_eq!(analysis["actionPlan"]["thisMonth"][0], "✓ Complete 9 mock interviews");
    }

    #[tokio::test]
    async fn test_event_log_requires_sign_in() {
        let response = app(Default::default(), Default::default())
            .oneshot(post_json(
                "/api/events/log",
                None,
                json!({"category": "interview", "action": "started"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_event_log_rejects_non_string_action() {
        let response = app(Default::default(), Default::default())
            .oneshot(post_json(
                "/api/events/log",
                Some(TEST_TOKEN),
                json!({"category": "interview", "action": 7}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"]["message"],
            "category and action are required strings"
        );
    }
}
