use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::bandit::{ArmId, BanditPool};
use crate::embedding::MockEmbedder;
use crate::engine::MatchEngine;
use crate::gateway::error::ErrorResponse;
use crate::gateway::{AFFINITY_STATUS_HEADER, HandlerState, create_router_with_state};
use crate::lifecycle::{LifecycleConfig, LifecycleManager};
use crate::storage::MockArmStore;

struct TestApp {
    router: Router,
    engine: Arc<MatchEngine>,
    lifecycle: Arc<LifecycleManager>,
    store: Arc<MockArmStore>,
    _dir: TempDir,
}

fn setup_test_app() -> TestApp {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let embedder = MockEmbedder::new();
    embedder.insert("Python", vec![1.0, 0.0]);
    embedder.insert("Go", vec![0.0, 1.0]);

    let pool = Arc::new(BanditPool::new());
    let engine = Arc::new(MatchEngine::new(Arc::new(embedder)).with_pool(Arc::clone(&pool)));
    let store = Arc::new(MockArmStore::new());
    let lifecycle = Arc::new(LifecycleManager::new(
        LifecycleConfig::for_testing("test"),
        pool,
        store.clone(),
    ));

    let state = HandlerState::new(
        Arc::clone(&engine),
        Some(Arc::clone(&lifecycle)),
        dir.path().to_path_buf(),
    );

    TestApp {
        router: create_router_with_state(state),
        engine,
        lifecycle,
        store,
        _dir: dir,
    }
}

async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = router.clone().oneshot(request).await.expect("Request failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_healthz() {
        let app = setup_test_app();
        let response = app
            .router
            .clone()
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(AFFINITY_STATUS_HEADER).unwrap(),
            "healthy"
        );
    }

    #[tokio::test]
    async fn test_ready_reports_components() {
        let app = setup_test_app();

        let (status, body) = send(&app.router, "GET", "/ready", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["components"]["durability"], "ready");
        assert_eq!(body["components"]["embedder_mode"], "mock");
    }

    #[tokio::test]
    async fn test_ready_reports_degraded_durability() {
        let app = setup_test_app();
        app.store.fail_next_saves(10);
        app.lifecycle.dehydrate().await.unwrap();

        let (status, body) = send(&app.router, "GET", "/ready", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["components"]["durability"], "degraded");
    }

    #[tokio::test]
    async fn test_ready_unavailable_after_shutdown() {
        let app = setup_test_app();
        app.lifecycle.shutdown().await.unwrap();

        let (status, _) = send(&app.router, "GET", "/ready", None).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}

mod match_tests {
    use super::*;

    #[tokio::test]
    async fn test_match_scores_profiles() {
        let app = setup_test_app();
        let body = serde_json::json!({
            "candidate": {"name": "ada", "attributes": {"skills": ["Python", "Go"]}},
            "role": {"name": "backend", "attributes": {"skills": ["Python"], "education": []}}
        });

        let (status, json) = send(&app.router, "POST", "/v1/match", Some(body)).await;

        assert_eq!(status, StatusCode::OK);
        let value = json["score"]["value"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&value));
        assert!((value - 0.5).abs() < 1e-9);
        assert!(json["score"]["breakdown"]["skills"]["counted"].as_bool().unwrap());
        assert!(json["report"]["dropped"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_match_rejects_bad_schema() {
        let app = setup_test_app();
        let body = serde_json::json!({"candidate": "nope"});

        let (status, json) = send(&app.router, "POST", "/v1/match", Some(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ErrorResponse = serde_json::from_value(json).unwrap();
        assert_eq!(error.code, 400);
        assert!(error.error.contains("Invalid request schema"));
    }
}

mod arm_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get_arm() {
        let app = setup_test_app();
        let body = serde_json::json!({"id": "cp:c1:p1", "similarity": 0.8});

        let (status, json) = send(&app.router, "POST", "/v1/arms", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert!((json["alpha"].as_f64().unwrap() - 9.0).abs() < 1e-9);
        assert!((json["beta"].as_f64().unwrap() - 3.0).abs() < 1e-9);

        let (status, json) = send(&app.router, "GET", "/v1/arms/cp:c1:p1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["id"], "cp:c1:p1");
        assert_eq!(json["pulls"], 0);
    }

    #[tokio::test]
    async fn test_create_arm_clamps_out_of_range_similarity() {
        let app = setup_test_app();

        let body = serde_json::json!({"id": "over", "similarity": 1.7});
        let (status, over) = send(&app.router, "POST", "/v1/arms", Some(body)).await;
        assert_eq!(status, StatusCode::OK);

        let body = serde_json::json!({"id": "top", "similarity": 1.0});
        let (_, top) = send(&app.router, "POST", "/v1/arms", Some(body)).await;

        assert_eq!(over["alpha"], top["alpha"]);
        assert_eq!(over["beta"], top["beta"]);

        let body = serde_json::json!({"id": "under", "similarity": -0.4});
        let (status, under) = send(&app.router, "POST", "/v1/arms", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(under["alpha"], 1.0);
        assert_eq!(app.engine.pool().len(), 3);
    }

    #[tokio::test]
    async fn test_create_arm_rejects_blank_id() {
        let app = setup_test_app();
        let body = serde_json::json!({"id": "  "});

        let (status, _) = send(&app.router, "POST", "/v1/arms", Some(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_missing_arm_is_404() {
        let app = setup_test_app();

        let (status, json) = send(&app.router, "GET", "/v1/arms/ghost", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], 404);
    }

    #[tokio::test]
    async fn test_record_outcome() {
        let app = setup_test_app();

        let (status, json) = send(
            &app.router,
            "POST",
            "/v1/arms/ic:i1:c1/outcome",
            Some(serde_json::json!({"success": true})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["alpha"], 2.0);
        assert_eq!(json["pulls"], 1);
        assert!(app.engine.get_arm(&ArmId::new("ic:i1:c1")).is_some());
    }

    #[tokio::test]
    async fn test_select_arm() {
        let app = setup_test_app();
        let body = serde_json::json!({"candidates": ["a", "b", "c"]});

        let (status, json) = send(&app.router, "POST", "/v1/arms/select", Some(body)).await;

        assert_eq!(status, StatusCode::OK);
        let chosen = json["chosen"].as_str().unwrap();
        assert!(["a", "b", "c"].contains(&chosen));
        assert_eq!(app.engine.pool().len(), 3);
    }

    #[tokio::test]
    async fn test_select_empty_candidates_is_400() {
        let app = setup_test_app();
        let body = serde_json::json!({"candidates": []});

        let (status, json) = send(&app.router, "POST", "/v1/arms/select", Some(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], 400);
    }
}

mod pool_tests {
    use super::*;

    #[tokio::test]
    async fn test_export_then_import_round_trip() {
        let source = setup_test_app();
        source.engine.initialize_arm(&ArmId::new("w"), Some(0.4));
        source.engine.record_outcome(&ArmId::new("w"), true);

        let (status, snapshot) = send(&source.router, "GET", "/v1/pool/export", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(snapshot["version"], 1);

        let target = setup_test_app();
        let (status, report) =
            send(&target.router, "POST", "/v1/pool/import", Some(snapshot)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["inserted"], 1);

        let before = source.engine.get_arm(&ArmId::new("w")).unwrap();
        let after = target.engine.get_arm(&ArmId::new("w")).unwrap();
        assert_eq!(
            (before.alpha, before.beta, before.pulls),
            (after.alpha, after.beta, after.pulls)
        );
    }

    #[tokio::test]
    async fn test_import_rejects_invalid_snapshot() {
        let app = setup_test_app();
        let body = serde_json::json!({
            "version": 1,
            "arms": {"bad": {"alpha": -1.0, "beta": 1.0, "pulls": 0, "last_updated": "2026-01-01T00:00:00Z"}}
        });

        let (status, json) = send(&app.router, "POST", "/v1/pool/import", Some(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("invalid snapshot"));
        assert!(app.engine.pool().is_empty());
    }
}

mod error_tests {
    use super::*;
    use crate::bandit::BanditError;
    use crate::gateway::GatewayError;
    use axum::response::IntoResponse;

    #[test]
    fn test_every_error_variant_maps_to_status() {
        let cases = [
            (
                GatewayError::InvalidRequest("bad".into()),
                StatusCode::BAD_REQUEST,
                "invalid_request",
            ),
            (
                GatewayError::NotFound("arm".into()),
                StatusCode::NOT_FOUND,
                "not_found",
            ),
            (
                GatewayError::Bandit(BanditError::NoCandidates),
                StatusCode::BAD_REQUEST,
                "invalid_request",
            ),
            (
                GatewayError::Bandit(BanditError::InvalidSnapshot {
                    reason: "version".into(),
                }),
                StatusCode::BAD_REQUEST,
                "invalid_snapshot",
            ),
            (
                GatewayError::Bandit(BanditError::InvalidParameters {
                    id: ArmId::new("a"),
                    alpha: 0.0,
                    beta: 1.0,
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
                "bandit_error",
            ),
        ];

        for (error, status, header) in cases {
            let response = error.into_response();
            assert_eq!(response.status(), status);
            assert_eq!(response.headers().get(AFFINITY_STATUS_HEADER).unwrap(), header);
        }
    }
}
