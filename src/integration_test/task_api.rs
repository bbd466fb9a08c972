use super::test_util::prepare_db_and_test;
use crate::api::test_util::deserialize_body;
use crate::{SharedData, persistence, routes};
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn router_for(db: PgPool) -> Router {
    routes::build_router(
        Arc::new(SharedData {
            ext_cxn: persistence::ExternalConnectivity::new(db),
        }),
        Duration::from_secs(10),
    )
}

async fn call(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.map_or_else(Body::empty, |json_body| Body::from(json_body.to_string())))
        .expect("request should build");

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router should always produce a response");
    let status = response.status();

    (status, deserialize_body(response.into_body()).await)
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn task_lifecycle() {
    prepare_db_and_test(|db| async move {
        let router = router_for(db);

        let (status, created) = call(
            &router,
            Method::POST,
            "/api/v1/tasks",
            Some(json!({ "title": "Buy milk", "priority": 2 })),
        )
        .await;
        assert_eq!(StatusCode::CREATED, status);
        assert_eq!("pending", created["status"]);
        assert_eq!(Value::Null, created["description"]);
        let task_uri = format!("/api/v1/tasks/{}", created["id"]);

        let (status, fetched) = call(&router, Method::GET, &task_uri, None).await;
        assert_eq!(StatusCode::OK, status);
        assert_eq!(created, fetched);

        let (status, patched) = call(
            &router,
            Method::PATCH,
            &task_uri,
            Some(json!({ "status": "completed", "description": "Oat milk" })),
        )
        .await;
        assert_eq!(StatusCode::OK, status);
        assert_eq!("completed", patched["status"]);
        assert_eq!("Oat milk", patched["description"]);
        assert_eq!("Buy milk", patched["title"]);
        assert_eq!(2, patched["priority"]);

        let (status, cleared) = call(
            &router,
            Method::PUT,
            &task_uri,
            Some(json!({ "description": null })),
        )
        .await;
        assert_eq!(StatusCode::OK, status);
        assert_eq!(Value::Null, cleared["description"]);
        assert_eq!("completed", cleared["status"]);

        let (status, deleted) = call(&router, Method::DELETE, &task_uri, None).await;
        assert_eq!(StatusCode::OK, status);
        assert_eq!("Task deleted successfully", deleted["message"]);

        let (status, missing) = call(&router, Method::GET, &task_uri, None).await;
        assert_eq!(StatusCode::NOT_FOUND, status);
        assert_eq!("not_found", missing["error_code"]);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn listing_normalizes_paging() {
    prepare_db_and_test(|db| async move {
        let router = router_for(db);
        for index in 0..3 {
            let (status, _) = call(
                &router,
                Method::POST,
                "/api/v1/tasks",
                Some(json!({ "title": format!("Task {index}"), "status": "in_progress" })),
            )
            .await;
            assert_eq!(StatusCode::CREATED, status);
        }

        let (status, page) = call(
            &router,
            Method::GET,
            "/api/v1/tasks?limit=500&offset=-5&status=in_progress",
            None,
        )
        .await;
        assert_eq!(StatusCode::OK, status);
        assert_eq!(100, page["limit"]);
        assert_eq!(0, page["offset"]);
        assert_eq!(Some(3), page["tasks"].as_array().map(Vec::len));
        assert_eq!("Task 2", page["tasks"][0]["title"]);

        let (status, page) = call(&router, Method::GET, "/api/v1/tasks?limit=abc&status=completed", None).await;
        assert_eq!(StatusCode::OK, status);
        assert_eq!(10, page["limit"]);
        assert_eq!(json!([]), page["tasks"]);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn health_reports_reachable_database() {
    prepare_db_and_test(|db| async move {
        let router = router_for(db);

        let (status, body) = call(&router, Method::GET, "/health", None).await;

        assert_eq!(StatusCode::OK, status);
        assert_eq!("healthy", body["status"]);
    });
}
