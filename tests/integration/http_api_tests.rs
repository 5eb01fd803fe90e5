//! End-to-end HTTP tests against the router
use crate::test_utils::{json_request, send, setup_test_app};
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

async fn register(app: &axum::Router, name: &str, email: &str, password: &str) -> Value {
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/users",
            Some(json!({ "name": name, "email": email, "password": password })),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

#[tokio::test]
async fn test_health() {
    let (app, _state, _dir) = setup_test_app();
    let (status, body) = send(&app, json_request(Method::GET, "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("Healthy".to_string()));
}

#[tokio::test]
async fn test_register_and_login() {
    let (app, _state, _dir) = setup_test_app();

    let body = register(&app, "A", "a@x.com", "secret123").await;
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(body.get("password").is_none());
    assert_eq!(body["name"], "A");
    assert_eq!(body["email"], "a@x.com");

    let (status, login) = send(
        &app,
        json_request(
            Method::POST,
            "/api/users/login",
            Some(json!({ "email": "a@x.com", "password": "secret123" })),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["id"], body["id"]);
    assert!(login["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn test_register_failures_are_bad_requests() {
    let (app, _state, _dir) = setup_test_app();

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/users",
            Some(json!({ "name": "A", "email": "a@x.com" })),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VAL_001");

    register(&app, "A", "a@x.com", "secret123").await;
    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/users",
            Some(json!({ "name": "B", "email": "a@x.com", "password": "other" })),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "ACC_001");
}

#[tokio::test]
async fn test_malformed_json_is_validation_error() {
    let (app, _state, _dir) = setup_test_app();
    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/api/users")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VAL_001");
}

#[tokio::test]
async fn test_login_failure_is_uniform() {
    let (app, _state, _dir) = setup_test_app();
    register(&app, "A", "a@x.com", "secret123").await;

    let mut bodies = Vec::new();
    for creds in [
        json!({ "email": "a@x.com", "password": "wrong" }),
        json!({ "email": "ghost@x.com", "password": "secret123" }),
    ] {
        let (status, body) = send(
            &app,
            json_request(Method::POST, "/api/users/login", Some(creds), None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        bodies.push(body);
    }
    assert_eq!(bodies[0], bodies[1]);
}

#[tokio::test]
async fn test_private_routes_require_token() {
    let (app, _state, _dir) = setup_test_app();

    let (status, body) = send(&app, json_request(Method::GET, "/api/users/me", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_002");

    let (status, _) = send(
        &app,
        json_request(Method::GET, "/api/users/me", None, Some("garbage")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_update_delete_flow() {
    let (app, _state, _dir) = setup_test_app();
    let account = register(&app, "A", "a@x.com", "secret123").await;
    let id = account["id"].as_str().unwrap().to_string();
    let token = account["token"].as_str().unwrap().to_string();

    let (status, me) = send(
        &app,
        json_request(Method::GET, "/api/users/me", None, Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me, json!({ "id": id, "name": "A", "email": "a@x.com" }));

    let (status, updated) = send(
        &app,
        json_request(
            Method::PUT,
            &format!("/api/users/{id}"),
            Some(json!({ "name": "Renamed" })),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Renamed");
    assert!(updated.get("password").is_none());
    assert!(updated.get("password_hash").is_none());

    let (status, ack) = send(
        &app,
        json_request(Method::DELETE, &format!("/api/users/{id}"), None, Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["id"], id.as_str());

    // The token now names a removed account
    let (status, _) = send(
        &app,
        json_request(Method::GET, "/api/users/me", None, Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_rejects_unknown_fields() {
    let (app, _state, _dir) = setup_test_app();
    let account = register(&app, "A", "a@x.com", "secret123").await;
    let id = account["id"].as_str().unwrap();
    let token = account["token"].as_str().unwrap();

    let (status, body) = send(
        &app,
        json_request(
            Method::PUT,
            &format!("/api/users/{id}"),
            Some(json!({ "password_hash": "plain" })),
            Some(token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VAL_001");
}

#[tokio::test]
async fn test_unknown_or_malformed_id_not_found() {
    let (app, _state, _dir) = setup_test_app();
    let account = register(&app, "A", "a@x.com", "secret123").await;
    let token = account["token"].as_str().unwrap();

    for uri in [
        format!("/api/users/{}", uuid::Uuid::new_v4()),
        "/api/users/not-a-uuid".to_string(),
    ] {
        let (status, body) =
            send(&app, json_request(Method::DELETE, &uri, None, Some(token))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "NF_001");
    }
}
