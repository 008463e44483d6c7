//! HTTP level flows through the API router.
use axum::{
    body::Body,
    http::{header::AUTHORIZATION, Request, StatusCode},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use chirpy_backend_lib::{
    middleware::{require_identity, require_service_key, AuthenticatedUser},
    router::create_router,
    AppState,
};
use serde_json::{json, Value};

use crate::test_utils::{
    bearer_post, json_post, send, setup_test_state, STRONG_PASSWORD, TEST_API_KEY,
};

async fn register_and_login(app: &Router, email: &str) -> Value {
    let (status, _) = send(
        app,
        json_post("/api/users", json!({ "email": email, "password": STRONG_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        json_post("/api/login", json!({ "email": email, "password": STRONG_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body
}

/// Router with one route behind each of the auth middlewares
fn protected_app(state: AppState) -> Router {
    async fn whoami(AuthenticatedUser(user_id): AuthenticatedUser) -> String {
        user_id.to_string()
    }
    async fn polka_webhook() -> StatusCode {
        StatusCode::NO_CONTENT
    }

    let identity = Router::new()
        .route("/api/whoami", get(whoami))
        .route_layer(from_fn_with_state(state.clone(), require_identity));
    let webhooks = Router::new()
        .route("/api/polka/webhooks", post(polka_webhook))
        .route_layer(from_fn_with_state(state.clone(), require_service_key));

    create_router(state.clone()).merge(identity.merge(webhooks).with_state(state))
}

#[tokio::test]
async fn test_healthz() {
    let app = create_router(setup_test_state());
    let request = Request::get("/api/healthz").body(Body::empty()).unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".into()));
}

#[tokio::test]
async fn test_register_validation() {
    let app = create_router(setup_test_state());

    let (status, body) = send(
        &app,
        json_post("/api/users", json!({ "email": "walt@breakingbad.com", "password": "04234" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VAL_001");

    let (status, _) = send(
        &app,
        json_post("/api/users", json!({ "email": "not-an-email", "password": STRONG_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        json_post(
            "/api/users",
            json!({ "email": "walt@breakingbad.com", "password": STRONG_PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "walt@breakingbad.com");
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());

    let (status, body) = send(
        &app,
        json_post(
            "/api/users",
            json!({ "email": "Walt@BreakingBad.com", "password": STRONG_PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT_001");
}

#[tokio::test]
async fn test_session_lifecycle() {
    let app = create_router(setup_test_state());
    let login = register_and_login(&app, "walt@breakingbad.com").await;

    let access = login["token"].as_str().unwrap().to_string();
    let refresh_token = login["refresh_token"].as_str().unwrap().to_string();
    assert_eq!(refresh_token.len(), 64);

    let (status, body) = send(&app, bearer_post("/api/refresh", &refresh_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(body["token"].as_str().unwrap(), access);

    let (status, body) = send(&app, bearer_post("/api/revoke", &refresh_token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    // revoke is idempotent
    let (status, _) = send(&app, bearer_post("/api/revoke", &refresh_token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, bearer_post("/api/refresh", &refresh_token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_402");
}

#[tokio::test]
async fn test_refresh_requires_bearer_header() {
    let app = create_router(setup_test_state());

    let request = Request::post("/api/refresh").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_101");

    let request = Request::post("/api/refresh")
        .header(AUTHORIZATION, "Token abc")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_102");

    let (status, body) = send(&app, bearer_post("/api/refresh", &"ab".repeat(32))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_401");
}

#[tokio::test]
async fn test_login_failures_look_alike() {
    let app = create_router(setup_test_state());
    register_and_login(&app, "walt@breakingbad.com").await;

    let (wrong_status, wrong_body) = send(
        &app,
        json_post("/api/login", json!({ "email": "walt@breakingbad.com", "password": "nope" })),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &app,
        json_post(
            "/api/login",
            json!({ "email": "skyler@breakingbad.com", "password": STRONG_PASSWORD }),
        ),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_status, unknown_status);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn test_login_lockout() {
    let app = create_router(setup_test_state());
    register_and_login(&app, "walt@breakingbad.com").await;

    // test settings lock an account after three failures
    for _ in 0..3 {
        let (status, _) = send(
            &app,
            json_post("/api/login", json!({ "email": "walt@breakingbad.com", "password": "nope" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (status, body) = send(
        &app,
        json_post(
            "/api/login",
            json!({ "email": "walt@breakingbad.com", "password": STRONG_PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "AUTH_003");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_guesses_respect_lockout() {
    let app = create_router(setup_test_state());
    register_and_login(&app, "walt@breakingbad.com").await;

    let guesses: Vec<_> = (0..20)
        .map(|i| {
            let app = app.clone();
            tokio::spawn(async move {
                let body = json!({ "email": "walt@breakingbad.com", "password": format!("guess-{i}") });
                send(&app, json_post("/api/login", body)).await.0
            })
        })
        .collect();

    let mut evaluated = 0;
    let mut locked = 0;
    for guess in guesses {
        match guess.await.unwrap() {
            StatusCode::UNAUTHORIZED => evaluated += 1,
            StatusCode::TOO_MANY_REQUESTS => locked += 1,
            other => panic!("unexpected status {other}"),
        }
    }

    // test settings allow three attempts
    assert_eq!(evaluated, 3);
    assert_eq!(locked, 17);
}

#[tokio::test]
async fn test_require_identity() {
    let state = setup_test_state();
    let app = protected_app(state);
    let login = register_and_login(&app, "walt@breakingbad.com").await;

    let request = Request::get("/api/whoami")
        .header(AUTHORIZATION, format!("Bearer {}", login["token"].as_str().unwrap()))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String(login["id"].as_str().unwrap().to_string()));

    // a refresh token is not an access token
    let request = Request::get("/api/whoami")
        .header(
            AUTHORIZATION,
            format!("Bearer {}", login["refresh_token"].as_str().unwrap()),
        )
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_201");

    let request = Request::get("/api/whoami").body(Body::empty()).unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_require_service_key() {
    let app = protected_app(setup_test_state());

    let request = Request::post("/api/polka/webhooks")
        .header(AUTHORIZATION, format!("ApiKey {TEST_API_KEY}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let request = Request::post("/api/polka/webhooks")
        .header(AUTHORIZATION, "ApiKey 00000000000000000000000000000000")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_302");
}
