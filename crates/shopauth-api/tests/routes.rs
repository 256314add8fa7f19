//! HTTP boundary tests driven through the router.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use shopauth_api::{AppState, build_router};
use shopauth_auth::{LoginOrchestrator, PasswordAuthenticator, SessionStore, TokenIssuer};
use shopauth_cache::memory::MemoryCacheProvider;
use shopauth_core::config::{AppConfig, AuthConfig, FeatureFlags};
use shopauth_core::events::NoopEventSink;
use shopauth_core::traits::{Credential, EventSink};
use shopauth_database::InMemoryCredentialRepository;

struct TestApp {
    router: Router,
}

struct TestResponse {
    status: StatusCode,
    body: Value,
}

impl TestApp {
    fn new() -> Self {
        let config = AppConfig {
            auth: AuthConfig {
                jwt_secret: "api-test-secret".into(),
                bcrypt_cost: 4,
                ..AuthConfig::default()
            },
            features: FeatureFlags {
                enable_legacy_auth: true,
                enable_password_migration: true,
            },
            ..AppConfig::default()
        };

        let events: Arc<dyn EventSink> = Arc::new(NoopEventSink);
        let passwords = Arc::new(PasswordAuthenticator::new(
            &config.auth,
            &config.features,
            events.clone(),
        ));

        let repo = InMemoryCredentialRepository::new();
        repo.insert(Credential {
            user_id: "u1".into(),
            email: "a@x.com".into(),
            role: "customer".into(),
            password_hash: passwords.migrate("correct horse").unwrap(),
            active: true,
        });
        repo.insert(Credential {
            user_id: "u2".into(),
            email: "off@x.com".into(),
            role: "customer".into(),
            password_hash: passwords.migrate("correct horse").unwrap(),
            active: false,
        });

        let orchestrator = LoginOrchestrator::new(
            Arc::new(repo),
            passwords,
            Arc::new(TokenIssuer::new(&config.auth, events.clone())),
            Arc::new(SessionStore::new(
                Arc::new(MemoryCacheProvider::default()),
                &config.session,
                events.clone(),
            )),
            &config.auth,
            &config.features,
            events,
        );

        let state = AppState::new(&config.server, Arc::new(orchestrator));
        Self {
            router: build_router(state),
        }
    }

    async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", "198.51.100.4, 10.0.0.1")
            .header(header::USER_AGENT, "route-test/1.0");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse { status, body }
    }

    async fn login(&self) -> (String, String) {
        let response = self
            .request(
                "POST",
                "/api/v2/auth/login",
                Some(json!({ "email": "a@x.com", "password": "correct horse" })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        (
            response.body["token"].as_str().unwrap().to_string(),
            response.body["session_id"].as_str().unwrap().to_string(),
        )
    }
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/v2/auth/login",
            Some(json!({ "email": "a@x.com", "password": "correct horse" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert!(response.body["token"].as_str().is_some());
    assert!(response.body["session_id"].as_str().unwrap().starts_with("sess-"));
    assert_eq!(response.body["user"]["id"], "u1");
    assert!(response.body["expires_at"].is_string());
}

#[tokio::test]
async fn test_login_failures() {
    let app = TestApp::new();

    let wrong = app
        .request(
            "POST",
            "/api/v2/auth/login",
            Some(json!({ "email": "a@x.com", "password": "nope" })),
            None,
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body["error"], "INVALID_CREDENTIALS");

    let unknown = app
        .request(
            "POST",
            "/api/v2/auth/login",
            Some(json!({ "email": "ghost@x.com", "password": "nope" })),
            None,
        )
        .await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.body, wrong.body);

    let inactive = app
        .request(
            "POST",
            "/api/v2/auth/login",
            Some(json!({ "email": "off@x.com", "password": "correct horse" })),
            None,
        )
        .await;
    assert_eq!(inactive.status, StatusCode::FORBIDDEN);
    assert_eq!(inactive.body["error"], "ACCOUNT_INACTIVE");
}

#[tokio::test]
async fn test_validate_and_logout() {
    let app = TestApp::new();
    let (token, session_id) = app.login().await;

    let valid = app
        .request("POST", "/api/v2/auth/validate", None, Some(&token))
        .await;
    assert_eq!(valid.status, StatusCode::OK);
    assert_eq!(valid.body["valid"], true);
    assert_eq!(valid.body["claims"]["session_id"], session_id.as_str());

    let logout = app
        .request("POST", "/api/v2/auth/logout", None, Some(&token))
        .await;
    assert_eq!(logout.status, StatusCode::OK);

    let after = app
        .request("POST", "/api/v2/auth/validate", None, Some(&token))
        .await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
    assert_eq!(after.body["error"], "SESSION_NOT_FOUND");
}

#[tokio::test]
async fn test_missing_or_bad_token() {
    let app = TestApp::new();

    let missing = app
        .request("POST", "/api/v2/auth/validate", None, None)
        .await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.body["error"], "MISSING_TOKEN");

    let garbage = app
        .request("GET", "/api/v2/auth/sessions", None, Some("garbage"))
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage.body["error"], "TOKEN_INVALID");
}

#[tokio::test]
async fn test_refresh_issues_new_token() {
    let app = TestApp::new();
    let (token, _) = app.login().await;

    let refreshed = app
        .request("POST", "/api/v2/auth/refresh", None, Some(&token))
        .await;
    assert_eq!(refreshed.status, StatusCode::OK);
    let new_token = refreshed.body["token"].as_str().unwrap();
    assert_ne!(new_token, token);

    let valid = app
        .request("POST", "/api/v2/auth/validate", None, Some(new_token))
        .await;
    assert_eq!(valid.status, StatusCode::OK);
}

#[tokio::test]
async fn test_sessions_listing_and_revocation() {
    let app = TestApp::new();
    let (first_token, first_session) = app.login().await;
    let (second_token, _) = app.login().await;

    let listed = app
        .request("GET", "/api/v2/auth/sessions", None, Some(&second_token))
        .await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body["sessions"].as_array().unwrap().len(), 2);

    let revoked = app
        .request(
            "DELETE",
            &format!("/api/v2/auth/sessions/{first_session}"),
            None,
            Some(&second_token),
        )
        .await;
    assert_eq!(revoked.status, StatusCode::OK);

    let dead = app
        .request("POST", "/api/v2/auth/validate", None, Some(&first_token))
        .await;
    assert_eq!(dead.status, StatusCode::UNAUTHORIZED);
    assert_eq!(dead.body["error"], "SESSION_REVOKED");

    let missing = app
        .request(
            "DELETE",
            "/api/v2/auth/sessions/sess-unknown",
            None,
            Some(&second_token),
        )
        .await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_all() {
    let app = TestApp::new();
    let (first_token, _) = app.login().await;
    let (second_token, _) = app.login().await;

    let response = app
        .request("POST", "/api/v2/auth/logout/all", None, Some(&first_token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    for token in [&first_token, &second_token] {
        let after = app
            .request("POST", "/api/v2/auth/validate", None, Some(token))
            .await;
        assert_eq!(after.status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_change_password() {
    let app = TestApp::new();
    let (token, _) = app.login().await;

    let mismatch = app
        .request(
            "PUT",
            "/api/v2/auth/password",
            Some(json!({ "current_password": "nope", "new_password": "brand new secret" })),
            Some(&token),
        )
        .await;
    assert_eq!(mismatch.status, StatusCode::BAD_REQUEST);
    assert_eq!(mismatch.body["error"], "PASSWORD_MISMATCH");

    let short = app
        .request(
            "PUT",
            "/api/v2/auth/password",
            Some(json!({ "current_password": "correct horse", "new_password": "short" })),
            Some(&token),
        )
        .await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);
    assert_eq!(short.body["error"], "PASSWORD_TOO_SHORT");

    let changed = app
        .request(
            "PUT",
            "/api/v2/auth/password",
            Some(json!({ "current_password": "correct horse", "new_password": "brand new secret" })),
            Some(&token),
        )
        .await;
    assert_eq!(changed.status, StatusCode::OK);

    let relogin = app
        .request(
            "POST",
            "/api/v2/auth/login",
            Some(json!({ "email": "a@x.com", "password": "brand new secret" })),
            None,
        )
        .await;
    assert_eq!(relogin.status, StatusCode::OK);
}
