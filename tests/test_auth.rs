mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn login_me_logout_roundtrip() {
    let env = common::TestEnv::start();
    let server = env.server();

    let response = server
        .post("/api/auth/login")
        .json(&serde_json::json!({
            "email": "admin@example.com",
            "password": "hunter2"
        }))
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["identity"]["email"], "admin@example.com");
    assert_eq!(body["identity"]["providerId"], "password");

    let me = server.get("/api/auth/me").await;
    let body: serde_json::Value = me.json();
    assert_eq!(body["email"], "admin@example.com");
    assert_eq!(body["displayName"], "Site Admin");

    server.post("/api/auth/logout").await;

    let me = env.server_permissive().get("/api/auth/me").await;
    assert_eq!(me.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let env = common::TestEnv::start();
    let server = env.server_permissive();

    let response = server
        .post("/api/auth/login")
        .json(&serde_json::json!({
            "email": "admin@example.com",
            "password": "wrong"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn unverified_accounts_cannot_sign_in() {
    let env = common::TestEnv::start();
    let server = env.server_permissive();

    let response = server
        .post("/api/auth/login")
        .json(&serde_json::json!({
            "email": "pending@example.com",
            "password": "hunter2"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("not verified"));

    // No session was started.
    let me = server.get("/api/auth/me").await;
    assert_eq!(me.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_sends_verification_and_starts_no_session() {
    let env = common::TestEnv::start();
    let server = env.server();

    let response = server
        .post("/api/auth/register")
        .json(&serde_json::json!({
            "email": "new@example.com",
            "password": "correct horse",
            "password_confirm": "correct horse"
        }))
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["email"], "new@example.com");

    let sent = env.auth.verifications_sent.lock().unwrap().clone();
    assert_eq!(sent, vec!["new@example.com".to_string()]);

    // Registration must not sign the account in.
    let me = env.server_permissive().get("/api/auth/me").await;
    assert_eq!(me.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn mismatched_passwords_never_reach_the_provider() {
    let env = common::TestEnv::start();
    let server = env.server_permissive();

    let response = server
        .post("/api/auth/register")
        .json(&serde_json::json!({
            "email": "new@example.com",
            "password": "one",
            "password_confirm": "two"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Passwords do not match.");

    assert!(env.auth.verifications_sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn admin_shells_are_gated_and_served_verbatim() {
    let env = common::TestEnv::start();
    env.shells.items.lock().unwrap().push((
        "feedback".to_string(),
        "<section id=\"feedback-inbox\"></section>".to_string(),
    ));

    // Anonymous callers are sent to the login page.
    let anonymous = env.server_permissive();
    let response = anonymous.get("/admin/feedback").await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/login");

    // Signed-in admins get the stored fragment untouched.
    let server = env.server();
    env.sign_in(&server).await;
    let response = server.get("/admin/feedback").await;
    assert_eq!(response.text(), "<section id=\"feedback-inbox\"></section>");

    // Unknown shells are a 404.
    let server = env.server_permissive();
    env.sign_in(&server).await;
    let response = server.get("/admin/missing").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
