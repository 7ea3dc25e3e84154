mod common;

use reqwest::StatusCode;
use serde_json::{Value, json};
use sqlx::PgPool;

use common::{admin_token, spawn_app, spawn_app_with, test_config};
use reco::config::DefaultAdmin;
use reco::handlers::{AuthConfigResponse, LoginResponse, SessionResponse};
use reco::services::admin_users::{create_user, ensure_default_admin_user, get_by_email};
use reco::services::jwt::Provider;
use reco::services::password::hash_password;

#[sqlx::test]
async fn config_lists_the_available_flows(pool: PgPool) {
    let app = spawn_app_with(
        pool,
        &[
            ("GOOGLE_CLIENT_ID", "google-client.apps.googleusercontent.com"),
            ("PASSWORD_LOGIN_ENABLED", "false"),
        ],
    )
    .await;

    let config: AuthConfigResponse = app.get("/auth/config").await.json().await.unwrap();

    assert_eq!(
        config.google_client_id.as_deref(),
        Some("google-client.apps.googleusercontent.com")
    );
    assert_eq!(config.twitch_client_id, None);
    assert!(!config.password_login_enabled);
}

#[sqlx::test]
async fn session_requires_a_bearer_token(pool: PgPool) {
    let app = spawn_app(pool).await;

    let missing = app.get("/auth/session").await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let garbage = app
        .client
        .get(app.url("/auth/session"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
    let body: Value = garbage.json().await.unwrap();
    assert_eq!(body["detail"], "Jeton invalide");
}

#[sqlx::test]
async fn session_echoes_the_token_profile(pool: PgPool) {
    let app = spawn_app(pool).await;

    let session: SessionResponse = app
        .client
        .get(app.url("/auth/session"))
        .bearer_auth(admin_token(Provider::Twitch))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(session.subject, "test-admin");
    assert_eq!(session.name, "Test Admin");
    assert_eq!(session.provider, Provider::Twitch);
}

#[sqlx::test]
async fn password_login_issues_a_usable_session(pool: PgPool) {
    let hash = hash_password("correct horse").unwrap();
    let user = create_user(&pool, " Mod@Example.com ", &hash, Some("Modo"), true)
        .await
        .unwrap();
    let app = spawn_app(pool).await;

    let response = app
        .post_json(
            "/auth/password",
            &json!({"email": "mod@example.com", "password": "correct horse"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let login: LoginResponse = response.json().await.unwrap();
    assert_eq!(login.provider, Provider::Password);
    assert_eq!(login.name, "Modo");

    let session: SessionResponse = app
        .client
        .get(app.url("/auth/session"))
        .bearer_auth(&login.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(session.subject, format!("password:{}", user.id));
}

#[sqlx::test]
async fn password_login_failures(pool: PgPool) {
    let hash = hash_password("correct horse").unwrap();
    create_user(&pool, "mod@example.com", &hash, None, true)
        .await
        .unwrap();
    create_user(&pool, "retired@example.com", &hash, None, false)
        .await
        .unwrap();
    let app = spawn_app(pool).await;

    let cases = [
        (json!({"email": "mod@example.com", "password": "wrong"}), StatusCode::UNAUTHORIZED),
        (json!({"email": "nobody@example.com", "password": "correct horse"}), StatusCode::UNAUTHORIZED),
        (json!({"email": "retired@example.com", "password": "correct horse"}), StatusCode::FORBIDDEN),
        (json!({"email": "mod@example.com"}), StatusCode::BAD_REQUEST),
        (json!({"email": "not-an-email", "password": "x"}), StatusCode::UNAUTHORIZED),
    ];

    for (body, expected) in cases {
        let response = app.post_json("/auth/password", &body).await;
        assert_eq!(response.status(), expected, "body: {body}");
    }
}

#[sqlx::test]
async fn password_login_can_be_disabled(pool: PgPool) {
    let hash = hash_password("correct horse").unwrap();
    create_user(&pool, "mod@example.com", &hash, None, true)
        .await
        .unwrap();
    let app = spawn_app_with(pool, &[("PASSWORD_LOGIN_ENABLED", "0")]).await;

    let response = app
        .post_json(
            "/auth/password",
            &json!({"email": "mod@example.com", "password": "correct horse"}),
        )
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Connexion par mot de passe désactivée");
}

#[sqlx::test]
async fn unconfigured_oauth_providers_are_refused(pool: PgPool) {
    let app = spawn_app(pool).await;

    let google = app
        .post_json("/auth/google", &json!({"credential": "abc.def.ghi"}))
        .await;
    assert_eq!(google.status(), StatusCode::UNAUTHORIZED);

    let twitch = app
        .post_json("/auth/twitch", &json!({"access_token": "token"}))
        .await;
    assert_eq!(twitch.status(), StatusCode::UNAUTHORIZED);

    let empty = app.post_json("/auth/twitch", &json!({})).await;
    assert_eq!(empty.status(), StatusCode::UNAUTHORIZED);
    let body: Value = empty.json().await.unwrap();
    assert_eq!(body["detail"], "Token Twitch manquant");
}

#[sqlx::test]
async fn default_admin_is_created_once(pool: PgPool) {
    let config = test_config(&[
        ("ADMIN_DEFAULT_EMAIL", "Boss@Example.com"),
        ("ADMIN_DEFAULT_PASSWORD", "first password"),
        ("ADMIN_DEFAULT_NAME", "Boss"),
    ]);
    ensure_default_admin_user(&pool, true, config.default_admin.as_ref())
        .await
        .unwrap();

    let second = DefaultAdmin {
        email: "boss@example.com".into(),
        password_hash: None,
        password: Some("second password".into()),
        display_name: None,
    };
    ensure_default_admin_user(&pool, true, Some(&second))
        .await
        .unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin_users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    let app = spawn_app(pool).await;
    let response = app
        .post_json(
            "/auth/password",
            &json!({"email": "boss@example.com", "password": "first password"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let login: LoginResponse = response.json().await.unwrap();
    assert_eq!(login.name, "Boss");
}

#[sqlx::test]
async fn default_admin_is_skipped_without_password_login(pool: PgPool) {
    let admin = DefaultAdmin {
        email: "boss@example.com".into(),
        password_hash: None,
        password: Some("pw".into()),
        display_name: None,
    };

    ensure_default_admin_user(&pool, false, Some(&admin))
        .await
        .unwrap();

    assert!(get_by_email(&pool, "boss@example.com").await.unwrap().is_none());
}
