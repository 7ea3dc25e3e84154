mod common;

use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use sqlx::PgPool;

use common::{insert_song, spawn_app};

#[sqlx::test]
async fn songs_are_listed_by_votes_then_id(pool: PgPool) {
    let first = insert_song(&pool, "A", "Artist", "https://youtu.be/a").await;
    let second = insert_song(&pool, "B", "Artist", "https://youtu.be/b").await;
    let third = insert_song(&pool, "C", "Artist", "https://youtu.be/c").await;
    sqlx::query("UPDATE songs SET votes = 5 WHERE id = $1")
        .bind(third)
        .execute(&pool)
        .await
        .unwrap();

    let app = spawn_app(pool).await;
    let ids: Vec<i32> = app.songs().await.iter().map(|s| s.id).collect();

    assert_eq!(ids, vec![third, first, second]);
}

#[sqlx::test]
async fn adding_a_song_requires_an_admin_session(pool: PgPool) {
    let app = spawn_app(pool).await;

    let response = app
        .post_json(
            "/songs",
            &json!({"title": "Valentine", "artist": "Måneskin", "link": "https://youtu.be/v"}),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Authentification requise");
    assert!(app.songs().await.is_empty());
}

#[sqlx::test]
async fn same_title_and_artist_becomes_a_vote(pool: PgPool) {
    let app = spawn_app(pool).await;

    let created: Value = app
        .admin_request(
            Method::POST,
            "/songs",
            Some(&json!({"title": "Zitti e Buoni", "artist": "Maneskin", "link": "https://youtu.be/one"})),
        )
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(created["votes"], 1);

    let response = app
        .admin_request(
            Method::POST,
            "/songs",
            Some(&json!({"title": "  zitti e buòni ", "artist": "MÅNESKIN", "link": "https://open.spotify.com/track/two"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let voted: Value = response.json().await.unwrap();

    assert_eq!(voted["id"], created["id"]);
    assert_eq!(voted["votes"], 2);
    assert_eq!(voted["link"], "https://youtu.be/one");
    assert_eq!(app.songs().await.len(), 1);
}

#[sqlx::test]
async fn same_link_becomes_a_vote(pool: PgPool) {
    let app = spawn_app(pool).await;
    let body = json!({"title": "Title", "artist": "Artist", "link": "https://youtu.be/same"});

    app.admin_request(Method::POST, "/songs", Some(&body)).await;
    let voted: Value = app
        .admin_request(
            Method::POST,
            "/songs",
            Some(&json!({"title": "Other title", "artist": "Other", "link": "https://youtu.be/same"})),
        )
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(voted["votes"], 2);
    assert_eq!(voted["title"], "Title");
}

#[sqlx::test]
async fn non_latin_titles_are_merged_only_when_identical(pool: PgPool) {
    let app = spawn_app(pool).await;

    for (title, link) in [
        ("残酷な天使のテーゼ", "https://youtu.be/jp1"),
        ("残酷な天使のテーゼ", "https://youtu.be/jp2"),
        ("紅蓮華", "https://youtu.be/jp3"),
    ] {
        let response = app
            .admin_request(
                Method::POST,
                "/songs",
                Some(&json!({"title": title, "artist": "高橋洋子", "link": link})),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let songs = app.songs().await;
    assert_eq!(songs.len(), 2);
    assert_eq!(songs[0].title, "残酷な天使のテーゼ");
    assert_eq!(songs[0].votes, 2);
    assert_eq!(songs[1].title, "紅蓮華");
}

#[sqlx::test]
async fn banned_songs_are_rejected(pool: PgPool) {
    let app = spawn_app(pool).await;
    app.admin_request(Method::POST, "/ban", Some(&json!({"artist": "Nickelback"})))
        .await;

    let response = app
        .admin_request(
            Method::POST,
            "/songs",
            Some(&json!({"title": "Photograph", "artist": "Nickelback", "link": "https://youtu.be/p"})),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Chanson bannie");
    assert!(app.songs().await.is_empty());
}

#[sqlx::test]
async fn blank_fields_are_rejected(pool: PgPool) {
    let app = spawn_app(pool).await;

    let response = app
        .admin_request(
            Method::POST,
            "/songs",
            Some(&json!({"title": "  ", "artist": "Artist", "link": "https://youtu.be/x"})),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test]
async fn voting_increments_and_unknown_ids_404(pool: PgPool) {
    let id = insert_song(&pool, "Title", "Artist", "https://youtu.be/vote").await;
    let app = spawn_app(pool).await;

    let voted: Value = app
        .post_json(&format!("/songs/{id}/vote"), &json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(voted["votes"], 2);

    let response = app.post_json("/songs/9999/vote", &json!({})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Chanson introuvable");
}

#[sqlx::test]
async fn admins_delete_songs(pool: PgPool) {
    let id = insert_song(&pool, "Title", "Artist", "https://youtu.be/del").await;
    let app = spawn_app(pool).await;

    let unauthenticated = app
        .client
        .delete(app.url(&format!("/songs/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(unauthenticated.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .admin_request(Method::DELETE, &format!("/songs/{id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(app.songs().await.is_empty());

    let again = app
        .admin_request(Method::DELETE, &format!("/songs/{id}"), None)
        .await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}
