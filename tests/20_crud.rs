mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn create_then_get_returns_payload_plus_assigned_fields() {
    let (app, state) = common::test_app();
    let token = common::bearer(&state);

    let payload = json!({
        "title": "Chrono Drift",
        "description": "Time-bending racer",
        "genres": ["racing"],
        "platforms": ["pc", "switch"],
        "price": 29.99,
        "stock": 10
    });
    let created = common::create(&app, &token, "/api/games", payload.clone()).await;

    assert_eq!(created["title"], payload["title"]);
    assert_eq!(created["platforms"], payload["platforms"]);
    assert!(created["id"].is_string(), "id assigned at creation");
    assert!(created["createdAt"].is_string(), "createdAt stamped at creation");

    let (status, fetched) =
        common::send(&app, common::get(&format!("/api/games/{}", common::id_of(&created)))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn each_type_404s_with_its_name_on_unknown_or_malformed_ids() {
    let (app, _state) = common::test_app();

    for (path, type_name) in [
        ("/api/users", "User"),
        ("/api/games", "Game"),
        ("/api/characters", "Character"),
        ("/api/developers", "Developer"),
        ("/api/reviews", "Review"),
    ] {
        let (status, body) =
            common::send(&app, common::get(&format!("{}/{}", path, Uuid::new_v4()))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], json!(format!("{} not found", type_name)));

        let (status, body) =
            common::send(&app, common::get(&format!("{}/definitely-not-an-id", path))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], json!(format!("{} not found", type_name)));
    }
}

#[tokio::test]
async fn put_replaces_named_fields_and_keeps_the_rest() {
    let (app, state) = common::test_app();
    let token = common::bearer(&state);

    let created = common::create(
        &app,
        &token,
        "/api/games",
        json!({ "title": "Chrono Drift", "price": 29.99, "stock": 10 }),
    )
    .await;
    let id = common::id_of(&created);

    let request = common::json_request(
        Method::PUT,
        &format!("/api/games/{}", id),
        Some(&token),
        &json!({ "title": "Chrono Drift: Redux", "stock": 5 }),
    );
    let (status, updated) = common::send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], json!("Chrono Drift: Redux"));
    assert_eq!(updated["stock"], json!(5));
    assert_eq!(updated["price"], json!(29.99), "unnamed fields survive");

    let (_, fetched) = common::send(&app, common::get(&format!("/api/games/{}", id))).await;
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn put_on_unknown_id_is_404() {
    let (app, state) = common::test_app();
    let token = common::bearer(&state);

    let request = common::json_request(
        Method::PUT,
        &format!("/api/developers/{}", Uuid::new_v4()),
        Some(&token),
        &json!({ "name": "Acme" }),
    );
    let (status, body) = common::send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Developer not found"));
}

#[tokio::test]
async fn delete_is_204_then_404_on_repeat() {
    let (app, state) = common::test_app();
    let token = common::bearer(&state);

    let created = common::create(&app, &token, "/api/developers", json!({ "name": "Acme" })).await;
    let uri = format!("/api/developers/{}", common::id_of(&created));

    let request = common::json_request(Method::DELETE, &uri, Some(&token), &json!({}));
    let (status, body) = common::send(&app, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, serde_json::Value::Null, "204 has an empty body");

    let (status, _) = common::send(&app, common::get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Idempotence: repeating the delete reports 404, not 204
    let request = common::json_request(Method::DELETE, &uri, Some(&token), &json!({}));
    let (status, _) = common::send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_grows_as_records_are_created() {
    let (app, state) = common::test_app();
    let token = common::bearer(&state);

    let (status, body) = common::send(&app, common::get("/api/characters")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]), "empty collection lists as [], not an error");

    common::create(
        &app,
        &token,
        "/api/characters",
        json!({ "name": "Riva", "abilities": ["phase-shift"] }),
    )
    .await;
    common::create(&app, &token, "/api/characters", json!({ "name": "Moss" })).await;

    let (_, body) = common::send(&app, common::get("/api/characters")).await;
    assert_eq!(body.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn user_records_get_the_default_role() {
    let (app, state) = common::test_app();
    let token = common::bearer(&state);

    let created = common::create(
        &app,
        &token,
        "/api/users",
        json!({
            "oauthId": "ext-123",
            "provider": "google",
            "email": "player@example.com",
            "name": "Player One"
        }),
    )
    .await;

    assert_eq!(created["role"], json!("user"));
    assert!(created["createdAt"].is_string());

    // And the typed view agrees
    let user: gamedb_api::models::User = serde_json::from_value(created).unwrap();
    assert_eq!(user.role, gamedb_api::models::Role::User);
}

#[tokio::test]
async fn review_round_trips_against_existing_game_and_user() {
    let (app, state) = common::test_app();
    let token = common::bearer(&state);

    let game = common::create(&app, &token, "/api/games", json!({ "title": "X" })).await;
    let user = common::create(
        &app,
        &token,
        "/api/users",
        json!({
            "oauthId": "ext-9",
            "provider": "google",
            "email": "critic@example.com",
            "name": "Critic"
        }),
    )
    .await;

    let created = common::create(
        &app,
        &token,
        "/api/reviews",
        json!({
            "game": common::id_of(&game),
            "user": common::id_of(&user),
            "rating": 4,
            "title": "Solid",
            "body": "Wonderful pacing."
        }),
    )
    .await;

    assert_eq!(created["rating"], json!(4));
    assert!(created["createdAt"].is_string());
}
