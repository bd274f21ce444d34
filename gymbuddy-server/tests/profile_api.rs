mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::helpers::{create_test_app, exercise_id, get_json, post_json, register_and_login};

#[tokio::test]
async fn test_create_profile() {
    let test = create_test_app();
    let token = register_and_login(&test.app, "alice").await;

    let (status, profile) = post_json(
        &test.app,
        "/profile/create/api/",
        Some(&token),
        json!({ "display_name": "Alice Lifts", "bio": "Powerlifter", "profile_picture": "https://example.com/a.png" }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(profile["display_name"], "Alice Lifts");
    assert_eq!(profile["username"], "alice");
    assert_eq!(profile["profile_picture"], "https://example.com/a.png");

    let (status, body) = post_json(
        &test.app,
        "/profile/create/api/",
        Some(&token),
        json!({ "display_name": "Another" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Profile already exists.");
}

#[tokio::test]
async fn test_create_profile_validation() {
    let test = create_test_app();
    let alice = register_and_login(&test.app, "alice").await;
    let bob = register_and_login(&test.app, "bob").await;

    post_json(&test.app, "/profile/create/api/", Some(&alice), json!({ "display_name": "Taken" })).await;

    let cases = [
        json!({ "display_name": "" }),
        json!({ "display_name": "x".repeat(41) }),
        json!({ "display_name": "Taken" }),
        json!({ "display_name": "Bob", "profile_picture": "ftp://example.com/b.png" }),
    ];
    for payload in cases {
        let (status, _) = post_json(&test.app, "/profile/create/api/", Some(&bob), payload.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {payload}");
    }
}

#[tokio::test]
async fn test_edit_and_delete_profile() {
    let test = create_test_app();
    let token = register_and_login(&test.app, "alice").await;

    let (status, _) = post_json(&test.app, "/profile/edit/api/", Some(&token), json!({ "bio": "x" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    post_json(
        &test.app,
        "/profile/create/api/",
        Some(&token),
        json!({ "display_name": "Alice", "bio": "Old bio" }),
    )
    .await;

    let (status, profile) = post_json(&test.app, "/profile/edit/api/", Some(&token), json!({ "bio": "New bio" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["bio"], "New bio");
    assert_eq!(profile["display_name"], "Alice");

    let (status, _) = post_json(&test.app, "/profile/delete/api/", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_json(&test.app, "/profile/delete/api/", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_profile_json_includes_favorites() {
    let test = create_test_app();
    let token = register_and_login(&test.app, "alice").await;
    let push_up = exercise_id(&test.db, "Push Up");

    let (_, created) = post_json(&test.app, "/profile/create/api/", Some(&token), json!({ "display_name": "Alice" })).await;
    let user_id = created["user_id"].as_str().unwrap().to_string();

    post_json(&test.app, &format!("/howto/api/favorites/toggle/{push_up}/"), Some(&token), json!({})).await;

    let (status, profile) = get_json(&test.app, &format!("/profile/json/{user_id}/"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["favorite_exercises"], json!([{ "id": push_up, "name": "Push Up" }]));

    let (_, all) = get_json(&test.app, "/profile/json/", None).await;
    assert_eq!(all.as_array().unwrap().len(), 1);

    let (status, _) = get_json(&test.app, "/profile/json/not-a-uuid/", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(
        &test.app,
        "/profile/json/00000000-0000-0000-0000-000000000000/",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_favorite_sports_on_create_and_edit() {
    let test = create_test_app();
    let token = register_and_login(&test.app, "alice").await;

    let (status, profile) = post_json(
        &test.app,
        "/profile/create/api/",
        Some(&token),
        json!({
            "display_name": "Alice",
            "favorite_sports": [{ "value": "Panjat Tebing" }, "gym", "gym"]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(profile["favorite_sports"], json!(["panjat-tebing", "gym"]));

    let (status, profile) = post_json(&test.app, "/profile/edit/api/", Some(&token), json!({ "bio": "Climber" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["favorite_sports"], json!(["panjat-tebing", "gym"]));

    let (status, profile) = post_json(
        &test.app,
        "/profile/edit/api/",
        Some(&token),
        json!({ "favorite_sports": ["ski", "snowboard"] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["favorite_sports"], json!(["ski", "snowboard"]));

    let user_id = profile["user_id"].as_str().unwrap().to_string();
    let (_, stored) = get_json(&test.app, &format!("/profile/json/{user_id}/"), None).await;
    assert_eq!(stored["favorite_sports"], json!(["ski", "snowboard"]));
}

#[tokio::test]
async fn test_unknown_sport_rejected() {
    let test = create_test_app();
    let token = register_and_login(&test.app, "alice").await;

    let (status, body) = post_json(
        &test.app,
        "/profile/create/api/",
        Some(&token),
        json!({ "display_name": "Alice", "favorite_sports": ["quidditch"] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown sport: quidditch.");

    let (_, created) = post_json(&test.app, "/profile/create/api/", Some(&token), json!({ "display_name": "Alice" })).await;
    assert_eq!(created["favorite_sports"], json!([]));
}

#[tokio::test]
async fn test_sport_choices_listed() {
    let test = create_test_app();
    let (status, sports) = get_json(&test.app, "/profile/api/sports/", None).await;
    assert_eq!(status, StatusCode::OK);
    let sports = sports.as_array().unwrap();
    assert_eq!(sports.len(), 23);
    assert_eq!(sports[0], json!({ "slug": "atletik", "label": "Atletik" }));
}
