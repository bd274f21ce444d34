mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::helpers::{body_text, create_test_app, exercise_id, get_json, post_json, register_and_login, send};

fn names(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|e| e["exercise_name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_list_all_ordered_by_muscle_then_name() {
    let test = create_test_app();

    let (status, list) = get_json(&test.app, "/howto/api/list/", None).await;
    assert_eq!(status, StatusCode::OK);

    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 8);
    let keys: Vec<(String, String)> = list
        .iter()
        .map(|e| {
            (
                e["main_muscle"].as_str().unwrap().to_string(),
                e["exercise_name"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[tokio::test]
async fn test_filter_by_muscle_case_insensitive() {
    let test = create_test_app();

    let (_, list) = get_json(&test.app, "/howto/api/list/?muscle=chest", None).await;
    assert_eq!(names(&list), vec!["Barbell Bench Press", "Push Up"]);
}

#[tokio::test]
async fn test_filter_by_equipment_category() {
    let test = create_test_app();

    let (_, list) = get_json(&test.app, "/howto/api/list/?equipment=Assisted", None).await;
    assert_eq!(names(&list), vec!["Assisted Pull Up"]);

    let (_, list) = get_json(&test.app, "/howto/api/list/?equipment=Self-Assisted", None).await;
    assert_eq!(names(&list), vec!["Self-Assisted Inverted Row"]);

    let (_, list) = get_json(&test.app, "/howto/api/list/?equipment=Lever", None).await;
    assert_eq!(names(&list), vec!["Lever Leg Extension"]);

    let (_, list) = get_json(&test.app, "/howto/api/list/?muscle=Back&equipment=Barbell", None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_equipment_labels_are_normalized() {
    let test = create_test_app();

    let (status, labels) = get_json(&test.app, "/howto/api/equipments/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        labels,
        json!([
            "Assisted",
            "Barbell",
            "Body Weight",
            "Cable",
            "Dumbbell",
            "Kettlebell",
            "Lever",
            "Self-Assisted"
        ])
    );

    let (_, options) = get_json(&test.app, "/howto/api/options/", None).await;
    assert_eq!(options["equipments"], labels);
    assert!(options["muscles"].as_array().unwrap().contains(&json!("Chest")));
}

#[tokio::test]
async fn test_detail() {
    let test = create_test_app();
    let id = exercise_id(&test.db, "Kettlebell Swing");

    let (status, exercise) = get_json(&test.app, &format!("/howto/api/detail/{id}/"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(exercise["exercise_name"], "Kettlebell Swing");

    let (status, _) = get_json(&test.app, "/howto/api/detail/9999/", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get_json(&test.app, "/howto/api/detail/abc/", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let response = send(&test.app, Method::GET, &format!("/howto/detail/{id}/"), None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Kettlebell Swing"));

    let response = send(&test.app, Method::GET, "/howto/detail/9999/", None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_favorites_toggle_and_profile() {
    let test = create_test_app();
    let token = register_and_login(&test.app, "alice").await;
    let id = exercise_id(&test.db, "Push Up");

    let (status, _) = get_json(&test.app, "/howto/api/favorites/", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let uri = format!("/howto/api/favorites/toggle/{id}/");
    let (status, body) = post_json(&test.app, &uri, Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "exercise_id": id, "favorited": true }));

    let (_, favorites) = get_json(&test.app, "/howto/api/favorites/", Some(&token)).await;
    assert_eq!(favorites, json!([id]));

    let (_, body) = post_json(&test.app, &uri, Some(&token), json!({})).await;
    assert_eq!(body["favorited"], false);

    let (status, _) = post_json(&test.app, "/howto/api/favorites/toggle/9999/", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
