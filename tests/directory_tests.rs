// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client and workout plan directory tests.

use axum::http::{Method, StatusCode};
use serde_json::json;

mod common;

use common::{create_test_app, login, send};

// ─── Clients ─────────────────────────────────────────────────

#[tokio::test]
async fn test_client_crud() {
    let (app, _) = create_test_app();
    let (token, user_id) = login(&app, "t-20", "trainer20@example.com", "Trainer").await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/clients",
        Some(&token),
        Some(json!({
            "name": "Maya Lopez",
            "email": "maya@example.com",
            "phone": "555-0100",
            "sessionsRemaining": 8,
            "sessionsExpiryDate": "2026-12-31",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["ownerId"], user_id.as_str());
    assert_eq!(created["sessionsRemaining"], 8);
    assert_eq!(created["sessionsExpiryDate"], "2026-12-31T00:00:00Z");

    let uri = format!("/clients/{}", created["id"].as_str().unwrap());

    let (status, updated) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&token),
        Some(json!({ "sessionsRemaining": 7 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["sessionsRemaining"], 7);
    assert_eq!(updated["name"], "Maya Lopez");
    assert_eq!(updated["email"], "maya@example.com");

    let (status, fetched) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, updated);

    let (status, body) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Client deleted successfully");

    let (status, _) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_client_update_clears_contact_fields() {
    let (app, _) = create_test_app();
    let (token, _) = login(&app, "t-31", "trainer31@example.com", "Trainer").await;

    let (_, created) = send(
        &app,
        Method::POST,
        "/clients",
        Some(&token),
        Some(json!({
            "name": "Leo",
            "email": "a@b.co",
            "phone": "555-1234",
            "sessionsExpiryDate": "2026-12-31",
        })),
    )
    .await;
    let uri = format!("/clients/{}", created["id"].as_str().unwrap());

    let (status, updated) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&token),
        Some(json!({ "phone": "", "email": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated["phone"].is_null());
    assert!(updated["email"].is_null());
    assert_eq!(updated["sessionsExpiryDate"], "2026-12-31T00:00:00Z");

    let (status, updated) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&token),
        Some(json!({ "sessionsExpiryDate": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated["sessionsExpiryDate"].is_null());
    assert_eq!(updated["name"], "Leo");

    let (_, fetched) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert!(fetched["phone"].is_null());
    assert!(fetched["email"].is_null());
}

#[tokio::test]
async fn test_clients_listed_newest_first() {
    let (app, _) = create_test_app();
    let (token, _) = login(&app, "t-21", "trainer21@example.com", "Trainer").await;

    for name in ["First", "Second", "Third"] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/clients",
            Some(&token),
            Some(json!({ "name": name })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        // created_at has to differ between records
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let (status, body) = send(&app, Method::GET, "/clients", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Third", "Second", "First"]);
}

#[tokio::test]
async fn test_client_validation() {
    let (app, _) = create_test_app();
    let (token, _) = login(&app, "t-22", "trainer22@example.com", "Trainer").await;

    let cases = [
        json!({}),
        json!({ "name": "   " }),
        json!({ "name": "Sam", "sessionsRemaining": -3 }),
        json!({ "name": "Sam", "email": "sam-at-example" }),
        json!({ "name": "Sam", "sessionsExpiryDate": "soon" }),
    ];

    for case in cases {
        let (status, body) = send(&app, Method::POST, "/clients", Some(&token), Some(case.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {case}");
        assert_eq!(body["error"], "validation_error");
    }

    let (status, body) = send(&app, Method::GET, "/clients", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_clients_are_owner_scoped() {
    let (app, _) = create_test_app();
    let (owner, _) = login(&app, "t-23", "trainer23@example.com", "Owner").await;
    let (other, _) = login(&app, "t-24", "trainer24@example.com", "Other").await;

    let (_, created) = send(
        &app,
        Method::POST,
        "/clients",
        Some(&owner),
        Some(json!({ "name": "Priya" })),
    )
    .await;
    let uri = format!("/clients/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::DELETE, &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Client not found");

    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&other),
        Some(json!({ "name": "Renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, listed) = send(&app, Method::GET, "/clients", Some(&other), None).await;
    assert!(listed.as_array().unwrap().is_empty());

    let (status, body) = send(&app, Method::GET, &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Priya");
}

// ─── Workout plans ───────────────────────────────────────────

fn leg_day() -> serde_json::Value {
    json!({
        "name": "Leg Day",
        "days": [{
            "dayNumber": 1,
            "dayName": "Lower body",
            "exercises": [
                { "name": "Squat", "sets": 3, "reps": "8-10" },
                { "name": "Lunge", "sets": "3", "reps": 12 },
            ],
        }],
    })
}

#[tokio::test]
async fn test_workout_plan_round_trip() {
    let (app, _) = create_test_app();
    let (token, _) = login(&app, "t-25", "trainer25@example.com", "Trainer").await;

    let (status, created) = send(&app, Method::POST, "/workouts", Some(&token), Some(leg_day())).await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/workouts/{}", created["id"].as_str().unwrap());
    let (status, plan) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["name"], "Leg Day");

    let day = &plan["days"][0];
    assert_eq!(day["dayNumber"], 1);
    assert_eq!(day["notes"], "");
    assert_eq!(day["exercises"][0]["name"], "Squat");
    assert_eq!(day["exercises"][0]["sets"], "3");
    assert_eq!(day["exercises"][0]["reps"], "8-10");
    assert_eq!(day["exercises"][1]["reps"], "12");
}

#[tokio::test]
async fn test_workout_plan_update_is_partial() {
    let (app, _) = create_test_app();
    let (token, _) = login(&app, "t-26", "trainer26@example.com", "Trainer").await;

    let (_, created) = send(&app, Method::POST, "/workouts", Some(&token), Some(leg_day())).await;
    let uri = format!("/workouts/{}", created["id"].as_str().unwrap());

    let (status, updated) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&token),
        Some(json!({ "name": "Leg Day v2" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Leg Day v2");
    assert_eq!(updated["days"], created["days"]);
    assert_eq!(updated["createdAt"], created["createdAt"]);
}

#[tokio::test]
async fn test_workout_plan_name_required() {
    let (app, _) = create_test_app();
    let (token, _) = login(&app, "t-27", "trainer27@example.com", "Trainer").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/workouts",
        Some(&token),
        Some(json!({ "name": "   ", "days": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Workout plan name is required");

    let (status, _) = send(
        &app,
        Method::POST,
        "/workouts",
        Some(&token),
        Some(json!({ "days": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_workout_plan_without_days_is_allowed() {
    let (app, _) = create_test_app();
    let (token, _) = login(&app, "t-28", "trainer28@example.com", "Trainer").await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/workouts",
        Some(&token),
        Some(json!({ "name": "Draft" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(created["days"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_workout_plans_are_owner_scoped() {
    let (app, _) = create_test_app();
    let (owner, _) = login(&app, "t-29", "trainer29@example.com", "Owner").await;
    let (other, _) = login(&app, "t-30", "trainer30@example.com", "Other").await;

    let (_, created) = send(&app, Method::POST, "/workouts", Some(&owner), Some(leg_day())).await;
    let uri = format!("/workouts/{}", created["id"].as_str().unwrap());

    let (status, _) = send(&app, Method::GET, &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::DELETE, &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Workout plan not found");

    let (status, body) = send(&app, Method::DELETE, &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Workout plan deleted successfully");
}
