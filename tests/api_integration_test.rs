/// Integration tests for the HTTP surface
///
/// These tests drive the full router (session middleware included) and cover:
/// - The prediction envelope and its defaults
/// - Model-unavailable and malformed-input errors
/// - The report page's dependence on session state
/// - Clearing the stored prediction

mod common;

use axum::http::{header, StatusCode};
use common::*;
use serde_json::json;

#[tokio::test]
async fn test_home_and_analytics_always_render() {
    let app = app_without_model();

    let response = send(&app, get("/", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Travel Satisfaction"));

    let response = send(&app, get("/analytics", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("survey-form"));
}

#[tokio::test]
async fn test_predict_with_empty_body_succeeds() {
    let app = app_with_class(2);

    let response = send(&app, post_json("/predict", "{}", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_some());

    let body = body_json(response).await;
    assert_eq!(
        body,
        json!({
            "success": true,
            "satisfaction_score": 3.0,
            "satisfaction_class": "Medium",
            "color": "info",
            "input_data": {}
        })
    );
}

#[tokio::test]
async fn test_predict_echoes_raw_input() {
    let app = app_with_class(0);
    let payload = json!({
        "age": "29",
        "gender": "Male",
        "special_request": ["Extra Legroom"],
        "total_price": 820.0
    });

    let response = send(&app, post_json("/predict", &payload.to_string(), None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["satisfaction_class"], "High");
    assert_eq!(body["satisfaction_score"], 4.5);
    assert_eq!(body["color"], "success");
    assert_eq!(body["input_data"], payload);
}

#[tokio::test]
async fn test_unknown_class_maps_to_warning() {
    let app = app_with_class(9);

    let body = body_json(send(&app, post_json("/predict", "{}", None)).await).await;
    assert_eq!(body["satisfaction_class"], "Unknown");
    assert_eq!(body["satisfaction_score"], 3.0);
    assert_eq!(body["color"], "warning");
}

#[tokio::test]
async fn test_predict_without_model_returns_500() {
    let app = app_without_model();

    let response = send(&app, post_json("/predict", "{}", None)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(session_cookie(&response).is_none());

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Model not loaded"));
}

#[tokio::test]
async fn test_malformed_input_returns_400() {
    let app = app_with_class(0);

    for payload in [
        "{\"age\": ",
        "null",
        "[1, 2]",
        "{\"age\": \"old\"}",
        "{\"age\": null}",
        "",
    ] {
        let response = send(&app, post_json("/predict", payload, None)).await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "payload {payload:?} should be rejected"
        );

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_reports_without_prediction_redirects() {
    let app = app_with_class(0);

    let response = send(&app, get("/reports", None)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/analytics");
}

#[tokio::test]
async fn test_reports_renders_stored_prediction() {
    let app = app_with_class(1);

    let response = send(
        &app,
        post_json("/predict", r#"{"destination_city": "Accra"}"#, None),
    )
    .await;
    let cookie = session_cookie(&response).expect("session cookie");
    let prediction = body_json(response).await;

    let response = send(&app, get("/reports", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let page = body_text(response).await;
    assert_eq!(prediction["satisfaction_class"], "Low");
    assert!(page.contains(">Low<"));
    assert!(page.contains("text-bg-danger"));
    assert!(page.contains("1.5"));
    assert!(page.contains("Accra"));
}

#[tokio::test]
async fn test_latest_prediction_replaces_previous() {
    let app = app_with_class(0);

    let response = send(&app, post_json("/predict", r#"{"age": 30}"#, None)).await;
    let cookie = session_cookie(&response).unwrap();

    // Second submission on the same session overwrites the first
    let response = send(
        &app,
        post_json("/predict", r#"{"age": 64}"#, Some(&cookie)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_none());

    let page = body_text(send(&app, get("/reports", Some(&cookie))).await).await;
    assert!(page.contains("64"));
    assert!(!page.contains("<td>30</td>"));
}

#[tokio::test]
async fn test_sessions_are_isolated_per_client() {
    let app = app_with_class(0);

    let response = send(&app, post_json("/predict", "{}", None)).await;
    assert!(session_cookie(&response).is_some());

    // A different client (no cookie) has nothing to report
    let response = send(&app, get("/reports", None)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn test_forged_cookie_is_ignored() {
    let app = app_with_class(0);

    let response = send(&app, post_json("/predict", "{}", None)).await;
    let cookie = session_cookie(&response).unwrap();
    let (name, value) = cookie.split_once('=').unwrap();
    let (id, _signature) = value.split_once('.').unwrap();
    let forged = format!("{name}={id}.{}", "0".repeat(64));

    let response = send(&app, get("/reports", Some(&forged))).await;
    assert_eq!(response.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn test_clear_prediction_then_reports_redirects() {
    let app = app_with_class(2);

    let response = send(&app, post_json("/predict", "{}", None)).await;
    let cookie = session_cookie(&response).unwrap();

    let response = send(&app, get("/reports", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, post_json("/clear_prediction", "", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"success": true}));

    let response = send(&app, get("/reports", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/analytics");
}

#[tokio::test]
async fn test_clear_prediction_without_session_succeeds() {
    let app = app_without_model();

    let response = send(&app, post_json("/clear_prediction", "", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"success": true}));
}

#[tokio::test]
async fn test_health_reports_model_state() {
    let body = body_json(send(&app_with_class(0), get("/health", None)).await).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], true);
    assert_eq!(body["model"]["name"], "fixed");

    let body = body_json(send(&app_without_model(), get("/health", None)).await).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["model_loaded"], false);
    assert!(body.get("model").is_none());
}

#[tokio::test]
async fn test_static_assets_are_served() {
    let response = send(&app_without_model(), get("/static/app.js", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("/predict"));
}
