use crate::helpers::{spawn_app, TEST_API_KEY, TEST_GROUP_ID};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn subscribe_returns_200_and_forwards_valid_email() {
    // Arrange
    let app = spawn_app().await;
    Mock::given(path("/subscribers"))
        .and(method("POST"))
        .and(header(
            "Authorization",
            format!("Bearer {}", TEST_API_KEY).as_str(),
        ))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&app.provider_server)
        .await;

    // Act
    let response = app
        .post_subscribe(&json!({
            "email": "foobar@example.com",
            "fields": {"source": "website_signup", "signup_date": "2025-05-01T10:00:00Z"}
        }))
        .await;

    // Assert
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Email subscription received");
}

#[tokio::test]
async fn subscribe_forwards_email_source_and_group() {
    // Arrange
    let app = spawn_app().await;
    Mock::given(path("/subscribers"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.provider_server)
        .await;

    // Act
    app.post_subscribe(&json!({
        "email": "  foobar@example.com ",
        "fields": {"source": "footer_form"}
    }))
    .await;

    // Assert
    let requests = app.provider_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["email"], "foobar@example.com");
    assert_eq!(body["fields"]["source"], "footer_form");
    assert!(body["fields"]["signup_date"].is_string());
    assert_eq!(body["groups"], json!([TEST_GROUP_ID]));
}

#[tokio::test]
async fn subscribe_uses_default_source_when_fields_are_missing() {
    // Arrange
    let app = spawn_app().await;
    Mock::given(path("/subscribers"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.provider_server)
        .await;

    // Act
    let response = app.post_subscribe(&json!({"email": "foobar@example.com"})).await;

    // Assert
    assert_eq!(200, response.status().as_u16());
    let requests = app.provider_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["fields"]["source"], "website_signup");
}

#[tokio::test]
async fn subscribe_returns_400_when_email_is_missing() {
    // Arrange
    let app = spawn_app().await;
    let test_cases = vec![
        (json!({}), "missing email"),
        (json!({"email": ""}), "empty email"),
        (json!({"email": "   "}), "whitespace only email"),
        (json!({"fields": {"source": "website_signup"}}), "fields only"),
    ];
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.provider_server)
        .await;

    for (body, description) in test_cases {
        // Act
        let response = app.post_subscribe(&body).await;

        // Assert
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload had {}",
            description
        );
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Email is required");
    }
}

#[tokio::test]
async fn subscribe_returns_400_when_email_is_malformed() {
    // Arrange
    let app = spawn_app().await;
    let test_cases = vec![
        ("a@b", "no top level domain"),
        ("plainaddress", "no at symbol"),
        ("@example.com", "no local part"),
        ("user name@example.com", "inner whitespace"),
    ];
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.provider_server)
        .await;

    for (email, description) in test_cases {
        // Act
        let response = app.post_subscribe(&json!({ "email": email })).await;

        // Assert
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not reject an email with {}",
            description
        );
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Invalid email format");
    }
}

#[tokio::test]
async fn subscribe_returns_400_with_json_error_for_broken_body() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.post_subscribe_raw("{\"email\": ").await;

    // Assert
    assert_eq!(400, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid request body");
}

#[tokio::test]
async fn subscribe_passes_through_provider_rejections() {
    // Arrange
    let app = spawn_app().await;
    Mock::given(path("/subscribers"))
        .and(method("POST"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({"message": "The email must be a valid email address."})),
        )
        .expect(1)
        .mount(&app.provider_server)
        .await;

    // Act
    let response = app
        .post_subscribe(&json!({"email": "foobar@example.com"}))
        .await;

    // Assert
    assert_eq!(422, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "The email must be a valid email address.");
}

#[tokio::test]
async fn subscribe_returns_500_when_provider_fails() {
    // Arrange
    let app = spawn_app().await;
    Mock::given(path("/subscribers"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&app.provider_server)
        .await;

    // Act
    let response = app
        .post_subscribe(&json!({"email": "foobar@example.com"}))
        .await;

    // Assert
    assert_eq!(500, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Server error processing subscription");
    assert!(body["details"].is_string());
}
