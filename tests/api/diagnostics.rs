use crate::helpers::{spawn_app, spawn_app_with};
use newsletter::configuration::RepositorySettings;

#[tokio::test]
async fn diagnostics_report_the_inmemory_backend() {
    // Arrange
    let app = spawn_app().await;
    app.post_subscriptions("name=Ann&email=ann%40example.com".into())
        .await;

    // Act
    let diagnostics = app.get_diagnostics().await;

    // Assert
    assert_eq!(diagnostics["backend"], "inmemory");
    assert_eq!(diagnostics["live"], true);
    assert_eq!(diagnostics["subscriber_count"], 1);
    assert!(diagnostics["fallback_reason"].is_null());
}

#[tokio::test]
async fn an_unknown_repository_kind_still_starts_on_the_inmemory_backend() {
    // Arrange
    let app = spawn_app_with(RepositorySettings {
        kind: "postgres".into(),
        ..RepositorySettings::default()
    })
    .await;

    // Act
    let diagnostics = app.get_diagnostics().await;
    let response = app
        .post_subscriptions("name=Ann&email=ann%40example.com".into())
        .await;

    // Assert
    assert_eq!(diagnostics["requested_kind"], "postgres");
    assert_eq!(diagnostics["backend"], "inmemory");
    assert!(diagnostics["fallback_reason"].is_string());
    assert_eq!(response.status().as_u16(), 200);
}
