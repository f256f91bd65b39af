use crate::helpers::{outcome, spawn_app};

#[tokio::test]
async fn a_subscriber_can_sign_up_and_leave_again() {
    // Arrange
    let app = spawn_app().await;
    let signup = "name=Ann&email=ann%40example.com";
    let unsubscribe = "email=ann%40example.com";

    // Act - Part 1 - Sign up
    let (_, succeeded, message) = outcome(app.post_subscriptions(signup.into()).await).await;
    assert!(succeeded);
    assert!(message.starts_with("Welcome to our newsletter, Ann!"));

    // Act - Part 2 - Sign up again
    let (_, succeeded, message) = outcome(app.post_subscriptions(signup.into()).await).await;
    assert!(!succeeded);
    assert!(message.contains("already subscribed"));

    // Act - Part 3 - Unsubscribe
    let (status, succeeded, _) = outcome(app.post_unsubscribe(unsubscribe.into()).await).await;
    assert_eq!(status, 200);
    assert!(succeeded);
    assert!(app.get_subscribers().await.as_array().unwrap().is_empty());

    // Act - Part 4 - Unsubscribe again
    let (status, succeeded, message) =
        outcome(app.post_unsubscribe(unsubscribe.into()).await).await;
    assert_eq!(status, 400);
    assert!(!succeeded);
    assert!(message.contains("couldn't find your subscription"));
}

#[tokio::test]
async fn unsubscribing_an_unknown_email_leaves_other_subscribers_alone() {
    // Arrange
    let app = spawn_app().await;
    app.post_subscriptions("name=Ann&email=ann%40example.com".into())
        .await;

    // Act
    let (_, succeeded, message) =
        outcome(app.post_unsubscribe("email=notfound%40x.com".into()).await).await;

    // Assert
    assert!(!succeeded);
    assert_eq!(message, "We couldn't find your subscription in our system.");
    assert_eq!(app.get_subscribers().await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unsubscribing_a_blank_email_is_rejected() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let (status, succeeded, message) = outcome(app.post_unsubscribe("email=".into()).await).await;

    // Assert
    assert_eq!(status, 400);
    assert!(!succeeded);
    assert_eq!(message, "Invalid email address.");
}
