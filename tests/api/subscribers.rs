use crate::helpers::spawn_app;

#[tokio::test]
async fn subscribers_are_listed_in_signup_order() {
    // Arrange
    let app = spawn_app().await;
    for body in [
        "name=Ann&email=ann%40example.com",
        "name=Bob&email=bob%40example.com",
        "name=Cid&email=cid%40example.com",
    ] {
        app.post_subscriptions(body.into()).await;
    }

    // Act
    let subscribers = app.get_subscribers().await;

    // Assert
    let names: Vec<_> = subscribers
        .as_array()
        .expect("Expected a list of subscribers")
        .iter()
        .map(|s| s["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Ann", "Bob", "Cid"]);
}

#[tokio::test]
async fn an_empty_store_lists_no_subscribers() {
    let app = spawn_app().await;
    assert_eq!(app.get_subscribers().await, serde_json::json!([]));
}
